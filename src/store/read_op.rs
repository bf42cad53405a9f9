use super::store::{FieldInfo, FieldStore};
use crate::error::StoreError;
use crate::types::{
    TYPE_ANY, TYPE_BOOL, TYPE_DOUBLE, TYPE_FLOAT, TYPE_INT8, TYPE_INT16, TYPE_INT32, TYPE_INT64,
    TYPE_STRING,
};

impl FieldStore {
    // ════════════════════════════════════════════════════════════════════════
    // Introspection
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields whose type matches `type_code` (`TYPE_ANY` counts
    /// every field).
    pub fn count_names(&self, type_code: u32) -> usize {
        if type_code == TYPE_ANY {
            return self.fields.len();
        }
        self.fields
            .iter()
            .filter(|f| f.type_code() == type_code)
            .count()
    }

    /// Number of items held under `name`.
    pub fn count_items(&self, name: &str) -> Result<usize, StoreError> {
        let pos = self.lookup(name, TYPE_ANY)?;
        Ok(self.fields[pos].count_items())
    }

    /// Snapshot of the field named `name`.
    pub fn info(&self, name: &str) -> Result<FieldInfo<'_>, StoreError> {
        let pos = self.lookup(name, TYPE_ANY)?;
        Ok(self.info_of(pos))
    }

    /// Enumerate fields by type: the `which`-th field (in insertion order)
    /// whose type matches `type_code`. A linear scan; enumeration is not a
    /// hot path.
    pub fn info_at(&self, type_code: u32, which: usize) -> Result<FieldInfo<'_>, StoreError> {
        let mut matched = 0;
        for (pos, field) in self.fields.iter().enumerate() {
            if type_code != TYPE_ANY && field.type_code() != type_code {
                continue;
            }
            if matched == which {
                return Ok(self.info_of(pos));
            }
            matched += 1;
        }
        if matched == 0 {
            return Err(StoreError::TypeMismatch {
                expected: type_code,
                actual: 0,
            });
        }
        Err(StoreError::IndexOutOfRange {
            index: which,
            count: matched,
        })
    }

    fn info_of(&self, pos: usize) -> FieldInfo<'_> {
        let field = &self.fields[pos];
        FieldInfo {
            name: field.name(),
            type_code: field.type_code(),
            count: field.count_items(),
            fixed_size: field.fixed_size(),
        }
    }

    /// True iff the field exists, its type matches (`TYPE_ANY` matches any)
    /// and item `index` is in range.
    pub fn has_data(&self, name: &str, type_code: u32, index: usize) -> bool {
        match self.lookup(name, type_code) {
            Ok(pos) => index < self.fields[pos].count_items(),
            Err(_) => false,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Item reads
    // ════════════════════════════════════════════════════════════════════════

    /// Borrow the live bytes of one item. Slot padding is never part of the
    /// returned slice.
    pub fn find_data(&self, name: &str, type_code: u32, index: usize) -> Result<&[u8], StoreError> {
        let pos = self.lookup(name, type_code)?;
        let field = &self.fields[pos];
        if index >= field.count_items() {
            return Err(StoreError::IndexOutOfRange {
                index,
                count: field.count_items(),
            });
        }
        Ok(field.buffer_at(index))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Typed reads
    // ════════════════════════════════════════════════════════════════════════

    pub fn find_bool(&self, name: &str, index: usize) -> Result<bool, StoreError> {
        let data = self.find_data(name, TYPE_BOOL, index)?;
        match data {
            [b] => Ok(*b != 0),
            _ => Err(StoreError::BadData("bool item with wrong width".into())),
        }
    }

    pub fn find_i8(&self, name: &str, index: usize) -> Result<i8, StoreError> {
        let data = self.find_data(name, TYPE_INT8, index)?;
        Ok(i8::from_le_bytes(fixed_bytes(data, "int8")?))
    }

    pub fn find_i16(&self, name: &str, index: usize) -> Result<i16, StoreError> {
        let data = self.find_data(name, TYPE_INT16, index)?;
        Ok(i16::from_le_bytes(fixed_bytes(data, "int16")?))
    }

    pub fn find_i32(&self, name: &str, index: usize) -> Result<i32, StoreError> {
        let data = self.find_data(name, TYPE_INT32, index)?;
        Ok(i32::from_le_bytes(fixed_bytes(data, "int32")?))
    }

    pub fn find_i64(&self, name: &str, index: usize) -> Result<i64, StoreError> {
        let data = self.find_data(name, TYPE_INT64, index)?;
        Ok(i64::from_le_bytes(fixed_bytes(data, "int64")?))
    }

    pub fn find_f32(&self, name: &str, index: usize) -> Result<f32, StoreError> {
        let data = self.find_data(name, TYPE_FLOAT, index)?;
        Ok(f32::from_le_bytes(fixed_bytes(data, "float")?))
    }

    pub fn find_f64(&self, name: &str, index: usize) -> Result<f64, StoreError> {
        let data = self.find_data(name, TYPE_DOUBLE, index)?;
        Ok(f64::from_le_bytes(fixed_bytes(data, "double")?))
    }

    /// String items carry a trailing NUL on the wire; it is stripped here.
    pub fn find_str(&self, name: &str, index: usize) -> Result<&str, StoreError> {
        let data = self.find_data(name, TYPE_STRING, index)?;
        let Some((&0, bytes)) = data.split_last() else {
            return Err(StoreError::BadData(
                "string item without trailing NUL".into(),
            ));
        };
        std::str::from_utf8(bytes)
            .map_err(|_| StoreError::BadData("string item is not valid UTF-8".into()))
    }
}

fn fixed_bytes<const N: usize>(data: &[u8], what: &str) -> Result<[u8; N], StoreError> {
    data.try_into()
        .map_err(|_| StoreError::BadData(format!("{what} item with wrong width")))
}
