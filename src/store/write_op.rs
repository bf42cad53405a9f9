use smol_str::SmolStr;

use super::store::FieldStore;
use crate::error::StoreError;
use crate::field::Field;
use crate::types::{
    TYPE_ANY, TYPE_BOOL, TYPE_DOUBLE, TYPE_FLOAT, TYPE_INT8, TYPE_INT16, TYPE_INT32, TYPE_INT64,
    TYPE_STRING, fixed_width,
};

impl FieldStore {
    // ════════════════════════════════════════════════════════════════════════
    // Item writes
    // ════════════════════════════════════════════════════════════════════════

    /// Append one item of `size` bytes under `name` and hand back its
    /// writable, zero-filled buffer.
    ///
    /// The field is created on first use; an existing field's type must match
    /// `type_code` exactly or nothing changes. `fixed_size` pins a uniform
    /// per-item width (the table width for known primitive types, otherwise
    /// this first item's size) and `count_hint` pre-sizes the item list;
    /// both are honored only when the field is created and ignored on later
    /// calls.
    pub fn add_data(
        &mut self,
        name: &str,
        type_code: u32,
        size: usize,
        fixed_size: bool,
        count_hint: usize,
    ) -> Result<&mut [u8], StoreError> {
        Self::check_name(name)?;
        if type_code == TYPE_ANY {
            return Err(StoreError::InvalidArgument(
                "a concrete type is required to add data",
            ));
        }

        let pos = match self.index.get(name).copied() {
            Some(pos) => {
                let field = &mut self.fields[pos];
                if field.type_code() != type_code {
                    return Err(StoreError::TypeMismatch {
                        expected: type_code,
                        actual: field.type_code(),
                    });
                }
                field.add_item(size)?;
                pos
            }
            None => {
                let width = fixed_size.then(|| fixed_width(type_code).unwrap_or(size));
                let mut field = Field::new(SmolStr::from(name), type_code, width, count_hint)?;
                // Populate before inserting so a failed add never leaves an
                // empty field behind.
                field.add_item(size)?;
                self.insert_field(field)
            }
        };
        self.invalidate_size();
        let field = &mut self.fields[pos];
        let last = field.count_items() - 1;
        Ok(field.buffer_at_mut(last))
    }

    /// Resize item `index` of `name` and hand back its writable buffer. The
    /// slot's allocation is reused when the new size fits it (see
    /// `Field::replace_item`); the type must be concrete and must match.
    pub fn replace_data(
        &mut self,
        name: &str,
        type_code: u32,
        index: usize,
        size: usize,
    ) -> Result<&mut [u8], StoreError> {
        if type_code == TYPE_ANY {
            return Err(StoreError::InvalidArgument(
                "a concrete type is required to replace data",
            ));
        }
        let pos = self.lookup(name, type_code)?;
        let count = self.fields[pos].count_items();
        if index >= count {
            return Err(StoreError::IndexOutOfRange { index, count });
        }
        self.fields[pos].replace_item(index, size)?;
        self.invalidate_size();
        Ok(self.fields[pos].buffer_at_mut(index))
    }

    /// Remove item `index` of `name`. A field emptied by the removal is
    /// destroyed with it; empty fields are never retained.
    pub fn remove_data(&mut self, name: &str, index: usize) -> Result<(), StoreError> {
        let pos = self.lookup(name, TYPE_ANY)?;
        let field = &mut self.fields[pos];
        let count = field.count_items();
        if index >= count {
            return Err(StoreError::IndexOutOfRange { index, count });
        }
        field.remove_item(index);
        if field.count_items() == 0 {
            self.remove_field_at(pos);
        }
        self.invalidate_size();
        Ok(())
    }

    /// Destroy the whole field named `name`, items and all.
    pub fn remove_name(&mut self, name: &str) -> Result<(), StoreError> {
        let pos = self.lookup(name, TYPE_ANY)?;
        self.remove_field_at(pos);
        self.invalidate_size();
        Ok(())
    }

    /// Re-key a field. Renaming onto a name that is already taken is
    /// rejected; both fields stay untouched.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        Self::check_name(new_name)?;
        let pos = self.lookup(old_name, TYPE_ANY)?;
        if self.index.contains_key(new_name) {
            return Err(StoreError::FieldExists);
        }
        self.index.remove(old_name);
        self.index.insert(SmolStr::from(new_name), pos);
        self.fields[pos].set_name(SmolStr::from(new_name));
        self.invalidate_size();
        Ok(())
    }

    /// Destroy every field.
    pub fn make_empty(&mut self) {
        self.fields.clear();
        self.index.clear();
        self.invalidate_size();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Typed writes
    // ════════════════════════════════════════════════════════════════════════

    pub fn add_bool(&mut self, name: &str, value: bool) -> Result<(), StoreError> {
        self.add_data(name, TYPE_BOOL, 1, true, 1)?[0] = value as u8;
        Ok(())
    }

    pub fn add_i8(&mut self, name: &str, value: i8) -> Result<(), StoreError> {
        self.add_data(name, TYPE_INT8, 1, true, 1)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn add_i16(&mut self, name: &str, value: i16) -> Result<(), StoreError> {
        self.add_data(name, TYPE_INT16, 2, true, 1)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn add_i32(&mut self, name: &str, value: i32) -> Result<(), StoreError> {
        self.add_data(name, TYPE_INT32, 4, true, 1)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn add_i64(&mut self, name: &str, value: i64) -> Result<(), StoreError> {
        self.add_data(name, TYPE_INT64, 8, true, 1)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn add_f32(&mut self, name: &str, value: f32) -> Result<(), StoreError> {
        self.add_data(name, TYPE_FLOAT, 4, true, 1)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn add_f64(&mut self, name: &str, value: f64) -> Result<(), StoreError> {
        self.add_data(name, TYPE_DOUBLE, 8, true, 1)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Strings go on the wire with a trailing NUL byte.
    pub fn add_str(&mut self, name: &str, value: &str) -> Result<(), StoreError> {
        let bytes = value.as_bytes();
        let buf = self.add_data(name, TYPE_STRING, bytes.len() + 1, false, 1)?;
        buf[..bytes.len()].copy_from_slice(bytes);
        buf[bytes.len()] = 0;
        Ok(())
    }

    /// Arbitrary payload under a caller-chosen type code. Types with a known
    /// width are stored fixed-size.
    pub fn add_bytes(&mut self, name: &str, type_code: u32, data: &[u8]) -> Result<(), StoreError> {
        let fixed = fixed_width(type_code).is_some();
        self.add_data(name, type_code, data.len(), fixed, 1)?
            .copy_from_slice(data);
        Ok(())
    }

    pub fn replace_bool(&mut self, name: &str, index: usize, value: bool) -> Result<(), StoreError> {
        self.replace_data(name, TYPE_BOOL, index, 1)?[0] = value as u8;
        Ok(())
    }

    pub fn replace_i32(&mut self, name: &str, index: usize, value: i32) -> Result<(), StoreError> {
        self.replace_data(name, TYPE_INT32, index, 4)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn replace_i64(&mut self, name: &str, index: usize, value: i64) -> Result<(), StoreError> {
        self.replace_data(name, TYPE_INT64, index, 8)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn replace_f64(&mut self, name: &str, index: usize, value: f64) -> Result<(), StoreError> {
        self.replace_data(name, TYPE_DOUBLE, index, 8)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn replace_str(&mut self, name: &str, index: usize, value: &str) -> Result<(), StoreError> {
        let bytes = value.as_bytes();
        let buf = self.replace_data(name, TYPE_STRING, index, bytes.len() + 1)?;
        buf[..bytes.len()].copy_from_slice(bytes);
        buf[bytes.len()] = 0;
        Ok(())
    }
}
