use std::io::{Read, Write};

use super::store::FieldStore;
use crate::error::StoreError;
use crate::field::{Field, read_u8};
use crate::types::FLAG_VALID;

impl FieldStore {
    // ════════════════════════════════════════════════════════════════════════
    // Wire format
    // ════════════════════════════════════════════════════════════════════════

    /// Exact byte count `flatten` will produce. Memoized until the next
    /// mutating call.
    pub fn flattened_size(&self) -> usize {
        if let Some(size) = self.size_cache.get() {
            return size;
        }
        let size = 1 + self.fields.iter().map(Field::flattened_size).sum::<usize>();
        self.size_cache.set(Some(size));
        size
    }

    /// Write every field record in insertion order, then the terminator
    /// byte. Any short write aborts with the stream's error.
    pub fn flatten<W: Write>(&self, w: &mut W) -> Result<(), StoreError> {
        tracing::trace!(
            fields = self.fields.len(),
            bytes = self.flattened_size(),
            "flattening body"
        );
        for field in &self.fields {
            field.flatten(w)?;
        }
        w.write_all(&[0])?;
        Ok(())
    }

    /// Replace this store's contents with the body read from `r`.
    ///
    /// All-or-nothing: the store is emptied before decoding starts and
    /// re-emptied on any failure, so a partially decoded body is never
    /// observable.
    pub fn unflatten<R: Read>(&mut self, r: &mut R) -> Result<(), StoreError> {
        self.make_empty();
        match self.read_body(r) {
            Ok(()) => {
                tracing::debug!(fields = self.fields.len(), "unflattened body");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "unflatten failed, dropping partial body");
                self.make_empty();
                Err(err)
            }
        }
    }

    fn read_body<R: Read>(&mut self, r: &mut R) -> Result<(), StoreError> {
        loop {
            let flags = read_u8(r)?;
            if flags & FLAG_VALID == 0 {
                if flags != 0 {
                    return Err(StoreError::BadData(format!(
                        "terminator with stray flag bits 0x{flags:02x}"
                    )));
                }
                return Ok(());
            }
            let field = Field::read_from(r, flags)?;
            if self.index.contains_key(field.name()) {
                return Err(StoreError::BadData(format!(
                    "duplicate field name {:?}",
                    field.name()
                )));
            }
            self.insert_field(field);
        }
    }
}
