use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::cell::Cell;
use std::fmt;
use std::hash::BuildHasherDefault;

use crate::error::StoreError;
use crate::field::Field;
use crate::types::{MAX_NAME_LENGTH, TYPE_ANY, type_name};

pub type FastMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;

// ─── FieldInfo ──────────────────────────────────────────────────────────────

/// Read-only snapshot of one field, returned by the info operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo<'a> {
    pub name: &'a str,
    pub type_code: u32,
    pub count: usize,
    /// Per-item width when every item of the field has the same size.
    pub fixed_size: Option<usize>,
}

// ─── FieldStore ─────────────────────────────────────────────────────────────

/// Name-indexed, insertion-ordered collection of typed fields: the storage
/// engine behind a message body.
///
/// Fields are created on the first `add_data` for a new name and destroyed
/// when their last item is removed. The store exclusively owns its fields;
/// callers only ever see [`FieldInfo`] snapshots and item byte slices.
///
/// A name holds exactly one type: adding data of a different type under an
/// existing name fails without touching the field.
pub struct FieldStore {
    /// Insertion order; the wire format and the by-type enumeration both
    /// walk this.
    pub(super) fields: Vec<Field>,
    /// name → position in `fields`. Never diverges from `fields`.
    pub(super) index: FastMap<SmolStr, usize>,
    /// Memoized flatten byte count; cleared by every mutation.
    pub(super) size_cache: Cell<Option<usize>>,
}

impl FieldStore {
    pub fn new() -> Self {
        FieldStore {
            fields: Vec::new(),
            index: FastMap::default(),
            size_cache: Cell::new(None),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal: index plumbing
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub(super) fn invalidate_size(&self) {
        self.size_cache.set(None);
    }

    pub(super) fn check_name(name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument("empty field name"));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(StoreError::InvalidArgument(
                "field name longer than 255 bytes",
            ));
        }
        Ok(())
    }

    /// Shared name/type lookup. `TYPE_ANY` matches a field of any type;
    /// a concrete type must match the field's exactly.
    pub(super) fn lookup(&self, name: &str, type_code: u32) -> Result<usize, StoreError> {
        let pos = *self.index.get(name).ok_or(StoreError::NotFound)?;
        let field = &self.fields[pos];
        if type_code != TYPE_ANY && type_code != field.type_code() {
            return Err(StoreError::TypeMismatch {
                expected: type_code,
                actual: field.type_code(),
            });
        }
        Ok(pos)
    }

    /// Append a field and key it into the index.
    pub(super) fn insert_field(&mut self, field: Field) -> usize {
        let pos = self.fields.len();
        self.index.insert(SmolStr::from(field.name()), pos);
        self.fields.push(field);
        pos
    }

    /// Destroy the field at `pos`, keeping the index in step with the
    /// shifted arena positions.
    pub(super) fn remove_field_at(&mut self, pos: usize) {
        let field = self.fields.remove(pos);
        self.index.remove(field.name());
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
    }
}

impl Default for FieldStore {
    fn default() -> Self {
        FieldStore::new()
    }
}

/// Deep copy: every field's items are duplicated, nothing is shared with the
/// source. The size memo starts cold.
impl Clone for FieldStore {
    fn clone(&self) -> Self {
        FieldStore {
            fields: self.fields.clone(),
            index: self.index.clone(),
            size_cache: Cell::new(None),
        }
    }
}

/// Field-for-field equality in insertion order: names, types, item bytes and
/// item order. The index and the size cache are derived state.
impl PartialEq for FieldStore {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FieldStore ({} fields)", self.fields.len())?;
        for field in &self.fields {
            write!(
                f,
                "  {:?} {}: {} item(s), {} bytes",
                field.name(),
                type_name(field.type_code()),
                field.count_items(),
                field.total_size(),
            )?;
            if let Some(width) = field.fixed_size() {
                write!(f, ", fixed {width}-byte items")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
