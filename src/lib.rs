//! Typed, named, multi-valued field storage with a compact wire format:
//! the body of an inter-process message.
//!
//! A [`FieldStore`] maps names to fields; a field holds one type code and an
//! ordered list of opaque byte items. `flatten`/`unflatten` move a whole body
//! through any `std::io` stream, choosing the most compact framing per field
//! (single-item, fixed-size and mini records drop redundant length words).
//!
//! The store is single-owner by design: no locking, no sharing, deep clones.

mod error;
mod field;
mod store;
pub mod types;

pub use error::StoreError;
pub use store::{FieldInfo, FieldStore};
