use smol_str::SmolStr;
use std::io::{Read, Write};

use crate::error::StoreError;
use crate::types::{
    FLAG_FIXED_SIZE, FLAG_KNOWN_MASK, FLAG_MINI_DATA, FLAG_SINGLE_ITEM, FLAG_VALID,
};

// ─── ItemSlot ───────────────────────────────────────────────────────────────

/// One item's storage. The vector's spare capacity is the slot's padding:
/// bytes that stay allocated after a shrinking replace so a later grow of the
/// same slot can reuse them without reallocating. Padding is never part of
/// the live data and never leaves this module.
#[derive(Debug, Clone, PartialEq)]
struct ItemSlot {
    data: Vec<u8>,
}

impl ItemSlot {
    /// Allocate exactly `size` zeroed bytes; a fresh slot has no padding.
    fn new(size: usize) -> Result<Self, StoreError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)?;
        data.resize(size, 0);
        Ok(ItemSlot { data })
    }

    #[inline]
    fn padding(&self) -> usize {
        self.data.capacity() - self.data.len()
    }
}

// ─── Field ──────────────────────────────────────────────────────────────────

/// One named, typed, multi-valued attribute of a message body.
///
/// Items are ordered; callers address them by index. A field with zero items
/// is invalid; the owning store destroys a field when its last item goes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Field {
    name: SmolStr,
    type_code: u32,
    /// Pinned per-item width. `None` means items are individually sized.
    fixed_size: Option<usize>,
    items: Vec<ItemSlot>,
    /// Σ live item bytes, maintained on every mutation.
    total_size: usize,
}

impl Field {
    pub fn new(
        name: SmolStr,
        type_code: u32,
        fixed_size: Option<usize>,
        count_hint: usize,
    ) -> Result<Self, StoreError> {
        let mut items = Vec::new();
        items.try_reserve(count_hint)?;
        Ok(Field {
            name,
            type_code,
            fixed_size,
            items,
            total_size: 0,
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: SmolStr) {
        self.name = name;
    }

    #[inline]
    pub fn type_code(&self) -> u32 {
        self.type_code
    }

    #[inline]
    pub fn fixed_size(&self) -> Option<usize> {
        self.fixed_size
    }

    #[inline]
    pub fn count_items(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Σ reserved-but-dead trailing bytes across all slots. Derived from the
    /// slots' spare capacity, so it cannot drift from reality.
    #[allow(dead_code)]
    pub fn total_padding(&self) -> usize {
        self.items.iter().map(ItemSlot::padding).sum()
    }

    #[inline]
    #[allow(dead_code)]
    pub fn size_at(&self, index: usize) -> usize {
        self.items[index].data.len()
    }

    #[inline]
    pub fn buffer_at(&self, index: usize) -> &[u8] {
        &self.items[index].data
    }

    #[inline]
    pub fn buffer_at_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.items[index].data
    }

    // ════════════════════════════════════════════════════════════════════════
    // Mutation
    // ════════════════════════════════════════════════════════════════════════

    /// Append a fresh item and hand back its writable storage.
    /// The slot is allocated exactly; padding only ever comes from
    /// `replace_item`.
    pub fn add_item(&mut self, size: usize) -> Result<&mut [u8], StoreError> {
        if let Some(width) = self.fixed_size {
            if size != width {
                return Err(StoreError::InvalidArgument(
                    "item size does not match the field's fixed size",
                ));
            }
        }
        self.items.try_reserve(1)?;
        self.items.push(ItemSlot::new(size)?);
        self.total_size += size;
        let last = self.items.len() - 1;
        Ok(&mut self.items[last].data)
    }

    /// Resize the item at `index` in place and hand back its storage.
    ///
    /// When the new size fits the slot's allocation (live + padding) the
    /// allocation is reused and only the padding shifts; otherwise the slot
    /// gets fresh exact storage and its padding drops to zero. This is the
    /// only way a slot acquires padding.
    pub fn replace_item(&mut self, index: usize, new_size: usize) -> Result<&mut [u8], StoreError> {
        if let Some(width) = self.fixed_size {
            if new_size != width {
                return Err(StoreError::InvalidArgument(
                    "item size does not match the field's fixed size",
                ));
            }
        }
        let slot = &mut self.items[index];
        let old_len = slot.data.len();
        if new_size <= slot.data.capacity() {
            slot.data.resize(new_size, 0);
        } else {
            *slot = ItemSlot::new(new_size)?;
        }
        self.total_size = self.total_size - old_len + new_size;
        Ok(&mut self.items[index].data)
    }

    /// Remove the item at `index`, shifting later items down one position.
    /// The owning store validates the index.
    pub fn remove_item(&mut self, index: usize) {
        let slot = self.items.remove(index);
        self.total_size -= slot.data.len();
    }

    /// Drop every item. Name and type are untouched; the owning store decides
    /// whether the now-empty field survives (it never does).
    #[allow(dead_code)]
    pub fn make_empty(&mut self) {
        self.items.clear();
        self.total_size = 0;
    }

    // ════════════════════════════════════════════════════════════════════════
    // Wire record
    // ════════════════════════════════════════════════════════════════════════

    /// Flags byte of this field's wire record. The writer and reader both key
    /// the record's framing off these bits, so they must be derived from the
    /// live state alone.
    pub fn flags(&self) -> u8 {
        let mut flags = FLAG_VALID;
        if self.fixed_size.is_some() {
            flags |= FLAG_FIXED_SIZE;
        }
        if self.items.len() == 1 {
            flags |= FLAG_SINGLE_ITEM;
        }
        if self.items.len() < 256 && self.total_size < 256 {
            flags |= FLAG_MINI_DATA;
        }
        flags
    }

    /// Exact byte count `flatten` will produce for this field.
    pub fn flattened_size(&self) -> usize {
        let flags = self.flags();
        let int_width = if flags & FLAG_MINI_DATA != 0 { 1 } else { 4 };

        let mut size = 1 + 4; // flags + type code
        if flags & FLAG_SINGLE_ITEM == 0 {
            size += int_width; // item count
        }
        size += int_width; // total data size
        size += 1 + self.name.len();
        size += self.total_size;
        if self.fixed_size.is_none() {
            size += 4 * self.items.len(); // per-item length prefixes
        }
        size
    }

    /// Write this field's complete wire record, flags byte included.
    pub fn flatten<W: Write>(&self, w: &mut W) -> Result<(), StoreError> {
        let flags = self.flags();
        let mini = flags & FLAG_MINI_DATA != 0;

        w.write_all(&[flags])?;
        w.write_all(&self.type_code.to_le_bytes())?;
        if flags & FLAG_SINGLE_ITEM == 0 {
            if mini {
                w.write_all(&[self.items.len() as u8])?;
            } else {
                w.write_all(&(self.items.len() as u32).to_le_bytes())?;
            }
        }
        if mini {
            w.write_all(&[self.total_size as u8])?;
        } else {
            w.write_all(&(self.total_size as u32).to_le_bytes())?;
        }
        w.write_all(&[self.name.len() as u8])?;
        w.write_all(self.name.as_bytes())?;

        if self.fixed_size.is_some() {
            // Uniform items, back to back; widths are implied by the framing.
            for slot in &self.items {
                w.write_all(&slot.data)?;
            }
        } else {
            for slot in &self.items {
                w.write_all(&(slot.data.len() as u32).to_le_bytes())?;
                w.write_all(&slot.data)?;
            }
        }
        Ok(())
    }

    /// Reconstruct one field from its wire record. The caller has already
    /// consumed the flags byte (to tell a record from the terminator) and
    /// passes it in.
    pub fn read_from<R: Read>(r: &mut R, flags: u8) -> Result<Self, StoreError> {
        if flags & FLAG_VALID == 0 {
            return Err(StoreError::BadData("field record without valid bit".into()));
        }
        if flags & !FLAG_KNOWN_MASK != 0 {
            return Err(StoreError::BadData(format!(
                "unknown flag bits 0x{:02x}",
                flags & !FLAG_KNOWN_MASK
            )));
        }
        let mini = flags & FLAG_MINI_DATA != 0;
        let fixed = flags & FLAG_FIXED_SIZE != 0;

        let type_code = read_u32(r)?;
        let count = if flags & FLAG_SINGLE_ITEM != 0 {
            1
        } else if mini {
            read_u8(r)? as usize
        } else {
            read_u32(r)? as usize
        };
        if count == 0 {
            return Err(StoreError::BadData("field record with zero items".into()));
        }
        let total_size = if mini {
            read_u8(r)? as usize
        } else {
            read_u32(r)? as usize
        };

        let name_len = read_u8(r)? as usize;
        if name_len == 0 {
            return Err(StoreError::BadData("field record with empty name".into()));
        }
        let mut name_buf = vec![0u8; name_len];
        r.read_exact(&mut name_buf)?;
        let name = std::str::from_utf8(&name_buf)
            .map_err(|_| StoreError::BadData("field name is not valid UTF-8".into()))?;

        let mut field = Field::new(SmolStr::from(name), type_code, None, count)?;

        if fixed {
            if total_size % count != 0 {
                return Err(StoreError::BadData(format!(
                    "fixed-size field: total {total_size} not divisible by count {count}"
                )));
            }
            let item_size = total_size / count;
            field.fixed_size = Some(item_size);
            for _ in 0..count {
                let buf = field.add_item(item_size)?;
                r.read_exact(buf)?;
            }
        } else {
            let mut remaining = total_size;
            for _ in 0..count {
                let item_size = read_u32(r)? as usize;
                if item_size > remaining {
                    return Err(StoreError::BadData(
                        "item lengths exceed the field's total size".into(),
                    ));
                }
                remaining -= item_size;
                let buf = field.add_item(item_size)?;
                r.read_exact(buf)?;
            }
            if remaining != 0 {
                return Err(StoreError::BadData(
                    "item lengths fall short of the field's total size".into(),
                ));
            }
        }
        Ok(field)
    }
}

// ─── Stream helpers ─────────────────────────────────────────────────────────

#[inline]
pub(crate) fn read_u8<R: Read>(r: &mut R) -> Result<u8, StoreError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[inline]
pub(crate) fn read_u32<R: Read>(r: &mut R) -> Result<u32, StoreError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
