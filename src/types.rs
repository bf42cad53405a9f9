// ─── Type Codes ─────────────────────────────────────────────────────────────
//
// A type code is a 32-bit tag built from four ASCII bytes. The store treats
// codes as opaque except for the fixed-width table below; callers interpret
// the payload bytes.

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

pub const TYPE_BOOL: u32 = fourcc(b"BOOL");
pub const TYPE_INT8: u32 = fourcc(b"BYTE");
pub const TYPE_INT16: u32 = fourcc(b"SHRT");
pub const TYPE_INT32: u32 = fourcc(b"LONG");
pub const TYPE_INT64: u32 = fourcc(b"LLNG");
pub const TYPE_UINT8: u32 = fourcc(b"UBYT");
pub const TYPE_UINT16: u32 = fourcc(b"USHT");
pub const TYPE_UINT32: u32 = fourcc(b"ULNG");
pub const TYPE_UINT64: u32 = fourcc(b"ULLG");
pub const TYPE_FLOAT: u32 = fourcc(b"FLOT");
pub const TYPE_DOUBLE: u32 = fourcc(b"DBLE");
pub const TYPE_POINT: u32 = fourcc(b"PNT2");
pub const TYPE_RECT: u32 = fourcc(b"RECT");
pub const TYPE_STRING: u32 = fourcc(b"CSTR");
pub const TYPE_RAW: u32 = fourcc(b"RAWB");
pub const TYPE_MESSAGE: u32 = fourcc(b"MSGB");

/// Wildcard accepted by the lookup operations: matches a field of any type.
/// Never valid as a stored field type.
pub const TYPE_ANY: u32 = fourcc(b"ANYT");

/// Per-item width of the primitive fixed-size types. Anything not listed is
/// variable-size unless the caller pins a width when the field is created.
pub fn fixed_width(type_code: u32) -> Option<usize> {
    match type_code {
        TYPE_BOOL | TYPE_INT8 | TYPE_UINT8 => Some(1),
        TYPE_INT16 | TYPE_UINT16 => Some(2),
        TYPE_INT32 | TYPE_UINT32 | TYPE_FLOAT => Some(4),
        TYPE_INT64 | TYPE_UINT64 | TYPE_DOUBLE | TYPE_POINT => Some(8),
        TYPE_RECT => Some(16),
        _ => None,
    }
}

/// Render a type code the way it was declared, for diagnostics.
/// Non-printable bytes fall back to the hex value.
pub fn type_name(type_code: u32) -> String {
    let bytes = type_code.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic()) {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        format!("0x{type_code:08x}")
    }
}

// ─── Wire Layout ────────────────────────────────────────────────────────────
//
//  One field record (all integers little-endian):
//
//  ┌──────────────────────────────────────────────────┐
//  │ flags: u8                                        │
//  │ type_code: u32                                   │
//  ├──────────────────────────────────────────────────┤
//  │ item_count: u8|u32     ← absent when SINGLE_ITEM │
//  │ total_size: u8|u32     ← u8 when MINI_DATA       │
//  │ name_len: u8                                     │
//  │ name: [u8; name_len]   ← no NUL terminator       │
//  ├──────────────────────────────────────────────────┤
//  │ FIXED_SIZE:  item_count × (total/count) bytes    │
//  │ otherwise:   item_count × (len: u32, data)       │
//  └──────────────────────────────────────────────────┘
//
//  A whole body is the field records in insertion order followed by one
//  0x00 terminator byte (a flags byte without FLAG_VALID).

pub const FLAG_VALID: u8 = 0x01;
/// Item count and total size both fit in one byte (count < 256, size < 256).
pub const FLAG_MINI_DATA: u8 = 0x02;
/// Every item occupies the same number of bytes; no per-item length prefixes.
pub const FLAG_FIXED_SIZE: u8 = 0x04;
/// Exactly one item; the count field is omitted from the record.
pub const FLAG_SINGLE_ITEM: u8 = 0x08;

pub const FLAG_KNOWN_MASK: u8 = FLAG_VALID | FLAG_MINI_DATA | FLAG_FIXED_SIZE | FLAG_SINGLE_ITEM;

/// Names carry a one-byte length prefix on the wire.
pub const MAX_NAME_LENGTH: usize = 255;

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_table() {
        assert_eq!(fixed_width(TYPE_BOOL), Some(1));
        assert_eq!(fixed_width(TYPE_INT16), Some(2));
        assert_eq!(fixed_width(TYPE_INT32), Some(4));
        assert_eq!(fixed_width(TYPE_FLOAT), Some(4));
        assert_eq!(fixed_width(TYPE_INT64), Some(8));
        assert_eq!(fixed_width(TYPE_DOUBLE), Some(8));
        assert_eq!(fixed_width(TYPE_POINT), Some(8));
        assert_eq!(fixed_width(TYPE_RECT), Some(16));
        assert_eq!(fixed_width(TYPE_STRING), None);
        assert_eq!(fixed_width(TYPE_RAW), None);
        assert_eq!(fixed_width(TYPE_ANY), None);
    }

    #[test]
    fn test_type_codes_distinct() {
        let codes = [
            TYPE_BOOL, TYPE_INT8, TYPE_INT16, TYPE_INT32, TYPE_INT64, TYPE_UINT8, TYPE_UINT16,
            TYPE_UINT32, TYPE_UINT64, TYPE_FLOAT, TYPE_DOUBLE, TYPE_POINT, TYPE_RECT, TYPE_STRING,
            TYPE_RAW, TYPE_MESSAGE, TYPE_ANY,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_type_name_printable() {
        assert_eq!(type_name(TYPE_INT32), "LONG");
        assert_eq!(type_name(TYPE_STRING), "CSTR");
        assert_eq!(type_name(0x0000_0001), "0x00000001");
    }
}
