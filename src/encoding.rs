//! Binary encoding primitives for WebAssembly values.
//!
//! Provides the binary format constants shared by the builders and the
//! printer, and the LEB128 encoder used by every variable-length atom.
//!
//! LEB128 encodings are computed once into a fixed inline buffer ([`Leb128`])
//! so atoms can report their exact byte length before anything is emitted.

// ---------------------------------------------------------------------------
// WebAssembly binary format constants
// ---------------------------------------------------------------------------

/// `\0asm`, little-endian.
pub const MAGIC: u32 = 0x6d73_6100;
pub const VERSION: u32 = 1;

// Section IDs
pub const SECTION_CUSTOM: u8 = 0;
pub const SECTION_TYPE: u8 = 1;
pub const SECTION_IMPORT: u8 = 2;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_TABLE: u8 = 4;
pub const SECTION_MEMORY: u8 = 5;
pub const SECTION_GLOBAL: u8 = 6;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_START: u8 = 8;
pub const SECTION_ELEMENT: u8 = 9;
pub const SECTION_CODE: u8 = 10;
pub const SECTION_DATA: u8 = 11;
pub const SECTION_DATA_COUNT: u8 = 12;
pub const SECTION_TAG: u8 = 13;

// Number and vector types
pub const TYPE_I32: u8 = 0x7f;
pub const TYPE_I64: u8 = 0x7e;
pub const TYPE_F32: u8 = 0x7d;
pub const TYPE_F64: u8 = 0x7c;
pub const TYPE_V128: u8 = 0x7b;

// Packed storage types
pub const TYPE_I8: u8 = 0x78;
pub const TYPE_I16: u8 = 0x77;

// Abstract heap types (also the nullable reference shorthands)
pub const HEAP_NOEXN: u8 = 0x74;
pub const HEAP_NOFUNC: u8 = 0x73;
pub const HEAP_NOEXTERN: u8 = 0x72;
pub const HEAP_NONE: u8 = 0x71;
pub const HEAP_FUNC: u8 = 0x70;
pub const HEAP_EXTERN: u8 = 0x6f;
pub const HEAP_ANY: u8 = 0x6e;
pub const HEAP_EQ: u8 = 0x6d;
pub const HEAP_I31: u8 = 0x6c;
pub const HEAP_STRUCT: u8 = 0x6b;
pub const HEAP_ARRAY: u8 = 0x6a;
pub const HEAP_EXN: u8 = 0x69;

// Reference type constructors
pub const TYPE_REF: u8 = 0x64;
pub const TYPE_REF_NULL: u8 = 0x63;

// Composite and recursive type constructors
pub const TYPE_FUNC: u8 = 0x60;
pub const TYPE_STRUCT: u8 = 0x5f;
pub const TYPE_ARRAY: u8 = 0x5e;
pub const TYPE_SUB: u8 = 0x50;
pub const TYPE_SUB_FINAL: u8 = 0x4f;
pub const TYPE_REC: u8 = 0x4e;

// Import/export descriptor kinds
pub const DESC_FUNC: u8 = 0x00;
pub const DESC_TABLE: u8 = 0x01;
pub const DESC_MEMORY: u8 = 0x02;
pub const DESC_GLOBAL: u8 = 0x03;
pub const DESC_TAG: u8 = 0x04;

// Limits flags
pub const LIMITS_HAS_MAX: u8 = 0x01;
pub const LIMITS_SHARED: u8 = 0x02;
pub const LIMITS_64: u8 = 0x04;

// Table declaration with an explicit initializer: 0x40 0x00 tabletype expr
pub const TABLE_WITH_INIT: u8 = 0x40;

// Tag attribute (exception)
pub const TAG_ATTRIBUTE_EXCEPTION: u8 = 0x00;

// Element segment elemkind
pub const ELEMKIND_FUNCREF: u8 = 0x00;

// Element segment flags
// 3-bit encoding: bit 0 = non-active mode, bit 1 = explicit table (active) or
// declarative (non-active), bit 2 = expressions
pub const ELEM_PASSIVE_BIT: u32 = 0x01;
pub const ELEM_EXPLICIT_BIT: u32 = 0x02;
pub const ELEM_EXPRS_BIT: u32 = 0x04;

// Data segment flags
pub const DATA_ACTIVE: u32 = 0;
pub const DATA_PASSIVE: u32 = 1;
pub const DATA_ACTIVE_EXPLICIT: u32 = 2;

// Block type: empty
pub const BLOCK_TYPE_EMPTY: u8 = 0x40;

// Opcode space prefixes
pub const PREFIX_GC: u8 = 0xfb;
pub const PREFIX_MISC: u8 = 0xfc;
pub const PREFIX_SIMD: u8 = 0xfd;
pub const PREFIX_ATOMIC: u8 = 0xfe;

/// Set in a memarg's alignment field when an explicit memory index follows.
pub const MEMARG_HAS_MEMORY: u32 = 0x40;

// ---------------------------------------------------------------------------
// LEB128
// ---------------------------------------------------------------------------

/// Maximum length of a 64-bit LEB128 encoding.
pub const LEB128_MAX_LEN: usize = 10;

/// A precomputed LEB128 encoding held inline.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Leb128 {
    buf: [u8; LEB128_MAX_LEN],
    len: u8,
}

impl Leb128 {
    /// Encodes an unsigned value.
    pub fn unsigned(mut value: u64) -> Leb128 {
        let mut out = Leb128 {
            buf: [0; LEB128_MAX_LEN],
            len: 0,
        };
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                break;
            }
            byte |= 0x80;
            out.push(byte);
        }
        out
    }

    /// Encodes a signed value.
    pub fn signed(mut value: i64) -> Leb128 {
        let mut out = Leb128 {
            buf: [0; LEB128_MAX_LEN],
            len: 0,
        };
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if (value == 0 && (byte & 0x40) == 0) || (value == -1 && (byte & 0x40) != 0) {
                out.push(byte);
                break;
            }
            byte |= 0x80;
            out.push(byte);
        }
        out
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.len as usize] = byte;
        self.len += 1;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    pub fn len(&self) -> u32 {
        self.len as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for Leb128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Leb128({})", hex::encode(self.as_bytes()))
    }
}

/// Length in bytes of the unsigned LEB128 encoding of `value`.
pub fn unsigned_len(value: u64) -> u32 {
    let bits = 64 - value.leading_zeros();
    bits.max(1).div_ceil(7)
}

/// Length in bytes of the signed LEB128 encoding of `value`.
pub fn signed_len(value: i64) -> u32 {
    // one extra bit for the sign
    let bits = if value < 0 {
        65 - value.leading_ones()
    } else {
        65 - value.leading_zeros()
    };
    bits.div_ceil(7)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
