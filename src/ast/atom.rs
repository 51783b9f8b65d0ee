//! Leaf nodes.
//!
//! An atom holds one decoded scalar. Variable-length integer atoms carry
//! their LEB128 encoding, computed once here, so their byte length is known
//! before emission. Fixed-width atoms write their value directly.

use std::fmt;

use once_cell::sync::Lazy;

use super::types::{BlockType, ExternalKind, HeapType, StorageType, ValType};
use crate::emit::Emitter;
use crate::encoding::Leb128;
use crate::error::BuildError;

/// The kind tag of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Vec128,
    VarUint1,
    VarUint7,
    VarUint32,
    VarUint64,
    VarInt7,
    VarInt32,
    VarInt64,
    Bytes,
    Type,
    HeapType,
    StorageType,
    BlockType,
    ExternalKind,
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AtomKind::Uint8 => "uint8",
            AtomKind::Uint16 => "uint16",
            AtomKind::Uint32 => "uint32",
            AtomKind::Uint64 => "uint64",
            AtomKind::Float32 => "float32",
            AtomKind::Float64 => "float64",
            AtomKind::Vec128 => "v128",
            AtomKind::VarUint1 => "varuint1",
            AtomKind::VarUint7 => "varuint7",
            AtomKind::VarUint32 => "varuint32",
            AtomKind::VarUint64 => "varuint64",
            AtomKind::VarInt7 => "varint7",
            AtomKind::VarInt32 => "varint32",
            AtomKind::VarInt64 => "varint64",
            AtomKind::Bytes => "bytes",
            AtomKind::Type => "type",
            AtomKind::HeapType => "heap_type",
            AtomKind::StorageType => "storage_type",
            AtomKind::BlockType => "block_type",
            AtomKind::ExternalKind => "external_kind",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Repr {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    V128([u8; 16]),
    VarUint1(bool),
    VarUint7(u8),
    VarUint32(u32, Leb128),
    VarUint64(u64, Leb128),
    VarInt7(i8),
    VarInt32(i32, Leb128),
    VarInt64(i64, Leb128),
    Bytes(Vec<u8>),
    Type(ValType),
    Heap(HeapType),
    Storage(StorageType),
    Block(BlockType),
    External(ExternalKind),
}

/// A leaf node. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub(crate) repr: Repr,
}

const CACHED: u32 = 16;

static SMALL_VARUINT7: Lazy<Vec<Atom>> = Lazy::new(|| (0..CACHED as u8).map(|v| Atom::new(Repr::VarUint7(v))).collect());

static SMALL_VARUINT32: Lazy<Vec<Atom>> = Lazy::new(|| {
    (0..CACHED)
        .map(|v| Atom::new(Repr::VarUint32(v, Leb128::unsigned(v as u64))))
        .collect()
});

static SMALL_VARINT32: Lazy<Vec<Atom>> = Lazy::new(|| {
    (0..CACHED as i32)
        .map(|v| Atom::new(Repr::VarInt32(v, Leb128::signed(v as i64))))
        .collect()
});

static SMALL_VARINT64: Lazy<Vec<Atom>> = Lazy::new(|| {
    (0..CACHED as i64)
        .map(|v| Atom::new(Repr::VarInt64(v, Leb128::signed(v))))
        .collect()
});

impl Atom {
    fn new(repr: Repr) -> Atom {
        Atom { repr }
    }

    // Fixed width ---------------------------------------------------------------

    pub fn uint8(v: u8) -> Atom {
        Atom::new(Repr::U8(v))
    }

    pub fn uint16(v: u16) -> Atom {
        Atom::new(Repr::U16(v))
    }

    pub fn uint32(v: u32) -> Atom {
        Atom::new(Repr::U32(v))
    }

    pub fn uint64(v: u64) -> Atom {
        Atom::new(Repr::U64(v))
    }

    pub fn float32(v: f32) -> Atom {
        Atom::new(Repr::F32(v))
    }

    pub fn float64(v: f64) -> Atom {
        Atom::new(Repr::F64(v))
    }

    pub fn v128(v: [u8; 16]) -> Atom {
        Atom::new(Repr::V128(v))
    }

    // LEB128 ----------------------------------------------------------------------

    pub fn varuint1(v: bool) -> Atom {
        Atom::new(Repr::VarUint1(v))
    }

    /// Fails when `v` does not fit in 7 bits.
    pub fn varuint7(v: u8) -> Result<Atom, BuildError> {
        if v > 0x7f {
            return Err(BuildError::out_of_range("varuint7", v));
        }
        Ok(match SMALL_VARUINT7.get(v as usize) {
            Some(cached) => cached.clone(),
            None => Atom::new(Repr::VarUint7(v)),
        })
    }

    pub fn varuint32(v: u32) -> Atom {
        match SMALL_VARUINT32.get(v as usize) {
            Some(cached) => cached.clone(),
            None => Atom::new(Repr::VarUint32(v, Leb128::unsigned(v as u64))),
        }
    }

    /// Checked form of [`Atom::varuint32`] for wider inputs.
    pub fn try_varuint32(v: u64) -> Result<Atom, BuildError> {
        u32::try_from(v)
            .map(Atom::varuint32)
            .map_err(|_| BuildError::out_of_range("varuint32", v))
    }

    pub fn varuint64(v: u64) -> Atom {
        Atom::new(Repr::VarUint64(v, Leb128::unsigned(v)))
    }

    /// Fails when `v` is outside -64..=63.
    pub fn varint7(v: i8) -> Result<Atom, BuildError> {
        if !(-64..=63).contains(&v) {
            return Err(BuildError::out_of_range("varint7", v));
        }
        Ok(Atom::new(Repr::VarInt7(v)))
    }

    pub fn varint32(v: i32) -> Atom {
        match usize::try_from(v).ok().and_then(|i| SMALL_VARINT32.get(i)) {
            Some(cached) => cached.clone(),
            None => Atom::new(Repr::VarInt32(v, Leb128::signed(v as i64))),
        }
    }

    /// Checked form of [`Atom::varint32`] for wider inputs.
    pub fn try_varint32(v: i64) -> Result<Atom, BuildError> {
        i32::try_from(v)
            .map(Atom::varint32)
            .map_err(|_| BuildError::out_of_range("varint32", v))
    }

    pub fn varint64(v: i64) -> Atom {
        match usize::try_from(v).ok().and_then(|i| SMALL_VARINT64.get(i)) {
            Some(cached) => cached.clone(),
            None => Atom::new(Repr::VarInt64(v, Leb128::signed(v))),
        }
    }

    /// Checked form of [`Atom::varint64`]: fails outside ±2^63.
    pub fn try_varint64(v: i128) -> Result<Atom, BuildError> {
        i64::try_from(v)
            .map(Atom::varint64)
            .map_err(|_| BuildError::out_of_range("varint64", v))
    }

    // Payloads and types ---------------------------------------------------------

    pub fn bytes(v: impl Into<Vec<u8>>) -> Atom {
        Atom::new(Repr::Bytes(v.into()))
    }

    pub fn val_type(t: ValType) -> Atom {
        Atom::new(Repr::Type(t))
    }

    pub fn heap_type(t: HeapType) -> Atom {
        Atom::new(Repr::Heap(t))
    }

    pub fn storage_type(t: StorageType) -> Atom {
        Atom::new(Repr::Storage(t))
    }

    pub fn block_type(t: BlockType) -> Atom {
        Atom::new(Repr::Block(t))
    }

    pub fn external_kind(k: ExternalKind) -> Atom {
        Atom::new(Repr::External(k))
    }

    // Inspection ----------------------------------------------------------------

    pub fn kind(&self) -> AtomKind {
        match &self.repr {
            Repr::U8(_) => AtomKind::Uint8,
            Repr::U16(_) => AtomKind::Uint16,
            Repr::U32(_) => AtomKind::Uint32,
            Repr::U64(_) => AtomKind::Uint64,
            Repr::F32(_) => AtomKind::Float32,
            Repr::F64(_) => AtomKind::Float64,
            Repr::V128(_) => AtomKind::Vec128,
            Repr::VarUint1(_) => AtomKind::VarUint1,
            Repr::VarUint7(_) => AtomKind::VarUint7,
            Repr::VarUint32(..) => AtomKind::VarUint32,
            Repr::VarUint64(..) => AtomKind::VarUint64,
            Repr::VarInt7(_) => AtomKind::VarInt7,
            Repr::VarInt32(..) => AtomKind::VarInt32,
            Repr::VarInt64(..) => AtomKind::VarInt64,
            Repr::Bytes(_) => AtomKind::Bytes,
            Repr::Type(_) => AtomKind::Type,
            Repr::Heap(_) => AtomKind::HeapType,
            Repr::Storage(_) => AtomKind::StorageType,
            Repr::Block(_) => AtomKind::BlockType,
            Repr::External(_) => AtomKind::ExternalKind,
        }
    }

    /// The value of any unsigned integer atom.
    pub fn as_u64(&self) -> Option<u64> {
        match &self.repr {
            Repr::U8(v) => Some(*v as u64),
            Repr::U16(v) => Some(*v as u64),
            Repr::U32(v) => Some(*v as u64),
            Repr::U64(v) => Some(*v),
            Repr::VarUint1(v) => Some(*v as u64),
            Repr::VarUint7(v) => Some(*v as u64),
            Repr::VarUint32(v, _) => Some(*v as u64),
            Repr::VarUint64(v, _) => Some(*v),
            _ => None,
        }
    }

    /// Like [`Atom::as_u64`], for values known to fit in 32 bits.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|v| u32::try_from(v).ok())
    }

    /// The value of any signed integer atom.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.repr {
            Repr::VarInt7(v) => Some(*v as i64),
            Repr::VarInt32(v, _) => Some(*v as i64),
            Repr::VarInt64(v, _) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.repr {
            Repr::Bytes(b) => Some(b),
            Repr::V128(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_val_type(&self) -> Option<ValType> {
        match &self.repr {
            Repr::Type(t) => Some(*t),
            _ => None,
        }
    }

    /// The exact number of bytes [`Atom::emit`] writes.
    pub fn byte_len(&self) -> u32 {
        match &self.repr {
            Repr::U8(_) | Repr::VarUint1(_) | Repr::VarUint7(_) | Repr::VarInt7(_) => 1,
            Repr::U16(_) => 2,
            Repr::U32(_) | Repr::F32(_) => 4,
            Repr::U64(_) | Repr::F64(_) => 8,
            Repr::V128(_) => 16,
            Repr::VarUint32(_, leb) | Repr::VarUint64(_, leb) | Repr::VarInt32(_, leb) | Repr::VarInt64(_, leb) => {
                leb.len()
            }
            Repr::Bytes(b) => b.len() as u32,
            Repr::Type(t) => t.byte_len(),
            Repr::Heap(t) => t.byte_len(),
            Repr::Storage(t) => t.byte_len(),
            Repr::Block(t) => t.byte_len(),
            Repr::External(_) => 1,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match &self.repr {
            Repr::U8(v) => e.write_u8(*v),
            Repr::U16(v) => e.write_u16(*v),
            Repr::U32(v) => e.write_u32(*v),
            Repr::U64(v) => e.write_u64(*v),
            Repr::F32(v) => e.write_f32(*v),
            Repr::F64(v) => e.write_f64(*v),
            Repr::V128(v) => e.write_bytes(v),
            Repr::VarUint1(v) => e.write_u8(*v as u8),
            Repr::VarUint7(v) => e.write_u8(*v),
            Repr::VarInt7(v) => e.write_u8((*v as u8) & 0x7f),
            Repr::VarUint32(_, leb) | Repr::VarUint64(_, leb) | Repr::VarInt32(_, leb) | Repr::VarInt64(_, leb) => {
                e.write_bytes(leb.as_bytes())
            }
            Repr::Bytes(b) => e.write_bytes(b),
            Repr::Type(t) => t.emit(e),
            Repr::Heap(t) => t.emit(e),
            Repr::Storage(t) => t.emit(e),
            Repr::Block(t) => t.emit(e),
            Repr::External(k) => e.write_u8(k.code()),
        }
    }
}
