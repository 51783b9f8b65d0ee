//! Value, heap, reference and storage types.
//!
//! These are the shared immutable constants the builders stamp into the tree
//! as type atoms. Each type knows its own binary encoding and its text form.

use std::fmt;

use serde::Serialize;

use crate::emit::Emitter;
use crate::encoding::{self, Leb128};

/// A heap type: abstract, or a concrete index into the type section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapType {
    Func,
    Extern,
    Any,
    Eq,
    I31,
    Struct,
    Array,
    Exn,
    None,
    NoFunc,
    NoExtern,
    NoExn,
    Concrete(u32),
}

impl HeapType {
    /// The single-byte code of an abstract heap type.
    pub fn abstract_code(&self) -> Option<u8> {
        use HeapType::*;
        Some(match self {
            Func => encoding::HEAP_FUNC,
            Extern => encoding::HEAP_EXTERN,
            Any => encoding::HEAP_ANY,
            Eq => encoding::HEAP_EQ,
            I31 => encoding::HEAP_I31,
            Struct => encoding::HEAP_STRUCT,
            Array => encoding::HEAP_ARRAY,
            Exn => encoding::HEAP_EXN,
            None => encoding::HEAP_NONE,
            NoFunc => encoding::HEAP_NOFUNC,
            NoExtern => encoding::HEAP_NOEXTERN,
            NoExn => encoding::HEAP_NOEXN,
            Concrete(_) => return Option::None,
        })
    }

    /// Concrete indices are encoded as a signed 33-bit LEB128.
    fn concrete_leb(index: u32) -> Leb128 {
        Leb128::signed(index as i64)
    }

    pub fn byte_len(&self) -> u32 {
        match self {
            HeapType::Concrete(index) => Self::concrete_leb(*index).len(),
            _ => 1,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match self {
            HeapType::Concrete(index) => e.write_bytes(Self::concrete_leb(*index).as_bytes()),
            abs => e.write_u8(abs.abstract_code().unwrap_or_default()),
        }
    }
}

impl fmt::Display for HeapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeapType::Func => "func",
            HeapType::Extern => "extern",
            HeapType::Any => "any",
            HeapType::Eq => "eq",
            HeapType::I31 => "i31",
            HeapType::Struct => "struct",
            HeapType::Array => "array",
            HeapType::Exn => "exn",
            HeapType::None => "none",
            HeapType::NoFunc => "nofunc",
            HeapType::NoExtern => "noextern",
            HeapType::NoExn => "noexn",
            HeapType::Concrete(index) => return write!(f, "{index}"),
        };
        f.write_str(name)
    }
}

/// A reference type: nullability plus a heap type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefType {
    pub nullable: bool,
    pub heap: HeapType,
}

impl RefType {
    pub const FUNCREF: RefType = RefType::null(HeapType::Func);
    pub const EXTERNREF: RefType = RefType::null(HeapType::Extern);
    pub const ANYREF: RefType = RefType::null(HeapType::Any);
    pub const EQREF: RefType = RefType::null(HeapType::Eq);
    pub const I31REF: RefType = RefType::null(HeapType::I31);
    pub const STRUCTREF: RefType = RefType::null(HeapType::Struct);
    pub const ARRAYREF: RefType = RefType::null(HeapType::Array);
    pub const EXNREF: RefType = RefType::null(HeapType::Exn);

    pub const fn null(heap: HeapType) -> RefType {
        RefType { nullable: true, heap }
    }

    pub const fn non_null(heap: HeapType) -> RefType {
        RefType { nullable: false, heap }
    }

    /// `(ref $index)`: the static type of a freshly allocated GC object.
    pub const fn to_index(index: u32) -> RefType {
        RefType::non_null(HeapType::Concrete(index))
    }

    /// Nullable abstract references have a one-byte shorthand.
    fn shorthand(&self) -> Option<u8> {
        if self.nullable { self.heap.abstract_code() } else { None }
    }

    pub fn byte_len(&self) -> u32 {
        match self.shorthand() {
            Some(_) => 1,
            None => 1 + self.heap.byte_len(),
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match self.shorthand() {
            Some(code) => e.write_u8(code),
            None => {
                e.write_u8(if self.nullable { encoding::TYPE_REF_NULL } else { encoding::TYPE_REF });
                self.heap.emit(e);
            }
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match (self.nullable, self.heap) {
            (true, HeapType::Func) => "funcref",
            (true, HeapType::Extern) => "externref",
            (true, HeapType::Any) => "anyref",
            (true, HeapType::Eq) => "eqref",
            (true, HeapType::I31) => "i31ref",
            (true, HeapType::Struct) => "structref",
            (true, HeapType::Array) => "arrayref",
            (true, HeapType::Exn) => "exnref",
            (true, HeapType::None) => "nullref",
            (true, HeapType::NoFunc) => "nullfuncref",
            (true, HeapType::NoExtern) => "nullexternref",
            (true, HeapType::NoExn) => "nullexnref",
            (true, heap) => return write!(f, "(ref null {heap})"),
            (false, heap) => return write!(f, "(ref {heap})"),
        };
        f.write_str(short)
    }
}

/// A value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValType {
    I32,
    I64,
    F32,
    F64,
    V128,
    Ref(RefType),
}

impl ValType {
    pub const FUNCREF: ValType = ValType::Ref(RefType::FUNCREF);
    pub const EXTERNREF: ValType = ValType::Ref(RefType::EXTERNREF);
    pub const ANYREF: ValType = ValType::Ref(RefType::ANYREF);
    pub const EXNREF: ValType = ValType::Ref(RefType::EXNREF);
    pub const I31REF: ValType = ValType::Ref(RefType::I31REF);

    pub fn byte_len(&self) -> u32 {
        match self {
            ValType::Ref(rt) => rt.byte_len(),
            _ => 1,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match self {
            ValType::I32 => e.write_u8(encoding::TYPE_I32),
            ValType::I64 => e.write_u8(encoding::TYPE_I64),
            ValType::F32 => e.write_u8(encoding::TYPE_F32),
            ValType::F64 => e.write_u8(encoding::TYPE_F64),
            ValType::V128 => e.write_u8(encoding::TYPE_V128),
            ValType::Ref(rt) => rt.emit(e),
        }
    }
}

impl From<RefType> for ValType {
    fn from(rt: RefType) -> Self {
        ValType::Ref(rt)
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValType::I32 => f.write_str("i32"),
            ValType::I64 => f.write_str("i64"),
            ValType::F32 => f.write_str("f32"),
            ValType::F64 => f.write_str("f64"),
            ValType::V128 => f.write_str("v128"),
            ValType::Ref(rt) => write!(f, "{rt}"),
        }
    }
}

/// Storage type of a struct or array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    I8,
    I16,
    Val(ValType),
}

impl StorageType {
    pub fn byte_len(&self) -> u32 {
        match self {
            StorageType::Val(vt) => vt.byte_len(),
            _ => 1,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match self {
            StorageType::I8 => e.write_u8(encoding::TYPE_I8),
            StorageType::I16 => e.write_u8(encoding::TYPE_I16),
            StorageType::Val(vt) => vt.emit(e),
        }
    }
}

impl From<ValType> for StorageType {
    fn from(vt: ValType) -> Self {
        StorageType::Val(vt)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::I8 => f.write_str("i8"),
            StorageType::I16 => f.write_str("i16"),
            StorageType::Val(vt) => write!(f, "{vt}"),
        }
    }
}

/// Block type immediate of structured control instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Empty,
    Value(ValType),
    /// Index of a function type declaring params and results.
    Index(u32),
}

impl BlockType {
    pub fn byte_len(&self) -> u32 {
        match self {
            BlockType::Empty => 1,
            BlockType::Value(vt) => vt.byte_len(),
            BlockType::Index(index) => Leb128::signed(*index as i64).len(),
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match self {
            BlockType::Empty => e.write_u8(encoding::BLOCK_TYPE_EMPTY),
            BlockType::Value(vt) => vt.emit(e),
            BlockType::Index(index) => e.write_bytes(Leb128::signed(*index as i64).as_bytes()),
        }
    }
}

/// External kind of an import or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Func,
    Table,
    Memory,
    Global,
    Tag,
}

impl ExternalKind {
    pub fn code(&self) -> u8 {
        match self {
            ExternalKind::Func => encoding::DESC_FUNC,
            ExternalKind::Table => encoding::DESC_TABLE,
            ExternalKind::Memory => encoding::DESC_MEMORY,
            ExternalKind::Global => encoding::DESC_GLOBAL,
            ExternalKind::Tag => encoding::DESC_TAG,
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExternalKind::Func => "func",
            ExternalKind::Table => "table",
            ExternalKind::Memory => "memory",
            ExternalKind::Global => "global",
            ExternalKind::Tag => "tag",
        })
    }
}

/// Section identifiers, in numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Custom,
    Type,
    Import,
    Function,
    Table,
    Memory,
    Global,
    Export,
    Start,
    Element,
    Code,
    Data,
    DataCount,
    Tag,
}

impl SectionId {
    pub fn code(&self) -> u8 {
        match self {
            SectionId::Custom => encoding::SECTION_CUSTOM,
            SectionId::Type => encoding::SECTION_TYPE,
            SectionId::Import => encoding::SECTION_IMPORT,
            SectionId::Function => encoding::SECTION_FUNCTION,
            SectionId::Table => encoding::SECTION_TABLE,
            SectionId::Memory => encoding::SECTION_MEMORY,
            SectionId::Global => encoding::SECTION_GLOBAL,
            SectionId::Export => encoding::SECTION_EXPORT,
            SectionId::Start => encoding::SECTION_START,
            SectionId::Element => encoding::SECTION_ELEMENT,
            SectionId::Code => encoding::SECTION_CODE,
            SectionId::Data => encoding::SECTION_DATA,
            SectionId::DataCount => encoding::SECTION_DATA_COUNT,
            SectionId::Tag => encoding::SECTION_TAG,
        }
    }

    /// Position in the mandatory wire order. The data count section sits
    /// between element and code; the tag section between memory and global.
    pub fn wire_order(&self) -> u8 {
        match self {
            SectionId::Custom => 0,
            SectionId::Type => 1,
            SectionId::Import => 2,
            SectionId::Function => 3,
            SectionId::Table => 4,
            SectionId::Memory => 5,
            SectionId::Tag => 6,
            SectionId::Global => 7,
            SectionId::Export => 8,
            SectionId::Start => 9,
            SectionId::Element => 10,
            SectionId::DataCount => 11,
            SectionId::Code => 12,
            SectionId::Data => 13,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SectionId::Custom => "custom",
            SectionId::Type => "type",
            SectionId::Import => "import",
            SectionId::Function => "function",
            SectionId::Table => "table",
            SectionId::Memory => "memory",
            SectionId::Global => "global",
            SectionId::Export => "export",
            SectionId::Start => "start",
            SectionId::Element => "element",
            SectionId::Code => "code",
            SectionId::Data => "data",
            SectionId::DataCount => "datacount",
            SectionId::Tag => "tag",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::emit_with;

    fn bytes_of(len: u32, f: impl FnOnce(&mut Emitter)) -> Vec<u8> {
        emit_with(len, f)
    }

    #[test]
    fn shorthand_reference_types_are_one_byte() {
        let t = ValType::FUNCREF;
        assert_eq!(t.byte_len(), 1);
        assert_eq!(bytes_of(t.byte_len(), |e| t.emit(e)), vec![0x70]);
        assert_eq!(t.to_string(), "funcref");
    }

    #[test]
    fn non_null_concrete_reference() {
        let t = ValType::Ref(RefType::to_index(3));
        assert_eq!(bytes_of(t.byte_len(), |e| t.emit(e)), vec![0x64, 0x03]);
        assert_eq!(t.to_string(), "(ref 3)");
    }

    #[test]
    fn nullable_concrete_reference_uses_s33() {
        // 64 needs two bytes as a signed LEB128
        let t = ValType::Ref(RefType::null(HeapType::Concrete(64)));
        assert_eq!(t.byte_len(), 3);
        assert_eq!(bytes_of(t.byte_len(), |e| t.emit(e)), vec![0x63, 0xc0, 0x00]);
        assert_eq!(t.to_string(), "(ref null 64)");
    }

    #[test]
    fn non_null_abstract_reference() {
        let t = RefType::non_null(HeapType::Func);
        assert_eq!(bytes_of(t.byte_len(), |e| t.emit(e)), vec![0x64, 0x70]);
        assert_eq!(t.to_string(), "(ref func)");
    }

    #[test]
    fn block_type_index_is_signed() {
        let bt = BlockType::Index(1);
        assert_eq!(bytes_of(bt.byte_len(), |e| bt.emit(e)), vec![0x01]);
        let bt = BlockType::Empty;
        assert_eq!(bytes_of(bt.byte_len(), |e| bt.emit(e)), vec![0x40]);
    }

    #[test]
    fn wire_order_places_datacount_before_code() {
        assert!(SectionId::DataCount.wire_order() < SectionId::Code.wire_order());
        assert!(SectionId::Tag.wire_order() < SectionId::Global.wire_order());
        assert!(SectionId::Memory.wire_order() < SectionId::Tag.wire_order());
    }
}
