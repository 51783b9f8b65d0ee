//! The module tree.
//!
//! A WebAssembly module is held as a tree of three node shapes:
//!
//! - [`Atom`]: a leaf scalar (integer, float, LEB128 value, raw bytes, type)
//! - [`Cell`]: a structural composite (section, vector, entry, segment, ...)
//! - [`Instr`]: one instruction with its opcode, immediates and operands
//!
//! Every node knows its exact encoded byte length from the moment it is
//! built. Parents sum their children at construction, so size prefixes are
//! known before emission and the emitter never back-patches.
//!
//! Trees are immutable once built. Sharing a subtree means cloning it.

pub mod atom;
pub mod types;

use std::fmt;

pub use atom::{Atom, AtomKind};
pub use types::{BlockType, ExternalKind, HeapType, RefType, SectionId, StorageType, ValType};

use crate::emit::Emitter;
use crate::instruction::Instr;

/// Structural role of a [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Module,
    Section(SectionId),
    /// A counted vector: `[count, item*]`.
    Vec,
    /// A length-prefixed byte string: `[len, bytes]`.
    Str,
    ImportEntry,
    ExportEntry,
    FuncType,
    StructType,
    ArrayType,
    FieldType,
    SubType,
    RecType,
    Limits,
    TableType,
    /// A table with an explicit initializer expression.
    TableDecl,
    GlobalType,
    GlobalVariable,
    TagType,
    InitExpr,
    ElemSegment,
    DataSegment,
    FunctionBody,
    LocalEntry,
    /// Memory access immediate; remembers the natural alignment of its
    /// instruction for the printer.
    MemArg {
        natural_align: u8,
    },
    CatchClause,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Module => "module",
            CellKind::Section(id) => return write!(f, "{id}_section"),
            CellKind::Vec => "vec",
            CellKind::Str => "str",
            CellKind::ImportEntry => "import_entry",
            CellKind::ExportEntry => "export_entry",
            CellKind::FuncType => "func_type",
            CellKind::StructType => "struct_type",
            CellKind::ArrayType => "array_type",
            CellKind::FieldType => "field_type",
            CellKind::SubType => "sub_type",
            CellKind::RecType => "rec_type",
            CellKind::Limits => "limits",
            CellKind::TableType => "table_type",
            CellKind::TableDecl => "table_decl",
            CellKind::GlobalType => "global_type",
            CellKind::GlobalVariable => "global_variable",
            CellKind::TagType => "tag_type",
            CellKind::InitExpr => "init_expr",
            CellKind::ElemSegment => "elem_segment",
            CellKind::DataSegment => "data_segment",
            CellKind::FunctionBody => "function_body",
            CellKind::LocalEntry => "local_entry",
            CellKind::MemArg { .. } => "mem_arg",
            CellKind::CatchClause => "catch_clause",
        };
        f.write_str(name)
    }
}

/// Kind of any node, used in diagnostics and for structural checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Atom(AtomKind),
    Cell(CellKind),
    Instr,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Atom(k) => write!(f, "{k}"),
            NodeKind::Cell(k) => write!(f, "{k}"),
            NodeKind::Instr => f.write_str("instruction"),
        }
    }
}

/// A structural composite node.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    kind: CellKind,
    children: Vec<Node>,
    len: u32,
}

impl Cell {
    /// Builds a cell, summing the byte lengths of its children.
    ///
    /// Only the builders create cells, which is how the children layout of
    /// each kind stays well formed.
    pub(crate) fn new(kind: CellKind, children: Vec<Node>) -> Cell {
        let len = children.iter().map(Node::byte_len).sum();
        Cell { kind, children, len }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn byte_len(&self) -> u32 {
        self.len
    }

    /// The section id, when this cell is a section.
    pub fn section_id(&self) -> Option<SectionId> {
        match self.kind {
            CellKind::Section(id) => Some(id),
            _ => None,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        for child in &self.children {
            child.emit(e);
        }
    }
}

/// Any node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Atom(Atom),
    Cell(Cell),
    Instr(Instr),
}

impl Node {
    /// Exact number of bytes this node encodes to.
    pub fn byte_len(&self) -> u32 {
        match self {
            Node::Atom(a) => a.byte_len(),
            Node::Cell(c) => c.byte_len(),
            Node::Instr(i) => i.byte_len(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Atom(a) => NodeKind::Atom(a.kind()),
            Node::Cell(c) => NodeKind::Cell(c.kind()),
            Node::Instr(_) => NodeKind::Instr,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        match self {
            Node::Atom(a) => a.emit(e),
            Node::Cell(c) => c.emit(e),
            Node::Instr(i) => i.emit(e),
        }
    }

    /// Encodes this node on its own.
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::emit::emit(self)
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Node::Cell(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_instr(&self) -> Option<&Instr> {
        match self {
            Node::Instr(i) => Some(i),
            _ => None,
        }
    }

    /// Whether this is a cell of the given kind.
    pub fn is_cell(&self, kind: CellKind) -> bool {
        matches!(self, Node::Cell(c) if c.kind == kind)
    }
}

impl From<Atom> for Node {
    fn from(a: Atom) -> Self {
        Node::Atom(a)
    }
}

impl From<Cell> for Node {
    fn from(c: Cell) -> Self {
        Node::Cell(c)
    }
}

impl From<Instr> for Node {
    fn from(i: Instr) -> Self {
        Node::Instr(i)
    }
}
