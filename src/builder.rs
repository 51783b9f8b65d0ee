//! Module builder.
//!
//! One constructor per section kind, plus the entries, types and segments
//! that go inside them. Sections are framed here, so their size prefixes
//! are fixed as soon as their payload exists.
//!
//! ```text
//! module  ::= magic:u32 version:u32 section*
//! section ::= id:u8 size:vu32 payload
//! vec(x)  ::= n:vu32 x^n
//! ```
//!
//! Everything that can be malformed is checked here and reported as a
//! [`BuildError`]; a node that exists is always safe to emit.

use crate::ast::{Atom, Cell, CellKind, ExternalKind, Node, RefType, SectionId, StorageType, ValType};
use crate::encoding;
use crate::error::BuildError;
use crate::instruction::{end, Instr};

// ===========================================================================
// Module and section framing
// ===========================================================================

/// Assembles a module from framed sections.
///
/// Non-custom sections may each appear once and must follow the binary
/// format order; custom sections may appear anywhere, any number of times.
pub fn module(sections: Vec<Node>) -> Result<Node, BuildError> {
    let mut last: Option<SectionId> = None;
    for node in &sections {
        let id = match node.as_cell().and_then(Cell::section_id) {
            Some(id) => id,
            None => {
                return Err(BuildError::UnexpectedNode {
                    expected: "section",
                    actual: node.kind(),
                })
            }
        };
        if id == SectionId::Custom {
            continue;
        }
        if let Some(prev) = last {
            if prev == id {
                return Err(BuildError::DuplicateSection(id));
            }
            if id.wire_order() < prev.wire_order() {
                return Err(BuildError::SectionOrder {
                    earlier: prev,
                    later: id,
                });
            }
        }
        last = Some(id);
    }
    let mut children: Vec<Node> = Vec::with_capacity(sections.len() + 2);
    children.push(Atom::uint32(encoding::MAGIC).into());
    children.push(Atom::uint32(encoding::VERSION).into());
    children.extend(sections);
    Ok(Cell::new(CellKind::Module, children).into())
}

/// Frames a payload as a section: `id size payload`.
fn section(id: SectionId, payload: Vec<Node>) -> Node {
    let size: u32 = payload.iter().map(Node::byte_len).sum();
    let mut children: Vec<Node> = Vec::with_capacity(payload.len() + 2);
    children.push(Atom::uint8(id.code()).into());
    children.push(Atom::varuint32(size).into());
    children.extend(payload);
    Cell::new(CellKind::Section(id), children).into()
}

/// A section whose payload is a counted vector of entries.
fn vec_section(id: SectionId, entries: Vec<Node>) -> Node {
    section(id, counted(entries))
}

/// `[count, items...]`, as a flat child list.
fn counted(items: Vec<Node>) -> Vec<Node> {
    let mut children: Vec<Node> = Vec::with_capacity(items.len() + 1);
    children.push(Atom::varuint32(items.len() as u32).into());
    children.extend(items);
    children
}

fn index(v: u32) -> Node {
    Atom::varuint32(v).into()
}

/// Checks that every entry is a cell of one of the accepted kinds.
fn expect_cells(entries: &[Node], accepted: &[CellKind], expected: &'static str) -> Result<(), BuildError> {
    for entry in entries {
        let ok = match entry.as_cell() {
            Some(cell) => accepted.contains(&cell.kind()),
            None => false,
        };
        if !ok {
            return Err(BuildError::UnexpectedNode {
                expected,
                actual: entry.kind(),
            });
        }
    }
    Ok(())
}

// ===========================================================================
// Strings
// ===========================================================================

/// A length-prefixed byte string.
pub fn str(bytes: impl Into<Vec<u8>>) -> Node {
    let bytes = bytes.into();
    Cell::new(
        CellKind::Str,
        vec![Atom::varuint32(bytes.len() as u32).into(), Atom::bytes(bytes).into()],
    )
    .into()
}

/// A UTF-8 name.
pub fn str_utf8(s: &str) -> Node {
    str(s.as_bytes())
}

/// Like [`str_utf8`], restricted to ASCII.
pub fn str_ascii(s: &str) -> Result<Node, BuildError> {
    if !s.is_ascii() {
        return Err(BuildError::out_of_range("ascii string", format!("{s:?}")));
    }
    Ok(str(s.as_bytes()))
}

// ===========================================================================
// Types
// ===========================================================================

/// `functype ::= 0x60 vec(valtype) vec(valtype)`
pub fn func_type(params: &[ValType], results: &[ValType]) -> Node {
    let mut children: Vec<Node> = vec![Atom::uint8(encoding::TYPE_FUNC).into()];
    children.extend(counted(params.iter().map(|t| Atom::val_type(*t).into()).collect()));
    children.extend(counted(results.iter().map(|t| Atom::val_type(*t).into()).collect()));
    Cell::new(CellKind::FuncType, children).into()
}

/// `fieldtype ::= storagetype mut:u8`
pub fn field_type(storage: StorageType, mutable: bool) -> Node {
    Cell::new(
        CellKind::FieldType,
        vec![Atom::storage_type(storage).into(), Atom::varuint1(mutable).into()],
    )
    .into()
}

/// `structtype ::= 0x5F vec(fieldtype)`
pub fn struct_type(fields: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&fields, &[CellKind::FieldType], "field type")?;
    let mut children: Vec<Node> = vec![Atom::uint8(encoding::TYPE_STRUCT).into()];
    children.extend(counted(fields));
    Ok(Cell::new(CellKind::StructType, children).into())
}

/// `arraytype ::= 0x5E fieldtype`
pub fn array_type(field: Node) -> Result<Node, BuildError> {
    expect_cells(std::slice::from_ref(&field), &[CellKind::FieldType], "field type")?;
    Ok(Cell::new(
        CellKind::ArrayType,
        vec![Atom::uint8(encoding::TYPE_ARRAY).into(), field],
    )
    .into())
}

const COMPOSITES: [CellKind; 3] = [CellKind::FuncType, CellKind::StructType, CellKind::ArrayType];

/// ```text
/// subtype ::= 0x50 vec(typeidx) comptype
///           | 0x4F vec(typeidx) comptype
///           | comptype                    (final, no supertypes)
/// ```
pub fn sub_type(is_final: bool, supers: &[u32], composite: Node) -> Result<Node, BuildError> {
    expect_cells(std::slice::from_ref(&composite), &COMPOSITES, "composite type")?;
    if is_final && supers.is_empty() {
        return Ok(Cell::new(CellKind::SubType, vec![composite]).into());
    }
    let tag = if is_final { encoding::TYPE_SUB_FINAL } else { encoding::TYPE_SUB };
    let mut children: Vec<Node> = vec![Atom::uint8(tag).into()];
    children.extend(counted(supers.iter().map(|s| index(*s)).collect()));
    children.push(composite);
    Ok(Cell::new(CellKind::SubType, children).into())
}

fn as_sub_type(node: Node) -> Result<Node, BuildError> {
    if node.is_cell(CellKind::SubType) {
        return Ok(node);
    }
    sub_type(true, &[], node)
}

/// ```text
/// rectype ::= 0x4E vec(subtype)
///           | subtype             (single member)
/// ```
///
/// Members may be sub types or bare composite types.
pub fn rec_type(members: Vec<Node>) -> Result<Node, BuildError> {
    if members.is_empty() {
        return Err(BuildError::Empty("recursive type group"));
    }
    let subs = members.into_iter().map(as_sub_type).collect::<Result<Vec<_>, _>>()?;
    if subs.len() == 1 {
        return Ok(Cell::new(CellKind::RecType, subs).into());
    }
    let mut children: Vec<Node> = vec![Atom::uint8(encoding::TYPE_REC).into()];
    children.extend(counted(subs));
    Ok(Cell::new(CellKind::RecType, children).into())
}

/// Type section. Entries may be rec groups, sub types or bare composite
/// types; each non-group entry becomes its own single-member group.
pub fn type_section(entries: Vec<Node>) -> Result<Node, BuildError> {
    let groups = entries
        .into_iter()
        .map(|entry| {
            if entry.is_cell(CellKind::RecType) {
                Ok(entry)
            } else {
                rec_type(vec![entry])
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(vec_section(SectionId::Type, groups))
}

// ===========================================================================
// Limits, tables, memories, globals, tags
// ===========================================================================

/// Resizable limits of a memory or table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub min: u64,
    pub max: Option<u64>,
    pub shared: bool,
    pub memory64: bool,
}

impl Limits {
    pub fn new(min: u64) -> Limits {
        Limits {
            min,
            ..Limits::default()
        }
    }

    pub fn max(mut self, max: u64) -> Limits {
        self.max = Some(max);
        self
    }

    pub fn shared(mut self) -> Limits {
        self.shared = true;
        self
    }

    pub fn memory64(mut self) -> Limits {
        self.memory64 = true;
        self
    }
}

/// ```text
/// limits ::= flags:u8 min:vu32 max?:vu32   (vu64 extents when 64-bit)
/// ```
pub fn limits(l: &Limits) -> Result<Node, BuildError> {
    if let Some(max) = l.max {
        if max < l.min {
            return Err(BuildError::InvalidLimits(format!("maximum {max} below minimum {}", l.min)));
        }
    }
    if l.shared && l.max.is_none() {
        return Err(BuildError::InvalidLimits("shared limits need a maximum".into()));
    }
    let extent = |v: u64| -> Result<Node, BuildError> {
        if l.memory64 {
            Ok(Atom::varuint64(v).into())
        } else {
            Ok(Atom::try_varuint32(v)?.into())
        }
    };
    let mut flags = 0;
    if l.max.is_some() {
        flags |= encoding::LIMITS_HAS_MAX;
    }
    if l.shared {
        flags |= encoding::LIMITS_SHARED;
    }
    if l.memory64 {
        flags |= encoding::LIMITS_64;
    }
    let mut children: Vec<Node> = vec![Atom::uint8(flags).into(), extent(l.min)?];
    if let Some(max) = l.max {
        children.push(extent(max)?);
    }
    Ok(Cell::new(CellKind::Limits, children).into())
}

/// `tabletype ::= reftype limits`
pub fn table_type(elem: RefType, l: &Limits) -> Result<Node, BuildError> {
    Ok(Cell::new(
        CellKind::TableType,
        vec![Atom::val_type(ValType::Ref(elem)).into(), limits(l)?],
    )
    .into())
}

/// `table ::= 0x40 0x00 tabletype expr`: a table whose slots start as
/// `init` rather than null.
pub fn table_with_init(elem: RefType, l: &Limits, init: Vec<Instr>) -> Result<Node, BuildError> {
    Ok(Cell::new(
        CellKind::TableDecl,
        vec![
            Atom::uint8(encoding::TABLE_WITH_INIT).into(),
            Atom::uint8(0).into(),
            table_type(elem, l)?,
            init_expr(init),
        ],
    )
    .into())
}

/// `globaltype ::= valtype mut:u8`
pub fn global_type(t: ValType, mutable: bool) -> Node {
    Cell::new(
        CellKind::GlobalType,
        vec![Atom::val_type(t).into(), Atom::varuint1(mutable).into()],
    )
    .into()
}

/// `global ::= globaltype expr`
pub fn global(t: ValType, mutable: bool, init: Vec<Instr>) -> Node {
    Cell::new(CellKind::GlobalVariable, vec![global_type(t, mutable), init_expr(init)]).into()
}

/// `tagtype ::= 0x00 typeidx`
pub fn tag_type(type_index: u32) -> Node {
    Cell::new(
        CellKind::TagType,
        vec![Atom::uint8(encoding::TAG_ATTRIBUTE_EXCEPTION).into(), index(type_index)],
    )
    .into()
}

/// A constant expression closed by `end`.
pub fn init_expr(instrs: Vec<Instr>) -> Node {
    let mut children: Vec<Node> = instrs.into_iter().map(Node::Instr).collect();
    children.push(end().into());
    Cell::new(CellKind::InitExpr, children).into()
}

// ===========================================================================
// Imports and exports
// ===========================================================================

/// What an import provides.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportDesc {
    Func(u32),
    Table(RefType, Limits),
    Memory(Limits),
    Global(ValType, bool),
    Tag(u32),
}

impl ImportDesc {
    pub fn kind(&self) -> ExternalKind {
        match self {
            ImportDesc::Func(_) => ExternalKind::Func,
            ImportDesc::Table(..) => ExternalKind::Table,
            ImportDesc::Memory(_) => ExternalKind::Memory,
            ImportDesc::Global(..) => ExternalKind::Global,
            ImportDesc::Tag(_) => ExternalKind::Tag,
        }
    }
}

/// `import ::= module:name name:name importdesc`
pub fn import(module: &str, name: &str, desc: ImportDesc) -> Result<Node, BuildError> {
    let desc_node = match &desc {
        ImportDesc::Func(type_index) => index(*type_index),
        ImportDesc::Table(elem, l) => table_type(*elem, l)?,
        ImportDesc::Memory(l) => limits(l)?,
        ImportDesc::Global(t, mutable) => global_type(*t, *mutable),
        ImportDesc::Tag(type_index) => tag_type(*type_index),
    };
    Ok(Cell::new(
        CellKind::ImportEntry,
        vec![
            str_utf8(module),
            str_utf8(name),
            Atom::external_kind(desc.kind()).into(),
            desc_node,
        ],
    )
    .into())
}

pub fn import_section(entries: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&entries, &[CellKind::ImportEntry], "import entry")?;
    Ok(vec_section(SectionId::Import, entries))
}

/// `export ::= name exportdesc`
pub fn export(name: &str, kind: ExternalKind, idx: u32) -> Node {
    Cell::new(
        CellKind::ExportEntry,
        vec![str_utf8(name), Atom::external_kind(kind).into(), index(idx)],
    )
    .into()
}

pub fn export_section(entries: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&entries, &[CellKind::ExportEntry], "export entry")?;
    Ok(vec_section(SectionId::Export, entries))
}

// ===========================================================================
// Index-only sections
// ===========================================================================

/// Function section: the type index of each locally defined function.
pub fn function_section(type_indices: &[u32]) -> Node {
    vec_section(SectionId::Function, type_indices.iter().map(|t| index(*t)).collect())
}

pub fn table_section(tables: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&tables, &[CellKind::TableType, CellKind::TableDecl], "table")?;
    Ok(vec_section(SectionId::Table, tables))
}

pub fn memory_section(memories: &[Limits]) -> Result<Node, BuildError> {
    let entries = memories.iter().map(limits).collect::<Result<Vec<_>, _>>()?;
    Ok(vec_section(SectionId::Memory, entries))
}

/// Tag section: the function type index of each exception tag.
pub fn tag_section(type_indices: &[u32]) -> Node {
    vec_section(SectionId::Tag, type_indices.iter().map(|t| tag_type(*t)).collect())
}

pub fn global_section(globals: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&globals, &[CellKind::GlobalVariable], "global")?;
    Ok(vec_section(SectionId::Global, globals))
}

pub fn start_section(func: u32) -> Node {
    section(SectionId::Start, vec![index(func)])
}

pub fn data_count_section(count: u32) -> Node {
    section(SectionId::DataCount, vec![index(count)])
}

/// `customsec ::= name byte*`
pub fn custom_section(name: &str, payload: impl Into<Vec<u8>>) -> Node {
    section(SectionId::Custom, vec![str_utf8(name), Atom::bytes(payload).into()])
}

// ===========================================================================
// Element segments
// ===========================================================================

/// Where an element segment goes.
#[derive(Debug, Clone, PartialEq)]
pub enum ElemMode {
    Active { table: u32, offset: Vec<Instr> },
    Passive,
    Declarative,
}

/// What an element segment holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ElemItems {
    Functions(Vec<u32>),
    Expressions(RefType, Vec<Vec<Instr>>),
}

/// Builds an element segment, choosing the most compact of the eight
/// encodings:
///
/// ```text
/// 0: expr vec(funcidx)                  4: expr vec(expr)
/// 1: elemkind vec(funcidx)              5: reftype vec(expr)
/// 2: tableidx expr elemkind vec(funcidx) 6: tableidx expr reftype vec(expr)
/// 3: elemkind vec(funcidx)              7: reftype vec(expr)
/// ```
pub fn elem_segment(mode: ElemMode, items: ElemItems) -> Node {
    let exprs = matches!(items, ElemItems::Expressions(..));
    let mut flags = if exprs { encoding::ELEM_EXPRS_BIT } else { 0 };
    let mut children: Vec<Node> = vec![];
    // Active segments on table 0 with funcref items use the short forms.
    let implicit_type = match &items {
        ElemItems::Functions(_) => true,
        ElemItems::Expressions(t, _) => *t == RefType::FUNCREF,
    };
    let mut typed = true;
    match mode {
        ElemMode::Active { table, offset } => {
            if table == 0 && implicit_type {
                typed = false;
            } else {
                flags |= encoding::ELEM_EXPLICIT_BIT;
                children.push(index(table));
            }
            children.push(init_expr(offset));
        }
        ElemMode::Passive => flags |= encoding::ELEM_PASSIVE_BIT,
        ElemMode::Declarative => flags |= encoding::ELEM_PASSIVE_BIT | encoding::ELEM_EXPLICIT_BIT,
    }
    match items {
        ElemItems::Functions(funcs) => {
            if typed {
                children.push(Atom::uint8(encoding::ELEMKIND_FUNCREF).into());
            }
            children.extend(counted(funcs.into_iter().map(index).collect()));
        }
        ElemItems::Expressions(t, exprs) => {
            if typed {
                children.push(Atom::val_type(ValType::Ref(t)).into());
            }
            children.extend(counted(exprs.into_iter().map(init_expr).collect()));
        }
    }
    children.insert(0, Atom::varuint32(flags).into());
    Cell::new(CellKind::ElemSegment, children).into()
}

pub fn element_section(segments: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&segments, &[CellKind::ElemSegment], "element segment")?;
    Ok(vec_section(SectionId::Element, segments))
}

// ===========================================================================
// Data segments
// ===========================================================================

/// Where a data segment goes.
#[derive(Debug, Clone, PartialEq)]
pub enum DataMode {
    Active { memory: u32, offset: Vec<Instr> },
    Passive,
}

/// ```text
/// data ::= 0 expr vec(byte)
///        | 1 vec(byte)
///        | 2 memidx expr vec(byte)
/// ```
pub fn data_segment(mode: DataMode, bytes: impl Into<Vec<u8>>) -> Node {
    let mut children: Vec<Node> = vec![];
    match mode {
        DataMode::Active { memory: 0, offset } => {
            children.push(Atom::varuint32(encoding::DATA_ACTIVE).into());
            children.push(init_expr(offset));
        }
        DataMode::Active { memory, offset } => {
            children.push(Atom::varuint32(encoding::DATA_ACTIVE_EXPLICIT).into());
            children.push(index(memory));
            children.push(init_expr(offset));
        }
        DataMode::Passive => children.push(Atom::varuint32(encoding::DATA_PASSIVE).into()),
    }
    children.push(str(bytes));
    Cell::new(CellKind::DataSegment, children).into()
}

pub fn data_section(segments: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&segments, &[CellKind::DataSegment], "data segment")?;
    Ok(vec_section(SectionId::Data, segments))
}

// ===========================================================================
// Code
// ===========================================================================

/// `locals ::= n:vu32 valtype`
pub fn local_entry(count: u32, t: ValType) -> Node {
    Cell::new(CellKind::LocalEntry, vec![index(count), Atom::val_type(t).into()]).into()
}

/// ```text
/// code ::= size:vu32 vec(locals) instr* 0x0B
/// ```
pub fn function_body(locals: &[(u32, ValType)], body: Vec<Instr>) -> Node {
    let mut inner: Vec<Node> = counted(locals.iter().map(|(n, t)| local_entry(*n, *t)).collect());
    inner.extend(body.into_iter().map(Node::Instr));
    inner.push(end().into());
    let size: u32 = inner.iter().map(Node::byte_len).sum();
    let mut children: Vec<Node> = Vec::with_capacity(inner.len() + 1);
    children.push(Atom::varuint32(size).into());
    children.extend(inner);
    Cell::new(CellKind::FunctionBody, children).into()
}

pub fn code_section(bodies: Vec<Node>) -> Result<Node, BuildError> {
    expect_cells(&bodies, &[CellKind::FunctionBody], "function body")?;
    Ok(vec_section(SectionId::Code, bodies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::HeapType;
    use crate::instruction::{control, I32};

    #[test]
    fn empty_module_is_preamble_only() {
        let m = module(vec![]).unwrap();
        assert_eq!(m.to_bytes(), vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn sections_must_be_ordered_and_unique() {
        let err = module(vec![function_section(&[0]), function_section(&[0])]).unwrap_err();
        assert_eq!(err, BuildError::DuplicateSection(SectionId::Function));

        let err = module(vec![data_count_section(0), start_section(0)]).unwrap_err();
        assert_eq!(
            err,
            BuildError::SectionOrder {
                earlier: SectionId::DataCount,
                later: SectionId::Start
            }
        );

        let ok = module(vec![
            custom_section("a", vec![]),
            memory_section(&[Limits::new(1)]).unwrap(),
            tag_section(&[0]),
            custom_section("a", vec![1]),
            data_count_section(0),
            code_section(vec![]).unwrap(),
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn non_sections_are_rejected() {
        let err = module(vec![str_utf8("x")]).unwrap_err();
        assert!(matches!(err, BuildError::UnexpectedNode { expected: "section", .. }));
    }

    #[test]
    fn limits_flags() {
        let l = limits(&Limits::new(1).max(2).shared()).unwrap();
        assert_eq!(l.to_bytes(), vec![0x03, 0x01, 0x02]);
        let l = limits(&Limits::new(1 << 33).memory64()).unwrap();
        assert_eq!(l.to_bytes(), vec![0x04, 0x80, 0x80, 0x80, 0x80, 0x20]);
        assert!(limits(&Limits::new(1 << 33)).is_err());
        assert!(limits(&Limits::new(2).max(1)).is_err());
        assert!(limits(&Limits::new(1).shared()).is_err());
    }

    #[test]
    fn single_final_types_use_shorthand() {
        let section = type_section(vec![func_type(&[ValType::I32], &[ValType::I32])]).unwrap();
        assert_eq!(
            section.to_bytes(),
            vec![0x01, 0x06, 0x01, 0x60, 0x01, 0x7f, 0x01, 0x7f]
        );
    }

    #[test]
    fn recursive_group_encoding() {
        let node = struct_type(vec![field_type(
            StorageType::Val(ValType::Ref(RefType::null(HeapType::Concrete(1)))),
            true,
        )])
        .unwrap();
        let open = sub_type(false, &[], node).unwrap();
        let arr = array_type(field_type(StorageType::I8, false)).unwrap();
        let group = rec_type(vec![open, arr]).unwrap();
        assert_eq!(
            group.to_bytes(),
            vec![0x4e, 0x02, 0x50, 0x00, 0x5f, 0x01, 0x63, 0x01, 0x01, 0x5e, 0x78, 0x00]
        );
        assert!(rec_type(vec![]).is_err());
        assert!(sub_type(true, &[], str_utf8("x")).is_err());
    }

    #[test]
    fn element_segment_flags() {
        let offset = || vec![I32::const_(0)];
        let flag = |n: &Node| n.to_bytes()[0];
        let funcs = || ElemItems::Functions(vec![0, 1]);
        let exprs = |t| ElemItems::Expressions(t, vec![vec![control::ref_func(0)]]);

        let seg = elem_segment(ElemMode::Active { table: 0, offset: offset() }, funcs());
        assert_eq!(seg.to_bytes(), vec![0x00, 0x41, 0x00, 0x0b, 0x02, 0x00, 0x01]);
        assert_eq!(flag(&elem_segment(ElemMode::Passive, funcs())), 1);
        assert_eq!(flag(&elem_segment(ElemMode::Active { table: 1, offset: offset() }, funcs())), 2);
        assert_eq!(flag(&elem_segment(ElemMode::Declarative, funcs())), 3);
        let active0 = ElemMode::Active { table: 0, offset: offset() };
        assert_eq!(flag(&elem_segment(active0.clone(), exprs(RefType::FUNCREF))), 4);
        assert_eq!(flag(&elem_segment(ElemMode::Passive, exprs(RefType::FUNCREF))), 5);
        let typed = RefType::non_null(HeapType::Func);
        assert_eq!(flag(&elem_segment(active0, exprs(typed))), 6);
        assert_eq!(flag(&elem_segment(ElemMode::Declarative, exprs(typed))), 7);
    }

    #[test]
    fn data_segment_flags() {
        let seg = data_segment(DataMode::Active { memory: 0, offset: vec![I32::const_(8)] }, b"hi".to_vec());
        assert_eq!(seg.to_bytes(), vec![0x00, 0x41, 0x08, 0x0b, 0x02, b'h', b'i']);
        let seg = data_segment(DataMode::Passive, b"x".to_vec());
        assert_eq!(seg.to_bytes(), vec![0x01, 0x01, b'x']);
        let seg = data_segment(DataMode::Active { memory: 2, offset: vec![I32::const_(0)] }, vec![]);
        assert_eq!(seg.to_bytes(), vec![0x02, 0x02, 0x41, 0x00, 0x0b, 0x00]);
    }

    #[test]
    fn function_body_size_prefix() {
        let body = function_body(&[(2, ValType::I64)], vec![control::nop()]);
        assert_eq!(body.to_bytes(), vec![0x05, 0x01, 0x02, 0x7e, 0x01, 0x0b]);
    }

    #[test]
    fn table_with_initializer() {
        let t = table_with_init(
            RefType::non_null(HeapType::Func),
            &Limits::new(1),
            vec![control::ref_func(0)],
        )
        .unwrap();
        assert_eq!(t.to_bytes(), vec![0x40, 0x00, 0x64, 0x70, 0x00, 0x01, 0xd2, 0x00, 0x0b]);
    }

    #[test]
    fn imports_carry_their_kind() {
        let i = import("env", "mem", ImportDesc::Memory(Limits::new(1))).unwrap();
        assert_eq!(
            i.to_bytes(),
            vec![0x03, b'e', b'n', b'v', 0x03, b'm', b'e', b'm', 0x02, 0x00, 0x01]
        );
        assert!(str_ascii("héllo").is_err());
        assert!(import_section(vec![export("x", ExternalKind::Func, 0)]).is_err());
    }
}
