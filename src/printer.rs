//! Text rendering.
//!
//! The printer walks a finished tree a second time and renders it as folded
//! s-expressions in the shape of the WebAssembly text format:
//!
//! ```text
//! (module
//!   (type 0 (func (param i32) (result i32)))
//!   (export "fact" (func 0))
//!   (func 0 (type 0)
//!     (if (result i32) (i32.eqz (local.get 0))
//!       (then
//!         (i32.const 1))
//!       ...
//! ```
//!
//! The tree holds no definition indices, so the printer counts them per
//! index space in binary definition order, imports first. Output is pushed
//! to a caller supplied sink in small chunks. Problems are sent to a
//! separate error channel and rendering carries on with a placeholder.

use byteorder::{ByteOrder, LittleEndian};
use fhex::ToHex;

use crate::ast::atom::Repr;
use crate::ast::{Atom, BlockType, Cell, CellKind, ExternalKind, Node, SectionId};
use crate::encoding;
use crate::error::RenderError;
use crate::instruction::{AtomicOp, GcOp, Instr, MiscOp, Op, SimdOp};

/// Local runs longer than this print their type once with a count comment.
const EXPANDED_LOCALS: u64 = 16;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Indentation unit, repeated once per nesting level.
    pub indent: String,
    /// Precede each section with a comment giving its byte offset and size.
    pub section_offsets: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            indent: "  ".to_string(),
            section_offsets: false,
        }
    }
}

#[derive(Debug, Default)]
struct IndexCounters {
    types: u32,
    funcs: u32,
    tables: u32,
    memories: u32,
    globals: u32,
    tags: u32,
    elems: u32,
    datas: u32,
}

impl IndexCounters {
    fn next(&mut self, kind: ExternalKind) -> u32 {
        let counter = match kind {
            ExternalKind::Func => &mut self.funcs,
            ExternalKind::Table => &mut self.tables,
            ExternalKind::Memory => &mut self.memories,
            ExternalKind::Global => &mut self.globals,
            ExternalKind::Tag => &mut self.tags,
        };
        let index = *counter;
        *counter += 1;
        index
    }
}

/// Renders trees as text into `sink`, reporting problems to `errors`.
pub struct Printer<S, E> {
    sink: S,
    errors: E,
    options: PrintOptions,
    at_line_start: bool,
    skip_space: bool,
    depth: usize,
    counters: IndexCounters,
    /// Type index of every function, imports first.
    func_types: Vec<u32>,
}

impl<S, E> Printer<S, E>
where
    S: FnMut(&str),
    E: FnMut(RenderError),
{
    pub fn new(sink: S, errors: E) -> Self {
        Self::with_options(sink, errors, PrintOptions::default())
    }

    pub fn with_options(sink: S, errors: E, options: PrintOptions) -> Self {
        Printer {
            sink,
            errors,
            options,
            at_line_start: true,
            skip_space: false,
            depth: 0,
            counters: IndexCounters::default(),
            func_types: Vec::new(),
        }
    }

    /// Renders `node` and finishes the line.
    ///
    /// Any node can be printed on its own; index counters only mean
    /// something when a whole module is printed.
    pub fn print(&mut self, node: &Node) {
        match node {
            Node::Cell(cell) => match cell.kind() {
                CellKind::Module => self.module(cell),
                CellKind::Section(id) => self.section(id, cell),
                CellKind::FunctionBody => self.function_body(node),
                _ => self.cell(cell),
            },
            Node::Instr(instr) => self.instr(instr),
            Node::Atom(atom) => self.atom(atom),
        }
        self.newline();
    }

    // Output primitives ---------------------------------------------------------

    fn token(&mut self, text: &str) {
        if self.at_line_start {
            let indent = self.options.indent.repeat(self.depth);
            (self.sink)(&indent);
        } else if !self.skip_space {
            (self.sink)(" ");
        }
        (self.sink)(text);
        self.at_line_start = false;
        self.skip_space = false;
    }

    fn open(&mut self, head: &str) {
        self.token("(");
        self.skip_space = true;
        self.token(head);
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        (self.sink)(")");
        self.at_line_start = false;
        self.skip_space = false;
    }

    fn newline(&mut self) {
        if !self.at_line_start {
            (self.sink)("\n");
            self.at_line_start = true;
        }
    }

    fn comment(&mut self, text: &str) {
        self.newline();
        self.token(&format!(";; {text}"));
        self.newline();
    }

    fn unexpected(&mut self, node: &Node, context: &'static str) {
        let kind = node.kind();
        (self.errors)(RenderError::UnexpectedNode { kind, context });
        self.token(&format!("(;{kind};)"));
    }

    fn number(&mut self, node: Option<&Node>) {
        self.token(&num(node).to_string());
    }

    fn string(&mut self, node: Option<&Node>) {
        let bytes = node.map(children).and_then(|c| c.get(1)).and_then(Node::as_atom).and_then(Atom::as_bytes);
        self.token(&quote(bytes.unwrap_or_default()));
    }

    fn type_use(&mut self, type_index: u64) {
        self.open("type");
        self.token(&type_index.to_string());
        self.close();
    }

    fn atom(&mut self, atom: &Atom) {
        if let Some(text) = atom_text(atom) {
            self.token(&text);
        }
    }

    fn atom_at(&mut self, node: Option<&Node>) {
        match node {
            Some(Node::Atom(atom)) => self.atom(atom),
            Some(other) => self.unexpected(other, "type position"),
            None => {}
        }
    }

    /// Fallback for cells printed outside of their section.
    fn cell(&mut self, cell: &Cell) {
        self.open(&cell.kind().to_string());
        for child in cell.children() {
            match child {
                Node::Atom(atom) => self.atom(atom),
                Node::Cell(inner) => self.cell(inner),
                Node::Instr(instr) => self.instr(instr),
            }
        }
        self.close();
    }

    // Module structure -------------------------------------------------------------

    fn module(&mut self, module: &Cell) {
        self.counters = IndexCounters::default();
        self.func_types.clear();
        self.open("module");
        let mut offset = 0u32;
        for child in module.children() {
            match child.as_cell().and_then(|c| c.section_id().map(|id| (id, c))) {
                Some((id, section)) => {
                    if self.options.section_offsets {
                        let text = format!("{id} section at 0x{offset:x}, {} bytes", section.byte_len());
                        self.comment(&text);
                    }
                    self.section(id, section);
                }
                // magic and version
                None if child.as_atom().is_some() => {}
                None => self.unexpected(child, "module"),
            }
            offset += child.byte_len();
        }
        self.close();
    }

    fn section(&mut self, id: SectionId, section: &Cell) {
        let payload = section.children().get(2..).unwrap_or_default();
        // counted vectors: skip the count
        let entries = payload.get(1..).unwrap_or_default();
        match id {
            SectionId::Type => entries.iter().for_each(|e| self.rec_group(e)),
            SectionId::Import => entries.iter().for_each(|e| self.import(e)),
            SectionId::Function => self.func_types.extend(entries.iter().map(|e| num(Some(e)) as u32)),
            SectionId::Table => {
                for entry in entries {
                    self.newline();
                    self.definition(ExternalKind::Table);
                    self.table(Some(entry));
                    self.close();
                }
            }
            SectionId::Memory => {
                for entry in entries {
                    self.newline();
                    self.definition(ExternalKind::Memory);
                    self.limits(Some(entry));
                    self.close();
                }
            }
            SectionId::Global => {
                for entry in entries {
                    let c = children(entry);
                    self.newline();
                    self.definition(ExternalKind::Global);
                    self.mutable_type(c.first());
                    self.init_expr(c.get(1));
                    self.close();
                }
            }
            SectionId::Export => entries.iter().for_each(|e| self.export(e)),
            SectionId::Start => {
                self.newline();
                self.open("start");
                self.number(payload.first());
                self.close();
            }
            SectionId::Element => entries.iter().for_each(|e| self.elem(e)),
            SectionId::Code => entries.iter().for_each(|e| self.function_body(e)),
            SectionId::Data => entries.iter().for_each(|e| self.data(e)),
            SectionId::DataCount => {
                let text = format!("datacount {}", num(payload.first()));
                self.comment(&text);
            }
            SectionId::Tag => {
                for entry in entries {
                    self.newline();
                    self.definition(ExternalKind::Tag);
                    self.type_use(num(children(entry).get(1)));
                    self.close();
                }
            }
            SectionId::Custom => {
                self.newline();
                self.open("@custom");
                self.string(payload.first());
                let bytes = payload.get(1).and_then(Node::as_atom).and_then(Atom::as_bytes);
                self.token(&quote(bytes.unwrap_or_default()));
                self.close();
            }
        }
    }

    /// Opens `(kind N` for the next index of `kind`.
    fn definition(&mut self, kind: ExternalKind) {
        let index = self.counters.next(kind);
        self.open(&kind.to_string());
        self.token(&index.to_string());
    }

    // Types -------------------------------------------------------------------------

    fn rec_group(&mut self, node: &Node) {
        let c = children(node);
        let is_rec = c.first().and_then(Node::as_atom).and_then(Atom::as_u64) == Some(encoding::TYPE_REC as u64);
        if is_rec {
            self.newline();
            self.open("rec");
            for sub in c.get(2..).unwrap_or_default() {
                self.sub_type(sub);
            }
            self.close();
        } else {
            c.iter().for_each(|sub| self.sub_type(sub));
        }
    }

    fn sub_type(&mut self, node: &Node) {
        let index = self.counters.types;
        self.counters.types += 1;
        self.newline();
        self.open("type");
        self.token(&index.to_string());
        match children(node) {
            [composite] => self.composite(composite),
            [tag, _count, rest @ ..] if !rest.is_empty() => {
                let (supers, composite) = rest.split_at(rest.len() - 1);
                self.open("sub");
                if num(Some(tag)) == encoding::TYPE_SUB_FINAL as u64 {
                    self.token("final");
                }
                for s in supers {
                    self.number(Some(s));
                }
                self.composite(&composite[0]);
                self.close();
            }
            _ => self.unexpected(node, "type section"),
        }
        self.close();
    }

    fn composite(&mut self, node: &Node) {
        let c = children(node);
        match node.as_cell().map(Cell::kind) {
            Some(CellKind::FuncType) => {
                self.open("func");
                self.signature(c.get(1..).unwrap_or_default());
                self.close();
            }
            Some(CellKind::StructType) => {
                self.open("struct");
                for field in c.get(2..).unwrap_or_default() {
                    self.open("field");
                    self.mutable_type(Some(field));
                    self.close();
                }
                self.close();
            }
            Some(CellKind::ArrayType) => {
                self.open("array");
                self.mutable_type(c.get(1));
                self.close();
            }
            _ => self.unexpected(node, "type definition"),
        }
    }

    /// `vec(param) vec(result)`, starting at the parameter count.
    fn signature(&mut self, c: &[Node]) {
        let n = num(c.first()) as usize;
        self.type_list("param", c.get(1..1 + n).unwrap_or_default());
        self.type_list("result", c.get(2 + n..).unwrap_or_default());
    }

    fn type_list(&mut self, head: &str, types: &[Node]) {
        if types.is_empty() {
            return;
        }
        self.open(head);
        for t in types {
            self.atom_at(Some(t));
        }
        self.close();
    }

    /// A field or global type: `[type, mutable]`.
    fn mutable_type(&mut self, node: Option<&Node>) {
        let c = node.map(children).unwrap_or_default();
        if num(c.get(1)) != 0 {
            self.open("mut");
            self.atom_at(c.first());
            self.close();
        } else {
            self.atom_at(c.first());
        }
    }

    fn limits(&mut self, node: Option<&Node>) {
        let c = node.map(children).unwrap_or_default();
        let flags = num(c.first()) as u8;
        if flags & encoding::LIMITS_64 != 0 {
            self.token("i64");
        }
        self.number(c.get(1));
        if flags & encoding::LIMITS_HAS_MAX != 0 {
            self.number(c.get(2));
        }
        if flags & encoding::LIMITS_SHARED != 0 {
            self.token("shared");
        }
    }

    fn table(&mut self, node: Option<&Node>) {
        let c = node.map(children).unwrap_or_default();
        match node.and_then(Node::as_cell).map(Cell::kind) {
            Some(CellKind::TableType) => {
                self.limits(c.get(1));
                self.atom_at(c.first());
            }
            Some(CellKind::TableDecl) => {
                self.table(c.get(2));
                self.init_expr(c.get(3));
            }
            _ => {
                if let Some(node) = node {
                    self.unexpected(node, "table");
                }
            }
        }
    }

    // Imports, exports, segments -------------------------------------------------------

    fn import(&mut self, node: &Node) {
        let c = children(node);
        self.newline();
        self.open("import");
        self.string(c.first());
        self.string(c.get(1));
        let desc = c.get(3);
        match c.get(2).and_then(external_kind) {
            Some(kind @ ExternalKind::Func) => {
                let type_index = num(desc);
                self.func_types.push(type_index as u32);
                self.definition(kind);
                self.type_use(type_index);
            }
            Some(kind @ ExternalKind::Table) => {
                self.definition(kind);
                self.table(desc);
            }
            Some(kind @ ExternalKind::Memory) => {
                self.definition(kind);
                self.limits(desc);
            }
            Some(kind @ ExternalKind::Global) => {
                self.definition(kind);
                self.mutable_type(desc);
            }
            Some(kind @ ExternalKind::Tag) => {
                self.definition(kind);
                self.type_use(num(desc.map(children).unwrap_or_default().get(1)));
            }
            None => {
                self.unexpected(node, "import");
                self.close();
                return;
            }
        }
        self.close();
        self.close();
    }

    fn export(&mut self, node: &Node) {
        let c = children(node);
        self.newline();
        self.open("export");
        self.string(c.first());
        match c.get(1).and_then(external_kind) {
            Some(kind) => {
                self.open(&kind.to_string());
                self.number(c.get(2));
                self.close();
            }
            None => self.unexpected(node, "export"),
        }
        self.close();
    }

    fn elem(&mut self, node: &Node) {
        let index = self.counters.elems;
        self.counters.elems += 1;
        self.newline();
        self.open("elem");
        self.token(&index.to_string());

        let c = children(node);
        let flags = num(c.first()) as u32;
        let mut rest = c.get(1..).unwrap_or_default();
        if flags & encoding::ELEM_PASSIVE_BIT == 0 {
            if flags & encoding::ELEM_EXPLICIT_BIT != 0 {
                self.open("table");
                self.number(rest.first());
                self.close();
                rest = rest.get(1..).unwrap_or_default();
            }
            self.open("offset");
            self.init_expr(rest.first());
            self.close();
            rest = rest.get(1..).unwrap_or_default();
        } else if flags & encoding::ELEM_EXPLICIT_BIT != 0 {
            self.token("declare");
        }

        let exprs = flags & encoding::ELEM_EXPRS_BIT != 0;
        let explicit_type = flags & (encoding::ELEM_PASSIVE_BIT | encoding::ELEM_EXPLICIT_BIT) != 0;
        match (explicit_type, exprs) {
            (true, true) => {
                self.atom_at(rest.first());
                rest = rest.get(1..).unwrap_or_default();
            }
            (true, false) => {
                self.token("func");
                rest = rest.get(1..).unwrap_or_default();
            }
            (false, true) => self.token("funcref"),
            (false, false) => self.token("func"),
        }
        for item in rest.get(1..).unwrap_or_default() {
            if exprs {
                self.open("item");
                self.init_expr(Some(item));
                self.close();
            } else {
                self.number(Some(item));
            }
        }
        self.close();
    }

    fn data(&mut self, node: &Node) {
        let index = self.counters.datas;
        self.counters.datas += 1;
        self.newline();
        self.open("data");
        self.token(&index.to_string());

        let c = children(node);
        let mut rest = c.get(1..).unwrap_or_default();
        match num(c.first()) as u32 {
            encoding::DATA_ACTIVE_EXPLICIT => {
                self.open("memory");
                self.number(rest.first());
                self.close();
                self.open("offset");
                self.init_expr(rest.get(1));
                self.close();
                rest = rest.get(2..).unwrap_or_default();
            }
            encoding::DATA_ACTIVE => {
                self.open("offset");
                self.init_expr(rest.first());
                self.close();
                rest = rest.get(1..).unwrap_or_default();
            }
            _ => {}
        }
        self.string(rest.first());
        self.close();
    }

    fn init_expr(&mut self, node: Option<&Node>) {
        for instr in node.map(children).unwrap_or_default() {
            match instr {
                Node::Instr(i) if i.is(Op::End) => {}
                Node::Instr(i) => self.instr(i),
                other => self.unexpected(other, "constant expression"),
            }
        }
    }

    // Code ------------------------------------------------------------------------------

    fn function_body(&mut self, node: &Node) {
        let func = self.counters.next(ExternalKind::Func);
        self.newline();
        self.open("func");
        self.token(&func.to_string());
        if let Some(type_index) = self.func_types.get(func as usize).copied() {
            self.type_use(type_index as u64);
        }

        let c = children(node);
        let n = num(c.get(1)) as usize;
        let locals = c.get(2..2 + n).unwrap_or_default();
        if !locals.is_empty() {
            self.open("local");
            for entry in locals {
                let e = children(entry);
                let count = num(e.first());
                if count > EXPANDED_LOCALS {
                    self.atom_at(e.get(1));
                    self.token(&format!("(;x{count};)"));
                    continue;
                }
                for _ in 0..count {
                    self.atom_at(e.get(1));
                }
            }
            self.close();
        }
        self.body(c.get(2 + n..).unwrap_or_default());
        self.close();
    }

    /// One instruction per line; `end` markers are implied by the nesting.
    fn body(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Instr(i) if i.is(Op::End) => {}
                Node::Instr(i) => {
                    self.newline();
                    self.instr(i);
                }
                other => self.unexpected(other, "instruction sequence"),
            }
        }
    }

    fn instr(&mut self, instr: &Instr) {
        let name = match instr.name() {
            Some(name) => name,
            None => {
                (self.errors)(RenderError::unknown_opcode(instr.prefix(), instr.opcode()));
                "unknown"
            }
        };
        self.open(name);
        if !self.special_immediates(instr) {
            for imm in instr.imm() {
                self.immediate(imm);
            }
        }
        for operand in instr.pre() {
            match operand {
                Node::Instr(i) => self.instr(i),
                other => self.unexpected(other, "operands"),
            }
        }
        if !instr.post().is_empty() {
            self.structured_body(instr);
        }
        self.close();
    }

    fn structured_body(&mut self, instr: &Instr) {
        if instr.is(Op::If) {
            for (marker, body) in segments(instr.post()) {
                self.newline();
                self.open(if marker.is_some() { "else" } else { "then" });
                self.body(body);
                self.close();
            }
        } else if instr.is(Op::Try) {
            for (marker, body) in segments(instr.post()) {
                self.newline();
                match marker {
                    Some(m) => {
                        self.open(m.name().unwrap_or("catch"));
                        for imm in m.imm() {
                            self.immediate(imm);
                        }
                    }
                    None => self.open("do"),
                }
                self.body(body);
                self.close();
            }
        } else {
            self.body(instr.post());
        }
    }

    /// Immediates whose text form differs from their binary order.
    /// Returns false when the generic rendering applies.
    fn special_immediates(&mut self, instr: &Instr) -> bool {
        let imm = instr.imm();
        match instr.prefix() {
            None => match Op::from_code(instr.opcode()) {
                Some(Op::CallIndirect | Op::ReturnCallIndirect) => {
                    self.number(imm.get(1));
                    self.type_use(num(imm.first()));
                }
                Some(Op::SelectTyped) => {
                    let types = imm.first().map(children).unwrap_or_default();
                    self.type_list("result", types.get(1..).unwrap_or_default());
                }
                _ => return false,
            },
            Some(encoding::PREFIX_GC) => match GcOp::from_code(instr.opcode()) {
                Some(GcOp::RefTest | GcOp::RefCast) => self.ref_type(false, imm.first()),
                Some(GcOp::RefTestNull | GcOp::RefCastNull) => self.ref_type(true, imm.first()),
                Some(GcOp::BrOnCast | GcOp::BrOnCastFail) => {
                    let flags = num(imm.first());
                    self.number(imm.get(1));
                    self.ref_type(flags & 1 != 0, imm.get(2));
                    self.ref_type(flags & 2 != 0, imm.get(3));
                }
                _ => return false,
            },
            Some(encoding::PREFIX_MISC) => match MiscOp::from_code(instr.opcode()) {
                // text order is memory/table first
                Some(MiscOp::MemoryInit | MiscOp::TableInit) => {
                    self.number(imm.get(1));
                    self.number(imm.first());
                }
                _ => return false,
            },
            Some(encoding::PREFIX_SIMD) => match SimdOp::from_code(instr.opcode()) {
                Some(SimdOp::I8x16Shuffle) => {
                    let lanes = imm.first().and_then(Node::as_atom).and_then(Atom::as_bytes);
                    for lane in lanes.unwrap_or_default() {
                        self.token(&lane.to_string());
                    }
                }
                _ => return false,
            },
            Some(encoding::PREFIX_ATOMIC) => match AtomicOp::from_code(instr.opcode()) {
                // reserved zero byte
                Some(AtomicOp::AtomicFence) => {}
                _ => return false,
            },
            Some(_) => return false,
        }
        true
    }

    fn ref_type(&mut self, nullable: bool, heap: Option<&Node>) {
        self.open("ref");
        if nullable {
            self.token("null");
        }
        self.atom_at(heap);
        self.close();
    }

    fn immediate(&mut self, node: &Node) {
        match node {
            Node::Atom(atom) => self.atom(atom),
            Node::Cell(cell) => match cell.kind() {
                CellKind::MemArg { natural_align } => self.memarg(cell.children(), natural_align),
                CellKind::Vec => {
                    for item in cell.children().get(1..).unwrap_or_default() {
                        self.immediate(item);
                    }
                }
                CellKind::CatchClause => {
                    let c = cell.children();
                    let name = match num(c.first()) {
                        0 => "catch",
                        1 => "catch_ref",
                        2 => "catch_all",
                        _ => "catch_all_ref",
                    };
                    self.open(name);
                    for arg in c.get(1..).unwrap_or_default() {
                        self.immediate(arg);
                    }
                    self.close();
                }
                _ => self.unexpected(node, "immediates"),
            },
            Node::Instr(_) => self.unexpected(node, "immediates"),
        }
    }

    /// `memidx? offset=o? align=a?`, omitting defaults.
    fn memarg(&mut self, c: &[Node], natural_align: u8) {
        let raw = num(c.first()) as u32;
        let mut rest = c.get(1..).unwrap_or_default();
        if raw & encoding::MEMARG_HAS_MEMORY != 0 {
            self.number(rest.first());
            rest = rest.get(1..).unwrap_or_default();
        }
        let align = raw & !encoding::MEMARG_HAS_MEMORY;
        let offset = num(rest.first());
        if offset != 0 {
            self.token(&format!("offset={offset}"));
        }
        if align != natural_align as u32 {
            self.token(&format!("align={}", 1u64 << align.min(63)));
        }
    }
}

/// Renders `node` to a string, failing with the first problem found.
pub fn print_to_string(node: &Node) -> Result<String, RenderError> {
    let mut out = String::new();
    let mut first_error = None;
    Printer::new(
        |s: &str| out.push_str(s),
        |e| {
            first_error.get_or_insert(e);
        },
    )
    .print(node);
    match first_error {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

// Helpers ---------------------------------------------------------------------------------

fn children(node: &Node) -> &[Node] {
    node.as_cell().map(Cell::children).unwrap_or_default()
}

fn num(node: Option<&Node>) -> u64 {
    node.and_then(Node::as_atom).and_then(Atom::as_u64).unwrap_or(0)
}

fn external_kind(node: &Node) -> Option<ExternalKind> {
    match node.as_atom().map(|a| &a.repr) {
        Some(Repr::External(kind)) => Some(*kind),
        _ => None,
    }
}

/// Splits a structured body at its `else`, `catch`, `catch_all` and
/// `delegate` markers. The leading segment has no marker.
fn segments(post: &[Node]) -> Vec<(Option<&Instr>, &[Node])> {
    let mut out = Vec::new();
    let mut marker = None;
    let mut start = 0;
    for (i, node) in post.iter().enumerate() {
        let Some(instr) = node.as_instr() else { continue };
        if instr.is(Op::End) {
            out.push((marker, &post[start..i]));
            return out;
        }
        if instr.is(Op::Else) || instr.is(Op::Catch) || instr.is(Op::CatchAll) || instr.is(Op::Delegate) {
            out.push((marker, &post[start..i]));
            marker = Some(instr);
            start = i + 1;
        }
    }
    out.push((marker, &post[start..]));
    out
}

fn atom_text(atom: &Atom) -> Option<String> {
    Some(match &atom.repr {
        Repr::U8(v) => v.to_string(),
        Repr::U16(v) => v.to_string(),
        Repr::U32(v) => v.to_string(),
        Repr::U64(v) => v.to_string(),
        Repr::VarUint1(v) => (*v as u8).to_string(),
        Repr::VarUint7(v) => v.to_string(),
        Repr::VarUint32(v, _) => v.to_string(),
        Repr::VarUint64(v, _) => v.to_string(),
        Repr::VarInt7(v) => v.to_string(),
        Repr::VarInt32(v, _) => v.to_string(),
        Repr::VarInt64(v, _) => v.to_string(),
        Repr::F32(v) => f32_text(*v),
        Repr::F64(v) => f64_text(*v),
        Repr::V128(bytes) => v128_text(bytes),
        Repr::Bytes(bytes) => quote(bytes),
        Repr::Type(t) => t.to_string(),
        Repr::Heap(h) => h.to_string(),
        Repr::Storage(s) => s.to_string(),
        Repr::Block(BlockType::Empty) => return None,
        Repr::Block(BlockType::Value(t)) => format!("(result {t})"),
        Repr::Block(BlockType::Index(i)) => format!("(type {i})"),
        Repr::External(kind) => kind.to_string(),
    })
}

fn nan_text(negative: bool, payload: u64, canonical: u64) -> String {
    let sign = if negative { "-" } else { "" };
    if payload == canonical {
        format!("{sign}nan")
    } else {
        format!("{sign}nan:0x{payload:x}")
    }
}

fn f32_text(v: f32) -> String {
    if v.is_nan() {
        nan_text(v.is_sign_negative(), (v.to_bits() & 0x007f_ffff) as u64, 0x0040_0000)
    } else if v.is_infinite() {
        String::from(if v < 0.0 { "-inf" } else { "inf" })
    } else {
        v.to_hex()
    }
}

fn f64_text(v: f64) -> String {
    if v.is_nan() {
        nan_text(v.is_sign_negative(), v.to_bits() & 0x000f_ffff_ffff_ffff, 0x0008_0000_0000_0000)
    } else if v.is_infinite() {
        String::from(if v < 0.0 { "-inf" } else { "inf" })
    } else {
        v.to_hex()
    }
}

/// `i32x4` lanes, the shape-neutral rendering of a vector constant.
fn v128_text(bytes: &[u8; 16]) -> String {
    let lanes: Vec<String> = bytes
        .chunks_exact(4)
        .map(|lane| format!("0x{:08x}", LittleEndian::read_u32(lane)))
        .collect();
    format!("i32x4 {}", lanes.join(" "))
}

/// A text format string literal; bytes outside printable ASCII are
/// written as `\hh`.
fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                out.push('\\');
                out.push_str(&hex::encode([b]));
            }
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{HeapType, RefType, ValType};
    use crate::builder::{self, ImportDesc, Limits};
    use crate::demo::factorial_module;
    use crate::instruction::{control, prefixed, MemArg, ResultType, ValueOps, F32, I32};

    fn flat(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn render(node: impl Into<Node>) -> String {
        flat(&print_to_string(&node.into()).unwrap())
    }

    #[test]
    fn factorial_text() {
        let text = render(factorial_module().unwrap());
        assert!(text.starts_with("(module (type 0 (func (param i32) (result i32)))"), "{text}");
        assert!(text.contains("(export \"fact\" (func 0))"));
        assert!(text.contains(
            "(func 0 (type 0) (if (result i32) (i32.eqz (local.get 0)) (then (i32.const 1)) (else (i32.mul"
        ));
        assert!(text.ends_with(")))))))"), "{text}");
    }

    #[test]
    fn indentation_follows_nesting() {
        let text = print_to_string(&factorial_module().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "(module");
        assert_eq!(lines[1], "  (type 0 (func (param i32) (result i32)))");
        assert!(lines.iter().any(|l| l.starts_with("      (then")));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn imports_take_the_first_indices() {
        let m = builder::module(vec![
            builder::type_section(vec![builder::func_type(&[], &[])]).unwrap(),
            builder::import_section(vec![
                builder::import("env", "f", ImportDesc::Func(0)).unwrap(),
                builder::import("env", "mem", ImportDesc::Memory(Limits::new(1).max(2).shared())).unwrap(),
            ])
            .unwrap(),
            builder::function_section(&[0]),
            builder::memory_section(&[Limits::new(1).memory64()]).unwrap(),
            builder::code_section(vec![builder::function_body(&[(2, ValType::I64)], vec![])]).unwrap(),
        ])
        .unwrap();
        let text = render(m);
        assert!(text.contains("(import \"env\" \"f\" (func 0 (type 0)))"), "{text}");
        assert!(text.contains("(import \"env\" \"mem\" (memory 0 1 2 shared))"));
        assert!(text.contains("(memory 1 i64 1)"));
        assert!(text.contains("(func 1 (type 0) (local i64 i64))"));
    }

    #[test]
    fn long_local_runs_print_once_with_count() {
        let body = builder::function_body(&[(5_000_000, ValType::I64), (3, ValType::F32)], vec![]);
        let m = builder::module(vec![
            builder::type_section(vec![builder::func_type(&[], &[])]).unwrap(),
            builder::function_section(&[0]),
            builder::code_section(vec![body]).unwrap(),
        ])
        .unwrap();
        let raw = print_to_string(&m).unwrap();
        assert!(raw.len() < 256, "{} bytes", raw.len());
        assert!(flat(&raw).contains("(func 0 (type 0) (local i64 (;x5000000;) f32 f32 f32))"), "{raw}");

        let widest = builder::function_body(&[(u32::MAX, ValType::I64)], vec![]);
        let mut out = 0usize;
        Printer::new(|chunk: &str| out += chunk.len(), |_| {}).print(&widest);
        assert!(out < 128, "{out} bytes");
    }

    #[test]
    fn recursive_groups_and_subtypes() {
        let point = builder::struct_type(vec![
            builder::field_type(ValType::I32.into(), true),
            builder::field_type(ValType::F64.into(), false),
        ])
        .unwrap();
        let sub = builder::sub_type(false, &[0], builder::func_type(&[], &[])).unwrap();
        let group = builder::rec_type(vec![point, sub]).unwrap();
        let m = builder::module(vec![builder::type_section(vec![group]).unwrap()]).unwrap();
        assert_eq!(
            render(m),
            "(module (rec (type 0 (struct (field (mut i32)) (field f64))) (type 1 (sub 0 (func)))))"
        );
    }

    #[test]
    fn memory_immediates() {
        let load = I32::load(MemArg::new().memory(1).offset(16).align(1), I32::const_(0)).unwrap();
        assert_eq!(render(load), "(i32.load 1 offset=16 align=2 (i32.const 0))");
        let store = F32::store(MemArg::new(), I32::const_(0), F32::const_(1.5)).unwrap();
        // exponent formatting is left to fhex
        assert!(render(store).starts_with("(f32.store (i32.const 0) (f32.const 0x1.8p"));
    }

    #[test]
    fn call_indirect_and_typed_select() {
        let c = control::call_indirect(3, 1, ResultType::Void, vec![I32::const_(0)]);
        assert_eq!(render(c), "(call_indirect 1 (type 3) (i32.const 0))");
        let s = control::select_typed(
            ValType::FUNCREF,
            control::ref_null(HeapType::Func),
            control::ref_func(0),
            I32::const_(1),
        );
        assert_eq!(
            render(s),
            "(select (result funcref) (ref.null func) (ref.func 0) (i32.const 1))"
        );
    }

    #[test]
    fn casts_show_nullability() {
        let cast = crate::instruction::gc::ref_cast(RefType::null(HeapType::Concrete(2)), control::ref_null(HeapType::Any));
        assert_eq!(render(cast), "(ref.cast (ref null 2) (ref.null any))");
    }

    #[test]
    fn unknown_opcodes_are_reported_and_skipped() {
        let bogus = prefixed(encoding::PREFIX_SIMD, 0x1ff, ResultType::Void, vec![], vec![]);
        let mut out = String::new();
        let mut errors = vec![];
        Printer::new(|s: &str| out.push_str(s), |e| errors.push(e)).print(&bogus.into());
        assert_eq!(out, "(unknown)\n");
        assert_eq!(errors, vec![RenderError::unknown_opcode(Some(0xfd), 0x1ff)]);
    }

    #[test]
    fn section_offsets_as_comments() {
        let mut out = String::new();
        let options = PrintOptions {
            indent: "\t".into(),
            section_offsets: true,
        };
        Printer::with_options(|s: &str| out.push_str(s), |_| {}, options).print(&factorial_module().unwrap());
        assert!(out.contains("\t;; type section at 0x8, 8 bytes\n"), "{out}");
        assert!(out.contains(";; function section at 0x10"));
    }

    #[test]
    fn data_and_elements() {
        let m = builder::module(vec![
            builder::element_section(vec![
                builder::elem_segment(
                    builder::ElemMode::Active {
                        table: 0,
                        offset: vec![I32::const_(0)],
                    },
                    builder::ElemItems::Functions(vec![0, 1]),
                ),
                builder::elem_segment(builder::ElemMode::Declarative, builder::ElemItems::Functions(vec![2])),
            ])
            .unwrap(),
            builder::data_section(vec![
                builder::data_segment(builder::DataMode::Passive, b"hi\n".to_vec()),
                builder::data_segment(
                    builder::DataMode::Active {
                        memory: 1,
                        offset: vec![I32::const_(8)],
                    },
                    b"\"".to_vec(),
                ),
            ])
            .unwrap(),
        ])
        .unwrap();
        let text = render(m);
        assert!(text.contains("(elem 0 (offset (i32.const 0)) func 0 1)"), "{text}");
        assert!(text.contains("(elem 1 declare func 2)"));
        assert!(text.contains("(data 0 \"hi\\0a\")"));
        assert!(text.contains("(data 1 (memory 1) (offset (i32.const 8)) \"\\\"\")"));
    }

    #[test]
    fn special_floats() {
        assert_eq!(f32_text(f32::NAN), "nan");
        assert_eq!(f64_text(f64::NEG_INFINITY), "-inf");
        assert_eq!(f32_text(f32::from_bits(0x7f80_0001)), "nan:0x1");
        assert_eq!(v128_text(&[1; 16]), "i32x4 0x01010101 0x01010101 0x01010101 0x01010101");
    }
}
