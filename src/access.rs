//! Read-only views over a built module.

use serde::Serialize;

use crate::ast::{Cell, CellKind, Node, SectionId};

/// Every section of `module`, in order. Empty for anything but a module.
pub fn sections(module: &Node) -> impl Iterator<Item = &Cell> {
    let children = match module.as_cell() {
        Some(cell) if cell.kind() == CellKind::Module => cell.children(),
        _ => &[],
    };
    children.iter().filter_map(Node::as_cell).filter(|c| c.section_id().is_some())
}

/// The first section with the given id.
pub fn find_section(module: &Node, id: SectionId) -> Option<&Cell> {
    sections(module).find(|s| s.section_id() == Some(id))
}

/// One function body, split into its local declarations and its code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionBodyView<'a> {
    /// `local_entry` cells.
    pub locals: &'a [Node],
    /// Instructions, without the closing `end`.
    pub code: &'a [Node],
}

/// Iterates the bodies of a code section without copying them.
pub fn function_bodies(code_section: &Cell) -> impl Iterator<Item = FunctionBodyView<'_>> {
    let bodies = match code_section.section_id() {
        // id, size, count
        Some(SectionId::Code) => code_section.children().get(3..).unwrap_or_default(),
        _ => &[],
    };
    bodies.iter().filter_map(Node::as_cell).map(|body| {
        let c = body.children();
        let n = c.get(1).and_then(Node::as_atom).and_then(|a| a.as_u32()).unwrap_or(0) as usize;
        let locals = c.get(2..2 + n).unwrap_or_default();
        let code = c.get(2 + n..c.len().saturating_sub(1)).unwrap_or_default();
        FunctionBodyView { locals, code }
    })
}

/// Where a section sits in the encoded module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionLayout {
    pub id: SectionId,
    /// Offset of the section id byte.
    pub offset: u32,
    /// Offset of the first payload byte, past the size prefix.
    pub payload_offset: u32,
    /// Payload size, as recorded in the size prefix.
    pub size: u32,
}

/// Byte layout of every section, computed from node lengths alone.
pub fn layout(module: &Node) -> Vec<SectionLayout> {
    let children = match module.as_cell() {
        Some(cell) if cell.kind() == CellKind::Module => cell.children(),
        _ => return vec![],
    };
    let mut out = Vec::new();
    let mut offset = 0;
    for child in children {
        if let Some((id, cell)) = child.as_cell().and_then(|c| c.section_id().map(|id| (id, c))) {
            let header: u32 = cell.children().iter().take(2).map(Node::byte_len).sum();
            out.push(SectionLayout {
                id,
                offset,
                payload_offset: offset + header,
                size: cell.byte_len() - header,
            });
        }
        offset += child.byte_len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::factorial_module;

    #[test]
    fn finds_sections_by_id() {
        let m = factorial_module().unwrap();
        let ids: Vec<SectionId> = sections(&m).filter_map(Cell::section_id).collect();
        assert_eq!(
            ids,
            vec![SectionId::Type, SectionId::Function, SectionId::Export, SectionId::Code]
        );
        assert!(find_section(&m, SectionId::Export).is_some());
        assert!(find_section(&m, SectionId::Data).is_none());
    }

    #[test]
    fn function_body_view_drops_end() {
        let m = factorial_module().unwrap();
        let code = find_section(&m, SectionId::Code).unwrap();
        let bodies: Vec<_> = function_bodies(code).collect();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].locals.is_empty());
        assert_eq!(bodies[0].code.len(), 1);
        assert_eq!(bodies[0].code[0].as_instr().and_then(|i| i.name()), Some("if"));
    }

    #[test]
    fn layout_matches_emitted_bytes() {
        let m = factorial_module().unwrap();
        let bytes = m.to_bytes();
        let layout = layout(&m);
        assert_eq!(layout[0].offset, 8);
        for section in &layout {
            assert_eq!(bytes[section.offset as usize], section.id.code());
        }
        let last = layout.last().unwrap();
        assert_eq!((last.payload_offset + last.size) as usize, bytes.len());
    }

    #[test]
    fn layout_serializes() {
        let layout = layout(&factorial_module().unwrap());
        let json = serde_json::to_string(&layout[0]).unwrap();
        assert_eq!(json, r#"{"id":"type","offset":8,"payload_offset":10,"size":6}"#);
    }
}
