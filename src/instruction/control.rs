//! Control, call, parametric, variable, table and reference instructions.

use crate::ast::{Atom, BlockType, Cell, CellKind, HeapType, Node, RefType, ValType};
use crate::error::BuildError;

use super::{bare, check_block_result, index, plain, structured, Instr, Op, ResultType};

pub fn unreachable() -> Instr {
    bare(Op::Unreachable)
}

pub fn nop() -> Instr {
    bare(Op::Nop)
}

/// `block bt body end`.
pub fn block(bt: BlockType, body: Vec<Instr>) -> Result<Instr, BuildError> {
    check_block_result("block", bt, &body)?;
    Ok(structured(Op::Block, bt, vec![], vec![], body))
}

/// `loop bt body end`.
pub fn loop_(bt: BlockType, body: Vec<Instr>) -> Result<Instr, BuildError> {
    check_block_result("loop", bt, &body)?;
    Ok(structured(Op::Loop, bt, vec![], vec![], body))
}

/// `if bt then (else els)? end`, with `cond` folded in front.
pub fn if_(
    bt: BlockType,
    cond: Instr,
    then: Vec<Instr>,
    els: Option<Vec<Instr>>,
) -> Result<Instr, BuildError> {
    check_block_result("if", bt, &then)?;
    let mut body = then;
    if let Some(els) = els {
        check_block_result("if", bt, &els)?;
        body.push(bare(Op::Else));
        body.extend(els);
    }
    Ok(structured(Op::If, bt, vec![cond], vec![], body))
}

pub fn br(label: u32) -> Instr {
    plain(Op::Br, ResultType::Void, vec![], vec![index(label)])
}

/// `br label` carrying branch values.
pub fn br_with(label: u32, values: Vec<Instr>) -> Instr {
    plain(Op::Br, ResultType::Void, values, vec![index(label)])
}

pub fn br_if(label: u32, cond: Instr) -> Instr {
    plain(Op::BrIf, ResultType::Void, vec![cond], vec![index(label)])
}

/// `br_table l* ld`, selecting a target by `selector`.
pub fn br_table(labels: &[u32], default: u32, selector: Instr) -> Instr {
    plain(
        Op::BrTable,
        ResultType::Void,
        vec![selector],
        vec![counted(labels.iter().map(|l| index(*l)).collect()), index(default)],
    )
}

pub fn return_(values: Vec<Instr>) -> Instr {
    plain(Op::Return, ResultType::Void, values, vec![])
}

// Calls ------------------------------------------------------------------------

/// `call f`. The caller supplies the callee's result type.
pub fn call(func: u32, result: ResultType, args: Vec<Instr>) -> Instr {
    plain(Op::Call, result, args, vec![index(func)])
}

/// `call_indirect table type`; the last operand is the table slot.
pub fn call_indirect(type_index: u32, table: u32, result: ResultType, args: Vec<Instr>) -> Instr {
    plain(Op::CallIndirect, result, args, vec![index(type_index), index(table)])
}

pub fn return_call(func: u32, args: Vec<Instr>) -> Instr {
    plain(Op::ReturnCall, ResultType::Void, args, vec![index(func)])
}

pub fn return_call_indirect(type_index: u32, table: u32, args: Vec<Instr>) -> Instr {
    plain(
        Op::ReturnCallIndirect,
        ResultType::Void,
        args,
        vec![index(type_index), index(table)],
    )
}

/// `call_ref type`; the last operand is the function reference.
pub fn call_ref(type_index: u32, result: ResultType, args: Vec<Instr>) -> Instr {
    plain(Op::CallRef, result, args, vec![index(type_index)])
}

pub fn return_call_ref(type_index: u32, args: Vec<Instr>) -> Instr {
    plain(Op::ReturnCallRef, ResultType::Void, args, vec![index(type_index)])
}

// Parametric ---------------------------------------------------------------------

pub fn drop(v: Instr) -> Instr {
    plain(Op::Drop, ResultType::Void, vec![v], vec![])
}

/// Untyped `select`; the result takes the type of `a`.
pub fn select(a: Instr, b: Instr, cond: Instr) -> Instr {
    let result = a.result();
    plain(Op::Select, result, vec![a, b, cond], vec![])
}

/// `select (result t)`, required for reference operands.
pub fn select_typed(t: ValType, a: Instr, b: Instr, cond: Instr) -> Instr {
    let types = counted(vec![Atom::val_type(t).into()]);
    plain(Op::SelectTyped, t.into(), vec![a, b, cond], vec![types])
}

// Variables ------------------------------------------------------------------------

/// `local.get idx`; `t` is the declared type of the local.
pub fn local_get(t: ValType, idx: u32) -> Instr {
    plain(Op::LocalGet, t.into(), vec![], vec![index(idx)])
}

pub fn local_set(idx: u32, v: Instr) -> Instr {
    plain(Op::LocalSet, ResultType::Void, vec![v], vec![index(idx)])
}

pub fn local_tee(t: ValType, idx: u32, v: Instr) -> Instr {
    plain(Op::LocalTee, t.into(), vec![v], vec![index(idx)])
}

pub fn global_get(t: ValType, idx: u32) -> Instr {
    plain(Op::GlobalGet, t.into(), vec![], vec![index(idx)])
}

pub fn global_set(idx: u32, v: Instr) -> Instr {
    plain(Op::GlobalSet, ResultType::Void, vec![v], vec![index(idx)])
}

// Tables ------------------------------------------------------------------------------

/// `table.get table`; `t` is the table's element type.
pub fn table_get(table: u32, t: RefType, slot: Instr) -> Instr {
    plain(Op::TableGet, ValType::Ref(t).into(), vec![slot], vec![index(table)])
}

pub fn table_set(table: u32, slot: Instr, value: Instr) -> Instr {
    plain(Op::TableSet, ResultType::Void, vec![slot, value], vec![index(table)])
}

// References ----------------------------------------------------------------------------

pub fn ref_null(heap: HeapType) -> Instr {
    plain(
        Op::RefNull,
        ValType::Ref(RefType::null(heap)).into(),
        vec![],
        vec![Atom::heap_type(heap).into()],
    )
}

pub fn ref_is_null(v: Instr) -> Instr {
    plain(Op::RefIsNull, ValType::I32.into(), vec![v], vec![])
}

pub fn ref_func(func: u32) -> Instr {
    plain(
        Op::RefFunc,
        ValType::Ref(RefType::non_null(HeapType::Func)).into(),
        vec![],
        vec![index(func)],
    )
}

pub fn ref_eq(a: Instr, b: Instr) -> Instr {
    plain(Op::RefEq, ValType::I32.into(), vec![a, b], vec![])
}

/// `ref.as_non_null`; `heap` is the heap type of the operand.
pub fn ref_as_non_null(heap: HeapType, v: Instr) -> Instr {
    plain(
        Op::RefAsNonNull,
        ValType::Ref(RefType::non_null(heap)).into(),
        vec![v],
        vec![],
    )
}

pub fn br_on_null(label: u32, heap: HeapType, v: Instr) -> Instr {
    plain(
        Op::BrOnNull,
        ValType::Ref(RefType::non_null(heap)).into(),
        vec![v],
        vec![index(label)],
    )
}

pub fn br_on_non_null(label: u32, v: Instr) -> Instr {
    plain(Op::BrOnNonNull, ResultType::Void, vec![v], vec![index(label)])
}

/// A counted vector immediate.
pub(crate) fn counted(items: Vec<Node>) -> Node {
    let mut children: Vec<Node> = Vec::with_capacity(items.len() + 1);
    children.push(index(items.len() as u32));
    children.extend(items);
    Cell::new(CellKind::Vec, children).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{IntOps, ValueOps, I32};

    fn bytes(instr: Instr) -> Vec<u8> {
        Node::from(instr).to_bytes()
    }

    #[test]
    fn if_else_carries_markers() {
        let iff = if_(
            BlockType::Value(ValType::I32),
            local_get(ValType::I32, 0),
            vec![I32::const_(1)],
            Some(vec![I32::const_(2)]),
        )
        .unwrap();
        assert_eq!(
            bytes(iff),
            vec![0x20, 0x00, 0x04, 0x7f, 0x41, 0x01, 0x05, 0x41, 0x02, 0x0b]
        );
    }

    #[test]
    fn else_branch_is_checked_too() {
        let err = if_(
            BlockType::Value(ValType::I32),
            I32::const_(0),
            vec![I32::const_(1)],
            Some(vec![local_get(ValType::F32, 0)]),
        );
        assert!(matches!(err, Err(BuildError::ResultMismatch { op: "if", .. })));
    }

    #[test]
    fn loop_with_branch() {
        let l = loop_(BlockType::Empty, vec![br_if(0, I32::eqz(local_get(ValType::I32, 0)))]).unwrap();
        assert_eq!(
            bytes(l),
            vec![0x03, 0x40, 0x20, 0x00, 0x45, 0x0d, 0x00, 0x0b]
        );
    }

    #[test]
    fn br_table_encodes_targets() {
        let t = br_table(&[0, 1, 2], 3, local_get(ValType::I32, 0));
        assert_eq!(bytes(t), vec![0x20, 0x00, 0x0e, 0x03, 0x00, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn call_indirect_immediates() {
        let c = call_indirect(2, 1, ResultType::Void, vec![I32::const_(0)]);
        assert_eq!(bytes(c), vec![0x41, 0x00, 0x11, 0x02, 0x01]);
    }

    #[test]
    fn typed_select() {
        let s = select_typed(ValType::FUNCREF, ref_null(HeapType::Func), ref_func(0), I32::const_(1));
        assert_eq!(s.result(), ResultType::Value(ValType::FUNCREF));
        assert_eq!(
            bytes(s),
            vec![0xd0, 0x70, 0xd2, 0x00, 0x41, 0x01, 0x1c, 0x01, 0x70]
        );
    }

    #[test]
    fn ref_null_result_is_nullable() {
        let r = ref_null(HeapType::Concrete(4));
        assert_eq!(
            r.result(),
            ResultType::Value(ValType::Ref(RefType::null(HeapType::Concrete(4))))
        );
        let added = I32::add(I32::const_(1), I32::const_(2));
        assert_eq!(bytes(drop(added)).last(), Some(&0x1a));
    }
}
