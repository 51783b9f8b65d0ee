//! GC instructions: structs, arrays, casts and `i31`, prefix `0xFB`.
//!
//! Allocations yield `(ref $t)` for their type index. Field and element
//! accessors take the declared field type from the caller, since the
//! builder does not resolve type indices.

use crate::ast::{Atom, HeapType, Node, RefType, ValType};
use crate::encoding;

use super::{index, prefixed, GcOp, Instr, ResultType};

fn gc(op: GcOp, result: ResultType, pre: Vec<Instr>, imm: Vec<Node>) -> Instr {
    prefixed(encoding::PREFIX_GC, op.code(), result, pre, imm)
}

fn to_index(type_index: u32) -> ResultType {
    ValType::Ref(RefType::to_index(type_index)).into()
}

// Structs ----------------------------------------------------------------------

pub fn struct_new(type_index: u32, fields: Vec<Instr>) -> Instr {
    gc(GcOp::StructNew, to_index(type_index), fields, vec![index(type_index)])
}

pub fn struct_new_default(type_index: u32) -> Instr {
    gc(GcOp::StructNewDefault, to_index(type_index), vec![], vec![index(type_index)])
}

pub fn struct_get(type_index: u32, field: u32, field_type: ValType, object: Instr) -> Instr {
    gc(
        GcOp::StructGet,
        field_type.into(),
        vec![object],
        vec![index(type_index), index(field)],
    )
}

/// `struct.get_s` of a packed field.
pub fn struct_get_s(type_index: u32, field: u32, object: Instr) -> Instr {
    gc(
        GcOp::StructGetS,
        ValType::I32.into(),
        vec![object],
        vec![index(type_index), index(field)],
    )
}

pub fn struct_get_u(type_index: u32, field: u32, object: Instr) -> Instr {
    gc(
        GcOp::StructGetU,
        ValType::I32.into(),
        vec![object],
        vec![index(type_index), index(field)],
    )
}

pub fn struct_set(type_index: u32, field: u32, object: Instr, value: Instr) -> Instr {
    gc(
        GcOp::StructSet,
        ResultType::Void,
        vec![object, value],
        vec![index(type_index), index(field)],
    )
}

// Arrays -----------------------------------------------------------------------

pub fn array_new(type_index: u32, init: Instr, len: Instr) -> Instr {
    gc(GcOp::ArrayNew, to_index(type_index), vec![init, len], vec![index(type_index)])
}

pub fn array_new_default(type_index: u32, len: Instr) -> Instr {
    gc(GcOp::ArrayNewDefault, to_index(type_index), vec![len], vec![index(type_index)])
}

pub fn array_new_fixed(type_index: u32, values: Vec<Instr>) -> Instr {
    let n = values.len() as u32;
    gc(
        GcOp::ArrayNewFixed,
        to_index(type_index),
        values,
        vec![index(type_index), index(n)],
    )
}

pub fn array_new_data(type_index: u32, data: u32, offset: Instr, len: Instr) -> Instr {
    gc(
        GcOp::ArrayNewData,
        to_index(type_index),
        vec![offset, len],
        vec![index(type_index), index(data)],
    )
}

pub fn array_new_elem(type_index: u32, elem: u32, offset: Instr, len: Instr) -> Instr {
    gc(
        GcOp::ArrayNewElem,
        to_index(type_index),
        vec![offset, len],
        vec![index(type_index), index(elem)],
    )
}

pub fn array_get(type_index: u32, elem_type: ValType, array: Instr, i: Instr) -> Instr {
    gc(GcOp::ArrayGet, elem_type.into(), vec![array, i], vec![index(type_index)])
}

pub fn array_get_s(type_index: u32, array: Instr, i: Instr) -> Instr {
    gc(GcOp::ArrayGetS, ValType::I32.into(), vec![array, i], vec![index(type_index)])
}

pub fn array_get_u(type_index: u32, array: Instr, i: Instr) -> Instr {
    gc(GcOp::ArrayGetU, ValType::I32.into(), vec![array, i], vec![index(type_index)])
}

pub fn array_set(type_index: u32, array: Instr, i: Instr, value: Instr) -> Instr {
    gc(GcOp::ArraySet, ResultType::Void, vec![array, i, value], vec![index(type_index)])
}

pub fn array_len(array: Instr) -> Instr {
    gc(GcOp::ArrayLen, ValType::I32.into(), vec![array], vec![])
}

pub fn array_fill(type_index: u32, array: Instr, offset: Instr, value: Instr, len: Instr) -> Instr {
    gc(
        GcOp::ArrayFill,
        ResultType::Void,
        vec![array, offset, value, len],
        vec![index(type_index)],
    )
}

#[allow(clippy::too_many_arguments)]
pub fn array_copy(
    dst_type: u32,
    src_type: u32,
    dst: Instr,
    dst_offset: Instr,
    src: Instr,
    src_offset: Instr,
    len: Instr,
) -> Instr {
    gc(
        GcOp::ArrayCopy,
        ResultType::Void,
        vec![dst, dst_offset, src, src_offset, len],
        vec![index(dst_type), index(src_type)],
    )
}

pub fn array_init_data(type_index: u32, data: u32, array: Instr, dst: Instr, src: Instr, len: Instr) -> Instr {
    gc(
        GcOp::ArrayInitData,
        ResultType::Void,
        vec![array, dst, src, len],
        vec![index(type_index), index(data)],
    )
}

pub fn array_init_elem(type_index: u32, elem: u32, array: Instr, dst: Instr, src: Instr, len: Instr) -> Instr {
    gc(
        GcOp::ArrayInitElem,
        ResultType::Void,
        vec![array, dst, src, len],
        vec![index(type_index), index(elem)],
    )
}

// Casts ------------------------------------------------------------------------

/// `ref.test rt`: 1 if `v` is an instance of `rt`.
pub fn ref_test(rt: RefType, v: Instr) -> Instr {
    let op = if rt.nullable { GcOp::RefTestNull } else { GcOp::RefTest };
    gc(op, ValType::I32.into(), vec![v], vec![Atom::heap_type(rt.heap).into()])
}

/// `ref.cast rt`: traps unless `v` is an instance of `rt`.
pub fn ref_cast(rt: RefType, v: Instr) -> Instr {
    let op = if rt.nullable { GcOp::RefCastNull } else { GcOp::RefCast };
    gc(op, ValType::Ref(rt).into(), vec![v], vec![Atom::heap_type(rt.heap).into()])
}

fn cast_branch(op: GcOp, label: u32, from: RefType, to: RefType, fallthrough: RefType, v: Instr) -> Instr {
    let flags = (from.nullable as u8) | ((to.nullable as u8) << 1);
    gc(
        op,
        ValType::Ref(fallthrough).into(),
        vec![v],
        vec![
            Atom::uint8(flags).into(),
            index(label),
            Atom::heap_type(from.heap).into(),
            Atom::heap_type(to.heap).into(),
        ],
    )
}

/// `br_on_cast label from to`: branches when `v` casts to `to`. A null
/// that `to` accepts is taken, so the fallthrough is non-null then.
pub fn br_on_cast(label: u32, from: RefType, to: RefType, v: Instr) -> Instr {
    let fallthrough = RefType {
        nullable: from.nullable && !to.nullable,
        heap: from.heap,
    };
    cast_branch(GcOp::BrOnCast, label, from, to, fallthrough, v)
}

/// `br_on_cast_fail label from to`: branches when the cast fails.
pub fn br_on_cast_fail(label: u32, from: RefType, to: RefType, v: Instr) -> Instr {
    cast_branch(GcOp::BrOnCastFail, label, from, to, to, v)
}

pub fn any_convert_extern(v: Instr) -> Instr {
    gc(GcOp::AnyConvertExtern, ValType::ANYREF.into(), vec![v], vec![])
}

pub fn extern_convert_any(v: Instr) -> Instr {
    gc(GcOp::ExternConvertAny, ValType::EXTERNREF.into(), vec![v], vec![])
}

// i31 --------------------------------------------------------------------------

pub fn ref_i31(v: Instr) -> Instr {
    gc(
        GcOp::RefI31,
        ValType::Ref(RefType::non_null(HeapType::I31)).into(),
        vec![v],
        vec![],
    )
}

pub fn i31_get_s(v: Instr) -> Instr {
    gc(GcOp::I31GetS, ValType::I32.into(), vec![v], vec![])
}

pub fn i31_get_u(v: Instr) -> Instr {
    gc(GcOp::I31GetU, ValType::I32.into(), vec![v], vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{control, I32};

    fn bytes(instr: Instr) -> Vec<u8> {
        Node::from(instr).to_bytes()
    }

    #[test]
    fn allocation_yields_reference_to_type() {
        let s = struct_new(3, vec![I32::const_(1)]);
        assert_eq!(s.result(), ResultType::Value(ValType::Ref(RefType::to_index(3))));
        assert_eq!(bytes(s), vec![0x41, 0x01, 0xfb, 0x00, 0x03]);
    }

    #[test]
    fn nullable_casts_use_the_null_opcode() {
        let v = control::ref_null(HeapType::Any);
        let cast = ref_cast(RefType::null(HeapType::Concrete(2)), v.clone());
        assert_eq!(&bytes(cast)[2..], &[0xfb, 0x17, 0x02]);
        let test = ref_test(RefType::non_null(HeapType::I31), v);
        assert_eq!(&bytes(test)[2..], &[0xfb, 0x14, 0x6c]);
    }

    #[test]
    fn br_on_cast_flags() {
        let v = control::ref_null(HeapType::Any);
        let b = br_on_cast(0, RefType::ANYREF, RefType::non_null(HeapType::Concrete(1)), v);
        assert_eq!(&bytes(b)[2..], &[0xfb, 0x18, 0x01, 0x00, 0x6e, 0x01]);
    }

    #[test]
    fn br_on_cast_fallthrough_drops_null_taken_by_target() {
        let v = || control::ref_null(HeapType::Any);
        let taken = br_on_cast(0, RefType::ANYREF, RefType::null(HeapType::I31), v());
        assert_eq!(taken.result(), ResultType::Value(ValType::Ref(RefType::non_null(HeapType::Any))));
        let kept = br_on_cast(0, RefType::ANYREF, RefType::non_null(HeapType::I31), v());
        assert_eq!(kept.result(), ResultType::Value(ValType::ANYREF));
        let failed = br_on_cast_fail(0, RefType::ANYREF, RefType::null(HeapType::I31), v());
        assert_eq!(failed.result(), ResultType::Value(ValType::Ref(RefType::null(HeapType::I31))));

        let ok = control::block(
            crate::ast::BlockType::Value(ValType::Ref(RefType::non_null(HeapType::Any))),
            vec![br_on_cast(0, RefType::ANYREF, RefType::null(HeapType::I31), v())],
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn array_new_fixed_counts_operands() {
        let a = array_new_fixed(0, vec![I32::const_(1), I32::const_(2)]);
        assert_eq!(&bytes(a)[4..], &[0xfb, 0x08, 0x00, 0x02]);
    }

    #[test]
    fn i31_roundtrip_types() {
        let r = ref_i31(I32::const_(7));
        assert_eq!(r.result(), ResultType::Value(ValType::Ref(RefType::non_null(HeapType::I31))));
        assert_eq!(i31_get_u(r).result(), ResultType::Value(ValType::I32));
    }
}
