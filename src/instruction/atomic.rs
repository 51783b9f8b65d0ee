//! Threads and atomics, prefix `0xFE`.
//!
//! Validators require atomic accesses to be naturally aligned; leave
//! [`MemArg::align`] unset.

use crate::ast::{Atom, ValType};
use crate::encoding;
use crate::error::BuildError;

use super::memory::MemArg;
use super::{prefixed, AtomicOp, Instr, ResultType};

/// Widths and value types of the seven-member load, store and
/// read-modify-write groups, in code order.
const GROUP: [(u8, ValType); 7] = [
    (2, ValType::I32),
    (3, ValType::I64),
    (0, ValType::I32),
    (1, ValType::I32),
    (0, ValType::I64),
    (1, ValType::I64),
    (2, ValType::I64),
];

const LOADS: std::ops::RangeInclusive<u32> = 0x10..=0x16;
const STORES: std::ops::RangeInclusive<u32> = 0x17..=0x1d;
const RMWS: std::ops::RangeInclusive<u32> = 0x1e..=0x47;
const CMPXCHGS: std::ops::RangeInclusive<u32> = 0x48..=0x4e;

fn group_member(op: AtomicOp) -> (u8, ValType) {
    GROUP[((op.code() - 0x10) % 7) as usize]
}

fn atomic(op: AtomicOp, result: ResultType, pre: Vec<Instr>, m: MemArg, natural: u8) -> Result<Instr, BuildError> {
    let memarg = m.encode(op.name(), natural)?;
    Ok(prefixed(encoding::PREFIX_ATOMIC, op.code(), result, pre, vec![memarg]))
}

fn family(op: AtomicOp, range: std::ops::RangeInclusive<u32>, name: &'static str) -> Result<(u8, ValType), BuildError> {
    if range.contains(&op.code()) {
        Ok(group_member(op))
    } else {
        Err(BuildError::WrongFamily { op: op.name(), family: name })
    }
}

/// `memory.atomic.notify`: wakes up to `count` waiters, yielding the number
/// woken.
pub fn notify(m: MemArg, addr: Instr, count: Instr) -> Result<Instr, BuildError> {
    atomic(AtomicOp::MemoryAtomicNotify, ValType::I32.into(), vec![addr, count], m, 2)
}

/// `memory.atomic.wait32`: yields 0 (woken), 1 (not equal) or 2 (timed out).
pub fn wait32(m: MemArg, addr: Instr, expected: Instr, timeout: Instr) -> Result<Instr, BuildError> {
    atomic(
        AtomicOp::MemoryAtomicWait32,
        ValType::I32.into(),
        vec![addr, expected, timeout],
        m,
        2,
    )
}

pub fn wait64(m: MemArg, addr: Instr, expected: Instr, timeout: Instr) -> Result<Instr, BuildError> {
    atomic(
        AtomicOp::MemoryAtomicWait64,
        ValType::I32.into(),
        vec![addr, expected, timeout],
        m,
        3,
    )
}

/// `atomic.fence`, with its reserved zero byte.
pub fn fence() -> Instr {
    prefixed(
        encoding::PREFIX_ATOMIC,
        AtomicOp::AtomicFence.code(),
        ResultType::Void,
        vec![],
        vec![Atom::uint8(0).into()],
    )
}

pub fn load(op: AtomicOp, m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
    let (natural, t) = family(op, LOADS, "atomic load")?;
    atomic(op, t.into(), vec![addr], m, natural)
}

pub fn store(op: AtomicOp, m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
    let (natural, _) = family(op, STORES, "atomic store")?;
    atomic(op, ResultType::Void, vec![addr, value], m, natural)
}

/// Read-modify-write (`add`, `sub`, `and`, `or`, `xor`, `xchg`), yielding
/// the previous value.
pub fn rmw(op: AtomicOp, m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
    let (natural, t) = family(op, RMWS, "atomic read-modify-write")?;
    atomic(op, t.into(), vec![addr, value], m, natural)
}

pub fn cmpxchg(op: AtomicOp, m: MemArg, addr: Instr, expected: Instr, replacement: Instr) -> Result<Instr, BuildError> {
    let (natural, t) = family(op, CMPXCHGS, "atomic compare-exchange")?;
    atomic(op, t.into(), vec![addr, expected, replacement], m, natural)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::instruction::{I32, I64};

    #[test]
    fn widths_follow_the_group_pattern() {
        assert_eq!(group_member(AtomicOp::I64AtomicRmw32XchgU), (2, ValType::I64));
        assert_eq!(group_member(AtomicOp::I32AtomicRmw8CmpxchgU), (0, ValType::I32));
        assert_eq!(group_member(AtomicOp::I64AtomicStore16), (1, ValType::I64));
    }

    #[test]
    fn rmw_result_and_encoding() {
        let add = rmw(AtomicOp::I64AtomicRmwAdd, MemArg::new(), I32::const_(0), I64::const_(1)).unwrap();
        assert_eq!(add.result(), ResultType::Value(ValType::I64));
        assert_eq!(
            Node::from(add).to_bytes(),
            vec![0x41, 0x00, 0x42, 0x01, 0xfe, 0x1f, 0x03, 0x00]
        );
    }

    #[test]
    fn family_is_checked() {
        let err = load(AtomicOp::I32AtomicStore, MemArg::new(), I32::const_(0)).unwrap_err();
        assert_eq!(
            err,
            BuildError::WrongFamily {
                op: "i32.atomic.store",
                family: "atomic load"
            }
        );
    }

    #[test]
    fn fence_has_reserved_byte() {
        assert_eq!(Node::from(fence()).to_bytes(), vec![0xfe, 0x03, 0x00]);
    }

    #[test]
    fn wait_alignment() {
        let err = wait32(MemArg::new().align(3), I32::const_(0), I32::const_(0), I64::const_(-1));
        assert!(matches!(err, Err(BuildError::Alignment { natural: 2, .. })));
    }
}
