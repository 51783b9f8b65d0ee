//! Linear memory access.

use crate::ast::{Atom, Cell, CellKind, Node, ValType};
use crate::encoding;
use crate::error::BuildError;

use super::{index, plain, Instr, Op, ResultType};

/// Memory immediate of a load, store or atomic access.
///
/// `align` is the alignment exponent (`2^align` bytes); `None` uses the
/// natural alignment of the access. `memory` selects a memory other than
/// the default one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemArg {
    pub align: Option<u32>,
    pub offset: u64,
    pub memory: Option<u32>,
}

impl MemArg {
    pub fn new() -> MemArg {
        MemArg::default()
    }

    pub fn align(mut self, align: u32) -> MemArg {
        self.align = Some(align);
        self
    }

    pub fn offset(mut self, offset: u64) -> MemArg {
        self.offset = offset;
        self
    }

    pub fn memory(mut self, memory: u32) -> MemArg {
        self.memory = Some(memory);
        self
    }

    /// Encodes the immediate for an access with the given natural
    /// alignment.
    ///
    /// ```text
    /// memarg ::= a:u32 o:u64              (memory 0)
    ///          | (a|0x40):u32 m:u32 o:u64 (memory m)
    /// ```
    pub(crate) fn encode(&self, op: &'static str, natural: u8) -> Result<Node, BuildError> {
        let align = self.align.unwrap_or(natural as u32);
        if align > natural as u32 {
            return Err(BuildError::Alignment {
                op,
                align,
                natural: natural as u32,
            });
        }
        let mut children: Vec<Node> = Vec::with_capacity(3);
        match self.memory {
            Some(memory) => {
                children.push(Atom::varuint32(align | encoding::MEMARG_HAS_MEMORY).into());
                children.push(index(memory));
            }
            None => children.push(Atom::varuint32(align).into()),
        }
        children.push(Atom::varuint64(self.offset).into());
        Ok(Cell::new(
            CellKind::MemArg {
                natural_align: natural,
            },
            children,
        )
        .into())
    }
}

/// Natural alignment exponent of a primary-space load or store.
pub(crate) fn natural_align(op: Op) -> u8 {
    use Op::*;
    match op {
        I32Load8S | I32Load8U | I64Load8S | I64Load8U | I32Store8 | I64Store8 => 0,
        I32Load16S | I32Load16U | I64Load16S | I64Load16U | I32Store16 | I64Store16 => 1,
        I32Load | F32Load | I64Load32S | I64Load32U | I32Store | F32Store | I64Store32 => 2,
        _ => 3,
    }
}

pub(crate) fn load(op: Op, result: ValType, m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
    let memarg = m.encode(op.name(), natural_align(op))?;
    Ok(plain(op, ResultType::Value(result), vec![addr], vec![memarg]))
}

pub(crate) fn store(op: Op, m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
    let memarg = m.encode(op.name(), natural_align(op))?;
    Ok(plain(op, ResultType::Void, vec![addr, value], vec![memarg]))
}

/// `memory.size`: current size of `memory` in pages.
pub fn memory_size(memory: u32) -> Instr {
    sized(Op::MemorySize, ValType::I32, memory, vec![])
}

/// `memory.grow`: grows `memory` by `delta` pages, yielding the old size.
pub fn memory_grow(memory: u32, delta: Instr) -> Instr {
    sized(Op::MemoryGrow, ValType::I32, memory, vec![delta])
}

/// `memory.size` on a 64-bit memory; the page count is an i64.
pub fn memory_size64(memory: u32) -> Instr {
    sized(Op::MemorySize, ValType::I64, memory, vec![])
}

/// `memory.grow` on a 64-bit memory. `delta` and the old size are i64.
pub fn memory_grow64(memory: u32, delta: Instr) -> Instr {
    sized(Op::MemoryGrow, ValType::I64, memory, vec![delta])
}

fn sized(op: Op, address: ValType, memory: u32, pre: Vec<Instr>) -> Instr {
    plain(op, address.into(), pre, vec![index(memory)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BlockType;
    use crate::instruction::control::block;
    use crate::instruction::{ValueOps, I32, I64};

    fn bytes(instr: Instr) -> Vec<u8> {
        Node::from(instr).to_bytes()
    }

    #[test]
    fn natural_alignment_by_default() {
        let load = I32::load(MemArg::new().offset(8), I32::const_(0)).unwrap();
        assert_eq!(bytes(load), vec![0x41, 0x00, 0x28, 0x02, 0x08]);
    }

    #[test]
    fn explicit_memory_sets_bit_six() {
        let load = I32::load(MemArg::new().memory(1), I32::const_(0)).unwrap();
        assert_eq!(bytes(load), vec![0x41, 0x00, 0x28, 0x42, 0x01, 0x00]);
    }

    #[test]
    fn over_aligned_access_is_rejected() {
        let err = I32::load(MemArg::new().align(3), I32::const_(0)).unwrap_err();
        assert_eq!(
            err,
            BuildError::Alignment {
                op: "i32.load",
                align: 3,
                natural: 2
            }
        );
        assert!(I64::load(MemArg::new().align(3), I32::const_(0)).is_ok());
    }

    #[test]
    fn large_offsets_use_varuint64() {
        let store = I64::store(MemArg::new().offset(1 << 40), I32::const_(0), I64::const_(1)).unwrap();
        let encoded = bytes(store);
        assert_eq!(&encoded[4..6], &[0x37, 0x03]);
        assert_eq!(encoded.len(), 6 + 6);
    }

    #[test]
    fn memory64_size_and_grow_yield_i64() {
        assert_eq!(memory_size64(0).result(), ValType::I64.into());
        assert_eq!(memory_size(0).result(), ValType::I32.into());
        let grow = memory_grow64(0, I64::const_(1));
        assert_eq!(grow.result(), ValType::I64.into());
        assert_eq!(bytes(grow.clone()), vec![0x42, 0x01, 0x40, 0x00]);
        assert!(block(BlockType::Value(ValType::I64), vec![grow]).is_ok());
        assert!(block(BlockType::Value(ValType::I64), vec![memory_grow(0, I32::const_(1))]).is_err());
    }
}
