//! Bulk memory and table instructions, prefix `0xFC`.

use crate::ast::ValType;
use crate::encoding;

use super::{index, prefixed, Instr, MiscOp, ResultType};

fn misc(op: MiscOp, result: ResultType, pre: Vec<Instr>, imm: Vec<u32>) -> Instr {
    prefixed(
        encoding::PREFIX_MISC,
        op.code(),
        result,
        pre,
        imm.into_iter().map(index).collect(),
    )
}

/// `memory.init data memory`: copies `len` bytes of a passive segment.
pub fn memory_init(data: u32, memory: u32, dst: Instr, src: Instr, len: Instr) -> Instr {
    misc(MiscOp::MemoryInit, ResultType::Void, vec![dst, src, len], vec![data, memory])
}

pub fn data_drop(data: u32) -> Instr {
    misc(MiscOp::DataDrop, ResultType::Void, vec![], vec![data])
}

pub fn memory_copy(dst_memory: u32, src_memory: u32, dst: Instr, src: Instr, len: Instr) -> Instr {
    misc(
        MiscOp::MemoryCopy,
        ResultType::Void,
        vec![dst, src, len],
        vec![dst_memory, src_memory],
    )
}

pub fn memory_fill(memory: u32, dst: Instr, value: Instr, len: Instr) -> Instr {
    misc(MiscOp::MemoryFill, ResultType::Void, vec![dst, value, len], vec![memory])
}

/// `table.init elem table`.
pub fn table_init(elem: u32, table: u32, dst: Instr, src: Instr, len: Instr) -> Instr {
    misc(MiscOp::TableInit, ResultType::Void, vec![dst, src, len], vec![elem, table])
}

pub fn elem_drop(elem: u32) -> Instr {
    misc(MiscOp::ElemDrop, ResultType::Void, vec![], vec![elem])
}

pub fn table_copy(dst_table: u32, src_table: u32, dst: Instr, src: Instr, len: Instr) -> Instr {
    misc(
        MiscOp::TableCopy,
        ResultType::Void,
        vec![dst, src, len],
        vec![dst_table, src_table],
    )
}

/// `table.grow`: yields the previous size, or -1.
pub fn table_grow(table: u32, init: Instr, delta: Instr) -> Instr {
    misc(MiscOp::TableGrow, ValType::I32.into(), vec![init, delta], vec![table])
}

pub fn table_size(table: u32) -> Instr {
    misc(MiscOp::TableSize, ValType::I32.into(), vec![], vec![table])
}

pub fn table_fill(table: u32, dst: Instr, value: Instr, len: Instr) -> Instr {
    misc(MiscOp::TableFill, ResultType::Void, vec![dst, value, len], vec![table])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::instruction::I32;

    #[test]
    fn memory_init_immediates_follow_sub_opcode() {
        let init = memory_init(3, 0, I32::const_(0), I32::const_(0), I32::const_(4));
        assert_eq!(
            Node::from(init).to_bytes(),
            vec![0x41, 0x00, 0x41, 0x00, 0x41, 0x04, 0xfc, 0x08, 0x03, 0x00]
        );
    }

    #[test]
    fn drops_take_only_an_index() {
        assert_eq!(Node::from(data_drop(1)).to_bytes(), vec![0xfc, 0x09, 0x01]);
        assert_eq!(Node::from(elem_drop(2)).to_bytes(), vec![0xfc, 0x0d, 0x02]);
    }

    #[test]
    fn table_size_result() {
        assert_eq!(table_size(0).result(), ResultType::Value(ValType::I32));
    }
}
