//! Instruction nodes and their constructors.
//!
//! An instruction carries three operand groups, emitted in this order
//! around its opcode:
//!
//! ```text
//! instr ::= pre:instr*  prefix?:u8  opcode  imm:node*  post:instr*
//! ```
//!
//! `pre` holds the instructions producing the stack operands (folded form),
//! `imm` the immediates and `post` the nested body of structured control,
//! always closed by exactly one `end` marker (or `delegate` for a legacy
//! `try`). Prefixed sub-opcodes are `varuint32`; primary opcodes are one
//! byte.
//!
//! Constructors live in the submodules, grouped by family. Scalar numeric
//! operators are exposed through the zero-sized operator sets [`I32`],
//! [`I64`], [`F32`] and [`F64`]; vector operators through [`V128`].

pub mod atomic;
pub mod bulk;
pub mod control;
pub mod exceptions;
pub mod gc;
pub mod memory;
pub mod numeric;
pub mod opcodes;
pub mod simd;

use std::fmt;

pub use memory::MemArg;
pub use numeric::{FloatOps, IntOps, ValueOps, F32, F64, I32, I64};
pub use opcodes::{AtomicOp, GcOp, MiscOp, Op, SimdOp};
pub use simd::{LaneShape, V128};

use crate::ast::{Atom, BlockType, Node, ValType};
use crate::emit::Emitter;
use crate::encoding::Leb128;
use crate::error::BuildError;

/// Static result of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Void,
    Value(ValType),
    /// Structured control whose block type is a type index; the results
    /// are whatever that function type declares.
    TypeIndex(u32),
}

impl From<ValType> for ResultType {
    fn from(t: ValType) -> Self {
        ResultType::Value(t)
    }
}

impl From<BlockType> for ResultType {
    fn from(bt: BlockType) -> Self {
        match bt {
            BlockType::Empty => ResultType::Void,
            BlockType::Value(t) => ResultType::Value(t),
            BlockType::Index(i) => ResultType::TypeIndex(i),
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultType::Void => f.write_str("void"),
            ResultType::Value(t) => write!(f, "{t}"),
            ResultType::TypeIndex(i) => write!(f, "type {i}"),
        }
    }
}

/// Which operand groups an instruction uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrShape {
    Bare,
    ImmOnly,
    Unary,
    Nary,
    PreImm,
    ImmPost,
    PreImmPost,
}

/// One instruction. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    prefix: Option<u8>,
    opcode: u32,
    result: ResultType,
    pre: Vec<Node>,
    imm: Vec<Node>,
    post: Vec<Node>,
    len: u32,
}

impl Instr {
    pub(crate) fn new(
        prefix: Option<u8>,
        opcode: u32,
        result: ResultType,
        pre: Vec<Instr>,
        imm: Vec<Node>,
        post: Vec<Instr>,
    ) -> Instr {
        let pre: Vec<Node> = pre.into_iter().map(Node::Instr).collect();
        let post: Vec<Node> = post.into_iter().map(Node::Instr).collect();
        let opcode_len = match prefix {
            Some(_) => 1 + Leb128::unsigned(opcode as u64).len(),
            None => 1,
        };
        let len = opcode_len
            + pre.iter().map(Node::byte_len).sum::<u32>()
            + imm.iter().map(Node::byte_len).sum::<u32>()
            + post.iter().map(Node::byte_len).sum::<u32>();
        Instr {
            prefix,
            opcode,
            result,
            pre,
            imm,
            post,
            len,
        }
    }

    pub fn prefix(&self) -> Option<u8> {
        self.prefix
    }

    pub fn opcode(&self) -> u32 {
        self.opcode
    }

    pub fn result(&self) -> ResultType {
        self.result
    }

    pub fn pre(&self) -> &[Node] {
        &self.pre
    }

    pub fn imm(&self) -> &[Node] {
        &self.imm
    }

    pub fn post(&self) -> &[Node] {
        &self.post
    }

    pub fn byte_len(&self) -> u32 {
        self.len
    }

    /// Text mnemonic, if the opcode is known.
    pub fn name(&self) -> Option<&'static str> {
        opcodes::name_of(self.prefix, self.opcode)
    }

    /// Whether this is the unprefixed instruction `op`.
    pub fn is(&self, op: Op) -> bool {
        self.prefix.is_none() && self.opcode == op.code()
    }

    pub fn shape(&self) -> InstrShape {
        match (self.pre.len(), self.imm.is_empty(), self.post.is_empty()) {
            (0, true, true) => InstrShape::Bare,
            (0, false, true) => InstrShape::ImmOnly,
            (1, true, true) => InstrShape::Unary,
            (_, true, true) => InstrShape::Nary,
            (_, false, true) => InstrShape::PreImm,
            (0, _, false) => InstrShape::ImmPost,
            (_, _, false) => InstrShape::PreImmPost,
        }
    }

    pub fn emit(&self, e: &mut Emitter) {
        for node in &self.pre {
            node.emit(e);
        }
        match self.prefix {
            Some(prefix) => {
                e.write_u8(prefix);
                e.write_bytes(Leb128::unsigned(self.opcode as u64).as_bytes());
            }
            None => e.write_u8(self.opcode as u8),
        }
        for node in self.imm.iter().chain(&self.post) {
            node.emit(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared constructor helpers
// ---------------------------------------------------------------------------

/// An index or count immediate.
pub(crate) fn index(v: u32) -> Node {
    Atom::varuint32(v).into()
}

/// A primary-space instruction with no body.
pub(crate) fn plain(op: Op, result: ResultType, pre: Vec<Instr>, imm: Vec<Node>) -> Instr {
    Instr::new(None, op.code(), result, pre, imm, vec![])
}

pub(crate) fn bare(op: Op) -> Instr {
    plain(op, ResultType::Void, vec![], vec![])
}

pub(crate) fn unary(op: Op, result: ValType, operand: Instr) -> Instr {
    plain(op, ResultType::Value(result), vec![operand], vec![])
}

pub(crate) fn binary(op: Op, result: ValType, lhs: Instr, rhs: Instr) -> Instr {
    plain(op, ResultType::Value(result), vec![lhs, rhs], vec![])
}

/// A prefixed-space instruction with no body.
pub(crate) fn prefixed(prefix: u8, code: u32, result: ResultType, pre: Vec<Instr>, imm: Vec<Node>) -> Instr {
    Instr::new(Some(prefix), code, result, pre, imm, vec![])
}

/// The `end` marker closing a body or expression.
pub fn end() -> Instr {
    bare(Op::End)
}

/// Checks that a body whose last instruction has a concrete result agrees
/// with the declared block type.
pub(crate) fn check_block_result(op: &'static str, bt: BlockType, body: &[Instr]) -> Result<(), BuildError> {
    if let (BlockType::Value(expected), Some(last)) = (bt, body.last()) {
        if let ResultType::Value(actual) = last.result() {
            if actual != expected {
                return Err(BuildError::ResultMismatch {
                    op,
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Builds a structured instruction: `body` is closed with `end`.
pub(crate) fn structured(
    op: Op,
    bt: BlockType,
    pre: Vec<Instr>,
    extra_imm: Vec<Node>,
    mut body: Vec<Instr>,
) -> Instr {
    body.push(end());
    let mut imm: Vec<Node> = vec![Atom::block_type(bt).into()];
    imm.extend(extra_imm);
    Instr::new(None, op.code(), bt.into(), pre, imm, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;

    #[test]
    fn prefixed_opcode_is_leb_encoded() {
        let instr = prefixed(encoding::PREFIX_SIMD, 0x113, ResultType::Void, vec![], vec![]);
        assert_eq!(instr.byte_len(), 3);
        assert_eq!(Node::from(instr).to_bytes(), vec![0xfd, 0x93, 0x02]);
    }

    #[test]
    fn shapes() {
        assert_eq!(bare(Op::Nop).shape(), InstrShape::Bare);
        assert_eq!(I32::const_(1).shape(), InstrShape::ImmOnly);
        assert_eq!(I32::clz(I32::const_(1)).shape(), InstrShape::Unary);
        assert_eq!(I32::add(I32::const_(1), I32::const_(2)).shape(), InstrShape::Nary);
        assert_eq!(control::local_set(0, I32::const_(1)).shape(), InstrShape::PreImm);
        let block = control::block(BlockType::Empty, vec![]).unwrap();
        assert_eq!(block.shape(), InstrShape::ImmPost);
        let iff = control::if_(BlockType::Empty, I32::const_(1), vec![], None).unwrap();
        assert_eq!(iff.shape(), InstrShape::PreImmPost);
    }

    #[test]
    fn operands_precede_the_opcode() {
        let add = I32::add(I32::const_(1), I32::const_(2));
        assert_eq!(Node::from(add).to_bytes(), vec![0x41, 0x01, 0x41, 0x02, 0x6a]);
    }

    #[test]
    fn block_result_must_match_last_instruction() {
        let err = control::block(BlockType::Value(ValType::I32), vec![I64::const_(1)]).unwrap_err();
        assert_eq!(
            err,
            BuildError::ResultMismatch {
                op: "block",
                expected: "i32".into(),
                actual: "i64".into(),
            }
        );
        assert!(control::block(BlockType::Value(ValType::I32), vec![I32::const_(1)]).is_ok());
    }
}
