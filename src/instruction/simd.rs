//! 128-bit SIMD and relaxed SIMD instructions, prefix `0xFD`.
//!
//! Instructions with immediates (memory access, lane indices, constants,
//! shuffles) have dedicated constructors on [`V128`]. Every other vector
//! operator goes through [`V128::op`], which checks the operand count
//! against the operator's signature.

use byteorder::{ByteOrder, LittleEndian};

use crate::ast::{Atom, Node, ValType};
use crate::encoding;
use crate::error::BuildError;

use super::memory::MemArg;
use super::{prefixed, Instr, ResultType, SimdOp};

/// Lane interpretation of a `v128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneShape {
    I8x16,
    I16x8,
    I32x4,
    I64x2,
    F32x4,
    F64x2,
}

impl LaneShape {
    pub fn lanes(self) -> u8 {
        match self {
            LaneShape::I8x16 => 16,
            LaneShape::I16x8 => 8,
            LaneShape::I32x4 | LaneShape::F32x4 => 4,
            LaneShape::I64x2 | LaneShape::F64x2 => 2,
        }
    }

    pub fn lane_bits(self) -> u32 {
        128 / self.lanes() as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            LaneShape::I8x16 => "i8x16",
            LaneShape::I16x8 => "i16x8",
            LaneShape::I32x4 => "i32x4",
            LaneShape::I64x2 => "i64x2",
            LaneShape::F32x4 => "f32x4",
            LaneShape::F64x2 => "f64x2",
        }
    }

    /// The scalar type a single lane extracts to.
    pub fn scalar(self) -> ValType {
        match self {
            LaneShape::I8x16 | LaneShape::I16x8 | LaneShape::I32x4 => ValType::I32,
            LaneShape::I64x2 => ValType::I64,
            LaneShape::F32x4 => ValType::F32,
            LaneShape::F64x2 => ValType::F64,
        }
    }

    /// The shape an operator works on, read from its mnemonic.
    pub fn of(op: SimdOp) -> Option<LaneShape> {
        let (shape, _) = op.name().split_once('.')?;
        Some(match shape {
            "i8x16" => LaneShape::I8x16,
            "i16x8" => LaneShape::I16x8,
            "i32x4" => LaneShape::I32x4,
            "i64x2" => LaneShape::I64x2,
            "f32x4" => LaneShape::F32x4,
            "f64x2" => LaneShape::F64x2,
            _ => return None,
        })
    }

    fn splat_op(self) -> SimdOp {
        match self {
            LaneShape::I8x16 => SimdOp::I8x16Splat,
            LaneShape::I16x8 => SimdOp::I16x8Splat,
            LaneShape::I32x4 => SimdOp::I32x4Splat,
            LaneShape::I64x2 => SimdOp::I64x2Splat,
            LaneShape::F32x4 => SimdOp::F32x4Splat,
            LaneShape::F64x2 => SimdOp::F64x2Splat,
        }
    }

    fn is_float(self) -> bool {
        matches!(self, LaneShape::F32x4 | LaneShape::F64x2)
    }
}

/// Natural alignment exponent of a vector memory access.
fn natural_align(op: SimdOp) -> Option<u8> {
    Some(match op.code() {
        0 | 11 => 4,
        1..=6 | 10 | 93 | 87 | 91 => 3,
        7 | 84 | 88 => 0,
        8 | 85 | 89 => 1,
        9 | 92 | 86 | 90 => 2,
        _ => return None,
    })
}

/// Operand count and result of an operator without immediates.
fn signature(op: SimdOp) -> Option<(usize, ValType)> {
    if matches!(op.code(), 0..=13 | 21..=34 | 84..=93) {
        return None;
    }
    let (_, action) = op.name().split_once('.')?;
    let unary = [
        "not", "abs", "neg", "popcnt", "ceil", "floor", "trunc", "nearest", "sqrt",
    ];
    let unary_prefixes = [
        "extend_", "extadd_", "convert", "trunc_sat", "demote", "promote", "relaxed_trunc",
    ];
    let ternary = [
        "bitselect",
        "relaxed_madd",
        "relaxed_nmadd",
        "relaxed_laneselect",
        "relaxed_dot_i8x16_i7x16_add_s",
    ];
    Some(match action {
        "splat" => (1, ValType::V128),
        "any_true" | "all_true" | "bitmask" => (1, ValType::I32),
        a if ternary.contains(&a) => (3, ValType::V128),
        a if unary.contains(&a) || unary_prefixes.iter().any(|p| a.starts_with(p)) => (1, ValType::V128),
        _ => (2, ValType::V128),
    })
}

fn simd(op: SimdOp, result: ValType, pre: Vec<Instr>, imm: Vec<Node>) -> Instr {
    prefixed(encoding::PREFIX_SIMD, op.code(), ResultType::Value(result), pre, imm)
}

fn wrong_family(op: SimdOp, family: &'static str) -> BuildError {
    BuildError::WrongFamily { op: op.name(), family }
}

fn check_lane(op: SimdOp, lane: u8, lanes: u8) -> Result<(), BuildError> {
    if lane >= lanes {
        return Err(BuildError::LaneIndex {
            op: op.name(),
            lane,
            lanes,
        });
    }
    Ok(())
}

/// `v128` operators.
#[derive(Debug, Clone, Copy)]
pub struct V128;

impl V128 {
    /// `v128.const` from raw little-endian bytes.
    pub fn const_(bytes: [u8; 16]) -> Instr {
        simd(SimdOp::V128Const, ValType::V128, vec![], vec![Atom::v128(bytes).into()])
    }

    /// `v128.const` from integer lanes. Each lane must fit its width,
    /// signed or unsigned.
    pub fn const_ints(shape: LaneShape, lanes: &[i64]) -> Result<Instr, BuildError> {
        if shape.is_float() {
            return Err(wrong_family(SimdOp::V128Const, "integer lane"));
        }
        check_lane_count(shape, lanes.len())?;
        let bits = shape.lane_bits();
        let width = (bits / 8) as usize;
        let min = -(1i128 << (bits - 1));
        let max = (1i128 << bits) - 1;
        let mut bytes = [0u8; 16];
        for (i, lane) in lanes.iter().enumerate() {
            if !(min..=max).contains(&(*lane as i128)) {
                return Err(BuildError::out_of_range(shape.name(), lane));
            }
            let le = lane.to_le_bytes();
            bytes[i * width..(i + 1) * width].copy_from_slice(&le[..width]);
        }
        Ok(V128::const_(bytes))
    }

    /// `v128.const` from float lanes.
    pub fn const_floats(shape: LaneShape, lanes: &[f64]) -> Result<Instr, BuildError> {
        let mut bytes = [0u8; 16];
        match shape {
            LaneShape::F32x4 => {
                check_lane_count(shape, lanes.len())?;
                for (i, lane) in lanes.iter().enumerate() {
                    LittleEndian::write_f32(&mut bytes[i * 4..], *lane as f32);
                }
            }
            LaneShape::F64x2 => {
                check_lane_count(shape, lanes.len())?;
                for (i, lane) in lanes.iter().enumerate() {
                    LittleEndian::write_f64(&mut bytes[i * 8..], *lane);
                }
            }
            _ => return Err(wrong_family(SimdOp::V128Const, "float lane")),
        }
        Ok(V128::const_(bytes))
    }

    /// Plain, extending, splatting and zero-filling vector loads.
    pub fn load(op: SimdOp, m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        match (op.code(), natural_align(op)) {
            (0..=10 | 92 | 93, Some(natural)) => {
                let memarg = m.encode(op.name(), natural)?;
                Ok(simd(op, ValType::V128, vec![addr], vec![memarg]))
            }
            _ => Err(wrong_family(op, "vector load")),
        }
    }

    pub fn store(m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
        let op = SimdOp::V128Store;
        let memarg = m.encode(op.name(), 4)?;
        Ok(prefixed(
            encoding::PREFIX_SIMD,
            op.code(),
            ResultType::Void,
            vec![addr, value],
            vec![memarg],
        ))
    }

    /// `v128.loadN_lane`: replaces one lane of `vector` from memory.
    pub fn load_lane(op: SimdOp, m: MemArg, lane: u8, addr: Instr, vector: Instr) -> Result<Instr, BuildError> {
        let natural = match (op.code(), natural_align(op)) {
            (84..=87, Some(natural)) => natural,
            _ => return Err(wrong_family(op, "lane load")),
        };
        check_lane(op, lane, 16 >> natural)?;
        let memarg = m.encode(op.name(), natural)?;
        Ok(simd(
            op,
            ValType::V128,
            vec![addr, vector],
            vec![memarg, Atom::uint8(lane).into()],
        ))
    }

    /// `v128.storeN_lane`: stores one lane of `vector`.
    pub fn store_lane(op: SimdOp, m: MemArg, lane: u8, addr: Instr, vector: Instr) -> Result<Instr, BuildError> {
        let natural = match (op.code(), natural_align(op)) {
            (88..=91, Some(natural)) => natural,
            _ => return Err(wrong_family(op, "lane store")),
        };
        check_lane(op, lane, 16 >> natural)?;
        let memarg = m.encode(op.name(), natural)?;
        Ok(prefixed(
            encoding::PREFIX_SIMD,
            op.code(),
            ResultType::Void,
            vec![addr, vector],
            vec![memarg, Atom::uint8(lane).into()],
        ))
    }

    /// `i8x16.shuffle`: each lane selects one of the 32 input bytes.
    pub fn shuffle(lanes: [u8; 16], a: Instr, b: Instr) -> Result<Instr, BuildError> {
        let op = SimdOp::I8x16Shuffle;
        for lane in lanes {
            check_lane(op, lane, 32)?;
        }
        Ok(simd(op, ValType::V128, vec![a, b], vec![Atom::bytes(lanes.to_vec()).into()]))
    }

    pub fn splat(shape: LaneShape, v: Instr) -> Instr {
        simd(shape.splat_op(), ValType::V128, vec![v], vec![])
    }

    pub fn extract_lane(op: SimdOp, lane: u8, vector: Instr) -> Result<Instr, BuildError> {
        let shape = match (op.code(), LaneShape::of(op)) {
            (21 | 22 | 24 | 25 | 27 | 29 | 31 | 33, Some(shape)) => shape,
            _ => return Err(wrong_family(op, "extract_lane")),
        };
        check_lane(op, lane, shape.lanes())?;
        Ok(simd(op, shape.scalar(), vec![vector], vec![Atom::uint8(lane).into()]))
    }

    pub fn replace_lane(op: SimdOp, lane: u8, vector: Instr, value: Instr) -> Result<Instr, BuildError> {
        let shape = match (op.code(), LaneShape::of(op)) {
            (23 | 26 | 28 | 30 | 32 | 34, Some(shape)) => shape,
            _ => return Err(wrong_family(op, "replace_lane")),
        };
        check_lane(op, lane, shape.lanes())?;
        Ok(simd(op, ValType::V128, vec![vector, value], vec![Atom::uint8(lane).into()]))
    }

    /// Any vector operator without immediates: arithmetic, comparisons,
    /// bitwise logic, shifts, conversions and the relaxed operators.
    pub fn op(op: SimdOp, operands: Vec<Instr>) -> Result<Instr, BuildError> {
        let (arity, result) = signature(op).ok_or_else(|| wrong_family(op, "immediate-free vector"))?;
        if operands.len() != arity {
            return Err(BuildError::Arity {
                op: op.name(),
                expected: arity,
                actual: operands.len(),
            });
        }
        Ok(simd(op, result, operands, vec![]))
    }
}

fn check_lane_count(shape: LaneShape, actual: usize) -> Result<(), BuildError> {
    let expected = shape.lanes() as usize;
    if actual != expected {
        return Err(BuildError::LaneCount {
            shape: shape.name(),
            expected,
            actual,
        });
    }
    Ok(())
}
