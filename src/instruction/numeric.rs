//! Scalar numeric instructions.
//!
//! Each value type has a zero-sized operator set. Operators shared across
//! types are default methods of [`ValueOps`], [`IntOps`] and [`FloatOps`]
//! keyed by associated opcode constants, so `I32::add` and `I64::add` differ
//! only in the constants they are instantiated with. Constants and
//! conversions are inherent methods.

use crate::ast::{Atom, ValType};
use crate::encoding;
use crate::error::BuildError;

use super::memory::{self, MemArg};
use super::{binary, plain, prefixed, unary, Instr, MiscOp, Op, ResultType};

/// Operators every numeric type supports.
pub trait ValueOps {
    const TYPE: ValType;
    const LOAD: Op;
    const STORE: Op;
    const EQ: Op;
    const NE: Op;
    const ADD: Op;
    const SUB: Op;
    const MUL: Op;

    fn load(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Self::LOAD, Self::TYPE, m, addr)
    }

    fn store(m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
        memory::store(Self::STORE, m, addr, value)
    }

    fn eq(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::EQ, ValType::I32, lhs, rhs)
    }

    fn ne(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::NE, ValType::I32, lhs, rhs)
    }

    fn add(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::ADD, Self::TYPE, lhs, rhs)
    }

    fn sub(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::SUB, Self::TYPE, lhs, rhs)
    }

    fn mul(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::MUL, Self::TYPE, lhs, rhs)
    }
}

/// Integer operators.
pub trait IntOps: ValueOps {
    const EQZ: Op;
    const LT_S: Op;
    const LT_U: Op;
    const GT_S: Op;
    const GT_U: Op;
    const LE_S: Op;
    const LE_U: Op;
    const GE_S: Op;
    const GE_U: Op;
    const CLZ: Op;
    const CTZ: Op;
    const POPCNT: Op;
    const DIV_S: Op;
    const DIV_U: Op;
    const REM_S: Op;
    const REM_U: Op;
    const AND: Op;
    const OR: Op;
    const XOR: Op;
    const SHL: Op;
    const SHR_S: Op;
    const SHR_U: Op;
    const ROTL: Op;
    const ROTR: Op;
    const EXTEND8_S: Op;
    const EXTEND16_S: Op;
    const LOAD8_S: Op;
    const LOAD8_U: Op;
    const LOAD16_S: Op;
    const LOAD16_U: Op;
    const STORE8: Op;
    const STORE16: Op;

    fn eqz(v: Instr) -> Instr {
        unary(Self::EQZ, ValType::I32, v)
    }

    fn lt_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::LT_S, ValType::I32, lhs, rhs)
    }

    fn lt_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::LT_U, ValType::I32, lhs, rhs)
    }

    fn gt_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::GT_S, ValType::I32, lhs, rhs)
    }

    fn gt_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::GT_U, ValType::I32, lhs, rhs)
    }

    fn le_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::LE_S, ValType::I32, lhs, rhs)
    }

    fn le_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::LE_U, ValType::I32, lhs, rhs)
    }

    fn ge_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::GE_S, ValType::I32, lhs, rhs)
    }

    fn ge_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::GE_U, ValType::I32, lhs, rhs)
    }

    fn clz(v: Instr) -> Instr {
        unary(Self::CLZ, Self::TYPE, v)
    }

    fn ctz(v: Instr) -> Instr {
        unary(Self::CTZ, Self::TYPE, v)
    }

    fn popcnt(v: Instr) -> Instr {
        unary(Self::POPCNT, Self::TYPE, v)
    }

    fn div_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::DIV_S, Self::TYPE, lhs, rhs)
    }

    fn div_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::DIV_U, Self::TYPE, lhs, rhs)
    }

    fn rem_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::REM_S, Self::TYPE, lhs, rhs)
    }

    fn rem_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::REM_U, Self::TYPE, lhs, rhs)
    }

    fn and(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::AND, Self::TYPE, lhs, rhs)
    }

    fn or(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::OR, Self::TYPE, lhs, rhs)
    }

    fn xor(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::XOR, Self::TYPE, lhs, rhs)
    }

    fn shl(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::SHL, Self::TYPE, lhs, rhs)
    }

    fn shr_s(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::SHR_S, Self::TYPE, lhs, rhs)
    }

    fn shr_u(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::SHR_U, Self::TYPE, lhs, rhs)
    }

    fn rotl(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::ROTL, Self::TYPE, lhs, rhs)
    }

    fn rotr(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::ROTR, Self::TYPE, lhs, rhs)
    }

    fn extend8_s(v: Instr) -> Instr {
        unary(Self::EXTEND8_S, Self::TYPE, v)
    }

    fn extend16_s(v: Instr) -> Instr {
        unary(Self::EXTEND16_S, Self::TYPE, v)
    }

    fn load8_s(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Self::LOAD8_S, Self::TYPE, m, addr)
    }

    fn load8_u(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Self::LOAD8_U, Self::TYPE, m, addr)
    }

    fn load16_s(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Self::LOAD16_S, Self::TYPE, m, addr)
    }

    fn load16_u(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Self::LOAD16_U, Self::TYPE, m, addr)
    }

    fn store8(m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
        memory::store(Self::STORE8, m, addr, value)
    }

    fn store16(m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
        memory::store(Self::STORE16, m, addr, value)
    }
}

/// Floating-point operators.
pub trait FloatOps: ValueOps {
    const LT: Op;
    const GT: Op;
    const LE: Op;
    const GE: Op;
    const ABS: Op;
    const NEG: Op;
    const CEIL: Op;
    const FLOOR: Op;
    const TRUNC: Op;
    const NEAREST: Op;
    const SQRT: Op;
    const DIV: Op;
    const MIN: Op;
    const MAX: Op;
    const COPYSIGN: Op;

    fn lt(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::LT, ValType::I32, lhs, rhs)
    }

    fn gt(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::GT, ValType::I32, lhs, rhs)
    }

    fn le(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::LE, ValType::I32, lhs, rhs)
    }

    fn ge(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::GE, ValType::I32, lhs, rhs)
    }

    fn abs(v: Instr) -> Instr {
        unary(Self::ABS, Self::TYPE, v)
    }

    fn neg(v: Instr) -> Instr {
        unary(Self::NEG, Self::TYPE, v)
    }

    fn ceil(v: Instr) -> Instr {
        unary(Self::CEIL, Self::TYPE, v)
    }

    fn floor(v: Instr) -> Instr {
        unary(Self::FLOOR, Self::TYPE, v)
    }

    fn trunc(v: Instr) -> Instr {
        unary(Self::TRUNC, Self::TYPE, v)
    }

    fn nearest(v: Instr) -> Instr {
        unary(Self::NEAREST, Self::TYPE, v)
    }

    fn sqrt(v: Instr) -> Instr {
        unary(Self::SQRT, Self::TYPE, v)
    }

    fn div(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::DIV, Self::TYPE, lhs, rhs)
    }

    fn min(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::MIN, Self::TYPE, lhs, rhs)
    }

    fn max(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::MAX, Self::TYPE, lhs, rhs)
    }

    fn copysign(lhs: Instr, rhs: Instr) -> Instr {
        binary(Self::COPYSIGN, Self::TYPE, lhs, rhs)
    }
}

/// `i32` operators.
#[derive(Debug, Clone, Copy)]
pub struct I32;
/// `i64` operators.
#[derive(Debug, Clone, Copy)]
pub struct I64;
/// `f32` operators.
#[derive(Debug, Clone, Copy)]
pub struct F32;
/// `f64` operators.
#[derive(Debug, Clone, Copy)]
pub struct F64;

impl ValueOps for I32 {
    const TYPE: ValType = ValType::I32;
    const LOAD: Op = Op::I32Load;
    const STORE: Op = Op::I32Store;
    const EQ: Op = Op::I32Eq;
    const NE: Op = Op::I32Ne;
    const ADD: Op = Op::I32Add;
    const SUB: Op = Op::I32Sub;
    const MUL: Op = Op::I32Mul;
}

impl IntOps for I32 {
    const EQZ: Op = Op::I32Eqz;
    const LT_S: Op = Op::I32LtS;
    const LT_U: Op = Op::I32LtU;
    const GT_S: Op = Op::I32GtS;
    const GT_U: Op = Op::I32GtU;
    const LE_S: Op = Op::I32LeS;
    const LE_U: Op = Op::I32LeU;
    const GE_S: Op = Op::I32GeS;
    const GE_U: Op = Op::I32GeU;
    const CLZ: Op = Op::I32Clz;
    const CTZ: Op = Op::I32Ctz;
    const POPCNT: Op = Op::I32Popcnt;
    const DIV_S: Op = Op::I32DivS;
    const DIV_U: Op = Op::I32DivU;
    const REM_S: Op = Op::I32RemS;
    const REM_U: Op = Op::I32RemU;
    const AND: Op = Op::I32And;
    const OR: Op = Op::I32Or;
    const XOR: Op = Op::I32Xor;
    const SHL: Op = Op::I32Shl;
    const SHR_S: Op = Op::I32ShrS;
    const SHR_U: Op = Op::I32ShrU;
    const ROTL: Op = Op::I32Rotl;
    const ROTR: Op = Op::I32Rotr;
    const EXTEND8_S: Op = Op::I32Extend8S;
    const EXTEND16_S: Op = Op::I32Extend16S;
    const LOAD8_S: Op = Op::I32Load8S;
    const LOAD8_U: Op = Op::I32Load8U;
    const LOAD16_S: Op = Op::I32Load16S;
    const LOAD16_U: Op = Op::I32Load16U;
    const STORE8: Op = Op::I32Store8;
    const STORE16: Op = Op::I32Store16;
}

impl ValueOps for I64 {
    const TYPE: ValType = ValType::I64;
    const LOAD: Op = Op::I64Load;
    const STORE: Op = Op::I64Store;
    const EQ: Op = Op::I64Eq;
    const NE: Op = Op::I64Ne;
    const ADD: Op = Op::I64Add;
    const SUB: Op = Op::I64Sub;
    const MUL: Op = Op::I64Mul;
}

impl IntOps for I64 {
    const EQZ: Op = Op::I64Eqz;
    const LT_S: Op = Op::I64LtS;
    const LT_U: Op = Op::I64LtU;
    const GT_S: Op = Op::I64GtS;
    const GT_U: Op = Op::I64GtU;
    const LE_S: Op = Op::I64LeS;
    const LE_U: Op = Op::I64LeU;
    const GE_S: Op = Op::I64GeS;
    const GE_U: Op = Op::I64GeU;
    const CLZ: Op = Op::I64Clz;
    const CTZ: Op = Op::I64Ctz;
    const POPCNT: Op = Op::I64Popcnt;
    const DIV_S: Op = Op::I64DivS;
    const DIV_U: Op = Op::I64DivU;
    const REM_S: Op = Op::I64RemS;
    const REM_U: Op = Op::I64RemU;
    const AND: Op = Op::I64And;
    const OR: Op = Op::I64Or;
    const XOR: Op = Op::I64Xor;
    const SHL: Op = Op::I64Shl;
    const SHR_S: Op = Op::I64ShrS;
    const SHR_U: Op = Op::I64ShrU;
    const ROTL: Op = Op::I64Rotl;
    const ROTR: Op = Op::I64Rotr;
    const EXTEND8_S: Op = Op::I64Extend8S;
    const EXTEND16_S: Op = Op::I64Extend16S;
    const LOAD8_S: Op = Op::I64Load8S;
    const LOAD8_U: Op = Op::I64Load8U;
    const LOAD16_S: Op = Op::I64Load16S;
    const LOAD16_U: Op = Op::I64Load16U;
    const STORE8: Op = Op::I64Store8;
    const STORE16: Op = Op::I64Store16;
}

impl ValueOps for F32 {
    const TYPE: ValType = ValType::F32;
    const LOAD: Op = Op::F32Load;
    const STORE: Op = Op::F32Store;
    const EQ: Op = Op::F32Eq;
    const NE: Op = Op::F32Ne;
    const ADD: Op = Op::F32Add;
    const SUB: Op = Op::F32Sub;
    const MUL: Op = Op::F32Mul;
}

impl FloatOps for F32 {
    const LT: Op = Op::F32Lt;
    const GT: Op = Op::F32Gt;
    const LE: Op = Op::F32Le;
    const GE: Op = Op::F32Ge;
    const ABS: Op = Op::F32Abs;
    const NEG: Op = Op::F32Neg;
    const CEIL: Op = Op::F32Ceil;
    const FLOOR: Op = Op::F32Floor;
    const TRUNC: Op = Op::F32Trunc;
    const NEAREST: Op = Op::F32Nearest;
    const SQRT: Op = Op::F32Sqrt;
    const DIV: Op = Op::F32Div;
    const MIN: Op = Op::F32Min;
    const MAX: Op = Op::F32Max;
    const COPYSIGN: Op = Op::F32Copysign;
}

impl ValueOps for F64 {
    const TYPE: ValType = ValType::F64;
    const LOAD: Op = Op::F64Load;
    const STORE: Op = Op::F64Store;
    const EQ: Op = Op::F64Eq;
    const NE: Op = Op::F64Ne;
    const ADD: Op = Op::F64Add;
    const SUB: Op = Op::F64Sub;
    const MUL: Op = Op::F64Mul;
}

impl FloatOps for F64 {
    const LT: Op = Op::F64Lt;
    const GT: Op = Op::F64Gt;
    const LE: Op = Op::F64Le;
    const GE: Op = Op::F64Ge;
    const ABS: Op = Op::F64Abs;
    const NEG: Op = Op::F64Neg;
    const CEIL: Op = Op::F64Ceil;
    const FLOOR: Op = Op::F64Floor;
    const TRUNC: Op = Op::F64Trunc;
    const NEAREST: Op = Op::F64Nearest;
    const SQRT: Op = Op::F64Sqrt;
    const DIV: Op = Op::F64Div;
    const MIN: Op = Op::F64Min;
    const MAX: Op = Op::F64Max;
    const COPYSIGN: Op = Op::F64Copysign;
}

fn trunc_sat(op: MiscOp, result: ValType, v: Instr) -> Instr {
    prefixed(encoding::PREFIX_MISC, op.code(), ResultType::Value(result), vec![v], vec![])
}

impl I32 {
    pub fn const_(v: i32) -> Instr {
        plain(Op::I32Const, ValType::I32.into(), vec![], vec![Atom::varint32(v).into()])
    }

    pub fn wrap_i64(v: Instr) -> Instr {
        unary(Op::I32WrapI64, ValType::I32, v)
    }

    pub fn trunc_f32_s(v: Instr) -> Instr {
        unary(Op::I32TruncF32S, ValType::I32, v)
    }

    pub fn trunc_f32_u(v: Instr) -> Instr {
        unary(Op::I32TruncF32U, ValType::I32, v)
    }

    pub fn trunc_f64_s(v: Instr) -> Instr {
        unary(Op::I32TruncF64S, ValType::I32, v)
    }

    pub fn trunc_f64_u(v: Instr) -> Instr {
        unary(Op::I32TruncF64U, ValType::I32, v)
    }

    pub fn reinterpret_f32(v: Instr) -> Instr {
        unary(Op::I32ReinterpretF32, ValType::I32, v)
    }

    pub fn trunc_sat_f32_s(v: Instr) -> Instr {
        trunc_sat(MiscOp::I32TruncSatF32S, ValType::I32, v)
    }

    pub fn trunc_sat_f32_u(v: Instr) -> Instr {
        trunc_sat(MiscOp::I32TruncSatF32U, ValType::I32, v)
    }

    pub fn trunc_sat_f64_s(v: Instr) -> Instr {
        trunc_sat(MiscOp::I32TruncSatF64S, ValType::I32, v)
    }

    pub fn trunc_sat_f64_u(v: Instr) -> Instr {
        trunc_sat(MiscOp::I32TruncSatF64U, ValType::I32, v)
    }
}

impl I64 {
    pub fn const_(v: i64) -> Instr {
        plain(Op::I64Const, ValType::I64.into(), vec![], vec![Atom::varint64(v).into()])
    }

    pub fn extend_i32_s(v: Instr) -> Instr {
        unary(Op::I64ExtendI32S, ValType::I64, v)
    }

    pub fn extend_i32_u(v: Instr) -> Instr {
        unary(Op::I64ExtendI32U, ValType::I64, v)
    }

    pub fn extend32_s(v: Instr) -> Instr {
        unary(Op::I64Extend32S, ValType::I64, v)
    }

    pub fn trunc_f32_s(v: Instr) -> Instr {
        unary(Op::I64TruncF32S, ValType::I64, v)
    }

    pub fn trunc_f32_u(v: Instr) -> Instr {
        unary(Op::I64TruncF32U, ValType::I64, v)
    }

    pub fn trunc_f64_s(v: Instr) -> Instr {
        unary(Op::I64TruncF64S, ValType::I64, v)
    }

    pub fn trunc_f64_u(v: Instr) -> Instr {
        unary(Op::I64TruncF64U, ValType::I64, v)
    }

    pub fn reinterpret_f64(v: Instr) -> Instr {
        unary(Op::I64ReinterpretF64, ValType::I64, v)
    }

    pub fn load32_s(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Op::I64Load32S, ValType::I64, m, addr)
    }

    pub fn load32_u(m: MemArg, addr: Instr) -> Result<Instr, BuildError> {
        memory::load(Op::I64Load32U, ValType::I64, m, addr)
    }

    pub fn store32(m: MemArg, addr: Instr, value: Instr) -> Result<Instr, BuildError> {
        memory::store(Op::I64Store32, m, addr, value)
    }

    pub fn trunc_sat_f32_s(v: Instr) -> Instr {
        trunc_sat(MiscOp::I64TruncSatF32S, ValType::I64, v)
    }

    pub fn trunc_sat_f32_u(v: Instr) -> Instr {
        trunc_sat(MiscOp::I64TruncSatF32U, ValType::I64, v)
    }

    pub fn trunc_sat_f64_s(v: Instr) -> Instr {
        trunc_sat(MiscOp::I64TruncSatF64S, ValType::I64, v)
    }

    pub fn trunc_sat_f64_u(v: Instr) -> Instr {
        trunc_sat(MiscOp::I64TruncSatF64U, ValType::I64, v)
    }
}

impl F32 {
    pub fn const_(v: f32) -> Instr {
        plain(Op::F32Const, ValType::F32.into(), vec![], vec![Atom::float32(v).into()])
    }

    pub fn convert_i32_s(v: Instr) -> Instr {
        unary(Op::F32ConvertI32S, ValType::F32, v)
    }

    pub fn convert_i32_u(v: Instr) -> Instr {
        unary(Op::F32ConvertI32U, ValType::F32, v)
    }

    pub fn convert_i64_s(v: Instr) -> Instr {
        unary(Op::F32ConvertI64S, ValType::F32, v)
    }

    pub fn convert_i64_u(v: Instr) -> Instr {
        unary(Op::F32ConvertI64U, ValType::F32, v)
    }

    pub fn demote_f64(v: Instr) -> Instr {
        unary(Op::F32DemoteF64, ValType::F32, v)
    }

    pub fn reinterpret_i32(v: Instr) -> Instr {
        unary(Op::F32ReinterpretI32, ValType::F32, v)
    }
}

impl F64 {
    pub fn const_(v: f64) -> Instr {
        plain(Op::F64Const, ValType::F64.into(), vec![], vec![Atom::float64(v).into()])
    }

    pub fn convert_i32_s(v: Instr) -> Instr {
        unary(Op::F64ConvertI32S, ValType::F64, v)
    }

    pub fn convert_i32_u(v: Instr) -> Instr {
        unary(Op::F64ConvertI32U, ValType::F64, v)
    }

    pub fn convert_i64_s(v: Instr) -> Instr {
        unary(Op::F64ConvertI64S, ValType::F64, v)
    }

    pub fn convert_i64_u(v: Instr) -> Instr {
        unary(Op::F64ConvertI64U, ValType::F64, v)
    }

    pub fn promote_f32(v: Instr) -> Instr {
        unary(Op::F64PromoteF32, ValType::F64, v)
    }

    pub fn reinterpret_i64(v: Instr) -> Instr {
        unary(Op::F64ReinterpretI64, ValType::F64, v)
    }
}
