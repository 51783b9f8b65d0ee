//! Opcode tables.
//!
//! One enum per opcode space: the one-byte primary space and the four
//! prefixed spaces (`0xFB` GC and reference, `0xFC` saturating conversion
//! and bulk memory, `0xFD` SIMD and relaxed SIMD, `0xFE` threads). Each
//! variant carries its raw code and text mnemonic; reverse lookup by code
//! goes through a lazily built table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::encoding;

macro_rules! opcode_space {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:expr, $text:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            /// Every opcode of this space, in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn code(self) -> u32 {
                match self {
                    $($name::$variant => $code,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }

            pub fn from_code(code: u32) -> Option<$name> {
                static TABLE: Lazy<HashMap<u32, $name>> =
                    Lazy::new(|| $name::ALL.iter().map(|op| (op.code(), *op)).collect());
                TABLE.get(&code).copied()
            }
        }
    };
}

opcode_space! {
    /// The primary, unprefixed opcode space.
    Op {
        Unreachable = 0x00, "unreachable";
        Nop = 0x01, "nop";
        Block = 0x02, "block";
        Loop = 0x03, "loop";
        If = 0x04, "if";
        Else = 0x05, "else";
        Try = 0x06, "try";
        Catch = 0x07, "catch";
        Throw = 0x08, "throw";
        Rethrow = 0x09, "rethrow";
        ThrowRef = 0x0a, "throw_ref";
        End = 0x0b, "end";
        Br = 0x0c, "br";
        BrIf = 0x0d, "br_if";
        BrTable = 0x0e, "br_table";
        Return = 0x0f, "return";
        Call = 0x10, "call";
        CallIndirect = 0x11, "call_indirect";
        ReturnCall = 0x12, "return_call";
        ReturnCallIndirect = 0x13, "return_call_indirect";
        CallRef = 0x14, "call_ref";
        ReturnCallRef = 0x15, "return_call_ref";
        Delegate = 0x18, "delegate";
        CatchAll = 0x19, "catch_all";
        Drop = 0x1a, "drop";
        Select = 0x1b, "select";
        SelectTyped = 0x1c, "select";
        TryTable = 0x1f, "try_table";
        LocalGet = 0x20, "local.get";
        LocalSet = 0x21, "local.set";
        LocalTee = 0x22, "local.tee";
        GlobalGet = 0x23, "global.get";
        GlobalSet = 0x24, "global.set";
        TableGet = 0x25, "table.get";
        TableSet = 0x26, "table.set";
        I32Load = 0x28, "i32.load";
        I64Load = 0x29, "i64.load";
        F32Load = 0x2a, "f32.load";
        F64Load = 0x2b, "f64.load";
        I32Load8S = 0x2c, "i32.load8_s";
        I32Load8U = 0x2d, "i32.load8_u";
        I32Load16S = 0x2e, "i32.load16_s";
        I32Load16U = 0x2f, "i32.load16_u";
        I64Load8S = 0x30, "i64.load8_s";
        I64Load8U = 0x31, "i64.load8_u";
        I64Load16S = 0x32, "i64.load16_s";
        I64Load16U = 0x33, "i64.load16_u";
        I64Load32S = 0x34, "i64.load32_s";
        I64Load32U = 0x35, "i64.load32_u";
        I32Store = 0x36, "i32.store";
        I64Store = 0x37, "i64.store";
        F32Store = 0x38, "f32.store";
        F64Store = 0x39, "f64.store";
        I32Store8 = 0x3a, "i32.store8";
        I32Store16 = 0x3b, "i32.store16";
        I64Store8 = 0x3c, "i64.store8";
        I64Store16 = 0x3d, "i64.store16";
        I64Store32 = 0x3e, "i64.store32";
        MemorySize = 0x3f, "memory.size";
        MemoryGrow = 0x40, "memory.grow";
        I32Const = 0x41, "i32.const";
        I64Const = 0x42, "i64.const";
        F32Const = 0x43, "f32.const";
        F64Const = 0x44, "f64.const";
        I32Eqz = 0x45, "i32.eqz";
        I32Eq = 0x46, "i32.eq";
        I32Ne = 0x47, "i32.ne";
        I32LtS = 0x48, "i32.lt_s";
        I32LtU = 0x49, "i32.lt_u";
        I32GtS = 0x4a, "i32.gt_s";
        I32GtU = 0x4b, "i32.gt_u";
        I32LeS = 0x4c, "i32.le_s";
        I32LeU = 0x4d, "i32.le_u";
        I32GeS = 0x4e, "i32.ge_s";
        I32GeU = 0x4f, "i32.ge_u";
        I64Eqz = 0x50, "i64.eqz";
        I64Eq = 0x51, "i64.eq";
        I64Ne = 0x52, "i64.ne";
        I64LtS = 0x53, "i64.lt_s";
        I64LtU = 0x54, "i64.lt_u";
        I64GtS = 0x55, "i64.gt_s";
        I64GtU = 0x56, "i64.gt_u";
        I64LeS = 0x57, "i64.le_s";
        I64LeU = 0x58, "i64.le_u";
        I64GeS = 0x59, "i64.ge_s";
        I64GeU = 0x5a, "i64.ge_u";
        F32Eq = 0x5b, "f32.eq";
        F32Ne = 0x5c, "f32.ne";
        F32Lt = 0x5d, "f32.lt";
        F32Gt = 0x5e, "f32.gt";
        F32Le = 0x5f, "f32.le";
        F32Ge = 0x60, "f32.ge";
        F64Eq = 0x61, "f64.eq";
        F64Ne = 0x62, "f64.ne";
        F64Lt = 0x63, "f64.lt";
        F64Gt = 0x64, "f64.gt";
        F64Le = 0x65, "f64.le";
        F64Ge = 0x66, "f64.ge";
        I32Clz = 0x67, "i32.clz";
        I32Ctz = 0x68, "i32.ctz";
        I32Popcnt = 0x69, "i32.popcnt";
        I32Add = 0x6a, "i32.add";
        I32Sub = 0x6b, "i32.sub";
        I32Mul = 0x6c, "i32.mul";
        I32DivS = 0x6d, "i32.div_s";
        I32DivU = 0x6e, "i32.div_u";
        I32RemS = 0x6f, "i32.rem_s";
        I32RemU = 0x70, "i32.rem_u";
        I32And = 0x71, "i32.and";
        I32Or = 0x72, "i32.or";
        I32Xor = 0x73, "i32.xor";
        I32Shl = 0x74, "i32.shl";
        I32ShrS = 0x75, "i32.shr_s";
        I32ShrU = 0x76, "i32.shr_u";
        I32Rotl = 0x77, "i32.rotl";
        I32Rotr = 0x78, "i32.rotr";
        I64Clz = 0x79, "i64.clz";
        I64Ctz = 0x7a, "i64.ctz";
        I64Popcnt = 0x7b, "i64.popcnt";
        I64Add = 0x7c, "i64.add";
        I64Sub = 0x7d, "i64.sub";
        I64Mul = 0x7e, "i64.mul";
        I64DivS = 0x7f, "i64.div_s";
        I64DivU = 0x80, "i64.div_u";
        I64RemS = 0x81, "i64.rem_s";
        I64RemU = 0x82, "i64.rem_u";
        I64And = 0x83, "i64.and";
        I64Or = 0x84, "i64.or";
        I64Xor = 0x85, "i64.xor";
        I64Shl = 0x86, "i64.shl";
        I64ShrS = 0x87, "i64.shr_s";
        I64ShrU = 0x88, "i64.shr_u";
        I64Rotl = 0x89, "i64.rotl";
        I64Rotr = 0x8a, "i64.rotr";
        F32Abs = 0x8b, "f32.abs";
        F32Neg = 0x8c, "f32.neg";
        F32Ceil = 0x8d, "f32.ceil";
        F32Floor = 0x8e, "f32.floor";
        F32Trunc = 0x8f, "f32.trunc";
        F32Nearest = 0x90, "f32.nearest";
        F32Sqrt = 0x91, "f32.sqrt";
        F32Add = 0x92, "f32.add";
        F32Sub = 0x93, "f32.sub";
        F32Mul = 0x94, "f32.mul";
        F32Div = 0x95, "f32.div";
        F32Min = 0x96, "f32.min";
        F32Max = 0x97, "f32.max";
        F32Copysign = 0x98, "f32.copysign";
        F64Abs = 0x99, "f64.abs";
        F64Neg = 0x9a, "f64.neg";
        F64Ceil = 0x9b, "f64.ceil";
        F64Floor = 0x9c, "f64.floor";
        F64Trunc = 0x9d, "f64.trunc";
        F64Nearest = 0x9e, "f64.nearest";
        F64Sqrt = 0x9f, "f64.sqrt";
        F64Add = 0xa0, "f64.add";
        F64Sub = 0xa1, "f64.sub";
        F64Mul = 0xa2, "f64.mul";
        F64Div = 0xa3, "f64.div";
        F64Min = 0xa4, "f64.min";
        F64Max = 0xa5, "f64.max";
        F64Copysign = 0xa6, "f64.copysign";
        I32WrapI64 = 0xa7, "i32.wrap_i64";
        I32TruncF32S = 0xa8, "i32.trunc_f32_s";
        I32TruncF32U = 0xa9, "i32.trunc_f32_u";
        I32TruncF64S = 0xaa, "i32.trunc_f64_s";
        I32TruncF64U = 0xab, "i32.trunc_f64_u";
        I64ExtendI32S = 0xac, "i64.extend_i32_s";
        I64ExtendI32U = 0xad, "i64.extend_i32_u";
        I64TruncF32S = 0xae, "i64.trunc_f32_s";
        I64TruncF32U = 0xaf, "i64.trunc_f32_u";
        I64TruncF64S = 0xb0, "i64.trunc_f64_s";
        I64TruncF64U = 0xb1, "i64.trunc_f64_u";
        F32ConvertI32S = 0xb2, "f32.convert_i32_s";
        F32ConvertI32U = 0xb3, "f32.convert_i32_u";
        F32ConvertI64S = 0xb4, "f32.convert_i64_s";
        F32ConvertI64U = 0xb5, "f32.convert_i64_u";
        F32DemoteF64 = 0xb6, "f32.demote_f64";
        F64ConvertI32S = 0xb7, "f64.convert_i32_s";
        F64ConvertI32U = 0xb8, "f64.convert_i32_u";
        F64ConvertI64S = 0xb9, "f64.convert_i64_s";
        F64ConvertI64U = 0xba, "f64.convert_i64_u";
        F64PromoteF32 = 0xbb, "f64.promote_f32";
        I32ReinterpretF32 = 0xbc, "i32.reinterpret_f32";
        I64ReinterpretF64 = 0xbd, "i64.reinterpret_f64";
        F32ReinterpretI32 = 0xbe, "f32.reinterpret_i32";
        F64ReinterpretI64 = 0xbf, "f64.reinterpret_i64";
        I32Extend8S = 0xc0, "i32.extend8_s";
        I32Extend16S = 0xc1, "i32.extend16_s";
        I64Extend8S = 0xc2, "i64.extend8_s";
        I64Extend16S = 0xc3, "i64.extend16_s";
        I64Extend32S = 0xc4, "i64.extend32_s";
        RefNull = 0xd0, "ref.null";
        RefIsNull = 0xd1, "ref.is_null";
        RefFunc = 0xd2, "ref.func";
        RefEq = 0xd3, "ref.eq";
        RefAsNonNull = 0xd4, "ref.as_non_null";
        BrOnNull = 0xd5, "br_on_null";
        BrOnNonNull = 0xd6, "br_on_non_null";
    }
}

opcode_space! {
    /// GC and typed reference instructions, prefix `0xFB`.
    GcOp {
        StructNew = 0, "struct.new";
        StructNewDefault = 1, "struct.new_default";
        StructGet = 2, "struct.get";
        StructGetS = 3, "struct.get_s";
        StructGetU = 4, "struct.get_u";
        StructSet = 5, "struct.set";
        ArrayNew = 6, "array.new";
        ArrayNewDefault = 7, "array.new_default";
        ArrayNewFixed = 8, "array.new_fixed";
        ArrayNewData = 9, "array.new_data";
        ArrayNewElem = 10, "array.new_elem";
        ArrayGet = 11, "array.get";
        ArrayGetS = 12, "array.get_s";
        ArrayGetU = 13, "array.get_u";
        ArraySet = 14, "array.set";
        ArrayLen = 15, "array.len";
        ArrayFill = 16, "array.fill";
        ArrayCopy = 17, "array.copy";
        ArrayInitData = 18, "array.init_data";
        ArrayInitElem = 19, "array.init_elem";
        RefTest = 20, "ref.test";
        RefTestNull = 21, "ref.test";
        RefCast = 22, "ref.cast";
        RefCastNull = 23, "ref.cast";
        BrOnCast = 24, "br_on_cast";
        BrOnCastFail = 25, "br_on_cast_fail";
        AnyConvertExtern = 26, "any.convert_extern";
        ExternConvertAny = 27, "extern.convert_any";
        RefI31 = 28, "ref.i31";
        I31GetS = 29, "i31.get_s";
        I31GetU = 30, "i31.get_u";
    }
}

opcode_space! {
    /// Saturating truncation and bulk memory/table instructions, prefix `0xFC`.
    MiscOp {
        I32TruncSatF32S = 0, "i32.trunc_sat_f32_s";
        I32TruncSatF32U = 1, "i32.trunc_sat_f32_u";
        I32TruncSatF64S = 2, "i32.trunc_sat_f64_s";
        I32TruncSatF64U = 3, "i32.trunc_sat_f64_u";
        I64TruncSatF32S = 4, "i64.trunc_sat_f32_s";
        I64TruncSatF32U = 5, "i64.trunc_sat_f32_u";
        I64TruncSatF64S = 6, "i64.trunc_sat_f64_s";
        I64TruncSatF64U = 7, "i64.trunc_sat_f64_u";
        MemoryInit = 8, "memory.init";
        DataDrop = 9, "data.drop";
        MemoryCopy = 10, "memory.copy";
        MemoryFill = 11, "memory.fill";
        TableInit = 12, "table.init";
        ElemDrop = 13, "elem.drop";
        TableCopy = 14, "table.copy";
        TableGrow = 15, "table.grow";
        TableSize = 16, "table.size";
        TableFill = 17, "table.fill";
    }
}

opcode_space! {
    /// SIMD and relaxed SIMD instructions, prefix `0xFD`.
    SimdOp {
        V128Load = 0, "v128.load";
        V128Load8x8S = 1, "v128.load8x8_s";
        V128Load8x8U = 2, "v128.load8x8_u";
        V128Load16x4S = 3, "v128.load16x4_s";
        V128Load16x4U = 4, "v128.load16x4_u";
        V128Load32x2S = 5, "v128.load32x2_s";
        V128Load32x2U = 6, "v128.load32x2_u";
        V128Load8Splat = 7, "v128.load8_splat";
        V128Load16Splat = 8, "v128.load16_splat";
        V128Load32Splat = 9, "v128.load32_splat";
        V128Load64Splat = 10, "v128.load64_splat";
        V128Store = 11, "v128.store";
        V128Const = 12, "v128.const";
        I8x16Shuffle = 13, "i8x16.shuffle";
        I8x16Swizzle = 14, "i8x16.swizzle";
        I8x16Splat = 15, "i8x16.splat";
        I16x8Splat = 16, "i16x8.splat";
        I32x4Splat = 17, "i32x4.splat";
        I64x2Splat = 18, "i64x2.splat";
        F32x4Splat = 19, "f32x4.splat";
        F64x2Splat = 20, "f64x2.splat";
        I8x16ExtractLaneS = 21, "i8x16.extract_lane_s";
        I8x16ExtractLaneU = 22, "i8x16.extract_lane_u";
        I8x16ReplaceLane = 23, "i8x16.replace_lane";
        I16x8ExtractLaneS = 24, "i16x8.extract_lane_s";
        I16x8ExtractLaneU = 25, "i16x8.extract_lane_u";
        I16x8ReplaceLane = 26, "i16x8.replace_lane";
        I32x4ExtractLane = 27, "i32x4.extract_lane";
        I32x4ReplaceLane = 28, "i32x4.replace_lane";
        I64x2ExtractLane = 29, "i64x2.extract_lane";
        I64x2ReplaceLane = 30, "i64x2.replace_lane";
        F32x4ExtractLane = 31, "f32x4.extract_lane";
        F32x4ReplaceLane = 32, "f32x4.replace_lane";
        F64x2ExtractLane = 33, "f64x2.extract_lane";
        F64x2ReplaceLane = 34, "f64x2.replace_lane";
        I8x16Eq = 35, "i8x16.eq";
        I8x16Ne = 36, "i8x16.ne";
        I8x16LtS = 37, "i8x16.lt_s";
        I8x16LtU = 38, "i8x16.lt_u";
        I8x16GtS = 39, "i8x16.gt_s";
        I8x16GtU = 40, "i8x16.gt_u";
        I8x16LeS = 41, "i8x16.le_s";
        I8x16LeU = 42, "i8x16.le_u";
        I8x16GeS = 43, "i8x16.ge_s";
        I8x16GeU = 44, "i8x16.ge_u";
        I16x8Eq = 45, "i16x8.eq";
        I16x8Ne = 46, "i16x8.ne";
        I16x8LtS = 47, "i16x8.lt_s";
        I16x8LtU = 48, "i16x8.lt_u";
        I16x8GtS = 49, "i16x8.gt_s";
        I16x8GtU = 50, "i16x8.gt_u";
        I16x8LeS = 51, "i16x8.le_s";
        I16x8LeU = 52, "i16x8.le_u";
        I16x8GeS = 53, "i16x8.ge_s";
        I16x8GeU = 54, "i16x8.ge_u";
        I32x4Eq = 55, "i32x4.eq";
        I32x4Ne = 56, "i32x4.ne";
        I32x4LtS = 57, "i32x4.lt_s";
        I32x4LtU = 58, "i32x4.lt_u";
        I32x4GtS = 59, "i32x4.gt_s";
        I32x4GtU = 60, "i32x4.gt_u";
        I32x4LeS = 61, "i32x4.le_s";
        I32x4LeU = 62, "i32x4.le_u";
        I32x4GeS = 63, "i32x4.ge_s";
        I32x4GeU = 64, "i32x4.ge_u";
        F32x4Eq = 65, "f32x4.eq";
        F32x4Ne = 66, "f32x4.ne";
        F32x4Lt = 67, "f32x4.lt";
        F32x4Gt = 68, "f32x4.gt";
        F32x4Le = 69, "f32x4.le";
        F32x4Ge = 70, "f32x4.ge";
        F64x2Eq = 71, "f64x2.eq";
        F64x2Ne = 72, "f64x2.ne";
        F64x2Lt = 73, "f64x2.lt";
        F64x2Gt = 74, "f64x2.gt";
        F64x2Le = 75, "f64x2.le";
        F64x2Ge = 76, "f64x2.ge";
        V128Not = 77, "v128.not";
        V128And = 78, "v128.and";
        V128AndNot = 79, "v128.andnot";
        V128Or = 80, "v128.or";
        V128Xor = 81, "v128.xor";
        V128Bitselect = 82, "v128.bitselect";
        V128AnyTrue = 83, "v128.any_true";
        V128Load8Lane = 84, "v128.load8_lane";
        V128Load16Lane = 85, "v128.load16_lane";
        V128Load32Lane = 86, "v128.load32_lane";
        V128Load64Lane = 87, "v128.load64_lane";
        V128Store8Lane = 88, "v128.store8_lane";
        V128Store16Lane = 89, "v128.store16_lane";
        V128Store32Lane = 90, "v128.store32_lane";
        V128Store64Lane = 91, "v128.store64_lane";
        V128Load32Zero = 92, "v128.load32_zero";
        V128Load64Zero = 93, "v128.load64_zero";
        F32x4DemoteF64x2Zero = 94, "f32x4.demote_f64x2_zero";
        F64x2PromoteLowF32x4 = 95, "f64x2.promote_low_f32x4";
        I8x16Abs = 96, "i8x16.abs";
        I8x16Neg = 97, "i8x16.neg";
        I8x16Popcnt = 98, "i8x16.popcnt";
        I8x16AllTrue = 99, "i8x16.all_true";
        I8x16Bitmask = 100, "i8x16.bitmask";
        I8x16NarrowI16x8S = 101, "i8x16.narrow_i16x8_s";
        I8x16NarrowI16x8U = 102, "i8x16.narrow_i16x8_u";
        F32x4Ceil = 103, "f32x4.ceil";
        F32x4Floor = 104, "f32x4.floor";
        F32x4Trunc = 105, "f32x4.trunc";
        F32x4Nearest = 106, "f32x4.nearest";
        I8x16Shl = 107, "i8x16.shl";
        I8x16ShrS = 108, "i8x16.shr_s";
        I8x16ShrU = 109, "i8x16.shr_u";
        I8x16Add = 110, "i8x16.add";
        I8x16AddSatS = 111, "i8x16.add_sat_s";
        I8x16AddSatU = 112, "i8x16.add_sat_u";
        I8x16Sub = 113, "i8x16.sub";
        I8x16SubSatS = 114, "i8x16.sub_sat_s";
        I8x16SubSatU = 115, "i8x16.sub_sat_u";
        F64x2Ceil = 116, "f64x2.ceil";
        F64x2Floor = 117, "f64x2.floor";
        I8x16MinS = 118, "i8x16.min_s";
        I8x16MinU = 119, "i8x16.min_u";
        I8x16MaxS = 120, "i8x16.max_s";
        I8x16MaxU = 121, "i8x16.max_u";
        F64x2Trunc = 122, "f64x2.trunc";
        I8x16AvgrU = 123, "i8x16.avgr_u";
        I16x8ExtaddPairwiseI8x16S = 124, "i16x8.extadd_pairwise_i8x16_s";
        I16x8ExtaddPairwiseI8x16U = 125, "i16x8.extadd_pairwise_i8x16_u";
        I32x4ExtaddPairwiseI16x8S = 126, "i32x4.extadd_pairwise_i16x8_s";
        I32x4ExtaddPairwiseI16x8U = 127, "i32x4.extadd_pairwise_i16x8_u";
        I16x8Abs = 128, "i16x8.abs";
        I16x8Neg = 129, "i16x8.neg";
        I16x8Q15MulrSatS = 130, "i16x8.q15mulr_sat_s";
        I16x8AllTrue = 131, "i16x8.all_true";
        I16x8Bitmask = 132, "i16x8.bitmask";
        I16x8NarrowI32x4S = 133, "i16x8.narrow_i32x4_s";
        I16x8NarrowI32x4U = 134, "i16x8.narrow_i32x4_u";
        I16x8ExtendLowI8x16S = 135, "i16x8.extend_low_i8x16_s";
        I16x8ExtendHighI8x16S = 136, "i16x8.extend_high_i8x16_s";
        I16x8ExtendLowI8x16U = 137, "i16x8.extend_low_i8x16_u";
        I16x8ExtendHighI8x16U = 138, "i16x8.extend_high_i8x16_u";
        I16x8Shl = 139, "i16x8.shl";
        I16x8ShrS = 140, "i16x8.shr_s";
        I16x8ShrU = 141, "i16x8.shr_u";
        I16x8Add = 142, "i16x8.add";
        I16x8AddSatS = 143, "i16x8.add_sat_s";
        I16x8AddSatU = 144, "i16x8.add_sat_u";
        I16x8Sub = 145, "i16x8.sub";
        I16x8SubSatS = 146, "i16x8.sub_sat_s";
        I16x8SubSatU = 147, "i16x8.sub_sat_u";
        F64x2Nearest = 148, "f64x2.nearest";
        I16x8Mul = 149, "i16x8.mul";
        I16x8MinS = 150, "i16x8.min_s";
        I16x8MinU = 151, "i16x8.min_u";
        I16x8MaxS = 152, "i16x8.max_s";
        I16x8MaxU = 153, "i16x8.max_u";
        I16x8AvgrU = 155, "i16x8.avgr_u";
        I16x8ExtmulLowI8x16S = 156, "i16x8.extmul_low_i8x16_s";
        I16x8ExtmulHighI8x16S = 157, "i16x8.extmul_high_i8x16_s";
        I16x8ExtmulLowI8x16U = 158, "i16x8.extmul_low_i8x16_u";
        I16x8ExtmulHighI8x16U = 159, "i16x8.extmul_high_i8x16_u";
        I32x4Abs = 160, "i32x4.abs";
        I32x4Neg = 161, "i32x4.neg";
        I32x4AllTrue = 163, "i32x4.all_true";
        I32x4Bitmask = 164, "i32x4.bitmask";
        I32x4ExtendLowI16x8S = 167, "i32x4.extend_low_i16x8_s";
        I32x4ExtendHighI16x8S = 168, "i32x4.extend_high_i16x8_s";
        I32x4ExtendLowI16x8U = 169, "i32x4.extend_low_i16x8_u";
        I32x4ExtendHighI16x8U = 170, "i32x4.extend_high_i16x8_u";
        I32x4Shl = 171, "i32x4.shl";
        I32x4ShrS = 172, "i32x4.shr_s";
        I32x4ShrU = 173, "i32x4.shr_u";
        I32x4Add = 174, "i32x4.add";
        I32x4Sub = 177, "i32x4.sub";
        I32x4Mul = 181, "i32x4.mul";
        I32x4MinS = 182, "i32x4.min_s";
        I32x4MinU = 183, "i32x4.min_u";
        I32x4MaxS = 184, "i32x4.max_s";
        I32x4MaxU = 185, "i32x4.max_u";
        I32x4DotI16x8S = 186, "i32x4.dot_i16x8_s";
        I32x4ExtmulLowI16x8S = 188, "i32x4.extmul_low_i16x8_s";
        I32x4ExtmulHighI16x8S = 189, "i32x4.extmul_high_i16x8_s";
        I32x4ExtmulLowI16x8U = 190, "i32x4.extmul_low_i16x8_u";
        I32x4ExtmulHighI16x8U = 191, "i32x4.extmul_high_i16x8_u";
        I64x2Abs = 192, "i64x2.abs";
        I64x2Neg = 193, "i64x2.neg";
        I64x2AllTrue = 195, "i64x2.all_true";
        I64x2Bitmask = 196, "i64x2.bitmask";
        I64x2ExtendLowI32x4S = 199, "i64x2.extend_low_i32x4_s";
        I64x2ExtendHighI32x4S = 200, "i64x2.extend_high_i32x4_s";
        I64x2ExtendLowI32x4U = 201, "i64x2.extend_low_i32x4_u";
        I64x2ExtendHighI32x4U = 202, "i64x2.extend_high_i32x4_u";
        I64x2Shl = 203, "i64x2.shl";
        I64x2ShrS = 204, "i64x2.shr_s";
        I64x2ShrU = 205, "i64x2.shr_u";
        I64x2Add = 206, "i64x2.add";
        I64x2Sub = 209, "i64x2.sub";
        I64x2Mul = 213, "i64x2.mul";
        I64x2Eq = 214, "i64x2.eq";
        I64x2Ne = 215, "i64x2.ne";
        I64x2LtS = 216, "i64x2.lt_s";
        I64x2GtS = 217, "i64x2.gt_s";
        I64x2LeS = 218, "i64x2.le_s";
        I64x2GeS = 219, "i64x2.ge_s";
        I64x2ExtmulLowI32x4S = 220, "i64x2.extmul_low_i32x4_s";
        I64x2ExtmulHighI32x4S = 221, "i64x2.extmul_high_i32x4_s";
        I64x2ExtmulLowI32x4U = 222, "i64x2.extmul_low_i32x4_u";
        I64x2ExtmulHighI32x4U = 223, "i64x2.extmul_high_i32x4_u";
        F32x4Abs = 224, "f32x4.abs";
        F32x4Neg = 225, "f32x4.neg";
        F32x4Sqrt = 227, "f32x4.sqrt";
        F32x4Add = 228, "f32x4.add";
        F32x4Sub = 229, "f32x4.sub";
        F32x4Mul = 230, "f32x4.mul";
        F32x4Div = 231, "f32x4.div";
        F32x4Min = 232, "f32x4.min";
        F32x4Max = 233, "f32x4.max";
        F32x4Pmin = 234, "f32x4.pmin";
        F32x4Pmax = 235, "f32x4.pmax";
        F64x2Abs = 236, "f64x2.abs";
        F64x2Neg = 237, "f64x2.neg";
        F64x2Sqrt = 239, "f64x2.sqrt";
        F64x2Add = 240, "f64x2.add";
        F64x2Sub = 241, "f64x2.sub";
        F64x2Mul = 242, "f64x2.mul";
        F64x2Div = 243, "f64x2.div";
        F64x2Min = 244, "f64x2.min";
        F64x2Max = 245, "f64x2.max";
        F64x2Pmin = 246, "f64x2.pmin";
        F64x2Pmax = 247, "f64x2.pmax";
        I32x4TruncSatF32x4S = 248, "i32x4.trunc_sat_f32x4_s";
        I32x4TruncSatF32x4U = 249, "i32x4.trunc_sat_f32x4_u";
        F32x4ConvertI32x4S = 250, "f32x4.convert_i32x4_s";
        F32x4ConvertI32x4U = 251, "f32x4.convert_i32x4_u";
        I32x4TruncSatF64x2SZero = 252, "i32x4.trunc_sat_f64x2_s_zero";
        I32x4TruncSatF64x2UZero = 253, "i32x4.trunc_sat_f64x2_u_zero";
        F64x2ConvertLowI32x4S = 254, "f64x2.convert_low_i32x4_s";
        F64x2ConvertLowI32x4U = 255, "f64x2.convert_low_i32x4_u";
        I8x16RelaxedSwizzle = 0x100, "i8x16.relaxed_swizzle";
        I32x4RelaxedTruncF32x4S = 0x101, "i32x4.relaxed_trunc_f32x4_s";
        I32x4RelaxedTruncF32x4U = 0x102, "i32x4.relaxed_trunc_f32x4_u";
        I32x4RelaxedTruncF64x2SZero = 0x103, "i32x4.relaxed_trunc_f64x2_s_zero";
        I32x4RelaxedTruncF64x2UZero = 0x104, "i32x4.relaxed_trunc_f64x2_u_zero";
        F32x4RelaxedMadd = 0x105, "f32x4.relaxed_madd";
        F32x4RelaxedNmadd = 0x106, "f32x4.relaxed_nmadd";
        F64x2RelaxedMadd = 0x107, "f64x2.relaxed_madd";
        F64x2RelaxedNmadd = 0x108, "f64x2.relaxed_nmadd";
        I8x16RelaxedLaneselect = 0x109, "i8x16.relaxed_laneselect";
        I16x8RelaxedLaneselect = 0x10a, "i16x8.relaxed_laneselect";
        I32x4RelaxedLaneselect = 0x10b, "i32x4.relaxed_laneselect";
        I64x2RelaxedLaneselect = 0x10c, "i64x2.relaxed_laneselect";
        F32x4RelaxedMin = 0x10d, "f32x4.relaxed_min";
        F32x4RelaxedMax = 0x10e, "f32x4.relaxed_max";
        F64x2RelaxedMin = 0x10f, "f64x2.relaxed_min";
        F64x2RelaxedMax = 0x110, "f64x2.relaxed_max";
        I16x8RelaxedQ15mulrS = 0x111, "i16x8.relaxed_q15mulr_s";
        I16x8RelaxedDotI8x16I7x16S = 0x112, "i16x8.relaxed_dot_i8x16_i7x16_s";
        I32x4RelaxedDotI8x16I7x16AddS = 0x113, "i32x4.relaxed_dot_i8x16_i7x16_add_s";
    }
}

opcode_space! {
    /// Threads and atomics instructions, prefix `0xFE`.
    AtomicOp {
        MemoryAtomicNotify = 0x00, "memory.atomic.notify";
        MemoryAtomicWait32 = 0x01, "memory.atomic.wait32";
        MemoryAtomicWait64 = 0x02, "memory.atomic.wait64";
        AtomicFence = 0x03, "atomic.fence";
        I32AtomicLoad = 0x10, "i32.atomic.load";
        I64AtomicLoad = 0x11, "i64.atomic.load";
        I32AtomicLoad8U = 0x12, "i32.atomic.load8_u";
        I32AtomicLoad16U = 0x13, "i32.atomic.load16_u";
        I64AtomicLoad8U = 0x14, "i64.atomic.load8_u";
        I64AtomicLoad16U = 0x15, "i64.atomic.load16_u";
        I64AtomicLoad32U = 0x16, "i64.atomic.load32_u";
        I32AtomicStore = 0x17, "i32.atomic.store";
        I64AtomicStore = 0x18, "i64.atomic.store";
        I32AtomicStore8 = 0x19, "i32.atomic.store8";
        I32AtomicStore16 = 0x1a, "i32.atomic.store16";
        I64AtomicStore8 = 0x1b, "i64.atomic.store8";
        I64AtomicStore16 = 0x1c, "i64.atomic.store16";
        I64AtomicStore32 = 0x1d, "i64.atomic.store32";
        I32AtomicRmwAdd = 0x1e, "i32.atomic.rmw.add";
        I64AtomicRmwAdd = 0x1f, "i64.atomic.rmw.add";
        I32AtomicRmw8AddU = 0x20, "i32.atomic.rmw8.add_u";
        I32AtomicRmw16AddU = 0x21, "i32.atomic.rmw16.add_u";
        I64AtomicRmw8AddU = 0x22, "i64.atomic.rmw8.add_u";
        I64AtomicRmw16AddU = 0x23, "i64.atomic.rmw16.add_u";
        I64AtomicRmw32AddU = 0x24, "i64.atomic.rmw32.add_u";
        I32AtomicRmwSub = 0x25, "i32.atomic.rmw.sub";
        I64AtomicRmwSub = 0x26, "i64.atomic.rmw.sub";
        I32AtomicRmw8SubU = 0x27, "i32.atomic.rmw8.sub_u";
        I32AtomicRmw16SubU = 0x28, "i32.atomic.rmw16.sub_u";
        I64AtomicRmw8SubU = 0x29, "i64.atomic.rmw8.sub_u";
        I64AtomicRmw16SubU = 0x2a, "i64.atomic.rmw16.sub_u";
        I64AtomicRmw32SubU = 0x2b, "i64.atomic.rmw32.sub_u";
        I32AtomicRmwAnd = 0x2c, "i32.atomic.rmw.and";
        I64AtomicRmwAnd = 0x2d, "i64.atomic.rmw.and";
        I32AtomicRmw8AndU = 0x2e, "i32.atomic.rmw8.and_u";
        I32AtomicRmw16AndU = 0x2f, "i32.atomic.rmw16.and_u";
        I64AtomicRmw8AndU = 0x30, "i64.atomic.rmw8.and_u";
        I64AtomicRmw16AndU = 0x31, "i64.atomic.rmw16.and_u";
        I64AtomicRmw32AndU = 0x32, "i64.atomic.rmw32.and_u";
        I32AtomicRmwOr = 0x33, "i32.atomic.rmw.or";
        I64AtomicRmwOr = 0x34, "i64.atomic.rmw.or";
        I32AtomicRmw8OrU = 0x35, "i32.atomic.rmw8.or_u";
        I32AtomicRmw16OrU = 0x36, "i32.atomic.rmw16.or_u";
        I64AtomicRmw8OrU = 0x37, "i64.atomic.rmw8.or_u";
        I64AtomicRmw16OrU = 0x38, "i64.atomic.rmw16.or_u";
        I64AtomicRmw32OrU = 0x39, "i64.atomic.rmw32.or_u";
        I32AtomicRmwXor = 0x3a, "i32.atomic.rmw.xor";
        I64AtomicRmwXor = 0x3b, "i64.atomic.rmw.xor";
        I32AtomicRmw8XorU = 0x3c, "i32.atomic.rmw8.xor_u";
        I32AtomicRmw16XorU = 0x3d, "i32.atomic.rmw16.xor_u";
        I64AtomicRmw8XorU = 0x3e, "i64.atomic.rmw8.xor_u";
        I64AtomicRmw16XorU = 0x3f, "i64.atomic.rmw16.xor_u";
        I64AtomicRmw32XorU = 0x40, "i64.atomic.rmw32.xor_u";
        I32AtomicRmwXchg = 0x41, "i32.atomic.rmw.xchg";
        I64AtomicRmwXchg = 0x42, "i64.atomic.rmw.xchg";
        I32AtomicRmw8XchgU = 0x43, "i32.atomic.rmw8.xchg_u";
        I32AtomicRmw16XchgU = 0x44, "i32.atomic.rmw16.xchg_u";
        I64AtomicRmw8XchgU = 0x45, "i64.atomic.rmw8.xchg_u";
        I64AtomicRmw16XchgU = 0x46, "i64.atomic.rmw16.xchg_u";
        I64AtomicRmw32XchgU = 0x47, "i64.atomic.rmw32.xchg_u";
        I32AtomicRmwCmpxchg = 0x48, "i32.atomic.rmw.cmpxchg";
        I64AtomicRmwCmpxchg = 0x49, "i64.atomic.rmw.cmpxchg";
        I32AtomicRmw8CmpxchgU = 0x4a, "i32.atomic.rmw8.cmpxchg_u";
        I32AtomicRmw16CmpxchgU = 0x4b, "i32.atomic.rmw16.cmpxchg_u";
        I64AtomicRmw8CmpxchgU = 0x4c, "i64.atomic.rmw8.cmpxchg_u";
        I64AtomicRmw16CmpxchgU = 0x4d, "i64.atomic.rmw16.cmpxchg_u";
        I64AtomicRmw32CmpxchgU = 0x4e, "i64.atomic.rmw32.cmpxchg_u";
    }
}

/// Resolves a raw opcode to its mnemonic. `prefix` is `None` for the
/// primary space.
pub fn name_of(prefix: Option<u8>, code: u32) -> Option<&'static str> {
    match prefix {
        None => Op::from_code(code).map(Op::name),
        Some(encoding::PREFIX_GC) => GcOp::from_code(code).map(GcOp::name),
        Some(encoding::PREFIX_MISC) => MiscOp::from_code(code).map(MiscOp::name),
        Some(encoding::PREFIX_SIMD) => SimdOp::from_code(code).map(SimdOp::name),
        Some(encoding::PREFIX_ATOMIC) => AtomicOp::from_code(code).map(AtomicOp::name),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique_codes(codes: impl Iterator<Item = u32>) {
        let mut seen = HashSet::new();
        for code in codes {
            assert!(seen.insert(code), "duplicate opcode {code:#x}");
        }
    }

    #[test]
    fn codes_are_unique_per_space() {
        assert_unique_codes(Op::ALL.iter().map(|op| op.code()));
        assert_unique_codes(GcOp::ALL.iter().map(|op| op.code()));
        assert_unique_codes(MiscOp::ALL.iter().map(|op| op.code()));
        assert_unique_codes(SimdOp::ALL.iter().map(|op| op.code()));
        assert_unique_codes(AtomicOp::ALL.iter().map(|op| op.code()));
    }

    #[test]
    fn primary_codes_fit_in_a_byte() {
        assert!(Op::ALL.iter().all(|op| op.code() < 0x100));
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(Op::from_code(0x6a), Some(Op::I32Add));
        assert_eq!(SimdOp::from_code(0x113), Some(SimdOp::I32x4RelaxedDotI8x16I7x16AddS));
        assert_eq!(SimdOp::from_code(154), None);
        assert_eq!(name_of(Some(0xfb), 28), Some("ref.i31"));
        assert_eq!(name_of(Some(0xfe), 3), Some("atomic.fence"));
        assert_eq!(name_of(None, 0x27), None);
        assert_eq!(name_of(Some(0xff), 0), None);
    }
}
