#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    use wasmtree::ast::{Atom, BlockType, ExternalKind, HeapType, Node, RefType, SectionId, StorageType, ValType};
    use wasmtree::builder::{self, DataMode, ElemItems, ElemMode, ImportDesc, Limits};
    use wasmtree::error::BuildError;
    use wasmtree::instruction::control::{block, br_table, if_, local_get, loop_, select_typed};
    use wasmtree::instruction::exceptions::{try_delegate, try_table, CatchClause};
    use wasmtree::instruction::{gc, IntOps, LaneShape, MemArg, SimdOp, ValueOps, F64, I32, I64, V128};

    // ==========================================================================
    // Size invariant
    // ==========================================================================

    fn leaf(instr: wasmtree::Instr) -> Node {
        instr.into()
    }

    #[rstest]
    #[case::varuint32(Atom::varuint32(u32::MAX).into())]
    #[case::varint64(Atom::varint64(i64::MIN).into())]
    #[case::bytes(Atom::bytes(vec![0u8; 200]).into())]
    #[case::string(builder::str("a name with ünïcode"))]
    #[case::func_type(builder::func_type(&[ValType::I32, ValType::FUNCREF], &[ValType::V128]))]
    #[case::ref_type(builder::func_type(&[ValType::Ref(RefType::to_index(300))], &[]))]
    #[case::limits(builder::limits(&Limits::new(1).max(1 << 20).shared()).unwrap())]
    #[case::memory64(builder::limits(&Limits::new(1 << 40).memory64()).unwrap())]
    #[case::import(builder::import("m", "t", ImportDesc::Table(RefType::EXTERNREF, Limits::new(0))).unwrap())]
    #[case::export(builder::export("x", ExternalKind::Memory, 70000))]
    #[case::elem(builder::elem_segment(ElemMode::Passive, ElemItems::Functions((0..200).collect())))]
    #[case::data(builder::data_segment(DataMode::Passive, vec![7u8; 130]))]
    #[case::i64_const(leaf(I64::const_(i64::MAX)))]
    #[case::f64_const(leaf(F64::add(F64::const_(0.5), F64::const_(f64::NAN))))]
    #[case::br_table(leaf(br_table(&[0, 1, 2, 3], 0, I32::const_(2))))]
    #[case::select_typed(leaf(select_typed(ValType::I64, I64::const_(1), I64::const_(2), I32::const_(0))))]
    #[case::loop_(leaf(loop_(BlockType::Empty, vec![]).unwrap()))]
    #[case::struct_new(leaf(gc::struct_new(129, vec![I32::const_(1)])))]
    #[case::shuffle(leaf(V128::shuffle([0; 16], V128::const_([1; 16]), V128::const_([2; 16])).unwrap()))]
    fn size_is_known_before_emission(#[case] node: Node) {
        assert_eq!(node.to_bytes().len(), node.byte_len() as usize);
    }

    #[test]
    fn deep_nesting_keeps_sizes_exact() {
        let mut expr = I32::const_(0);
        for i in 0..500 {
            expr = I32::add(expr, I32::const_(i));
        }
        let body = block(BlockType::Value(ValType::I32), vec![expr]).unwrap();
        let module = builder::module(vec![
            builder::type_section(vec![builder::func_type(&[], &[ValType::I32])]).unwrap(),
            builder::function_section(&[0]),
            builder::code_section(vec![builder::function_body(&[], vec![body])]).unwrap(),
        ])
        .unwrap();
        let bytes = module.to_bytes();
        assert_eq!(bytes.len(), module.byte_len() as usize);
        assert_eq!(*bytes.last().unwrap(), 0x0b);
    }

    // ==========================================================================
    // LEB128
    // ==========================================================================

    fn bytes_of(atom: Atom) -> Vec<u8> {
        Node::from(atom).to_bytes()
    }

    #[rstest]
    #[case(Atom::varuint32(0), vec![0x00])]
    #[case(Atom::varuint32(127), vec![0x7f])]
    #[case(Atom::varuint32(128), vec![0x80, 0x01])]
    #[case(Atom::varuint32(300), vec![0xac, 0x02])]
    #[case(Atom::varuint32(u32::MAX), vec![0xff, 0xff, 0xff, 0xff, 0x0f])]
    #[case(Atom::varint32(-1), vec![0x7f])]
    #[case(Atom::varint32(63), vec![0x3f])]
    #[case(Atom::varint32(64), vec![0xc0, 0x00])]
    #[case(Atom::varint32(-64), vec![0x40])]
    #[case(Atom::varint32(-65), vec![0xbf, 0x7f])]
    #[case(Atom::varint32(i32::MIN), vec![0x80, 0x80, 0x80, 0x80, 0x78])]
    #[case(Atom::varint64(-1), vec![0x7f])]
    #[case(Atom::varint64(i64::MAX), vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00])]
    #[case(Atom::varuint1(true), vec![0x01])]
    fn leb128_vectors(#[case] atom: Atom, #[case] expected: Vec<u8>) {
        assert_eq!(atom.byte_len() as usize, expected.len());
        assert_eq!(bytes_of(atom), expected);
    }

    fn read_unsigned(bytes: &[u8]) -> (u64, usize) {
        let mut result = 0u64;
        let mut shift = 0;
        for (i, b) in bytes.iter().enumerate() {
            result |= ((b & 0x7f) as u64) << shift;
            shift += 7;
            if b & 0x80 == 0 {
                return (result, i + 1);
            }
        }
        panic!("unterminated LEB128");
    }

    fn read_signed(bytes: &[u8]) -> (i64, usize) {
        let mut result = 0i64;
        let mut shift = 0;
        for (i, b) in bytes.iter().enumerate() {
            result |= ((b & 0x7f) as i64) << shift;
            shift += 7;
            if b & 0x80 == 0 {
                if shift < 64 && b & 0x40 != 0 {
                    result |= -1i64 << shift;
                }
                return (result, i + 1);
            }
        }
        panic!("unterminated LEB128");
    }

    #[test]
    fn leb128_random_values_decode_back() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2000 {
            let bits = rng.gen_range(0..64);
            let u: u64 = rng.gen::<u64>() >> bits;
            let bytes = bytes_of(Atom::varuint64(u));
            assert_eq!(read_unsigned(&bytes), (u, bytes.len()), "{u}");

            let s: i64 = rng.gen::<i64>() >> bits;
            let bytes = bytes_of(Atom::varint64(s));
            assert_eq!(read_signed(&bytes), (s, bytes.len()), "{s}");

            let s32: i32 = rng.gen();
            let bytes = bytes_of(Atom::varint32(s32));
            assert!(bytes.len() <= 5);
            assert_eq!(read_signed(&bytes).0, s32 as i64);
        }
    }

    #[test]
    fn leb128_range_checks() {
        assert!(matches!(Atom::varuint7(0x80), Err(BuildError::OutOfRange { .. })));
        assert!(matches!(Atom::varint7(-65), Err(BuildError::OutOfRange { .. })));
        assert!(matches!(Atom::try_varuint32(1 << 32), Err(BuildError::OutOfRange { .. })));
        assert!(matches!(Atom::try_varint32(i32::MAX as i64 + 1), Err(BuildError::OutOfRange { .. })));
        assert!(matches!(Atom::try_varint64(i64::MIN as i128 - 1), Err(BuildError::OutOfRange { .. })));
        assert_eq!(bytes_of(Atom::try_varuint32(5).unwrap()), vec![0x05]);
    }

    // ==========================================================================
    // Immediates
    // ==========================================================================

    #[test]
    fn memarg_selects_memory_with_flag() {
        let load = I32::load(MemArg::new().memory(3).offset(16), I32::const_(0)).unwrap();
        // i32.const 0, i32.load align=2|0x40 memory=3 offset=16
        assert_eq!(Node::from(load).to_bytes(), vec![0x41, 0x00, 0x28, 0x42, 0x03, 0x10]);

        let store = I64::store8(MemArg::new(), I32::const_(0), I64::const_(1)).unwrap();
        assert_eq!(Node::from(store).to_bytes(), vec![0x41, 0x00, 0x42, 0x01, 0x3c, 0x00, 0x00]);
    }

    #[test]
    fn overaligned_access_is_rejected() {
        let err = I32::load(MemArg::new().align(3), I32::const_(0)).unwrap_err();
        assert_eq!(
            err,
            BuildError::Alignment {
                op: "i32.load",
                align: 3,
                natural: 2,
            }
        );
    }

    #[test]
    fn vector_lanes_are_checked() {
        let err = V128::const_ints(LaneShape::I32x4, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, BuildError::LaneCount { expected: 4, actual: 3, .. }));

        let v = V128::const_([0; 16]);
        let err = V128::extract_lane(SimdOp::I32x4ExtractLane, 4, v).unwrap_err();
        assert!(matches!(err, BuildError::LaneIndex { lane: 4, lanes: 4, .. }));

        let err = V128::const_ints(LaneShape::I8x16, &[300; 16]).unwrap_err();
        assert!(matches!(err, BuildError::OutOfRange { .. }));
    }

    #[test]
    fn block_results_must_agree() {
        let err = block(BlockType::Value(ValType::I32), vec![F64::const_(1.0)]).unwrap_err();
        assert!(matches!(err, BuildError::ResultMismatch { op: "block", .. }));

        let err = if_(
            BlockType::Value(ValType::I64),
            I32::const_(1),
            vec![I64::const_(1)],
            Some(vec![I32::const_(0)]),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::ResultMismatch { op: "if", .. }));

        // operands of unknown type are accepted
        assert!(block(BlockType::Value(ValType::I32), vec![local_get(ValType::I32, 0)]).is_ok());
    }

    #[test]
    fn legacy_delegate_replaces_end() {
        let t = try_delegate(BlockType::Empty, vec![], 0).unwrap();
        assert_eq!(Node::from(t).to_bytes(), vec![0x06, 0x40, 0x18, 0x00]);
    }

    #[test]
    fn try_table_clauses() {
        let t = try_table(
            BlockType::Empty,
            &[
                CatchClause::CatchRef { tag: 2, label: 1 },
                CatchClause::CatchAll { label: 0 },
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(
            Node::from(t).to_bytes(),
            vec![0x1f, 0x40, 0x02, 0x01, 0x02, 0x01, 0x02, 0x00, 0x0b]
        );
        assert!(matches!(CatchClause::from_raw(2, Some(1), 0), Err(BuildError::InvalidCatch(_))));
        assert!(matches!(CatchClause::from_raw(4, None, 0), Err(BuildError::InvalidCatch(_))));
    }

    // ==========================================================================
    // Module structure
    // ==========================================================================

    #[test]
    fn custom_sections_go_anywhere() {
        let module = builder::module(vec![
            builder::custom_section("a", Vec::<u8>::new()),
            builder::type_section(vec![]).unwrap(),
            builder::custom_section("b", vec![1u8, 2]),
            builder::custom_section("b", vec![3u8]),
            builder::data_count_section(0),
        ]);
        assert!(module.is_ok());
    }

    #[test]
    fn datacount_precedes_code() {
        let err = builder::module(vec![
            builder::code_section(vec![]).unwrap(),
            builder::data_count_section(0),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::SectionOrder {
                earlier: SectionId::Code,
                later: SectionId::DataCount,
            }
        );
    }

    #[test]
    fn limits_are_checked() {
        assert!(matches!(builder::limits(&Limits::new(2).max(1)), Err(BuildError::InvalidLimits(_))));
        assert!(matches!(builder::limits(&Limits::new(1).shared()), Err(BuildError::InvalidLimits(_))));
        assert!(matches!(builder::rec_type(vec![]), Err(BuildError::Empty(_))));
    }

    #[test]
    fn storage_and_heap_types() {
        let packed = builder::array_type(builder::field_type(StorageType::I8, true)).unwrap();
        assert_eq!(packed.to_bytes(), vec![0x5e, 0x78, 0x01]);

        let nullable_any = builder::func_type(&[RefType::null(HeapType::Any).into()], &[]);
        let non_null_any = builder::func_type(&[RefType::non_null(HeapType::Any).into()], &[]);
        assert_eq!(nullable_any.to_bytes(), vec![0x60, 0x01, 0x6e, 0x00]);
        assert_eq!(non_null_any.to_bytes(), vec![0x60, 0x01, 0x64, 0x6e, 0x00]);
    }
}
