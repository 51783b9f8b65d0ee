#[cfg(test)]
mod tests {
    use wasmtree::access;
    use wasmtree::ast::{BlockType, HeapType, Node, RefType, SectionId, StorageType, ValType};
    use wasmtree::builder::{self, Limits};
    use wasmtree::demo::factorial_module;
    use wasmtree::instruction::control::{block, br_table, drop, local_get, ref_func, ref_null};
    use wasmtree::instruction::exceptions::{throw, try_, try_delegate, try_table, Catch, CatchClause};
    use wasmtree::instruction::{atomic, bulk, gc, MemArg, ValueOps, I32, V128};
    use wasmtree::printer::{print_to_string, PrintOptions, Printer};

    fn flat(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn render(node: impl Into<Node>) -> String {
        flat(&print_to_string(&node.into()).unwrap())
    }

    // =========================================================================
    // Modules
    // =========================================================================

    #[test]
    fn factorial_module_text() {
        let text = render(factorial_module().unwrap());
        assert!(text.starts_with("(module (type 0 (func (param i32) (result i32)))"), "{text}");
        assert!(text.contains("(call 0 (i32.sub (local.get 0) (i32.const 1)))"), "{text}");
    }

    #[test]
    fn type_definitions() {
        let base = builder::sub_type(
            false,
            &[],
            builder::struct_type(vec![builder::field_type(ValType::I32.into(), false)]).unwrap(),
        )
        .unwrap();
        let derived = builder::sub_type(
            true,
            &[0],
            builder::struct_type(vec![
                builder::field_type(ValType::I32.into(), false),
                builder::field_type(ValType::Ref(RefType::null(HeapType::Concrete(0))).into(), true),
            ])
            .unwrap(),
        )
        .unwrap();
        let bytes = builder::array_type(builder::field_type(StorageType::I8, true)).unwrap();
        let m = builder::module(vec![builder::type_section(vec![base, derived, bytes]).unwrap()]).unwrap();
        assert_eq!(
            render(m),
            "(module (type 0 (sub (struct (field i32)))) \
             (type 1 (sub final 0 (struct (field i32) (field (mut (ref null 0)))))) \
             (type 2 (array (mut i8))))"
        );
    }

    #[test]
    fn tables_and_custom_sections() {
        let m = builder::module(vec![
            builder::table_section(vec![
                builder::table_type(RefType::FUNCREF, &Limits::new(4)).unwrap(),
                builder::table_with_init(RefType::non_null(HeapType::Func), &Limits::new(2).max(8), vec![ref_func(0)])
                    .unwrap(),
            ])
            .unwrap(),
            builder::custom_section("note", b"a\x01".to_vec()),
        ])
        .unwrap();
        let text = render(m);
        assert!(text.contains("(table 0 4 funcref)"), "{text}");
        assert!(text.contains("(table 1 2 8 (ref func) (ref.func 0))"), "{text}");
        assert!(text.contains("(@custom \"note\" \"a\\01\")"), "{text}");
    }

    #[test]
    fn passive_expression_elements() {
        let m = builder::module(vec![builder::element_section(vec![builder::elem_segment(
            builder::ElemMode::Passive,
            builder::ElemItems::Expressions(RefType::FUNCREF, vec![vec![ref_func(1)], vec![ref_null(HeapType::Func)]]),
        )])
        .unwrap()])
        .unwrap();
        assert_eq!(
            render(m),
            "(module (elem 0 funcref (item (ref.func 1)) (item (ref.null func))))"
        );
    }

    // =========================================================================
    // Instructions
    // =========================================================================

    #[test]
    fn legacy_try_segments() {
        let t = try_(
            BlockType::Value(ValType::I32),
            vec![throw(0, vec![I32::const_(1)]), I32::const_(0)],
            vec![Catch::Tag { tag: 0, body: vec![] }, Catch::All(vec![I32::const_(2)])],
        )
        .unwrap();
        assert_eq!(
            render(t),
            "(try (result i32) (do (throw 0 (i32.const 1)) (i32.const 0)) (catch 0) (catch_all (i32.const 2)))"
        );

        let d = try_delegate(BlockType::Empty, vec![I32::const_(0)], 1).unwrap();
        assert_eq!(render(d), "(try (do (i32.const 0)) (delegate 1))");
    }

    #[test]
    fn try_table_clauses() {
        let t = try_table(
            BlockType::Empty,
            &[CatchClause::Catch { tag: 0, label: 1 }, CatchClause::CatchAllRef { label: 0 }],
            vec![throw(0, vec![])],
        )
        .unwrap();
        let wrapped = block(BlockType::Empty, vec![t]).unwrap();
        assert_eq!(
            render(wrapped),
            "(block (try_table (catch 0 1) (catch_all_ref 0) (throw 0)))"
        );
    }

    #[test]
    fn bulk_immediates_in_text_order() {
        let init = bulk::memory_init(3, 1, I32::const_(0), I32::const_(0), I32::const_(4));
        assert_eq!(
            render(init),
            "(memory.init 1 3 (i32.const 0) (i32.const 0) (i32.const 4))"
        );
        let table = bulk::table_init(2, 0, I32::const_(0), I32::const_(0), I32::const_(1));
        assert!(render(table).starts_with("(table.init 0 2 "));
    }

    #[test]
    fn branch_tables() {
        let b = br_table(&[0, 2], 1, local_get(ValType::I32, 0));
        assert_eq!(render(b), "(br_table 0 2 1 (local.get 0))");
    }

    #[test]
    fn vectors_and_atomics() {
        let mut lanes = [0u8; 16];
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = (i * 2) as u8;
        }
        let shuffle = V128::shuffle(lanes, V128::const_([0; 16]), V128::const_([0xff; 16])).unwrap();
        let text = render(shuffle);
        assert!(
            text.starts_with("(i8x16.shuffle 0 2 4 6 8 10 12 14 16 18 20 22 24 26 28 30 (v128.const i32x4 0x00000000"),
            "{text}"
        );

        assert_eq!(render(atomic::fence()), "(atomic.fence)");
        let store = atomic::store(
            wasmtree::instruction::AtomicOp::I32AtomicStore,
            MemArg::new().offset(8),
            I32::const_(0),
            I32::const_(1),
        )
        .unwrap();
        assert_eq!(render(store), "(i32.atomic.store offset=8 (i32.const 0) (i32.const 1))");
    }

    #[test]
    fn gc_operands_nest() {
        let get = gc::struct_get(0, 1, ValType::I64, gc::struct_new_default(0));
        assert_eq!(render(get), "(struct.get 0 1 (struct.new_default 0))");
        let test = gc::ref_test(RefType::non_null(HeapType::I31), gc::ref_i31(I32::const_(1)));
        assert_eq!(render(drop(test)), "(drop (ref.test (ref i31) (ref.i31 (i32.const 1))))");
    }

    // =========================================================================
    // Output plumbing
    // =========================================================================

    #[test]
    fn sink_receives_whole_text() {
        let module = factorial_module().unwrap();
        let mut chunks = 0;
        let mut out = String::new();
        Printer::new(
            |s: &str| {
                chunks += 1;
                out.push_str(s);
            },
            |e| panic!("{e}"),
        )
        .print(&module);
        assert!(chunks > 1);
        assert_eq!(out, print_to_string(&module).unwrap());
    }

    #[test]
    fn custom_indent() {
        let mut out = String::new();
        let options = PrintOptions {
            indent: "    ".into(),
            ..PrintOptions::default()
        };
        Printer::with_options(|s: &str| out.push_str(s), |_| {}, options).print(&factorial_module().unwrap());
        assert!(out.lines().nth(1).unwrap().starts_with("    (type 0"), "{out}");
    }

    #[test]
    fn accessors_agree_with_text() {
        let module = factorial_module().unwrap();
        let code = access::find_section(&module, SectionId::Code).unwrap();
        let bodies: Vec<_> = access::function_bodies(code).collect();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].locals.is_empty());
        assert_eq!(bodies[0].code.len(), 1);

        let ids: Vec<SectionId> = access::sections(&module).filter_map(|s| s.section_id()).collect();
        assert_eq!(ids, vec![SectionId::Type, SectionId::Function, SectionId::Export, SectionId::Code]);

        let layout = access::layout(&module);
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json[1]["id"], "function");
        assert_eq!(json[1]["offset"], layout[0].payload_offset + layout[0].size);
    }
}
