use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wasmtree::ast::{BlockType, Node, ValType};
use wasmtree::builder;
use wasmtree::demo::factorial_module;
use wasmtree::instruction::control::{block, br_if, local_get, local_set};
use wasmtree::instruction::{IntOps, ValueOps, I32};
use wasmtree::printer::print_to_string;

/// A module with `funcs` functions, each a block of `depth` nested adds.
fn wide_module(funcs: usize, depth: usize) -> Node {
    let body = || {
        let mut sum = local_get(ValType::I32, 0);
        for i in 0..depth {
            sum = I32::add(sum, I32::const_(i as i32));
        }
        let exit = br_if(0, I32::eqz(local_get(ValType::I32, 0)));
        block(BlockType::Empty, vec![exit, local_set(0, sum)]).expect("block")
    };
    let bodies = (0..funcs)
        .map(|_| builder::function_body(&[(1, ValType::I32)], vec![body()]))
        .collect();
    builder::module(vec![
        builder::type_section(vec![builder::func_type(&[ValType::I32], &[])]).expect("types"),
        builder::function_section(&vec![0; funcs]),
        builder::code_section(bodies).expect("code"),
    ])
    .expect("module")
}

fn benchmark_emit(c: &mut Criterion) {
    let cases = vec![
        ("factorial", factorial_module().expect("factorial")),
        ("wide_100x50", wide_module(100, 50)),
        ("wide_1000x10", wide_module(1000, 10)),
    ];

    for (name, module) in &cases {
        println!("{name}: {} bytes", module.byte_len());
    }

    let mut group = c.benchmark_group("emit");
    for (name, module) in &cases {
        group.bench_function(*name, |b| b.iter(|| black_box(module.to_bytes())));
    }
    group.finish();

    let mut group = c.benchmark_group("print");
    for (name, module) in &cases {
        group.bench_function(*name, |b| b.iter(|| black_box(print_to_string(module).expect("render"))));
    }
    group.finish();

    c.bench_function("build_wide_100x50", |b| b.iter(|| black_box(wide_module(100, 50))));
}

criterion_group!(benches, benchmark_emit);
criterion_main!(benches);
