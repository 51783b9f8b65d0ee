//! The recursive factorial module, used by the command line tool, the
//! benchmarks and the tests.

use crate::ast::{BlockType, ExternalKind, Node, ValType};
use crate::builder;
use crate::error::BuildError;
use crate::instruction::control::{call, if_, local_get};
use crate::instruction::{IntOps, ResultType, ValueOps, I32};

/// ```text
/// (func (param i32) (result i32)
///   (if (result i32) (i32.eqz (local.get 0))
///     (then (i32.const 1))
///     (else (i32.mul (local.get 0)
///                    (call 0 (i32.sub (local.get 0) (i32.const 1)))))))
/// ```
pub fn factorial_module() -> Result<Node, BuildError> {
    let n = || local_get(ValType::I32, 0);
    let recurse = call(
        0,
        ResultType::Value(ValType::I32),
        vec![I32::sub(n(), I32::const_(1))],
    );
    let body = if_(
        BlockType::Value(ValType::I32),
        I32::eqz(n()),
        vec![I32::const_(1)],
        Some(vec![I32::mul(n(), recurse)]),
    )?;

    builder::module(vec![
        builder::type_section(vec![builder::func_type(&[ValType::I32], &[ValType::I32])])?,
        builder::function_section(&[0]),
        builder::export_section(vec![builder::export("fact", ExternalKind::Func, 0)])?,
        builder::code_section(vec![builder::function_body(&[], vec![body])])?,
    ])
}
