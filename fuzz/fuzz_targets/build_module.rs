#![no_main]

//! Structure-aware module builder fuzzer
//!
//! Turns fuzz input into a typed expression tree, builds it through the
//! wasmtree constructors and checks that the emitted module has exactly the
//! precomputed size, validates, and renders without errors.

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

use wasmtree::ast::{BlockType, ExternalKind, ValType};
use wasmtree::builder::{self, Limits};
use wasmtree::instruction::control::{block, br_if, drop, if_, local_get, local_set, local_tee, loop_, select};
use wasmtree::instruction::{IntOps, MemArg, ValueOps, I32, I64};
use wasmtree::{printer, Instr};

/// Configuration for generated module
#[derive(Debug, Arbitrary)]
struct ModuleConfig {
    /// Number of i32 parameters (0-4)
    num_params: u8,
    /// Number of extra i32 locals (0-10)
    num_locals: u8,
    /// Whether to have a memory
    has_memory: bool,
    /// Initial memory pages (0-4)
    memory_pages: u8,
    statements: Vec<Statement>,
    result: Expr,
}

/// An expression producing one i32.
#[derive(Debug, Clone, Arbitrary)]
enum Expr {
    Const(i32),
    Wide(i64),
    Local(u8),
    Tee(u8, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
    ShrU(Box<Expr>, Box<Expr>),
    LtS(Box<Expr>, Box<Expr>),
    Eqz(Box<Expr>),
    Clz(Box<Expr>),
    Select(Box<Expr>, Box<Expr>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Block(Vec<Statement>, Box<Expr>),
    Load(u16, Box<Expr>),
    MemorySize,
}

#[derive(Debug, Clone, Arbitrary)]
enum Statement {
    Set(u8, Expr),
    Drop(Expr),
    Store(u16, Expr, Expr),
    Loop(Vec<Statement>, Expr),
}

struct Context {
    locals: u32,
    has_memory: bool,
}

const MAX_DEPTH: u32 = 6;

impl Context {
    fn local(&self, idx: u8) -> u32 {
        idx as u32 % self.locals
    }

    fn expr(&self, e: &Expr, depth: u32) -> Instr {
        if depth > MAX_DEPTH {
            return I32::const_(0);
        }
        let sub = |e: &Expr| self.expr(e, depth + 1);
        match e {
            Expr::Const(v) => I32::const_(*v),
            Expr::Wide(v) => I32::wrap_i64(I64::const_(*v)),
            Expr::Local(idx) => local_get(ValType::I32, self.local(*idx)),
            Expr::Tee(idx, v) => local_tee(ValType::I32, self.local(*idx), sub(v)),
            Expr::Add(a, b) => I32::add(sub(a), sub(b)),
            Expr::Sub(a, b) => I32::sub(sub(a), sub(b)),
            Expr::Mul(a, b) => I32::mul(sub(a), sub(b)),
            Expr::Xor(a, b) => I32::xor(sub(a), sub(b)),
            Expr::ShrU(a, b) => I32::shr_u(sub(a), sub(b)),
            Expr::LtS(a, b) => I32::lt_s(sub(a), sub(b)),
            Expr::Eqz(a) => I32::eqz(sub(a)),
            Expr::Clz(a) => I32::clz(sub(a)),
            Expr::Select(a, b, c) => select(sub(a), sub(b), sub(c)),
            Expr::If(c, t, f) => if_(BlockType::Value(ValType::I32), sub(c), vec![sub(t)], Some(vec![sub(f)]))
                .unwrap_or_else(|_| I32::const_(0)),
            Expr::Block(stmts, v) => {
                let mut body = self.statements(stmts, depth + 1);
                body.push(sub(v));
                block(BlockType::Value(ValType::I32), body).unwrap_or_else(|_| I32::const_(0))
            }
            Expr::Load(offset, addr) if self.has_memory => {
                I32::load(MemArg::new().offset(*offset as u64), sub(addr)).unwrap_or_else(|_| I32::const_(0))
            }
            Expr::MemorySize if self.has_memory => wasmtree::instruction::memory::memory_size(0),
            _ => I32::const_(0),
        }
    }

    fn statements(&self, stmts: &[Statement], depth: u32) -> Vec<Instr> {
        if depth > MAX_DEPTH {
            return vec![];
        }
        stmts
            .iter()
            .take(10)
            .filter_map(|s| match s {
                Statement::Set(idx, v) => Some(local_set(self.local(*idx), self.expr(v, depth + 1))),
                Statement::Drop(v) => Some(drop(self.expr(v, depth + 1))),
                Statement::Store(offset, addr, v) if self.has_memory => I32::store(
                    MemArg::new().offset(*offset as u64),
                    self.expr(addr, depth + 1),
                    self.expr(v, depth + 1),
                )
                .ok(),
                Statement::Loop(body, cond) => {
                    let mut body = self.statements(body, depth + 1);
                    body.push(br_if(0, I32::eqz(self.expr(cond, depth + 1))));
                    loop_(BlockType::Empty, body).ok()
                }
                _ => None,
            })
            .collect()
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let config: ModuleConfig = match u.arbitrary() {
        Ok(c) => c,
        Err(_) => return,
    };

    let num_params = (config.num_params % 5) as usize;
    let num_locals = (config.num_locals % 11) as u32;
    let cx = Context {
        locals: (num_params as u32 + num_locals).max(1),
        has_memory: config.has_memory,
    };
    // keep at least one local so local indices have a target
    let extra = if num_params == 0 { num_locals.max(1) } else { num_locals };

    let mut body = cx.statements(&config.statements, 0);
    body.push(cx.expr(&config.result, 0));

    let mut sections = vec![
        builder::type_section(vec![builder::func_type(&vec![ValType::I32; num_params], &[ValType::I32])]).unwrap(),
        builder::function_section(&[0]),
    ];
    if config.has_memory {
        let pages = (config.memory_pages % 5) as u64;
        sections.push(builder::memory_section(&[Limits::new(pages)]).unwrap());
    }
    sections.push(builder::export_section(vec![builder::export("main", ExternalKind::Func, 0)]).unwrap());
    sections.push(builder::code_section(vec![builder::function_body(&[(extra, ValType::I32)], body)]).unwrap());
    let module = builder::module(sections).unwrap();

    let bytes = module.to_bytes();
    assert_eq!(bytes.len(), module.byte_len() as usize);
    if let Err(e) = wasmparser::validate(&bytes) {
        panic!("generated module is invalid: {e}");
    }
    printer::print_to_string(&module).unwrap();
});
