//! Build WebAssembly modules as trees, then emit them as binary or render
//! them as text.
//!
//! wasmtree assembles a module bottom-up through typed constructors. Every
//! node knows its exact encoded size as soon as it exists, so the binary
//! emitter writes the whole module in one pass into a buffer of the right
//! size, and the printer renders the same tree as folded s-expressions.
//!
//! # Modules
//!
//! - [`ast`] -- The node model: atoms, cells and their kinds, plus value and heap types.
//! - [`instruction`] -- Instruction nodes and one constructor per opcode family.
//! - [`builder`] -- Sections, entries, type definitions and segments.
//! - [`emit`] -- The binary emitter.
//! - [`printer`] -- The text renderer.
//! - [`access`] -- Section lookup, function bodies and byte layout.
//!
//! # Example
//!
//! Build a module exporting an `add` function and encode it:
//!
//! ```
//! use wasmtree::ast::{ExternalKind, ValType};
//! use wasmtree::builder;
//! use wasmtree::instruction::control::local_get;
//! use wasmtree::instruction::{ValueOps, I32};
//!
//! let add = I32::add(local_get(ValType::I32, 0), local_get(ValType::I32, 1));
//! let module = builder::module(vec![
//!     builder::type_section(vec![builder::func_type(&[ValType::I32, ValType::I32], &[ValType::I32])]).unwrap(),
//!     builder::function_section(&[0]),
//!     builder::export_section(vec![builder::export("add", ExternalKind::Func, 0)]).unwrap(),
//!     builder::code_section(vec![builder::function_body(&[], vec![add])]).unwrap(),
//! ])
//! .unwrap();
//!
//! let bytes = module.to_bytes();
//! assert_eq!(bytes.len(), module.byte_len() as usize);
//! assert_eq!(&bytes[..4], b"\0asm");
//!
//! let text = wasmtree::printer::print_to_string(&module).unwrap();
//! assert!(text.contains("(i32.add (local.get 0) (local.get 1))"));
//! ```
//!
//! # Coverage
//!
//! The encodings follow the WebAssembly core specification together with
//! the GC, exception handling (legacy and `try_table`), SIMD and relaxed
//! SIMD, threads, multi-memory, memory64 and tail call proposals.

pub mod access;
pub mod ast;
pub mod builder;
pub mod demo;
pub mod emit;
pub mod encoding;
pub mod error;
pub mod instruction;
pub mod printer;

pub use ast::{Atom, Cell, Node};
pub use error::{BuildError, RenderError};
pub use instruction::Instr;
