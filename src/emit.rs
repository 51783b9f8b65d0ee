//! Binary emitter.
//!
//! Serialises a tree to WebAssembly binary format (`.wasm`). The output
//! buffer is allocated once, sized from the root's precomputed byte length,
//! and filled by a single depth-first walk:
//!
//! ```text
//! module ::= magic:u32 version:u32 section*
//! section ::= id:u8 size:vu32 contents:byte*
//! ```
//!
//! Nothing is back-patched; every size prefix was already computed when the
//! node was built.
//!
//! # Example
//!
//! ```
//! use wasmtree::builder;
//! use wasmtree::emit;
//!
//! let module = builder::module(vec![]).unwrap();
//! let bytes = emit::emit(&module);
//! assert_eq!(&bytes[0..4], b"\0asm");
//! assert_eq!(bytes.len(), 8);
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::ast::Node;

/// A byte sink over a fixed-size buffer.
pub struct Emitter {
    buf: Vec<u8>,
    pos: usize,
}

impl Emitter {
    /// Creates an emitter for exactly `size` bytes.
    pub fn with_size(size: u32) -> Emitter {
        Emitter {
            buf: vec![0; size as usize],
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reserves `n` bytes at the cursor and advances past them.
    fn advance(&mut self, n: usize) -> &mut [u8] {
        let start = self.pos;
        self.pos += n;
        &mut self.buf[start..self.pos]
    }

    // Fixed-width little-endian writers -----------------------------------------

    pub fn write_u8(&mut self, v: u8) {
        self.advance(1)[0] = v;
    }

    pub fn write_u16(&mut self, v: u16) {
        LittleEndian::write_u16(self.advance(2), v);
    }

    pub fn write_u32(&mut self, v: u32) {
        LittleEndian::write_u32(self.advance(4), v);
    }

    pub fn write_u64(&mut self, v: u64) {
        LittleEndian::write_u64(self.advance(8), v);
    }

    pub fn write_f32(&mut self, v: f32) {
        LittleEndian::write_f32(self.advance(4), v);
    }

    pub fn write_f64(&mut self, v: f64) {
        LittleEndian::write_f64(self.advance(8), v);
    }

    // Raw bytes -------------------------------------------------------------------

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.advance(bytes.len()).copy_from_slice(bytes);
    }

    /// Returns the filled buffer.
    pub fn finish(self) -> Vec<u8> {
        debug_assert_eq!(
            self.pos,
            self.buf.len(),
            "emitter wrote {} of {} bytes",
            self.pos,
            self.buf.len()
        );
        self.buf
    }
}

/// Encodes any node (usually a module) to its binary form.
pub fn emit(node: &Node) -> Vec<u8> {
    emit_with(node.byte_len(), |e| node.emit(e))
}

/// Runs `f` against a fresh emitter of `size` bytes and returns the buffer.
pub fn emit_with(size: u32, f: impl FnOnce(&mut Emitter)) -> Vec<u8> {
    let mut e = Emitter::with_size(size);
    f(&mut e);
    e.finish()
}
