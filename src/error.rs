//! Error types for tree construction and rendering.

use crate::ast::{NodeKind, SectionId};

/// A node could not be built from the given inputs.
///
/// Construction errors are raised before anything is attached to a module,
/// so a tree that exists is always safe to emit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("{kind} value {value} out of range")]
    OutOfRange { kind: &'static str, value: String },
    #[error("{shape} constant needs {expected} lanes, got {actual}")]
    LaneCount {
        shape: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("lane index {lane} out of range for {op} ({lanes} lanes)")]
    LaneIndex { op: &'static str, lane: u8, lanes: u8 },
    #[error("alignment 2^{align} exceeds natural alignment 2^{natural} of {op}")]
    Alignment { op: &'static str, align: u32, natural: u32 },
    #[error("{op} expects {expected} operands, got {actual}")]
    Arity {
        op: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{op} declares result {expected} but its body ends with {actual}")]
    ResultMismatch {
        op: &'static str,
        expected: String,
        actual: String,
    },
    #[error("invalid catch clause: {0}")]
    InvalidCatch(String),
    #[error("duplicate {0} section")]
    DuplicateSection(SectionId),
    #[error("{later} section may not follow {earlier} section")]
    SectionOrder { earlier: SectionId, later: SectionId },
    #[error("expected {expected}, got {actual}")]
    UnexpectedNode { expected: &'static str, actual: NodeKind },
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{op} is not a {family} instruction")]
    WrongFamily { op: &'static str, family: &'static str },
}

impl BuildError {
    pub(crate) fn out_of_range(kind: &'static str, value: impl ToString) -> BuildError {
        BuildError::OutOfRange {
            kind,
            value: value.to_string(),
        }
    }
}

/// A problem found while rendering text. Rendering continues past these;
/// they are delivered to the printer's error channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("unknown opcode {bytes}")]
    UnknownOpcode { prefix: Option<u8>, code: u32, bytes: String },
    #[error("unexpected {kind} node in {context}")]
    UnexpectedNode { kind: NodeKind, context: &'static str },
}

impl RenderError {
    /// Records the raw opcode bytes as hex, the way they appear on the wire.
    pub(crate) fn unknown_opcode(prefix: Option<u8>, code: u32) -> RenderError {
        let mut raw = Vec::new();
        if let Some(p) = prefix {
            raw.push(p);
        }
        match prefix {
            Some(_) => raw.extend_from_slice(crate::encoding::Leb128::unsigned(code as u64).as_bytes()),
            None => raw.push(code as u8),
        }
        RenderError::UnknownOpcode {
            prefix,
            code,
            bytes: hex::encode(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_opcode_reports_raw_bytes() {
        let err = RenderError::unknown_opcode(Some(0xfd), 0x9a);
        assert_eq!(err.to_string(), "unknown opcode fd9a01");

        let err = RenderError::unknown_opcode(None, 0x27);
        assert_eq!(err.to_string(), "unknown opcode 27");
    }

    #[test]
    fn build_error_display() {
        let err = BuildError::Alignment {
            op: "i32.load",
            align: 3,
            natural: 2,
        };
        assert_eq!(err.to_string(), "alignment 2^3 exceeds natural alignment 2^2 of i32.load");
        let err = BuildError::DuplicateSection(SectionId::Code);
        assert_eq!(err.to_string(), "duplicate code section");
    }
}
