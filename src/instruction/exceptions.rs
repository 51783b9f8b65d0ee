//! Exception handling: legacy `try`/`catch`/`delegate`, and `try_table`
//! with `exnref`.
//!
//! A legacy `try` keeps its handlers inline, split by marker
//! instructions:
//!
//! ```text
//! try bt body (catch tag handler)* (catch_all handler)? end
//! try bt body delegate label
//! ```
//!
//! `try_table` lists its catch clauses as immediates and has a plain body.

use crate::ast::{Atom, BlockType, Cell, CellKind, Node};
use crate::error::BuildError;

use super::control::counted;
use super::{bare, check_block_result, index, plain, structured, Instr, Op, ResultType};

/// A handler of a legacy `try`.
#[derive(Debug, Clone, PartialEq)]
pub enum Catch {
    Tag { tag: u32, body: Vec<Instr> },
    All(Vec<Instr>),
}

/// `try bt body handlers end`. At most one `catch_all`, and only last.
pub fn try_(bt: BlockType, body: Vec<Instr>, catches: Vec<Catch>) -> Result<Instr, BuildError> {
    check_block_result("try", bt, &body)?;
    let last = catches.len().saturating_sub(1);
    let mut post = body;
    for (i, catch) in catches.into_iter().enumerate() {
        match catch {
            Catch::Tag { tag, body } => {
                check_block_result("try", bt, &body)?;
                post.push(plain(Op::Catch, ResultType::Void, vec![], vec![index(tag)]));
                post.extend(body);
            }
            Catch::All(body) => {
                if i != last {
                    return Err(BuildError::InvalidCatch("catch_all must be the last handler".into()));
                }
                check_block_result("try", bt, &body)?;
                post.push(bare(Op::CatchAll));
                post.extend(body);
            }
        }
    }
    Ok(structured(Op::Try, bt, vec![], vec![], post))
}

/// `try bt body delegate label`: forwards exceptions to an outer handler.
/// `delegate` takes the place of `end`.
pub fn try_delegate(bt: BlockType, body: Vec<Instr>, label: u32) -> Result<Instr, BuildError> {
    check_block_result("try", bt, &body)?;
    let mut post = body;
    post.push(plain(Op::Delegate, ResultType::Void, vec![], vec![index(label)]));
    Ok(Instr::new(
        None,
        Op::Try.code(),
        bt.into(),
        vec![],
        vec![Atom::block_type(bt).into()],
        post,
    ))
}

pub fn throw(tag: u32, args: Vec<Instr>) -> Instr {
    plain(Op::Throw, ResultType::Void, args, vec![index(tag)])
}

/// `rethrow label`: rethrows the exception caught by an enclosing
/// legacy handler.
pub fn rethrow(label: u32) -> Instr {
    plain(Op::Rethrow, ResultType::Void, vec![], vec![index(label)])
}

pub fn throw_ref(exn: Instr) -> Instr {
    plain(Op::ThrowRef, ResultType::Void, vec![exn], vec![])
}

/// A catch clause of `try_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchClause {
    Catch { tag: u32, label: u32 },
    CatchRef { tag: u32, label: u32 },
    CatchAll { label: u32 },
    CatchAllRef { label: u32 },
}

impl CatchClause {
    /// Builds a clause from its wire kind (0 to 3). `catch` and `catch_ref`
    /// need a tag; the `catch_all` forms must not have one.
    pub fn from_raw(kind: u8, tag: Option<u32>, label: u32) -> Result<CatchClause, BuildError> {
        match (kind, tag) {
            (0, Some(tag)) => Ok(CatchClause::Catch { tag, label }),
            (1, Some(tag)) => Ok(CatchClause::CatchRef { tag, label }),
            (2, None) => Ok(CatchClause::CatchAll { label }),
            (3, None) => Ok(CatchClause::CatchAllRef { label }),
            (0 | 1, None) => Err(BuildError::InvalidCatch(format!("clause kind {kind} needs a tag"))),
            (2 | 3, Some(_)) => Err(BuildError::InvalidCatch(format!("clause kind {kind} takes no tag"))),
            _ => Err(BuildError::InvalidCatch(format!("unknown clause kind {kind}"))),
        }
    }

    pub fn kind(&self) -> u8 {
        match self {
            CatchClause::Catch { .. } => 0,
            CatchClause::CatchRef { .. } => 1,
            CatchClause::CatchAll { .. } => 2,
            CatchClause::CatchAllRef { .. } => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CatchClause::Catch { .. } => "catch",
            CatchClause::CatchRef { .. } => "catch_ref",
            CatchClause::CatchAll { .. } => "catch_all",
            CatchClause::CatchAllRef { .. } => "catch_all_ref",
        }
    }

    fn encode(&self) -> Node {
        let mut children: Vec<Node> = vec![Atom::uint8(self.kind()).into()];
        match *self {
            CatchClause::Catch { tag, label } | CatchClause::CatchRef { tag, label } => {
                children.push(index(tag));
                children.push(index(label));
            }
            CatchClause::CatchAll { label } | CatchClause::CatchAllRef { label } => {
                children.push(index(label));
            }
        }
        Cell::new(CellKind::CatchClause, children).into()
    }
}

/// `try_table bt clauses body end`.
pub fn try_table(bt: BlockType, clauses: &[CatchClause], body: Vec<Instr>) -> Result<Instr, BuildError> {
    check_block_result("try_table", bt, &body)?;
    let clauses = counted(clauses.iter().map(CatchClause::encode).collect());
    Ok(structured(Op::TryTable, bt, vec![], vec![clauses], body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ValType;
    use crate::instruction::control;
    use crate::instruction::I32;

    fn bytes(instr: Instr) -> Vec<u8> {
        Node::from(instr).to_bytes()
    }

    #[test]
    fn legacy_try_with_handlers() {
        let t = try_(
            BlockType::Empty,
            vec![throw(0, vec![I32::const_(1)])],
            vec![
                Catch::Tag {
                    tag: 0,
                    body: vec![control::drop(control::local_get(ValType::I32, 0))],
                },
                Catch::All(vec![]),
            ],
        )
        .unwrap();
        assert_eq!(
            bytes(t),
            vec![0x06, 0x40, 0x41, 0x01, 0x08, 0x00, 0x07, 0x00, 0x20, 0x00, 0x1a, 0x19, 0x0b]
        );
    }

    #[test]
    fn catch_all_must_be_last() {
        let err = try_(
            BlockType::Empty,
            vec![],
            vec![Catch::All(vec![]), Catch::Tag { tag: 0, body: vec![] }],
        );
        assert!(matches!(err, Err(BuildError::InvalidCatch(_))));
    }

    #[test]
    fn delegate_replaces_end() {
        let t = try_delegate(BlockType::Empty, vec![control::nop()], 1).unwrap();
        assert_eq!(bytes(t), vec![0x06, 0x40, 0x01, 0x18, 0x01]);
    }

    #[test]
    fn try_table_clauses() {
        let t = try_table(
            BlockType::Empty,
            &[
                CatchClause::Catch { tag: 2, label: 0 },
                CatchClause::CatchAllRef { label: 1 },
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(
            bytes(t),
            vec![0x1f, 0x40, 0x02, 0x00, 0x02, 0x00, 0x03, 0x01, 0x0b]
        );
    }

    #[test]
    fn raw_clause_validation() {
        assert!(CatchClause::from_raw(0, None, 0).is_err());
        assert!(CatchClause::from_raw(2, Some(1), 0).is_err());
        assert!(CatchClause::from_raw(4, None, 0).is_err());
        assert_eq!(
            CatchClause::from_raw(1, Some(3), 2).unwrap(),
            CatchClause::CatchRef { tag: 3, label: 2 }
        );
    }
}
