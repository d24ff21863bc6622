//! The volume/brick topology as reported by `gluster volume info`.
//!
//! [`parse`] consumes the raw report text and produces a [`Topology`]:
//! volumes in report order, each carrying its bricks in report order plus
//! the flags and annotations the dispatch stage works with. Parsing is
//! deliberately conservative: report shapes it does not understand abort
//! the whole run with a [`ParseError`] rather than guessing.

pub mod model;
pub mod parser;

pub use model::{
    Brick,
    Topology,
    Volume,
};
pub use parser::{
    classify,
    parse,
    ReportLine,
};

/// Fatal problems with the report text. Any of these discards all partial
/// state; no hook runs and the process exits non-zero.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("report line {line}: unknown key {key:?} with no value, assuming the report format changed")]
    UnknownKey { line: usize, key: String },
    #[error("report line {line}: {content:?} has no `:` separator")]
    MissingSeparator { line: usize, content: String },
    #[error("report line {line}: {content:?} arrived before any volume section was opened")]
    FieldBeforeVolume { line: usize, content: String },
    #[error("report line {line}: duplicate volume name {name:?}")]
    DuplicateVolume { line: usize, name: String },
}
