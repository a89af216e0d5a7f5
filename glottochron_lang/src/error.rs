// Error types.
//
// Compilation is all-or-nothing: any `RuleError` aborts building the
// catalog, and every variant carries the 1-based line of the rule text it
// came from. `ShapeError` is the lower-level complaint a `SegmentRule`
// constructor raises about an inconsistent set of classes; the compiler
// wraps it as `MalformedRuleSyntax`. Applying a compiled process never
// fails, so there is no runtime error type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("line {line}: malformed rule: {message}")]
    MalformedRuleSyntax { line: usize, message: String },

    #[error("line {line}: rule deletes segments without any context: {rule}")]
    UncheckedDeletionRule { line: usize, rule: String },

    #[error("line {line}: target length differs from source length without indices: {rule}")]
    AmbiguousCorrespondence { line: usize, rule: String },

    #[error("line {line}: unknown symbol `{symbol}`")]
    UnknownSymbol { line: usize, symbol: String },
}

impl RuleError {
    pub fn line(&self) -> usize {
        match self {
            RuleError::MalformedRuleSyntax { line, .. }
            | RuleError::UncheckedDeletionRule { line, .. }
            | RuleError::AmbiguousCorrespondence { line, .. }
            | RuleError::UnknownSymbol { line, .. } => *line,
        }
    }
}

/// Structural problems with the classes handed to `SegmentRule::new`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{correspondences} correspondences for {targets} target classes")]
    CorrespondenceCount {
        correspondences: usize,
        targets: usize,
    },

    #[error("index {index} is outside the {len}-segment source")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(
        "copy slots need a two-segment source without context, \
         or a one-segment source with context on one side only"
    )]
    UnreferencedCopy,

    #[error("an inserted segment cannot copy from a reference")]
    CopyIntoInsertion,

    #[error("an inserted segment needs both a manner and a place")]
    IncompleteInsertion,
}

#[derive(Debug, Error)]
pub enum IpaError {
    #[error("unknown IPA symbol `{symbol}` at position {position}")]
    UnknownSymbol { symbol: String, position: usize },

    #[error("unknown feature name `{0}` in symbol table")]
    UnknownFeature(String),

    #[error("symbol `{symbol}` does not name both a place and a manner")]
    IncompleteSymbol { symbol: String },

    #[error("invalid symbol table JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: {source}")]
    Rules {
        path: String,
        #[source]
        source: RuleError,
    },
}
