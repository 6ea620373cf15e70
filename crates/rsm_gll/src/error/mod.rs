//! # Error Types
//!
//! Errors raised while building or loading a recursive state machine.
//!
//! ## Overview
//!
//! Parsing itself never fails: an input that has no derivation is reported
//! through [`ParseStatus`](crate::gll::ParseStatus) on the parse result. The
//! errors in this module come from the surfaces around the engine:
//!
//! - **Builder validation**: nonterminals without (or with several) start
//!   states, edges pointing at unknown states
//! - **Text format**: malformed records in a persisted RSM
//! - **I/O**: failures while reading or writing RSM files
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting.

use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Result alias used throughout the crate.
pub type GllResult<T> = Result<T, GllError>;

#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GllError {
    #[error("Malformed RSM record on line {line}: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rsm::format)))]
    Format { line: usize, message: String },

    #[error("Nonterminal `{nonterminal}` has no start state")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(rsm::missing_start_state),
            help("every nonterminal that is declared or called needs exactly one start state")
        )
    )]
    MissingStartState { nonterminal: CompactString },

    #[error("Nonterminal `{nonterminal}` has more than one start state")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rsm::duplicate_start_state)))]
    DuplicateStartState { nonterminal: CompactString },

    #[error("Unknown RSM state {id}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rsm::unknown_state)))]
    UnknownState { id: usize },

    #[error("Unknown nonterminal `{name}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rsm::unknown_nonterminal)))]
    UnknownNonterminal { name: CompactString },

    #[error("I/O error while accessing an RSM file")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rsm::io)))]
    Io(#[from] std::io::Error),
}

impl GllError {
    /// Create a text format error for the given (1-based) line
    #[must_use]
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Create a missing start state error
    #[must_use]
    pub fn missing_start_state(nonterminal: impl Into<CompactString>) -> Self {
        Self::MissingStartState {
            nonterminal: nonterminal.into(),
        }
    }

    /// Create a duplicate start state error
    #[must_use]
    pub fn duplicate_start_state(nonterminal: impl Into<CompactString>) -> Self {
        Self::DuplicateStartState {
            nonterminal: nonterminal.into(),
        }
    }

    /// Create an unknown state error
    #[must_use]
    pub const fn unknown_state(id: usize) -> Self {
        Self::UnknownState { id }
    }

    /// Create an unknown nonterminal error
    #[must_use]
    pub fn unknown_nonterminal(name: impl Into<CompactString>) -> Self {
        Self::UnknownNonterminal { name: name.into() }
    }

    /// Line number for text format errors
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}
