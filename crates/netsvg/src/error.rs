//! Error types for NetSvg operations.
//!
//! This module provides the main error type [`NetSvgError`]. Every error is
//! reported by the call that detected it, before the element tree is touched.

use std::io;

use thiserror::Error;

use netsvg_core::{dom::DomError, scale::ScaleError};

/// The main error type for NetSvg operations.
#[derive(Debug, Error)]
pub enum NetSvgError {
    #[error("cannot bind {actual} data items to a selection of {expected} elements")]
    BindingMismatch { expected: usize, actual: usize },

    #[error(
        "node positions are missing: pass positions explicitly or set one of the vertex attributes {}",
        .expected.join(", ")
    )]
    MissingPositions { expected: Vec<String> },

    #[error("expected {expected} positions (one per vertex), got {actual}")]
    PositionCountMismatch { expected: usize, actual: usize },

    #[error("invalid position for vertex {vertex}: {reason}")]
    InvalidPosition { vertex: usize, reason: String },

    #[error(
        "invalid generator output: {reason}; expected a selection, a (tag, attributes) pair, a generator spec or an element"
    )]
    InvalidGeneratorOutput { reason: String },

    #[error("sort spec must set exactly one of `by`, `key` or `cmp` (got {given})")]
    AmbiguousSortSpec { given: usize },

    #[error("edge references unknown vertex {0}")]
    UnknownVertex(usize),

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("Scale error: {0}")]
    Scale(#[from] ScaleError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl NetSvgError {
    /// Creates an [`NetSvgError::InvalidOption`] error.
    pub fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`NetSvgError::InvalidGeneratorOutput`] error.
    pub fn invalid_generator_output(reason: impl Into<String>) -> Self {
        Self::InvalidGeneratorOutput {
            reason: reason.into(),
        }
    }
}
