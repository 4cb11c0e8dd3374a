//! Classification of runtime dispatch failures.
//!
//! When an extrinsic is included but its call is rejected by the runtime, the
//! chain reports a dispatch error. The codec layer decodes it into
//! [`DispatchError`]; the engine only classifies and reports it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An arithmetic failure reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArithmeticError {
    /// Result fell below the numeric lower bound
    Underflow,
    /// Result exceeded the numeric upper bound
    Overflow,
    /// Division by zero
    DivisionByZero,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithmeticError::Underflow => "underflow",
            ArithmeticError::Overflow => "overflow",
            ArithmeticError::DivisionByZero => "division by zero",
        };
        f.write_str(s)
    }
}

/// The reason a dispatched call was rejected on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DispatchError {
    /// A pallet-specific error.
    Module {
        /// The pallet that raised the error, e.g. `asset`.
        section: String,
        /// The error name, e.g. `AlreadyFrozen`.
        name: String,
        /// Documentation lines attached to the error in the metadata.
        #[serde(default)]
        docs: Vec<String>,
    },
    /// The call was dispatched from a disallowed origin.
    BadOrigin,
    /// An account or index lookup failed.
    CannotLookup,
    /// An arithmetic error.
    Arithmetic {
        /// Which arithmetic failure occurred.
        error: ArithmeticError,
    },
    /// Any other failure.
    Other {
        /// The message reported by the chain.
        message: String,
    },
}

/// The discriminant of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchErrorKind {
    /// See [`DispatchError::Module`]
    Module,
    /// See [`DispatchError::BadOrigin`]
    BadOrigin,
    /// See [`DispatchError::CannotLookup`]
    CannotLookup,
    /// See [`DispatchError::Arithmetic`]
    Arithmetic,
    /// See [`DispatchError::Other`]
    Other,
}

impl DispatchError {
    /// Creates a module error.
    pub fn module(
        section: impl Into<String>,
        name: impl Into<String>,
        docs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Module {
            section: section.into(),
            name: name.into(),
            docs: docs.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the error's kind.
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            Self::Module { .. } => DispatchErrorKind::Module,
            Self::BadOrigin => DispatchErrorKind::BadOrigin,
            Self::CannotLookup => DispatchErrorKind::CannotLookup,
            Self::Arithmetic { .. } => DispatchErrorKind::Arithmetic,
            Self::Other { .. } => DispatchErrorKind::Other,
        }
    }

    /// Returns true if this is the module error `section.name`.
    pub fn is_module_error(&self, section: &str, name: &str) -> bool {
        matches!(self, Self::Module { section: s, name: n, .. } if s == section && n == name)
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module {
                section,
                name,
                docs,
            } => {
                write!(f, "{section}.{name}")?;
                if !docs.is_empty() {
                    write!(f, ": {}", docs.join(" "))?;
                }
                Ok(())
            }
            Self::BadOrigin => f.write_str("bad origin"),
            Self::CannotLookup => f.write_str("cannot lookup"),
            Self::Arithmetic { error } => write!(f, "arithmetic error: {error}"),
            Self::Other { message } => f.write_str(message),
        }
    }
}
