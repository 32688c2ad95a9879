//! Error taxonomy for option generation.
//!
//! Every failure aborts generation for the declaration being processed. The
//! error names the offending field and a kind so diagnostics read the same
//! regardless of which pipeline stage detected the problem.

use std::fmt;

use proc_macro2::Span;
use thiserror::Error;

/// Classification of generation failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// The field annotation does not match the `name,default` grammar.
    MalformedAnnotation,
    /// The type and annotation combination cannot be represented.
    UnsupportedFieldShape,
    /// A qualified type references a namespace missing from `imports`.
    UnresolvedNamespace,
    /// Two fields resolve to the same constructor name.
    DuplicateOptionName,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MalformedAnnotation => "malformed annotation",
            Self::UnsupportedFieldShape => "unsupported field shape",
            Self::UnresolvedNamespace => "unresolved namespace",
            Self::DuplicateOptionName => "duplicate option name",
        };
        f.write_str(label)
    }
}

/// Terminal error for one declaration.
#[derive(Debug, Error)]
#[error("{kind} in field `{field}`: {detail}")]
pub(crate) struct GenerateError {
    pub kind: ErrorKind,
    pub field: String,
    pub detail: String,
    pub span: Span,
}

impl GenerateError {
    pub(crate) fn new(
        kind: ErrorKind,
        field: impl Into<String>,
        detail: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            detail: detail.into(),
            span,
        }
    }

    pub(crate) fn malformed(
        field: impl Into<String>,
        detail: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::new(ErrorKind::MalformedAnnotation, field, detail, span)
    }

    pub(crate) fn unsupported(
        field: impl Into<String>,
        detail: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::new(ErrorKind::UnsupportedFieldShape, field, detail, span)
    }
}

impl From<GenerateError> for syn::Error {
    fn from(err: GenerateError) -> Self {
        Self::new(err.span, err.to_string())
    }
}

/// Result alias used throughout the pipeline.
pub(crate) type GenerateResult<T> = Result<T, GenerateError>;
