//! The top-level error type unifying every subsystem's own `thiserror` enum.
//!
//! Individual subsystems (`span`, `types`, `emit`) keep their own narrow error
//! enums rather than reporting through this one directly — `CompileError`
//! only exists at the driver boundary, where a `Result` from any pass needs a
//! single type to flow into `main`'s `?`.

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Emit(#[from] crate::emit::EmitError),

    #[error(transparent)]
    Span(#[from] crate::span::SpanError),

    #[error(transparent)]
    Type(#[from] crate::types::TypeContextError),

    #[error("unresolved type name `{0}`")]
    UnresolvedTypeName(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
