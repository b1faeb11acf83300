//! Structured result envelope exposed to the CLI/formatter layer.
//!
//! # Responsibility
//! - Wrap every operation result in a versioned `{ ok, data, error }` shape.
//! - Map error codes to stable process exit codes.
//!
//! # Invariants
//! - Exactly one of `data` / `error` is present.
//! - Exit codes are part of the public contract and never reassigned.

use crate::render::RenderItemError;
use crate::resolve::ResolveError;
use crate::sync::SyncError;
use serde::Serialize;

/// Version stamp for the envelope JSON shape.
pub const ENVELOPE_SCHEMA_VERSION: u32 = 1;

/// Stable error classification carried by failure envelopes.
///
/// `LocalUnavailable` shares the not-found exit code: both tell an automated
/// caller "the identifier cannot be produced from here", while the code
/// string stays distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    Usage,
    NotFound,
    LocalUnavailable,
    Transport,
    Render,
    Filesystem,
    Browser,
    Ambiguous,
    /// A fault inside the tool itself, not in the request or environment.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::NotFound => "not-found",
            Self::LocalUnavailable => "local-unavailable",
            Self::Transport => "transport",
            Self::Render => "render",
            Self::Filesystem => "filesystem",
            Self::Browser => "browser",
            Self::Ambiguous => "ambiguous",
            Self::Internal => "internal",
        }
    }

    /// Process exit code for this classification.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Usage => 2,
            Self::NotFound | Self::LocalUnavailable => 3,
            Self::Transport => 4,
            Self::Render => 5,
            Self::Filesystem => 6,
            Self::Browser => 7,
            Self::Ambiguous => 8,
            // Generic failure code, outside the per-class range.
            Self::Internal => 1,
        }
    }
}

/// Structured error payload.
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Versioned operation result for machine consumption.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            schema_version: ENVELOPE_SCHEMA_VERSION,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            schema_version: ENVELOPE_SCHEMA_VERSION,
            ok: false,
            data: None,
            error: Some(EnvelopeError {
                code,
                message: message.into(),
                details: None,
            }),
        }
    }

    pub fn failure_with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            schema_version: ENVELOPE_SCHEMA_VERSION,
            ok: false,
            data: None,
            error: Some(EnvelopeError {
                code,
                message: message.into(),
                details: Some(details),
            }),
        }
    }

    /// Exit code for the whole operation: `0` on success.
    pub fn exit_code(&self) -> i32 {
        match &self.error {
            None => 0,
            Some(err) => err.code.exit_code(),
        }
    }
}

/// Classifies a resolution failure.
pub fn resolve_error_code(err: &ResolveError) -> ErrorCode {
    match err {
        ResolveError::Usage(_) => ErrorCode::Usage,
        ResolveError::LocalUnavailable => ErrorCode::LocalUnavailable,
        ResolveError::Transport(_) => ErrorCode::Transport,
        ResolveError::Store(_) => ErrorCode::Filesystem,
    }
}

/// Classifies a per-item render failure.
pub fn render_error_code(err: &RenderItemError) -> ErrorCode {
    match err {
        RenderItemError::NotFound { .. } => ErrorCode::NotFound,
        RenderItemError::Ambiguous { .. } => ErrorCode::Ambiguous,
        RenderItemError::Resolve(inner) => resolve_error_code(inner),
        RenderItemError::Transport(_) => ErrorCode::Transport,
        RenderItemError::Render(_) => ErrorCode::Render,
        RenderItemError::Filesystem { .. } => ErrorCode::Filesystem,
    }
}

/// Classifies a synchronization failure.
pub fn sync_error_code(err: &SyncError) -> ErrorCode {
    match err {
        SyncError::Transport(_) | SyncError::CollectionsFailed { .. } => ErrorCode::Transport,
        SyncError::Store(_) => ErrorCode::Filesystem,
    }
}

#[cfg(test)]
mod tests {
    use super::{Envelope, ErrorCode};

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(ErrorCode::Usage.exit_code(), 2);
        assert_eq!(ErrorCode::NotFound.exit_code(), 3);
        assert_eq!(ErrorCode::LocalUnavailable.exit_code(), 3);
        assert_eq!(ErrorCode::Transport.exit_code(), 4);
        assert_eq!(ErrorCode::Render.exit_code(), 5);
        assert_eq!(ErrorCode::Filesystem.exit_code(), 6);
        assert_eq!(ErrorCode::Browser.exit_code(), 7);
        assert_eq!(ErrorCode::Ambiguous.exit_code(), 8);
        assert_eq!(ErrorCode::Internal.exit_code(), 1);
    }

    #[test]
    fn internal_faults_are_not_classified_as_render_failures() {
        let envelope =
            Envelope::<serde_json::Value>::failure(ErrorCode::Internal, "payload did not encode");
        assert_ne!(envelope.exit_code(), ErrorCode::Render.exit_code());

        let json = serde_json::to_value(&envelope).expect("envelope should serialize");
        assert_eq!(json["error"]["code"], "internal");
    }

    #[test]
    fn success_envelope_serializes_without_error_field() {
        let envelope = Envelope::success(serde_json::json!({"id": "mdi:home"}));
        assert_eq!(envelope.exit_code(), 0);

        let json = serde_json::to_value(&envelope).expect("envelope should serialize");
        assert_eq!(json["ok"], true);
        assert_eq!(json["schema_version"], 1);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_envelope_carries_code_and_message() {
        let envelope = Envelope::<serde_json::Value>::failure(ErrorCode::NotFound, "no such icon");
        assert_eq!(envelope.exit_code(), 3);

        let json = serde_json::to_value(&envelope).expect("envelope should serialize");
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "not-found");
        assert!(json.get("data").is_none());
    }
}
