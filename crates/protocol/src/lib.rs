//! Gateway wire contract.
//!
//! One typed operation endpoint carries every query and mutation. This crate
//! defines the request/response frames for that endpoint, the normalized
//! error vocabulary, the trusted identity headers, and the pass-through
//! record shapes the upstream services return.

use serde::{Deserialize, Serialize};

pub mod records;

// ── Identity headers ─────────────────────────────────────────────────────────

/// Caller user id, set by the fronting auth layer. The gateway trusts it and
/// never mints identity itself.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Caller subscription tier (`free` or `pro`).
pub const USER_TIER_HEADER: &str = "x-user-tier";

// ── Error codes ──────────────────────────────────────────────────────────────

pub mod codes {
    /// No identity present where one is required.
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    /// Identity present but insufficient tier or ownership mismatch.
    pub const FORBIDDEN: &str = "FORBIDDEN";
    /// Malformed or missing argument, rejected before any upstream call.
    pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
    /// Upstream reachable but returned a non-success status.
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    /// Upstream unreachable, or its response was unparseable.
    pub const UPSTREAM_NETWORK_ERROR: &str = "UPSTREAM_NETWORK_ERROR";
}

// ── Error envelope ───────────────────────────────────────────────────────────

/// Uniform failure shape: every error leaving the gateway is exactly one of
/// the five [`codes`], never an unstructured message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    /// Upstream HTTP status; present only for `UPSTREAM_ERROR`.
    #[serde(rename = "httpStatus", skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            http_status: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// Client → gateway operation call: a typed operation name plus named
/// arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Gateway → client operation result.
///
/// On success `data` is always present; `null` is an explicit "no value"
/// (an entitlement that does not exist yet), distinct from a missing field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

impl OperationResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ErrorEnvelope) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

// ── Liveness ─────────────────────────────────────────────────────────────────

/// Fixed payload of the `/healthz` liveness endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPayload {
    pub status: String,
    pub service: String,
    pub time: String,
}
