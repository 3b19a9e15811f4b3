//! The normalized error vocabulary.
//!
//! Guard rejections, argument validation, and dispatcher failures all land on
//! one of exactly five codes; nothing leaves the gateway as an unstructured
//! failure.

use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    haru_protocol::{ErrorEnvelope, OperationResponse, codes},
    thiserror::Error,
};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadUserInput(String),
    #[error("upstream returned status {status}")]
    Upstream { status: u16, detail: String },
    #[error("upstream request failed: {detail}")]
    UpstreamNetwork { detail: String },
}

impl GatewayError {
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    #[must_use]
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadUserInput(message.into())
    }

    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::UpstreamNetwork {
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => codes::UNAUTHENTICATED,
            Self::Forbidden(_) => codes::FORBIDDEN,
            Self::BadUserInput(_) => codes::BAD_USER_INPUT,
            Self::Upstream { .. } => codes::UPSTREAM_ERROR,
            Self::UpstreamNetwork { .. } => codes::UPSTREAM_NETWORK_ERROR,
        }
    }

    /// Gateway response status for this error. Upstream failures surface as
    /// 502 regardless of the upstream's own status, which rides in the
    /// envelope instead.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadUserInput(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::UpstreamNetwork { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            Self::Unauthenticated(message)
            | Self::Forbidden(message)
            | Self::BadUserInput(message) => ErrorEnvelope::new(self.code(), message.clone()),
            Self::Upstream { status, detail } => ErrorEnvelope::new(self.code(), self.to_string())
                .with_status(*status)
                .with_detail(detail.clone()),
            Self::UpstreamNetwork { detail } => {
                ErrorEnvelope::new(self.code(), "upstream request failed").with_detail(detail.clone())
            },
        }
    }
}

/// Fail-safe default: anything reqwest surfaces that the dispatcher has not
/// already classified is an upstream network failure, never a silent drop.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamNetwork {
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.http_status(),
            Json(OperationResponse::err(self.envelope())),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
