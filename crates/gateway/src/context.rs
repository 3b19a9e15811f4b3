//! Per-request caller context.
//!
//! Identity and tier arrive in trusted headers set by the fronting auth
//! layer. Building the context is pure and never fails: anything missing or
//! malformed simply yields an unauthenticated context.

use {
    axum::http::HeaderMap,
    haru_protocol::{USER_ID_HEADER, USER_TIER_HEADER},
};

// ── Tier ─────────────────────────────────────────────────────────────────────

/// Subscription tier. Ranked strictly: `pro` > `free` > anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    /// Parse a tier string. Unrecognized values are `None`, never coerced to
    /// a tier that could satisfy a requirement.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Free => 1,
            Self::Pro => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Request context ──────────────────────────────────────────────────────────

/// Immutable per-request identity bundle, constructed fresh for every inbound
/// call and passed explicitly down the chain. Absent fields mean
/// "unauthenticated".
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub tier: Option<Tier>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            user_id: header_value(headers, USER_ID_HEADER),
            tier: header_value(headers, USER_TIER_HEADER).and_then(|raw| Tier::parse(&raw)),
        }
    }

    /// Rank of the caller's tier; absent and unrecognized both rank 0.
    pub fn tier_rank(&self) -> u8 {
        self.tier.map_or(0, Tier::rank)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}
