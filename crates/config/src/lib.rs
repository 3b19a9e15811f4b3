//! Gateway configuration: listen port plus one base URL per upstream
//! service, read once from the environment at startup and immutable for the
//! process lifetime.
//!
//! Every endpoint has a documented default so a local compose stack works
//! with no environment at all. An env var that is set but empty falls back
//! to its default.

use thiserror::Error;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Fatal, startup-time only. The gateway refuses to boot on a bad endpoint
/// rather than failing on the first dispatched operation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL for {service} service: {url:?}: {source}")]
    InvalidEndpoint {
        service: Service,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {scheme:?} for {service} service (expected http or https)")]
    UnsupportedScheme { service: Service, scheme: String },
    #[error("invalid {var}: {value:?} is not a port number")]
    InvalidPort { var: &'static str, value: String },
}

// ── Services ─────────────────────────────────────────────────────────────────

/// The upstream services the gateway routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Timeline,
    Label,
    SocialFeed,
    Ingestion,
    Community,
    Billing,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::Timeline,
        Service::Label,
        Service::SocialFeed,
        Service::Ingestion,
        Service::Community,
        Service::Billing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::Timeline => "timeline",
            Service::Label => "label",
            Service::SocialFeed => "social-feed",
            Service::Ingestion => "ingestion",
            Service::Community => "community",
            Service::Billing => "billing",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            Service::Timeline => "TIMELINE_SERVICE_URL",
            Service::Label => "LABEL_SERVICE_URL",
            Service::SocialFeed => "SOCIAL_FEED_SERVICE_URL",
            Service::Ingestion => "INGESTION_SERVICE_URL",
            Service::Community => "COMMUNITY_SERVICE_URL",
            Service::Billing => "BILLING_SERVICE_URL",
        }
    }

    fn default_url(self) -> &'static str {
        match self {
            Service::Timeline => "http://localhost:7002",
            Service::Label => "http://localhost:7003",
            Service::SocialFeed => "http://localhost:7004",
            Service::Ingestion => "http://localhost:7001",
            Service::Community => "http://localhost:7005",
            Service::Billing => "http://localhost:7006",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Endpoint registry ────────────────────────────────────────────────────────

/// Base URL per upstream service. Built once at startup, then read
/// concurrently without locking.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    urls: [String; 6],
}

impl ServiceEndpoints {
    /// Build from explicit URL strings, validating each one.
    ///
    /// Trailing slashes are stripped so path joining stays uniform.
    pub fn new(urls: [(Service, String); 6]) -> Result<Self, ConfigError> {
        let mut resolved: [String; 6] = Default::default();
        for (service, raw) in urls {
            let parsed =
                url::Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint {
                    service,
                    url: raw.clone(),
                    source,
                })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::UnsupportedScheme {
                    service,
                    scheme: parsed.scheme().to_string(),
                });
            }
            resolved[Self::slot(service)] = raw.trim_end_matches('/').to_string();
        }
        Ok(Self { urls: resolved })
    }

    /// Read endpoints from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(Service::ALL.map(|service| {
            let url = env_or(service.env_var(), service.default_url());
            (service, url)
        }))
    }

    /// Resolve the base URL for a service. Infallible once constructed.
    pub fn resolve(&self, service: Service) -> &str {
        &self.urls[Self::slot(service)]
    }

    fn slot(service: Service) -> usize {
        match service {
            Service::Timeline => 0,
            Service::Label => 1,
            Service::SocialFeed => 2,
            Service::Ingestion => 3,
            Service::Community => 4,
            Service::Billing => 5,
        }
    }
}

// ── Gateway config ───────────────────────────────────────────────────────────

pub const PORT_VAR: &str = "GATEWAY_PORT";
pub const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub endpoints: ServiceEndpoints,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_port = env_or(PORT_VAR, "");
        let port = if raw_port.is_empty() {
            DEFAULT_PORT
        } else {
            raw_port.parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: raw_port,
            })?
        };

        let endpoints = ServiceEndpoints::from_env()?;
        for service in Service::ALL {
            tracing::debug!(service = %service, url = endpoints.resolve(service), "resolved endpoint");
        }

        Ok(Self { port, endpoints })
    }
}

fn env_or(var: &str, fallback: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback.to_string(),
    }
}
