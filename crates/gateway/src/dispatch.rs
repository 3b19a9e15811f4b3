//! Upstream dispatcher: one resolved [`UpstreamCall`] in, one fresh HTTP
//! round trip out. No caching, no retries; transport and status failures map
//! to the normalized codes and nothing else.

use std::sync::Arc;

use {haru_config::ServiceEndpoints, serde_json::Value, tracing::warn};

use crate::{error::GatewayError, ops::UpstreamCall};

#[derive(Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    endpoints: Arc<ServiceEndpoints>,
}

impl Dispatcher {
    pub fn new(http: reqwest::Client, endpoints: Arc<ServiceEndpoints>) -> Self {
        Self { http, endpoints }
    }

    /// Perform the call and decode its body.
    ///
    /// The body is always read fully as text before interpretation so empty
    /// bodies and error bodies are handled uniformly. `Ok(None)` is a
    /// successful empty body.
    pub async fn dispatch(&self, call: &UpstreamCall) -> Result<Option<Value>, GatewayError> {
        let url = self.url_for(call)?;

        let mut request = self.http.request(call.method.clone(), url.clone());
        if let Some(body) = &call.body {
            // reqwest sets Content-Type: application/json with the body.
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            warn!(service = %call.service, url = %url, "upstream transport failure: {err}");
            GatewayError::network(err.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| GatewayError::network(err.to_string()))?;

        if !status.is_success() {
            warn!(service = %call.service, status = status.as_u16(), "upstream error status");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                detail: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_str(&text).map_err(|err| {
            GatewayError::network(format!("invalid JSON from {} upstream: {err}", call.service))
        })?;
        Ok(Some(value))
    }

    /// Base URL from the endpoint registry, plus path and encoded query
    /// pairs. A query-less call produces a URL with no `?` at all.
    fn url_for(&self, call: &UpstreamCall) -> Result<url::Url, GatewayError> {
        let base = self.endpoints.resolve(call.service);
        let mut url = url::Url::parse(&format!("{base}{}", call.path))
            .map_err(|err| GatewayError::network(format!("invalid upstream URL: {err}")))?;
        if !call.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&call.query);
        }
        Ok(url)
    }
}
