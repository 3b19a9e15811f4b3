//! Schema and operation registry.
//!
//! Every query and mutation the gateway exposes is declared here as a static
//! entry: its authorization requirement, its declared return shape, and a
//! pure mapping from `(arguments, context)` to the single upstream call it
//! performs. The table is built once at startup and looked up by name per
//! request; there is no runtime reflection.

use std::collections::HashMap;

use {haru_config::Service, http::Method, serde_json::Value};

use crate::{
    context::{RequestContext, Tier},
    error::GatewayError,
    guard::{self, Requirement},
    params,
};

// ── Upstream call ────────────────────────────────────────────────────────────

/// A fully resolved description of one upstream HTTP request. Constructed per
/// invocation, discarded after use.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub service: Service,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamCall {
    fn get(service: Service, path: String) -> Self {
        Self {
            service,
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    fn post(service: Service, path: String, body: Value) -> Self {
        Self {
            service,
            method: Method::POST,
            path,
            query: Vec::new(),
            body: Some(body),
        }
    }
}

// ── Declared return shapes ───────────────────────────────────────────────────

/// The declared return shape of an operation, validated against the
/// pass-through record types before the upstream JSON is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    TimelineEntries,
    Labels,
    Label,
    FeedItems,
    FeedItem,
    Communities,
    Community,
    Membership,
    /// Single record that may legitimately not exist yet; an empty upstream
    /// body becomes an explicit `null`.
    OptionalEntitlement,
}

impl ResponseShape {
    /// Turn a dispatched body into the operation result, enforcing the
    /// declared shape. Content passes through unmodified.
    pub fn finalize(self, body: Option<Value>) -> Result<Value, GatewayError> {
        match body {
            Some(value) => {
                self.validate(&value)?;
                Ok(value)
            },
            None if matches!(self, Self::OptionalEntitlement) => Ok(Value::Null),
            None => Err(GatewayError::network(
                "upstream returned an empty body for a required result",
            )),
        }
    }

    fn validate(self, value: &Value) -> Result<(), GatewayError> {
        use haru_protocol::records::*;
        match self {
            Self::TimelineEntries => validate_as::<Vec<TimelineEntry>>(value),
            Self::Labels => validate_as::<Vec<Label>>(value),
            Self::Label => validate_as::<Label>(value),
            Self::FeedItems => validate_as::<Vec<FeedItem>>(value),
            Self::FeedItem => validate_as::<FeedItem>(value),
            Self::Communities => validate_as::<Vec<Community>>(value),
            Self::Community => validate_as::<Community>(value),
            Self::Membership => validate_as::<Membership>(value),
            Self::OptionalEntitlement => {
                if value.is_null() {
                    Ok(())
                } else {
                    validate_as::<Entitlement>(value)
                }
            },
        }
    }
}

fn validate_as<T: serde::de::DeserializeOwned>(value: &Value) -> Result<(), GatewayError> {
    serde_json::from_value::<T>(value.clone())
        .map(|_| ())
        .map_err(|err| GatewayError::network(format!("upstream response shape mismatch: {err}")))
}

// ── Operation table ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

pub type MapFn = fn(&Value, &RequestContext) -> Result<UpstreamCall, GatewayError>;

pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OperationKind,
    pub auth: Requirement,
    pub shape: ResponseShape,
    pub map: MapFn,
}

/// Immutable operation table, built once at startup.
pub struct OperationRegistry {
    ops: HashMap<&'static str, OperationSpec>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        let specs = [
            OperationSpec {
                name: "timeline",
                kind: OperationKind::Query,
                auth: Requirement::Authenticated,
                shape: ResponseShape::TimelineEntries,
                map: map_timeline,
            },
            OperationSpec {
                name: "labels",
                kind: OperationKind::Query,
                auth: Requirement::Authenticated,
                shape: ResponseShape::Labels,
                map: map_labels,
            },
            OperationSpec {
                name: "feed",
                kind: OperationKind::Query,
                auth: Requirement::Authenticated,
                shape: ResponseShape::FeedItems,
                map: map_feed,
            },
            OperationSpec {
                name: "communities",
                kind: OperationKind::Query,
                auth: Requirement::None,
                shape: ResponseShape::Communities,
                map: map_communities,
            },
            OperationSpec {
                name: "viewer_entitlement",
                kind: OperationKind::Query,
                auth: Requirement::Authenticated,
                shape: ResponseShape::OptionalEntitlement,
                map: map_viewer_entitlement,
            },
            OperationSpec {
                name: "create_feed_post",
                kind: OperationKind::Mutation,
                auth: Requirement::Authenticated,
                shape: ResponseShape::FeedItem,
                map: map_create_feed_post,
            },
            OperationSpec {
                name: "upsert_label",
                kind: OperationKind::Mutation,
                auth: Requirement::Authenticated,
                shape: ResponseShape::Label,
                map: map_upsert_label,
            },
            OperationSpec {
                name: "create_community",
                kind: OperationKind::Mutation,
                auth: Requirement::Tier(Tier::Pro),
                shape: ResponseShape::Community,
                map: map_create_community,
            },
            OperationSpec {
                name: "join_community",
                kind: OperationKind::Mutation,
                auth: Requirement::Authenticated,
                shape: ResponseShape::Membership,
                map: map_join_community,
            },
        ];

        let mut ops = HashMap::with_capacity(specs.len());
        for spec in specs {
            ops.insert(spec.name, spec);
        }
        Self { ops }
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.ops.get(name)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sorted operation names, for the startup banner.
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.ops.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ── Argument mappings ────────────────────────────────────────────────────────

fn path_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Append `limit` as a query parameter only when the caller provided it.
fn push_limit(query: &mut Vec<(String, String)>, params: &Value) -> Result<(), GatewayError> {
    if let Some(limit) = params::opt_u64_param(params, "limit")? {
        query.push(("limit".to_string(), limit.to_string()));
    }
    Ok(())
}

/// Mutation ownership rule: an absent or empty `user_id` defaults to the
/// caller; a mismatched one is rejected. No current mutation declares a
/// cross-user override.
fn resolve_input_user(input: &Value, ctx: &RequestContext) -> Result<String, GatewayError> {
    let caller = ctx
        .user_id
        .as_deref()
        .ok_or_else(|| GatewayError::unauthenticated("this operation requires a signed-in caller"))?;
    match params::str_param(input, "user_id") {
        None => Ok(caller.to_string()),
        Some(user_id) if user_id == caller => Ok(user_id.to_string()),
        Some(_) => Err(GatewayError::forbidden(
            "user_id must match the signed-in caller",
        )),
    }
}

fn map_timeline(args: &Value, _ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let user_id = params::require_str(args, "user_id")?;
    let mut call = UpstreamCall::get(
        Service::Timeline,
        format!("/v1/timeline/{}", path_segment(user_id)),
    );
    push_limit(&mut call.query, args)?;
    Ok(call)
}

fn map_labels(args: &Value, _ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let user_id = params::require_str(args, "user_id")?;
    Ok(UpstreamCall::get(
        Service::Label,
        format!("/v1/labels/{}", path_segment(user_id)),
    ))
}

fn map_feed(args: &Value, ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let user_id = params::require_str(args, "user_id")?;
    // Reading someone else's feed is a pro feature; your own is not.
    guard::check_owner_or_tier(ctx, user_id, Tier::Pro)?;
    let mut call = UpstreamCall::get(
        Service::SocialFeed,
        format!("/v1/feed/{}", path_segment(user_id)),
    );
    push_limit(&mut call.query, args)?;
    Ok(call)
}

fn map_communities(args: &Value, _ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let mut call = UpstreamCall::get(Service::Community, "/v1/communities".to_string());
    if let Some(include_pro) = params::opt_bool_param(args, "include_pro")? {
        call.query
            .push(("include_pro".to_string(), include_pro.to_string()));
    }
    Ok(call)
}

fn map_viewer_entitlement(_args: &Value, ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let user_id = ctx
        .user_id
        .as_deref()
        .ok_or_else(|| GatewayError::unauthenticated("this operation requires a signed-in caller"))?;
    Ok(UpstreamCall::get(
        Service::Billing,
        format!("/v1/entitlements/{}", path_segment(user_id)),
    ))
}

fn map_create_feed_post(args: &Value, ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let input = params::require_object(args, "input")?;
    let user_id = resolve_input_user(input, ctx)?;
    let timeline_id = params::require_str(input, "timeline_id")?;
    let category = params::require_str(input, "category")?;
    let message = params::require_str(input, "message")?;
    Ok(UpstreamCall::post(
        Service::SocialFeed,
        "/v1/feed".to_string(),
        serde_json::json!({
            "user_id": user_id,
            "timeline_id": timeline_id,
            "category": category,
            "message": message,
        }),
    ))
}

fn map_upsert_label(args: &Value, ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let input = params::require_object(args, "input")?;
    let user_id = resolve_input_user(input, ctx)?;
    let label_key = params::require_str(input, "label_key")?;
    let label_value = params::require_str(input, "label_value")?;

    let mut body = serde_json::json!({
        "user_id": user_id,
        "label_key": label_key,
        "label_value": label_value,
    });
    if let Some(is_verified) = params::opt_bool_param(input, "is_verified")? {
        body["is_verified"] = Value::Bool(is_verified);
    }
    if let Some(verified_at) = params::str_param(input, "verified_at") {
        body["verified_at"] = Value::String(verified_at.to_string());
    }
    Ok(UpstreamCall::post(
        Service::Label,
        "/v1/labels".to_string(),
        body,
    ))
}

fn map_create_community(args: &Value, _ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let input = params::require_object(args, "input")?;
    let title = params::require_str(input, "title")?;

    let mut body = serde_json::json!({ "title": title });
    if let Some(description) = params::str_param(input, "description") {
        body["description"] = Value::String(description.to_string());
    }
    if let Some(access_level) = params::str_param(input, "access_level") {
        body["access_level"] = Value::String(access_level.to_string());
    }
    if let Some(is_pro_only) = params::opt_bool_param(input, "is_pro_only")? {
        body["is_pro_only"] = Value::Bool(is_pro_only);
    }
    Ok(UpstreamCall::post(
        Service::Community,
        "/v1/communities".to_string(),
        body,
    ))
}

fn map_join_community(args: &Value, ctx: &RequestContext) -> Result<UpstreamCall, GatewayError> {
    let input = params::require_object(args, "input")?;
    // community_id is required before anything else touches the network.
    let community_id = params::str_param(input, "community_id")
        .ok_or_else(|| GatewayError::bad_input("community_id is required"))?;
    let user_id = resolve_input_user(input, ctx)?;

    // The id travels in the path, so it is stripped from the body.
    let mut body = serde_json::json!({ "user_id": user_id });
    if let Some(role) = params::str_param(input, "role") {
        body["role"] = Value::String(role.to_string());
    }
    Ok(UpstreamCall::post(
        Service::Community,
        format!("/v1/communities/{}/join", path_segment(community_id)),
        body,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use {super::*, haru_protocol::codes, serde_json::json};

    fn ctx(user_id: &str, tier: Option<Tier>) -> RequestContext {
        RequestContext {
            user_id: Some(user_id.to_string()),
            tier,
        }
    }

    #[test]
    fn registry_knows_every_declared_operation() {
        let registry = OperationRegistry::new();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.operation_names(), vec![
            "communities",
            "create_community",
            "create_feed_post",
            "feed",
            "join_community",
            "labels",
            "timeline",
            "upsert_label",
            "viewer_entitlement",
        ]);
        assert!(registry.get("subscribe").is_none());
    }

    #[test]
    fn create_community_is_pro_gated_in_the_table() {
        let registry = OperationRegistry::new();
        let spec = registry.get("create_community").unwrap();
        assert_eq!(spec.auth, Requirement::Tier(Tier::Pro));
        assert_eq!(spec.kind, OperationKind::Mutation);
    }

    #[test]
    fn timeline_appends_limit_only_when_provided() {
        let call = map_timeline(&json!({"user_id": "u1", "limit": 25}), &ctx("u1", None)).unwrap();
        assert_eq!(call.path, "/v1/timeline/u1");
        assert_eq!(call.query, vec![("limit".to_string(), "25".to_string())]);

        let call = map_timeline(&json!({"user_id": "u1"}), &ctx("u1", None)).unwrap();
        assert!(call.query.is_empty());
        assert!(call.body.is_none());
        assert_eq!(call.method, Method::GET);
    }

    #[test]
    fn timeline_requires_user_id() {
        let err = map_timeline(&json!({}), &ctx("u1", None)).unwrap_err();
        assert_eq!(err.code(), codes::BAD_USER_INPUT);
    }

    #[test]
    fn feed_rejects_cross_user_reads_below_pro() {
        let err = map_feed(&json!({"user_id": "u2"}), &ctx("u1", Some(Tier::Free))).unwrap_err();
        assert_eq!(err.code(), codes::FORBIDDEN);

        let call = map_feed(&json!({"user_id": "u2"}), &ctx("u1", Some(Tier::Pro))).unwrap();
        assert_eq!(call.path, "/v1/feed/u2");
    }

    #[test]
    fn feed_allows_own_feed_on_any_tier() {
        let call = map_feed(&json!({"user_id": "u1"}), &ctx("u1", None)).unwrap();
        assert_eq!(call.service, Service::SocialFeed);
        assert_eq!(call.path, "/v1/feed/u1");
    }

    #[test]
    fn communities_forwards_include_pro_only_when_provided() {
        let call = map_communities(&json!({}), &RequestContext::default()).unwrap();
        assert!(call.query.is_empty());

        let call =
            map_communities(&json!({"include_pro": true}), &RequestContext::default()).unwrap();
        assert_eq!(call.query, vec![(
            "include_pro".to_string(),
            "true".to_string()
        )]);
    }

    #[test]
    fn viewer_entitlement_targets_the_caller() {
        let call = map_viewer_entitlement(&json!({}), &ctx("u9", None)).unwrap();
        assert_eq!(call.service, Service::Billing);
        assert_eq!(call.path, "/v1/entitlements/u9");
    }

    #[test]
    fn create_feed_post_defaults_user_id_to_caller() {
        let call = map_create_feed_post(
            &json!({"input": {
                "timeline_id": "t1",
                "category": "reflection",
                "message": "hi",
            }}),
            &ctx("u1", Some(Tier::Free)),
        )
        .unwrap();
        let body = call.body.unwrap();
        assert_eq!(body["user_id"], "u1");
        assert_eq!(call.method, Method::POST);
    }

    #[test]
    fn create_feed_post_rejects_foreign_user_id() {
        let err = map_create_feed_post(
            &json!({"input": {
                "user_id": "u2",
                "timeline_id": "t1",
                "category": "reflection",
                "message": "hi",
            }}),
            &ctx("u1", Some(Tier::Pro)),
        )
        .unwrap_err();
        assert_eq!(err.code(), codes::FORBIDDEN);
    }

    #[test]
    fn create_feed_post_accepts_matching_user_id() {
        let call = map_create_feed_post(
            &json!({"input": {
                "user_id": "u1",
                "timeline_id": "t1",
                "category": "reflection",
                "message": "hi",
            }}),
            &ctx("u1", None),
        )
        .unwrap();
        assert_eq!(call.body.unwrap()["user_id"], "u1");
    }

    #[test]
    fn join_community_requires_community_id_before_ownership() {
        let err = map_join_community(
            &json!({"input": {"community_id": ""}}),
            &ctx("u1", None),
        )
        .unwrap_err();
        assert_eq!(err.code(), codes::BAD_USER_INPUT);

        let err = map_join_community(&json!({"input": {}}), &ctx("u1", None)).unwrap_err();
        assert_eq!(err.code(), codes::BAD_USER_INPUT);
    }

    #[test]
    fn join_community_strips_the_id_from_the_body() {
        let call = map_join_community(
            &json!({"input": {"community_id": "c1", "role": "member"}}),
            &ctx("u1", None),
        )
        .unwrap();
        assert_eq!(call.path, "/v1/communities/c1/join");
        let body = call.body.unwrap();
        assert!(body.get("community_id").is_none());
        assert_eq!(body["user_id"], "u1");
        assert_eq!(body["role"], "member");
    }

    #[test]
    fn upsert_label_forwards_optional_verification_fields() {
        let call = map_upsert_label(
            &json!({"input": {
                "label_key": "sleep_goal",
                "label_value": "8h",
                "is_verified": true,
                "verified_at": "2024-02-01T00:00:00Z",
            }}),
            &ctx("u1", None),
        )
        .unwrap();
        let body = call.body.unwrap();
        assert_eq!(body["is_verified"], true);
        assert_eq!(body["verified_at"], "2024-02-01T00:00:00Z");

        let call = map_upsert_label(
            &json!({"input": {"label_key": "k", "label_value": "v"}}),
            &ctx("u1", None),
        )
        .unwrap();
        let body = call.body.unwrap();
        assert!(body.get("is_verified").is_none());
        assert!(body.get("verified_at").is_none());
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let call = map_timeline(&json!({"user_id": "u 1/../x"}), &ctx("u 1/../x", None)).unwrap();
        assert_eq!(call.path, "/v1/timeline/u%201%2F..%2Fx");
    }

    #[test]
    fn optional_entitlement_shape_accepts_empty_body() {
        assert_eq!(
            ResponseShape::OptionalEntitlement.finalize(None).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn required_shape_rejects_empty_body() {
        let err = ResponseShape::FeedItems.finalize(None).unwrap_err();
        assert_eq!(err.code(), codes::UPSTREAM_NETWORK_ERROR);
    }

    #[test]
    fn shape_validation_passes_content_through_unmodified() {
        let item = json!({
            "post_id": "p1",
            "user_id": "u1",
            "timeline_id": "t1",
            "category": "reflection",
            "message": "hi",
            "created_at": "2024-01-01T00:00:00Z",
        });
        let out = ResponseShape::FeedItem.finalize(Some(item.clone())).unwrap();
        assert_eq!(out, item);
    }

    #[test]
    fn shape_mismatch_is_an_upstream_network_error() {
        let err = ResponseShape::FeedItem
            .finalize(Some(json!({"post_id": "p1"})))
            .unwrap_err();
        assert_eq!(err.code(), codes::UPSTREAM_NETWORK_ERROR);
    }
}
