//! haru gateway: the typed BFF surface in front of the upstream timeline,
//! label, social-feed, community, and billing services.
//!
//! The request path is a straight line: headers become a [`RequestContext`],
//! the operation registry maps name + arguments to one [`UpstreamCall`], the
//! guard admits or rejects before any network I/O, the dispatcher performs
//! the round trip, and every failure is normalized to one of five codes.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod ops;
pub mod params;
pub mod server;

pub use {
    context::{RequestContext, Tier},
    dispatch::Dispatcher,
    error::GatewayError,
    guard::Requirement,
    ops::{OperationRegistry, UpstreamCall},
    server::{GatewayState, build_gateway_app, start_gateway},
};
