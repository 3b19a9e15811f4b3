//! Authorization guard: admits or rejects a call from its declared
//! requirement and the caller's context. State-free; every rejection is one
//! of the normalized codes and happens before any upstream dispatch.

use crate::{
    context::{RequestContext, Tier},
    error::GatewayError,
};

/// Authorization requirement declared by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, including anonymous callers.
    None,
    /// A caller identity must be present.
    Authenticated,
    /// A caller tier ranking at or above the given tier.
    Tier(Tier),
}

pub fn check(ctx: &RequestContext, requirement: Requirement) -> Result<(), GatewayError> {
    match requirement {
        Requirement::None => Ok(()),
        Requirement::Authenticated => {
            if ctx.user_id.is_some() {
                Ok(())
            } else {
                Err(GatewayError::unauthenticated(
                    "this operation requires a signed-in caller",
                ))
            }
        },
        Requirement::Tier(required) => {
            if ctx.tier_rank() >= required.rank() {
                Ok(())
            } else {
                Err(GatewayError::forbidden(format!(
                    "{required} tier required"
                )))
            }
        },
    }
}

/// Ownership rule for reads that target a user's resources: the caller may
/// always read their own, and needs `override_tier` to read anyone else's.
/// Evaluated after the operation's static requirement, before dispatch.
pub fn check_owner_or_tier(
    ctx: &RequestContext,
    target_user: &str,
    override_tier: Tier,
) -> Result<(), GatewayError> {
    if ctx.user_id.as_deref() == Some(target_user) {
        return Ok(());
    }
    if ctx.tier_rank() >= override_tier.rank() {
        return Ok(());
    }
    Err(GatewayError::forbidden(format!(
        "{override_tier} tier required to access another user's data"
    )))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use {super::*, haru_protocol::codes};

    fn ctx(user_id: Option<&str>, tier: Option<Tier>) -> RequestContext {
        RequestContext {
            user_id: user_id.map(String::from),
            tier,
        }
    }

    #[test]
    fn none_admits_anonymous() {
        assert!(check(&ctx(None, None), Requirement::None).is_ok());
    }

    #[test]
    fn authenticated_rejects_anonymous() {
        let err = check(&ctx(None, None), Requirement::Authenticated).unwrap_err();
        assert_eq!(err.code(), codes::UNAUTHENTICATED);
    }

    #[test]
    fn authenticated_admits_any_tier() {
        assert!(check(&ctx(Some("u1"), None), Requirement::Authenticated).is_ok());
        assert!(check(&ctx(Some("u1"), Some(Tier::Free)), Requirement::Authenticated).is_ok());
    }

    #[test]
    fn tier_requirement_is_monotone() {
        // pro satisfies everything free satisfies
        for required in [Tier::Free, Tier::Pro] {
            assert!(check(&ctx(Some("u1"), Some(Tier::Pro)), Requirement::Tier(required)).is_ok());
        }
        assert!(check(&ctx(Some("u1"), Some(Tier::Free)), Requirement::Tier(Tier::Free)).is_ok());
        let err =
            check(&ctx(Some("u1"), Some(Tier::Free)), Requirement::Tier(Tier::Pro)).unwrap_err();
        assert_eq!(err.code(), codes::FORBIDDEN);
    }

    #[test]
    fn absent_tier_satisfies_nothing() {
        for required in [Tier::Free, Tier::Pro] {
            let err = check(&ctx(Some("u1"), None), Requirement::Tier(required)).unwrap_err();
            assert_eq!(err.code(), codes::FORBIDDEN);
        }
    }

    #[test]
    fn owner_reads_own_resources_on_any_tier() {
        assert!(check_owner_or_tier(&ctx(Some("u1"), None), "u1", Tier::Pro).is_ok());
    }

    #[test]
    fn cross_user_read_needs_override_tier() {
        let err = check_owner_or_tier(&ctx(Some("u1"), Some(Tier::Free)), "u2", Tier::Pro)
            .unwrap_err();
        assert_eq!(err.code(), codes::FORBIDDEN);
        assert!(check_owner_or_tier(&ctx(Some("u1"), Some(Tier::Pro)), "u2", Tier::Pro).is_ok());
    }
}
