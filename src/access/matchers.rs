//! Built-in tracking matchers.

use crate::config::{AnalyticsSettings, RoleTrackingType};
use crate::host::{AdminContext, CurrentUser};

use super::{AccessVote, TrackingMatcher};

/// Skips tracking on administrative pages.
pub struct AdminRouteMatcher<'a> {
    admin_context: &'a dyn AdminContext,
}

impl<'a> AdminRouteMatcher<'a> {
    pub fn new(admin_context: &'a dyn AdminContext) -> Self {
        Self {
            admin_context,
        }
    }
}

impl TrackingMatcher for AdminRouteMatcher<'_> {
    fn access(&self) -> AccessVote {
        if self.admin_context.is_admin_route() {
            tracing::debug!("This is an administration page");
            return AccessVote::Forbidden;
        }
        AccessVote::Neutral
    }

    fn name(&self) -> &str {
        "admin_route"
    }
}

/// Skips tracking based on the current user's roles.
///
/// The intersection of tracked roles and the user's roles decides the vote:
///
/// | policy    | intersection | vote      |
/// |-----------|--------------|-----------|
/// | inclusive | non-empty    | Allowed   |
/// | inclusive | empty        | Allowed   |
/// | exclusive | non-empty    | Forbidden |
/// | exclusive | empty        | Allowed   |
pub struct RoleMatcher<'a> {
    policy: RoleTrackingType,
    tracked_roles: Vec<String>,
    current_user: &'a dyn CurrentUser,
}

impl<'a> RoleMatcher<'a> {
    pub fn new(policy: RoleTrackingType, tracked_roles: Vec<String>, current_user: &'a dyn CurrentUser) -> Self {
        Self {
            policy,
            tracked_roles,
            current_user,
        }
    }

    /// Build from the role settings.
    pub fn from_settings(settings: &AnalyticsSettings, current_user: &'a dyn CurrentUser) -> Self {
        Self::new(settings.role_tracking_type(), settings.tracked_roles(), current_user)
    }
}

impl TrackingMatcher for RoleMatcher<'_> {
    fn access(&self) -> AccessVote {
        let user_roles = self.current_user.roles();
        let intersects = self.tracked_roles.iter().any(|role| user_roles.contains(role));

        if !intersects || self.policy == RoleTrackingType::Inclusive {
            return AccessVote::Allowed;
        }

        tracing::debug!(policy = %self.policy, "The current user does not belong to a tracked role");
        AccessVote::Forbidden
    }

    fn name(&self) -> &str {
        "role"
    }
}
