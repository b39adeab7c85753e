//! Vote-based decision on whether tracking code is emitted.
//!
//! Each [`TrackingMatcher`] casts one [`AccessVote`] per request. Votes combine
//! with the precedence `Forbidden > Allowed > Neutral`, so a single forbidding
//! matcher always wins and registration order never changes the outcome.
//!
//! ```rust
//! use analytics_snippet::access::{AccessAggregator, AccessVote};
//!
//! let mut aggregator = AccessAggregator::new();
//! assert_eq!(aggregator.evaluate(), AccessVote::Neutral);
//!
//! aggregator.add_matcher(AccessVote::Allowed);
//! aggregator.add_matcher(AccessVote::Forbidden);
//! assert_eq!(aggregator.evaluate(), AccessVote::Forbidden);
//! ```

mod matchers;

pub use matchers::{AdminRouteMatcher, RoleMatcher};

use std::fmt;

/// A single matcher's opinion on tracking the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessVote {
    Forbidden,
    Allowed,
    Neutral,
}

impl AccessVote {
    /// Combine two votes: forbidden beats allowed, allowed beats neutral.
    #[must_use]
    pub fn or_if(self, other: AccessVote) -> AccessVote {
        match (self, other) {
            (AccessVote::Forbidden, _) | (_, AccessVote::Forbidden) => AccessVote::Forbidden,
            (AccessVote::Allowed, _) | (_, AccessVote::Allowed) => AccessVote::Allowed,
            (AccessVote::Neutral, AccessVote::Neutral) => AccessVote::Neutral,
        }
    }

    #[must_use]
    pub fn is_forbidden(self) -> bool {
        self == AccessVote::Forbidden
    }
}

impl fmt::Display for AccessVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessVote::Forbidden => write!(f, "forbidden"),
            AccessVote::Allowed => write!(f, "allowed"),
            AccessVote::Neutral => write!(f, "neutral"),
        }
    }
}

/// Fold any number of votes; no votes means no opinion.
#[must_use]
pub fn fold_votes<I>(votes: I) -> AccessVote
where
    I: IntoIterator<Item = AccessVote>,
{
    votes.into_iter().fold(AccessVote::Neutral, AccessVote::or_if)
}

/// A rule deciding whether the current request should be tracked.
///
/// Implementations may read request state but must not change it.
pub trait TrackingMatcher {
    fn access(&self) -> AccessVote;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A fixed vote.
impl TrackingMatcher for AccessVote {
    fn access(&self) -> AccessVote {
        *self
    }
}

/// An ordered collection of matchers.
#[derive(Default)]
pub struct AccessAggregator<'a> {
    matchers: Vec<Box<dyn TrackingMatcher + 'a>>,
}

impl<'a> AccessAggregator<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    pub fn add_matcher(&mut self, matcher: impl TrackingMatcher + 'a) {
        self.matchers.push(Box::new(matcher));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Ask every matcher and fold the votes.
    #[must_use]
    pub fn evaluate(&self) -> AccessVote {
        let result = fold_votes(self.matchers.iter().map(|matcher| {
            let vote = matcher.access();
            tracing::debug!(matcher = matcher.name(), %vote, "Tracking matcher voted");
            vote
        }));
        tracing::debug!(matchers = self.matchers.len(), %result, "Tracking access evaluated");
        result
    }
}
