//! Route hazard evaluation.
//!
//! Given the latest classification from every station on a route,
//! collapse them into one verdict and decide when that verdict is
//! worth interrupting the driver for. The evaluation is pure; callers
//! feed it the output of [`crate::aggregate::latest_per_device`]
//! filtered to the stations on the route.

use std::time::{Duration, Instant};

use crate::model::SurfaceType;

/// Minimum gap between two reroute prompts.
pub const DEFAULT_PROMPT_COOLDOWN: Duration = Duration::from_secs(10 * 60);

/// Overall state of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCondition {
    /// Every reporting station reads asphalt.
    Good,
    /// At least one station reads ice or snow.
    Bad,
    /// No station on the route has reported yet.
    Unknown,
}

impl RouteCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Bad => "Bad",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RouteCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapse the latest per-station classifications into one verdict.
///
/// One hazardous station is enough to flag the whole route; an empty
/// slice means nothing has reported and the route stays [`RouteCondition::Unknown`].
pub fn route_condition(surfaces: &[SurfaceType]) -> RouteCondition {
    if surfaces.is_empty() {
        RouteCondition::Unknown
    } else if surfaces.iter().any(SurfaceType::is_hazardous) {
        RouteCondition::Bad
    } else {
        RouteCondition::Good
    }
}

/// Decides when a route turning bad should actually prompt the driver.
///
/// A prompt fires only on the transition into [`RouteCondition::Bad`]
/// from a non-Bad state, and never twice within the cooldown. A route
/// that stays bad keeps silent; the driver already said no once.
#[derive(Debug)]
pub struct ReroutePrompter {
    cooldown: Duration,
    last_condition: RouteCondition,
    last_prompt: Option<Instant>,
}

impl ReroutePrompter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_condition: RouteCondition::Unknown,
            last_prompt: None,
        }
    }

    /// Feed one evaluation; returns whether to prompt now.
    ///
    /// `now` is passed in rather than sampled so the suppression
    /// window is testable.
    pub fn observe(&mut self, condition: RouteCondition, now: Instant) -> bool {
        let entered_bad =
            condition == RouteCondition::Bad && self.last_condition != RouteCondition::Bad;
        self.last_condition = condition;

        if !entered_bad {
            return false;
        }

        let suppressed = self
            .last_prompt
            .is_some_and(|t| now.duration_since(t) < self.cooldown);
        if suppressed {
            return false;
        }

        self.last_prompt = Some(now);
        true
    }

    pub fn last_condition(&self) -> RouteCondition {
        self.last_condition
    }
}

impl Default for ReroutePrompter {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_COOLDOWN)
    }
}
