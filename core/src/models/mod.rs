//! Attribution models.
//!
//! RULE: Every model implements AttributionModel and is a pure function of
//! one validated journey. Models never look at other journeys and never
//! mutate their configuration.
//!
//! Shared preprocessing, in this order:
//!   1. Normalize the pre-conversion path (collapse consecutive repeats).
//!   2. Apply the navigation filter, when the model uses one.
//!
//! The unfiltered last-touch baseline skips both steps: it only ever
//! looks at the conversion event.

pub mod first_touch;
pub mod last_touch;
pub mod u_shaped;
pub mod weighted_score;

pub use first_touch::FirstTouch;
pub use last_touch::LastTouch;
pub use u_shaped::{UShapeWeights, UShaped};
pub use weighted_score::WeightedScore;

use crate::{
    credit::CreditMap,
    journey::ConvertingJourney,
    navigation::NavigationFilter,
    normalize::normalize_touchpoints,
    types::ChannelId,
};
use serde::{Deserialize, Serialize};

/// The contract every attribution model fulfils.
pub trait AttributionModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Credit `journey`'s conversion value across channels.
    fn attribute(&self, journey: &ConvertingJourney) -> CreditMap;
}

/// Stable model catalogue. Report order follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LastTouch,
    LastTouchFiltered,
    FirstTouch,
    UShaped,
    WeightedScore,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::LastTouch,
        ModelKind::LastTouchFiltered,
        ModelKind::FirstTouch,
        ModelKind::UShaped,
        ModelKind::WeightedScore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LastTouch         => "last_touch",
            Self::LastTouchFiltered => "last_touch_filtered",
            Self::FirstTouch        => "first_touch",
            Self::UShaped           => "u_shaped",
            Self::WeightedScore     => "weighted_score",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LastTouch         => "Last Touch",
            Self::LastTouchFiltered => "Last Touch (filtered)",
            Self::FirstTouch        => "First Touch",
            Self::UShaped           => "U-Shaped",
            Self::WeightedScore     => "Weighted Score",
        }
    }
}

/// Normalized, optionally filtered channel path of a journey.
pub fn shaped_path(journey: &ConvertingJourney, filter: Option<&NavigationFilter>) -> Vec<ChannelId> {
    let normalized = normalize_touchpoints(&journey.path);
    let kept = match filter {
        Some(f) => f.filter(&normalized, journey.conversion.timestamp),
        None => normalized,
    };
    kept.into_iter().map(|t| t.channel).collect()
}
