//! U-shaped (position-based) attribution.
//!
//! Path length n after normalization and filtering:
//!   n == 0  the conversion channel takes the whole value
//!   n == 1  the single channel takes the whole value
//!   n == 2  first_weight to position 0, last_weight to position 1
//!           (or the pair rescaled to 1.0 under TwoTouchSplit::Renormalized)
//!   n >= 3  first_weight to position 0, last_weight to position n-1,
//!           middle_weight split equally across the DISTINCT channels in
//!           positions 1..=n-2. A channel seen twice in the middle gets
//!           one share.
//!
//! Shares for one channel at several positions add up.

use super::{shaped_path, AttributionModel, ModelKind};
use crate::{
    config::{ModelConfig, TwoTouchSplit},
    credit::CreditMap,
    journey::ConvertingJourney,
    navigation::NavigationFilter,
    types::ChannelId,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UShapeWeights {
    pub first:  f64,
    pub last:   f64,
    pub middle: f64,
}

impl UShapeWeights {
    pub fn new(first: f64, last: f64, middle: f64) -> Self {
        Self { first, last, middle }
    }

    fn two_touch(&self, split: TwoTouchSplit) -> (f64, f64) {
        match split {
            TwoTouchSplit::Direct => (self.first, self.last),
            TwoTouchSplit::Renormalized => {
                let pair = self.first + self.last;
                if pair > 0.0 {
                    (self.first / pair, self.last / pair)
                } else {
                    (0.5, 0.5)
                }
            }
        }
    }
}

impl From<&ModelConfig> for UShapeWeights {
    fn from(config: &ModelConfig) -> Self {
        Self::new(config.first_weight, config.last_weight, config.middle_weight)
    }
}

/// Credits for an already normalized and filtered path.
pub fn u_shaped_credits(
    path: &[ChannelId],
    conversion_channel: &str,
    value: f64,
    weights: UShapeWeights,
    split: TwoTouchSplit,
) -> CreditMap {
    let mut credits = CreditMap::new();
    match path {
        [] => credits.add(conversion_channel, value),
        [only] => credits.add(only, value),
        [first, last] => {
            let (w_first, w_last) = weights.two_touch(split);
            credits.add(first, value * w_first);
            credits.add(last, value * w_last);
        }
        [first, middle @ .., last] => {
            credits.add(first, value * weights.first);
            credits.add(last, value * weights.last);

            let distinct: BTreeSet<&str> = middle.iter().map(String::as_str).collect();
            let share = value * weights.middle / distinct.len() as f64;
            for channel in distinct {
                credits.add(channel, share);
            }
        }
    }
    credits
}

#[derive(Debug, Clone)]
pub struct UShaped {
    weights: UShapeWeights,
    split:   TwoTouchSplit,
    filter:  NavigationFilter,
}

impl UShaped {
    pub fn new(weights: UShapeWeights, split: TwoTouchSplit, filter: NavigationFilter) -> Self {
        Self { weights, split, filter }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            UShapeWeights::from(config),
            config.two_touch_split,
            NavigationFilter::from_config(config),
        )
    }
}

impl AttributionModel for UShaped {
    fn kind(&self) -> ModelKind {
        ModelKind::UShaped
    }

    fn attribute(&self, journey: &ConvertingJourney) -> CreditMap {
        let path = shaped_path(journey, Some(&self.filter));
        u_shaped_credits(
            &path,
            &journey.conversion.channel,
            journey.value(),
            self.weights,
            self.split,
        )
    }
}
