//! Navigation filter — drops ambient-channel clicks made right before conversion.
//!
//! A click on an in-app surface (the "Stories" carousel, say) seconds before
//! converting is navigation, not marketing influence. Such touchpoints are
//! removed before a model sees the path.
//!
//! RULE: The threshold is inclusive. A touchpoint exactly
//! `threshold_seconds` before conversion is removed.

use crate::{
    config::ModelConfig,
    journey::Touchpoint,
    types::ChannelId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationFilter {
    pub channel:           ChannelId,
    pub threshold_seconds: f64,
}

impl NavigationFilter {
    pub fn new(channel: impl Into<ChannelId>, threshold_seconds: f64) -> Self {
        Self { channel: channel.into(), threshold_seconds }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.navigation_channel.clone(), config.navigation_threshold_seconds)
    }

    pub fn is_navigation_click(&self, touchpoint: &Touchpoint, conversion_time: DateTime<Utc>) -> bool {
        touchpoint.channel == self.channel
            && elapsed_seconds(touchpoint.timestamp, conversion_time) <= self.threshold_seconds
    }

    /// Keep every touchpoint that is not a navigation click, in order.
    pub fn filter(&self, path: &[Touchpoint], conversion_time: DateTime<Utc>) -> Vec<Touchpoint> {
        path.iter()
            .filter(|t| !self.is_navigation_click(t, conversion_time))
            .cloned()
            .collect()
    }
}

/// Seconds from `touch` to `conversion`, microsecond resolution. Gaps too
/// large for microseconds (hundreds of millennia) fall back to milliseconds.
pub fn elapsed_seconds(touch: DateTime<Utc>, conversion: DateTime<Utc>) -> f64 {
    let gap = conversion - touch;
    match gap.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => gap.num_milliseconds() as f64 / 1_000.0,
    }
}
