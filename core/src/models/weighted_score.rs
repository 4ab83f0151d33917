//! Weighted-score attribution.
//!
//! Each distinct channel on the normalized, filtered path contributes its
//! configured score once, however many times it appears. Credit is
//! `value * score / total`. A zero total yields an empty credit map: unlike
//! the positional models there is no fallback to the conversion channel.

use super::{shaped_path, AttributionModel, ModelKind};
use crate::{
    config::ChannelScoreTable,
    credit::CreditMap,
    journey::ConvertingJourney,
    navigation::NavigationFilter,
    types::ChannelId,
};
use std::collections::BTreeSet;

pub fn weighted_score_credits(path: &[ChannelId], value: f64, scores: &ChannelScoreTable) -> CreditMap {
    let distinct: BTreeSet<&str> = path.iter().map(String::as_str).collect();
    let total: f64 = distinct.iter().map(|c| scores.score(c)).sum();

    let mut credits = CreditMap::new();
    if total <= 0.0 {
        return credits;
    }
    for channel in distinct {
        credits.add(channel, value * scores.score(channel) / total);
    }
    credits
}

#[derive(Debug, Clone)]
pub struct WeightedScore {
    scores: ChannelScoreTable,
    filter: NavigationFilter,
}

impl WeightedScore {
    pub fn new(scores: ChannelScoreTable, filter: NavigationFilter) -> Self {
        Self { scores, filter }
    }
}

impl AttributionModel for WeightedScore {
    fn kind(&self) -> ModelKind {
        ModelKind::WeightedScore
    }

    fn attribute(&self, journey: &ConvertingJourney) -> CreditMap {
        let path = shaped_path(journey, Some(&self.filter));
        let credits = weighted_score_credits(&path, journey.value(), &self.scores);
        if credits.is_empty() && journey.value() > 0.0 {
            log::trace!(
                "model=weighted_score user={} zero total score, value left unattributed",
                journey.user_id
            );
        }
        credits
    }
}
