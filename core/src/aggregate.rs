//! Population-level reduction: channel totals and top conversion paths.
//!
//! RULE: Journeys are attributed independently. The population is cut
//! into fixed-size shards, each shard is folded on a rayon worker, and the
//! shard totals are merged in shard order. The merge order never depends
//! on scheduling, so totals are reproducible bit for bit.

use crate::{
    credit::ChannelTotals,
    error::EngineResult,
    journey::{ConvertingJourney, MalformedJourneyPolicy, Population},
    models::AttributionModel,
    types::{ChannelId, DIRECT_PATH, PATH_SEPARATOR},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Run `model` over every journey and sum the credits per channel.
pub fn aggregate(
    model: &dyn AttributionModel,
    journeys: &[ConvertingJourney],
    shard_size: usize,
) -> ChannelTotals {
    let shard_size = shard_size.max(1);
    let partials: Vec<ChannelTotals> = journeys
        .par_chunks(shard_size)
        .map(|shard| {
            let mut totals = ChannelTotals::new();
            for journey in shard {
                totals.add_credits(&model.attribute(journey));
            }
            totals
        })
        .collect();

    let mut totals = ChannelTotals::new();
    for partial in partials {
        totals.merge(partial);
    }

    log::debug!(
        "model={} journeys={} shards={} attributed={:.2}",
        model.kind().name(),
        journeys.len(),
        journeys.len().div_ceil(shard_size),
        totals.total()
    );
    totals
}

/// Validate `population` under `policy`, then [`aggregate`].
pub fn aggregate_population(
    model: &dyn AttributionModel,
    population: &Population,
    policy: MalformedJourneyPolicy,
    shard_size: usize,
) -> EngineResult<ChannelTotals> {
    let prepared = population.prepare(policy)?;
    Ok(aggregate(model, &prepared.converting, shard_size))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCount {
    pub path:  String,
    pub count: usize,
}

/// Render a raw (not normalized) channel path. An empty path is "Direct".
pub fn render_path(channels: &[ChannelId]) -> String {
    if channels.is_empty() {
        DIRECT_PATH.to_string()
    } else {
        channels.join(PATH_SEPARATOR)
    }
}

/// The `n` most frequent pre-conversion paths, most frequent first.
/// Equal counts keep the order in which the path was first seen.
pub fn top_paths(journeys: &[ConvertingJourney], n: usize) -> Vec<PathCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<PathCount> = Vec::new();

    for journey in journeys {
        let path = render_path(&journey.channels());
        match index.get(&path) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(path.clone(), counts.len());
                counts.push(PathCount { path, count: 1 });
            }
        }
    }

    // Stable sort keeps first-seen order among ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}
