//! Per-journey credit maps and population-level channel totals.

use crate::types::ChannelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Channel → credit (currency units) for one journey.
/// Credits for the same channel accumulate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditMap(BTreeMap<ChannelId, f64>);

impl CreditMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole value credited to one channel.
    pub fn single(channel: &str, value: f64) -> Self {
        let mut map = Self::new();
        map.add(channel, value);
        map
    }

    pub fn add(&mut self, channel: &str, amount: f64) {
        *self.0.entry(channel.to_string()).or_insert(0.0) += amount;
    }

    pub fn get(&self, channel: &str) -> f64 {
        self.0.get(channel).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChannelId, &f64)> {
        self.0.iter()
    }
}

/// Summed revenue per channel across a population, for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelTotals(BTreeMap<ChannelId, f64>);

impl ChannelTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_credits(&mut self, credits: &CreditMap) {
        for (channel, amount) in credits.iter() {
            *self.0.entry(channel.clone()).or_insert(0.0) += amount;
        }
    }

    /// Fold another partial total into this one.
    pub fn merge(&mut self, other: ChannelTotals) {
        for (channel, amount) in other.0 {
            *self.0.entry(channel).or_insert(0.0) += amount;
        }
    }

    pub fn get(&self, channel: &str) -> f64 {
        self.0.get(channel).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChannelId, &f64)> {
        self.0.iter()
    }

    /// Channels by revenue, highest first. Ties go to the lexically smaller name.
    pub fn ranked(&self) -> Vec<(ChannelId, f64)> {
        let mut rows: Vec<(ChannelId, f64)> =
            self.0.iter().map(|(c, v)| (c.clone(), *v)).collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }

    /// Ranked channels with their percentage of the total.
    pub fn shares(&self) -> Vec<ChannelShare> {
        let total = self.total();
        self.ranked()
            .into_iter()
            .map(|(channel, revenue)| ChannelShare {
                share_pct: if total > 0.0 { revenue / total * 100.0 } else { 0.0 },
                channel,
                revenue,
            })
            .collect()
    }
}

impl FromIterator<(ChannelId, f64)> for ChannelTotals {
    fn from_iter<I: IntoIterator<Item = (ChannelId, f64)>>(iter: I) -> Self {
        let mut totals = Self::new();
        for (channel, amount) in iter {
            *totals.0.entry(channel).or_insert(0.0) += amount;
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel:   ChannelId,
    pub revenue:   f64,
    pub share_pct: f64,
}

/// One row of a side-by-side model comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDelta {
    pub channel:   ChannelId,
    pub baseline:  f64,
    pub candidate: f64,
    pub delta:     f64,
    /// `None` when the baseline credited nothing to the channel.
    pub delta_pct: Option<f64>,
}

/// Per-channel difference `candidate - baseline` over the union of channels,
/// largest gain first.
pub fn compare(baseline: &ChannelTotals, candidate: &ChannelTotals) -> Vec<ChannelDelta> {
    let mut channels: Vec<&ChannelId> = baseline.channels().chain(candidate.channels()).collect();
    channels.sort();
    channels.dedup();

    let mut rows: Vec<ChannelDelta> = channels
        .into_iter()
        .map(|channel| {
            let base = baseline.get(channel);
            let cand = candidate.get(channel);
            ChannelDelta {
                channel:   channel.clone(),
                baseline:  base,
                candidate: cand,
                delta:     cand - base,
                delta_pct: (base > 0.0).then(|| (cand - base) / base * 100.0),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.delta.total_cmp(&a.delta).then_with(|| a.channel.cmp(&b.channel)));
    rows
}
