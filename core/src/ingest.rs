//! Ingestion boundary — flat touchpoint rows into per-user journeys.
//!
//! The data collaborator hands over a table of interactions, one row per
//! touchpoint. This is the only place where loose input is defaulted or
//! cleaned; everything past `group_rows` works on typed journeys.

use crate::{
    journey::{Journey, Population, Touchpoint},
    types::{ChannelId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchpointRow {
    pub user_id:          UserId,
    pub channel:          String,
    pub timestamp:        DateTime<Utc>,
    #[serde(default)]
    pub converted:        bool,
    #[serde(default)]
    pub conversion_value: f64,
}

/// A canonical channel and the raw spellings that map onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAlias {
    pub channel: ChannelId,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Resolves raw channel strings to canonical channel ids.
#[derive(Debug, Clone, Default)]
pub struct ChannelCatalog {
    aliases: Vec<ChannelAlias>,
}

impl ChannelCatalog {
    pub fn new(aliases: Vec<ChannelAlias>) -> Self {
        Self { aliases }
    }

    /// Exact (case-insensitive) match on a channel or alias first, then the
    /// first alias contained in the raw value. Unknown channels pass through
    /// trimmed.
    pub fn resolve(&self, raw: &str) -> ChannelId {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();

        let exact = self.aliases.iter().find(|a| {
            a.channel.to_lowercase() == lowered
                || a.aliases.iter().any(|alias| alias.to_lowercase() == lowered)
        });
        if let Some(a) = exact {
            return a.channel.clone();
        }

        let partial = self.aliases.iter().find(|a| {
            a.aliases
                .iter()
                .any(|alias| !alias.is_empty() && lowered.contains(&alias.to_lowercase()))
        });
        match partial {
            Some(a) => a.channel.clone(),
            None => trimmed.to_string(),
        }
    }
}

/// Group rows by user, in order of each user's first row. Each journey's
/// touchpoints are sorted by timestamp; ties keep row order.
pub fn group_rows(rows: &[TouchpointRow], catalog: &ChannelCatalog) -> Population {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut journeys: Vec<Journey> = Vec::new();
    let mut dropped = 0usize;

    for row in rows {
        let user_id = row.user_id.trim();
        let channel = catalog.resolve(&row.channel);
        if user_id.is_empty() || channel.is_empty() {
            dropped += 1;
            continue;
        }

        let touchpoint = if row.converted {
            Touchpoint::conversion(channel, row.timestamp, row.conversion_value)
        } else {
            Touchpoint::touch(channel, row.timestamp)
        };

        let slot = *index.entry(user_id).or_insert_with(|| {
            journeys.push(Journey::new(user_id, Vec::new()));
            journeys.len() - 1
        });
        journeys[slot].touchpoints.push(touchpoint);
    }

    for journey in &mut journeys {
        journey.touchpoints.sort_by_key(|t| t.timestamp);
    }

    if dropped > 0 {
        log::warn!("ingest: dropped {dropped} rows with a blank user_id or channel");
    }
    log::info!("ingest: {} rows grouped into {} journeys", rows.len(), journeys.len());
    Population::new(journeys)
}

/// Read a JSON array of rows.
pub fn load_rows(path: &str) -> anyhow::Result<Vec<TouchpointRow>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let rows: Vec<TouchpointRow> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
    Ok(rows)
}

/// Flatten a population back into rows, journey by journey.
pub fn flatten_rows(population: &Population) -> Vec<TouchpointRow> {
    population
        .journeys()
        .iter()
        .flat_map(|journey| {
            journey.touchpoints.iter().map(|t| TouchpointRow {
                user_id:          journey.user_id.clone(),
                channel:          t.channel.clone(),
                timestamp:        t.timestamp,
                converted:        t.is_conversion,
                conversion_value: if t.is_conversion { t.value } else { 0.0 },
            })
        })
        .collect()
}
