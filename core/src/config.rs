use crate::{
    error::{AttributionError, EngineResult},
    ingest::ChannelAlias,
    journey::MalformedJourneyPolicy,
    types::ChannelId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;
pub const DEFAULT_SHARD_SIZE: usize = 256;
pub const DEFAULT_TOP_PATHS: usize = 10;

// ── Model parameters ───────────────────────────────────────────────

/// How the U-shaped model splits a two-touchpoint path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoTouchSplit {
    /// `first_weight` / `last_weight` exactly as configured.
    #[default]
    Direct,
    /// First and last weights scaled so the pair sums to 1.
    Renormalized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub navigation_channel:           ChannelId,
    pub navigation_threshold_seconds: f64,
    pub first_weight:                 f64,
    pub last_weight:                  f64,
    pub middle_weight:                f64,
    pub two_touch_split:              TwoTouchSplit,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            navigation_channel:           "Stories".into(),
            navigation_threshold_seconds: 60.0,
            first_weight:                 0.4,
            last_weight:                  0.4,
            middle_weight:                0.2,
            two_touch_split:              TwoTouchSplit::Direct,
        }
    }
}

impl ModelConfig {
    pub fn weight_sum(&self) -> f64 {
        self.first_weight + self.last_weight + self.middle_weight
    }

    /// Check the parameters. Weight problems are advisory and come back as
    /// warnings; only an unusable threshold is an error.
    pub fn validate(&self) -> EngineResult<Vec<ConfigWarning>> {
        let threshold = self.navigation_threshold_seconds;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AttributionError::InvalidConfig {
                reason: format!("navigation_threshold_seconds must be >= 0, got {threshold}"),
            });
        }

        let mut warnings = Vec::new();
        for (name, value) in [
            ("first_weight", self.first_weight),
            ("last_weight", self.last_weight),
            ("middle_weight", self.middle_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                warnings.push(ConfigWarning::WeightOutOfRange { name: name.to_string(), value });
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warnings.push(ConfigWarning::WeightSum { sum });
        }

        for w in &warnings {
            log::warn!("config: {w}");
        }
        Ok(warnings)
    }
}

/// A non-fatal configuration problem. The engine still runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    WeightSum { sum: f64 },
    WeightOutOfRange { name: String, value: f64 },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeightSum { sum } => {
                write!(f, "U-shape weights sum to {sum:.2}, should be 1.0")
            }
            Self::WeightOutOfRange { name, value } => {
                write!(f, "{name} is {value}, expected a value in [0, 1]")
            }
        }
    }
}

// ── Channel scores ─────────────────────────────────────────────────

/// Channel → importance score for the weighted-score model.
/// Channels not listed score 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelScoreTable(HashMap<ChannelId, f64>);

impl ChannelScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, channel: impl Into<ChannelId>, score: f64) -> Self {
        self.0.insert(channel.into(), score);
        self
    }

    pub fn score(&self, channel: &str) -> f64 {
        self.0.get(channel).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> EngineResult<()> {
        let mut channels: Vec<_> = self.0.iter().collect();
        channels.sort_by(|a, b| a.0.cmp(b.0));
        for (channel, score) in channels {
            if !score.is_finite() || *score < 0.0 {
                return Err(AttributionError::InvalidConfig {
                    reason: format!("score for '{channel}' must be a nonnegative number, got {score}"),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(ChannelId, f64)> for ChannelScoreTable {
    fn from_iter<I: IntoIterator<Item = (ChannelId, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Engine configuration file ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub model:            ModelConfig,
    #[serde(default)]
    pub channel_scores:   ChannelScoreTable,
    #[serde(default)]
    pub channel_aliases:  Vec<ChannelAlias>,
    #[serde(default = "default_top_paths")]
    pub top_paths:        usize,
    #[serde(default)]
    pub malformed_policy: MalformedJourneyPolicy,
    #[serde(default = "default_shard_size")]
    pub shard_size:       usize,
}

fn default_top_paths() -> usize {
    DEFAULT_TOP_PATHS
}

fn default_shard_size() -> usize {
    DEFAULT_SHARD_SIZE
}

impl EngineConfig {
    /// Load from a JSON file. In tests, use EngineConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.check()?;
        Ok(config)
    }

    /// Hard errors only; weight warnings are raised when the engine is built.
    pub fn check(&self) -> EngineResult<()> {
        self.channel_scores.validate()?;
        if self.shard_size == 0 {
            return Err(AttributionError::InvalidConfig {
                reason: "shard_size must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            model: ModelConfig::default(),
            channel_scores: [
                ("Digital Ads", 4.0),
                ("Push", 3.0),
                ("Telemarketing", 5.0),
                ("SMS", 1.0),
                ("Stories", 2.0),
            ]
            .into_iter()
            .map(|(c, s)| (c.to_string(), s))
            .collect(),
            channel_aliases: Vec::new(),
            top_paths: DEFAULT_TOP_PATHS,
            malformed_policy: MalformedJourneyPolicy::Abort,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model:            ModelConfig::default(),
            channel_scores:   ChannelScoreTable::default(),
            channel_aliases:  Vec::new(),
            top_paths:        DEFAULT_TOP_PATHS,
            malformed_policy: MalformedJourneyPolicy::Abort,
            shard_size:       DEFAULT_SHARD_SIZE,
        }
    }
}
