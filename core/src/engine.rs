//! The attribution engine — one canonical pipeline for every model.
//!
//! PIPELINE (fixed):
//!   1. Validate the population (sort touchpoints, split off conversions,
//!      apply the malformed-journey policy).
//!   2. For each registered model, in registration order, aggregate credits
//!      over the converting journeys.
//!   3. Rank the most frequent raw conversion paths.
//!
//! RULES:
//!   - The engine owns read-only copies of its configuration for a run.
//!     Changing parameters rebuilds the registered models of the same
//!     kinds; nothing is cached between runs.
//!   - The population is supplied by the caller on every run.

use crate::{
    aggregate::{aggregate, top_paths, PathCount},
    config::{ChannelScoreTable, ConfigWarning, EngineConfig, ModelConfig},
    credit::{compare, ChannelDelta, ChannelTotals},
    error::EngineResult,
    journey::{Population, SkippedJourney},
    models::{AttributionModel, FirstTouch, LastTouch, ModelKind, UShaped, WeightedScore},
    navigation::NavigationFilter,
};
use serde::{Deserialize, Serialize};

pub struct AttributionEngine {
    config:   EngineConfig,
    warnings: Vec<ConfigWarning>,
    models:   Vec<Box<dyn AttributionModel>>,
}

impl AttributionEngine {
    /// An engine with no models registered.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.check()?;
        let warnings = config.model.validate()?;
        Ok(Self {
            config,
            warnings,
            models: Vec::new(),
        })
    }

    /// Build a fully wired engine with every catalogue model registered.
    pub fn build(config: EngineConfig) -> EngineResult<Self> {
        let mut engine = Self::new(config)?;
        engine.rebuild_models(&ModelKind::ALL);
        Ok(engine)
    }

    pub fn build_test() -> EngineResult<Self> {
        Self::build(EngineConfig::default_test())
    }

    /// Register a model. Reports list models in registration order.
    pub fn register(&mut self, model: Box<dyn AttributionModel>) {
        self.models.push(model);
    }

    /// The catalogue model for `kind`, wired from the current configuration.
    fn catalogue_model(&self, kind: ModelKind) -> Box<dyn AttributionModel> {
        let model = &self.config.model;
        let filter = NavigationFilter::from_config(model);
        match kind {
            ModelKind::LastTouch => Box::new(LastTouch::unfiltered()),
            ModelKind::LastTouchFiltered => Box::new(LastTouch::filtered(filter)),
            ModelKind::FirstTouch => Box::new(FirstTouch::new(filter)),
            ModelKind::UShaped => Box::new(UShaped::from_config(model)),
            ModelKind::WeightedScore => {
                Box::new(WeightedScore::new(self.config.channel_scores.clone(), filter))
            }
        }
    }

    /// Replace the registered models with fresh ones of `kinds`, in order.
    /// A parameter change keeps the same model set; it never adds or
    /// drops a model.
    fn rebuild_models(&mut self, kinds: &[ModelKind]) {
        self.models = kinds.iter().map(|&kind| self.catalogue_model(kind)).collect();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn model_kinds(&self) -> Vec<ModelKind> {
        self.models.iter().map(|m| m.kind()).collect()
    }

    /// Replace the model parameters and rebuild the registered models.
    pub fn set_model_config(&mut self, model: ModelConfig) -> EngineResult<()> {
        self.warnings = model.validate()?;
        self.config.model = model;
        let kinds = self.model_kinds();
        self.rebuild_models(&kinds);
        Ok(())
    }

    /// Replace the channel score table and rebuild the registered models.
    pub fn set_channel_scores(&mut self, scores: ChannelScoreTable) -> EngineResult<()> {
        scores.validate()?;
        self.config.channel_scores = scores;
        let kinds = self.model_kinds();
        self.rebuild_models(&kinds);
        Ok(())
    }

    /// Totals for a single model kind, if registered.
    pub fn totals_for(&self, kind: ModelKind, population: &Population) -> EngineResult<Option<ChannelTotals>> {
        let Some(model) = self.models.iter().find(|m| m.kind() == kind) else {
            return Ok(None);
        };
        let prepared = population.prepare(self.config.malformed_policy)?;
        Ok(Some(aggregate(model.as_ref(), &prepared.converting, self.config.shard_size)))
    }

    /// Full recomputation over `population`.
    pub fn run(&self, population: &Population) -> EngineResult<AttributionReport> {
        let prepared = population.prepare(self.config.malformed_policy)?;

        let models = self
            .models
            .iter()
            .map(|model| ModelTotals {
                kind:   model.kind(),
                totals: aggregate(model.as_ref(), &prepared.converting, self.config.shard_size),
            })
            .collect();

        let report = AttributionReport {
            models,
            top_paths:   top_paths(&prepared.converting, self.config.top_paths),
            converting:  prepared.converting.len(),
            noise:       prepared.noise,
            total_value: prepared.total_value(),
            skipped:     prepared.skipped,
            warnings:    self.warnings.clone(),
        };

        log::info!(
            "engine: journeys={} converting={} noise={} skipped={} value={:.2}",
            population.len(),
            report.converting,
            report.noise,
            report.skipped.len(),
            report.total_value
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTotals {
    pub kind:   ModelKind,
    pub totals: ChannelTotals,
}

/// Everything the presentation layer needs for one reporting cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionReport {
    pub models:      Vec<ModelTotals>,
    pub top_paths:   Vec<PathCount>,
    pub converting:  usize,
    pub noise:       usize,
    pub total_value: f64,
    pub skipped:     Vec<SkippedJourney>,
    pub warnings:    Vec<ConfigWarning>,
}

impl AttributionReport {
    pub fn totals(&self, kind: ModelKind) -> Option<&ChannelTotals> {
        self.models.iter().find(|m| m.kind == kind).map(|m| &m.totals)
    }

    /// Side-by-side deltas `candidate - baseline`.
    pub fn compare(&self, baseline: ModelKind, candidate: ModelKind) -> Option<Vec<ChannelDelta>> {
        Some(compare(self.totals(baseline)?, self.totals(candidate)?))
    }
}
