//! Touchpoints, journeys and the validated converting view the models consume.
//!
//! RULE: Journeys are read-only inputs. Nothing in the engine mutates a
//! Journey after it is handed over; validation produces a separate
//! ConvertingJourney instead.

use crate::{
    error::{AttributionError, EngineResult},
    types::{ChannelId, UserId},
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchpoint {
    pub channel:       ChannelId,
    pub timestamp:     DateTime<Utc>,
    pub is_conversion: bool,
    /// Revenue carried by a conversion touchpoint. Ignored otherwise.
    #[serde(default)]
    pub value:         f64,
}

impl Touchpoint {
    pub fn touch(channel: impl Into<ChannelId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            channel: channel.into(),
            timestamp,
            is_conversion: false,
            value: 0.0,
        }
    }

    pub fn conversion(channel: impl Into<ChannelId>, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            channel: channel.into(),
            timestamp,
            is_conversion: true,
            value,
        }
    }
}

/// The terminal touchpoint of a converting journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    pub channel:   ChannelId,
    pub timestamp: DateTime<Utc>,
    pub value:     f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub user_id:     UserId,
    pub touchpoints: Vec<Touchpoint>,
}

impl Journey {
    pub fn new(user_id: impl Into<UserId>, touchpoints: Vec<Touchpoint>) -> Self {
        Self { user_id: user_id.into(), touchpoints }
    }

    pub fn has_conversion(&self) -> bool {
        self.touchpoints.iter().any(|t| t.is_conversion)
    }

    /// Validate and split into the converting view.
    ///
    /// Returns `Ok(None)` for a journey without a conversion (noise).
    /// Touchpoints are sorted by timestamp first; the sort is stable so
    /// equal timestamps keep their input order.
    pub fn converting(&self) -> EngineResult<Option<ConvertingJourney>> {
        let conversions = self.touchpoints.iter().filter(|t| t.is_conversion).count();
        match conversions {
            0 => return Ok(None),
            1 => {}
            count => {
                return Err(AttributionError::MultipleConversions {
                    user_id: self.user_id.clone(),
                    count,
                })
            }
        }

        let mut path: Vec<Touchpoint> = Vec::with_capacity(self.touchpoints.len() - 1);
        let mut conversion = None;
        for t in &self.touchpoints {
            if t.is_conversion {
                conversion = Some(t);
            } else {
                path.push(t.clone());
            }
        }
        let conversion = conversion.ok_or_else(|| AttributionError::MissingConversion {
            user_id: self.user_id.clone(),
        })?;

        if !(conversion.value >= 0.0 && conversion.value.is_finite()) {
            return Err(AttributionError::NegativeConversionValue {
                user_id: self.user_id.clone(),
                value:   conversion.value,
            });
        }

        path.sort_by_key(|t| t.timestamp);
        if path.last().is_some_and(|t| t.timestamp > conversion.timestamp) {
            return Err(AttributionError::ConversionNotLast {
                user_id: self.user_id.clone(),
            });
        }

        Ok(Some(ConvertingJourney {
            user_id: self.user_id.clone(),
            path,
            conversion: ConversionEvent {
                channel:   conversion.channel.clone(),
                timestamp: conversion.timestamp,
                value:     conversion.value,
            },
        }))
    }

    /// Like [`Journey::converting`], but a missing conversion is an error.
    pub fn require_converting(&self) -> EngineResult<ConvertingJourney> {
        self.converting()?.ok_or_else(|| AttributionError::MissingConversion {
            user_id: self.user_id.clone(),
        })
    }
}

/// A validated journey: time-ordered touchpoints before the conversion,
/// plus the conversion itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertingJourney {
    pub user_id:    UserId,
    pub path:       Vec<Touchpoint>,
    pub conversion: ConversionEvent,
}

impl ConvertingJourney {
    pub fn channels(&self) -> Vec<ChannelId> {
        self.path.iter().map(|t| t.channel.clone()).collect()
    }

    pub fn value(&self) -> f64 {
        self.conversion.value
    }
}

/// What the engine does with a journey that breaks the data contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedJourneyPolicy {
    /// Fail the whole batch on the first malformed journey.
    #[default]
    Abort,
    /// Drop the journey, log it, and keep going.
    SkipAndLog,
}

/// A journey dropped under [`MalformedJourneyPolicy::SkipAndLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedJourney {
    pub user_id: UserId,
    pub reason:  String,
}

/// The caller-supplied population. Immutable once built; regenerate a new
/// one to change the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    journeys: Vec<Journey>,
}

impl Population {
    pub fn new(journeys: Vec<Journey>) -> Self {
        Self { journeys }
    }

    pub fn journeys(&self) -> &[Journey] {
        &self.journeys
    }

    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }

    /// Validate every journey and keep the converting ones, in population order.
    pub fn prepare(&self, policy: MalformedJourneyPolicy) -> EngineResult<PreparedPopulation> {
        let validated: Vec<EngineResult<Option<ConvertingJourney>>> =
            self.journeys.par_iter().map(Journey::converting).collect();

        let mut prepared = PreparedPopulation::default();
        for result in validated {
            match result {
                Ok(Some(journey)) => prepared.converting.push(journey),
                Ok(None) => prepared.noise += 1,
                Err(e) => match policy {
                    MalformedJourneyPolicy::Abort => return Err(e),
                    MalformedJourneyPolicy::SkipAndLog => {
                        log::warn!("population: skipping malformed journey: {e}");
                        prepared.skipped.push(SkippedJourney {
                            user_id: e.user_id().unwrap_or_default().to_string(),
                            reason:  e.to_string(),
                        });
                    }
                },
            }
        }

        log::debug!(
            "population: converting={} noise={} skipped={}",
            prepared.converting.len(),
            prepared.noise,
            prepared.skipped.len()
        );
        Ok(prepared)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedPopulation {
    pub converting: Vec<ConvertingJourney>,
    pub noise:      usize,
    pub skipped:    Vec<SkippedJourney>,
}

impl PreparedPopulation {
    pub fn total_value(&self) -> f64 {
        self.converting.iter().map(ConvertingJourney::value).sum()
    }
}
