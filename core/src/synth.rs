//! Synthetic consumer-loan journeys.
//!
//! Four converting scenarios plus non-converting noise, in fixed
//! proportions per 500 users:
//!   A  Digital Ads → Push → Telemarketing ⇒ Telemarketing       (100)
//!   B  Digital Ads → Stories → Stories (20–60 s before) ⇒ Stories (75)
//!   C  SMS → Push ⇒ Push                                         (38)
//!   D  Digital Ads → Stories → Telemarketing ⇒ Telemarketing     (37)
//!   noise: 1–4 random touchpoints, never converts                 (250)
//!
//! Scenario B is the navigation problem: the last Stories click is the
//! user tapping through the carousel on the way to apply.
//!
//! Times are anchored to a fixed epoch, so a seed fully determines the
//! population.

use crate::{
    journey::{Journey, Population, Touchpoint},
    rng::{RngBank, StreamRng, StreamSlot},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const CHANNELS: [&str; 5] = ["Digital Ads", "Stories", "Push", "SMS", "Telemarketing"];
pub const MIN_CONVERSION_VALUE: i64 = 5_000;
pub const MAX_CONVERSION_VALUE: i64 = 50_000;

const SCENARIO_SHARES_PER_500: [(StreamSlot, usize); 4] = [
    (StreamSlot::PaidThenTelemarketing, 100),
    (StreamSlot::StoriesNavigation, 75),
    (StreamSlot::SmsThenPush, 38),
    (StreamSlot::StoriesThenTelemarketing, 37),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub seed:  u64,
    pub users: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self { seed: 42, users: 500 }
    }
}

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// How many users each scenario gets; noise takes the remainder.
pub fn scenario_counts(users: usize) -> Vec<(StreamSlot, usize)> {
    let mut counts: Vec<(StreamSlot, usize)> = SCENARIO_SHARES_PER_500
        .iter()
        .map(|&(slot, per_500)| (slot, users * per_500 / 500))
        .collect();
    let converting: usize = counts.iter().map(|(_, n)| n).sum();
    counts.push((StreamSlot::Noise, users - converting));
    counts
}

pub fn generate(config: SyntheticConfig) -> Population {
    let bank = RngBank::new(config.seed);
    let mut journeys = Vec::with_capacity(config.users);
    let mut next_user = 1usize;

    for (slot, count) in scenario_counts(config.users) {
        let mut rng = bank.for_stream(slot);
        for _ in 0..count {
            let user_id = format!("u-{next_user:06}");
            next_user += 1;
            let base = anchor() - Duration::days(rng.range_inclusive(1, 30));
            journeys.push(Journey::new(user_id, scenario_touchpoints(slot, base, &mut rng)));
        }
    }

    log::info!(
        "synth: seed={} users={} journeys={}",
        config.seed,
        config.users,
        journeys.len()
    );
    Population::new(journeys)
}

fn conversion_value(rng: &mut StreamRng) -> f64 {
    rng.range_inclusive(MIN_CONVERSION_VALUE, MAX_CONVERSION_VALUE) as f64
}

fn scenario_touchpoints(slot: StreamSlot, base: DateTime<Utc>, rng: &mut StreamRng) -> Vec<Touchpoint> {
    let hours = |h: i64| base + Duration::hours(h);
    match slot {
        StreamSlot::PaidThenTelemarketing => vec![
            Touchpoint::touch("Digital Ads", base),
            Touchpoint::touch("Push", hours(rng.range_inclusive(2, 24))),
            Touchpoint::touch("Telemarketing", hours(rng.range_inclusive(25, 47))),
            Touchpoint::conversion(
                "Telemarketing",
                hours(rng.range_inclusive(48, 50)),
                conversion_value(rng),
            ),
        ],
        StreamSlot::StoriesNavigation => {
            let converted_at = hours(24);
            vec![
                Touchpoint::touch("Digital Ads", base),
                Touchpoint::touch("Stories", hours(rng.range_inclusive(5, 23))),
                Touchpoint::touch(
                    "Stories",
                    converted_at - Duration::seconds(rng.range_inclusive(20, 60)),
                ),
                Touchpoint::conversion("Stories", converted_at, conversion_value(rng)),
            ]
        }
        StreamSlot::SmsThenPush => vec![
            Touchpoint::touch("SMS", base),
            Touchpoint::touch("Push", hours(rng.range_inclusive(12, 47))),
            Touchpoint::conversion(
                "Push",
                hours(rng.range_inclusive(48, 72)),
                conversion_value(rng),
            ),
        ],
        StreamSlot::StoriesThenTelemarketing => vec![
            Touchpoint::touch("Digital Ads", base),
            Touchpoint::touch("Stories", hours(rng.range_inclusive(6, 24))),
            Touchpoint::touch("Telemarketing", hours(rng.range_inclusive(25, 47))),
            Touchpoint::conversion(
                "Telemarketing",
                hours(rng.range_inclusive(48, 72)),
                conversion_value(rng),
            ),
        ],
        StreamSlot::Noise => {
            let touches = rng.range_inclusive(1, 4);
            let step = rng.range_inclusive(1, 24);
            (0..touches)
                .map(|i| Touchpoint::touch(*rng.pick(&CHANNELS), hours(i * step)))
                .collect()
        }
    }
}
