//! Population-level aggregation, top paths, and malformed-journey policy.

use attribution_core::{
    aggregate::{aggregate, aggregate_population, render_path, top_paths},
    config::ModelConfig,
    error::AttributionError,
    journey::{ConvertingJourney, Journey, MalformedJourneyPolicy, Population, Touchpoint},
    models::{LastTouch, UShaped},
    synth::{self, SyntheticConfig},
    types::CREDIT_TOLERANCE,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
}

fn journey(user: &str, channels: &[&str], converts_on: Option<(&str, f64)>) -> Journey {
    let mut touchpoints: Vec<Touchpoint> = channels
        .iter()
        .enumerate()
        .map(|(i, c)| Touchpoint::touch(*c, t0() + Duration::hours(i as i64)))
        .collect();
    if let Some((channel, value)) = converts_on {
        let at = t0() + Duration::hours(channels.len() as i64 + 1);
        touchpoints.push(Touchpoint::conversion(channel, at, value));
    }
    Journey::new(user, touchpoints)
}

fn converting(journeys: &[Journey]) -> Vec<ConvertingJourney> {
    Population::new(journeys.to_vec())
        .prepare(MalformedJourneyPolicy::Abort)
        .unwrap()
        .converting
}

#[test]
fn totals_sum_credits_across_journeys() {
    let journeys = converting(&[
        journey("u-1", &["A", "B", "C"], Some(("C", 1_000.0))),
        journey("u-2", &["B"], Some(("B", 500.0))),
        journey("u-3", &[], Some(("D", 250.0))),
    ]);
    let model = UShaped::from_config(&ModelConfig::default());
    let totals = aggregate(&model, &journeys, 2);

    assert!((totals.get("A") - 400.0).abs() < 1e-9);
    assert!((totals.get("B") - (200.0 + 500.0)).abs() < 1e-9);
    assert!((totals.get("C") - 400.0).abs() < 1e-9);
    assert!((totals.get("D") - 250.0).abs() < 1e-9);
    assert!((totals.total() - 1_750.0).abs() < 1e-9);
}

#[test]
fn noise_journeys_are_excluded() {
    let population = Population::new(vec![
        journey("u-1", &["A"], Some(("A", 100.0))),
        journey("u-2", &["A", "B", "C"], None),
    ]);
    let prepared = population.prepare(MalformedJourneyPolicy::Abort).unwrap();
    assert_eq!(prepared.converting.len(), 1);
    assert_eq!(prepared.noise, 1);

    let totals = aggregate(&LastTouch::unfiltered(), &prepared.converting, 16);
    assert_eq!(totals.total(), 100.0);
}

#[test]
fn shard_size_does_not_change_totals() {
    let population = synth::generate(SyntheticConfig { seed: 7, users: 2_000 });
    let journeys = population.prepare(MalformedJourneyPolicy::Abort).unwrap().converting;
    let model = UShaped::from_config(&ModelConfig::default());

    let reference = aggregate(&model, &journeys, journeys.len());
    for shard_size in [1, 7, 64, 256] {
        let totals = aggregate(&model, &journeys, shard_size);
        assert_eq!(totals.len(), reference.len());
        for (channel, amount) in reference.iter() {
            let got = totals.get(channel);
            assert!(
                (got - amount).abs() <= CREDIT_TOLERANCE * amount.abs(),
                "{channel}: shard_size={shard_size} gave {got}, expected {amount}"
            );
        }
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let population = synth::generate(SyntheticConfig { seed: 11, users: 1_500 });
    let journeys = population.prepare(MalformedJourneyPolicy::Abort).unwrap().converting;
    let model = UShaped::from_config(&ModelConfig::default());

    let first = aggregate(&model, &journeys, 32);
    for _ in 0..5 {
        assert_eq!(aggregate(&model, &journeys, 32), first);
    }
}

#[test]
fn multiple_conversions_abort_the_batch_with_user_id() {
    let mut bad = journey("u-bad", &["A"], Some(("A", 10.0)));
    bad.touchpoints
        .push(Touchpoint::conversion("A", t0() + Duration::days(3), 20.0));
    let population = Population::new(vec![journey("u-ok", &["B"], Some(("B", 5.0))), bad]);

    let err = aggregate_population(&LastTouch::unfiltered(), &population, MalformedJourneyPolicy::Abort, 8)
        .unwrap_err();
    match err {
        AttributionError::MultipleConversions { user_id, count } => {
            assert_eq!(user_id, "u-bad");
            assert_eq!(count, 2);
        }
        other => panic!("expected MultipleConversions, got {other:?}"),
    }
}

#[test]
fn touchpoint_after_conversion_is_malformed() {
    let mut bad = journey("u-late", &["A"], Some(("A", 10.0)));
    bad.touchpoints.push(Touchpoint::touch("B", t0() + Duration::days(10)));

    let err = bad.converting().unwrap_err();
    assert!(matches!(err, AttributionError::ConversionNotLast { .. }));
    assert_eq!(err.user_id(), Some("u-late"));
}

#[test]
fn negative_value_is_malformed() {
    let bad = journey("u-neg", &["A"], Some(("A", -1.0)));
    assert!(matches!(
        bad.converting(),
        Err(AttributionError::NegativeConversionValue { .. })
    ));
}

#[test]
fn skip_and_log_keeps_the_rest_of_the_population() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut bad = journey("u-bad", &["A"], Some(("A", 10.0)));
    bad.touchpoints
        .push(Touchpoint::conversion("A", t0() + Duration::days(3), 20.0));
    let population = Population::new(vec![
        journey("u-1", &["B"], Some(("B", 5.0))),
        bad,
        journey("u-2", &["C"], Some(("C", 7.0))),
    ]);

    let prepared = population.prepare(MalformedJourneyPolicy::SkipAndLog).unwrap();
    assert_eq!(prepared.converting.len(), 2);
    assert_eq!(prepared.skipped.len(), 1);
    assert_eq!(prepared.skipped[0].user_id, "u-bad");

    let totals = aggregate(&LastTouch::unfiltered(), &prepared.converting, 1);
    assert_eq!(totals.get("B"), 5.0);
    assert_eq!(totals.get("C"), 7.0);
    assert_eq!(totals.get("A"), 0.0);
}

#[test]
fn unsorted_touchpoints_are_sorted_before_attribution() {
    let mut j = journey("u-shuffled", &["A", "B", "C"], Some(("C", 1_000.0)));
    j.touchpoints.reverse();
    let cj = j.require_converting().unwrap();
    assert_eq!(cj.channels(), vec!["A", "B", "C"]);
}

#[test]
fn missing_conversion_is_an_error_only_when_required() {
    let j = journey("u-noise", &["A", "B"], None);
    assert!(j.converting().unwrap().is_none());
    assert!(matches!(
        j.require_converting(),
        Err(AttributionError::MissingConversion { .. })
    ));
}

// ── Top paths ─────────────────────────────────────────────────────

#[test]
fn top_paths_rank_by_count_then_first_seen() {
    let journeys = converting(&[
        journey("u-1", &["SMS", "Push"], Some(("Push", 1.0))),
        journey("u-2", &["Digital Ads"], Some(("Push", 1.0))),
        journey("u-3", &["Digital Ads"], Some(("Push", 1.0))),
        journey("u-4", &["SMS", "Push"], Some(("Push", 1.0))),
        journey("u-5", &["Stories"], Some(("Stories", 1.0))),
        journey("u-6", &[], Some(("Telemarketing", 1.0))),
    ]);

    let top = top_paths(&journeys, 10);
    let rendered: Vec<(&str, usize)> = top.iter().map(|p| (p.path.as_str(), p.count)).collect();
    assert_eq!(
        rendered,
        vec![
            ("SMS → Push", 2),
            ("Digital Ads", 2),
            ("Stories", 1),
            ("Direct", 1),
        ]
    );
}

#[test]
fn top_paths_use_raw_unnormalized_sequences() {
    let journeys = converting(&[journey("u-1", &["Push", "Push", "SMS"], Some(("SMS", 1.0)))]);
    assert_eq!(top_paths(&journeys, 5)[0].path, "Push → Push → SMS");
}

#[test]
fn top_paths_truncate_to_n_and_are_stable() {
    let population = synth::generate(SyntheticConfig { seed: 3, users: 1_000 });
    let journeys = population.prepare(MalformedJourneyPolicy::Abort).unwrap().converting;

    let first = top_paths(&journeys, 3);
    assert_eq!(first.len(), 3);
    for _ in 0..5 {
        assert_eq!(top_paths(&journeys, 3), first);
    }
    assert!(first.windows(2).all(|w| w[0].count >= w[1].count));
}

#[test]
fn empty_path_renders_as_direct() {
    assert_eq!(render_path(&[]), "Direct");
    assert_eq!(render_path(&["A".to_string(), "B".to_string()]), "A → B");
}
