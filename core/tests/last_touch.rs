//! Last-touch (baseline and filtered) and first-touch tests.

use attribution_core::{
    journey::{ConvertingJourney, Journey, Touchpoint},
    models::{AttributionModel, FirstTouch, LastTouch, ModelKind},
    navigation::NavigationFilter,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn conversion_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Touchpoints as (channel, seconds before conversion).
fn journey(path: &[(&str, i64)], converts_on: &str, value: f64) -> ConvertingJourney {
    let mut touchpoints: Vec<Touchpoint> = path
        .iter()
        .map(|(c, secs)| Touchpoint::touch(*c, conversion_time() - Duration::seconds(*secs)))
        .collect();
    touchpoints.push(Touchpoint::conversion(converts_on, conversion_time(), value));
    Journey::new("u-1", touchpoints).require_converting().unwrap()
}

fn stories_filter() -> NavigationFilter {
    NavigationFilter::new("Stories", 60.0)
}

#[test]
fn baseline_credits_the_conversion_channel_only() {
    let j = journey(
        &[("Digital Ads", 7_200), ("Push", 3_600), ("SMS", 600)],
        "Telemarketing",
        10_000.0,
    );
    let credits = LastTouch::unfiltered().attribute(&j);

    assert_eq!(credits.len(), 1);
    assert_eq!(credits.get("Telemarketing"), 10_000.0);
    assert_eq!(LastTouch::unfiltered().kind(), ModelKind::LastTouch);
}

#[test]
fn baseline_ignores_navigation_clicks() {
    let j = journey(&[("Digital Ads", 7_200), ("Stories", 30)], "Stories", 8_000.0);
    let credits = LastTouch::unfiltered().attribute(&j);
    assert_eq!(credits.get("Stories"), 8_000.0);
}

#[test]
fn filtered_variant_credits_last_surviving_touchpoint() {
    let j = journey(&[("Digital Ads", 7_200), ("Stories", 30)], "Stories", 8_000.0);
    let model = LastTouch::filtered(stories_filter());
    let credits = model.attribute(&j);

    assert_eq!(model.kind(), ModelKind::LastTouchFiltered);
    assert_eq!(credits.len(), 1);
    assert_eq!(credits.get("Digital Ads"), 8_000.0);
}

#[test]
fn filtered_variant_falls_back_to_conversion_channel() {
    let j = journey(&[("Stories", 45), ("Stories", 15)], "Stories", 5_000.0);
    let credits = LastTouch::filtered(stories_filter()).attribute(&j);
    assert_eq!(credits.get("Stories"), 5_000.0);
}

#[test]
fn filtered_variant_with_no_prior_touchpoints_self_attributes() {
    let j = journey(&[], "Push", 1_234.0);
    let credits = LastTouch::filtered(stories_filter()).attribute(&j);
    assert_eq!(credits.get("Push"), 1_234.0);
}

#[test]
fn first_touch_credits_first_surviving_touchpoint() {
    let j = journey(
        &[("SMS", 9_000), ("SMS", 8_000), ("Push", 600)],
        "Push",
        2_000.0,
    );
    let credits = FirstTouch::new(stories_filter()).attribute(&j);
    assert_eq!(credits.len(), 1);
    assert_eq!(credits.get("SMS"), 2_000.0);
}

#[test]
fn first_touch_falls_back_to_conversion_channel() {
    let j = journey(&[("Stories", 20)], "Telemarketing", 700.0);
    let credits = FirstTouch::new(stories_filter()).attribute(&j);
    assert_eq!(credits.get("Telemarketing"), 700.0);
}
