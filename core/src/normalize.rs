//! Journey normalizer — collapses immediately repeated channels.
//!
//! `[A, A, B, A]` becomes `[A, B, A]`. Non-consecutive repeats survive.

use crate::{journey::Touchpoint, types::ChannelId};

pub fn normalize(channels: &[ChannelId]) -> Vec<ChannelId> {
    let mut out = channels.to_vec();
    out.dedup();
    out
}

/// Touchpoint form of [`normalize`]. Each run keeps its first touchpoint,
/// so the surviving timestamp is the earliest contact in the run.
pub fn normalize_touchpoints(path: &[Touchpoint]) -> Vec<Touchpoint> {
    let mut out = path.to_vec();
    out.dedup_by(|later, earlier| later.channel == earlier.channel);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn seq(items: &[&str]) -> Vec<ChannelId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn collapses_only_consecutive_runs() {
        assert_eq!(normalize(&seq(&["A", "A", "B", "A"])), seq(&["A", "B", "A"]));
        assert_eq!(normalize(&seq(&["A", "A", "A"])), seq(&["A"]));
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            seq(&["A", "B", "B", "C", "C", "C", "A", "A"]),
            seq(&["X"]),
            seq(&["X", "Y", "X", "Y"]),
            seq(&[]),
        ];
        for input in &inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn touchpoint_runs_keep_earliest_contact() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
        let path = vec![
            Touchpoint::touch("Push", t0),
            Touchpoint::touch("Push", t1),
            Touchpoint::touch("SMS", t2),
        ];
        let out = normalize_touchpoints(&path);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timestamp, t0);
        assert_eq!(out[1].channel, "SMS");
    }
}
