//! Normalization of raw provider samples into a uniform hourly [`History`].
//!
//! Every provider adapter funnels through this one pipeline, so the output
//! invariants hold regardless of the upstream: a strictly ascending,
//! deduplicated, gap-free hourly grid with no future timestamps. Samples
//! landing in the same hour bucket are mean-merged (matching an hourly
//! mean-resample), interior gaps are filled by linear interpolation, and the
//! grid never extrapolates past the first or last observed hour.

use crate::types::history::History;
use crate::types::reading::Reading;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const HOUR_SECS: i64 = 3600;

/// Turns raw, possibly unsorted and gappy samples into a normalized history.
///
/// `now` is captured once by the caller so that the future-sample cutoff is
/// consistent across one fetch (and injectable in tests). Samples dated after
/// `now` are discarded before any bucketing.
pub(crate) fn normalize(samples: Vec<Reading>, now: DateTime<Utc>) -> History {
    let mut buckets: BTreeMap<i64, FieldAccumulators> = BTreeMap::new();
    for sample in samples {
        if sample.datetime > now {
            continue;
        }
        let bucket = sample.datetime.timestamp().div_euclid(HOUR_SECS) * HOUR_SECS;
        buckets.entry(bucket).or_default().add(&sample);
    }
    let Some((&first, _)) = buckets.first_key_value() else {
        return History::empty();
    };
    let &last = buckets.last_key_value().map(|(k, _)| k).unwrap_or(&first);

    let hours = ((last - first) / HOUR_SECS + 1) as usize;
    let mut columns: [Vec<Option<f64>>; 6] = std::array::from_fn(|_| Vec::with_capacity(hours));
    let mut timestamps = Vec::with_capacity(hours);
    for i in 0..hours {
        let ts = first + i as i64 * HOUR_SECS;
        timestamps.push(ts);
        let means = buckets.get(&ts).map(FieldAccumulators::means);
        for (column, value) in columns.iter_mut().zip(means.unwrap_or_default()) {
            column.push(value);
        }
    }
    for column in &mut columns {
        interpolate_gaps(column);
    }

    let readings = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let datetime = DateTime::from_timestamp(ts, 0)?;
            let [pm2_5, pm10, no2, o3, so2, co] = columns.each_ref().map(|c| c[i]);
            Some(Reading {
                datetime,
                pm2_5,
                pm10,
                no2,
                o3,
                so2,
                co,
            })
        })
        .collect();
    History::new(readings)
}

/// Per-pollutant running sums for mean-merging samples within one hour bucket.
#[derive(Default)]
struct FieldAccumulators {
    fields: [(f64, u32); 6],
}

impl FieldAccumulators {
    fn add(&mut self, sample: &Reading) {
        let values = [
            sample.pm2_5,
            sample.pm10,
            sample.no2,
            sample.o3,
            sample.so2,
            sample.co,
        ];
        for (acc, value) in self.fields.iter_mut().zip(values) {
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                acc.0 += v;
                acc.1 += 1;
            }
        }
    }

    fn means(&self) -> [Option<f64>; 6] {
        self.fields
            .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
    }
}

/// Fills interior `None` runs by linear interpolation between the nearest
/// known neighbours. Leading and trailing runs are left missing: the series
/// never extrapolates beyond what was observed.
fn interpolate_gaps(values: &mut [Option<f64>]) {
    let mut prev_known: Option<usize> = None;
    for i in 0..values.len() {
        let Some(value) = values[i] else { continue };
        if let Some(p) = prev_known {
            if i - p > 1 {
                let start = values[p].unwrap_or(value);
                let span = (i - p) as f64;
                for (step, slot) in values[p + 1..i].iter_mut().enumerate() {
                    let t = (step + 1) as f64 / span;
                    *slot = Some(start + (value - start) * t);
                }
            }
        }
        prev_known = Some(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::category::AqiCategory;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 4, 6, 0, 0).unwrap()
    }

    fn pm_sample(datetime: DateTime<Utc>, pm2_5: f64) -> Reading {
        Reading {
            pm2_5: Some(pm2_5),
            ..Reading::empty(datetime)
        }
    }

    #[test]
    fn empty_input_gives_empty_history() {
        assert!(normalize(vec![], t0()).is_empty());
    }

    #[test]
    fn two_hour_gap_is_linearly_interpolated() {
        // {t0: 25, t0+2h: 65} -> three hourly points with the middle one
        // interpolated to 45, classified Good / Satisfactory / Moderate.
        let samples = vec![
            pm_sample(t0(), 25.0),
            pm_sample(t0() + Duration::hours(2), 65.0),
        ];
        let history = normalize(samples, t0() + Duration::hours(3));
        assert_eq!(history.len(), 3);
        let readings = history.readings();
        assert_eq!(readings[0].datetime, t0());
        assert_eq!(readings[1].datetime, t0() + Duration::hours(1));
        assert_eq!(readings[2].datetime, t0() + Duration::hours(2));
        assert_eq!(readings[1].pm2_5, Some(45.0));
        let categories: Vec<AqiCategory> = readings
            .iter()
            .map(|r| AqiCategory::from_pm25(r.pm2_5.unwrap()))
            .collect();
        assert_eq!(
            categories,
            [
                AqiCategory::Good,
                AqiCategory::Satisfactory,
                AqiCategory::Moderate
            ]
        );
    }

    #[test]
    fn future_samples_are_dropped() {
        let now = t0() + Duration::minutes(30);
        let samples = vec![
            pm_sample(t0(), 10.0),
            pm_sample(t0() + Duration::hours(1), 20.0),
            pm_sample(t0() + Duration::hours(2), 30.0),
        ];
        let history = normalize(samples, now);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().datetime, t0());
    }

    #[test]
    fn duplicate_hour_samples_are_mean_merged() {
        let samples = vec![
            pm_sample(t0(), 10.0),
            pm_sample(t0() + Duration::minutes(20), 30.0),
        ];
        let history = normalize(samples, t0() + Duration::hours(1));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().pm2_5, Some(20.0));
    }

    #[test]
    fn unsorted_input_comes_out_ascending_and_unique() {
        let samples = vec![
            pm_sample(t0() + Duration::hours(3), 40.0),
            pm_sample(t0(), 10.0),
            pm_sample(t0() + Duration::hours(1), 20.0),
            pm_sample(t0() + Duration::hours(3), 40.0),
        ];
        let history = normalize(samples, t0() + Duration::hours(4));
        let times: Vec<_> = history.readings().iter().map(|r| r.datetime).collect();
        assert_eq!(history.len(), 4);
        assert!(times.windows(2).all(|w| w[1] - w[0] == Duration::hours(1)));
    }

    #[test]
    fn sub_hour_timestamps_snap_to_the_hour_floor() {
        let samples = vec![pm_sample(t0() + Duration::minutes(42), 12.0)];
        let history = normalize(samples, t0() + Duration::hours(1));
        assert_eq!(history.latest().unwrap().datetime, t0());
    }

    #[test]
    fn edges_are_not_extrapolated() {
        // pm10 is only known in the middle of the window; pm2_5 spans it.
        let mut first = pm_sample(t0(), 10.0);
        first.pm10 = None;
        let mut middle = pm_sample(t0() + Duration::hours(1), 20.0);
        middle.pm10 = Some(50.0);
        let mut last = pm_sample(t0() + Duration::hours(2), 30.0);
        last.pm10 = None;
        let history = normalize(vec![first, middle, last], t0() + Duration::hours(3));
        let readings = history.readings();
        assert_eq!(readings[0].pm10, None);
        assert_eq!(readings[1].pm10, Some(50.0));
        assert_eq!(readings[2].pm10, None);
    }

    #[test]
    fn interpolation_is_per_pollutant() {
        let mut first = pm_sample(t0(), 10.0);
        first.co = Some(100.0);
        let middle = pm_sample(t0() + Duration::hours(1), 20.0);
        let mut last = pm_sample(t0() + Duration::hours(2), 30.0);
        last.co = Some(300.0);
        let history = normalize(vec![first, middle, last], t0() + Duration::hours(3));
        assert_eq!(history.readings()[1].co, Some(200.0));
        assert_eq!(history.readings()[1].pm2_5, Some(20.0));
    }

    #[test]
    fn all_future_input_gives_empty_history() {
        let samples = vec![pm_sample(t0() + Duration::hours(5), 10.0)];
        assert!(normalize(samples, t0()).is_empty());
    }
}
