//! Shared fetch-then-process cycles used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> merge the two sources -> classify -> summarize
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every run rebuilds its outputs from the fetched snapshot; nothing here is
//! mutated in place after construction.

use crate::data::api::{BmeDayStat, DailyStats, DhtLightDayStat, StatsClient};
use crate::domain::{
    merge_daily, summarize, summarize_both, ComplianceSummary, DailySummary, DateRange,
    MergedDailyRow, HUMIDITY_BAND, LIGHT_BAND, TEMPERATURE_BAND,
};
use crate::error::AppError;

/// Merged daily table plus client-side compliance summaries.
#[derive(Debug, Clone)]
pub struct DailyRun {
    pub range: DateRange,
    pub rows: Vec<MergedDailyRow>,
    pub summary: DailySummary,
}

/// Fetch `/stats/daily` and build the merged run.
pub fn run_daily(client: &StatsClient, range: &DateRange) -> Result<DailyRun, AppError> {
    let payload = client.daily(range)?;
    Ok(build_daily_run(range, &payload))
}

/// Process step split from the fetch so callers holding a payload can
/// rebuild without another request.
pub fn build_daily_run(range: &DateRange, payload: &DailyStats) -> DailyRun {
    let rows = merge_daily(&payload.bme, &payload.dht_light);
    let summary = summarize_rows(&rows);
    DailyRun {
        range: *range,
        rows,
        summary,
    }
}

/// Per-metric within-range shares over the merged daily averages.
///
/// One sample per day per metric; days where a metric is absent drop out of
/// that metric's denominator. The combined metric pairs the BME680
/// temperature and humidity of the same day.
pub fn summarize_rows(rows: &[MergedDailyRow]) -> DailySummary {
    DailySummary {
        bme_temp: summarize(rows.iter().map(|r| (r.bme_avg_temp, TEMPERATURE_BAND))),
        dht_temp: summarize(rows.iter().map(|r| (r.dht_avg_temp, TEMPERATURE_BAND))),
        bme_hum: summarize(rows.iter().map(|r| (r.bme_avg_hum, HUMIDITY_BAND))),
        dht_hum: summarize(rows.iter().map(|r| (r.dht_avg_hum, HUMIDITY_BAND))),
        light: summarize(rows.iter().map(|r| (r.dht_avg_lux, LIGHT_BAND))),
        both: summarize_both(rows.iter().map(|r| {
            (
                (r.bme_avg_temp, TEMPERATURE_BAND),
                (r.bme_avg_hum, HUMIDITY_BAND),
            )
        })),
    }
}

/// Per-day listings for both sensor sets plus day-share summaries.
#[derive(Debug, Clone)]
pub struct HistoryRun {
    pub range: DateRange,
    pub bme_days: Vec<BmeDayStat>,
    pub dht_days: Vec<DhtLightDayStat>,
    pub summary: HistorySummary,
}

/// Share of days whose daily average sits inside the recommended band,
/// reclassified here from the averages rather than trusting the per-day
/// status tags.
#[derive(Debug, Clone)]
pub struct HistorySummary {
    pub bme_temp: ComplianceSummary,
    pub bme_hum: ComplianceSummary,
    pub dht_temp: ComplianceSummary,
    pub dht_hum: ComplianceSummary,
    pub light: ComplianceSummary,
}

/// Fetch both `dayle-stats` listings and build the history run.
pub fn run_history(client: &StatsClient, range: &DateRange) -> Result<HistoryRun, AppError> {
    let bme_days = client.history_bme(range)?;
    let dht_days = client.history_dht_light(range)?;
    Ok(build_history_run(range, bme_days, dht_days))
}

pub fn build_history_run(
    range: &DateRange,
    bme_days: Vec<BmeDayStat>,
    dht_days: Vec<DhtLightDayStat>,
) -> HistoryRun {
    let avg = |stat: &Option<crate::data::api::MetricStat>| stat.as_ref().and_then(|s| s.avg);

    let summary = HistorySummary {
        bme_temp: summarize(
            bme_days
                .iter()
                .map(|d| (avg(&d.temperature), TEMPERATURE_BAND)),
        ),
        bme_hum: summarize(bme_days.iter().map(|d| (avg(&d.humidity), HUMIDITY_BAND))),
        dht_temp: summarize(
            dht_days
                .iter()
                .map(|d| (avg(&d.temperature), TEMPERATURE_BAND)),
        ),
        dht_hum: summarize(dht_days.iter().map(|d| (avg(&d.humidity), HUMIDITY_BAND))),
        light: summarize(dht_days.iter().map(|d| (avg(&d.light), LIGHT_BAND))),
    };

    HistoryRun {
        range: *range,
        bme_days,
        dht_days,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::api::{BmeDailyAvg, DhtLightDailyAvg, MetricStat};
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        }
    }

    #[test]
    fn daily_run_merges_and_summarizes() {
        let payload = DailyStats {
            range: None,
            bme: vec![
                BmeDailyAvg {
                    date: "2025-01-01".into(),
                    avg_temp: Some(25.0),
                    avg_hum: Some(50.0),
                    avg_press: Some(779.0),
                },
                BmeDailyAvg {
                    date: "2025-01-02".into(),
                    avg_temp: Some(30.0),
                    avg_hum: Some(50.0),
                    avg_press: None,
                },
            ],
            dht_light: vec![DhtLightDailyAvg {
                date: "2025-01-03".into(),
                avg_temp: Some(24.0),
                avg_hum: None,
                avg_lux: Some(400.0),
            }],
        };

        let run = build_daily_run(&range(), &payload);
        assert_eq!(run.rows.len(), 3);

        // Day 1 within, day 2 above, day 3 has no BME temperature.
        assert_eq!(run.summary.bme_temp.total, 2);
        assert_eq!(run.summary.bme_temp.within_pct, Some(50.0));

        // Light only on day 3, within.
        assert_eq!(run.summary.light.total, 1);
        assert_eq!(run.summary.light.within_pct, Some(100.0));

        // Combined: day 1 both within, day 2 temp above, day 3 excluded.
        assert_eq!(run.summary.both.total, 2);
        assert_eq!(run.summary.both.within_pct, Some(50.0));
    }

    #[test]
    fn empty_payload_yields_empty_run() {
        let run = build_daily_run(&range(), &DailyStats::default());
        assert!(run.rows.is_empty());
        assert_eq!(run.summary.bme_temp.total, 0);
        assert_eq!(run.summary.bme_temp.within_pct, None);
        assert_eq!(run.summary.both.within_pct, None);
    }

    #[test]
    fn history_summary_reclassifies_from_averages() {
        let stat = |avg: f64| {
            Some(MetricStat {
                avg: Some(avg),
                min: None,
                max: None,
                status: None,
            })
        };
        let bme_days = vec![
            BmeDayStat {
                date: "2025-01-01".into(),
                count: Some(288),
                temperature: stat(25.0),
                humidity: stat(45.0),
                pressure: None,
            },
            BmeDayStat {
                date: "2025-01-02".into(),
                count: Some(288),
                temperature: stat(21.0),
                humidity: None,
                pressure: None,
            },
        ];
        let dht_days = vec![DhtLightDayStat {
            date: "2025-01-01".into(),
            count: Some(240),
            temperature: stat(26.0),
            humidity: stat(65.0),
            light: stat(100.0),
        }];

        let run = build_history_run(&range(), bme_days, dht_days);
        assert_eq!(run.summary.bme_temp.total, 2);
        assert_eq!(run.summary.bme_temp.within_pct, Some(50.0));
        assert_eq!(run.summary.bme_hum.total, 1);
        assert_eq!(run.summary.dht_hum.within_pct, Some(0.0));
        assert_eq!(run.summary.light.within_pct, Some(0.0));
    }
}
