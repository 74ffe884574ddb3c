//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while reshaping API payloads for display
//! - exported to JSON/CSV
//! - rendered identically by the CLI and the TUI

use chrono::NaiveDate;
use serde::Serialize;

/// A measured quantity exposed by the sensor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    Light,
    Pressure,
}

impl Metric {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Light => "Light",
            Metric::Pressure => "Pressure",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Light => "lux",
            Metric::Pressure => "hPa",
        }
    }

    /// The recommended band for this metric, if one is defined.
    ///
    /// Pressure is informative only (it tracks campus altitude/weather) and
    /// has no comfort band, so it always classifies as no-data.
    pub fn band(self) -> Option<RangeBand> {
        match self {
            Metric::Temperature => Some(TEMPERATURE_BAND),
            Metric::Humidity => Some(HUMIDITY_BAND),
            Metric::Light => Some(LIGHT_BAND),
            Metric::Pressure => None,
        }
    }
}

/// An externally defined recommended `[min, max]` band (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeBand {
    pub min: f64,
    pub max: f64,
}

/// ASHRAE 55 classroom thermal comfort band.
pub const TEMPERATURE_BAND: RangeBand = RangeBand { min: 23.0, max: 27.0 };

/// ASHRAE / WHO recommended relative-humidity band.
pub const HUMIDITY_BAND: RangeBand = RangeBand { min: 40.0, max: 60.0 };

/// ISO 8995 reference illuminance for classrooms.
pub const LIGHT_BAND: RangeBand = RangeBand { min: 300.0, max: 500.0 };

/// Three-state range classification plus an explicit no-data state.
///
/// Always derived, never stored: recomputed from a value and a band on every
/// render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceStatus {
    Within,
    Below,
    Above,
    NoData,
}

impl ComplianceStatus {
    /// Map a server-side status tag to a classification.
    ///
    /// The backend emits Spanish tags, and two vocabularies at that:
    /// `dentro`/`sin_dato` on the current-readings route and
    /// `en_rango`/`sin_datos` on the history routes. Anything unrecognized
    /// (or absent) reads as no-data rather than an error.
    pub fn from_wire(tag: Option<&str>) -> Self {
        match tag {
            Some("dentro") | Some("en_rango") => ComplianceStatus::Within,
            Some("bajo") => ComplianceStatus::Below,
            Some("alto") => ComplianceStatus::Above,
            _ => ComplianceStatus::NoData,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ComplianceStatus::Within => "within range",
            ComplianceStatus::Below => "below range",
            ComplianceStatus::Above => "above range",
            ComplianceStatus::NoData => "no data",
        }
    }
}

/// One row of the merged daily table: per-date averages from both sensor
/// sources. A date present in only one source keeps the other side `None`;
/// absent is never rendered as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedDailyRow {
    pub date: String,
    pub bme_avg_temp: Option<f64>,
    pub bme_avg_hum: Option<f64>,
    pub bme_avg_press: Option<f64>,
    pub dht_avg_temp: Option<f64>,
    pub dht_avg_hum: Option<f64>,
    pub dht_avg_lux: Option<f64>,
}

/// Within-range share for one metric (or one combined metric).
///
/// `within_pct` is `None` when no sample had a defined classification;
/// otherwise it is in `[0, 100]`. Kept at full precision internally —
/// rounding to one decimal happens only at the display boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub total: usize,
    pub within_pct: Option<f64>,
}

/// Client-side compliance summaries over the merged daily table.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub bme_temp: ComplianceSummary,
    pub dht_temp: ComplianceSummary,
    pub bme_hum: ComplianceSummary,
    pub dht_hum: ComplianceSummary,
    pub light: ComplianceSummary,
    /// Temperature and humidity simultaneously within range (BME680 side).
    pub both: ComplianceSummary,
}

/// Traffic-light grade used to color compliance KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiGrade {
    Good,
    Mid,
    Bad,
    Neutral,
}

impl KpiGrade {
    pub fn from_pct(pct: Option<f64>) -> Self {
        match pct {
            None => KpiGrade::Neutral,
            Some(p) if p >= 80.0 => KpiGrade::Good,
            Some(p) if p >= 40.0 => KpiGrade::Mid,
            Some(_) => KpiGrade::Bad,
        }
    }
}

/// Inclusive date range for the daily/compliance/history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// The last `days` days ending today (local time).
    pub fn last_days(days: i64) -> Self {
        let to = chrono::Local::now().date_naive();
        let from = to - chrono::Duration::days(days);
        Self { from, to }
    }

    /// Resolve optional CLI endpoints against the default window.
    pub fn resolve(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let default = Self::last_days(5);
        Self {
            from: from.unwrap_or(default.from),
            to: to.unwrap_or(default.to),
        }
    }

    /// `YYYY-MM-DD` endpoint strings as the API expects them.
    pub fn from_str_key(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_str_key(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.from_str_key(), self.to_str_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_status_accepts_both_vocabularies() {
        assert_eq!(
            ComplianceStatus::from_wire(Some("dentro")),
            ComplianceStatus::Within
        );
        assert_eq!(
            ComplianceStatus::from_wire(Some("en_rango")),
            ComplianceStatus::Within
        );
        assert_eq!(
            ComplianceStatus::from_wire(Some("bajo")),
            ComplianceStatus::Below
        );
        assert_eq!(
            ComplianceStatus::from_wire(Some("alto")),
            ComplianceStatus::Above
        );
        assert_eq!(
            ComplianceStatus::from_wire(Some("sin_dato")),
            ComplianceStatus::NoData
        );
        assert_eq!(
            ComplianceStatus::from_wire(Some("sin_datos")),
            ComplianceStatus::NoData
        );
        assert_eq!(ComplianceStatus::from_wire(None), ComplianceStatus::NoData);
        assert_eq!(
            ComplianceStatus::from_wire(Some("???")),
            ComplianceStatus::NoData
        );
    }

    #[test]
    fn kpi_grade_thresholds() {
        assert_eq!(KpiGrade::from_pct(None), KpiGrade::Neutral);
        assert_eq!(KpiGrade::from_pct(Some(80.0)), KpiGrade::Good);
        assert_eq!(KpiGrade::from_pct(Some(79.9)), KpiGrade::Mid);
        assert_eq!(KpiGrade::from_pct(Some(40.0)), KpiGrade::Mid);
        assert_eq!(KpiGrade::from_pct(Some(39.9)), KpiGrade::Bad);
        assert_eq!(KpiGrade::from_pct(Some(0.0)), KpiGrade::Bad);
    }

    #[test]
    fn pressure_has_no_band() {
        assert!(Metric::Pressure.band().is_none());
        assert_eq!(Metric::Temperature.band(), Some(TEMPERATURE_BAND));
    }

    #[test]
    fn range_resolve_prefers_explicit_endpoints() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let range = DateRange::resolve(Some(from), Some(to));
        assert_eq!(range.from_str_key(), "2025-01-01");
        assert_eq!(range.to_str_key(), "2025-01-31");
    }
}
