//! HTTP client for the classroom sensor statistics API.
//!
//! The backend owns every aggregate (daily averages, min/max, compliance
//! percentages); this module only fetches and decodes. All payload fields
//! are optional on purpose: a missing or malformed field means "no data"
//! downstream, never zero and never a decode failure.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::DateRange;
use crate::error::AppError;

/// Deployed backend; override with `SENSOR_API_URL`.
pub const DEFAULT_BASE_URL: &str = "https://sensores.angelonesto.com/api";

/// Fixed overall request timeout at the transport boundary.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("SENSOR_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::data(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Latest instantaneous readings with server-side status per metric.
    pub fn current(&self) -> Result<CurrentStats, AppError> {
        self.get_json("/stats/current", &[])
    }

    /// Per-day averages for both sources over an inclusive date range.
    pub fn daily(&self, range: &DateRange) -> Result<DailyStats, AppError> {
        self.get_json(
            "/stats/daily",
            &[("from", range.from_str_key()), ("to", range.to_str_key())],
        )
    }

    /// Precomputed within-range percentages per metric and combined metric.
    pub fn compliance(&self, range: &DateRange) -> Result<ComplianceStats, AppError> {
        self.get_json(
            "/stats/compliance",
            &[("from", range.from_str_key()), ("to", range.to_str_key())],
        )
    }

    /// Per-day BME680 listing with avg/min/max/count and status per metric.
    pub fn history_bme(&self, range: &DateRange) -> Result<Vec<BmeDayStat>, AppError> {
        // The backend route really is spelled "dayle".
        self.get_json(
            "/dayle-stats/daily-bme",
            &[("start", range.from_str_key()), ("end", range.to_str_key())],
        )
    }

    /// Per-day DHT22+BH1750 listing.
    pub fn history_dht_light(&self, range: &DateRange) -> Result<Vec<DhtLightDayStat>, AppError> {
        self.get_json(
            "/dayle-stats/daily-dht-light",
            &[("start", range.from_str_key()), ("end", range.to_str_key())],
        )
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("GET {url} {query:?}");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| AppError::data(format!("Request to {path} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "Request to {path} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::data(format!("Failed to decode {path} response: {e}")))
    }
}

/// Keep only finite numbers; the backend occasionally emits nulls where a
/// sensor dropped out, and JSON has no NaN so a string sneaking in is junk.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// /stats/current

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentStats {
    pub derived: DerivedReadings,
    pub sources: SourceInfo,
}

/// Latest value per metric, already compared against the recommended band
/// by the backend (`status` is its verdict, not ours).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DerivedReadings {
    pub temperature: Option<DerivedMetric>,
    pub humidity: Option<DerivedMetric>,
    pub light: Option<DerivedMetric>,
    pub pressure: Option<DerivedMetric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DerivedMetric {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceInfo {
    pub bme_latest: Option<LatestReading>,
    pub dht_latest: Option<LatestReading>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LatestReading {
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// /stats/daily

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStats {
    pub range: Option<ApiRange>,
    pub bme: Vec<BmeDailyAvg>,
    pub dht_light: Vec<DhtLightDailyAvg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// One BME680 day, keyed by the aggregation id (`_id` is the date string).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BmeDailyAvg {
    #[serde(rename = "_id")]
    pub date: String,
    #[serde(rename = "avgTemp")]
    pub avg_temp: Option<f64>,
    #[serde(rename = "avgHum")]
    pub avg_hum: Option<f64>,
    #[serde(rename = "avgPress")]
    pub avg_press: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DhtLightDailyAvg {
    #[serde(rename = "_id")]
    pub date: String,
    #[serde(rename = "avgTemp")]
    pub avg_temp: Option<f64>,
    #[serde(rename = "avgHum")]
    pub avg_hum: Option<f64>,
    #[serde(rename = "avgLux")]
    pub avg_lux: Option<f64>,
}

// ---------------------------------------------------------------------------
// /stats/compliance

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceStats {
    pub range: Option<ApiRange>,
    pub temperature_humidity: Option<TempHumCompliance>,
    pub light: Option<LightCompliance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TempHumCompliance {
    pub total: Option<u64>,
    pub temp_ok_pct: Option<f64>,
    pub hum_ok_pct: Option<f64>,
    pub both_ok_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LightCompliance {
    pub total: Option<u64>,
    pub light_ok_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// /dayle-stats listings

/// avg/min/max block with the backend's own range verdict.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricStat {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BmeDayStat {
    pub date: String,
    pub count: Option<u64>,
    pub temperature: Option<MetricStat>,
    pub humidity: Option<MetricStat>,
    pub pressure: Option<MetricStat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DhtLightDayStat {
    pub date: String,
    pub count: Option<u64>,
    pub temperature: Option<MetricStat>,
    pub humidity: Option<MetricStat>,
    pub light: Option<MetricStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_payload_decodes_with_missing_fields() {
        let json = r#"{
            "range": {"from": "2025-01-01", "to": "2025-01-05"},
            "bme": [
                {"_id": "2025-01-01", "avgTemp": 25.1, "avgHum": 48.2, "avgPress": 779.5},
                {"_id": "2025-01-02", "avgTemp": 24.0}
            ],
            "dhtLight": [
                {"_id": "2025-01-01", "avgTemp": 24.8, "avgLux": 312.0}
            ]
        }"#;
        let stats: DailyStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.bme.len(), 2);
        assert_eq!(stats.bme[0].date, "2025-01-01");
        assert_eq!(stats.bme[1].avg_hum, None);
        assert_eq!(stats.dht_light[0].avg_hum, None);
        assert_eq!(stats.dht_light[0].avg_lux, Some(312.0));
    }

    #[test]
    fn daily_payload_tolerates_absent_collections() {
        let stats: DailyStats = serde_json::from_str("{}").unwrap();
        assert!(stats.bme.is_empty());
        assert!(stats.dht_light.is_empty());
        assert!(stats.range.is_none());
    }

    #[test]
    fn current_payload_decodes_statuses_as_raw_tags() {
        let json = r#"{
            "derived": {
                "temperature": {"value": 25.4, "unit": "°C", "status": "dentro"},
                "pressure": {"value": 779.0, "unit": "hPa", "status": "sin_dato"}
            },
            "sources": {"bmeLatest": {"createdAt": "2025-01-05T12:00:00Z"}}
        }"#;
        let stats: CurrentStats = serde_json::from_str(json).unwrap();
        let temp = stats.derived.temperature.unwrap();
        assert_eq!(temp.value, Some(25.4));
        assert_eq!(temp.status.as_deref(), Some("dentro"));
        assert!(stats.derived.humidity.is_none());
        assert!(stats.sources.dht_latest.is_none());
    }

    #[test]
    fn compliance_payload_decodes() {
        let json = r#"{
            "temperatureHumidity": {"total": 120, "tempOkPct": 88.5, "humOkPct": 74.0, "bothOkPct": 69.1},
            "light": {"total": 45, "lightOkPct": 12.3}
        }"#;
        let stats: ComplianceStats = serde_json::from_str(json).unwrap();
        let th = stats.temperature_humidity.unwrap();
        assert_eq!(th.total, Some(120));
        assert_eq!(th.both_ok_pct, Some(69.1));
        assert_eq!(stats.light.unwrap().light_ok_pct, Some(12.3));
    }

    #[test]
    fn history_payload_decodes() {
        let json = r#"[{
            "date": "2025-01-01",
            "count": 288,
            "temperature": {"avg": 25.0, "min": 22.1, "max": 27.9, "status": "en_rango"},
            "humidity": {"avg": 55.0, "min": 40.0, "max": 70.0, "status": "en_rango"},
            "pressure": {"avg": 779.0, "min": 778.0, "max": 781.0}
        }]"#;
        let days: Vec<BmeDayStat> = serde_json::from_str(json).unwrap();
        assert_eq!(days[0].count, Some(288));
        let temp = days[0].temperature.as_ref().unwrap();
        assert_eq!(temp.status.as_deref(), Some("en_rango"));
        assert!(days[0].pressure.as_ref().unwrap().status.is_none());
    }

    #[test]
    fn finite_filters_junk() {
        assert_eq!(finite(Some(1.5)), Some(1.5));
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(None), None);
    }
}
