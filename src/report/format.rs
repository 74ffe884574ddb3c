//! Formatted terminal output for the CLI front-end.
//!
//! We keep formatting code in one place so:
//! - the merge/classification code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! Percentages are rounded to one decimal here and nowhere earlier; the
//! summaries carry full precision until this boundary.

use crate::app::pipeline::{DailyRun, HistoryRun};
use crate::data::api::{ComplianceStats, CurrentStats, DerivedMetric, MetricStat};
use crate::domain::{
    ComplianceStatus, ComplianceSummary, DateRange, KpiGrade, HUMIDITY_BAND, LIGHT_BAND,
    TEMPERATURE_BAND,
};

/// Absent values render as a dash, never as zero.
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

pub fn fmt_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.1} %"),
        None => "no data".to_string(),
    }
}

pub fn fmt_summary(summary: &ComplianceSummary) -> String {
    format!("{} (n={})", fmt_pct(summary.within_pct), summary.total)
}

fn grade_label(grade: KpiGrade) -> &'static str {
    match grade {
        KpiGrade::Good => "good",
        KpiGrade::Mid => "mixed",
        KpiGrade::Bad => "poor",
        KpiGrade::Neutral => "no data",
    }
}

/// Format the latest readings as text cards.
pub fn format_current(stats: &CurrentStats) -> String {
    let mut out = String::new();

    out.push_str("=== Classroom conditions — latest readings ===\n");

    let card = |out: &mut String, title: &str, metric: &Option<DerivedMetric>, hint: &str| {
        let (value, unit, status) = match metric {
            Some(m) => (
                fmt_opt(m.value, 1),
                m.unit.clone().unwrap_or_default(),
                ComplianceStatus::from_wire(m.status.as_deref()),
            ),
            None => (
                "-".to_string(),
                String::new(),
                ComplianceStatus::NoData,
            ),
        };
        out.push_str(&format!(
            "{title:<28} {value:>8} {unit:<4} [{}]  {hint}\n",
            status.display_name()
        ));
    };

    card(
        &mut out,
        "Temperature (BME680)",
        &stats.derived.temperature,
        "ASHRAE 23-27 °C",
    );
    card(
        &mut out,
        "Relative humidity (BME680)",
        &stats.derived.humidity,
        "recommended 40-60 %",
    );
    card(
        &mut out,
        "Illuminance (BH1750)",
        &stats.derived.light,
        "ISO 8995 300-500 lux",
    );
    card(
        &mut out,
        "Pressure",
        &stats.derived.pressure,
        "informative only",
    );

    let last = |reading: &Option<crate::data::api::LatestReading>| {
        reading
            .as_ref()
            .and_then(|r| r.created_at.clone())
            .unwrap_or_else(|| "no readings yet".to_string())
    };
    out.push_str(&format!(
        "\nLast BME680 reading: {}\nLast DHT22+BH1750 reading: {}\n",
        last(&stats.sources.bme_latest),
        last(&stats.sources.dht_latest),
    ));

    out
}

/// Format the merged daily table plus its compliance summary.
pub fn format_daily(run: &DailyRun) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Daily averages ({}) ===\n", run.range));

    if run.rows.is_empty() {
        out.push_str("No data in the selected range.\n");
        return out;
    }

    out.push_str(&format!(
        "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>10}\n",
        "date", "bme °C", "dht °C", "bme %RH", "dht %RH", "lux", "hPa"
    ));
    out.push_str(&format!(
        "{:-<12} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9} {:-<10}\n",
        "", "", "", "", "", "", ""
    ));
    for row in &run.rows {
        out.push_str(&format!(
            "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>10}\n",
            row.date,
            fmt_opt(row.bme_avg_temp, 1),
            fmt_opt(row.dht_avg_temp, 1),
            fmt_opt(row.bme_avg_hum, 1),
            fmt_opt(row.dht_avg_hum, 1),
            fmt_opt(row.dht_avg_lux, 0),
            fmt_opt(row.bme_avg_press, 1),
        ));
    }

    out.push_str("\nDays with the daily average inside the recommended band:\n");
    let s = &run.summary;
    out.push_str(&format!(
        "- temperature : BME680 {} | DHT22 {}\n",
        fmt_summary(&s.bme_temp),
        fmt_summary(&s.dht_temp),
    ));
    out.push_str(&format!(
        "- humidity    : BME680 {} | DHT22 {}\n",
        fmt_summary(&s.bme_hum),
        fmt_summary(&s.dht_hum),
    ));
    out.push_str(&format!("- light       : {}\n", fmt_summary(&s.light)));
    out.push_str(&format!(
        "- temp + hum  : {} (both within simultaneously)\n",
        fmt_summary(&s.both),
    ));

    out
}

/// Format the backend's compliance percentages with interpretation.
pub fn format_compliance(stats: &ComplianceStats, range: &DateRange) -> String {
    let th = stats.temperature_humidity.as_ref();
    let light = stats.light.as_ref();

    let temp_ok = th.and_then(|t| t.temp_ok_pct);
    let hum_ok = th.and_then(|t| t.hum_ok_pct);
    let both_ok = th.and_then(|t| t.both_ok_pct);
    let light_ok = light.and_then(|l| l.light_ok_pct);

    let mut out = String::new();
    out.push_str(&format!("=== Range compliance ({range}) ===\n"));
    out.push_str(&format!(
        "Based on {} BME680 readings and {} light readings.\n\n",
        th.and_then(|t| t.total).unwrap_or(0),
        light.and_then(|l| l.total).unwrap_or(0),
    ));

    let kpi = |out: &mut String, label: &str, pct: Option<f64>, hint: &str| {
        out.push_str(&format!(
            "{label:<14} {:>9}  ({})  {hint}\n",
            fmt_pct(pct),
            grade_label(KpiGrade::from_pct(pct)),
        ));
    };
    kpi(
        &mut out,
        "temperature",
        temp_ok,
        &format!(
            "readings in {}-{} °C",
            TEMPERATURE_BAND.min, TEMPERATURE_BAND.max
        ),
    );
    kpi(
        &mut out,
        "humidity",
        hum_ok,
        &format!("readings in {}-{} %", HUMIDITY_BAND.min, HUMIDITY_BAND.max),
    );
    kpi(&mut out, "temp + hum", both_ok, "simultaneous comfort");
    kpi(
        &mut out,
        "light",
        light_ok,
        &format!("readings in {}-{} lux", LIGHT_BAND.min, LIGHT_BAND.max),
    );

    out.push('\n');
    for line in interpretation_lines(temp_ok, hum_ok, both_ok, light_ok) {
        out.push_str(&format!("- {line}\n"));
    }

    out
}

/// Interpretive sentences for the compliance KPIs, shared with the report.
pub fn interpretation_lines(
    temp_ok: Option<f64>,
    hum_ok: Option<f64>,
    both_ok: Option<f64>,
    light_ok: Option<f64>,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);

    lines.push(match temp_ok {
        Some(p) => format!(
            "The classroom temperature stayed inside the recommended band \
             ({}-{} °C) for roughly {p:.1} % of the analyzed period.",
            TEMPERATURE_BAND.min, TEMPERATURE_BAND.max
        ),
        None => "There is not yet enough temperature data for this range.".to_string(),
    });

    lines.push(match hum_ok {
        Some(p) => format!(
            "Relative humidity remained between {} and {} % for about {p:.1} % \
             of the period, which matters for thermal comfort and health.",
            HUMIDITY_BAND.min, HUMIDITY_BAND.max
        ),
        None => "There is not enough humidity data to compute compliance.".to_string(),
    });

    lines.push(match both_ok {
        Some(p) => format!(
            "Temperature and humidity were simultaneously within their comfort \
             bands for roughly {p:.1} % of the time, a direct indicator of \
             environmental quality for learning.",
        ),
        None => {
            "The combined temperature + humidity metric could not be evaluated for this range."
                .to_string()
        }
    });

    lines.push(match light_ok {
        Some(p) => format!(
            "Illuminance measured by the BH1750 sat inside the classroom \
             reference band ({}-{} lux) for about {p:.1} % of the time; the \
             rest was below or above the recommendation, which can affect \
             visual ergonomics.",
            LIGHT_BAND.min, LIGHT_BAND.max
        ),
        None => "There is not enough illuminance data to evaluate compliance.".to_string(),
    });

    lines
}

/// Format the per-day history listing for both sensor sets.
pub fn format_history(run: &HistoryRun) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Daily history ({}) ===\n", run.range));

    let s = &run.summary;
    out.push_str("Share of days inside the recommended band:\n");
    out.push_str(&format!(
        "- BME680 temp {} | BME680 hum {} | DHT22 temp {} | DHT22 hum {} | light {}\n\n",
        fmt_summary(&s.bme_temp),
        fmt_summary(&s.bme_hum),
        fmt_summary(&s.dht_temp),
        fmt_summary(&s.dht_hum),
        fmt_summary(&s.light),
    ));

    let stat_line = |out: &mut String, label: &str, stat: &Option<MetricStat>, decimals: usize| {
        let Some(stat) = stat else {
            out.push_str(&format!("    {label:<12} -\n"));
            return;
        };
        out.push_str(&format!(
            "    {label:<12} avg {} (min {}, max {}) [{}]\n",
            fmt_opt(stat.avg, decimals),
            fmt_opt(stat.min, decimals),
            fmt_opt(stat.max, decimals),
            ComplianceStatus::from_wire(stat.status.as_deref()).display_name(),
        ));
    };

    out.push_str("BME680 — temperature, humidity, pressure\n");
    if run.bme_days.is_empty() {
        out.push_str("  (no days in range)\n");
    }
    for day in &run.bme_days {
        out.push_str(&format!(
            "  {} — {} readings\n",
            day.date,
            day.count.unwrap_or(0)
        ));
        stat_line(&mut out, "temperature", &day.temperature, 2);
        stat_line(&mut out, "humidity", &day.humidity, 2);
        stat_line(&mut out, "pressure", &day.pressure, 2);
    }

    out.push_str("\nDHT22 + BH1750 — temperature, humidity, illuminance\n");
    if run.dht_days.is_empty() {
        out.push_str("  (no days in range)\n");
    }
    for day in &run.dht_days {
        out.push_str(&format!(
            "  {} — {} readings\n",
            day.date,
            day.count.unwrap_or(0)
        ));
        stat_line(&mut out, "temperature", &day.temperature, 2);
        stat_line(&mut out, "humidity", &day.humidity, 2);
        stat_line(&mut out, "light", &day.light, 2);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_daily_run;
    use crate::data::api::{BmeDailyAvg, DailyStats, DhtLightDailyAvg};
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        }
    }

    #[test]
    fn fmt_opt_renders_dash_for_absent() {
        assert_eq!(fmt_opt(None, 1), "-");
        assert_eq!(fmt_opt(Some(25.04), 1), "25.0");
        assert_eq!(fmt_opt(Some(312.6), 0), "313");
    }

    #[test]
    fn fmt_pct_rounds_to_one_decimal() {
        assert_eq!(fmt_pct(Some(100.0 / 3.0)), "33.3 %");
        assert_eq!(fmt_pct(None), "no data");
    }

    #[test]
    fn daily_table_shows_dashes_for_one_sided_dates() {
        let payload = DailyStats {
            range: None,
            bme: vec![BmeDailyAvg {
                date: "2025-01-01".into(),
                avg_temp: Some(25.0),
                avg_hum: Some(50.0),
                avg_press: Some(779.0),
            }],
            dht_light: vec![DhtLightDailyAvg {
                date: "2025-01-02".into(),
                avg_temp: Some(24.0),
                avg_hum: Some(45.0),
                avg_lux: Some(400.0),
            }],
        };
        let out = format_daily(&build_daily_run(&range(), &payload));
        let day2 = out.lines().find(|l| l.starts_with("2025-01-02")).unwrap();
        // BME columns for the DHT-only day are dashes, not zeros.
        assert!(day2.contains(" - "));
        assert!(!day2.contains("0.0"));
    }

    #[test]
    fn compliance_output_reports_no_data() {
        let out = format_compliance(&ComplianceStats::default(), &range());
        assert!(out.contains("no data"));
        assert!(out.contains("not yet enough temperature data"));
    }

    #[test]
    fn interpretation_uses_percentages_when_present() {
        let lines = interpretation_lines(Some(88.46), None, Some(50.0), None);
        assert!(lines[0].contains("88.5 %"));
        assert!(lines[1].contains("not enough humidity data"));
        assert!(lines[2].contains("50.0 %"));
    }
}
