//! Research-report assembly and terminal formatting.

pub mod format;

use crate::app::pipeline::{DailyRun, HistoryRun};
use crate::data::api::{ComplianceStats, CurrentStats};
use crate::domain::DateRange;
use format::{fmt_opt, fmt_pct, fmt_summary, interpretation_lines};

/// Everything a report draws on. Sections whose data is absent render an
/// explicit "no data" note instead of being dropped, so an export taken
/// mid-failure still documents what was unavailable.
pub struct ReportInput<'a> {
    pub range: DateRange,
    pub current: Option<&'a CurrentStats>,
    pub daily: Option<&'a DailyRun>,
    pub compliance: Option<&'a ComplianceStats>,
    pub history: Option<&'a HistoryRun>,
}

/// Assemble the multi-section markdown research report.
///
/// The export contract is the markdown file itself; turning it into PDF (or
/// anything else) is left to external tooling.
pub fn build_report(input: &ReportInput<'_>) -> String {
    let mut out = String::new();

    out.push_str("# Classroom environmental conditions — monitoring report\n\n");
    out.push_str(&format!("- analyzed range: {}\n", input.range));
    out.push_str(&format!(
        "- generated: {}\n\n",
        chrono::Local::now().to_rfc3339()
    ));

    out.push_str("## Methodology\n\n");
    out.push_str(
        "Readings come from two independent sensor sets in the classroom: a \
         BME680 (temperature, humidity, pressure) and a DHT22 paired with a \
         BH1750 (backup temperature/humidity and illuminance). The backend \
         aggregates raw readings into daily averages and compliance \
         percentages; this report joins the two daily series by date and \
         compares values against ASHRAE 55 (23-27 °C), the ASHRAE/WHO \
         humidity recommendation (40-60 %), and ISO 8995 illuminance for \
         classrooms (300-500 lux). Percentages are shown next to their \
         sample counts; low-sample periods are flagged by their `n=` rather \
         than excluded.\n\n",
    );

    out.push_str("## Current snapshot\n\n");
    match input.current {
        Some(current) => {
            out.push_str("```text\n");
            out.push_str(&format::format_current(current));
            out.push_str("```\n\n");
        }
        None => out.push_str("No current readings were available at export time.\n\n"),
    }

    out.push_str("## Compliance with international recommendations\n\n");
    match input.compliance {
        Some(stats) => {
            let th = stats.temperature_humidity.as_ref();
            let light = stats.light.as_ref();
            let temp_ok = th.and_then(|t| t.temp_ok_pct);
            let hum_ok = th.and_then(|t| t.hum_ok_pct);
            let both_ok = th.and_then(|t| t.both_ok_pct);
            let light_ok = light.and_then(|l| l.light_ok_pct);

            out.push_str("| metric | within range | samples |\n");
            out.push_str("|---|---|---|\n");
            out.push_str(&format!(
                "| temperature | {} | {} |\n",
                fmt_pct(temp_ok),
                th.and_then(|t| t.total).unwrap_or(0)
            ));
            out.push_str(&format!(
                "| humidity | {} | {} |\n",
                fmt_pct(hum_ok),
                th.and_then(|t| t.total).unwrap_or(0)
            ));
            out.push_str(&format!(
                "| temp + hum | {} | {} |\n",
                fmt_pct(both_ok),
                th.and_then(|t| t.total).unwrap_or(0)
            ));
            out.push_str(&format!(
                "| light | {} | {} |\n\n",
                fmt_pct(light_ok),
                light.and_then(|l| l.total).unwrap_or(0)
            ));

            for line in interpretation_lines(temp_ok, hum_ok, both_ok, light_ok) {
                out.push_str(&format!("- {line}\n"));
            }
            out.push('\n');
        }
        None => out.push_str("Compliance percentages were not available at export time.\n\n"),
    }

    out.push_str("## Daily averages (both sources)\n\n");
    match input.daily {
        Some(run) if !run.rows.is_empty() => {
            out.push_str(
                "| date | BME °C | DHT °C | BME %RH | DHT %RH | lux | hPa |\n\
                 |---|---|---|---|---|---|---|\n",
            );
            for row in &run.rows {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} |\n",
                    row.date,
                    fmt_opt(row.bme_avg_temp, 1),
                    fmt_opt(row.dht_avg_temp, 1),
                    fmt_opt(row.bme_avg_hum, 1),
                    fmt_opt(row.dht_avg_hum, 1),
                    fmt_opt(row.dht_avg_lux, 0),
                    fmt_opt(row.bme_avg_press, 1),
                ));
            }
            let s = &run.summary;
            out.push_str(&format!(
                "\nDays within band — temperature: BME680 {}, DHT22 {}; \
                 humidity: BME680 {}, DHT22 {}; light: {}; \
                 simultaneous temp+hum: {}.\n\n",
                fmt_summary(&s.bme_temp),
                fmt_summary(&s.dht_temp),
                fmt_summary(&s.bme_hum),
                fmt_summary(&s.dht_hum),
                fmt_summary(&s.light),
                fmt_summary(&s.both),
            ));
        }
        _ => out.push_str("No daily data in the selected range.\n\n"),
    }

    out.push_str("## Day-by-day history\n\n");
    match input.history {
        Some(run) => {
            out.push_str("```text\n");
            out.push_str(&format::format_history(run));
            out.push_str("```\n");
        }
        None => out.push_str("The per-day history was not available at export time.\n"),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn report_notes_missing_sections() {
        let input = ReportInput {
            range: DateRange {
                from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            },
            current: None,
            daily: None,
            compliance: None,
            history: None,
        };
        let report = build_report(&input);
        assert!(report.contains("# Classroom environmental conditions"));
        assert!(report.contains("No current readings"));
        assert!(report.contains("No daily data"));
        assert!(report.contains("2025-01-01 → 2025-01-05"));
    }
}
