//! Keyed full-outer-join of the two sensor sources' daily series.
//!
//! The backend reports per-day averages independently for the BME680 and the
//! DHT22+BH1750 set, each keyed by a `YYYY-MM-DD` string. Charts and tables
//! want one row per distinct date with both sides on it, so we join here and
//! let absent sides stay `None`.

use std::collections::BTreeMap;

use crate::data::api::{BmeDailyAvg, DhtLightDailyAvg};
use crate::domain::MergedDailyRow;

/// Full outer join of two slices, keyed by an ordered key.
///
/// One output row per distinct key appearing on either side, ascending by
/// key. When both sides carry the same key, both setters run on the same
/// row. Keys are unique within each input; a duplicate key on one side
/// overwrites that side's fields on the shared row.
pub fn full_outer_join<K, L, R, Row>(
    left: &[L],
    right: &[R],
    key_left: impl Fn(&L) -> K,
    key_right: impl Fn(&R) -> K,
    mut init: impl FnMut(&K) -> Row,
    mut set_left: impl FnMut(&mut Row, &L),
    mut set_right: impl FnMut(&mut Row, &R),
) -> Vec<Row>
where
    K: Ord + Clone,
{
    let mut rows: BTreeMap<K, Row> = BTreeMap::new();

    for item in left {
        let key = key_left(item);
        let row = rows.entry(key.clone()).or_insert_with(|| init(&key));
        set_left(row, item);
    }
    for item in right {
        let key = key_right(item);
        let row = rows.entry(key.clone()).or_insert_with(|| init(&key));
        set_right(row, item);
    }

    rows.into_values().collect()
}

/// Merge the two per-day average series into one ordered table.
///
/// Lexicographic ordering of the `YYYY-MM-DD` keys is chronological, so the
/// output is ascending by date with no duplicate dates regardless of input
/// order. Rows exist only for dates present in at least one source.
pub fn merge_daily(bme: &[BmeDailyAvg], dht_light: &[DhtLightDailyAvg]) -> Vec<MergedDailyRow> {
    full_outer_join(
        bme,
        dht_light,
        |b| b.date.clone(),
        |d| d.date.clone(),
        |date| MergedDailyRow {
            date: date.clone(),
            ..MergedDailyRow::default()
        },
        |row, b| {
            row.bme_avg_temp = b.avg_temp;
            row.bme_avg_hum = b.avg_hum;
            row.bme_avg_press = b.avg_press;
        },
        |row, d| {
            row.dht_avg_temp = d.avg_temp;
            row.dht_avg_hum = d.avg_hum;
            row.dht_avg_lux = d.avg_lux;
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bme(date: &str, temp: f64) -> BmeDailyAvg {
        BmeDailyAvg {
            date: date.to_string(),
            avg_temp: Some(temp),
            avg_hum: Some(50.0),
            avg_press: Some(780.0),
        }
    }

    fn dht(date: &str, temp: f64) -> DhtLightDailyAvg {
        DhtLightDailyAvg {
            date: date.to_string(),
            avg_temp: Some(temp),
            avg_hum: Some(48.0),
            avg_lux: Some(350.0),
        }
    }

    #[test]
    fn empty_inputs_produce_empty_output() {
        assert!(merge_daily(&[], &[]).is_empty());
    }

    #[test]
    fn one_sided_dates_keep_other_side_absent() {
        let rows = merge_daily(&[bme("2025-01-01", 25.0)], &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bme_avg_temp, Some(25.0));
        assert_eq!(rows[0].dht_avg_temp, None);
        assert_eq!(rows[0].dht_avg_lux, None);

        let rows = merge_daily(&[], &[dht("2025-01-02", 21.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bme_avg_temp, None);
        assert_eq!(rows[0].dht_avg_temp, Some(21.0));
    }

    #[test]
    fn shared_dates_carry_both_sides_unmodified() {
        let rows = merge_daily(&[bme("2025-01-01", 25.3)], &[dht("2025-01-01", 24.8)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2025-01-01");
        assert_eq!(rows[0].bme_avg_temp, Some(25.3));
        assert_eq!(rows[0].bme_avg_press, Some(780.0));
        assert_eq!(rows[0].dht_avg_temp, Some(24.8));
        assert_eq!(rows[0].dht_avg_lux, Some(350.0));
    }

    #[test]
    fn output_sorted_ascending_regardless_of_input_order() {
        let rows = merge_daily(
            &[bme("2025-01-03", 25.0), bme("2025-01-01", 24.0)],
            &[dht("2025-01-02", 23.0), dht("2025-01-01", 22.0)],
        );
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-01", "2025-01-02", "2025-01-03"]);
    }

    #[test]
    fn two_source_scenario() {
        let rows = merge_daily(
            &[bme("2025-01-01", 25.0)],
            &[dht("2025-01-01", 26.0), dht("2025-01-02", 20.0)],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2025-01-01");
        assert_eq!(rows[0].bme_avg_temp, Some(25.0));
        assert_eq!(rows[0].dht_avg_temp, Some(26.0));
        assert_eq!(rows[1].date, "2025-01-02");
        assert_eq!(rows[1].bme_avg_temp, None);
        assert_eq!(rows[1].dht_avg_temp, Some(20.0));
    }

    #[test]
    fn join_helper_is_key_generic() {
        let left = [(1u32, "a"), (3, "c")];
        let right = [(2u32, "B"), (3, "C")];
        let rows = full_outer_join(
            &left,
            &right,
            |l| l.0,
            |r| r.0,
            |k| (*k, None::<&str>, None::<&str>),
            |row, l| row.1 = Some(l.1),
            |row, r| row.2 = Some(r.1),
        );
        assert_eq!(
            rows,
            vec![
                (1, Some("a"), None),
                (2, None, Some("B")),
                (3, Some("c"), Some("C")),
            ]
        );
    }
}
