// src/report/summary.rs

use anyhow::{anyhow, Result};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::collections::HashSet;

use super::age_band::AgeBand;
use crate::schema::LogicalColumn;

/// Per-state figures shown in one report row.
///
/// Percentages are rounded to one decimal. They are NaN when their
/// denominator is zero (no eligible rows, or no banded rows).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateSummary {
    /// Distinct `secondary_member_id` among eligible rows.
    pub total_members: u64,
    /// Share of eligible rows with no usable age group code.
    pub missing_pct: f64,
    /// Share of banded rows per [`AgeBand`], indexed by `AgeBand::index`.
    pub band_pct: [f64; 3],
}

impl StateSummary {
    pub fn band(&self, band: AgeBand) -> f64 {
        self.band_pct[band.index()]
    }
}

/// Round half-to-even at one decimal, like numpy's `round(1)`.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

fn column_as<'a, T: 'static>(batch: &'a RecordBatch, col: LogicalColumn) -> Result<&'a T> {
    batch
        .column(col.index())
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("column `{}` has unexpected type", col.name()))
}

/// Summarize the rows of one state, spread over any number of batches in
/// the eligibility schema.
///
/// Rows whose missing-eligibility flag is not exactly 0 (including null)
/// are placeholder records and are dropped before anything is counted.
pub fn summarize_state(rows: &[RecordBatch]) -> Result<StateSummary> {
    let mut eligible = 0u64;
    let mut missing = 0u64;
    let mut band_counts = [0u64; 3];
    let mut members: HashSet<&str> = HashSet::new();

    for batch in rows {
        let flags = column_as::<Float64Array>(batch, LogicalColumn::MissingEligibilityFlag)?;
        let codes = column_as::<Float64Array>(batch, LogicalColumn::AgeGroupCode)?;
        let sids = column_as::<StringArray>(batch, LogicalColumn::SecondaryMemberId)?;

        for i in 0..batch.num_rows() {
            if flags.is_null(i) || flags.value(i) != 0.0 {
                continue;
            }
            eligible += 1;

            if sids.is_valid(i) {
                members.insert(sids.value(i));
            }

            if codes.is_null(i) || codes.value(i).is_nan() {
                missing += 1;
            } else if let Some(band) = AgeBand::classify(codes.value(i)) {
                band_counts[band.index()] += 1;
            }
        }
    }

    let banded: u64 = band_counts.iter().sum();
    let band_pct = band_counts.map(|n| round1(n as f64 / banded as f64 * 100.0));

    Ok(StateSummary {
        total_members: members.len() as u64,
        missing_pct: round1(missing as f64 / eligible as f64 * 100.0),
        band_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{EligibilityRecord, EligibilityTable};

    fn rec(code: Option<&str>, flag: Option<i64>, sid: Option<&str>) -> EligibilityRecord {
        EligibilityRecord {
            member_id: sid.map(|s| format!("bene-{}", s)),
            state_code: Some("CA".to_string()),
            age: None,
            age_group_code: code.map(str::to_string),
            missing_eligibility_flag: flag,
            secondary_member_id: sid.map(str::to_string),
        }
    }

    fn summarize(records: &[EligibilityRecord]) -> StateSummary {
        let table = EligibilityTable::from_records(records).unwrap();
        summarize_state(table.batches()).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let s = summarize(&[
            rec(Some("1"), Some(0), Some("A")),
            rec(Some("6"), Some(0), Some("B")),
            rec(Some("9"), Some(0), Some("C")),
            rec(None, Some(0), Some("D")),
            rec(Some("3"), Some(1), Some("E")),
        ]);
        assert_eq!(s.total_members, 4);
        assert_eq!(s.missing_pct, 25.0);
        assert_eq!(s.band(AgeBand::Child), 33.3);
        assert_eq!(s.band(AgeBand::Adult), 33.3);
        assert_eq!(s.band(AgeBand::Senior), 33.3);
    }

    #[test]
    fn test_all_placeholders() {
        let s = summarize(&[
            rec(Some("1"), Some(1), Some("A")),
            rec(Some("6"), Some(1), Some("B")),
        ]);
        assert_eq!(s.total_members, 0);
        assert!(s.missing_pct.is_nan());
        assert!(s.band_pct.iter().all(|p| p.is_nan()));
    }

    #[test]
    fn test_null_flag_is_placeholder() {
        let s = summarize(&[rec(Some("1"), None, Some("A")), rec(Some("6"), Some(0), Some("B"))]);
        assert_eq!(s.total_members, 1);
        assert_eq!(s.band(AgeBand::Adult), 100.0);
        assert_eq!(s.band(AgeBand::Child), 0.0);
    }

    #[test]
    fn test_unparseable_code_counts_as_missing() {
        let s = summarize(&[
            rec(Some("X"), Some(0), Some("A")),
            rec(Some("2"), Some(0), Some("B")),
            rec(Some("8"), Some(0), Some("C")),
            rec(Some("10"), Some(0), Some("D")),
        ]);
        assert_eq!(s.missing_pct, 25.0);
        assert_eq!(s.band(AgeBand::Child), 33.3);
        assert_eq!(s.band(AgeBand::Adult), 0.0);
        assert_eq!(s.band(AgeBand::Senior), 66.7);
    }

    #[test]
    fn test_all_missing_codes() {
        let s = summarize(&[rec(None, Some(0), Some("A")), rec(Some("?"), Some(0), Some("B"))]);
        assert_eq!(s.total_members, 2);
        assert_eq!(s.missing_pct, 100.0);
        assert!(s.band_pct.iter().all(|p| p.is_nan()));
    }

    #[test]
    fn test_negative_code_is_neither_missing_nor_banded() {
        let s = summarize(&[rec(Some("-1"), Some(0), Some("A")), rec(Some("5"), Some(0), Some("B"))]);
        assert_eq!(s.missing_pct, 0.0);
        assert_eq!(s.band(AgeBand::Adult), 100.0);
    }

    #[test]
    fn test_total_counts_distinct_non_null_ids() {
        let s = summarize(&[
            rec(Some("1"), Some(0), Some("A")),
            rec(Some("2"), Some(0), Some("A")),
            rec(Some("6"), Some(0), None),
            rec(Some("9"), Some(0), Some("B")),
            rec(Some("9"), Some(1), Some("C")),
        ]);
        assert_eq!(s.total_members, 2);
    }

    #[test]
    fn test_bands_sum_to_hundred() {
        let mut records = Vec::new();
        for (i, code) in ["1", "2", "5", "5", "6", "7", "8", "9", "9", "3", "4"]
            .iter()
            .enumerate()
        {
            records.push(rec(Some(*code), Some(0), Some(i.to_string().as_str())));
        }
        let s = summarize(&records);
        let sum: f64 = s.band_pct.iter().sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum was {}", sum);
    }

    #[test]
    fn test_missing_plus_present_is_hundred() {
        // 8 eligible rows: null and unparseable codes are missing, a negative
        // code is present but unbanded.
        let records = [
            rec(None, Some(0), Some("A")),
            rec(Some("X"), Some(0), Some("B")),
            rec(Some("-1"), Some(0), Some("C")),
            rec(Some("1"), Some(0), Some("D")),
            rec(Some("4"), Some(0), Some("E")),
            rec(Some("6"), Some(0), Some("F")),
            rec(Some("8"), Some(0), Some("G")),
            rec(Some("9"), Some(0), Some("H")),
            rec(None, Some(1), Some("I")),
        ];
        let s = summarize(&records);

        let eligible: Vec<_> = records
            .iter()
            .filter(|r| r.missing_eligibility_flag == Some(0))
            .collect();
        let present = eligible
            .iter()
            .filter(|r| {
                r.age_group_code
                    .as_deref()
                    .map_or(false, |c| c.parse::<f64>().is_ok())
            })
            .count();
        let present_pct = present as f64 / eligible.len() as f64 * 100.0;

        assert_eq!(s.missing_pct, 25.0);
        assert_eq!(s.missing_pct + present_pct, 100.0);
        assert_eq!(s.band(AgeBand::Child), 40.0);
        assert_eq!(s.band(AgeBand::Adult), 20.0);
        assert_eq!(s.band(AgeBand::Senior), 40.0);
    }

    #[test]
    fn test_accumulates_across_batches() {
        let first = EligibilityTable::from_records(&[
            rec(Some("1"), Some(0), Some("A")),
            rec(None, Some(0), Some("B")),
        ])
        .unwrap();
        let second = EligibilityTable::from_records(&[
            rec(Some("6"), Some(0), Some("A")),
            rec(Some("9"), Some(0), Some("C")),
        ])
        .unwrap();
        let parts: Vec<RecordBatch> = first
            .batches()
            .iter()
            .chain(second.batches())
            .cloned()
            .collect();

        let s = summarize_state(&parts).unwrap();
        assert_eq!(s.total_members, 3, "ids are distinct across batches");
        assert_eq!(s.missing_pct, 25.0);
        assert_eq!(s.band_pct, [33.3, 33.3, 33.3]);
    }

    #[test]
    fn test_round1_half_even() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(0.75), 0.8);
        assert!(round1(f64::NAN).is_nan());
    }
}
