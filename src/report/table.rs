// src/report/table.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::{io::Write, sync::Arc};

use super::age_band::AgeBand;
use super::summary::StateSummary;
use crate::config::OutputFormat;

/// Display order of the value columns.
pub const COLUMNS: [&str; 5] = ["total", "missing", "0-18", "19-64", "65+"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Full state name (or the bare code when no name is known).
    pub state: String,
    pub summary: StateSummary,
}

/// The finished report: one row per state, sorted by state name.
#[derive(Debug, Clone)]
pub struct ReportTable {
    rows: Vec<ReportRow>,
    generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    state: &'a str,
    total: u64,
    missing: f64,
    #[serde(rename = "0-18")]
    child: f64,
    #[serde(rename = "19-64")]
    adult: f64,
    #[serde(rename = "65+")]
    senior: f64,
}

impl ReportTable {
    pub fn new(mut rows: Vec<ReportRow>) -> Self {
        rows.sort_by(|a, b| a.state.cmp(&b.state));
        Self {
            rows,
            generated_at: Utc::now(),
        }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn get(&self, state: &str) -> Option<&StateSummary> {
        self.rows
            .iter()
            .find(|r| r.state == state)
            .map(|r| &r.summary)
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Write the report to `out` in the requested format.
    pub fn render<W: Write>(&self, fmt: OutputFormat, out: &mut W) -> Result<()> {
        match fmt {
            OutputFormat::Table => self.write_table(out),
            OutputFormat::Csv => self.write_csv(out),
            OutputFormat::Json => self.write_json(out),
        }
    }

    pub fn to_pretty_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let mut header = vec![Cell::new("State").style_spec("bFg")];
        header.extend(COLUMNS.iter().map(|c| Cell::new(c).style_spec("bFg")));
        table.set_titles(Row::new(header));

        for row in &self.rows {
            let s = &row.summary;
            let mut cells = vec![
                Cell::new(&row.state),
                Cell::new(&format_thousands(s.total_members)).style_spec("r"),
                Cell::new(&format_pct(s.missing_pct)).style_spec("r"),
            ];
            cells.extend(
                AgeBand::ALL
                    .iter()
                    .map(|b| Cell::new(&format_pct(s.band(*b))).style_spec("r")),
            );
            table.add_row(Row::new(cells));
        }
        table
    }

    fn write_table<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "Medicaid eligibility by state (generated {})",
            self.generated_at().format("%Y-%m-%d %H:%M UTC")
        )?;
        self.to_pretty_table()
            .print(out)
            .context("printing report table")?;
        Ok(())
    }

    /// The report as an Arrow batch: `state`, `total`, then the percentages.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![
            Field::new("state", DataType::Utf8, false),
            Field::new(COLUMNS[0], DataType::UInt64, false),
        ];
        fields.extend(COLUMNS[1..].iter().map(|c| Field::new(*c, DataType::Float64, true)));

        let pct = |f: &dyn Fn(&StateSummary) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from_iter_values(
                self.rows.iter().map(|r| f(&r.summary)),
            ))
        };
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(self.rows.iter().map(|r| r.state.as_str()))),
            Arc::new(UInt64Array::from_iter_values(
                self.rows.iter().map(|r| r.summary.total_members),
            )),
            pct(&|s: &StateSummary| s.missing_pct),
        ];
        for band in AgeBand::ALL {
            arrays.push(pct(&|s: &StateSummary| s.band(band)));
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .context("building report record batch")
    }

    fn write_csv<W: Write>(&self, out: &mut W) -> Result<()> {
        let batch = self.to_record_batch()?;
        let mut writer = arrow::csv::Writer::new(out);
        writer.write(&batch).context("writing report csv")?;
        Ok(())
    }

    fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        let rows: Vec<JsonRow> = self
            .rows
            .iter()
            .map(|r| JsonRow {
                state: &r.state,
                total: r.summary.total_members,
                missing: r.summary.missing_pct,
                child: r.summary.band(AgeBand::Child),
                adult: r.summary.band(AgeBand::Adult),
                senior: r.summary.band(AgeBand::Senior),
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &rows).context("writing report json")?;
        writeln!(out)?;
        Ok(())
    }
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_pct(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.1}", x)
    }
}
