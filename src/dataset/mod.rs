// src/dataset/mod.rs

pub mod read;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, Scalar, StringArray};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::filter_record_batch;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use std::{path::Path, sync::Arc};
use tracing::info;

use crate::schema::{eligibility_schema, normalize_batch, ColumnMap, LogicalColumn};

pub use read::{discover_parquet_files, read_parquet_projected};

/// One row of an eligibility extract, as it arrives from the source.
///
/// `age_group_code` is kept as raw text; it is coerced to a number when the
/// record enters an [`EligibilityTable`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligibilityRecord {
    pub member_id: Option<String>,
    pub state_code: Option<String>,
    pub age: Option<f64>,
    pub age_group_code: Option<String>,
    pub missing_eligibility_flag: Option<i64>,
    pub secondary_member_id: Option<String>,
}

/// The loaded extract: immutable batches in the eligibility schema.
///
/// Batches are kept as read rather than concatenated; string columns use
/// i32 offsets and a full national extract would overflow them.
pub struct EligibilityTable {
    batches: Vec<RecordBatch>,
}

impl EligibilityTable {
    /// Load every Parquet file under `path`, reading only the mapped columns.
    pub fn load(path: &Path, columns: &ColumnMap) -> Result<Self> {
        let files = discover_parquet_files(path)?;
        info!(path = %path.display(), files = files.len(), "discovered parquet files");

        let per_file: Vec<Vec<RecordBatch>> = files
            .par_iter()
            .map(|file| read_parquet_projected(file, columns))
            .collect::<Result<Vec<_>>>()?;
        let batches: Vec<RecordBatch> = per_file.into_iter().flatten().collect();

        let table = Self::from_batches(batches)?;
        info!(
            rows = table.num_rows(),
            batches = table.batches.len(),
            gb = table.nbytes() as f64 / 1e9,
            "loaded eligibility table"
        );
        Ok(table)
    }

    /// Wrap batches that are already in the eligibility schema.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = eligibility_schema();
        if let Some(i) = batches.iter().position(|b| b.schema() != schema) {
            bail!("batch {} is not in the eligibility schema", i);
        }
        Ok(Self { batches })
    }

    /// Build a table from in-memory records through the same normalization
    /// path as files.
    pub fn from_records(records: &[EligibilityRecord]) -> Result<Self> {
        let raw_schema = Arc::new(Schema::new(vec![
            Field::new(LogicalColumn::MemberId.name(), DataType::Utf8, true),
            Field::new(LogicalColumn::StateCode.name(), DataType::Utf8, true),
            Field::new(LogicalColumn::Age.name(), DataType::Float64, true),
            Field::new(LogicalColumn::AgeGroupCode.name(), DataType::Utf8, true),
            Field::new(LogicalColumn::MissingEligibilityFlag.name(), DataType::Int64, true),
            Field::new(LogicalColumn::SecondaryMemberId.name(), DataType::Utf8, true),
        ]));
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter(records.iter().map(|r| r.member_id.as_deref()))),
            Arc::new(StringArray::from_iter(records.iter().map(|r| r.state_code.as_deref()))),
            Arc::new(Float64Array::from_iter(records.iter().map(|r| r.age))),
            Arc::new(StringArray::from_iter(records.iter().map(|r| r.age_group_code.as_deref()))),
            Arc::new(Int64Array::from_iter(records.iter().map(|r| r.missing_eligibility_flag))),
            Arc::new(StringArray::from_iter(
                records.iter().map(|r| r.secondary_member_id.as_deref()),
            )),
        ];
        let raw = RecordBatch::try_new(raw_schema, arrays).context("building record batch")?;
        let batch = normalize_batch(&raw, &ColumnMap::logical())?;
        Ok(Self {
            batches: vec![batch],
        })
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    /// In-memory size of the table's buffers, in bytes.
    pub fn nbytes(&self) -> usize {
        self.batches.iter().map(|b| b.get_array_memory_size()).sum()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Rows whose `state_code` equals `code`, as the non-empty parts of each
    /// batch. Rows with a null state never match.
    pub fn filter_state(&self, code: &str) -> Result<Vec<RecordBatch>> {
        let needle = Scalar::new(StringArray::from(vec![code]));
        let mut parts = Vec::new();
        for batch in &self.batches {
            let states = batch.column(LogicalColumn::StateCode.index());
            let mask = eq(states, &needle)
                .map_err(|e| anyhow!("comparing state_code to `{}`: {}", code, e))?;
            let part = filter_record_batch(batch, &mask)
                .with_context(|| format!("filtering rows for state `{}`", code))?;
            if part.num_rows() > 0 {
                parts.push(part);
            }
        }
        Ok(parts)
    }
}
