// src/schema/arrow.rs

use anyhow::{anyhow, Context, Result};
use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::types::{ColumnMap, LogicalColumn};

/// Map a logical column to the Arrow type it is held in after loading.
///
/// - ids, state code          → Utf8
/// - age, age group, flag     → Float64
///
/// The numeric fields are coerced: `AGE_GRP_CD` arrives as text in some
/// extracts and as an integer in others.
pub fn map_to_arrow_type(column: LogicalColumn) -> DataType {
    match column {
        LogicalColumn::MemberId | LogicalColumn::StateCode | LogicalColumn::SecondaryMemberId => {
            DataType::Utf8
        }
        LogicalColumn::Age
        | LogicalColumn::AgeGroupCode
        | LogicalColumn::MissingEligibilityFlag => DataType::Float64,
    }
}

/// The canonical schema every loaded batch is normalized to.
pub fn eligibility_schema() -> SchemaRef {
    let fields: Vec<ArrowField> = LogicalColumn::ALL
        .iter()
        .map(|col| ArrowField::new(col.name(), map_to_arrow_type(*col), /* nullable = */ true))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Pick the six source columns out of `batch`, rename them to their logical
/// names and cast them to the canonical types.
///
/// Casting is safe: a value that does not convert (e.g. `"X"` into Float64)
/// becomes null instead of failing the batch.
pub fn normalize_batch(batch: &RecordBatch, columns: &ColumnMap) -> Result<RecordBatch> {
    let schema = eligibility_schema();
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(LogicalColumn::ALL.len());

    for col in LogicalColumn::ALL {
        let source = columns.source_name(col);
        let idx = batch
            .schema()
            .index_of(source)
            .map_err(|_| anyhow!("column `{}` not found in batch", source))?;
        let target = map_to_arrow_type(col);
        let arr = cast(batch.column(idx), &target)
            .with_context(|| format!("casting `{}` to {:?}", source, target))?;
        arrays.push(arr);
    }

    RecordBatch::try_new(schema, arrays).context("building normalized eligibility batch")
}
