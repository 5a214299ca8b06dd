// src/dataset/read.rs

use anyhow::{anyhow, bail, Context, Result};
use arrow::record_batch::RecordBatch;
use glob::glob;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use std::{
    fs::File,
    path::{Component, Path, PathBuf},
};
use tracing::debug;

use crate::schema::{normalize_batch, ColumnMap};

const BATCH_SIZE: usize = 64 * 1024;

/// Resolve `path` to the list of Parquet files it stands for.
///
/// A file is returned as-is. A directory is searched recursively for
/// `*.parquet`, so hive-style `key=value/` partitions are picked up. Entries
/// starting with `_` or `.` (`_SUCCESS`, `_temporary/`, editor files) are
/// skipped at any depth below `path`.
pub fn discover_parquet_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("dataset path not found: {}", path.display());
    }

    let pattern = format!("{}/**/*.parquet", path.display());
    let mut files: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file() && !is_hidden_below(path, p))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("No Parquet files found under '{}'", path.display());
    }
    Ok(files)
}

/// True when a component of `path` below `root` starts with `_` or `.`.
///
/// glob drops `.` components from the paths it yields, so both sides are
/// compared without them. A path outside `root` is never hidden.
fn is_hidden_below(root: &Path, path: &Path) -> bool {
    let root = without_cur_dir(root);
    let path = without_cur_dir(path);
    let Ok(rel) = path.strip_prefix(&root) else {
        return false;
    };
    rel.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .map_or(false, |s| s.starts_with('_') || s.starts_with('.')),
        _ => false,
    })
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Read one Parquet file, projecting only the mapped source columns, and
/// return its batches normalized to the eligibility schema.
pub fn read_parquet_projected(path: &Path, columns: &ColumnMap) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).with_context(|| format!("Failed to open Parquet '{}'", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Failed to read Parquet '{}'", path.display()))?;

    let file_schema = builder.schema().clone();
    let mut roots = Vec::with_capacity(6);
    for name in columns.source_names() {
        let idx = file_schema
            .index_of(name)
            .map_err(|_| anyhow!("column `{}` not found in `{}`", name, path.display()))?;
        roots.push(idx);
    }
    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);

    let reader = builder
        .with_projection(mask)
        .with_batch_size(BATCH_SIZE)
        .build()
        .with_context(|| format!("building reader for `{}`", path.display()))?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch.with_context(|| format!("decoding batch from `{}`", path.display()))?;
        out.push(
            normalize_batch(&batch, columns)
                .with_context(|| format!("normalizing `{}`", path.display()))?,
        );
    }
    debug!(file = %path.display(), batches = out.len(), "read parquet file");
    Ok(out)
}
