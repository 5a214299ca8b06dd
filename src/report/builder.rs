// src/report/builder.rs

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::summary::summarize_state;
use super::table::{ReportRow, ReportTable};
use crate::dataset::EligibilityTable;

/// Builds the per-state report over one loaded extract.
pub struct ReportBuilder<'a> {
    table: &'a EligibilityTable,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(table: &'a EligibilityTable) -> Self {
        Self { table }
    }

    /// Summarize every state in `states` and return the rows sorted by
    /// display name.
    ///
    /// States are independent, so they are summarized in parallel. A code
    /// missing from `abbrev_to_name` is reported under the code itself.
    #[instrument(skip_all, fields(states = states.len()))]
    pub fn build(
        &self,
        states: &[String],
        abbrev_to_name: &HashMap<String, String>,
    ) -> Result<ReportTable> {
        let rows = states
            .par_iter()
            .map(|code| -> Result<ReportRow> {
                let rows = self.table.filter_state(code)?;
                let summary = summarize_state(&rows)
                    .with_context(|| format!("summarizing state `{}`", code))?;
                let n: usize = rows.iter().map(|b| b.num_rows()).sum();
                debug!(state = %code, rows = n, total = summary.total_members, "summarized state");

                let state = match abbrev_to_name.get(code) {
                    Some(name) => name.clone(),
                    None => {
                        warn!(state = %code, "no display name for state code; using the code");
                        code.clone()
                    }
                };
                Ok(ReportRow { state, summary })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(rows = rows.len(), "report built");
        Ok(ReportTable::new(rows))
    }
}
