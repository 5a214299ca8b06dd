// src/config/mod.rs

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::schema::{ColumnMap, LogicalColumn};
use crate::states::{default_state_codes, default_state_names};

/// Location of the 2017 TAF demographic/eligibility base extract.
pub const DEFAULT_DATASET: &str = "/gpfs/milgram/pi/medicaid_lab/data/cms/ingested/dua57871-ndumele/2017/taf_demog_elig_base_res000019152_req011826/";

static STATE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Everything a report run needs. Every field has a built-in default, so an
/// empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub dataset: PathBuf,
    pub columns: ColumnMap,
    pub states: Vec<String>,
    pub state_names: HashMap<String, String>,
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            columns: ColumnMap::default(),
            states: default_state_codes(),
            state_names: default_state_names(),
            format: OutputFormat::Table,
        }
    }
}

impl ReportConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: ReportConfig = serde_yaml::from_str(text).context("parsing report config")?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Reject configs the report cannot run on.
    pub fn validate(&self) -> Result<()> {
        if self.states.is_empty() {
            bail!("no states to report on");
        }
        let mut seen = HashSet::new();
        for code in &self.states {
            if !STATE_CODE_RE.is_match(code) {
                bail!("invalid state code `{}` (expected two upper-case letters)", code);
            }
            if !seen.insert(code) {
                bail!("state `{}` listed more than once", code);
            }
        }

        let mut sources = HashSet::new();
        for col in LogicalColumn::ALL {
            let source = self.columns.source_name(col);
            if source.trim().is_empty() {
                bail!("source column for `{}` is empty", col.name());
            }
            if !sources.insert(source) {
                bail!("source column `{}` is mapped more than once", source);
            }
        }
        Ok(())
    }
}
