pub mod age_band;
pub mod builder;
pub mod summary;
pub mod table;

pub use age_band::AgeBand;
pub use builder::ReportBuilder;
pub use summary::{round1, summarize_state, StateSummary};
pub use table::{format_pct, format_thousands, ReportRow, ReportTable, COLUMNS};
