pub mod arrow;
pub mod types;

pub use self::arrow::{eligibility_schema, map_to_arrow_type, normalize_batch};
pub use types::{ColumnMap, LogicalColumn};
