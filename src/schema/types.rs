// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// The six fields the report reads from an eligibility extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalColumn {
    MemberId,
    StateCode,
    Age,
    AgeGroupCode,
    MissingEligibilityFlag,
    SecondaryMemberId,
}

impl LogicalColumn {
    /// Canonical column order of a normalized batch.
    pub const ALL: [LogicalColumn; 6] = [
        LogicalColumn::MemberId,
        LogicalColumn::StateCode,
        LogicalColumn::Age,
        LogicalColumn::AgeGroupCode,
        LogicalColumn::MissingEligibilityFlag,
        LogicalColumn::SecondaryMemberId,
    ];

    /// Column name inside a normalized batch.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalColumn::MemberId => "member_id",
            LogicalColumn::StateCode => "state_code",
            LogicalColumn::Age => "age",
            LogicalColumn::AgeGroupCode => "age_group_code",
            LogicalColumn::MissingEligibilityFlag => "missing_eligibility_flag",
            LogicalColumn::SecondaryMemberId => "secondary_member_id",
        }
    }

    /// Position inside a normalized batch.
    pub fn index(&self) -> usize {
        match self {
            LogicalColumn::MemberId => 0,
            LogicalColumn::StateCode => 1,
            LogicalColumn::Age => 2,
            LogicalColumn::AgeGroupCode => 3,
            LogicalColumn::MissingEligibilityFlag => 4,
            LogicalColumn::SecondaryMemberId => 5,
        }
    }
}

/// Maps each logical field to the column name used in the source files.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
#[serde(default)]
pub struct ColumnMap {
    pub member_id: String,
    pub state_code: String,
    pub age: String,
    pub age_group_code: String,
    pub missing_eligibility_flag: String,
    pub secondary_member_id: String,
}

impl Default for ColumnMap {
    /// Column names of the TAF demographic/eligibility base file.
    fn default() -> Self {
        Self {
            member_id: "BENE_ID".to_string(),
            state_code: "STATE_CD".to_string(),
            age: "AGE".to_string(),
            age_group_code: "AGE_GRP_CD".to_string(),
            missing_eligibility_flag: "MISG_ELGBLTY_DATA_IND".to_string(),
            secondary_member_id: "MSIS_ID".to_string(),
        }
    }
}

impl ColumnMap {
    /// Identity mapping: source files already use the normalized names.
    pub fn logical() -> Self {
        Self {
            member_id: LogicalColumn::MemberId.name().to_string(),
            state_code: LogicalColumn::StateCode.name().to_string(),
            age: LogicalColumn::Age.name().to_string(),
            age_group_code: LogicalColumn::AgeGroupCode.name().to_string(),
            missing_eligibility_flag: LogicalColumn::MissingEligibilityFlag.name().to_string(),
            secondary_member_id: LogicalColumn::SecondaryMemberId.name().to_string(),
        }
    }

    pub fn source_name(&self, column: LogicalColumn) -> &str {
        match column {
            LogicalColumn::MemberId => &self.member_id,
            LogicalColumn::StateCode => &self.state_code,
            LogicalColumn::Age => &self.age,
            LogicalColumn::AgeGroupCode => &self.age_group_code,
            LogicalColumn::MissingEligibilityFlag => &self.missing_eligibility_flag,
            LogicalColumn::SecondaryMemberId => &self.secondary_member_id,
        }
    }

    /// Source names in canonical order, i.e. the read projection.
    pub fn source_names(&self) -> Vec<&str> {
        LogicalColumn::ALL
            .iter()
            .map(|c| self.source_name(*c))
            .collect()
    }
}
