use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One problem found by the validator. Variants are declared in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Issue {
    MissingMedicationName,
    MissingPatientName,
    InvalidNdcFormat,
    TestRxNumber,
    InvalidDateFormat,
}

impl Issue {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingMedicationName => "Missing medication name",
            Self::MissingPatientName => "Missing patient name",
            Self::InvalidNdcFormat => "Invalid NDC number format",
            Self::TestRxNumber => "Invalid prescription number (appears to be test data)",
            Self::InvalidDateFormat => "Invalid date format",
        }
    }

    pub fn from_message(message: &str) -> Option<Self> {
        [
            Self::MissingMedicationName,
            Self::MissingPatientName,
            Self::InvalidNdcFormat,
            Self::TestRxNumber,
            Self::InvalidDateFormat,
        ]
        .into_iter()
        .find(|issue| issue.message() == message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// Issues travel as their human-readable message.
impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

impl<'de> Deserialize<'de> for Issue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let message = String::deserialize(deserializer)?;
        Issue::from_message(&message)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown issue: {message}")))
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub issues: Vec<Issue>,
}

impl ValidationVerdict {
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}
