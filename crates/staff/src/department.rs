use core::str::FromStr;

use serde::{Deserialize, Serialize};

use consultdesk_core::DomainError;

/// Consultancy department an employee or role belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Administration,
    OverseasEducation,
    Loans,
    Documents,
    ItTraining,
    CareerSupport,
    Settlement,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Administration,
        Department::OverseasEducation,
        Department::Loans,
        Department::Documents,
        Department::ItTraining,
        Department::CareerSupport,
        Department::Settlement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Administration => "administration",
            Department::OverseasEducation => "overseas_education",
            Department::Loans => "loans",
            Department::Documents => "documents",
            Department::ItTraining => "it_training",
            Department::CareerSupport => "career_support",
            Department::Settlement => "settlement",
        }
    }
}

impl core::fmt::Display for Department {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = DomainError;

    /// Accepts the snake_case name, case-insensitively, with `-` or spaces in
    /// place of `_` ("IT Training", "career-support").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| DomainError::validation(format!("unknown department '{}'", s.trim())))
    }
}
