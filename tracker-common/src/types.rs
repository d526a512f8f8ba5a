//! Closed enum sets for entity fields
//!
//! Status, source type and indicator type are closed vocabularies. Modeling
//! them as enums gives compile-time exhaustiveness in the promotion and
//! filter logic; the database stores the snake_case text form.
//!
//! Parsing via `FromStr` is an exact, case-sensitive match. The only
//! case-insensitive treatment of these values is in list filtering, which
//! compares lowercased text in SQL.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a target.
///
/// Deliberately permissive: there is no transition graph, any status may be
/// set from any other as long as the value is one of these four members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TargetStatus {
    #[default]
    New,
    UnderReview,
    Confirmed,
    Rejected,
}

impl TargetStatus {
    /// Valid wire values, in declaration order
    pub const VALID: [&'static str; 4] = ["new", "under_review", "confirmed", "rejected"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::New => "new",
            TargetStatus::UnderReview => "under_review",
            TargetStatus::Confirmed => "confirmed",
            TargetStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(TargetStatus::New),
            "under_review" => Ok(TargetStatus::UnderReview),
            "confirmed" => Ok(TargetStatus::Confirmed),
            "rejected" => Ok(TargetStatus::Rejected),
            _ => Err(Error::InvalidInput(format!(
                "Invalid status. Valid: {:?}",
                TargetStatus::VALID
            ))),
        }
    }
}

/// Collection channel an indicator came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SourceType {
    Osint,
    Sigint,
    Humint,
    Other,
}

impl SourceType {
    pub const VALID: [&'static str; 4] = ["osint", "sigint", "humint", "other"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Osint => "osint",
            SourceType::Sigint => "sigint",
            SourceType::Humint => "humint",
            SourceType::Other => "other",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "osint" => Ok(SourceType::Osint),
            "sigint" => Ok(SourceType::Sigint),
            "humint" => Ok(SourceType::Humint),
            "other" => Ok(SourceType::Other),
            _ => Err(Error::InvalidInput(format!(
                "Invalid source type. Valid: {:?}",
                SourceType::VALID
            ))),
        }
    }
}

/// Kind of evidence an indicator carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum IndicatorType {
    Keyword,
    Pattern,
    Feature,
}

impl IndicatorType {
    pub const VALID: [&'static str; 3] = ["keyword", "pattern", "feature"];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::Keyword => "keyword",
            IndicatorType::Pattern => "pattern",
            IndicatorType::Feature => "feature",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" => Ok(IndicatorType::Keyword),
            "pattern" => Ok(IndicatorType::Pattern),
            "feature" => Ok(IndicatorType::Feature),
            _ => Err(Error::InvalidInput(format!(
                "Invalid indicator type. Valid: {:?}",
                IndicatorType::VALID
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in TargetStatus::VALID {
            let parsed: TargetStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn test_status_parse_is_case_sensitive() {
        assert!("Confirmed".parse::<TargetStatus>().is_err());
        assert!("CONFIRMED".parse::<TargetStatus>().is_err());
        assert!("confirmed".parse::<TargetStatus>().is_ok());
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = "invalid".parse::<TargetStatus>().unwrap_err();
        assert!(err.to_string().contains("Valid:"));
    }

    #[test]
    fn test_status_default_is_new() {
        assert_eq!(TargetStatus::default(), TargetStatus::New);
    }

    #[test]
    fn test_source_type_parse() {
        assert_eq!("humint".parse::<SourceType>().unwrap(), SourceType::Humint);
        assert!("HUMINT".parse::<SourceType>().is_err());
    }

    #[test]
    fn test_indicator_type_parse() {
        assert_eq!(
            "pattern".parse::<IndicatorType>().unwrap(),
            IndicatorType::Pattern
        );
        assert!("regex".parse::<IndicatorType>().is_err());
    }

    #[test]
    fn test_serde_wire_form() {
        let json = serde_json::to_string(&TargetStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        let back: TargetStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, TargetStatus::Rejected);
    }
}
