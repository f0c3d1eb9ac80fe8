use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Catalog section a data file or figure is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemanticCategory {
    DRegion,
    ERegion,
    FRegion,
    ResolvedVelocity,
    DataFiles,
    AdditionalPlots,
}

impl SemanticCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SemanticCategory::DRegion => "D-region (Barker/mc)",
            SemanticCategory::ERegion => "E-region (Alternating Codes)",
            SemanticCategory::FRegion => "F-region (Long Pulse)",
            SemanticCategory::ResolvedVelocity => "Resolved Velocity",
            SemanticCategory::DataFiles => "Data Files",
            SemanticCategory::AdditionalPlots => "Additional Plots",
        }
    }

    /// Path name for the two sections that exist in every manifest.
    pub fn fixed_path(&self) -> Option<&'static str> {
        match self {
            SemanticCategory::DataFiles => Some("DataFiles"),
            SemanticCategory::AdditionalPlots => Some("AdditPlots"),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Value of the descriptor `type` field. Only velocity products get special treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Velocity,
    Other(String),
}

impl FileKind {
    pub fn is_velocity(&self) -> bool {
        matches!(self, FileKind::Velocity)
    }
}

impl FromStr for FileKind {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed == "velocity" {
            Ok(FileKind::Velocity)
        } else {
            Ok(FileKind::Other(trimmed.to_string()))
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Velocity => write!(f, "velocity"),
            FileKind::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// Experiment directory name of the form `YYYYMMDD.NNN`. The sequence is the last two digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExperimentId {
    raw: String,
    date: NaiveDate,
    sequence: u32,
}

impl ExperimentId {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for ExperimentId {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || CatalogError::InvalidExperimentId(value.to_string());
        let (date_part, sequence_part) = trimmed.split_once('.').ok_or_else(invalid)?;
        let is_valid = date_part.len() == 8
            && date_part.chars().all(|ch| ch.is_ascii_digit())
            && (2..=3).contains(&sequence_part.len())
            && sequence_part.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(invalid());
        }

        let year = date_part[0..4].parse::<i32>().map_err(|_| invalid())?;
        let month = date_part[4..6].parse::<u32>().map_err(|_| invalid())?;
        let day = date_part[6..8].parse::<u32>().map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        // The catalog numbers runs by the last two digits only.
        let sequence = sequence_part[sequence_part.len() - 2..]
            .parse::<u32>()
            .map_err(|_| invalid())?;

        Ok(Self {
            raw: trimmed.to_string(),
            date,
            sequence,
        })
    }
}

/// Bijective base-26 letters for a zero-based index: 0 -> `a`, 25 -> `z`, 26 -> `aa`.
pub fn letter_suffix(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        remaining -= 1;
        letters.push(char::from(b'a' + (remaining % 26) as u8));
        remaining /= 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn letter_suffix_wraps_to_double_letters() {
        assert_eq!(letter_suffix(0), "a");
        assert_eq!(letter_suffix(25), "z");
        assert_eq!(letter_suffix(26), "aa");
        assert_eq!(letter_suffix(27), "ab");
        assert_eq!(letter_suffix(51), "az");
        assert_eq!(letter_suffix(52), "ba");
        assert_eq!(letter_suffix(701), "zz");
        assert_eq!(letter_suffix(702), "aaa");
    }

    #[test]
    fn parse_experiment_id() {
        let id: ExperimentId = "20230301.002".parse().unwrap();
        assert_eq!(id.year(), 2023);
        assert_eq!(id.sequence(), 2);
        assert_eq!(id.date(), NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());

        let id: ExperimentId = "20230301.102".parse().unwrap();
        assert_eq!(id.sequence(), 2);
        assert_eq!(id.to_string(), "20230301.102");
    }

    #[test]
    fn parse_experiment_id_rejects_bad_dates() {
        assert_matches!(
            "20230231.001".parse::<ExperimentId>(),
            Err(CatalogError::InvalidExperimentId(_))
        );
        assert_matches!(
            "2023031.001".parse::<ExperimentId>(),
            Err(CatalogError::InvalidExperimentId(_))
        );
        assert_matches!(
            "20230301".parse::<ExperimentId>(),
            Err(CatalogError::InvalidExperimentId(_))
        );
    }

    #[test]
    fn file_kind_detects_velocity() {
        assert!("velocity".parse::<FileKind>().unwrap().is_velocity());
        assert!(!"fitted".parse::<FileKind>().unwrap().is_velocity());
    }
}
