//! Category label enum as the single source of truth for report row labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interview-pipeline categories, in report row order.
///
/// The declaration order is the order of the summary rows and the creator
/// matrix rows. `Other` is the sentinel for titles no rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryLabel {
    CasualInterview,
    FirstInterview,
    SecondInterview,
    HrMeeting,
    FinalInterview,
    OtherInterview,
    OfferMeeting,
    OtherMeeting,
    StatusMarker,
    Holiday,
    Other,
}

impl CategoryLabel {
    /// Every label in report row order.
    pub const ALL: [Self; 11] = [
        Self::CasualInterview,
        Self::FirstInterview,
        Self::SecondInterview,
        Self::HrMeeting,
        Self::FinalInterview,
        Self::OtherInterview,
        Self::OfferMeeting,
        Self::OtherMeeting,
        Self::StatusMarker,
        Self::Holiday,
        Self::Other,
    ];

    /// The label as written into reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CasualInterview => "カジュアル面談",
            Self::FirstInterview => "1次面接",
            Self::SecondInterview => "2次面接",
            Self::HrMeeting => "人事面談",
            Self::FinalInterview => "最終面接",
            Self::OtherInterview => "その他面接",
            Self::OfferMeeting => "オファー面談",
            Self::OtherMeeting => "その他面談・会食",
            Self::StatusMarker => "(対応ステータス/リマインド系)",
            Self::Holiday => "(祝日)",
            Self::Other => "(Other)",
        }
    }

    /// Position of this label in report row order.
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryLabel {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl Serialize for CategoryLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategoryLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown category label strings.
#[derive(Debug, Clone)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}
