//! User profile and impact tiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseLabelError;

/// Tier label derived from a user's cumulative points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ImpactLevel {
    #[default]
    Novice,
    #[serde(rename = "Rising Star")]
    RisingStar,
    Hero,
    Legend,
}

impl ImpactLevel {
    pub fn from_points(points: i64) -> Self {
        match points {
            p if p >= 1000 => ImpactLevel::Legend,
            p if p >= 500 => ImpactLevel::Hero,
            p if p >= 200 => ImpactLevel::RisingStar,
            _ => ImpactLevel::Novice,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Novice => "Novice",
            ImpactLevel::RisingStar => "Rising Star",
            ImpactLevel::Hero => "Hero",
            ImpactLevel::Legend => "Legend",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Novice" => Ok(ImpactLevel::Novice),
            "Rising Star" => Ok(ImpactLevel::RisingStar),
            "Hero" => Ok(ImpactLevel::Hero),
            "Legend" => Ok(ImpactLevel::Legend),
            _ => Err(ParseLabelError::new("impact level", s)),
        }
    }
}

/// Authenticated user's profile as returned by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub impact_level: ImpactLevel,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub completed_quests: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to show in the UI: full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}
