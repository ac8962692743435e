//! Quest domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseLabelError;
use crate::user::ImpactLevel;

// =============================================================================
// Enums
// =============================================================================

/// Resolution category a quest contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Environment,
    Social,
    Education,
    Health,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Environment,
        Category::Social,
        Category::Education,
        Category::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Environment => "Environment",
            Category::Social => "Social",
            Category::Education => "Education",
            Category::Health => "Health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError::new("category", s))
    }
}

/// Quest difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLabelError::new("difficulty", s))
    }
}

/// Quest lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestStatus {
    #[default]
    Active,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::Active => "Active",
            QuestStatus::InProgress => "In Progress",
            QuestStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "active" => Ok(QuestStatus::Active),
            "in progress" | "inprogress" => Ok(QuestStatus::InProgress),
            "completed" => Ok(QuestStatus::Completed),
            _ => Err(ParseLabelError::new("status", s)),
        }
    }
}

/// Outcome label produced by the proof verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationResult {
    Verified,
    Rejected,
    Unclear,
}

impl VerificationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationResult::Verified => "Verified",
            VerificationResult::Rejected => "Rejected",
            VerificationResult::Unclear => "Unclear",
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationResult {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verified" => Ok(VerificationResult::Verified),
            "rejected" => Ok(VerificationResult::Rejected),
            "unclear" => Ok(VerificationResult::Unclear),
            _ => Err(ParseLabelError::new("verification result", s)),
        }
    }
}

// =============================================================================
// Geography
// =============================================================================

/// GPS coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Location of a quest: a point plus an optional place name and address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

impl From<Coordinates> for Location {
    fn from(c: Coordinates) -> Self {
        Self {
            lat: c.lat,
            lng: c.lng,
            name: None,
            address: None,
        }
    }
}

// =============================================================================
// Quest
// =============================================================================

/// A unit of community-impact work tied to a location and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub quest_id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub impact_metric: String,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub community_benefit: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub status: QuestStatus,
    #[serde(default)]
    pub created_by: Option<String>,
    /// `None` means the quest is publicly claimable.
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// Whether anyone may claim the quest. Only `assigned_to` decides this.
    pub fn is_claimable(&self) -> bool {
        self.assigned_to.is_none()
    }
}

/// Optional list filters accepted by the quest listing endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl QuestFilter {
    pub fn matches(&self, quest: &Quest) -> bool {
        self.category.is_none_or(|c| c == quest.category)
            && self.difficulty.is_none_or(|d| d == quest.difficulty)
    }
}

/// One row of the leaderboard projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub points: i64,
    pub completed_quests: i64,
    pub impact_level: ImpactLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_uses_display_labels_on_the_wire() {
        let v = serde_json::to_value(QuestStatus::InProgress).unwrap();
        assert_eq!(v, json!("In Progress"));
        let back: QuestStatus = serde_json::from_value(json!("Completed")).unwrap();
        assert_eq!(back, QuestStatus::Completed);
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("in_progress".parse::<QuestStatus>(), Ok(QuestStatus::InProgress));
        assert_eq!("In Progress".parse::<QuestStatus>(), Ok(QuestStatus::InProgress));
        assert!("done".parse::<QuestStatus>().is_err());
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("environment".parse::<Category>(), Ok(Category::Environment));
        let err = "Sports".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "unknown category: Sports");
    }

    #[test]
    fn quest_deserializes_with_minimal_fields() {
        let quest: Quest = serde_json::from_value(json!({
            "quest_id": "quest_1a2b3c4d",
            "title": "Clean Up Bodija Park",
            "description": "Organize a community cleanup of Bodija Park.",
            "category": "Environment",
            "difficulty": "Medium",
            "location": {"lat": 7.4336, "lng": 3.9057}
        }))
        .unwrap();
        assert_eq!(quest.status, QuestStatus::Active);
        assert!(quest.is_claimable());
        assert!(quest.location.name.is_none());
    }

    #[test]
    fn coordinates_range_check() {
        assert!(Coordinates::new(7.3775, 3.9470).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn filter_matches_on_set_fields_only() {
        let quest: Quest = serde_json::from_value(json!({
            "quest_id": "quest_00000001",
            "title": "Free Tutoring Sessions",
            "description": "Provide free tutoring to local students.",
            "category": "Education",
            "difficulty": "Easy",
            "location": {"lat": 0.0, "lng": 0.0}
        }))
        .unwrap();
        assert!(QuestFilter::default().matches(&quest));
        let f = QuestFilter {
            category: Some(Category::Education),
            difficulty: Some(Difficulty::Hard),
        };
        assert!(!f.matches(&quest));
    }
}
