//! Quest rows.

use chrono::{DateTime, Utc};
use commupath_models::{Location, ParseLabelError, Quest};

/// Database row for `quests`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestRow {
    pub quest_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub impact_metric: String,
    pub estimated_time: Option<String>,
    pub community_benefit: Option<String>,
    pub location_lat: f64,
    pub location_lng: f64,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub status: String,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<QuestRow> for Quest {
    type Error = ParseLabelError;

    fn try_from(row: QuestRow) -> Result<Self, Self::Error> {
        Ok(Quest {
            quest_id: row.quest_id,
            title: row.title,
            description: row.description,
            category: row.category.parse()?,
            difficulty: row.difficulty.parse()?,
            impact_metric: row.impact_metric,
            estimated_time: row.estimated_time,
            community_benefit: row.community_benefit,
            location: Location {
                lat: row.location_lat,
                lng: row.location_lng,
                name: row.location_name,
                address: row.location_address,
            },
            status: row.status.parse()?,
            created_by: row.created_by,
            assigned_to: row.assigned_to,
            created_at: Some(row.created_at),
            completed_at: row.completed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commupath_models::{Category, Difficulty, QuestStatus};

    fn row() -> QuestRow {
        QuestRow {
            quest_id: "quest_deadbeef".into(),
            title: "Community Fitness Walk".into(),
            description: "Organize weekly walking groups in your community.".into(),
            category: "Health".into(),
            difficulty: "Easy".into(),
            impact_metric: "15+ participants per walk".into(),
            estimated_time: Some("1 hour per session".into()),
            community_benefit: None,
            location_lat: 6.5,
            location_lng: 3.4,
            location_name: Some("Lagos, Nigeria".into()),
            location_address: None,
            status: "In Progress".into(),
            created_by: Some("u1".into()),
            assigned_to: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn row_converts_to_wire_quest() {
        let quest = Quest::try_from(row()).unwrap();
        assert_eq!(quest.category, Category::Health);
        assert_eq!(quest.difficulty, Difficulty::Easy);
        assert_eq!(quest.status, QuestStatus::InProgress);
        assert_eq!(quest.location.name.as_deref(), Some("Lagos, Nigeria"));
        assert!(quest.is_claimable());
    }

    #[test]
    fn unknown_status_label_is_an_error() {
        let mut r = row();
        r.status = "Archived".into();
        assert!(Quest::try_from(r).is_err());
    }
}
