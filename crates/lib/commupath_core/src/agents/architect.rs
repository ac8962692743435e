//! Quest generation agent.

use std::sync::Arc;

use commupath_models::{Category, Coordinates, Difficulty, Location, Quest, QuestStatus};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::gemini::{GeminiClient, Part};
use super::AgentError;
use crate::ids;
use crate::location::region_name;

const FALLBACK_BENEFIT: &str = "Strengthens community bonds and creates positive local impact";

/// Model output before it becomes a [`Quest`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestDraft {
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub impact_metric: String,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub community_benefit: Option<String>,
}

impl QuestDraft {
    /// Reject drafts that are too thin to show.
    fn validate(&self) -> Result<Difficulty, AgentError> {
        let title_len = self.title.trim().chars().count();
        if !(5..=100).contains(&title_len) {
            return Err(AgentError::Parse(format!("title length {title_len} out of range")));
        }
        if self.description.trim().chars().count() < 20 {
            return Err(AgentError::Parse("description too short".into()));
        }
        if self.impact_metric.trim().is_empty() {
            return Err(AgentError::Parse("missing impact metric".into()));
        }
        self.difficulty
            .parse()
            .map_err(|e: commupath_models::ParseLabelError| AgentError::Parse(e.to_string()))
    }
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "description": {"type": "string"},
            "difficulty": {"type": "string", "enum": ["Easy", "Medium", "Hard"]},
            "impact_metric": {"type": "string"},
            "estimated_time": {"type": "string"},
            "community_benefit": {"type": "string"}
        },
        "required": ["title", "description", "difficulty", "impact_metric"]
    })
}

/// Prompt asking the model for one quest at `coordinates`.
pub fn build_prompt(
    coordinates: Coordinates,
    category: Category,
    user_preferences: Option<&str>,
) -> String {
    let location_name = region_name(coordinates);
    let preferences = user_preferences
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("None specified");
    format!(
        r#"You are the Community Architect, an expert at turning personal resolutions into actionable community impact quests.

Generate one specific, actionable community impact quest:

Location: {location_name} (Lat: {lat}, Lng: {lng})
Resolution Category: {category}
User Preferences: {preferences}

Requirements:
1. The quest must be specific to {location_name}.
2. It must address a real community need in the {category} category.
3. It must be completable within days or weeks.
4. Include a measurable impact metric (e.g. "Plant 50 trees", "Tutor 10 students").
5. State the community benefit in concrete terms.
6. Difficulty: Easy is 1-2 hours, Medium is 3-5 hours, Hard is 6+ hours or several sessions.

Example for Environment in Ibadan, Nigeria:
{{
  "title": "Clean Up Agodi Gardens Water Feature",
  "description": "Organize a community cleanup of the pond area at Agodi Gardens. Remove plastic waste, trim overgrown vegetation and install signage about pollution prevention.",
  "difficulty": "Medium",
  "impact_metric": "Remove 100kg of waste, restore 200 sq meters of waterfront",
  "estimated_time": "4 hours (Saturday morning)",
  "community_benefit": "Cleaner recreational space for 500+ weekly visitors"
}}

Be specific, realistic and inspiring."#,
        lat = coordinates.lat,
        lng = coordinates.lng,
    )
}

/// Static quest used when the model is unavailable.
pub fn fallback_draft(category: Category) -> QuestDraft {
    let (title, description, impact_metric, estimated_time) = match category {
        Category::Environment => (
            "Community Park Cleanup",
            "Organize a cleanup event at a local park. Remove litter, plant flowers, and create a cleaner environment for everyone.",
            "Clean 200 sq meters of public space",
            "2-3 hours",
        ),
        Category::Social => (
            "Community Meal Sharing",
            "Organize a community meal event where neighbors can share food and connect. Promote social cohesion and reduce isolation.",
            "Bring together 20+ community members",
            "3-4 hours",
        ),
        Category::Education => (
            "Free Tutoring Sessions",
            "Provide free tutoring to local students in math or reading. Help improve academic performance in your community.",
            "Tutor 5-10 students for 2 weeks",
            "2 hours per week",
        ),
        Category::Health => (
            "Community Fitness Walk",
            "Organize weekly walking groups to promote physical activity and wellness in your community.",
            "15+ participants per walk",
            "1 hour per session",
        ),
    };
    QuestDraft {
        title: title.into(),
        description: description.into(),
        difficulty: Difficulty::Medium.as_str().into(),
        impact_metric: impact_metric.into(),
        estimated_time: Some(estimated_time.into()),
        community_benefit: Some(FALLBACK_BENEFIT.into()),
    }
}

/// Build an unsaved quest at `location` from a draft.
///
/// The draft must already be validated; an unparseable difficulty falls back
/// to Medium.
pub fn quest_from_draft(draft: QuestDraft, category: Category, location: Location) -> Quest {
    Quest {
        quest_id: ids::quest_id(),
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        category,
        difficulty: draft.difficulty.parse().unwrap_or(Difficulty::Medium),
        impact_metric: draft.impact_metric,
        estimated_time: draft.estimated_time,
        community_benefit: draft.community_benefit,
        location,
        status: QuestStatus::Active,
        created_by: None,
        assigned_to: None,
        created_at: None,
        completed_at: None,
    }
}

/// Generates location-aware quests.
#[derive(Debug, Clone)]
pub struct QuestArchitect {
    gemini: Arc<GeminiClient>,
    model: String,
}

impl QuestArchitect {
    pub fn new(gemini: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            gemini,
            model: model.into(),
        }
    }

    /// Ask the model for a quest draft. Never fails; errors yield the
    /// category fallback.
    pub async fn draft(
        &self,
        coordinates: Coordinates,
        category: Category,
        user_preferences: Option<&str>,
    ) -> QuestDraft {
        match self.try_draft(coordinates, category, user_preferences).await {
            Ok(draft) => {
                info!(%category, title = %draft.title, "quest generated");
                draft
            }
            Err(e) => {
                warn!(error = %e, %category, "quest generation failed, using fallback");
                fallback_draft(category)
            }
        }
    }

    async fn try_draft(
        &self,
        coordinates: Coordinates,
        category: Category,
        user_preferences: Option<&str>,
    ) -> Result<QuestDraft, AgentError> {
        let prompt = build_prompt(coordinates, category, user_preferences);
        let draft: QuestDraft = self
            .gemini
            .generate_json(&self.model, &[Part::Text(prompt)], &response_schema(), None)
            .await?;
        draft.validate()?;
        Ok(draft)
    }
}
