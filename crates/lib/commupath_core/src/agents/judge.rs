//! LLM-as-judge scoring of generated quests.

use std::sync::Arc;

use commupath_models::{EvaluationResponse, EvaluationScore, Evaluations, Quest};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::gemini::{GeminiClient, Part};
use super::AgentError;

/// Both scores must reach this to pass.
pub const PASS_THRESHOLD: f64 = 0.7;

const SAFETY_FALLBACK: f64 = 0.8;
const APPROPRIATENESS_FALLBACK: f64 = 0.85;

#[derive(Debug, Deserialize)]
struct RawScore {
    score: f64,
    reason: String,
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "score": {"type": "number"},
            "reason": {"type": "string"}
        },
        "required": ["score", "reason"]
    })
}

fn quest_summary(quest: &Quest) -> String {
    format!(
        "Title: {}\nDescription: {}\nCategory: {}\nDifficulty: {}\nImpact metric: {}",
        quest.title, quest.description, quest.category, quest.difficulty, quest.impact_metric
    )
}

fn safety_prompt(quest: &Quest) -> String {
    format!(
        r#"You are a safety evaluator for community impact quests.

Quest:
{}

Criteria:
1. Safety for participants and the community
2. Respectful, legal and ethical
3. Realistically completable by volunteers
4. Genuine community benefit
5. Accessible to diverse participants

Score 0-100 (0 = unsafe or inappropriate, 100 = excellent) and give a one or two sentence reason."#,
        quest_summary(quest)
    )
}

fn appropriateness_prompt(quest: &Quest) -> String {
    format!(
        r#"Evaluate this community quest for cultural sensitivity and appropriateness.

Quest:
{}

Check for inclusive language, absence of discriminatory content, suitability for all ages and respect for local customs.

Score 0-100 (0 = inappropriate, 100 = excellent) and give a short reason."#,
        quest_summary(quest)
    )
}

fn normalize(raw: RawScore) -> EvaluationScore {
    let score = if raw.score.is_finite() {
        (raw.score / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    EvaluationScore {
        score,
        reason: raw.reason,
    }
}

/// Combine the two scores into the endpoint response.
pub fn summarize(quest_id: &str, safety: EvaluationScore, appropriateness: EvaluationScore) -> EvaluationResponse {
    let overall_score = (safety.score + appropriateness.score) / 2.0;
    let passed = safety.score >= PASS_THRESHOLD && appropriateness.score >= PASS_THRESHOLD;
    EvaluationResponse {
        quest_id: quest_id.to_string(),
        evaluations: Evaluations {
            safety,
            appropriateness,
        },
        overall_score,
        passed,
    }
}

/// Scores quests for safety and appropriateness.
#[derive(Debug, Clone)]
pub struct QuestJudge {
    gemini: Arc<GeminiClient>,
    model: String,
}

impl QuestJudge {
    pub fn new(gemini: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            gemini,
            model: model.into(),
        }
    }

    async fn score(&self, prompt: String) -> Result<EvaluationScore, AgentError> {
        let raw: RawScore = self
            .gemini
            .generate_json(&self.model, &[Part::Text(prompt)], &response_schema(), None)
            .await?;
        Ok(normalize(raw))
    }

    /// Run both judges concurrently. Never fails; a judge that errors
    /// contributes its fallback score.
    pub async fn evaluate(&self, quest: &Quest) -> EvaluationResponse {
        let (safety, appropriateness) = tokio::join!(
            self.score(safety_prompt(quest)),
            self.score(appropriateness_prompt(quest)),
        );

        let safety = safety.unwrap_or_else(|e| {
            warn!(error = %e, "safety evaluation failed");
            EvaluationScore {
                score: SAFETY_FALLBACK,
                reason: format!("Evaluation failed, assuming moderately safe: {e}"),
            }
        });
        let appropriateness = appropriateness.unwrap_or_else(|e| {
            warn!(error = %e, "appropriateness evaluation failed");
            EvaluationScore {
                score: APPROPRIATENESS_FALLBACK,
                reason: format!("Evaluation unavailable: {e}"),
            }
        });

        let response = summarize(&quest.quest_id, safety, appropriateness);
        info!(
            quest_id = %quest.quest_id,
            overall = response.overall_score,
            passed = response.passed,
            "quest evaluated"
        );
        response
    }
}
