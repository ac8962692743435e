//! Proof photo verification agent.

use std::sync::Arc;

use commupath_models::{Quest, VerificationResponse, VerificationResult};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::gemini::{GeminiClient, Part};
use super::AgentError;
use crate::uploads::ValidatedImage;

const TEMPERATURE: f32 = 0.3;

/// Upper bound of `suggested_points`.
pub const MAX_POINTS: i64 = 100;

#[derive(Debug, Deserialize)]
struct RawVerdict {
    confidence_score: f64,
    verification_result: String,
    reasoning: String,
    suggested_points: f64,
    #[serde(default)]
    key_observations: Vec<String>,
}

impl RawVerdict {
    fn normalize(self) -> VerificationResponse {
        let confidence_score = if self.confidence_score.is_finite() {
            self.confidence_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let suggested_points = if self.suggested_points.is_finite() {
            (self.suggested_points.round() as i64).clamp(0, MAX_POINTS)
        } else {
            0
        };
        VerificationResponse {
            verification_result: self
                .verification_result
                .parse()
                .unwrap_or(VerificationResult::Unclear),
            suggested_points,
            confidence_score,
            reasoning: self.reasoning,
            key_observations: self.key_observations,
            submission_id: None,
        }
    }
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "confidence_score": {"type": "number"},
            "verification_result": {"type": "string", "enum": ["Verified", "Rejected", "Unclear"]},
            "reasoning": {"type": "string"},
            "suggested_points": {"type": "integer"},
            "key_observations": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["confidence_score", "verification_result", "reasoning", "suggested_points"]
    })
}

/// Verdict returned when the model cannot be consulted.
pub fn fallback_verdict(error: &AgentError) -> VerificationResponse {
    VerificationResponse {
        verification_result: VerificationResult::Unclear,
        suggested_points: 0,
        confidence_score: 0.0,
        reasoning: format!("Error during verification: {error}. Please try again."),
        key_observations: Vec::new(),
        submission_id: None,
    }
}

pub fn build_prompt(quest: &Quest, user_description: Option<&str>) -> String {
    let user_description = user_description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description provided");
    format!(
        r#"You verify community impact quests. Analyze the attached image and decide whether it genuinely proves the quest was completed.

QUEST
- Title: {title}
- Description: {description}
- Category: {category}

USER'S DESCRIPTION
{user_description}

Evaluate:
1. Authenticity: is the image genuine (not AI-generated, not a stock photo)?
2. Relevance: does it relate directly to the quest objective?
3. Completion evidence: does it show the quest was actually done?
4. Impact quality: how significant is the visible community impact?
5. Safety: is the content safe and appropriate?

Verdict:
- Verified (confidence > 0.7): clear, authentic evidence of completion
- Unclear (confidence 0.3-0.7): some evidence but key elements missing
- Rejected (confidence < 0.3): no evidence, irrelevant or inappropriate

Points (0-100):
- 80-100 exceptional impact with strong evidence
- 50-79 good impact with solid evidence
- 20-49 moderate impact or partial evidence
- 0-19 minimal or unclear evidence

Be encouraging but honest. If unsure, say what is missing."#,
        title = quest.title,
        description = quest.description,
        category = quest.category,
    )
}

/// Verifies proof photos with a multimodal model.
#[derive(Debug, Clone)]
pub struct ProofVerifier {
    gemini: Arc<GeminiClient>,
    model: String,
}

impl ProofVerifier {
    pub fn new(gemini: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            gemini,
            model: model.into(),
        }
    }

    /// Judge `image` as proof for `quest`. Never fails; errors yield
    /// [`fallback_verdict`].
    pub async fn verify(
        &self,
        quest: &Quest,
        image: &ValidatedImage,
        user_description: Option<&str>,
    ) -> VerificationResponse {
        let parts = [
            Part::Image {
                mime_type: image.mime_type.to_string(),
                data: image.bytes.clone(),
            },
            Part::Text(build_prompt(quest, user_description)),
        ];
        let result = self
            .gemini
            .generate_json::<RawVerdict>(&self.model, &parts, &response_schema(), Some(TEMPERATURE))
            .await;

        match result {
            Ok(raw) => {
                let verdict = raw.normalize();
                info!(
                    quest_id = %quest.quest_id,
                    result = %verdict.verification_result,
                    confidence = verdict.confidence_score,
                    points = verdict.suggested_points,
                    "proof verified"
                );
                verdict
            }
            Err(e) => {
                warn!(error = %e, quest_id = %quest.quest_id, "proof verification failed");
                fallback_verdict(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(confidence: f64, result: &str, points: f64) -> RawVerdict {
        RawVerdict {
            confidence_score: confidence,
            verification_result: result.into(),
            reasoning: "Bags of litter visible next to the park sign.".into(),
            suggested_points: points,
            key_observations: vec!["litter bags".into()],
        }
    }

    #[test]
    fn scores_are_clamped() {
        let v = raw(1.7, "Verified", 250.0).normalize();
        assert_eq!(v.confidence_score, 1.0);
        assert_eq!(v.suggested_points, MAX_POINTS);

        let v = raw(-0.2, "Rejected", -5.0).normalize();
        assert_eq!(v.confidence_score, 0.0);
        assert_eq!(v.suggested_points, 0);
        assert_eq!(v.verification_result, VerificationResult::Rejected);

        let v = raw(f64::NAN, "Verified", f64::INFINITY).normalize();
        assert_eq!(v.confidence_score, 0.0);
        assert_eq!(v.suggested_points, 0);
    }

    #[test]
    fn unknown_result_label_is_unclear() {
        let v = raw(0.9, "Approved", 60.0).normalize();
        assert_eq!(v.verification_result, VerificationResult::Unclear);
        assert_eq!(v.suggested_points, 60);
    }

    #[test]
    fn fallback_awards_nothing() {
        let v = fallback_verdict(&AgentError::NotConfigured);
        assert_eq!(v.verification_result, VerificationResult::Unclear);
        assert_eq!(v.suggested_points, 0);
        assert_eq!(v.confidence_score, 0.0);
        assert!(v.reasoning.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn raw_verdict_accepts_integer_points() {
        let raw: RawVerdict = serde_json::from_value(json!({
            "confidence_score": 0.82,
            "verification_result": "Verified",
            "reasoning": "Clean park",
            "suggested_points": 75
        }))
        .unwrap();
        let v = raw.normalize();
        assert_eq!(v.suggested_points, 75);
        assert!(v.key_observations.is_empty());
    }
}
