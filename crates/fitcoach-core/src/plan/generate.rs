//! Plan generation client: one completion call, decoded into a typed plan.
//!
//! Also hosts the free-form coaching chat used by the legacy `/api/fitness`
//! route, which shares the provider but skips decoding.

use thiserror::Error;

use crate::model::{Plan, UserProfile};
use crate::plan::decode::{PlanDecodeError, decode_plan};
use crate::plan::prompt::build_plan_prompt;
use crate::provider::{ChatMessage, CompletionRequest, ProviderError, TextGenerator};

/// Model used for structured plan generation.
pub const PLAN_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for structured plan generation.
pub const PLAN_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for the free-form coaching chat.
pub const COACH_TEMPERATURE: f32 = 0.8;

/// System message for the free-form coaching chat.
pub const COACH_SYSTEM_PROMPT: &str = "You are an AI fitness coach that creates personalized \
7-day fitness and diet plans in clear bullet points.";

/// Reply used when the provider answers the chat without any content.
pub const EMPTY_COACH_REPLY: &str = "No response received.";

/// Errors from [`generate_plan`].
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("plan generation request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("provider response is not a valid plan: {0}")]
    Decode(#[from] PlanDecodeError),
}

/// Build the completion request for a profile.
pub fn plan_completion_request(profile: &UserProfile) -> CompletionRequest {
    CompletionRequest {
        model: PLAN_MODEL.to_string(),
        messages: vec![ChatMessage::user(build_plan_prompt(profile))],
        temperature: PLAN_TEMPERATURE,
    }
}

/// Generate a plan for `profile`.
///
/// Issues exactly one provider call; no retries, no caching. On success the
/// plan carries the profile's name.
pub async fn generate_plan(
    generator: &dyn TextGenerator,
    profile: &UserProfile,
) -> Result<Plan, GenerateError> {
    let request = plan_completion_request(profile);

    tracing::debug!(
        provider = generator.name(),
        model = %request.model,
        goal = %profile.goal,
        "requesting plan"
    );

    let content = generator.complete(&request).await?.unwrap_or_default();
    let mut plan = decode_plan(&content)?;
    plan.name = Some(profile.name.clone());

    tracing::info!(
        workouts = plan.workouts.len(),
        meals = plan.meals.len(),
        "plan generated"
    );
    Ok(plan)
}

/// Free-form coaching reply for an arbitrary prompt.
pub async fn coach_reply(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<String, ProviderError> {
    let request = CompletionRequest {
        model: PLAN_MODEL.to_string(),
        messages: vec![
            ChatMessage::system(COACH_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ],
        temperature: COACH_TEMPERATURE,
    };
    let content = generator.complete(&request).await?;
    Ok(content
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| EMPTY_COACH_REPLY.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{Gender, Goal};
    use crate::provider::Role;

    /// Returns a fixed response and records every request.
    struct Scripted {
        response: Result<Option<String>, ()>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(Some(text.to_string())),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<Option<String>, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone().map_err(|_| ProviderError::Status {
                provider: "scripted",
                status: 500,
                body: "boom".into(),
            })
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Ana".into(),
            age: 29,
            height: None,
            weight: None,
            gender: Gender::Unspecified,
            goal: Goal::MuscleGain,
        }
    }

    #[test]
    fn request_uses_fixed_model_and_temperature() {
        let request = plan_completion_request(&profile());
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn generated_plan_carries_profile_name() {
        let generator = Scripted::ok(
            "```json\n{\"summary\": \"s\", \"workouts\": [], \"meals\": []}\n```",
        );
        let plan = generate_plan(&generator, &profile()).await.unwrap();
        assert_eq!(plan.name.as_deref(), Some("Ana"));
        assert_eq!(generator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_not_retried() {
        let generator = Scripted {
            response: Err(()),
            seen: Mutex::new(Vec::new()),
        };
        let err = generate_plan(&generator, &profile()).await.unwrap_err();
        assert!(matches!(err, GenerateError::Provider(_)));
        assert_eq!(generator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_content_is_a_decode_error() {
        let generator = Scripted {
            response: Ok(None),
            seen: Mutex::new(Vec::new()),
        };
        let err = generate_plan(&generator, &profile()).await.unwrap_err();
        assert!(matches!(err, GenerateError::Decode(PlanDecodeError::Empty)));
    }

    #[tokio::test]
    async fn coach_reply_uses_system_prompt_and_fallback() {
        let generator = Scripted {
            response: Ok(Some(String::new())),
            seen: Mutex::new(Vec::new()),
        };
        let reply = coach_reply(&generator, "help me").await.unwrap();
        assert_eq!(reply, EMPTY_COACH_REPLY);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0].temperature, COACH_TEMPERATURE);
        assert_eq!(seen[0].messages[0].role, Role::System);
        assert_eq!(seen[0].messages[1].content, "help me");
    }
}
