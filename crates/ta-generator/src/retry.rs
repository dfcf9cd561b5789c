//! Bounded retries around a single model call.

use std::time::Duration;

use ta_core::{GeneratedText, LanguageModel, RetryBudget};

use crate::error::GenerationError;

/// Longest pause between two attempts.
const BACKOFF_MAX: Duration = Duration::from_secs(8);

/// Call `model` until it returns non-empty text, at most `attempts_max` times.
///
/// Empty responses and service errors both count as failed attempts.
pub async fn generate_with_retry<M>(
    model: &M,
    prompt: &str,
    attempts_max: u32,
) -> Result<GeneratedText, GenerationError>
where
    M: LanguageModel,
{
    generate_with_backoff(model, prompt, attempts_max, Duration::ZERO).await
}

/// [`generate_with_retry`] with a doubling pause between attempts.
pub async fn generate_with_backoff<M>(
    model: &M,
    prompt: &str,
    attempts_max: u32,
    backoff: Duration,
) -> Result<GeneratedText, GenerationError>
where
    M: LanguageModel,
{
    debug_assert!(attempts_max > 0, "At least one attempt is required");

    let mut budget = RetryBudget::new(attempts_max);
    let mut last_error = "no attempt was made".to_string();
    let mut delay = backoff;

    while let Some(attempt) = budget.consume() {
        if attempt > 1 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(BACKOFF_MAX);
        }

        match model.generate(prompt).await {
            Ok(text) if !text.is_empty() => {
                tracing::debug!(attempt, chars = text.as_str().len(), "Model responded");
                return Ok(text);
            }
            Ok(_) => {
                tracing::warn!(attempt, attempts_max, "Model returned an empty response");
                last_error = "empty response".to_string();
            }
            Err(e) => {
                tracing::warn!(attempt, attempts_max, error = %e, "Model call failed");
                last_error = e.to_string();
            }
        }
    }

    Err(GenerationError::Exhausted {
        attempts: budget.used(),
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ta_core::ServiceError;
    use ta_dst::ScriptedModel;

    #[tokio::test]
    async fn test_first_non_empty_wins() {
        let model = ScriptedModel::new()
            .then_empty()
            .then_error(ServiceError::Transport("reset".to_string()))
            .then_text("answer");

        let text = generate_with_retry(&model, "prompt", 3).await.unwrap();
        assert_eq!(text.as_str(), "answer");
        assert_eq!(model.calls_count(), 3);
    }

    #[tokio::test]
    async fn test_whitespace_only_is_empty() {
        let model = ScriptedModel::new().then_text("  \n ").then_text("ok");
        let text = generate_with_retry(&model, "prompt", 3).await.unwrap();
        assert_eq!(text.as_str(), "ok");
    }

    #[tokio::test]
    async fn test_exhausted_reports_last_error() {
        let model = ScriptedModel::new()
            .then_error(ServiceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
            .then_empty()
            .then_empty()
            .then_text("too late");

        let err = generate_with_retry(&model, "prompt", 3).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Exhausted {
                attempts: 3,
                last_error: "empty response".to_string()
            }
        );
        assert_eq!(model.calls_count(), 3);
        assert_eq!(model.remaining(), 1);
    }

    #[tokio::test]
    async fn test_same_prompt_every_attempt() {
        let model = ScriptedModel::new().then_empty().then_text("ok");
        generate_with_retry(&model, "same", 2).await.unwrap();
        assert_eq!(model.prompts(), ["same", "same"]);
    }

    #[tokio::test]
    async fn test_backoff_pauses_between_attempts() {
        let model = ScriptedModel::new().then_empty().then_empty().then_text("ok");
        let start = std::time::Instant::now();

        generate_with_backoff(&model, "p", 3, Duration::from_millis(20))
            .await
            .unwrap();
        // 20ms then 40ms
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
