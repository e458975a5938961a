//! Review pipeline: normalize → build prompt → invoke model → sanitize.
//!
//! Single pass, one model call at most, nothing kept after the request returns.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::review::extract::{normalize, SubmissionInput};
use crate::review::invoker::ReviewModel;
use crate::review::models::Review;
use crate::review::prompts::build_prompt;
use crate::review::sanitizer::sanitize;

pub async fn review_submission(
    model: &dyn ReviewModel,
    input: SubmissionInput,
) -> Result<Review, AppError> {
    // Document decoding is CPU-bound; keep it off the async workers.
    let text = tokio::task::spawn_blocking(move || normalize(input))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    info!(chars = text.char_count(), bytes = text.len(), "CV text normalized");

    let prompt = build_prompt(&text);
    let raw = model.invoke(&prompt).await?;

    let review = sanitize(&raw).map_err(|e| {
        warn!(error = %e, response_len = raw.len(), "Model output held no JSON object");
        AppError::UnparseableModelOutput
    })?;

    if !review.has_valid_score() {
        warn!("Model output had no usable score; returning sentinel 0");
    }
    info!(
        score = review.score,
        strengths = review.strengths.len(),
        weaknesses = review.weaknesses.len(),
        suggestions = review.suggestions.len(),
        "Review produced"
    );

    Ok(review)
}
