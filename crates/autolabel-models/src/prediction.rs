//! Per-task prediction models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationResult;

/// The prediction returned to the host for one task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    /// One result record per retained detection
    pub result: Vec<AnnotationResult>,
    /// Batch-level score: max of the detection confidences, 0 when empty
    pub score: f32,
    /// Version tag of the model that produced the results
    pub model_version: String,
}

impl Prediction {
    /// Build a prediction from result records, aggregating the score.
    pub fn new(result: Vec<AnnotationResult>, model_version: impl Into<String>) -> Self {
        let score = result.iter().map(|r| r.score).fold(0.0_f32, f32::max);
        Self {
            result,
            score,
            model_version: model_version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::RectangleValue;

    fn result_with_score(score: f32) -> AnnotationResult {
        let value = RectangleValue::from_pixel_box((0.0, 0.0, 10.0, 10.0), 100, 100, "cat");
        AnnotationResult::rectangle(value, score)
    }

    #[test]
    fn test_score_is_max_of_results() {
        let prediction = Prediction::new(
            vec![result_with_score(0.3), result_with_score(0.8), result_with_score(0.5)],
            "0.0.1",
        );
        assert!((prediction.score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_empty_result_scores_zero() {
        let prediction = Prediction::new(vec![], "0.0.1");
        assert_eq!(prediction.score, 0.0);
        assert!(prediction.result.is_empty());
    }
}
