//! Confidence heuristic.
//!
//! A weighted completeness check over the request and the assembled
//! sections. It is cosmetic: the number is meant for display and carries no
//! statistical meaning.

use super::sections::STRUCTURE_HINT;
use crate::input::PromptRequest;

/// Starting score for any assembled prompt.
pub const BASE_CONFIDENCE: f64 = 0.55;

/// Added when the request lists constraints.
pub const CONSTRAINTS_BONUS: f64 = 0.15;

/// Added when a complex request got its structural markers.
pub const STRUCTURE_BONUS: f64 = 0.15;

/// Added when the collaborator produced at least one section.
pub const COLLABORATOR_BONUS: f64 = 0.15;

/// Scores an assembled prompt; the result is clamped to [0, 1].
pub fn confidence_score(
    request: &PromptRequest,
    format_section: &str,
    collaborator_sections: usize,
) -> f64 {
    let mut score = BASE_CONFIDENCE;

    if request.has_constraints() {
        score += CONSTRAINTS_BONUS;
    }
    if request.complexity().is_complex() && format_section.contains(STRUCTURE_HINT) {
        score += STRUCTURE_BONUS;
    }
    if collaborator_sections > 0 {
        score += COLLABORATOR_BONUS;
    }

    score.clamp(0.0, 1.0)
}
