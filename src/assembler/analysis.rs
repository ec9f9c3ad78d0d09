//! Superficial metrics over a generated prompt.
//!
//! Completeness ratios per principle, word counts and a quality band derived
//! from the confidence score. Like the score itself these are display aids.

use serde::Serialize;

use super::sections::{DECOMPOSITION_HEADING, EXAMPLES_HEADING, QUALITY_HEADING};
use super::types::{GeneratedPrompt, Principle};

/// Coarse label for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    Excellent,
    Good,
    NeedsRefinement,
}

impl QualityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            QualityBand::Excellent
        } else if score >= 0.6 {
            QualityBand::Good
        } else {
            QualityBand::NeedsRefinement
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            QualityBand::Excellent => "Excellent prompt quality",
            QualityBand::Good => "Good prompt quality",
            QualityBand::NeedsRefinement => "Consider refining your inputs",
        }
    }
}

/// Completeness ratio of one principle, capped at 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrincipleCompleteness {
    pub principle: Principle,
    pub completeness: f64,
}

/// Word counts of the prose parts and the whole prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCounts {
    pub direction: usize,
    pub format_specification: usize,
    pub quality_criteria: usize,
    pub final_prompt: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptAnalysis {
    pub confidence_percent: u32,
    pub band: QualityBand,
    pub completeness: Vec<PrincipleCompleteness>,
    pub word_counts: WordCounts,
}

impl PromptAnalysis {
    pub fn from_prompt(prompt: &GeneratedPrompt) -> Self {
        let quality_body = body(prompt.quality_criteria(), QUALITY_HEADING);
        let example_count = items(prompt.examples(), EXAMPLES_HEADING);
        let step_count = items(prompt.task_decomposition(), DECOMPOSITION_HEADING);

        let completeness = Principle::ALL
            .iter()
            .map(|principle| {
                let ratio = match principle {
                    Principle::Direction => char_len(prompt.direction()) / 100.0,
                    Principle::Format => char_len(prompt.format_specification()) / 50.0,
                    Principle::Examples => example_count as f64 / 2.0,
                    Principle::Quality => char_len(quality_body) / 75.0,
                    Principle::Decomposition => step_count as f64 / 3.0,
                };
                PrincipleCompleteness {
                    principle: *principle,
                    completeness: ratio.min(1.0),
                }
            })
            .collect();

        Self {
            confidence_percent: (prompt.confidence_score() * 100.0).round() as u32,
            band: QualityBand::from_score(prompt.confidence_score()),
            completeness,
            word_counts: WordCounts {
                direction: words(prompt.direction()),
                format_specification: words(prompt.format_specification()),
                quality_criteria: words(quality_body),
                final_prompt: words(prompt.final_prompt()),
            },
        }
    }

    /// Mean completeness across the five principles.
    pub fn overall_completeness(&self) -> f64 {
        if self.completeness.is_empty() {
            return 0.0;
        }
        self.completeness.iter().map(|c| c.completeness).sum::<f64>()
            / self.completeness.len() as f64
    }
}

fn body<'a>(section: &'a str, heading: &str) -> &'a str {
    section.strip_prefix(heading).unwrap_or(section).trim()
}

fn items(section: &str, heading: &str) -> usize {
    body(section, heading)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

fn char_len(text: &str) -> f64 {
    text.chars().count() as f64
}

fn words(text: &str) -> usize {
    text.split_whitespace().count()
}
