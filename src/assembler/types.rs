//! Output types of prompt assembly.

use serde::Serialize;

/// One of the five prompt-construction concerns, in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Principle {
    Direction,
    Format,
    Examples,
    Quality,
    Decomposition,
}

impl Principle {
    /// All principles in the order their sections appear in the final prompt.
    pub const ALL: [Principle; 5] = [
        Principle::Direction,
        Principle::Format,
        Principle::Examples,
        Principle::Quality,
        Principle::Decomposition,
    ];

    /// Human-readable name of the principle.
    pub fn title(&self) -> &'static str {
        match self {
            Principle::Direction => "Give Direction",
            Principle::Format => "Specify Format",
            Principle::Examples => "Provide Examples",
            Principle::Quality => "Evaluate Quality",
            Principle::Decomposition => "Divide Labor",
        }
    }

    /// One-line summary of what the principle asks for.
    pub fn summary(&self) -> &'static str {
        match self {
            Principle::Direction => {
                "State the task, the audience and the tone so the model knows exactly what to do"
            }
            Principle::Format => "Define the output structure, length and style requirements",
            Principle::Examples => "Show what good output looks like",
            Principle::Quality => "Set measurable criteria for content and format",
            Principle::Decomposition => "Break the work into ordered, manageable steps",
        }
    }
}

impl std::fmt::Display for Principle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Which path produced a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSource {
    Collaborator,
    Fallback,
}

/// The text block produced for one principle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub principle: Principle,
    pub text: String,
    pub source: SectionSource,
}

/// A complete five-section prompt.
///
/// Built once per request by [`super::PromptAssembler::assemble`]; the
/// sections are always present, non-empty and in [`Principle::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPrompt {
    sections: Vec<Section>,
    final_prompt: String,
    confidence_score: f64,
    warnings: Vec<String>,
}

impl GeneratedPrompt {
    pub(crate) fn new(
        sections: Vec<Section>,
        final_prompt: String,
        confidence_score: f64,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            sections,
            final_prompt,
            confidence_score,
            warnings,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Text of the section for `principle`.
    pub fn section(&self, principle: Principle) -> &str {
        self.sections
            .iter()
            .find(|s| s.principle == principle)
            .map(|s| s.text.as_str())
            .unwrap_or_default()
    }

    /// Which path produced the section for `principle`.
    pub fn section_source(&self, principle: Principle) -> Option<SectionSource> {
        self.sections
            .iter()
            .find(|s| s.principle == principle)
            .map(|s| s.source)
    }

    pub fn direction(&self) -> &str {
        self.section(Principle::Direction)
    }

    pub fn format_specification(&self) -> &str {
        self.section(Principle::Format)
    }

    pub fn examples(&self) -> &str {
        self.section(Principle::Examples)
    }

    pub fn quality_criteria(&self) -> &str {
        self.section(Principle::Quality)
    }

    pub fn task_decomposition(&self) -> &str {
        self.section(Principle::Decomposition)
    }

    /// The concatenated prompt, ready to paste into a model.
    pub fn final_prompt(&self) -> &str {
        &self.final_prompt
    }

    /// Heuristic completeness score in [0, 1]. Not a statistical estimate.
    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    /// Collaborator failures that were resolved by a fallback.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of sections the collaborator produced.
    pub fn collaborator_sections(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.source == SectionSource::Collaborator)
            .count()
    }

    /// True when every section came from the templates.
    pub fn is_fallback_only(&self) -> bool {
        self.collaborator_sections() == 0
    }
}
