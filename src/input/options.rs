//! Enumerated form options: output format and task complexity.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The shape the final answer should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Email,
    List,
    Code,
    Essay,
    Report,
    CreativeWriting,
    Other,
}

impl OutputFormat {
    /// Every selectable format, in the order the form lists them.
    pub const ALL: [OutputFormat; 9] = [
        OutputFormat::Text,
        OutputFormat::Json,
        OutputFormat::Email,
        OutputFormat::List,
        OutputFormat::Code,
        OutputFormat::Essay,
        OutputFormat::Report,
        OutputFormat::CreativeWriting,
        OutputFormat::Other,
    ];

    /// Name used inside generated prompt text.
    pub fn display_name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "JSON",
            OutputFormat::Email => "email",
            OutputFormat::List => "list",
            OutputFormat::Code => "code",
            OutputFormat::Essay => "essay",
            OutputFormat::Report => "report",
            OutputFormat::CreativeWriting => "creative writing",
            OutputFormat::Other => "other",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain text" | "plain_text" | "plain-text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "email" | "e-mail" => Ok(OutputFormat::Email),
            "list" | "bulleted list" | "bulleted_list" | "bullets" => Ok(OutputFormat::List),
            "code" => Ok(OutputFormat::Code),
            "essay" => Ok(OutputFormat::Essay),
            "report" => Ok(OutputFormat::Report),
            "creative writing" | "creative_writing" | "creative-writing" | "creative" => {
                Ok(OutputFormat::CreativeWriting)
            }
            "other" => Ok(OutputFormat::Other),
            _ => Err(ValidationError::UnknownFormat(s.to_string())),
        }
    }
}

/// How much the task benefits from being broken down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskComplexity {
    Simple,
    #[default]
    Moderate,
    Complex,
    VeryComplex,
}

impl TaskComplexity {
    pub const ALL: [TaskComplexity; 4] = [
        TaskComplexity::Simple,
        TaskComplexity::Moderate,
        TaskComplexity::Complex,
        TaskComplexity::VeryComplex,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskComplexity::Simple => "simple",
            TaskComplexity::Moderate => "moderate",
            TaskComplexity::Complex => "complex",
            TaskComplexity::VeryComplex => "very complex",
        }
    }

    /// True for the levels that ask for explicit structural markers.
    pub fn is_complex(&self) -> bool {
        matches!(self, TaskComplexity::Complex | TaskComplexity::VeryComplex)
    }
}

impl std::fmt::Display for TaskComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for TaskComplexity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(TaskComplexity::Simple),
            "moderate" => Ok(TaskComplexity::Moderate),
            "complex" => Ok(TaskComplexity::Complex),
            "very complex" | "very_complex" | "very-complex" => Ok(TaskComplexity::VeryComplex),
            _ => Err(ValidationError::UnknownComplexity(s.to_string())),
        }
    }
}
