//! The validated prompt request and the raw form values it is built from.

use serde::{Deserialize, Serialize};

use super::options::{OutputFormat, TaskComplexity};
use crate::error::ValidationError;

/// Audience used when the form leaves the field blank.
pub const DEFAULT_AUDIENCE: &str = "general audience";

/// Tone used when the form leaves the field blank.
pub const DEFAULT_TONE: &str = "professional and helpful";

/// Values substituted for fields the user did not fill in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub audience: String,
    pub tone: String,
    pub format: OutputFormat,
    pub complexity: TaskComplexity,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            audience: DEFAULT_AUDIENCE.to_string(),
            tone: DEFAULT_TONE.to_string(),
            format: OutputFormat::default(),
            complexity: TaskComplexity::default(),
        }
    }
}

/// Unvalidated form values as a front end collects them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPromptInput {
    pub task: String,
    pub audience: Option<String>,
    pub tone: Option<String>,
    pub format: Option<String>,
    pub complexity: Option<String>,
    /// Free text, one constraint per line.
    pub constraints: Option<String>,
    pub context: Option<String>,
    pub examples_needed: Option<bool>,
}

impl RawPromptInput {
    /// Validates the raw values, filling blanks from `defaults`.
    pub fn into_request(self, defaults: &FormDefaults) -> Result<PromptRequest, ValidationError> {
        let format = match non_blank(self.format) {
            Some(raw) => raw.parse()?,
            None => defaults.format,
        };
        let complexity = match non_blank(self.complexity) {
            Some(raw) => raw.parse()?,
            None => defaults.complexity,
        };

        let mut request = PromptRequest::new(self.task)?
            .with_audience(non_blank(self.audience).unwrap_or_else(|| defaults.audience.clone()))
            .with_tone(non_blank(self.tone).unwrap_or_else(|| defaults.tone.clone()))
            .with_format(format)
            .with_complexity(complexity)
            .with_examples(self.examples_needed.unwrap_or(true));

        if let Some(text) = self.constraints {
            request = request.with_constraints(split_constraints(&text));
        }
        if let Some(context) = non_blank(self.context) {
            request = request.with_context(context);
        }

        Ok(request)
    }
}

impl TryFrom<RawPromptInput> for PromptRequest {
    type Error = ValidationError;

    fn try_from(raw: RawPromptInput) -> Result<Self, Self::Error> {
        raw.into_request(&FormDefaults::default())
    }
}

/// A validated, immutable request for one prompt generation.
///
/// Equality and hashing cover every field, which is what the result cache
/// keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromptRequest {
    task: String,
    audience: String,
    tone: String,
    format: OutputFormat,
    complexity: TaskComplexity,
    constraints: Vec<String>,
    context: Option<String>,
    examples_needed: bool,
}

impl PromptRequest {
    /// Creates a request with default audience, tone, format and complexity.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTask` if `task` is empty or whitespace.
    pub fn new(task: impl Into<String>) -> Result<Self, ValidationError> {
        let task = task.into().trim().to_string();
        if task.is_empty() {
            return Err(ValidationError::EmptyTask);
        }

        let defaults = FormDefaults::default();
        Ok(Self {
            task,
            audience: defaults.audience,
            tone: defaults.tone,
            format: defaults.format,
            complexity: defaults.complexity,
            constraints: Vec::new(),
            context: None,
            examples_needed: true,
        })
    }

    /// Sets the audience; blank values keep the current one.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        if let Some(audience) = non_blank(Some(audience.into())) {
            self.audience = audience;
        }
        self
    }

    /// Sets the tone; blank values keep the current one.
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        if let Some(tone) = non_blank(Some(tone.into())) {
            self.tone = tone;
        }
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_complexity(mut self, complexity: TaskComplexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Replaces the constraint list. Blank entries are dropped.
    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints = constraints
            .into_iter()
            .filter_map(|c| non_blank(Some(c.into())))
            .collect();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = non_blank(Some(context.into()));
        self
    }

    pub fn with_examples(mut self, examples_needed: bool) -> Self {
        self.examples_needed = examples_needed;
        self
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn complexity(&self) -> TaskComplexity {
        self.complexity
    }

    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn examples_needed(&self) -> bool {
        self.examples_needed
    }
}

/// Splits constraint text into one trimmed entry per non-empty line.
pub fn split_constraints(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
