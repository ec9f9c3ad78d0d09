//! Section generators, one per principle.
//!
//! Every generator takes the request and an optional collaborator reply that
//! has already been through [`normalize_reply`]. With `None` it renders the
//! deterministic template; the output depends on nothing but its arguments.

use super::types::Principle;
use crate::error::CollaboratorError;
use crate::input::{OutputFormat, PromptRequest};

/// Heading of the examples section.
pub const EXAMPLES_HEADING: &str = "Examples of good output:";

/// Heading of the quality criteria section.
pub const QUALITY_HEADING: &str = "Quality criteria:";

/// Heading of the task decomposition section.
pub const DECOMPOSITION_HEADING: &str = "Approach this task step by step:";

/// Appended to the format section for complex tasks.
pub const STRUCTURE_HINT: &str =
    "Organize the response with explicit structural markers such as headings and bullet points.";

/// Appended to the format section when JSON output is requested.
pub const JSON_SCHEMA_HINT: &str = "Return only valid JSON following this schema: {\"title\": \"string\", \"sections\": [{\"heading\": \"string\", \"content\": \"string\"}], \"summary\": \"string\"}.";

/// Placeholder used when the request turns examples off.
pub const EXAMPLES_OMITTED: &str = "Examples omitted per user request";

/// Number of examples the section carries.
pub const EXAMPLE_COUNT: usize = 3;

/// Renders the section for `principle`.
pub fn render(principle: Principle, request: &PromptRequest, reply: Option<&str>) -> String {
    match principle {
        Principle::Direction => direction(request, reply),
        Principle::Format => format_specification(request, reply),
        Principle::Examples => examples(request, reply),
        Principle::Quality => quality_criteria(request, reply),
        Principle::Decomposition => task_decomposition(request, reply),
    }
}

/// Role, task, audience and tone, followed by context and constraints.
pub fn direction(request: &PromptRequest, reply: Option<&str>) -> String {
    let mut text = match reply {
        Some(reply) => reply.to_string(),
        None => format!(
            "You are {} helping {} with the following task: {} Use a {} tone throughout your response.",
            infer_role(request.audience(), request.tone()),
            request.audience(),
            sentence(request.task()),
            request.tone(),
        ),
    };

    if let Some(context) = request.context() {
        text.push_str(&format!(" Context: {}", sentence(context)));
    }

    if request.has_constraints() {
        text.push_str(&format!(
            " Keep these constraints in mind: {}.",
            request
                .constraints()
                .iter()
                .map(|c| bare(c))
                .collect::<Vec<_>>()
                .join("; ")
        ));
    }

    text
}

/// Output format statement plus the structure and schema hints.
pub fn format_specification(request: &PromptRequest, reply: Option<&str>) -> String {
    let mut parts = vec![match reply {
        Some(reply) => reply.to_string(),
        None => format!("Format your response as {}.", request.format()),
    }];

    if request.complexity().is_complex() {
        parts.push(STRUCTURE_HINT.to_string());
    }
    if request.format() == OutputFormat::Json {
        parts.push(JSON_SCHEMA_HINT.to_string());
    }

    parts.join(" ")
}

/// Three example descriptors, or the collaborator's three examples.
pub fn examples(request: &PromptRequest, reply: Option<&str>) -> String {
    let items: Vec<String> = if !request.examples_needed() {
        vec![EXAMPLES_OMITTED.to_string()]
    } else {
        match reply {
            Some(reply) => reply.lines().map(str::to_string).collect(),
            None => vec![
                format!("Example 1: [Sample output for {}]", bare(request.task())),
                format!(
                    "Example 2: [Another sample written in a {} tone]",
                    request.tone()
                ),
                format!(
                    "Example 3: [A third sample tailored to {}]",
                    request.audience()
                ),
            ],
        }
    };

    bulleted(EXAMPLES_HEADING, &items)
}

/// Four numbered criteria: relevance, audience, format, tone.
pub fn quality_criteria(request: &PromptRequest, reply: Option<&str>) -> String {
    let items: Vec<String> = match reply {
        Some(reply) => reply.lines().map(str::to_string).collect(),
        None => vec![
            format!("Directly addresses the task: {}", bare(request.task())),
            format!("Is appropriate for {}", request.audience()),
            format!("Follows the {} format exactly", request.format()),
            format!("Maintains a {} tone throughout", request.tone()),
        ],
    };

    numbered(QUALITY_HEADING, &items)
}

/// Four numbered steps: analyze, research, structure, refine.
pub fn task_decomposition(request: &PromptRequest, reply: Option<&str>) -> String {
    let items: Vec<String> = match reply {
        Some(reply) => reply.lines().map(str::to_string).collect(),
        None => vec![
            format!("Analyze the requirements of the task: {}", bare(request.task())),
            format!(
                "Research and gather information relevant to {}",
                request.audience()
            ),
            format!("Structure the content in {} format", request.format()),
            format!("Review and refine the draft for a {} tone", request.tone()),
        ],
    };

    numbered(DECOMPOSITION_HEADING, &items)
}

/// Cleans a collaborator reply for `principle`.
///
/// Prose sections are trimmed. List sections lose headings, bullets and
/// numbering so they can be renumbered; the examples section keeps exactly
/// [`EXAMPLE_COUNT`] items.
///
/// # Errors
///
/// `CollaboratorError::EmptyResponse` for blank replies and
/// `CollaboratorError::Malformed` when a list section has too few items.
pub fn normalize_reply(principle: Principle, raw: &str) -> Result<String, CollaboratorError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CollaboratorError::EmptyResponse);
    }

    match principle {
        Principle::Direction | Principle::Format => Ok(collapse_whitespace(trimmed)),
        Principle::Examples => {
            let items = list_items(trimmed);
            if items.len() < EXAMPLE_COUNT {
                return Err(CollaboratorError::Malformed(format!(
                    "expected {} examples, got {}",
                    EXAMPLE_COUNT,
                    items.len()
                )));
            }
            Ok(items[..EXAMPLE_COUNT].join("\n"))
        }
        Principle::Quality | Principle::Decomposition => {
            let items = list_items(trimmed);
            if items.is_empty() {
                return Err(CollaboratorError::Malformed("no list items found".to_string()));
            }
            Ok(items.join("\n"))
        }
    }
}

/// Picks an expert persona from audience keywords first, then tone keywords.
pub fn infer_role(audience: &str, tone: &str) -> &'static str {
    const AUDIENCE_ROLES: &[(&[&str], &str)] = &[
        (
            &["beginner", "novice", "student", "learner", "child", "kid"],
            "a patient and knowledgeable teacher",
        ),
        (
            &["executive", "business", "manager", "stakeholder", "investor"],
            "a seasoned business consultant",
        ),
        (
            &["developer", "engineer", "programmer", "technical"],
            "a senior technical expert",
        ),
        (
            &["academic", "researcher", "scientist", "scholar"],
            "an experienced academic researcher",
        ),
        (
            &["customer", "client", "patient", "user"],
            "a customer communication specialist",
        ),
    ];
    const TONE_ROLES: &[(&[&str], &str)] = &[
        (
            &["academic", "formal", "scholarly"],
            "an experienced academic researcher",
        ),
        (
            &["persuasive", "marketing", "sales"],
            "a skilled copywriter",
        ),
        (
            &["friendly", "casual", "encouraging", "warm", "playful"],
            "an approachable subject-matter expert",
        ),
    ];

    let audience = audience.to_lowercase();
    let tone = tone.to_lowercase();

    AUDIENCE_ROLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| audience.contains(k)))
        .or_else(|| {
            TONE_ROLES
                .iter()
                .find(|(keywords, _)| keywords.iter().any(|k| tone.contains(k)))
        })
        .map(|(_, role)| *role)
        .unwrap_or("an expert assistant")
}

fn bulleted(heading: &str, items: &[String]) -> String {
    let mut text = heading.to_string();
    for item in items {
        text.push_str("\n- ");
        text.push_str(item);
    }
    text
}

fn numbered(heading: &str, items: &[String]) -> String {
    let mut text = heading.to_string();
    for (i, item) in items.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, item));
    }
    text
}

/// Non-empty lines with list markers removed. A leading line ending in `:`
/// is a heading and is dropped; later colon-terminated lines are items.
fn list_items(text: &str) -> Vec<String> {
    let mut lines = text
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .peekable();

    if lines.peek().is_some_and(|first| first.ends_with(':')) {
        lines.next();
    }

    lines.map(str::to_string).collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    line.trim()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text without trailing sentence punctuation, for interpolation mid-sentence.
fn bare(text: &str) -> &str {
    text.trim().trim_end_matches(['.', '!', '?', ';', ':'])
}

/// Text ending in exactly one sentence terminator.
fn sentence(text: &str) -> String {
    let text = text.trim();
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}
