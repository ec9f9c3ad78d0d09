//! Instructions sent to the collaborator for each section.
//!
//! Each principle has a user template with `{placeholder}` slots filled from
//! the request; the system message carries the shared role context.

use super::sections::{infer_role, EXAMPLE_COUNT};
use super::types::Principle;
use crate::collaborator::{GenerationRequest, Message};
use crate::config::AssemblerConfig;
use crate::input::PromptRequest;

/// System prompt shared by all section requests.
const SECTION_SYSTEM_PROMPT: &str = r#"You are an expert prompt engineer applying the five principles of prompting: give direction, specify format, provide examples, evaluate quality, and divide labor.

You write ONE section of a larger prompt at a time. Output only the requested section text, with no preamble, no headings and no closing remarks."#;

const DIRECTION_TEMPLATE: &str = r#"Write a clear direction statement for an AI assistant.

Task: {task}
Target audience: {audience}
Desired tone: {tone}
Suggested persona: {role}
Context: {context}

Tell the assistant exactly what to do, who the audience is and which tone to use, in two or three sentences. Be specific and actionable."#;

const FORMAT_TEMPLATE: &str = r#"Write format instructions for the output of this task.

Task: {task}
Desired format: {format}
Complexity: {complexity}
Constraints: {constraints}

Describe structure, length and style in one or two sentences. The first sentence must name the {format} format."#;

const EXAMPLES_TEMPLATE: &str = r#"Write {count} short example descriptions that show what good output looks like.

Task: {task}
Output format: {format}
Tone: {tone}
Audience: {audience}

Put each example on its own line. Make them diverse but all high quality."#;

const QUALITY_TEMPLATE: &str = r#"Define quality criteria for evaluating the output of this task.

Task: {task}
Audience: {audience}
Output format: {format}
Tone: {tone}

List four to six specific, measurable criteria, one per line, covering content relevance, audience fit, format adherence and tone."#;

const DECOMPOSITION_TEMPLATE: &str = r#"Break this task into ordered, manageable steps.

Task: {task}
Complexity: {complexity}
Audience: {audience}
Output format: {format}

List three to six steps in logical order, one per line."#;

/// Builds the collaborator request for `principle`.
pub fn build_section_request(
    principle: Principle,
    request: &PromptRequest,
    config: &AssemblerConfig,
) -> GenerationRequest {
    GenerationRequest::new(
        config.model.clone(),
        vec![
            Message::system(SECTION_SYSTEM_PROMPT),
            Message::user(section_instruction(principle, request)),
        ],
    )
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens)
}

/// Fills the template for `principle` from the request.
pub fn section_instruction(principle: Principle, request: &PromptRequest) -> String {
    let template = match principle {
        Principle::Direction => DIRECTION_TEMPLATE,
        Principle::Format => FORMAT_TEMPLATE,
        Principle::Examples => EXAMPLES_TEMPLATE,
        Principle::Quality => QUALITY_TEMPLATE,
        Principle::Decomposition => DECOMPOSITION_TEMPLATE,
    };

    let constraints = if request.has_constraints() {
        request.constraints().join(", ")
    } else {
        "None".to_string()
    };

    template
        .replace("{task}", request.task())
        .replace("{audience}", request.audience())
        .replace("{tone}", request.tone())
        .replace("{role}", infer_role(request.audience(), request.tone()))
        .replace("{context}", request.context().unwrap_or("None"))
        .replace("{format}", request.format().display_name())
        .replace("{complexity}", request.complexity().display_name())
        .replace("{constraints}", &constraints)
        .replace("{count}", &EXAMPLE_COUNT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{OutputFormat, TaskComplexity};

    #[test]
    fn test_every_placeholder_filled() {
        let request = PromptRequest::new("Draft a launch email")
            .expect("valid task")
            .with_format(OutputFormat::Email)
            .with_complexity(TaskComplexity::Complex)
            .with_constraints(["Under 200 words", "Mention the date"]);

        for principle in Principle::ALL {
            let text = section_instruction(principle, &request);
            assert!(!text.contains('{'), "{principle:?} left a placeholder: {text}");
            assert!(text.contains("Draft a launch email"));
        }

        let format = section_instruction(Principle::Format, &request);
        assert!(format.contains("Constraints: Under 200 words, Mention the date"));
        assert!(format.contains("Complexity: complex"));
    }

    #[test]
    fn test_section_request_carries_config() {
        let config = AssemblerConfig::default()
            .with_model("gpt-4o-mini")
            .with_temperature(0.5)
            .with_max_tokens(300);
        let request = PromptRequest::new("Summarize a paper").expect("valid task");

        let generation = build_section_request(Principle::Examples, &request, &config);
        assert_eq!(generation.model, "gpt-4o-mini");
        assert_eq!(generation.temperature, Some(0.5));
        assert_eq!(generation.max_tokens, Some(300));
        assert_eq!(generation.messages.len(), 2);
        assert_eq!(generation.messages[0].role, "system");
        assert!(generation.messages[1]
            .content
            .starts_with("Write 3 short example descriptions"));
    }
}
