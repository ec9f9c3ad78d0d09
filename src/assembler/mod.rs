//! Five-principle prompt assembly.
//!
//! [`PromptAssembler::assemble`] walks [`Principle::ALL`] in order. For each
//! principle it asks the collaborator for the section (bounded by the
//! configured timeout), cleans the reply, and renders the section; any
//! failure on that path falls back to the section's template and is reported
//! as a warning. The five sections are joined with blank lines and a closing
//! instruction, and scored with the confidence heuristic.
//!
//! ```ignore
//! use prompt_forge::assembler::PromptAssembler;
//! use prompt_forge::config::AssemblerConfig;
//! use prompt_forge::input::PromptRequest;
//!
//! let assembler = PromptAssembler::from_config(AssemblerConfig::from_env()?)?;
//! let request = PromptRequest::new("Write a blog post about sustainable gardening")?;
//! let prompt = assembler.assemble(&request).await;
//! println!("{}", prompt.final_prompt());
//! ```

pub mod analysis;
pub mod cache;
pub mod instructions;
pub mod scoring;
pub mod sections;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collaborator::{ChatCompletionsClient, TextCollaborator};
use crate::config::AssemblerConfig;
use crate::error::{CollaboratorError, ConfigError};
use crate::input::PromptRequest;

pub use analysis::{PromptAnalysis, QualityBand};
pub use cache::{CacheConfig, CacheStats, ContentHash, ResultCache};
pub use types::{GeneratedPrompt, Principle, Section, SectionSource};

/// Sentence that closes every assembled prompt.
pub const CLOSING_INSTRUCTION: &str =
    "Now, please complete the task following all the above guidelines.";

/// Builds [`GeneratedPrompt`]s from [`PromptRequest`]s.
pub struct PromptAssembler {
    config: AssemblerConfig,
    collaborator: Option<Arc<dyn TextCollaborator>>,
    cache: Option<ResultCache>,
}

impl PromptAssembler {
    /// Validates `config` and creates a template-only assembler. Attach a
    /// collaborator with [`PromptAssembler::with_collaborator`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration does not validate.
    pub fn new(config: AssemblerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cache = (config.cache_entries > 0).then(|| {
            ResultCache::new(CacheConfig::new(config.cache_entries).with_ttl(config.cache_ttl()))
        });

        Ok(Self {
            config,
            collaborator: None,
            cache,
        })
    }

    /// Like [`PromptAssembler::new`], but also attaches an HTTP collaborator
    /// when an API key is present and offline mode is off.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for invalid settings or an unusable HTTP client.
    pub fn from_config(config: AssemblerConfig) -> Result<Self, ConfigError> {
        if !config.wants_collaborator() {
            info!(offline = config.offline, "Template-only generation");
            return Self::new(config);
        }

        config.validate()?;
        let client = ChatCompletionsClient::from_config(&config)?;
        info!(
            model = %client.default_model(),
            api_base = %client.api_base(),
            api_key = %client.api_key_masked(),
            "Live generation enabled"
        );
        Ok(Self::new(config)?.with_collaborator(Arc::new(client)))
    }

    /// Attaches a collaborator.
    pub fn with_collaborator(mut self, collaborator: Arc<dyn TextCollaborator>) -> Self {
        self.collaborator = Some(collaborator);
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Whether sections will be delegated to a collaborator.
    pub fn has_collaborator(&self) -> bool {
        !self.config.offline && self.collaborator.is_some()
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResultCache::stats)
    }

    /// Assembles the five-section prompt for `request`.
    ///
    /// Never fails: collaborator problems only change which path produced a
    /// section and add an entry to [`GeneratedPrompt::warnings`].
    pub async fn assemble(&self, request: &PromptRequest) -> GeneratedPrompt {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(request) {
                debug!(hit_rate = cache.stats().hit_rate(), "Returning cached prompt");
                return cached;
            }
        }

        info!(
            format = %request.format(),
            complexity = %request.complexity(),
            constraints = request.constraints().len(),
            live = self.has_collaborator(),
            "Assembling prompt"
        );

        let mut built = Vec::with_capacity(Principle::ALL.len());
        let mut warnings = Vec::new();

        for principle in Principle::ALL {
            let (reply, source) = match self.consult(principle, request).await {
                Ok(reply) => (Some(reply), SectionSource::Collaborator),
                Err(CollaboratorError::Unavailable) => {
                    debug!(principle = %principle, "Rendering template section");
                    (None, SectionSource::Fallback)
                }
                Err(err) => {
                    warn!(principle = %principle, error = %err, "Collaborator failed, using template");
                    warnings.push(format!("{principle}: {err}"));
                    (None, SectionSource::Fallback)
                }
            };

            built.push(Section {
                principle,
                text: sections::render(principle, request, reply.as_deref()),
                source,
            });
        }

        let final_prompt = join_sections(&built);
        let collaborator_sections = built
            .iter()
            .filter(|s| s.source == SectionSource::Collaborator)
            .count();
        let format_section = built
            .iter()
            .find(|s| s.principle == Principle::Format)
            .map(|s| s.text.as_str())
            .unwrap_or_default();
        let confidence = scoring::confidence_score(request, format_section, collaborator_sections);

        info!(
            confidence = confidence,
            collaborator_sections,
            warnings = warnings.len(),
            "Prompt assembled"
        );

        let prompt = GeneratedPrompt::new(built, final_prompt, confidence, warnings);

        // Only clean results are cached.
        if let Some(cache) = &self.cache {
            if prompt.warnings().is_empty() {
                cache.insert(request, prompt.clone());
            }
        }

        prompt
    }

    /// Asks the collaborator for one section and cleans the reply.
    async fn consult(
        &self,
        principle: Principle,
        request: &PromptRequest,
    ) -> Result<String, CollaboratorError> {
        if principle == Principle::Examples && !request.examples_needed() {
            return Err(CollaboratorError::Unavailable);
        }

        let collaborator = match &self.collaborator {
            Some(collaborator) if !self.config.offline => collaborator,
            _ => return Err(CollaboratorError::Unavailable),
        };

        let generation = instructions::build_section_request(principle, request, &self.config);
        debug!(principle = %principle, "Consulting collaborator");

        let response = tokio::time::timeout(self.config.timeout(), collaborator.generate(generation))
            .await
            .map_err(|_| CollaboratorError::Timeout {
                seconds: self.config.timeout_secs,
            })??;

        let content = response
            .first_content()
            .ok_or(CollaboratorError::EmptyResponse)?;

        sections::normalize_reply(principle, content)
    }
}

/// Joins sections with blank lines and appends the closing instruction.
fn join_sections(sections: &[Section]) -> String {
    let mut parts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
    parts.push(CLOSING_INSTRUCTION);
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{GenerationRequest, GenerationResponse};
    use crate::input::{OutputFormat, TaskComplexity};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Reply {
        Text(&'static str),
        Unauthorized,
    }

    /// Collaborator that answers from a script keyed on the start of the
    /// section instruction; unscripted sections fail with a connection error.
    struct ScriptedCollaborator {
        replies: Vec<(&'static str, Reply)>,
        calls: Mutex<usize>,
    }

    impl ScriptedCollaborator {
        fn new(replies: Vec<(&'static str, Reply)>) -> Self {
            Self {
                replies,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().expect("calls lock")
        }
    }

    #[async_trait]
    impl TextCollaborator for ScriptedCollaborator {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, CollaboratorError> {
            *self.calls.lock().expect("calls lock") += 1;
            let instruction = &request.messages[1].content;
            match self
                .replies
                .iter()
                .find(|(prefix, _)| instruction.starts_with(prefix))
            {
                Some((_, Reply::Text(text))) => {
                    Ok(GenerationResponse::from_text("scripted", *text))
                }
                Some((_, Reply::Unauthorized)) => Err(CollaboratorError::Unauthorized {
                    code: 401,
                    message: "bad key".to_string(),
                }),
                None => Err(CollaboratorError::Connection(
                    "connection refused".to_string(),
                )),
            }
        }
    }

    struct SlowCollaborator;

    #[async_trait]
    impl TextCollaborator for SlowCollaborator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, CollaboratorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(GenerationResponse::from_text("slow", "too late"))
        }
    }

    fn gardening() -> PromptRequest {
        PromptRequest::new("Write a blog post about sustainable gardening")
            .expect("valid task")
            .with_audience("beginner gardeners")
            .with_tone("friendly and encouraging")
            .with_format(OutputFormat::Text)
            .with_complexity(TaskComplexity::Moderate)
    }

    #[tokio::test]
    async fn test_offline_assembly_is_complete() {
        let assembler = PromptAssembler::new(AssemblerConfig::default()).expect("valid config");
        let prompt = assembler.assemble(&gardening()).await;

        assert_eq!(prompt.sections().len(), 5);
        for (section, principle) in prompt.sections().iter().zip(Principle::ALL) {
            assert_eq!(section.principle, principle);
            assert_eq!(section.source, SectionSource::Fallback);
            assert!(!section.text.trim().is_empty());
        }
        assert!(prompt.is_fallback_only());
        assert!(prompt.warnings().is_empty());
        assert!(prompt.final_prompt().ends_with(CLOSING_INSTRUCTION));
        assert!((prompt.confidence_score() - scoring::BASE_CONFIDENCE).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_collaborator_replies_replace_templates() {
        let collaborator = Arc::new(ScriptedCollaborator::new(vec![
            ("Write a clear direction", Reply::Text("You are a horticulture teacher.")),
            ("Write 3 short example", Reply::Text("1. Compost basics\n2. Rain barrels\n3. Native plants")),
        ]));
        let assembler = PromptAssembler::new(AssemblerConfig::default())
            .expect("valid config")
            .with_collaborator(collaborator.clone());

        let prompt = assembler.assemble(&gardening()).await;

        assert_eq!(collaborator.calls(), 5);
        assert_eq!(prompt.collaborator_sections(), 2);
        assert!(prompt.direction().starts_with("You are a horticulture teacher."));
        assert!(prompt.examples().contains("\n- Rain barrels"));
        assert_eq!(prompt.section_source(Principle::Format), Some(SectionSource::Fallback));
        assert_eq!(prompt.warnings().len(), 3);
        assert!(prompt.confidence_score() > scoring::BASE_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let collaborator = Arc::new(ScriptedCollaborator::new(vec![
            ("Write 3 short example", Reply::Text("Only one example")),
            ("Define quality", Reply::Text("   ")),
            ("Write format", Reply::Unauthorized),
        ]));
        let assembler =
            PromptAssembler::new(AssemblerConfig::default())
                .expect("valid config")
                .with_collaborator(collaborator);

        let prompt = assembler.assemble(&gardening()).await;

        assert!(prompt.is_fallback_only());
        assert_eq!(prompt.warnings().len(), 5);
        assert!(prompt.examples().contains("Example 1: [Sample output for"));
        assert!(prompt
            .warnings()
            .iter()
            .any(|w| w.contains("Authentication rejected")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let config = AssemblerConfig::default().with_timeout(Duration::from_secs(1));
        let assembler = PromptAssembler::new(config)
            .expect("valid config")
            .with_collaborator(Arc::new(SlowCollaborator));

        let prompt = assembler.assemble(&gardening()).await;

        assert!(prompt.is_fallback_only());
        assert_eq!(prompt.warnings().len(), 5);
        assert!(prompt.warnings()[0].contains("within 1 seconds"));
    }

    #[tokio::test]
    async fn test_offline_flag_ignores_collaborator() {
        let collaborator = Arc::new(ScriptedCollaborator::new(vec![]));
        let assembler = PromptAssembler::new(AssemblerConfig::default().with_offline(true))
            .expect("valid config")
            .with_collaborator(collaborator.clone());

        let prompt = assembler.assemble(&gardening()).await;

        assert_eq!(collaborator.calls(), 0);
        assert!(!assembler.has_collaborator());
        assert!(prompt.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_examples_disabled_skips_collaborator() {
        let collaborator = Arc::new(ScriptedCollaborator::new(vec![(
            "Write 3 short example",
            Reply::Text("a\nb\nc"),
        )]));
        let assembler = PromptAssembler::new(AssemblerConfig::default())
            .expect("valid config")
            .with_collaborator(collaborator.clone());

        let prompt = assembler.assemble(&gardening().with_examples(false)).await;

        assert_eq!(collaborator.calls(), 4);
        assert!(prompt.examples().contains(sections::EXAMPLES_OMITTED));
    }

    #[tokio::test]
    async fn test_cache_short_circuits_duplicates() {
        let collaborator = Arc::new(ScriptedCollaborator::new(vec![
            ("Write a clear direction", Reply::Text("Direction.")),
            ("Write format", Reply::Text("Plain prose.")),
            ("Write 3 short example", Reply::Text("a\nb\nc")),
            ("Define quality", Reply::Text("Accurate")),
            ("Break this task", Reply::Text("Plan\nWrite")),
        ]));
        let assembler = PromptAssembler::new(AssemblerConfig::default().with_cache_entries(8))
            .expect("valid config")
            .with_collaborator(collaborator.clone());

        let first = assembler.assemble(&gardening()).await;
        let second = assembler.assemble(&gardening()).await;
        assert_eq!(first, second);
        assert_eq!(collaborator.calls(), 5);

        let other = assembler
            .assemble(&gardening().with_constraints(["Under 500 words"]))
            .await;
        assert_eq!(collaborator.calls(), 10);
        assert!(other.direction().contains("Under 500 words"));

        let stats = assembler.cache_stats().expect("cache enabled");
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            PromptAssembler::new(AssemblerConfig::default().with_temperature(7.5)),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert!(PromptAssembler::new(AssemblerConfig::default().with_timeout(Duration::ZERO)).is_err());
        assert!(PromptAssembler::new(AssemblerConfig::default().with_max_tokens(0)).is_err());
    }

    struct QuickCollaborator;

    #[async_trait]
    impl TextCollaborator for QuickCollaborator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, CollaboratorError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(GenerationResponse::from_text("quick", "1. One\n2. Two\n3. Three"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_still_allows_replies() {
        let config = AssemblerConfig::default().with_timeout(Duration::from_millis(500));
        let assembler = PromptAssembler::new(config)
            .expect("valid config")
            .with_collaborator(Arc::new(QuickCollaborator));

        let prompt = assembler.assemble(&gardening()).await;

        assert_eq!(prompt.collaborator_sections(), 5);
        assert!(prompt.warnings().is_empty());
    }

    #[test]
    fn test_join_sections() {
        let sections = vec![
            Section {
                principle: Principle::Direction,
                text: "A".to_string(),
                source: SectionSource::Fallback,
            },
            Section {
                principle: Principle::Format,
                text: "B".to_string(),
                source: SectionSource::Fallback,
            },
        ];
        assert_eq!(join_sections(&sections), format!("A\n\nB\n\n{CLOSING_INSTRUCTION}"));
    }
}
