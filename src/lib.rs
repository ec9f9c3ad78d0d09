//! prompt-forge: five-principle prompt assembly.
//!
//! This library turns a structured task description into a single prompt
//! built from five sections (direction, format, examples, quality criteria
//! and task decomposition). Sections are delegated to a text-generation
//! collaborator when one is configured and fall back to deterministic
//! templates otherwise.

// Core modules
pub mod assembler;
pub mod cli;
pub mod collaborator;
pub mod config;
pub mod error;
pub mod input;

// Re-export commonly used types
pub use assembler::{GeneratedPrompt, Principle, PromptAnalysis, PromptAssembler};
pub use config::AssemblerConfig;
pub use error::{CollaboratorError, ConfigError, ValidationError};
pub use input::{OutputFormat, PromptRequest, RawPromptInput, TaskComplexity};
