//! Input model for prompt generation.
//!
//! A [`PromptRequest`] is the validated form of what a user typed into the
//! form: the task, who it is for, the tone, the output format, constraints
//! and complexity. It can only be built through validating constructors and
//! cannot be changed afterwards.

pub mod options;
pub mod request;

pub use options::{OutputFormat, TaskComplexity};
pub use request::{
    split_constraints, FormDefaults, PromptRequest, RawPromptInput, DEFAULT_AUDIENCE,
    DEFAULT_TONE,
};
