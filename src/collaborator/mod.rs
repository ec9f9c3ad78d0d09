//! Text-generation collaborator.
//!
//! The assembler treats the hosted model as an opaque service: it sends a
//! role context and a section instruction and gets back text or an error.
//! [`TextCollaborator`] is that seam; [`ChatCompletionsClient`] is the HTTP
//! implementation for OpenAI-compatible APIs.
//!
//! ```ignore
//! use prompt_forge::collaborator::{ChatCompletionsClient, GenerationRequest, Message, TextCollaborator};
//!
//! let client = ChatCompletionsClient::from_config(&config)?;
//! let request = GenerationRequest::new("", vec![Message::user("Say hi")]).with_max_tokens(20);
//! let response = client.generate(request).await?;
//! ```

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::CollaboratorError;

pub use client::ChatCompletionsClient;
pub use types::{Choice, GenerationRequest, GenerationResponse, Message, Usage};

/// A service that turns a chat request into generated text.
#[async_trait]
pub trait TextCollaborator: Send + Sync {
    /// Generate a response for the given request.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, CollaboratorError>;
}
