//! The Deep Void: where artifacts come from.
//!
//! The economy never sees raw text. A generator implements [`ArtifactSource`], turning a batch
//! of (category, rarity) requests into finished [`Artifact`]s with an id and a base value.
//! [`DeepVoid`] is the real one: it builds prompts from the [`PromptLibrary`], sends them
//! through any [`TextCompletion`] backend, and parses the reply with [`parser`].
//!
//! With the `llm` feature (default) [`LlmClient`] provides completions over HTTPS.

pub mod deep_void;
pub mod errors;
pub mod parser;
pub mod prompts;

#[cfg(feature = "llm")]
pub mod client;

use crate::economy::{Artifact, Category, Rarity};
use rand::Rng;

pub use deep_void::DeepVoid;
pub use errors::VoidError;
pub use parser::{parse_batch, parse_record, ParsedArtifact, BATCH_DIVIDER};
pub use prompts::{PromptLibrary, PromptTemplate, PROMPT_LIBRARY_FILE};

#[cfg(feature = "llm")]
pub use client::{LlmClient, Provider};

/// One slot in a generation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub category: Category,
    pub rarity: Rarity,
}

impl ArtifactRequest {
    pub fn new(category: Category, rarity: Rarity) -> Self {
        Self { category, rarity }
    }

    /// Random category; the given rarity, or a weighted draw when `None`.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R, rarity: Option<Rarity>) -> Self {
        let rarity = rarity.unwrap_or_else(|| Rarity::weighted_random_with(rng));
        Self {
            category: Category::random_with(rng),
            rarity,
        }
    }

    pub fn cost(&self) -> u64 {
        self.rarity.cost()
    }
}

/// Anything that can turn requests into artifacts.
///
/// Implementations may return fewer artifacts than requested (records that fail to parse are
/// dropped) but never more. An empty `Ok` is allowed; the caller decides what that means.
#[allow(async_fn_in_trait)]
pub trait ArtifactSource {
    async fn generate_batch(
        &mut self,
        requests: &[ArtifactRequest],
    ) -> Result<Vec<Artifact>, VoidError>;
}

/// A single prompt-in, text-out exchange with a language model.
#[allow(async_fn_in_trait)]
pub trait TextCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, VoidError>;
}
