use super::errors::VoidError;
use super::parser::{parse_batch, ParsedArtifact};
use super::prompts::PromptLibrary;
use super::{ArtifactRequest, ArtifactSource, TextCompletion};
use crate::economy::{generate_id, valuation, Artifact, Category, Rarity};
use crate::logutil::escape_log;
use log::{debug, info, warn};
use rand::Rng;

/// Prompt, complete, parse, then fill in metadata.
pub struct DeepVoid<C> {
    completion: C,
    prompts: PromptLibrary,
}

impl<C: TextCompletion> DeepVoid<C> {
    pub fn new(completion: C, prompts: PromptLibrary) -> Self {
        Self {
            completion,
            prompts,
        }
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }
}

#[cfg(feature = "llm")]
impl DeepVoid<super::client::LlmClient> {
    /// The HTTPS-backed generator described by `config`.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, VoidError> {
        let client = super::client::LlmClient::from_config(&config.generator)?;
        let prompts =
            PromptLibrary::load_or_create(std::path::Path::new(&config.storage.config_dir))?;
        info!(
            "deep void ready ({:?}, model {})",
            client.provider(),
            client.model()
        );
        Ok(Self::new(client, prompts))
    }
}

/// Turn a parsed record into an artifact for slot `request`.
///
/// The id is always fresh. Labels that do not name a known category or rarity fall back to the
/// slot's requested values; with no slot the fallback is a random category and common rarity.
/// The base value is drawn from the resolved rarity's range and scaled by text complexity.
pub fn fill_metadata_with<R: Rng + ?Sized>(
    rng: &mut R,
    parsed: ParsedArtifact,
    request: Option<&ArtifactRequest>,
) -> Artifact {
    let category = Category::parse(&parsed.category_label).unwrap_or_else(|| {
        let fallback = request
            .map(|r| r.category)
            .unwrap_or_else(|| Category::random_with(rng));
        debug!(
            "unknown category label '{}', using {}",
            escape_log(&parsed.category_label),
            fallback
        );
        fallback
    });
    let rarity = Rarity::parse(&parsed.rarity_label).unwrap_or_else(|| {
        let fallback = request.map(|r| r.rarity).unwrap_or(Rarity::Common);
        debug!(
            "unknown rarity label '{}', using {}",
            escape_log(&parsed.rarity_label),
            fallback
        );
        fallback
    });
    let value = valuation::base_value_with(rng, rarity, &parsed.ascii_art, &parsed.description);

    Artifact {
        id: generate_id(),
        name: parsed.name,
        category,
        rarity,
        ascii_art: parsed.ascii_art,
        description: parsed.description,
        base_value: Some(value),
    }
}

impl<C: TextCompletion> ArtifactSource for DeepVoid<C> {
    async fn generate_batch(
        &mut self,
        requests: &[ArtifactRequest],
    ) -> Result<Vec<Artifact>, VoidError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = self
            .prompts
            .batch_prompt_with(&mut rand::thread_rng(), requests);

        let reply = self.completion.complete(&prompt).await?;
        debug!("void reply: {}", escape_log(&reply));

        let mut parsed = parse_batch(&reply);
        if parsed.len() > requests.len() {
            warn!(
                "void returned {} records for {} requests; keeping the first {}",
                parsed.len(),
                requests.len(),
                requests.len()
            );
            parsed.truncate(requests.len());
        }

        let mut rng = rand::thread_rng();
        let artifacts: Vec<Artifact> = parsed
            .into_iter()
            .enumerate()
            .map(|(i, p)| fill_metadata_with(&mut rng, p, requests.get(i)))
            .collect();
        info!(
            "void produced {}/{} artifact(s)",
            artifacts.len(),
            requests.len()
        );
        Ok(artifacts)
    }
}
