//! Themed prompt templates for each artifact category.
//!
//! The library lives in `<config_dir>/prompt_libraries.json` so themes can be edited without
//! rebuilding. On first use the built-in set is written there; later runs read the file back.
//! Categories missing from an edited file fall back to the built-in themes.

use super::errors::VoidError;
use super::parser::BATCH_DIVIDER;
use super::ArtifactRequest;
use crate::economy::{Category, Rarity};
use crate::storage::write_file_atomic;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const PROMPT_LIBRARY_FILE: &str = "prompt_libraries.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Internal label for the theme (never shown as an artifact name).
    pub name: String,
    pub prompt: String,
}

impl PromptTemplate {
    fn new(name: &str, prompt: &str) -> Self {
        Self {
            name: name.to_string(),
            prompt: prompt.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLibrary {
    themes: BTreeMap<String, Vec<PromptTemplate>>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptLibrary {
    /// The built-in theme set, two or more templates per category.
    pub fn builtin() -> Self {
        let mut themes = BTreeMap::new();
        for category in Category::ALL {
            themes.insert(category.label().to_string(), builtin_themes(category));
        }
        Self { themes }
    }

    /// Read the library from `config_dir`, writing the built-in set there first if absent.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, VoidError> {
        let path = config_dir.join(PROMPT_LIBRARY_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let themes: BTreeMap<String, Vec<PromptTemplate>> = serde_json::from_str(&text)
                    .map_err(|e| {
                        VoidError::PromptLibrary(format!("{}: {}", path.display(), e))
                    })?;
                let mut library = Self { themes };
                library.fill_missing();
                info!("prompt library loaded from {}", path.display());
                Ok(library)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let library = Self::builtin();
                library.save(config_dir)?;
                info!("prompt library created at {}", path.display());
                Ok(library)
            }
            Err(e) => Err(VoidError::PromptLibrary(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), VoidError> {
        let path = config_dir.join(PROMPT_LIBRARY_FILE);
        let text = serde_json::to_string_pretty(&self.themes)
            .map_err(|e| VoidError::PromptLibrary(e.to_string()))?;
        std::fs::create_dir_all(config_dir)
            .and_then(|_| write_file_atomic(&path, &text))
            .map_err(|e| VoidError::PromptLibrary(format!("{}: {}", path.display(), e)))
    }

    fn fill_missing(&mut self) {
        for category in Category::ALL {
            let entry = self.themes.entry(category.label().to_string()).or_default();
            if entry.is_empty() {
                warn!(
                    "prompt library has no themes for {}; using built-in themes",
                    category
                );
                *entry = builtin_themes(category);
            }
        }
    }

    pub fn themes(&self, category: Category) -> &[PromptTemplate] {
        self.themes
            .get(category.label())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Full prompt for one artifact: a random theme for the category, the output contract,
    /// and rarity guidance.
    pub fn artifact_prompt_with<R: Rng + ?Sized>(&self, rng: &mut R, request: &ArtifactRequest) -> String {
        let theme = self
            .themes(request.category)
            .choose(rng)
            .map(|t| t.prompt.as_str())
            .unwrap_or(FALLBACK_THEME);
        compose(theme, request.category, request.rarity)
    }

    /// One prompt asking for every request in order, separated by the batch divider.
    pub fn batch_prompt_with<R: Rng + ?Sized>(&self, rng: &mut R, requests: &[ArtifactRequest]) -> String {
        let mut prompt = format!(
            "Generate {} artifact(s) with the following specifications. Make each one as unique, \
             creative and intricate as possible. Separate consecutive artifacts with a line \
             containing only '{}'.\n\n",
            requests.len(),
            BATCH_DIVIDER
        );
        let parts: Vec<String> = requests
            .iter()
            .enumerate()
            .map(|(i, request)| {
                format!(
                    "Artifact {} Requirements:\n{}",
                    i + 1,
                    self.artifact_prompt_with(rng, request)
                )
            })
            .collect();
        prompt.push_str(&parts.join(&format!("\n{}\n\n", BATCH_DIVIDER)));
        prompt
    }
}

const FALLBACK_THEME: &str =
    "You are cataloguing an object recovered from the void. Describe what it is and what it does.";

fn rarity_guidance(rarity: Rarity) -> &'static str {
    match rarity {
        Rarity::Common => "A basic, foundational example of its kind.",
        Rarity::Uncommon => "Has a few unique features or one slightly unusual property.",
        Rarity::Rare => "Distinctive and remarkable, with significant or complex properties.",
        Rarity::Legendary => {
            "Truly unique and profound, reality-bending in scope. The art and the description \
             must both reflect that significance."
        }
    }
}

fn compose(theme: &str, category: Category, rarity: Rarity) -> String {
    format!(
        r#"You are the ASCII core of the VOID ENGINE, generating a fictional artifact.

Theme: "{theme}"

Requirements:

1. ASCII art: an original, intricate diagram of the object, 25-50 characters wide and 15-30 lines
   tall. Prefer box-drawing and symbolic glyphs over solid fill. The structure itself should carry
   the artifact's meaning.

2. Description: 3-5 paragraphs immediately after the art covering its history or myth, its
   function or effects, and any paradoxes associated with it.

3. Rarity: this is a {rarity} item. {guidance}

4. Format your response exactly as follows:

NAME: [the artifact's name]
CATEGORY: {category}
RARITY: {rarity}
ASCII_ART:
```ascii
[the ASCII art]
```
DESCRIPTION:
[the description]
"#,
        theme = theme,
        rarity = rarity.label(),
        guidance = rarity_guidance(rarity),
        category = category.label(),
    )
}

fn builtin_themes(category: Category) -> Vec<PromptTemplate> {
    match category {
        Category::Archaeological => vec![
            PromptTemplate::new(
                "Machine Mystic Relics",
                "You are an archaeologist of the unreal. Unearth a symbolic device from a lost \
                 civilization of machine mystics: dense geometric structure, internal chambers and \
                 circuits, and a cryptic inscription hinting at its purpose.",
            ),
            PromptTemplate::new(
                "Data Fossils",
                "You are uncovering a data fossil, a crystallized information structure from an \
                 extinct digital ecosystem. Estimate its age in non-standard units and speculate \
                 about the ecosystem it came from.",
            ),
        ],
        Category::Botanical => vec![
            PromptTemplate::new(
                "Ephemeral Flora",
                "You are a botanist of impossible ecosystems. Catalogue a plant that exists only \
                 briefly or under paradoxical conditions, with its growth cycle and habitat.",
            ),
            PromptTemplate::new(
                "Dream Fungi",
                "Document a fungal organism that grows in the space between dreams: its spore \
                 network, what feeds it, and what happens to those who touch it.",
            ),
        ],
        Category::Mechanical => vec![
            PromptTemplate::new(
                "Impossible Mechanisms",
                "You are an engineer of impossible machines. Design a mechanism that violates known \
                 physics yet works, showing its gears, linkages and energy flow.",
            ),
            PromptTemplate::new(
                "Emotion Engines",
                "Describe an engine that runs on or produces emotions: its intake, its conversion \
                 chambers, and the side effects felt by anyone nearby.",
            ),
        ],
        Category::Mystical => vec![
            PromptTemplate::new(
                "Occult Implements",
                "Catalogue a ritual implement from a tradition that never existed: its sigils, the \
                 rite it serves, and the price of using it.",
            ),
            PromptTemplate::new(
                "Soul Vessels",
                "Describe a vessel made to hold something that is not quite a soul: its seals, its \
                 contents, and the terms under which it may be opened.",
            ),
        ],
        Category::Linguistic => vec![
            PromptTemplate::new(
                "Conceptual Glyphs",
                "Record a glyph that encodes an entire concept no human language has a word for, \
                 with its strokes, pronunciation and the effect of writing it.",
            ),
            PromptTemplate::new(
                "Living Equations",
                "Document an equation that behaves like an organism: how it grows, what it solves, \
                 and what it consumes while solving it.",
            ),
        ],
        Category::Astronomical => vec![
            PromptTemplate::new(
                "Pocket Cosmologies",
                "Describe a self-contained universe small enough to carry: its laws, its \
                 inhabitants if any, and how its owner observes it.",
            ),
            PromptTemplate::new(
                "Orbital Anomalies",
                "Chart a celestial body whose orbit should be impossible: the path it follows, what \
                 holds it there, and what it does to nearby instruments.",
            ),
        ],
        Category::Biological => vec![
            PromptTemplate::new(
                "Unclassifiable Specimens",
                "You are a xenobiologist filing a specimen that fits no taxonomy: anatomy, \
                 behaviour, and the reason every classification attempt fails.",
            ),
            PromptTemplate::new(
                "Evolutionary Dead Ends",
                "Describe the last surviving example of a lineage that evolved toward something no \
                 environment could support, and how it persisted anyway.",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    #[test]
    fn builtin_covers_every_category() {
        let library = PromptLibrary::builtin();
        for category in Category::ALL {
            assert!(library.themes(category).len() >= 2, "{}", category);
        }
    }

    #[test]
    fn prompt_names_requested_labels_and_contract() {
        let library = PromptLibrary::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        let prompt = library.artifact_prompt_with(
            &mut rng,
            &ArtifactRequest::new(Category::Botanical, Rarity::Legendary),
        );
        assert!(prompt.contains("CATEGORY: botanical"));
        assert!(prompt.contains("RARITY: legendary"));
        assert!(prompt.contains("```ascii"));
        assert!(prompt.contains("DESCRIPTION:"));
    }

    #[test]
    fn batch_prompt_separates_requests() {
        let library = PromptLibrary::builtin();
        let mut rng = StdRng::seed_from_u64(9);
        let requests = vec![
            ArtifactRequest::new(Category::Mystical, Rarity::Common),
            ArtifactRequest::new(Category::Biological, Rarity::Rare),
            ArtifactRequest::new(Category::Linguistic, Rarity::Uncommon),
        ];
        let prompt = library.batch_prompt_with(&mut rng, &requests);
        assert!(prompt.contains("Artifact 3 Requirements:"));
        let dividers = prompt
            .lines()
            .filter(|l| l.trim() == BATCH_DIVIDER)
            .count();
        assert_eq!(dividers, 2);
    }

    #[test]
    fn first_use_writes_file_then_reads_it_back() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("config");
        let created = PromptLibrary::load_or_create(&dir).unwrap();
        assert!(dir.join(PROMPT_LIBRARY_FILE).exists());
        let loaded = PromptLibrary::load_or_create(&dir).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn edited_file_keeps_custom_themes_and_fills_gaps() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PROMPT_LIBRARY_FILE),
            r#"{"mystical": [{"name": "Custom", "prompt": "A bell with no clapper."}]}"#,
        )
        .unwrap();
        let library = PromptLibrary::load_or_create(tmp.path()).unwrap();
        assert_eq!(library.themes(Category::Mystical).len(), 1);
        assert_eq!(library.themes(Category::Mystical)[0].name, "Custom");
        assert!(!library.themes(Category::Botanical).is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join(PROMPT_LIBRARY_FILE), "{not json").unwrap();
        assert!(matches!(
            PromptLibrary::load_or_create(tmp.path()),
            Err(VoidError::PromptLibrary(_))
        ));
    }
}
