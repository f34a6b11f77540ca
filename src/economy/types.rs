//! Rarity and category taxonomies plus the artifact record itself.
//!
//! Rarity carries three fixed policy tables (generation weight, generation cost, base value
//! range). Category is a plain classification axis; its only economic meaning is the market
//! multiplier kept by [`crate::economy::ArtifactMarket`].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Artifact rarity, ordered from least to most valuable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
    ];

    /// Probability mass used by [`Rarity::weighted_random`]. Sums to 1.0 across variants.
    pub fn weight(self) -> f64 {
        match self {
            Rarity::Common => 0.70,
            Rarity::Uncommon => 0.20,
            Rarity::Rare => 0.08,
            Rarity::Legendary => 0.02,
        }
    }

    /// Credits charged to pull one artifact of this rarity from the void.
    pub fn cost(self) -> u64 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 3,
            Rarity::Rare => 7,
            Rarity::Legendary => 15,
        }
    }

    /// Inclusive range the raw base value is drawn from.
    pub fn value_range(self) -> RangeInclusive<u32> {
        match self {
            Rarity::Common => 5..=15,
            Rarity::Uncommon => 20..=50,
            Rarity::Rare => 60..=200,
            Rarity::Legendary => 250..=1000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
    }

    /// Lookup that never fails: unrecognized labels are treated as common.
    pub fn from_label_or_common(label: &str) -> Self {
        Self::parse(label).unwrap_or_else(|| {
            log::debug!("unknown rarity label '{}', treating as common", label);
            Rarity::Common
        })
    }

    pub fn weighted_random() -> Self {
        Self::weighted_random_with(&mut rand::thread_rng())
    }

    pub fn weighted_random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f64 = rng.gen();
        let mut cumulative = 0.0;
        for rarity in Self::ALL {
            cumulative += rarity.weight();
            if roll < cumulative {
                return rarity;
            }
        }
        // Float slack when the weights sum to a hair under 1.0
        Rarity::Legendary
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Rarity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Rarity::from_label_or_common(&label))
    }
}

/// Domain an artifact belongs to. Each category has its own market demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Archaeological,
    Botanical,
    Mechanical,
    Mystical,
    Linguistic,
    Astronomical,
    Biological,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Archaeological,
        Category::Botanical,
        Category::Mechanical,
        Category::Mystical,
        Category::Linguistic,
        Category::Astronomical,
        Category::Biological,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Archaeological => "archaeological",
            Category::Botanical => "botanical",
            Category::Mechanical => "mechanical",
            Category::Mystical => "mystical",
            Category::Linguistic => "linguistic",
            Category::Astronomical => "astronomical",
            Category::Biological => "biological",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
    }

    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&Category::Archaeological)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A collectible pulled from the void.
///
/// `base_value` is assigned once by [`crate::economy::valuation`] when the artifact is created
/// and serialized under the legacy key `value`. Records without it (or with `0`) are valued
/// lazily by the market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category: Category,
    pub rarity: Rarity,
    #[serde(default)]
    pub ascii_art: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub base_value: Option<u32>,
}

impl Artifact {
    /// Base value if one was assigned at creation. A stored `0` counts as missing.
    pub fn assigned_value(&self) -> Option<u32> {
        self.base_value.filter(|v| *v > 0)
    }

    /// First four characters of the id, as shown in listings.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(4)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// New opaque artifact id: the first 8 hex characters of a v4 UUID.
pub fn generate_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Upper-case the first character, leave the rest alone ("mystical" -> "Mystical").
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
