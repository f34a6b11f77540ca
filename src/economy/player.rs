//! Player wallet and artifact collection.
//!
//! Overview
//! - Credits never go negative: [`Player::spend`] refuses (and changes nothing) when the
//!   balance is short
//! - Stats are cumulative counters and only ever grow
//! - Discovery sets remember every category and rarity the player has ever held, even after
//!   the artifacts are sold
//! - Persistence: player metadata and the collection are two separate records, so saving
//!   credits after a purchase does not depend on rewriting a large collection
//!
//! Selling is not a single method here; see [`crate::economy::trade`], which composes
//! [`Player::remove`], [`Player::earn`] and [`Player::record_sold`].

use super::errors::EconomyError;
use super::export;
use super::types::{generate_id, Artifact, Category, Rarity};
use crate::storage::{GameStorage, COLLECTION_RECORD, PLAYER_RECORD};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

pub const DEFAULT_STARTING_CREDITS: u64 = 50;

/// Cumulative activity counters. Field names match the on-disk `stats` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub artifacts_generated: u64,
    #[serde(default)]
    pub artifacts_sold: u64,
    #[serde(default)]
    pub credits_earned: u64,
    #[serde(default)]
    pub credits_spent: u64,
    #[serde(default)]
    pub legendary_found: u64,
}

/// On-disk schema for `player_data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlayerRecord {
    credits: u64,
    #[serde(default)]
    stats: PlayerStats,
    #[serde(default, deserialize_with = "known_categories")]
    discovered_categories: Vec<Category>,
    #[serde(default)]
    discovered_rarities: Vec<Rarity>,
}

#[derive(Debug, Clone)]
pub struct Player {
    credits: u64,
    collection: HashMap<String, Artifact>,
    discovered_categories: BTreeSet<Category>,
    discovered_rarities: BTreeSet<Rarity>,
    stats: PlayerStats,
    storage: GameStorage,
}

impl Player {
    pub fn new(starting_credits: u64, storage: GameStorage) -> Self {
        Self {
            credits: starting_credits,
            collection: HashMap::new(),
            discovered_categories: BTreeSet::new(),
            discovered_rarities: BTreeSet::from([Rarity::Common]),
            stats: PlayerStats::default(),
            storage,
        }
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn collection(&self) -> &HashMap<String, Artifact> {
        &self.collection
    }

    pub fn discovered_categories(&self) -> &BTreeSet<Category> {
        &self.discovered_categories
    }

    pub fn discovered_rarities(&self) -> &BTreeSet<Rarity> {
        &self.discovered_rarities
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.credits >= cost
    }

    /// Debit `amount`. Returns `false` and leaves everything untouched if unaffordable.
    pub fn spend(&mut self, amount: u64) -> bool {
        if !self.can_afford(amount) {
            debug!("spend of {} refused (balance {})", amount, self.credits);
            return false;
        }
        self.credits -= amount;
        self.stats.credits_spent = self.stats.credits_spent.saturating_add(amount);
        true
    }

    pub fn earn(&mut self, amount: u64) {
        self.credits = self.credits.saturating_add(amount);
        self.stats.credits_earned = self.stats.credits_earned.saturating_add(amount);
    }

    /// Take ownership of `artifact`, assigning an id if it has none. Returns the id.
    pub fn add(&mut self, mut artifact: Artifact) -> String {
        if artifact.id.trim().is_empty() {
            artifact.id = generate_id();
        }
        let id = artifact.id.clone();

        self.discovered_categories.insert(artifact.category);
        self.discovered_rarities.insert(artifact.rarity);
        self.stats.artifacts_generated = self.stats.artifacts_generated.saturating_add(1);
        if artifact.rarity == Rarity::Legendary {
            self.stats.legendary_found = self.stats.legendary_found.saturating_add(1);
        }

        if self.collection.insert(id.clone(), artifact).is_some() {
            warn!("artifact id {} already held; replaced", id);
        }
        id
    }

    /// Pop an artifact out of the collection. Does not credit the player.
    pub fn remove(&mut self, id: &str) -> Option<Artifact> {
        self.collection.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Artifact> {
        self.collection.get(id)
    }

    pub fn record_sold(&mut self, count: u64) {
        self.stats.artifacts_sold = self.stats.artifacts_sold.saturating_add(count);
    }

    pub fn group_by_rarity(&self) -> BTreeMap<Rarity, Vec<String>> {
        let mut groups: BTreeMap<Rarity, Vec<String>> = BTreeMap::new();
        for (id, artifact) in &self.collection {
            groups.entry(artifact.rarity).or_default().push(id.clone());
        }
        for ids in groups.values_mut() {
            ids.sort();
        }
        groups
    }

    pub fn group_by_category(&self) -> BTreeMap<Category, Vec<String>> {
        let mut groups: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for (id, artifact) in &self.collection {
            groups.entry(artifact.category).or_default().push(id.clone());
        }
        for ids in groups.values_mut() {
            ids.sort();
        }
        groups
    }

    /// Collection ids in a stable display order (highest rarity first, then name, then id).
    pub fn listing_order(&self) -> Vec<String> {
        let mut items: Vec<&Artifact> = self.collection.values().collect();
        items.sort_by(|a, b| {
            b.rarity
                .cmp(&a.rarity)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        items.into_iter().map(|a| a.id.clone()).collect()
    }

    pub fn save(&self) -> Result<(), EconomyError> {
        let record = PlayerRecord {
            credits: self.credits,
            stats: self.stats.clone(),
            discovered_categories: self.discovered_categories.iter().copied().collect(),
            discovered_rarities: self.discovered_rarities.iter().copied().collect(),
        };
        self.storage.write_record(PLAYER_RECORD, &record)?;
        self.storage.write_record(COLLECTION_RECORD, &self.collection)?;
        info!(
            "player saved ({} credits, {} artifacts)",
            self.credits,
            self.collection.len()
        );
        Ok(())
    }

    /// Restore from disk. `Ok(false)` (nothing changed) unless both the player record and
    /// the collection record are present.
    pub fn load(&mut self) -> Result<bool, EconomyError> {
        let Some(record) = self.storage.read_record::<PlayerRecord>(PLAYER_RECORD)? else {
            return Ok(false);
        };
        let Some(raw) = self
            .storage
            .read_record::<HashMap<String, serde_json::Value>>(COLLECTION_RECORD)?
        else {
            warn!("player record present but collection record missing; not loading");
            return Ok(false);
        };
        let collection = decode_collection(raw);

        self.credits = record.credits;
        self.stats = record.stats;
        self.discovered_categories = record.discovered_categories.into_iter().collect();
        self.discovered_rarities = record.discovered_rarities.into_iter().collect();
        self.collection = collection;
        info!(
            "player loaded ({} credits, {} artifacts)",
            self.credits,
            self.collection.len()
        );
        Ok(true)
    }

    /// Write the artifact's export document. `Ok(None)` if `id` is not in the collection.
    pub fn export(&self, id: &str) -> Result<Option<PathBuf>, EconomyError> {
        let Some(artifact) = self.collection.get(id) else {
            return Ok(None);
        };
        let path = self.storage.write_export(
            &export::export_file_name(artifact),
            &export::render_document(artifact),
        )?;
        debug!("exported {} to {}", id, path.display());
        Ok(Some(path))
    }
}

/// Category labels this build does not know are dropped from the discovery list.
fn known_categories<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Category>, D::Error> {
    let labels = Vec::<String>::deserialize(deserializer)?;
    Ok(labels.iter().filter_map(|l| Category::parse(l)).collect())
}

/// Decode each stored artifact on its own. An entry that does not decode (an unknown
/// category label, a missing name) is dropped with a warning; the rest of the save loads.
fn decode_collection(raw: HashMap<String, serde_json::Value>) -> HashMap<String, Artifact> {
    let mut collection = HashMap::with_capacity(raw.len());
    for (id, value) in raw {
        match serde_json::from_value::<Artifact>(value) {
            Ok(mut artifact) => {
                // Keys are authoritative; older files may carry artifacts without an id field
                artifact.id = id.clone();
                collection.insert(id, artifact);
            }
            Err(e) => warn!("skipping artifact {} in {}: {}", id, COLLECTION_RECORD, e),
        }
    }
    collection
}
