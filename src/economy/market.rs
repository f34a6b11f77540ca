//! Market engine: per-category demand multipliers and the player's reputation.
//!
//! Overview
//! - Every category carries a multiplier in `[0.5, 1.5]`, seeded uniformly in `[0.8, 1.2]`
//! - [`ArtifactMarket::tick`] applies a ±0.15 random walk with 0.05 of mean reversion outside
//!   `[0.8, 1.2]`, then clamps. The game loop decides when to tick
//! - Reputation is `1.0 + 0.01 × sold + 0.05 × legendary`, capped at 1.5
//! - Current value is `round(base × multiplier × reputation)`, never below 1
//! - Persistence: one record (`market_state.json`) holding both multipliers and reputation
//!
//! Every random operation has a `_with` twin taking an explicit [`Rng`] so behavior can be
//! pinned in tests.

use super::errors::EconomyError;
use super::player::PlayerStats;
use super::types::{capitalize, Artifact, Category};
use super::valuation;
use crate::storage::{GameStorage, MARKET_RECORD};
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MULTIPLIER_MIN: f64 = 0.5;
pub const MULTIPLIER_MAX: f64 = 1.5;
pub const INITIAL_MIN: f64 = 0.8;
pub const INITIAL_MAX: f64 = 1.2;
/// Half-width of the uniform random walk step.
pub const TICK_STEP: f64 = 0.15;
/// Extra pull applied to multipliers outside `[INITIAL_MIN, INITIAL_MAX]`.
pub const MEAN_REVERSION: f64 = 0.05;
pub const REPUTATION_BASE: f64 = 1.0;
pub const REPUTATION_MAX: f64 = 1.5;
pub const REPUTATION_PER_SALE: f64 = 0.01;
pub const REPUTATION_PER_LEGENDARY: f64 = 0.05;
/// Multiplier assumed for a category the market has no entry for.
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

/// On-disk schema. Keys are category labels so stray entries can be skipped on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarketRecord {
    fluctuations: BTreeMap<String, f64>,
    player_reputation: f64,
}

/// Categorical reading of a multiplier, as shown in the market report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTrend {
    Hot,
    Rising,
    Stable,
    Declining,
    Oversupplied,
}

impl MarketTrend {
    /// Partition used by the report. Checks run in this order:
    /// `>= 1.3` hot, `>= 1.1` rising, `<= 0.7` oversupplied, `<= 0.9` declining, else stable.
    pub fn classify(multiplier: f64) -> Self {
        if multiplier >= 1.3 {
            MarketTrend::Hot
        } else if multiplier >= 1.1 {
            MarketTrend::Rising
        } else if multiplier <= 0.7 {
            MarketTrend::Oversupplied
        } else if multiplier <= 0.9 {
            MarketTrend::Declining
        } else {
            MarketTrend::Stable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketTrend::Hot => "HOT MARKET",
            MarketTrend::Rising => "Rising",
            MarketTrend::Stable => "Stable",
            MarketTrend::Declining => "Declining",
            MarketTrend::Oversupplied => "OVERSUPPLIED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketEntry {
    pub category: Category,
    pub multiplier: f64,
    pub trend: MarketTrend,
}

/// Snapshot of the market, highest demand first.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketReport {
    pub reputation: f64,
    pub entries: Vec<MarketEntry>,
}

impl fmt::Display for MarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== MARKET CONDITIONS ===")?;
        writeln!(f, "Player Reputation Modifier: {:.2}x", self.reputation)?;
        writeln!(f)?;
        write!(f, "Category Demand:")?;
        for entry in &self.entries {
            write!(
                f,
                "\n- {}: {:.2}x ({})",
                capitalize(entry.category.label()),
                entry.multiplier,
                entry.trend.label()
            )?;
        }
        Ok(())
    }
}

/// Time-varying demand model plus the reputation scalar.
#[derive(Debug, Clone)]
pub struct ArtifactMarket {
    fluctuations: BTreeMap<Category, f64>,
    player_reputation: f64,
    storage: GameStorage,
}

fn clamp_multiplier(value: f64) -> f64 {
    value.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
}

fn clamp_reputation(value: f64) -> f64 {
    value.clamp(REPUTATION_BASE, REPUTATION_MAX)
}

impl ArtifactMarket {
    /// Freshly initialized market (random multipliers, neutral reputation).
    pub fn new(storage: GameStorage) -> Self {
        let mut market = Self {
            fluctuations: BTreeMap::new(),
            player_reputation: REPUTATION_BASE,
            storage,
        };
        market.initialize();
        market
    }

    pub fn initialize(&mut self) {
        self.initialize_with(&mut rand::thread_rng());
    }

    /// Draw every category's multiplier uniformly from `[0.8, 1.2]`.
    pub fn initialize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for category in Category::ALL {
            self.fluctuations
                .insert(category, rng.gen_range(INITIAL_MIN..=INITIAL_MAX));
        }
        debug!("market initialized: {:?}", self.fluctuations);
    }

    pub fn tick(&mut self) {
        self.tick_with(&mut rand::thread_rng());
    }

    pub fn tick_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for multiplier in self.fluctuations.values_mut() {
            let current = *multiplier;
            let mut change = rng.gen_range(-TICK_STEP..=TICK_STEP);
            if current > INITIAL_MAX {
                change -= MEAN_REVERSION;
            } else if current < INITIAL_MIN {
                change += MEAN_REVERSION;
            }
            *multiplier = clamp_multiplier(current + change);
        }
        debug!("market ticked: {:?}", self.fluctuations);
    }

    /// Demand multiplier for `category`, or 1.0 if the market has no entry for it.
    pub fn multiplier(&self, category: Category) -> f64 {
        self.fluctuations
            .get(&category)
            .copied()
            .unwrap_or(NEUTRAL_MULTIPLIER)
    }

    /// Override a multiplier (clamped into range). Returns the stored value.
    pub fn set_multiplier(&mut self, category: Category, value: f64) -> f64 {
        let clamped = clamp_multiplier(value);
        self.fluctuations.insert(category, clamped);
        clamped
    }

    pub fn reputation(&self) -> f64 {
        self.player_reputation
    }

    pub fn value_of(&self, artifact: &Artifact) -> u64 {
        self.value_of_with(&mut rand::thread_rng(), artifact)
    }

    /// Current market value. Artifacts without an assigned base value get a fresh draw from
    /// their rarity's range each time they are appraised.
    pub fn value_of_with<R: Rng + ?Sized>(&self, rng: &mut R, artifact: &Artifact) -> u64 {
        let base = artifact
            .assigned_value()
            .unwrap_or_else(|| valuation::draw_base(artifact.rarity, rng));
        let current =
            (base as f64 * self.multiplier(artifact.category) * self.player_reputation).round();
        if current < 1.0 {
            1
        } else {
            current as u64
        }
    }

    /// Recompute reputation from cumulative stats and return it.
    pub fn update_reputation(&mut self, stats: &PlayerStats) -> f64 {
        let raw = REPUTATION_BASE
            + stats.artifacts_sold as f64 * REPUTATION_PER_SALE
            + stats.legendary_found as f64 * REPUTATION_PER_LEGENDARY;
        self.player_reputation = raw.min(REPUTATION_MAX);
        self.player_reputation
    }

    pub fn report(&self) -> MarketReport {
        let mut entries: Vec<MarketEntry> = self
            .fluctuations
            .iter()
            .map(|(&category, &multiplier)| MarketEntry {
                category,
                multiplier,
                trend: MarketTrend::classify(multiplier),
            })
            .collect();
        entries.sort_by(|a, b| b.multiplier.total_cmp(&a.multiplier));
        MarketReport {
            reputation: self.player_reputation,
            entries,
        }
    }

    pub fn save(&self) -> Result<(), EconomyError> {
        let record = MarketRecord {
            fluctuations: self
                .fluctuations
                .iter()
                .map(|(c, m)| (c.label().to_string(), *m))
                .collect(),
            player_reputation: self.player_reputation,
        };
        self.storage.write_record(MARKET_RECORD, &record)?;
        info!("market state saved");
        Ok(())
    }

    /// Restore from the saved record. `Ok(false)` (state untouched) when there is none.
    pub fn load(&mut self) -> Result<bool, EconomyError> {
        let Some(record) = self.storage.read_record::<MarketRecord>(MARKET_RECORD)? else {
            return Ok(false);
        };
        let mut fluctuations = BTreeMap::new();
        for (label, multiplier) in record.fluctuations {
            match Category::parse(&label) {
                Some(category) => {
                    fluctuations.insert(category, clamp_multiplier(multiplier));
                }
                None => warn!("market: ignoring unknown category '{}' in save", label),
            }
        }
        self.fluctuations = fluctuations;
        self.player_reputation = clamp_reputation(record.player_reputation);
        info!(
            "market state loaded ({} categories, reputation {:.2})",
            self.fluctuations.len(),
            self.player_reputation
        );
        Ok(true)
    }
}
