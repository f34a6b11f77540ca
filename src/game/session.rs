//! One play-through: the player, the market, a generator, and the turn counter.
//!
//! The session owns every rule that spans more than one component: market cadence, paying
//! for generation (and refunding when the void fails), and the end-of-game tally. Nothing in
//! here reads input or prints; see [`crate::game::cli`] for that.

use crate::config::GameConfig;
use crate::economy::{
    execute_sale, quote_sale, Artifact, ArtifactMarket, EconomyError, Player, Rarity, SaleQuote,
    SaleReceipt,
};
use crate::storage::GameStorage;
use crate::void::{ArtifactRequest, ArtifactSource, VoidError};
use log::{info, warn};
use rand::Rng;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Categories at or above this multiplier are flagged as hot in the sale listing.
pub const HOT_DEMAND: f64 = 1.2;
/// Categories at or below this multiplier are flagged as low demand.
pub const LOW_DEMAND: f64 = 0.8;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("not enough credits: that would cost {cost} credits and you have {balance}")]
    Unaffordable { cost: u64, balance: u64 },

    #[error("the void failed: {source}")]
    Void {
        #[source]
        source: VoidError,
        refunded: u64,
    },

    #[error("the void returned no usable artifacts")]
    EmptyBatch { refunded: u64 },
}

impl GenerateError {
    /// Credits handed back to the player (zero when nothing was charged).
    pub fn refunded(&self) -> u64 {
        match self {
            GenerateError::Unaffordable { .. } => 0,
            GenerateError::Void { refunded, .. } | GenerateError::EmptyBatch { refunded } => {
                *refunded
            }
        }
    }
}

/// What the player is about to pay for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub requests: Vec<ArtifactRequest>,
}

impl GenerationPlan {
    pub fn total_cost(&self) -> u64 {
        self.requests.iter().map(ArtifactRequest::cost).sum()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// An artifact that arrived in the collection, and where its export landed.
#[derive(Debug)]
pub struct Discovery {
    pub id: String,
    pub exported: Result<PathBuf, EconomyError>,
}

#[derive(Debug)]
pub struct GenerationOutcome {
    pub cost: u64,
    pub requested: usize,
    pub discoveries: Vec<Discovery>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    Hot,
    Normal,
    Low,
}

impl Demand {
    pub fn classify(multiplier: f64) -> Self {
        if multiplier >= HOT_DEMAND {
            Demand::Hot
        } else if multiplier <= LOW_DEMAND {
            Demand::Low
        } else {
            Demand::Normal
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Demand::Hot => "(HOT MARKET!)",
            Demand::Normal => "",
            Demand::Low => "(Low Demand)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub value: u64,
    pub demand: Demand,
}

/// End-of-game (or `status`) tally.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    /// Unknown for a game read back from disk; the turn counter is not persisted.
    pub turns: Option<u32>,
    pub credits: u64,
    pub collection_size: usize,
    pub reputation: f64,
    pub artifacts_generated: u64,
    pub artifacts_sold: u64,
    pub credits_earned: u64,
    pub credits_spent: u64,
    pub legendary_found: u64,
    pub collection_value: u64,
}

impl GameSummary {
    pub fn from_parts(turns: Option<u32>, player: &Player, market: &ArtifactMarket) -> Self {
        let stats = player.stats();
        Self {
            turns,
            credits: player.credits(),
            collection_size: player.collection().len(),
            reputation: market.reputation(),
            artifacts_generated: stats.artifacts_generated,
            artifacts_sold: stats.artifacts_sold,
            credits_earned: stats.credits_earned,
            credits_spent: stats.credits_spent,
            legendary_found: stats.legendary_found,
            collection_value: player
                .collection()
                .values()
                .map(|a| market.value_of(a))
                .sum(),
        }
    }

    pub fn total_wealth(&self) -> u64 {
        self.credits.saturating_add(self.collection_value)
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(turns) = self.turns {
            writeln!(f, "Total turns played: {}", turns)?;
        }
        writeln!(f, "Final credits: {}", self.credits)?;
        writeln!(f, "Collection size: {} artifacts", self.collection_size)?;
        writeln!(f, "Final reputation: {:.2}x", self.reputation)?;
        writeln!(f)?;
        writeln!(f, "Stats:")?;
        writeln!(f, "- Artifacts generated: {}", self.artifacts_generated)?;
        writeln!(f, "- Artifacts sold: {}", self.artifacts_sold)?;
        writeln!(f, "- Credits earned: {}", self.credits_earned)?;
        writeln!(f, "- Credits spent: {}", self.credits_spent)?;
        writeln!(f, "- Legendary artifacts found: {}", self.legendary_found)?;
        writeln!(f)?;
        writeln!(f, "Total collection value: {} credits", self.collection_value)?;
        write!(
            f,
            "Total wealth (credits + collection): {} credits",
            self.total_wealth()
        )
    }
}

/// Player and market restored from the save directory.
pub struct SavedGame {
    pub player: Player,
    pub market: ArtifactMarket,
}

impl SavedGame {
    /// `Ok(None)` unless both the player and the market records are present.
    pub fn load(storage: &GameStorage, starting_credits: u64) -> Result<Option<Self>, EconomyError> {
        let mut player = Player::new(starting_credits, storage.clone());
        let mut market = ArtifactMarket::new(storage.clone());
        let player_loaded = player.load()?;
        let market_loaded = market.load()?;
        if player_loaded && market_loaded {
            Ok(Some(Self { player, market }))
        } else {
            if player_loaded || market_loaded {
                warn!(
                    "partial save in {} (player: {}, market: {}); ignoring it",
                    storage.save_dir().display(),
                    player_loaded,
                    market_loaded
                );
            }
            Ok(None)
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary::from_parts(None, &self.player, &self.market)
    }
}

pub struct GameSession<S> {
    player: Player,
    market: ArtifactMarket,
    source: S,
    turn: u32,
    market_update_frequency: u32,
    max_batch_size: usize,
}

impl<S: ArtifactSource> GameSession<S> {
    /// Fresh player with the configured balance and a newly initialized market.
    pub fn new_game(config: &GameConfig, storage: GameStorage, source: S) -> Self {
        let player = Player::new(config.starting_credits, storage.clone());
        let market = ArtifactMarket::new(storage);
        info!("new game ({} credits)", config.starting_credits);
        Self::assemble(config, player, market, source)
    }

    /// Continue a saved game. The market keeps its saved multipliers.
    pub fn resume(config: &GameConfig, saved: SavedGame, source: S) -> Self {
        info!("resuming saved game ({} credits)", saved.player.credits());
        Self::assemble(config, saved.player, saved.market, source)
    }

    fn assemble(config: &GameConfig, player: Player, market: ArtifactMarket, source: S) -> Self {
        Self {
            player,
            market,
            source,
            turn: 0,
            market_update_frequency: config.market_update_frequency,
            max_batch_size: config.max_batch_size.max(1),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn market(&self) -> &ArtifactMarket {
        &self.market
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Start-of-turn bookkeeping. Returns `true` when the market shifted this turn.
    pub fn begin_turn(&mut self) -> bool {
        let shifted = self.turn > 0
            && self.market_update_frequency > 0
            && self.turn % self.market_update_frequency == 0;
        if shifted {
            self.market.tick();
            info!("turn {}: market shifted", self.turn);
        }
        self.market.update_reputation(self.player.stats());
        shifted
    }

    pub fn end_turn(&mut self) {
        self.turn = self.turn.saturating_add(1);
    }

    fn clamp_count(&self, count: usize) -> usize {
        count.clamp(1, self.max_batch_size)
    }

    /// `count` artifacts (clamped to 1..=max batch) with weighted-random rarities.
    pub fn plan_random_with<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> GenerationPlan {
        let requests = (0..self.clamp_count(count))
            .map(|_| ArtifactRequest::random_with(rng, None))
            .collect();
        GenerationPlan { requests }
    }

    pub fn plan_random(&self, count: usize) -> GenerationPlan {
        self.plan_random_with(&mut rand::thread_rng(), count)
    }

    /// One artifact per listed rarity (truncated to the max batch), random categories.
    pub fn plan_rarities_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        rarities: &[Rarity],
    ) -> GenerationPlan {
        let requests = rarities
            .iter()
            .take(self.max_batch_size)
            .map(|r| ArtifactRequest::random_with(rng, Some(*r)))
            .collect();
        GenerationPlan { requests }
    }

    pub fn plan_rarities(&self, rarities: &[Rarity]) -> GenerationPlan {
        self.plan_rarities_with(&mut rand::thread_rng(), rarities)
    }

    /// Pay for `plan`, ask the void, and file whatever comes back.
    ///
    /// The full cost is charged up front. If the generator errors or returns nothing usable
    /// the whole cost is refunded; a short batch is not refunded. Each new artifact is
    /// exported; an export failure is reported in its [`Discovery`] and does not undo the
    /// purchase.
    pub async fn generate(
        &mut self,
        plan: &GenerationPlan,
    ) -> Result<GenerationOutcome, GenerateError> {
        let cost = plan.total_cost();
        if !self.player.spend(cost) {
            return Err(GenerateError::Unaffordable {
                cost,
                balance: self.player.credits(),
            });
        }

        let artifacts = match self.source.generate_batch(&plan.requests).await {
            Ok(artifacts) => artifacts,
            Err(source) => {
                warn!("generation failed, refunding {} credits: {}", cost, source);
                self.player.earn(cost);
                return Err(GenerateError::Void {
                    source,
                    refunded: cost,
                });
            }
        };
        if artifacts.is_empty() {
            warn!("generation produced nothing, refunding {} credits", cost);
            self.player.earn(cost);
            return Err(GenerateError::EmptyBatch { refunded: cost });
        }

        let discoveries = artifacts
            .into_iter()
            .map(|artifact| self.file_artifact(artifact))
            .collect::<Vec<_>>();
        info!(
            "generated {}/{} artifact(s) for {} credits",
            discoveries.len(),
            plan.len(),
            cost
        );
        Ok(GenerationOutcome {
            cost,
            requested: plan.len(),
            discoveries,
        })
    }

    fn file_artifact(&mut self, artifact: Artifact) -> Discovery {
        let id = self.player.add(artifact);
        let exported = self.export(&id);
        if let Err(e) = &exported {
            warn!("export of {} failed: {}", id, e);
        }
        Discovery { id, exported }
    }

    /// Write the export document for a held artifact.
    pub fn export(&self, id: &str) -> Result<PathBuf, EconomyError> {
        self.player
            .export(id)?
            .ok_or_else(|| EconomyError::ArtifactNotFound(id.to_string()))
    }

    pub fn value_of(&self, artifact: &Artifact) -> u64 {
        self.market.value_of(artifact)
    }

    /// Every held artifact with its current price and demand flag, in listing order.
    pub fn sale_listing(&self) -> Vec<ListingLine> {
        self.player
            .listing_order()
            .into_iter()
            .filter_map(|id| self.player.get(&id))
            .map(|artifact| ListingLine {
                id: artifact.id.clone(),
                name: artifact.name.clone(),
                rarity: artifact.rarity,
                value: self.market.value_of(artifact),
                demand: Demand::classify(self.market.multiplier(artifact.category)),
            })
            .collect()
    }

    pub fn quote_sale(&self, ids: &[String]) -> SaleQuote {
        quote_sale(&self.player, &self.market, ids)
    }

    pub fn complete_sale(&mut self, quote: SaleQuote) -> SaleReceipt {
        execute_sale(&mut self.player, quote)
    }

    pub fn save(&self) -> Result<(), EconomyError> {
        self.player.save()?;
        self.market.save()?;
        info!("game saved at turn {}", self.turn);
        Ok(())
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary::from_parts(Some(self.turn), &self.player, &self.market)
    }
}
