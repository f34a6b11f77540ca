//! Artifact economy: taxonomies, valuation, the market engine, and the player's collection.
//!
//! Everything in here is synchronous and free of text parsing; artifacts arrive already
//! structured from [`crate::void`].

pub mod errors;
pub mod export;
pub mod market;
pub mod player;
pub mod trade;
pub mod types;
pub mod valuation;

pub use errors::EconomyError;
pub use market::{ArtifactMarket, MarketEntry, MarketReport, MarketTrend};
pub use player::{Player, PlayerStats, DEFAULT_STARTING_CREDITS};
pub use trade::{execute_sale, quote_sale, SaleLine, SaleQuote, SaleReceipt};
pub use types::{capitalize, generate_id, Artifact, Category, Rarity};
