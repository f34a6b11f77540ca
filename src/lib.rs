//! # Voidtrader - The Void Artifact Trader
//!
//! A single-player terminal game about collecting and trading procedurally generated artifacts.
//! Players spend credits to pull artifacts out of the Deep Void (a language-model generator),
//! watch a drifting market, and sell at the right moment.
//!
//! ## Features
//!
//! - **Artifact Economy**: Four rarities with fixed costs and value ranges, seven categories with
//!   per-category demand multipliers, and a reputation bonus earned by selling.
//! - **Persistent Games**: Market and player state saved as JSON with atomic, lock-protected
//!   writes; every artifact is also exported as a plain-text document.
//! - **Pluggable Generator**: Anything implementing [`void::ArtifactSource`] can feed the game;
//!   the default speaks to OpenAI or Anthropic over HTTPS (feature `llm`).
//! - **Async Design**: Built with Tokio; the only suspension point is the generator call,
//!   bounded by a configurable timeout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voidtrader::config::Config;
//! use voidtrader::game::{play, Console};
//! use voidtrader::storage::GameStorage;
//! use voidtrader::void::DeepVoid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default("config.toml").await?;
//!     let source = DeepVoid::from_config(&config)?;
//!     let storage = GameStorage::new(&config.storage);
//!     let mut console = Console::new(std::io::stdin().lock(), std::io::stdout());
//!     let summary = play(&config.game, storage, source, &mut console).await?;
//!     println!("Final wealth: {}", summary.total_wealth());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`economy`] - Rarities, categories, valuation, market engine, player collection, sales
//! - [`void`] - Prompt library, generated-text parser, LLM client, artifact generation
//! - [`game`] - Turn loop, generation payment and refunds, terminal menu
//! - [`storage`] - Save records and export documents on disk
//! - [`config`] - TOML configuration
//! - [`logutil`] - Single-line previews of generated text for logs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Game / CLI    │ ← Turns, menus, paying for generation
//! └─────────────────┘
//!      │        │
//! ┌─────────┐ ┌──────────────┐
//! │  Void   │ │   Economy    │ ← Market, player, valuation
//! └─────────┘ └──────────────┘
//!                   │
//!           ┌───────────────┐
//!           │    Storage    │ ← JSON records, exports
//!           └───────────────┘
//! ```

pub mod config;
pub mod economy;
pub mod game;
pub mod logutil;
pub mod storage;
pub mod void;
