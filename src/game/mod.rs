//! Turn structure and the interactive menu built on top of the economy and the void.

pub mod cli;
pub mod session;

pub use cli::{play, run, Console};
pub use session::{
    Demand, Discovery, GameSession, GameSummary, GenerateError, GenerationOutcome,
    GenerationPlan, ListingLine, SavedGame,
};
