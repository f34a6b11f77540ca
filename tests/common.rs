//! Test utilities & fixtures.
//! Scripted artifact sources and throwaway save directories shared by the integration tests.
#![allow(dead_code)] // Each test binary uses a different subset.

use std::collections::VecDeque;
use voidtrader::config::{GameConfig, StorageConfig};
use voidtrader::economy::{Artifact, Category, Rarity};
use voidtrader::storage::GameStorage;
use voidtrader::void::{ArtifactRequest, ArtifactSource, VoidError};

/// Storage rooted in a fresh temp dir. Keep the `TempDir` alive for the test's duration.
pub fn temp_storage() -> (tempfile::TempDir, StorageConfig, GameStorage) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = StorageConfig::rooted_at(tmp.path());
    let storage = GameStorage::new(&config);
    (tmp, config, storage)
}

pub fn artifact(name: &str, category: Category, rarity: Rarity, value: u32) -> Artifact {
    Artifact {
        id: String::new(),
        name: name.to_string(),
        category,
        rarity,
        ascii_art: "/\\\n\\/".to_string(),
        description: format!("{} hums quietly.", name),
        base_value: Some(value),
    }
}

pub fn game_config() -> GameConfig {
    GameConfig::default()
}

/// Replays canned results in order and records every batch it was asked for.
#[derive(Default)]
pub struct ScriptedSource {
    replies: VecDeque<Result<Vec<Artifact>, VoidError>>,
    echo: bool,
    pub calls: Vec<Vec<ArtifactRequest>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(mut self, artifacts: Vec<Artifact>) -> Self {
        self.replies.push_back(Ok(artifacts));
        self
    }

    pub fn then_err(mut self, err: VoidError) -> Self {
        self.replies.push_back(Err(err));
        self
    }

    /// One artifact per request, echoing the requested category and rarity.
    pub fn echoing(requests: usize) -> Self {
        let mut source = Self::new();
        for _ in 0..requests {
            source.replies.push_back(Ok(Vec::new()));
        }
        source.echo = true;
        source
    }
}

impl ArtifactSource for ScriptedSource {
    async fn generate_batch(
        &mut self,
        requests: &[ArtifactRequest],
    ) -> Result<Vec<Artifact>, VoidError> {
        self.calls.push(requests.to_vec());
        let reply = self
            .replies
            .pop_front()
            .unwrap_or(Err(VoidError::EmptyResponse));
        if self.echo {
            return reply.map(|_| {
                requests
                    .iter()
                    .enumerate()
                    .map(|(i, r)| artifact(&format!("Echo {}", i + 1), r.category, r.rarity, 10))
                    .collect()
            });
        }
        reply
    }
}
