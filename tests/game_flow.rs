use voidtrader::game::{play, Console, GameSummary, SavedGame};
use voidtrader::storage::{GameStorage, MARKET_RECORD, PLAYER_RECORD};
use voidtrader::void::VoidError;
mod common;
use common::ScriptedSource;

async fn play_scripted(
    storage: &GameStorage,
    source: ScriptedSource,
    input: &str,
) -> (GameSummary, String) {
    let mut console = Console::new(input.as_bytes(), Vec::new());
    let summary = play(&common::game_config(), storage.clone(), source, &mut console)
        .await
        .expect("game runs to completion");
    let output = String::from_utf8(console.into_output()).expect("utf-8 output");
    (summary, output)
}

#[tokio::test]
async fn buy_one_common_then_save() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    // generate, one artifact, pick rarities, common, proceed, save and exit
    let (summary, output) =
        play_scripted(&storage, ScriptedSource::echoing(1), "1\n1\ny\n1\ny\n5\n").await;

    assert_eq!(summary.credits, 49);
    assert_eq!(summary.collection_size, 1);
    assert_eq!(summary.turns, Some(1));
    assert!(output.contains("This will cost 1 credits."));
    assert!(output.contains("=== ARTIFACTS DISCOVERED ==="));
    assert!(output.contains("[COMMON] Echo 1"));
    assert!(output.contains("Game saved successfully!"));
    assert!(storage.record_exists(PLAYER_RECORD));
    assert!(storage.record_exists(MARKET_RECORD));
    assert_eq!(std::fs::read_dir(storage.output_dir()).unwrap().count(), 1);
}

#[tokio::test]
async fn saved_game_resumes_and_sells() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    play_scripted(&storage, ScriptedSource::echoing(1), "1\n1\ny\n1\ny\n5\n").await;

    let saved = SavedGame::load(&storage, 50).unwrap().expect("save present");
    assert_eq!(saved.summary().credits, 49);
    assert_eq!(saved.summary().turns, None);

    let (resumed, output) = play_scripted(&storage, ScriptedSource::new(), "y\n5\n").await;
    assert!(output.starts_with("Would you like to continue your saved game?"));
    assert_eq!(resumed.credits, 49);
    assert_eq!(resumed.collection_size, 1);

    let (sold, output) = play_scripted(&storage, ScriptedSource::new(), "y\n4\nall\ny\n5\n").await;
    assert!(output.contains("=== SELLING SUMMARY ==="));
    assert!(output.contains("Sale complete!"));
    assert_eq!(sold.collection_size, 0);
    assert_eq!(sold.artifacts_sold, 1);
    assert!(sold.credits > 49);
    assert_eq!(sold.credits, 49 + sold.credits_earned);
}

#[tokio::test]
async fn declining_the_save_starts_over() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    play_scripted(&storage, ScriptedSource::echoing(1), "1\n1\ny\n1\ny\n5\n").await;

    let (fresh, _) = play_scripted(&storage, ScriptedSource::new(), "n\n5\n").await;
    assert_eq!(fresh.credits, 50);
    assert_eq!(fresh.collection_size, 0);

    let saved = SavedGame::load(&storage, 50).unwrap().unwrap();
    assert_eq!(saved.player.credits(), 50);
}

#[tokio::test]
async fn failed_generation_refunds_and_says_so() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let source = ScriptedSource::new().then_err(VoidError::Transport("connection reset".into()));
    let (summary, output) = play_scripted(&storage, source, "1\n2\nn\ny\n5\n").await;

    assert!(output.contains("Error generating artifacts"));
    assert!(output.contains("Your credits have been refunded."));
    assert_eq!(summary.credits, 50);
    assert_eq!(summary.collection_size, 0);
}

#[tokio::test]
async fn unaffordable_batch_is_refused_before_confirming() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let (summary, output) = play_scripted(
        &storage,
        ScriptedSource::echoing(1),
        "1\n4\ny\n4\n4\n4\n4\n5\n",
    )
    .await;

    assert!(output.contains("You don't have enough credits! That would cost 60 credits."));
    assert!(!output.contains("Proceed?"));
    assert_eq!(summary.credits, 50);
    assert_eq!(summary.artifacts_generated, 0);
}

#[tokio::test]
async fn cancelled_generation_costs_nothing() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let (summary, output) =
        play_scripted(&storage, ScriptedSource::echoing(1), "1\n1\ny\n3\nn\n5\n").await;

    assert!(output.contains("This will cost 7 credits."));
    assert!(output.contains("Generation cancelled."));
    assert_eq!(summary.credits, 50);
}

#[tokio::test]
async fn invalid_choices_and_empty_views() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let (summary, output) =
        play_scripted(&storage, ScriptedSource::new(), "9\n2\n3\n4\n5\n").await;

    assert!(output.contains("Invalid choice. Please try again."));
    assert!(output.contains("Your collection is empty."));
    assert!(output.contains("=== MARKET CONDITIONS ==="));
    assert!(output.contains("Nothing to sell!"));
    assert_eq!(summary.turns, Some(4));
}

#[tokio::test]
async fn end_of_input_saves_and_exits() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let (summary, output) = play_scripted(&storage, ScriptedSource::new(), "").await;

    assert_eq!(summary.credits, 50);
    assert!(output.contains("Game saved successfully!"));
    assert!(output.contains("Thank you for playing The Void Artifact Trader!"));
    assert!(storage.record_exists(PLAYER_RECORD));
}

#[tokio::test]
async fn viewing_an_artifact_can_export_it_again() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    // buy one, then collection -> specific artifact -> #1 -> export
    let (_, output) = play_scripted(
        &storage,
        ScriptedSource::echoing(1),
        "1\n1\ny\n2\ny\n2\n3\n1\n1\n5\n",
    )
    .await;

    assert!(output.contains("=== VIEW SPECIFIC ARTIFACT ==="));
    assert!(output.contains("=== Echo 1 ==="));
    assert!(output.contains("Rarity: UNCOMMON | Category:"));
    assert!(output.contains("Exported to: "));
}

#[tokio::test]
async fn corrupt_save_is_an_error_not_an_overwrite() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    std::fs::create_dir_all(storage.save_dir()).unwrap();
    std::fs::write(storage.record_path(PLAYER_RECORD), "{broken").unwrap();
    std::fs::write(storage.record_path(MARKET_RECORD), "{}").unwrap();

    let mut console = Console::new("5\n".as_bytes(), Vec::new());
    let result = play(
        &common::game_config(),
        storage.clone(),
        ScriptedSource::new(),
        &mut console,
    )
    .await;
    assert!(result.is_err());
    assert_eq!(
        std::fs::read_to_string(storage.record_path(PLAYER_RECORD)).unwrap(),
        "{broken"
    );
}
