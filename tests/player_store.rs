use voidtrader::economy::{
    execute_sale, quote_sale, ArtifactMarket, Category, EconomyError, Player, Rarity,
    DEFAULT_STARTING_CREDITS,
};
use voidtrader::storage::{COLLECTION_RECORD, PLAYER_RECORD};
mod common;

#[test]
fn buying_one_common_leaves_forty_nine() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage);
    assert!(player.spend(Rarity::Common.cost()));
    player.add(common::artifact("Pebble", Category::Archaeological, Rarity::Common, 8));
    assert_eq!(player.credits(), 49);
    assert_eq!(player.collection().len(), 1);
    assert_eq!(player.stats().credits_spent, 1);
    assert_eq!(player.stats().artifacts_generated, 1);
}

#[test]
fn overspending_changes_nothing() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let mut player = Player::new(10, storage);
    assert!(!player.spend(Rarity::Legendary.cost()));
    assert_eq!(player.credits(), 10);
    assert_eq!(player.stats().credits_spent, 0);
}

#[test]
fn save_then_load_on_fresh_instance_restores_everything() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage.clone());
    player.spend(22);
    let star = player.add(common::artifact("Star Lens", Category::Astronomical, Rarity::Legendary, 700));
    let seed = player.add(common::artifact("Seed", Category::Botanical, Rarity::Uncommon, 30));
    player.remove(&seed);
    player.record_sold(1);
    player.earn(30);
    player.save().unwrap();
    assert!(storage.record_exists(PLAYER_RECORD));
    assert!(storage.record_exists(COLLECTION_RECORD));

    let mut restored = Player::new(0, storage);
    assert!(restored.load().unwrap());
    assert_eq!(restored.credits(), player.credits());
    assert_eq!(restored.stats(), player.stats());
    assert_eq!(restored.collection(), player.collection());
    assert_eq!(restored.get(&star).unwrap().base_value, Some(700));
    assert_eq!(restored.discovered_categories(), player.discovered_categories());
    assert_eq!(restored.discovered_rarities(), player.discovered_rarities());
    // Sold, but still discovered
    assert!(restored.discovered_categories().contains(&Category::Botanical));
}

#[test]
fn load_requires_both_records() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage.clone());
    player.add(common::artifact("Gear", Category::Mechanical, Rarity::Rare, 80));
    player.save().unwrap();
    std::fs::remove_file(storage.record_path(COLLECTION_RECORD)).unwrap();

    let mut fresh = Player::new(DEFAULT_STARTING_CREDITS, storage);
    assert!(!fresh.load().unwrap());
    assert!(fresh.collection().is_empty());
    assert_eq!(fresh.credits(), DEFAULT_STARTING_CREDITS);
}

#[test]
fn corrupt_player_record_is_a_typed_error() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    std::fs::create_dir_all(storage.save_dir()).unwrap();
    std::fs::write(storage.record_path(PLAYER_RECORD), "not json").unwrap();
    std::fs::write(storage.record_path(COLLECTION_RECORD), "{}").unwrap();
    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage);
    assert!(matches!(player.load(), Err(EconomyError::Json { .. })));
}

#[test]
fn collection_keys_are_authoritative_for_ids() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    std::fs::create_dir_all(storage.save_dir()).unwrap();
    std::fs::write(
        storage.record_path(PLAYER_RECORD),
        r#"{"credits": 7, "stats": {"artifacts_sold": 2}, "discovered_categories": ["mystical"], "discovered_rarities": ["common", "rare"]}"#,
    )
    .unwrap();
    std::fs::write(
        storage.record_path(COLLECTION_RECORD),
        r#"{"abcd1234": {"name": "Bell", "category": "mystical", "rarity": "rare", "ascii_art": "()", "description": "Rings.", "value": 99}}"#,
    )
    .unwrap();

    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage);
    assert!(player.load().unwrap());
    assert_eq!(player.credits(), 7);
    assert_eq!(player.stats().artifacts_sold, 2);
    assert_eq!(player.stats().credits_earned, 0);
    let bell = player.get("abcd1234").unwrap();
    assert_eq!(bell.id, "abcd1234");
    assert_eq!(bell.base_value, Some(99));
}

#[test]
fn unknown_category_in_save_skips_that_artifact_only() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    std::fs::create_dir_all(storage.save_dir()).unwrap();
    std::fs::write(
        storage.record_path(PLAYER_RECORD),
        r#"{"credits": 12, "discovered_categories": ["culinary", "mechanical"], "discovered_rarities": ["common"]}"#,
    )
    .unwrap();
    std::fs::write(
        storage.record_path(COLLECTION_RECORD),
        r#"{
            "a1": {"name": "Soup Ladle", "category": "culinary", "rarity": "mythic", "value": 40},
            "b2": {"name": "Clockwork Moth", "category": "mechanical", "rarity": "rare", "value": 75}
        }"#,
    )
    .unwrap();

    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage);
    assert!(player.load().unwrap());
    assert_eq!(player.credits(), 12);
    assert_eq!(player.collection().len(), 1);
    assert!(player.get("a1").is_none());
    let moth = player.get("b2").unwrap();
    assert_eq!(moth.category, Category::Mechanical);
    assert_eq!(moth.base_value, Some(75));
    assert_eq!(
        player.discovered_categories().iter().copied().collect::<Vec<_>>(),
        vec![Category::Mechanical]
    );
}

#[test]
fn export_writes_the_document() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let mut player = Player::new(DEFAULT_STARTING_CREDITS, storage.clone());
    let mut relic = common::artifact("Brass Oracle", Category::Mechanical, Rarity::Rare, 88);
    relic.id = "0badf00d".into();
    let id = player.add(relic);

    let path = player.export(&id).unwrap().unwrap();
    assert_eq!(path, storage.output_dir().join("brass_oracle_0badf00d.txt"));
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "=".repeat(60));
    assert_eq!(lines[1], "Brass Oracle");
    assert_eq!(lines[3], "ID: 0badf00d");
    assert_eq!(lines[4], "Category: Mechanical");
    assert_eq!(lines[5], "Rarity: RARE");
    assert_eq!(lines[6], "Value: 88 credits");
    assert!(text.ends_with("Brass Oracle hums quietly."));
}

#[test]
fn selling_removes_once_and_pays_the_quote() {
    let (_tmp, _cfg, storage) = common::temp_storage();
    let mut player = Player::new(0, storage.clone());
    let mut market = ArtifactMarket::new(storage);
    market.set_multiplier(Category::Linguistic, 1.0);
    let a = player.add(common::artifact("Glyph", Category::Linguistic, Rarity::Common, 12));
    let b = player.add(common::artifact("Rune", Category::Linguistic, Rarity::Uncommon, 40));

    let ids = vec![a.clone(), b.clone(), a.clone()];
    let quote = quote_sale(&player, &market, &ids);
    assert_eq!(quote.total(), 52);
    let receipt = execute_sale(&mut player, quote);
    assert_eq!(receipt.total, 52);
    assert_eq!(player.credits(), 52);
    assert_eq!(player.stats().artifacts_sold, 2);
    assert!(player.get(&a).is_none() && player.get(&b).is_none());

    // Selling again yields nothing
    let again = quote_sale(&player, &market, &ids);
    assert!(again.is_empty());
}
