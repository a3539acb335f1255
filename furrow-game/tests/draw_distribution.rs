use chrono::{TimeZone, Utc};
use furrow_game::gather::resolve_gather;
use furrow_game::session;
use furrow_game::{
    ContractCatalog, EconomyConfig, GatherAction, ItemKind, PlayerSession, RngBundle, Tier,
};
use std::collections::HashMap;

const SAMPLE_SIZE: u32 = 10_000;
const TOLERANCE: f64 = 0.02;

#[test]
fn case_tier_frequencies_converge_to_weights() {
    let catalog = ContractCatalog::default_catalog();
    let cfg = EconomyConfig::default_config();
    let rng = RngBundle::from_seed(0x5EED);
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();

    let mut counts: HashMap<Tier, u32> = HashMap::new();
    for _ in 0..SAMPLE_SIZE {
        let mut state = furrow_game::GameState::new("sampler");
        session::start_day(&mut state, &cfg, now).unwrap();
        let outcome = session::open_case(&mut state, &catalog, &cfg, &rng, now).unwrap();
        *counts.entry(outcome.tier).or_insert(0) += 1;
    }

    let share = |tier: Tier| f64::from(counts.get(&tier).copied().unwrap_or(0))
        / f64::from(SAMPLE_SIZE);
    assert!(
        (share(Tier::Common) - 0.75).abs() <= TOLERANCE,
        "common drifted: {:.4}",
        share(Tier::Common)
    );
    assert!(
        (share(Tier::Advanced) - 0.22).abs() <= TOLERANCE,
        "advanced drifted: {:.4}",
        share(Tier::Advanced)
    );
    assert!(
        (share(Tier::Epic) - 0.03).abs() <= TOLERANCE,
        "epic drifted: {:.4}",
        share(Tier::Epic)
    );
}

#[test]
fn mining_split_approximates_seventy_twenty_ten() {
    let rng = RngBundle::from_seed(0xCAFE);
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
    let samples = 1_000u32;

    let mut counts: HashMap<ItemKind, u32> = HashMap::new();
    for _ in 0..samples {
        let mut session = PlayerSession::open(
            1,
            8,
            furrow_game::Inventory::new(),
            None,
            false,
            now,
        );
        let outcome =
            resolve_gather(&mut session, GatherAction::MineStone, &mut *rng.gather(), now)
                .unwrap();
        *counts.entry(outcome.item).or_insert(0) += 1;
    }

    let share =
        |item: ItemKind| f64::from(counts.get(&item).copied().unwrap_or(0)) / f64::from(samples);
    assert!((share(ItemKind::Stone) - 0.70).abs() <= 0.05);
    assert!((share(ItemKind::Coal) - 0.20).abs() <= 0.05);
    assert!((share(ItemKind::Iron) - 0.10).abs() <= 0.05);
    // Mining yields nothing outside the table.
    assert!(counts.keys().all(|item| matches!(
        *item,
        ItemKind::Stone | ItemKind::Coal | ItemKind::Iron
    )));
}

#[test]
fn template_rolls_respect_spawn_weights() {
    let catalog = ContractCatalog::default_catalog();
    let rng = RngBundle::from_seed(0xB0B);
    let mut counts: HashMap<String, u32> = HashMap::new();
    for _ in 0..5_000 {
        let template = catalog
            .roll_template(Tier::Common, &mut *rng.case())
            .unwrap();
        *counts.entry(template.id.clone()).or_insert(0) += 1;
    }
    // Pool weights are 40/35/25; the heaviest template leads the count.
    assert!(counts["sprout_supper"] > counts["gravel_order"]);
    assert!(counts.values().all(|count| *count > 0));
}
