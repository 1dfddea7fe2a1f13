//! Integration tests for the interaction filter.
//!
//! The corpus below is shaped so every stage has something to do. Each of the
//! two popular games gets 301 reviews:
//! - 210 casual reviews with playtime 1
//! - 75 reviews with playtime 10
//! - 15 serious reviews with playtime 28
//! - 1 hoarder with playtime 10 000
//!
//! Over the 602 popular rows Q1 = 1 and Q3 = 10, so the bounds are [-17, 28]
//! and only the hoarders go. The post-outlier mean is 4.6, so the serious
//! floor is 23 and exactly the 30 rows at 28 survive.

use data_loader::InteractionRecord;
use pipeline::filters::PopularityFilter;
use pipeline::{Filter, FilterConfig, FilterError, InteractionFilter, MIN_VALID_ACTOR_ID};

const ACTOR_BASE: u64 = 76_561_198_000_000_000;

fn record(actor_id: u64, item: &str, playtime: f64, recommended: Option<bool>) -> InteractionRecord {
    InteractionRecord {
        item_id: item.len() as u32,
        item_name: item.to_string(),
        review_id: actor_id ^ item.len() as u64,
        language: "english".to_string(),
        actor_id,
        timestamp: 1_611_381_629,
        playtime,
        recommended,
    }
}

/// One popular game's reviews. Serious reviewers are actors 285..300 for
/// every game, so they each review both games.
fn popular_game(item: &str) -> Vec<InteractionRecord> {
    let mut rows = Vec::new();
    for i in 0..210 {
        rows.push(record(ACTOR_BASE + i, item, 1.0, Some(true)));
    }
    for i in 210..285 {
        rows.push(record(ACTOR_BASE + i, item, 10.0, Some(false)));
    }
    for i in 285..300 {
        let flag = if i % 3 == 0 { None } else { Some(i % 2 == 0) };
        rows.push(record(ACTOR_BASE + i, item, 28.0, flag));
    }
    rows.push(record(ACTOR_BASE + 999, item, 10_000.0, Some(true)));
    rows
}

fn create_corpus() -> Vec<InteractionRecord> {
    let mut rows = popular_game("GameA");
    rows.extend(popular_game("GameB"));
    // Unpopular game: even serious playtime does not save it
    rows.extend((0..10).map(|i| record(ACTOR_BASE + 2_000 + i, "GameC", 28.0, Some(true))));
    rows
}

#[test]
fn test_stage_statistics() {
    let outcome = InteractionFilter::new(FilterConfig::default())
        .run(create_corpus())
        .unwrap();
    let report = &outcome.report;

    assert_eq!(report.input_rows, 612);
    assert_eq!(report.popular_items, 2);
    assert_eq!(report.quartiles.q1, 1.0);
    assert_eq!(report.quartiles.q3, 10.0);
    assert_eq!(report.playtime_bounds, (-17.0, 28.0));
    assert!((report.mean_playtime - 4.6).abs() < 1e-9);
    assert!((report.serious_floor - 23.0).abs() < 1e-9);
    assert!(report.warnings.is_empty());

    let counts: Vec<(usize, usize)> = report.stages.iter().map(|s| (s.input, s.output)).collect();
    assert_eq!(counts, vec![(612, 602), (602, 600), (600, 30), (30, 30)]);
    assert_eq!(report.output_rows, 30);
}

#[test]
fn test_output_satisfies_every_predicate() {
    let raw = create_corpus();
    let outcome = InteractionFilter::new(FilterConfig::default())
        .run(raw.clone())
        .unwrap();

    // filtered == raw restricted to the conjunction of the fitted predicates
    let expected: Vec<&InteractionRecord> = raw
        .iter()
        .filter(|r| outcome.thresholds.retains(r))
        .collect();
    let actual: Vec<&InteractionRecord> =
        outcome.interactions.iter().map(|i| &i.record).collect();
    assert_eq!(actual, expected);

    for interaction in &outcome.interactions {
        let r = &interaction.record;
        assert!(r.item_name == "GameA" || r.item_name == "GameB");
        assert!(r.playtime >= -17.0 && r.playtime <= 28.0);
        assert!(r.playtime >= 23.0);
        assert!(r.actor_id >= MIN_VALID_ACTOR_ID);
    }
}

#[test]
fn test_reapplying_thresholds_is_fixed_point() {
    let outcome = InteractionFilter::new(FilterConfig::default())
        .run(create_corpus())
        .unwrap();
    let output: Vec<InteractionRecord> =
        outcome.interactions.iter().map(|i| i.record.clone()).collect();

    let again = outcome.thresholds.pipeline().apply(output.clone());
    assert_eq!(again, output);
}

#[test]
fn test_invalid_actor_dropped_regardless_of_playtime() {
    let mut corpus = create_corpus();
    // A serious-looking review from a malformed account id
    corpus.push(record(12345, "GameA", 28.0, Some(true)));

    let outcome = InteractionFilter::new(FilterConfig::default())
        .run(corpus)
        .unwrap();

    assert_eq!(outcome.report.invalid_actor_rows, 1);
    assert!(outcome.interactions.iter().all(|i| i.record.actor_id != 12345));
}

#[test]
fn test_ratings_follow_flag() {
    let outcome = InteractionFilter::new(FilterConfig::default())
        .run(create_corpus())
        .unwrap();

    for interaction in &outcome.interactions {
        let expected = match interaction.record.recommended {
            Some(true) => 5.0,
            Some(false) | None => 1.0,
        };
        assert_eq!(interaction.rating, expected);
    }
    assert!(outcome.interactions.iter().any(|i| i.rating == 5.0));
    assert!(outcome.interactions.iter().any(|i| i.record.recommended.is_none()));
}

#[test]
fn test_hoarder_would_dominate_without_outlier_stage() {
    // Without the IQR stage the mean would be pulled to ~37.8 and no
    // serious reviewer at 28 would survive
    let corpus = create_corpus();
    let popular = PopularityFilter::fit(&corpus, 200).apply(corpus);
    let mean = popular.iter().map(|r| r.playtime).sum::<f64>() / popular.len() as f64;
    assert!(mean * 5.0 > 28.0);
}

#[test]
fn test_unpopular_item_dropped() {
    let outcome = InteractionFilter::new(FilterConfig::default())
        .run(create_corpus())
        .unwrap();
    assert!(outcome.interactions.iter().all(|i| i.record.item_name != "GameC"));
}

#[test]
fn test_all_invalid_actors_is_empty_corpus() {
    let corpus: Vec<InteractionRecord> = create_corpus()
        .into_iter()
        .map(|mut r| {
            r.actor_id %= 1_000_000;
            r
        })
        .collect();

    let err = InteractionFilter::new(FilterConfig::default())
        .run(corpus)
        .unwrap_err();
    assert!(matches!(
        err,
        FilterError::EmptyCorpus { ref stage, .. } if stage == "ActorIdFilter"
    ));
}
