mod common;

use std::collections::{BTreeSet, HashMap};

use lck_fantasy::aggregate::{AggregationPlan, aggregate};
use lck_fantasy::cursor::MatchCursor;
use lck_fantasy::error::PipelineError;
use lck_fantasy::ingest::{IngestPlan, ingest};
use lck_fantasy::registry::PlayerRegistry;
use lck_fantasy::scoring::points;
use lck_fantasy::slot_index::SlotKey;
use lck_fantasy::stat_log::StatLog;
use lck_fantasy::stat_row::StatLine;

use common::{BLUE, RED, season};

fn scraped_log(played: usize) -> StatLog {
    let mut log = StatLog::new();
    ingest(
        &season(played, 0),
        &mut log,
        &IngestPlan::resume(MatchCursor::season_start(), played),
    )
    .expect("ingest runs");
    log
}

fn far_limit() -> MatchCursor {
    MatchCursor::week_start(99)
}

#[test]
fn weekly_aggregate_equals_sum_of_raw_rows() {
    let log = scraped_log(20);
    let registry = PlayerRegistry::lck_default();
    let outcome = aggregate(&log, &registry, &AggregationPlan::week(1)).expect("aggregate runs");

    let mut expected: HashMap<u32, (u32, u32, u32, u32, i64, u32)> = HashMap::new();
    for (_, row) in log.iter().filter(|(_, row)| row.week == 1) {
        let id = registry.lookup(&row.player_name).expect("known player");
        let e = expected.entry(id).or_default();
        e.0 += row.stats.kills;
        e.1 += row.stats.deaths;
        e.2 += row.stats.assists;
        e.3 += row.stats.cs;
        e.4 += row.stats.points();
        e.5 += 1;
    }

    assert_eq!(outcome.matches_consumed, 10);
    assert_eq!(outcome.aggregates.len(), 10);
    for agg in &outcome.aggregates {
        assert_eq!(agg.week, 1);
        let e = expected[&agg.player_id];
        assert_eq!(
            (agg.kills, agg.deaths, agg.assists, agg.cs, agg.points, agg.games_played),
            e
        );
        assert_eq!(agg.games_played, 20);
    }
}

#[test]
fn same_player_in_two_weeks_gets_two_aggregates() {
    let log = scraped_log(20);
    let registry = PlayerRegistry::lck_default();
    let plan = AggregationPlan::new(MatchCursor::new(1, 9), far_limit());
    let outcome = aggregate(&log, &registry, &plan).expect("aggregate runs");

    let faker = registry.lookup("Faker").expect("Faker registered");
    let weeks = outcome
        .aggregates
        .iter()
        .filter(|a| a.player_id == faker)
        .map(|a| (a.week, a.games_played))
        .collect::<Vec<_>>();
    assert_eq!(weeks, vec![(1, 2), (2, 20)]);
    assert_eq!(outcome.next_cursor, MatchCursor::new(3, 0));
}

#[test]
fn stops_at_first_missing_block() {
    let log = scraped_log(4);
    let registry = PlayerRegistry::lck_default();
    let plan = AggregationPlan::new(MatchCursor::season_start(), far_limit());
    let outcome = aggregate(&log, &registry, &plan).expect("aggregate runs");
    assert_eq!(outcome.matches_consumed, 4);
    assert_eq!(outcome.next_cursor, MatchCursor::new(1, 4));
}

#[test]
fn partial_block_is_not_consumed() {
    let mut log = scraped_log(1);
    for slot in 0..10 {
        let key = SlotKey::new(1, 1, 0, slot).expect("valid slot");
        log.upsert(key, BLUE[0], StatLine::default());
    }
    let registry = PlayerRegistry::lck_default();
    let plan = AggregationPlan::new(MatchCursor::season_start(), far_limit());
    let outcome = aggregate(&log, &registry, &plan).expect("aggregate runs");
    assert_eq!(outcome.matches_consumed, 1);
    assert_eq!(outcome.next_cursor, MatchCursor::new(1, 1));
}

#[test]
fn never_reads_past_the_limit() {
    let log = scraped_log(10);
    let registry = PlayerRegistry::lck_default();
    let plan = AggregationPlan::new(MatchCursor::season_start(), MatchCursor::new(1, 6));
    let outcome = aggregate(&log, &registry, &plan).expect("aggregate runs");
    assert_eq!(outcome.matches_consumed, 6);
    assert_eq!(outcome.next_cursor, MatchCursor::new(1, 6));
}

#[test]
fn cursor_advances_monotonically_over_successive_runs() {
    let log = scraped_log(15);
    let registry = PlayerRegistry::lck_default();
    let mut cursor = MatchCursor::season_start();
    let limits = [
        MatchCursor::new(1, 3),
        MatchCursor::new(1, 3),
        MatchCursor::new(2, 5),
        far_limit(),
    ];
    for limit in limits {
        let outcome = aggregate(&log, &registry, &AggregationPlan::new(cursor, limit))
            .expect("aggregate runs");
        assert!(outcome.next_cursor >= cursor);
        cursor = outcome.next_cursor;
    }
    assert_eq!(cursor, MatchCursor::new(2, 5));
}

#[test]
fn split_runs_sum_to_single_run() {
    let log = scraped_log(10);
    let registry = PlayerRegistry::lck_default();

    let whole = aggregate(&log, &registry, &AggregationPlan::week(1)).expect("whole week");
    let first = aggregate(
        &log,
        &registry,
        &AggregationPlan::new(MatchCursor::season_start(), MatchCursor::new(1, 4)),
    )
    .expect("first half");
    let second = aggregate(
        &log,
        &registry,
        &AggregationPlan::new(first.next_cursor, MatchCursor::week_start(2)),
    )
    .expect("second half");

    for agg in &whole.aggregates {
        let parts = first
            .aggregates
            .iter()
            .chain(second.aggregates.iter())
            .filter(|a| a.player_id == agg.player_id && a.week == agg.week)
            .fold((0, 0, 0), |acc, a| (acc.0 + a.kills, acc.1 + a.points, acc.2 + a.games_played));
        assert_eq!(parts, (agg.kills, agg.points, agg.games_played));
    }
}

#[test]
fn unknown_player_fails_fast_with_name() {
    let mut log = scraped_log(1);
    let key = SlotKey::new(1, 0, 1, 3).expect("valid slot");
    log.upsert(key, "Mystery", StatLine::default());

    let registry = PlayerRegistry::lck_default();
    let err = aggregate(&log, &registry, &AggregationPlan::week(1)).expect_err("unknown player");
    match err {
        PipelineError::UnknownPlayer { name, index } => {
            assert_eq!(name, "Mystery");
            assert_eq!(index, key.to_index());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn aliases_resolve_to_one_aggregate() {
    let mut log = scraped_log(1);
    // Same player under the source's alternate spelling in game 1.
    let key = SlotKey::new(1, 0, 1, 2).expect("valid slot");
    log.upsert(key, "ShowMaker", StatLine { kills: 1, deaths: 0, assists: 0, cs: 0 });
    let key = SlotKey::new(1, 0, 0, 2).expect("valid slot");
    log.upsert(key, "Showmaker", StatLine { kills: 2, deaths: 0, assists: 0, cs: 0 });

    let registry = PlayerRegistry::lck_default();
    let outcome = aggregate(&log, &registry, &AggregationPlan::week(1)).expect("aggregate runs");
    let showmaker = registry.lookup("Showmaker").expect("registered");
    let agg = outcome
        .aggregates
        .iter()
        .find(|a| a.player_id == showmaker)
        .expect("aggregate present");
    assert_eq!(agg.kills, 3);
    assert_eq!(agg.games_played, 2);
    assert_eq!(agg.points, points(1, 0, 0, 0) + points(2, 0, 0, 0));
}

#[test]
fn skipped_match_counts_as_consumed() {
    let mut source = season(1, 1);
    source.push_played("KT vs DRX", [common::sheet(2, 0), common::sheet(2, 1)]);
    let skipped = BTreeSet::from([MatchCursor::new(1, 1)]);

    let mut log = StatLog::new();
    ingest(
        &source,
        &mut log,
        &IngestPlan::resume(MatchCursor::season_start(), 3).with_skipped(skipped.clone()),
    )
    .expect("ingest runs");

    let registry = PlayerRegistry::lck_default();
    let plan = AggregationPlan::new(MatchCursor::season_start(), far_limit()).with_skipped(skipped);
    let outcome = aggregate(&log, &registry, &plan).expect("aggregate runs");
    assert_eq!(outcome.matches_consumed, 2);
    assert_eq!(outcome.matches_skipped, 1);
    assert_eq!(outcome.next_cursor, MatchCursor::new(1, 3));
    let faker = registry.lookup(RED[2]).expect("registered");
    assert!(outcome.aggregates.iter().any(|a| a.player_id == faker && a.games_played == 4));
}
