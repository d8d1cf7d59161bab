use lck_fantasy::aggregate::PlayerWeekAggregate;
use lck_fantasy::cursor::MatchCursor;
use lck_fantasy::stats_store::{
    ApplyOutcome, SqlScriptSink, SqliteStatsStore, StatsBatch, StatsStore, update_statement,
};

fn agg(
    player_id: u32,
    week: u32,
    kills: u32,
    points: i64,
    games_played: u32,
) -> PlayerWeekAggregate {
    PlayerWeekAggregate {
        player_id,
        week,
        kills,
        deaths: 1,
        assists: 2,
        cs: 300,
        points,
        games_played,
    }
}

fn batch(from: MatchCursor, to: MatchCursor, updates: Vec<PlayerWeekAggregate>) -> StatsBatch {
    StatsBatch { from, to, updates }
}

#[test]
fn deltas_accumulate_per_player_week() {
    let mut store = SqliteStatsStore::open_in_memory().expect("open store");
    let first = batch(
        MatchCursor::new(1, 0),
        MatchCursor::new(1, 5),
        vec![agg(21, 1, 4, 10, 10), agg(20, 1, 2, 6, 10)],
    );
    let second = batch(
        MatchCursor::new(1, 5),
        MatchCursor::new(2, 1),
        vec![agg(21, 1, 3, 7, 8), agg(21, 2, 1, 2, 2)],
    );

    assert_eq!(store.apply(&first).expect("apply"), ApplyOutcome::Applied { rows: 2 });
    assert_eq!(store.apply(&second).expect("apply"), ApplyOutcome::Applied { rows: 2 });

    let week1 = store.week_row(21, 1).expect("query").expect("row present");
    assert_eq!(week1.kills, 7);
    assert_eq!(week1.points, 17);
    assert_eq!(week1.games_played, 18);
    assert_eq!(week1.cs, 600);
    let week2 = store.week_row(21, 2).expect("query").expect("row present");
    assert_eq!(week2.kills, 1);
    assert_eq!(store.weekly_rows().expect("query").len(), 3);
    assert_eq!(store.watermark().expect("query"), Some(MatchCursor::new(2, 1)));
}

#[test]
fn replayed_batch_is_not_applied_twice() {
    let mut store = SqliteStatsStore::open_in_memory().expect("open store");
    let b = batch(MatchCursor::new(1, 0), MatchCursor::new(2, 0), vec![agg(21, 1, 4, 10, 20)]);

    store.apply(&b).expect("first apply");
    assert_eq!(store.apply(&b).expect("replay"), ApplyOutcome::AlreadyApplied);

    let row = store.week_row(21, 1).expect("query").expect("row present");
    assert_eq!(row.kills, 4);
    assert_eq!(row.games_played, 20);
}

#[test]
fn batch_with_gap_is_refused() {
    let mut store = SqliteStatsStore::open_in_memory().expect("open store");
    store
        .apply(&batch(MatchCursor::new(1, 0), MatchCursor::new(1, 2), vec![agg(1, 1, 1, 2, 2)]))
        .expect("first apply");

    let gap = batch(MatchCursor::new(1, 4), MatchCursor::new(1, 6), vec![agg(1, 1, 1, 2, 2)]);
    assert!(store.apply(&gap).is_err());
    assert_eq!(store.watermark().expect("query"), Some(MatchCursor::new(1, 2)));
    assert_eq!(store.week_row(1, 1).expect("query").map(|r| r.kills), Some(1));
}

#[test]
fn sql_script_lists_incremental_updates() {
    let mut sink = SqlScriptSink::new(Vec::new());
    let b = batch(MatchCursor::new(1, 0), MatchCursor::new(1, 1), vec![agg(21, 1, 4, 10, 2)]);
    sink.apply(&b).expect("write script");
    let script = String::from_utf8(sink.into_inner()).expect("utf8");
    assert_eq!(script.trim_end(), update_statement(&b.updates[0]));
    assert_eq!(
        script.trim_end(),
        "UPDATE Stats SET kills = kills + 4, deaths = deaths + 1, assists = assists + 2, cs = cs + 300, points = ROUND(points + 10, 2), gamesPlayed = gamesPlayed + 2 WHERE playerID = 21 AND week = 1;"
    );
}
