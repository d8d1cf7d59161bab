use std::fs;
use std::path::PathBuf;

use lck_fantasy::gol_source::{
    DEFAULT_BASE_URL, parse_game_links, parse_game_sheet, parse_match_list,
};
use lck_fantasy::source::MIN_GAME_LINKS;
use lck_fantasy::stat_row::StatLine;
use url::Url;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn base() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url parses")
}

#[test]
fn match_list_is_reversed_into_play_order() {
    let rows = parse_match_list(&read_fixture("matchlist.html"), &base());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "GEN vs T1");
    assert_eq!(
        rows[0].url.as_deref(),
        Some("https://gol.gg/game/stats/59001/page-summary/")
    );
    assert_eq!(rows[0].team_blue, "GEN");
    assert_eq!(rows[0].score, "2 - 1");
    assert_eq!(rows[0].team_red, "T1");
    assert_eq!(rows[0].week_label, "WEEK1");
    assert_eq!(rows[0].patch, "14.11");
    assert_eq!(rows[0].date, "2024-06-12");
    assert_eq!(rows[1].title, "HLE vs DK");
}

#[test]
fn played_match_exposes_game_links() {
    let links = parse_game_links(&read_fixture("match_played.html"), &base());
    assert!(links.len() >= MIN_GAME_LINKS);
    assert_eq!(links[0], "https://gol.gg/game/stats/59001/page-summary/");
    assert_eq!(links[1], "https://gol.gg/game/stats/59001/page-game/");
    assert_eq!(links[2], "https://gol.gg/game/stats/59002/page-game/");
}

#[test]
fn unplayed_match_has_only_summary_link() {
    let links = parse_game_links(&read_fixture("match_unplayed.html"), &base());
    assert_eq!(links.len(), 1);
    assert!(links.len() < MIN_GAME_LINKS);
}

#[test]
fn game_sheet_has_ten_players() {
    let sheet = parse_game_sheet(&read_fixture("game.html"));
    assert_eq!(sheet.players.len(), 10);
    assert_eq!(sheet.kdas.len(), 10);
    assert_eq!(sheet.cs.len(), 10);
    assert_eq!(sheet.players[2], "Chovy");

    let lines = sheet
        .statlines("fixture://game")
        .expect("fixture statlines parse");
    assert_eq!(
        lines[2],
        (
            "Chovy".to_string(),
            StatLine {
                kills: 7,
                deaths: 2,
                assists: 5,
                cs: 210
            }
        )
    );
    assert_eq!(lines[4].1.assists, 14);
}

#[test]
fn empty_page_parses_to_empty_sheet() {
    let sheet = parse_game_sheet("<html><body></body></html>");
    assert!(sheet.players.is_empty());
    assert!(sheet.kdas.is_empty());
    assert!(sheet.cs.is_empty());
}
