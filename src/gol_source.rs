use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{PipelineError, PipelineResult};
use crate::source::{GameSheet, MatchListing, MatchSource};

pub const DEFAULT_BASE_URL: &str = "https://gol.gg/";
const REQUEST_TIMEOUT_SECS: u64 = 15;

static CLIENT: OnceCell<Client> = OnceCell::new();

static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static GAME_TAB: Lazy<Selector> = Lazy::new(|| selector("li.nav-item.game-menu-button"));
static PLAYER: Lazy<Selector> = Lazy::new(|| selector("a.link-blanc"));
static KDA_CELL: Lazy<Selector> = Lazy::new(|| selector(r#"td[style="text-align:center"]"#));
static CS_CELL: Lazy<Selector> = Lazy::new(|| selector(r#"td[style="text-align:center;"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// gol.gg tournament pages.
pub struct GolSource {
    client: &'static Client,
    base: Url,
    matchlist_url: String,
}

impl GolSource {
    pub fn new(base_url: &str, season: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base url {base_url}"))?;
        let matchlist_url = base
            .join(&format!("tournament/tournament-matchlist/{season}/"))
            .with_context(|| format!("invalid season name {season:?}"))?
            .to_string();
        Ok(Self {
            client: http_client()?,
            base,
            matchlist_url,
        })
    }

    fn fetch(&self, url: &str) -> PipelineResult<String> {
        debug!(url, "fetching page");
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .map_err(|err| PipelineError::transport(url, err))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::transport(url, format!("http {status}")));
        }
        resp.text().map_err(|err| PipelineError::transport(url, err))
    }
}

impl MatchSource for GolSource {
    fn match_list(&self) -> PipelineResult<Vec<MatchListing>> {
        let html = self.fetch(&self.matchlist_url)?;
        Ok(parse_match_list(&html, &self.base))
    }

    fn game_links(&self, match_url: &str) -> PipelineResult<Vec<String>> {
        let html = self.fetch(match_url)?;
        Ok(parse_game_links(&html, &self.base))
    }

    fn game_sheet(&self, game_url: &str) -> PipelineResult<GameSheet> {
        let html = self.fetch(game_url)?;
        Ok(parse_game_sheet(&html))
    }
}

/// Resolves an `href` against the site root. gol.gg links are written as
/// `../game/stats/...`; joining against the root collapses the `..`.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

/// Match list rows in play order. The page lists the newest match first.
pub fn parse_match_list(html: &str, base: &Url) -> Vec<MatchListing> {
    let doc = Html::parse_document(html);
    let mut out = doc
        .select(&ROW)
        .skip(1)
        .filter_map(|row| {
            let cells = row.select(&CELL).collect::<Vec<_>>();
            let first = cells.first()?;
            let cell = |idx: usize| cells.get(idx).map(|c| text_of(*c)).unwrap_or_default();
            Some(MatchListing {
                url: first
                    .select(&LINK)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| resolve_link(base, href)),
                title: text_of(*first),
                team_blue: cell(1),
                score: cell(2),
                team_red: cell(3),
                week_label: cell(4),
                patch: cell(5),
                date: cell(6),
            })
        })
        .collect::<Vec<_>>();
    out.reverse();
    out
}

pub fn parse_game_links(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&GAME_TAB)
        .filter_map(|tab| {
            let href = tab
                .value()
                .attr("href")
                .or_else(|| tab.select(&LINK).next().and_then(|a| a.value().attr("href")))?;
            resolve_link(base, href)
        })
        .collect()
}

pub fn parse_game_sheet(html: &str) -> GameSheet {
    let doc = Html::parse_document(html);
    GameSheet {
        players: doc.select(&PLAYER).map(text_of).collect(),
        kdas: doc.select(&KDA_CELL).map(text_of).collect(),
        cs: doc.select(&CS_CELL).map(text_of).collect(),
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_link_collapses_parent_segments() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            resolve_link(&base, "../game/stats/59001/page-summary/").as_deref(),
            Some("https://gol.gg/game/stats/59001/page-summary/")
        );
        assert_eq!(
            resolve_link(&base, "https://example.com/x").as_deref(),
            Some("https://example.com/x")
        );
    }

    #[test]
    fn season_names_are_percent_encoded() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let url = base
            .join("tournament/tournament-matchlist/LCK Summer 2024/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://gol.gg/tournament/tournament-matchlist/LCK%20Summer%202024/"
        );
    }
}
