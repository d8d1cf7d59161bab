use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use lck_fantasy::config::{
    AggregateOptions, DEFAULT_SEASON, RunConfig, ScrapeOptions, parse_weeks,
};
use lck_fantasy::cursor::{MatchCursor, parse_match_ref};
use lck_fantasy::export::export_standings;
use lck_fantasy::gol_source::{DEFAULT_BASE_URL, GolSource};
use lck_fantasy::ingest::{DEFAULT_MAX_MATCHES, StopReason};
use lck_fantasy::logging;
use lck_fantasy::runner::{run_aggregate, run_scrape, status};
use lck_fantasy::stats_store::{ApplyOutcome, SqlScriptSink, SqliteStatsStore};

#[derive(Parser, Debug)]
#[command(name = "lck_fantasy")]
#[command(author, version, about = "Resumable LCK stat scraper and fantasy aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the stat log, cursor state and stats database
    #[arg(long, env = "LCK_DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Tournament name as it appears in gol.gg URLs
    #[arg(long, env = "LCK_SEASON", default_value = DEFAULT_SEASON, global = true)]
    season: String,

    #[arg(long, env = "LCK_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// JSON player registry replacing the built-in roster
    #[arg(long, env = "LCK_REGISTRY", global = true)]
    registry: Option<PathBuf>,

    /// Matches that will never be played, as WEEK:MATCH (repeatable)
    #[arg(
        long = "skip",
        value_name = "WEEK:MATCH",
        env = "LCK_SKIP",
        value_delimiter = ',',
        global = true
    )]
    skip: Vec<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape played matches into the stat log
    Scrape {
        /// Start over with an empty log
        #[arg(long)]
        force_restart: bool,

        /// Re-scrape only these weeks, e.g. "3,4"
        #[arg(long)]
        weeks: Option<String>,

        /// Upper bound on matches attempted in one run
        #[arg(long, env = "LCK_MAX_MATCHES", default_value_t = DEFAULT_MAX_MATCHES)]
        max_matches: usize,
    },

    /// Fold newly scraped matches into weekly fantasy stats
    Aggregate {
        /// Compute and print, but write nothing and keep the cursor
        #[arg(long)]
        dry_run: bool,

        /// Print incremental UPDATE statements instead of writing the SQLite store
        #[arg(long)]
        emit_sql: bool,
    },

    /// Show cursors and log size
    Status,

    /// Write weekly and season standings to an xlsx workbook
    Export {
        #[arg(short, long, default_value = "standings.xlsx")]
        out: PathBuf,
    },
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("error: {err}");
    }
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;

    match cli.command {
        Command::Scrape {
            force_restart,
            weeks,
            max_matches,
        } => {
            let opts = ScrapeOptions {
                force_restart,
                weeks: weeks.as_deref().map(parse_weeks).transpose()?.unwrap_or_default(),
                max_matches,
            };
            let source = GolSource::new(&config.base_url, &config.season)?;
            let report = run_scrape(&config, &opts, &source)?;
            let outcome = &report.outcome;

            println!("Scrape complete");
            println!("Log: {} ({} rows)", config.log_path().display(), report.log_rows);
            println!(
                "Matches ingested: {} (skipped {})",
                outcome.matches_ingested, outcome.matches_skipped
            );
            println!(
                "Rows: {} new, {} overwritten, {} unchanged",
                outcome.rows_inserted, outcome.rows_overwritten, outcome.rows_unchanged
            );
            match outcome.stop {
                StopReason::NotYetOccurred => {
                    println!("Stopped: {} has yet to occur", outcome.cursor)
                }
                StopReason::ListExhausted => {
                    println!("Stopped: match list ends before {}", outcome.cursor)
                }
                StopReason::AttemptBound => println!("Stopped: reached --max-matches"),
                StopReason::Completed => println!("Stopped: requested weeks complete"),
            }
            if report.cursor_saved {
                println!("Next scrape starts at {}", outcome.cursor);
            } else {
                println!("Strict re-scrape: cursor left at {}", report.previous_cursor);
            }
        }
        Command::Aggregate { dry_run, emit_sql } => {
            let registry = config.load_registry()?;
            let opts = AggregateOptions { commit: !dry_run };
            let report = if emit_sql {
                let mut sink = SqlScriptSink::new(std::io::stdout().lock());
                run_aggregate(&config, &opts, &registry, &mut sink)?
            } else {
                let mut store = SqliteStatsStore::open(&config.db_path())?;
                run_aggregate(&config, &opts, &registry, &mut store)?
            };
            let outcome = &report.outcome;

            eprintln!(
                "Aggregated {} matches ({} skipped) into {} player-weeks",
                outcome.matches_consumed,
                outcome.matches_skipped,
                outcome.aggregates.len()
            );
            match report.applied {
                None => {
                    for agg in &outcome.aggregates {
                        eprintln!(
                            "  week {} player {}: {}/{}/{} cs {} points {} games {}",
                            agg.week,
                            registry.name_of(agg.player_id).unwrap_or("?"),
                            agg.kills,
                            agg.deaths,
                            agg.assists,
                            agg.cs,
                            agg.points,
                            agg.games_played
                        );
                    }
                    eprintln!(
                        "Dry run: cursor would move {} -> {}",
                        outcome.from, outcome.next_cursor
                    );
                }
                Some(ApplyOutcome::Applied { rows }) => {
                    eprintln!("Applied {rows} updates; cursor now {}", outcome.next_cursor)
                }
                Some(ApplyOutcome::AlreadyApplied) => eprintln!(
                    "Store already had this batch; cursor now {}",
                    outcome.next_cursor
                ),
            }
        }
        Command::Status => {
            let report = status(&config)?;
            println!("Log: {}", config.log_path().display());
            println!("Rows: {} (last index {})", report.log_rows, report.last_index);
            println!("Ingestion cursor: {}", report.state.ingestion);
            println!("Aggregation cursor: {}", report.state.aggregation);
            println!(
                "Matches ready to aggregate: {} of {}",
                report.pending_blocks, report.behind
            );
            if let Some(updated) = report.state.updated_at.as_deref() {
                println!("State updated: {updated}");
            }
        }
        Command::Export { out } => {
            let registry = config.load_registry()?;
            let store = SqliteStatsStore::open(&config.db_path())?;
            let rows = store.weekly_rows()?;
            let report = export_standings(&out, &rows, &registry)?;
            println!(
                "Exported {} weekly rows for {} players to {}",
                report.weekly_rows,
                report.players,
                out.display()
            );
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<RunConfig> {
    let mut skipped: BTreeSet<MatchCursor> = BTreeSet::new();
    for raw in cli.skip.iter().filter(|s| !s.trim().is_empty()) {
        let cursor = parse_match_ref(raw)
            .ok_or_else(|| anyhow!("invalid --skip {raw:?}, expected WEEK:MATCH"))?;
        skipped.insert(cursor);
    }

    let mut config = RunConfig::new(cli.data_dir.clone());
    config.season = cli.season.clone();
    config.base_url = cli.base_url.clone();
    config.registry_path = cli.registry.clone();
    config.skipped_matches = skipped;
    Ok(config)
}
