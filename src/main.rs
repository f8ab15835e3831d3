use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use scorekeep::autosave::AutosaveScheduler;
use scorekeep::catalog::{CatalogProvider, ContestantId, FileCatalog, JudgeId, Settings, SubEventId};
use scorekeep::config::Config;
use scorekeep::scoring::ScoreView;
use scorekeep::session::{JudgeSession, SessionIdentity, SAVE_SUCCESS_MESSAGE};
use scorekeep::store::FileStore;

const EXIT_SUCCESS: i32 = 0;
const EXIT_REJECTED: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_STORE: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive scoring screen for a judge
    Judge {
        sub_event: String,
        judge: String,
    },
    /// Print score sheets (overall results unless a judge is given)
    Sheet {
        sub_event: String,
        /// Print this judge's sheet instead of the overall results
        #[arg(short, long, conflicts_with = "all")]
        judge: Option<String>,
        /// Print every judge's sheet followed by the overall results
        #[arg(short, long)]
        all: bool,
        /// Tab-separated output for spreadsheets
        #[arg(long)]
        tsv: bool,
    },
    /// Print a judge's own ranking
    Ranking {
        sub_event: String,
        judge: String,
    },
    /// Set one score (0-100, empty to clear) and save it
    Score {
        sub_event: String,
        judge: String,
        contestant: String,
        criterion: String,
        value: String,
    },
    /// Set a judge's comment on a contestant and save it
    Comment {
        sub_event: String,
        judge: String,
        contestant: String,
        text: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "scorekeep")]
#[command(about = "Judge scoring and ranking", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/scorekeep/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = scorekeep::stderr_buffer::init_logger(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config_dir = config_path
        .as_deref()
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .unwrap_or_else(scorekeep::config::get_config_dir);
    let config = match scorekeep::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = scorekeep::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let catalog = FileCatalog::new(scorekeep::config::catalog_path(&config, &config_dir));
    let store = Arc::new(FileStore::new(scorekeep::config::scores_dir(&config, &config_dir)));
    log::debug!(
        "Catalog {}, scores in {}",
        catalog.path().display(),
        store.dir().display()
    );

    match cli.command {
        Commands::Judge { sub_event, judge } => {
            let session = open_session(&catalog, &store, &config, &sub_event, &judge).await;
            let app = scorekeep::tui::App::new(session);
            if let Err(e) = scorekeep::tui::run_tui(app).await {
                eprintln!("Error: {:#}", e);
                std::process::exit(EXIT_STORE);
            }
        }
        Commands::Sheet {
            sub_event,
            judge,
            all,
            tsv,
        } => {
            let sub_event = SubEventId::from(sub_event);
            let scores = match scorekeep::fetch::fetch_sub_event_scores(&catalog, store.as_ref(), &sub_event).await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Catalog error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            check_catalog(&scores.settings);

            let sheets = if all {
                scorekeep::scoring::build_all_sheets(&scores.settings, &scores.sheets)
            } else {
                let view = match judge {
                    Some(j) => ScoreView::Sheet(JudgeId::from(j)),
                    None => ScoreView::Aggregate,
                };
                scorekeep::scoring::build_sheet(&scores.settings, &scores.sheets, &view)
                    .map(|sheet| vec![sheet])
            };
            let sheets = match sheets {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    std::process::exit(EXIT_REJECTED);
                }
            };

            if tsv {
                let tsv: Vec<String> = sheets.iter().map(scorekeep::output::format_sheet_tsv).collect();
                println!("{}", tsv.join("\n\n"));
            } else {
                let use_colors = scorekeep::output::should_use_colors();
                println!("{}", scorekeep::output::format_sheets(&sheets, use_colors));
            }
        }
        Commands::Ranking { sub_event, judge } => {
            let session = open_session(&catalog, &store, &config, &sub_event, &judge).await;
            let use_colors = scorekeep::output::should_use_colors();
            println!(
                "{}",
                scorekeep::output::format_judge_ranking(&session.judge_ranking(), session.settings(), use_colors)
            );
        }
        Commands::Score {
            sub_event,
            judge,
            contestant,
            criterion,
            value,
        } => {
            let mut session = open_session(&catalog, &store, &config, &sub_event, &judge).await;
            let contestant = ContestantId::from(contestant);
            if !session.set_score(&contestant, &criterion.as_str().into(), &value) {
                eprintln!(
                    "Rejected: '{}' is not a valid score for {} / {} (expected a whole number 0-100)",
                    value, contestant, criterion
                );
                std::process::exit(EXIT_REJECTED);
            }
            save_and_close(session, &contestant).await;
        }
        Commands::Comment {
            sub_event,
            judge,
            contestant,
            text,
        } => {
            let mut session = open_session(&catalog, &store, &config, &sub_event, &judge).await;
            let contestant = ContestantId::from(contestant);
            if session.settings().contestant(&contestant).is_none() {
                eprintln!("Rejected: unknown contestant '{}'", contestant);
                std::process::exit(EXIT_REJECTED);
            }
            session.set_comment(&contestant, &text);
            save_and_close(session, &contestant).await;
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn check_catalog(settings: &Settings) {
    if let Err(errors) = scorekeep::scoring::validate_catalog(settings) {
        eprintln!("Catalog errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
}

/// Load and validate the catalog, then open the judge's session. Exits on
/// catalog problems or an unknown judge.
async fn open_session(
    catalog: &FileCatalog,
    store: &Arc<FileStore>,
    config: &Config,
    sub_event: &str,
    judge: &str,
) -> JudgeSession<FileStore> {
    let identity = SessionIdentity {
        sub_event: sub_event.into(),
        judge: judge.into(),
    };

    let settings = match catalog.get_settings(&identity.sub_event).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Catalog error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    check_catalog(&settings);

    let autosave = AutosaveScheduler::new(Arc::clone(store), config.autosave_delay());
    match JudgeSession::from_settings(identity, settings, autosave, config.flash_duration()).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Rejected: {:#}", e);
            std::process::exit(EXIT_REJECTED);
        }
    }
}

async fn save_and_close(mut session: JudgeSession<FileStore>, contestant: &ContestantId) {
    if let Err(e) = session.save(contestant).await {
        eprintln!("Store error: {:#}", e);
        std::process::exit(EXIT_STORE);
    }
    if let Err(e) = session.close().await {
        eprintln!("Store error: {:#}", e);
        std::process::exit(EXIT_STORE);
    }
    println!("{}", SAVE_SUCCESS_MESSAGE);
}
