mod config;
mod output;
mod session;

use cardsort_core::{Item, SorterState, LARGE_SET_THRESHOLD};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "cardsort", version, about = "Rank a set of items through pairwise comparisons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run an interactive pairwise ranking session
    Rank(RankArgs),
    /// Create a default config file at ~/.config/cardsort/config.toml
    Init,
}

#[derive(Parser)]
struct RankArgs {
    /// File with items: a JSON array of {id, name, image?, tags?} records,
    /// a JSON array of strings, or one name per line
    #[arg(long)]
    items: Option<PathBuf>,

    /// Inline item (repeatable)
    #[arg(long = "item")]
    inline_items: Vec<String>,

    /// Only rank items carrying this tag (repeatable; an item must carry
    /// every requested tag)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Question shown above each comparison
    #[arg(long)]
    criterion: Option<String>,

    /// Session file: resumed if it exists, rewritten after every judgment
    #[arg(long)]
    state: Option<PathBuf>,

    /// Resume from a continuation token printed by an earlier run
    #[arg(long)]
    token: Option<String>,

    /// Seed for the comparison order (omit for a fresh random order)
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show progress after each judgment
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: ~/.config/cardsort/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Parse a string as a JSON array of item records, a JSON array of names,
/// or plain text with one name per line. Names get sequential IDs.
fn parse_items_from_str(content: &str) -> Vec<Item> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        // Full records first; fall back to a bare name array.
        if let Ok(records) = serde_json::from_str::<Vec<Item>>(trimmed) {
            return records;
        }
        let names: Vec<String> = serde_json::from_str(trimmed)
            .unwrap_or_else(|e| bail(format!("File looks like JSON but failed to parse: {e}")));
        names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .enumerate()
            .map(|(i, name)| Item::new(i as i64 + 1, name))
            .collect()
    } else {
        trimmed
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .enumerate()
            .map(|(i, name)| Item::new(i as i64 + 1, name))
            .collect()
    }
}

/// Load items from all sources: --items file, --item inline args, or stdin.
fn load_items(args: &RankArgs) -> Vec<Item> {
    let mut items = Vec::new();

    if let Some(ref path) = args.items {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", path.display())));
        items = parse_items_from_str(&content);
    }

    // Inline names continue after the highest file-provided ID.
    if !args.inline_items.is_empty() {
        let mut next_id = items.iter().map(|i| i.id).max().map_or(1, |m| m + 1);
        for name in &args.inline_items {
            items.push(Item::new(next_id, name.trim()));
            next_id += 1;
        }
    }

    // From stdin (only if no file and no inline items)
    if items.is_empty() {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            bail("No items provided. Use --items <file>, --item <name>, or pipe items via stdin.");
        }
        let content: String = stdin
            .lock()
            .lines()
            .map(|l| l.unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}"))))
            .collect::<Vec<_>>()
            .join("\n");
        items = parse_items_from_str(&content);
    }

    items
}

/// Keep only items carrying every requested tag. Tag names compare
/// case-insensitively.
fn filter_by_tags(items: Vec<Item>, tags: &[String]) -> Vec<Item> {
    if tags.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            tags.iter()
                .all(|want| item.tags.iter().any(|t| t.name.eq_ignore_ascii_case(want)))
        })
        .collect()
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank(args) => run_rank(args),
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default criterion, output format, etc.");
        }
    }
}

fn fresh_session(items: Vec<Item>, seed: Option<u64>) -> SorterState {
    let result = match seed {
        Some(seed) => SorterState::new_with_rng(items, &mut StdRng::seed_from_u64(seed)),
        None => SorterState::new(items),
    };
    result.unwrap_or_else(|e| bail(e))
}

fn resume_session(items: Vec<Item>, wire: &cardsort_core::WireState) -> SorterState {
    SorterState::resume(items, wire).unwrap_or_else(|e| {
        bail(format!("{e}. Drop --state/--token to start a fresh session."))
    })
}

fn run_rank(args: RankArgs) {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let criterion = args
        .criterion
        .clone()
        .or(cfg.criterion)
        .unwrap_or_else(|| "Which do you prefer?".to_string());
    let json = args.json || cfg.json.unwrap_or(false);
    let seed = args.seed.or(cfg.seed);

    let items = filter_by_tags(load_items(&args), &args.tags);
    if items.len() < 2 {
        bail(format!("Need at least 2 items to rank, got {}", items.len()));
    }
    if items.len() > LARGE_SET_THRESHOLD {
        eprintln!(
            "Warning: {} items queues {} comparisons; sessions this size are rarely practical.",
            items.len(),
            items.len() * (items.len() - 1) / 2,
        );
    }

    let state = if let Some(ref token) = args.token {
        resume_session(items, &session::decode_token(token))
    } else if let Some(ref path) = args.state {
        if path.exists() {
            resume_session(items, &session::load_state_file(path))
        } else {
            fresh_session(items, seed)
        }
    } else {
        fresh_session(items, seed)
    };

    if args.verbose {
        eprintln!(
            "Ranking {} items ({} comparisons queued, fewer with inference)",
            state.items().len(),
            state.remaining_comparisons(),
        );
    }

    match session::run(state, &criterion, args.state.as_deref(), args.verbose) {
        session::SessionEnd::Finished(state) => {
            if let Some(ref path) = args.state {
                session::save_state_file(path, &state);
            }
            if json {
                output::print_json(&state);
            } else {
                output::print_table(&state);
            }
        }
        session::SessionEnd::Suspended(state) => {
            if let Some(ref path) = args.state {
                session::save_state_file(path, &state);
                eprintln!(
                    "Session saved. Re-run with --state {} and the same items to continue.",
                    path.display(),
                );
            } else {
                eprintln!("Resume with --token and the same items:");
                println!("{}", session::encode_token(&state));
            }
        }
    }
}
