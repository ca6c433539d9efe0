mod command;
mod config;
mod input;
mod matcher;
mod output;
mod store;

use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tourney_core::{Deletion, Item, PercentMatched, RankingSession};
use tracing_subscriber::EnvFilter;

use crate::command::Command;
use crate::matcher::MatchReporter;
use crate::store::StoreError;

/// How long the prompt waits for percent-matched before showing "computing".
const MATCH_WAIT: Duration = Duration::from_millis(50);

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "tourney", version, about = "Rank items by answering which-do-you-prefer questions")]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start or resume an interactive ranking
    Rank(RankArgs),
    /// Print the ranking stored in a session file
    Show(ShowArgs),
    /// Create a default config file at ~/.config/tourney/config.toml
    Init,
}

#[derive(Parser)]
struct RankArgs {
    /// File with one item per line, or a JSON array of strings
    #[arg(long)]
    items: Option<PathBuf>,

    /// Inline item (repeatable)
    #[arg(long = "item")]
    inline_items: Vec<String>,

    /// Session file to save to (default: `session` from config)
    #[arg(long)]
    session: Option<PathBuf>,

    /// Continue the ranking stored in the session file
    #[arg(long, conflicts_with_all = ["items", "inline_items", "keep_choices"])]
    resume: bool,

    /// Start a new run but reuse the choices stored in the session file
    #[arg(long)]
    keep_choices: bool,

    /// Seed for the shuffle, for reproducible pairings
    #[arg(long)]
    seed: Option<u64>,

    /// Only save on `s`, never after each change
    #[arg(long)]
    no_autosave: bool,

    /// Print the final ranking as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ~/.config/tourney/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct ShowArgs {
    /// Session file to read (default: `session` from config)
    #[arg(long)]
    session: Option<PathBuf>,

    /// Reorder the ranking by win rate before printing
    #[arg(long)]
    optimize: bool,

    /// Print every item, ranked or not, sorted by name
    #[arg(long)]
    all: bool,

    /// Prefix items with their rank
    #[arg(long, overrides_with = "no_numbers")]
    numbers: bool,

    /// Print bare item names
    #[arg(long)]
    no_numbers: bool,

    /// Output JSON instead of a list
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ~/.config/tourney/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Rank(args) => run_rank(args).await,
        Commands::Show(args) => run_show(args),
        Commands::Init => {
            let path = config::config_path().unwrap_or_else(|e| bail(e));
            config::create_default_config(&path).unwrap_or_else(|e| bail(e));
            println!("Created config at {}", path.display());
            println!("Edit it to set your default session file, seed, etc.");
        }
    }
}

/// `--config` when given, otherwise the per-user default location.
fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    match flag {
        Some(path) => path.to_path_buf(),
        None => config::config_path().unwrap_or_else(|e| bail(e)),
    }
}

/// Load items from --items and --item, falling back to piped stdin.
/// Returns whether stdin was consumed.
fn collect_items(args: &RankArgs) -> (Vec<Item>, bool) {
    let items = input::load_items(args.items.as_deref(), &args.inline_items).unwrap_or_else(|e| bail(e));
    if !items.is_empty() {
        return (items, false);
    }

    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        bail("No items provided. Use --items <file>, --item <name>, or pipe items via stdin.");
    }
    let mut content = String::new();
    stdin
        .read_to_string(&mut content)
        .unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));
    let items = input::parse_items_from_str(&content).unwrap_or_else(|e| bail(e));
    if items.is_empty() {
        bail("No items found on stdin.");
    }
    (items, true)
}

type Answers = io::Lines<Box<dyn BufRead>>;

/// Where interactive answers come from: stdin, or the terminal when stdin held the items.
fn answer_source(stdin_consumed: bool) -> Answers {
    let reader: Box<dyn BufRead> = if stdin_consumed {
        let tty = std::fs::File::open("/dev/tty").unwrap_or_else(|e| {
            bail(format!("Items were read from stdin, but no terminal is available for answers: {e}"))
        });
        Box::new(io::BufReader::new(tty))
    } else {
        Box::new(io::stdin().lock())
    };
    reader.lines()
}

fn read_line(answers: &mut Answers, prompt: &str) -> Option<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    match answers.next()? {
        Ok(line) => Some(line),
        Err(e) => bail(format!("Failed to read input: {e}")),
    }
}

fn confirm(answers: &mut Answers, question: &str) -> bool {
    read_line(answers, &format!("{question} [y/N] "))
        .is_some_and(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn save(session: &RankingSession, path: &Path) {
    match store::save_session(path, &session.to_saved()) {
        Ok(()) => tracing::debug!(path = %path.display(), "autosaved"),
        Err(e) => eprintln!("Warning: {e}"),
    }
}

async fn run_rank(args: RankArgs) {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = resolve_config_path(args.config.as_deref());
    let cfg = config::load_config(&config_path).unwrap_or_else(|e| bail(e));

    let session_path = args.session.clone().or(cfg.session);
    let autosave = !args.no_autosave && cfg.autosave.unwrap_or(true);
    let numbers = cfg.numbers.unwrap_or(true);

    let mut session = match args.seed.or(cfg.seed) {
        Some(seed) => RankingSession::with_seed(seed),
        None => RankingSession::new(),
    };

    if args.resume || args.keep_choices {
        let path = session_path.as_deref().unwrap_or_else(|| {
            bail(format!(
                "--resume and --keep-choices need --session or `session` in {}",
                config_path.display()
            ))
        });
        match store::load_session(path) {
            Ok(saved) => session.load(saved).unwrap_or_else(|e| bail(format!("{}: {e}", path.display()))),
            Err(StoreError::Read { source, .. })
                if args.keep_choices && source.kind() == io::ErrorKind::NotFound =>
            {
                eprintln!("Warning: {} does not exist yet; starting without stored choices", path.display());
            }
            Err(e) => bail(e),
        }
    }

    let mut stdin_consumed = false;
    if !args.resume {
        let (items, from_stdin) = collect_items(&args);
        stdin_consumed = from_stdin;
        tracing::debug!(items = items.len(), stored_choices = session.stored_choices(), "starting run");
        session.start_run(&items);
    }

    if let Some(path) = session_path.as_deref().filter(|_| autosave) {
        save(&session, path);
    }

    let mut answers = answer_source(stdin_consumed);
    let reporter = MatchReporter::new();
    reporter.request(session.match_query());

    loop {
        let matched = reporter.settle(MATCH_WAIT).await;
        print_state(&session, matched);

        let Some(line) = read_line(&mut answers, "> ") else {
            break;
        };
        let command = match command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("Warning: {msg}");
                continue;
            }
        };

        match execute(&mut session, command, &mut answers, numbers) {
            Outcome::Unchanged => {}
            Outcome::Changed => {
                reporter.request(session.match_query());
                if let Some(path) = session_path.as_deref().filter(|_| autosave) {
                    save(&session, path);
                }
            }
            Outcome::SaveRequested => match session_path.as_deref() {
                Some(path) => {
                    save(&session, path);
                    eprintln!("Saved to {}", path.display());
                }
                None => eprintln!("Warning: no session file. Pass --session or set `session` in the config."),
            },
            Outcome::Quit => break,
        }
    }

    if args.json {
        let json = output::render_json(session.ranked(), session.unranked(), session.stored_choices(), session.counters())
            .unwrap_or_else(|e| bail(format!("Failed to render JSON: {e}")));
        println!("{json}");
    } else {
        output::print_table(session.ranked(), session.unranked(), session.stored_choices());
    }
}

fn print_state(session: &RankingSession, matched: Option<Option<PercentMatched>>) {
    eprintln!();
    eprintln!("{}", output::format_progress(&session.counters(), session.stored_choices()));
    eprintln!("{}", output::format_matched(matched));
    if let Some(status) = session.replacement_status() {
        eprintln!("{}", output::format_replacement(&status));
    }

    match session.current_pair() {
        Some((first, second)) => {
            eprintln!("Which do you prefer?");
            eprintln!("  [1] {first}");
            eprintln!("  [2] {second}");
        }
        None if session.is_finished() => eprintln!(
            "All {} items ranked. Type o to reoptimize, u to undo, q to finish.",
            session.ranked().len()
        ),
        None => eprintln!("Nothing left to compare. Type q to finish."),
    }
}

enum Outcome {
    Changed,
    Unchanged,
    SaveRequested,
    Quit,
}

fn report(result: tourney_core::Result<()>) -> Outcome {
    match result {
        Ok(()) => Outcome::Changed,
        Err(e) => {
            eprintln!("Warning: {e}");
            Outcome::Unchanged
        }
    }
}

fn execute(session: &mut RankingSession, command: Command, answers: &mut Answers, numbers: bool) -> Outcome {
    match command {
        Command::ChooseFirst => report(session.choose_first()),
        Command::ChooseSecond => report(session.choose_second()),
        Command::Undo => match session.undo() {
            Ok(Some((first, second))) => {
                eprintln!("Undid the choice between '{first}' and '{second}'.");
                Outcome::Changed
            }
            Ok(None) => {
                eprintln!("Nothing to undo.");
                Outcome::Unchanged
            }
            Err(e) => {
                eprintln!("Warning: {e}");
                Outcome::Unchanged
            }
        },
        Command::Replace(item) => {
            // An active round is rejected by the session itself.
            if !session.is_replacing() {
                let count = session.memo().matching_pairs(&item).len();
                if count == 0 {
                    eprintln!("No choices were found matching '{item}'.");
                    return Outcome::Unchanged;
                }
                if !confirm(answers, &format!("Re-ask {count} choices involving '{item}'?")) {
                    return Outcome::Unchanged;
                }
            }
            match session.start_replacement(&item) {
                Ok(pairs) => {
                    eprintln!("Replacing {pairs} choices for '{item}'.");
                    Outcome::Changed
                }
                Err(e) => {
                    eprintln!("Warning: {e}");
                    Outcome::Unchanged
                }
            }
        }
        Command::Delete(item) => {
            let count = session.memo().matching_pairs(&item).len();
            if count == 0 {
                eprintln!("No choices were found matching '{item}'.");
                return Outcome::Unchanged;
            }
            if !confirm(answers, &format!("Delete {count} choices involving '{item}'?")) {
                return Outcome::Unchanged;
            }
            match session.delete_all_choices_for(&item) {
                Deletion::Deleted(removed) => {
                    eprintln!("Deleted {removed} choices involving '{item}'.");
                    Outcome::Changed
                }
                Deletion::NothingToDelete => {
                    eprintln!("No choices were found matching '{item}'.");
                    Outcome::Unchanged
                }
            }
        }
        Command::Rename { old, new } => {
            let outcome = report(session.rename_item(&old, &new));
            if matches!(outcome, Outcome::Changed) {
                eprintln!("Renamed '{old}' to '{}'.", new.trim());
            }
            outcome
        }
        Command::Optimize => {
            if session.ranked().is_empty() {
                eprintln!("Nothing ranked yet.");
                return Outcome::Unchanged;
            }
            match session.reoptimize_final_order() {
                Ok(order) => {
                    for line in output::format_list(order, numbers) {
                        eprintln!("{line}");
                    }
                    Outcome::Changed
                }
                Err(e) => {
                    eprintln!("{e}");
                    Outcome::Unchanged
                }
            }
        }
        Command::List => {
            for line in output::format_list(session.ranked(), numbers) {
                eprintln!("{line}");
            }
            Outcome::Unchanged
        }
        Command::All => {
            for item in session.all_items() {
                eprintln!("{item}");
            }
            Outcome::Unchanged
        }
        Command::Save => Outcome::SaveRequested,
        Command::Help => {
            eprintln!("{}", command::HELP);
            Outcome::Unchanged
        }
        Command::Quit => Outcome::Quit,
    }
}

fn run_show(args: ShowArgs) {
    let config_path = resolve_config_path(args.config.as_deref());
    let cfg = config::load_config(&config_path).unwrap_or_else(|e| bail(e));

    let path = args.session.clone().or(cfg.session).unwrap_or_else(|| {
        bail(format!("No session file. Pass --session or set `session` in {}", config_path.display()))
    });
    let numbers = if args.numbers {
        true
    } else if args.no_numbers {
        false
    } else {
        cfg.numbers.unwrap_or(true)
    };

    let saved = store::load_session(&path).unwrap_or_else(|e| bail(e));
    let mut session = RankingSession::from_saved(saved)
        .unwrap_or_else(|e| bail(format!("{}: {e}", path.display())));
    if args.optimize {
        if let Err(e) = session.reoptimize_final_order() {
            eprintln!("Warning: not optimizing, {e}");
        }
    }

    if args.json {
        let json = output::render_json(session.ranked(), session.unranked(), session.stored_choices(), session.counters())
            .unwrap_or_else(|e| bail(format!("Failed to render JSON: {e}")));
        println!("{json}");
    } else if args.all {
        output::print_list(&session.all_items(), false);
    } else {
        output::print_list(session.ranked(), numbers);
    }
}
