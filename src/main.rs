//! carlbot CLI
//!
//! Usage:
//!   carlbot --text "who is carl"            # Single reply
//!   carlbot --interactive                   # Chat in the terminal
//!   carlbot --serve                         # HTTP API server
//!   carlbot --dump-rules                    # Print the rule table as TOML
//!   carlbot --rules my_rules.toml ...       # Use a custom rule table

use clap::Parser;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use carlbot::core::{run_server, ConversationHost, IntentMatcher, ThinkingDelay};
use carlbot::types::{Role, RuleTable, Turn, QUICK_ACTIONS};
use carlbot::{THINKING_DELAY_MAX_MS, THINKING_DELAY_MIN_MS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "carlbot",
    version = VERSION,
    about = "Carl's portfolio assistant - rule-based replies about Carl",
    long_about = "carlbot answers questions about Carl by matching the input against an\n\
                  ordered rule table. The first rule with a matching pattern wins and one\n\
                  of its replies is picked at random; unmatched input gets a fallback.\n\n\
                  Modes:\n  \
                  --text         One reply\n  \
                  --interactive  Terminal chat (/reset, /quick, /1../5)\n  \
                  --serve        HTTP API server\n  \
                  --dump-rules   Print the active rule table as TOML"
)]
struct Args {
    /// Text to reply to (single mode)
    #[arg(short, long)]
    text: Option<String>,

    /// Interactive chat - read lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// TOML rule file replacing the built-in table
    #[arg(long)]
    rules: Option<String>,

    /// Print the active rule table as TOML and exit
    #[arg(long)]
    dump_rules: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show which rule answered
    #[arg(long)]
    verbose: bool,

    /// Seed reply selection (single mode)
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum simulated typing delay
    #[arg(long, default_value_t = THINKING_DELAY_MIN_MS)]
    min_delay_ms: u64,

    /// Maximum simulated typing delay
    #[arg(long, default_value_t = THINKING_DELAY_MAX_MS)]
    max_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let matcher = match load_matcher(&args) {
        Ok(m) => Arc::new(m),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    };
    let delay = ThinkingDelay::new(args.min_delay_ms, args.max_delay_ms);

    if args.dump_rules {
        run_dump(&matcher);
    } else if args.serve {
        run_serve(&args, matcher, delay).await;
    } else if let Some(ref text) = args.text {
        run_single(text, &matcher, &args);
    } else {
        // Default to interactive if no mode specified
        run_interactive(matcher, delay, &args).await;
    }
}

/// Built-in table unless a rule file was given
fn load_matcher(args: &Args) -> carlbot::Result<IntentMatcher> {
    match args.rules {
        Some(ref path) => {
            let table = RuleTable::load(path)?;
            tracing::info!(path = %path, rules = table.len(), "loaded rule file");
            Ok(IntentMatcher::with_table(table))
        }
        None => Ok(IntentMatcher::new()),
    }
}

/// Print the active table
fn run_dump(matcher: &IntentMatcher) {
    match matcher.table().to_toml_string() {
        Ok(body) => print!("{}", body),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Run the HTTP API
async fn run_serve(args: &Args, matcher: Arc<IntentMatcher>, delay: ThinkingDelay) {
    if let Err(e) = run_server(&args.addr, matcher, delay).await {
        eprintln!("{} {}", "server error:".red().bold(), e);
        process::exit(1);
    }
}

/// Reply to a single text
fn run_single(text: &str, matcher: &IntentMatcher, args: &Args) {
    let resolution = matcher.resolve(text);
    let reply = match args.seed {
        Some(seed) => resolution.pick(&mut StdRng::seed_from_u64(seed)),
        None => resolution.pick(&mut rand::thread_rng()),
    };

    if args.json {
        let out = serde_json::json!({
            "input": text,
            "reply": reply,
            "rule": resolution.source.rule_name(),
        });
        println!("{}", out);
    } else {
        if args.verbose {
            println!("{}", format!("[{}]", resolution.source).dimmed());
        }
        println!("{}", reply);
    }
}

/// Terminal chat over a ConversationHost
async fn run_interactive(matcher: Arc<IntentMatcher>, delay: ThinkingDelay, args: &Args) {
    let host = ConversationHost::new(matcher, delay);

    if !args.json {
        print_header();
    }
    for turn in host.turns().await {
        print_turn(&turn, args);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", ">".bold());
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nBye! Turns this session: {}", host.turns().await.len());
            break;
        }

        let submission = match line {
            "/reset" => {
                let turn = host.reset().await;
                print_turn(&turn, args);
                continue;
            }
            "/quick" => {
                print_quick_actions();
                continue;
            }
            _ => match quick_index(line) {
                Some(index) => host.quick_action(index).await,
                None => host.submit(line).await,
            },
        };

        let submission = match submission {
            Ok(s) => s,
            Err(e) => {
                if args.json {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                } else {
                    println!("{}", e.to_string().yellow());
                }
                continue;
            }
        };
        if quick_index(line).is_some() {
            print_turn(&submission.user_turn, args);
        }

        if let Some(status) = status_line(args.json, "Carl's assistant is typing…") {
            println!("{}", status);
        }
        if let Some(turn) = submission.reply.wait().await {
            if args.verbose {
                let source = host.matcher().resolve(&submission.user_turn.content).source;
                if let Some(status) = status_line(args.json, &format!("[{}]", source)) {
                    println!("{}", status);
                }
            }
            print_turn(&turn, args);
        }
    }
}

/// Human-only line; none in JSON mode so stdout stays one JSON value per line
fn status_line(json: bool, text: &str) -> Option<String> {
    (!json).then(|| text.dimmed().to_string())
}

/// "/2" selects the second quick action
fn quick_index(line: &str) -> Option<usize> {
    let n: usize = line.strip_prefix('/')?.parse().ok()?;
    n.checked_sub(1).filter(|i| *i < QUICK_ACTIONS.len())
}

/// Print header
fn print_header() {
    println!("{}", "========================================".bold());
    println!("{}", format!("  carlbot v{} - ask me about Carl", VERSION).bold());
    println!("{}", "========================================".bold());
    println!("Type 'quit' to exit, '/reset' to clear, '/quick' for shortcuts.");
    println!();
}

/// List quick actions
fn print_quick_actions() {
    for (i, action) in QUICK_ACTIONS.iter().enumerate() {
        println!("  /{}  {}  {}", i + 1, action.label, action.prompt.dimmed());
    }
}

/// Print one turn
fn print_turn(turn: &Turn, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(turn).unwrap_or_default());
        return;
    }
    match turn.role {
        Role::User => println!("{} {}", "you:".cyan().bold(), turn.content),
        Role::Assistant => println!("{} {}", "bot:".green().bold(), turn.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_suppressed_in_json_mode() {
        assert!(status_line(true, "Carl's assistant is typing…").is_none());
        colored::control::set_override(false);
        assert_eq!(
            status_line(false, "Carl's assistant is typing…").as_deref(),
            Some("Carl's assistant is typing…")
        );
    }

    #[test]
    fn test_quick_index() {
        assert_eq!(quick_index("/1"), Some(0));
        assert_eq!(quick_index("/0"), None);
        assert_eq!(quick_index("/99"), None);
        assert_eq!(quick_index("1"), None);
    }
}
