//! The CLI binary (§6 "CLI surface, out of scope, contract only"): a thin
//! shell over `oloc_driver`'s public operations. Non-`:`-prefixed input is
//! an expression passed straight to `calculate`; `:`-prefixed input is one
//! of the small fixed set of REPL commands the contract names.

use clap::Parser;
use oloc_driver::config::Config;
use oloc_driver::{calculate_with_config, is_reserved_with_config, run_test, version};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "oloc", version, about = "An exact-arithmetic symbolic calculator")]
struct Cli {
    /// Path to a TOML config file; falls back to `oloc.toml` in the current
    /// directory, then to compiled-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// A single expression to evaluate non-interactively. Omit to start the
    /// REPL.
    expression: Option<String>,
}

/// REPL session state the `:config` command can toggle (§6).
struct Session {
    config: Config,
    show_result: bool,
    show_steps: bool,
    show_detail: bool,
    time_limit: Option<Duration>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path).unwrap_or_else(|e| {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }),
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }),
    };

    let mut session = Session {
        config,
        show_result: true,
        show_steps: false,
        show_detail: false,
        time_limit: None,
    };

    if let Some(expression) = cli.expression {
        run_one(&session, &expression);
        return;
    }

    println!("oloc {} - type :help for commands, :exit to quit", version());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        let _ = stdout.flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(':') {
            if !handle_command(&mut session, line) {
                break;
            }
        } else {
            run_one(&session, line);
        }
    }
}

fn run_one(session: &Session, expression: &str) {
    match calculate_with_config(expression, session.time_limit, &session.config) {
        Ok(result) => {
            if session.show_steps {
                for (i, step) in result.steps().iter().enumerate() {
                    println!("  [{i}] {step}");
                }
            }
            if session.show_result {
                println!("{}", result.final_result());
            }
            if session.show_detail {
                let timings = result.timings();
                println!(
                    "  preprocessor {:?}, lexer {:?}, parser {:?}, evaluator {:?} (total {:?})",
                    timings.preprocessor,
                    timings.lexer,
                    timings.parser,
                    timings.evaluator,
                    timings.total()
                );
            }
        }
        Err(err) => eprintln!("{err}"),
    }
}

/// Handle one `:`-prefixed command. Returns `false` when the session should
/// end.
fn handle_command(session: &mut Session, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    match command {
        ":help" => {
            println!(
                "commands: :help  :exit  :config -show|-result|-steps|-detail|-timeout N  :reserved <sym>  :test <file> <key> [--pause] [--random N]"
            );
            true
        }
        ":exit" => false,
        ":config" => {
            handle_config(session, parts.collect());
            true
        }
        ":reserved" => {
            if let Some(sym) = parts.next() {
                println!("{}", is_reserved_with_config(sym, &session.config));
            } else {
                eprintln!(":reserved needs a symbol argument");
            }
            true
        }
        ":test" => {
            handle_test(session, parts.collect());
            true
        }
        other => {
            eprintln!("unknown command '{other}', try :help");
            true
        }
    }
}

fn handle_config(session: &mut Session, args: Vec<&str>) {
    let mut iter = args.into_iter();
    while let Some(flag) = iter.next() {
        match flag {
            "-show" => println!("{:#?}", session.config.format),
            "-result" => session.show_result = !session.show_result,
            "-steps" => session.show_steps = !session.show_steps,
            "-detail" => session.show_detail = !session.show_detail,
            "-timeout" => match iter.next().and_then(|s| s.parse::<u64>().ok()) {
                Some(0) => session.time_limit = None,
                Some(ms) => session.time_limit = Some(Duration::from_millis(ms)),
                None => eprintln!(":config -timeout needs a millisecond count"),
            },
            other => eprintln!("unknown :config flag '{other}'"),
        }
    }
}

fn handle_test(session: &Session, args: Vec<&str>) {
    if args.len() < 2 {
        eprintln!(":test needs a file and a suite key");
        return;
    }
    let file = PathBuf::from(args[0]);
    let key = args[1];
    let pause = args.iter().any(|a| *a == "--pause");
    let random_sample = args
        .iter()
        .position(|a| *a == "--random")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<usize>().ok());

    match run_test(&file, key, session.time_limit, pause, random_sample) {
        Ok(report) => {
            for result in &report.results {
                let label = result.case.name.as_deref().unwrap_or(&result.case.input);
                let status = if result.passed { "ok" } else { "FAIL" };
                println!("  [{status}] {label}");
            }
            println!(
                "{} passed, {} failed{}",
                report.passed_count(),
                report.failed_count(),
                if report.halted_early { " (halted early)" } else { "" }
            );
        }
        Err(err) => eprintln!("{err}"),
    }
}
