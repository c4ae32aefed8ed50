use anyhow::Result;
use colored::Colorize;
use flipclock::prelude::*;
use flipclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let rule = "-".repeat(72);
    println!("{}", rule.dimmed());
    println!(
        "          {}   Shell v{:<8} Library v{:<8}",
        "flipshell".cyan().bold(),
        SHELL_VERSION,
        LIB_VERSION
    );
    println!(
        "{}",
        "    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", rule.dimmed());
}

/// Prints tick events while `watching` is set.
fn spawn_event_listeners(engine: &FlipClockEngine, watching: Arc<AtomicBool>) {
    let mut events = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if !watching.load(Ordering::Relaxed) {
                continue;
            }
            if let ClockEvent::Tick {
                tick_count,
                drift_ms,
                symbols,
                staged,
            } = event
            {
                let text: String = symbols.into_iter().collect();
                println!(
                    "<-- [TICK #{}] {} (drift {} ms, {} slot(s) changing)",
                    tick_count,
                    text.bold(),
                    drift_ms,
                    staged
                );
            }
        }
    });
}

fn print_help() {
    println!("Available commands:");
    println!("  set <key> <value>     - Sends a host property (see 'keys').");
    println!("  keys                  - Lists the recognised property keys.");
    println!("  show                  - Prints the clock as currently displayed.");
    println!("  config                - Prints the live configuration and style.");
    println!("  watch on|off          - Toggles printing of tick events.");
    println!("  pause                 - Stops the scheduler.");
    println!("  resume                - Restarts the scheduler.");
    println!("  exit                  - Quits the shell.");
}

/// The `key value` text after `set`, with the value left exactly as typed.
fn set_arguments(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("set")?;
    let mut chars = rest.chars();
    chars.next().filter(|c| c.is_whitespace())?;
    let rest = chars.as_str().trim_start();
    (!rest.is_empty()).then_some(rest)
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let engine = FlipClockEngine::new(Arc::new(SystemWallClock), Arc::new(NullRenderer));
    let adapter = engine.config_adapter();

    let watching = Arc::new(AtomicBool::new(false));
    spawn_event_listeners(&engine, watching.clone());

    info!("Starting {}...", ENGINE_NAME);
    engine.start().await;

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHighlighter));

    println!(
        "{} is running. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting flipshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args: Vec<&str> = line.split_whitespace().collect();

        match args.first().copied() {
            Some("set") => match set_arguments(&line) {
                Some(property_line) => match adapter.apply_line(property_line).await {
                    Some(property) => println!("--> {} applied ({:?}).", property.key(), property_line),
                    None => println!("Error: '{}' was not applied. Try 'keys'.", line.trim()),
                },
                None => println!("Usage: set <key> <value>"),
            },
            Some("keys") => {
                for property in Property::ALL {
                    println!("  {}", property.key());
                }
            }
            Some("show") => {
                let text: String = engine
                    .display()
                    .await
                    .iter()
                    .map(|view| view.visible().unwrap_or(' '))
                    .collect();
                println!("--> {}", text.bold());
            }
            Some("config") => {
                println!("--> {:?}", engine.config().snapshot().await);
                println!("--> {:?}", adapter.style().await);
                println!("--> {:?}", engine.schedule_state().await);
            }
            Some("watch") => match args.get(1).copied() {
                Some("on") => {
                    watching.store(true, Ordering::Relaxed);
                    println!("--> Printing tick events.");
                }
                Some("off") => {
                    watching.store(false, Ordering::Relaxed);
                    println!("--> Stopped printing tick events.");
                }
                _ => println!("Usage: watch on|off"),
            },
            Some("pause") => {
                engine.stop().await;
                println!("--> Scheduler paused.");
            }
            Some("resume") => {
                engine.start().await;
                println!("--> Scheduler resumed.");
            }
            Some("help") => print_help(),
            Some("exit") => break,
            Some(_) => println!("Unknown command: '{}'. Type 'help'.", line.trim()),
            None => {}
        }
    }

    engine.stop().await;
    Ok(())
}
