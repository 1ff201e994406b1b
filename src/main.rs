//! Tugasku - Entry Point
//!
//! Sets up logging and the async runtime, builds a `Tracker` from config,
//! and runs a small interactive loop. Any line that is not a command is
//! treated as a new task sentence.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;
use tugasku::core::calendar::ReferenceTime;
use tugasku::core::config::{InterpreterMode, TrackerConfig};
use tugasku::core::error::{Result, TugasError};
use tugasku::core::types::TaskId;
use tugasku::tracker::{TaskRecord, Tracker};

/// Natural-language task tracker
#[derive(Parser, Debug)]
#[command(name = "tugasku")]
#[command(about = "Type tasks the way you say them; get a structured task list")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Task list file, overrides the config
    #[arg(long)]
    store: Option<PathBuf>,

    /// Interpreter to use, overrides the config
    #[arg(long, value_enum)]
    mode: Option<InterpreterMode>,

    /// Generate subtasks for every new task
    #[arg(long)]
    auto_subtasks: bool,

    /// Interpret one sentence, print it as JSON and exit without storing
    #[arg(long, value_name = "TEXT")]
    parse: Option<String>,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tugasku=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    // Create the async runtime for LLM calls
    let rt = Runtime::new()?;
    let mut tracker = Tracker::from_config(&config)?;
    tracing::info!(
        interpreter = tracker.interpreter_name(),
        tasks = tracker.store().len(),
        "Tugasku starting..."
    );

    if let Some(text) = &args.parse {
        let task = rt.block_on(tracker.preview(text, &ReferenceTime::local_now()))?;
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    println!("\n=== TUGASKU ===");
    println!("Interpreter: {}", tracker.interpreter_name());
    print_help();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "help" || input == "h" {
            print_help();
            continue;
        }

        if input == "list" || input == "l" {
            display_tasks(tracker.store().list());
            continue;
        }

        if let Some((command, position, tail)) = parse_command(input) {
            if let Err(e) = run_command(&rt, &mut tracker, command, position, tail) {
                println!("{}", e);
            }
            continue;
        }

        // Anything else is a new task
        match rt.block_on(tracker.submit(input, &ReferenceTime::local_now())) {
            Ok(id) => {
                if let Some(task) = tracker.store().get(id) {
                    println!("Added:");
                    display_task(1, task);
                }
            }
            Err(e) if e.is_retryable() => println!("Could not add task ({}). Try again.", e),
            Err(e) => println!("Could not add task: {}", e),
        }
    }

    println!("\nBye! {} task(s) saved.", tracker.store().len());
    Ok(())
}

fn load_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => TrackerConfig::load_from_toml(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(store) = &args.store {
        config.store_path = store.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if args.auto_subtasks {
        config.auto_subtasks = true;
    }
    Ok(config)
}

/// List-editing commands that address a task by its list position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Done,
    Delete,
    Subtasks,
    Check,
    Describe,
    Info,
}

impl Command {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "done" => Some(Command::Done),
            "del" => Some(Command::Delete),
            "sub" => Some(Command::Subtasks),
            "check" => Some(Command::Check),
            "desc" => Some(Command::Describe),
            "info" => Some(Command::Info),
            _ => None,
        }
    }
}

/// Recognize `<command> <n> [rest]`
///
/// Returns the command, the 0-based position and the trimmed rest. A line
/// whose second word is not a position ("sub bab 2 imk") is a task
/// sentence, not a command.
fn parse_command(input: &str) -> Option<(Command, usize, &str)> {
    let (word, rest) = input.split_once(' ').unwrap_or((input, ""));
    let command = Command::from_word(word)?;
    let rest = rest.trim_start();
    let (position, tail) = rest.split_once(' ').unwrap_or((rest, ""));
    let index = parse_position(position).ok()?;
    Some((command, index, tail.trim()))
}

fn run_command(
    rt: &Runtime,
    tracker: &mut Tracker,
    command: Command,
    position: usize,
    tail: &str,
) -> Result<()> {
    let id = task_at(tracker, position)?;

    match command {
        Command::Done => {
            let completed = tracker.toggle_completed(id)?;
            println!("{}", if completed { "Marked done." } else { "Marked not done." });
        }
        Command::Delete => {
            let removed = tracker.remove(id)?;
            println!("Deleted \"{}\".", removed.text);
        }
        Command::Subtasks => {
            println!("Generating subtasks...");
            let count = rt.block_on(tracker.expand_subtasks(id))?;
            if let Some(task) = tracker.store().list().get(position) {
                display_task(position + 1, task);
            }
            if count == 0 {
                println!("No subtasks generated.");
            }
        }
        Command::Check => {
            let index = parse_position(tail)?;
            tracker.toggle_subtask(id, index)?;
        }
        Command::Describe => {
            tracker.set_description(id, tail)?;
            println!("Description saved.");
        }
        Command::Info => {
            println!("Thinking...");
            let notes = rt.block_on(tracker.deep_dive(id))?;
            if notes.is_empty() {
                println!("No notes available right now.");
            } else {
                println!("\n{}\n", notes);
            }
        }
    }
    Ok(())
}

/// Map a 0-based list position to a task id
fn task_at(tracker: &Tracker, position: usize) -> Result<TaskId> {
    tracker
        .store()
        .list()
        .get(position)
        .map(|t| t.id)
        .ok_or_else(|| TugasError::InvalidCommand(format!("No task at position {}", position + 1)))
}

fn parse_position(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(TugasError::InvalidCommand(format!(
            "Expected a position number, got '{}'",
            text
        ))),
    }
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  list / l           - Show all tasks");
    println!("  done <n>           - Toggle task n completed");
    println!("  del <n>            - Delete task n");
    println!("  sub <n>            - Generate subtasks for task n");
    println!("  check <n> <m>      - Toggle subtask m of task n");
    println!("  desc <n> <text>    - Set the description of task n");
    println!("  info <n>           - Study notes for task n");
    println!("  quit / q           - Exit");
    println!("  <any text>         - Add a task, e.g. \"tugas imk besok jam 10 malam\"");
    println!();
}

fn display_tasks(tasks: &[TaskRecord]) {
    if tasks.is_empty() {
        println!("No tasks yet.");
        return;
    }
    for (i, task) in tasks.iter().enumerate() {
        display_task(i + 1, task);
    }
}

fn display_task(position: usize, task: &TaskRecord) {
    let mark = if task.completed { "x" } else { " " };
    println!("{:>3}. [{}] {}", position, mark, task.text);

    let mut info = format!("       {} | {}", task.subject, task.priority.label());
    if let Some(deadline) = &task.deadline {
        info.push_str(&format!(" | Deadline: {}", deadline));
    }
    if !task.tags.is_empty() {
        info.push_str(&format!(" | #{}", task.tags.join(" #")));
    }
    println!("{}", info);

    if !task.description.is_empty() {
        println!("       {}", task.description);
    }
    for (i, subtask) in task.subtasks.iter().enumerate() {
        let mark = if subtask.completed { "x" } else { " " };
        println!("       {}. [{}] {}", i + 1, mark, subtask.text);
    }
}
