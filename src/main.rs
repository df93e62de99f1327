//! Gridpilot - prompt-driven spreadsheet assistant CLI.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gridpilot_core::op::{ClassifyResponse, OperationResult};
use gridpilot_core::{CellRef, RangeRef, Workbook};

use gridpilot::ai::{Classify, LlmClassifier, LlmClientConfig, RuleClassifier};
use gridpilot::config::SettingsStore;
use gridpilot::history::PromptHistory;
use gridpilot::orchestrator::Orchestrator;

fn print_usage() {
    eprintln!("Usage: gridpilot [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                  CSV file to load as the working sheet");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <PROMPT>  Classify and execute one prompt, then exit");
    eprintln!("  -o, --output <FILE>     Write the sheet back as CSV after -c");
    eprintln!("  --select <RANGE>        Initial selection (e.g. A1:B10)");
    eprintln!("  --api-key <KEY>         Text-service credential for this run");
    eprintln!("  --model <NAME>          Text-service model name");
    eprintln!("  --no-llm                Force the rule-based classifier");
    eprintln!("  -h, --help              Print help");
}

struct CliArgs {
    file: Option<PathBuf>,
    command: Option<String>,
    output: Option<PathBuf>,
    select: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    no_llm: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        file: None,
        command: None,
        output: None,
        select: None,
        api_key: None,
        model: None,
        no_llm: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Err(String::new()),
            "-c" | "--command" => {
                i += 1;
                parsed.command = Some(expect_value(args, i, "--command")?);
            }
            "-o" | "--output" => {
                i += 1;
                parsed.output = Some(PathBuf::from(expect_value(args, i, "--output")?));
            }
            "--select" => {
                i += 1;
                parsed.select = Some(expect_value(args, i, "--select")?);
            }
            "--api-key" => {
                i += 1;
                parsed.api_key = Some(expect_value(args, i, "--api-key")?);
            }
            "--model" => {
                i += 1;
                parsed.model = Some(expect_value(args, i, "--model")?);
            }
            "--no-llm" => parsed.no_llm = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            other => {
                if parsed.file.is_some() {
                    return Err("Only one FILE argument is supported".to_string());
                }
                parsed.file = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }
    Ok(parsed)
}

fn expect_value(args: &[String], i: usize, flag: &str) -> Result<String, String> {
    args.get(i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn print_response(response: &ClassifyResponse) {
    match response.classification() {
        Some(c) => {
            println!("[{}] {}", c.action, c.description);
            for (i, op) in c.operations.iter().enumerate() {
                println!("  {}. {} -> {}", i + 1, op.kind(), op.description());
            }
            if c.operations.is_empty() {
                println!("  (no operations)");
            }
            println!("Suggestions:");
            for suggestion in &c.suggestions {
                println!("  - {}", suggestion);
            }
        }
        None => {
            println!(
                "Request failed: {}",
                response.error().unwrap_or("unknown error")
            );
        }
    }
}

fn print_results(results: &[OperationResult]) {
    for result in results {
        if result.success {
            println!("  ok: {}", result.message);
        } else {
            println!(
                "  FAILED: {} ({})",
                result.message,
                result.error.as_deref().unwrap_or("no detail")
            );
        }
    }
}

fn print_grid(book: &Workbook) {
    let Some(range) = book.used_range() else {
        println!("(empty sheet)");
        return;
    };
    for row in range.start.row..=range.end.row {
        let cells: Vec<String> = (range.start.col..=range.end.col)
            .map(|col| {
                let display = book
                    .cell_at(&CellRef::new(col, row))
                    .map(|c| c.display_value())
                    .unwrap_or_default();
                format!("{:>12}", display)
            })
            .collect();
        println!("{:>4} |{}", row + 1, cells.join(" "));
    }
    if let Some(selection) = &book.selection {
        println!("selection: {}", selection);
    }
}

fn build_classifier(store: &SettingsStore, args: &CliArgs) -> anyhow::Result<Box<dyn Classify>> {
    if args.no_llm {
        return Ok(Box::new(RuleClassifier::new()));
    }
    match store.resolve_api_key(args.api_key.as_deref()) {
        Some(api_key) => {
            let config = LlmClientConfig {
                api_key,
                model: args
                    .model
                    .clone()
                    .unwrap_or_else(|| store.settings.model.clone()),
                ..LlmClientConfig::default()
            };
            let classifier =
                LlmClassifier::new(config).context("failed to build text-service client")?;
            tracing::info!("using text-service classifier with rule fallback");
            Ok(Box::new(classifier))
        }
        None => {
            tracing::info!("no credential configured, using rule-based classifier");
            Ok(Box::new(RuleClassifier::new()))
        }
    }
}

async fn run_repl(
    orchestrator: &Orchestrator<Box<dyn Classify>, Workbook>,
    history: &mut PromptHistory,
    history_path: Option<PathBuf>,
    store: &mut SettingsStore,
) -> anyhow::Result<()> {
    println!("gridpilot - type a prompt, :help for commands");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
            let rest = rest.trim();
            match name {
                "q" | "quit" => break,
                "help" => {
                    println!(":apply         execute the pending operations");
                    println!(":show          print the sheet");
                    println!(":select RANGE  change the selection");
                    println!(":save PATH     export the sheet as CSV");
                    println!(":key VALUE     store the text-service credential");
                    println!(":history       print prompt history");
                    println!(":q             quit");
                }
                "apply" => {
                    let results = orchestrator.execute_pending().await;
                    if results.is_empty() {
                        println!("nothing to apply");
                    } else {
                        print_results(&results);
                    }
                }
                "show" => orchestrator.with_host(|book| print_grid(book)).await,
                "select" => match RangeRef::parse(rest) {
                    Some(range) => {
                        orchestrator.with_host(|book| book.select(range)).await;
                        println!("selection: {}", range);
                    }
                    None => println!("invalid range: {}", rest),
                },
                "save" => {
                    if rest.is_empty() {
                        println!("usage: :save PATH");
                    } else {
                        let path = PathBuf::from(rest);
                        match orchestrator.with_host(|book| book.save_csv(&path)).await {
                            Ok(()) => println!("wrote {}", path.display()),
                            Err(err) => println!("save failed: {}", err),
                        }
                    }
                }
                "key" => {
                    if rest.is_empty() {
                        println!("usage: :key VALUE");
                    } else {
                        store.set_api_key(rest)?;
                        println!("credential stored; restart to switch classifier");
                    }
                }
                "history" => {
                    for entry in history.entries() {
                        println!("  {}", entry);
                    }
                }
                other => println!("unknown command: :{}", other),
            }
            continue;
        }

        history.push(line);
        if let Some(path) = &history_path {
            if let Err(err) = history.save(path) {
                tracing::warn!(error = %err, "failed to persist history");
            }
        }

        let response = orchestrator.send_prompt(line).await;
        print_response(&response);
        if orchestrator.has_pending() {
            println!("(:apply to execute)");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = std::env::args().collect();
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}", message);
                eprintln!();
            }
            print_usage();
            std::process::exit(if message.is_empty() { 0 } else { 1 });
        }
    };

    let settings_path =
        SettingsStore::default_path().unwrap_or_else(|| PathBuf::from("gridpilot-settings.toml"));
    let mut store = SettingsStore::load(settings_path).context("failed to load settings")?;

    let mut book = Workbook::new();
    if let Some(file) = &args.file {
        book.load_csv(file)
            .with_context(|| format!("failed to load {}", file.display()))?;
    }
    if let Some(select) = &args.select {
        let range = RangeRef::parse(select)
            .with_context(|| format!("invalid --select range: {}", select))?;
        book.select(range);
    }

    let classifier = build_classifier(&store, &args)?;
    let orchestrator = Orchestrator::new(classifier, book).with_retry(
        store.settings.max_retries,
        Duration::from_millis(store.settings.retry_delay_ms),
    );

    if let Some(prompt) = &args.command {
        let response = orchestrator.send_prompt(prompt).await;
        print_response(&response);
        if !response.is_success() {
            std::process::exit(1);
        }
        let results = orchestrator.execute_pending().await;
        print_results(&results);
        orchestrator.with_host(|book| print_grid(book)).await;
        if let Some(output) = &args.output {
            orchestrator
                .with_host(|book| book.save_csv(output))
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        if results.iter().any(|r| !r.success) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let history_path = PromptHistory::default_path();
    let mut history = match &history_path {
        Some(path) => PromptHistory::load(path, store.settings.max_history)
            .unwrap_or_else(|_| PromptHistory::new(store.settings.max_history)),
        None => PromptHistory::new(store.settings.max_history),
    };

    run_repl(&orchestrator, &mut history, history_path, &mut store).await
}
