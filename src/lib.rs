pub mod args;
pub mod categories;
pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod persist;
pub mod quote;
pub mod render;
pub mod session;
pub mod shared;
pub mod store;
pub mod sync;

use crate::args::{ArgParser, parse_position};
use crate::categories::{CategoryFilter, category_counts};
use crate::codec::{ImportMode, ImportOutcome, apply_import, export_file_name, export_json};
use crate::config::Config;
use crate::error::{QuoteError, SyncError};
use crate::formatting::FormatContext;
use crate::render::{build_view, format_quote, format_view, terminal_columns};
use crate::session::Session;
use crate::store::FileStore;
use crate::sync::{IntervalTicker, SyncEngine, SyncReport, SyncScheduler, source_for};
use chrono::Local;
use log::warn;
use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

type QuoteSession = Session<FileStore>;

pub fn entry() -> Result<(), Box<dyn Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let cmd = args.remove(0);
    if matches!(cmd.as_str(), "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    if let Err(e) = logging::init_logging(&config::log_level()) {
        eprintln!("Logging disabled: {e}");
    }
    let config = Config::from_env()?;

    if cmd == "path" {
        println!("{}", config.data_dir.display());
        return Ok(());
    }

    let store = FileStore::open(&config.data_dir)?;
    let mut session = Session::open(store);

    match cmd.as_str() {
        "add" => add_quote(args, &mut session, &config)?,
        "list" => list_quotes(args, &session, &config)?,
        "view" => view_quote(args, &mut session, &config)?,
        "random" => random_quote(&mut session, &config)?,
        "delete" => delete_quote(args, &mut session)?,
        "filter" => set_filter(args, &mut session)?,
        "categories" => list_categories(&session, &config),
        "export" => export_quotes(args, &session)?,
        "import" => import_quotes(args, &mut session)?,
        "clear" => clear_quotes(&mut session)?,
        "sync" => sync_once(&mut session, &config)?,
        "watch" => watch(args, &mut session, &config)?,
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
Quote Keeper
Usage:
  qk add <text> [-a|--author A] [-c|--category C] [--push]
                                  Add a quote (optionally post it to the sync server)
  qk list [-c|--category C] [--plain]
                                  List quotes using the saved filter or the given category
  qk view <n>                     Show quote n and remember it as last viewed
  qk random                       Show a random quote
  qk delete <n>                   Delete quote n
  qk filter [category|all]        Show or save the category filter
  qk categories                   List categories with counts
  qk export [--out PATH]          Write quotes to quotes-<date>.json
  qk import <file> [--append|--replace]
                                  Import quotes from a JSON file (default: append)
  qk clear                        Remove saved quotes and restore the defaults
  qk sync                         Merge quotes from the sync server once
  qk watch [--every SECS] [--runs N]
                                  Sync periodically until interrupted
  qk path                         Show the data directory
  qk help                         Show this message

Environment:
  QUOTE_KEEPER_DIR                Override data directory (default: ~/.quote_keeper)
  QUOTE_KEEPER_SYNC_URL           Sync source: http(s) URL, file:// URL or path
  QUOTE_KEEPER_SYNC_LIMIT         Items fetched per sync (default: 5)
  QUOTE_KEEPER_SYNC_INTERVAL_SECS Seconds between syncs for watch (default: 10)
  QUOTE_KEEPER_SYNC_TIMEOUT_SECS  Timeout for sync requests (default: 10)
  QUOTE_KEEPER_DEDUP_KEY          text or text+author (default: text+author)
  QUOTE_KEEPER_LOG                Log level for stderr diagnostics (default: warn)
  NO_COLOR                        Disable colors
"
    );
}

/// Validation failures abort the command; storage failures are reported and
/// the command carries on with the in-memory state.
fn report_save(result: Result<(), QuoteError>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(()) => Ok(()),
        Err(QuoteError::Storage(e)) => {
            eprintln!("Unable to save quotes; storage may be full or unavailable ({e}).");
            Ok(())
        }
        Err(e) => Err(e.to_string().into()),
    }
}

fn format_context(config: &Config, plain: bool) -> FormatContext {
    FormatContext::new(config.use_color && !plain)
}

fn build_engine(config: &Config) -> SyncEngine {
    SyncEngine::new(source_for(&config.sync_url))
        .with_limit(config.sync_limit)
        .with_timeout(config.sync_timeout)
        .with_key(config.dedup_key)
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}

fn add_quote(
    args: Vec<String>,
    session: &mut QuoteSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "add");
    let mut text_parts: Vec<String> = Vec::new();
    let mut author = String::new();
    let mut category = String::new();
    let mut push = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-a" | "--author" => author = parser.extract_value(&arg)?,
            "-c" | "--category" => category = parser.extract_value(&arg)?,
            "--push" => push = true,
            other => text_parts.push(other.to_string()),
        }
    }
    let text = text_parts.join(" ");

    let quote = match session.add(&text, &author, &category) {
        Ok(q) => q,
        Err(QuoteError::Validation(msg)) => return Err(msg.into()),
        Err(QuoteError::Storage(e)) => {
            eprintln!("Unable to save quotes; storage may be full or unavailable ({e}).");
            session.quotes().last().cloned().ok_or("Quote was not added")?
        }
    };
    println!("Added quote {} [{}]", session.quotes().len(), quote.category);

    if push {
        let engine = build_engine(config);
        match runtime()?.block_on(engine.push(&quote)) {
            Ok(ack) => match ack.id {
                Some(id) => println!("Posted to server (id {id})."),
                None => println!("Posted to server."),
            },
            Err(e) => eprintln!("Push failed: {e}"),
        }
    }
    Ok(())
}

fn list_quotes(
    args: Vec<String>,
    session: &QuoteSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "list");
    let mut filter = session.filter().clone();
    let mut plain = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-c" | "--category" => {
                filter = CategoryFilter::parse(&parser.extract_value(&arg)?)
            }
            "--plain" => plain = true,
            other => return Err(parser.unknown_flag(other)),
        }
    }
    let view = build_view(session.quotes(), &filter, session.book().last_viewed());
    let width = if plain { None } else { terminal_columns() };
    println!("{}", format_view(&view, &format_context(config, plain), width));
    Ok(())
}

fn view_quote(
    args: Vec<String>,
    session: &mut QuoteSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let raw = args.first().ok_or("Usage: qk view <n>")?;
    let index = parse_position(raw)?;
    let quote = match session.view(index) {
        Ok(Some(q)) => q,
        Ok(None) => return Err(format!("No quote at position {raw}").into()),
        Err(e) => {
            report_save(Err(e))?;
            session.book().get(index).cloned().ok_or("Quote not found")?
        }
    };
    println!("{}", format_quote(&quote, &format_context(config, false)));
    Ok(())
}

fn random_quote(
    session: &mut QuoteSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let picked = match session.view_random(&mut rand::thread_rng()) {
        Ok(p) => p,
        Err(e) => {
            report_save(Err(e))?;
            session
                .book()
                .last_viewed()
                .and_then(|i| session.book().get(i).cloned().map(|q| (i, q)))
        }
    };
    let Some((index, quote)) = picked else {
        return Err("No quotes available".into());
    };
    println!("#{}\n{}", index + 1, format_quote(&quote, &format_context(config, false)));
    Ok(())
}

fn delete_quote(
    args: Vec<String>,
    session: &mut QuoteSession,
) -> Result<(), Box<dyn Error>> {
    let raw = args.first().ok_or("Usage: qk delete <n>")?;
    let index = parse_position(raw)?;
    match session.remove_at(index) {
        Ok(Some(q)) => println!("Deleted quote {raw}: \"{}\"", render::preview(&q.text)),
        Ok(None) => println!("No quote at position {raw}; nothing deleted."),
        Err(e) => {
            report_save(Err(e))?;
            println!("Deleted quote {raw}");
        }
    }
    Ok(())
}

fn set_filter(
    args: Vec<String>,
    session: &mut QuoteSession,
) -> Result<(), Box<dyn Error>> {
    let Some(raw) = args.first() else {
        let options = categories::category_options(session.quotes());
        println!("Filter: {}", session.filter().as_str());
        println!("Options: {}", options.join(", "));
        return Ok(());
    };
    let filter = CategoryFilter::parse(raw);
    report_save(session.set_filter(filter))?;
    println!("Filter set to {}", session.filter().as_str());
    Ok(())
}

fn list_categories(session: &QuoteSession, config: &Config) {
    let ctx = format_context(config, false);
    let counts = category_counts(session.quotes());
    if counts.is_empty() {
        println!("No categories yet.");
        return;
    }
    for (category, count) in counts {
        println!("{}  {count}", ctx.format_category(&category));
    }
}

fn export_quotes(
    args: Vec<String>,
    session: &QuoteSession,
) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "export");
    let mut out: Option<PathBuf> = None;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-o" | "--out" => out = Some(PathBuf::from(parser.extract_value(&arg)?)),
            other => return Err(parser.unknown_flag(other)),
        }
    }
    let path =
        out.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
    let json = export_json(session.quotes())?;
    fs::write(&path, json)
        .map_err(|e| format!("Failed to export quotes to {}: {e}", path.display()))?;
    println!("Exported {} quotes to {}", session.quotes().len(), path.display());
    Ok(())
}

fn import_quotes(
    args: Vec<String>,
    session: &mut QuoteSession,
) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "import");
    let mut file: Option<String> = None;
    let mut mode = ImportMode::Append;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--append" => mode = ImportMode::Append,
            "--replace" => mode = ImportMode::Replace,
            other if other.starts_with('-') => return Err(parser.unknown_flag(other)),
            other => file = Some(other.to_string()),
        }
    }
    let file = file.ok_or("Usage: qk import <file> [--append|--replace]")?;
    let contents =
        fs::read_to_string(&file).map_err(|e| format!("Error reading file {file}: {e}"))?;

    match apply_import(session, &contents, mode) {
        Ok(ImportOutcome::Applied { mode, count }) => {
            let verb = match mode {
                ImportMode::Append => "appended",
                ImportMode::Replace => "replaced existing quotes with",
            };
            println!("Quotes imported successfully! ({verb} {count})");
            Ok(())
        }
        Ok(ImportOutcome::Rejected(reason)) => Err(reason.to_string().into()),
        Err(e) => report_save(Err(e)),
    }
}

fn clear_quotes(session: &mut QuoteSession) -> Result<(), Box<dyn Error>> {
    report_save(session.clear_to_defaults())?;
    println!("Cleared saved quotes; restored {} defaults.", session.quotes().len());
    Ok(())
}

fn print_sync_result(result: &Result<SyncReport, SyncError>, ctx: &FormatContext) {
    match result {
        Ok(report) => {
            if let Some(notice) = report.notice() {
                println!("{}", ctx.format_notice(&notice));
            }
        }
        Err(e) => eprintln!("Sync failed: {e}"),
    }
}

fn sync_once(session: &mut QuoteSession, config: &Config) -> Result<(), Box<dyn Error>> {
    let engine = build_engine(config);
    let result = runtime()?.block_on(engine.sync(session));
    match result {
        Ok(report) => {
            print_sync_result(&Ok(report), &format_context(config, false));
            Ok(())
        }
        Err(SyncError::Storage(e)) => {
            eprintln!("Unable to save quotes; storage may be full or unavailable ({e}).");
            Ok(())
        }
        Err(e) => Err(format!("Sync failed: {e}").into()),
    }
}

fn watch(
    args: Vec<String>,
    session: &mut QuoteSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "watch");
    let mut every = config.sync_interval;
    let mut max_runs: Option<usize> = None;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--every" => every = Duration::from_secs(parser.extract_number(&arg)?),
            "--runs" => max_runs = Some(parser.extract_number(&arg)?),
            other => return Err(parser.unknown_flag(other)),
        }
    }
    if every.is_zero() {
        return Err("--every must be at least 1 second".into());
    }

    let engine = build_engine(config);
    let ctx = format_context(config, false);
    let runs = runtime()?.block_on(async {
        let (mut scheduler, handle) = SyncScheduler::new(IntervalTicker::every(every));
        if let Some(max) = max_runs {
            scheduler = scheduler.with_max_runs(max);
        }
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.shutdown();
            } else {
                warn!("event=watch status=no_signal_handler");
                // Keep the handle alive so the scheduler keeps running.
                std::future::pending::<()>().await;
            }
        });
        scheduler
            .run(&engine, &mut *session, |result| print_sync_result(result, &ctx))
            .await
    });
    println!("Stopped after {runs} sync run(s).");
    Ok(())
}
