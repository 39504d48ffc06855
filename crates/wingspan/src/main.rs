//! `wingspan` - CLI for pre-flight checklists
//!
//! This binary wires the configuration, durable store, aircraft catalog and
//! checklist registry together and exposes them as subcommands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, warn};
use uuid::Uuid;

use wingspan::checklist::ChecklistHandle;
use wingspan::cli::{
    AircraftCommand, ChecklistCommand, Cli, Command, ConfigCommand, ResetAllCommand,
};
use wingspan::last_viewed::LastViewed;
use wingspan::model::{Aircraft, ItemStatus};
use wingspan::persistence::CHECKLIST_KEY_PREFIX;
use wingspan::{init_logging, CatalogStore, ChecklistRegistry, Config, Error, SqliteStore};

/// Everything a command needs, opened once per invocation.
#[derive(Debug)]
struct App {
    store: Arc<SqliteStore>,
    catalog: CatalogStore,
    registry: ChecklistRegistry,
    last_viewed: LastViewed,
    confirm_resets: bool,
}

impl App {
    fn open(config: &Config) -> anyhow::Result<Self> {
        let database_path = config.database_path();
        let store = Arc::new(
            SqliteStore::open(&database_path)
                .with_context(|| format!("failed to open {}", database_path.display()))?,
        );
        let catalog = CatalogStore::open(store.clone(), config.catalog.default_sort)
            .context("failed to open aircraft catalog")?;
        let registry = ChecklistRegistry::with_preflight_template(store.clone());
        debug!(path = %database_path.display(), "opened application state");

        Ok(Self {
            store,
            catalog,
            registry,
            last_viewed: LastViewed::new(config.last_viewed_path()),
            confirm_resets: config.checklist.confirm_resets,
        })
    }

    fn resolve(&self, query: &str) -> anyhow::Result<Aircraft> {
        Ok(self
            .catalog
            .find(query)
            .cloned()
            .ok_or_else(|| Error::unknown_aircraft(query))?)
    }

    /// Lifecycle flush; runs after every command.
    fn flush(&self) {
        if let Err(err) = self.registry.save_all() {
            warn!(error = %err, "failed to save checklists on exit");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Aircraft(cmd) => with_app(&config, |app| handle_aircraft(app, cmd)),
        Command::Checklist(cmd) => with_app(&config, |app| handle_checklist(app, cmd)),
        Command::ResetAll(cmd) => with_app(&config, |app| handle_reset_all(app, &cmd)),
        Command::Status(cmd) => with_app(&config, |app| handle_status(app, cmd.json)),
        Command::Resume => with_app(&config, |app| handle_resume(app)),
    }
}

/// Open the application state, run `command` against it, then flush.
fn with_app(
    config: &Config,
    command: impl FnOnce(&mut App) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut app = App::open(config)?;
    let result = command(&mut app);
    app.flush();
    result
}

fn handle_aircraft(app: &mut App, cmd: AircraftCommand) -> anyhow::Result<()> {
    match cmd {
        AircraftCommand::List { sort, search, json } => {
            if let Some(sort) = sort {
                app.catalog.sort(sort.into());
            }
            let aircraft: Vec<&Aircraft> = match search.as_deref() {
                Some(query) => app.catalog.search(query),
                None => app.catalog.aircraft().iter().collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&aircraft)?);
                return Ok(());
            }
            if aircraft.is_empty() {
                println!("No aircraft found.");
                return Ok(());
            }
            for a in aircraft {
                let summary = app.registry.for_aircraft(a.id).summary();
                println!(
                    "{:<12} {:<16} {:>2}/{:<2} {}",
                    a.manufacturer, a.model_name, summary.completed, summary.total, summary.status
                );
            }
        }
        AircraftCommand::Manufacturers => {
            for manufacturer in app.catalog.manufacturers() {
                let count = app.catalog.by_manufacturer(manufacturer).len();
                println!("{manufacturer:<12} {count}");
            }
        }
    }
    Ok(())
}

fn handle_checklist(app: &App, cmd: ChecklistCommand) -> anyhow::Result<()> {
    match cmd {
        ChecklistCommand::Show { aircraft, json } => {
            let aircraft = app.resolve(&aircraft)?;
            let handle = app.registry.for_aircraft(aircraft.id);
            if json {
                print_checklist_json(&aircraft, &handle)?;
            } else {
                print_checklist(&aircraft, &handle);
            }
        }
        ChecklistCommand::Open { aircraft } => {
            let aircraft = app.resolve(&aircraft)?;
            print_checklist(&aircraft, &app.registry.for_aircraft(aircraft.id));
            app.last_viewed
                .record_viewed(&aircraft)
                .context("failed to record last viewed aircraft")?;
        }
        ChecklistCommand::Set {
            aircraft,
            item,
            status,
        } => {
            let aircraft = app.resolve(&aircraft)?;
            let handle = app.registry.for_aircraft(aircraft.id);
            let (section_id, item_id) =
                handle.find_item(&item).ok_or_else(|| Error::UnknownItem {
                    aircraft_id: aircraft.id,
                    query: item.clone(),
                })?;
            let status = ItemStatus::from(status);
            handle
                .set_status(section_id, item_id, status)
                .with_context(|| {
                    format!("failed to save '{item}' for {}", aircraft.display_name())
                })?;

            let summary = handle.summary();
            println!(
                "{}: {item} -> {status} ({}/{} complete, {})",
                aircraft.display_name(),
                summary.completed,
                summary.total,
                summary.status
            );
        }
        ChecklistCommand::Reset {
            aircraft,
            preserve,
            yes,
        } => {
            let aircraft = app.resolve(&aircraft)?;
            if app.confirm_resets && !yes {
                println!(
                    "This will reset the checklist for {}.",
                    aircraft.display_name()
                );
                println!("Use --yes to confirm.");
                return Ok(());
            }

            let handle = app.registry.for_aircraft(aircraft.id);
            let preserving = resolve_sections(&handle, &preserve)?;
            handle
                .reset(&preserving)
                .with_context(|| format!("failed to save reset for {}", aircraft.display_name()))?;
            println!("Reset checklist for {}.", aircraft.display_name());
        }
    }
    Ok(())
}

fn resolve_sections(handle: &ChecklistHandle, queries: &[String]) -> anyhow::Result<HashSet<Uuid>> {
    let sections = handle.sections();
    queries
        .iter()
        .map(|query| {
            let by_id = Uuid::parse_str(query.trim()).ok();
            let lowered = query.trim().to_lowercase();
            sections
                .iter()
                .find(|s| Some(s.id) == by_id || s.title.to_lowercase() == lowered)
                .map(|s| s.id)
                .with_context(|| format!("no section matching '{query}'"))
        })
        .collect()
}

fn handle_reset_all(app: &App, cmd: &ResetAllCommand) -> anyhow::Result<()> {
    let ids: Vec<Uuid> = match cmd.manufacturer.as_deref() {
        Some(manufacturer) => {
            let ids: Vec<_> = app
                .catalog
                .by_manufacturer(manufacturer)
                .iter()
                .map(|a| a.id)
                .collect();
            if ids.is_empty() {
                bail!("no aircraft from manufacturer '{manufacturer}'");
            }
            ids
        }
        None => app.catalog.aircraft().iter().map(|a| a.id).collect(),
    };

    if app.confirm_resets && !cmd.yes {
        println!("This will reset {} checklist(s).", ids.len());
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let count = ids.len();
    app.registry
        .reset_all(ids)
        .context("failed to save one or more reset checklists")?;
    println!("Reset {count} checklist(s).");
    Ok(())
}

fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let rows: Vec<_> = app
        .catalog
        .aircraft()
        .iter()
        .map(|a| (a, app.registry.for_aircraft(a.id).summary()))
        .collect();
    let stats = app.store.stats()?;
    let checklist_records = app.store.count_with_prefix(CHECKLIST_KEY_PREFIX)?;

    if json {
        let aircraft: Vec<_> = rows
            .iter()
            .map(|(a, summary)| {
                serde_json::json!({
                    "id": a.id,
                    "name": a.display_name(),
                    "summary": summary,
                })
            })
            .collect();
        let status = serde_json::json!({
            "database_path": app.store.path(),
            "total_records": stats.total_records,
            "checklist_records": checklist_records,
            "last_write": stats.last_write,
            "db_size_bytes": stats.db_size_bytes,
            "aircraft": aircraft,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("wingspan status");
    println!("---------------");
    println!("Database:      {}", app.store.path().display());
    println!("Records:       {} ({checklist_records} checklists)", stats.total_records);
    if let Some(last_write) = stats.last_write {
        println!("Last write:    {}", last_write.to_rfc3339());
    }
    println!("Size:          {} bytes", stats.db_size_bytes);
    println!();
    for (a, summary) in rows {
        println!(
            "{:<30} {:>3}%  {}",
            a.display_name(),
            summary.percent(),
            summary.status
        );
    }
    Ok(())
}

fn handle_resume(app: &App) -> anyhow::Result<()> {
    let Some(snapshot) = app.last_viewed.last_viewed() else {
        println!("No checklist has been opened yet.");
        return Ok(());
    };
    // Prefer the current catalog entry; the snapshot covers removed aircraft.
    let aircraft = app.catalog.get(snapshot.id).cloned().unwrap_or(snapshot);
    print_checklist(&aircraft, &app.registry.for_aircraft(aircraft.id));
    Ok(())
}

fn status_marker(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::NotCompleted => "[ ]",
        ItemStatus::Completed => "[x]",
        ItemStatus::Failed => "[!]",
    }
}

fn print_checklist(aircraft: &Aircraft, handle: &ChecklistHandle) {
    let summary = handle.summary();
    println!(
        "{}  [{} {}/{}]",
        aircraft.display_name(),
        summary.status,
        summary.completed,
        summary.total
    );

    let section_summaries = handle.section_summaries();
    for (section, section_summary) in handle.sections().iter().zip(&section_summaries) {
        println!();
        println!(
            "  {} ({}/{}, {})",
            section.title,
            section_summary.summary.completed,
            section_summary.summary.total,
            section_summary.summary.status
        );
        for item in &section.items {
            println!("    {} {}", status_marker(item.status), item.title);
        }
    }
}

fn print_checklist_json(aircraft: &Aircraft, handle: &ChecklistHandle) -> anyhow::Result<()> {
    let value = serde_json::json!({
        "aircraft": aircraft,
        "summary": handle.summary(),
        "sections": handle.sections(),
        "section_summaries": handle.section_summaries(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!(
                    "  Last viewed path:   {}",
                    config.last_viewed_path().display()
                );
                println!();
                println!("[Catalog]");
                println!("  Default sort:       {}", config.catalog.default_sort);
                println!();
                println!("[Checklist]");
                println!("  Confirm resets:     {}", config.checklist.confirm_resets);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
