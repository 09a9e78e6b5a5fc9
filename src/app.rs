//! Command-line host
//!
//! A minimal front end over the registry: it opens the requested files,
//! applies a tool, reports statistics, saves and exits through the
//! unsaved-changes policy.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{error, info};
use serde::Serialize;

use crate::config::{Args, Config, Transform};
use crate::core::{Document, DocumentRegistry, RegistryListener, Selection};
use crate::session::{self, ShutdownOutcome};
use crate::tools::{CaseTransform, DocumentStats, LineTool, SortOrder};

const APP_NAME: &str = "textpad";

/// Logs title changes the way a window title bar would show them
struct TitleLogger {
    untitled_name: String,
}

impl RegistryListener for TitleLogger {
    fn document_added(&self, document: &Document) {
        info!("Opened {}", document.title(&self.untitled_name));
    }

    fn document_removed(&self, document: &Document) {
        info!("Closed {}", document.title(&self.untitled_name));
    }

    fn current_document_changed(&self, _previous: Option<&Document>, current: Option<&Document>) {
        if let Some(current) = current {
            info!("{} - {}", current.title(&self.untitled_name), APP_NAME);
        }
    }

    fn document_path_updated(&self, document: &Document) {
        info!("Now editing {}", document.title(&self.untitled_name));
    }
}

#[derive(Debug, Serialize)]
struct StatsRow<'a> {
    name: &'a str,
    modified: bool,
    #[serde(flatten)]
    stats: DocumentStats,
}

/// Parse arguments, set up logging and run
pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args)?;

    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .init();
    match &config.settings_path {
        Some(path) => info!("Using settings from {}", path.display()),
        None => info!("No settings file, using defaults"),
    }

    let stdout = io::stdout();
    run_with(&args, &config, &mut stdout.lock())
}

/// Run against explicit arguments, writing reports to `out`
pub fn run_with(args: &Args, config: &Config, out: &mut impl Write) -> Result<()> {
    let mut registry = DocumentRegistry::new();
    registry.add_listener(Arc::new(TitleLogger {
        untitled_name: config.untitled_name.clone(),
    }));

    let mut failed = 0;
    for path in &args.files {
        if let Err(e) = registry.load_document(path) {
            error!("{}", e);
            failed += 1;
        }
    }
    if registry.is_empty() {
        if failed > 0 {
            bail!("None of the {} file(s) could be opened", failed);
        }
        registry.create_new_document();
    }

    let current = registry
        .current_id()
        .context("No current document after opening")?;

    if let Some(transform) = args.transform {
        let mut edit = registry.edit_document(current)?;
        let len = edit.char_len();
        edit.set_selection(Selection::new(len, 0))?;
        match transform {
            Transform::Upper => edit.transform_selection(CaseTransform::Upper)?,
            Transform::Lower => edit.transform_selection(CaseTransform::Lower)?,
            Transform::Invert => edit.transform_selection(CaseTransform::Invert)?,
            Transform::SortAsc => edit.apply_line_tool(LineTool::Sort(SortOrder::Ascending))?,
            Transform::SortDesc => edit.apply_line_tool(LineTool::Sort(SortOrder::Descending))?,
            Transform::Unique => edit.apply_line_tool(LineTool::Unique)?,
        };
    }

    if args.save {
        registry.save_document(current, None)?;
    } else if let Some(path) = &args.save_as {
        registry.save_document(current, Some(path.as_path()))?;
    }

    if args.stats {
        write_stats(&registry, config, args.json, out)?;
    }

    match session::shutdown(&mut registry, |_| config.on_unsaved) {
        ShutdownOutcome::Cancelled => {
            writeln!(
                out,
                "{} document(s) have unsaved changes; rerun with --save, --save-as or --on-unsaved",
                registry.dirty_documents().len()
            )?;
        }
        ShutdownOutcome::Completed { unsaved, .. } => {
            if let Some((_, e)) = unsaved.into_iter().next() {
                return Err(e).context("Some documents could not be saved");
            }
        }
    }

    Ok(())
}

fn write_stats(
    registry: &DocumentRegistry,
    config: &Config,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let names: Vec<String> = registry
        .iter()
        .map(|d| d.display_name().unwrap_or_else(|| config.untitled_name.clone()))
        .collect();

    if json {
        let rows: Vec<StatsRow<'_>> = registry
            .iter()
            .zip(&names)
            .map(|(document, name)| StatsRow {
                name,
                modified: document.is_modified(),
                stats: document.stats(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
    } else {
        for (document, name) in registry.iter().zip(&names) {
            writeln!(out, "{}", document.stats().report(name))?;
            writeln!(out, "{}", document.status().status_line())?;
        }
    }
    Ok(())
}
