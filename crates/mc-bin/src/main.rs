//! multicursor entrypoint: load a file, place cursors, optionally fold and
//! edit, then print the normalized cursor set.
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use core_cursor::{CursorConfig, CursorController};
use core_document::{Document, Edit};
use core_model::ViewModel;
use core_text::{Buffer, Position, Range, Selection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "multicursor", version, about = "Multi-cursor selection normalizer")]
struct Args {
    /// Optional path to load (UTF-8 text). If omitted an empty buffer is used.
    pub path: Option<PathBuf>,
    /// Cursor as `LINE:BYTE` (caret) or `LINE:BYTE-LINE:BYTE` (anchor-active).
    /// The first one becomes the primary cursor.
    #[arg(long = "select", value_name = "SEL")]
    pub select: Vec<String>,
    /// Cursor added after the `--select` ones, one at a time, like Ctrl+click.
    #[arg(long = "add", value_name = "SEL")]
    pub add: Vec<String>,
    /// Fold `HEADER:LAST` (0-based lines) before placing cursors.
    #[arg(long = "fold", value_name = "H:L")]
    pub fold: Vec<String>,
    /// Replace `SEL=TEXT` once cursors are placed; cursors follow the edit.
    #[arg(long = "replace", value_name = "SEL=TEXT")]
    pub replace: Vec<String>,
    /// Optional configuration file path (overrides discovery of `multicursor.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Disable overlap merging regardless of configuration.
    #[arg(long = "no-merge")]
    pub no_merge: bool,
    /// Print the result as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct PositionOut {
    line: usize,
    byte: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct SelectionOut {
    anchor: PositionOut,
    active: PositionOut,
}

#[derive(Debug, Serialize)]
struct Report {
    selections: Vec<SelectionOut>,
    last_added_index: usize,
    version: u64,
}

impl From<Position> for PositionOut {
    fn from(p: Position) -> Self {
        Self {
            line: p.line,
            byte: p.byte,
        }
    }
}

impl From<Selection> for SelectionOut {
    fn from(s: Selection) -> Self {
        Self {
            anchor: s.anchor.into(),
            active: s.active.into(),
        }
    }
}

fn parse_position(s: &str) -> Result<Position> {
    let (line, byte) = s
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("expected LINE:BYTE, got `{s}`"))?;
    Ok(Position::new(
        line.parse().with_context(|| format!("bad line in `{s}`"))?,
        byte.parse().with_context(|| format!("bad byte in `{s}`"))?,
    ))
}

fn parse_selection(s: &str) -> Result<Selection> {
    match s.split_once('-') {
        Some((anchor, active)) => Ok(Selection::from_positions(
            parse_position(anchor)?,
            parse_position(active)?,
        )),
        None => Ok(Selection::caret(parse_position(s)?)),
    }
}

fn parse_fold(s: &str) -> Result<(usize, usize)> {
    let (header, last) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected HEADER:LAST, got `{s}`"))?;
    let header: usize = header.parse().with_context(|| format!("bad fold header `{s}`"))?;
    let last: usize = last.parse().with_context(|| format!("bad fold end `{s}`"))?;
    if last <= header {
        bail!("fold `{s}` hides no lines");
    }
    Ok((header, last))
}

fn parse_replace(s: &str) -> Result<Edit> {
    let (sel, text) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected SEL=TEXT, got `{s}`"))?;
    let sel = parse_selection(sel)?;
    Ok(Edit::new(Range::new(sel.anchor, sel.active), text))
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("multicursor.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "multicursor.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_document(path: Option<&Path>) -> Result<Document> {
    let Some(path) = path else {
        return Ok(Document::new(Buffer::from_str("untitled", "")?));
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    tracing::debug!(
        target: "io",
        file = %path.display(),
        size_bytes = content.len(),
        "file_read_ok"
    );
    Ok(Document::new(Buffer::from_str(name, &content)?))
}

fn run(args: Args) -> Result<Report> {
    let selections = args
        .select
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<_>>>()?;
    let added = args
        .add
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<_>>>()?;
    let folds = args
        .fold
        .iter()
        .map(|s| parse_fold(s))
        .collect::<Result<Vec<_>>>()?;
    let edits = args
        .replace
        .iter()
        .map(|s| parse_replace(s))
        .collect::<Result<Vec<_>>>()?;

    let config = core_config::load_from(args.config.clone())?;
    let mut cursor_config = CursorConfig::from_config(&config);
    if args.no_merge {
        cursor_config.multi_cursor_merge_overlapping = false;
    }
    let document = load_document(args.path.as_deref())?;
    let mut controller = CursorController::new(document, ViewModel::new(), cursor_config);

    for (header, last) in folds {
        controller.fold(header, last);
    }
    if !selections.is_empty() {
        controller.set_selections(&selections);
    }
    for (raw, sel) in args.add.iter().zip(added) {
        if !controller.add_secondary_selection(sel) {
            bail!(
                "cannot add cursor `{raw}`: limit of {} cursors reached",
                controller.config().multi_cursor_limit
            );
        }
    }
    if !edits.is_empty() {
        controller
            .execute_edits(&edits)
            .context("applying --replace edits")?;
    }

    let report = Report {
        selections: controller
            .selections()
            .into_iter()
            .map(SelectionOut::from)
            .collect(),
        last_added_index: controller.cursors().get_last_added_cursor_index(),
        version: controller.document().version(),
    };
    info!(
        target: "runtime",
        cursors = report.selections.len(),
        last_added = report.last_added_index,
        "normalized"
    );
    controller.dispose();
    Ok(report)
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let json = args.json;
    let report = match run(args) {
        Ok(report) => report,
        Err(e) => {
            error!(target: "runtime", error = %e, "run_failed");
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for s in &report.selections {
            println!(
                "[{},{} -> {},{}]",
                s.anchor.line, s.anchor.byte, s.active.line, s.active.byte
            );
        }
        println!("last added: {}", report.last_added_index);
    }
    info!(target: "runtime", "shutdown");
    Ok(())
}
