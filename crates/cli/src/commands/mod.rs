pub mod rename;
pub mod share;
pub mod tree;

use std::{
    io::{Stderr, Stdout},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use burrow_engine::{Browser, NodeId, SortKey, WindowId};
use burrow_runtime::BrowserConfig;
use clap::{Args, Subcommand};

use crate::printer::{
    ColorChoice, HumanPrinter, JsonPrinter, OutputFormat, PrinterConfig, TreePrinter,
};

pub use rename::RenameArgs;
pub use share::ShareArgs;
pub use tree::TreeArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk a directory and print the records of its window.
    ///
    /// Example:
    ///   burrow tree ~/projects --sort name
    Tree(TreeArgs),

    /// Walk a directory, then open a window on one of its subdirectories
    /// that shares the walked records instead of reading the disk again.
    ///
    /// Example:
    ///   burrow share --dir ~/projects src/bin
    Share(ShareArgs),

    /// Rename a file through a sharing window and show which windows were
    /// refreshed.
    ///
    /// Example:
    ///   burrow rename --dir ~/notes drafts/a.txt b.txt
    Rename(RenameArgs),
}

/// Tunables for the population tasks. Unset flags fall back to the
/// `BURROW_*` environment variables, then to the defaults.
#[derive(Debug, Args)]
pub struct BrowseOptions {
    /// Directory entries read per filesystem call
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Pause after each directory level, in milliseconds
    #[arg(long, value_name = "MS")]
    pub yield_ms: Option<u64>,

    /// Do not list `.` and `..` entries
    #[arg(long)]
    pub no_dots: bool,
}

impl BrowseOptions {
    pub fn config(&self) -> BrowserConfig {
        let mut cfg = BrowserConfig::from_env();

        if let Some(n) = self.batch_size.filter(|n| *n > 0) {
            cfg.batch_size = n;
        }
        if let Some(ms) = self.yield_ms {
            cfg.yield_pause = Duration::from_millis(ms);
        }
        if self.no_dots {
            cfg.dot_entries = false;
        }
        cfg
    }
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Sort order: name, scan or date
    #[arg(long, value_name = "KEY", default_value = "scan")]
    pub sort: SortKey,

    /// Output records as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Suppress the summary line
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl OutputOptions {
    /// Create a printer based on the output options.
    pub fn make_printer(&self) -> Box<dyn TreePrinter> {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        let color = match self.color.as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        };

        let cfg = PrinterConfig {
            format,
            color,
            show_summary: !self.quiet,
        };

        match cfg.format {
            OutputFormat::Human => Box::new(HumanPrinter::<Stdout, Stderr>::stdout(cfg)),
            OutputFormat::Json => Box::new(JsonPrinter::<Stdout, Stderr>::stdout(cfg)),
        }
    }
}

/// Resolve `relative` to a node of `window`'s store.
pub fn find_node(browser: &Browser, window: WindowId, relative: &Path) -> Result<NodeId> {
    let store = browser
        .window_store(window)
        .with_context(|| format!("window {window} is gone"))?;

    store
        .find_path(relative)
        .with_context(|| format!("{} is not in the walked tree", relative.display()))
}

/// `--dir`, or the start directory when absent.
pub fn start_dir(dir: Option<&Path>) -> PathBuf {
    dir.map_or_else(burrow_runtime::default_start_dir, Path::to_path_buf)
}
