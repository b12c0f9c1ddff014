use std::{
    io::{self, Write},
    path::Path,
    time::Duration,
};

use burrow_engine::{FillStats, RecordView, WindowId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree, one record per line.
    #[default]
    Human,
    /// One JSON object per record.
    Json,
}

/// When directory names are highlighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Only when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self, is_tty: bool) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => is_tty,
        }
    }
}

/// Configuration for printing a window's records.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Output format (human or JSON).
    pub format: OutputFormat,
    /// Color handling strategy.
    pub color: ColorChoice,
    /// Whether to end with a summary line on stderr.
    pub show_summary: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorChoice::Auto,
            show_summary: true,
        }
    }
}

/// Human-readable printer with optional color support.
pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    /// `Auto` means no color: a generic writer cannot be probed for a TTY.
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        let use_color = cfg.color.enabled(false);

        Self {
            out,
            err,
            cfg,
            use_color,
        }
    }

    /// Create a printer that writes to stdout and stderr with TTY detection.
    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<io::Stdout, io::Stderr> {
        use std::io::IsTerminal;

        let use_color = cfg.color.enabled(io::stdout().is_terminal());

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
            use_color,
        }
    }

    #[inline]
    fn format_name(&self, row: &RecordView) -> String {
        match (self.use_color, row.is_dir) {
            (true, true) => format!("\x1b[1;34m{}/\x1b[0m", row.name),
            (false, true) => format!("{}/", row.name),
            _ => row.name.clone(),
        }
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    /// Create a printer that writes to stdout and stderr.
    pub fn stdout(cfg: PrinterConfig) -> JsonPrinter<io::Stdout, io::Stderr> {
        JsonPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
        }
    }
}

/// Static context about a print run.
#[derive(Debug)]
pub struct PrintContext<'a> {
    /// Label for the subcommand
    pub kind: &'a str,
    pub window: WindowId,
    pub directory: &'a Path,
    /// What the population task did, if it finished.
    pub stats: Option<&'a FillStats>,
    pub elapsed: Duration,
    /// Directory listings requested from the filesystem.
    pub reads: usize,
}

/// Receives the rows of one window's snapshot, in display order.
pub trait TreePrinter {
    /// Called once before any rows are printed.
    fn begin(&mut self, ctx: &PrintContext) -> io::Result<()>;

    fn print_row(&mut self, row: &RecordView, ctx: &PrintContext) -> io::Result<()>;

    /// Called once after all rows are printed.
    ///
    /// Use this for footers and summaries.
    fn finish(&mut self, ctx: &PrintContext) -> io::Result<()>;

    fn print_all(&mut self, rows: &[RecordView], ctx: &PrintContext) -> io::Result<()> {
        self.begin(ctx)?;
        for row in rows {
            self.print_row(row, ctx)?;
        }
        self.finish(ctx)
    }
}

impl<W: Write, E: Write> TreePrinter for HumanPrinter<W, E> {
    fn begin(&mut self, ctx: &PrintContext) -> io::Result<()> {
        writeln!(self.out, "{}", ctx.directory.display())
    }

    fn print_row(&mut self, row: &RecordView, _ctx: &PrintContext) -> io::Result<()> {
        let name = self.format_name(row);
        let mark = if row.selected { '*' } else { ' ' };
        writeln!(
            self.out,
            "{mark} {:>10} {} {}  {:indent$}{name}",
            row.size,
            row.date,
            row.time,
            "",
            indent = (row.depth + 1) * 2,
        )
    }

    fn finish(&mut self, ctx: &PrintContext) -> io::Result<()> {
        if !self.cfg.show_summary {
            return Ok(());
        }

        match ctx.stats {
            Some(s) => writeln!(
                self.err,
                "\n[{}] window {}: {} records in {} directories, {} skipped, {} reads, {:.2}ms{}",
                ctx.kind,
                ctx.window,
                s.records,
                s.directories,
                s.skipped_dirs,
                ctx.reads,
                ctx.elapsed.as_secs_f64() * 1000.0,
                if s.cancelled { " (cancelled)" } else { "" },
            ),
            None => writeln!(
                self.err,
                "\n[{}] window {}: closed before population finished",
                ctx.kind, ctx.window,
            ),
        }
    }
}

impl<W: Write, E: Write> TreePrinter for JsonPrinter<W, E> {
    fn begin(&mut self, _ctx: &PrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_row(&mut self, row: &RecordView, ctx: &PrintContext) -> io::Result<()> {
        let obj = serde_json::json!({
            "kind": ctx.kind,
            "window": ctx.window,
            "record": row,
        });
        writeln!(self.out, "{}", obj)
    }

    fn finish(&mut self, ctx: &PrintContext) -> io::Result<()> {
        if self.cfg.show_summary {
            let obj = serde_json::json!({
                "type": "summary",
                "kind": ctx.kind,
                "window": ctx.window,
                "directory": ctx.directory,
                "stats": ctx.stats,
                "reads": ctx.reads,
                "elapsed_ms": ctx.elapsed.as_secs_f64() * 1000.0,
            });
            writeln!(self.err, "{}", obj)?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
