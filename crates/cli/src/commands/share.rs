use std::{path::PathBuf, process::ExitCode, time::Instant};

use anyhow::{Context, Result};
use clap::Args;
use log::{error, info};

use crate::commands::{BrowseOptions, OutputOptions, find_node, start_dir};
use crate::printer::PrintContext;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Subdirectory of the walked tree to open in the second window
    #[arg(value_name = "SUBDIR")]
    pub subdir: PathBuf,

    /// Directory to walk first (defaults to the home directory)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(flatten)]
    pub browse: BrowseOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: ShareArgs) -> ExitCode {
    match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("share failed: {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: &ShareArgs) -> Result<ExitCode> {
    let mut session = Session::new(args.browse.config())?;
    let root_dir = start_dir(args.dir.as_deref());

    let root = session.browser.open_window(Some(&root_dir))?;
    if session.wait(root)?.is_none() {
        session.finish();
        return Ok(ExitCode::from(130));
    }

    let node = find_node(&session.browser, root, &args.subdir)?;
    let reads_before = session.fs.reads();
    let started = Instant::now();

    let child = session.browser.spawn_window(root, node)?;
    let stats = session.wait(child)?;
    let elapsed = started.elapsed();

    let Some(win) = session.browser.window(child) else {
        session.finish();
        return Ok(ExitCode::from(130));
    };

    let reads = session.fs.reads() - reads_before;
    info!("[share] window {child} filled with {reads} directory reads");

    session.browser.sort_by(child, args.output.sort)?;
    let rows = session.browser.snapshot(child)?;

    let directory = win.directory()?;
    let ctx = PrintContext {
        kind: "share",
        window: child,
        directory: &directory,
        stats: stats.as_ref(),
        elapsed,
        reads,
    };
    args.output
        .make_printer()
        .print_all(&rows, &ctx)
        .context("writing output")?;

    session.finish();
    Ok(ExitCode::SUCCESS)
}
