use std::{path::PathBuf, process::ExitCode, time::Instant};

use anyhow::{Context, Result};
use clap::Args;
use log::error;

use crate::commands::{BrowseOptions, OutputOptions};
use crate::printer::PrintContext;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Directory to walk (defaults to the home directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(flatten)]
    pub browse: BrowseOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: TreeArgs) -> ExitCode {
    match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("tree failed: {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: &TreeArgs) -> Result<ExitCode> {
    let mut session = Session::new(args.browse.config())?;
    let started = Instant::now();

    let window = session.browser.open_window(args.dir.as_deref())?;
    let stats = session.wait(window)?;
    let elapsed = started.elapsed();

    let Some(win) = session.browser.window(window) else {
        session.finish();
        return Ok(ExitCode::from(130));
    };

    session.browser.sort_by(window, args.output.sort)?;
    let rows = session.browser.snapshot(window)?;

    let directory = win.directory()?;
    let ctx = PrintContext {
        kind: "tree",
        window,
        directory: &directory,
        stats: stats.as_ref(),
        elapsed,
        reads: session.fs.reads(),
    };
    args.output
        .make_printer()
        .print_all(&rows, &ctx)
        .context("writing output")?;

    session.finish();
    Ok(ExitCode::SUCCESS)
}
