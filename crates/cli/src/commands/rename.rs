use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, bail};
use clap::Args;
use log::error;

use crate::commands::{BrowseOptions, find_node, start_dir};
use crate::session::Session;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// File to rename, relative to the walked directory
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// New file name (a single path component)
    #[arg(value_name = "NAME")]
    pub new_name: String,

    /// Directory to walk first (defaults to the home directory)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Print the refreshed windows as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub browse: BrowseOptions,
}

pub fn run(args: RenameArgs) -> ExitCode {
    match execute(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("rename failed: {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: &RenameArgs) -> Result<ExitCode> {
    let mut session = Session::new(args.browse.config())?;
    let root_dir = start_dir(args.dir.as_deref());

    let root = session.browser.open_window(Some(&root_dir))?;
    if session.wait(root)?.is_none() {
        session.finish();
        return Ok(ExitCode::from(130));
    }

    // A nested file is renamed through a window on its parent directory,
    // so the refresh has two windows to reach.
    let (window, relative) = match args.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            let dir_node = find_node(&session.browser, root, parent)?;
            let child = session.browser.spawn_window(root, dir_node)?;
            if session.wait(child)?.is_none() {
                session.finish();
                return Ok(ExitCode::from(130));
            }
            let Some(name) = args.path.file_name() else {
                bail!("{} has no file name", args.path.display());
            };
            (child, PathBuf::from(name))
        }
        None => (root, args.path.clone()),
    };

    let node = find_node(&session.browser, window, &relative)?;
    let limit = session.browser.begin_rename(window, node)?;
    if args.new_name.len() > limit {
        bail!("{} is longer than {limit} bytes", args.new_name);
    }

    let refreshed = session
        .browser
        .commit_rename(window, node, &args.new_name)
        .with_context(|| format!("renaming {}", args.path.display()))?;

    if args.json {
        let obj = serde_json::json!({
            "renamed": args.path,
            "to": args.new_name,
            "refreshed": refreshed,
        });
        println!("{obj}");
    } else if refreshed.is_empty() {
        println!("{} already has that name", args.path.display());
    } else {
        let list: Vec<String> = refreshed.iter().map(ToString::to_string).collect();
        println!(
            "{} -> {} (refreshed: {})",
            args.path.display(),
            args.new_name,
            list.join(", ")
        );
    }

    session.finish();
    Ok(ExitCode::SUCCESS)
}
