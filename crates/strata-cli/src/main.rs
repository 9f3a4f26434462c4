//! `strata`: content-addressed snapshots of directory trees.
//!
//! # Usage
//!
//! ```text
//! strata snapshot ./project              # ingest a tree, record a commit
//! strata snapshot ./project --parent <commit-id>
//! strata restore ./out                   # restore the latest commit
//! strata restore ./out --root <id>       # restore a specific root
//! strata restore ./out --commit <id>     # restore a specific commit
//! strata diff <old-root> <new-root>      # path-level changes
//! strata head                            # root id of the latest commit
//! ```
//!
//! Artifacts live under the data directory (`-d`, default `.strata`):
//! blocks as fan-out files in `blocks/`, manifests and commits in
//! `index.db`. With `--sqlite-blocks`, blocks go into the database too.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strata_engine::Engine;
use strata_store::{BlockStore, FsBlockStore, SqliteStore};
use strata_types::Hash;
use tracing::info;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "strata",
    version,
    about = "Content-addressed, deduplicating snapshots of directory trees"
)]
struct Cli {
    /// Data directory holding the block store and index database.
    #[arg(short = 'd', long, global = true, default_value = ".strata")]
    data_dir: PathBuf,

    /// Keep blocks in the index database instead of fan-out files.
    #[arg(long, global = true)]
    sqlite_blocks: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot a directory tree and record a commit.
    Snapshot {
        /// Directory to ingest.
        path: PathBuf,

        /// Parent commit id for the new commit.
        #[arg(long)]
        parent: Option<String>,
    },

    /// Restore a snapshot into a directory.
    Restore {
        /// Destination directory (created if missing).
        dest: PathBuf,

        /// Root manifest id to restore (default: the latest commit's root).
        #[arg(long, conflicts_with = "commit")]
        root: Option<String>,

        /// Commit id to restore.
        #[arg(long)]
        commit: Option<String>,
    },

    /// List path-level changes between two snapshot roots.
    Diff {
        /// Root id of the older snapshot.
        old_root: String,

        /// Root id of the newer snapshot.
        new_root: String,
    },

    /// Print the root id of the latest commit.
    Head,
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let engine = open_engine(&cli.data_dir, cli.sqlite_blocks)?;

    match cli.command {
        Commands::Snapshot { path, parent } => cmd_snapshot(&engine, &path, parent.as_deref()),
        Commands::Restore { dest, root, commit } => {
            cmd_restore(&engine, &dest, root.as_deref(), commit.as_deref())
        }
        Commands::Diff { old_root, new_root } => cmd_diff(&engine, &old_root, &new_root),
        Commands::Head => cmd_head(&engine),
    }
}

/// Wire up the stores: manifests and commits always live in SQLite; blocks
/// default to fan-out files and can be routed into SQLite as well.
fn open_engine(data_dir: &Path, sqlite_blocks: bool) -> Result<Engine> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let index = Arc::new(
        SqliteStore::open(data_dir.join("index.db")).context("failed to open index database")?,
    );

    let blocks: Arc<dyn BlockStore> = if sqlite_blocks {
        info!("storing blocks in the index database");
        index.clone()
    } else {
        let blocks_dir = data_dir.join("blocks");
        info!(path = %blocks_dir.display(), "storing blocks as fan-out files");
        Arc::new(FsBlockStore::new(blocks_dir).context("failed to open block store")?)
    };

    Ok(Engine::new(blocks, index.clone(), index))
}

fn parse_id(text: &str) -> Result<Hash> {
    Hash::from_hex(text).with_context(|| format!("invalid id {text:?}"))
}

/// Wall clock for commit timestamps; the engine itself takes no clock.
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

fn cmd_snapshot(engine: &Engine, path: &Path, parent: Option<&str>) -> Result<()> {
    let parent = parent.map(parse_id).transpose()?;

    let root = engine
        .snapshot(path)
        .with_context(|| format!("failed to snapshot {}", path.display()))?;
    let commit = engine.commit(parent, root, now_secs())?;

    println!("root   {root}");
    println!("commit {commit}");
    Ok(())
}

fn cmd_restore(
    engine: &Engine,
    dest: &Path,
    root: Option<&str>,
    commit: Option<&str>,
) -> Result<()> {
    let root = match (root, commit) {
        (Some(root), None) => {
            let root = parse_id(root)?;
            engine.restore(root, dest)?;
            root
        }
        (None, Some(commit)) => engine.restore_commit(parse_id(commit)?, dest)?,
        (None, None) => engine
            .restore_latest(dest)
            .context("no commits found; pass --root or --commit, or snapshot first")?,
        (Some(_), Some(_)) => unreachable!("clap rejects --root with --commit"),
    };

    println!("restored {root} to {}", dest.display());
    Ok(())
}

fn cmd_diff(engine: &Engine, old_root: &str, new_root: &str) -> Result<()> {
    let changes = engine.diff(parse_id(old_root)?, parse_id(new_root)?)?;
    for change in &changes {
        println!("{:<8} {}", change.action.to_string(), change.path.display());
    }
    info!(count = changes.len(), "diff complete");
    Ok(())
}

fn cmd_head(engine: &Engine) -> Result<()> {
    let root = engine.latest_root().context("no commits found")?;
    println!("{root}");
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
