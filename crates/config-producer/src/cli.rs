use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Materializes a final orchestrator-ready JSON document by resolving an
/// inheritance chain of config fragments, deep-merging them, optionally
/// assembling many into a hierarchical group, and substituting
/// `${key}` placeholders.
#[derive(Debug, Parser)]
#[command(name = "config-producer", version)]
pub struct Cli {
    /// Root directory under which config files (`.template`/`.instance`) are searched.
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,

    /// Output path, or `-` for stdout.
    #[arg(short = 'o', long, default_value = "-", global = true)]
    pub output: String,

    /// `key=value` pairs substituted for `${key}` in the serialized output.
    /// May be given more than once.
    #[arg(long = "template-keys", value_parser = parse_key_val, num_args = 1.., global = true)]
    pub template_keys: Vec<(String, String)>,

    /// Collapses `/a/b/c` ids to `a-b-c` and rewrites `dependencies` the same way.
    #[arg(long = "flatten-hierarchy", global = true)]
    pub flatten_hierarchy: bool,

    #[command(flatten)]
    pub log: cli_common::LogArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a single config's extend chain and emit the merged document.
    Single {
        /// A bare config name (resolved under `root`) or a direct file path.
        name_or_path: String,
    },
    /// Walk `root` recursively, merge every `*.instance`, and assemble a
    /// group hierarchy rooted at `top_id`.
    Group {
        /// The id of the top-level group.
        top_id: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("expected `key=value`, got \"{s}\"")),
    }
}
