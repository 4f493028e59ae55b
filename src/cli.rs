use clap::{Args, Parser, Subcommand};
use dctx_lib::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dctx")]
#[command(
    version,
    about = "Design Context - Simplify Figma designs into compact, deduplicated trees",
    long_about = "Design Context (dctx)\n\nCommands:\n- get: fetch a Figma file (or nodes) and print the simplified design.\n- simplify: simplify a raw Figma API response saved on disk, offline.\n- images: download the image fills referenced by a file or nodes.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for depth/format/timeouts/api/assets defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a Figma design and print its simplified form
    Get {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Simplify a raw Figma files or nodes response read from disk
    Simplify {
        #[arg(long, value_name = "PATH", help = "Raw Figma API response (JSON)")]
        input: PathBuf,

        #[arg(
            long = "node-id",
            value_name = "ID",
            help = "Node id to use as a root (repeatable); defaults to every node in a nodes response"
        )]
        node_ids: Vec<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Download the image fills referenced by a design
    Images {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(long, value_name = "PATH", help = "Directory for downloaded images")]
        dir: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[arg(
        long,
        value_name = "KEY|URL",
        help = "Figma file key or a Figma file/design URL (node-id in the URL is honored)"
    )]
    pub file_key: String,

    #[arg(
        long = "node-id",
        value_name = "ID",
        help = "Node id to fetch (repeatable; 1-2 and 1:2 are both accepted)"
    )]
    pub node_ids: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    #[arg(long, help = "Maximum tree depth below the roots")]
    pub depth: Option<u32>,

    #[arg(long, value_enum, help = "Output format [default: json]")]
    pub format: Option<OutputFormat>,

    #[arg(long, short, help = "Output file path (stdout if omitted)")]
    pub output: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
