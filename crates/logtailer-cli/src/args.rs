use clap::{Parser, Subcommand};
use logtailer_types::LogLevel as ConsoleLevel;
use std::path::PathBuf;

use crate::types::{BackendArg, LogLevel, OutputFormat};

#[derive(Parser)]
#[command(name = "logtailer")]
#[command(about = "Capture page console output per tab and browse it", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (default: $LOGTAILER_PATH, then the XDG data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the data directory, config file and empty log store")]
    Init {
        #[arg(long, help = "Storage backend written to a new config file")]
        backend: Option<BackendArg>,
    },

    #[command(about = "List tabs that have captured logs")]
    Tabs,

    #[command(about = "Show the logs of one tab (first tab with logs by default)")]
    Show {
        tab_id: Option<u32>,

        #[arg(long = "level", help = "Only show these levels (repeatable)")]
        levels: Vec<ConsoleLevel>,

        #[arg(long, help = "Case-insensitive search over message contents")]
        search: Option<String>,
    },

    #[command(about = "Clear the logs of one tab, or of every tab with --all")]
    Clear {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        tab_id: Option<u32>,

        #[arg(long)]
        all: bool,
    },

    #[command(about = "Export every tab's logs as pretty JSON")]
    Export {
        #[arg(short, long, help = "Output file, or - for stdout")]
        output: Option<PathBuf>,
    },

    #[command(about = "Send a raw viewer message (JSON) and print the aggregator's reply")]
    Query {
        #[arg(help = "Message JSON; read from stdin when omitted")]
        message: Option<String>,
    },

    #[command(about = "Open simulated tabs and run a scripted console session")]
    Demo {
        #[arg(long, help = "Echo page console output to stderr")]
        echo: bool,
    },
}
