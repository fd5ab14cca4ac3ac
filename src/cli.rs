use clap::{Parser, Subcommand};
use ms_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediascope")]
#[command(author, version, about = "Streaming media analysis with MediaInfoLib")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a media file or URL by streaming it through the engine
    Analyze {
        /// File path or http(s) URL to analyze
        #[arg(required = true)]
        input: String,

        /// Session options as JSON, e.g. '{"chunkSize": 65536, "format": "XML"}'.
        /// Replaces the [analyze] section of the config; the flags below
        /// still override it
        #[arg(long, value_name = "JSON")]
        options: Option<String>,

        /// Output format: object, JSON, XML, HTML or text
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Bytes requested per read
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Report every field the engine knows
        #[arg(long)]
        full: bool,

        /// Include embedded cover art
        #[arg(long)]
        cover_data: bool,

        /// Path to the MediaInfoLib shared library
        #[arg(long)]
        library: Option<PathBuf>,

        /// Print a short track summary instead of the full report
        #[arg(long, conflicts_with = "format")]
        summary: bool,
    },

    /// Check that MediaInfoLib can be loaded
    CheckEngine {
        /// Path to the MediaInfoLib shared library
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Write a config file populated with the defaults
    InitConfig {
        /// Where to write it
        #[arg(default_value = "mediascope.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}
