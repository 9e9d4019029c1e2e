//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "grepx",
    version,
    author = "neur0map",
    about = "Extract and decode values from HTTP responses",
    long_about = "grepx pulls a value out of an HTTP response (between two markers or from a regex \
                  capture group), decodes it with one of eight decoders and prints the result. The \
                  same settings drive the live decoder that annotates automated-attack results."
)]
pub struct Cli {
    /// Settings file path (defaults to ~/.config/grepx/settings.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode raw HTTP responses using the stored settings
    Decode {
        /// Files holding raw responses (reads stdin when omitted)
        files: Vec<PathBuf>,

        /// Decoder to use instead of the stored one (name or alias, e.g. "jwt")
        #[arg(short, long)]
        decoder: Option<String>,

        /// Also search the response body
        #[arg(long)]
        body: bool,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Sanitize and decode a single value
    Transform {
        /// Value to decode
        value: String,

        /// Decoder name or alias
        #[arg(short, long, default_value = "auto")]
        decoder: String,

        /// Truncate output to this many characters (1-20000, otherwise 300)
        #[arg(short = 'n', long)]
        max_length: Option<usize>,
    },

    /// List available decoders
    Decoders,

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current settings
    Show {
        /// Show settings as JSON instead of stored key/value pairs
        #[arg(long)]
        json: bool,
    },

    /// Set a setting by its stored key (e.g. "decoder", "maxOut", "regexOn")
    Set {
        /// Setting key
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a setting by its stored key
    Get {
        /// Setting key
        key: String,
    },

    /// Validate a settings file
    Validate {
        /// Path to settings file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Write the default settings
    Init {
        /// Force overwrite existing settings
        #[arg(short, long)]
        force: bool,
    },

    /// Print the settings file location
    Path,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
