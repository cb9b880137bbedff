//! Command-line argument definitions for the Naiad CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Subcommands cover the share codec and the export
//! pipeline; global flags control configuration file selection and logging
//! verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Naiad diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Work with share links
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },

    /// Export a rendered diagram file
    Export {
        /// Path to the rendered SVG to export
        input: String,

        /// Output format (png, svg, pdf)
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Path to write the exported file; defaults to the generated
        /// filename in the current directory
        #[arg(short, long)]
        output: Option<String>,

        /// Base rasterization multiplier
        #[arg(long)]
        scale: Option<f64>,

        /// Raster compression quality in (0, 1]
        #[arg(long)]
        quality: Option<f64>,

        /// Background color (CSS color string)
        #[arg(long)]
        background: Option<String>,

        /// Base name for the exported file
        #[arg(long)]
        name: Option<String>,
    },
}

/// Share-link operations
#[derive(Subcommand, Debug)]
pub enum ShareAction {
    /// Encode diagram source into a share URL
    Encode {
        /// Path to the diagram source file, or `-` for stdin
        input: String,

        /// Base URL to build the share link against
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Decode a share URL back into diagram source
    Decode {
        /// The share URL
        url: String,
    },

    /// Remove share parameters from a URL
    Clean {
        /// The URL to clean
        url: String,
    },
}
