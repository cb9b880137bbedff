//! CLI logic for the Naiad diagram tool.
//!
//! This module contains the core CLI logic for sharing and exporting
//! diagrams from the command line.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, ShareAction};

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use log::info;
use url::Url;

use naiad::{
    NaiadError,
    artifact::{Preview, RenderedArtifact},
    config::{AppConfig, ExportOptions},
    export::{self, ExportFormat},
    share,
};

/// Base URL used when neither the flag nor the config provides one.
const DEFAULT_BASE_URL: &str = "https://mermaid-studio.example/";

/// Run the Naiad CLI application
///
/// Dispatches to the share codec or the export pipeline depending on the
/// subcommand.
///
/// # Errors
///
/// Returns `NaiadError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Share encoding errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), NaiadError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Share { action } => run_share(action, &app_config),
        Command::Export {
            input,
            format,
            output,
            scale,
            quality,
            background,
            name,
        } => run_export(
            &app_config,
            input,
            format,
            output.as_deref(),
            *scale,
            *quality,
            background.as_deref(),
            name.as_deref(),
        ),
    }
}

fn run_share(action: &ShareAction, app_config: &AppConfig) -> Result<(), NaiadError> {
    match action {
        ShareAction::Encode { input, base_url } => {
            let source = read_source(input)?;
            let base = base_url
                .as_deref()
                .or(app_config.share().base_url())
                .unwrap_or(DEFAULT_BASE_URL);
            let base = parse_url(base)?;

            let token = share::encode(&base, &source)?;
            info!(
                method = token.method().to_string(),
                encoded_size = token.encoded_size();
                "Share link generated"
            );

            println!("{}", token.url());
            eprintln!(
                "method: {}, original: {} chars, encoded: {} chars",
                token.method(),
                token.original_size(),
                token.encoded_size()
            );
            Ok(())
        }
        ShareAction::Decode { url } => {
            let url = parse_url(url)?;
            match share::decode(&url) {
                Some(source) => {
                    println!("{source}");
                    Ok(())
                }
                None => Err(NaiadError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "URL carries no readable diagram code",
                ))),
            }
        }
        ShareAction::Clean { url } => {
            let url = parse_url(url)?;
            println!("{}", share::clean_url(&url));
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_export(
    app_config: &AppConfig,
    input: &str,
    format: &str,
    output: Option<&str>,
    scale: Option<f64>,
    quality: Option<f64>,
    background: Option<&str>,
    name: Option<&str>,
) -> Result<(), NaiadError> {
    info!(input_path = input; "Loading rendered diagram");

    let markup = fs::read_to_string(input)?;
    let artifact = RenderedArtifact::from_svg_str(&markup)
        .map_err(|err| NaiadError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    let mut surface = Preview::with_artifact(artifact);

    let format: ExportFormat = format.parse()?;
    let options = merge_options(app_config.export(), scale, quality, background, name);

    let file = export::export(&mut surface, format, &options)?;

    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(file.filename()));
    fs::write(&output_path, file.bytes())?;

    info!(
        output_file = output_path.display().to_string(),
        media_type = file.media_type();
        "Diagram exported successfully"
    );

    Ok(())
}

/// Layer command-line flags over the configured export defaults.
fn merge_options(
    defaults: &ExportOptions,
    scale: Option<f64>,
    quality: Option<f64>,
    background: Option<&str>,
    name: Option<&str>,
) -> ExportOptions {
    let mut options = defaults.clone();
    if let Some(scale) = scale {
        options = options.with_scale(scale);
    }
    if let Some(quality) = quality {
        options = options.with_quality(quality);
    }
    if let Some(background) = background {
        options = options.with_background_color(background);
    }
    if let Some(name) = name {
        options = options.with_filename(name);
    }
    options
}

/// Read diagram source from a file, or stdin when the path is `-`.
fn read_source(input: &str) -> Result<String, NaiadError> {
    if input == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_url(raw: &str) -> Result<Url, NaiadError> {
    Url::parse(raw).map_err(|err| {
        NaiadError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid URL '{raw}': {err}"),
        ))
    })
}
