//! Render a snapguide document to PDF, HTML or a training bundle.
//!
//! Usage:
//!   snapguide <document.json> --out <path> [--format pdf|html|bundle]
//!             [--html-mode standalone|zip] [--theme NAME]
//!             [--quality low|medium|high] [--options options.json] [--no-toc]
//!
//! Set `RUST_LOG=debug` for per-step progress.

use snapguide::config::{ExportFormat, ExportOptions, HtmlMode, QualityLevel};
use snapguide::export::render;
use snapguide::model::Document;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

struct CliConfig {
    input: PathBuf,
    output: PathBuf,
    options: ExportOptions,
}

fn usage() -> String {
    "usage: snapguide <document.json> --out <path> [--format pdf|html|bundle] \
     [--html-mode standalone|zip] [--theme NAME] [--quality low|medium|high] \
     [--options options.json] [--no-toc]"
        .to_string()
}

impl CliConfig {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let mut input = None;
        let mut output = None;
        let mut options_file = None;
        let mut format = None;
        let mut html_mode = None;
        let mut theme = None;
        let mut quality = None;
        let mut no_toc = false;

        let mut i = 1;
        while i < args.len() {
            let arg = args[i].as_str();
            let mut value = || {
                i += 1;
                args.get(i).cloned().ok_or_else(|| format!("{} needs a value", arg))
            };
            match arg {
                "--out" | "-o" => output = Some(PathBuf::from(value()?)),
                "--format" | "-f" => {
                    let v = value()?;
                    format = Some(ExportFormat::parse(&v).ok_or_else(|| format!("unknown format '{}'", v))?);
                },
                "--html-mode" => {
                    html_mode = Some(match value()?.as_str() {
                        "standalone" => HtmlMode::Standalone,
                        "zip" => HtmlMode::Zip,
                        other => return Err(format!("unknown HTML mode '{}'", other)),
                    })
                },
                "--theme" => theme = Some(value()?),
                "--quality" => {
                    let v = value()?;
                    quality = Some(QualityLevel::parse(&v).ok_or_else(|| format!("unknown quality '{}'", v))?);
                },
                "--options" => options_file = Some(PathBuf::from(value()?)),
                "--no-toc" => no_toc = true,
                "--help" | "-h" => return Err(usage()),
                other if other.starts_with('-') => return Err(format!("unknown flag '{}'", other)),
                other => input = Some(PathBuf::from(other)),
            }
            i += 1;
        }

        let mut options = match options_file {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
                serde_json::from_str(&json).map_err(|e| format!("bad options file: {}", e))?
            },
            None => ExportOptions::default(),
        };
        if let Some(format) = format {
            options.format = format;
        }
        if let Some(mode) = html_mode {
            options.html_mode = mode;
        }
        if let Some(theme) = theme {
            options.theme = theme;
        }
        if let Some(quality) = quality {
            options.quality = quality;
        }
        if no_toc {
            options.include_toc = false;
        }

        Ok(Self {
            input: input.ok_or_else(usage)?,
            output: output.ok_or_else(usage)?,
            options,
        })
    }
}

fn run(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(&config.input)?;
    let document = Document::from_json(&json)?;
    let output = render(&document, &config.options)?;
    let bytes = output.into_bytes();
    fs::write(&config.output, &bytes)?;
    log::info!("Wrote {} ({} bytes)", config.output.display(), bytes.len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match CliConfig::from_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        },
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
