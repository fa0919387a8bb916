// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pressproof: preflight a print PDF, fix what can be fixed, check the
// rendering engine.

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pressproof_analysis::Preflight;
use pressproof_core::config::AppConfig;
use pressproof_core::error::PreflightError;
use pressproof_core::human_errors::humanize_error;
use pressproof_core::types::{OverallStatus, PdfxStandard};
use pressproof_fix::AutoFixer;
use pressproof_render::{GhostscriptRenderer, Renderer, UnavailableRenderer};

#[derive(Parser)]
#[command(
    name = "pressproof",
    about = "Print-production PDF preflight with automatic fixes",
    version
)]
struct Cli {
    /// JSON configuration file (thresholds, fix toggles, renderer)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a PDF and print the preflight report
    Analyze {
        /// Input PDF file
        input: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Check against a PDF/X standard (x1a, x3, x4)
        #[arg(long, value_parser = parse_standard)]
        target: Option<PdfxStandard>,
    },

    /// Analyse a PDF, apply the enabled fixes and write the result
    Fix {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Write the markdown fix report here instead of stdout
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the fix result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        toggles: FixToggles,
    },

    /// Check that the rendering engine can be run
    CheckRenderer,
}

/// Switches that turn individual fixes off (or PDF/X packaging on).
#[derive(Args, Default)]
struct FixToggles {
    /// Do not convert RGB to CMYK
    #[arg(long)]
    no_cmyk: bool,
    /// Do not add mirrored bleed
    #[arg(long)]
    no_bleed: bool,
    /// Do not attempt font embedding
    #[arg(long)]
    no_fonts: bool,
    /// Do not flatten transparency
    #[arg(long)]
    no_flatten: bool,
    /// Do not resample images or compress streams
    #[arg(long)]
    no_images: bool,
    /// Leave overprint settings alone
    #[arg(long)]
    no_overprint: bool,
    /// Do not reduce ink coverage
    #[arg(long)]
    no_ink: bool,
    /// Do not repair page boxes
    #[arg(long)]
    no_trim: bool,
    /// Do not attempt hidden-layer removal
    #[arg(long)]
    no_layers: bool,
    /// Do not attempt spot-colour conversion
    #[arg(long)]
    no_spot: bool,
    /// Package the result as PDF/X-1a
    #[arg(long)]
    pdfx: bool,
    /// Skip every renderer stage
    #[arg(long)]
    no_render: bool,
}

impl FixToggles {
    fn apply(&self, config: &mut AppConfig) {
        let fix = &mut config.fix;
        fix.convert_rgb_to_cmyk &= !self.no_cmyk;
        fix.add_bleed &= !self.no_bleed;
        fix.embed_fonts &= !self.no_fonts;
        fix.flatten_transparency &= !self.no_flatten;
        fix.optimize_images &= !self.no_images;
        fix.fix_overprint &= !self.no_overprint;
        fix.adjust_ink_coverage &= !self.no_ink;
        fix.fix_trim_box &= !self.no_trim;
        fix.remove_hidden_layers &= !self.no_layers;
        fix.convert_spot_colors &= !self.no_spot;
        fix.package_pdfx |= self.pdfx;
    }
}

fn parse_standard(value: &str) -> std::result::Result<PdfxStandard, String> {
    match value.to_ascii_lowercase().trim_start_matches("pdf/").trim_start_matches('x') {
        "1a" | "-1a" => Ok(PdfxStandard::X1a),
        "3" | "-3" => Ok(PdfxStandard::X3),
        "4" | "-4" => Ok(PdfxStandard::X4),
        _ => Err(format!("unknown PDF/X standard '{value}' (expected x1a, x3 or x4)")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<PreflightError>() {
                Some(preflight) => {
                    let human = humanize_error(preflight);
                    eprintln!("error: {}", human.message);
                    eprintln!("  {}", human.suggestion);
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            input,
            json,
            target,
        } => {
            if target.is_some() {
                config.preflight.target_standard = target;
            }
            let bytes = read_pdf(&input)?;
            let report = Preflight::new(config.preflight).analyze(&bytes, &file_name(&input));
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::report_text(&report));
            }
            Ok(exit_code(report.overall_status == OverallStatus::Pass))
        }

        Commands::Fix {
            input,
            output: out_path,
            report: report_path,
            json,
            toggles,
        } => {
            toggles.apply(&mut config);
            let bytes = read_pdf(&input)?;
            let report = Preflight::new(config.preflight).analyze(&bytes, &file_name(&input));

            let renderer: Box<dyn Renderer> = if toggles.no_render {
                Box::new(UnavailableRenderer::new("rendering disabled with --no-render"))
            } else {
                Box::new(GhostscriptRenderer::new(config.render))
            };
            let result = AutoFixer::new(renderer.as_ref(), config.fix).fix(&bytes, &report);

            std::fs::write(&out_path, &result.fixed_bytes)
                .with_context(|| format!("writing {}", out_path.display()))?;
            tracing::info!(path = %out_path.display(), bytes = result.fixed_bytes.len(), "fixed PDF written");

            if let Some(path) = &report_path {
                std::fs::write(path, &result.report)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if report_path.is_none() {
                print!("{}", result.report);
            }
            Ok(exit_code(result.success))
        }

        Commands::CheckRenderer => {
            let renderer = GhostscriptRenderer::new(config.render);
            match renderer.version() {
                Ok(version) => {
                    println!("{} {version}: available", renderer.binary());
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    let human = humanize_error(&err);
                    println!("{}: unavailable ({err})", renderer.binary());
                    println!("  {}", human.suggestion);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| PreflightError::Io(err).into())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standards_parse_loosely() {
        assert_eq!(parse_standard("x1a"), Ok(PdfxStandard::X1a));
        assert_eq!(parse_standard("PDF/X-4"), Ok(PdfxStandard::X4));
        assert_eq!(parse_standard("x3"), Ok(PdfxStandard::X3));
        assert!(parse_standard("x5").is_err());
    }

    #[test]
    fn toggles_only_switch_fixes_off() {
        let mut config = AppConfig::default();
        config.fix.add_bleed = false;
        let toggles = FixToggles {
            no_cmyk: true,
            pdfx: true,
            ..FixToggles::default()
        };
        toggles.apply(&mut config);
        assert!(!config.fix.convert_rgb_to_cmyk);
        assert!(!config.fix.add_bleed);
        assert!(config.fix.embed_fonts);
        assert!(config.fix.package_pdfx);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
