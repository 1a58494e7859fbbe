// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::env;
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser};
use tracing_subscriber::EnvFilter;

use sampleinline::config::Settings;
use sampleinline::patch::LoaderPatch;
use sampleinline::pipeline::RunReport;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Embeds a kit of WAV samples into a single HTML page."
)]
struct Cli {
    /// The directory holding the samples and the page. Defaults to the current directory.
    path: Option<PathBuf>,
    /// The page to patch. Defaults to the document named in the config (index.html).
    #[arg(short, long)]
    document: Option<PathBuf>,
    /// The config file. Defaults to sampleinline.yaml in the samples directory, if present.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Embed the files byte-for-byte instead of converting them to mono.
    #[arg(long)]
    no_normalize: bool,
    /// Compute the patch without writing the page.
    #[arg(long)]
    dry_run: bool,
    /// Check the samples already embedded in the page and exit.
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.path {
        Some(path) => path,
        None => env::current_dir()?,
    };
    let mut settings = Settings::load(&base_dir, cli.config.as_deref())?;
    if let Some(document) = cli.document {
        settings.set_document(document);
    }
    if cli.no_normalize {
        settings.set_normalize(false);
    }
    settings.set_dry_run(cli.dry_run);

    if cli.verify {
        let payloads = sampleinline::verify(&settings)?;
        if payloads.is_empty() {
            println!("No embedded samples in {}.", settings.document().display());
            return Ok(());
        }
        println!("Embedded samples (count: {}):", payloads.len());
        for payload in payloads {
            println!("- {} ({} bytes)", payload.name, payload.decoded_len);
        }
        return Ok(());
    }

    println!("=== Sample Embedder ===\n");
    let report = sampleinline::run(&settings)?;
    print_report(&settings, &report);

    Ok(())
}

fn print_report(settings: &Settings, report: &RunReport) {
    for line in report_lines(settings, report) {
        println!("{}", line);
    }
}

/// The per-sample progress lines, in sample set order, followed by the summary.
fn report_lines(settings: &Settings, report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in settings.samples().iter() {
        if let Some(sample) = report.samples.iter().find(|s| s.name == entry.name()) {
            lines.push(format!("Processing {}...", sample.file));
            lines.push(format!(
                "  ✓ {} -> {} chars ({})",
                sample.file, sample.encoded_len, sample.normalization
            ));
        } else if report.missing.iter().any(|name| name == entry.name()) {
            lines.push(format!("Processing {}...", entry.file()));
            lines.push(format!("  ✗ {} not found", entry.file()));
        }
    }

    let patch = match report.patch {
        Some(patch) => patch,
        None => {
            lines.push("\nNo samples found! Please add WAV files:".to_string());
            for entry in settings.samples().iter() {
                lines.push(format!("  - {}", entry.file()));
            }
            return lines;
        }
    };

    if patch.loader == LoaderPatch::NotFound {
        lines.push("\nLoader routine not found, only the sample data was embedded.".to_string());
    }
    if patch.written {
        lines.push(format!(
            "\n✓ Embedded {} sample(s) into {}",
            report.processed(),
            report.document.display()
        ));
    } else {
        lines.push(format!(
            "\nDry run: {} sample(s) would be embedded into {}",
            report.processed(),
            report.document.display()
        ));
    }
    lines
}
