use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use logistock_pdf::{Orientation, PageFormat, Report};

/// Render a JSON report definition to a paginated PDF.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Report definition (JSON)
    input: PathBuf,

    /// Output PDF path; defaults to the input path with a .pdf extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page format override: a4, letter or legal
    #[arg(long)]
    format: Option<PageFormat>,

    /// Force landscape orientation
    #[arg(long)]
    landscape: bool,

    /// Log layout decisions and timing
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("pdf"));

    let result = Report::from_file(&args.input).and_then(|mut report| {
        if let Some(format) = args.format {
            report.document.format = Some(format);
        }
        if args.landscape {
            report.document.orientation = Some(Orientation::Landscape);
        }
        let bytes = logistock_pdf::render_report(&report)?;
        std::fs::write(&output, &bytes)?;
        Ok(bytes.len())
    });

    match result {
        Ok(len) => {
            println!("{} -> {} ({} bytes)", args.input.display(), output.display(), len);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
