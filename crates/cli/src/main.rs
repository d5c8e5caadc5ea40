//! avoreport: render avocado-export reports to PDF

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render avocado-export reports to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON report to PDF
    Render(RenderArgs),

    /// List built-in templates and their sections
    Templates,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Report JSON file
    pub input: PathBuf,

    /// Output file (defaults to the suggested file name in --out-dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for the suggested file name
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Layout configuration JSON
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory image references are resolved against (defaults to the input's directory)
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// TrueType font used instead of Helvetica
    #[arg(long)]
    pub font_regular: Option<PathBuf>,

    /// Bold TrueType font (needs --font-regular)
    #[arg(long, requires = "font_regular")]
    pub font_bold: Option<PathBuf>,

    /// Print the layout summary as JSON without writing a PDF
    #[arg(long)]
    pub dry_run: bool,

    /// Store the PDF and record it in the report index under this directory
    #[arg(long, conflicts_with = "dry_run")]
    pub archive_dir: Option<PathBuf>,

    /// User id recorded with archived reports
    #[arg(long, requires = "archive_dir")]
    pub user: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Render(args) => commands::render(&args),
        Command::Templates => commands::templates(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("{}", commands::user_message(&err));
            ExitCode::FAILURE
        }
    }
}
