use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use serde::Serialize;
use vizql::{locate, Config, Object, SessionState, Workbook};

#[derive(Parser, Debug)]
#[clap(name = "vizql", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    /// Session configuration (JSON, YAML or TOML).
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Saved body of the bootstrap response.
    bootstrap: PathBuf,

    /// Saved command responses to apply after the bootstrap, in order. Glob
    /// patterns are expanded and sorted.
    #[clap(short, long)]
    update: Vec<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the worksheets of the latest document.
    Worksheets,
    /// Print the data table of a worksheet.
    Data { worksheet: String },
    /// List the filters known for a worksheet.
    Filters { worksheet: String },
    /// List the parameter controls.
    Parameters,
    /// List the sheets of the workbook.
    Sheets,
    /// List the story points of the root dashboard.
    StoryPoints,
}

fn main() {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .unwrap();

    if let Err(e) = run(&args) {
        log::error!("Failed: {:?}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    let body = read(&args.bootstrap)?;
    let (info, data) = vizql::split_bootstrap(&body)
        .wrap_err_with(|| format!("failed to split bootstrap {}", args.bootstrap.display()))?;
    let dashboard = config.root_dashboard(&info);

    let mut session = SessionState::from_bootstrap(&info, &data, &dashboard)?;
    let mut latest: Option<Object> = None;
    for path in update_paths(&args.update)? {
        let doc: Object = serde_json::from_str(&read(&path)?)
            .wrap_err_with(|| format!("{} is not a JSON object", path.display()))?;
        session
            .apply_update(&doc, &dashboard)
            .wrap_err_with(|| format!("failed to apply {}", path.display()))?;
        log::debug!("Applied {}", path.display());
        if locate::application_pres_model(&doc).is_ok() {
            latest = Some(doc);
        }
    }
    let workbook = match &latest {
        Some(doc) => Workbook::from_command_response(doc, &session)?,
        None => Workbook::from_bootstrap(&info, &data, &session)?,
    };

    match &args.command {
        Command::Worksheets => print(&workbook.worksheet_names()),
        Command::Data { worksheet } => print(&workbook.worksheet(worksheet)?.table()),
        Command::Filters { worksheet } => print(&session.filters(worksheet)),
        Command::Parameters => print(&session.parameters()),
        Command::Sheets => print(&vizql::parameter::sheets(&info)?),
        Command::StoryPoints => print(&vizql::parameter::story_points(&info)?),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn update_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for pattern in patterns {
        let mut paths = glob::glob(pattern)
            .wrap_err_with(|| format!("invalid pattern {}", pattern))?
            .collect::<Result<Vec<_>, _>>()?;
        if paths.is_empty() {
            log::warn!("No files match {}", pattern);
        }
        paths.sort();
        result.extend(paths);
    }
    Ok(result)
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
