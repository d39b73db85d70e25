//! questdoc command-line front end.
//!
//! # Responsibility
//! - Create, inspect, check and export quest project files.
//! - Keep all behavior in `questdoc_core`; this binary only parses
//!   arguments and prints results.

use clap::{Parser, Subcommand};
use questdoc_core::{
    default_log_level, init_logging, ExportService, JsonFileProjectRepository, Project,
    ProjectRepository, RenderOptions, UnresolvedLink,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "questdoc")]
#[command(version, about = "Branching quest editor with HTML export", long_about = None)]
#[command(after_help = "EXAMPLES:
    questdoc init mine.json               Create a new project
    questdoc export mine.json             Write mine.html
    questdoc check mine.json              Report duplicate ids and dead links")]
struct Cli {
    /// Log level for file logging (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "QUESTDOC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "QUESTDOC_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a new project with one start node
    Init {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Render the project into one HTML file
    Export {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Output file; defaults to the project path with `.html`
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Leave out the hash-highlight script
        #[arg(long)]
        no_script: bool,
    },
    /// Report duplicate node ids and unresolved option targets
    Check {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,
    },
    /// Print metadata and the node list
    Show {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let result = match cli.command {
        Command::Init { project, force } => init(&project, force),
        Command::Export {
            project,
            output,
            no_script,
        } => export(&project, output, no_script),
        Command::Check { project } => check(&project),
        Command::Show { project } => show(&project),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init(path: &Path, force: bool) -> Result<ExitCode, String> {
    if path.exists() && !force {
        return Err(format!(
            "`{}` already exists; pass --force to overwrite",
            path.display()
        ));
    }
    JsonFileProjectRepository::new(path)
        .save(&Project::new())
        .map_err(|e| e.to_string())?;
    println!("Created {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn export(path: &Path, output: Option<PathBuf>, no_script: bool) -> Result<ExitCode, String> {
    let output = output.unwrap_or_else(|| path.with_extension("html"));
    let mut options = RenderOptions::now();
    if no_script {
        options = options.without_script();
    }

    let service = ExportService::new(JsonFileProjectRepository::new(path));
    let report = service
        .export_html(&output, &options)
        .map_err(|e| e.to_string())?;

    println!(
        "Exported {} nodes to {} ({} bytes)",
        report.node_count,
        report.output.display(),
        report.bytes
    );
    print_unresolved(&report.unresolved);
    Ok(ExitCode::SUCCESS)
}

fn check(path: &Path) -> Result<ExitCode, String> {
    let service = ExportService::new(JsonFileProjectRepository::new(path));
    let audit = service.check().map_err(|e| e.to_string())?;

    for conflict in &audit.conflicts {
        eprintln!("id conflict: {conflict}");
    }
    print_unresolved(&audit.unresolved);

    if audit.is_exportable() {
        println!(
            "OK: no id conflicts, {} unresolved link(s)",
            audit.unresolved.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn show(path: &Path) -> Result<ExitCode, String> {
    let service = ExportService::new(JsonFileProjectRepository::new(path));
    let project = service.load().map_err(|e| e.to_string())?;

    let meta = &project.meta;
    println!("Quest: {}", meta.quest_name);
    println!("Region: {}", meta.region);
    if !meta.quest_giver.is_empty() {
        println!("Quest giver: {}", meta.quest_giver);
    }
    for (key, value) in &meta.extra {
        println!("{key}: {value}");
    }
    println!("Nodes: {}", project.nodes.len());
    for node in &project.nodes {
        println!(
            "  {}  {}  ({} options)",
            questdoc_core::sanitize_id(&node.node_id),
            node.display_title(),
            node.options.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn print_unresolved(links: &[UnresolvedLink]) {
    for link in links {
        eprintln!(
            "unresolved: {} option #{} `{}` -> `{}`",
            link.node_id, link.option_index, link.label, link.target
        );
    }
}
