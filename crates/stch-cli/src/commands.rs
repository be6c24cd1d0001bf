use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use stch_object::Object;
use stch_project::{Project, ProjectConfig};
use stch_store::ObjectStore;
use stch_types::{class_id, Dialect};
use tracing::debug;

use crate::cli::*;

#[derive(Debug, Serialize)]
pub struct StoreSummary {
    pub root_class: String,
    pub entries: usize,
    pub orphans: usize,
    pub nodes: usize,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub dialect: Dialect,
    pub version: Option<String>,
    pub author: Option<String>,
    pub info: StoreSummary,
    pub stage: StoreSummary,
    pub sprites: Vec<String>,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, cli.format),
        Command::New(args) => cmd_new(args),
        Command::Convert(args) => cmd_convert(args),
    }
}

fn summarize_store(store: &ObjectStore, dialect: Dialect) -> anyhow::Result<StoreSummary> {
    let root = store.root();
    let root_class = match store.graph().object(root) {
        Some(object) => object.class_name(),
        None => root.class_id().and_then(class_id::name).unwrap_or("Unknown"),
    };
    Ok(StoreSummary {
        root_class: root_class.to_string(),
        entries: store.reference_table(dialect)?.len(),
        orphans: store.orphans().len(),
        nodes: store.graph().len(),
    })
}

fn sprite_names(project: &Project) -> Vec<String> {
    let graph = project.stage().graph();
    let Some(sprites) = project
        .stage_record()
        .and_then(|stage| stage.get_field("sprites").ok())
        .and_then(|list| graph.object(list))
        .and_then(Object::as_collection)
    else {
        return Vec::new();
    };
    sprites
        .iter()
        .filter_map(|field| field.get().ok())
        .filter_map(|sprite| graph.object(sprite)?.as_record())
        .filter_map(|sprite| graph.text_of(sprite.get_field("objName").ok()?))
        .map(|name| name.into_owned())
        .collect()
}

pub fn summarize(project: &Project) -> anyhow::Result<ProjectSummary> {
    let dialect = project.dialect();
    Ok(ProjectSummary {
        dialect,
        version: project.info_text("scratch-version").map(|t| t.into_owned()),
        author: project.info_text("author").map(|t| t.into_owned()),
        info: summarize_store(project.info(), dialect)?,
        stage: summarize_store(project.stage(), dialect)?,
        sprites: sprite_names(project),
    })
}

fn print_store(label: &str, store: &StoreSummary) {
    println!(
        "  {:<6} {}  {} entries, {} orphans",
        label.bold(),
        store.root_class.cyan(),
        store.entries,
        store.orphans
    );
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    debug!(file = %args.file.display(), "inspecting project");
    let project = Project::load(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let summary = summarize(&project)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!("{} {}", "Project".bold(), args.file.display());
            println!(
                "  Dialect: {} ({})",
                summary.dialect.to_string().yellow(),
                summary.version.as_deref().unwrap_or("no version label")
            );
            if let Some(author) = summary.author.as_deref().filter(|a| !a.is_empty()) {
                println!("  Author: {author}");
            }
            print_store("info", &summary.info);
            print_store("stage", &summary.stage);
            if summary.sprites.is_empty() {
                println!("  No sprites.");
            }
            for name in &summary.sprites {
                println!("  {} {}", "sprite:".green(), name);
            }
        }
    }
    Ok(())
}

fn cmd_new(args: NewArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ProjectConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ProjectConfig::default(),
    };
    let project = Project::with_config(args.dialect, &config)?;
    project
        .save(&args.file)
        .with_context(|| format!("writing {}", args.file.display()))?;
    println!(
        "{} Created {} project {}",
        "✓".green().bold(),
        args.dialect.to_string().yellow(),
        args.file.display()
    );
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let mut project = Project::load(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let from = project.dialect();
    project.convert(args.dialect)?;
    project
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!(
        "{} Converted {} → {}: {}",
        "✓".green().bold(),
        from.to_string().yellow(),
        args.dialect.to_string().yellow(),
        args.output.display()
    );
    Ok(())
}
