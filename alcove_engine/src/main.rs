#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Alcove **
//! Authoring CLI: render descriptions, try item-list edits, lint content.

use std::path::{Path, PathBuf};

use alcove_data::{ContentDef, Quantity};
use alcove_engine::config::{default_config_path, load_config};
use alcove_engine::loader::content::load_content_unchecked;
use alcove_engine::loader::{load_content, load_context};
use alcove_engine::style::{CliStyle, wrap_text};
use alcove_engine::{Context, Mutation, Value, lint_content, plan_add_item, plan_remove_item, render};

use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(author, version, about = "Render and edit Alcove description templates.")]
struct Cli {
    /// Configuration file (defaults to `alcove.toml` in the data directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Content file (RON), overriding the configuration.
    #[arg(long, global = true)]
    content: Option<PathBuf>,
    /// Sample context file (JSON or TOML), overriding the configuration.
    #[arg(long, global = true)]
    context: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a description, or a raw template, for the sample context.
    Render(RenderArgs),
    /// Print a container description with an item added to its list.
    AddItem(AddItemArgs),
    /// Print a container description with an item removed from its list.
    RemoveItem(RemoveItemArgs),
    /// Lint all content; exits non-zero when issues are found.
    Check,
}

#[derive(Args)]
struct RenderArgs {
    /// Description id to render.
    #[arg(required_unless_present = "template")]
    id: Option<String>,
    /// Render the puzzle's solved description.
    #[arg(long)]
    solved: bool,
    /// Render this template text instead of a stored description.
    #[arg(long, conflicts_with = "id")]
    template: Option<String>,
    /// Set a context value, e.g. `--set player.intelligence=6`.
    #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, Value)>,
}

#[derive(Args)]
struct AddItemArgs {
    /// Container description id.
    container: String,
    /// Item id.
    item: String,
    /// Total quantity after the addition.
    #[arg(long, default_value_t = 1, conflicts_with = "uncountable")]
    quantity: u32,
    /// The item is never counted (e.g. a pile of COINS).
    #[arg(long)]
    uncountable: bool,
    /// Target list name; defaults to the first list.
    #[arg(long)]
    list: Option<String>,
}

#[derive(Args)]
struct RemoveItemArgs {
    /// Container description id.
    container: String,
    /// Item id.
    item: String,
    /// Total quantity left after the removal.
    #[arg(long, default_value_t = 0)]
    quantity: u32,
    /// Target list name; defaults to the first list.
    #[arg(long)]
    list: Option<String>,
}

fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let Some((path, value)) = raw.split_once('=') else {
        return Err(format!("expected PATH=VALUE, got '{raw}'"));
    };
    let path = path.trim();
    if !alcove_engine::context::is_valid_path(path) {
        return Err(format!("'{path}' is not a dotted context path"));
    }
    Ok((path.to_string(), Value::infer(value)))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path);
    let content_path = cli.content.clone().unwrap_or(config.content.path);
    let context_path = cli.context.clone().or(config.context.path);
    info!("content: '{}'", content_path.display());

    match cli.command {
        Commands::Render(args) => {
            let mut ctx = match &context_path {
                Some(path) => load_context(path)?,
                None => Context::new(),
            };
            ctx.merge(args.set.into_iter().collect());

            let template = match (&args.template, &args.id) {
                (Some(template), _) => template.clone(),
                (None, Some(id)) => {
                    let content = load_content(&content_path)?;
                    let desc = content
                        .description(id)
                        .with_context(|| format!("no description with id '{id}'"))?;
                    desc.template(args.solved).to_string()
                },
                (None, None) => bail!("give a description id or --template"),
            };

            let text = render(&template, &ctx).context("while rendering")?;
            println!("{}", wrap_text(&text, config.output.width).rendered_style());
        },
        Commands::AddItem(args) => {
            let content = load_content(&content_path)?;
            let quantity = if args.uncountable {
                Quantity::Uncountable
            } else {
                Quantity::Count(args.quantity)
            };
            let (template, item) = container_and_item(&content, &args.container, &args.item, quantity)?;
            let mutation = plan_add_item(template, &item, args.list.as_deref()).context("while adding item")?;
            print_mutation(template, mutation);
        },
        Commands::RemoveItem(args) => {
            let content = load_content(&content_path)?;
            let (template, item) =
                container_and_item(&content, &args.container, &args.item, Quantity::Count(args.quantity))?;
            let mutation = plan_remove_item(template, &item, args.list.as_deref()).context("while removing item")?;
            print_mutation(template, mutation);
        },
        Commands::Check => check(&content_path, context_path.as_deref())?,
    }
    Ok(())
}

fn container_and_item<'a>(
    content: &'a ContentDef,
    container: &str,
    item: &str,
    quantity: Quantity,
) -> Result<(&'a str, alcove_data::ItemDescriptor)> {
    let desc = content
        .description(container)
        .with_context(|| format!("no description with id '{container}'"))?;
    let item = content
        .item(item)
        .with_context(|| format!("no item with id '{item}'"))?;
    Ok((desc.text.as_str(), item.descriptor(quantity)))
}

fn print_mutation(original: &str, mutation: Mutation) {
    if let Mutation::Unchanged(reason) = &mutation {
        eprintln!("{}", format!("unchanged: {}", reason.describe()).note_style());
    }
    println!("{}", mutation.into_template(original).markup_style());
}

fn check(content_path: &Path, context_path: Option<&Path>) -> Result<()> {
    let content = load_content_unchecked(content_path)?;
    let ctx = context_path.map(load_context).transpose()?;
    let issues = lint_content(&content, ctx.as_ref());
    if issues.is_empty() {
        println!("{}", "content is clean".ok_style());
        return Ok(());
    }
    println!("{}", format!("{} issue(s)", issues.len()).heading_style());
    for issue in &issues {
        println!("  {}", issue.to_string().issue_style());
    }
    bail!("lint failed with {} issue(s)", issues.len());
}
