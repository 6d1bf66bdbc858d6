use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use prodcat_core::config::LoadOptions;
use prodcat_core::view::SortDirection;
use prodcat_core::{render, CategoryId, FilterEngine, OutputFormat, UserId, ViewEvent};
use thiserror::Error;
use tracing::warn;

use crate::commands::{load_catalog, parse_sort_key, CommandResult};

const HELP: &str = "commands:
  owner <id>|all        filter by category owner
  search <text>         filter by product name
  clear                 clear the search text
  category <id>         toggle a category
  categories all        clear the category selection
  sort id|product|category|user
  reset                 reset all filters
  show                  render the current view
  quit";

/// One line of input in a browse session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowseCommand {
    Event(ViewEvent),
    Show,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command `{0}` (type `help` for a list)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a valid id")]
    InvalidId(String),
    #[error("{0}")]
    InvalidSortKey(String),
}

impl FromStr for BrowseCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "owner" => match rest.trim() {
                "" => Err(CommandParseError::MissingArgument("owner")),
                "all" => Ok(Self::Event(ViewEvent::SelectOwner(None))),
                id => Ok(Self::Event(ViewEvent::SelectOwner(Some(UserId(parse_id(id)?))))),
            },
            "search" => Ok(Self::Event(ViewEvent::SetQuery(rest.trim_start().to_string()))),
            "clear" => Ok(Self::Event(ViewEvent::ClearQuery)),
            "category" | "categories" => match rest.trim() {
                "" => Err(CommandParseError::MissingArgument("category")),
                "all" => Ok(Self::Event(ViewEvent::ClearCategories)),
                id => Ok(Self::Event(ViewEvent::ToggleCategory(CategoryId(parse_id(id)?)))),
            },
            "sort" => match rest.trim() {
                "" => Err(CommandParseError::MissingArgument("sort")),
                key => parse_sort_key(key)
                    .map(|key| Self::Event(ViewEvent::SortBy(key)))
                    .map_err(CommandParseError::InvalidSortKey),
            },
            "reset" => Ok(Self::Event(ViewEvent::ResetAll)),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(value: &str) -> Result<u32, CommandParseError> {
    value.parse().map_err(|_| CommandParseError::InvalidId(value.to_string()))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub events_applied: usize,
    pub rejected_lines: usize,
}

pub fn run(options: LoadOptions, format: Option<OutputFormat>) -> CommandResult {
    let (config, catalog) = match load_catalog(options) {
        Ok(loaded) => loaded,
        Err(error) => return CommandResult::from_error("browse", &error),
    };

    let mut engine = FilterEngine::new(&catalog, config.view.recompute);
    let format = format.unwrap_or(config.view.format);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    match run_session(&mut engine, format, stdin.lock(), &mut stdout) {
        Ok(summary) => CommandResult::success(
            "browse",
            format!(
                "session ended after {} events ({} rejected lines)",
                summary.events_applied, summary.rejected_lines
            ),
        ),
        Err(error) => CommandResult::failure("browse", "io", format!("{error:#}"), 5),
    }
}

/// Reads one command per line, applies it and re-renders until `quit` or EOF.
pub fn run_session<R, W>(
    engine: &mut FilterEngine<'_>,
    format: OutputFormat,
    input: R,
    output: &mut W,
) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();
    write_view(engine, format, output)?;

    for line in input.lines() {
        let line = line.context("failed to read browse input")?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<BrowseCommand>() {
            Ok(BrowseCommand::Event(event)) => {
                engine.apply(event);
                summary.events_applied += 1;
                write_view(engine, format, output)?;
            }
            Ok(BrowseCommand::Show) => write_view(engine, format, output)?,
            Ok(BrowseCommand::Help) => writeln!(output, "{HELP}")?,
            Ok(BrowseCommand::Quit) => break,
            Err(error) => {
                warn!(event_name = "browse.command_rejected", line = %line, error = %error, "rejected browse input");
                summary.rejected_lines += 1;
                writeln!(output, "error: {error}")?;
            }
        }
    }

    output.flush().context("failed to flush browse output")?;
    Ok(summary)
}

fn write_view<W: Write>(engine: &FilterEngine<'_>, format: OutputFormat, output: &mut W) -> Result<()> {
    let rendered = render(engine.visible(), format).context("failed to render view")?;
    if format == OutputFormat::Text {
        writeln!(output, "{}", describe_criteria(engine))?;
    }
    writeln!(output, "{rendered}")?;
    Ok(())
}

/// One-line summary of the active filters, e.g.
/// `owner: Anna | search: "s" | categories: all | sort: none | 3 of 8 products`.
pub fn describe_criteria(engine: &FilterEngine<'_>) -> String {
    let catalog = engine.catalog();
    let criteria = engine.criteria();

    let owner = match engine.selected_owner() {
        None => "all".to_string(),
        Some(id) => catalog.user(id).map(|user| user.name.clone()).unwrap_or_else(|| format!("#{id}")),
    };
    let categories = if criteria.categories.is_empty() {
        "all".to_string()
    } else {
        criteria
            .categories
            .iter()
            .map(|id| {
                catalog
                    .category(*id)
                    .map(|category| category.title.clone())
                    .unwrap_or_else(|| format!("#{id}"))
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let sort = match criteria.sort {
        None => "none".to_string(),
        Some(order) => {
            let direction = match order.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            format!("{:?} {direction}", order.key).to_ascii_lowercase()
        }
    };

    format!(
        "owner: {owner} | search: {:?} | categories: {categories} | sort: {sort} | {} of {} products",
        engine.query(),
        engine.visible().len(),
        catalog.denormalized().len()
    )
}
