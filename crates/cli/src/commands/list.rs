use prodcat_core::config::LoadOptions;
use prodcat_core::{
    render, ApplicationError, CategoryId, FilterEngine, OutputFormat, RecomputePolicy, SortKey,
    UserId,
};
use tracing::warn;

use crate::commands::{load_catalog, CommandResult};

/// Filters passed on the command line, applied in the order an operator would
/// click through the view: owner, categories, query, then sort.
#[derive(Clone, Debug, Default)]
pub struct ListArgs {
    pub owner: Option<u32>,
    pub query: Option<String>,
    pub categories: Vec<u32>,
    pub sort: Vec<SortKey>,
    pub format: Option<OutputFormat>,
}

pub fn run(options: LoadOptions, args: ListArgs) -> CommandResult {
    match render_list(options, args) {
        Ok(output) => CommandResult::output(output),
        Err(error) => CommandResult::from_error("list", &error),
    }
}

fn render_list(options: LoadOptions, args: ListArgs) -> Result<String, ApplicationError> {
    let (config, catalog) = load_catalog(options)?;
    let mut engine = FilterEngine::new(&catalog, config.view.recompute);

    let ignored = inert_flags(engine.policy(), &args);
    if !ignored.is_empty() {
        warn!(
            event_name = "list.flags_ignored",
            flags = %ignored.join(", "),
            "the chained recompute policy ignores these flags; use --recompute pure to apply them"
        );
    }

    if let Some(owner) = args.owner {
        engine.filter_by_owner(Some(UserId(owner)));
    }
    for category in args.categories {
        engine.toggle_category(CategoryId(category));
    }
    if let Some(query) = args.query {
        engine.filter_by_query(query);
    }
    for key in args.sort {
        engine.sort_by(key);
    }

    let format = args.format.unwrap_or(config.view.format);
    Ok(render(engine.visible(), format)?)
}

/// Flags that have no effect under the given policy.
fn inert_flags(policy: RecomputePolicy, args: &ListArgs) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if policy == RecomputePolicy::Chained {
        if !args.categories.is_empty() {
            flags.push("--category");
        }
        if !args.sort.is_empty() {
            flags.push("--sort");
        }
    }
    flags
}
