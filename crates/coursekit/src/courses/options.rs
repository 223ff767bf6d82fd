use colored::Colorize;
use coursekit_core::catalog::FilterOptions;
use serde::{Deserialize, Serialize};

use super::CatalogStore;
use crate::prelude::{println, *};

/// Options for listing filter values
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct OptionsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub fn options_data(store: &CatalogStore) -> Result<FilterOptions> {
    Ok(store.filter_options()?)
}

pub fn handler(store: &CatalogStore, args: OptionsArgs) -> Result<()> {
    let options = options_data(store)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    println!("{}", "Categories".bold().cyan());
    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Name".bold().cyan(),
        "Sub-categories".bold().cyan()
    ]);
    for category in &options.all_categories {
        let subs = category
            .sub_categories
            .iter()
            .map(|s| format!("{} ({})", s.name, s.id.dimmed()))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(prettytable::row![category.id, category.name, subs]);
    }
    table.printstd();

    println!("\n{}", "Tags".bold().cyan());
    let mut table = new_table();
    table.add_row(prettytable::row!["ID".bold().cyan(), "Name".bold().cyan()]);
    for tag in &options.all_tags {
        table.add_row(prettytable::row![tag.id, tag.name]);
    }
    table.printstd();

    Ok(())
}
