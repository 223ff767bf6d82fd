use colored::Colorize;

use super::CatalogStore;
use crate::prelude::{println, *};

pub fn handler(store: &mut CatalogStore) -> Result<()> {
    let summary = store.seed()?;

    println!("{}", "Catalog seeded".green());
    let mut table = new_table();
    table.add_row(prettytable::row!["Categories".bold().cyan(), summary.categories]);
    table.add_row(prettytable::row!["Sub-categories".bold().cyan(), summary.sub_categories]);
    table.add_row(prettytable::row!["Tags".bold().cyan(), summary.tags]);
    table.add_row(prettytable::row!["Courses".bold().cyan(), summary.courses]);
    table.printstd();

    Ok(())
}
