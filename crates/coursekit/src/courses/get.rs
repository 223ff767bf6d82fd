use colored::Colorize;
use coursekit_core::catalog::Course;
use serde::{Deserialize, Serialize};

use super::list::{category_path, tag_names};
use super::CatalogStore;
use crate::prelude::{println, *};

/// Options for showing a single course
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Course id
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub fn get_data(store: &CatalogStore, id: &str) -> Result<Course> {
    Ok(store.get_course(id)?)
}

pub fn handler(store: &CatalogStore, options: GetOptions) -> Result<()> {
    let course = get_data(store, &options.id)?;
    display_course(&course, options.json)
}

/// Print one course, either as JSON or as a field table
pub fn display_course(course: &Course, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(course)?);
        return Ok(());
    }

    println!("\n{}\n", course.title.bold().bright_white());

    let mut table = new_table();
    table.add_row(prettytable::row!["ID".bold().cyan(), course.id]);
    table.add_row(prettytable::row!["Category".bold().cyan(), category_path(course)]);
    table.add_row(prettytable::row![
        "Free".bold().cyan(),
        if course.is_free { "yes" } else { "no" }
    ]);
    table.add_row(prettytable::row!["Posted".bold().cyan(), course.post_date]);
    table.add_row(prettytable::row!["Tags".bold().cyan(), tag_names(course)]);
    table.printstd();

    Ok(())
}
