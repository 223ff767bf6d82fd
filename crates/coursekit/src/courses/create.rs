use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::form::{validated, CourseArgs};
use super::CatalogStore;
use crate::prelude::{println, *};

/// Options for creating a course
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  coursekit courses create --title \"Intro to Rust\" --category-id <ID> \\
    --sub-category-id <ID> --post-date 2024-03-01 --is-free true --tag <ID> --tag <ID>")]
pub struct CreateOptions {
    #[clap(flatten)]
    pub course: CourseArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub fn create_data(store: &mut CatalogStore, course: &CourseArgs) -> Result<String> {
    let valid = validated(course)?;
    Ok(store.create_course(&valid)?)
}

pub fn handler(store: &mut CatalogStore, options: CreateOptions) -> Result<()> {
    let id = create_data(store, &options.course)?;

    if options.json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("{} {}", "Created course".green(), id.bright_white());
    }

    Ok(())
}
