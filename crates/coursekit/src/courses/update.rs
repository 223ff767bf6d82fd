use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::form::{validated, CourseArgs};
use super::CatalogStore;
use crate::prelude::{println, *};

/// Options for overwriting a course
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "NOTES:
  - Every field is rewritten; omitted tags leave the course untagged")]
pub struct UpdateOptions {
    /// Course id
    pub id: String,

    #[clap(flatten)]
    pub course: CourseArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub fn update_data(store: &mut CatalogStore, id: &str, course: &CourseArgs) -> Result<()> {
    let valid = validated(course)?;
    Ok(store.update_course(id, &valid)?)
}

pub fn handler(store: &mut CatalogStore, options: UpdateOptions) -> Result<()> {
    update_data(store, &options.id, &options.course)?;

    if options.json {
        println!("{}", serde_json::json!({ "id": options.id }));
    } else {
        println!("{} {}", "Updated course".green(), options.id.bright_white());
    }

    Ok(())
}
