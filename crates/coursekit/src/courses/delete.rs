use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::CatalogStore;
use crate::prelude::{println, *};

/// Options for deleting a course
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct DeleteOptions {
    /// Course id
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function
pub fn delete_data(store: &mut CatalogStore, id: &str) -> Result<()> {
    Ok(store.delete_course(id)?)
}

pub fn handler(store: &mut CatalogStore, options: DeleteOptions) -> Result<()> {
    delete_data(store, &options.id)?;

    if options.json {
        println!("{}", serde_json::json!({ "success": true }));
    } else {
        println!("{} {}", "Deleted course".green(), options.id.bright_white());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courses::StoreError;

    #[test]
    fn test_delete_data_removes_course() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.seed().unwrap();
        let query = coursekit_core::catalog::CourseQuery::parse(&Default::default(), 8);
        let id = store.list_courses(&query).unwrap().data[0].id.clone();

        delete_data(&mut store, &id).unwrap();

        let err = delete_data(&mut store, &id).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound(_))
        ));
    }
}
