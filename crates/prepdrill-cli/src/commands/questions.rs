//! The `prepdrill questions` command: list the question catalog.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::catalog;

pub fn execute(category: Option<String>, catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = catalog::load_catalog(catalog_path.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Id", "Difficulty", "Title", "Tags"]);

    let mut shown = 0usize;
    for question in &catalog.questions {
        if let Some(filter) = &category {
            if &question.category != filter {
                continue;
            }
        }
        table.add_row(vec![
            Cell::new(&question.category),
            Cell::new(&question.id),
            Cell::new(question.difficulty),
            Cell::new(&question.title),
            Cell::new(question.tags.join(", ")),
        ]);
        shown += 1;
    }

    if shown == 0 {
        match &category {
            Some(filter) => println!(
                "No questions in category '{filter}'. Known categories: {}",
                catalog.categories().join(", ")
            ),
            None => println!("The catalog '{}' has no questions.", catalog.name),
        }
        return Ok(());
    }

    println!("{} — {} questions\n", catalog.name, shown);
    println!("{table}");
    Ok(())
}
