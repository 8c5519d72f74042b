//! The `prepdrill score` command: one-shot live-scorer invocation.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use prepdrill_core::scorer::{self, ExampleSignals};

pub fn execute(text: Option<String>, file: Option<PathBuf>, elapsed: u64, json: bool) -> Result<()> {
    let answer = match (text, file) {
        (Some(t), None) => t,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answer from {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read answer from stdin")?;
            buf
        }
        (Some(_), Some(_)) => anyhow::bail!("pass either --text or --file, not both"),
    };

    let snapshot = scorer::score(&answer, elapsed, &ExampleSignals::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("Score: {}", snapshot.value);
        println!(
            "  {} words · {}s elapsed · example marker: {}",
            snapshot.word_count,
            elapsed,
            if snapshot.has_example { "yes" } else { "no" }
        );
    }

    Ok(())
}
