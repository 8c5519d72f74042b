//! The `prepdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create prepdrill.toml
    if std::path::Path::new("prepdrill.toml").exists() {
        println!("prepdrill.toml already exists, skipping.");
    } else {
        std::fs::write("prepdrill.toml", SAMPLE_CONFIG)?;
        println!("Created prepdrill.toml");
    }

    // Create example question set
    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit prepdrill.toml with your Gemini API key (optional — without one,");
    println!("     feedback is synthesized locally)");
    println!("  2. Run: prepdrill questions");
    println!("  3. Run: prepdrill practice --category javascript");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# prepdrill configuration

[providers.gemini]
type = "gemini"
api_key = "${PREPDRILL_GEMINI_KEY}"
# model = "gemini-1.5-flash"

default_provider = "gemini"
request_timeout_secs = 12
# draft_dir = "~/.local/share/prepdrill/drafts"
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[catalog]
id = "example"
name = "Example Question Set"

[[questions]]
id = "rust-ownership"
category = "rust"
difficulty = "medium"
title = "ownership"
prompt = """
Explain Rust's ownership model and how moves, borrows, and lifetimes work
together. Include an example.
"""
tags = ["ownership", "borrowing"]
expected_minutes = 12

[[questions]]
id = "rust-send-sync"
category = "rust"
difficulty = "hard"
title = "Send and Sync"
prompt = """
What do the Send and Sync marker traits promise, and when would a type be
one but not the other?
"""
tags = ["concurrency", "traits"]
expected_minutes = 15
"#;
