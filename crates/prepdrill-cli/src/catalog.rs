//! TOML question-set parsing.
//!
//! The catalog is a host-side collaborator: the engine only ever sees the
//! [`Question`] it is handed. A small built-in set ships with the binary;
//! `--catalog` loads another file in the same format.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use prepdrill_core::model::{Difficulty, Question};

/// A named collection of practice questions.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub id: String,
    pub name: String,
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Find a question by id, optionally constrained to a category.
    pub fn find(&self, id: &str, category: Option<&str>) -> Option<&Question> {
        self.questions
            .iter()
            .find(|q| q.id == id && category.map_or(true, |c| q.category == c))
    }

    /// First question matching the given filters.
    pub fn pick(&self, category: Option<&str>, difficulty: Option<Difficulty>) -> Option<&Question> {
        self.questions.iter().find(|q| {
            category.map_or(true, |c| q.category == c)
                && difficulty.map_or(true, |d| q.difficulty == d)
        })
    }

    /// Distinct category slugs, in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for q in &self.questions {
            if !seen.contains(&q.category.as_str()) {
                seen.push(q.category.as_str());
            }
        }
        seen
    }
}

// Intermediate TOML structure for parsing question-set files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlCatalogHeader {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    category: String,
    difficulty: String,
    title: String,
    prompt: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    expected_minutes: Option<u32>,
}

/// Parse and validate a question set from TOML text.
pub fn parse_catalog_str(content: &str, origin: &str) -> Result<Catalog> {
    let file: TomlCatalogFile =
        toml::from_str(content).with_context(|| format!("failed to parse catalog: {origin}"))?;

    let mut questions = Vec::with_capacity(file.questions.len());
    let mut seen = std::collections::HashSet::new();
    for q in file.questions {
        let difficulty: Difficulty = q
            .difficulty
            .parse()
            .map_err(|e| anyhow::anyhow!("question '{}': {e}", q.id))?;
        anyhow::ensure!(
            !q.prompt.trim().is_empty(),
            "question '{}' has an empty prompt",
            q.id
        );
        anyhow::ensure!(
            seen.insert((q.category.clone(), q.id.clone())),
            "duplicate question id '{}' in category '{}'",
            q.id,
            q.category
        );
        questions.push(Question {
            id: q.id,
            category: q.category,
            difficulty,
            title: q.title,
            prompt: q.prompt,
            tags: q.tags,
            expected_minutes: q.expected_minutes,
        });
    }

    Ok(Catalog {
        id: file.catalog.id,
        name: file.catalog.name,
        questions,
    })
}

/// Load a catalog from `path`, or the built-in set when `None`.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read catalog: {}", p.display()))?;
            parse_catalog_str(&content, &p.display().to_string())
        }
        None => built_in(),
    }
}

/// The question set shipped with the binary.
pub fn built_in() -> Result<Catalog> {
    parse_catalog_str(BUILT_IN_CATALOG, "built-in catalog")
}

const BUILT_IN_CATALOG: &str = r#"[catalog]
id = "core-cs"
name = "Core CS Interview Set"

[[questions]]
id = "js-var-let-const"
category = "javascript"
difficulty = "easy"
title = "var, let, and const"
prompt = """
Explain the differences between var, let, and const, and when you would
reach for each. Include an example.
"""
tags = ["variables", "scope", "es6"]
expected_minutes = 8

[[questions]]
id = "js-closures"
category = "javascript"
difficulty = "medium"
title = "closures"
prompt = """
What is a closure, and how are closures used in real-world code? Walk
through a code example.
"""
tags = ["closures", "scope", "functions"]
expected_minutes = 12

[[questions]]
id = "js-event-loop"
category = "javascript"
difficulty = "hard"
title = "the event loop"
prompt = """
Describe the JavaScript event loop, and explain how the callback queue and
the microtask queue differ. Use an example.
"""
tags = ["event-loop", "async", "callbacks"]
expected_minutes = 18

[[questions]]
id = "py-gil"
category = "python"
difficulty = "medium"
title = "the GIL"
prompt = """
What is Python's global interpreter lock, and how does it shape your choice
between threads and processes?
"""
tags = ["concurrency", "cpython"]
expected_minutes = 12

[[questions]]
id = "os-process-thread"
category = "os"
difficulty = "easy"
title = "processes vs threads"
prompt = """
Compare processes and threads: what is shared, what is isolated, and what
does a context switch cost in each case?
"""
tags = ["processes", "threads", "scheduling"]
expected_minutes = 10

[[questions]]
id = "net-tcp-handshake"
category = "network"
difficulty = "medium"
title = "the TCP handshake"
prompt = """
Walk through the TCP three-way handshake. Why three messages, and what
state does each side hold afterwards?
"""
tags = ["tcp", "handshake"]
expected_minutes = 10

[[questions]]
id = "db-indexes"
category = "database"
difficulty = "medium"
title = "indexes"
prompt = """
When does an index speed up a query, and when does it hurt? Give an example
of each case.
"""
tags = ["indexes", "b-tree", "performance"]
expected_minutes = 12

[[questions]]
id = "algo-complexity"
category = "algorithm"
difficulty = "easy"
title = "time complexity"
prompt = """
Explain big-O notation and compare the growth of O(n), O(n log n), and
O(n^2) with example algorithms.
"""
tags = ["big-o", "analysis"]
expected_minutes = 8
"#;
