//! The `prepdrill practice` command: one full answer session in the
//! terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};

use prepdrill_core::feedback::{FeedbackConfig, FeedbackGenerator};
use prepdrill_core::model::{Difficulty, Modality, Question};
use prepdrill_core::recording::{RecordingState, ScriptedCaptureDevice, MAX_CAPTURE};
use prepdrill_core::report::FeedbackReport;
use prepdrill_core::session::{SessionConfig, SessionController};
use prepdrill_core::traits::{CaptureDevice, DraftStore};
use prepdrill_providers::{configured_reviewer, load_config_from};
use prepdrill_store::{default_draft_dir, FsDraftStore};

use crate::catalog;

pub async fn execute(
    category: Option<String>,
    difficulty: Option<String>,
    question_id: Option<String>,
    modality: String,
    drafts_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
) -> Result<()> {
    let modality: Modality = modality.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let difficulty: Option<Difficulty> = difficulty
        .map(|d| d.parse().map_err(|e: String| anyhow::anyhow!(e)))
        .transpose()?;

    let config = load_config_from(config_path.as_deref())?;
    let reviewer = configured_reviewer(&config)?;
    match &reviewer {
        Some(r) => eprintln!("Feedback: remote ({})", r.name()),
        None => eprintln!("Feedback: local (no API key configured)"),
    }
    let generator = FeedbackGenerator::new(
        reviewer,
        FeedbackConfig {
            request_timeout: config.request_timeout(),
        },
    );

    let draft_root = drafts_dir
        .or_else(|| config.draft_dir.clone())
        .unwrap_or_else(default_draft_dir);
    let store: Arc<dyn DraftStore> = Arc::new(FsDraftStore::new(draft_root));

    let catalog = catalog::load_catalog(catalog_path.as_deref())?;
    let question = match &question_id {
        Some(id) => catalog.find(id, category.as_deref()),
        None => catalog.pick(category.as_deref(), difficulty),
    }
    .cloned()
    .context("no question matches the given filters; see `prepdrill questions`")?;

    // The terminal has no microphone or camera access; non-text modalities
    // run against the synthetic capture device.
    let device: Arc<dyn CaptureDevice> = Arc::new(ScriptedCaptureDevice::new(vec![0; 4096]));

    print_question(&question);

    let mut session = SessionController::begin(
        question,
        modality,
        store,
        device,
        generator,
        SessionConfig::default(),
    )
    .await?;

    if !session.attempt().text_content.is_empty() {
        eprintln!(
            "Restored a saved draft ({} chars); submitting continues from it.\n",
            session.attempt().text_content.len()
        );
    }

    let report = match modality {
        Modality::Text => run_text_session(&mut session).await?,
        Modality::Audio | Modality::Video => run_capture_session(&mut session, modality).await?,
    };

    print_report(&report);
    Ok(())
}

/// Read answer lines until a blank line or EOF, ticking the session at the
/// timer cadence in between, then submit.
async fn run_text_session(session: &mut SessionController) -> Result<FeedbackReport> {
    eprintln!("Type your answer; finish with an empty line or Ctrl-D.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = session.ticker();
    let mut answer = session.attempt().text_content.clone();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() && !answer.is_empty() => break,
                    Some(line) => {
                        if !answer.is_empty() {
                            answer.push('\n');
                        }
                        answer.push_str(&line);
                        session.edit(&answer);
                        print_status(session);
                    }
                    None => break,
                }
            }
            _ = ticker.next() => {
                session.tick().await;
                print_status(session);
            }
        }
    }
    drop(ticker);

    submit(session).await
}

/// Drive a capture session: recording stops on Enter/EOF or at the capture
/// bound, whichever comes first, then submit.
async fn run_capture_session(
    session: &mut SessionController,
    modality: Modality,
) -> Result<FeedbackReport> {
    eprintln!(
        "Recording {modality} (auto-stops after {}s). Press Enter to stop.\n",
        MAX_CAPTURE.as_secs()
    );
    session.start_recording().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = session.ticker();

    while session.recording_state() == RecordingState::Capturing {
        tokio::select! {
            _ = lines.next_line() => {
                if session.recording_state() == RecordingState::Capturing {
                    session.stop_recording().await?;
                }
            }
            _ = ticker.next() => {
                session.tick().await;
                print_status(session);
            }
        }
    }
    drop(ticker);

    submit(session).await
}

async fn submit(session: &mut SessionController) -> Result<FeedbackReport> {
    eprintln!();
    match session.submit().await {
        Ok(report) => Ok(report),
        Err(e) => {
            session.abandon().await;
            Err(anyhow::Error::new(e).context("submission rejected"))
        }
    }
}

fn print_question(question: &Question) {
    println!(
        "\n[{} · {}] {}",
        question.category, question.difficulty, question.title
    );
    if !question.tags.is_empty() {
        println!("tags: {}", question.tags.join(", "));
    }
    if let Some(minutes) = question.expected_minutes {
        println!("expected time: ~{minutes} min");
    }
    println!("\n{}\n", question.prompt.trim());
}

fn print_status(session: &SessionController) {
    let score = session.score();
    eprint!(
        "\r  {:>4}s · score {:>3} · {:>3} words ",
        session.elapsed_seconds(),
        score.value,
        score.word_count
    );
}

fn print_report(report: &FeedbackReport) {
    println!("\nAttempt complete!\n");
    println!(
        "Total score: {} · {}/5 stars · {} grade",
        report.total_score, report.star_rating, report.grade
    );

    let mut table = Table::new();
    table.set_header(vec!["Accuracy", "Clarity", "Completeness", "Examples"]);
    table.add_row(
        report
            .subscores
            .as_array()
            .iter()
            .map(|(_, value)| Cell::new(value))
            .collect::<Vec<_>>(),
    );
    println!("\n{table}\n");

    println!("Strengths:");
    for strength in &report.strengths {
        println!("  - {strength}");
    }
    println!("\nImprove:\n  {}", report.improvement_example);
    println!("\nFollow-up:\n  {}", report.follow_up_question);
    println!(
        "\n+{} XP · {}s spent · feedback source: {}",
        report.experience_gained, report.time_spent_seconds, report.source
    );
}
