//! Confirmation prompts.

use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Asks the operator before a destructive step.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, question: &str) -> Result<bool>;
}

/// Answers yes without asking (`--yes`).
pub struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, question: &str) -> Result<bool> {
        log::info!("{question} yes (--yes)");
        Ok(true)
    }
}

/// Asks on stderr and reads answers line by line from one shared reader.
/// Only `y`/`yes` confirm; end of input declines.
pub struct LinePrompt<R> {
    lines: Mutex<Lines<R>>,
}

/// [`LinePrompt`] over the process stdin.
pub type StdinPrompt = LinePrompt<BufReader<Stdin>>;

impl<R: AsyncBufRead + Unpin + Send> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

impl StdinPrompt {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Confirm for LinePrompt<R> {
    async fn confirm(&self, question: &str) -> Result<bool> {
        // Held across the read so concurrent prompts take lines in turn.
        let mut lines = self.lines.lock().await;
        eprint!("{question} [y/N] ");
        std::io::stderr().flush().context("Failed to write prompt")?;

        let answer = lines
            .next_line()
            .await
            .context("Failed to read confirmation")?
            .unwrap_or_default();
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
