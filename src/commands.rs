use anyhow::{Context, Result, bail};
use chrono::Local;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chunking::chunk_text;
use crate::config::{Config, Credentials};
use crate::history::{ConversationLog, SessionStats};
use crate::index::{IndexStore, Metric};
use crate::pipeline::{Answer, AnswerError, Assistant};
use crate::provider::ProviderClient;

/// Questions offered at the start of a chat session
pub const SAMPLE_QUESTIONS: [&str; 5] = [
    "What is Nahiyan's background?",
    "What are his technical skills?",
    "What projects has he worked on?",
    "What are his interests?",
    "How can I contact him?",
];

/// Print the chunks a corpus file splits into
#[inline]
pub fn chunk_file(path: &Path, max_words: usize) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
    let chunks = chunk_text(&text, max_words)?;

    if chunks.is_empty() {
        println!("The corpus contains no words.");
        return Ok(());
    }

    for chunk in &chunks {
        println!(
            "{}",
            style(format!(
                "── Chunk {} ({} words) ──",
                chunk.position + 1,
                chunk.word_count
            ))
            .bold()
        );
        println!("{}", chunk.text);
        println!();
    }

    println!("{} chunk(s) of at most {} words", chunks.len(), max_words);
    Ok(())
}

/// Chunk a corpus file, embed every chunk, and persist the index
#[inline]
pub fn build_index(
    config: &Config,
    corpus: &Path,
    max_words: Option<usize>,
    metric: Option<Metric>,
) -> Result<()> {
    let max_words = max_words.unwrap_or(config.chunking.max_words);
    let metric = metric.unwrap_or(config.retrieval.metric);
    let index_path = config.index_path();

    let credentials = Credentials::from_env(&config.provider.api_key_env)?;
    let client = ProviderClient::new(&config.provider, credentials)?;

    let text = fs::read_to_string(corpus)
        .with_context(|| format!("Failed to read corpus file: {}", corpus.display()))?;
    let chunks = chunk_text(&text, max_words)?;

    if chunks.is_empty() {
        warn!("Corpus {} contains no words", corpus.display());
    }

    info!(
        "Indexing {} chunk(s) from {} into {}",
        chunks.len(),
        corpus.display(),
        index_path.display()
    );

    let bar = if console::user_attended_stderr() {
        ProgressBar::new(chunks.len() as u64).with_style(
            ProgressStyle::with_template("{bar:40} [{pos}/{len}] Embedding chunks {msg}")
                .context("Invalid progress bar template")?,
        )
    } else {
        ProgressBar::hidden()
    };

    let store = IndexStore::build_with_progress(&chunks, &client, metric, |done, _| {
        bar.set_position(done as u64);
    });
    bar.finish_and_clear();

    let store = store.context("Failed to build index")?;
    store
        .save(&index_path)
        .context("Failed to save index")?;

    println!(
        "{} Indexed {} chunk(s) ({} dimensions, {} metric) into {}",
        style("✓").green(),
        store.len(),
        store.dimension(),
        store.metric(),
        style(index_path.display()).cyan()
    );
    Ok(())
}

/// Answer several questions concurrently, printing results in the order asked.
///
/// Fails once every question has been printed if any of them could not be answered.
#[inline]
pub async fn ask_questions(config: &Config, questions: Vec<String>) -> Result<()> {
    let assistant = Arc::new(Assistant::from_config(config)?);
    let total = questions.len();

    let handles: Vec<_> = questions
        .into_iter()
        .map(|question| {
            let assistant = Arc::clone(&assistant);
            tokio::task::spawn_blocking(move || {
                let result = assistant.answer(&question);
                (question, result)
            })
        })
        .collect();

    let mut failures = 0;
    let mut out = io::stdout();
    for handle in handles {
        let (question, result) = handle.await.context("Answer task panicked")?;

        writeln!(out, "{} {}", style("Q:").bold().cyan(), question)?;
        match result {
            Ok(answer) => write_answer(&answer, &mut out)?,
            Err(e) => {
                failures += 1;
                write_failure(&e, &mut out)?;
            }
        }
        writeln!(out)?;
    }

    ensure_all_answered(failures, total)
}

fn ensure_all_answered(failures: usize, total: usize) -> Result<()> {
    if failures > 0 {
        bail!("{failures} of {total} question(s) could not be answered");
    }
    Ok(())
}

/// What a line typed into the chat session asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    History,
    Clear,
    Quit,
    Empty,
}

impl ChatInput {
    /// Interpret a line of input; a bare number selects a sample question
    #[inline]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "exit" | "q" => Self::Quit,
            "history" => Self::History,
            "clear" => Self::Clear,
            _ => line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| SAMPLE_QUESTIONS.get(i))
                .map_or_else(
                    || Self::Question(line.to_string()),
                    |q| Self::Question((*q).to_string()),
                ),
        }
    }
}

/// Conversation state for one chat session
pub struct ChatSession<'a> {
    assistant: &'a Assistant,
    log: ConversationLog,
    stats: SessionStats,
}

impl<'a> ChatSession<'a> {
    #[inline]
    pub fn new(assistant: &'a Assistant) -> Self {
        Self {
            assistant,
            log: ConversationLog::new(),
            stats: SessionStats::start(),
        }
    }

    /// Act on one line of input. Returns `false` once the session should end.
    #[inline]
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        let query = match ChatInput::parse(line) {
            ChatInput::Quit => return Ok(false),
            ChatInput::Empty => return Ok(true),
            ChatInput::History => {
                write_history(&self.log, out)?;
                return Ok(true);
            }
            ChatInput::Clear => {
                self.log = ConversationLog::new();
                self.stats = SessionStats::start();
                writeln!(out, "History cleared.")?;
                return Ok(true);
            }
            ChatInput::Question(query) => query,
        };

        match self.assistant.answer(&query) {
            Ok(answer) => {
                write_answer(&answer, out)?;
                self.log.record(&query, &answer);
                self.stats.record_query();
            }
            Err(e) => write_failure(&e, out)?,
        }

        writeln!(out, "{}", style(self.stats.summary(Local::now())).dim())?;
        writeln!(out)?;
        Ok(true)
    }

    #[inline]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    #[inline]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

/// Feed every line of `input` to the session until it ends or input runs out
#[inline]
pub fn chat_over_lines<R: BufRead, W: Write>(
    session: &mut ChatSession<'_>,
    input: R,
    out: &mut W,
) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read chat input")?;
        if !session.handle_line(&line, out)? {
            break;
        }
    }
    Ok(())
}

/// Question and answer session, interactive on a terminal and line-oriented otherwise
#[inline]
pub fn run_chat(config: &Config) -> Result<()> {
    let assistant = Assistant::from_config(config)?;

    eprintln!(
        "{}",
        style(format!("💬 Ask me anything about {}", config.prompt.subject))
            .bold()
            .cyan()
    );
    eprintln!(
        "Answers draw on up to {} of {} indexed passages.",
        assistant.top_k(),
        assistant.index().len()
    );
    eprintln!("Sample questions:");
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, question);
    }
    eprintln!(
        "{}",
        style(
            "Type a number to ask a sample question, 'history' to review, 'clear' to start over, 'quit' to leave."
        )
        .dim()
    );
    eprintln!();

    let mut session = ChatSession::new(&assistant);
    let mut out = io::stdout();

    if console::user_attended() {
        loop {
            let line: String = Input::new()
                .with_prompt("You")
                .allow_empty(true)
                .interact_text()?;

            if !session.handle_line(&line, &mut out)? {
                break;
            }
        }
    } else {
        chat_over_lines(&mut session, io::stdin().lock(), &mut out)?;
    }

    eprintln!("{}", session.stats().summary(Local::now()));
    Ok(())
}

fn write_answer<W: Write>(answer: &Answer, out: &mut W) -> io::Result<()> {
    writeln!(out, "{} {}", style("A:").bold().green(), answer.answer)?;

    if !answer.sources.is_empty() {
        writeln!(out, "{}", style("Sources:").dim())?;
        for (i, source) in answer.sources.iter().enumerate() {
            writeln!(out, "  [Source {}] {}", i + 1, source)?;
        }
    }
    Ok(())
}

fn write_failure<W: Write>(e: &AnswerError, out: &mut W) -> io::Result<()> {
    error!("Failed to answer question: {}", e);
    writeln!(out, "{}", style(e.user_message()).red())
}

fn write_history<W: Write>(log: &ConversationLog, out: &mut W) -> io::Result<()> {
    if log.is_empty() {
        return writeln!(out, "No questions answered yet.");
    }

    writeln!(out, "{} exchange(s), newest first:", log.len())?;
    for record in log.newest_first() {
        writeln!(
            out,
            "{} {}",
            style(record.timestamp.format("%H:%M:%S")).dim(),
            style(&record.query).bold()
        )?;
        writeln!(out, "  {}", record.answer)?;
    }
    writeln!(out)
}
