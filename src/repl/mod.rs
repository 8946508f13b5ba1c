//! Interactive terminal front end
//!
//! Reads commands and prompts line by line, submits prompts through the
//! [`SessionClient`] and renders the assistant turn while it streams.
//! Ctrl-C during a response resets the session.

pub mod quick_picks;
pub mod render;

use std::io::Write;

use anyhow::bail;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::config::ReplSettings;
use crate::session::{SessionClient, SubmitOutcome};

pub use quick_picks::{QuickPick, QuickPickError};
pub use render::{tool_label, TranscriptRenderer};

const RULE_WIDTH: usize = 60;

/// Banner shown on start and for `help`
pub fn welcome_banner() -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let picks: String = QuickPick::ALL
        .iter()
        .map(|pick| format!("  {}. {}\n", pick.key(), pick.title()))
        .collect();

    format!(
        "\n{heavy}\n  PMM Deep Agent - Product Marketing Evaluator\n{heavy}\n\n\
         Evaluate positioning, messaging, and marketing assets\n\
         using proven PMM frameworks (April Dunford, Fletch PMM).\n\n\
         {light}\nQuick picks (type the number):\n\n{picks}\n{light}\n\
         Or just type a question in plain English.\n\
         Type '/compare <your-url> <competitor-url>...' for a landscape comparison,\n\
         'reset' to start over, 'help' for this list, 'quit' to exit.\n\
         {heavy}\n"
    )
}

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    Help,
    Reset,
    Empty,
    QuickPick(QuickPick),
    Compare { ours: String, competitors: Vec<String> },
    Invalid(String),
    Prompt(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" | "q" | "bye" => return ReplCommand::Quit,
            "help" | "?" | "h" => return ReplCommand::Help,
            "reset" | "new" => return ReplCommand::Reset,
            _ => {}
        }

        if let Some(pick) = QuickPick::from_key(line) {
            return ReplCommand::QuickPick(pick);
        }

        let mut words = line.split_whitespace();
        if words.next().is_some_and(|w| w.eq_ignore_ascii_case("/compare")) {
            let urls: Vec<String> = words.map(str::to_string).collect();
            return match urls.split_first() {
                Some((ours, competitors)) if !competitors.is_empty() => ReplCommand::Compare {
                    ours: ours.clone(),
                    competitors: competitors.to_vec(),
                },
                _ => ReplCommand::Invalid(
                    "Usage: /compare <your-url> <competitor-url> [more competitor urls]".to_string(),
                ),
            };
        }

        ReplCommand::Prompt(line.to_string())
    }
}

/// Submit one prompt and render the reply as it streams
///
/// Ctrl-C while the reply streams resets the session.
pub async fn stream_prompt<W: Write>(
    client: &SessionClient,
    renderer: &mut TranscriptRenderer<W>,
    prompt: &str,
) -> anyhow::Result<SubmitOutcome> {
    renderer.line("\nAnalyzing...\n")?;

    let mut updates = client.subscribe();
    updates.borrow_and_update();

    let submit = client.submit(prompt);
    tokio::pin!(submit);

    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            changed = updates.changed() => {
                if changed.is_err() {
                    break (&mut submit).await;
                }
                let snapshot = updates.borrow_and_update().clone();
                renderer.update(&snapshot)?;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, resetting session");
                client.reset().await;
            }
        }
    };

    match &outcome {
        SubmitOutcome::Completed => renderer.finish(&client.snapshot().await)?,
        SubmitOutcome::Failed(message) => {
            renderer.abandon();
            renderer.error(message)?;
        }
        SubmitOutcome::Discarded => {
            renderer.abandon();
            renderer.line("\nResponse cancelled. Started a new conversation.\n")?;
        }
        SubmitOutcome::Ignored => {}
    }

    Ok(outcome)
}

/// Send a single prompt and fail unless the reply completes
pub async fn run_once<W: Write>(
    client: &SessionClient,
    renderer: &mut TranscriptRenderer<W>,
    prompt: &str,
) -> anyhow::Result<()> {
    match stream_prompt(client, renderer, prompt).await? {
        SubmitOutcome::Completed => Ok(()),
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Discarded => bail!("The response was cancelled."),
        SubmitOutcome::Ignored => bail!("Nothing to send."),
    }
}

/// What the quick-pick questions produced
#[derive(Debug, PartialEq, Eq)]
enum Answers {
    Prompt(String),
    Nothing,
    Quit,
}

/// Line-oriented chat loop
pub struct Repl<R, W: Write> {
    client: SessionClient,
    input: Lines<R>,
    renderer: TranscriptRenderer<W>,
}

impl<R, W> Repl<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(client: SessionClient, input: R, out: W, settings: &ReplSettings) -> Self {
        Self {
            client,
            input: input.lines(),
            renderer: TranscriptRenderer::new(out, settings.show_tool_args),
        }
    }

    /// Run until the user quits or input ends
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.renderer.line(&welcome_banner())?;

        loop {
            self.renderer.prompt("You: ")?;
            let Some(line) = self.read_line().await? else {
                break;
            };

            match ReplCommand::parse(&line) {
                ReplCommand::Quit => break,
                ReplCommand::Empty => continue,
                ReplCommand::Help => self.renderer.line(&welcome_banner())?,
                ReplCommand::Reset => {
                    self.client.reset().await;
                    self.renderer.line("Started a new conversation.\n")?;
                }
                ReplCommand::QuickPick(pick) => match self.ask(pick).await? {
                    Answers::Prompt(prompt) => self.send(&prompt).await?,
                    Answers::Nothing => {}
                    Answers::Quit => break,
                },
                ReplCommand::Compare { ours, competitors } => {
                    self.send(&quick_picks::compare_prompt(&ours, &competitors))
                        .await?;
                }
                ReplCommand::Invalid(usage) => self.renderer.line(&usage)?,
                ReplCommand::Prompt(text) => self.send(&text).await?,
            }
        }

        self.renderer.line("\nGoodbye!")?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.renderer.into_inner()
    }

    async fn send(&mut self, prompt: &str) -> anyhow::Result<()> {
        let outcome = stream_prompt(&self.client, &mut self.renderer, prompt).await?;
        if matches!(outcome, SubmitOutcome::Failed(_)) {
            self.renderer
                .line("Try a different question, or type 'help' for examples.\n")?;
        }
        Ok(())
    }

    /// Ask the pick's questions in order
    ///
    /// End of input or Ctrl-C while answering quits the loop.
    async fn ask(&mut self, pick: QuickPick) -> anyhow::Result<Answers> {
        let mut answers = Vec::new();
        for question in pick.questions() {
            self.renderer.prompt(question.label)?;
            let Some(answer) = self.read_line().await? else {
                return Ok(Answers::Quit);
            };
            let answer = answer.trim().to_string();
            let missing = question.required && answer.is_empty();
            answers.push(answer);
            if missing {
                break;
            }
        }

        match pick.build_prompt(&answers) {
            Ok(prompt) => Ok(Answers::Prompt(prompt)),
            Err(e) => {
                self.renderer.line(&e.to_string())?;
                Ok(Answers::Nothing)
            }
        }
    }

    /// Next input line; `None` on end of input or Ctrl-C
    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        tokio::select! {
            line = self.input.next_line() => Ok(line?),
            _ = tokio::signal::ctrl_c() => Ok(None),
        }
    }
}
