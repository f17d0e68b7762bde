//! Interactive question loop

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use research_assistant_agent::{Command, Reply, ReplyKind, ResearchAssistant, TurnError};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Prompt shown before every question
pub const QUESTION_PROMPT: &str = "Enter your question (or 'exit' to quit, '/summary', '/save'): ";

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `exit` or `quit` was entered
    Command,
    /// Input was closed
    EndOfInput,
    /// Interrupted while waiting for input
    Interrupted,
}

enum Input {
    Line(String),
    EndOfInput,
    Interrupted,
}

/// Reads commands line by line and drives the assistant
pub struct Repl<R, W> {
    lines: Lines<R>,
    out: W,
    spinner: bool,
    interrupt: Arc<Notify>,
}

impl<R, W> Repl<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Create a loop over `input`, printing to `out`
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            spinner: false,
            interrupt: Arc::new(Notify::new()),
        }
    }

    /// Use `interrupt` as the interrupt signal. Each `notify_one` cancels
    /// the pending read or model call.
    pub fn with_interrupt(mut self, interrupt: Arc<Notify>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Show a spinner on stderr while waiting for the model
    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    /// Run until `exit`, end of input or an interrupt
    pub async fn run(&mut self, assistant: &mut ResearchAssistant) -> anyhow::Result<LoopExit> {
        loop {
            write!(self.out, "\n{}", style(QUESTION_PROMPT).bold())?;
            self.out.flush()?;

            let line = match self.read_line().await? {
                Input::Line(line) => line,
                Input::EndOfInput => {
                    info!("Input closed, stopping");
                    writeln!(self.out)?;
                    return Ok(LoopExit::EndOfInput);
                }
                Input::Interrupted => {
                    info!("Interrupted, stopping");
                    writeln!(self.out)?;
                    return Ok(LoopExit::Interrupted);
                }
            };

            match Command::parse(&line) {
                Command::Exit => {
                    writeln!(self.out, "{}", style("Goodbye!").green())?;
                    return Ok(LoopExit::Command);
                }
                Command::Summary => {
                    let outcome = self.wait_for_model(assistant.summarize()).await;
                    self.show_outcome(outcome)?;
                }
                Command::Save => {
                    if let Some(exit) = self.save(assistant).await? {
                        return Ok(exit);
                    }
                }
                command @ Command::Question(_) if command.is_empty_question() => {
                    self.show_outcome(Some(Err(TurnError::EmptyInput)))?;
                }
                Command::Question(question) => {
                    let outcome = self.wait_for_model(assistant.ask(&question)).await;
                    self.show_outcome(outcome)?;
                }
            }
        }
    }

    async fn read_line(&mut self) -> std::io::Result<Input> {
        tokio::select! {
            biased;
            _ = self.interrupt.notified() => Ok(Input::Interrupted),
            line = self.lines.next_line() => Ok(match line? {
                Some(line) => Input::Line(line),
                None => Input::EndOfInput,
            }),
        }
    }

    /// Await a turn. `None` means an interrupt cancelled it.
    async fn wait_for_model<F>(&self, turn: F) -> Option<Result<Reply, TurnError>>
    where
        F: Future<Output = Result<Reply, TurnError>>,
    {
        let spinner = self.spinner.then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_message("Thinking...");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });

        let outcome = tokio::select! {
            biased;
            _ = self.interrupt.notified() => None,
            outcome = turn => Some(outcome),
        };

        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }
        outcome
    }

    fn show_outcome(&mut self, outcome: Option<Result<Reply, TurnError>>) -> std::io::Result<()> {
        match outcome {
            Some(Ok(reply)) => {
                let label = match reply.kind {
                    ReplyKind::Answer => "Answer:",
                    ReplyKind::Summary => "Session Summary:",
                };
                writeln!(self.out, "\n{}\n{}", style(label).cyan().bold(), reply.content)?;
                if let Some(e) = reply.report_error {
                    writeln!(
                        self.out,
                        "{}",
                        style(format!("Could not update the report: {}", e)).yellow()
                    )?;
                }
            }
            Some(Err(TurnError::EmptyInput)) => {
                writeln!(self.out, "{}", TurnError::EmptyInput.user_message())?;
            }
            Some(Err(e)) => {
                writeln!(self.out, "{}", style(e.user_message()).red())?;
                if let Some(kind) = e.model_error_kind() {
                    writeln!(self.out, "({})", kind.describe())?;
                }
            }
            None => {
                warn!("Model call interrupted");
                writeln!(
                    self.out,
                    "{}",
                    style(research_assistant_agent::MODEL_FAILURE_MESSAGE).red()
                )?;
                writeln!(self.out, "(interrupted)")?;
            }
        }
        Ok(())
    }

    /// Ask for a destination and save. Returns an exit reason if the user
    /// interrupted the prompt.
    async fn save(&mut self, assistant: &ResearchAssistant) -> anyhow::Result<Option<LoopExit>> {
        let default_path = assistant.default_session_path().to_path_buf();
        write!(
            self.out,
            "Enter filename to save session (default: {}): ",
            default_path.display()
        )?;
        self.out.flush()?;

        let path = match self.read_line().await? {
            Input::Line(line) if !line.trim().is_empty() => PathBuf::from(line.trim()),
            Input::Line(_) | Input::EndOfInput => default_path,
            Input::Interrupted => {
                writeln!(self.out)?;
                return Ok(Some(LoopExit::Interrupted));
            }
        };

        match assistant.save_session(Some(&path)) {
            Ok(path) => {
                writeln!(
                    self.out,
                    "{}",
                    style(format!("Session saved to {}", path.display())).green()
                )?;
            }
            Err(e) => {
                error!(path = %path.display(), "Failed to save session: {}", e);
                writeln!(
                    self.out,
                    "{}",
                    style(format!("Could not save the session: {}", e)).red()
                )?;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_assistant_agent::{
        ContextBuilder, ModelSettings, EMPTY_INPUT_MESSAGE, MODEL_FAILURE_MESSAGE,
    };
    use research_assistant_core::report::ReportWriter;
    use research_assistant_core::session::{Message, Role, SessionManager};
    use research_assistant_providers::{LLMProvider, LLMResponse, ProviderError, ProviderResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::io::{AsyncWriteExt, BufReader};

    /// Echoes the last user message. Fails on "fail"; on "hang" it fires
    /// the interrupt and never answers.
    struct EchoProvider {
        calls: AtomicUsize,
        interrupt: Option<Arc<Notify>>,
    }

    impl EchoProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                interrupt: None,
            })
        }

        fn interrupting(interrupt: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                interrupt: Some(interrupt),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn chat(
            &self,
            messages: &[Message],
            _model: Option<String>,
            _max_tokens: u32,
            _temperature: f32,
        ) -> ProviderResult<LLMResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            if last.contains("fail") {
                return Err(ProviderError::InvalidResponse("scripted failure".to_string()));
            }
            if last.contains("hang") {
                if let Some(interrupt) = &self.interrupt {
                    interrupt.notify_one();
                }
                std::future::pending::<()>().await;
            }
            Ok(LLMResponse::text(format!("echo: {}", last)))
        }

        fn get_default_model(&self) -> String {
            "echo".to_string()
        }
    }

    fn assistant(dir: &TempDir, provider: Arc<EchoProvider>) -> ResearchAssistant {
        let context = ContextBuilder::new("sys", "summarize");
        ResearchAssistant::new(
            provider,
            ModelSettings {
                model: "echo".to_string(),
                max_tokens: 64,
                temperature: 0.0,
            },
            context.clone(),
            context.fresh_conversation(),
            ReportWriter::new(dir.path().join("report.md")),
            SessionManager::new(dir.path().join("session.json")),
        )
    }

    async fn run_with<R: AsyncBufRead + Unpin>(
        input: R,
        interrupt: Arc<Notify>,
        assistant: &mut ResearchAssistant,
    ) -> (LoopExit, String) {
        let mut out = Vec::new();
        let exit = Repl::new(input, &mut out)
            .with_interrupt(interrupt)
            .run(assistant)
            .await
            .unwrap();
        (exit, String::from_utf8(out).unwrap())
    }

    async fn run_script(script: &str, assistant: &mut ResearchAssistant) -> (LoopExit, String) {
        run_with(script.as_bytes(), Arc::new(Notify::new()), assistant).await
    }

    #[tokio::test]
    async fn test_question_then_exit() {
        let dir = TempDir::new().unwrap();
        let provider = EchoProvider::new();
        let mut assistant = assistant(&dir, provider.clone());

        let (exit, output) = run_script("What is Rust?\nexit\n", &mut assistant).await;

        assert_eq!(exit, LoopExit::Command);
        assert!(output.contains("echo: What is Rust?"));
        assert!(output.contains("Goodbye!"));
        assert_eq!(assistant.conversation().len(), 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exit_appends_nothing() {
        let dir = TempDir::new().unwrap();
        let provider = EchoProvider::new();
        let mut assistant = assistant(&dir, provider.clone());

        let (exit, _) = run_script("QUIT\nnever asked\n", &mut assistant).await;

        assert_eq!(exit, LoopExit::Command);
        assert_eq!(assistant.conversation().len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_line_prompts_again() {
        let dir = TempDir::new().unwrap();
        let provider = EchoProvider::new();
        let mut assistant = assistant(&dir, provider.clone());

        let (exit, output) = run_script("\n   \n", &mut assistant).await;

        assert_eq!(exit, LoopExit::EndOfInput);
        assert_eq!(output.matches(EMPTY_INPUT_MESSAGE).count(), 2);
        assert_eq!(assistant.conversation().len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_loop_continues() {
        let dir = TempDir::new().unwrap();
        let mut assistant = assistant(&dir, EchoProvider::new());

        let (_, output) = run_script("please fail\nsecond\nexit\n", &mut assistant).await;

        assert!(output.contains(MODEL_FAILURE_MESSAGE));
        assert!(output.contains("malformed response"));
        assert!(output.contains("echo: second"));
        assert_eq!(assistant.conversation().count(Role::User), 2);
        assert_eq!(assistant.conversation().count(Role::Assistant), 1);
    }

    #[tokio::test]
    async fn test_summary_and_save() {
        let dir = TempDir::new().unwrap();
        let mut assistant = assistant(&dir, EchoProvider::new());
        let custom = dir.path().join("custom").join("snapshot.json");

        let script = format!("q1\n/summary\n/save\n\n/save\n{}\nexit\n", custom.display());
        let (_, output) = run_script(&script, &mut assistant).await;

        assert!(output.contains("Session Summary:"));
        assert!(output.contains("echo: summarize"));
        assert!(output.contains("Session saved to"));

        let manager = SessionManager::new(dir.path().join("session.json"));
        let default_saved = manager.load(dir.path().join("session.json")).unwrap();
        let custom_saved = manager.load(&custom).unwrap();
        assert_eq!(default_saved.len(), 5);
        assert_eq!(&custom_saved, assistant.conversation());

        let report = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert_eq!(report.matches("### Timestamp: ").count(), 2);
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt_stops_loop() {
        let dir = TempDir::new().unwrap();
        let provider = EchoProvider::new();
        let mut assistant = assistant(&dir, provider.clone());
        let interrupt = Arc::new(Notify::new());
        interrupt.notify_one();

        let (exit, _) = run_with("never asked\n".as_bytes(), interrupt, &mut assistant).await;

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(assistant.conversation().len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_interrupt_during_model_call_keeps_looping() {
        let dir = TempDir::new().unwrap();
        let interrupt = Arc::new(Notify::new());
        let provider = EchoProvider::interrupting(interrupt.clone());
        let mut assistant = assistant(&dir, provider.clone());

        let script = "please hang\nsecond\nexit\n";
        let (exit, output) = run_with(script.as_bytes(), interrupt, &mut assistant).await;

        assert_eq!(exit, LoopExit::Command);
        assert!(output.contains(MODEL_FAILURE_MESSAGE));
        assert!(output.contains("(interrupted)"));
        assert!(output.contains("echo: second"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        let messages = assistant.conversation().snapshot();
        assert_eq!(assistant.conversation().count(Role::User), 2);
        assert_eq!(assistant.conversation().count(Role::Assistant), 1);
        assert_eq!(messages[1].content, "please hang");

        let report = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert_eq!(report.matches("### Timestamp: ").count(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_at_save_prompt_skips_save() {
        let dir = TempDir::new().unwrap();
        let mut assistant = assistant(&dir, EchoProvider::new());
        let interrupt = Arc::new(Notify::new());

        // The writer stays open so the filename prompt waits for input
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"/save\n").await.unwrap();

        let trigger = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.notify_one();
        });

        let (exit, output) = run_with(BufReader::new(reader), interrupt, &mut assistant).await;

        assert_eq!(exit, LoopExit::Interrupted);
        assert!(output.contains("Enter filename to save session"));
        assert!(!output.contains("Session saved to"));
        assert!(!dir.path().join("session.json").exists());
        drop(writer);
    }
}
