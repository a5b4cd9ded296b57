use super::lines::LineSplitter;
use super::relay::ChannelRelay;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

/// Questions that precede a confirmation prompt
const CONFIRMATION_QUESTIONS: &[&str] = &[
    "Do you want to perform these actions?",
    "Do you really want to destroy",
];

/// The input marker printed (without newline) when the process waits
const INPUT_MARKER: &str = "Enter a value:";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("empty command provided")]
    EmptyCommand,
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// What to run and where
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub envs: HashMap<String, String>,
}

impl ProcessSpec {
    /// Split a whitespace-separated command string into program and args
    pub fn from_command(command: &str, working_dir: &Path) -> Result<Self, ProcessError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ProcessError::EmptyCommand)?;

        Ok(Self {
            program,
            args: parts.collect(),
            working_dir: working_dir.to_path_buf(),
            envs: HashMap::new(),
        })
    }

    pub fn with_envs(mut self, envs: HashMap<String, String>) -> Self {
        self.envs.extend(envs);
        self
    }

    /// Rendered command line, for display
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Events observed on a running process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// One newline-stripped output line (stdout or stderr)
    Line(String),
    /// The process is waiting for the confirmation answer
    PromptReady,
    /// The process exited with this code (-1 when killed by a signal)
    Exited(i32),
}

/// Tracks whether the output has reached a confirmation prompt
#[derive(Debug, Default)]
pub struct PromptDetector {
    question_seen: bool,
}

impl PromptDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a line. Returns true once per prompt, when the input marker
    /// follows a confirmation question.
    pub fn observe(&mut self, line: &str) -> bool {
        let line = crate::plan::strip_ansi(line);

        if CONFIRMATION_QUESTIONS.iter().any(|q| line.contains(q)) {
            self.question_seen = true;
        }

        if self.question_seen && line.contains(INPUT_MARKER) {
            self.question_seen = false;
            return true;
        }

        false
    }

    /// Whether a partial line would complete a prompt, without consuming it
    fn would_prompt(&self, partial: &str) -> bool {
        self.question_seen && crate::plan::strip_ansi(partial).contains(INPUT_MARKER)
    }
}

/// Handle on a spawned apply process
pub struct PlanProcess {
    input: UnboundedSender<String>,
    pid: Option<u32>,
}

impl PlanProcess {
    /// Start the process and its I/O tasks. Must be called inside a tokio runtime.
    pub fn spawn(
        spec: &ProcessSpec,
    ) -> Result<(Self, UnboundedReceiver<ProcessEvent>), ProcessError> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .envs(&spec.envs)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let pid = child.id();
        tracing::debug!(command = %spec.display(), ?pid, "Spawned process");

        let (events_tx, events_rx) = unbounded_channel();
        let (input_tx, input_rx) = unbounded_channel();
        let (exited_tx, exited_rx) = oneshot::channel();

        // Without stdin the receiver is dropped here and every relay fails
        let writer_task = child
            .stdin
            .take()
            .map(|stdin| tokio::spawn(write_input(stdin, input_rx, exited_rx)));

        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| tokio::spawn(read_stdout(stdout, events_tx.clone())));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(read_stderr(stderr, events_tx.clone())));

        tokio::spawn(async move {
            // Drain both pipes first so Exited is always the last event
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                let _ = task.await;
            }

            let code = match child.wait().await {
                Ok(status) => status.code().unwrap_or(-1),
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to wait for process");
                    -1
                }
            };
            tracing::debug!(code, "Process exited");

            // Close the input channel before announcing the exit, so a relay
            // after Exited reports the process as unreachable
            let _ = exited_tx.send(());
            if let Some(task) = writer_task {
                let _ = task.await;
            }
            let _ = events_tx.send(ProcessEvent::Exited(code));
        });

        Ok((
            Self {
                input: input_tx,
                pid,
            },
            events_rx,
        ))
    }

    /// Relay writing confirmation answers to this process
    pub fn relay(&self) -> ChannelRelay {
        ChannelRelay::new(self.input.clone())
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

/// Forward relayed answers to the child's stdin until the child exits or a
/// write fails. Returning drops `input`, which closes every relay.
async fn write_input(
    mut stdin: ChildStdin,
    mut input: UnboundedReceiver<String>,
    mut exited: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            text = input.recv() => {
                let Some(text) = text else { break };
                if let Err(err) = write_text(&mut stdin, &text).await {
                    tracing::warn!(error = %err, "Failed to write to process input");
                    break;
                }
            }
            _ = &mut exited => {
                tracing::debug!("Process exited, closing its input");
                break;
            }
        }
    }
}

async fn write_text(stdin: &mut ChildStdin, text: &str) -> std::io::Result<()> {
    stdin.write_all(text.as_bytes()).await?;
    stdin.flush().await
}

async fn read_stdout<R: AsyncRead + Unpin>(mut stdout: R, events: UnboundedSender<ProcessEvent>) {
    let mut splitter = LineSplitter::new();
    let mut detector = PromptDetector::new();
    let mut buf = [0u8; 4096];

    loop {
        let read = match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read process output");
                break;
            }
        };

        for line in splitter.push(&buf[..read]) {
            let prompt = detector.observe(&line);
            let _ = events.send(ProcessEvent::Line(line));
            if prompt {
                let _ = events.send(ProcessEvent::PromptReady);
            }
        }

        if detector.would_prompt(&splitter.partial()) {
            if let Some(line) = splitter.take_partial() {
                detector.observe(&line);
                let _ = events.send(ProcessEvent::Line(line));
                let _ = events.send(ProcessEvent::PromptReady);
            }
        }
    }

    if let Some(line) = splitter.take_partial() {
        let _ = events.send(ProcessEvent::Line(line));
    }
}

async fn read_stderr<R: AsyncRead + Unpin>(stderr: R, events: UnboundedSender<ProcessEvent>) {
    let mut lines = BufReader::new(stderr).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let _ = events.send(ProcessEvent::Line(line));
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read process error output");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_command() {
        let spec = ProcessSpec::from_command("tofu apply -no-color", Path::new("/tmp")).unwrap();
        assert_eq!(spec.program, "tofu");
        assert_eq!(spec.args, vec!["apply", "-no-color"]);
        assert_eq!(spec.display(), "tofu apply -no-color");
    }

    #[test]
    fn test_spec_from_empty_command() {
        let result = ProcessSpec::from_command("   ", Path::new("."));
        assert!(matches!(result, Err(ProcessError::EmptyCommand)));
    }

    #[test]
    fn test_detector_requires_question() {
        let mut detector = PromptDetector::new();

        // Variable prompts also print "Enter a value:"
        assert!(!detector.observe("var.region"));
        assert!(!detector.observe("  Enter a value: "));

        assert!(!detector.observe("Do you want to perform these actions?"));
        assert!(!detector.observe("  Only 'yes' will be accepted to approve."));
        assert!(detector.observe("  Enter a value: "));

        // Fires once per prompt
        assert!(!detector.observe("  Enter a value: "));
    }

    #[tokio::test]
    async fn test_stdout_reader_emits_prompt_for_partial_line() {
        let output: &[u8] =
            b"Plan: 1 to add, 0 to change, 0 to destroy.\nDo you want to perform these actions?\n  Enter a value: ";
        let (tx, mut rx) = unbounded_channel();

        read_stdout(output, tx).await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                ProcessEvent::Line("Plan: 1 to add, 0 to change, 0 to destroy.".to_string()),
                ProcessEvent::Line("Do you want to perform these actions?".to_string()),
                ProcessEvent::Line("  Enter a value: ".to_string()),
                ProcessEvent::PromptReady,
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_relays_answer() {
        let script = "printf 'Do you want to perform these actions?\\n  Enter a value: '; read answer; echo \"got $answer\"";
        let spec = ProcessSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: PathBuf::from("."),
            envs: HashMap::new(),
        };

        let (process, mut events) = PlanProcess::spawn(&spec).unwrap();
        let relay = process.relay();
        let mut lines = Vec::new();

        while let Some(event) = events.recv().await {
            match event {
                ProcessEvent::Line(line) => lines.push(line),
                ProcessEvent::PromptReady => {
                    use crate::process::{ConfirmationRelay, ConfirmationToken};
                    relay.send_confirmation(ConfirmationToken::Yes).unwrap();
                }
                ProcessEvent::Exited(code) => {
                    assert_eq!(code, 0);
                    break;
                }
            }
        }

        assert_eq!(lines.last().map(String::as_str), Some("got yes"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relay_fails_after_exit() {
        use crate::process::{ConfirmationRelay, ConfirmationToken, RelayError};
        use crate::review::{Decision, ReviewConfig, ReviewError, ReviewSession};

        let script = "printf 'Do you want to perform these actions?\\n  Enter a value: '; exit 0";
        let spec = ProcessSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: PathBuf::from("."),
            envs: HashMap::new(),
        };

        let (process, mut events) = PlanProcess::spawn(&spec).unwrap();
        let relay = process.relay();

        while let Some(event) = events.recv().await {
            if event == ProcessEvent::Exited(0) {
                break;
            }
        }

        let result = relay.send_confirmation(ConfirmationToken::Yes);
        assert!(matches!(result, Err(RelayError::Closed)));

        // Approving still decides, but the failure reaches the caller
        let plan = std::sync::Arc::new(crate::plan::ParsedPlan::default());
        let mut session = ReviewSession::new(plan, ReviewConfig::default());
        let err = session.approve(&relay).unwrap_err();
        assert!(matches!(
            err,
            ReviewError::RelayFailure {
                token: ConfirmationToken::Yes,
                ..
            }
        ));
        assert_eq!(session.decision(), Decision::Approved);
    }
}
