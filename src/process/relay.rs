//! Relaying the confirmation answer back to the waiting process

use std::io::Write;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// The literal answers the confirmation prompt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationToken {
    Yes,
    No,
}

impl ConfirmationToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationToken::Yes => "yes",
            ConfirmationToken::No => "no",
        }
    }
}

impl std::fmt::Display for ConfirmationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("process input is closed")]
    Closed,
    #[error("failed to write confirmation: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the bare confirmation token to the external process.
///
/// Implementations are responsible for the trailing newline.
pub trait ConfirmationRelay: Send + Sync {
    fn send_confirmation(&self, token: ConfirmationToken) -> Result<(), RelayError>;
}

/// Relay feeding the stdin writer task of a spawned process
pub struct ChannelRelay {
    sender: UnboundedSender<String>,
}

impl ChannelRelay {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

impl ConfirmationRelay for ChannelRelay {
    fn send_confirmation(&self, token: ConfirmationToken) -> Result<(), RelayError> {
        self.sender
            .send(format!("{}\n", token))
            .map_err(|_| RelayError::Closed)
    }
}

/// Relay printing the token line to stdout, for reviews of captured output
pub struct PrintRelay;

impl ConfirmationRelay for PrintRelay {
    fn send_confirmation(&self, token: ConfirmationToken) -> Result<(), RelayError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", token)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Relay that records tokens for assertions
#[cfg(test)]
pub struct MockRelay {
    sent: std::sync::Mutex<Vec<ConfirmationToken>>,
    fail: bool,
}

#[cfg(test)]
impl MockRelay {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A relay whose process has already gone away
    pub fn closed() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<ConfirmationToken> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ConfirmationRelay for MockRelay {
    fn send_confirmation(&self, token: ConfirmationToken) -> Result<(), RelayError> {
        self.sent.lock().unwrap().push(token);
        if self.fail {
            return Err(RelayError::Closed);
        }
        Ok(())
    }
}
