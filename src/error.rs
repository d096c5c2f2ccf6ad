use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemolessError>;

#[derive(Error, Debug)]
pub enum MemolessError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("encoded amount mismatch: local reference {local}, server decoded {remote}")]
    EncodingMismatch { local: String, remote: String },
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("url parse: {0}")]
    Url(#[from] url::ParseError),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("gave up after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
    #[error("reference registration is no longer usable")]
    Expired,
    #[error("operation requires state {expected}, current state is {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("amount exceeds the representable raw-unit range")]
    Overflow,
}

impl MemolessError {
    /// Transient kinds are retried by the polling loops and never surfaced
    /// per-attempt; everything else aborts the operation that hit it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MemolessError::Transport(_) | MemolessError::Malformed(_)
        )
    }
}
