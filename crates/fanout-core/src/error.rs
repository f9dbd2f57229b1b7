use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("completion channel closed with {live} task(s) still in flight")]
    CompletionChannelClosed { live: usize },
    #[error("reaper task failed: {0}")]
    Reaper(String),
}
