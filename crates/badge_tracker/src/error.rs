use badge_shared_util::AccountId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid event payload: {0}")]
    InvalidEvent(#[from] serde_json::Error),
    #[error("A main menu handler named {0} is already registered")]
    DuplicateHandler(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a [`CountSource`](crate::CountSource) to produce an unread count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("No unread count known for account {0}")]
    UnknownAccount(AccountId),
    #[error("Count source unavailable: {0}")]
    Unavailable(String),
}
