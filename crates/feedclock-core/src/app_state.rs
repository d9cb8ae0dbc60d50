//! Application-wide run state and error types

use core::fmt::{self, Write};

use thiserror_no_std::Error;

use crate::store::RemoteStoreError;

/// Capacity of the message carried by string-valued errors.
pub const ERROR_MESSAGE_CAPACITY: usize = 64;

pub type ErrorMessage = heapless::String<ERROR_MESSAGE_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Uninitialized,
    LoadingHistory,
    Running,
    Error,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(ErrorMessage),
    #[error("Remote store error: {0}")]
    RemoteStore(RemoteStoreError),
    #[error("Clock sync failed: {0}")]
    ClockSync(ErrorMessage),
    #[error("Display error: {0}")]
    Display(ErrorMessage),
    #[error("Hardware init failed: {0}")]
    Hardware(ErrorMessage),
}

impl From<RemoteStoreError> for AppError {
    fn from(err: RemoteStoreError) -> Self {
        AppError::RemoteStore(err)
    }
}

impl AppError {
    pub fn network(cause: impl fmt::Display) -> Self {
        AppError::Network(error_message(cause))
    }

    pub fn clock_sync(cause: impl fmt::Display) -> Self {
        AppError::ClockSync(error_message(cause))
    }

    pub fn display(cause: impl fmt::Debug) -> Self {
        AppError::Display(debug_message(cause))
    }

    /// A board bring-up step that failed; `step` names the peripheral.
    pub fn hardware(step: impl fmt::Display) -> Self {
        AppError::Hardware(error_message(step))
    }
}

/// Render `cause` into a fixed-capacity message, cutting it at capacity.
pub fn error_message(cause: impl fmt::Display) -> ErrorMessage {
    let mut message = ErrorMessage::new();
    write!(Truncating(&mut message), "{}", cause).ok();
    message
}

/// Like [`error_message`], for causes that only implement `Debug`.
pub fn debug_message(cause: impl fmt::Debug) -> ErrorMessage {
    let mut message = ErrorMessage::new();
    write!(Truncating(&mut message), "{:?}", cause).ok();
    message
}

/// Writer that drops whatever does not fit instead of failing.
struct Truncating<'a, const N: usize>(&'a mut heapless::String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FeedKey;

    #[test]
    fn test_store_error_converts() {
        let err: AppError = RemoteStoreError::write_failed(FeedKey::Count).into();
        assert_eq!(
            err,
            AppError::RemoteStore(RemoteStoreError::write_failed(FeedKey::Count))
        );
    }

    #[test]
    fn test_bring_up_failure_is_not_a_display_error() {
        let err = AppError::hardware("GPIO expander");
        assert_eq!(err, AppError::Hardware(error_message("GPIO expander")));
        assert_eq!(
            error_message(&err).as_str(),
            "Hardware init failed: GPIO expander"
        );
    }

    #[test]
    fn test_long_messages_are_cut() {
        let long = "timeout ".repeat(20);
        let err = AppError::network(long.as_str());
        match err {
            AppError::Network(message) => {
                assert_eq!(message.len(), ERROR_MESSAGE_CAPACITY);
                assert!(message.starts_with("timeout timeout"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
