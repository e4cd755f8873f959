//! Single-slot error channel.
//!
//! All failures detected while talking to the context land here as formatted
//! text; nothing in this layer throws. The slot is overwritten, never
//! appended, and reading it does not clear it — "no error since the last
//! check" is not observably distinguishable from "a failure happened but was
//! already overwritten". That ambiguity is part of the contract.

use std::fmt;

/// Capacity of the error slot in bytes. Longer messages are truncated on a
/// character boundary; the buffer never overruns.
pub const ERROR_CAPACITY: usize = 4096;

#[derive(Debug, Default)]
pub struct ErrorChannel {
    message: String,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with a formatted message.
    pub fn record(&mut self, args: fmt::Arguments<'_>) {
        self.message.clear();
        fmt::write(&mut self.message, args).ok();
        if self.message.len() > ERROR_CAPACITY {
            let mut end = ERROR_CAPACITY;
            while !self.message.is_char_boundary(end) {
                end -= 1;
            }
            self.message.truncate(end);
        }
        tracing::debug!(error = %self.message, "recorded context error");
    }

    /// The last recorded message; empty if nothing has failed yet. Possibly
    /// stale: the slot holds its contents until the next failure overwrites
    /// them.
    pub fn get(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_rather_than_appends() {
        let mut errors = ErrorChannel::new();
        errors.record(format_args!("first: {}", 1));
        errors.record(format_args!("second: {}", 2));
        assert_eq!(errors.get(), "second: 2");
    }

    #[test]
    fn long_messages_truncate_on_char_boundary() {
        let mut errors = ErrorChannel::new();
        let filler = "é".repeat(ERROR_CAPACITY);
        errors.record(format_args!("{filler}"));
        assert!(errors.get().len() <= ERROR_CAPACITY);
        assert!(errors.get().chars().all(|c| c == 'é'));
    }

    #[test]
    fn reading_does_not_clear() {
        let mut errors = ErrorChannel::new();
        errors.record(format_args!("boom"));
        assert_eq!(errors.get(), "boom");
        assert_eq!(errors.get(), "boom");
    }
}
