//! Player-facing message log with a fixed capacity.

use std::collections::VecDeque;

/// Keeps the most recent lines, evicting the oldest first.
#[derive(Clone, Debug, Default)]
pub(crate) struct SessionLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl SessionLog {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            let _ = self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub(crate) fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }
}
