//! The engine's pending-command list.

use std::collections::VecDeque;

use crate::command::Command;

/// Commands still to run, in order, with a cursor counting those already taken.
///
/// Splicing inserts commands at the front so that they run next, which is how
/// redeem scripts and witness programs are expanded in place.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    pending: VecDeque<Command>,
    cursor: usize,
}

impl WorkQueue {
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        WorkQueue {
            pending: commands.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Take the next command and advance the cursor.
    pub fn next(&mut self) -> Option<Command> {
        let cmd = self.pending.pop_front()?;
        self.cursor += 1;
        Some(cmd)
    }

    /// The commands not yet taken.
    pub fn upcoming(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    /// Drop the next `n` commands without running them.
    pub fn skip(&mut self, n: usize) {
        let n = n.min(self.pending.len());
        self.pending.drain(..n);
        self.cursor += n;
    }

    /// Insert `commands` so they run before anything already pending.
    pub fn splice_next(&mut self, commands: impl IntoIterator<Item = Command>) {
        let inserted: Vec<Command> = commands.into_iter().collect();
        for cmd in inserted.into_iter().rev() {
            self.pending.push_front(cmd);
        }
    }

    /// Number of commands still pending.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// How many commands have been taken or skipped so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
