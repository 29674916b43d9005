use super::stack::{HistoryEntry, HistoryStack};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Source of "now" for the commit scheduler.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Idle,
    PendingFlush { deadline: Instant },
}

/// Debounces typing into history commits.
///
/// Every keystroke pushes the deadline out by the quiet window; `poll`
/// reports the flush once the clock passes it.
#[derive(Debug)]
pub struct CommitScheduler<C: Clock> {
    clock: C,
    quiet_window: Duration,
    state: CommitState,
}

impl<C: Clock> CommitScheduler<C> {
    pub fn new(clock: C, quiet_window: Duration) -> Self {
        Self {
            clock,
            quiet_window,
            state: CommitState::Idle,
        }
    }

    pub fn note_keystroke(&mut self) {
        self.state = CommitState::PendingFlush {
            deadline: self.clock.now() + self.quiet_window,
        };
    }

    /// True once per elapsed deadline.
    pub fn poll(&mut self) -> bool {
        match self.state {
            CommitState::PendingFlush { deadline } if self.clock.now() >= deadline => {
                self.state = CommitState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.state = CommitState::Idle;
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, CommitState::PendingFlush { .. })
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }
}

/// History stack plus the policy deciding when snapshots get taken.
#[derive(Debug)]
pub struct HistoryRecorder<C: Clock> {
    stack: HistoryStack,
    scheduler: CommitScheduler<C>,
    last_committed: Option<String>,
}

impl<C: Clock> HistoryRecorder<C> {
    pub fn new(capacity: usize, clock: C, quiet_window: Duration) -> Self {
        Self {
            stack: HistoryStack::with_capacity(capacity),
            scheduler: CommitScheduler::new(clock, quiet_window),
            last_committed: None,
        }
    }

    pub fn stack(&self) -> &HistoryStack {
        &self.stack
    }

    pub fn scheduler(&self) -> &CommitScheduler<C> {
        &self.scheduler
    }

    pub fn status(&self) -> String {
        self.stack.status()
    }

    pub fn note_keystroke(&mut self) {
        self.scheduler.note_keystroke();
    }

    /// Commits a snapshot right away (paste, cut, tag edits, formatting).
    /// Returns whether an entry was pushed.
    pub fn commit_now(&mut self, text: &str, caret: usize) -> bool {
        self.scheduler.cancel();
        self.commit(text, caret)
    }

    /// Commits a snapshot if the typing pause has elapsed.
    pub fn tick(&mut self, text: &str, caret: usize) -> bool {
        if self.scheduler.poll() {
            self.commit(text, caret)
        } else {
            false
        }
    }

    fn commit(&mut self, text: &str, caret: usize) -> bool {
        if self.last_committed.as_deref() == Some(text) {
            debug!("Skipping history commit, text unchanged");
            return false;
        }
        self.stack.push(HistoryEntry::new(text, caret));
        self.last_committed = Some(text.to_string());
        true
    }

    pub fn undo(&mut self, current_text: &str) -> HistoryEntry {
        self.scheduler.cancel();
        let entry = self.stack.undo(current_text);
        self.last_committed = Some(entry.text.clone());
        entry
    }

    pub fn redo(&mut self, current_text: &str) -> HistoryEntry {
        self.scheduler.cancel();
        let entry = self.stack.redo(current_text);
        self.last_committed = Some(entry.text.clone());
        entry
    }

    /// Forgets every snapshot and any pending flush.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.scheduler.cancel();
        self.last_committed = None;
    }
}
