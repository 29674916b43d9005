/// History subsystem - bounded snapshot log and typing-pause commits

pub mod commit;
pub mod stack;

// Re-export public interface
pub use commit::{
    Clock, CommitScheduler, CommitState, DEFAULT_QUIET_WINDOW, HistoryRecorder, ManualClock,
    SystemClock,
};
pub use stack::{DEFAULT_CAPACITY, HistoryEntry, HistoryStack};
