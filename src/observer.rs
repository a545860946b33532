//! Structured reporting for feed resolution.
//!
//! Components receive an `Arc<dyn FeedObserver>` instead of logging chain
//! outcomes themselves, so callers can route diagnostics anywhere and tests
//! can assert on them.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::feed::{ChainStep, Section};

/// Identifies the external call an outcome belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSite {
    Search { query: String, filter: String },
    Browse { surface: String },
    Player { video_id: String },
    Suggestions { query: String },
    AlbumPage { browse_id: String },
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallSite::Search { query, filter } => write!(f, "search {} \"{}\"", filter, query),
            CallSite::Browse { surface } => write!(f, "browse {}", surface),
            CallSite::Player { video_id } => write!(f, "player {}", video_id),
            CallSite::Suggestions { query } => write!(f, "suggestions \"{}\"", query),
            CallSite::AlbumPage { browse_id } => write!(f, "album {}", browse_id),
        }
    }
}

/// Result of one chain step.
#[derive(Debug)]
pub enum StepOutcome<'a> {
    Items(usize),
    Empty,
    Failed(&'a AppError),
}

pub trait FeedObserver: Send + Sync {
    /// An external call failed and was absorbed.
    fn call_failed(&self, call: &CallSite, error: &AppError);

    /// A chain step finished. `attempt` is zero-based within the section's chain.
    fn step_finished(
        &self,
        section: Section,
        attempt: usize,
        step: &ChainStep,
        outcome: &StepOutcome<'_>,
    );

    /// A section resolved with `count` items (zero after exhausting the chain).
    fn section_finished(&self, section: Section, count: usize);

    /// A section was still running when the aggregate deadline passed.
    fn section_timed_out(&self, section: Section);
}

/// Default observer that renders everything as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FeedObserver for TracingObserver {
    fn call_failed(&self, call: &CallSite, error: &AppError) {
        warn!(call = %call, error = %error, "Catalog call failed");
    }

    fn step_finished(
        &self,
        section: Section,
        attempt: usize,
        step: &ChainStep,
        outcome: &StepOutcome<'_>,
    ) {
        match outcome {
            StepOutcome::Items(count) => {
                debug!(%section, attempt, step = %step, count, "Chain step produced items");
            }
            StepOutcome::Empty => {
                debug!(%section, attempt, step = %step, "Chain step empty, falling back");
            }
            StepOutcome::Failed(error) => {
                warn!(%section, attempt, step = %step, error = %error, "Chain step failed, falling back");
            }
        }
    }

    fn section_finished(&self, section: Section, count: usize) {
        if count == 0 {
            warn!(%section, "Every chain step came back empty");
        } else {
            info!(%section, count, "Section resolved");
        }
    }

    fn section_timed_out(&self, section: Section) {
        warn!(%section, "Section missed the feed deadline");
    }
}

#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Observer that keeps every event as a line of text, for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn events_for(&self, section: Section) -> Vec<String> {
            let prefix = format!("{} ", section);
            self.events()
                .into_iter()
                .filter(|e| e.starts_with(&prefix))
                .collect()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl FeedObserver for RecordingObserver {
        fn call_failed(&self, call: &CallSite, error: &AppError) {
            self.push(format!("failed {}: {}", call, error));
        }

        fn step_finished(
            &self,
            section: Section,
            attempt: usize,
            step: &ChainStep,
            outcome: &StepOutcome<'_>,
        ) {
            let outcome = match outcome {
                StepOutcome::Items(count) => format!("items({})", count),
                StepOutcome::Empty => "empty".to_string(),
                StepOutcome::Failed(_) => "failed".to_string(),
            };
            self.push(format!("{} #{} {} -> {}", section, attempt, step, outcome));
        }

        fn section_finished(&self, section: Section, count: usize) {
            self.push(format!("{} done {}", section, count));
        }

        fn section_timed_out(&self, section: Section) {
            self.push(format!("{} timed out", section));
        }
    }

    /// Observer that panics once a section finishes, crashing the section task.
    #[derive(Debug, Default)]
    pub struct PanickingObserver;

    impl FeedObserver for PanickingObserver {
        fn call_failed(&self, _call: &CallSite, _error: &AppError) {}

        fn step_finished(
            &self,
            _section: Section,
            _attempt: usize,
            _step: &ChainStep,
            _outcome: &StepOutcome<'_>,
        ) {
        }

        fn section_finished(&self, section: Section, _count: usize) {
            panic!("observer crashed while finishing {}", section);
        }

        fn section_timed_out(&self, _section: Section) {}
    }
}
