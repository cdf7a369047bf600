use std::sync::{Arc, RwLock};

use crate::error::GradeError;
use crate::grade::{GradeRun, StudentResult};
use crate::table::Table;

/// Process-wide, single-slot holder for the most recent grading run.
///
/// A committed run is an immutable snapshot behind an `Arc`; commit swaps
/// the reference, so a concurrent reader sees either the old run or the new
/// one in full, never a mix. Overlapping writers are not serialized here,
/// last commit wins.
pub struct ResultStore {
    current: RwLock<Option<Arc<GradeRun>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self { current: RwLock::new(None) }
    }

    /// Replace the active run. Returns the shared snapshot.
    pub fn commit(&self, run: GradeRun) -> Arc<GradeRun> {
        let snapshot = Arc::new(run);
        let mut slot = self.current.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn current(&self) -> Option<Arc<GradeRun>> {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        let mut slot = self.current.write().unwrap_or_else(|p| p.into_inner());
        *slot = None;
    }

    fn require_run(&self) -> Result<Arc<GradeRun>, GradeError> {
        self.current()
            .ok_or(GradeError::NotFound { name: String::new() })
    }

    pub fn lookup(&self, name: &str) -> Result<StudentResult, GradeError> {
        let run = self.require_run()?;
        run.lookup(name)
            .cloned()
            .ok_or_else(|| GradeError::NotFound { name: name.to_string() })
    }

    /// Bank rows for the named student's missed questions.
    pub fn missed_question_rows(&self, name: &str) -> Result<Table, GradeError> {
        let run = self.require_run()?;
        run.missed_question_rows(name)
            .ok_or_else(|| GradeError::NotFound { name: name.to_string() })
    }

    /// (name, score) sorted by score descending.
    pub fn class_summary(&self) -> Result<Vec<(String, f64)>, GradeError> {
        Ok(self.require_run()?.class_summary())
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}
