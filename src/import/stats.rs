use std::time::Duration;

/// Number of errors a summary shows before truncating
pub const ERRORS_SHOWN: usize = 5;

/// Result of importing one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Created { track_id: i64 },
    Skipped,
    Failed {
        error: String,
        /// debug rendering of the underlying error, shown in verbose summaries
        detail: Option<String>,
    },
}

impl ItemOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        ItemOutcome::Failed {
            error: error.into(),
            detail: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub id: String,
    pub error: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<ItemError>,
    pub duration: Duration,
    /// the run stopped early, `total` then only counts processed items
    pub interrupted: bool,
}

impl ImportStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, id: &str, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Created { .. } => self.successful += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed { error, detail } => {
                self.failed += 1;
                self.errors.push(ItemError {
                    id: id.to_string(),
                    error,
                    detail,
                });
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.successful + self.failed + self.skipped
    }

    /// Marks the run as stopped before the end of the list
    pub fn interrupt(&mut self) {
        self.interrupted = true;
        self.total = self.processed();
    }

    /// First errors to display and how many were left out
    pub fn errors_preview(&self) -> (&[ItemError], usize) {
        let shown = self.errors.len().min(ERRORS_SHOWN);
        (&self.errors[..shown], self.errors.len() - shown)
    }

    /// Adds another run's numbers to these, used for the overall summary
    pub fn absorb(&mut self, other: &ImportStats) {
        self.total += other.total;
        self.successful += other.successful;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.errors.extend(other.errors.iter().cloned());
        self.duration += other.duration;
        self.interrupted |= other.interrupted;
    }
}
