//! Per-hour acquisition outcome.

use barquet_types::Tick;

/// The result of acquiring one hour of ticks.
///
/// Skips are ordinary values, not errors: the pipeline aggregates them
/// into diagnostics and keeps going. A multi-month run must never abort
/// because of one bad hour.
#[derive(Debug, Clone)]
pub enum HourOutcome {
    /// Ticks for the hour, in feed order. An empty vector means the hour
    /// genuinely has no data (weekends, market holidays).
    Ticks(Vec<Tick>),
    /// The hour could not be acquired and was skipped.
    Skipped {
        /// The file or URL acquisition failed on.
        source: String,
        /// Why the hour was skipped.
        reason: String,
    },
}

impl HourOutcome {
    /// Creates a skipped outcome.
    #[must_use]
    pub fn skipped(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Skipped {
            source: source.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the hour was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns the number of ticks, zero for skipped hours.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Ticks(ticks) => ticks.len(),
            Self::Skipped { .. } => 0,
        }
    }

    /// Returns true if the outcome carries no ticks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_outcome() {
        let outcome = HourOutcome::Ticks(Vec::new());
        assert!(!outcome.is_skipped());
        assert!(outcome.is_empty());
        assert_eq!(outcome.len(), 0);
    }

    #[test]
    fn test_skipped_outcome() {
        let outcome = HourOutcome::skipped("a/file.bi5", "truncated");
        assert!(outcome.is_skipped());
        assert!(outcome.is_empty());
    }
}
