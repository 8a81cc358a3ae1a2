use std::fmt;
use std::time::Duration;

/// Counters for one generator item or a whole run.
///
/// Elapsed time is measured independently per item and for the run; only
/// the counters sum when item statistics are absorbed into the run total.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub lines: usize,
    pub elapsed: Duration,
}

impl Statistics {
    /// Artifacts that went through reconciliation (gen-once skips excluded).
    pub fn artifacts(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    /// Sum another statistics instance's counters into this one.
    pub fn absorb(&mut self, other: &Statistics) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.lines += other.lines;
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files: {} (created: {}, updated: {}, unchanged: {}), lines: {}, time: {}ms",
            self.artifacts(),
            self.created,
            self.updated,
            self.unchanged,
            self.lines,
            self.elapsed.as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_sums_counters_but_not_elapsed() {
        let mut total = Statistics {
            elapsed: Duration::from_millis(100),
            ..Default::default()
        };
        let item = Statistics {
            created: 2,
            updated: 1,
            unchanged: 3,
            lines: 40,
            elapsed: Duration::from_millis(7),
        };

        total.absorb(&item);
        assert_eq!(total.artifacts(), 6);
        assert_eq!(total.lines, 40);
        assert_eq!(total.elapsed, Duration::from_millis(100));
    }

    #[test]
    fn display_is_a_single_summary_line() {
        let stats = Statistics {
            created: 4,
            updated: 0,
            unchanged: 0,
            lines: 12,
            elapsed: Duration::from_millis(34),
        };
        assert_eq!(
            stats.to_string(),
            "files: 4 (created: 4, updated: 0, unchanged: 0), lines: 12, time: 34ms"
        );
    }
}
