/*!
 * Progress reporting for codemerge runs
 */

/// Receives the completion percentage of a run
pub trait ProgressSink {
    /// Called with a percentage in `0..=100`, never decreasing within a run
    fn report(&mut self, percent: u8);
}

// Implement ProgressSink for closures
impl<F> ProgressSink for F
where
    F: FnMut(u8),
{
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Turns `completed / total` into deduplicated, monotonic percentages
#[derive(Debug)]
pub struct PercentTracker {
    total: usize,
    last: Option<u8>,
}

impl PercentTracker {
    pub fn new(total: usize) -> Self {
        Self { total, last: None }
    }

    /// Percentage for `completed` files; 100 when there is nothing to do
    pub fn percentage(&self, completed: usize) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((completed.min(self.total) * 100) / self.total) as u8
    }

    /// Report progress if the percentage moved forward
    pub fn update(&mut self, completed: usize, sink: &mut dyn ProgressSink) {
        let percent = self.percentage(completed);
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            sink.report(percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_total_reports_100_once() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        let mut tracker = PercentTracker::new(0);
        tracker.update(0, &mut sink);
        tracker.update(0, &mut sink);
        assert_eq!(seen, vec![100]);
    }

    #[test]
    fn test_monotonic_and_deduplicated() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        let mut tracker = PercentTracker::new(300);
        for done in 0..=300 {
            tracker.update(done, &mut sink);
        }
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.len(), 101);
    }

    #[test]
    fn test_percentage_clamps() {
        let tracker = PercentTracker::new(3);
        assert_eq!(tracker.percentage(1), 33);
        assert_eq!(tracker.percentage(3), 100);
        assert_eq!(tracker.percentage(7), 100);
    }
}
