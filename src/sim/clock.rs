/// Step range driving a run, either bounded `[start, end)` or open-ended.
///
/// # Examples
///
/// ```
/// use ewh_sim::sim::clock::StepRange;
///
/// let mut range = StepRange::bounded(2, 5);
/// let mut steps = Vec::new();
/// while let Some(step) = range.tick() {
///     steps.push(step);
/// }
/// assert_eq!(steps, vec![2, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct StepRange {
    /// Next step to hand out
    current: usize,
    /// Exclusive end, `None` for an unbounded run
    end: Option<usize>,
}

impl StepRange {
    /// Creates a range covering `[start, end)`.
    pub fn bounded(start: usize, end: usize) -> Self {
        Self {
            current: start,
            end: Some(end),
        }
    }

    /// Creates a range that starts at `start` and never runs out on its own.
    pub fn unbounded(start: usize) -> Self {
        Self {
            current: start,
            end: None,
        }
    }

    /// Creates a range from an optional end step.
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self {
            current: start,
            end,
        }
    }

    /// Advances by one step.
    ///
    /// # Returns
    ///
    /// * `Some(step)` - The step to simulate next
    /// * `None` - If a bounded range is exhausted
    pub fn tick(&mut self) -> Option<usize> {
        match self.end {
            Some(end) if self.current >= end => None,
            _ => {
                let step = self.current;
                self.current += 1;
                Some(step)
            }
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.end.is_some()
    }

    /// Number of steps left, if bounded.
    pub fn remaining(&self) -> Option<usize> {
        self.end.map(|end| end.saturating_sub(self.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_tick() {
        let mut range = StepRange::bounded(0, 2);
        assert_eq!(range.tick(), Some(0));
        assert_eq!(range.tick(), Some(1));
        assert_eq!(range.tick(), None);
        assert_eq!(range.remaining(), Some(0));
    }

    #[test]
    fn test_empty_range() {
        let mut range = StepRange::bounded(5, 5);
        assert_eq!(range.tick(), None);
        let mut inverted = StepRange::bounded(6, 5);
        assert_eq!(inverted.tick(), None);
    }

    #[test]
    fn test_unbounded_keeps_going() {
        let mut range = StepRange::unbounded(10);
        assert!(!range.is_bounded());
        for expected in 10..1_000 {
            assert_eq!(range.tick(), Some(expected));
        }
        assert_eq!(range.remaining(), None);
    }
}
