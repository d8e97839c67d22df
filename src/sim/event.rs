use crate::error::{Error, Result};

/// Daily high-demand window during which comms-capable heaters run in LOW mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakWindow {
    /// Hour of day the window opens (inclusive).
    pub start_hour: usize,
    /// Hour of day the window closes (exclusive, `24` means midnight).
    pub end_hour: usize,
}

impl PeakWindow {
    /// Creates a new peak window spanning `[start_hour, end_hour)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` unless `start_hour < end_hour <= 24`.
    pub fn new(start_hour: usize, end_hour: usize) -> Result<Self> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(Error::Configuration(format!(
                "peak window {start_hour}..{end_hour} must satisfy start_hour < end_hour <= 24"
            )));
        }

        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// Hour of day at which the window's closing event fires.
    pub fn closing_hour(&self) -> usize {
        self.end_hour % 24
    }

    /// Whole hours elapsed since the window closed, wrapping over midnight.
    pub fn hours_since_close(&self, hour_of_day: usize) -> usize {
        (hour_of_day + 24 - self.closing_hour()) % 24
    }
}

#[cfg(test)]
mod tests {
    use super::PeakWindow;
    use crate::error::Error;

    #[test]
    fn window_ending_at_midnight_closes_at_hour_zero() {
        let window = PeakWindow::new(20, 24).expect("valid window");
        assert_eq!(window.closing_hour(), 0);
        assert_eq!(window.hours_since_close(0), 0);
        assert_eq!(window.hours_since_close(3), 3);
    }

    #[test]
    fn hours_since_close_wraps() {
        let window = PeakWindow::new(7, 10).expect("valid window");
        assert_eq!(window.hours_since_close(10), 0);
        assert_eq!(window.hours_since_close(13), 3);
        assert_eq!(window.hours_since_close(9), 23);
    }

    #[test]
    fn malformed_windows_are_configuration_errors() {
        for (start, end) in [(5, 5), (9, 3), (20, 25)] {
            assert!(
                matches!(PeakWindow::new(start, end), Err(Error::Configuration(_))),
                "{start}..{end} should be rejected"
            );
        }
    }
}
