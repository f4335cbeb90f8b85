//! Rolling window averages
//!
//! Used to derive trailing demand averages (7 and 30 day windows) from daily
//! sales series.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Mean over a fixed trailing window, updated one value at a time
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    buffer: VecDeque<f64>,
    total: f64,
}

impl RollingMean {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window length must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            window,
            buffer: VecDeque::with_capacity(window + 1),
            total: 0.0,
        })
    }

    /// Add a value and return the window mean once the window is full
    pub fn push(&mut self, value: f64) -> Result<Option<f64>> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Cannot average non-finite value {}",
                value
            )));
        }

        self.buffer.push_back(value);
        self.total += value;
        if self.buffer.len() > self.window {
            self.total -= self.buffer.pop_front().unwrap_or(0.0);
        }
        Ok(self.mean())
    }

    /// Current mean, `None` until `window` values have been pushed
    pub fn mean(&self) -> Option<f64> {
        (self.buffer.len() == self.window).then(|| self.total / self.window as f64)
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// Trailing means for every position of a series.
///
/// Position `i` holds the mean of `series[i + 1 - period..=i]`, or `None`
/// while fewer than `period` values have been seen.
pub fn rolling_means(series: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingMean::new(period)?;
    series.iter().map(|&value| rolling.push(value)).collect()
}

/// Mean of the last `period` values of a series, if there are enough.
pub fn trailing_mean(series: &[f64], period: usize) -> Option<f64> {
    if period == 0 || series.len() < period {
        return None;
    }
    let tail = &series[series.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_slides() {
        let mut rolling = RollingMean::new(3).unwrap();
        assert_eq!(rolling.push(2.0).unwrap(), None);
        assert_eq!(rolling.push(4.0).unwrap(), None);
        assert_eq!(rolling.push(6.0).unwrap(), Some(4.0));
        assert_eq!(rolling.push(8.0).unwrap(), Some(6.0));
        assert_eq!(rolling.window(), 3);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(RollingMean::new(0).is_err());

        let mut rolling = RollingMean::new(2).unwrap();
        assert!(rolling.push(f64::NAN).is_err());
        assert!(rolling.push(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rolling_means() {
        let means = rolling_means(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(means, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        assert!(rolling_means(&[1.0, f64::NAN], 1).is_err());
    }

    #[test]
    fn test_trailing_mean() {
        assert_eq!(trailing_mean(&[1.0, 2.0, 3.0, 5.0], 2), Some(4.0));
        assert_eq!(trailing_mean(&[1.0], 2), None);
        assert_eq!(trailing_mean(&[1.0], 0), None);
    }
}
