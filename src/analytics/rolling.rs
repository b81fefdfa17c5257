//! Trailing moving average over record positions.
//!
//! The window counts records, not calendar days: with gaps in the series a
//! 30-record window can span more than 30 days. A value is produced only when
//! every position in the window carries a number (minimum periods equal to the
//! window size).

/// Trailing mean of `values` over `window` positions.
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let sum = slice.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))?;
            Some(sum / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_fills_after_window() {
        let values = vec![Some(50.0); 35];
        let ma = trailing_mean(&values, 30);
        assert!(ma[..29].iter().all(Option::is_none));
        assert!(ma[29..].iter().all(|v| *v == Some(50.0)));
    }

    #[test]
    fn missing_value_blanks_every_window_containing_it() {
        let mut values: Vec<Option<f64>> = (0..8).map(|i| Some(i as f64)).collect();
        values[4] = None;
        let ma = trailing_mean(&values, 3);
        assert_eq!(ma[2], Some(1.0));
        assert_eq!(ma[3], Some(2.0));
        assert_eq!(ma[4], None);
        assert_eq!(ma[5], None);
        assert_eq!(ma[6], None);
        assert_eq!(ma[7], Some(6.0));
    }

    #[test]
    fn short_input_and_zero_window() {
        assert_eq!(trailing_mean(&[Some(1.0)], 2), vec![None]);
        assert_eq!(trailing_mean(&[Some(1.0)], 0), vec![None]);
        assert!(trailing_mean(&[], 30).is_empty());
    }
}
