use crate::safety::features::FEATURE_COUNT;

/// Per-feature mean/variance normalisation fitted once on the training matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Uses the population standard deviation. Constant features keep a scale
    /// of 1 so they transform to zero instead of dividing by zero.
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let count = rows.len() as f64;
        let mut means = [0.0; FEATURE_COUNT];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= count;
        }

        let mut scales = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((scale, value), mean) in scales.iter_mut().zip(row).zip(&means) {
                *scale += (value - mean).powi(2);
            }
        }
        for scale in &mut scales {
            let std_dev = (*scale / count).sqrt();
            *scale = if std_dev > f64::EPSILON { std_dev } else { 1.0 };
        }

        Some(Self { means, scales })
    }

    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (index, value) in row.iter().enumerate() {
            scaled[index] = (value - self.means[index]) / self.scales[index];
        }
        scaled
    }

    pub fn means(&self) -> &[f64; FEATURE_COUNT] {
        &self.means
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_and_scales_columns() {
        let rows = [
            [1.0, 10.0, 5.0, 0.0, 0.0, 0.0, 0.0],
            [3.0, 30.0, 5.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let scaler = StandardScaler::fit(&rows).expect("scaler fits");

        assert_eq!(scaler.means()[0], 2.0);
        let first = scaler.transform(&rows[0]);
        let second = scaler.transform(&rows[1]);
        assert!((first[0] + 1.0).abs() < 1e-12);
        assert!((second[1] - 1.0).abs() < 1e-12);
        // constant column
        assert_eq!(first[2], 0.0);
    }

    #[test]
    fn empty_matrix_does_not_fit() {
        assert!(StandardScaler::fit(&[]).is_none());
    }
}
