use nalgebra::{DMatrix, DVector};
use thiserror::Error;

const DEGREE: usize = 3;
const SVD_EPSILON: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum TgFitError {
    #[error("A cubic Tg fit needs at least {required} points, got {found}")]
    TooFewPoints { required: usize, found: usize },
    #[error("Content and Tg columns differ in length ({content} vs {tg})")]
    LengthMismatch { content: usize, tg: usize },
    #[error("Non-finite value in Tg data at row {0}")]
    NonFinite(usize),
    #[error("Least-squares solve failed: {0}")]
    Solve(&'static str),
}

/// Cubic least-squares model of fictive temperature against modifier content.
#[derive(Debug, Clone, PartialEq)]
pub struct TgPredictor {
    /// Coefficients of `1, x, x², x³`.
    coefficients: [f64; DEGREE + 1],
}

impl TgPredictor {
    pub fn fit(content: &[f64], tg: &[f64]) -> Result<Self, TgFitError> {
        if content.len() != tg.len() {
            return Err(TgFitError::LengthMismatch {
                content: content.len(),
                tg: tg.len(),
            });
        }
        if content.len() < DEGREE + 1 {
            return Err(TgFitError::TooFewPoints {
                required: DEGREE + 1,
                found: content.len(),
            });
        }
        if let Some(row) = content
            .iter()
            .zip(tg)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(TgFitError::NonFinite(row));
        }

        let design = DMatrix::from_fn(content.len(), DEGREE + 1, |r, c| content[r].powi(c as i32));
        let target = DVector::from_column_slice(tg);
        let solution = design
            .svd(true, true)
            .solve(&target, SVD_EPSILON)
            .map_err(TgFitError::Solve)?;

        let mut coefficients = [0.0; DEGREE + 1];
        coefficients.copy_from_slice(solution.as_slice());
        Ok(Self { coefficients })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn predict_one(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }

    pub fn predict(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict_one(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> f64 {
        700.0 + 2.0 * x - 0.05 * x * x + 0.001 * x * x * x
    }

    #[test]
    fn recovers_an_exact_cubic() {
        let xs = [0.0, 5.0, 12.0, 20.0, 33.0, 45.0];
        let ys: Vec<f64> = xs.iter().map(|&x| cubic(x)).collect();
        let model = TgPredictor::fit(&xs, &ys).unwrap();

        for (fitted, expected) in model.coefficients().iter().zip([700.0, 2.0, -0.05, 0.001]) {
            assert!((fitted - expected).abs() < 1e-6, "{} vs {}", fitted, expected);
        }
        let predicted = model.predict(&[10.0, 27.5]);
        assert!((predicted[0] - cubic(10.0)).abs() < 1e-5);
        assert!((predicted[1] - cubic(27.5)).abs() < 1e-5);
    }

    #[test]
    fn constant_data_predicts_a_constant() {
        let model = TgPredictor::fit(&[0.0, 10.0, 20.0, 30.0], &[800.0; 4]).unwrap();
        assert!((model.predict_one(17.0) - 800.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_fewer_than_four_points() {
        assert_eq!(
            TgPredictor::fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(TgFitError::TooFewPoints {
                required: 4,
                found: 3
            })
        );
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert_eq!(
            TgPredictor::fit(&[0.0, 1.0, 2.0, 3.0], &[1.0; 5]),
            Err(TgFitError::LengthMismatch { content: 4, tg: 5 })
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(
            TgPredictor::fit(&[0.0, 1.0, f64::NAN, 3.0], &[1.0; 4]),
            Err(TgFitError::NonFinite(2))
        );
    }
}
