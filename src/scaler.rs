// ---------------------------------------------------------------------------
// Column standardization: zero mean, unit variance per feature
// ---------------------------------------------------------------------------
//
// Statistics are computed once from the fitted population and then applied
// unchanged to every later query vector. Constant columns keep scale 1.0 so
// they center to zero instead of dividing by zero.
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::error::GroupingError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
	mean: Vec<f64>,
	scale: Vec<f64>,
}

impl Standardizer {
	/// Fit per-column mean and population standard deviation.
	pub fn fit(matrix: &[Vec<f64>]) -> Result<Self, GroupingError> {
		let rows = matrix.len();
		let Some(first) = matrix.first() else {
			return Err(GroupingError::EmptyPopulation);
		};
		let dim = first.len();
		if matrix.iter().any(|row| row.len() != dim) {
			return Err(GroupingError::InvalidConfig(
				"feature rows have inconsistent lengths".into(),
			));
		}

		let n = rows as f64;
		let mut mean = vec![0.0; dim];
		for row in matrix {
			for (m, v) in mean.iter_mut().zip(row) {
				*m += v;
			}
		}
		for m in &mut mean {
			*m /= n;
		}

		let mut variance = vec![0.0; dim];
		for row in matrix {
			for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
				let d = v - m;
				*var += d * d;
			}
		}
		let scale = variance
			.into_iter()
			.map(|var| {
				let std = (var / n).sqrt();
				if std > f64::EPSILON {
					std
				} else {
					1.0
				}
			})
			.collect();

		Ok(Self { mean, scale })
	}

	/// Rebuild from persisted statistics.
	pub fn from_parts(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, GroupingError> {
		if mean.len() != scale.len() {
			return Err(GroupingError::Corruption(format!(
				"scaler mean has {} columns but scale has {}",
				mean.len(),
				scale.len()
			)));
		}
		if scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
			return Err(GroupingError::Corruption(
				"scaler scale must be finite and non-zero".into(),
			));
		}
		Ok(Self { mean, scale })
	}

	pub fn mean(&self) -> &[f64] {
		&self.mean
	}

	pub fn scale(&self) -> &[f64] {
		&self.scale
	}

	pub fn dim(&self) -> usize {
		self.mean.len()
	}

	pub fn transform(&self, row: &[f64]) -> Vec<f64> {
		row.iter()
			.zip(self.mean.iter().zip(&self.scale))
			.map(|(v, (m, s))| (v - m) / s)
			.collect()
	}

	pub fn transform_all(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
		matrix.iter().map(|row| self.transform(row)).collect()
	}
}
