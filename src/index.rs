// ---------------------------------------------------------------------------
// SimilarityIndex: brute-force cosine k-nearest-neighbor search
// ---------------------------------------------------------------------------
//
// Holds the standardized population matrix together with an explicit
// row -> child id mapping, so identity never depends on the caller keeping
// its own list in the same order. Populations are small (one daycare), so a
// linear scan with pre-computed magnitudes is sufficient.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;

use crate::cosine::{compute_magnitude, cosine_distance_with_magnitude};
use crate::error::GroupingError;
use crate::scaler::Standardizer;

/// One search hit: the population row and its cosine distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
	pub row: usize,
	pub distance: f64,
}

#[derive(Debug, Clone)]
pub struct SimilarityIndex {
	scaler: Standardizer,
	rows: Vec<Vec<f64>>,
	magnitudes: Vec<f64>,
	row_ids: Vec<String>,
}

impl SimilarityIndex {
	/// Fit standardization statistics on `features` and index the result.
	pub fn fit(features: &[Vec<f64>], row_ids: Vec<String>) -> Result<Self, GroupingError> {
		let scaler = Standardizer::fit(features)?;
		Self::with_scaler(scaler, features, row_ids)
	}

	/// Index `features` under previously fitted statistics (no refit).
	pub fn with_scaler(
		scaler: Standardizer,
		features: &[Vec<f64>],
		row_ids: Vec<String>,
	) -> Result<Self, GroupingError> {
		if features.is_empty() {
			return Err(GroupingError::EmptyPopulation);
		}
		if features.len() != row_ids.len() {
			return Err(GroupingError::InvalidConfig(format!(
				"{} feature rows but {} row ids",
				features.len(),
				row_ids.len()
			)));
		}
		if let Some(bad) = features.iter().find(|r| r.len() != scaler.dim()) {
			return Err(GroupingError::Corruption(format!(
				"feature row has {} columns, scaler expects {}",
				bad.len(),
				scaler.dim()
			)));
		}

		let rows = scaler.transform_all(features);
		let magnitudes = rows.iter().map(|r| compute_magnitude(r)).collect();

		Ok(Self {
			scaler,
			rows,
			magnitudes,
			row_ids,
		})
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn scaler(&self) -> &Standardizer {
		&self.scaler
	}

	pub fn row_id(&self, row: usize) -> Option<&str> {
		self.row_ids.get(row).map(String::as_str)
	}

	/// Return up to `k` nearest rows to the raw (unstandardized) `vector`,
	/// nearest first. Equal distances keep row order.
	pub fn query(&self, vector: &[f64], k: usize) -> Result<Vec<Neighbor>, GroupingError> {
		if vector.len() != self.scaler.dim() {
			return Err(GroupingError::InvalidConfig(format!(
				"query vector has {} columns, index expects {}",
				vector.len(),
				self.scaler.dim()
			)));
		}

		let query = self.scaler.transform(vector);
		let query_mag = compute_magnitude(&query);

		let mut hits: Vec<Neighbor> = self
			.rows
			.iter()
			.zip(&self.magnitudes)
			.enumerate()
			.map(|(row, (features, &mag))| Neighbor {
				row,
				distance: cosine_distance_with_magnitude(&query, features, query_mag, mag),
			})
			.collect();

		hits.sort_by(|a, b| {
			a.distance
				.partial_cmp(&b.distance)
				.unwrap_or(Ordering::Equal)
		});
		hits.truncate(k.min(self.rows.len()));
		Ok(hits)
	}
}
