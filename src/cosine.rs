/// L2 norm.
pub fn compute_magnitude(v: &[f64]) -> f64 {
	v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity with the norms already known; the index caches one
/// per population row. In [-1.0, 1.0]; a zero row or a length mismatch
/// scores 0.0.
pub fn cosine_similarity_with_magnitude(a: &[f64], b: &[f64], mag_a: f64, mag_b: f64) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let denom = mag_a * mag_b;
	if denom == 0.0 {
		return 0.0;
	}

	let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();

	let result = dot / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

/// Cosine distance `1 - similarity`, in [0.0, 2.0].
pub fn cosine_distance_with_magnitude(a: &[f64], b: &[f64], mag_a: f64, mag_b: f64) -> f64 {
	1.0 - cosine_similarity_with_magnitude(a, b, mag_a, mag_b)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn similarity(a: &[f64], b: &[f64]) -> f64 {
		cosine_similarity_with_magnitude(a, b, compute_magnitude(a), compute_magnitude(b))
	}

	fn distance(a: &[f64], b: &[f64]) -> f64 {
		cosine_distance_with_magnitude(a, b, compute_magnitude(a), compute_magnitude(b))
	}

	#[test]
	fn identical_vectors() {
		let v = vec![1.0, 2.0, 3.0];
		assert!((similarity(&v, &v) - 1.0).abs() < 1e-10);
		assert!(distance(&v, &v).abs() < 1e-10);
	}

	#[test]
	fn orthogonal_vectors() {
		let a = vec![1.0, 0.0];
		let b = vec![0.0, 1.0];
		assert!(similarity(&a, &b).abs() < 1e-10);
		assert!((distance(&a, &b) - 1.0).abs() < 1e-10);
	}

	#[test]
	fn opposite_vectors() {
		let a = vec![1.0, 0.0];
		let b = vec![-1.0, 0.0];
		assert!((distance(&a, &b) - 2.0).abs() < 1e-10);
	}

	#[test]
	fn magnitude_invariant() {
		let a = vec![1.0, 2.0];
		let b = vec![10.0, 20.0];
		assert!((similarity(&a, &b) - 1.0).abs() < 1e-10);
	}

	#[test]
	fn zero_magnitude_is_unit_distance() {
		let a = vec![0.0, 0.0];
		let b = vec![1.0, 2.0];
		assert_eq!(similarity(&a, &b), 0.0);
		assert_eq!(distance(&a, &b), 1.0);
	}

	#[test]
	fn mismatched_lengths() {
		assert_eq!(similarity(&[1.0], &[1.0, 2.0]), 0.0);
		assert_eq!(similarity(&[], &[]), 0.0);
	}

	#[test]
	fn magnitude_basic() {
		assert!((compute_magnitude(&[3.0, 4.0]) - 5.0).abs() < 1e-10);
		assert_eq!(compute_magnitude(&[]), 0.0);
	}
}
