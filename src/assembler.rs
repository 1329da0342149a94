// ---------------------------------------------------------------------------
// Recommendation assembler: raw neighbors to annotated partner matches
// ---------------------------------------------------------------------------
//
// Pure function of its inputs plus the encoder's reference date. Neighbor
// order is preserved; grouping happens later in `partition`.
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::encoder::FeatureEncoder;
use crate::index::{Neighbor, SimilarityIndex};
use crate::types::{ChildRecord, PartnerMatch, Recommendation, TargetSummary};

/// How the query child's own row is removed from its neighbor list.
///
/// `SkipFirst` drops the first neighbor unconditionally. It assumes the
/// target is part of the fitted population and sorts first; when the target
/// is absent, the genuinely nearest child is dropped instead. `SkipById`
/// drops neighbors whose id equals the target's id and keeps everything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfMatchPolicy {
	#[default]
	SkipFirst,
	SkipById,
}

const UNKNOWN_TARGET_ID: &str = "unknown";

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
	(value * 1000.0).round() / 1000.0
}

/// Similarity reported to callers: `1 - distance`, kept within [0, 1].
pub fn similarity_from_distance(distance: f64) -> f64 {
	(1.0 - distance).clamp(0.0, 1.0)
}

pub fn summarize_target(target: &ChildRecord, encoder: &FeatureEncoder) -> TargetSummary {
	TargetSummary {
		id: target
			.id
			.clone()
			.unwrap_or_else(|| UNKNOWN_TARGET_ID.to_string()),
		name: target.full_name(),
		age_months: encoder.age_months(target),
		interests: target.interests.clone(),
		program: target.program_label().to_string(),
	}
}

/// Build the partner list for `target` from `neighbors`.
///
/// `population` must be the record list the index was fitted on; ids come
/// from the index's own row mapping. The returned recommendation has no
/// groups yet.
pub fn assemble(
	target: &ChildRecord,
	neighbors: &[Neighbor],
	index: &SimilarityIndex,
	population: &[ChildRecord],
	exclude_ids: &[String],
	policy: SelfMatchPolicy,
	encoder: &FeatureEncoder,
) -> Recommendation {
	let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();
	let target_summary = summarize_target(target, encoder);
	let target_age = target_summary.age_months;

	let mut individual_partners = Vec::new();
	let mut similarity_scores = Vec::new();

	for (position, neighbor) in neighbors.iter().enumerate() {
		if policy == SelfMatchPolicy::SkipFirst && position == 0 {
			continue;
		}
		let (Some(id), Some(record)) = (index.row_id(neighbor.row), population.get(neighbor.row))
		else {
			tracing::warn!(row = neighbor.row, "Neighbor row has no matching child record");
			continue;
		};
		if policy == SelfMatchPolicy::SkipById && target.id.as_deref() == Some(id) {
			continue;
		}
		if excluded.contains(id) {
			continue;
		}

		let similarity = similarity_from_distance(neighbor.distance);
		let age_months = encoder.age_months(record);

		individual_partners.push(PartnerMatch {
			id: id.to_string(),
			name: record.full_name(),
			age_months,
			interests: record.interests.clone(),
			program: record.program_label().to_string(),
			similarity_score: round3(similarity),
			age_difference_months: (target_age - age_months).abs(),
		});
		similarity_scores.push(similarity);
	}

	Recommendation {
		target_child: target_summary,
		recommended_groups: Vec::new(),
		individual_partners,
		similarity_scores,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	fn encoder() -> FeatureEncoder {
		FeatureEncoder::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
	}

	fn record(id: &str, dob: &str) -> ChildRecord {
		ChildRecord {
			id: Some(id.into()),
			first_name: id.to_uppercase(),
			last_name: "X".into(),
			date_of_birth: Some(dob.into()),
			..Default::default()
		}
	}

	fn fixture() -> (Vec<ChildRecord>, SimilarityIndex) {
		let population = vec![
			record("a", "2020-01-01"),
			record("b", "2020-03-01"),
			record("c", "2020-06-01"),
		];
		let ids = population.iter().map(|r| r.id.clone().unwrap()).collect();
		let features = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
		let index = SimilarityIndex::fit(&features, ids).unwrap();
		(population, index)
	}

	fn hits(rows: &[(usize, f64)]) -> Vec<Neighbor> {
		rows.iter()
			.map(|&(row, distance)| Neighbor { row, distance })
			.collect()
	}

	#[test]
	fn first_neighbor_dropped_and_order_kept() {
		let (population, index) = fixture();
		let neighbors = hits(&[(0, 0.0), (2, 0.25), (1, 0.5)]);
		let rec = assemble(
			&population[0],
			&neighbors,
			&index,
			&population,
			&[],
			SelfMatchPolicy::SkipFirst,
			&encoder(),
		);
		let ids: Vec<&str> = rec.individual_partners.iter().map(|p| p.id.as_str()).collect();
		assert_eq!(ids, vec!["c", "b"]);
		assert_eq!(rec.individual_partners[0].similarity_score, 0.75);
		assert_eq!(rec.individual_partners[0].age_difference_months, 5);
		assert_eq!(rec.similarity_scores.len(), 2);
		assert!(rec.recommended_groups.is_empty());
	}

	#[test]
	fn skip_first_drops_true_neighbor_for_outsider() {
		let (population, index) = fixture();
		let outsider = record("z", "2020-01-01");
		let neighbors = hits(&[(1, 0.1), (2, 0.2)]);
		let rec = assemble(
			&outsider,
			&neighbors,
			&index,
			&population,
			&[],
			SelfMatchPolicy::SkipFirst,
			&encoder(),
		);
		assert_eq!(rec.individual_partners.len(), 1);
		assert_eq!(rec.individual_partners[0].id, "c");
	}

	#[test]
	fn skip_by_id_keeps_outsider_neighbors() {
		let (population, index) = fixture();
		let outsider = record("z", "2020-01-01");
		let neighbors = hits(&[(1, 0.1), (2, 0.2)]);
		let rec = assemble(
			&outsider,
			&neighbors,
			&index,
			&population,
			&[],
			SelfMatchPolicy::SkipById,
			&encoder(),
		);
		assert_eq!(rec.individual_partners.len(), 2);

		let member = assemble(
			&population[2],
			&hits(&[(2, 0.0), (0, 0.3)]),
			&index,
			&population,
			&[],
			SelfMatchPolicy::SkipById,
			&encoder(),
		);
		assert_eq!(member.individual_partners.len(), 1);
		assert_eq!(member.individual_partners[0].id, "a");
	}

	#[test]
	fn excluded_ids_are_removed() {
		let (population, index) = fixture();
		let neighbors = hits(&[(0, 0.0), (2, 0.25), (1, 0.5)]);
		let rec = assemble(
			&population[0],
			&neighbors,
			&index,
			&population,
			&["c".to_string()],
			SelfMatchPolicy::SkipFirst,
			&encoder(),
		);
		assert_eq!(rec.individual_partners.len(), 1);
		assert_eq!(rec.individual_partners[0].id, "b");
	}

	#[test]
	fn scores_are_clamped_and_rounded() {
		assert_eq!(similarity_from_distance(1.4), 0.0);
		assert_eq!(similarity_from_distance(-0.0001), 1.0);
		assert_eq!(round3(0.30549), 0.305);
		assert_eq!(round3(0.0006), 0.001);
	}

	#[test]
	fn target_without_id_reports_unknown() {
		let summary = summarize_target(&ChildRecord::default(), &encoder());
		assert_eq!(summary.id, "unknown");
		assert_eq!(summary.age_months, 0);
		assert_eq!(summary.program, "infant");
	}
}
