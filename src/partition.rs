// ---------------------------------------------------------------------------
// Group partitioner: fixed-stride grouping of ranked partners
// ---------------------------------------------------------------------------
//
// Partners are ranked by similarity and cut into consecutive windows of
// `max_size`. Windows shorter than `min_size` are dropped, never merged into
// a neighbor, so a small remainder can leave some partners ungrouped.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashSet};

use crate::assembler::round3;
use crate::types::{AgeRange, Group, PartnerMatch};

/// Interests held by at least two distinct members, sorted alphabetically.
pub fn common_interests(members: &[PartnerMatch]) -> Vec<String> {
	let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
	for member in members {
		let unique: HashSet<&str> = member.interests.iter().map(String::as_str).collect();
		for interest in unique {
			*counts.entry(interest).or_insert(0) += 1;
		}
	}
	counts
		.into_iter()
		.filter(|&(_, count)| count >= 2)
		.map(|(interest, _)| interest.to_string())
		.collect()
}

fn build_group(group_number: usize, members: Vec<PartnerMatch>) -> Group {
	let total: f64 = members.iter().map(|m| m.similarity_score).sum();
	let average_similarity = round3(total / members.len() as f64);
	let age_range_months = AgeRange {
		min: members.iter().map(|m| m.age_months).min().unwrap_or(0),
		max: members.iter().map(|m| m.age_months).max().unwrap_or(0),
	};
	let common_interests = common_interests(&members);
	let group_size = members.len();

	Group {
		group_id: format!("group_{group_number}"),
		members,
		average_similarity,
		age_range_months,
		common_interests,
		group_size,
	}
}

/// Partition `partners` into groups of `min_size..=max_size` members.
///
/// Fewer than `min_size` partners (or a zero `max_size`) yields no groups.
pub fn partition(partners: &[PartnerMatch], min_size: usize, max_size: usize) -> Vec<Group> {
	if max_size == 0 || partners.len() < min_size {
		return Vec::new();
	}

	let mut ranked = partners.to_vec();
	// Stable: equal scores keep neighbor-search order.
	ranked.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));

	let mut groups = Vec::new();
	for window in ranked.chunks(max_size) {
		if window.len() < min_size {
			tracing::debug!(
				dropped = window.len(),
				min_size,
				"Discarding undersized trailing window"
			);
			continue;
		}
		groups.push(build_group(groups.len() + 1, window.to_vec()));
	}
	groups
}

#[cfg(test)]
mod tests {
	use super::*;

	fn partner(id: &str, score: f64, age: i32, interests: &[&str]) -> PartnerMatch {
		PartnerMatch {
			id: id.into(),
			name: id.into(),
			age_months: age,
			interests: interests.iter().map(|s| s.to_string()).collect(),
			program: "preschool".into(),
			similarity_score: score,
			age_difference_months: 0,
		}
	}

	fn partners(n: usize) -> Vec<PartnerMatch> {
		(0..n)
			.map(|i| partner(&format!("p{i}"), 0.9 - i as f64 * 0.1, 60 + i as i32, &[]))
			.collect()
	}

	fn sizes(groups: &[Group]) -> Vec<usize> {
		groups.iter().map(|g| g.group_size).collect()
	}

	#[test]
	fn seven_partners_fill_two_groups() {
		let groups = partition(&partners(7), 2, 4);
		assert_eq!(sizes(&groups), vec![4, 3]);
		assert_eq!(groups[0].group_id, "group_1");
		assert_eq!(groups[1].group_id, "group_2");
	}

	#[test]
	fn undersized_remainder_is_discarded() {
		let input = partners(5);
		let groups = partition(&input, 2, 4);
		assert_eq!(sizes(&groups), vec![4]);
		let grouped: Vec<&str> = groups[0].members.iter().map(|m| m.id.as_str()).collect();
		assert!(!grouped.contains(&"p4"));
	}

	#[test]
	fn too_few_partners_yield_no_groups() {
		assert!(partition(&partners(1), 2, 4).is_empty());
		assert!(partition(&[], 0, 4).is_empty());
		assert!(partition(&partners(3), 1, 0).is_empty());
	}

	#[test]
	fn ranks_by_similarity_with_stable_ties() {
		let input = vec![
			partner("low", 0.2, 50, &[]),
			partner("tie_a", 0.5, 50, &[]),
			partner("high", 0.9, 50, &[]),
			partner("tie_b", 0.5, 50, &[]),
		];
		let groups = partition(&input, 1, 4);
		let order: Vec<&str> = groups[0].members.iter().map(|m| m.id.as_str()).collect();
		assert_eq!(order, vec!["high", "tie_a", "tie_b", "low"]);
	}

	#[test]
	fn group_statistics() {
		let input = vec![
			partner("a", 0.305, 81, &["music", "arts_crafts", "dancing"]),
			partner("b", 0.004, 77, &["reading", "music"]),
			partner("c", 0.0, 73, &["music", "arts_crafts"]),
		];
		let groups = partition(&input, 2, 4);
		assert_eq!(groups.len(), 1);
		let g = &groups[0];
		assert_eq!(g.average_similarity, 0.103);
		assert_eq!(g.age_range_months, AgeRange { min: 73, max: 81 });
		assert_eq!(g.common_interests, vec!["arts_crafts", "music"]);
		assert_eq!(g.group_size, 3);
	}

	#[test]
	fn duplicate_interest_in_one_member_is_not_common() {
		let input = vec![
			partner("a", 0.5, 60, &["music", "music"]),
			partner("b", 0.4, 60, &["reading"]),
		];
		assert!(common_interests(&input).is_empty());
	}

	#[test]
	fn group_sizes_stay_within_bounds() {
		for n in 0..20 {
			for (min, max) in [(1, 3), (2, 4), (3, 5), (2, 6)] {
				for g in partition(&partners(n), min, max) {
					assert!(g.group_size >= min && g.group_size <= max);
					for interest in &g.common_interests {
						let holders = g
							.members
							.iter()
							.filter(|m| m.interests.contains(interest))
							.count();
						assert!(holders >= 2);
					}
				}
			}
		}
	}
}
