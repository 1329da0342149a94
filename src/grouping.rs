// ---------------------------------------------------------------------------
// ChildGroupingModel: fitted KNN recommender for activity groups
// ---------------------------------------------------------------------------
//
// Ties the encoder, similarity index, assembler and partitioner together.
// Owns the fitted population; the index keeps its own row -> id mapping
// built from that population at fit time. Not synchronized: one model per
// caller.
// ---------------------------------------------------------------------------

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::assembler::{assemble, SelfMatchPolicy};
use crate::encoder::{is_known_interest, FeatureEncoder};
use crate::error::GroupingError;
use crate::index::SimilarityIndex;
use crate::partition::partition;
use crate::persistence;
use crate::scaler::Standardizer;
use crate::types::{ActivityRecommendation, ChildRecord, Recommendation};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingConfig {
	pub k_neighbors: usize,
	pub min_group_size: usize,
	pub max_group_size: usize,
	pub self_match: SelfMatchPolicy,
}

impl Default for GroupingConfig {
	fn default() -> Self {
		Self {
			k_neighbors: 3,
			min_group_size: 2,
			max_group_size: 6,
			self_match: SelfMatchPolicy::SkipFirst,
		}
	}
}

impl GroupingConfig {
	pub fn validate(&self) -> Result<(), GroupingError> {
		if self.max_group_size == 0 {
			return Err(GroupingError::InvalidConfig(
				"max_group_size must be at least 1".into(),
			));
		}
		if self.min_group_size > self.max_group_size {
			return Err(GroupingError::InvalidConfig(format!(
				"min_group_size ({}) exceeds max_group_size ({})",
				self.min_group_size, self.max_group_size
			)));
		}
		Ok(())
	}
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FittedPopulation {
	children: Vec<ChildRecord>,
	index: SimilarityIndex,
}

#[derive(Debug, Clone)]
pub struct ChildGroupingModel {
	config: GroupingConfig,
	fitted: Option<FittedPopulation>,
}

fn row_ids(children: &[ChildRecord]) -> Vec<String> {
	children
		.iter()
		.enumerate()
		.map(|(row, child)| child.id.clone().unwrap_or_else(|| format!("child_{row}")))
		.collect()
}

fn local_today() -> NaiveDate {
	Local::now().date_naive()
}

impl ChildGroupingModel {
	pub fn new(config: GroupingConfig) -> Result<Self, GroupingError> {
		config.validate()?;
		Ok(Self {
			config,
			fitted: None,
		})
	}

	pub fn config(&self) -> &GroupingConfig {
		&self.config
	}

	/// Switch how the query child's own row is skipped. Takes effect on the
	/// next recommendation; no refit needed.
	pub fn set_self_match_policy(&mut self, policy: SelfMatchPolicy) {
		self.config.self_match = policy;
	}

	pub fn is_fitted(&self) -> bool {
		self.fitted.is_some()
	}

	/// The fitted population, in index row order.
	pub fn children(&self) -> Option<&[ChildRecord]> {
		self.fitted.as_ref().map(|f| f.children.as_slice())
	}

	pub fn scaler(&self) -> Option<&Standardizer> {
		self.fitted.as_ref().map(|f| f.index.scaler())
	}

	/// Neighbors requested per query: one extra slot for the child itself.
	pub fn effective_neighbors(&self) -> usize {
		let population = self.fitted.as_ref().map_or(0, |f| f.index.len());
		(self.config.k_neighbors + 1).min(population)
	}

	// -- Fitting -------------------------------------------------------------

	pub fn fit(&mut self, children: Vec<ChildRecord>) -> Result<(), GroupingError> {
		self.fit_on(children, local_today())
	}

	/// Fit standardization and the similarity index with ages measured on `today`.
	pub fn fit_on(&mut self, children: Vec<ChildRecord>, today: NaiveDate) -> Result<(), GroupingError> {
		if children.is_empty() {
			return Err(GroupingError::EmptyPopulation);
		}
		let features = FeatureEncoder::new(today).encode_all(&children);
		let index = SimilarityIndex::fit(&features, row_ids(&children))?;
		tracing::info!(children = children.len(), "KNN grouping model trained");
		self.fitted = Some(FittedPopulation { children, index });
		Ok(())
	}

	/// Rebuild from persisted parts: the index is re-derived from the raw
	/// population under the stored statistics, never refitted.
	pub(crate) fn from_parts(
		config: GroupingConfig,
		children: Vec<ChildRecord>,
		scaler: Standardizer,
		today: NaiveDate,
	) -> Result<Self, GroupingError> {
		config.validate()?;
		if children.is_empty() {
			return Err(GroupingError::EmptyPopulation);
		}
		let features = FeatureEncoder::new(today).encode_all(&children);
		let index = SimilarityIndex::with_scaler(scaler, &features, row_ids(&children))?;
		Ok(Self {
			config,
			fitted: Some(FittedPopulation { children, index }),
		})
	}

	// -- Recommendations -----------------------------------------------------

	pub fn recommend(
		&self,
		target: &ChildRecord,
		exclude_ids: &[String],
	) -> Result<Recommendation, GroupingError> {
		self.recommend_on(target, exclude_ids, local_today())
	}

	/// Partners and groups for `target`, excluding `exclude_ids`.
	pub fn recommend_on(
		&self,
		target: &ChildRecord,
		exclude_ids: &[String],
		today: NaiveDate,
	) -> Result<Recommendation, GroupingError> {
		let fitted = self.fitted.as_ref().ok_or(GroupingError::NotFitted)?;
		let encoder = FeatureEncoder::new(today);

		let query = encoder.encode(target);
		let neighbors = fitted.index.query(&query, self.effective_neighbors())?;

		let mut recommendation = assemble(
			target,
			&neighbors,
			&fitted.index,
			&fitted.children,
			exclude_ids,
			self.config.self_match,
			&encoder,
		);
		recommendation.recommended_groups = partition(
			&recommendation.individual_partners,
			self.config.min_group_size,
			self.config.max_group_size,
		);

		tracing::debug!(
			target = %recommendation.target_child.id,
			partners = recommendation.individual_partners.len(),
			groups = recommendation.recommended_groups.len(),
			"Recommendation assembled"
		);
		Ok(recommendation)
	}

	pub fn activity_recommendations(
		&self,
		target: &ChildRecord,
		activity_type: Option<&str>,
	) -> Result<ActivityRecommendation, GroupingError> {
		self.activity_recommendations_on(target, activity_type, local_today())
	}

	/// Recommendation plus, when `activity_type` is given, the partners who
	/// list that interest. An activity outside the vocabulary matches nobody.
	pub fn activity_recommendations_on(
		&self,
		target: &ChildRecord,
		activity_type: Option<&str>,
		today: NaiveDate,
	) -> Result<ActivityRecommendation, GroupingError> {
		let recommendation = self.recommend_on(target, &[], today)?;

		let activity_specific_partners = activity_type.map(|activity| {
			if !is_known_interest(activity) {
				return Vec::new();
			}
			recommendation
				.individual_partners
				.iter()
				.filter(|p| p.has_interest(activity))
				.cloned()
				.collect()
		});

		Ok(ActivityRecommendation {
			recommendation,
			activity_specific_partners,
			activity_type: activity_type.map(str::to_string),
		})
	}

	// -- Persistence ---------------------------------------------------------

	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GroupingError> {
		persistence::save_model(self, path.as_ref())
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, GroupingError> {
		Self::load_on(path, local_today())
	}

	pub fn load_on(path: impl AsRef<Path>, today: NaiveDate) -> Result<Self, GroupingError> {
		persistence::load_model(path.as_ref(), today)
	}
}
