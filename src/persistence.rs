// ---------------------------------------------------------------------------
// Grouping model persistence: pretty JSON, rehydrated from source records
// ---------------------------------------------------------------------------
//
// The file stores hyperparameters, the fixed encoder tables, the fitted
// standardization statistics and the raw population. Loading re-encodes the
// population and rebuilds the similarity index under the stored statistics;
// no index internals are ever written. Any missing or malformed file fails
// the load outright.
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assembler::SelfMatchPolicy;
use crate::encoder::{feature_columns, INTEREST_CATEGORIES};
use crate::error::GroupingError;
use crate::grouping::{ChildGroupingModel, GroupingConfig};
use crate::scaler::Standardizer;
use crate::types::{ChildRecord, Program};

/// On-disk layout of a saved grouping model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
	pub k_neighbors: usize,
	pub min_group_size: usize,
	pub max_group_size: usize,
	#[serde(default)]
	pub self_match: SelfMatchPolicy,
	pub feature_columns: Vec<String>,
	pub interest_categories: Vec<String>,
	pub age_groups: BTreeMap<String, (u32, u32)>,
	pub scaler_mean: Vec<f64>,
	pub scaler_scale: Vec<f64>,
	pub children_data: Vec<ChildRecord>,
}

fn age_groups() -> BTreeMap<String, (u32, u32)> {
	Program::ALL
		.iter()
		.map(|p| (p.label().to_string(), p.age_band_years()))
		.collect()
}

impl ModelFile {
	pub fn from_model(model: &ChildGroupingModel) -> Result<Self, GroupingError> {
		let (Some(children), Some(scaler)) = (model.children(), model.scaler()) else {
			return Err(GroupingError::NotFitted);
		};
		let config = model.config();
		Ok(Self {
			k_neighbors: config.k_neighbors,
			min_group_size: config.min_group_size,
			max_group_size: config.max_group_size,
			self_match: config.self_match,
			feature_columns: feature_columns(),
			interest_categories: INTEREST_CATEGORIES.iter().map(|s| s.to_string()).collect(),
			age_groups: age_groups(),
			scaler_mean: scaler.mean().to_vec(),
			scaler_scale: scaler.scale().to_vec(),
			children_data: children.to_vec(),
		})
	}

	/// Check the stored encoder tables match the ones this build encodes with.
	fn check_tables(&self) -> Result<(), GroupingError> {
		if self.interest_categories != INTEREST_CATEGORIES {
			return Err(GroupingError::Corruption(
				"interest vocabulary does not match encoder".into(),
			));
		}
		if self.feature_columns != feature_columns() {
			return Err(GroupingError::Corruption(
				"feature columns do not match encoder".into(),
			));
		}
		Ok(())
	}

	pub fn into_model(self, today: NaiveDate) -> Result<ChildGroupingModel, GroupingError> {
		self.check_tables()?;
		let scaler = Standardizer::from_parts(self.scaler_mean, self.scaler_scale)?;
		let config = GroupingConfig {
			k_neighbors: self.k_neighbors,
			min_group_size: self.min_group_size,
			max_group_size: self.max_group_size,
			self_match: self.self_match,
		};
		ChildGroupingModel::from_parts(config, self.children_data, scaler, today)
	}
}

pub fn save_model(model: &ChildGroupingModel, path: &Path) -> Result<(), GroupingError> {
	let file = ModelFile::from_model(model)?;
	let json = serde_json::to_string_pretty(&file)
		.map_err(|e| GroupingError::Serialization(e.to_string()))?;

	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, json)?;

	tracing::info!(path = %path.display(), children = file.children_data.len(), "Grouping model saved");
	Ok(())
}

pub fn load_model(path: &Path, today: NaiveDate) -> Result<ChildGroupingModel, GroupingError> {
	let raw = fs::read_to_string(path)?;
	let file: ModelFile = serde_json::from_str(&raw)
		.map_err(|e| GroupingError::Serialization(format!("{}: {}", path.display(), e)))?;
	let model = file.into_model(today)?;

	tracing::info!(path = %path.display(), "Grouping model loaded");
	Ok(model)
}
