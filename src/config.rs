use std::path::PathBuf;

use clap::Parser;

use crate::assembler::SelfMatchPolicy;
use crate::grouping::GroupingConfig;

#[derive(Parser, Debug)]
#[command(
	name = "daycare-ml-engine",
	about = "Child grouping and feedback classification over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct CliArgs {
	/// Saved grouping model to load at startup (ignored if the file is absent)
	#[arg(long, env = "DAYCARE_ML_GROUPING_MODEL")]
	pub grouping_model: Option<PathBuf>,

	/// Feedback classifier file: loaded on first use, written after training
	#[arg(long, env = "DAYCARE_ML_FEEDBACK_MODEL")]
	pub feedback_model: Option<PathBuf>,

	/// Nearest neighbors considered per recommendation
	#[arg(long, default_value = "3")]
	pub k_neighbors: usize,

	/// Smallest recommended group
	#[arg(long, default_value = "2")]
	pub min_group_size: usize,

	/// Largest recommended group
	#[arg(long, default_value = "6")]
	pub max_group_size: usize,

	/// Skip the target's own row by id instead of dropping the first neighbor
	#[arg(long)]
	pub skip_by_id: bool,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "DAYCARE_ML_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn grouping_config(&self) -> GroupingConfig {
		GroupingConfig {
			k_neighbors: self.k_neighbors,
			min_group_size: self.min_group_size,
			max_group_size: self.max_group_size,
			self_match: if self.skip_by_id {
				SelfMatchPolicy::SkipById
			} else {
				SelfMatchPolicy::SkipFirst
			},
		}
	}
}
