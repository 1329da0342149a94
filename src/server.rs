// ---------------------------------------------------------------------------
// EngineServer: JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes NDJSON requests on stdin to the grouping model and the feedback
// classifier. A `run()` loop, a `dispatch()` match, `with_*` accessors for
// state that must exist first, and free-standing handlers per method.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};
use std::path::PathBuf;

use serde::Deserialize;

use crate::assembler::SelfMatchPolicy;
use crate::error::{EngineError, FeedbackError, GroupingError};
use crate::feedback::{FeedbackClassifier, FeedbackEntry};
use crate::grouping::{ChildGroupingModel, GroupingConfig};
use crate::protocol::{JsonRpcRequest, METHOD_NOT_FOUND};
use crate::sample;
use crate::transport::NdjsonTransport;
use crate::types::ChildRecord;

type HandlerResult = Result<serde_json::Value, EngineError>;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct ServerConfig {
	pub grouping: GroupingConfig,
	pub grouping_model_path: Option<PathBuf>,
	pub feedback_model_path: Option<PathBuf>,
}

/// JSON-RPC server over a grouping model and a feedback classifier.
pub struct EngineServer {
	transport: NdjsonTransport,
	config: ServerConfig,
	grouping: Option<ChildGroupingModel>,
	feedback: Option<FeedbackClassifier>,
}

impl EngineServer {
	/// Create a server; a saved grouping model is loaded if one is configured
	/// and present on disk.
	pub fn new(transport: NdjsonTransport, config: ServerConfig) -> Self {
		let grouping = config
			.grouping_model_path
			.as_ref()
			.filter(|p| p.exists())
			.and_then(|p| match ChildGroupingModel::load(p) {
				Ok(model) => Some(model),
				Err(e) => {
					tracing::warn!(path = %p.display(), "Could not load grouping model: {}", e);
					None
				}
			});

		Self {
			transport,
			config,
			grouping,
			feedback: None,
		}
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), GroupingError> {
		let stdin = io::stdin();
		let reader = stdin.lock();

		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		let result = match req.method.as_str() {
			// -- Grouping ------------------------------------------------
			"grouping/fit" => self.handle_fit(req.params),
			"grouping/recommend" => self.with_grouping(|m| handle_recommend(m, req.params)),
			"grouping/activity" => self.with_grouping(|m| handle_activity(m, req.params)),
			"grouping/save" => self.with_grouping(|m| {
				let p: PathParams = parse_params(req.params)?;
				m.save(&p.path)?;
				Ok(serde_json::json!({}))
			}),
			"grouping/load" => self.handle_grouping_load(req.params),

			// -- Feedback ------------------------------------------------
			"feedback/train" => self.handle_feedback_train(req.params),
			"feedback/classify" => self.with_feedback(|c| handle_classify(c, req.params)),
			"feedback/batchClassify" => {
				self.with_feedback(|c| handle_batch_classify(c, req.params))
			}
			"feedback/stats" => self.with_feedback(|c| to_value(&c.stats())),
			"feedback/save" => self.with_feedback(|c| {
				let p: PathParams = parse_params(req.params)?;
				c.save(&p.path)?;
				Ok(serde_json::json!({}))
			}),
			"feedback/load" => self.handle_feedback_load(req.params),

			// -- Unknown -------------------------------------------------
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					&format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => self.transport.write_engine_error(id, &e),
		}
	}

	// ── State accessors ───────────────────────────────────────────────────

	fn with_grouping<F>(&self, f: F) -> HandlerResult
	where
		F: FnOnce(&ChildGroupingModel) -> HandlerResult,
	{
		match &self.grouping {
			Some(m) => f(m),
			None => Err(GroupingError::NotFitted.into()),
		}
	}

	/// The classifier is trained on the built-in sample set the first time
	/// it is needed, unless a saved one can be loaded.
	fn with_feedback<F>(&mut self, f: F) -> HandlerResult
	where
		F: FnOnce(&FeedbackClassifier) -> HandlerResult,
	{
		if self.feedback.is_none() {
			self.feedback = Some(self.bootstrap_feedback());
		}
		match &self.feedback {
			Some(c) => f(c),
			None => Err(FeedbackError::NotTrained.into()),
		}
	}

	fn bootstrap_feedback(&self) -> FeedbackClassifier {
		if let Some(path) = self.config.feedback_model_path.as_ref().filter(|p| p.exists()) {
			match FeedbackClassifier::load(path) {
				Ok(classifier) => return classifier,
				Err(e) => tracing::warn!("Falling back to sample training: {}", e),
			}
		}

		let mut classifier = FeedbackClassifier::new();
		classifier.train(&sample::feedback_training_data());
		self.persist_feedback(&classifier);
		classifier
	}

	fn persist_feedback(&self, classifier: &FeedbackClassifier) {
		if let Some(path) = &self.config.feedback_model_path {
			if let Err(e) = classifier.save(path) {
				tracing::warn!(path = %path.display(), "Could not save feedback classifier: {}", e);
			}
		}
	}

	// ── Stateful handlers ─────────────────────────────────────────────────

	fn handle_fit(&mut self, params: serde_json::Value) -> HandlerResult {
		let p: FitParams = parse_params(params)?;
		let defaults = &self.config.grouping;
		let config = GroupingConfig {
			k_neighbors: p.k_neighbors.unwrap_or(defaults.k_neighbors),
			min_group_size: p.min_group_size.unwrap_or(defaults.min_group_size),
			max_group_size: p.max_group_size.unwrap_or(defaults.max_group_size),
			self_match: match p.skip_by_id {
				Some(true) => SelfMatchPolicy::SkipById,
				Some(false) => SelfMatchPolicy::SkipFirst,
				None => defaults.self_match,
			},
		};

		let trained = p.children.len();
		let mut model = ChildGroupingModel::new(config)?;
		model.fit(p.children)?;
		self.grouping = Some(model);

		Ok(serde_json::json!({ "trained": trained }))
	}

	fn handle_grouping_load(&mut self, params: serde_json::Value) -> HandlerResult {
		let p: PathParams = parse_params(params)?;
		let model = ChildGroupingModel::load(&p.path)?;
		let count = model.children().map_or(0, |c| c.len());
		self.grouping = Some(model);
		Ok(serde_json::json!({ "children": count }))
	}

	fn handle_feedback_load(&mut self, params: serde_json::Value) -> HandlerResult {
		let p: PathParams = parse_params(params)?;
		let classifier = FeedbackClassifier::load(&p.path)?;
		let stats = to_value(&classifier.stats());
		self.feedback = Some(classifier);
		stats
	}

	fn handle_feedback_train(&mut self, params: serde_json::Value) -> HandlerResult {
		let p: TrainParams = parse_params(params)?;
		let entries = p.entries.unwrap_or_else(sample::feedback_training_data);

		let mut classifier = FeedbackClassifier::new();
		classifier.train(&entries);
		self.persist_feedback(&classifier);
		let stats = to_value(&classifier.stats());
		self.feedback = Some(classifier);
		stats
	}
}

// ---------------------------------------------------------------------------
// Param types
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, EngineError> {
	// Methods without required params accept an absent `params` member.
	let params = if params.is_null() {
		serde_json::json!({})
	} else {
		params
	};
	serde_json::from_value(params).map_err(|e| EngineError::InvalidParams(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> HandlerResult {
	serde_json::to_value(value)
		.map_err(|e| GroupingError::Serialization(e.to_string()).into())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitParams {
	children: Vec<ChildRecord>,
	k_neighbors: Option<usize>,
	min_group_size: Option<usize>,
	max_group_size: Option<usize>,
	skip_by_id: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendParams {
	target: ChildRecord,
	exclude_ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityParams {
	target: ChildRecord,
	activity_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathParams {
	path: PathBuf,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainParams {
	entries: Option<Vec<FeedbackEntry>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchParams {
	entries: Vec<FeedbackEntry>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_recommend(model: &ChildGroupingModel, params: serde_json::Value) -> HandlerResult {
	let p: RecommendParams = parse_params(params)?;
	let recommendation = model.recommend(&p.target, &p.exclude_ids.unwrap_or_default())?;
	to_value(&recommendation)
}

fn handle_activity(model: &ChildGroupingModel, params: serde_json::Value) -> HandlerResult {
	let p: ActivityParams = parse_params(params)?;
	let result = model.activity_recommendations(&p.target, p.activity_type.as_deref())?;
	to_value(&result)
}

fn handle_classify(classifier: &FeedbackClassifier, params: serde_json::Value) -> HandlerResult {
	let entry: FeedbackEntry = parse_params(params)?;
	let prediction =
		classifier.predict(&entry.feedback_text, entry.rating, &entry.service_category)?;
	to_value(&prediction)
}

fn handle_batch_classify(
	classifier: &FeedbackClassifier,
	params: serde_json::Value,
) -> HandlerResult {
	let p: BatchParams = parse_params(params)?;
	let mut results = Vec::with_capacity(p.entries.len());
	for entry in p.entries {
		let classification =
			classifier.predict(&entry.feedback_text, entry.rating, &entry.service_category)?;
		results.push(serde_json::json!({
			"input": entry,
			"classification": classification,
		}));
	}
	Ok(serde_json::json!({ "results": results }))
}
