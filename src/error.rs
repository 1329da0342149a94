use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupingError {
	#[error("Model not fitted: call fit before requesting recommendations")]
	NotFitted,
	#[error("Empty population: at least one child record is required")]
	EmptyPopulation,
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Model file corruption: {0}")]
	Corruption(String),
}

impl GroupingError {
	pub fn code(&self) -> &str {
		match self {
			Self::NotFitted => "GROUPING_NOT_FITTED",
			Self::EmptyPopulation => "GROUPING_EMPTY_POPULATION",
			Self::InvalidConfig(_) => "GROUPING_INVALID_CONFIG",
			Self::Io(_) => "GROUPING_IO",
			Self::Serialization(_) => "GROUPING_SERIALIZATION",
			Self::Corruption(_) => "GROUPING_CORRUPT",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"code": self.code(),
			"message": self.to_string(),
		})
	}
}

#[derive(Debug, Error)]
pub enum FeedbackError {
	#[error("Classifier not trained: call train before classifying feedback")]
	NotTrained,
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl FeedbackError {
	pub fn code(&self) -> &str {
		match self {
			Self::NotTrained => "FEEDBACK_NOT_TRAINED",
			Self::Io(_) => "FEEDBACK_IO",
			Self::Serialization(_) => "FEEDBACK_SERIALIZATION",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"code": self.code(),
			"message": self.to_string(),
		})
	}
}

/// Error surfaced by the engine dispatcher: either domain may fail a request.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error(transparent)]
	Grouping(#[from] GroupingError),
	#[error(transparent)]
	Feedback(#[from] FeedbackError),
	#[error("Invalid params: {0}")]
	InvalidParams(String),
}

impl EngineError {
	pub fn code(&self) -> &str {
		match self {
			Self::Grouping(e) => e.code(),
			Self::Feedback(e) => e.code(),
			Self::InvalidParams(_) => "INVALID_PARAMS",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		match self {
			Self::Grouping(e) => e.to_json_rpc_error(),
			Self::Feedback(e) => e.to_json_rpc_error(),
			Self::InvalidParams(_) => serde_json::json!({
				"code": self.code(),
				"message": self.to_string(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn grouping_codes_are_stable() {
		assert_eq!(GroupingError::NotFitted.code(), "GROUPING_NOT_FITTED");
		assert_eq!(
			GroupingError::Corruption("x".into()).code(),
			"GROUPING_CORRUPT"
		);
	}

	#[test]
	fn engine_error_delegates_payload() {
		let err = EngineError::from(FeedbackError::NotTrained);
		let payload = err.to_json_rpc_error();
		assert_eq!(payload["code"], "FEEDBACK_NOT_TRAINED");
		assert!(payload["message"].as_str().unwrap().contains("not trained"));
	}
}
