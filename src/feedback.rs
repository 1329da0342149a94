// ---------------------------------------------------------------------------
// Feedback classifier: multinomial Naive Bayes over parent feedback
// ---------------------------------------------------------------------------
//
// Two classes (`positive`, `needs_improvement`). Each prediction combines a
// class prior, Laplace-smoothed word likelihoods, and the empirical
// likelihood of the service category and rating seen during training. Log
// space throughout; the two class scores are normalized at the end.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FeedbackError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Laplace smoothing constant for word likelihoods.
const ALPHA: f64 = 1.0;

/// Ratings at or above this are generally positive.
const RATING_THRESHOLD: f64 = 3.0;

const SERVICE_CATEGORIES: [&str; 6] = ["meal", "activity", "communication", "staff", "facility", "safety"];

const POSITIVE_WORDS: [&str; 29] = [
	"excellent", "great", "wonderful", "amazing", "fantastic", "good", "love", "happy",
	"satisfied", "pleased", "outstanding", "perfect", "brilliant", "superb", "marvelous",
	"delicious", "clean", "friendly", "helpful", "professional", "caring", "attentive",
	"thank", "appreciate", "recommend", "best", "awesome", "terrific", "fabulous",
];

const NEGATIVE_WORDS: [&str; 31] = [
	"bad", "terrible", "awful", "horrible", "disappointed", "unhappy", "angry", "frustrated",
	"poor", "worst", "hate", "disgusting", "dirty", "rude", "unprofessional", "careless",
	"slow", "late", "cold", "tasteless", "boring", "unsafe", "problem", "issue", "complaint",
	"unsatisfied", "displeased", "annoyed", "upset", "concerned", "worried",
];

static NON_LETTERS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^a-zA-Z\s]").expect("static pattern compiles"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLabel {
	Positive,
	NeedsImprovement,
}

impl FeedbackLabel {
	pub fn parse(label: &str) -> Option<Self> {
		match label {
			"positive" => Some(Self::Positive),
			"needs_improvement" => Some(Self::NeedsImprovement),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Positive => "positive",
			Self::NeedsImprovement => "needs_improvement",
		}
	}
}

/// A pair of per-class values, keyed the way they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerClass<T> {
	pub positive: T,
	pub needs_improvement: T,
}

impl<T> PerClass<T> {
	pub fn get(&self, label: FeedbackLabel) -> &T {
		match label {
			FeedbackLabel::Positive => &self.positive,
			FeedbackLabel::NeedsImprovement => &self.needs_improvement,
		}
	}

	fn get_mut(&mut self, label: FeedbackLabel) -> &mut T {
		match label {
			FeedbackLabel::Positive => &mut self.positive,
			FeedbackLabel::NeedsImprovement => &mut self.needs_improvement,
		}
	}
}

/// One labelled (or unlabelled, at prediction time) feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
	pub feedback_text: String,
	pub rating: f64,
	pub service_category: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesUsed {
	pub word_count: usize,
	pub rating: f64,
	pub service_category: String,
	pub has_positive_words: bool,
	pub has_negative_words: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPrediction {
	pub predicted_class: FeedbackLabel,
	pub confidence: f64,
	pub probabilities: PerClass<f64>,
	pub features_used: FeaturesUsed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
	pub vocabulary_size: usize,
	pub total_documents: u64,
	pub class_distribution: PerClass<u64>,
	pub is_trained: bool,
	pub service_categories: Vec<String>,
	pub positive_words_count: usize,
	pub negative_words_count: usize,
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Lowercase, blank out anything that is not an ASCII letter or whitespace,
/// and keep tokens of at least two characters.
pub fn preprocess_text(text: &str) -> Vec<String> {
	let lowered = text.to_lowercase();
	NON_LETTERS
		.replace_all(&lowered, " ")
		.split_whitespace()
		.filter(|w| w.len() >= 2)
		.map(str::to_string)
		.collect()
}

/// Integral ratings key as `"5"`, others in shortest decimal form (`"4.5"`).
fn rating_key(rating: f64) -> String {
	if rating.is_finite() && rating.fract() == 0.0 {
		format!("{}", rating as i64)
	} else {
		format!("{rating}")
	}
}

fn ln_if_positive(p: f64) -> f64 {
	if p > 0.0 {
		p.ln()
	} else {
		0.0
	}
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackClassifier {
	vocabulary: BTreeSet<String>,
	word_counts: PerClass<BTreeMap<String, u64>>,
	category_counts: PerClass<BTreeMap<String, u64>>,
	rating_counts: PerClass<BTreeMap<String, u64>>,
	class_counts: PerClass<u64>,
	total_documents: u64,
	is_trained: bool,
	positive_words: BTreeSet<String>,
	negative_words: BTreeSet<String>,
	service_categories: Vec<String>,
	rating_threshold: f64,
}

#[derive(Serialize, Deserialize)]
struct ClassifierFile {
	#[serde(flatten)]
	classifier: FeedbackClassifier,
	saved_at: String,
}

impl Default for FeedbackClassifier {
	fn default() -> Self {
		Self::new()
	}
}

impl FeedbackClassifier {
	pub fn new() -> Self {
		Self {
			vocabulary: BTreeSet::new(),
			word_counts: PerClass::default(),
			category_counts: PerClass::default(),
			rating_counts: PerClass::default(),
			class_counts: PerClass::default(),
			total_documents: 0,
			is_trained: false,
			positive_words: POSITIVE_WORDS.iter().map(|w| w.to_string()).collect(),
			negative_words: NEGATIVE_WORDS.iter().map(|w| w.to_string()).collect(),
			service_categories: SERVICE_CATEGORIES.iter().map(|c| c.to_string()).collect(),
			rating_threshold: RATING_THRESHOLD,
		}
	}

	pub fn is_trained(&self) -> bool {
		self.is_trained
	}

	/// Accumulate counts from `entries`. Entries without a recognised label
	/// are skipped. Returns how many entries were accepted.
	pub fn train(&mut self, entries: &[FeedbackEntry]) -> usize {
		let mut accepted = 0;
		for entry in entries {
			let Some(label) = entry.label.as_deref().and_then(FeedbackLabel::parse) else {
				continue;
			};

			let words = preprocess_text(&entry.feedback_text);
			let word_counts = self.word_counts.get_mut(label);
			for word in &words {
				*word_counts.entry(word.clone()).or_insert(0) += 1;
			}
			self.vocabulary.extend(words);

			*self
				.category_counts
				.get_mut(label)
				.entry(entry.service_category.to_lowercase())
				.or_insert(0) += 1;
			*self
				.rating_counts
				.get_mut(label)
				.entry(rating_key(entry.rating))
				.or_insert(0) += 1;

			*self.class_counts.get_mut(label) += 1;
			self.total_documents += 1;
			accepted += 1;
		}

		self.is_trained = true;
		tracing::info!(
			documents = self.total_documents,
			vocabulary = self.vocabulary.len(),
			positive = self.class_counts.positive,
			needs_improvement = self.class_counts.needs_improvement,
			"Feedback classifier trained"
		);
		accepted
	}

	/// P(word | label) with Laplace smoothing.
	pub fn word_probability(&self, word: &str, label: FeedbackLabel) -> f64 {
		let counts = self.word_counts.get(label);
		let count = counts.get(word).copied().unwrap_or(0) as f64;
		let total: u64 = counts.values().sum();
		(count + ALPHA) / (total as f64 + ALPHA * self.vocabulary.len() as f64)
	}

	/// P(category | label); 0 when the class has no documents.
	pub fn category_probability(&self, category: &str, label: FeedbackLabel) -> f64 {
		let docs = *self.class_counts.get(label);
		if docs == 0 {
			return 0.0;
		}
		let count = self
			.category_counts
			.get(label)
			.get(&category.to_lowercase())
			.copied()
			.unwrap_or(0);
		count as f64 / docs as f64
	}

	/// P(rating | label); 0 when the class has no documents.
	pub fn rating_probability(&self, rating: f64, label: FeedbackLabel) -> f64 {
		let docs = *self.class_counts.get(label);
		if docs == 0 {
			return 0.0;
		}
		let count = self
			.rating_counts
			.get(label)
			.get(&rating_key(rating))
			.copied()
			.unwrap_or(0);
		count as f64 / docs as f64
	}

	fn log_likelihood(&self, words: &[String], rating: f64, category: &str, label: FeedbackLabel) -> f64 {
		let prior = *self.class_counts.get(label) as f64 / self.total_documents as f64;
		if prior == 0.0 {
			return f64::NEG_INFINITY;
		}

		let mut score = prior.ln();
		for word in words.iter().filter(|w| self.vocabulary.contains(*w)) {
			score += ln_if_positive(self.word_probability(word, label));
		}
		score += ln_if_positive(self.category_probability(category, label));
		score += ln_if_positive(self.rating_probability(rating, label));
		score
	}

	pub fn predict(
		&self,
		feedback_text: &str,
		rating: f64,
		service_category: &str,
	) -> Result<FeedbackPrediction, FeedbackError> {
		if !self.is_trained || self.total_documents == 0 {
			return Err(FeedbackError::NotTrained);
		}

		let words = preprocess_text(feedback_text);
		let log_pos = self.log_likelihood(&words, rating, service_category, FeedbackLabel::Positive);
		let log_ni =
			self.log_likelihood(&words, rating, service_category, FeedbackLabel::NeedsImprovement);

		let max = log_pos.max(log_ni);
		let mut p_pos = (log_pos - max).exp();
		let mut p_ni = (log_ni - max).exp();
		let total = p_pos + p_ni;
		if total > 0.0 {
			p_pos /= total;
			p_ni /= total;
		}

		let predicted_class = if p_pos > p_ni {
			FeedbackLabel::Positive
		} else {
			FeedbackLabel::NeedsImprovement
		};

		Ok(FeedbackPrediction {
			predicted_class,
			confidence: p_pos.max(p_ni),
			probabilities: PerClass {
				positive: p_pos,
				needs_improvement: p_ni,
			},
			features_used: FeaturesUsed {
				word_count: words.len(),
				rating,
				service_category: service_category.to_string(),
				has_positive_words: words.iter().any(|w| self.positive_words.contains(w)),
				has_negative_words: words.iter().any(|w| self.negative_words.contains(w)),
			},
		})
	}

	pub fn stats(&self) -> FeedbackStats {
		FeedbackStats {
			vocabulary_size: self.vocabulary.len(),
			total_documents: self.total_documents,
			class_distribution: self.class_counts.clone(),
			is_trained: self.is_trained,
			service_categories: self.service_categories.clone(),
			positive_words_count: self.positive_words.len(),
			negative_words_count: self.negative_words.len(),
		}
	}

	// -- Persistence ---------------------------------------------------------

	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FeedbackError> {
		let path = path.as_ref();
		let file = ClassifierFile {
			classifier: self.clone(),
			saved_at: chrono::Local::now().to_rfc3339(),
		};
		let json = serde_json::to_string_pretty(&file)
			.map_err(|e| FeedbackError::Serialization(e.to_string()))?;
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}
		fs::write(path, json)?;
		tracing::info!(path = %path.display(), "Feedback classifier saved");
		Ok(())
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, FeedbackError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path)?;
		let file: ClassifierFile = serde_json::from_str(&raw)
			.map_err(|e| FeedbackError::Serialization(format!("{}: {}", path.display(), e)))?;
		tracing::info!(
			path = %path.display(),
			vocabulary = file.classifier.vocabulary.len(),
			saved_at = %file.saved_at,
			"Feedback classifier loaded"
		);
		Ok(file.classifier)
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sample::feedback_training_data;

	fn trained() -> FeedbackClassifier {
		let mut classifier = FeedbackClassifier::new();
		classifier.train(&feedback_training_data());
		classifier
	}

	#[test]
	fn preprocess_strips_punctuation_and_short_words() {
		let words = preprocess_text("My child is HAPPY, thank you! 10/10 a+");
		assert_eq!(words, vec!["my", "child", "is", "happy", "thank", "you"]);
		assert!(preprocess_text("").is_empty());
	}

	#[test]
	fn rating_keys() {
		assert_eq!(rating_key(5.0), "5");
		assert_eq!(rating_key(4.5), "4.5");
	}

	#[test]
	fn training_counts() {
		let classifier = trained();
		let stats = classifier.stats();
		assert_eq!(stats.total_documents, 34);
		assert_eq!(stats.class_distribution.positive, 16);
		assert_eq!(stats.class_distribution.needs_improvement, 18);
		assert_eq!(stats.vocabulary_size, 114);
		assert_eq!(stats.positive_words_count, 29);
		assert_eq!(stats.negative_words_count, 31);
		assert!(stats.is_trained);
	}

	#[test]
	fn unlabelled_entries_are_skipped() {
		let mut classifier = FeedbackClassifier::new();
		let accepted = classifier.train(&[
			FeedbackEntry {
				feedback_text: "fine".into(),
				rating: 3.0,
				service_category: "meal".into(),
				label: None,
			},
			FeedbackEntry {
				feedback_text: "great".into(),
				rating: 5.0,
				service_category: "meal".into(),
				label: Some("neutral".into()),
			},
		]);
		assert_eq!(accepted, 0);
		assert!(matches!(
			classifier.predict("great", 5.0, "meal"),
			Err(FeedbackError::NotTrained)
		));
	}

	#[test]
	fn predict_before_training_fails() {
		let classifier = FeedbackClassifier::new();
		assert!(matches!(
			classifier.predict("anything", 3.0, "meal"),
			Err(FeedbackError::NotTrained)
		));
	}

	#[test]
	fn classifies_clear_cases() {
		let classifier = trained();

		let praise = classifier
			.predict("The food was amazing and my child loved it!", 5.0, "meal")
			.unwrap();
		assert_eq!(praise.predicted_class, FeedbackLabel::Positive);
		assert!(praise.confidence > 0.9);
		assert!(praise.features_used.has_positive_words);
		assert_eq!(praise.features_used.word_count, 9);

		let complaint = classifier
			.predict("Facility is dirty and unsafe", 1.0, "facility")
			.unwrap();
		assert_eq!(complaint.predicted_class, FeedbackLabel::NeedsImprovement);
		assert!(complaint.features_used.has_negative_words);

		let lukewarm = classifier
			.predict("Good activities but could be better", 3.0, "activity")
			.unwrap();
		assert_eq!(lukewarm.predicted_class, FeedbackLabel::NeedsImprovement);
	}

	#[test]
	fn unseen_input_falls_back_to_prior() {
		let classifier = trained();
		let result = classifier.predict("zz qq", 4.5, "other").unwrap();
		assert_eq!(result.predicted_class, FeedbackLabel::NeedsImprovement);
		assert!((result.probabilities.needs_improvement - 18.0 / 34.0).abs() < 1e-10);
	}

	#[test]
	fn probabilities_sum_to_one() {
		let classifier = trained();
		for entry in feedback_training_data() {
			let p = classifier
				.predict(&entry.feedback_text, entry.rating, &entry.service_category)
				.unwrap();
			let sum = p.probabilities.positive + p.probabilities.needs_improvement;
			assert!((sum - 1.0).abs() < 1e-10);
			assert!(p.confidence >= 0.5);
		}
	}

	#[test]
	fn single_class_training_still_predicts() {
		let mut classifier = FeedbackClassifier::new();
		classifier.train(&feedback_training_data()[..8]);
		let result = classifier.predict("great food", 5.0, "meal").unwrap();
		assert_eq!(result.predicted_class, FeedbackLabel::Positive);
		assert_eq!(result.probabilities.needs_improvement, 0.0);
	}

	#[test]
	fn save_and_load_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("feedback.json");
		let classifier = trained();
		classifier.save(&path).unwrap();

		let raw: serde_json::Value =
			serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
		assert!(raw.get("saved_at").is_some());
		assert_eq!(raw["class_counts"]["positive"], 16);

		let loaded = FeedbackClassifier::load(&path).unwrap();
		assert_eq!(loaded, classifier);
		let a = classifier.predict("Staff is rude", 1.0, "staff").unwrap();
		let b = loaded.predict("Staff is rude", 1.0, "staff").unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn load_missing_or_corrupt_fails() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(
			FeedbackClassifier::load(dir.path().join("none.json")),
			Err(FeedbackError::Io(_))
		));
		let bad = dir.path().join("bad.json");
		fs::write(&bad, "not json").unwrap();
		assert!(matches!(
			FeedbackClassifier::load(&bad),
			Err(FeedbackError::Serialization(_))
		));
	}
}
