use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// A child as supplied by the host application.
///
/// Fields the encoder does not understand are kept in `extra` so a persisted
/// population can be written back exactly as it was received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
	#[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date_of_birth: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub program: Option<String>,
	#[serde(default)]
	pub interests: Vec<String>,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChildRecord {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}

	/// Program label as reported back to callers; missing means `infant`.
	pub fn program_label(&self) -> &str {
		self.program.as_deref().unwrap_or(Program::Infant.label())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
	Male,
	Female,
}

impl Gender {
	/// Lenient parse: anything unrecognised (or missing) is `Male`.
	pub fn from_label(label: Option<&str>) -> Self {
		match label {
			Some("female") => Self::Female,
			_ => Self::Male,
		}
	}

	pub fn code(self) -> f64 {
		match self {
			Self::Male => 0.0,
			Self::Female => 1.0,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
	Infant,
	Toddler,
	Preschool,
	Prekindergarten,
}

impl Program {
	pub const ALL: [Program; 4] = [
		Program::Infant,
		Program::Toddler,
		Program::Preschool,
		Program::Prekindergarten,
	];

	/// Lenient parse: anything unrecognised (or missing) is `Infant`.
	pub fn from_label(label: Option<&str>) -> Self {
		match label {
			Some("toddler") => Self::Toddler,
			Some("preschool") => Self::Preschool,
			Some("prekindergarten") => Self::Prekindergarten,
			_ => Self::Infant,
		}
	}

	pub fn code(self) -> f64 {
		match self {
			Self::Infant => 0.0,
			Self::Toddler => 1.0,
			Self::Preschool => 2.0,
			Self::Prekindergarten => 3.0,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Infant => "infant",
			Self::Toddler => "toddler",
			Self::Preschool => "preschool",
			Self::Prekindergarten => "prekindergarten",
		}
	}

	/// Developmental age band in years `(from, to)` served by the program.
	pub fn age_band_years(self) -> (u32, u32) {
		match self {
			Self::Infant => (0, 1),
			Self::Toddler => (1, 3),
			Self::Preschool => (3, 5),
			Self::Prekindergarten => (4, 6),
		}
	}
}

// ---------------------------------------------------------------------------
// Recommendation output (snake_case on the wire)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
	pub id: String,
	pub name: String,
	pub age_months: i32,
	pub interests: Vec<String>,
	pub program: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerMatch {
	pub id: String,
	pub name: String,
	pub age_months: i32,
	pub interests: Vec<String>,
	pub program: String,
	pub similarity_score: f64,
	pub age_difference_months: i32,
}

impl PartnerMatch {
	pub fn has_interest(&self, interest: &str) -> bool {
		self.interests.iter().any(|i| i == interest)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
	pub min: i32,
	pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
	pub group_id: String,
	pub members: Vec<PartnerMatch>,
	pub average_similarity: f64,
	pub age_range_months: AgeRange,
	pub common_interests: Vec<String>,
	pub group_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
	pub target_child: TargetSummary,
	pub recommended_groups: Vec<Group>,
	pub individual_partners: Vec<PartnerMatch>,
	/// Unrounded scores, parallel to `individual_partners`.
	pub similarity_scores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecommendation {
	#[serde(flatten)]
	pub recommendation: Recommendation,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub activity_specific_partners: Option<Vec<PartnerMatch>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub activity_type: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn child_record_keeps_unknown_fields() {
		let raw = serde_json::json!({
			"_id": "child_9",
			"firstName": "Isabella",
			"lastName": "Anderson",
			"dateOfBirth": "2020-09-03",
			"gender": "female",
			"program": "preschool",
			"interests": ["reading"],
			"isActive": true
		});
		let child: ChildRecord = serde_json::from_value(raw.clone()).unwrap();
		assert_eq!(child.id.as_deref(), Some("child_9"));
		assert_eq!(child.extra.get("isActive"), Some(&serde_json::json!(true)));
		assert_eq!(serde_json::to_value(&child).unwrap(), raw);
	}

	#[test]
	fn lenient_enum_parsing() {
		assert_eq!(Gender::from_label(Some("female")), Gender::Female);
		assert_eq!(Gender::from_label(Some("other")), Gender::Male);
		assert_eq!(Gender::from_label(None), Gender::Male);
		assert_eq!(Program::from_label(Some("toddler")).code(), 1.0);
		assert_eq!(Program::from_label(Some("kindergarten")), Program::Infant);
	}

	#[test]
	fn missing_program_reports_infant() {
		let child = ChildRecord::default();
		assert_eq!(child.program_label(), "infant");
		assert_eq!(child.full_name(), " ");
	}

	#[test]
	fn partner_interest_lookup_is_exact() {
		let partner = PartnerMatch {
			id: "child_3".into(),
			name: "Sophia Brown".into(),
			age_months: 81,
			interests: vec!["arts_crafts".into(), "music".into()],
			program: "preschool".into(),
			similarity_score: 0.305,
			age_difference_months: 2,
		};
		assert!(partner.has_interest("music"));
		assert!(!partner.has_interest("Music"));
		assert!(!partner.has_interest("dancing"));
	}
}
