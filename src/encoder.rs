// ---------------------------------------------------------------------------
// Feature encoder: child record to fixed-length numeric vector
// ---------------------------------------------------------------------------
//
// Layout: [age_in_months, interest_flag x 20, program_code, gender_code].
// Encoding is permissive: malformed dates, unknown interests, programs and
// genders never fail, they fall back to 0 / ignored / infant / male.
// ---------------------------------------------------------------------------

use chrono::{Datelike, Local, NaiveDate};

use crate::types::{ChildRecord, Gender, Program};

/// Interest vocabulary, in feature-column order.
pub const INTEREST_CATEGORIES: [&str; 20] = [
	"arts_crafts",
	"music",
	"dancing",
	"reading",
	"outdoor_play",
	"building_blocks",
	"puzzles",
	"sports",
	"cooking",
	"science",
	"storytelling",
	"drawing",
	"singing",
	"running",
	"swimming",
	"board_games",
	"pretend_play",
	"gardening",
	"animals",
	"technology",
];

/// Total number of feature columns.
pub const FEATURE_DIM: usize = INTEREST_CATEGORIES.len() + 3;

const AGE_COLUMN: &str = "age_months";
const PROGRAM_COLUMN: &str = "program";
const GENDER_COLUMN: &str = "gender";

/// Column names matching the encoded vector layout.
pub fn feature_columns() -> Vec<String> {
	let mut columns = Vec::with_capacity(FEATURE_DIM);
	columns.push(AGE_COLUMN.to_string());
	columns.extend(INTEREST_CATEGORIES.iter().map(|c| c.to_string()));
	columns.push(PROGRAM_COLUMN.to_string());
	columns.push(GENDER_COLUMN.to_string());
	columns
}

/// Whole months between `birth_date` (`YYYY-MM-DD`) and `today`, one less
/// when the day of month has not been reached yet. Unparseable or missing
/// dates yield 0.
pub fn age_in_months(birth_date: Option<&str>, today: NaiveDate) -> i32 {
	let Some(raw) = birth_date else {
		return 0;
	};
	let birth = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
		Ok(d) => d,
		Err(_) => return 0,
	};
	let mut months = (today.year() - birth.year()) * 12
		+ (today.month() as i32 - birth.month() as i32);
	if today.day() < birth.day() {
		months -= 1;
	}
	months
}

/// Binary indicator per vocabulary term; unknown interests are ignored.
pub fn encode_interests(interests: &[String]) -> [f64; INTEREST_CATEGORIES.len()] {
	let mut flags = [0.0; INTEREST_CATEGORIES.len()];
	for interest in interests {
		if let Some(idx) = INTEREST_CATEGORIES.iter().position(|c| c == interest) {
			flags[idx] = 1.0;
		}
	}
	flags
}

pub fn is_known_interest(interest: &str) -> bool {
	INTEREST_CATEGORIES.contains(&interest)
}

/// Encodes child records relative to a fixed "today".
///
/// Everything but the age column is a pure function of the record; the age
/// column moves with the reference date, so two encoders built on different
/// days may disagree.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder {
	today: NaiveDate,
}

impl FeatureEncoder {
	pub fn new(today: NaiveDate) -> Self {
		Self { today }
	}

	/// Encoder anchored at the local calendar date.
	pub fn today() -> Self {
		Self::new(Local::now().date_naive())
	}

	pub fn age_months(&self, record: &ChildRecord) -> i32 {
		age_in_months(record.date_of_birth.as_deref(), self.today)
	}

	pub fn encode(&self, record: &ChildRecord) -> Vec<f64> {
		let mut vector = Vec::with_capacity(FEATURE_DIM);
		vector.push(self.age_months(record) as f64);
		vector.extend_from_slice(&encode_interests(&record.interests));
		vector.push(Program::from_label(record.program.as_deref()).code());
		vector.push(Gender::from_label(record.gender.as_deref()).code());
		vector
	}

	pub fn encode_all(&self, records: &[ChildRecord]) -> Vec<Vec<f64>> {
		records.iter().map(|r| self.encode(r)).collect()
	}
}
