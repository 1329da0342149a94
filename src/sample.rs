// ---------------------------------------------------------------------------
// Built-in sample datasets
// ---------------------------------------------------------------------------

use crate::feedback::FeedbackEntry;
use crate::types::ChildRecord;

fn child(
	id: &str,
	first_name: &str,
	last_name: &str,
	date_of_birth: &str,
	gender: &str,
	interests: &[&str],
) -> ChildRecord {
	ChildRecord {
		id: Some(id.to_string()),
		first_name: first_name.to_string(),
		last_name: last_name.to_string(),
		date_of_birth: Some(date_of_birth.to_string()),
		gender: Some(gender.to_string()),
		program: Some("preschool".to_string()),
		interests: interests.iter().map(|s| s.to_string()).collect(),
		extra: Default::default(),
	}
}

/// Six preschool children with four interests each.
pub fn children() -> Vec<ChildRecord> {
	vec![
		child("child_1", "Emma", "Johnson", "2020-03-15", "female", &["arts_crafts", "reading", "music", "drawing"]),
		child("child_2", "Liam", "Smith", "2020-05-22", "male", &["building_blocks", "outdoor_play", "sports", "running"]),
		child("child_3", "Sophia", "Brown", "2020-01-10", "female", &["arts_crafts", "music", "dancing", "singing"]),
		child("child_4", "Noah", "Davis", "2020-07-08", "male", &["building_blocks", "puzzles", "science", "technology"]),
		child("child_5", "Olivia", "Wilson", "2020-04-30", "female", &["reading", "storytelling", "pretend_play", "animals"]),
		child("child_6", "William", "Miller", "2020-06-12", "male", &["outdoor_play", "sports", "running", "swimming"]),
	]
}

/// Ten preschool children with five interests each.
pub fn extended_children() -> Vec<ChildRecord> {
	vec![
		child("child_1", "Emma", "Johnson", "2020-03-15", "female", &["arts_crafts", "reading", "music", "drawing", "storytelling"]),
		child("child_2", "Liam", "Smith", "2020-05-22", "male", &["building_blocks", "outdoor_play", "sports", "running", "technology"]),
		child("child_3", "Sophia", "Brown", "2020-01-10", "female", &["arts_crafts", "music", "dancing", "singing", "pretend_play"]),
		child("child_4", "Noah", "Davis", "2020-07-08", "male", &["building_blocks", "puzzles", "science", "technology", "board_games"]),
		child("child_5", "Olivia", "Wilson", "2020-04-30", "female", &["reading", "storytelling", "pretend_play", "animals", "cooking"]),
		child("child_6", "William", "Miller", "2020-06-12", "male", &["outdoor_play", "sports", "running", "swimming", "gardening"]),
		child("child_7", "Ava", "Garcia", "2020-02-28", "female", &["arts_crafts", "music", "dancing", "drawing", "singing"]),
		child("child_8", "James", "Martinez", "2020-08-15", "male", &["building_blocks", "puzzles", "science", "technology", "outdoor_play"]),
		child("child_9", "Isabella", "Anderson", "2020-09-03", "female", &["reading", "storytelling", "pretend_play", "animals", "cooking"]),
		child("child_10", "Benjamin", "Taylor", "2020-10-20", "male", &["outdoor_play", "sports", "running", "swimming", "building_blocks"]),
	]
}

fn entry(feedback_text: &str, rating: f64, service_category: &str, label: &str) -> FeedbackEntry {
	FeedbackEntry {
		feedback_text: feedback_text.to_string(),
		rating,
		service_category: service_category.to_string(),
		label: Some(label.to_string()),
	}
}

/// Labelled parent feedback used to bootstrap the classifier.
pub fn feedback_training_data() -> Vec<FeedbackEntry> {
	vec![
		entry("The food was excellent and my child loved it!", 5.0, "meal", "positive"),
		entry("Great activities, very engaging and fun", 4.0, "activity", "positive"),
		entry("Staff communication is wonderful, always helpful", 5.0, "communication", "positive"),
		entry("Amazing facility, clean and safe environment", 5.0, "facility", "positive"),
		entry("My child is very happy here, thank you!", 4.0, "activity", "positive"),
		entry("Delicious meals, well balanced nutrition", 4.0, "meal", "positive"),
		entry("Professional staff, caring and attentive", 5.0, "staff", "positive"),
		entry("Outstanding safety measures, very secure", 5.0, "safety", "positive"),
		entry("Food was cold and tasteless, very disappointed", 2.0, "meal", "needs_improvement"),
		entry("Activities are boring and not engaging", 2.0, "activity", "needs_improvement"),
		entry("Poor communication, staff never responds", 1.0, "communication", "needs_improvement"),
		entry("Facility is dirty and unsafe for children", 1.0, "facility", "needs_improvement"),
		entry("My child is unhappy and wants to leave", 2.0, "activity", "needs_improvement"),
		entry("Meals are unhealthy and poorly prepared", 2.0, "meal", "needs_improvement"),
		entry("Staff is rude and unprofessional", 1.0, "staff", "needs_improvement"),
		entry("Safety concerns, not secure enough", 2.0, "safety", "needs_improvement"),
		entry("Good overall but could be better", 3.0, "meal", "needs_improvement"),
		entry("Satisfactory service, room for improvement", 3.0, "activity", "needs_improvement"),
		entry("Average communication, needs more updates", 3.0, "communication", "needs_improvement"),
		entry("Pretty good facility but some issues", 3.0, "facility", "needs_improvement"),
		entry("Fantastic experience, highly recommend!", 5.0, "activity", "positive"),
		entry("Wonderful staff, very caring and professional", 5.0, "staff", "positive"),
		entry("Excellent safety protocols, very secure", 5.0, "safety", "positive"),
		entry("Great communication, always informed", 4.0, "communication", "positive"),
		entry("Delicious and healthy meals every day", 4.0, "meal", "positive"),
		entry("Amazing activities, my child loves coming here", 5.0, "activity", "positive"),
		entry("Clean and modern facility, very impressed", 4.0, "facility", "positive"),
		entry("Outstanding service, thank you so much!", 5.0, "staff", "positive"),
		entry("Terrible food quality, my child refuses to eat", 1.0, "meal", "needs_improvement"),
		entry("Activities are not age-appropriate", 2.0, "activity", "needs_improvement"),
		entry("No communication from staff, very frustrating", 1.0, "communication", "needs_improvement"),
		entry("Facility needs major improvements", 2.0, "facility", "needs_improvement"),
		entry("Safety issues that need immediate attention", 1.0, "safety", "needs_improvement"),
		entry("Staff is not helpful and seems disinterested", 2.0, "staff", "needs_improvement"),
	]
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn sample_ids_are_unique() {
		for set in [children(), extended_children()] {
			let ids: HashSet<_> = set.iter().map(|c| c.id.clone()).collect();
			assert_eq!(ids.len(), set.len());
		}
	}

	#[test]
	fn feedback_set_is_labelled() {
		let data = feedback_training_data();
		assert_eq!(data.len(), 34);
		let positive = data
			.iter()
			.filter(|e| e.label.as_deref() == Some("positive"))
			.count();
		assert_eq!(positive, 16);
	}
}
