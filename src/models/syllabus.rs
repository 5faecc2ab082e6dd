use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::coerce;

#[derive(Debug, Error)]
pub enum SyllabusError {
    #[error("invalid syllabus shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("syllabus has no title")]
    MissingTitle,

    #[error("syllabus has no units")]
    NoUnits,

    #[error("unit {0} contains a lesson without a title")]
    UntitledLesson(i64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateSyllabusRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub depth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonOutline {
    #[serde(default, alias = "title", deserialize_with = "coerce::text")]
    pub lesson: String,
    #[serde(default, alias = "summary", deserialize_with = "coerce::text")]
    pub lesson_summary: String,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub learning_objectives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOutline {
    #[serde(alias = "Unit_number", deserialize_with = "coerce::integer")]
    pub unit_number: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default, alias = "description", deserialize_with = "coerce::text")]
    pub unit_description: String,
    #[serde(default, alias = "lessons")]
    pub lesson_outline: Vec<LessonOutline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAssessment {
    #[serde(default, deserialize_with = "coerce::text")]
    pub final_exam_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllabus {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub estimated_duration_hours_per_week: i64,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub estimated_number_of_weeks: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub level: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub depth: String,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub units: Vec<UnitOutline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_exam_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_assessment: Option<FinalAssessment>,
}

impl Syllabus {
    /// Parses a syllabus from either the bare object or a
    /// `{ "course": { ... } }` envelope, then validates it.
    pub fn from_value(value: Value) -> Result<Self, SyllabusError> {
        let value = match value {
            Value::Object(mut map) if map.get("course").is_some_and(Value::is_object) => {
                map.remove("course").unwrap_or(Value::Null)
            }
            other => other,
        };

        let syllabus: Syllabus = serde_json::from_value(value)?;
        syllabus.validate()?;
        Ok(syllabus)
    }

    pub fn validate(&self) -> Result<(), SyllabusError> {
        if self.title.trim().is_empty() {
            return Err(SyllabusError::MissingTitle);
        }
        if self.units.is_empty() {
            return Err(SyllabusError::NoUnits);
        }
        for unit in &self.units {
            if unit.lesson_outline.iter().any(|l| l.lesson.trim().is_empty()) {
                return Err(SyllabusError::UntitledLesson(unit.unit_number));
            }
        }
        Ok(())
    }

    /// Final exam description, from either field the generator uses.
    /// Blank descriptions count as absent.
    pub fn final_exam(&self) -> Option<&str> {
        fn non_blank(s: &str) -> Option<&str> {
            Some(s.trim()).filter(|d| !d.is_empty())
        }
        self.final_exam_description
            .as_deref()
            .and_then(non_blank)
            .or_else(|| {
                self.final_assessment
                    .as_ref()
                    .and_then(|f| non_blank(&f.final_exam_description))
            })
    }

    pub fn lesson_count(&self) -> usize {
        self.units.iter().map(|u| u.lesson_outline.len()).sum()
    }

    pub fn has_missing_objectives(&self) -> bool {
        self.units
            .iter()
            .flat_map(|u| &u.lesson_outline)
            .any(|l| l.learning_objectives.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "title": "Rust",
            "description": "Systems programming",
            "estimated_duration_hours_per_week": 4,
            "estimated_number_of_weeks": "6",
            "level": "beginner",
            "depth": "comprehensive",
            "units": [{
                "Unit_number": 1,
                "title": "Basics",
                "description": "Getting started",
                "lessons": [{ "title": "Ownership", "summary": "Moves", "learning_objectives": ["borrow"] }]
            }]
        })
    }

    #[test]
    fn accepts_aliases_and_envelope() {
        let syllabus = Syllabus::from_value(json!({ "course": sample() })).unwrap();
        assert_eq!(syllabus.estimated_number_of_weeks, 6);
        assert_eq!(syllabus.units[0].unit_number, 1);
        assert_eq!(syllabus.units[0].unit_description, "Getting started");
        assert_eq!(syllabus.units[0].lesson_outline[0].lesson, "Ownership");
        assert_eq!(syllabus.lesson_count(), 1);
        assert!(!syllabus.has_missing_objectives());
    }

    #[test]
    fn final_exam_from_either_field() {
        let mut value = sample();
        value["final_assessment"] = json!({ "final_exam_description": "Everything" });
        let syllabus = Syllabus::from_value(value).unwrap();
        assert_eq!(syllabus.final_exam(), Some("Everything"));

        let mut value = sample();
        value["final_exam_description"] = json!("   ");
        let syllabus = Syllabus::from_value(value).unwrap();
        assert_eq!(syllabus.final_exam(), None);
    }

    #[test]
    fn blank_description_falls_through_to_final_assessment() {
        let mut value = sample();
        value["final_exam_description"] = json!("  ");
        value["final_assessment"] = json!({ "final_exam_description": " Cumulative exam " });
        let syllabus = Syllabus::from_value(value).unwrap();
        assert_eq!(syllabus.final_exam(), Some("Cumulative exam"));
    }

    #[test]
    fn rejects_empty_units() {
        let mut value = sample();
        value["units"] = json!([]);
        assert!(matches!(Syllabus::from_value(value), Err(SyllabusError::NoUnits)));
    }

    #[test]
    fn rejects_untitled_lesson() {
        let mut value = sample();
        value["units"][0]["lessons"][0]["title"] = json!("");
        assert!(matches!(
            Syllabus::from_value(value),
            Err(SyllabusError::UntitledLesson(1))
        ));
    }
}
