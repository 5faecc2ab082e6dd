use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::assessment::{Question, Test};
use super::coerce;
use super::syllabus::{Syllabus, UnitOutline};

pub const STATUS_NOT_STARTED: &str = "not started";
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub unit_title: String,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedLesson {
    #[serde(default, deserialize_with = "coerce::text")]
    pub readings: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub examples: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub exercises: String,
    #[serde(default, alias = "knowledge_check")]
    pub assessments: Vec<Question>,
    #[serde(default)]
    pub additional_resources: Vec<Value>,
    #[serde(default, alias = "duration_minutes", deserialize_with = "coerce::text")]
    pub duration_in_min: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonComplete {
    pub unit_number: i64,
    pub lesson: String,
    pub lesson_summary: String,
    pub learning_objectives: Vec<String>,
    pub readings: String,
    pub examples: String,
    pub exercises: String,
    pub assessments: Vec<Question>,
    pub additional_resources: Vec<Resource>,
    pub duration_in_min: String,
    pub status: String,
}

/// A slot whose generation call failed. Kept next to the course so
/// callers can tell an incomplete course from a short syllabus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonFailure {
    pub index: usize,
    pub lesson: String,
    pub message: String,
}

/// Assembled course document: syllabus metadata, the untouched unit
/// tree, and the expanded lessons in stub order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseFull {
    pub title: String,
    pub description: String,
    pub estimated_duration_hours_per_week: i64,
    pub estimated_number_of_weeks: i64,
    pub prerequisites: Vec<String>,
    pub level: String,
    pub depth: String,
    pub final_exam_description: Option<String>,
    pub units: Vec<UnitOutline>,
    pub unit_lessons: Vec<LessonComplete>,
    pub final_exam: Option<Test>,
}

impl CourseFull {
    pub fn assemble(
        syllabus: &Syllabus,
        unit_lessons: Vec<LessonComplete>,
        final_exam: Option<Test>,
    ) -> Self {
        Self {
            title: syllabus.title.clone(),
            description: syllabus.description.clone(),
            estimated_duration_hours_per_week: syllabus.estimated_duration_hours_per_week,
            estimated_number_of_weeks: syllabus.estimated_number_of_weeks,
            prerequisites: syllabus.prerequisites.clone(),
            level: syllabus.level.clone(),
            depth: syllabus.depth.clone(),
            final_exam_description: syllabus.final_exam().map(str::to_string),
            units: syllabus.units.clone(),
            unit_lessons,
            final_exam,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub estimated_duration_hours_per_week: i64,
    pub estimated_number_of_weeks: i64,
    pub prerequisites: Vec<String>,
    pub final_exam_description: Option<String>,
    pub level: String,
    pub depth: String,
    pub units: Vec<UnitOutline>,
    pub unit_lessons: Vec<LessonComplete>,
    pub final_exam: Option<Test>,
    pub failed_lessons: Vec<LessonFailure>,
    pub is_draft: bool,
    pub completed: i64,
    pub created_at: String,
    pub last_accessed: Option<String>,
}

impl Course {
    pub fn apply(&mut self, req: UpdateCourseRequest) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(description) = req.description {
            self.description = description;
        }
        if let Some(hours) = req.estimated_duration_hours_per_week {
            self.estimated_duration_hours_per_week = hours;
        }
        if let Some(weeks) = req.estimated_number_of_weeks {
            self.estimated_number_of_weeks = weeks;
        }
        if let Some(prerequisites) = req.prerequisites {
            self.prerequisites = prerequisites;
        }
        if let Some(description) = req.final_exam_description {
            self.final_exam_description = Some(description);
        }
        if let Some(level) = req.level {
            self.level = level;
        }
        if let Some(depth) = req.depth {
            self.depth = depth;
        }
        if let Some(units) = req.units {
            self.units = units;
        }
        if let Some(unit_lessons) = req.unit_lessons {
            self.unit_lessons = unit_lessons;
        }
        if let Some(is_draft) = req.is_draft {
            self.is_draft = is_draft;
        }
        if let Some(completed) = req.completed {
            self.completed = completed;
        }
    }

    /// Sets the status of lesson `index` and recounts `completed`.
    /// Returns false when there is no such lesson.
    pub fn set_lesson_status(&mut self, index: usize, status: &str) -> bool {
        let Some(lesson) = self.unit_lessons.get_mut(index) else {
            return false;
        };
        lesson.status = status.to_string();
        self.completed = self
            .unit_lessons
            .iter()
            .filter(|l| l.status == STATUS_COMPLETED)
            .count() as i64;
        true
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_duration_hours_per_week: i64,
    #[serde(default)]
    pub estimated_number_of_weeks: i64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub final_exam_description: Option<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub depth: String,
    #[serde(default)]
    pub units: Vec<UnitOutline>,
    #[serde(default)]
    pub unit_lessons: Vec<LessonComplete>,
    #[serde(default)]
    pub final_exam: Option<Test>,
    #[serde(default)]
    pub failed_lessons: Vec<LessonFailure>,
    #[serde(default = "default_true")]
    pub is_draft: bool,
    #[serde(default)]
    pub completed: i64,
}

impl NewCourseRequest {
    pub fn from_expansion(course: CourseFull, failed_lessons: Vec<LessonFailure>) -> Self {
        Self {
            title: course.title,
            description: course.description,
            estimated_duration_hours_per_week: course.estimated_duration_hours_per_week,
            estimated_number_of_weeks: course.estimated_number_of_weeks,
            prerequisites: course.prerequisites,
            final_exam_description: course.final_exam_description,
            level: course.level,
            depth: course.depth,
            units: course.units,
            unit_lessons: course.unit_lessons,
            final_exam: course.final_exam,
            failed_lessons,
            is_draft: true,
            completed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_duration_hours_per_week: Option<i64>,
    pub estimated_number_of_weeks: Option<i64>,
    pub prerequisites: Option<Vec<String>>,
    pub final_exam_description: Option<String>,
    pub level: Option<String>,
    pub depth: Option<String>,
    pub units: Option<Vec<UnitOutline>>,
    pub unit_lessons: Option<Vec<LessonComplete>>,
    pub is_draft: Option<bool>,
    pub completed: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedCourseResponse {
    pub course: Course,
    pub failed_lessons: Vec<LessonFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(name: &str) -> LessonComplete {
        LessonComplete {
            unit_number: 1,
            lesson: name.to_string(),
            lesson_summary: String::new(),
            learning_objectives: vec![],
            readings: "text".to_string(),
            examples: String::new(),
            exercises: String::new(),
            assessments: vec![],
            additional_resources: vec![],
            duration_in_min: "30".to_string(),
            status: STATUS_NOT_STARTED.to_string(),
        }
    }

    fn course() -> Course {
        Course {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            title: "Compilers".to_string(),
            description: String::new(),
            estimated_duration_hours_per_week: 3,
            estimated_number_of_weeks: 8,
            prerequisites: vec![],
            final_exam_description: None,
            level: "advanced".to_string(),
            depth: "comprehensive".to_string(),
            units: vec![],
            unit_lessons: vec![lesson("Lexing"), lesson("Parsing"), lesson("Codegen")],
            final_exam: None,
            failed_lessons: vec![],
            is_draft: true,
            completed: 0,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            last_accessed: None,
        }
    }

    #[test]
    fn lesson_status_recounts_completed() {
        let mut course = course();
        assert!(course.set_lesson_status(0, STATUS_COMPLETED));
        assert!(course.set_lesson_status(2, STATUS_COMPLETED));
        assert_eq!(course.completed, 2);
        assert!(course.set_lesson_status(0, "in progress"));
        assert_eq!(course.completed, 1);
        assert!(!course.set_lesson_status(3, STATUS_COMPLETED));
    }

    #[test]
    fn partial_update_keeps_missing_fields() {
        let mut course = course();
        course.apply(UpdateCourseRequest {
            title: Some("Compilers II".to_string()),
            is_draft: Some(false),
            ..Default::default()
        });
        assert_eq!(course.title, "Compilers II");
        assert!(!course.is_draft);
        assert_eq!(course.level, "advanced");
        assert_eq!(course.unit_lessons.len(), 3);
    }
}
