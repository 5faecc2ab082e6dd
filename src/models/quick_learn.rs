use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::assessment::Question;
use super::coerce;
use super::course::Resource;

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuickLesson {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub duration_minutes: i64,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuickLessonContent {
    #[serde(default, deserialize_with = "coerce::text")]
    pub readings: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub examples: String,
    #[serde(default)]
    pub additional_resources: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuickAssessment {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Raw quick-learn document as the generator returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuickLearn {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(default, deserialize_with = "coerce::integer")]
    pub estimated_duration_minutes: i64,
    #[serde(default)]
    pub lessons: Vec<GeneratedQuickLesson>,
    #[serde(default)]
    pub lesson_content: Vec<GeneratedQuickLessonContent>,
    pub assessment: GeneratedQuickAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub readings: String,
    #[serde(default)]
    pub examples: String,
    #[serde(default)]
    pub additional_resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAssessment {
    pub title: String,
    pub instructions: Option<String>,
    pub questions: Vec<ScoredQuestion>,
}

/// Frontend-ready quick-learn document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLearnDocument {
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub description: String,
    pub estimated_duration_minutes: i64,
    pub sections: Vec<Section>,
    pub assessment: QuickAssessment,
    pub completed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickLearn {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub description: String,
    pub estimated_duration_minutes: i64,
    pub sections: Vec<Section>,
    pub assessment: QuickAssessment,
    pub completed: i64,
    pub created_at: String,
    pub last_accessed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickLearnSummary {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub description: String,
    pub estimated_duration_minutes: i64,
    pub sections: Vec<Section>,
    pub completed: i64,
    pub created_at: String,
    pub last_accessed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuickLearnRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuickLearnRequest {
    #[serde(alias = "unit_lessons")]
    pub sections: Vec<Section>,
}
