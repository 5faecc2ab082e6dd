use serde::{Deserialize, Serialize};

use super::coerce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "course")]
    Course,
    #[serde(rename = "quick-learn")]
    QuickLearn,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Course => "course",
            SourceType::QuickLearn => "quick-learn",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentScope {
    #[default]
    All,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrueFalseQuestion {
    #[serde(default, deserialize_with = "coerce::text")]
    pub question: String,
    #[serde(default, deserialize_with = "coerce::boolean")]
    pub answer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    #[serde(default, deserialize_with = "coerce::text")]
    pub question: String,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub choices: Vec<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub correct_choice: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeResponseQuestion {
    #[serde(default, deserialize_with = "coerce::text")]
    pub question: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub answer: String,
}

/// A review card. `correct` and `incorrect` are cumulative counters
/// bumped by review sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub front: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub back: String,
    #[serde(default, alias = "trueorfalseq")]
    pub true_false: TrueFalseQuestion,
    #[serde(default, alias = "multiplechoice")]
    pub multiple_choice: MultipleChoiceQuestion,
    #[serde(default, alias = "freeresponse")]
    pub free_response: FreeResponseQuestion,
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub incorrect: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedFlashcards {
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub topic: String,
    pub description: String,
    pub flashcards: Vec<Flashcard>,
    pub sessions_completed: i64,
    pub last_test_score: i64,
    pub still_learning_count: i64,
    pub still_studying_count: i64,
    pub mastered_count: i64,
    pub source_id: String,
    pub source_type: String,
    pub created_at: String,
    pub last_accessed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlashcardSetRequest {
    pub source_type: SourceType,
    pub source_id: String,
    pub card_count: u32,
    #[serde(default)]
    pub content_scope: ContentScope,
    pub learning_goal: String,
}

#[derive(Debug, Clone)]
pub struct NewFlashcardSet {
    pub title: String,
    pub topic: String,
    pub description: String,
    pub flashcards: Vec<Flashcard>,
    pub source_id: String,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlashcardSetCreated {
    pub message: String,
    pub flashcard_set_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardProgressRequest {
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub incorrect: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetProgressRequest {
    #[serde(default)]
    pub sessions_completed_delta: i64,
    #[serde(default)]
    pub last_test_score: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFlashcardSetRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressCounts {
    pub still_learning: i64,
    pub still_studying: i64,
    pub mastered: i64,
}
