use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use crate::gemini::{GenerationClient, parse_structured, schema};
use crate::models::course::STATUS_COMPLETED;
use crate::models::{
    CardProgressRequest, ContentScope, Course, Flashcard, FlashcardSet, GeneratedFlashcards,
    LessonComplete, ProgressCounts, QuickLearn, SetProgressRequest, UpdateFlashcardSetRequest,
};

pub const MAX_CARDS: u32 = 100;

const STILL_STUDYING_THRESHOLD: f64 = 0.5;
const MASTERED_THRESHOLD: f64 = 0.85;

/// Buckets cards by review accuracy. A card that was never reviewed
/// counts as still learning.
pub fn categorize(cards: &[Flashcard]) -> ProgressCounts {
    let mut counts = ProgressCounts::default();
    for card in cards {
        let attempts = card.correct + card.incorrect;
        let accuracy = if attempts > 0 {
            card.correct as f64 / attempts as f64
        } else {
            0.0
        };
        if attempts == 0 || accuracy < STILL_STUDYING_THRESHOLD {
            counts.still_learning += 1;
        } else if accuracy < MASTERED_THRESHOLD {
            counts.still_studying += 1;
        } else {
            counts.mastered += 1;
        }
    }
    counts
}

pub fn apply_card_progress(set: &mut FlashcardSet, card_id: i64, progress: &CardProgressRequest) -> bool {
    let Some(card) = set.flashcards.iter_mut().find(|c| c.id == card_id) else {
        return false;
    };
    card.correct = (card.correct + progress.correct).max(0);
    card.incorrect = (card.incorrect + progress.incorrect).max(0);
    set.last_accessed = chrono::Utc::now().to_rfc3339();
    true
}

pub fn apply_set_progress(set: &mut FlashcardSet, progress: &SetProgressRequest) {
    set.sessions_completed += progress.sessions_completed_delta;
    if let Some(score) = progress.last_test_score {
        set.last_test_score = score;
    }
    let counts = categorize(&set.flashcards);
    set.still_learning_count = counts.still_learning;
    set.still_studying_count = counts.still_studying;
    set.mastered_count = counts.mastered;
    set.last_accessed = chrono::Utc::now().to_rfc3339();
}

pub fn apply_update(set: &mut FlashcardSet, update: UpdateFlashcardSetRequest) -> Result<(), AppError> {
    let title = update
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required field: title".to_string()))?;
    set.title = title;
    set.description = update.description.unwrap_or_default();
    set.flashcards = update.flashcards;
    set.last_accessed = chrono::Utc::now().to_rfc3339();
    Ok(())
}

pub fn number_cards(cards: Vec<Flashcard>) -> Vec<Flashcard> {
    cards
        .into_iter()
        .enumerate()
        .map(|(i, card)| Flashcard {
            id: i as i64 + 1,
            correct: 0,
            incorrect: 0,
            ..card
        })
        .collect()
}

/// Lesson content of `course` the cards are generated from. With
/// [`ContentScope::Completed`] only lessons marked completed count,
/// wherever they sit in the course.
pub fn course_content(course: &Course, scope: ContentScope) -> Result<String, AppError> {
    let lessons: Vec<&LessonComplete> = course
        .unit_lessons
        .iter()
        .filter(|l| scope == ContentScope::All || l.status == STATUS_COMPLETED)
        .collect();
    if lessons.is_empty() {
        return Err(AppError::BadRequest("Course is missing lesson content".to_string()));
    }
    serde_json::to_string(&lessons).map_err(|_| AppError::InternalServerError)
}

pub fn quick_learn_content(quick_learn: &QuickLearn) -> Result<String, AppError> {
    serde_json::to_string(quick_learn).map_err(|_| AppError::InternalServerError)
}

pub fn validate_card_count(card_count: u32) -> Result<(), AppError> {
    if card_count == 0 || card_count > MAX_CARDS {
        return Err(AppError::BadRequest(format!(
            "card_count must be between 1 and {}",
            MAX_CARDS
        )));
    }
    Ok(())
}

pub struct FlashcardService {
    generator: Arc<dyn GenerationClient>,
}

impl FlashcardService {
    pub fn new(generator: Arc<dyn GenerationClient>) -> Self {
        Self { generator }
    }

    pub async fn generate(
        &self,
        content: &str,
        card_count: u32,
        learning_goal: &str,
    ) -> Result<Vec<Flashcard>, AppError> {
        validate_card_count(card_count)?;

        let prompt = vec![
            "You are an expert flashcard generator.".to_string(),
            format!("Generate {} flashcards for the following content: {}", card_count, content),
            "Focus on covering concepts clearly and understandably.".to_string(),
            format!(
                "If the learning goal is '{}', adjust the difficulty and depth accordingly.",
                learning_goal
            ),
            "Return a clean structured JSON following the provided schema without any empty fields.".to_string(),
        ];

        let text = self.generator.generate(&prompt, Some(&schema::flashcards())).await?;
        let generated: GeneratedFlashcards = parse_structured(&text)?;
        if generated.flashcards.is_empty() {
            return Err(AppError::Generation("generator returned no flashcards".to_string()));
        }
        info!("Generated {} flashcards (requested {})", generated.flashcards.len(), card_count);
        Ok(number_cards(generated.flashcards))
    }
}
