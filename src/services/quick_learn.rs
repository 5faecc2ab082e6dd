use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::gemini::{GenerationClient, parse_structured, schema};
use crate::models::{
    GeneratedQuickLearn, QuickAssessment, QuickLearnDocument, ScoredQuestion, Section,
};
use crate::services::resources::extract_resources;

pub const DIFFICULTIES: [&str; 3] = ["beginner", "intermediate", "advanced"];

pub fn normalize_difficulty(difficulty: &str) -> Result<String, AppError> {
    let normalized = difficulty.trim().to_lowercase();
    if DIFFICULTIES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid difficulty level. Must be one of: {}",
            DIFFICULTIES.join(", ")
        )))
    }
}

/// Position of `answer` among `choices`. Falls back to 0 when the
/// answer text does not appear verbatim.
pub fn correct_answer_index(answer: &str, choices: &[String]) -> usize {
    choices.iter().position(|c| c == answer).unwrap_or(0)
}

/// Turns the generator's shape into the document the frontend reads:
/// lessons and their content are paired by position, each section gets
/// a fresh id, and answers become option indices.
pub fn reshape(generated: GeneratedQuickLearn, topic: &str, difficulty: &str) -> QuickLearnDocument {
    let sections = generated
        .lessons
        .into_iter()
        .zip(generated.lesson_content)
        .map(|(lesson, content)| Section {
            id: Uuid::new_v4().to_string(),
            additional_resources: extract_resources(&content.additional_resources, &lesson.title),
            title: lesson.title,
            readings: content.readings,
            examples: content.examples,
        })
        .collect();

    let questions = generated
        .assessment
        .questions
        .into_iter()
        .map(|q| ScoredQuestion {
            correct_answer: correct_answer_index(&q.answer, &q.answer_choices),
            question: q.question,
            options: q.answer_choices,
        })
        .collect();

    QuickLearnDocument {
        title: generated.title,
        topic: topic.to_string(),
        difficulty: difficulty.to_string(),
        description: generated.description,
        estimated_duration_minutes: generated.estimated_duration_minutes,
        sections,
        assessment: QuickAssessment {
            title: generated.assessment.title,
            instructions: generated.assessment.instructions,
            questions,
        },
        completed: 0,
    }
}

pub struct QuickLearnService {
    generator: Arc<dyn GenerationClient>,
}

impl QuickLearnService {
    pub fn new(generator: Arc<dyn GenerationClient>) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, topic: &str, difficulty: &str) -> Result<QuickLearnDocument, AppError> {
        let topic = topic.trim();
        if topic.is_empty() || difficulty.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Missing required parameters: topic and difficulty".to_string(),
            ));
        }
        let difficulty = normalize_difficulty(difficulty)?;

        info!("Generating quick learn for '{}' ({})", topic, difficulty);
        let prompt = vec![
            format!("Generate a quick learning course for {} at {} level.", topic, difficulty),
            "If difficulty is beginner generate 3 lessons, if intermediate generate 5 lessons, and if advanced generate 7 lessons.".to_string(),
            "The beginner course should be about 1 hour long, intermediate about 2 hours, and advanced about 4 hours.".to_string(),
            "Each lesson should have a title, estimated duration, and topics covered.".to_string(),
            "Provide detailed original readings for each lesson, do NOT quote from other sources.".to_string(),
            "Include practical examples and additional resources with links (no other courses).".to_string(),
            "Also provide a course-wide assessment of multiple choice, true/false, and fill-in-the-blank questions, each with its answer choices.".to_string(),
            "Return the output as JSON according to the given schema.".to_string(),
        ];

        let text = self.generator.generate(&prompt, Some(&schema::quick_learn())).await?;
        let generated: GeneratedQuickLearn = parse_structured(&text)?;
        let document = reshape(generated, topic, &difficulty);
        info!(
            "Quick learn '{}': {} sections, {} questions",
            document.title,
            document.sections.len(),
            document.assessment.questions.len()
        );
        Ok(document)
    }
}
