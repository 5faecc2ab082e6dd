use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::gemini::{GenerationClient, parse_structured, schema};
use crate::models::Syllabus;

pub const DEFAULT_DEPTH: &str = "comprehensive";

pub struct SyllabusService {
    generator: Arc<dyn GenerationClient>,
}

impl SyllabusService {
    pub fn new(generator: Arc<dyn GenerationClient>) -> Self {
        Self { generator }
    }

    pub async fn generate(
        &self,
        topic: &str,
        difficulty: &str,
        depth: Option<&str>,
    ) -> Result<Syllabus, AppError> {
        let topic = topic.trim();
        let difficulty = difficulty.trim();
        if topic.is_empty() {
            return Err(AppError::BadRequest("topic is required".to_string()));
        }
        if difficulty.is_empty() {
            return Err(AppError::BadRequest("difficulty is required".to_string()));
        }
        let depth = depth
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DEPTH);

        info!("Generating syllabus for '{}' ({}, {})", topic, difficulty, depth);
        let prompt = vec![
            format!("Generate a detailed syllabus in JSON format for a course on '{}'.", topic),
            format!("The course should be at a '{}' difficulty level with a '{}' depth.", difficulty, depth),
            "The response must include:".to_string(),
            "- Course title and description".to_string(),
            "- Estimated number of weeks and hours per week to complete the course".to_string(),
            "- A list of units, each with a unit number, title, description, and an ordered list of lessons".to_string(),
            "- Each lesson must include a title, a summary, and 3 to 5 learning objectives".to_string(),
            "- A description of the final exam".to_string(),
        ];

        let text = self.generator.generate(&prompt, Some(&schema::syllabus())).await?;
        let syllabus = parse_syllabus(&text)?;
        self.fill_missing_objectives(syllabus).await
    }

    /// Regenerates learning objectives for lessons that have none.
    /// Everything else in `syllabus` is kept as is; a syllabus with no
    /// gaps is returned without calling the generator.
    pub async fn fill_missing_objectives(&self, mut syllabus: Syllabus) -> Result<Syllabus, AppError> {
        if !syllabus.has_missing_objectives() {
            return Ok(syllabus);
        }

        let current = serde_json::to_string(&syllabus)
            .map_err(|e| AppError::Generation(format!("Failed to serialize syllabus: {}", e)))?;
        let prompt = vec![
            "You're given a partial course syllabus in JSON format.".to_string(),
            "Some lessons may be missing their 'learning_objectives' field or have it as an empty list.".to_string(),
            "Your task is to fill in those fields while preserving all existing data.".to_string(),
            format!("Here is the current course syllabus:\n{}", current),
        ];

        let text = self.generator.generate(&prompt, Some(&schema::syllabus())).await?;
        let regenerated = parse_syllabus(&text)?;
        let filled = merge_objectives(&mut syllabus, &regenerated);
        if syllabus.has_missing_objectives() {
            warn!(
                "'{}' still has lessons without objectives after regeneration",
                syllabus.title
            );
        }
        info!("Filled objectives for {} lessons of '{}'", filled, syllabus.title);
        Ok(syllabus)
    }
}

fn parse_syllabus(text: &str) -> Result<Syllabus, AppError> {
    let value: Value = parse_structured(text)?;
    Syllabus::from_value(value).map_err(|e| AppError::Generation(e.to_string()))
}

fn merge_objectives(target: &mut Syllabus, source: &Syllabus) -> usize {
    let mut filled = 0;
    for (unit, source_unit) in target.units.iter_mut().zip(&source.units) {
        for (lesson, source_lesson) in unit.lesson_outline.iter_mut().zip(&source_unit.lesson_outline) {
            if lesson.learning_objectives.is_empty() && !source_lesson.learning_objectives.is_empty() {
                lesson.learning_objectives = source_lesson.learning_objectives.clone();
                filled += 1;
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outline(objectives: &[&str]) -> Syllabus {
        Syllabus::from_value(json!({
            "title": "Databases",
            "units": [{ "unit_number": 1, "title": "SQL", "lesson_outline": [
                { "lesson": "SELECT", "learning_objectives": objectives },
                { "lesson": "JOIN", "learning_objectives": ["combine tables"] }
            ]}]
        }))
        .unwrap()
    }

    #[test]
    fn merge_only_touches_empty_lessons() {
        let mut target = outline(&[]);
        let mut source = outline(&["filter rows"]);
        source.units[0].lesson_outline[1].learning_objectives = vec!["rewritten".to_string()];
        source.title = "Something else".to_string();

        assert_eq!(merge_objectives(&mut target, &source), 1);
        assert_eq!(target.title, "Databases");
        assert_eq!(target.units[0].lesson_outline[0].learning_objectives, vec!["filter rows"]);
        assert_eq!(target.units[0].lesson_outline[1].learning_objectives, vec!["combine tables"]);
    }

    #[test]
    fn merge_tolerates_shorter_source() {
        let mut target = outline(&[]);
        let mut source = outline(&["x"]);
        source.units[0].lesson_outline.truncate(0);
        assert_eq!(merge_objectives(&mut target, &source), 0);
        assert!(target.has_missing_objectives());
    }

    #[test]
    fn unparseable_syllabus_is_a_generation_error() {
        assert!(matches!(parse_syllabus("{\"units\": []}"), Err(AppError::Generation(_))));
    }
}
