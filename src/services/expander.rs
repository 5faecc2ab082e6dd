//! Parallel lesson expansion. Each lesson stub (and the final exam) owns
//! a fixed slot index; a bounded pool fills the slots in any order.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::gemini::{GenerationClient, parse_structured, schema};
use crate::models::course::STATUS_NOT_STARTED;
use crate::models::{
    CourseFull, GeneratedLesson, LessonComplete, LessonFailure, LessonOutline, Syllabus, Test,
    UnitOutline,
};
use crate::services::resources::{LinkChecker, extract_resources, resources_from_text};

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Lesson(LessonComplete),
    FinalExam(Test),
}

pub type SlotResult = Result<SlotContent, LessonFailure>;

#[derive(Debug, Clone)]
pub struct Expansion {
    pub course: CourseFull,
    pub failures: Vec<LessonFailure>,
}

impl Expansion {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Task {
    Lesson {
        index: usize,
        unit: Arc<UnitOutline>,
        outline: LessonOutline,
    },
    FinalExam {
        index: usize,
        course_title: String,
        description: String,
    },
}

impl Task {
    fn index(&self) -> usize {
        match self {
            Task::Lesson { index, .. } | Task::FinalExam { index, .. } => *index,
        }
    }

    fn label(&self) -> String {
        match self {
            Task::Lesson { outline, .. } => outline.lesson.clone(),
            Task::FinalExam { .. } => "Final Exam".to_string(),
        }
    }
}

/// Flattens the syllabus into tasks `0..N` in unit/lesson order, with
/// the final exam (if any) at index `N`.
fn plan(syllabus: &Syllabus) -> Vec<Task> {
    let mut tasks: Vec<Task> = syllabus
        .units
        .iter()
        .flat_map(|unit| {
            let shared = Arc::new(unit.clone());
            unit.lesson_outline
                .iter()
                .map(move |outline| (shared.clone(), outline.clone()))
        })
        .enumerate()
        .map(|(index, (unit, outline))| Task::Lesson { index, unit, outline })
        .collect();

    if let Some(description) = syllabus.final_exam() {
        tasks.push(Task::FinalExam {
            index: tasks.len(),
            course_title: syllabus.title.clone(),
            description: description.to_string(),
        });
    }
    tasks
}

pub fn unit_heading(unit: &UnitOutline) -> String {
    format!("UNIT {}: {}", unit.unit_number, unit.title)
}

fn lesson_prompt(unit: &UnitOutline, outline: &LessonOutline) -> Vec<String> {
    let objectives = if outline.learning_objectives.is_empty() {
        outline.lesson_summary.clone()
    } else {
        outline.learning_objectives.join(", ")
    };
    vec![
        format!(
            "Generate detailed content for the lesson titled '{}' in {}.",
            outline.lesson,
            unit_heading(unit)
        ),
        format!("Lesson summary: {}", outline.lesson_summary),
        format!("Learning objectives: {}.", objectives),
        "Provide readings to help learn the material, practical examples with explanations, exercises for practice, and auto-gradable assessment questions.".to_string(),
        "The readings should be clear and comprehensive. The examples should demonstrate the concepts effectively.".to_string(),
        "Include 6 additional resources (articles, papers, books or documentation, not other courses), each with a short label and a full http(s) URL.".to_string(),
        "Estimate the lesson duration in minutes.".to_string(),
        "Return the output as JSON according to the given schema.".to_string(),
    ]
}

fn final_exam_prompt(course_title: &str, description: &str) -> Vec<String> {
    vec![
        format!("Generate a final exam for the course '{}' based on the following description.", course_title),
        description.to_string(),
        "Include a variety of question types such as multiple choice, true/false, fill-in-the-blank and short answer.".to_string(),
        "Make the exam comprehensive and clearly structured.".to_string(),
        "Return the output as JSON according to the given schema.".to_string(),
    ]
}

pub struct LessonExpander {
    generator: Arc<dyn GenerationClient>,
    link_checker: Option<LinkChecker>,
    concurrency: usize,
}

impl LessonExpander {
    pub fn new(generator: Arc<dyn GenerationClient>, concurrency: usize) -> Self {
        Self {
            generator,
            link_checker: None,
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_link_checker(mut self, checker: LinkChecker) -> Self {
        self.link_checker = Some(checker);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Expands every lesson of `syllabus`. Never fails as a whole:
    /// per-slot errors are reported in [`Expansion::failures`].
    pub async fn expand(&self, syllabus: &Syllabus) -> Expansion {
        let lesson_schema = schema::lesson_content();
        let exam_schema = schema::test();
        let tasks = plan(syllabus);
        let mut slots: Vec<Option<SlotResult>> = (0..tasks.len()).map(|_| None).collect();

        info!(
            "Expanding '{}': {} slots, {} workers",
            syllabus.title,
            slots.len(),
            self.concurrency
        );

        let lesson_schema = &lesson_schema;
        let exam_schema = &exam_schema;
        let mut finished = stream::iter(tasks)
            .map(|task| async move {
                let index = task.index();
                (index, self.run(task, lesson_schema, exam_schema).await)
            })
            .buffer_unordered(self.concurrency);

        while let Some((index, result)) = finished.next().await {
            slots[index] = Some(result);
        }

        let expansion = assemble(syllabus, slots);
        info!(
            "Expanded '{}': {} lessons, final exam: {}, {} failed",
            expansion.course.title,
            expansion.course.unit_lessons.len(),
            expansion.course.final_exam.is_some(),
            expansion.failures.len()
        );
        expansion
    }

    async fn run(&self, task: Task, lesson_schema: &Value, exam_schema: &Value) -> SlotResult {
        let index = task.index();
        let result = match &task {
            Task::Lesson { unit, outline, .. } => self
                .expand_lesson(unit, outline, lesson_schema)
                .await
                .map(SlotContent::Lesson),
            Task::FinalExam {
                course_title,
                description,
                ..
            } => self
                .generate_final_exam(course_title, description, exam_schema)
                .await
                .map(SlotContent::FinalExam),
        };

        result.map_err(|e| {
            let failure = LessonFailure {
                index,
                lesson: task.label(),
                message: e.to_string(),
            };
            warn!("Slot {} ({}) failed: {}", index, failure.lesson, failure.message);
            failure
        })
    }

    async fn expand_lesson(
        &self,
        unit: &UnitOutline,
        outline: &LessonOutline,
        lesson_schema: &Value,
    ) -> Result<LessonComplete, AppError> {
        let prompt = lesson_prompt(unit, outline);
        let text = self.generator.generate(&prompt, Some(lesson_schema)).await?;
        let generated: GeneratedLesson = parse_structured(&text)?;

        if generated.readings.trim().is_empty() {
            return Err(AppError::Generation(format!(
                "generated content for '{}' has no readings",
                outline.lesson
            )));
        }

        let unit_title = unit_heading(unit);
        let mut resources = extract_resources(&generated.additional_resources, &unit_title);
        if resources.is_empty() {
            let body = format!("{}\n\n{}", generated.readings, generated.examples);
            resources = resources_from_text(&body, &unit_title);
        }
        if let Some(checker) = &self.link_checker {
            resources = checker.retain_live(resources).await;
        }

        Ok(LessonComplete {
            unit_number: unit.unit_number,
            lesson: outline.lesson.clone(),
            lesson_summary: outline.lesson_summary.clone(),
            learning_objectives: outline.learning_objectives.clone(),
            readings: generated.readings,
            examples: generated.examples,
            exercises: generated.exercises,
            assessments: generated.assessments,
            additional_resources: resources,
            duration_in_min: generated.duration_in_min,
            status: STATUS_NOT_STARTED.to_string(),
        })
    }

    async fn generate_final_exam(
        &self,
        course_title: &str,
        description: &str,
        exam_schema: &Value,
    ) -> Result<Test, AppError> {
        let prompt = final_exam_prompt(course_title, description);
        let text = self.generator.generate(&prompt, Some(exam_schema)).await?;
        let exam: Test = parse_structured(&text)?;
        if exam.questions.is_empty() {
            return Err(AppError::Generation("generated final exam has no questions".to_string()));
        }
        Ok(exam)
    }
}

/// Walks the slot array in index order. Successful lesson slots become
/// `unit_lessons`, the exam slot becomes `final_exam`, and everything
/// else is reported as a failure.
fn assemble(syllabus: &Syllabus, slots: Vec<Option<SlotResult>>) -> Expansion {
    let mut unit_lessons = Vec::with_capacity(slots.len());
    let mut final_exam = None;
    let mut failures = Vec::new();

    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(Ok(SlotContent::Lesson(lesson))) => unit_lessons.push(lesson),
            Some(Ok(SlotContent::FinalExam(exam))) => final_exam = Some(exam),
            Some(Err(failure)) => failures.push(failure),
            None => failures.push(LessonFailure {
                index,
                lesson: String::new(),
                message: "worker produced no result".to_string(),
            }),
        }
    }

    Expansion {
        course: CourseFull::assemble(syllabus, unit_lessons, final_exam),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn syllabus(final_exam: Option<&str>) -> Syllabus {
        let mut value = json!({
            "title": "Networking",
            "units": [
                { "unit_number": 1, "title": "Links", "lesson_outline": [
                    { "lesson": "Ethernet" }, { "lesson": "Wi-Fi" }
                ]},
                { "unit_number": 2, "title": "Routing", "lesson_outline": [
                    { "lesson": "BGP" }
                ]}
            ]
        });
        if let Some(description) = final_exam {
            value["final_exam_description"] = json!(description);
        }
        Syllabus::from_value(value).unwrap()
    }

    #[test]
    fn plan_follows_stub_order() {
        let syllabus = syllabus(None);
        let tasks = plan(&syllabus);
        let labels: Vec<_> = tasks.iter().map(|t| (t.index(), t.label())).collect();
        assert_eq!(
            labels,
            vec![
                (0, "Ethernet".to_string()),
                (1, "Wi-Fi".to_string()),
                (2, "BGP".to_string())
            ]
        );
    }

    #[test]
    fn plan_appends_final_exam() {
        let syllabus = syllabus(Some("Everything about packets"));
        let tasks = plan(&syllabus);
        assert_eq!(tasks.len(), 4);
        assert!(matches!(tasks[3], Task::FinalExam { index: 3, .. }));
    }

    #[test]
    fn prompt_falls_back_to_summary_without_objectives() {
        let syllabus = syllabus(None);
        let unit = &syllabus.units[0];
        let outline = LessonOutline {
            lesson: "Ethernet".to_string(),
            lesson_summary: "Frames and MAC addresses".to_string(),
            learning_objectives: vec![],
        };
        let prompt = lesson_prompt(unit, &outline);
        assert!(prompt[0].contains("UNIT 1: Links"));
        assert!(prompt[2].contains("Frames and MAC addresses"));
    }

    #[test]
    fn assemble_reports_empty_slots() {
        let syllabus = syllabus(None);
        let expansion = assemble(&syllabus, vec![None]);
        assert!(expansion.course.unit_lessons.is_empty());
        assert_eq!(expansion.failures[0].index, 0);
        assert!(!expansion.is_complete());
    }
}
