#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use luminous_backend::error::AppError;
use luminous_backend::gemini::GenerationClient;
use luminous_backend::models::Syllabus;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

type Responder = Box<dyn Fn(&[String]) -> Result<String, AppError> + Send + Sync>;
type Delay = Box<dyn Fn(&[String]) -> Duration + Send + Sync>;

/// In-process generator: answers each prompt with a canned response and
/// records how many calls were in flight at once.
pub struct ScriptedGenerator {
    respond: Responder,
    delay: Delay,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(respond: impl Fn(&[String]) -> Result<String, AppError> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            delay: Box::new(|_| Duration::ZERO),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: impl Fn(&[String]) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerator {
    async fn generate(&self, prompt: &[String], _schema: Option<&Value>) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = (self.delay)(prompt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.respond)(prompt)
    }
}

/// Title of the lesson a lesson prompt asks for.
pub fn lesson_title(prompt: &[String]) -> Option<String> {
    let first = prompt.first()?;
    let start = first.find("titled '")? + "titled '".len();
    let end = first[start..].find('\'')? + start;
    Some(first[start..end].to_string())
}

pub fn is_final_exam_prompt(prompt: &[String]) -> bool {
    prompt.first().is_some_and(|p| p.starts_with("Generate a final exam"))
}

pub fn lesson_response(title: &str) -> String {
    let slug = title.to_lowercase().replace(' ', "-");
    json!({
        "readings": [format!("Readings for {title}"), "Second paragraph"],
        "examples": format!("Examples for {title}"),
        "exercises": "Try it yourself",
        "assessments": [
            { "question": format!("What is {title}?"), "answer_choices": ["A", "B"], "answer": "A" }
        ],
        "additional_resources": [
            { "text": format!("{title} docs"), "url": format!("https://docs.example.com/{slug}") }
        ],
        "duration_in_min": 45
    })
    .to_string()
}

pub fn exam_response() -> String {
    json!({
        "title": "Final Exam",
        "instructions": "Answer everything",
        "questions": [
            { "question": "True or false?", "answer_choices": ["true", "false"], "answer": true }
        ]
    })
    .to_string()
}

/// Answers lesson and exam prompts with well-formed content.
pub fn happy_generator() -> ScriptedGenerator {
    ScriptedGenerator::new(|prompt| {
        if is_final_exam_prompt(prompt) {
            return Ok(exam_response());
        }
        match lesson_title(prompt) {
            Some(title) => Ok(lesson_response(&title)),
            None => Err(AppError::Generation("unexpected prompt".to_string())),
        }
    })
}

pub fn two_unit_syllabus_json() -> Value {
    json!({
        "title": "Networking",
        "description": "From cables to routes",
        "estimated_duration_hours_per_week": 3,
        "estimated_number_of_weeks": 4,
        "level": "beginner",
        "depth": "comprehensive",
        "prerequisites": ["none"],
        "units": [
            { "unit_number": 1, "title": "Links", "unit_description": "Physical layer", "lesson_outline": [
                { "lesson": "A", "lesson_summary": "first", "learning_objectives": ["one"] },
                { "lesson": "B", "lesson_summary": "second", "learning_objectives": ["two"] }
            ]},
            { "unit_number": 2, "title": "Routing", "unit_description": "Network layer", "lesson_outline": [
                { "lesson": "C", "lesson_summary": "third", "learning_objectives": ["three"] }
            ]}
        ]
    })
}

pub fn two_unit_syllabus() -> Syllabus {
    Syllabus::from_value(two_unit_syllabus_json()).expect("valid syllabus")
}

/// In-memory database with migrations applied. A single connection
/// keeps every query on the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
