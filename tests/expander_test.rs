mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use luminous_backend::error::AppError;
use luminous_backend::models::Syllabus;
use luminous_backend::services::{LessonExpander, LinkChecker};
use serde_json::json;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn every_stub_becomes_a_lesson_in_stub_order() {
    // 先頭のレッスンほど遅く返す
    let generator = Arc::new(happy_generator().with_delay(|prompt| {
        match lesson_title(prompt).as_deref() {
            Some("A") => Duration::from_millis(60),
            Some("B") => Duration::from_millis(30),
            _ => Duration::ZERO,
        }
    }));
    let expander = LessonExpander::new(generator.clone(), 4);

    let expansion = expander.expand(&two_unit_syllabus()).await;

    assert!(expansion.is_complete());
    let lessons = &expansion.course.unit_lessons;
    let names: Vec<_> = lessons.iter().map(|l| l.lesson.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    let units: Vec<_> = lessons.iter().map(|l| l.unit_number).collect();
    assert_eq!(units, vec![1, 1, 2]);
    assert!(lessons.iter().all(|l| l.status == "not started"));
    assert_eq!(lessons[0].readings, "Readings for A\n\nSecond paragraph");
    assert_eq!(lessons[0].duration_in_min, "45");
    assert_eq!(lessons[2].additional_resources[0].unit_title, "UNIT 2: Routing");
    assert_eq!(lessons[2].additional_resources[0].url, "https://docs.example.com/c");
    assert_eq!(expansion.course.final_exam, None);
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn syllabus_metadata_and_units_are_carried_over() {
    let syllabus = two_unit_syllabus();
    let expander = LessonExpander::new(Arc::new(happy_generator()), 2);

    let course = expander.expand(&syllabus).await.course;

    assert_eq!(course.title, "Networking");
    assert_eq!(course.estimated_number_of_weeks, 4);
    assert_eq!(course.prerequisites, vec!["none"]);
    assert_eq!(course.units, syllabus.units);
}

#[tokio::test]
async fn one_failed_lesson_is_reported_not_raised() {
    let generator = ScriptedGenerator::new(|prompt| match lesson_title(prompt).as_deref() {
        Some("B") => Err(AppError::Generation("quota exceeded".to_string())),
        Some(title) => Ok(lesson_response(title)),
        None => Ok(exam_response()),
    });
    let expander = LessonExpander::new(Arc::new(generator), 3);

    let expansion = expander.expand(&two_unit_syllabus()).await;

    let names: Vec<_> = expansion.course.unit_lessons.iter().map(|l| l.lesson.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(expansion.failures.len(), 1);
    assert_eq!(expansion.failures[0].index, 1);
    assert_eq!(expansion.failures[0].lesson, "B");
    assert!(expansion.failures[0].message.contains("quota exceeded"));
}

#[tokio::test]
async fn malformed_output_fails_only_its_slot() {
    let generator = ScriptedGenerator::new(|prompt| match lesson_title(prompt).as_deref() {
        Some("A") => Ok("this is not json".to_string()),
        Some("C") => Ok(json!({ "readings": "", "examples": "x" }).to_string()),
        Some(title) => Ok(lesson_response(title)),
        None => Ok(exam_response()),
    });
    let expander = LessonExpander::new(Arc::new(generator), 3);

    let expansion = expander.expand(&two_unit_syllabus()).await;

    assert_eq!(expansion.course.unit_lessons.len(), 1);
    assert_eq!(expansion.course.unit_lessons[0].lesson, "B");
    let failed: Vec<_> = expansion.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![0, 2]);
}

#[tokio::test]
async fn final_exam_occupies_the_last_slot() {
    let mut value = two_unit_syllabus_json();
    value["final_exam_description"] = json!("Covers every unit");
    let syllabus = Syllabus::from_value(value).expect("valid syllabus");
    let generator = Arc::new(happy_generator());
    let expander = LessonExpander::new(generator.clone(), 2);

    let expansion = expander.expand(&syllabus).await;

    assert!(expansion.is_complete());
    assert_eq!(generator.calls(), 4);
    assert_eq!(expansion.course.unit_lessons.len(), 3);
    let exam = expansion.course.final_exam.expect("final exam");
    assert_eq!(exam.title, "Final Exam");
    assert_eq!(exam.questions[0].answer, "true");
    assert_eq!(
        expansion.course.final_exam_description.as_deref(),
        Some("Covers every unit")
    );
}

#[tokio::test]
async fn failed_final_exam_keeps_lessons() {
    let mut value = two_unit_syllabus_json();
    value["final_assessment"] = json!({ "final_exam_description": "Everything" });
    let syllabus = Syllabus::from_value(value).expect("valid syllabus");
    let generator = ScriptedGenerator::new(|prompt| match lesson_title(prompt) {
        Some(title) => Ok(lesson_response(&title)),
        None => Ok(json!({ "title": "Empty", "questions": [] }).to_string()),
    });
    let expander = LessonExpander::new(Arc::new(generator), 2);

    let expansion = expander.expand(&syllabus).await;

    assert_eq!(expansion.course.unit_lessons.len(), 3);
    assert!(expansion.course.final_exam.is_none());
    assert_eq!(expansion.failures.len(), 1);
    assert_eq!(expansion.failures[0].index, 3);
}

#[tokio::test]
async fn worker_pool_never_exceeds_its_width() {
    let lessons: Vec<_> = (0..12)
        .map(|i| json!({ "lesson": format!("L{i}"), "learning_objectives": ["x"] }))
        .collect();
    let syllabus = Syllabus::from_value(json!({
        "title": "Wide",
        "units": [{ "unit_number": 1, "title": "Only", "lesson_outline": lessons }]
    }))
    .expect("valid syllabus");
    let generator = Arc::new(happy_generator().with_delay(|_| Duration::from_millis(15)));
    let expander = LessonExpander::new(generator.clone(), 3);

    let expansion = expander.expand(&syllabus).await;

    assert_eq!(expansion.course.unit_lessons.len(), 12);
    assert_eq!(generator.calls(), 12);
    assert!(generator.max_in_flight() <= 3, "saw {}", generator.max_in_flight());
    let names: Vec<_> = expansion.course.unit_lessons.iter().map(|l| l.lesson.clone()).collect();
    let expected: Vec<_> = (0..12).map(|i| format!("L{i}")).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn zero_width_pool_still_runs() {
    let expander = LessonExpander::new(Arc::new(happy_generator()), 0);
    assert_eq!(expander.concurrency(), 1);
    let expansion = expander.expand(&two_unit_syllabus()).await;
    assert_eq!(expansion.course.unit_lessons.len(), 3);
}

#[tokio::test]
async fn resources_fall_back_to_the_text_section() {
    let generator = ScriptedGenerator::new(|prompt| {
        let title = lesson_title(prompt).unwrap_or_default();
        Ok(json!({
            "readings": format!("About {title}.\n\nAdditional Resources:\n- RFC 791: https://www.rfc-editor.org/rfc/rfc791.\n"),
            "examples": "ping",
            "exercises": "",
            "assessments": [],
            "additional_resources": ["no links here"],
            "duration_in_min": "20 minutes"
        })
        .to_string())
    });
    let expander = LessonExpander::new(Arc::new(generator), 2);

    let expansion = expander.expand(&two_unit_syllabus()).await;

    let lesson = &expansion.course.unit_lessons[0];
    assert_eq!(lesson.additional_resources.len(), 1);
    assert_eq!(lesson.additional_resources[0].url, "https://www.rfc-editor.org/rfc/rfc791");
    assert_eq!(lesson.additional_resources[0].text, "RFC 791");
    assert_eq!(lesson.additional_resources[0].unit_title, "UNIT 1: Links");
}

#[tokio::test]
async fn expansion_future_is_send() {
    let syllabus = two_unit_syllabus();
    let expander = LessonExpander::new(Arc::new(happy_generator()), 2);

    let expansion = expander.expand(&syllabus);
    assert_send(&expansion);

    let spawned = tokio::spawn(async move {
        let expander = LessonExpander::new(Arc::new(happy_generator()), 2);
        expander.expand(&two_unit_syllabus()).await
    });
    assert_eq!(spawned.await.expect("task").course.unit_lessons.len(), 3);
    assert_eq!(expansion.await.course.unit_lessons.len(), 3);
}

#[tokio::test]
async fn link_checker_drops_dead_resources_in_order() {
    let server = MockServer::start().await;
    for live in ["/one", "/three"] {
        Mock::given(path(live))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    Mock::given(path("/two"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base = server.uri();
    let generator = ScriptedGenerator::new(move |prompt| {
        let title = lesson_title(prompt).unwrap_or_default();
        Ok(json!({
            "readings": format!("About {title}"),
            "examples": "ping",
            "exercises": "",
            "assessments": [],
            "additional_resources": [
                { "text": "One", "url": format!("{base}/one") },
                { "text": "Two", "url": format!("{base}/two") },
                { "text": "Three", "url": format!("{base}/three") }
            ],
            "duration_in_min": 30
        })
        .to_string())
    });
    let expander = LessonExpander::new(Arc::new(generator), 2)
        .with_link_checker(LinkChecker::new().expect("checker"));

    let expansion = expander.expand(&two_unit_syllabus()).await;

    assert!(expansion.is_complete());
    for lesson in &expansion.course.unit_lessons {
        let texts: Vec<_> = lesson.additional_resources.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["One", "Three"]);
    }
}
