//! Structured-output schemas sent with each generation call, in the
//! OpenAPI subset the completion API accepts.

use serde_json::{Map, Value, json};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

fn boolean() -> Value {
    json!({ "type": "BOOLEAN" })
}

fn array(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let properties: Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

fn question() -> Value {
    object(
        &[
            ("question", string()),
            ("answer_choices", array(string())),
            ("answer", string()),
        ],
        &["question", "answer"],
    )
}

fn resource() -> Value {
    object(&[("text", string()), ("url", string())], &["text", "url"])
}

pub fn syllabus() -> Value {
    let lesson = object(
        &[
            ("lesson", string()),
            ("lesson_summary", string()),
            ("learning_objectives", array(string())),
        ],
        &["lesson", "lesson_summary", "learning_objectives"],
    );
    let unit = object(
        &[
            ("unit_number", integer()),
            ("title", string()),
            ("unit_description", string()),
            ("lesson_outline", array(lesson)),
        ],
        &["unit_number", "title", "unit_description", "lesson_outline"],
    );
    object(
        &[
            ("title", string()),
            ("description", string()),
            ("estimated_duration_hours_per_week", integer()),
            ("estimated_number_of_weeks", integer()),
            ("level", string()),
            ("depth", string()),
            ("prerequisites", array(string())),
            ("units", array(unit)),
            ("final_exam_description", string()),
        ],
        &[
            "title",
            "description",
            "estimated_duration_hours_per_week",
            "estimated_number_of_weeks",
            "level",
            "depth",
            "units",
        ],
    )
}

pub fn lesson_content() -> Value {
    object(
        &[
            ("readings", string()),
            ("examples", string()),
            ("exercises", string()),
            ("assessments", array(question())),
            ("additional_resources", array(resource())),
            ("duration_in_min", string()),
        ],
        &[
            "readings",
            "examples",
            "exercises",
            "assessments",
            "additional_resources",
            "duration_in_min",
        ],
    )
}

pub fn test() -> Value {
    object(
        &[
            ("title", string()),
            ("instructions", string()),
            ("questions", array(question())),
        ],
        &["title", "questions"],
    )
}

pub fn quick_learn() -> Value {
    let lesson = object(
        &[
            ("title", string()),
            ("duration_minutes", integer()),
            ("topics", array(string())),
        ],
        &["title", "duration_minutes", "topics"],
    );
    let content = object(
        &[
            ("readings", string()),
            ("examples", string()),
            ("additional_resources", array(resource())),
        ],
        &["readings", "examples", "additional_resources"],
    );
    object(
        &[
            ("title", string()),
            ("description", string()),
            ("estimated_duration_minutes", integer()),
            ("lessons", array(lesson)),
            ("lesson_content", array(content)),
            ("assessment", test()),
        ],
        &[
            "title",
            "description",
            "estimated_duration_minutes",
            "lessons",
            "lesson_content",
            "assessment",
        ],
    )
}

pub fn flashcards() -> Value {
    let card = object(
        &[
            ("front", string()),
            ("back", string()),
            (
                "true_false",
                object(&[("question", string()), ("answer", boolean())], &["question", "answer"]),
            ),
            (
                "multiple_choice",
                object(
                    &[
                        ("question", string()),
                        ("choices", array(string())),
                        ("correct_choice", string()),
                    ],
                    &["question", "choices", "correct_choice"],
                ),
            ),
            (
                "free_response",
                object(&[("question", string()), ("answer", string())], &["question", "answer"]),
            ),
        ],
        &["front", "back", "true_false", "multiple_choice", "free_response"],
    );
    object(&[("flashcards", array(card))], &["flashcards"])
}
