use serde::{Deserialize, Serialize};

use super::coerce;

/// A graded question. True/false answers are normalised to `"true"` /
/// `"false"` so every question kind shares one shape; short-answer
/// questions simply have no choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "coerce::text")]
    pub question: String,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub answer_choices: Vec<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default, alias = "description", deserialize_with = "coerce::text")]
    pub instructions: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}
