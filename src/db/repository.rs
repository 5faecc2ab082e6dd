use chrono::Utc;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::{
    Course, Flashcard, FlashcardSet, LessonComplete, LessonFailure, NewCourseRequest,
    NewFlashcardSet, QuickAssessment, QuickLearn, QuickLearnDocument, QuickLearnSummary, Section,
    SourceType, Test, UnitOutline,
};

fn now() -> String {
    Utc::now().to_rfc3339()
}

// ---- courses ----

#[derive(FromRow)]
struct CourseRow {
    id: String,
    user_id: String,
    title: String,
    description: String,
    estimated_duration_hours_per_week: i64,
    estimated_number_of_weeks: i64,
    prerequisites: Json<Vec<String>>,
    final_exam_description: Option<String>,
    level: String,
    depth: String,
    units: Json<Vec<UnitOutline>>,
    unit_lessons: Json<Vec<LessonComplete>>,
    final_exam: Json<Option<Test>>,
    failed_lessons: Json<Vec<LessonFailure>>,
    is_draft: bool,
    completed: i64,
    created_at: String,
    last_accessed: Option<String>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            estimated_duration_hours_per_week: row.estimated_duration_hours_per_week,
            estimated_number_of_weeks: row.estimated_number_of_weeks,
            prerequisites: row.prerequisites.0,
            final_exam_description: row.final_exam_description,
            level: row.level,
            depth: row.depth,
            units: row.units.0,
            unit_lessons: row.unit_lessons.0,
            final_exam: row.final_exam.0,
            failed_lessons: row.failed_lessons.0,
            is_draft: row.is_draft,
            completed: row.completed,
            created_at: row.created_at,
            last_accessed: row.last_accessed,
        }
    }
}

const COURSE_COLUMNS: &str = "id, user_id, title, description, estimated_duration_hours_per_week, \
    estimated_number_of_weeks, prerequisites, final_exam_description, level, depth, units, \
    unit_lessons, final_exam, failed_lessons, is_draft, completed, created_at, last_accessed";

pub async fn fetch_courses(db: &SqlitePool, user_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE user_id = ? \
         ORDER BY last_accessed IS NULL, last_accessed DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Course::from).collect())
}

pub async fn find_course(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Course::from))
}

pub async fn touch_course(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    let updated = sqlx::query("UPDATE courses SET last_accessed = ? WHERE id = ? AND user_id = ?")
        .bind(now())
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Ok(None);
    }
    find_course(db, user_id, id).await
}

pub async fn insert_course(
    db: &SqlitePool,
    user_id: &str,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let course = Course {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: req.title,
        description: req.description,
        estimated_duration_hours_per_week: req.estimated_duration_hours_per_week,
        estimated_number_of_weeks: req.estimated_number_of_weeks,
        prerequisites: req.prerequisites,
        final_exam_description: req.final_exam_description,
        level: req.level,
        depth: req.depth,
        units: req.units,
        unit_lessons: req.unit_lessons,
        final_exam: req.final_exam,
        failed_lessons: req.failed_lessons,
        is_draft: req.is_draft,
        completed: req.completed,
        created_at: now(),
        last_accessed: None,
    };

    sqlx::query(&format!(
        "INSERT INTO courses ({COURSE_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&course.id)
    .bind(&course.user_id)
    .bind(&course.title)
    .bind(&course.description)
    .bind(course.estimated_duration_hours_per_week)
    .bind(course.estimated_number_of_weeks)
    .bind(Json(&course.prerequisites))
    .bind(&course.final_exam_description)
    .bind(&course.level)
    .bind(&course.depth)
    .bind(Json(&course.units))
    .bind(Json(&course.unit_lessons))
    .bind(Json(&course.final_exam))
    .bind(Json(&course.failed_lessons))
    .bind(course.is_draft)
    .bind(course.completed)
    .bind(&course.created_at)
    .bind(&course.last_accessed)
    .execute(db)
    .await?;

    Ok(course)
}

/// Writes every mutable column of `course` back. Returns false when the
/// row no longer exists.
pub async fn save_course(db: &SqlitePool, course: &Course) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        r#"
        UPDATE courses
        SET title = ?, description = ?, estimated_duration_hours_per_week = ?,
            estimated_number_of_weeks = ?, prerequisites = ?, final_exam_description = ?,
            level = ?, depth = ?, units = ?, unit_lessons = ?, final_exam = ?,
            failed_lessons = ?, is_draft = ?, completed = ?, last_accessed = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&course.title)
    .bind(&course.description)
    .bind(course.estimated_duration_hours_per_week)
    .bind(course.estimated_number_of_weeks)
    .bind(Json(&course.prerequisites))
    .bind(&course.final_exam_description)
    .bind(&course.level)
    .bind(&course.depth)
    .bind(Json(&course.units))
    .bind(Json(&course.unit_lessons))
    .bind(Json(&course.final_exam))
    .bind(Json(&course.failed_lessons))
    .bind(course.is_draft)
    .bind(course.completed)
    .bind(&course.last_accessed)
    .bind(&course.id)
    .bind(&course.user_id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(updated > 0)
}

pub async fn delete_course(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM courses WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

// ---- quick learns ----

#[derive(FromRow)]
struct QuickLearnRow {
    id: String,
    user_id: String,
    title: String,
    topic: String,
    difficulty: String,
    description: String,
    estimated_duration_minutes: i64,
    sections: Json<Vec<Section>>,
    assessment: Json<QuickAssessment>,
    completed: i64,
    created_at: String,
    last_accessed: String,
}

impl From<QuickLearnRow> for QuickLearn {
    fn from(row: QuickLearnRow) -> Self {
        QuickLearn {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            topic: row.topic,
            difficulty: row.difficulty,
            description: row.description,
            estimated_duration_minutes: row.estimated_duration_minutes,
            sections: row.sections.0,
            assessment: row.assessment.0,
            completed: row.completed,
            created_at: row.created_at,
            last_accessed: row.last_accessed,
        }
    }
}

#[derive(FromRow)]
struct QuickLearnSummaryRow {
    id: String,
    title: String,
    topic: String,
    difficulty: String,
    description: String,
    estimated_duration_minutes: i64,
    sections: Json<Vec<Section>>,
    completed: i64,
    created_at: String,
    last_accessed: String,
}

impl From<QuickLearnSummaryRow> for QuickLearnSummary {
    fn from(row: QuickLearnSummaryRow) -> Self {
        QuickLearnSummary {
            id: row.id,
            title: row.title,
            topic: row.topic,
            difficulty: row.difficulty,
            description: row.description,
            estimated_duration_minutes: row.estimated_duration_minutes,
            sections: row.sections.0,
            completed: row.completed,
            created_at: row.created_at,
            last_accessed: row.last_accessed,
        }
    }
}

const QUICK_LEARN_COLUMNS: &str = "id, user_id, title, topic, difficulty, description, \
    estimated_duration_minutes, sections, assessment, completed, created_at, last_accessed";

pub async fn insert_quick_learn(
    db: &SqlitePool,
    user_id: &str,
    document: QuickLearnDocument,
) -> Result<QuickLearn, sqlx::Error> {
    let timestamp = now();
    let quick_learn = QuickLearn {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: document.title,
        topic: document.topic,
        difficulty: document.difficulty,
        description: document.description,
        estimated_duration_minutes: document.estimated_duration_minutes,
        sections: document.sections,
        assessment: document.assessment,
        completed: document.completed,
        created_at: timestamp.clone(),
        last_accessed: timestamp,
    };

    sqlx::query(&format!(
        "INSERT INTO quick_learns ({QUICK_LEARN_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&quick_learn.id)
    .bind(&quick_learn.user_id)
    .bind(&quick_learn.title)
    .bind(&quick_learn.topic)
    .bind(&quick_learn.difficulty)
    .bind(&quick_learn.description)
    .bind(quick_learn.estimated_duration_minutes)
    .bind(Json(&quick_learn.sections))
    .bind(Json(&quick_learn.assessment))
    .bind(quick_learn.completed)
    .bind(&quick_learn.created_at)
    .bind(&quick_learn.last_accessed)
    .execute(db)
    .await?;

    Ok(quick_learn)
}

pub async fn fetch_quick_learns(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<QuickLearnSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QuickLearnSummaryRow>(
        r#"
        SELECT id, title, topic, difficulty, description, estimated_duration_minutes,
               sections, completed, created_at, last_accessed
        FROM quick_learns
        WHERE user_id = ?
        ORDER BY last_accessed DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(QuickLearnSummary::from).collect())
}

pub async fn find_quick_learn(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<QuickLearn>, sqlx::Error> {
    let row = sqlx::query_as::<_, QuickLearnRow>(&format!(
        "SELECT {QUICK_LEARN_COLUMNS} FROM quick_learns WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(QuickLearn::from))
}

pub async fn touch_quick_learn(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<QuickLearn>, sqlx::Error> {
    let updated = sqlx::query("UPDATE quick_learns SET last_accessed = ? WHERE id = ? AND user_id = ?")
        .bind(now())
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Ok(None);
    }
    find_quick_learn(db, user_id, id).await
}

pub async fn update_quick_learn_sections(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    sections: Vec<Section>,
) -> Result<Option<QuickLearn>, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE quick_learns SET sections = ?, last_accessed = ? WHERE id = ? AND user_id = ?",
    )
    .bind(Json(&sections))
    .bind(now())
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?
    .rows_affected();

    if updated == 0 {
        return Ok(None);
    }
    find_quick_learn(db, user_id, id).await
}

pub async fn delete_quick_learn(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM quick_learns WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

// ---- flashcard sets ----

#[derive(FromRow)]
struct FlashcardSetRow {
    id: String,
    user_id: String,
    title: String,
    topic: String,
    description: String,
    flashcards: Json<Vec<Flashcard>>,
    sessions_completed: i64,
    last_test_score: i64,
    still_learning_count: i64,
    still_studying_count: i64,
    mastered_count: i64,
    source_id: String,
    source_type: String,
    created_at: String,
    last_accessed: String,
}

impl From<FlashcardSetRow> for FlashcardSet {
    fn from(row: FlashcardSetRow) -> Self {
        FlashcardSet {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            topic: row.topic,
            description: row.description,
            flashcards: row.flashcards.0,
            sessions_completed: row.sessions_completed,
            last_test_score: row.last_test_score,
            still_learning_count: row.still_learning_count,
            still_studying_count: row.still_studying_count,
            mastered_count: row.mastered_count,
            source_id: row.source_id,
            source_type: row.source_type,
            created_at: row.created_at,
            last_accessed: row.last_accessed,
        }
    }
}

const FLASHCARD_SET_COLUMNS: &str = "id, user_id, title, topic, description, flashcards, \
    sessions_completed, last_test_score, still_learning_count, still_studying_count, \
    mastered_count, source_id, source_type, created_at, last_accessed";

pub async fn insert_flashcard_set(
    db: &SqlitePool,
    user_id: &str,
    new_set: NewFlashcardSet,
) -> Result<FlashcardSet, sqlx::Error> {
    let timestamp = now();
    let set = FlashcardSet {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: new_set.title,
        topic: new_set.topic,
        description: new_set.description,
        flashcards: new_set.flashcards,
        sessions_completed: 0,
        last_test_score: 0,
        still_learning_count: 0,
        still_studying_count: 0,
        mastered_count: 0,
        source_id: new_set.source_id,
        source_type: new_set.source_type.as_str().to_string(),
        created_at: timestamp.clone(),
        last_accessed: timestamp,
    };

    sqlx::query(&format!(
        "INSERT INTO flashcard_sets ({FLASHCARD_SET_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&set.id)
    .bind(&set.user_id)
    .bind(&set.title)
    .bind(&set.topic)
    .bind(&set.description)
    .bind(Json(&set.flashcards))
    .bind(set.sessions_completed)
    .bind(set.last_test_score)
    .bind(set.still_learning_count)
    .bind(set.still_studying_count)
    .bind(set.mastered_count)
    .bind(&set.source_id)
    .bind(&set.source_type)
    .bind(&set.created_at)
    .bind(&set.last_accessed)
    .execute(db)
    .await?;

    Ok(set)
}

pub async fn fetch_flashcard_sets(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<FlashcardSet>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FlashcardSetRow>(&format!(
        "SELECT {FLASHCARD_SET_COLUMNS} FROM flashcard_sets WHERE user_id = ? ORDER BY last_accessed DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(FlashcardSet::from).collect())
}

pub async fn find_flashcard_set(
    db: &SqlitePool,
    user_id: &str,
    source_type: SourceType,
    id: &str,
) -> Result<Option<FlashcardSet>, sqlx::Error> {
    let row = sqlx::query_as::<_, FlashcardSetRow>(&format!(
        "SELECT {FLASHCARD_SET_COLUMNS} FROM flashcard_sets \
         WHERE id = ? AND user_id = ? AND source_type = ?"
    ))
    .bind(id)
    .bind(user_id)
    .bind(source_type.as_str())
    .fetch_optional(db)
    .await?;

    Ok(row.map(FlashcardSet::from))
}

pub async fn save_flashcard_set(db: &SqlitePool, set: &FlashcardSet) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        r#"
        UPDATE flashcard_sets
        SET title = ?, description = ?, flashcards = ?, sessions_completed = ?,
            last_test_score = ?, still_learning_count = ?, still_studying_count = ?,
            mastered_count = ?, last_accessed = ?
        WHERE id = ? AND user_id = ? AND source_type = ?
        "#,
    )
    .bind(&set.title)
    .bind(&set.description)
    .bind(Json(&set.flashcards))
    .bind(set.sessions_completed)
    .bind(set.last_test_score)
    .bind(set.still_learning_count)
    .bind(set.still_studying_count)
    .bind(set.mastered_count)
    .bind(&set.last_accessed)
    .bind(&set.id)
    .bind(&set.user_id)
    .bind(&set.source_type)
    .execute(db)
    .await?
    .rows_affected();

    Ok(updated > 0)
}

pub async fn delete_flashcard_set(
    db: &SqlitePool,
    user_id: &str,
    source_type: SourceType,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM flashcard_sets WHERE id = ? AND user_id = ? AND source_type = ?")
        .bind(id)
        .bind(user_id)
        .bind(source_type.as_str())
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted > 0)
}
