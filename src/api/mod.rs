mod extract;

pub use extract::ApiJson;

use std::time::Duration;

use axum::Json;
use axum::extract::Path;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::{flashcards, videos};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/syllabus/generate", post(generate_syllabus))
        .route("/courses/generate", post(generate_course))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/lessons/{index}", patch(update_lesson_status))
        .route("/quick-learns/generate", post(generate_quick_learn))
        .route("/quick-learns", get(list_quick_learns))
        .route(
            "/quick-learns/{id}",
            get(get_quick_learn)
                .put(update_quick_learn)
                .delete(delete_quick_learn),
        )
        .route(
            "/flashcard-sets",
            get(list_flashcard_sets).post(create_flashcard_set),
        )
        .route(
            "/flashcard-sets/{source_type}/{id}",
            get(get_flashcard_set)
                .put(update_flashcard_set)
                .delete(delete_flashcard_set),
        )
        .route(
            "/flashcard-sets/{source_type}/{id}/progress",
            post(record_set_progress),
        )
        .route(
            "/flashcard-sets/{source_type}/{id}/cards/{card_id}/progress",
            post(record_card_progress),
        )
        .route("/videos/search", post(search_videos))
        .route("/videos/enrich", post(enrich_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser frontend. Origins that are not valid header
/// values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(3600))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

// ---- syllabus / courses ----

async fn generate_syllabus(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiJson(req): ApiJson<GenerateSyllabusRequest>,
) -> Result<Json<Syllabus>, AppError> {
    let syllabus = state
        .syllabus
        .generate(&req.topic, &req.difficulty, req.depth.as_deref())
        .await?;
    Ok(Json(syllabus))
}

async fn generate_course(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<GeneratedCourseResponse>), AppError> {
    let syllabus = Syllabus::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let syllabus = state.syllabus.fill_missing_objectives(syllabus).await?;

    let expansion = state.expander.expand(&syllabus).await;
    let failed_lessons = expansion.failures.clone();
    let req = NewCourseRequest::from_expansion(expansion.course, expansion.failures);
    let course = repository::insert_course(&state.db, &user_id, req).await?;

    info!(
        "Stored course {} with {} lessons ({} failed)",
        course.id,
        course.unit_lessons.len(),
        failed_lessons.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(GeneratedCourseResponse {
            course,
            failed_lessons,
        }),
    ))
}

async fn list_courses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db, &user_id).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Missing required field: title".to_string()));
    }
    let course = repository::insert_course(&state.db, &user_id, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = repository::touch_course(&state.db, &user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let mut course = repository::find_course(&state.db, &user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    course.apply(req);
    if !repository::save_course(&state.db, &course).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_course(&state.db, &user_id, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn update_lesson_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, index)): Path<(String, usize)>,
    ApiJson(req): ApiJson<LessonStatusRequest>,
) -> Result<Json<Course>, AppError> {
    let mut course = repository::find_course(&state.db, &user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !course.set_lesson_status(index, &req.status) {
        return Err(AppError::NotFound);
    }
    if !repository::save_course(&state.db, &course).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(course))
}

// ---- quick learns ----

async fn generate_quick_learn(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<GenerateQuickLearnRequest>,
) -> Result<(StatusCode, Json<QuickLearn>), AppError> {
    let document = state.quick_learn.generate(&req.topic, &req.difficulty).await?;
    let quick_learn = repository::insert_quick_learn(&state.db, &user_id, document).await?;
    Ok((StatusCode::CREATED, Json(quick_learn)))
}

async fn list_quick_learns(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<QuickLearnSummary>>, AppError> {
    let quick_learns = repository::fetch_quick_learns(&state.db, &user_id).await?;
    Ok(Json(quick_learns))
}

async fn get_quick_learn(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<QuickLearn>, AppError> {
    let quick_learn = repository::touch_quick_learn(&state.db, &user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(quick_learn))
}

async fn update_quick_learn(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateQuickLearnRequest>,
) -> Result<Json<QuickLearn>, AppError> {
    let quick_learn = repository::update_quick_learn_sections(&state.db, &user_id, &id, req.sections)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(quick_learn))
}

async fn delete_quick_learn(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_quick_learn(&state.db, &user_id, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// ---- flashcard sets ----

async fn list_flashcard_sets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FlashcardSet>>, AppError> {
    let sets = repository::fetch_flashcard_sets(&state.db, &user_id).await?;
    Ok(Json(sets))
}

async fn create_flashcard_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<NewFlashcardSetRequest>,
) -> Result<(StatusCode, Json<FlashcardSetCreated>), AppError> {
    flashcards::validate_card_count(req.card_count)?;
    if req.source_id.trim().is_empty() || req.learning_goal.trim().is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let (title, topic, description, content) = match req.source_type {
        SourceType::Course => {
            let course = repository::find_course(&state.db, &user_id, &req.source_id)
                .await?
                .ok_or(AppError::NotFound)?;
            let content = flashcards::course_content(&course, req.content_scope)?;
            (course.title, "General".to_string(), course.description, content)
        }
        SourceType::QuickLearn => {
            let quick_learn = repository::find_quick_learn(&state.db, &user_id, &req.source_id)
                .await?
                .ok_or(AppError::NotFound)?;
            let content = flashcards::quick_learn_content(&quick_learn)?;
            (quick_learn.title, quick_learn.topic, quick_learn.description, content)
        }
    };

    let cards = state
        .flashcards
        .generate(&content, req.card_count, &req.learning_goal)
        .await?;
    let set = repository::insert_flashcard_set(
        &state.db,
        &user_id,
        NewFlashcardSet {
            title,
            topic,
            description,
            flashcards: cards,
            source_id: req.source_id,
            source_type: req.source_type,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(FlashcardSetCreated {
            message: "Flashcard set created successfully".to_string(),
            flashcard_set_id: set.id,
        }),
    ))
}

async fn get_flashcard_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((source_type, id)): Path<(SourceType, String)>,
) -> Result<Json<FlashcardSet>, AppError> {
    let set = repository::find_flashcard_set(&state.db, &user_id, source_type, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(set))
}

async fn update_flashcard_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((source_type, id)): Path<(SourceType, String)>,
    ApiJson(req): ApiJson<UpdateFlashcardSetRequest>,
) -> Result<Json<FlashcardSet>, AppError> {
    let mut set = repository::find_flashcard_set(&state.db, &user_id, source_type, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    flashcards::apply_update(&mut set, req)?;
    if !repository::save_flashcard_set(&state.db, &set).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(set))
}

async fn delete_flashcard_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((source_type, id)): Path<(SourceType, String)>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_flashcard_set(&state.db, &user_id, source_type, &id).await?;
    if ok {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn record_set_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((source_type, id)): Path<(SourceType, String)>,
    ApiJson(req): ApiJson<SetProgressRequest>,
) -> Result<Json<FlashcardSet>, AppError> {
    let mut set = repository::find_flashcard_set(&state.db, &user_id, source_type, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    flashcards::apply_set_progress(&mut set, &req);
    if !repository::save_flashcard_set(&state.db, &set).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(set))
}

async fn record_card_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((source_type, id, card_id)): Path<(SourceType, String, i64)>,
    ApiJson(req): ApiJson<CardProgressRequest>,
) -> Result<Json<FlashcardSet>, AppError> {
    let mut set = repository::find_flashcard_set(&state.db, &user_id, source_type, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !flashcards::apply_card_progress(&mut set, card_id, &req) {
        return Err(AppError::NotFound);
    }
    if !repository::save_flashcard_set(&state.db, &set).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(set))
}

// ---- videos ----

async fn search_videos(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiJson(req): ApiJson<VideoSearchRequest>,
) -> Result<Json<VideoList>, AppError> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(AppError::BadRequest("Missing required parameter: query".to_string()));
    }
    let max_results = videos::clamp_max_results(req.max_results.as_ref());
    let found = state.videos.search(&query, max_results).await;
    Ok(Json(VideoList::new(found, query, None)))
}

async fn enrich_content(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiJson(req): ApiJson<EnrichContentRequest>,
) -> Result<Json<VideoList>, AppError> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Missing required parameter: title".to_string()));
    }
    let query = format!("{} {} tutorial", title, req.content_type.trim());
    let max_results = videos::clamp_max_results(req.max_results.as_ref());
    let found = state.videos.search(&query, max_results).await;
    Ok(Json(VideoList::new(found, query, Some(title))))
}
