use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenVerifier;
use crate::gemini::GenerationClient;
use crate::services::{
    FlashcardService, LessonExpander, QuickLearnService, SyllabusService, VideoSearch,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub verifier: Arc<TokenVerifier>,
    pub syllabus: Arc<SyllabusService>,
    pub expander: Arc<LessonExpander>,
    pub quick_learn: Arc<QuickLearnService>,
    pub flashcards: Arc<FlashcardService>,
    pub videos: Arc<VideoSearch>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        generator: Arc<dyn GenerationClient>,
        verifier: TokenVerifier,
        expander: LessonExpander,
        videos: VideoSearch,
    ) -> Self {
        Self {
            db,
            verifier: Arc::new(verifier),
            syllabus: Arc::new(SyllabusService::new(generator.clone())),
            expander: Arc::new(expander),
            quick_learn: Arc::new(QuickLearnService::new(generator.clone())),
            flashcards: Arc::new(FlashcardService::new(generator)),
            videos: Arc::new(videos),
        }
    }
}
