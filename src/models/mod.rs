pub mod assessment;
pub mod coerce;
pub mod course;
pub mod flashcard;
pub mod quick_learn;
pub mod syllabus;
pub mod video;

pub use assessment::{Question, Test};
pub use course::{
    Course, CourseFull, GeneratedCourseResponse, GeneratedLesson, LessonComplete, LessonFailure,
    LessonStatusRequest, NewCourseRequest, Resource, UpdateCourseRequest,
};
pub use flashcard::{
    CardProgressRequest, ContentScope, Flashcard, FlashcardSet, FlashcardSetCreated,
    GeneratedFlashcards, NewFlashcardSet, NewFlashcardSetRequest, ProgressCounts, SetProgressRequest, SourceType,
    UpdateFlashcardSetRequest,
};
pub use quick_learn::{
    GenerateQuickLearnRequest, GeneratedQuickLearn, QuickAssessment, QuickLearn,
    QuickLearnDocument, QuickLearnSummary, ScoredQuestion, Section, UpdateQuickLearnRequest,
};
pub use syllabus::{
    GenerateSyllabusRequest, LessonOutline, Syllabus, SyllabusError, UnitOutline,
};
pub use video::{EnrichContentRequest, VideoList, VideoSearchRequest};
