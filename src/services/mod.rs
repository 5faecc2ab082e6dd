pub mod expander;
pub mod flashcards;
pub mod quick_learn;
pub mod resources;
pub mod syllabus;
pub mod videos;

pub use expander::{Expansion, LessonExpander, SlotContent};
pub use flashcards::FlashcardService;
pub use quick_learn::QuickLearnService;
pub use resources::LinkChecker;
pub use syllabus::SyllabusService;
pub use videos::VideoSearch;
