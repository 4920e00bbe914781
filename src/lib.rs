pub mod core;
pub mod genre;
pub mod persistence;
pub mod render;
pub mod study;

pub use crate::core::{ TangochoError, TextRun, WordEntry };
pub use genre::{ GenreIndex, GenreNode, NodeRef };
pub use persistence::WordStore;
pub use render::{ expand, is_japanese_script, Fragment, FragmentStyle, RunStyle, ScriptClass };
pub use study::{ StudyController, StudyState, WordPatch };
