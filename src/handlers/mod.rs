pub mod admin_teacher;
pub mod diagnostics;
pub mod diff;
pub mod extract;
pub mod health;
pub mod live;
pub mod posts;
pub mod sessions;
pub mod student_code;
pub mod teacher_code;
pub mod text_sync;

#[cfg(test)]
mod tests;

pub use admin_teacher::*;
pub use diagnostics::*;
pub use diff::*;
pub use health::*;
pub use live::*;
pub use posts::*;
pub use sessions::*;
pub use student_code::*;
pub use teacher_code::*;
pub use text_sync::*;
