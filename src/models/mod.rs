pub mod code;
pub mod diagnostics;
pub mod diff;
pub mod error;
pub mod events;
pub mod health;
pub mod post;
pub mod session;
pub mod text_sync;
pub mod user;

pub use code::*;
pub use diagnostics::*;
pub use diff::*;
pub use error::*;
pub use events::*;
pub use health::*;
pub use post::*;
pub use session::*;
pub use text_sync::*;
pub use user::*;
