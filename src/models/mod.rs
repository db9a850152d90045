pub mod conversation;
pub mod enums;
pub mod language;

pub use conversation::*;
pub use enums::*;
pub use language::*;
