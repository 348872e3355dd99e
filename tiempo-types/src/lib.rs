pub mod errors;
pub mod game;
pub mod team;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use team::*;
