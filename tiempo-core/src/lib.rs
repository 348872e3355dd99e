pub mod match_state;
pub mod rounds;
pub mod rules;
pub mod scoring;
pub mod turn_order;
pub mod word_pool;

// Re-export main components
pub use match_state::*;
pub use rules::*;
pub use scoring::*;
