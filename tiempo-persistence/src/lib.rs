pub mod connection;
pub mod entities;
pub mod repositories;
pub mod service;

pub use repositories::MatchRepository;
pub use service::{MatchResults, MatchService};
