pub mod matches;
pub mod players;
pub mod teams;
pub mod turn_order;
pub mod words;

pub mod prelude {
    pub use super::matches::Entity as Matches;
    pub use super::players::Entity as Players;
    pub use super::teams::Entity as Teams;
    pub use super::turn_order::Entity as TurnOrder;
    pub use super::words::Entity as Words;
}
