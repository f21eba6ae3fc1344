pub mod connection;
pub mod entries;
pub mod match_pairs;
pub mod match_scores;
pub mod match_slots;
pub mod matches;
pub mod models;
pub mod pairs;
pub mod phases;
pub mod players;
pub mod points;
pub mod setup;
pub mod teams;
pub mod tournaments;
pub mod users;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
pub use models::*;
