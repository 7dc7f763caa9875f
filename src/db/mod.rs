// Re-export the Database struct and other public items
pub mod core;
mod schema;
mod snapshot;

pub use self::core::Database;
