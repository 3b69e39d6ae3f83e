// Service exports
pub mod directory;
pub mod memory;
pub mod postgres;

pub use directory::HttpUserDirectory;
pub use memory::{MemoryDirectory, MemorySink, MemoryStore, NotificationEvent};
pub use postgres::PostgresStore;
