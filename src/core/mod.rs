// Core lifecycle exports
pub mod engine;
pub mod error;
pub mod gate;
pub mod messenger;
pub mod store;

pub use engine::MatchingEngine;
pub use error::CoreError;
pub use messenger::Messenger;
pub use store::{
    LookupError, MatchRegistry, MessageArchive, NotificationSink, RatingLedger, StorageError,
    UserLookup,
};
