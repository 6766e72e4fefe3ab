pub mod jwt_handler;
pub mod poll;
pub mod sync;

pub use crate::cookies::HostUrls;
pub use jwt_handler::JwtHandler;
pub use poll::{spawn_poll, PollHandle, DEFAULT_POLL_INTERVAL_MS};
pub use sync::{SyncParameters, SyncReadOrder, DEVELOPMENT_SYNC_COOKIE, PRODUCTION_SYNC_COOKIE};
