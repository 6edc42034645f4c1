pub mod application_store;
pub mod directory_store;
pub mod memory;
pub mod notification_store;
pub mod pool;

pub use application_store::{ApplicationStore, PgApplicationStore};
pub use directory_store::{DirectoryStore, PgDirectoryStore};
pub use memory::InMemoryStore;
pub use notification_store::{NotificationStore, PgNotificationStore};
