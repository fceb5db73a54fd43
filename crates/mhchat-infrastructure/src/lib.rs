pub mod config_service;
pub mod file_message_store;
pub mod memory_message_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_message_store::FileMessageStore;
pub use crate::memory_message_store::InMemoryMessageStore;
pub use crate::paths::MhChatPaths;
