//! OAuth token types, storage contract and refresh management.

mod manager;
mod storage;
mod tokens;

pub use manager::Manager;
pub use storage::{MemoryStorage, Storage};
pub(crate) use tokens::string_field;
pub use tokens::{AccessToken, PlainAccessToken, RequestToken};
