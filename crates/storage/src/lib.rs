pub mod backend;
pub mod error;
mod key;
mod location;
mod models;

pub use crate::backend::StorageBackend;
pub use crate::key::validate as validate_key;
pub use crate::location::{LocationMap, rendition_key};
pub use crate::models::ObjectMeta;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
