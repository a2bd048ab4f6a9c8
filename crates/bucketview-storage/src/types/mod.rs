//! Request and response types shared by every storage backend.

mod list;
mod storage;

pub use list::{ListPage, ListRequest, ObjectEntry};
pub use storage::{ObjectStorage, TagSet};
