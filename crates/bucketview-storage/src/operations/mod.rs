//! Bucket operations used by the table engine.

mod object_operations;

pub use object_operations::ObjectOperations;
