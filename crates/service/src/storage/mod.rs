//! Storage abstractions for service layer
//!
//! The only persistence is a directory of JSON documents, one per collection.

pub mod json_collection_store;

pub use json_collection_store::JsonCollectionStore;
