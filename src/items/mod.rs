//! Items CRUD for the API service: a plain keyed store, no lifecycle.

pub mod store;

pub use store::{Item, ItemError, ItemStore, NewItem};
