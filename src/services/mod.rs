//! Service layer: everything between the HTTP handlers and the store.

mod auth;
mod clicks;
mod helpers;
mod links;
mod resolve;

pub use auth::*;
pub use clicks::*;
pub use helpers::{generate_api_key, generate_slug, hash_api_key};
pub use links::*;
pub use resolve::*;
