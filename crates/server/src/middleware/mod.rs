pub mod auth;

pub use auth::{RequestContext, require_session};
