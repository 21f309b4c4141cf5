//! Orchestration over the board database.
//!
//! Each mutating operation validates its input, authorizes the caller
//! against the owning board, then applies position changes, the row write
//! and the activity entry in one transaction.

pub mod accounts;
pub mod activity;
pub mod auth;
pub mod authorization;
pub mod board;
pub mod card;
pub mod error;
pub mod list;
pub mod password;
pub mod validation;

pub use accounts::{AuthService, AuthSession};
pub use activity::ActivityService;
pub use auth::{AuthError, AuthProvider, JwtService};
pub use authorization::authorize;
pub use board::BoardService;
pub use card::CardService;
pub use error::{FieldError, ServiceError};
pub use list::ListService;
