//! User module: three-layer architecture (domain, repository, service).
//!
//! Account creation and credential checks live here, independent of the web
//! framework that exposes them.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;

pub use domain::{CreateUserRequest, LoginUserRequest, User};
pub use errors::{FailureKind, UserError};
pub use repository::{StoredUserRepository, UserRepository};
pub use service::{UserAccounts, UserService, PASSWORD_ALGORITHM};
