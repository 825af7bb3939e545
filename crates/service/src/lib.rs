//! Service layer for the blog server user accounts.
//! - `user`: signup and login business logic over a repository trait.
//! - `token`: JWT issuance bound to user ids.
//! - `notification`: best-effort outbound mail.
//! - `storage`: the JSON map store backing the user repository.

pub mod notification;
pub mod storage;
pub mod token;
pub mod user;
