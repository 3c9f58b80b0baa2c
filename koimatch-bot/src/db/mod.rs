//! Database access for the matching service
//!
//! Repository functions are generic over the sqlx executor so the same
//! queries run against the pool directly or inside a transaction. All
//! mutation of `users.matched_with_user_id` and `likes.matched` goes
//! through the matching resolver; nothing else writes those columns.

pub mod likes;
pub mod users;
