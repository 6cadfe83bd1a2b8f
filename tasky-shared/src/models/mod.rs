/// Database models for Tasky
///
/// # Models
///
/// - `user`: User accounts
/// - `todo`: Per-user task items
///
/// Each model carries its own PostgreSQL queries as associated functions that
/// take a `&PgPool`. Code outside `store::postgres` should go through the
/// [`TodoStore`](crate::store::TodoStore) trait instead of calling them
/// directly.

pub mod todo;
pub mod user;
