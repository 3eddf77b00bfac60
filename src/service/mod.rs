//! User persistence: the `UserService` port and its PostgreSQL implementation.

mod users;
pub use users::{PgUserService, UserService};
