//! Parameterized statements: fixed SQL text, user values only as `$n` parameters.

pub mod params;
mod users;
pub use params::*;
pub use users::*;

/// SQL text plus the values for its positional placeholders, in order.
#[derive(Debug, Clone)]
pub struct QueryBuf {
    pub sql: &'static str,
    pub params: Vec<PgBindValue>,
}
