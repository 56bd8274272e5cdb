// Address book CRUD: persistence glue with a single invariant, at most
// one default address per user.

pub mod handlers;
pub mod models;

pub use models::*;
