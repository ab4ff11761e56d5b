pub mod error;
pub mod list;
pub mod ordering;
pub mod store;
pub mod todo;
pub mod user;
