pub mod auth_service;
pub mod guard;
pub mod list_service;
pub mod sessions;
pub mod todo_service;

#[cfg(test)]
pub(crate) mod test_support;
