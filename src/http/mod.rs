pub mod routing;
pub mod types;

use crate::application::auth_service::AuthServiceImpl;
use crate::application::guard::{AccessGuard, OwnershipPolicy};
use crate::application::list_service::ListServiceImpl;
use crate::application::sessions::SessionRegistry;
use crate::application::todo_service::TodoServiceImpl;
use crate::domain::store::Store;

#[derive(Clone)]
pub struct AppState<R: Store> {
    pub auth: AuthServiceImpl<R>,
    pub lists: ListServiceImpl<R>,
    pub todos: TodoServiceImpl<R>,
}

impl<R: Store> AppState<R> {
    pub fn new(store: R, sessions: SessionRegistry) -> Self {
        Self::with_policy(store, sessions, OwnershipPolicy::default())
    }

    pub fn with_policy(store: R, sessions: SessionRegistry, policy: OwnershipPolicy) -> Self {
        let guard = AccessGuard::with_policy(sessions.clone(), store.clone(), policy);
        Self {
            auth: AuthServiceImpl::new(store.clone(), sessions),
            lists: ListServiceImpl::new(guard.clone(), store.clone()),
            todos: TodoServiceImpl::new(guard, store),
        }
    }
}
