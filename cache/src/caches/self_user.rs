use parking_lot::RwLock;

use crate::model::CurrentUser;

/// The authenticated user. Always retained regardless of cache flags.
#[derive(Default)]
pub struct SelfUserCache {
    user: RwLock<Option<CurrentUser>>,
}

impl SelfUserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<CurrentUser> {
        self.user.read().clone()
    }

    /// Store the new value and return the one it replaced.
    pub fn set(&self, user: CurrentUser) -> Option<CurrentUser> {
        self.user.write().replace(user)
    }
}
