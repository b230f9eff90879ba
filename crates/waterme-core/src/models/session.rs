//! Session model

use serde::{Deserialize, Serialize};

/// The signed-in user as remembered on this device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current user, if logged in
    pub user_id: Option<i64>,
    /// Display name of the current user
    pub user_name: Option<String>,
    pub logged_in: bool,
    /// Most recent user to log in; survives logout
    pub last_user_id: Option<i64>,
}

impl Session {
    /// Current user id when the session is active
    #[must_use]
    pub fn active_user_id(&self) -> Option<i64> {
        if self.logged_in {
            self.user_id
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_user_requires_logged_in_flag() {
        let session = Session {
            user_id: Some(4),
            user_name: Some("Ana".into()),
            logged_in: false,
            last_user_id: Some(4),
        };
        assert_eq!(session.active_user_id(), None);

        let session = Session {
            logged_in: true,
            ..session
        };
        assert_eq!(session.active_user_id(), Some(4));
    }
}
