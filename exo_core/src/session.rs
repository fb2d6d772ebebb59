use exo_traits::{Authorizer, Role};

/// Caller identity handed over by the auth collaborator.
///
/// An anonymous session has neither username nor role (the device's polling
/// path); an authenticated one always has a username.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
    role: Option<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: Some(username.into()),
            role: Some(role),
        }
    }

    pub fn patient(username: impl Into<String>) -> Self {
        Self::authenticated(username, Role::Patient)
    }

    pub fn therapist(username: impl Into<String>) -> Self {
        Self::authenticated(username, Role::Therapist)
    }
}

impl Authorizer for Session {
    fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    fn role(&self) -> Option<Role> {
        self.role
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}
