//! Who is asking: the identity context handed to the core by the auth boundary.

use crate::domain::UserId;

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub is_admin: bool,
}

impl Actor {
    /// Regular, non-admin caller.
    pub const fn user(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }
}

/// Caller of a read operation, possibly anonymous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(Actor),
}

impl Viewer {
    /// Authenticated caller, if any.
    pub const fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(actor) => Some(actor),
        }
    }

    /// Authenticated caller's id, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.actor().map(|actor| actor.id)
    }
}

impl From<Actor> for Viewer {
    fn from(value: Actor) -> Self {
        Self::Authenticated(value)
    }
}
