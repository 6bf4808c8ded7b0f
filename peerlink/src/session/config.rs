use crate::session::state::SessionRole;

pub(crate) const UNSPECIFIED_STR: &str = "Unspecified";

/// Parameters fixed for the lifetime of a session.
///
/// Built through [`SessionConfigBuilder`]:
///
/// ```
/// use peerlink::session::{SessionConfigBuilder, SessionRole};
///
/// let config = SessionConfigBuilder::new(SessionRole::Initiator)
///     .with_session_id("caller".to_string())
///     .build();
/// assert_eq!(config.role(), SessionRole::Initiator);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The side of the exchange this session plays.
    pub(crate) role: SessionRole,

    /// Identifier used in logs and for telling sessions apart. A random
    /// one is generated when left empty.
    pub(crate) session_id: String,
}

impl SessionConfig {
    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

pub struct SessionConfigBuilder {
    role: SessionRole,
    session_id: String,
}

impl SessionConfigBuilder {
    pub fn new(role: SessionRole) -> Self {
        SessionConfigBuilder {
            role,
            session_id: String::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn build(self) -> SessionConfig {
        SessionConfig {
            role: self.role,
            session_id: self.session_id,
        }
    }
}
