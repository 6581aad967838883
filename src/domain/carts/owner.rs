//! Cart ownership.

use crate::{
    domain::{carts::errors::CartsServiceError, users::models::UserUuid},
    uuids::TypedUuid,
};

/// Marker for anonymous session-cart identifiers delivered via a cookie.
#[derive(Debug)]
pub struct Session;

/// Session UUID
pub type SessionUuid = TypedUuid<Session>;

/// The single owner of a cart: an authenticated user or an anonymous session,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOwner {
    User(UserUuid),
    Session(SessionUuid),
}

impl CartOwner {
    /// Resolves the cart owner from the caller's identity, preferring the
    /// authenticated user over the session cookie.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::SessionMissing`] when neither identity is
    /// present. This is distinct from "no cart yet", which reads report as
    /// `None`.
    pub fn resolve(
        user: Option<UserUuid>,
        session: Option<SessionUuid>,
    ) -> Result<Self, CartsServiceError> {
        match (user, session) {
            (Some(user), _) => Ok(Self::User(user)),
            (None, Some(session)) => Ok(Self::Session(session)),
            (None, None) => Err(CartsServiceError::SessionMissing),
        }
    }
}
