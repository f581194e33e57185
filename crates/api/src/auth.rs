//! Caller identity taken from the headers set by the upstream auth gateway.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use common::{Role, UserId};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller. The headers are trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required".to_string()))
        }
    }

    /// Customers may only act on their own account.
    pub fn require_self_or_admin(&self, user_id: UserId) -> Result<(), ApiError> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "not allowed to act on another user".to_string(),
            ))
        }
    }

    /// Owner filter for lookups: `None` for admins, the caller otherwise.
    pub fn owner_scope(&self) -> Option<UserId> {
        (!self.is_admin()).then_some(self.user_id)
    }

    fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        let user_id = header(parts, USER_ID_HEADER)?
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| ApiError::Unauthorized(format!("invalid {USER_ID_HEADER} header")))?;
        let role = header(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|_| ApiError::Unauthorized(format!("invalid {USER_ROLE_HEADER} header")))?;
        Ok(Self { user_id, role })
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))?;
    value
        .to_str()
        .map(str::trim)
        .map_err(|_| ApiError::Unauthorized(format!("invalid {name} header")))
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_parts(parts)
    }
}

/// Anonymous when no user id header is present; malformed headers still reject.
impl<S: Send + Sync> OptionalFromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if parts.headers.contains_key(USER_ID_HEADER) {
            Identity::from_parts(parts).map(Some)
        } else {
            Ok(None)
        }
    }
}
