//! Request context, e.g. user id, its role, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: uuid::Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: uuid::Uuid::max(), // admin ID
        }
    }

    /// Stand-in actor for public endpoints. Owns nothing and is not enrolled anywhere.
    pub fn anonymous() -> Self {
        Self {
            user_role: UserRole::Student,
            user_id: uuid::Uuid::nil(),
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }

    /// Instructors and admins may author courses.
    pub fn can_author(&self) -> bool {
        matches!(self.user_role, UserRole::Instructor | UserRole::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserRole {
    Admin,
    Instructor,
    Student,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "instructor" => Self::Instructor,
            _ => Self::Student,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Instructor => write!(f, "instructor"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }

    pub fn user_or_anonymous(&self) -> AuthenticatedUser {
        self.maybe_user
            .clone()
            .unwrap_or_else(AuthenticatedUser::anonymous)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_roundtrip_test() {
        for role in [UserRole::Admin, UserRole::Instructor, UserRole::Student] {
            assert_eq!(UserRole::from(role.to_string().as_str()), role);
        }
        assert_eq!(UserRole::from("something else"), UserRole::Student);
    }

    #[test]
    fn can_author_test() {
        let id = uuid::Uuid::new_v4();
        assert!(AuthenticatedUser::new(id, UserRole::Instructor).can_author());
        assert!(AuthenticatedUser::admin().can_author());
        assert!(!AuthenticatedUser::new(id, UserRole::Student).can_author());
    }

    #[test]
    fn missing_user_is_auth_required_test() {
        let ctx = RequestContext::new(None);
        let err = ctx.user().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
