use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth,
    gateway::error::{GatewayError, GatewayResult},
};

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub user_id: Uuid,
    pub email: String,
}

/// Turns a bearer token into a stable user id. Credentials never touch this service.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + std::fmt::Debug {
    async fn verify(&self, token: &str) -> GatewayResult<VerifiedIdentity>;
}

#[derive(Debug, Clone)]
pub struct JwtIdentityVerifier {
    secret: String,
    audience: Option<String>,
}

impl JwtIdentityVerifier {
    pub fn new<S: Into<String>>(secret: S, audience: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            audience,
        }
    }

    pub fn from_config(config: &crate::config::Identity) -> Self {
        Self::new(config.jwt_secret(), config.audience().map(String::from))
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> GatewayResult<VerifiedIdentity> {
        let data = auth::process_token(token, &self.secret, self.audience.as_deref())?;
        let user_id = data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| GatewayError::InvalidSubject(data.claims.sub.clone()))?;

        Ok(VerifiedIdentity {
            user_id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::IdentityClaims;

    fn token(sub: &str) -> String {
        let claims = IdentityClaims {
            sub: sub.to_string(),
            email: String::from("learner@lectern.dev"),
            exp: (chrono::Utc::now() + chrono::Duration::minutes(5)).timestamp(),
            aud: Some(String::from("authenticated")),
        };
        auth::generate_token(claims, "secret").unwrap()
    }

    #[tokio::test]
    async fn verify_valid_token_test() {
        let verifier = JwtIdentityVerifier::new("secret", Some(String::from("authenticated")));
        let id = Uuid::new_v4();

        let identity = verifier.verify(&token(&id.to_string())).await.unwrap();
        assert_eq!(identity.user_id, id);
        assert_eq!(identity.email, "learner@lectern.dev");
    }

    #[tokio::test]
    async fn verify_rejects_non_uuid_subject_test() {
        let verifier = JwtIdentityVerifier::new("secret", None);
        let err = verifier.verify(&token("service-role")).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(matches!(err, GatewayError::InvalidSubject(_)));
    }

    #[tokio::test]
    async fn verify_rejects_garbage_test() {
        let verifier = JwtIdentityVerifier::new("secret", None);
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
