use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by access tokens of the hosted identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: IdentityClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
    audience: Option<&str>,
) -> jsonwebtoken::errors::Result<TokenData<IdentityClaims>> {
    let mut validation = Validation::default();
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<IdentityClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    fn claims(aud: Option<&str>) -> IdentityClaims {
        IdentityClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: String::from("student@lectern.dev"),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
            aud: aud.map(String::from),
        }
    }

    #[test]
    fn token_roundtrip_test() {
        let original = claims(Some("authenticated"));
        let token = generate_token(original.clone(), "secret").unwrap();
        let data = process_token(&token, "secret", Some("authenticated")).unwrap();
        assert_eq!(data.claims.sub, original.sub);
        assert_eq!(data.claims.email, original.email);
    }

    #[test]
    fn token_wrong_secret_test() {
        let token = generate_token(claims(None), "secret").unwrap();
        assert!(process_token(&token, "other", None).is_err());
    }

    #[test]
    fn token_wrong_audience_test() {
        let token = generate_token(claims(Some("anon")), "secret").unwrap();
        assert!(process_token(&token, "secret", Some("authenticated")).is_err());
    }

    #[test]
    fn token_expired_test() {
        let mut expired = claims(None);
        expired.exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = generate_token(expired, "secret").unwrap();
        assert!(process_token(&token, "secret", None).is_err());
    }
}
