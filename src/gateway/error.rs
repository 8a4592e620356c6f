use thiserror::Error;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("identity token rejected: {0}")]
    TokenRejected(#[from] jsonwebtoken::errors::Error),
    #[error("identity token subject is not a valid id: {0}")]
    InvalidSubject(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("crypt error: {0}")]
    CryptError(#[from] crate::auth::CryptError),
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::TokenRejected(_) | Self::InvalidSubject(_))
    }
}

pub(crate) async fn json_or_upstream<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> GatewayResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.json::<T>().await?)
}
