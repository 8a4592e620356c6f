mod jwt;
pub use jwt::{IdentityClaims, generate_token, process_token};
mod signature;
pub use signature::{sign_payment, verify_payment_signature};
mod error;
pub use error::{CryptError, CryptResult};
