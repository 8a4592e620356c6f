//! Narrow interfaces to the hosted collaborators: identity provider, blob storage
//! and payment gateway. Services only ever see the traits.

mod error;
pub use error::{GatewayError, GatewayResult};

mod identity;
pub use identity::{IdentityVerifier, JwtIdentityVerifier, VerifiedIdentity};

mod storage;
pub use storage::{HttpObjectStore, ObjectStore, SignedUrl, video_path};

mod payment;
pub use payment::{GatewayPaymentProcessor, PaymentOrder, PaymentProcessor};
