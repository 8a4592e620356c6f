use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProfileUpdateBody {
    /// Printed on certificates issued from now on.
    pub full_name: String,
}
