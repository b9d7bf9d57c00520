//! API Response wrapper

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_message(data: T, message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::success(data)
        }
    }
}

/// Public view of a signed-in user.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: uuid::Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub role: &'static str,
}

impl From<&citizen_core::domain::User> for UserView {
    fn from(user: &citizen_core::domain::User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.metadata.full_name.clone(),
            phone: user.metadata.phone.clone(),
            city: user.metadata.city.clone(),
            role: user.role().as_str(),
        }
    }
}
