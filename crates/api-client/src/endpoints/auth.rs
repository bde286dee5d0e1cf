//! Sign-in and registration endpoints

use crate::client::EcoRouteClient;
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Authentication API interface
#[derive(Clone)]
pub struct AuthApi {
    client: EcoRouteClient,
}

impl AuthApi {
    /// Create a new auth API interface
    pub(crate) fn new(client: EcoRouteClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token and profile
    ///
    /// The backend identifies users by email, sent as `username`.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            username: email,
            password,
        };
        let response: LoginResponse = self.client.post("token/", &body, None).await?;

        if response.access.is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response did not include an access token".to_string(),
            ));
        }

        info!(role = %response.role, "Login succeeded");
        Ok(response)
    }

    /// Create a new citizen account
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        if request.password != request.password2 {
            return Err(ApiError::api_response(400, "Password: Passwords do not match."));
        }
        self.client.post("register/", request, None).await
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    #[serde(default)]
    pub access: String,
    /// Refresh token
    #[serde(default)]
    pub refresh: Option<String>,
    /// Account role (e.g. `ciudadano`, `conductor`)
    #[serde(rename = "rol")]
    pub role: String,
    /// Account email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(rename = "nombreCompleto", default)]
    pub full_name: Option<String>,
    /// Phone number
    #[serde(rename = "telf", default)]
    pub phone: Option<String>,
    /// Street address
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    /// City sector
    #[serde(default)]
    pub sector: Option<String>,
    /// Reward points balance
    #[serde(rename = "puntos", default)]
    pub points: Option<u64>,
    /// Completed pickups
    #[serde(rename = "recolecciones", default)]
    pub pickups: Option<u64>,
}

/// Account creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password2: String,
    #[serde(rename = "telf")]
    pub phone: String,
    #[serde(rename = "direccion")]
    pub address: String,
    pub sector: String,
}

/// Successful registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_login_response_deserialize() {
        let json = r#"{
            "access": "eyJhbGciOi",
            "refresh": "eyJyZWZyZXNo",
            "rol": "ciudadano",
            "email": "ana@example.org",
            "nombreCompleto": "Ana Torres",
            "telf": null,
            "direccion": "Jr. Dos de Mayo 123",
            "sector": "Centro",
            "puntos": null,
            "recolecciones": 7
        }"#;

        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access, "eyJhbGciOi");
        assert_eq!(response.role, "ciudadano");
        assert_eq!(response.full_name.as_deref(), Some("Ana Torres"));
        assert_eq!(response.phone, None);
        assert_eq!(response.points, None);
        assert_eq!(response.pickups, Some(7));
    }

    #[test]
    fn test_register_request_wire_names() {
        let request = RegisterRequest {
            username: "ana".into(),
            phone: "+51987654321".into(),
            address: "Jr. Huallayco 45".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["telf"], "+51987654321");
        assert_eq!(value["direccion"], "Jr. Huallayco 45");
        assert!(value.get("phone").is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords_locally() {
        let client = EcoRouteClient::with_config(ClientConfig::development()).unwrap();
        let request = RegisterRequest {
            password: "a".into(),
            password2: "b".into(),
            ..Default::default()
        };
        let err = client.auth().register(&request).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
