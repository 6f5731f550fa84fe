use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::user::UserAccount;

/// Credentials for `/auth/login`.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }

    /// Request body. The password is only exposed here.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserAccount,
    #[serde(alias = "accessToken")]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_accepts_access_token() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "user": {
                "id": "u-1",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "role": "admin",
                "createdAt": "2024-01-01T00:00:00Z"
            },
            "accessToken": "abc.def.ghi"
        }))
        .unwrap();
        assert_eq!(resp.token, "abc.def.ghi");
    }

    #[test]
    fn test_request_debug_hides_password() {
        let req = LoginRequest::new("ada@example.com", SecretString::from("hunter22"));
        assert!(!format!("{:?}", req).contains("hunter22"));
        assert_eq!(req.to_body()["password"], "hunter22");
    }
}
