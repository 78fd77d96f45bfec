//! Google OAuth2 provider for Calendar access.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::oauth::{OAuth2Config, OAuth2Provider};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const USERINFO_PROFILE_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.profile";
const USERINFO_EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Signed-in user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
}

pub struct GoogleOAuth2Provider {
    config: OAuth2Config,
    userinfo_url: String,
}

impl GoogleOAuth2Provider {
    pub fn new(client_id: String, client_secret: String, redirect_port: u16) -> Self {
        Self {
            config: OAuth2Config {
                client_id,
                client_secret,
                auth_url: GOOGLE_AUTH_URL.to_string(),
                token_url: GOOGLE_TOKEN_URL.to_string(),
                redirect_port,
                scopes: vec![
                    CALENDAR_SCOPE.to_string(),
                    USERINFO_PROFILE_SCOPE.to_string(),
                    USERINFO_EMAIL_SCOPE.to_string(),
                ],
            },
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    /// Point the userinfo request at another host.
    pub fn with_userinfo_url(mut self, url: &str) -> Self {
        self.userinfo_url = url.to_string();
        self
    }

    /// Get the signed-in user's profile from an access token.
    #[tracing::instrument(skip(self, access_token), level = "info")]
    pub async fn get_user_info(&self, access_token: &str) -> Result<GoogleUserInfo> {
        let client = reqwest::Client::new();

        let response = client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to fetch user info")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("User info request failed: {}", error_text);
        }

        response.json::<GoogleUserInfo>().await.context("Failed to parse user info")
    }
}

impl OAuth2Provider for GoogleOAuth2Provider {
    fn service_id(&self) -> &str {
        "google"
    }

    fn config(&self) -> &OAuth2Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider() -> GoogleOAuth2Provider {
        GoogleOAuth2Provider::new(
            "test_client_id".to_string(),
            "test_client_secret".to_string(),
            8080,
        )
    }

    #[test]
    fn test_google_auth_url_contains_calendar_scope() {
        let request = provider().authorize().unwrap();
        assert!(request.url.starts_with(GOOGLE_AUTH_URL));
        assert!(request.url.contains("scope="));
        assert!(request.url.contains("calendar"));
        assert!(request.url.contains("code_challenge="));
    }

    #[test]
    fn test_google_auth_url_uses_loopback_redirect() {
        let request = provider().authorize().unwrap();
        assert!(request.url.contains(&urlencode("http://localhost:8080/callback")));
    }

    #[test]
    fn test_google_state_is_unique() {
        let first = provider().authorize().unwrap();
        let second = provider().authorize().unwrap();
        assert_ne!(first.csrf_token.secret(), second.csrf_token.secret());
    }

    fn urlencode(s: &str) -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    }

    #[tokio::test]
    async fn test_get_user_info() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1234",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "picture": "https://example.com/ada.png"
            })))
            .mount(&mock_server)
            .await;

        let provider =
            provider().with_userinfo_url(&format!("{}/userinfo", mock_server.uri()));
        let info = provider.get_user_info("test_token").await.unwrap();

        assert_eq!(info.email, "ada@example.com");
        assert_eq!(info.name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_get_user_info_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
            .mount(&mock_server)
            .await;

        let provider =
            provider().with_userinfo_url(&format!("{}/userinfo", mock_server.uri()));
        let err = provider.get_user_info("bad").await.unwrap_err();
        assert!(err.to_string().contains("invalid_token"));
    }
}
