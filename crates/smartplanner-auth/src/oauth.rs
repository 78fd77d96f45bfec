use anyhow::{Context, Result};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use crate::storage::{TokenSet, TokenStore};

/// OAuth2 configuration
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Client ID from OAuth provider
    pub client_id: String,

    /// Client secret from OAuth provider
    pub client_secret: String,

    /// Authorization endpoint URL
    pub auth_url: String,

    /// Token endpoint URL
    pub token_url: String,

    /// Loopback port the redirect lands on
    pub redirect_port: u16,

    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }
}

/// An authorization URL plus the secrets needed to finish the flow.
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_token: CsrfToken,
    pub pkce_verifier: PkceCodeVerifier,
}

/// OAuth2 provider trait
pub trait OAuth2Provider: Send + Sync {
    /// Service identifier (e.g. "google")
    fn service_id(&self) -> &str;

    fn config(&self) -> &OAuth2Config;

    fn client(&self) -> Result<BasicClient> {
        let config = self.config();

        Ok(BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone()).context("Invalid auth URL")?,
            Some(TokenUrl::new(config.token_url.clone()).context("Invalid token URL")?),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri()).context("Invalid redirect URI")?,
        ))
    }

    /// Build the authorization URL to open in the browser
    fn authorize(&self) -> Result<AuthorizationRequest> {
        let client = self.client()?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.config().scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token) = auth_request.set_pkce_challenge(pkce_challenge).url();

        Ok(AuthorizationRequest {
            url: auth_url.to_string(),
            csrf_token,
            pkce_verifier,
        })
    }

    /// Exchange the authorization code for an access token
    async fn exchange_code(&self, code: String, pkce_verifier: PkceCodeVerifier) -> Result<TokenSet> {
        let client = self.client()?;

        let token_result = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .context("Failed to exchange authorization code")?;

        let expires_in = token_result
            .expires_in()
            .map(|d| d.as_secs())
            .unwrap_or(3600);

        let scopes = token_result
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_default();

        Ok(TokenSet::from_expires_in(
            token_result.access_token().secret().clone(),
            expires_in,
            scopes,
        ))
    }

    /// Full flow: browser, loopback callback, code exchange, token stored.
    async fn authenticate(&self, store: &dyn TokenStore) -> Result<TokenSet> {
        let request = self.authorize()?;
        let port = self.config().redirect_port;

        let (code_tx, code_rx) = oneshot::channel::<(String, String)>();
        let code_tx = Arc::new(Mutex::new(Some(code_tx)));

        let routes = warp::get()
            .and(warp::path("callback"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || code_tx.clone()))
            .and_then(
                |params: HashMap<String, String>,
                 tx: Arc<Mutex<Option<oneshot::Sender<(String, String)>>>>| async move {
                    let code = params.get("code").cloned().unwrap_or_default();
                    let state = params.get("state").cloned().unwrap_or_default();

                    if let Some(sender) = tx.lock().await.take() {
                        let _ = sender.send((code, state));
                    }

                    Ok::<_, warp::Rejection>(warp::reply::html(
                        "<html><body><h1>Authorization successful!</h1><p>You can close this window and return to SmartPlanner.</p></body></html>",
                    ))
                },
            );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(([127, 0, 0, 1], port), async move {
                let _ = shutdown_rx.await;
            })
            .with_context(|| format!("Port {} already in use for OAuth callback", port))?;
        tokio::spawn(server);
        tracing::debug!("OAuth callback listening on {}", addr);

        tracing::info!("Opening browser for OAuth2 authorization...");
        if let Err(e) = webbrowser::open(&request.url) {
            tracing::warn!("Failed to open browser: {}", e);
            println!("Open this URL to sign in:\n{}", request.url);
        }

        let received = code_rx.await.context("Failed to receive OAuth callback");
        let _ = shutdown_tx.send(());
        let (code, state) = received?;

        if state != *request.csrf_token.secret() {
            anyhow::bail!("CSRF token mismatch");
        }
        if code.is_empty() {
            anyhow::bail!("Authorization was denied or no code was returned");
        }

        let token = self.exchange_code(code, request.pkce_verifier).await?;
        store.save(&token)?;

        tracing::info!("OAuth2 flow completed for {}", self.service_id());
        Ok(token)
    }
}
