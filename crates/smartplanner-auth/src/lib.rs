pub mod google;
pub mod oauth;
pub mod storage;

pub use google::{GoogleOAuth2Provider, GoogleUserInfo};
pub use oauth::{AuthorizationRequest, OAuth2Config, OAuth2Provider};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenSet, TokenStore, GOOGLE_TOKEN_KEY};
