use smartplanner_auth::OAuth2Provider;
use smartplanner_core::{AppError, AuthError, Config};

use super::AppContext;

pub async fn login() -> Result<(), AppError> {
    let ctx = AppContext::load()?;
    let provider = ctx.google_provider()?;

    let token = provider
        .authenticate(ctx.tokens.as_ref())
        .await
        .map_err(|e| {
            if e.to_string().contains("already in use") {
                AuthError::PortInUse(ctx.config.google.redirect_port)
            } else {
                AuthError::OAuthFailed(format!("{:#}", e))
            }
        })?;

    match provider.get_user_info(&token.access_token).await {
        Ok(user) => println!(
            "Signed in as {} <{}>",
            user.name.as_deref().unwrap_or("Google user"),
            user.email
        ),
        Err(e) => {
            tracing::warn!("Failed to fetch user profile: {:#}", e);
            println!("Signed in to Google Calendar.");
        }
    }
    Ok(())
}

pub fn logout() -> Result<(), AppError> {
    let ctx = AppContext::load()?;
    ctx.tokens
        .clear()
        .map_err(|e| AuthError::StorageError(e.to_string()))?;
    println!("Signed out.");
    Ok(())
}

pub async fn status() -> Result<(), AppError> {
    let ctx = AppContext::load()?;
    let tz = ctx.timezone();

    match ctx.tokens.load() {
        None => println!("Not signed in. Run `smartplanner login`."),
        Some(token) if token.is_expired() => {
            println!("Your session has expired. Please sign in again.")
        }
        Some(token) => {
            match token.expires_at_utc() {
                Some(at) => println!(
                    "Signed in; token valid until {}",
                    at.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z")
                ),
                None => println!("Signed in."),
            }

            if let Ok(provider) = ctx.google_provider() {
                match provider.get_user_info(&token.access_token).await {
                    Ok(user) => {
                        if let Some(name) = &user.name {
                            println!("Name:  {}", name);
                        }
                        println!("Email: {}", user.email);
                    }
                    Err(e) => tracing::warn!("Failed to fetch user profile: {:#}", e),
                }
            }
        }
    }

    if let Ok(path) = Config::config_path() {
        println!("Config:   {}", path.display());
    }
    println!("Timezone: {}", tz.name());
    println!("Calendar: {}", ctx.config.google.calendar_id);
    println!("Model:    {}", ctx.config.gemini.model);

    let validation = ctx.config.validate();
    for warning in &validation.warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}
