//! Extractor tying a request to its visitor's cart.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;

/// Session key holding the cart key.
pub const CART_KEY: &str = "cart_key";

/// The cart key of the current session, created on first use.
///
/// The key is a UUID without hyphens and doubles as the name of the cart's
/// snapshot directory.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(cart: CartSession) -> impl IntoResponse {
///     format!("cart {}", cart.key())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CartSession(String);

impl CartSession {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let existing: Option<String> = session
            .get(CART_KEY)
            .await
            .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;
        if let Some(key) = existing {
            return Ok(Self(key));
        }

        let key = Uuid::new_v4().simple().to_string();
        session
            .insert(CART_KEY, &key)
            .await
            .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
        tracing::debug!(cart_key = %key, "New cart session");
        Ok(Self(key))
    }
}
