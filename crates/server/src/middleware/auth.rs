//! Authentication extractors.
//!
//! Session issuance lives outside this service; requests arrive with a
//! bearer token that the injected `CurrentAccountProvider` resolves to an
//! immutable [`AccountSnapshot`]. Handlers declare what they need:
//! [`RequireAccount`] for any authenticated caller, [`RequireAdmin`] for
//! admin-only operations.

use axum::{extract::FromRequestParts, http::request::Parts};

use tradecart_core::AccountSnapshot;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires an authenticated account.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAccount(account): RequireAccount) -> impl IntoResponse {
///     format!("Hello, {}!", account.email)
/// }
/// ```
pub struct RequireAccount(pub AccountSnapshot);

/// Extractor that requires an authenticated account with the ADMIN role.
pub struct RequireAdmin(pub AccountSnapshot);

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn resolve_account(parts: &Parts, state: &AppState) -> Result<AccountSnapshot, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

    let account = state
        .accounts()
        .resolve(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;

    // Associate subsequent errors on this request with the account
    set_sentry_user(&account.id, Some(&account.email));

    Ok(account)
}

impl FromRequestParts<AppState> for RequireAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_account(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let account = resolve_account(parts, state).await?;
        if !account.is_admin() {
            return Err(AppError::Forbidden(
                "admin role required".to_owned(),
            ));
        }
        Ok(Self(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cart");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_auth(Some("Bearer tc_abc123"));
        assert_eq!(bearer_token(&parts), Some("tc_abc123"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer "))), None);
    }
}
