//! Shared HTTP response check for the token endpoint.

use crate::error::AuthError;

/// Return the response unchanged on success, otherwise [`AuthError::Api`]
/// carrying the status code and response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    if !resp.status().is_success() {
        return Err(AuthError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
