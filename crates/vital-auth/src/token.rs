use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Token pair returned by the vendor token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub token: String,
    pub refresh_token: String,
}

impl SessionToken {
    /// Best-effort expiry of the access token.
    ///
    /// Returns `None` for opaque tokens or JWTs without a readable `exp` claim.
    /// The signature is NOT verified.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        decode_expiry(&self.token).ok()
    }

    /// Reject a token whose `exp` claim is already in the past.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` if the token decodes and is expired.
    pub fn ensure_fresh(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        match self.expires_at() {
            Some(expires_at) if expires_at <= now => Err(AuthError::TokenExpired(expires_at)),
            _ => Ok(()),
        }
    }
}

/// Decode a JWT `exp` claim without validating the signature.
///
/// # Errors
///
/// Returns `AuthError::Other` if the JWT format is invalid or the `exp` claim
/// is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Other("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::Other(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::Other(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Other("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0).ok_or_else(|| AuthError::Other("invalid exp timestamp".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with(payload: &str) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            engine.encode(r#"{"alg":"HS256"}"#),
            engine.encode(payload),
            engine.encode("sig")
        )
    }

    fn token(jwt: String) -> SessionToken {
        SessionToken {
            token: jwt,
            refresh_token: "refresh".into(),
        }
    }

    #[test]
    fn deserializes_camel_case_body() {
        let parsed: SessionToken =
            serde_json::from_str(r#"{"token":"t","refreshToken":"r"}"#).unwrap();
        assert_eq!(parsed.token, "t");
        assert_eq!(parsed.refresh_token, "r");
    }

    #[test]
    fn future_token_is_fresh() {
        let exp = Utc::now().timestamp() + 600;
        let t = token(jwt_with(&format!(r#"{{"exp":{exp}}}"#)));
        assert_eq!(t.expires_at().unwrap().timestamp(), exp);
        assert!(t.ensure_fresh(Utc::now()).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let exp = Utc::now().timestamp() - 10;
        let t = token(jwt_with(&format!(r#"{{"exp":{exp}}}"#)));
        assert!(matches!(
            t.ensure_fresh(Utc::now()),
            Err(AuthError::TokenExpired(_))
        ));
    }

    #[test]
    fn opaque_token_is_accepted() {
        let t = token("opaque-token-value".into());
        assert!(t.expires_at().is_none());
        assert!(t.ensure_fresh(Utc::now()).is_ok());
    }

    #[test]
    fn missing_exp_claim() {
        let err = decode_expiry(&jwt_with(r#"{"sub":"x"}"#)).unwrap_err();
        assert!(err.to_string().contains("missing exp claim"));
    }
}
