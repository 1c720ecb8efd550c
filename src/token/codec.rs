//! Token encoding and decoding

use super::types::{EncodeOptions, TokenHeader};
use crate::error::{DecodeError, Error, Result};
use crate::types::SigningAlgorithm;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Encode a payload into a token
///
/// The payload must serialize to a JSON object. A `null` payload (e.g. `None`)
/// is rejected as missing.
///
/// # Examples
///
/// ```
/// use list_pagination::token::{decode, encode, EncodeOptions};
/// use serde_json::json;
///
/// let token = encode(&json!({"foo": "bar"}), &EncodeOptions::new()).unwrap();
/// assert!(token.ends_with('.'));
///
/// let payload = decode(&token, None).unwrap();
/// assert_eq!(payload["foo"], "bar");
/// ```
pub fn encode<T: Serialize + ?Sized>(payload: &T, options: &EncodeOptions<'_>) -> Result<String> {
    let mut claims = match serde_json::to_value(payload)
        .map_err(|e| Error::encoding(format!("payload is not serializable: {e}")))?
    {
        Value::Null => return Err(Error::encoding("payload is required")),
        Value::Object(map) => map,
        other => {
            return Err(Error::encoding(format!(
                "payload must be an object, got {}",
                json_type(&other)
            )))
        }
    };

    let issued_at = claims
        .get("iat")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| Utc::now().timestamp());

    if options.include_issued_at {
        claims.insert("iat".to_string(), issued_at.into());
    } else {
        claims.remove("iat");
    }

    if let Some(expires_in) = options.expires_in {
        claims.insert(
            "exp".to_string(),
            issued_at.saturating_add(expires_in.num_seconds()).into(),
        );
    }

    let token = match options.secret {
        Some(secret) => {
            let header = Header::new(options.algorithm.into());
            jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(secret.as_bytes()))
                .map_err(|e| Error::encoding(format!("failed to sign token: {e}")))?
        }
        None => {
            let header = serde_json::to_vec(&TokenHeader::unsigned())?;
            let body = serde_json::to_vec(&claims)?;
            format!(
                "{}.{}.",
                URL_SAFE_NO_PAD.encode(header),
                URL_SAFE_NO_PAD.encode(body)
            )
        }
    };

    tracing::debug!(
        "Encoded token (signed: {}, exp: {:?})",
        options.secret.is_some(),
        claims.get("exp")
    );
    Ok(token)
}

/// Decode and verify a token
///
/// A signed token must be decoded with the secret it was signed with; an
/// unsigned token must be decoded without one. Expiry is checked for both.
pub fn decode(token: &str, secret: Option<&str>) -> Result<Map<String, Value>> {
    if token.is_empty() {
        return Err(DecodeError::MissingToken.into());
    }

    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(DecodeError::malformed("expected three segments").into());
    };

    let header: TokenHeader = decode_segment(header)?;

    let claims = if header.is_unsigned() {
        if !signature.is_empty() {
            return Err(DecodeError::malformed("unsigned token carries a signature").into());
        }
        if secret.is_some() {
            return Err(DecodeError::verification("token is not signed").into());
        }
        decode_segment::<Map<String, Value>>(payload)?
    } else {
        let algorithm = SigningAlgorithm::from_header(&header.alg).ok_or_else(|| {
            DecodeError::malformed(format!("unsupported algorithm '{}'", header.alg))
        })?;
        let secret = secret
            .ok_or_else(|| DecodeError::verification("secret must be provided"))?;
        verify_signed(token, secret, algorithm)?
    };

    check_timestamps(&claims, Utc::now().timestamp())?;
    Ok(claims)
}

/// Verify a signed token's signature and return its claims
fn verify_signed(
    token: &str,
    secret: &str,
    algorithm: SigningAlgorithm,
) -> std::result::Result<Map<String, Value>, DecodeError> {
    let mut validation = Validation::new(algorithm.into());
    // Expiry is checked uniformly for signed and unsigned tokens
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;

    jsonwebtoken::decode::<Map<String, Value>>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => DecodeError::InvalidSignature,
        ErrorKind::ExpiredSignature => DecodeError::Expired,
        _ => DecodeError::malformed(e.to_string()),
    })
}

/// Check `iat`/`exp` claim types and expiry against `now`
fn check_timestamps(
    claims: &Map<String, Value>,
    now: i64,
) -> std::result::Result<(), DecodeError> {
    if let Some(iat) = claims.get("iat") {
        if !iat.is_number() {
            return Err(DecodeError::malformed("iat must be a number"));
        }
    }

    if let Some(exp) = claims.get("exp") {
        let exp = exp
            .as_f64()
            .ok_or_else(|| DecodeError::malformed("exp must be a number"))?;
        if now as f64 >= exp {
            return Err(DecodeError::Expired);
        }
    }

    Ok(())
}

/// Decode one base64url JSON segment
fn decode_segment<T: DeserializeOwned>(segment: &str) -> std::result::Result<T, DecodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| DecodeError::malformed(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| DecodeError::malformed(format!("invalid JSON: {e}")))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a token lifetime such as `90`, `30s`, `5m`, `2h`, `7d`, `1w` or `-1s`
///
/// A bare number is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let split = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, unit) = rest.split_at(split);

    let amount: i64 = digits
        .parse()
        .map_err(|_| Error::config(format!("Invalid duration '{input}'")))?;

    let seconds_per_unit = match unit.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        other => {
            return Err(Error::config(format!(
                "Invalid duration unit '{other}' in '{input}'"
            )))
        }
    };

    let seconds = amount
        .checked_mul(seconds_per_unit)
        .ok_or_else(|| Error::config(format!("Duration '{input}' is too large")))?;

    Duration::try_seconds(if negative { -seconds } else { seconds })
        .ok_or_else(|| Error::config(format!("Duration '{input}' is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_timestamps_boundary() {
        let mut claims = Map::new();
        claims.insert("exp".to_string(), 100.into());

        assert!(check_timestamps(&claims, 99).is_ok());
        assert_eq!(check_timestamps(&claims, 100), Err(DecodeError::Expired));
        assert_eq!(check_timestamps(&claims, 101), Err(DecodeError::Expired));
    }

    #[test]
    fn test_check_timestamps_types() {
        let mut claims = Map::new();
        claims.insert("iat".to_string(), "yesterday".into());
        assert!(matches!(
            check_timestamps(&claims, 0),
            Err(DecodeError::MalformedToken { .. })
        ));
    }
}
