use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD},
};
use hmac::{Hmac, Mac};
use serde::{Serialize, de::DeserializeOwned};
use sha2::Sha256;

use crate::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed first segment of every token.
#[derive(Serialize)]
struct TokenHeader {
    alg: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

const HEADER: TokenHeader = TokenHeader {
    alg: "HS256",
    kind: "JWT",
};

/// Sign `payload` into a `header.payload.signature` token.
///
/// Header and payload are standard base64 JSON; the signature is
/// HMAC-SHA256 over `header.payload`, URL-safe base64 without padding.
pub fn sign_token<T: Serialize>(payload: &T, secret: &str) -> Result<String, CryptoError> {
    let header = BASE64.encode(serde_json::to_vec(&HEADER)?);
    let body = BASE64.encode(serde_json::to_vec(payload)?);
    let signing_input = format!("{}.{}", header, body);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

/// Verify `token` against `secret` and decode its payload.
///
/// Returns `None` for any failure: wrong segment count, undecodable
/// signature or payload, signature mismatch, or a payload that does not
/// deserialize into `T`. Never panics on untrusted input.
pub fn verify_token<T: DeserializeOwned>(token: &str, secret: &str) -> Option<T> {
    let mut segments = token.split('.');
    let (header, body, signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let signature = BASE64.decode(normalize_signature(signature)).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(body.as_bytes());
    // verify_slice compares in constant time
    mac.verify_slice(&signature).ok()?;

    let payload = BASE64.decode(body).ok()?;
    serde_json::from_slice(&payload).ok()
}

/// Map the URL-safe alphabet back to standard base64 and restore padding.
fn normalize_signature(signature: &str) -> String {
    let mut normalized: String = signature
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Claims {
        id: String,
        email: String,
    }

    fn claims() -> Claims {
        Claims {
            id: "0b7d3c1e-user".into(),
            email: "a@x.com".into(),
        }
    }

    #[test]
    fn sign_then_verify_returns_payload() {
        let token = sign_token(&claims(), "s3cret").unwrap();
        let decoded: Claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(decoded, claims());
    }

    #[test]
    fn token_has_three_segments_and_url_safe_signature() {
        let token = sign_token(&claims(), "s3cret").unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header = BASE64.decode(segments[0]).unwrap();
        assert_eq!(header, br#"{"alg":"HS256","type":"JWT"}"#);

        assert!(!segments[2].contains(['=', '+', '/']));
        assert_eq!(URL_SAFE_NO_PAD.decode(segments[2]).unwrap().len(), 32);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = sign_token(&claims(), "s3cret").unwrap();
        assert_eq!(verify_token::<Claims>(&token, "other"), None);
    }

    #[test]
    fn tampered_payload_fails() {
        let token = sign_token(&claims(), "s3cret").unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        let forged_body = BASE64.encode(br#"{"id":"admin","email":"a@x.com"}"#);
        let forged = format!("{}.{}.{}", segments[0], forged_body, segments[2]);
        assert_eq!(verify_token::<Claims>(&forged, "s3cret"), None);
    }

    #[test]
    fn standard_alphabet_signature_is_accepted() {
        let token = sign_token(&claims(), "s3cret").unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        let raw = URL_SAFE_NO_PAD.decode(segments[2]).unwrap();
        let padded = format!("{}.{}.{}", segments[0], segments[1], BASE64.encode(raw));
        assert_eq!(verify_token::<Claims>(&padded, "s3cret"), Some(claims()));
    }

    #[test]
    fn garbage_never_panics() {
        for input in [
            "",
            "no-dots-here",
            "a.b",
            "a.b.c.d",
            "!!!.@@@.###",
            "..",
            "eyJhbGciOiJIUzI1NiJ9.%%%.abc",
        ] {
            assert_eq!(verify_token::<Claims>(input, "s3cret"), None, "input: {input:?}");
        }
    }

    #[test]
    fn payload_of_wrong_shape_is_rejected() {
        let token = sign_token(&serde_json::json!({ "unrelated": 1 }), "s3cret").unwrap();
        assert_eq!(verify_token::<Claims>(&token, "s3cret"), None);
    }
}
