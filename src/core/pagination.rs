use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Version tag for the token payload; bump on incompatible shape changes.
const TOKEN_VERSION: u8 = 1;

/// Continuation cursor pointing at the last item of a returned page.
///
/// Tokens are reversible, unsigned and unencrypted: they are not a security
/// boundary. Callers must re-validate that the referenced document still
/// exists and belongs to the requesting user before continuing a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    pub v: u8,
    pub id: String,
}

impl PageToken {
    pub fn new(id: impl Into<String>) -> Self {
        PageToken {
            v: TOKEN_VERSION,
            id: id.into(),
        }
    }

    /// Serializes to an opaque URL-safe string.
    pub fn encode(&self) -> String {
        // PageToken serialization cannot fail: two plain fields.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Inverse of [`encode`](Self::encode). Fails closed: malformed base64,
    /// malformed JSON, a non-object payload, an unknown version, or a missing
    /// id all yield `None`, never a panic or error.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;
        let parsed: PageToken = serde_json::from_slice(&bytes).ok()?;
        if parsed.v != TOKEN_VERSION || parsed.id.is_empty() {
            return None;
        }
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let token = PageToken::new("tx_123");
        let decoded = PageToken::decode(&token.encode()).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn decode_fails_closed_on_garbage() {
        assert_eq!(PageToken::decode("not-a-valid-token"), None);
        assert_eq!(PageToken::decode(""), None);
        // Valid base64 of invalid JSON.
        assert_eq!(PageToken::decode(&URL_SAFE_NO_PAD.encode(b"hello")), None);
        // Valid JSON but not an object of the right shape.
        assert_eq!(PageToken::decode(&URL_SAFE_NO_PAD.encode(b"[1,2]")), None);
        assert_eq!(PageToken::decode(&URL_SAFE_NO_PAD.encode(b"42")), None);
    }

    #[test]
    fn decode_rejects_unknown_version_and_empty_id() {
        let v2 = URL_SAFE_NO_PAD.encode(br#"{"v":2,"id":"tx_1"}"#);
        assert_eq!(PageToken::decode(&v2), None);
        let empty = URL_SAFE_NO_PAD.encode(br#"{"v":1,"id":""}"#);
        assert_eq!(PageToken::decode(&empty), None);
    }
}
