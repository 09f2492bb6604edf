//! Wire payload construction and authentication tags.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::canonical::to_canonical_json;
use crate::error::LinkError;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of the trailing array element that carries the tag.
pub const TAG_PREFIX: &str = "hmac:";

/// Pre-shared key used to sign outbound commands.
///
/// `Debug` output never contains the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wraps a non-empty secret.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, LinkError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(LinkError::Config("shared secret is empty".to_string()));
        }
        Ok(Self(secret))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Exact text transmitted for one command. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage(String);

impl WireMessage {
    /// Returns the payload text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the message, returning the payload text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Frames command lines for one session configuration.
#[derive(Debug, Clone, Default)]
pub struct Framer {
    secret: Option<SharedSecret>,
}

impl Framer {
    /// Creates a framer; `None` disables authentication.
    #[must_use]
    pub fn new(secret: Option<SharedSecret>) -> Self {
        Self { secret }
    }

    /// Returns `true` if commands are signed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.secret.is_some()
    }

    /// Frames one command line. See [`frame`].
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Frame`] if the line cannot be encoded.
    pub fn frame(&self, line: &str) -> Result<WireMessage, LinkError> {
        frame(line, self.secret.as_ref())
    }
}

/// Builds the wire payload for `line`.
///
/// Without a secret the line is returned verbatim. With a secret the line
/// is split on `,`, the token array is canonically encoded, and the final
/// payload is `tokens + ["hmac:<tag>"]` encoded the same way.
///
/// # Errors
///
/// Returns [`LinkError::Frame`] if the tokens cannot be encoded.
pub fn frame(line: &str, secret: Option<&SharedSecret>) -> Result<WireMessage, LinkError> {
    let Some(secret) = secret else {
        return Ok(WireMessage(line.to_string()));
    };

    let mut tokens: Vec<String> = line.split(',').map(str::to_string).collect();
    let canonical = to_canonical_json(&tokens)?;
    let tag = authentication_tag(&canonical, secret)?;

    tokens.push(format!("{TAG_PREFIX}{tag}"));
    Ok(WireMessage(to_canonical_json(&tokens)?))
}

/// Computes the lowercase hex HMAC-SHA256 of `canonical` under `secret`.
///
/// # Errors
///
/// Returns [`LinkError::Frame`] if the MAC cannot be keyed.
pub fn authentication_tag(canonical: &str, secret: &SharedSecret) -> Result<String, LinkError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks an authenticated payload against `secret`.
///
/// Re-encodes every element except the last, recomputes the tag, and
/// compares it in constant time with the trailing `"hmac:<tag>"` element.
/// Returns `Ok(false)` when the tag element is missing or does not match.
///
/// # Errors
///
/// Returns [`LinkError::Frame`] if `payload` is not a JSON array of strings.
pub fn verify(payload: &str, secret: &SharedSecret) -> Result<bool, LinkError> {
    let mut tokens: Vec<String> = serde_json::from_str(payload)?;
    let Some(tag_element) = tokens.pop() else {
        return Ok(false);
    };
    let Some(tag_hex) = tag_element.strip_prefix(TAG_PREFIX) else {
        return Ok(false);
    };
    let Ok(tag) = hex::decode(tag_hex) else {
        return Ok(false);
    };

    let canonical = to_canonical_json(&tokens)?;
    let mut mac = keyed_mac(secret)?;
    mac.update(canonical.as_bytes());
    Ok(mac.verify_slice(&tag).is_ok())
}

fn keyed_mac(secret: &SharedSecret) -> Result<HmacSha256, LinkError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| LinkError::Frame(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SharedSecret {
        let Ok(secret) = SharedSecret::new(s) else {
            panic!("secret must be non-empty");
        };
        secret
    }

    fn frame_ok(line: &str, secret: Option<&SharedSecret>) -> WireMessage {
        let Ok(wire) = frame(line, secret) else {
            panic!("framing failed for {line:?}");
        };
        wire
    }

    #[test]
    fn unauthenticated_line_is_verbatim() {
        assert_eq!(frame_ok("enable", None).as_str(), "enable");
        assert_eq!(frame_ok("target:82.5", None).as_str(), "target:82.5");
    }

    #[test]
    fn authenticated_relay_command() {
        let key = secret("s1");
        let wire = frame_ok("relay:0:on", Some(&key));

        let Ok(tag) = authentication_tag(r#"["relay:0:on"]"#, &key) else {
            panic!("tag failed");
        };
        assert_eq!(wire.as_str(), format!(r#"["relay:0:on","hmac:{tag}"]"#));
    }

    #[test]
    fn comma_separated_tokens_are_split() {
        let key = secret("s1");
        let wire = frame_ok("relay,0,on", Some(&key));

        let Ok(tag) = authentication_tag(r#"["relay","0","on"]"#, &key) else {
            panic!("tag failed");
        };
        assert_eq!(wire.as_str(), format!(r#"["relay","0","on","hmac:{tag}"]"#));
    }

    #[test]
    fn tag_matches_reference_vector() {
        // RFC 4231 test case 2.
        let Ok(key) = SharedSecret::new("Jefe") else {
            panic!("secret");
        };
        let Ok(tag) = authentication_tag("what do ya want for nothing?", &key) else {
            panic!("tag failed");
        };
        assert_eq!(
            tag,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn framing_is_deterministic() {
        let key = secret("s1");
        for line in ["enable", "target:80.0", "a,b,,c", "ünï,cödé"] {
            assert_eq!(frame_ok(line, Some(&key)), frame_ok(line, Some(&key)));
        }
    }

    #[test]
    fn payload_prefix_is_the_signed_array() {
        let key = secret("s1");
        for line in ["enable", "relay,1,pid", ",,", "température,🔥"] {
            let wire = frame_ok(line, Some(&key));
            let tokens: Vec<&str> = line.split(',').collect();
            let Ok(canonical) = to_canonical_json(&tokens) else {
                panic!("encoding failed");
            };
            let prefix = canonical.trim_end_matches(']');
            assert!(wire.as_str().starts_with(prefix), "{wire} vs {canonical}");
        }
    }

    #[test]
    fn tag_is_64_lowercase_hex() {
        let wire = frame_ok("enable", Some(&secret("s1")));
        let Ok(tokens) = serde_json::from_str::<Vec<String>>(wire.as_str()) else {
            panic!("payload must be a JSON array");
        };
        let Some(last) = tokens.last() else {
            panic!("payload must not be empty");
        };
        let Some(tag) = last.strip_prefix(TAG_PREFIX) else {
            panic!("missing tag prefix");
        };
        assert_eq!(tag.len(), 64);
        assert!(tag.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn verify_accepts_own_payloads() {
        let key = secret("s1");
        for line in ["enable", "a,,b", "", "日本,語", "quote\"and\\slash"] {
            let wire = frame_ok(line, Some(&key));
            assert!(matches!(verify(wire.as_str(), &key), Ok(true)), "{wire}");
        }
    }

    #[test]
    fn verify_rejects_wrong_secret_or_tampering() {
        let key = secret("s1");
        let wire = frame_ok("relay,0,on", Some(&key));

        assert!(matches!(verify(wire.as_str(), &secret("s2")), Ok(false)));

        let tampered = wire.as_str().replacen("\"on\"", "\"off\"", 1);
        assert!(matches!(verify(&tampered, &key), Ok(false)));

        assert!(matches!(verify(r#"["relay","0","on"]"#, &key), Ok(false)));
        assert!(matches!(verify("[]", &key), Ok(false)));
        assert!(verify("enable", &key).is_err());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let rendered = format!("{:?}", secret("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn framer_reports_mode() {
        assert!(!Framer::new(None).is_authenticated());
        assert!(Framer::new(Some(secret("s1"))).is_authenticated());
    }
}
