//! Canonical JSON encoding shared by signer and verifier.
//!
//! Compact separators (`,` and `:` with no whitespace) and ASCII-only
//! output: every character outside `' '..='~'` that is not already
//! escaped by JSON rules is written as lowercase `\uXXXX` UTF-16 units.
//! Object keys are emitted in the order the value yields them, so callers
//! that sign maps must use an ordered map.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::LinkError;

/// Compact JSON formatter that escapes all non-ASCII text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment.get(start..idx).unwrap_or_default().as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment.get(start..).unwrap_or_default().as_bytes())
    }
}

/// Serializes `value` with the canonical rules.
///
/// # Errors
///
/// Returns [`LinkError::Frame`] if `value` fails to serialize.
pub fn to_canonical_json<T>(value: &T) -> Result<String, LinkError>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::with_capacity(64);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| LinkError::Frame(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn encode<T: Serialize + ?Sized>(value: &T) -> String {
        let Ok(json) = to_canonical_json(value) else {
            panic!("encoding failed");
        };
        json
    }

    #[test]
    fn arrays_are_compact() {
        assert_eq!(encode(&["relay", "0", "on"]), r#"["relay","0","on"]"#);
    }

    #[test]
    fn maps_have_no_whitespace() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        assert_eq!(encode(&map), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn non_ascii_is_escaped_lowercase() {
        assert_eq!(encode(&["température"]), r#"["temp\u00e9rature"]"#);
        assert_eq!(encode(&["\u{7f}"]), r#"["\u007f"]"#);
    }

    #[test]
    fn astral_characters_use_surrogate_pairs() {
        assert_eq!(encode(&["\u{1f525}"]), r#"["\ud83d\udd25"]"#);
    }

    #[test]
    fn json_escapes_are_preserved() {
        assert_eq!(encode(&["a\"b\\c\n"]), r#"["a\"b\\c\n"]"#);
        assert_eq!(encode(&["\u{1}"]), r#"["\u0001"]"#);
    }

    #[test]
    fn output_is_stable_under_reparse() {
        let original = encode(&["", "ü", "x y"]);
        let Ok(parsed) = serde_json::from_str::<Vec<String>>(&original) else {
            panic!("output must parse");
        };
        assert_eq!(encode(&parsed), original);
    }
}
