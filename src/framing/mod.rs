//! Command framing: console line → wire payload.
//!
//! Without a secret the trimmed line goes out verbatim. With a secret the
//! line is split on `,`, canonically encoded as a JSON array, and an
//! `"hmac:<tag>"` element carrying the HMAC-SHA256 of that encoding is
//! appended as the last array element.

pub mod canonical;
pub mod framer;

pub use canonical::to_canonical_json;
pub use framer::{Framer, SharedSecret, TAG_PREFIX, WireMessage, authentication_tag, frame, verify};
