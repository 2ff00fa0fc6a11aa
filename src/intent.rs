//! Inform intent payloads understood by the conversational backend.
//!
//! The backend accepts a slash command followed by a single-key object, e.g.
//! `/inform{"certificate_type": "Passport"}`. The value is embedded raw: no
//! escaping is applied, so a name containing `"` produces a payload the backend
//! cannot parse. Callers that need a well-formed payload must reject such names
//! themselves.

pub const INFORM_COMMAND: &str = "/inform";
pub const CERTIFICATE_TYPE_SLOT: &str = "certificate_type";

/// Encode an inform notification asserting `certificate_type = name`.
pub fn encode_inform(name: &str) -> String {
    format!("{INFORM_COMMAND}{{\"{CERTIFICATE_TYPE_SLOT}\": \"{name}\"}}")
}

/// Recover the certificate name from a notification produced by [`encode_inform`].
///
/// Returns `None` for anything that is not an inform notification. Because the
/// value is never escaped, everything between the opening quote and the final
/// `"}` is taken verbatim.
pub fn parse_inform(text: &str) -> Option<&str> {
    text.strip_prefix(INFORM_COMMAND)?
        .strip_prefix("{\"")?
        .strip_prefix(CERTIFICATE_TYPE_SLOT)?
        .strip_prefix("\": \"")?
        .strip_suffix("\"}")
}
