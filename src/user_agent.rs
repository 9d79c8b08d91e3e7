//! Default User-Agent string for API requests.

/// Client identifier prefix sent to the API.
const CLIENT_NAME: &str = "conversiontools-rust";

/// Default User-Agent (`conversiontools-rust/<crate version>`).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{CLIENT_NAME}/{version}")
}
