/// Header set by reverse proxies to report the client-facing scheme.
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Decides whether cookies may be marked `Secure` for this request.
///
/// The connection counts as encrypted when the proxy reports `https` or the
/// request URL itself is an `https://` URL. Marking cookies `Secure` on a
/// plain-HTTP connection would hide them from the browser on the next request.
#[must_use]
pub fn is_secure_connection(forwarded_proto: Option<&str>, request_url: &str) -> bool {
    forwarded_proto.is_some_and(|proto| proto.trim() == "https")
        || request_url.starts_with("https://")
}
