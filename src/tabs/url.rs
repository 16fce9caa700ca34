//! URL helpers: host extraction and the system-page policy

use ::url::Url;

/// Group label for tabs whose URL has no hostname
pub const UNKNOWN_HOST: &str = "Unknown";

/// Hostname of `url`, or `None` when it cannot be parsed or has no host
/// (`about:blank`, `data:` URLs, empty strings).
pub fn host_component(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_owned)
}

pub fn display_host(url: &str) -> String {
    host_component(url).unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

/// Pages whose scheme forbids script injection. Scanning them is refused by
/// the browser, so they must be filtered out before any scan is attempted.
pub fn is_system_url(url: &str, prefixes: &[String]) -> bool {
    let url = url.trim_start();
    prefixes.iter().any(|prefix| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
