use std::net::IpAddr;

/// Longest accepted hostname, per the RFC 1035 length cap
const MAX_HOSTNAME_LEN: usize = 253;

/// Check whether a string is usable as a monitored address: an IP literal
/// (v4 or v6) or a plausible hostname.
///
/// Hostnames are matched against a permissive character grammar only; no DNS
/// lookup is attempted, so registration never blocks on a resolver and a
/// currently unresolvable name can still be monitored.
pub fn valid_address(address: &str) -> bool {
    if address.parse::<IpAddr>().is_ok() {
        return true;
    }
    valid_hostname(address)
}

fn valid_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}
