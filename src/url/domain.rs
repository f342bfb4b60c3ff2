use std::net::IpAddr;
use url::{Host, Url};

/// Computes the registrable ("base") domain of a host name
///
/// The rule is deliberately coarse: the last two dot-separated labels. It does not
/// consult the public suffix list, so `example.co.uk` and `other.co.uk` share the
/// base `co.uk`. Hosts with fewer than two labels (`localhost`) and IP literals
/// are returned whole.
///
/// # Examples
///
/// ```
/// use site_archiver::url::registrable_domain;
///
/// assert_eq!(registrable_domain("blog.example.com"), "example.com");
/// assert_eq!(registrable_domain("localhost"), "localhost");
/// assert_eq!(registrable_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return host;
    }

    labels[labels.len() - 2..].join(".")
}

/// Computes the registrable domain of a URL's host
///
/// Returns None when the URL has no host.
pub fn registrable_domain_of(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => Some(registrable_domain(domain)),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(format!("[{}]", addr)),
    }
}
