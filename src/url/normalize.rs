use crate::url::domain::registrable_domain_of;
use crate::UrlError;
use url::Url;

/// Prefixes `http://` to a seed that carries no HTTP(S) scheme
///
/// # Examples
///
/// ```
/// use site_archiver::url::requestable_seed;
///
/// assert_eq!(requestable_seed("example.com"), "http://example.com");
/// assert_eq!(requestable_seed("https://example.com"), "https://example.com");
/// ```
pub fn requestable_seed(seed: &str) -> String {
    let seed = seed.trim();
    let lower = seed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        seed.to_string()
    } else {
        format!("http://{}", seed)
    }
}

/// Parses a seed into an absolute URL, prefixing `http://` when needed
pub fn normalize_seed(seed: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(&requestable_seed(seed)).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }
    url.set_fragment(None);
    Ok(url)
}

/// Normalizes a discovered link against the page it was found on
///
/// # Normalization Steps
///
/// 1. Reject empty, whitespace-only, bare `#` and bare `?` hrefs
/// 2. Reject fragment-only hrefs (`#section`)
/// 3. Resolve relative hrefs against the page URL
/// 4. Strip the fragment
/// 5. Reject anything that is not `http` or `https`
///
/// # Examples
///
/// ```
/// use site_archiver::url::normalize_link;
/// use url::Url;
///
/// let page = Url::parse("https://a.example/dir/page.html").unwrap();
/// let url = normalize_link("sub/x.html#frag", &page).unwrap();
/// assert_eq!(url.as_str(), "https://a.example/dir/sub/x.html");
/// ```
pub fn normalize_link(href: &str, page_url: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() || href == "#" || href == "?" {
        return Err(UrlError::Empty);
    }

    if href.starts_with('#') {
        return Err(UrlError::FragmentOnly(href.to_string()));
    }

    let mut url = page_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    url.set_fragment(None);

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Link normalization bound to one crawl's external-link policy
#[derive(Debug, Clone)]
pub struct LinkFilter {
    /// Registrable domain of the seed
    base_domain: String,
    exclude_external: bool,
}

impl LinkFilter {
    /// Creates a filter for a crawl whose seed has the given registrable domain
    pub fn new(base_domain: impl Into<String>, exclude_external: bool) -> Self {
        Self {
            base_domain: base_domain.into(),
            exclude_external,
        }
    }

    /// Returns true if the URL's registrable domain is the seed's
    pub fn is_same_site(&self, url: &Url) -> bool {
        registrable_domain_of(url).as_deref() == Some(self.base_domain.as_str())
    }

    /// Normalizes a link and applies the external-link policy
    pub fn normalize(&self, href: &str, page_url: &Url) -> Result<Url, UrlError> {
        let url = normalize_link(href, page_url)?;

        if self.exclude_external && !self.is_same_site(&url) {
            return Err(UrlError::External {
                url: url.to_string(),
                base: self.base_domain.clone(),
            });
        }

        Ok(url)
    }
}
