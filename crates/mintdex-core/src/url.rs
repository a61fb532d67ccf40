//! Mint URL normalization and derivation helpers.
//!
//! Mint URLs arrive in many cosmetic variations: with or without a scheme,
//! with or without a trailing slash, mixed case, `www.` prefixes. All
//! comparison and aggregation in the engine happens on the normalized form;
//! the legacy relay filter additionally needs the expanded variant list so
//! older events tagged with any spelling are still found.

/// Normalize a mint URL for comparison and aggregation.
///
/// Lowercases, strips an `http://`/`https://` scheme, and removes trailing
/// slashes. Port numbers and paths are preserved.
///
/// # Examples
///
/// ```
/// use mintdex_core::url::normalize_mint_url;
///
/// assert_eq!(normalize_mint_url("https://Mint.Example.COM/"), "mint.example.com");
/// assert_eq!(normalize_mint_url("mint.example.com/api/"), "mint.example.com/api");
/// ```
pub fn normalize_mint_url(url: &str) -> String {
    let mut s = url.trim().to_lowercase();
    if let Some(rest) = s.strip_prefix("https://") {
        s = rest.to_string();
    } else if let Some(rest) = s.strip_prefix("http://") {
        s = rest.to_string();
    }
    while s.ends_with('/') {
        s.pop();
    }
    s
}

/// Extract the domain component of a mint URL: the text before the first
/// `/` of the normalized form.
pub fn mint_domain(url: &str) -> String {
    let normalized = normalize_mint_url(url);
    normalized
        .split('/')
        .next()
        .unwrap_or(normalized.as_str())
        .to_string()
}

/// Strip a leading `www.` from a domain.
pub fn strip_www(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}

/// Derive a human-readable mint name from its URL.
///
/// Takes the first label of the domain; when that label is just `mint`
/// (as in `mint.example.com`) the next label is used instead. The result
/// is capitalized.
pub fn mint_display_name(url: &str) -> String {
    let domain = mint_domain(url);
    let mut parts = domain.split('.');
    let mut name = parts.next().unwrap_or(&domain).to_string();
    if name == "mint"
        && let Some(next) = parts.next()
    {
        name = next.to_string();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => name,
    }
}

/// Whether a mint URL points at a Tor hidden service.
///
/// Tor-only mints cannot be reached over clearnet HTTP, so the metadata
/// fetch is skipped for them and matching degrades to the legacy URL path.
pub fn is_onion_host(url: &str) -> bool {
    let domain = mint_domain(url);
    let host = domain.split(':').next().unwrap_or(&domain);
    host.ends_with(".onion")
}

/// Expand a mint URL into the spellings older review events may carry in
/// their `u` tag.
///
/// Returns, in order: the URL as given, without a trailing slash, with a
/// trailing slash, without a scheme, and with `https://`/`http://`
/// prefixes forced onto the schemeless form.
pub fn legacy_url_variants(url: &str) -> Vec<String> {
    let exact = url.to_string();
    let no_slash = url.trim_end_matches('/').to_string();
    let with_slash = format!("{no_slash}/");
    let schemeless = no_slash
        .strip_prefix("https://")
        .or_else(|| no_slash.strip_prefix("http://"))
        .unwrap_or(&no_slash)
        .to_string();
    let https = format!("https://{schemeless}");
    let http = format!("http://{schemeless}");

    let mut seen = std::collections::HashSet::new();
    [exact, no_slash, with_slash, schemeless, https, http]
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
