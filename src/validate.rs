use url::{Host, Url};

use crate::error::{AppError, Result};

pub const MISSING_INPUT_MESSAGE: &str = "Please provide both the API key and a valid URL.";
pub const INVALID_URL_MESSAGE: &str = "Invalid URL. Please enter a proper YouTube or website link.";

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Checks the raw form inputs and returns the parsed URL.
///
/// Only emptiness and URL syntax are checked; neither reachability nor the
/// shape of the key.
pub fn validate_inputs(api_key: &str, url: &str) -> Result<Url> {
    if api_key.trim().is_empty() || url.trim().is_empty() {
        return Err(AppError::InvalidInput(MISSING_INPUT_MESSAGE.to_string()));
    }
    parse_url(url).ok_or_else(|| AppError::InvalidInput(INVALID_URL_MESSAGE.to_string()))
}

pub fn is_valid_url(candidate: &str) -> bool {
    parse_url(candidate).is_some()
}

fn parse_url(candidate: &str) -> Option<Url> {
    let candidate = candidate.trim();
    if candidate.chars().any(char::is_whitespace) {
        return None;
    }

    let url = Url::parse(candidate).ok()?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return None;
    }

    match url.host()? {
        Host::Domain(domain) if !is_valid_domain(domain) => None,
        _ => Some(url),
    }
}

fn is_valid_domain(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld = labels[labels.len() - 1];
    let tld_ok = tld.len() >= 2
        && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"));

    labels_ok && tld_ok
}
