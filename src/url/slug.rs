//! Filesystem-safe names derived from page URLs

use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

/// Name used when a URL's path reduces to nothing
pub const INDEX_SLUG: &str = "index";

/// Derives a filename stem from a URL's path
///
/// Only the path takes part: scheme, host, query and fragment are ignored.
/// The path is lowercased, its leading slash dropped, remaining slashes turned
/// into hyphens, a trailing `.html` removed, anything that is not an ASCII
/// letter, digit or hyphen stripped, and hyphen runs collapsed and trimmed.
/// An empty result becomes `index`.
///
/// Missing or unparsable URLs get a random name instead, so two bad URLs in
/// one run do not overwrite each other's files.
///
/// # Examples
///
/// ```
/// use sitemap_scribe::url::slugify;
///
/// assert_eq!(slugify("https://example.com/a/B/Page.html"), "a-b-page");
/// assert_eq!(slugify("https://example.com/"), "index");
/// ```
pub fn slugify(url: &str) -> String {
    if url.trim().is_empty() {
        tracing::warn!("slugify received an empty URL, using a random name");
        return random_name("invalid-url");
    }

    match Url::parse(url) {
        Ok(parsed) => slugify_path(parsed.path()),
        Err(e) => {
            tracing::warn!("Could not parse URL for slugify: {} ({}), using a random name", url, e);
            random_name("malformed-url")
        }
    }
}

/// Applies the slug rules to a URL path
fn slugify_path(path: &str) -> String {
    let lowered = path.to_lowercase();
    let trimmed = lowered.strip_prefix('/').unwrap_or(&lowered);
    let hyphenated = trimmed.replace('/', "-");
    let stem = hyphenated.strip_suffix(".html").unwrap_or(&hyphenated);

    let mut slug = String::with_capacity(stem.len());
    for c in stem.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-') {
            continue;
        }
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        INDEX_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

fn random_name(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{prefix}-{suffix}")
}
