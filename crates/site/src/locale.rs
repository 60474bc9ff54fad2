//! Site locales, locale path prefixes and the language switcher lookup.

use serde::{Deserialize, Serialize};

use crate::content::ContentRepository;

pub const BLOG_PREFIX: &str = "/blog";
pub const GUIDES_PREFIX: &str = "/guides";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Nb,
    En,
}

impl Locale {
    pub fn all() -> [Locale; 2] {
        [Locale::Nb, Locale::En]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Nb => "nb",
            Locale::En => "en",
        }
    }

    /// BCP 47 tag used for `lang` attributes and dictionaries.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::Nb => "nb-NO",
            Locale::En => "en-US",
        }
    }

    /// Case-insensitive; anything else is `None`.
    pub fn parse(value: &str) -> Option<Locale> {
        match value.to_ascii_lowercase().as_str() {
            "nb" => Some(Locale::Nb),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Like [`Locale::parse`], falling back to the default locale.
    pub fn normalize(value: Option<&str>) -> Locale {
        value.and_then(Locale::parse).unwrap_or_default()
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `/{locale}{path}`; the root maps to `/{locale}`.
pub fn prefix_locale(locale: Locale, path: &str) -> String {
    let path = normalize_path(Some(path));
    if path == "/" {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, path)
    }
}

/// Split a leading locale segment off `pathname`. Paths without one belong
/// to the default locale and are returned as is.
pub fn strip_locale_from_path(pathname: &str) -> (Locale, String) {
    let mut segments = pathname.split('/');
    let _leading = segments.next();
    if let Some(locale) = segments.next().and_then(Locale::parse) {
        let rest: Vec<&str> = segments.filter(|segment| !segment.is_empty()).collect();
        return (locale, format!("/{}", rest.join("/")));
    }

    let path = if pathname.is_empty() { "/" } else { pathname };
    (Locale::default(), path.to_string())
}

fn normalize_path(value: Option<&str>) -> String {
    match value {
        None | Some("") => "/".to_string(),
        Some(path) if path.starts_with('/') => path.to_string(),
        Some(path) => format!("/{}", path),
    }
}

/// Segments after `prefix` when `path` is that section, e.g. `/guides/a/b`.
fn section_segments<'a>(path: &'a str, prefix: &str) -> Option<Vec<&'a str>> {
    let rest = path.strip_prefix(prefix)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }
    Some(rest.split('/').filter(|segment| !segment.is_empty()).collect())
}

/// Logs backend failures and treats them as "not found".
fn found<T>(result: Result<Option<T>, crate::content::ContentError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        log::error!("Content lookup failed: {}", e);
        None
    })
}

/// The equivalent of `path` in the `to` locale.
///
/// Blog posts and guides have per-locale slugs, so switching language means
/// looking up the sibling translation. When the post exists but has no
/// translation the section root is returned; when the source slug is
/// unknown, or either locale is unsupported, the path is returned unchanged.
pub async fn resolve_locale_route(
    repo: &dyn ContentRepository,
    from: Option<&str>,
    to: Option<&str>,
    path: Option<&str>,
) -> String {
    let raw_path = normalize_path(path);
    let (Some(from), Some(to)) = (from.and_then(Locale::parse), to.and_then(Locale::parse)) else {
        return raw_path;
    };

    if let Some(segments) = section_segments(&raw_path, BLOG_PREFIX) {
        let Some(slug) = segments.first() else {
            return raw_path;
        };
        let Some(post_id) = found(repo.blog_post_id_by_slug(from, slug).await) else {
            return raw_path;
        };
        return match found(repo.translation_slug(post_id, to).await) {
            Some(target) => format!("{}/{}", BLOG_PREFIX, target),
            None => BLOG_PREFIX.to_string(),
        };
    }

    if let Some(segments) = section_segments(&raw_path, GUIDES_PREFIX) {
        match segments.as_slice() {
            [post_slug] => {
                let Some(lookup) = found(repo.guide_post_by_slug(from, post_slug, None).await)
                else {
                    return raw_path;
                };
                let Some(target) = found(repo.translation_slug(lookup.post_id, to).await) else {
                    return GUIDES_PREFIX.to_string();
                };
                let Some(series_id) = lookup.series_id else {
                    return format!("{}/{}", GUIDES_PREFIX, target);
                };
                return match found(repo.series_slug(&series_id, to).await) {
                    Some(series) => format!("{}/{}/{}", GUIDES_PREFIX, series, target),
                    None => GUIDES_PREFIX.to_string(),
                };
            }
            [series_slug, post_slug] => {
                let Some(series_id) = found(repo.series_id_by_slug(series_slug, from).await)
                else {
                    return raw_path;
                };
                let Some(lookup) = found(
                    repo.guide_post_by_slug(from, post_slug, Some(&series_id))
                        .await,
                ) else {
                    return raw_path;
                };
                let Some(target) = found(repo.translation_slug(lookup.post_id, to).await) else {
                    return GUIDES_PREFIX.to_string();
                };
                return match found(repo.series_slug(&series_id, to).await) {
                    Some(series) => format!("{}/{}/{}", GUIDES_PREFIX, series, target),
                    None => GUIDES_PREFIX.to_string(),
                };
            }
            _ => {}
        }
    }

    raw_path
}
