use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalizes a team display name into the slug form used by the site
///
/// The transformation:
/// 1. Trims surrounding whitespace
/// 2. Lowercases
/// 3. Strips diacritics (decomposes, then drops combining marks)
/// 4. Replaces spaces and underscores with hyphens
///
/// # Examples
///
/// ```
/// use sumula::derby::normalize;
///
/// assert_eq!(normalize("São Paulo"), "sao-paulo");
/// assert_eq!(normalize("  Grêmio "), "gremio");
/// assert_eq!(normalize("vasco_da_gama"), "vasco-da-gama");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            ' ' | '_' => '-',
            other => other,
        })
        .collect()
}
