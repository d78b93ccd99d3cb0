//! Small pure helpers for archive paths and filename tokens.
//!
//! Archive identities use `/` separators regardless of host platform; the
//! engines never touch the real filesystem, so these work on plain strings.

use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| {
    // Safe: pattern is a compile-time constant.
    Regex::new(r"\([^)]*\)").unwrap()
});

/// Lowercase filename stem of an archive path (final segment, extension
/// dropped). A leading dot is not an extension separator.
pub fn stem(identity: &str) -> String {
    let name = identity.rsplit('/').next().unwrap_or(identity);
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    };
    stem.to_ascii_lowercase()
}

/// Filename (final segment) of an archive path.
pub fn file_name(identity: &str) -> &str {
    identity.rsplit('/').next().unwrap_or(identity)
}

/// Folder of an archive path; empty string for the archive root.
pub fn folder_of(identity: &str) -> &str {
    match identity.rfind('/') {
        Some(i) => &identity[..i],
        None => "",
    }
}

/// Final segment of a folder path.
pub fn leaf(folder: &str) -> &str {
    folder.rsplit('/').next().unwrap_or(folder)
}

/// Parent of a folder path; empty string at the top level.
pub fn parent(folder: &str) -> &str {
    match folder.rfind('/') {
        Some(i) => &folder[..i],
        None => "",
    }
}

/// Lowercase whole-word tokens: maximal ASCII-alphanumeric runs.
pub fn tokens(s: &str) -> Vec<String> {
    s.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Folder display name normalized for word matching: lowercase with
/// parenthetical text removed, e.g. `"Hero (v2)"` → `"hero"`.
pub fn normalize_folder_name(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    let stripped = PARENTHETICAL.replace_all(&lowered, "");
    stripped.trim().to_string()
}

/// Strip at most one type keyword from the front and one from the back of a
/// lowercase stem. Keywords only count when followed/preceded by a separator,
/// so a stem that *is* the keyword survives intact.
pub fn strip_type_tokens(stem: &str, keywords: &[String]) -> String {
    const SEPS: [char; 3] = ['_', '-', ' '];
    let mut s = stem;
    for kw in keywords {
        if s.len() > kw.len() + 1 && s.starts_with(kw.as_str()) {
            let rest = &s[kw.len()..];
            if rest.starts_with(SEPS) {
                s = &rest[1..];
                break;
            }
        }
    }
    for kw in keywords {
        if s.len() > kw.len() + 1 && s.ends_with(kw.as_str()) {
            let head = &s[..s.len() - kw.len()];
            if head.ends_with(SEPS) {
                s = &head[..head.len() - 1];
                break;
            }
        }
    }
    s.to_string()
}

/// Alphanumeric-only lowercase form, for loose name comparisons.
pub fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_and_folder() {
        assert_eq!(stem("Hero/red.bin"), "red");
        assert_eq!(stem("PORTRAIT.PNG"), "portrait");
        assert_eq!(folder_of("Hero/red.bin"), "Hero");
        assert_eq!(folder_of("root.bin"), "");
        assert_eq!(parent("a/b/c"), "a/b");
        assert_eq!(parent("a"), "");
        assert_eq!(leaf("a/b/c"), "c");
    }

    #[test]
    fn test_tokens() {
        assert_eq!(tokens("Hero_Red-v2.png"), ["hero", "red", "v2", "png"]);
        assert!(tokens("___").is_empty());
    }

    #[test]
    fn test_normalize_folder_name() {
        assert_eq!(normalize_folder_name("Hero (v2)"), "hero");
        assert_eq!(normalize_folder_name("Pack"), "pack");
    }

    #[test]
    fn test_strip_type_tokens_once_each_side() {
        let kws = vec!["portrait".to_string(), "csp".to_string()];
        assert_eq!(strip_type_tokens("portrait_hero", &kws), "hero");
        assert_eq!(strip_type_tokens("hero_portrait", &kws), "hero");
        assert_eq!(strip_type_tokens("portrait_hero_portrait", &kws), "hero");
        // The stem that is only the keyword is preserved.
        assert_eq!(strip_type_tokens("portrait", &kws), "portrait");
        // No separator, no strip.
        assert_eq!(strip_type_tokens("portraithero", &kws), "portraithero");
    }
}
