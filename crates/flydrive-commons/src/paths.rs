//! Location and prefix validation shared by every adapter.

use crate::error::{DriveError, Result};

const BAD_COMPONENTS: &str = "Resource name contains bad components such as \"..\" or \".\".";

/// Normalize a file location into a `/` separated key relative to the disk root.
///
/// Leading slashes, empty segments and `.` segments are dropped. A `..` segment
/// is rejected so a location can never escape the disk root. Backslashes and
/// null bytes are rejected as well.
pub fn normalize_location(location: &str) -> Result<String> {
    if location.contains('\0') {
        return Err(DriveError::wrong_key_path(location, "Location contains a null byte"));
    }
    if location.contains('\\') {
        return Err(DriveError::wrong_key_path(
            location,
            "Location contains a backslash separator",
        ));
    }

    let mut segments = Vec::new();
    for segment in location.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(DriveError::wrong_key_path(location, BAD_COMPONENTS)),
            other => segments.push(other),
        }
    }

    Ok(segments.join("/"))
}

/// Validate a listing prefix.
///
/// Any `.` or `..` segment is rejected to prevent prefix escape. Empty
/// segments are collapsed (`"/a//b"` becomes `"a/b"`) and a trailing `/` is
/// kept, so the prefix keeps plain string-prefix semantics
/// (`"logs/2024-"` matches `"logs/2024-01.txt"`).
pub fn validate_list_prefix(prefix: &str) -> Result<String> {
    if prefix.contains('\0') {
        return Err(DriveError::wrong_key_path(prefix, "Prefix contains a null byte"));
    }
    if prefix
        .split(['/', '\\'])
        .any(|segment| segment == "." || segment == "..")
    {
        return Err(DriveError::wrong_key_path(prefix, BAD_COMPONENTS));
    }

    let mut normalized = prefix
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if prefix.ends_with('/') && !normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Split a listing prefix into the deepest directory it names and the full prefix.
///
/// `"a/b/c"` lists under `"a/b"`, `"a/b/"` lists under `"a/b"` and `"abc"`
/// lists from the root.
pub fn prefix_directory(prefix: &str) -> &str {
    match prefix.rfind('/') {
        Some(idx) => prefix[..idx].trim_end_matches('/'),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_location_strips_dots_and_slashes() {
        assert_eq!(normalize_location("/a//b/./c.txt").unwrap(), "a/b/c.txt");
        assert_eq!(normalize_location("./tests/unit/x").unwrap(), "tests/unit/x");
        assert_eq!(normalize_location("file.tar.gz").unwrap(), "file.tar.gz");
    }

    #[test]
    fn test_normalize_location_rejects_parent_segments() {
        let err = normalize_location("a/../../etc/passwd").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongKeyPath);
        assert!(normalize_location("a\\b").is_err());
        assert!(normalize_location("a\0b").is_err());
    }

    #[test]
    fn test_list_prefix_rejects_traversal() {
        for bad in ["..", "../x", "a/../b", "a/./b", ".", "a/.."] {
            let err = validate_list_prefix(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::WrongKeyPath, "prefix {bad:?}");
        }
    }

    #[test]
    fn test_list_prefix_allows_dotted_names() {
        assert_eq!(validate_list_prefix("a/file.txt").unwrap(), "a/file.txt");
        assert_eq!(validate_list_prefix("/logs/2024-").unwrap(), "logs/2024-");
        assert_eq!(validate_list_prefix("").unwrap(), "");
    }

    #[test]
    fn test_list_prefix_collapses_empty_segments() {
        assert_eq!(validate_list_prefix("a//b/c").unwrap(), "a/b/c");
        assert_eq!(validate_list_prefix("//a/b//").unwrap(), "a/b/");
        assert_eq!(validate_list_prefix("/").unwrap(), "");
    }

    #[test]
    fn test_prefix_directory() {
        assert_eq!(prefix_directory("a/b/c"), "a/b");
        assert_eq!(prefix_directory("a/b/"), "a/b");
        assert_eq!(prefix_directory("abc"), "");
        assert_eq!(prefix_directory(""), "");
    }
}
