//! Path rendering and Unicode normalization utilities.
//!
//! Report rows must be identical no matter which platform produced them,
//! so relative paths are always rendered with `/` separators. File names
//! can optionally be normalized to NFC before they are used as comparison
//! keys.
//!
//! # Background
//!
//! macOS uses NFD (Decomposed) normalization for file paths, while Windows
//! and Linux typically use NFC (Composed) normalization. This means the same
//! visual filename can have different byte representations:
//!
//! - NFC: `café.py` - 'é' is U+00E9 (single code point)
//! - NFD: `café.py` - 'e' U+0065 + combining acute accent U+0301
//!
//! Without normalization, a tree copied off a Mac would never line up with
//! its Linux twin for such names.
//!
//! # Example
//!
//! ```
//! use treecmp::scanner::path_utils::normalize_path_str;
//!
//! let nfc = "café.py";
//! let nfd = "cafe\u{0301}.py";
//! assert_eq!(normalize_path_str(nfc), normalize_path_str(nfd));
//! ```

use std::ffi::OsStr;
use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Normalize a string to NFC (Composed) form.
///
/// # Example
///
/// ```
/// use treecmp::scanner::path_utils::normalize_path_str;
///
/// let nfd = "cafe\u{0301}.py"; // NFD form
/// assert_eq!(normalize_path_str(nfd), "café.py"); // NFC form
/// ```
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Render a relative path with `/` separators on every platform.
///
/// Non-UTF-8 components are converted lossily.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use treecmp::scanner::path_utils::to_slash;
///
/// assert_eq!(to_slash(Path::new("pkg/sub/mod.py")), "pkg/sub/mod.py");
/// ```
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Comparison key for a file name.
///
/// With `normalize` set the name is folded to NFC first.
#[must_use]
pub fn basename_key(name: &OsStr, normalize: bool) -> String {
    let name = name.to_string_lossy();
    if normalize {
        normalize_path_str(&name)
    } else {
        name.into_owned()
    }
}
