mod map;
pub use map::*;
mod typed;
pub use typed::TypedHeader;

use std::borrow::Cow;

/// Folds a header name to lower-case.
///
/// Only ASCII `A-Z` are folded, every other byte is passed through unchanged.
/// Names that are already lower-case are borrowed rather than reallocated.
pub fn lowercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}
