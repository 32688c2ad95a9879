//! Formatting helpers used by generated `Display` implementations.

use std::fmt;

/// Writes `items` as `[a b c]`, formatting each element with `each`.
///
/// # Errors
///
/// Propagates the first formatting error.
///
/// ```rust
/// use std::fmt;
///
/// struct Numbers(Vec<i32>);
///
/// impl fmt::Display for Numbers {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         optgen::render::list(f, &self.0, |item, f| write!(f, "{item}"))
///     }
/// }
///
/// assert_eq!(Numbers(vec![1, 2]).to_string(), "[1 2]");
/// assert_eq!(Numbers(Vec::new()).to_string(), "[]");
/// ```
pub fn list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        each(item, f)?;
    }
    f.write_str("]")
}
