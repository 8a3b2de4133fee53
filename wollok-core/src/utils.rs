/// Split `input` on the first occurrence of `separator`.
///
/// Returns the head and, when the separator occurs, the remainder.
/// ```
/// use wollok_core::utils::divide_on;
///
/// assert_eq!(divide_on('.', "p.q.C"), ("p", Some("q.C")));
/// assert_eq!(divide_on('.', "C"), ("C", None));
/// ```
pub fn divide_on(separator: char, input: &str) -> (&str, Option<&str>) {
    match input.split_once(separator) {
        Some((head, tail)) => (head, Some(tail)),
        None => (input, None),
    }
}
