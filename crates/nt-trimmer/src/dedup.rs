//! Prefix-redundancy filter for search keys.

/// Drop entries that start with the last kept entry.
///
/// `sorted` must be lexicographically sorted. The test is a plain string
/// prefix, not a token boundary: after `"car"`, both `"car part"` and
/// `"carburetor"` are dropped.
pub fn non_redundant<S: AsRef<str> + Clone>(sorted: &[S]) -> Vec<S> {
    let Some((first, rest)) = sorted.split_first() else {
        return Vec::new();
    };
    let mut result = vec![first.clone()];
    let mut prev = first.as_ref();
    for item in rest {
        if item.as_ref().starts_with(prev) {
            continue;
        }
        result.push(item.clone());
        prev = item.as_ref();
    }
    result
}
