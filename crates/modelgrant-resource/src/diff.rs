//! User-list differences used by the update handler.

/// Users present in `old` but absent from `new`.
///
/// Keeps `old`'s order and does not collapse duplicates: a user listed twice
/// in `old` and absent from `new` appears twice in the result.
pub fn missing_users(old: &[String], new: &[String]) -> Vec<String> {
    old.iter()
        .filter(|user| !new.contains(user))
        .cloned()
        .collect()
}
