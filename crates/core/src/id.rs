//! Row identifier generation.

use uuid::Uuid;

/// Generate a fresh opaque row identifier.
///
/// UUIDv7, so ids sort by creation time. Stored and exposed as text; callers
/// never parse the contents back.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn ids_are_valid_uuids_and_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(Uuid::from_str(&a).is_ok());
        assert_eq!(a.len(), 36);
    }
}
