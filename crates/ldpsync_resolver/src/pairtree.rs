//! Deterministic pairtree paths.

use crate::error::{ResolverError, ResolverResult};
use uuid::Uuid;

/// Normalizes an identifier to its lowercase hyphenated UUID form.
pub fn normalize_identifier(identifier: &str) -> ResolverResult<String> {
    Uuid::parse_str(identifier.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| ResolverError::MalformedIdentifier(identifier.to_string()))
}

/// Derives the pairtree path for an identifier.
///
/// The first eight hex digits become four two-character directories,
/// followed by the full identifier:
/// `0a1b2c3d-...` → `0a/1b/2c/3d/0a1b2c3d-...`.
pub fn pairtree_path(identifier: &str) -> ResolverResult<String> {
    let id = normalize_identifier(identifier)?;
    let prefix = &id[..8];
    let segments: Vec<&str> = (0..4).map(|i| &prefix[i * 2..i * 2 + 2]).collect();
    Ok(format!("{}/{}", segments.join("/"), id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_path() {
        let path = pairtree_path("0A1B2C3D-0000-4000-8000-000000000001").unwrap();
        assert_eq!(path, "0a/1b/2c/3d/0a1b2c3d-0000-4000-8000-000000000001");
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(
            pairtree_path("not-a-uuid"),
            Err(ResolverError::MalformedIdentifier(_))
        ));
        assert!(pairtree_path("").is_err());
    }

    proptest! {
        #[test]
        fn path_is_deterministic(bytes in prop::array::uniform16(any::<u8>())) {
            let id = Uuid::from_bytes(bytes).to_string();
            let a = pairtree_path(&id).unwrap();
            let b = pairtree_path(&id.to_uppercase()).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert!(a.ends_with(&id));
            prop_assert_eq!(a.split('/').count(), 5);
        }
    }
}
