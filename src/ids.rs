//! Prefixed entity identifiers.
//!
//! Every persisted record carries a short type prefix followed by an opaque
//! token, e.g. `ordli_9B2F4C1E7A3D45E8B6C0D1F2A3B4C5D6`. Tokens are random
//! UUIDv4 values drawn from a thread-local generator, so concurrent callers
//! never contend on shared state.

use uuid::Uuid;

/// Separator between the prefix and the token.
pub const ID_SEPARATOR: char = '_';

/// Returns `existing` unchanged when it is non-empty, otherwise a freshly
/// generated `{prefix}_{token}` id.
///
/// Safe to call any number of times on the same record; an assigned id is
/// never overwritten.
pub fn generate_entity_id(existing: &str, prefix: &str) -> String {
    if !existing.is_empty() {
        return existing.to_string();
    }
    new_entity_id(prefix)
}

/// Always generates a new id for `prefix`.
pub fn new_entity_id(prefix: &str) -> String {
    let token = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}{}", prefix, ID_SEPARATOR, token)
}

/// Whether `id` is of the form `{prefix}_{token}` with a non-empty token.
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(ID_SEPARATOR))
        .map_or(false, |token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_prefixed_id_when_empty() {
        let id = generate_entity_id("", "ordli");
        assert!(id.starts_with("ordli_"));
        assert!(has_prefix(&id, "ordli"));
        assert_eq!(id.len(), "ordli_".len() + 32);
    }

    #[test]
    fn keeps_existing_id() {
        let id = generate_entity_id("ordli_EXISTING", "ordli");
        assert_eq!(id, "ordli_EXISTING");
    }

    #[test]
    fn keeps_legacy_id_without_prefix() {
        // Assigned ids are never rewritten, even when they predate the prefix.
        assert_eq!(generate_entity_id("legacy-42", "ordli"), "legacy-42");
    }

    #[test]
    fn has_prefix_requires_separator_and_token() {
        assert!(has_prefix("ordli_ABC", "ordli"));
        assert!(!has_prefix("ordli", "ordli"));
        assert!(!has_prefix("ordli_", "ordli"));
        assert!(!has_prefix("ordliABC", "ordli"));
        assert!(!has_prefix("ordlitxl_ABC", "ordli"));
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..500)
                        .map(|_| new_entity_id("ordli"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id generated");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn ids_are_not_sequenced() {
        let ids: Vec<String> = (0..10_000).map(|_| new_entity_id("ordli")).collect();
        let strictly_increasing = ids.windows(2).all(|pair| pair[0] < pair[1]);
        assert!(!strictly_increasing, "back-to-back ids follow a global sequence");
    }
}
