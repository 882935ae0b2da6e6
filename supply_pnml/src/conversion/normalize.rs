use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Prefix of hash-based fallback ids
pub const FALLBACK_PREFIX: &str = "id_";

/// Number of hex characters of the MD5 digest used in fallback ids
pub const FALLBACK_HASH_LEN: usize = 8;

///
/// When [`normalize_id_with`] falls back to a hash-based id
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizePolicy {
    /// Hash if the sanitized label does not start with a letter or underscore,
    /// or if any non-ASCII character was replaced.
    ///
    /// Keeps labels such as `仓库`/`工厂` or `一级仓1`/`二级仓1` apart (they would become
    /// `__` and `___1`). Replaced ASCII punctuation stays readable: `Hub North-1` is
    /// `Hub_North_1`.
    #[default]
    Strict,
    /// Hash only if the sanitized label does not start with a letter or underscore
    ///
    /// Non-ASCII characters turn into underscores, so distinct labels that differ only
    /// in those characters collide.
    Legacy,
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_valid_id(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(is_id_char),
        _ => false,
    }
}

/// The first 8 lowercase hex characters of the MD5 digest of `text`
pub fn short_hash(text: &str) -> String {
    let mut digest = hex::encode(Md5::digest(text.as_bytes()));
    digest.truncate(FALLBACK_HASH_LEN);
    digest
}

/// `id_` followed by [`short_hash`] of `label`
pub fn fallback_id(label: &str) -> String {
    format!("{FALLBACK_PREFIX}{}", short_hash(label))
}

///
/// Turn a human-readable label into a node id using [`NormalizePolicy::Strict`]
///
/// See [`normalize_id_with`].
pub fn normalize_id(label: &str) -> String {
    normalize_id_with(label, NormalizePolicy::Strict)
}

///
/// Turn a human-readable label into a node id matching `[A-Za-z_][A-Za-z0-9_]*`
///
/// Every character outside `[A-Za-z0-9_]` is replaced by `_`. If the result is not a
/// valid id (or, with [`NormalizePolicy::Strict`], lost a non-ASCII character) the id
/// is [`fallback_id`] of the original label instead.
///
/// The function is pure: it does no bookkeeping of ids handed out before.
pub fn normalize_id_with(label: &str, policy: NormalizePolicy) -> String {
    let sanitized: String = label
        .chars()
        .map(|c| if is_id_char(c) { c } else { '_' })
        .collect();
    let lossy = match policy {
        NormalizePolicy::Legacy => false,
        NormalizePolicy::Strict => !label.is_ascii(),
    };
    if is_valid_id(&sanitized) && !lossy {
        sanitized
    } else {
        fallback_id(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICIES: [NormalizePolicy; 2] = [NormalizePolicy::Strict, NormalizePolicy::Legacy];

    #[test]
    fn identifiers_are_kept() {
        for label in ["warehouse_1", "A", "_x9", "Tier3Hub", "__"] {
            for policy in POLICIES {
                assert_eq!(normalize_id_with(label, policy), label);
            }
        }
    }

    #[test]
    fn disallowed_characters_become_underscores() {
        assert_eq!(normalize_id("Hub North-1"), "Hub_North_1");
        assert_eq!(normalize_id("a.b/c"), "a_b_c");
        assert_eq!(normalize_id_with("仓A", NormalizePolicy::Legacy), "_A");
    }

    #[test]
    fn leading_digit_falls_back_to_hash() {
        let id = normalize_id("123 Main St");
        assert!(id.starts_with("id_"));
        assert_eq!(id.len(), 3 + 8);
        assert_eq!(id, fallback_id("123 Main St"));
        assert_eq!(normalize_id_with("123", NormalizePolicy::Legacy), fallback_id("123"));
    }

    #[test]
    fn fallback_uses_md5_of_original_label() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        assert_eq!(fallback_id("abc"), "id_90015098");
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(normalize_id(""), "id_d41d8cd9");
    }

    #[test]
    fn output_is_valid_and_idempotent() {
        let labels = [
            "仓A", "仓库", "9lives", "", " ", "A-B", "用户1", "¿qué?", "__", "x y z", "工厂",
        ];
        for policy in POLICIES {
            for label in labels {
                let id = normalize_id_with(label, policy);
                assert!(is_valid_id(&id), "{label:?} -> {id:?}");
                assert_eq!(normalize_id_with(&id, policy), id);
            }
        }
    }

    #[test]
    fn non_ascii_labels_are_distinct_in_strict_mode() {
        let a = normalize_id("仓库");
        let b = normalize_id("工厂");
        assert!(a.starts_with("id_"));
        assert!(b.starts_with("id_"));
        assert_ne!(a, b);
    }

    #[test]
    fn shared_ascii_remainder_is_kept_apart() {
        let a = normalize_id("一级仓1");
        let b = normalize_id("二级仓1");
        assert_eq!(a, fallback_id("一级仓1"));
        assert_eq!(b, fallback_id("二级仓1"));
        assert_ne!(a, b);
        assert_eq!(normalize_id("仓A"), fallback_id("仓A"));
    }

    #[test]
    fn non_ascii_labels_collide_in_legacy_mode() {
        let a = normalize_id_with("仓库", NormalizePolicy::Legacy);
        let b = normalize_id_with("工厂", NormalizePolicy::Legacy);
        assert_eq!(a, "__");
        assert_eq!(a, b);
    }

    #[test]
    fn deterministic() {
        assert_eq!(normalize_id("配送中心 #7"), normalize_id("配送中心 #7"));
        assert_eq!(fallback_id("9"), fallback_id("9"));
    }
}
