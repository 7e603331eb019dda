//! Deterministic physical-name construction.
//!
//! Virtual object names are projected into the host cluster by concatenating
//! the name with its virtual namespace and the syncer identity prefix. Names
//! that would exceed the Kubernetes 63-character limit are truncated and
//! suffixed with a digest of the full string, so translation stays
//! collision-free across distinct (namespace, name) pairs.

use sha2::{Digest, Sha256};

/// Prefix identifying objects created by this syncer.
pub const IDENTITY_PREFIX: &str = "nestcluster";

/// Kubernetes object name length limit.
const MAX_NAME_LENGTH: usize = 63;
/// Length the joined name is cut to before the digest suffix is appended.
const TRUNCATED_LENGTH: usize = 52;
/// Hex characters of the digest kept in the suffix.
const DIGEST_LENGTH: usize = 10;

/// Joins name segments with `-`, keeping the result within the Kubernetes
/// name length limit.
///
/// Overlong results are cut to [`TRUNCATED_LENGTH`] characters and suffixed
/// with the first [`DIGEST_LENGTH`] hex characters of the SHA-256 digest of
/// the full joined string. Inputs are DNS-1123 names, so byte indexing is
/// character indexing.
pub fn safe_concat(parts: &[&str]) -> String {
    let joined = parts.join("-");
    if joined.len() <= MAX_NAME_LENGTH {
        return joined;
    }

    let digest = hex::encode(Sha256::digest(joined.as_bytes()));
    format!(
        "{}-{}",
        joined[..TRUNCATED_LENGTH].trim_end_matches('-'),
        &digest[..DIGEST_LENGTH]
    )
}

/// Physical name of a namespaced virtual object.
pub fn physical_name(name: &str, namespace: &str) -> String {
    safe_concat(&[name, "x", namespace, "x", IDENTITY_PREFIX])
}

/// Physical name of a cluster-scoped virtual object.
///
/// Cluster-scoped objects have no virtual namespace of their own, so the
/// target namespace is folded in to keep names from distinct virtual
/// clusters apart on the host.
pub fn physical_name_cluster_scoped(name: &str, namespace: &str) -> String {
    safe_concat(&[IDENTITY_PREFIX, name, "x", namespace])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_concat_short_names() {
        assert_eq!(safe_concat(&["a", "b", "c"]), "a-b-c");
    }

    #[test]
    fn test_safe_concat_is_deterministic() {
        let long = "a".repeat(80);
        assert_eq!(safe_concat(&[&long, "x", "ns"]), safe_concat(&[&long, "x", "ns"]));
    }

    #[test]
    fn test_safe_concat_respects_length_limit() {
        let long = "volume-with-a-very-long-name-that-goes-on-and-on-and-on";
        let result = safe_concat(&[IDENTITY_PREFIX, long, "x", "some-namespace"]);
        assert!(result.len() <= 63, "{result} exceeds 63 characters");
    }

    #[test]
    fn test_safe_concat_distinct_inputs_stay_distinct() {
        let base = "b".repeat(70);
        let one = safe_concat(&[&base, "x", "ns-one"]);
        let two = safe_concat(&[&base, "x", "ns-two"]);
        assert_ne!(one, two);
    }

    #[test]
    fn test_physical_name_cluster_scoped() {
        assert_eq!(
            physical_name_cluster_scoped("pv-data", "tenant-ns"),
            "nestcluster-pv-data-x-tenant-ns"
        );
    }

    #[test]
    fn test_physical_name_namespaced() {
        assert_eq!(physical_name("claim-a", "team"), "claim-a-x-team-x-nestcluster");
    }

    #[test]
    fn test_physical_names_differ_across_namespaces() {
        assert_ne!(physical_name("claim", "ns-one"), physical_name("claim", "ns-two"));
        assert_ne!(
            physical_name_cluster_scoped("pv", "ns-one"),
            physical_name_cluster_scoped("pv", "ns-two")
        );
    }
}
