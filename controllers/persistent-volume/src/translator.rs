//! Object translation between virtual and physical persistent volumes.
//!
//! Translation is a one-directional overlay, never replacement: the forward
//! direction owns spec and annotations, the backward direction owns the
//! claim binding, and fields only the other side knows about (resource
//! version, UID, host-side binding) are preserved. All comparisons are deep
//! semantic equality on the typed objects.

use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use syncer::SyncError;
use translate::{cluster_identity, MANAGED_BY_LABEL, NAME_ANNOTATION};

use crate::config::SyncerConfig;
use crate::reconciler::{translate_volume_name, HOST_VOLUME_ANNOTATION};

/// Builds the physical projection of a virtual persistent volume.
///
/// The physical metadata carries only the translated name, the reverse-name
/// annotation, the virtual annotations and the managed-by marker; resource
/// version, UID and finalizers stay behind. A claim ref is rewritten to the
/// claim's own physical projection in the target namespace.
pub fn to_physical(
    config: &SyncerConfig,
    v_pv: &PersistentVolume,
) -> Result<PersistentVolume, SyncError> {
    let v_name = v_pv
        .metadata
        .name
        .clone()
        .ok_or(SyncError::MissingMetadata("name"))?;

    let mut annotations = v_pv.metadata.annotations.clone().unwrap_or_default();
    annotations.insert(NAME_ANNOTATION.to_string(), v_name.clone());

    let mut labels = v_pv.metadata.labels.clone().unwrap_or_default();
    labels.insert(
        MANAGED_BY_LABEL.to_string(),
        cluster_identity(&config.target_namespace),
    );

    let mut spec = v_pv.spec.clone().unwrap_or_default();
    if let Some(claim_ref) = spec.claim_ref.as_mut() {
        if let (Some(claim_name), Some(claim_namespace)) =
            (claim_ref.name.clone(), claim_ref.namespace.clone())
        {
            claim_ref.name = Some(translate::physical_name(&claim_name, &claim_namespace));
        }
        claim_ref.namespace = Some(config.target_namespace.clone());
        claim_ref.uid = None;
        claim_ref.resource_version = None;
    }

    Ok(PersistentVolume {
        metadata: ObjectMeta {
            name: Some(translate_volume_name(
                &config.target_namespace,
                &v_name,
                Some(v_pv),
            )),
            annotations: Some(annotations),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(spec),
        status: None,
    })
}

/// Computes the forward update of a physical volume, or `None` when the
/// physical side already matches.
///
/// The claim ref is host-authoritative and left untouched; everything else
/// in the spec plus the annotations is overlaid from the virtual object.
pub fn update_physical(
    v_pv: &PersistentVolume,
    p_pv: &PersistentVolume,
) -> Option<PersistentVolume> {
    let v_name = v_pv.metadata.name.clone().unwrap_or_default();

    let mut expected_spec = v_pv.spec.clone().unwrap_or_default();
    expected_spec.claim_ref = p_pv.spec.as_ref().and_then(|spec| spec.claim_ref.clone());

    let mut expected_annotations = p_pv.metadata.annotations.clone().unwrap_or_default();
    if let Some(annotations) = &v_pv.metadata.annotations {
        for (key, value) in annotations {
            expected_annotations.insert(key.clone(), value.clone());
        }
    }
    expected_annotations.insert(NAME_ANNOTATION.to_string(), v_name);

    let spec_unchanged = p_pv.spec.as_ref() == Some(&expected_spec);
    let annotations_unchanged =
        p_pv.metadata.annotations.clone().unwrap_or_default() == expected_annotations;
    if spec_unchanged && annotations_unchanged {
        return None;
    }

    let mut updated = p_pv.clone();
    updated.spec = Some(expected_spec);
    updated.metadata.annotations = Some(expected_annotations);
    Some(updated)
}

/// Builds the virtual representation of a physical volume for adoption.
///
/// The virtual name is the reverse-translated physical name, and the pin
/// annotation is stamped with the physical name: an adopted volume is a
/// reference to the host object, not something this syncer provisions.
pub fn to_virtual(
    p_pv: &PersistentVolume,
    v_claim: Option<&PersistentVolumeClaim>,
) -> Result<PersistentVolume, SyncError> {
    let p_name = p_pv
        .metadata
        .name
        .clone()
        .ok_or(SyncError::MissingMetadata("name"))?;
    let v_name = p_pv
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(NAME_ANNOTATION))
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| p_name.clone());

    let mut v_pv = p_pv.clone();
    v_pv.metadata.name = Some(v_name);
    v_pv.metadata.resource_version = None;
    v_pv.metadata.uid = None;
    v_pv.metadata.managed_fields = None;

    let mut annotations = v_pv.metadata.annotations.unwrap_or_default();
    annotations.insert(HOST_VOLUME_ANNOTATION.to_string(), p_name);
    v_pv.metadata.annotations = Some(annotations);

    if let Some(claim) = v_claim {
        if let Some(claim_ref) = v_pv.spec.as_mut().and_then(|spec| spec.claim_ref.as_mut()) {
            claim_ref.name = claim.metadata.name.clone();
            claim_ref.namespace = claim.metadata.namespace.clone();
            claim_ref.uid = claim.metadata.uid.clone();
            claim_ref.resource_version = claim.metadata.resource_version.clone();
        }
    }

    Ok(v_pv)
}

/// Computes the backward update of a virtual volume, or `None` when nothing
/// changed on the host side.
///
/// Fields bound only after the host resource is provisioned flow this way;
/// the claim ref is rewritten to the virtual claim's identity so the
/// virtual object never points at a host-side name.
pub fn update_virtual_backwards(
    v_pv: &PersistentVolume,
    p_pv: &PersistentVolume,
    v_claim: Option<&PersistentVolumeClaim>,
) -> Option<PersistentVolume> {
    let mut expected_spec = p_pv.spec.clone().unwrap_or_default();
    if let Some(claim) = v_claim {
        if let Some(claim_ref) = expected_spec.claim_ref.as_mut() {
            claim_ref.name = claim.metadata.name.clone();
            claim_ref.namespace = claim.metadata.namespace.clone();
            claim_ref.uid = claim.metadata.uid.clone();
            claim_ref.resource_version = claim.metadata.resource_version.clone();
        }
    }

    if v_pv.spec.as_ref() == Some(&expected_spec) {
        return None;
    }

    let mut updated = v_pv.clone();
    updated.spec = Some(expected_spec);
    Some(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use k8s_openapi::api::core::v1::ObjectReference;
    use translate::physical_name;

    #[test]
    fn test_to_physical_stamps_reverse_name_and_marker() {
        let config = test_config("host-ns");
        let v_pv = test_volume("vol-a");

        let p_pv = to_physical(&config, &v_pv).unwrap();

        assert_eq!(
            p_pv.metadata.name.as_deref(),
            Some(translate::physical_name_cluster_scoped("vol-a", "host-ns").as_str())
        );
        let annotations = p_pv.metadata.annotations.unwrap();
        assert_eq!(annotations.get(NAME_ANNOTATION).map(String::as_str), Some("vol-a"));
        let labels = p_pv.metadata.labels.unwrap();
        assert_eq!(
            labels.get(MANAGED_BY_LABEL),
            Some(&cluster_identity("host-ns"))
        );
        assert!(p_pv.metadata.resource_version.is_none());
        assert!(p_pv.status.is_none());
    }

    #[test]
    fn test_to_physical_rewrites_claim_ref() {
        let config = test_config("host-ns");
        let mut v_pv = test_volume("vol-a");
        if let Some(spec) = v_pv.spec.as_mut() {
            spec.claim_ref = Some(ObjectReference {
                name: Some("claim-a".to_string()),
                namespace: Some("team".to_string()),
                uid: Some("1234".to_string()),
                ..Default::default()
            });
        }

        let p_pv = to_physical(&config, &v_pv).unwrap();

        let claim_ref = p_pv.spec.unwrap().claim_ref.unwrap();
        assert_eq!(
            claim_ref.name.as_deref(),
            Some(physical_name("claim-a", "team").as_str())
        );
        assert_eq!(claim_ref.namespace.as_deref(), Some("host-ns"));
        assert!(claim_ref.uid.is_none());
    }

    #[test]
    fn test_update_physical_returns_none_when_unchanged() {
        let config = test_config("host-ns");
        let v_pv = test_volume("vol-a");
        let p_pv = to_physical(&config, &v_pv).unwrap();

        assert!(update_physical(&v_pv, &p_pv).is_none());
    }

    #[test]
    fn test_update_physical_detects_annotation_drift() {
        let config = test_config("host-ns");
        let mut v_pv = test_volume("vol-a");
        let p_pv = to_physical(&config, &v_pv).unwrap();

        v_pv.metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert("example.com/tier".to_string(), "gold".to_string());

        let updated = update_physical(&v_pv, &p_pv).unwrap();
        let annotations = updated.metadata.annotations.unwrap();
        assert_eq!(
            annotations.get("example.com/tier").map(String::as_str),
            Some("gold")
        );
        // reverse-name stamp survives the overlay
        assert_eq!(annotations.get(NAME_ANNOTATION).map(String::as_str), Some("vol-a"));
    }

    #[test]
    fn test_update_physical_keeps_claim_ref_host_authoritative() {
        let config = test_config("host-ns");
        let v_pv = test_volume("vol-a");
        let mut p_pv = to_physical(&config, &v_pv).unwrap();
        if let Some(spec) = p_pv.spec.as_mut() {
            spec.claim_ref = Some(ObjectReference {
                name: Some("bound-claim".to_string()),
                namespace: Some("host-ns".to_string()),
                ..Default::default()
            });
        }

        // claim binding on the host alone is no reason for a forward update
        assert!(update_physical(&v_pv, &p_pv).is_none());
    }

    #[test]
    fn test_to_virtual_pins_adopted_volume() {
        let p_pv = test_volume("pv-data");

        let v_pv = to_virtual(&p_pv, None).unwrap();

        assert_eq!(v_pv.metadata.name.as_deref(), Some("pv-data"));
        let annotations = v_pv.metadata.annotations.unwrap();
        assert_eq!(
            annotations.get(HOST_VOLUME_ANNOTATION).map(String::as_str),
            Some("pv-data")
        );
    }

    #[test]
    fn test_to_virtual_rewrites_claim_ref_to_virtual_claim() {
        let mut p_pv = test_volume("pv-data");
        if let Some(spec) = p_pv.spec.as_mut() {
            spec.claim_ref = Some(ObjectReference {
                name: Some(physical_name("claim-a", "team")),
                namespace: Some("host-ns".to_string()),
                ..Default::default()
            });
        }
        let claim = test_claim("claim-a", "team", Some("pv-data"));

        let v_pv = to_virtual(&p_pv, Some(&claim)).unwrap();

        let claim_ref = v_pv.spec.unwrap().claim_ref.unwrap();
        assert_eq!(claim_ref.name.as_deref(), Some("claim-a"));
        assert_eq!(claim_ref.namespace.as_deref(), Some("team"));
    }

    #[test]
    fn test_update_virtual_backwards_propagates_host_binding() {
        let config = test_config("host-ns");
        let v_pv = test_volume("vol-a");
        let mut p_pv = to_physical(&config, &v_pv).unwrap();
        if let Some(spec) = p_pv.spec.as_mut() {
            spec.claim_ref = Some(ObjectReference {
                name: Some(physical_name("claim-a", "team")),
                namespace: Some("host-ns".to_string()),
                ..Default::default()
            });
        }
        let claim = test_claim("claim-a", "team", Some("vol-a"));

        let updated = update_virtual_backwards(&v_pv, &p_pv, Some(&claim)).unwrap();

        let claim_ref = updated.spec.unwrap().claim_ref.unwrap();
        assert_eq!(claim_ref.name.as_deref(), Some("claim-a"));
        assert_eq!(claim_ref.namespace.as_deref(), Some("team"));
    }

    #[test]
    fn test_update_virtual_backwards_none_when_in_sync() {
        let config = test_config("host-ns");
        let v_pv = test_volume("vol-a");
        let p_pv = to_physical(&config, &v_pv).unwrap();

        assert!(update_virtual_backwards(&v_pv, &p_pv, None).is_none());
    }
}
