//! Which metadata keys are written where.
//!
//! GIFTI metadata is a list of free-form name/value pairs. Only the keys known
//! to [`MetaKey`] are kept when reading, and each place in the document only
//! gets a subset of them when writing.

use crate::mesh::{MetaData, MetaKey};
use super::Intent;


/// Keys written to the file level `<MetaData>`.
pub fn keys_for_file() -> &'static [MetaKey] {
    &[
        MetaKey::Date,
        MetaKey::UserName,
        MetaKey::Description,
        MetaKey::SubjectId,
        MetaKey::UniqueId,
        MetaKey::TimeStep,
    ]
}

/// Keys written to the `<MetaData>` of a data array with the given intent.
/// `None` means "any array" and returns every key a data array can carry.
pub fn keys_for_data_array(intent: Option<Intent>) -> Vec<MetaKey> {
    let mut keys = vec![
        MetaKey::Name,
        MetaKey::Description,
        MetaKey::UniqueId,
        MetaKey::SubjectId,
        MetaKey::SurfaceId,
    ];

    let intent_keys = [
        MetaKey::IntentCode,
        MetaKey::IntentP1,
        MetaKey::IntentP2,
        MetaKey::IntentP3,
    ];

    match intent {
        None => {
            keys.extend_from_slice(&[
                MetaKey::AnatomicalStructurePrimary,
                MetaKey::AnatomicalStructureSecondary,
                MetaKey::GeometricType,
                MetaKey::TopologicalType,
            ]);
            keys.extend_from_slice(&intent_keys);
        }
        Some(Intent::POINTSET) => keys.extend_from_slice(&[
            MetaKey::AnatomicalStructurePrimary,
            MetaKey::AnatomicalStructureSecondary,
            MetaKey::GeometricType,
        ]),
        Some(Intent::TRIANGLE) => keys.push(MetaKey::TopologicalType),
        Some(i) if i.is_statistic() => keys.extend_from_slice(&intent_keys),
        Some(_) => {}
    }

    keys
}

/// Copies the known keys of `pairs` into `info`. Unknown keys and values
/// that don't parse as the type of their key are dropped.
pub(crate) fn read_pairs(pairs: &[(String, String)], info: &mut MetaData) {
    for (name, value) in pairs {
        match MetaKey::from_name(name) {
            Some(key) => {
                if !info.set_parsed(key, value) {
                    log::warn!("ignoring GIFTI metadata '{}': invalid value '{}'", name, value);
                }
            }
            None => log::debug!("ignoring unknown GIFTI metadata key '{}'", name),
        }
    }
}

/// Returns the pairs for all of `keys` present in `info`, in the order of
/// `keys`. Empty strings are skipped.
pub(crate) fn write_pairs(info: &MetaData, keys: &[MetaKey]) -> Vec<(String, String)> {
    keys.iter()
        .filter_map(|&key| info.get(key).map(|v| (key, v.to_string())))
        .filter(|(_, v)| !v.is_empty())
        .map(|(key, v)| (key.name().to_string(), v))
        .collect()
}

/// Sets `name` to `value`, replacing an existing pair of that name.
pub(crate) fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: String) {
    match pairs.iter_mut().find(|(n, _)| n == name) {
        Some(pair) => pair.1 = value,
        None => pairs.push((name.to_string(), value)),
    }
}
