use crate::{db::store::StoreError, traits::EntityValue};

/// Encode a row for storage.
pub(crate) fn encode_row<E: EntityValue>(entity: &E) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(entity).map_err(|err| StoreError::EncodeFailed {
        entity: E::ENTITY_NAME,
        message: err.to_string(),
    })
}

/// Decode a stored row. A failure here means the store no longer round
/// trips the entity's serde shape and is treated as corruption.
pub(crate) fn decode_row<E: EntityValue>(bytes: &[u8]) -> Result<E, StoreError> {
    serde_json::from_slice(bytes).map_err(|err| StoreError::Corrupt {
        entity: E::ENTITY_NAME,
        message: err.to_string(),
    })
}
