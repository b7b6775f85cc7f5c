//! Decoding just enough of a runtime's SCALE-encoded metadata to find call indices.

use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use parity_scale_codec::Decode;
use std::collections::HashMap;

/// Errors decoding runtime metadata.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
    /// The bytes did not decode as a `RuntimeMetadataPrefixed`.
    #[error("failed to decode runtime metadata: {0}")]
    Decode(String),
    /// The decoded metadata used a version this table does not understand.
    #[error("unsupported metadata version")]
    UnsupportedVersion,
}

impl chain_types::ErrorCode for MetadataError {
    fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "METADATA_DECODE_ERROR",
            Self::UnsupportedVersion => "METADATA_UNSUPPORTED_VERSION",
        }
    }
}

/// Maps `(section, method)` to the `(pallet_index, call_index)` pair the runtime
/// expects, derived once from a connected runtime's metadata.
#[derive(Debug, Clone, Default)]
pub struct CallIndexTable {
    indices: HashMap<(String, String), (u8, u8)>,
}

impl CallIndexTable {
    /// Decodes `raw` (the bytes returned by `state_getMetadata`) into a lookup table
    /// of every pallet's call indices.
    pub fn decode(raw: &[u8]) -> Result<Self, MetadataError> {
        let prefixed =
            RuntimeMetadataPrefixed::decode(&mut &raw[..]).map_err(|e| MetadataError::Decode(e.to_string()))?;
        let mut indices = HashMap::new();
        match prefixed.1 {
            RuntimeMetadata::V14(v14) => {
                for pallet in v14.pallets.iter() {
                    let Some(calls) = &pallet.calls else { continue };
                    let call_ty = calls.ty.id;
                    let Some(ty) = v14.types.resolve(call_ty) else { continue };
                    if let frame_metadata::v14::TypeDef::Variant(variant) = &ty.type_def {
                        for call in variant.variants.iter() {
                            indices.insert(
                                (pallet.name.clone(), call.name.clone()),
                                (pallet.index, call.index),
                            );
                        }
                    }
                }
            }
            _ => return Err(MetadataError::UnsupportedVersion),
        }
        Ok(Self { indices })
    }

    /// The `(pallet_index, call_index)` pair for `section.method`, if the runtime
    /// exposes it.
    pub fn lookup(&self, section: &str, method: &str) -> Option<(u8, u8)> {
        self.indices.get(&(section.to_string(), method.to_string())).copied()
    }

    /// Whether the runtime exposes `section.method` at all.
    pub fn has_call(&self, section: &str, method: &str) -> bool {
        self.lookup(section, method).is_some()
    }
}
