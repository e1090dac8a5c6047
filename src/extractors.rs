//! Pulls typed results back out of a decoded [`crate::model::ResponsePayload`], the mirror image
//! of [`crate::builders`]. Each function assumes the caller already checked the batch item's
//! `result_status` was `Success` — [`crate::engine`] does that once, centrally, before an
//! extractor ever runs — so these only need to worry about the payload shape.
use crate::error::{ErrorKind, Result};
use crate::model::{
    Attribute, AttributeValueWire, KeyFormatType, ManagedObject, ObjectType, ResponsePayload,
};

/// A key retrieved from the server: its format, algorithm-and-length metadata when present, the
/// raw material, and any attributes the server attached to the `KeyValue`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedKey {
    pub key_format_type: KeyFormatType,
    pub cryptographic_length_bits: Option<i32>,
    pub key_material: Vec<u8>,
    pub attributes: Vec<Attribute>,
}

/// Opaque secret data retrieved from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedSecret {
    pub secret_data_type: i32,
    pub data: Vec<u8>,
}

fn unexpected_payload(operation: &str) -> crate::error::Error {
    ErrorKind::MalformedResponse(format!(
        "server's {} response did not carry a {} payload",
        operation, operation
    ))
    .into()
}

/// Extracts the unique identifier that `Create`, `Register`, `Activate`, `Revoke` or `Destroy`
/// assign to / operate on.
pub fn get_id(payload: &ResponsePayload) -> Result<String> {
    match payload {
        ResponsePayload::Create {
            unique_identifier, ..
        }
        | ResponsePayload::Register { unique_identifier }
        | ResponsePayload::Activate { unique_identifier }
        | ResponsePayload::Revoke { unique_identifier }
        | ResponsePayload::Destroy { unique_identifier } => Ok(unique_identifier.clone()),
        _ => Err(unexpected_payload("id-bearing")),
    }
}

/// Extracts a symmetric key from a `Get` response, requiring `Raw` format — this core never
/// requests wrapping, so anything else indicates the server ignored that and an
/// [`ErrorKind::ObjectMismatch`] is returned rather than handing back key-wrapping-data the
/// caller didn't ask for.
pub fn get_key(payload: &ResponsePayload) -> Result<RetrievedKey> {
    match payload {
        ResponsePayload::Get {
            object_type: ObjectType::SymmetricKey,
            object: ManagedObject::SymmetricKey(block),
        } => {
            if block.key_format_type != KeyFormatType::Raw {
                return Err(ErrorKind::ObjectMismatch(format!(
                    "expected Raw key format, found {}",
                    block.key_format_type
                ))
                .into());
            }
            if block.key_wrapping_data_present {
                return Err(ErrorKind::ObjectMismatch(
                    "server returned key wrapping data for an unwrapped Get request".into(),
                )
                .into());
            }
            Ok(RetrievedKey {
                key_format_type: block.key_format_type,
                cryptographic_length_bits: block.cryptographic_length,
                key_material: block.key_value.key_material.clone(),
                attributes: block.key_value.attributes.clone(),
            })
        }
        ResponsePayload::Get { object_type, .. } => Err(ErrorKind::ObjectMismatch(format!(
            "expected a SymmetricKey, found {}",
            object_type
        ))
        .into()),
        _ => Err(unexpected_payload("Get")),
    }
}

/// Extracts opaque secret data from a `Get` response, requiring `Opaque` format.
pub fn get_secret(payload: &ResponsePayload) -> Result<RetrievedSecret> {
    match payload {
        ResponsePayload::Get {
            object_type: ObjectType::SecretData,
            object:
                ManagedObject::SecretData {
                    secret_data_type,
                    key_block,
                },
        } => {
            if key_block.key_format_type != KeyFormatType::Opaque {
                return Err(ErrorKind::ObjectMismatch(format!(
                    "expected Opaque key format, found {}",
                    key_block.key_format_type
                ))
                .into());
            }
            Ok(RetrievedSecret {
                secret_data_type: *secret_data_type,
                data: key_block.key_value.key_material.clone(),
            })
        }
        ResponsePayload::Get { object_type, .. } => Err(ErrorKind::ObjectMismatch(format!(
            "expected SecretData, found {}",
            object_type
        ))
        .into()),
        _ => Err(unexpected_payload("Get")),
    }
}

/// The result of a `GetAttributes` request for one attribute. `NotConverted` is returned for any
/// attribute this core doesn't have a typed mapping for, as a sentinel rather than a failure, so
/// callers can still confirm an attribute exists without this core needing to model every
/// attribute defined by KMIP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeResult {
    Name(crate::model::Name),
    State(crate::model::State),
    UniqueIdentifier(String),
    NotConverted,
}

/// Extracts the single attribute value from a `GetAttributes` response.
pub fn get_attribute(payload: &ResponsePayload) -> Result<AttributeResult> {
    match payload {
        ResponsePayload::GetAttributes {
            attribute_value, ..
        } => Ok(match attribute_value {
            AttributeValueWire::Name(name) => AttributeResult::Name(name.clone()),
            AttributeValueWire::State(state) => AttributeResult::State(*state),
            AttributeValueWire::UniqueIdentifier(id) => AttributeResult::UniqueIdentifier(id.clone()),
            AttributeValueWire::NotConverted => AttributeResult::NotConverted,
        }),
        _ => Err(unexpected_payload("GetAttributes")),
    }
}

/// One page of `Locate` results: the ids found on this page, and, when the server reported it,
/// the total count of matching items across all pages.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LocatePage {
    pub unique_identifiers: Vec<String>,
    pub located_items: Option<i32>,
}

/// Extracts one page of ids from a `Locate` response, truncating to at most `maximum_items` — the
/// same cap this page's request declared — in case a misbehaving server fills a page past what
/// it was asked for, which would otherwise desync [`crate::engine::locate_all_pages`]'s offset
/// math on the next request.
pub fn get_ids(payload: &ResponsePayload, maximum_items: i32) -> Result<LocatePage> {
    match payload {
        ResponsePayload::Locate {
            located_items,
            unique_identifiers,
        } => {
            let mut unique_identifiers = unique_identifiers.clone();
            unique_identifiers.truncate(maximum_items.max(0) as usize);
            Ok(LocatePage {
                unique_identifiers,
                located_items: *located_items,
            })
        }
        _ => Err(unexpected_payload("Locate")),
    }
}
