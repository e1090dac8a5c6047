//! One function per supported operation, each returning the [`crate::model::RequestPayload`] the
//! exchange engine wraps in a [`crate::model::RequestMessage`] and sends. Kept separate from
//! [`crate::client`] so the attribute lists and field orderings for each operation — the part of
//! this crate most likely to need a one-line tweak for a particular server's quirks — live in one
//! place rather than scattered across the client's public methods.
use crate::error::{ErrorKind, Result};
use crate::key_material::SymmetricKeyMaterial;
use crate::model::{
    self, aes_template_attribute, secret_template_attribute, Attribute, KeyBlock, ManagedObject,
    ObjectType, RequestPayload, RevocationReason, RevocationReasonCode,
};

/// Default Locate page size. Configurable per client — see
/// [`crate::client::Config::locate_page_size`].
pub const DEFAULT_LOCATE_PAGE_SIZE: i32 = 16;

fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        Err(ErrorKind::ArgInvalid(format!("{} must not be empty", what)).into())
    } else {
        Ok(())
    }
}

/// Builds a `Create` request for a new AES symmetric key of `key_length_bits` (128/192/256).
pub fn create_aes_key(name: &str, group: &str, key_length_bits: i32) -> Result<RequestPayload> {
    require_non_empty(name, "key name")?;
    match key_length_bits {
        128 | 192 | 256 => {}
        other => {
            return Err(ErrorKind::ArgInvalid(format!(
                "AES key length must be 128, 192 or 256 bits, got {}",
                other
            ))
            .into())
        }
    }
    Ok(RequestPayload::Create {
        object_type: ObjectType::SymmetricKey,
        template_attribute: aes_template_attribute(name, group, key_length_bits),
    })
}

/// Builds a `Register` request wrapping an existing AES key's raw bytes.
pub fn register_aes_key(
    name: &str,
    group: &str,
    key: SymmetricKeyMaterial,
) -> Result<RequestPayload> {
    require_non_empty(name, "key name")?;
    let key_length_bits = key.bit_length();
    Ok(RequestPayload::Register {
        object_type: ObjectType::SymmetricKey,
        template_attribute: aes_template_attribute(name, group, key_length_bits),
        object: ManagedObject::SymmetricKey(KeyBlock::raw_symmetric(
            key.into_bytes(),
            model::CryptographicAlgorithm::Aes,
        )),
    })
}

/// Builds a `Register` request wrapping arbitrary opaque secret data.
pub fn register_secret_data(name: &str, group: &str, secret: Vec<u8>) -> Result<RequestPayload> {
    require_non_empty(name, "secret name")?;
    if secret.is_empty() {
        return Err(ErrorKind::ArgInvalid("secret data must not be empty".into()).into());
    }
    Ok(RequestPayload::Register {
        object_type: ObjectType::SecretData,
        template_attribute: secret_template_attribute(name, group),
        object: ManagedObject::SecretData {
            secret_data_type: 0x01, // Password, the only SecretDataType this core registers
            key_block: KeyBlock::opaque_secret(secret),
        },
    })
}

/// Builds a `Get` request for the object with the given unique identifier.
pub fn get(unique_identifier: &str) -> Result<RequestPayload> {
    require_non_empty(unique_identifier, "unique identifier")?;
    Ok(RequestPayload::Get {
        unique_identifier: unique_identifier.to_string(),
    })
}

/// Builds an `Activate` request.
pub fn activate(unique_identifier: &str) -> Result<RequestPayload> {
    require_non_empty(unique_identifier, "unique identifier")?;
    Ok(RequestPayload::Activate {
        unique_identifier: unique_identifier.to_string(),
    })
}

/// Builds a `Revoke` request with the given reason code and optional free-text message. When
/// `reason == KeyCompromise` or `CaCompromise`, KMIP requires a `CompromiseOccurrenceDate`; this
/// core stamps the current time for those two reasons and omits the field otherwise.
pub fn revoke(
    unique_identifier: &str,
    reason: RevocationReasonCode,
    message: Option<String>,
) -> Result<RequestPayload> {
    require_non_empty(unique_identifier, "unique identifier")?;
    let compromise_occurrence_date = if matches!(
        reason,
        RevocationReasonCode::KeyCompromise | RevocationReasonCode::CaCompromise
    ) {
        Some(model::unix_time_now())
    } else {
        None
    };
    Ok(RequestPayload::Revoke {
        unique_identifier: unique_identifier.to_string(),
        revocation_reason: RevocationReason {
            code: reason,
            message,
        },
        compromise_occurrence_date,
    })
}

/// Builds a genuine `Destroy` request for the given unique identifier.
pub fn destroy(unique_identifier: &str) -> Result<RequestPayload> {
    require_non_empty(unique_identifier, "unique identifier")?;
    Ok(RequestPayload::Destroy {
        unique_identifier: unique_identifier.to_string(),
    })
}

/// Builds a `GetAttributes` request for a single named attribute (`"Name"`, `"State"`,
/// `"Unique Identifier"`, or any other attribute name the server understands — this core's
/// extractor only gives typed meaning to the first three).
pub fn get_attribute(unique_identifier: &str, attribute_name: &str) -> Result<RequestPayload> {
    require_non_empty(unique_identifier, "unique identifier")?;
    require_non_empty(attribute_name, "attribute name")?;
    Ok(RequestPayload::GetAttributes {
        unique_identifier: unique_identifier.to_string(),
        attribute_name: attribute_name.to_string(),
    })
}

/// Builds one page of a `Locate` request filtering by entity type and, when `name` is non-empty,
/// object `Name`; an empty `name` matches every object of `object_type` ("locate all of type").
/// The attribute list is always emitted `{ObjectType, Name}` in that order, never just `{Name}`
/// alone. [`crate::engine::locate_all_pages`] drives successive pages until a short page is
/// returned.
pub fn locate_by_name(
    object_type: ObjectType,
    name: &str,
    offset_items: i32,
    page_size: i32,
) -> RequestPayload {
    let mut attributes = vec![Attribute::ObjectType(object_type)];
    if !name.is_empty() {
        attributes.push(Attribute::Name(model::Name::uninterpreted(
            name.to_string(),
        )));
    }
    RequestPayload::Locate {
        maximum_items: page_size,
        offset_items,
        storage_status_mask: 0,
        group_member_option: None,
        attributes,
    }
}

/// Builds one page of a `Locate` request filtering by entity type and `ObjectGroup`.
pub fn locate_by_group(
    object_type: ObjectType,
    group: &str,
    offset_items: i32,
    page_size: i32,
) -> Result<RequestPayload> {
    require_non_empty(group, "object group")?;
    Ok(RequestPayload::Locate {
        maximum_items: page_size,
        offset_items,
        storage_status_mask: 0,
        group_member_option: None,
        attributes: vec![
            Attribute::ObjectType(object_type),
            Attribute::ObjectGroup(group.to_string()),
        ],
    })
}

/// Builds one page of an unfiltered-by-name `Locate` request returning every object of
/// `object_type` the caller's credentials can see.
pub fn locate_all(object_type: ObjectType, offset_items: i32, page_size: i32) -> RequestPayload {
    locate_by_name(object_type, "", offset_items, page_size)
}
