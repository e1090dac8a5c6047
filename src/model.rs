//! The in-memory message tree: request/response headers, batch items, operation payloads and the
//! managed-object/attribute types nested inside them. This is the typed layer [`crate::builders`]
//! constructs and [`crate::extractors`] reads back out of; [`crate::codec`] is the only thing that
//! knows how to turn it into and out of bytes.
use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::{
    read_optional_value, read_structure, read_value, remaining, skip_value, write_structure,
    write_value, Decoder,
};
use crate::error::{ErrorKind, Result};
use crate::tags;
use crate::ttlv::{TtlvEnumeration, TtlvInteger, TtlvLongInteger, TtlvTextString};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum $name {
            $($variant),+,
            /// A value defined by a later KMIP revision or a vendor extension that this core
            /// does not name. Carried through rather than treated as a hard decode error.
            Unknown(u32),
        }

        impl $name {
            pub fn code(self) -> u32 {
                match self {
                    $($name::$variant => $value),+,
                    $name::Unknown(v) => v,
                }
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                match v {
                    $($value => $name::$variant),+,
                    other => $name::Unknown(other),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($name::$variant => f.write_str(stringify!($variant))),+,
                    $name::Unknown(v) => write!(f, "Unknown(0x{:08X})", v),
                }
            }
        }
    };
}

wire_enum!(
    /// KMIP `Object Type` enumeration (section 9.1.3.2.26). Only `SymmetricKey` and `SecretData`
    /// are fully supported by this core's extractors; everything else decodes but is reported to
    /// callers as [`ErrorKind::Unsupported`].
    ObjectType {
        Certificate = 0x01,
        SymmetricKey = 0x02,
        PublicKey = 0x03,
        PrivateKey = 0x04,
        SplitKey = 0x05,
        Template = 0x06,
        SecretData = 0x07,
        OpaqueObject = 0x08,
        PGPKey = 0x09,
        CertificateRequest = 0x0A,
    }
);

wire_enum!(
    /// KMIP `Cryptographic Algorithm` enumeration (section 9.1.3.2.9). This core only ever
    /// builds requests using `Aes`; other values are accepted on decode so that attributes on
    /// objects of other algorithms can still be reported back to the caller.
    CryptographicAlgorithm {
        Des = 0x01,
        TripleDes = 0x02,
        Aes = 0x03,
        Rsa = 0x04,
        Dsa = 0x05,
        Ec = 0x0C,
    }
);

wire_enum!(
    /// KMIP `Name Type` enumeration (section 9.1.3.2.11).
    NameType {
        UninterpretedTextString = 0x01,
        Uri = 0x02,
    }
);

wire_enum!(
    /// KMIP `Key Format Type` enumeration (section 9.1.3.2.3). `Raw` and `Opaque` are the only
    /// formats this core's Get/Register extractors and builders accept; anything else surfaces
    /// as [`ErrorKind::ObjectMismatch`] from a Get extractor.
    KeyFormatType {
        Raw = 0x01,
        Opaque = 0x08,
        Pkcs1 = 0x02,
        Pkcs8 = 0x03,
        X509 = 0x04,
    }
);

wire_enum!(
    /// KMIP `State` enumeration (section 9.1.3.2.17), the lifecycle state of a managed object.
    State {
        PreActive = 0x01,
        Active = 0x02,
        Deactivated = 0x03,
        Compromised = 0x04,
        Destroyed = 0x05,
        DestroyedCompromised = 0x06,
    }
);

wire_enum!(
    /// KMIP `Result Status` enumeration (section 9.1.3.2.24).
    ResultStatus {
        Success = 0x00,
        OperationFailed = 0x01,
        OperationPending = 0x02,
        OperationUndone = 0x03,
    }
);

wire_enum!(
    /// KMIP `Result Reason` enumeration (section 9.1.3.2.25), present on non-Success batch items.
    ResultReason {
        ItemNotFound = 0x01,
        ResponseTooLarge = 0x02,
        AuthenticationNotSuccessful = 0x03,
        InvalidMessage = 0x04,
        OperationNotSupported = 0x05,
        MissingData = 0x06,
        InvalidField = 0x07,
        FeatureNotSupported = 0x08,
        OperationCanceledByRequester = 0x09,
        CryptographicFailure = 0x0A,
        IllegalOperation = 0x0B,
        PermissionDenied = 0x0C,
        ObjectArchived = 0x0D,
        IndexOutOfBounds = 0x0E,
        ApplicationNamespaceMismatch = 0x0F,
        KeyFormatTypeNotSupported = 0x10,
        KeyCompressionTypeNotSupported = 0x11,
        EncodingOptionError = 0x12,
        KeyValueNotPresent = 0x13,
        AttestationRequired = 0x14,
        AttestationFailed = 0x15,
        Sensitive = 0x16,
        NotExtractable = 0x17,
        ObjectAlreadyExists = 0x18,
        GeneralFailure = 0x100,
    }
);

wire_enum!(
    /// KMIP `Revocation Reason Code` enumeration (section 9.1.3.2.32).
    RevocationReasonCode {
        Unspecified = 0x01,
        KeyCompromise = 0x02,
        CaCompromise = 0x03,
        AffiliationChanged = 0x04,
        Superseded = 0x05,
        CessationOfOperation = 0x06,
        PrivilegeWithdrawn = 0x07,
    }
);

wire_enum!(
    /// KMIP `Operation` enumeration (section 9.1.3.2.27). Only the operations this core
    /// implements are named; anything else seen echoed in a response is `Unknown`.
    Operation {
        Create = 0x01,
        Register = 0x03,
        Locate = 0x08,
        Get = 0x0A,
        GetAttributes = 0x0B,
        Activate = 0x12,
        Revoke = 0x13,
        Destroy = 0x14,
    }
);

/// Cryptographic Usage Mask bit flags (section 9.1.3.2.8). Only the flags this core sets are
/// named; combine with `|`.
pub mod usage_mask {
    pub const ENCRYPT: i32 = 0x0000_0004;
    pub const DECRYPT: i32 = 0x0000_0008;
    pub const EXPORT: i32 = 0x0000_0040;
}

// --- ProtocolVersion ----------------------------------------------------------------------------

/// KMIP protocol version negotiated per client instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: i32,
    pub minor: i32,
}

impl ProtocolVersion {
    pub const V1_0: ProtocolVersion = ProtocolVersion { major: 1, minor: 0 };
    pub const V1_2: ProtocolVersion = ProtocolVersion { major: 1, minor: 2 };
    pub const V1_4: ProtocolVersion = ProtocolVersion { major: 1, minor: 4 };

    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::PROTOCOL_VERSION, |w| {
            write_value(w, tags::PROTOCOL_VERSION_MAJOR, &TtlvInteger(self.major))?;
            write_value(w, tags::PROTOCOL_VERSION_MINOR, &TtlvInteger(self.minor))?;
            Ok(())
        })?;
        Ok(())
    }

    pub(crate) fn decode(cursor: &mut Decoder<'_>) -> Result<Self> {
        let mut body = read_structure(cursor, tags::PROTOCOL_VERSION)?;
        let major: TtlvInteger = read_value(&mut body, tags::PROTOCOL_VERSION_MAJOR)?;
        let minor: TtlvInteger = read_value(&mut body, tags::PROTOCOL_VERSION_MINOR)?;
        Ok(ProtocolVersion {
            major: *major,
            minor: *minor,
        })
    }
}

pub(crate) fn unix_time_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// --- Name ---------------------------------------------------------------------------------------

/// The KMIP `Name` structure: a text value plus a tag describing how to interpret it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name {
    pub name_type: NameType,
    pub value: String,
}

impl Name {
    pub fn uninterpreted(value: impl Into<String>) -> Self {
        Name {
            name_type: NameType::UninterpretedTextString,
            value: value.into(),
        }
    }

    pub(crate) fn encode_at<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
        tag: crate::ttlv::TtlvTag,
    ) -> Result<()> {
        write_structure(dst, tag, |w| {
            write_value(w, tags::NAME_VALUE, &TtlvTextString(self.value.clone()))?;
            write_value(
                w,
                tags::NAME_TYPE,
                &TtlvEnumeration(self.name_type.code()),
            )?;
            Ok(())
        })?;
        Ok(())
    }

    pub(crate) fn decode_at(cursor: &mut Decoder<'_>, tag: crate::ttlv::TtlvTag) -> Result<Self> {
        let mut body = read_structure(cursor, tag)?;
        let value: TtlvTextString = read_value(&mut body, tags::NAME_VALUE)?;
        let name_type: TtlvEnumeration = read_value(&mut body, tags::NAME_TYPE)?;
        Ok(Name {
            name_type: NameType::from(*name_type),
            value: value.0,
        })
    }
}

// --- Attribute ------------------------------------------------------------------------------

/// One member of a `TemplateAttribute`'s attribute list (Create/Register), a Locate filter's
/// attribute list, or a `KeyValue`'s attribute list on a `Get` response. Each variant owns both
/// its `AttributeName` text and the TTLV shape of its `AttributeValue` — KMIP ties the two
/// together by convention, so this core does too rather than modelling a separate name/value pair
/// that could be mismatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    CryptographicAlgorithm(CryptographicAlgorithm),
    CryptographicLength(i32),
    CryptographicUsageMask(i32),
    Name(Name),
    ObjectGroup(String),
    ObjectType(ObjectType),
    /// An attribute this core has no typed rendering for, carried through by name only (its
    /// value is skipped) so a decoded attribute list doesn't silently lose entries. Never
    /// constructed by a builder; only [`Attribute::decode`] produces this variant.
    Other(String),
}

impl Attribute {
    fn name_text(&self) -> std::borrow::Cow<'static, str> {
        match self {
            Attribute::CryptographicAlgorithm(_) => "Cryptographic Algorithm".into(),
            Attribute::CryptographicLength(_) => "Cryptographic Length".into(),
            Attribute::CryptographicUsageMask(_) => "Cryptographic Usage Mask".into(),
            Attribute::Name(_) => "Name".into(),
            Attribute::ObjectGroup(_) => "Object Group".into(),
            Attribute::ObjectType(_) => "Object Type".into(),
            Attribute::Other(name) => name.clone().into(),
        }
    }

    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        if let Attribute::Other(name) = self {
            return Err(ErrorKind::Unsupported(format!(
                "encoding attribute '{}', which was only ever decoded, not built",
                name
            ))
            .into());
        }
        write_structure(dst, tags::ATTRIBUTE, |w| {
            write_value(
                w,
                tags::ATTRIBUTE_NAME,
                &TtlvTextString(self.name_text().into_owned()),
            )?;
            match self {
                Attribute::CryptographicAlgorithm(alg) => {
                    write_value(w, tags::ATTRIBUTE_VALUE, &TtlvEnumeration(alg.code()))?;
                }
                Attribute::CryptographicLength(len) => {
                    write_value(w, tags::ATTRIBUTE_VALUE, &TtlvInteger(*len))?;
                }
                Attribute::CryptographicUsageMask(mask) => {
                    write_value(w, tags::ATTRIBUTE_VALUE, &TtlvInteger(*mask))?;
                }
                Attribute::Name(name) => {
                    name.encode_at(w, tags::ATTRIBUTE_VALUE)?;
                }
                Attribute::ObjectGroup(group) => {
                    write_value(w, tags::ATTRIBUTE_VALUE, &TtlvTextString(group.clone()))?;
                }
                Attribute::ObjectType(ty) => {
                    write_value(w, tags::ATTRIBUTE_VALUE, &TtlvEnumeration(ty.code()))?;
                }
                Attribute::Other(_) => unreachable!("rejected above"),
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Decodes one `Attribute` structure: name, an optional `AttributeIndex` (this core treats
    /// every attribute as single-valued and discards it), then a value dispatched on the name.
    /// An unrecognized name is kept as [`Attribute::Other`] with its value skipped rather than
    /// failing the whole decode — the same "tolerate what we don't model" discipline
    /// [`crate::codec::skip_value`] applies to unknown tags generally.
    pub(crate) fn decode(cursor: &mut Decoder<'_>) -> Result<Self> {
        let mut body = read_structure(cursor, tags::ATTRIBUTE)?;
        let name: TtlvTextString = read_value(&mut body, tags::ATTRIBUTE_NAME)?;
        let _index: Option<TtlvInteger> = read_optional_value(&mut body, tags::ATTRIBUTE_INDEX)?;
        Ok(match name.0.as_str() {
            "Cryptographic Algorithm" => {
                let v: TtlvEnumeration = read_value(&mut body, tags::ATTRIBUTE_VALUE)?;
                Attribute::CryptographicAlgorithm(CryptographicAlgorithm::from(*v))
            }
            "Cryptographic Length" => {
                let v: TtlvInteger = read_value(&mut body, tags::ATTRIBUTE_VALUE)?;
                Attribute::CryptographicLength(*v)
            }
            "Cryptographic Usage Mask" => {
                let v: TtlvInteger = read_value(&mut body, tags::ATTRIBUTE_VALUE)?;
                Attribute::CryptographicUsageMask(*v)
            }
            "Name" => Attribute::Name(Name::decode_at(&mut body, tags::ATTRIBUTE_VALUE)?),
            "Object Group" => {
                let v: TtlvTextString = read_value(&mut body, tags::ATTRIBUTE_VALUE)?;
                Attribute::ObjectGroup(v.0)
            }
            "Object Type" => {
                let v: TtlvEnumeration = read_value(&mut body, tags::ATTRIBUTE_VALUE)?;
                Attribute::ObjectType(ObjectType::from(*v))
            }
            other => {
                skip_value(&mut body)?;
                Attribute::Other(other.to_string())
            }
        })
    }
}

// --- TemplateAttribute --------------------------------------------------------------------------

/// The ordered attribute list carried by Create and Register requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateAttribute {
    pub attributes: Vec<Attribute>,
}

impl TemplateAttribute {
    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::TEMPLATE_ATTRIBUTE, |w| {
            for attribute in &self.attributes {
                attribute.encode(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// Builds the standard attribute set for Create/Register of an AES symmetric key: algorithm,
/// length, usage mask, name, and (when non-empty) object group — always in this order.
pub fn aes_template_attribute(name: &str, group: &str, key_length_bits: i32) -> TemplateAttribute {
    let mut attributes = vec![
        Attribute::CryptographicAlgorithm(CryptographicAlgorithm::Aes),
        Attribute::CryptographicLength(key_length_bits),
        Attribute::CryptographicUsageMask(usage_mask::ENCRYPT | usage_mask::DECRYPT),
        Attribute::Name(Name::uninterpreted(name.to_string())),
    ];
    if !group.is_empty() {
        attributes.push(Attribute::ObjectGroup(group.to_string()));
    }
    TemplateAttribute { attributes }
}

/// Builds the attribute set for registering opaque secret data: usage mask (including Export),
/// name, and (when non-empty) object group.
pub fn secret_template_attribute(name: &str, group: &str) -> TemplateAttribute {
    let mut attributes = vec![
        Attribute::CryptographicUsageMask(usage_mask::ENCRYPT | usage_mask::DECRYPT | usage_mask::EXPORT),
        Attribute::Name(Name::uninterpreted(name.to_string())),
    ];
    if !group.is_empty() {
        attributes.push(Attribute::ObjectGroup(group.to_string()));
    }
    TemplateAttribute { attributes }
}

// --- KeyBlock / KeyValue --------------------------------------------------------------------

/// The raw material and attributes carried inside a `KeyBlock`'s `KeyValue`. This core never
/// emits or reads a structured `KeyMaterial` (only the `Raw`/`Opaque` byte-string form used by
/// symmetric keys and secret data), so `key_material` is always plain bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyValue {
    pub key_material: Vec<u8>,
    pub attributes: Vec<Attribute>,
}

/// The KMIP `KeyBlock` structure wrapping key or secret material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBlock {
    pub key_format_type: KeyFormatType,
    pub key_compression_type: Option<i32>,
    pub key_value: KeyValue,
    pub key_wrapping_data_present: bool,
    pub cryptographic_algorithm: Option<CryptographicAlgorithm>,
    pub cryptographic_length: Option<i32>,
}

impl KeyBlock {
    /// A `Raw`-format key block for a freshly-built `Register` request: no compression, no
    /// wrapping, the given algorithm/bit-length recorded alongside the byte material.
    pub fn raw_symmetric(key: Vec<u8>, algorithm: CryptographicAlgorithm) -> Self {
        let bits = (key.len() as i32) * 8;
        KeyBlock {
            key_format_type: KeyFormatType::Raw,
            key_compression_type: None,
            key_value: KeyValue {
                key_material: key,
                attributes: Vec::new(),
            },
            key_wrapping_data_present: false,
            cryptographic_algorithm: Some(algorithm),
            cryptographic_length: Some(bits),
        }
    }

    /// An `Opaque`-format key block for registering secret data: no algorithm/length attributes.
    pub fn opaque_secret(secret: Vec<u8>) -> Self {
        KeyBlock {
            key_format_type: KeyFormatType::Opaque,
            key_compression_type: None,
            key_value: KeyValue {
                key_material: secret,
                attributes: Vec::new(),
            },
            key_wrapping_data_present: false,
            cryptographic_algorithm: None,
            cryptographic_length: None,
        }
    }

    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::KEY_BLOCK, |w| {
            write_value(
                w,
                tags::KEY_FORMAT_TYPE,
                &TtlvEnumeration(self.key_format_type.code()),
            )?;
            if let Some(compression) = self.key_compression_type {
                write_value(w, tags::KEY_COMPRESSION_TYPE, &TtlvEnumeration(compression as u32))?;
            }
            write_structure(w, tags::KEY_VALUE, |w| {
                write_value(
                    w,
                    tags::KEY_MATERIAL,
                    &crate::ttlv::TtlvByteString(self.key_value.key_material.clone()),
                )?;
                for attribute in &self.key_value.attributes {
                    attribute.encode(w)?;
                }
                Ok(())
            })?;
            if let Some(algorithm) = self.cryptographic_algorithm {
                write_value(
                    w,
                    tags::CRYPTOGRAPHIC_ALGORITHM,
                    &TtlvEnumeration(algorithm.code()),
                )?;
            }
            if let Some(length) = self.cryptographic_length {
                write_value(w, tags::CRYPTOGRAPHIC_LENGTH, &TtlvInteger(length))?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Decodes a `KeyBlock` in its canonical KMIP field order: `KeyFormatType`,
    /// `[KeyCompressionType]`, `KeyValue`, `[CryptographicAlgorithm]`, `[CryptographicLength]`,
    /// `[KeyWrappingData]` — wrapping data is the *last* field, so its presence can only be
    /// known once the crypto algorithm/length have already been read past. A wrapped `KeyValue`
    /// is itself encoded as a plain `ByteString` rather than a `Structure` (KMIP carries no
    /// attributes alongside wrapped ciphertext), so the `KeyValue` tag's TTLV type is checked
    /// before deciding which shape to parse.
    pub(crate) fn decode(cursor: &mut Decoder<'_>) -> Result<Self> {
        let mut body = read_structure(cursor, tags::KEY_BLOCK)?;
        let key_format_type: TtlvEnumeration = read_value(&mut body, tags::KEY_FORMAT_TYPE)?;
        let key_compression_type: Option<TtlvEnumeration> =
            read_optional_value(&mut body, tags::KEY_COMPRESSION_TYPE)?;

        let key_value = match crate::codec::peek_tag_type(&mut body)? {
            Some((tag, crate::ttlv::TtlvType::Structure)) if tag == tags::KEY_VALUE => {
                let mut kv_body = read_structure(&mut body, tags::KEY_VALUE)?;
                let key_material: crate::ttlv::TtlvByteString =
                    read_value(&mut kv_body, tags::KEY_MATERIAL)?;
                let mut attributes = Vec::new();
                while remaining(&kv_body) > 0 {
                    attributes.push(Attribute::decode(&mut kv_body)?);
                }
                KeyValue {
                    key_material: key_material.0,
                    attributes,
                }
            }
            _ => {
                // Wrapped form: `KeyValue` is a bare `ByteString`, no nested attributes.
                let key_material: crate::ttlv::TtlvByteString =
                    read_value(&mut body, tags::KEY_VALUE)?;
                KeyValue {
                    key_material: key_material.0,
                    attributes: Vec::new(),
                }
            }
        };

        let cryptographic_algorithm: Option<TtlvEnumeration> =
            read_optional_value(&mut body, tags::CRYPTOGRAPHIC_ALGORITHM)?;
        let cryptographic_length: Option<TtlvInteger> =
            read_optional_value(&mut body, tags::CRYPTOGRAPHIC_LENGTH)?;
        let key_wrapping_data_present =
            matches!(crate::codec::peek_tag_type(&mut body)?, Some((tag, _)) if tag == tags::KEY_WRAPPING_DATA);
        if key_wrapping_data_present {
            skip_value(&mut body)?;
        }
        Ok(KeyBlock {
            key_format_type: KeyFormatType::from(*key_format_type),
            key_compression_type: key_compression_type.map(|v| *v as i32),
            key_value,
            key_wrapping_data_present,
            cryptographic_algorithm: cryptographic_algorithm.map(|v| CryptographicAlgorithm::from(*v)),
            cryptographic_length: cryptographic_length.map(|v| *v),
        })
    }
}

// --- ManagedObject --------------------------------------------------------------------------

/// A managed object as carried by a Register request or a Get response. Only `SymmetricKey` and
/// `SecretData` are modelled with their real payload; every other KMIP object type decodes to
/// [`ManagedObject::Unsupported`] rather than failing the whole response, since a caller asking
/// `Get` for a certificate id should see `Unsupported`, not a decode error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagedObject {
    SymmetricKey(KeyBlock),
    SecretData {
        secret_data_type: i32,
        key_block: KeyBlock,
    },
    Unsupported(ObjectType),
}

impl ManagedObject {
    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        match self {
            ManagedObject::SymmetricKey(block) => {
                write_structure(dst, tags::SYMMETRIC_KEY, |w| block.encode(w))?;
            }
            ManagedObject::SecretData {
                secret_data_type,
                key_block,
            } => {
                write_structure(dst, tags::SECRET_DATA, |w| {
                    write_value(w, tags::SECRET_DATA_TYPE, &TtlvEnumeration(*secret_data_type as u32))?;
                    key_block.encode(w)
                })?;
            }
            ManagedObject::Unsupported(ty) => {
                return Err(ErrorKind::Unsupported(format!("encoding a {} managed object", ty)).into());
            }
        }
        Ok(())
    }

    pub(crate) fn decode(cursor: &mut Decoder<'_>, object_type: ObjectType) -> Result<Self> {
        match object_type {
            ObjectType::SymmetricKey => {
                let mut body = read_structure(cursor, tags::SYMMETRIC_KEY)?;
                Ok(ManagedObject::SymmetricKey(KeyBlock::decode(&mut body)?))
            }
            ObjectType::SecretData => {
                let mut body = read_structure(cursor, tags::SECRET_DATA)?;
                let secret_data_type: TtlvEnumeration =
                    read_value(&mut body, tags::SECRET_DATA_TYPE)?;
                let key_block = KeyBlock::decode(&mut body)?;
                Ok(ManagedObject::SecretData {
                    secret_data_type: *secret_data_type as i32,
                    key_block,
                })
            }
            other => Ok(ManagedObject::Unsupported(other)),
        }
    }
}

// --- RevocationReason ------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevocationReason {
    pub code: RevocationReasonCode,
    pub message: Option<String>,
}

impl RevocationReason {
    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::REVOCATION_REASON, |w| {
            write_value(
                w,
                tags::REVOCATION_REASON_CODE,
                &TtlvEnumeration(self.code.code()),
            )?;
            if let Some(message) = &self.message {
                write_value(w, tags::REVOCATION_MESSAGE, &TtlvTextString(message.clone()))?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

// --- Request message tree -------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestHeader {
    pub protocol_version: ProtocolVersion,
    pub maximum_response_size: Option<i32>,
    pub time_stamp: i64,
    pub batch_count: i32,
}

impl RequestHeader {
    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::REQUEST_HEADER, |w| {
            self.protocol_version.encode(w)?;
            if let Some(max) = self.maximum_response_size {
                write_value(w, tags::MAXIMUM_RESPONSE_SIZE, &TtlvInteger(max))?;
            }
            write_value(w, tags::TIME_STAMP, &TtlvLongInteger(self.time_stamp))?;
            write_value(w, tags::BATCH_COUNT, &TtlvInteger(self.batch_count))?;
            Ok(())
        })?;
        Ok(())
    }
}

/// A request payload, one variant per supported operation. The variant dictates which `Operation`
/// tag the enclosing `RequestBatchItem` carries — see [`RequestPayload::operation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestPayload {
    Create {
        object_type: ObjectType,
        template_attribute: TemplateAttribute,
    },
    Register {
        object_type: ObjectType,
        template_attribute: TemplateAttribute,
        object: ManagedObject,
    },
    Get {
        unique_identifier: String,
    },
    Activate {
        unique_identifier: String,
    },
    Revoke {
        unique_identifier: String,
        revocation_reason: RevocationReason,
        compromise_occurrence_date: Option<i64>,
    },
    Destroy {
        unique_identifier: String,
    },
    GetAttributes {
        unique_identifier: String,
        attribute_name: String,
    },
    Locate {
        maximum_items: i32,
        offset_items: i32,
        storage_status_mask: i32,
        group_member_option: Option<i32>,
        attributes: Vec<Attribute>,
    },
}

impl RequestPayload {
    pub fn operation(&self) -> Operation {
        match self {
            RequestPayload::Create { .. } => Operation::Create,
            RequestPayload::Register { .. } => Operation::Register,
            RequestPayload::Get { .. } => Operation::Get,
            RequestPayload::Activate { .. } => Operation::Activate,
            RequestPayload::Revoke { .. } => Operation::Revoke,
            RequestPayload::Destroy { .. } => Operation::Destroy,
            RequestPayload::GetAttributes { .. } => Operation::GetAttributes,
            RequestPayload::Locate { .. } => Operation::Locate,
        }
    }

    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::REQUEST_PAYLOAD, |w| match self {
            RequestPayload::Create {
                object_type,
                template_attribute,
            } => {
                write_value(w, tags::OBJECT_TYPE, &TtlvEnumeration(object_type.code()))?;
                template_attribute.encode(w)
            }
            RequestPayload::Register {
                object_type,
                template_attribute,
                object,
            } => {
                write_value(w, tags::OBJECT_TYPE, &TtlvEnumeration(object_type.code()))?;
                template_attribute.encode(w)?;
                object.encode(w)
            }
            RequestPayload::Get { unique_identifier } => write_value(
                w,
                tags::UNIQUE_IDENTIFIER,
                &TtlvTextString(unique_identifier.clone()),
            ),
            RequestPayload::Activate { unique_identifier } => write_value(
                w,
                tags::UNIQUE_IDENTIFIER,
                &TtlvTextString(unique_identifier.clone()),
            ),
            RequestPayload::Revoke {
                unique_identifier,
                revocation_reason,
                compromise_occurrence_date,
            } => {
                write_value(
                    w,
                    tags::UNIQUE_IDENTIFIER,
                    &TtlvTextString(unique_identifier.clone()),
                )?;
                revocation_reason.encode(w)?;
                if let Some(date) = compromise_occurrence_date {
                    write_value(
                        w,
                        tags::COMPROMISE_OCCURRENCE_DATE,
                        &crate::ttlv::TtlvDateTime(*date),
                    )?;
                }
                Ok(())
            }
            RequestPayload::Destroy { unique_identifier } => write_value(
                w,
                tags::UNIQUE_IDENTIFIER,
                &TtlvTextString(unique_identifier.clone()),
            ),
            RequestPayload::GetAttributes {
                unique_identifier,
                attribute_name,
            } => {
                write_value(
                    w,
                    tags::UNIQUE_IDENTIFIER,
                    &TtlvTextString(unique_identifier.clone()),
                )?;
                write_value(
                    w,
                    tags::ATTRIBUTE_NAME,
                    &TtlvTextString(attribute_name.clone()),
                )
            }
            RequestPayload::Locate {
                maximum_items,
                offset_items,
                storage_status_mask,
                group_member_option,
                attributes,
            } => {
                write_value(w, tags::MAXIMUM_ITEMS, &TtlvInteger(*maximum_items))?;
                write_value(w, tags::OFFSET_ITEMS, &TtlvInteger(*offset_items))?;
                write_value(
                    w,
                    tags::STORAGE_STATUS_MASK,
                    &TtlvInteger(*storage_status_mask),
                )?;
                if let Some(option) = group_member_option {
                    write_value(w, tags::GROUP_MEMBER_OPTION, &TtlvEnumeration(*option as u32))?;
                }
                for attribute in attributes {
                    attribute.encode(w)?;
                }
                Ok(())
            }
        })?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestBatchItem {
    pub payload: RequestPayload,
}

impl RequestBatchItem {
    pub(crate) fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::BATCH_ITEM, |w| {
            write_value(
                w,
                tags::OPERATION,
                &TtlvEnumeration(self.payload.operation().code()),
            )?;
            self.payload.encode(w)
        })?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestMessage {
    pub header: RequestHeader,
    pub batch_items: Vec<RequestBatchItem>,
}

impl RequestMessage {
    /// Builds a single-batch-item request with the given payload, stamping the current Unix
    /// time and this protocol version and defaulting `batch_count` to 1 — the only batch shape
    /// this core's exchange engine drives.
    pub fn single(protocol_version: ProtocolVersion, payload: RequestPayload) -> Self {
        RequestMessage {
            header: RequestHeader {
                protocol_version,
                maximum_response_size: None,
                time_stamp: unix_time_now(),
                batch_count: 1,
            },
            batch_items: vec![RequestBatchItem { payload }],
        }
    }

    pub fn encode<W: std::io::Write + crate::codec::PatchableLength>(
        &self,
        dst: &mut W,
    ) -> Result<()> {
        write_structure(dst, tags::REQUEST_MESSAGE, |w| {
            self.header.encode(w)?;
            for item in &self.batch_items {
                item.encode(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

// --- Response message tree ------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseHeader {
    pub protocol_version: ProtocolVersion,
    pub time_stamp: i64,
    pub batch_count: i32,
}

impl ResponseHeader {
    pub(crate) fn decode(cursor: &mut Decoder<'_>) -> Result<Self> {
        let mut body = read_structure(cursor, tags::RESPONSE_HEADER)?;
        let protocol_version = ProtocolVersion::decode(&mut body)?;
        let time_stamp: TtlvLongInteger = read_value(&mut body, tags::TIME_STAMP)?;
        let batch_count: TtlvInteger = read_value(&mut body, tags::BATCH_COUNT)?;
        Ok(ResponseHeader {
            protocol_version,
            time_stamp: *time_stamp,
            batch_count: *batch_count,
        })
    }
}

/// A response payload, decoded according to the operation the batch item echoed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponsePayload {
    Create {
        object_type: ObjectType,
        unique_identifier: String,
    },
    Register {
        unique_identifier: String,
    },
    Get {
        object_type: ObjectType,
        object: ManagedObject,
    },
    Activate {
        unique_identifier: String,
    },
    Revoke {
        unique_identifier: String,
    },
    Destroy {
        unique_identifier: String,
    },
    GetAttributes {
        unique_identifier: String,
        attribute_name: String,
        attribute_value: AttributeValueWire,
    },
    Locate {
        located_items: Option<i32>,
        unique_identifiers: Vec<String>,
    },
}

/// The decoded `AttributeValue` of a `GetAttributes` response, dispatched by the attribute's
/// name as described in the extractor contract: only `Name`, `State` and `Unique Identifier`
/// are given a typed rendering, everything else is [`AttributeValueWire::NotConverted`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValueWire {
    Name(Name),
    State(State),
    UniqueIdentifier(String),
    NotConverted,
}

impl ResponsePayload {
    pub(crate) fn decode(cursor: &mut Decoder<'_>, operation: Operation) -> Result<Self> {
        let mut body = read_structure(cursor, tags::RESPONSE_PAYLOAD)?;
        match operation {
            Operation::Create => {
                let object_type: TtlvEnumeration = read_value(&mut body, tags::OBJECT_TYPE)?;
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                Ok(ResponsePayload::Create {
                    object_type: ObjectType::from(*object_type),
                    unique_identifier: unique_identifier.0,
                })
            }
            Operation::Register => {
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                Ok(ResponsePayload::Register {
                    unique_identifier: unique_identifier.0,
                })
            }
            Operation::Get => {
                let object_type: TtlvEnumeration = read_value(&mut body, tags::OBJECT_TYPE)?;
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                let object_type = ObjectType::from(*object_type);
                let object = ManagedObject::decode(&mut body, object_type)?;
                let _ = unique_identifier;
                Ok(ResponsePayload::Get {
                    object_type,
                    object,
                })
            }
            Operation::Activate => {
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                Ok(ResponsePayload::Activate {
                    unique_identifier: unique_identifier.0,
                })
            }
            Operation::Revoke => {
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                Ok(ResponsePayload::Revoke {
                    unique_identifier: unique_identifier.0,
                })
            }
            Operation::Destroy => {
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                Ok(ResponsePayload::Destroy {
                    unique_identifier: unique_identifier.0,
                })
            }
            Operation::GetAttributes => {
                let unique_identifier: TtlvTextString =
                    read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                let mut attr_body = read_structure(&mut body, tags::ATTRIBUTE)?;
                let attribute_name: TtlvTextString =
                    read_value(&mut attr_body, tags::ATTRIBUTE_NAME)?;
                let attribute_value = match attribute_name.0.as_str() {
                    "Name" => AttributeValueWire::Name(Name::decode_at(
                        &mut attr_body,
                        tags::ATTRIBUTE_VALUE,
                    )?),
                    "State" => {
                        let state: TtlvEnumeration =
                            read_value(&mut attr_body, tags::ATTRIBUTE_VALUE)?;
                        AttributeValueWire::State(State::from(*state))
                    }
                    "Unique Identifier" => {
                        let id: TtlvTextString =
                            read_value(&mut attr_body, tags::ATTRIBUTE_VALUE)?;
                        AttributeValueWire::UniqueIdentifier(id.0)
                    }
                    _ => {
                        skip_value(&mut attr_body)?;
                        AttributeValueWire::NotConverted
                    }
                };
                Ok(ResponsePayload::GetAttributes {
                    unique_identifier: unique_identifier.0,
                    attribute_name: attribute_name.0,
                    attribute_value,
                })
            }
            Operation::Locate => {
                let located_items: Option<TtlvInteger> =
                    read_optional_value(&mut body, tags::LOCATED_ITEMS)?;
                let mut unique_identifiers = Vec::new();
                while remaining(&body) > 0 {
                    let id: TtlvTextString = read_value(&mut body, tags::UNIQUE_IDENTIFIER)?;
                    unique_identifiers.push(id.0);
                }
                Ok(ResponsePayload::Locate {
                    located_items: located_items.map(|v| *v),
                    unique_identifiers,
                })
            }
            Operation::Unknown(code) => Err(ErrorKind::Unsupported(format!(
                "decoding a response for unknown operation 0x{:08X}",
                code
            ))
            .into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseBatchItem {
    pub operation: Operation,
    pub result_status: ResultStatus,
    pub result_reason: Option<ResultReason>,
    pub result_message: Option<String>,
    pub payload: Option<ResponsePayload>,
}

impl ResponseBatchItem {
    pub(crate) fn decode(cursor: &mut Decoder<'_>) -> Result<Self> {
        let mut body = read_structure(cursor, tags::BATCH_ITEM)?;
        let operation: TtlvEnumeration = read_value(&mut body, tags::OPERATION)?;
        let operation = Operation::from(*operation);
        let result_status: TtlvEnumeration = read_value(&mut body, tags::RESULT_STATUS)?;
        let result_status = ResultStatus::from(*result_status);
        let result_reason: Option<TtlvEnumeration> =
            read_optional_value(&mut body, tags::RESULT_REASON)?;
        let result_message: Option<TtlvTextString> =
            read_optional_value(&mut body, tags::RESULT_MESSAGE)?;
        let payload = if result_status == ResultStatus::Success {
            Some(ResponsePayload::decode(&mut body, operation)?)
        } else {
            None
        };
        Ok(ResponseBatchItem {
            operation,
            result_status,
            result_reason: result_reason.map(|v| ResultReason::from(*v)),
            result_message: result_message.map(|v| v.0),
            payload,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseMessage {
    pub header: ResponseHeader,
    pub batch_items: Vec<ResponseBatchItem>,
}

impl ResponseMessage {
    pub fn decode(cursor: &mut Decoder<'_>) -> Result<Self> {
        let mut body = read_structure(cursor, tags::RESPONSE_MESSAGE)?;
        let header = ResponseHeader::decode(&mut body)?;
        let mut batch_items = Vec::with_capacity(header.batch_count.max(0) as usize);
        while remaining(&body) > 0 {
            batch_items.push(ResponseBatchItem::decode(&mut body)?);
        }
        if batch_items.len() as i32 != header.batch_count {
            return Err(ErrorKind::MalformedResponse(format!(
                "header declared batch_count {} but {} batch items were present",
                header.batch_count,
                batch_items.len()
            ))
            .into());
        }
        Ok(ResponseMessage {
            header,
            batch_items,
        })
    }
}
