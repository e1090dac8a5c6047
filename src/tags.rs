//! KMIP tag constants used by this core.
//!
//! The KMIP specifications reserve tag range 0x420000-0x42FFFF for official tags. Only the tags
//! this crate's message model, operation builders and extractors actually touch are listed here;
//! anything else encountered on the wire is an unknown field and is skipped by
//! [`crate::codec::skip_value`] rather than treated as a hard error, since minor profile
//! differences between server vendors are common in practice.
use crate::ttlv::TtlvTag;

macro_rules! tag {
    ($name:ident, $value:expr) => {
        pub const $name: TtlvTag = TtlvTag::new($value);
    };
}

tag!(REQUEST_MESSAGE, 0x420078);
tag!(REQUEST_HEADER, 0x420077);
tag!(RESPONSE_MESSAGE, 0x42007B);
tag!(RESPONSE_HEADER, 0x42007A);
tag!(PROTOCOL_VERSION, 0x420069);
tag!(PROTOCOL_VERSION_MAJOR, 0x42006A);
tag!(PROTOCOL_VERSION_MINOR, 0x42006B);
tag!(MAXIMUM_RESPONSE_SIZE, 0x420050);
tag!(TIME_STAMP, 0x420092);
tag!(BATCH_COUNT, 0x42000D);
tag!(BATCH_ITEM, 0x42000F);
tag!(OPERATION, 0x42005C);
tag!(REQUEST_PAYLOAD, 0x420079);
tag!(RESPONSE_PAYLOAD, 0x42007C);
tag!(RESULT_STATUS, 0x42007F);
tag!(RESULT_REASON, 0x42007E);
tag!(RESULT_MESSAGE, 0x42007D);

tag!(UNIQUE_IDENTIFIER, 0x420094);
tag!(OBJECT_TYPE, 0x420057);
tag!(TEMPLATE_ATTRIBUTE, 0x420091);
tag!(ATTRIBUTE, 0x420008);
tag!(ATTRIBUTE_NAME, 0x42000A);
tag!(ATTRIBUTE_INDEX, 0x420009);
tag!(ATTRIBUTE_VALUE, 0x42000B);

tag!(NAME, 0x420053);
tag!(NAME_VALUE, 0x420055);
tag!(NAME_TYPE, 0x420054);
tag!(OBJECT_GROUP, 0x42003A);
tag!(OBJECT_GROUP_MEMBER, 0x42003C);
tag!(CRYPTOGRAPHIC_ALGORITHM, 0x420028);
tag!(CRYPTOGRAPHIC_LENGTH, 0x42002A);
tag!(CRYPTOGRAPHIC_USAGE_MASK, 0x420081);
tag!(STATE, 0x42008D);

tag!(KEY_BLOCK, 0x420040);
tag!(KEY_FORMAT_TYPE, 0x420042);
tag!(KEY_COMPRESSION_TYPE, 0x420041);
tag!(KEY_VALUE, 0x420045);
tag!(KEY_MATERIAL, 0x420043);
tag!(KEY_WRAPPING_DATA, 0x420046);
tag!(SYMMETRIC_KEY, 0x42008F);
tag!(SECRET_DATA, 0x420085);
tag!(SECRET_DATA_TYPE, 0x420086);

tag!(REVOCATION_REASON, 0x420082);
tag!(REVOCATION_REASON_CODE, 0x420083);
// Part of the RevocationReason structure per KMIP 1.4 section 9.1.3.2.32 (Revocation Reason).
tag!(REVOCATION_MESSAGE, 0x420084);
tag!(COMPROMISE_OCCURRENCE_DATE, 0x420021);

tag!(MAXIMUM_ITEMS, 0x4200D3);
tag!(OFFSET_ITEMS, 0x420067);
tag!(LOCATED_ITEMS, 0x42006D);
tag!(STORAGE_STATUS_MASK, 0x42008A);
tag!(GROUP_MEMBER_OPTION, 0x42008B);
