//! End-to-end tests driving [`KmipClient`] over an in-memory [`Transport`], the way
//! `kmip-client`'s own `engine`/`framing` unit tests drive `ChannelTransport` internally — this
//! file plays the same role from outside the crate, fabricating whole KMIP response messages
//! with the crate's own public `ttlv`/`codec` building blocks rather than a private test double.
use std::collections::VecDeque;
use std::fmt;

use kmip_client::client::{ClientBuilder, KmipClient};
use kmip_client::codec::{write_structure, write_value};
use kmip_client::error::ErrorKind;
use kmip_client::key_material::SymmetricKeyMaterial;
use kmip_client::model::{Attribute, ObjectType, ProtocolVersion, RevocationReasonCode};
use kmip_client::tags;
use kmip_client::transport::Transport;
use kmip_client::ttlv::buffer::EncodeBuffer;
use kmip_client::ttlv::{TtlvByteString, TtlvEnumeration, TtlvInteger, TtlvLongInteger, TtlvTextString};

/// A queue-backed [`Transport`]: bytes pushed with `push_response` are handed back in order to
/// `recv`, and everything written with `send` is appended to `sent` for assertions.
#[derive(Default)]
struct FakeServer {
    inbound: VecDeque<u8>,
    #[allow(dead_code)]
    sent: Vec<u8>,
}

impl fmt::Debug for FakeServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeServer").finish()
    }
}

impl FakeServer {
    fn push_response(&mut self, bytes: Vec<u8>) {
        self.inbound.extend(bytes);
    }
}

impl Transport for FakeServer {
    fn connect(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn send(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.sent.extend_from_slice(data);
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        if self.inbound.len() < buf.len() {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        }
        for slot in buf.iter_mut() {
            *slot = self.inbound.pop_front().unwrap();
        }
        Ok(())
    }
}

fn response_header(buf: &mut EncodeBuffer) {
    write_structure(buf, tags::RESPONSE_HEADER, |w| {
        write_structure(w, tags::PROTOCOL_VERSION, |w| {
            write_value(w, tags::PROTOCOL_VERSION_MAJOR, &TtlvInteger(1))?;
            write_value(w, tags::PROTOCOL_VERSION_MINOR, &TtlvInteger(4))
        })?;
        write_value(w, tags::TIME_STAMP, &TtlvLongInteger(1_700_000_000))?;
        write_value(w, tags::BATCH_COUNT, &TtlvInteger(1))
    })
    .unwrap();
}

/// Wraps one batch item's already-encoded payload bytes in a full `ResponseMessage`.
fn response_message(operation_code: u32, write_payload: impl FnOnce(&mut EncodeBuffer)) -> Vec<u8> {
    let mut buf = EncodeBuffer::with_capacity(4096);
    write_structure(&mut buf, tags::RESPONSE_MESSAGE, |w| {
        response_header(w);
        write_structure(w, tags::BATCH_ITEM, |w| {
            write_value(w, tags::OPERATION, &TtlvEnumeration(operation_code))?;
            write_value(w, tags::RESULT_STATUS, &TtlvEnumeration(0x00))?;
            write_structure(w, tags::RESPONSE_PAYLOAD, |w| {
                write_payload(w);
                Ok(())
            })
        })
    })
    .unwrap();
    buf.into_vec()
}

fn unique_identifier_payload(id: &str) -> impl FnOnce(&mut EncodeBuffer) + '_ {
    move |w| {
        write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString(id.to_string())).unwrap();
    }
}

#[test]
fn activate_round_trips_through_a_fake_server() {
    let mut server = FakeServer::default();
    server.push_response(response_message(0x12, unique_identifier_payload("key-1")));

    let mut client = KmipClient::new(server).unwrap();
    let id = client.activate("key-1").unwrap();
    assert_eq!(id, "key-1");
}

#[test]
fn destroy_sends_a_destroy_operation_code() {
    let mut server = FakeServer::default();
    server.push_response(response_message(0x14, unique_identifier_payload("key-1")));

    let mut client = ClientBuilder::new()
        .protocol_version(ProtocolVersion::V1_4)
        .build(server)
        .unwrap();
    let id = client.destroy("key-1").unwrap();
    assert_eq!(id, "key-1");
}

#[test]
fn register_key_rejects_invalid_aes_length_before_any_network_activity() {
    assert!(SymmetricKeyMaterial::from_bytes(vec![0u8; 20]).is_err());
}

#[test]
fn revoke_sends_the_chosen_reason_and_returns_the_id() {
    let mut server = FakeServer::default();
    server.push_response(response_message(0x13, unique_identifier_payload("key-2")));

    let mut client = KmipClient::new(server).unwrap();
    let id = client
        .revoke("key-2", RevocationReasonCode::CessationOfOperation, None)
        .unwrap();
    assert_eq!(id, "key-2");
}

#[test]
fn server_reported_failure_surfaces_as_server_error() {
    let mut buf = EncodeBuffer::with_capacity(4096);
    write_structure(&mut buf, tags::RESPONSE_MESSAGE, |w| {
        response_header(w);
        write_structure(w, tags::BATCH_ITEM, |w| {
            write_value(w, tags::OPERATION, &TtlvEnumeration(0x12))?;
            write_value(w, tags::RESULT_STATUS, &TtlvEnumeration(0x01))?;
            write_value(w, tags::RESULT_REASON, &TtlvEnumeration(0x01))?;
            write_value(
                w,
                tags::RESULT_MESSAGE,
                &TtlvTextString("no such object".to_string()),
            )
        })
    })
    .unwrap();

    let mut server = FakeServer::default();
    server.push_response(buf.into_vec());

    let mut client = KmipClient::new(server).unwrap();
    let err = client.activate("missing").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ServerError { .. }));
}

#[test]
fn locate_all_paginates_across_two_pages() {
    // First page: a full page of 2 ids and no `located_items` total (server under-reports it as
    // absent), so the engine must keep paginating until it sees a short page.
    let mut page1 = EncodeBuffer::with_capacity(4096);
    write_structure(&mut page1, tags::RESPONSE_MESSAGE, |w| {
        response_header(w);
        write_structure(w, tags::BATCH_ITEM, |w| {
            write_value(w, tags::OPERATION, &TtlvEnumeration(0x08))?;
            write_value(w, tags::RESULT_STATUS, &TtlvEnumeration(0x00))?;
            write_structure(w, tags::RESPONSE_PAYLOAD, |w| {
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("a".into()))?;
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("b".into()))
            })
        })
    })
    .unwrap();

    let mut page2 = EncodeBuffer::with_capacity(4096);
    write_structure(&mut page2, tags::RESPONSE_MESSAGE, |w| {
        response_header(w);
        write_structure(w, tags::BATCH_ITEM, |w| {
            write_value(w, tags::OPERATION, &TtlvEnumeration(0x08))?;
            write_value(w, tags::RESULT_STATUS, &TtlvEnumeration(0x00))?;
            write_structure(w, tags::RESPONSE_PAYLOAD, |w| {
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("c".into()))
            })
        })
    })
    .unwrap();

    let mut server = FakeServer::default();
    server.push_response(page1.into_vec());
    server.push_response(page2.into_vec());

    let mut client = ClientBuilder::new().locate_page_size(2).build(server).unwrap();
    let ids = client.locate_all(ObjectType::SymmetricKey).unwrap();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
}

#[test]
fn locate_all_is_not_desynced_by_a_server_that_over_fills_a_page() {
    // Server ignores the requested page size of 2 and returns 3 ids on the first page anyway.
    let mut page1 = EncodeBuffer::with_capacity(4096);
    write_structure(&mut page1, tags::RESPONSE_MESSAGE, |w| {
        response_header(w);
        write_structure(w, tags::BATCH_ITEM, |w| {
            write_value(w, tags::OPERATION, &TtlvEnumeration(0x08))?;
            write_value(w, tags::RESULT_STATUS, &TtlvEnumeration(0x00))?;
            write_structure(w, tags::RESPONSE_PAYLOAD, |w| {
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("a".into()))?;
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("b".into()))?;
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("c".into()))
            })
        })
    })
    .unwrap();

    let mut page2 = EncodeBuffer::with_capacity(4096);
    write_structure(&mut page2, tags::RESPONSE_MESSAGE, |w| {
        response_header(w);
        write_structure(w, tags::BATCH_ITEM, |w| {
            write_value(w, tags::OPERATION, &TtlvEnumeration(0x08))?;
            write_value(w, tags::RESULT_STATUS, &TtlvEnumeration(0x00))?;
            write_structure(w, tags::RESPONSE_PAYLOAD, |w| {
                write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("d".into()))
            })
        })
    })
    .unwrap();

    let mut server = FakeServer::default();
    server.push_response(page1.into_vec());
    server.push_response(page2.into_vec());

    let mut client = ClientBuilder::new().locate_page_size(2).build(server).unwrap();
    let ids = client.locate_all(ObjectType::SymmetricKey).unwrap();
    // The over-filled first page is truncated to the requested page size, so the engine's offset
    // for the second request lands on "c", not "d" — and "c" is recovered from the second page.
    assert_eq!(
        ids,
        vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()]
    );
}

/// Encodes a `Get` response for a `SymmetricKey` whose `KeyBlock` carries `CryptographicAlgorithm`
/// and `CryptographicLength` before an optional `KeyWrappingData` tail — the normal field order
/// for, e.g., a freshly-created AES key.
fn get_symmetric_key_payload(
    key_material: Vec<u8>,
    key_value_attributes: impl FnOnce(&mut EncodeBuffer) + 'static,
    wrapped: bool,
) -> impl FnOnce(&mut EncodeBuffer) {
    move |w| {
        write_value(w, tags::OBJECT_TYPE, &TtlvEnumeration(ObjectType::SymmetricKey.code())).unwrap();
        write_value(w, tags::UNIQUE_IDENTIFIER, &TtlvTextString("key-1".into())).unwrap();
        write_structure(w, tags::SYMMETRIC_KEY, |w| {
            write_structure(w, tags::KEY_BLOCK, |w| {
                write_value(w, tags::KEY_FORMAT_TYPE, &TtlvEnumeration(0x01))?; // Raw
                if wrapped {
                    write_value(w, tags::KEY_VALUE, &TtlvByteString(key_material.clone()))?;
                } else {
                    write_structure(w, tags::KEY_VALUE, |w| {
                        write_value(w, tags::KEY_MATERIAL, &TtlvByteString(key_material.clone()))?;
                        key_value_attributes(w);
                        Ok(())
                    })?;
                }
                write_value(w, tags::CRYPTOGRAPHIC_ALGORITHM, &TtlvEnumeration(0x03))?; // Aes
                write_value(w, tags::CRYPTOGRAPHIC_LENGTH, &TtlvInteger(128))?;
                if wrapped {
                    write_structure(w, tags::KEY_WRAPPING_DATA, |_| Ok(()))?;
                }
                Ok(())
            })
        })
        .unwrap();
    }
}

#[test]
fn get_key_with_wrapping_data_after_crypto_fields_is_rejected_as_object_mismatch() {
    let mut server = FakeServer::default();
    server.push_response(response_message(
        0x0A,
        get_symmetric_key_payload(vec![0u8; 16], |_| {}, true),
    ));

    let mut client = KmipClient::new(server).unwrap();
    let err = client.get_key("key-1").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ObjectMismatch(_)));
}

#[test]
fn get_key_decodes_attributes_attached_to_the_key_value() {
    let mut server = FakeServer::default();
    server.push_response(response_message(
        0x0A,
        get_symmetric_key_payload(vec![0u8; 16], |w| {
            write_structure(w, tags::ATTRIBUTE, |w| {
                write_value(
                    w,
                    tags::ATTRIBUTE_NAME,
                    &TtlvTextString("Object Group".into()),
                )?;
                write_value(
                    w,
                    tags::ATTRIBUTE_VALUE,
                    &TtlvTextString("my-group".into()),
                )
            })
            .unwrap();
        }, false),
    ));

    let mut client = KmipClient::new(server).unwrap();
    let key = client.get_key("key-1").unwrap();
    assert_eq!(key.key_material, vec![0u8; 16]);
    assert_eq!(
        key.attributes,
        vec![Attribute::ObjectGroup("my-group".to_string())]
    );
}
