//! A synchronous client for the Key Management Interoperability Protocol (KMIP), versions
//! 1.0 through 1.4: TTLV wire encoding, the request/response message model, length-prefixed
//! message framing, and a typed exchange engine and client API layered on top.
//!
//! This crate does not open TLS connections itself — see [`transport::Transport`] for the
//! abstraction callers implement over their own connected stream — and it does not implement
//! every KMIP operation or managed object type, only the subset a symmetric-key/secret-data
//! client needs: `Create`, `Register`, `Get`, `Activate`, `Revoke`, `Destroy`, `GetAttributes`
//! and `Locate`.
//!
//! # Example
//!
//! ```no_run
//! use kmip_client::client::KmipClient;
//! use kmip_client::key_material::SymmetricKeyMaterial;
//! use kmip_client::transport::StreamTransport;
//! use std::net::TcpStream;
//!
//! # fn main() -> kmip_client::error::Result<()> {
//! let stream = TcpStream::connect("kmip.example.com:5696")?;
//! let mut client = KmipClient::new(StreamTransport::new(stream))?;
//!
//! let key = SymmetricKeyMaterial::from_hex("000102030405060708090a0b0c0d0e0f")?;
//! let id = client.register_key("my-key", "my-group", key)?;
//! client.activate(&id)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module layout
//!
//! - [`ttlv`] — the primitive TTLV (Tag-Type-Length-Value) type codec: encode/decode for
//!   `Integer`, `LongInteger`, `Enumeration`, `DateTime`, `BigInteger`, `Boolean`, `TextString`,
//!   `ByteString`, `Interval` and `Structure`, plus the fixed-capacity [`ttlv::buffer::EncodeBuffer`]
//!   restartable-encode discipline the engine relies on.
//! - [`tags`] — the KMIP tag constants used throughout [`model`].
//! - [`model`] — the typed message tree: headers, batch items, request/response payloads, managed
//!   objects and attributes.
//! - [`codec`] — shared structure/value read/write helpers [`model`] is built out of.
//! - [`builders`] — one function per supported operation, each producing a [`model::RequestPayload`].
//! - [`extractors`] — the mirror image of [`builders`], pulling typed results out of a decoded
//!   [`model::ResponsePayload`].
//! - [`engine`] — drives one request/response exchange and multi-page `Locate` pagination.
//! - [`framing`] — length-prefixed message framing over a [`transport::Transport`].
//! - [`transport`] — the [`transport::Transport`] trait and a [`transport::StreamTransport`]
//!   adapter for any `Read + Write` stream.
//! - [`key_material`] — validated construction of symmetric key material.
//! - [`client`] — the public [`client::KmipClient`] API and its [`client::ClientBuilder`]/
//!   [`client::Config`].
//! - [`error`] — the [`error::Error`]/[`error::ErrorKind`] taxonomy every public operation returns.
//! - [`version`] — compile-time version constants.
pub mod builders;
pub mod client;
pub mod codec;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod framing;
pub mod key_material;
pub mod model;
pub mod tags;
pub mod transport;
pub mod ttlv;
pub mod version;
