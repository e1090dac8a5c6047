//! The public, typed entry point: [`KmipClient`], built via [`ClientBuilder`] over any
//! [`crate::transport::Transport`]. Every method here is a thin sequence of
//! build-request/exchange/extract-response calls — the actual request shapes live in
//! [`crate::builders`], the actual response shapes in [`crate::extractors`], and the wire
//! exchange itself in [`crate::engine`].
use tracing::instrument;

use crate::builders;
use crate::engine;
use crate::error::Result;
use crate::extractors::{self, AttributeResult, RetrievedKey, RetrievedSecret};
use crate::model::{ObjectType, ProtocolVersion, RevocationReasonCode};
use crate::transport::Transport;

/// Default upper bound on a response message's declared body length. Chosen generously enough
/// for any single KMIP response this core decodes, while still rejecting a server that has gone
/// badly wrong.
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 8 * 1024 * 1024;

/// Per-client settings that don't vary per request: protocol version, the framing-layer size
/// cap, and the page size [`KmipClient::locate_by_name`] and friends request per round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub protocol_version: ProtocolVersion,
    pub max_message_size: u32,
    pub locate_page_size: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            protocol_version: ProtocolVersion::V1_4,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            locate_page_size: builders::DEFAULT_LOCATE_PAGE_SIZE,
        }
    }
}

/// Builds a [`KmipClient`], defaulting every [`Config`] field and letting callers override only
/// the ones they care about.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientBuilder {
    config: Config,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.config.protocol_version = version;
        self
    }

    pub fn max_message_size(mut self, max: u32) -> Self {
        self.config.max_message_size = max;
        self
    }

    pub fn locate_page_size(mut self, page_size: i32) -> Self {
        self.config.locate_page_size = page_size;
        self
    }

    /// Connects `transport` and wraps it in a [`KmipClient`] using the settings configured so far.
    pub fn build<T: Transport>(self, mut transport: T) -> Result<KmipClient<T>> {
        transport.connect()?;
        Ok(KmipClient {
            transport,
            config: self.config,
        })
    }
}

/// A connected KMIP client. One method per supported operation; each sends exactly one request
/// and waits for exactly one response, per [`crate::engine::exchange`]'s single-batch-item
/// contract. Closes its transport on drop.
#[derive(Debug)]
pub struct KmipClient<T: Transport> {
    transport: T,
    config: Config,
}

impl<T: Transport> KmipClient<T> {
    /// Connects `transport` with default [`Config`].
    pub fn new(transport: T) -> Result<Self> {
        ClientBuilder::new().build(transport)
    }

    /// The settings this client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn exchange(&mut self, payload: crate::model::RequestPayload) -> Result<crate::model::ResponseBatchItem> {
        engine::exchange(
            &mut self.transport,
            self.config.protocol_version,
            self.config.max_message_size,
            payload,
        )
    }

    /// Creates a new AES symmetric key of `key_length_bits` (128/192/256), returning its
    /// server-assigned unique identifier.
    #[instrument(skip(self))]
    pub fn create_aes_key(&mut self, name: &str, group: &str, key_length_bits: i32) -> Result<String> {
        let payload = builders::create_aes_key(name, group, key_length_bits)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_id(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Registers existing AES key material with the server, returning its unique identifier.
    pub fn register_key(
        &mut self,
        name: &str,
        group: &str,
        key: crate::key_material::SymmetricKeyMaterial,
    ) -> Result<String> {
        let payload = builders::register_aes_key(name, group, key)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_id(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Registers opaque secret data with the server, returning its unique identifier.
    pub fn register_secret(&mut self, name: &str, group: &str, secret: Vec<u8>) -> Result<String> {
        let payload = builders::register_secret_data(name, group, secret)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_id(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Retrieves an unwrapped, `Raw`-format symmetric key by unique identifier.
    pub fn get_key(&mut self, unique_identifier: &str) -> Result<RetrievedKey> {
        let payload = builders::get(unique_identifier)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_key(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Retrieves `Opaque`-format secret data by unique identifier.
    pub fn get_secret(&mut self, unique_identifier: &str) -> Result<RetrievedSecret> {
        let payload = builders::get(unique_identifier)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_secret(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Moves an object from `PreActive` to `Active`, returning its unique identifier.
    pub fn activate(&mut self, unique_identifier: &str) -> Result<String> {
        let payload = builders::activate(unique_identifier)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_id(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Revokes an object with the given reason, returning its unique identifier.
    pub fn revoke(
        &mut self,
        unique_identifier: &str,
        reason: RevocationReasonCode,
        message: Option<String>,
    ) -> Result<String> {
        let payload = builders::revoke(unique_identifier, reason, message)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_id(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Destroys an object permanently, returning its unique identifier.
    pub fn destroy(&mut self, unique_identifier: &str) -> Result<String> {
        let payload = builders::destroy(unique_identifier)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_id(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Fetches a single named attribute of an object.
    pub fn get_attribute(&mut self, unique_identifier: &str, attribute_name: &str) -> Result<AttributeResult> {
        let payload = builders::get_attribute(unique_identifier, attribute_name)?;
        let batch_item = self.exchange(payload)?;
        extractors::get_attribute(batch_item.payload.as_ref().ok_or_else(missing_payload)?)
    }

    /// Locates every object of `object_type` whose `Name` attribute equals `name`, paginating
    /// with this client's configured [`Config::locate_page_size`] until the match set is
    /// exhausted. Pass an empty `name` to locate every object of `object_type` regardless of name.
    pub fn locate_by_name(&mut self, object_type: ObjectType, name: &str) -> Result<Vec<String>> {
        let page_size = self.config.locate_page_size;
        let protocol_version = self.config.protocol_version;
        let max_message_size = self.config.max_message_size;
        let name = name.to_string();
        engine::locate_all_pages(
            &mut self.transport,
            protocol_version,
            max_message_size,
            page_size,
            move |offset, page_size| Ok(builders::locate_by_name(object_type, &name, offset, page_size)),
        )
    }

    /// Locates every object of `object_type` belonging to `ObjectGroup` `group`, paginating like
    /// [`Self::locate_by_name`].
    pub fn locate_by_group(&mut self, object_type: ObjectType, group: &str) -> Result<Vec<String>> {
        let page_size = self.config.locate_page_size;
        let protocol_version = self.config.protocol_version;
        let max_message_size = self.config.max_message_size;
        let group = group.to_string();
        engine::locate_all_pages(
            &mut self.transport,
            protocol_version,
            max_message_size,
            page_size,
            move |offset, page_size| builders::locate_by_group(object_type, &group, offset, page_size),
        )
    }

    /// Locates every object of `object_type` regardless of its name or group.
    pub fn locate_all(&mut self, object_type: ObjectType) -> Result<Vec<String>> {
        self.locate_by_name(object_type, "")
    }
}

impl<T: Transport> Drop for KmipClient<T> {
    fn drop(&mut self) {
        if let Err(err) = self.transport.close() {
            tracing::warn!(%err, "error closing transport on client drop");
        }
    }
}

fn missing_payload() -> crate::error::Error {
    crate::error::ErrorKind::MalformedResponse("server's response carried no payload".into()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::ChannelTransport;

    #[test]
    fn builder_defaults_match_the_documented_constants() {
        let config = ClientBuilder::new().config;
        assert_eq!(config.protocol_version, ProtocolVersion::V1_4);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.locate_page_size, builders::DEFAULT_LOCATE_PAGE_SIZE);
    }

    #[test]
    fn builder_overrides_are_applied() {
        let config = ClientBuilder::new()
            .protocol_version(ProtocolVersion::V1_0)
            .max_message_size(1024)
            .locate_page_size(4)
            .config;
        assert_eq!(config.protocol_version, ProtocolVersion::V1_0);
        assert_eq!(config.max_message_size, 1024);
        assert_eq!(config.locate_page_size, 4);
    }

    #[test]
    fn new_connects_the_transport() {
        let client = KmipClient::new(ChannelTransport::preloaded(Vec::new())).unwrap();
        assert!(client.transport.is_connected());
    }
}
