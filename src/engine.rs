//! Drives one request/response exchange: encode, send, receive, decode, validate.
//!
//! Encoding uses a restartable-encode discipline rather than a self-growing buffer: attempt the
//! encode into a fixed-capacity [`EncodeBuffer`], and if it reports [`crate::ttlv::Error::BufferFull`]
//! (surfaced here as [`ErrorKind::BufferFull`]), allocate a larger buffer and re-run the whole
//! encode from the top.
use tracing::{debug, instrument, warn};

use crate::codec::Decoder;
use crate::error::{Error, ErrorKind, Result};
use crate::extractors::{self, LocatePage};
use crate::framing;
use crate::model::{
    ProtocolVersion, RequestMessage, RequestPayload, ResponseBatchItem, ResultStatus,
};
use crate::transport::Transport;
use crate::ttlv::buffer::EncodeBuffer;

/// Bytes added to the encode buffer's capacity each time a retry is needed. Re-exported from
/// [`EncodeBuffer`] so callers configuring a client don't need to reach into `crate::ttlv`.
pub const GROWTH_INCREMENT: usize = EncodeBuffer::GROWTH_INCREMENT;

fn encode_with_growth(message: &RequestMessage) -> Result<Vec<u8>> {
    let mut capacity = EncodeBuffer::INITIAL_CAPACITY;
    loop {
        let mut buffer = EncodeBuffer::with_capacity(capacity);
        match message.encode(&mut buffer) {
            Ok(()) => return Ok(buffer.into_vec()),
            Err(err) if matches!(err.kind(), ErrorKind::BufferFull) => {
                capacity += EncodeBuffer::GROWTH_INCREMENT;
                debug!(new_capacity = capacity, "encode buffer exhausted, retrying with more capacity");
            }
            Err(err) => return Err(err),
        }
    }
}

/// Sends a single-batch-item request and returns the one [`ResponseBatchItem`] it produced,
/// after checking that the server echoed `batch_count == 1` and the same operation it was asked
/// to perform, and translating a non-`Success` result status into [`ErrorKind::ServerError`].
#[instrument(skip(transport, payload), fields(operation = %payload.operation()))]
pub fn exchange(
    transport: &mut dyn Transport,
    protocol_version: ProtocolVersion,
    max_message_size: u32,
    payload: RequestPayload,
) -> Result<ResponseBatchItem> {
    let requested_operation = payload.operation();
    let request = RequestMessage::single(protocol_version, payload);
    let encoded = encode_with_growth(&request)?;

    framing::write_message(transport, &encoded)?;
    let response_bytes = framing::read_message(transport, max_message_size)?;

    let mut cursor: Decoder<'_> = Decoder::new(&response_bytes);
    let response = crate::model::ResponseMessage::decode(&mut cursor)?;

    if response.header.batch_count != 1 {
        return Err(ErrorKind::MalformedResponse(format!(
            "expected exactly 1 batch item, server sent {}",
            response.header.batch_count
        ))
        .into());
    }
    let batch_item = response
        .batch_items
        .into_iter()
        .next()
        .expect("batch_count == 1 was just checked");

    if batch_item.operation != requested_operation {
        return Err(ErrorKind::MalformedResponse(format!(
            "requested operation {} but server echoed {}",
            requested_operation, batch_item.operation
        ))
        .into());
    }

    if batch_item.result_status != ResultStatus::Success {
        warn!(
            status = %batch_item.result_status,
            reason = ?batch_item.result_reason,
            "server reported a non-Success result"
        );
        return Err(ErrorKind::ServerError {
            status: batch_item.result_status,
            reason: batch_item.result_reason,
            message: batch_item.result_message.clone(),
        }
        .into());
    }

    Ok(batch_item)
}

/// Drives a `Locate` request across as many pages as needed to exhaust the match set, using
/// `page_size` and the `located_items` count (when the server sends one) as a short-circuit:
/// once as many ids have been collected as the server reported, pagination stops even if the
/// final page happened to be exactly full.
pub fn locate_all_pages(
    transport: &mut dyn Transport,
    protocol_version: ProtocolVersion,
    max_message_size: u32,
    page_size: i32,
    mut next_page: impl FnMut(i32, i32) -> Result<RequestPayload>,
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut offset = 0;
    loop {
        let payload = next_page(offset, page_size)?;
        let batch_item = exchange(transport, protocol_version, max_message_size, payload)?;
        let payload = batch_item
            .payload
            .as_ref()
            .ok_or_else(|| -> Error { ErrorKind::MalformedResponse("Locate response missing its payload".into()).into() })?;
        let LocatePage {
            unique_identifiers,
            located_items,
        } = extractors::get_ids(payload, page_size)?;

        let page_len = unique_identifiers.len();
        ids.extend(unique_identifiers);

        // A server-reported total of 0 is treated as "did not report a usable total" rather than
        // "nothing matches" — some servers under-report this field, so fall back to the
        // short-page signal below instead of stopping after the first (possibly full) page.
        if let Some(total) = located_items.filter(|total| *total != 0) {
            if ids.len() as i32 >= total {
                break;
            }
        }
        if page_len < page_size as usize {
            break;
        }
        offset += page_size;
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::ChannelTransport;

    #[test]
    fn encode_with_growth_succeeds_for_small_messages() {
        let request = RequestMessage::single(
            ProtocolVersion::V1_4,
            crate::builders::get("id-1").unwrap(),
        );
        let bytes = encode_with_growth(&request).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn channel_transport_round_trips_bytes() {
        let mut transport = ChannelTransport::preloaded(vec![1, 2, 3]);
        let mut buf = [0u8; 3];
        transport.recv(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        transport.send(&[9, 9]).unwrap();
        assert_eq!(transport.outbound, vec![9, 9]);
    }
}
