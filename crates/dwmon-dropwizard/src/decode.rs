//! Document decoding

use std::io::Read;

use crate::error::Result;
use crate::schema::MetricsDocument;

/// Decode a complete response body
pub fn decode_document(body: &[u8]) -> Result<MetricsDocument> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode from a byte stream.
///
/// The whole stream is read before parsing; there are no partial results.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<MetricsDocument> {
    let mut body = Vec::new();
    reader
        .read_to_end(&mut body)
        .map_err(|e| crate::CollectError::Connection(format!("reading body: {}", e)))?;
    decode_document(&body)
}
