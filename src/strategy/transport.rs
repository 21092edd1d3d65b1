//! Single-hop execution over reqwest, shared by the HTTP strategies.

use std::time::Duration;

use log::trace;
use reqwest::header::LOCATION;
use reqwest::{ClientBuilder, RequestBuilder, Response};

use crate::config::MAX_BLOCK_SCAN_BYTES;
use crate::resolve::{
    describe_reqwest_error, detect_block_signature, FailureKind, HopFailure, HopResponse,
};

/// Client builder with automatic redirects disabled; every strategy walks
/// the chain itself.
pub(crate) fn redirectless_client_builder() -> ClientBuilder {
    ClientBuilder::new().redirect(reqwest::redirect::Policy::none())
}

/// Sends one request and reduces the response to a `HopResponse`.
///
/// Terminal 2xx bodies are scanned (up to `MAX_BLOCK_SCAN_BYTES`) for block
/// signatures; redirect and error bodies are never read.
pub(crate) async fn send_hop(
    builder: RequestBuilder,
    timeout: Duration,
) -> Result<HopResponse, HopFailure> {
    let response = builder
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            let kind = FailureKind::from_reqwest(&e);
            HopFailure::no_response(kind, describe_reqwest_error(e))
        })?;

    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(LOCATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let block_signature = if response.status().is_success() {
        let body = read_prefix(response, MAX_BLOCK_SCAN_BYTES).await;
        detect_block_signature(&body).map(str::to_string)
    } else {
        None
    };

    Ok(HopResponse {
        status,
        location,
        block_signature,
    })
}

/// Reads at most `limit` bytes of the body as lossy UTF-8. Body errors end
/// the read early instead of failing the hop; the status line already
/// arrived.
async fn read_prefix(mut response: Response, limit: usize) -> String {
    let mut buf: Vec<u8> = Vec::new();
    while buf.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = (limit - buf.len()).min(chunk.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                trace!("Stopped reading body early: {e}");
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
