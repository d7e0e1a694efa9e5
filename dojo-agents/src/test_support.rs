//! Response fixtures shared by the client tests.

use serde_json::Value;
use wiremock::ResponseTemplate;

/// Successful event-stream response carrying each of `frames` as one event.
pub(crate) fn sse_response(frames: &[Value]) -> ResponseTemplate {
    let body: String = frames
        .iter()
        .map(|frame| format!("data: {frame}\n\n"))
        .collect();
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}
