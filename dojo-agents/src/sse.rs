//! Incremental decoding of `text/event-stream` bodies.

use std::fmt::Display;
use std::time::Duration;

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde_json::Value;
use tokio::time::timeout;

use crate::traits::{AgentError, AgentEvent, AgentResult, AgentStream, RunAgentInput};

/// JSON payloads decoded from the `data:` fields of an event stream.
pub(crate) type FrameStream = BoxStream<'static, AgentResult<Value>>;

/// Decodes `body` into the JSON payloads of its `data:` fields as chunks
/// arrive.
///
/// Comment lines and non-data fields are ignored; multi-line data is joined
/// with `\n`. Empty data and the `[DONE]` sentinel are skipped. The stream
/// ends after the first error, including when no chunk arrives within `idle`.
pub(crate) fn frames<S, E>(body: S, idle: Duration, label: &'static str) -> FrameStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let events = Box::pin(body.eventsource());

    stream::unfold(Some(events), move |state| async move {
        let mut events = state?;
        loop {
            let Ok(next) = timeout(idle, events.next()).await else {
                let err = AgentError::transport(format!("{label} stream idle for {idle:?}"));
                return Some((Err(err), None));
            };

            let event = match next? {
                Ok(event) => event,
                Err(err) => {
                    let err = AgentError::transport(format!("{label} stream failed: {err}"));
                    return Some((Err(err), None));
                }
            };

            let data = event.data.trim();
            if data.is_empty() || data == "[DONE]" {
                continue;
            }

            return Some(match serde_json::from_str(data) {
                Ok(value) => (Ok(value), Some(events)),
                Err(err) => {
                    let err = AgentError::response(format!("malformed {label} event payload: {err}"));
                    (Err(err), None)
                }
            });
        }
    })
    .boxed()
}

/// Treats every frame as an agent event.
pub(crate) fn events(frames: FrameStream) -> AgentStream {
    until_error(frames.map(|frame| frame.and_then(AgentEvent::from_value)))
}

/// Wraps upstream frames as `RAW` events between run lifecycle events.
///
/// A failed frame ends the run without `RUN_FINISHED`.
pub(crate) fn bracket_raw(
    input: &RunAgentInput,
    source: &'static str,
    frames: FrameStream,
) -> AgentStream {
    let started = AgentEvent::run_started(input.thread_id(), input.run_id());
    let finished = AgentEvent::run_finished(input.thread_id(), input.run_id());

    until_error(
        stream::once(future::ready(Ok(started)))
            .chain(frames.map(move |frame| frame.map(|value| AgentEvent::raw(value, source))))
            .chain(stream::once(future::ready(Ok(finished)))),
    )
}

fn until_error<S>(stream: S) -> AgentStream
where
    S: Stream<Item = AgentResult<AgentEvent>> + Send + 'static,
{
    Box::pin(stream.scan(false, |failed, item| {
        let next = if *failed {
            None
        } else {
            *failed = item.is_err();
            Some(item)
        };
        future::ready(next)
    }))
}
