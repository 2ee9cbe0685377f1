use bytes::{Buf, BytesMut};

/// Incremental decoder for `text/event-stream` bodies.
///
/// Lines are split on raw bytes so a multi-byte character cut across two
/// network chunks is reassembled before decoding.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network chunk and returns the `data:` payloads of every
    /// line it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line = self.buf.split_to(pos + 1);
            if let Some(data) = data_payload(&line[..pos]) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload of a trailing line left unterminated at end of body.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buf.has_remaining() {
            return None;
        }
        let rest = self.buf.split();
        data_payload(&rest)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = match std::str::from_utf8(line) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(target: "gsearch.engine", error = %e, "dropping non-utf8 event line");
            return None;
        }
    };
    let data = text.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data.to_string())
}
