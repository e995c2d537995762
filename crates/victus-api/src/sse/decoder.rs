// ── text/event-stream decoder ──
//
// Incremental: bytes arrive in arbitrary chunks, possibly splitting
// lines, CRLF pairs, or multi-byte UTF-8 sequences.

/// Longest line kept in memory. The rest of a longer line is skipped and
/// the event it belongs to is dropped.
pub const MAX_LINE_LEN: usize = 1024 * 1024;

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event:` field, if the server named the event.
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
    /// Last event id seen on the stream.
    pub id: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    skip_lf: bool,
    /// The leading line (where a byte-order mark may sit) was consumed.
    started: bool,
    /// The current line outgrew `MAX_LINE_LEN`.
    overflow: bool,
    /// Skipping the rest of an event that had an overlong line.
    discarding: bool,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every frame completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => self.end_line(&mut frames),
                b'\r' => {
                    self.end_line(&mut frames);
                    self.skip_lf = true;
                }
                _ if self.overflow => {}
                _ if self.line.len() >= MAX_LINE_LEN => {
                    self.overflow = true;
                    self.line = Vec::new();
                }
                _ => self.line.push(byte),
            }
        }
        frames
    }

    fn end_line(&mut self, frames: &mut Vec<SseFrame>) {
        let raw = std::mem::take(&mut self.line);
        if std::mem::take(&mut self.overflow) {
            tracing::warn!(limit = MAX_LINE_LEN, "Event stream line too long, dropping event");
            self.event = None;
            self.data.clear();
            self.started = true;
            self.discarding = true;
            return;
        }
        if self.discarding {
            if raw.is_empty() {
                self.discarding = false;
                self.event = None;
                self.data.clear();
            }
            return;
        }
        let line = String::from_utf8_lossy(&raw);
        let line = if std::mem::replace(&mut self.started, true) {
            &*line
        } else {
            line.strip_prefix('\u{feff}').unwrap_or(&line)
        };

        if line.is_empty() {
            if let Some(frame) = self.dispatch() {
                frames.push(frame);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => self.data.push(value.to_owned()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_owned()),
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take().filter(|e| !e.is_empty());
        if self.data.is_empty() {
            return None;
        }
        Some(SseFrame {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
            id: self.last_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_event_with_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: CREATED\ndata: {\"id\":1}\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: Some("CREATED".into()),
                data: "{\"id\":1}".into(),
                id: None,
            }]
        );
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"ti").is_empty());
        assert!(decoder.feed(b"po\":\"UPDATED\"}\r").is_empty());
        let frames = decoder.feed(b"\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"tipo\":\"UPDATED\"}");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn multi_line_data_and_comments() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\nid: 42\ndata: a\ndata:b\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "a\nb");
        assert_eq!(frames[0].id.as_deref(), Some("42"));
    }

    #[test]
    fn event_without_data_is_dropped() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: ping\n\n").is_empty());
        // The event name does not leak into the next frame.
        let frames = decoder.feed(b"data: x\n\n");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn byte_order_mark_stripped_only_at_stream_start() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed("\u{feff}data: first\n\n".as_bytes());
        assert_eq!(frames[0].data, "first");

        // Later in the stream the mark is part of the field name.
        let frames = decoder.feed("\u{feff}data: ignored\n\ndata: second\n\n".as_bytes());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "second");
    }

    #[test]
    fn overlong_line_drops_its_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: CREATED\ndata: ").is_empty());
        let filler = vec![b'x'; MAX_LINE_LEN + 10];
        assert!(decoder.feed(&filler).is_empty());
        assert!(decoder.line.is_empty());
        assert!(decoder.feed(b"\ndata: tail\n\n").is_empty());

        // The decoder resynchronizes on the next frame.
        let frames = decoder.feed(b"event: UPDATED\ndata: ok\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("UPDATED"));
        assert_eq!(frames[0].data, "ok");
    }

    #[test]
    fn utf8_split_inside_code_point() {
        let mut decoder = SseDecoder::new();
        let text = "data: Bogotá\n\n".as_bytes();
        let split = text.iter().position(|&b| b >= 0x80).unwrap_or(0) + 1;
        assert!(decoder.feed(&text[..split]).is_empty());
        let frames = decoder.feed(&text[split..]);
        assert_eq!(frames[0].data, "Bogotá");
    }
}
