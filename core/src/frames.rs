//! Frame reassembly for the chunked chat response
//!
//! The workflow service streams its answer as a `text/event-stream` body.
//! The transport hands us text in arbitrary chunks with no relation to the
//! frame boundaries, so a single pending buffer accumulates input until a
//! blank-line separator completes a frame.

/// Separator that terminates one frame.
const FRAME_SEPARATOR: &str = "\n\n";

/// Incremental decoder that turns arbitrary text chunks into complete frames.
///
/// Feed chunks with [`push`](Self::push) as they arrive; each call returns
/// every frame completed so far and keeps the unterminated remainder buffered
/// for the next call. The decoder imposes no frame size limit: a peer that
/// never sends a separator grows the buffer without bound.
///
/// # Example
///
/// ```
/// use sillage_core::FrameDecoder;
///
/// let mut decoder = FrameDecoder::new();
/// assert!(decoder.push("data: one\n").is_empty());
/// assert_eq!(decoder.push("\ndata: two\n\n"), vec!["data: one", "data: two"]);
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
}

impl FrameDecoder {
    /// Create a decoder with an empty pending buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain all frames it completes.
    ///
    /// Frames come back in arrival order. Zero-length segments (repeated
    /// separators) are skipped.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find(FRAME_SEPARATOR) {
            let frame = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + FRAME_SEPARATOR.len());
            if !frame.is_empty() {
                frames.push(frame);
            }
        }
        frames
    }

    /// Number of buffered characters still waiting for a separator.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the decoder, surfacing any unterminated trailing data.
    ///
    /// A stream that ends mid-frame loses that final fragment; callers log
    /// what was dropped so the truncation is at least observable.
    pub fn finish(self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_with_splits(input: &str, split_points: &[usize]) -> Vec<String> {
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        let mut rest = input;
        let mut consumed = 0;
        for &point in split_points {
            let take = point.saturating_sub(consumed).min(rest.len());
            let (chunk, tail) = rest.split_at(take);
            frames.extend(decoder.push(chunk));
            rest = tail;
            consumed = point;
        }
        frames.extend(decoder.push(rest));
        frames
    }

    #[test]
    fn test_single_chunk_multiple_frames() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push("alpha\n\nbeta\n\n");
        assert_eq!(frames, vec!["alpha", "beta"]);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push("data: hel").is_empty());
        assert!(decoder.push("lo\n").is_empty());
        assert_eq!(decoder.push("\n"), vec!["data: hello"]);
    }

    #[test]
    fn test_separator_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push("one\n").is_empty());
        assert_eq!(decoder.push("\ntwo\n\n"), vec!["one", "two"]);
    }

    #[test]
    fn test_chunking_is_irrelevant() {
        let input = "data: {\"type\":\"answer\",\"content\":\"A\"}\n\ndata: {\"type\":\"answer\",\"content\":\"AB\"}\n\n";
        let whole = decode_with_splits(input, &[]);

        // Any way of slicing the same stream must yield the same frames,
        // including splits inside the separator itself.
        for splits in [
            vec![1],
            vec![5, 6],
            vec![38, 39],
            vec![10, 20, 30, 40, 50, 60, 70],
            (1..input.len()).collect::<Vec<_>>(),
        ] {
            assert_eq!(decode_with_splits(input, &splits), whole);
        }
    }

    #[test]
    fn test_blank_segments_are_skipped() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push("\n\n\n\nx\n\n"), vec!["x"]);
    }

    #[test]
    fn test_finish_reports_truncated_tail() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push("done\n\npartial"), vec!["done"]);
        assert_eq!(decoder.finish(), Some("partial".to_string()));
    }

    #[test]
    fn test_finish_empty_after_clean_stream() {
        let mut decoder = FrameDecoder::new();
        decoder.push("done\n\n");
        assert_eq!(decoder.finish(), None);
    }
}
