use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};

/// Turns a sequence of body chunks into complete text lines.
///
/// Decoding is incremental, so a chunk boundary inside a multi-byte sequence is
/// carried over to the next chunk instead of being replaced. Malformed bytes
/// become U+FFFD.
pub struct LineReassembler {
    decoder: Decoder,
    pending: String,
    encoding_label: &'static str,
}

impl LineReassembler {
    /// Uses the `charset` of a `Content-Type` header, UTF-8 when absent or unknown.
    /// A byte-order mark at the start of the body overrides both.
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let encoding = content_type
            .and_then(extract_charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        Self {
            decoder: encoding.new_decoder(),
            pending: String::new(),
            encoding_label: encoding.name(),
        }
    }

    pub fn encoding_label(&self) -> &'static str {
        self.encoding_label
    }

    /// Decodes `bytes` and returns every line completed by them, in order,
    /// without their `\n` / `\r\n` terminators.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode(bytes, false);
        self.drain_complete_lines()
    }

    /// Ends the stream and returns the unterminated trailing fragment, if any.
    ///
    /// The fragment is handed back for diagnostics only; callers do not treat it
    /// as a line.
    pub fn finish(mut self) -> Option<String> {
        self.decode(&[], true);
        let mut lines = self.drain_complete_lines();
        if !self.pending.is_empty() {
            lines.push(std::mem::take(&mut self.pending));
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    fn decode(&mut self, mut src: &[u8], last: bool) {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len() * 3 + 4);
            self.pending.reserve(needed);
            let (result, read, _had_replacements) =
                self.decoder.decode_to_string(src, &mut self.pending, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    fn drain_complete_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.pending.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_parameter_is_case_insensitive() {
        assert_eq!(
            extract_charset("text/plain; Charset=\"GBK\"").as_deref(),
            Some("GBK")
        );
        assert_eq!(extract_charset("application/x-ndjson"), None);
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let reassembler = LineReassembler::for_content_type(Some("text/plain; charset=klingon"));
        assert_eq!(reassembler.encoding_label(), "UTF-8");
    }
}
