use draftline_engine::LineReassembler;
use pretty_assertions::assert_eq;

#[test]
fn multibyte_text_survives_every_split_point() {
    let body = "第一行 résumé\n第二行 🎓\n".as_bytes();

    for split in 0..=body.len() {
        let mut reassembler = LineReassembler::for_content_type(None);
        let mut lines = reassembler.push(&body[..split]);
        lines.extend(reassembler.push(&body[split..]));

        assert_eq!(lines, vec!["第一行 résumé", "第二行 🎓"], "split at {split}");
        assert_eq!(reassembler.finish(), None);
    }
}

#[test]
fn byte_at_a_time_delivery() {
    let body = "data: {\"content\":\"日本語\"}\r\n".as_bytes();
    let mut reassembler = LineReassembler::for_content_type(Some("text/event-stream"));
    let mut lines = Vec::new();
    for byte in body {
        lines.extend(reassembler.push(std::slice::from_ref(byte)));
    }
    assert_eq!(lines, vec!["data: {\"content\":\"日本語\"}"]);
}

#[test]
fn trailing_fragment_is_returned_not_emitted() {
    let mut reassembler = LineReassembler::for_content_type(None);
    assert_eq!(reassembler.push(b"done\npart"), vec!["done"]);
    assert_eq!(reassembler.finish().as_deref(), Some("part"));
}

#[test]
fn malformed_bytes_become_replacement_characters() {
    let mut reassembler = LineReassembler::for_content_type(None);
    let lines = reassembler.push(b"ok \xff\xfe end\n");
    assert_eq!(lines, vec!["ok \u{FFFD}\u{FFFD} end"]);
}

#[test]
fn declared_charset_is_honoured() {
    let (encoded, _, _) = encoding_rs::GBK.encode("你好\n");
    let mut reassembler = LineReassembler::for_content_type(Some("text/plain; charset=gbk"));
    assert_eq!(reassembler.encoding_label(), "GBK");
    assert_eq!(reassembler.push(&encoded), vec!["你好"]);
}
