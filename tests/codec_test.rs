use contact_extract::{
    ParseError, decode_quoted_printable, escape_value, split_unescaped, unescape_value,
    unfold_lines,
};

// --- escape-aware splitting ---

#[test]
fn test_split_unescaped_basic() {
    assert_eq!(split_unescaped("a;b;c", ';'), vec!["a", "b", "c"]);
}

#[test]
fn test_split_unescaped_keeps_escaped_delimiter() {
    assert_eq!(split_unescaped("a\\;b;c", ';'), vec!["a\\;b", "c"]);
}

#[test]
fn test_split_unescaped_even_backslashes_split() {
    // two backslashes escape each other, so the delimiter is live
    assert_eq!(split_unescaped("a\\\\;b", ';'), vec!["a\\\\", "b"]);
    // three backslashes leave the delimiter escaped
    assert_eq!(split_unescaped("a\\\\\\;b", ';'), vec!["a\\\\\\;b"]);
}

#[test]
fn test_split_unescaped_empty_tokens() {
    assert_eq!(split_unescaped(";;a;;", ';'), vec!["", "", "a", "", ""]);
    assert_eq!(split_unescaped("", ';'), vec![""]);
}

// --- escape / unescape ---

#[test]
fn test_unescape_delimiters() {
    assert_eq!(unescape_value("foo\\;bar", false), "foo;bar");
    assert_eq!(unescape_value("foo\\,bar", false), "foo,bar");
    assert_eq!(unescape_value("foo\\\\bar", false), "foo\\bar");
}

#[test]
fn test_unescape_newline_only_in_vcard_mode() {
    assert_eq!(unescape_value("foo\\nbar", true), "foo\nbar");
    assert_eq!(unescape_value("foo\\Nbar", true), "foo\nbar");
    // outside vCard, \n is just an escaped letter
    assert_eq!(unescape_value("foo\\nbar", false), "foonbar");
}

#[test]
fn test_unescape_single_pass() {
    // \\n is an escaped backslash followed by a letter, not a newline
    assert_eq!(unescape_value("foo\\\\nbar", true), "foo\\nbar");
}

#[test]
fn test_escape_round_trip() {
    let literal = "a;b,c\\d\ne";
    let escaped = escape_value(literal, true);
    assert_eq!(escaped, "a\\;b\\,c\\\\d\\ne");
    assert_eq!(unescape_value(&escaped, true), literal);
    // escaping the unescaped form reproduces the original escaped text
    assert_eq!(escape_value(&unescape_value(&escaped, true), true), escaped);
}

// --- line unfolding ---

#[test]
fn test_unfold_space_continuation() {
    assert_eq!(unfold_lines("NOTE:foo\r\n bar\r\nTEL:1"), "NOTE:foobar\r\nTEL:1");
}

#[test]
fn test_unfold_tab_continuation() {
    assert_eq!(unfold_lines("NOTE:foo\n\tbar"), "NOTE:foobar");
}

#[test]
fn test_unfold_leaves_plain_breaks() {
    assert_eq!(unfold_lines("A:1\r\nB:2"), "A:1\r\nB:2");
    // quoted-printable soft breaks are not folding
    assert_eq!(unfold_lines("A:x=\r\n=4F"), "A:x=\r\n=4F");
}

// --- quoted-printable ---

#[test]
fn test_qp_hex_escapes() {
    assert_eq!(decode_quoted_printable("=38=38 ok", None).unwrap(), "88 ok");
    // lowercase hex digits work too
    assert_eq!(decode_quoted_printable("=4f=4B", None).unwrap(), "OK");
}

#[test]
fn test_qp_soft_break() {
    assert_eq!(decode_quoted_printable("=38=\r\n=39", None).unwrap(), "89");
    assert_eq!(decode_quoted_printable("=38=\n=39", None).unwrap(), "89");
}

#[test]
fn test_qp_soft_break_position_is_irrelevant() {
    let reference = decode_quoted_printable("=38=38=39", None).unwrap();
    assert_eq!(
        decode_quoted_printable("=38=\r\n=38=39", None).unwrap(),
        reference
    );
    assert_eq!(
        decode_quoted_printable("=38=38=\r\n=39", None).unwrap(),
        reference
    );
}

#[test]
fn test_qp_embedded_crlf() {
    assert_eq!(decode_quoted_printable("a=0D=0Ab", None).unwrap(), "a\r\nb");
}

#[test]
fn test_qp_default_charset_is_utf8() {
    assert_eq!(decode_quoted_printable("caf=C3=A9", None).unwrap(), "café");
}

#[test]
fn test_qp_latin1() {
    assert_eq!(
        decode_quoted_printable("caf=E9", Some("ISO-8859-1")).unwrap(),
        "café"
    );
    assert_eq!(
        decode_quoted_printable("caf=E9", Some("latin1")).unwrap(),
        "café"
    );
}

#[test]
fn test_qp_plain_text_passes_through() {
    assert_eq!(
        decode_quoted_printable("no escapes here", None).unwrap(),
        "no escapes here"
    );
}

#[test]
fn test_qp_invalid_hex_is_an_error() {
    assert!(matches!(
        decode_quoted_printable("=ZZ", None),
        Err(ParseError::Decode(_))
    ));
    assert!(matches!(
        decode_quoted_printable("oops=4", None),
        Err(ParseError::Decode(_))
    ));
}

#[test]
fn test_qp_unsupported_charset_is_an_error() {
    assert!(matches!(
        decode_quoted_printable("=41", Some("KOI8-R")),
        Err(ParseError::Decode(_))
    ));
}

#[test]
fn test_qp_invalid_utf8_is_an_error() {
    assert!(matches!(
        decode_quoted_printable("=FF", None),
        Err(ParseError::Decode(_))
    ));
}
