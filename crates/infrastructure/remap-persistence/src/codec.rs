use serde::Serialize;

use crate::api::ProfilesDocument;
use crate::StorageError;

/// Removes `//` and `/* */` comments that sit outside string literals.
/// Newlines are kept so parse errors still point at the right line.
pub fn strip_comments(input: &str) -> Result<String, StorageError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut closed = false;
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    prev = next;
                }
                if !closed {
                    return Err(StorageError::InvalidDocument(
                        "unterminated block comment".into(),
                    ));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

pub fn decode_document(bytes: &[u8]) -> Result<ProfilesDocument, StorageError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| StorageError::InvalidDocument(format!("not valid UTF-8: {e}")))?;
    let stripped = strip_comments(text)?;
    Ok(serde_json::from_str(&stripped)?)
}

/// Pretty JSON with a four space indent and a trailing newline.
pub fn encode_document(doc: &ProfilesDocument) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}
