//! Edit parser — turns a raw email into an ordered list of edits.
//!
//! An email carries edits in its body, each introduced by a marker line
//! (`>Title`, `>>Title`, `<<Title` or `<Title`). Edits are separated by a blank
//! line followed by the next marker; other blank lines belong to the body. The
//! subject line may open the first edit, so `Subject: >todo` with a body of
//! `buy milk` is a replace of `todo`.
//!
//! Pure string scanning, no I/O.

use std::borrow::Cow;

use crate::pipeline::types::{Edit, Operation};

const SUBJECT_HEADER: &str = "Subject: ";

/// Parse every edit in `email`, in the order they appear.
pub fn parse(email: &str) -> Vec<Edit> {
    let email = normalize_line_endings(email);
    let message = message(&email);
    split_segments(&message)
        .into_iter()
        .map(parse_segment)
        .collect()
}

/// The text edits are read from: the subject (when non-empty) on its own line,
/// followed by the body.
///
/// An email without a blank line has no body and yields an empty message.
pub fn message(email: &str) -> String {
    let Some(body) = body(email) else {
        return String::new();
    };
    match subject(email) {
        Some(subject) if !subject.is_empty() => format!("{subject}\n{body}"),
        _ => body.to_string(),
    }
}

/// Value of the first line starting with `Subject: `.
pub fn subject(email: &str) -> Option<&str> {
    email
        .split('\n')
        .find_map(|line| line.strip_prefix(SUBJECT_HEADER))
}

/// Everything after the first blank line.
pub fn body(email: &str) -> Option<&str> {
    email.find("\n\n").map(|at| &email[at + 2..])
}

/// Split a message at each blank line that is directly followed by `<` or `>`.
///
/// The boundary is dropped; everything else is kept verbatim. The leftmost
/// boundary wins, so `"a\n\n\n>b"` splits into `"a\n"` and `">b"`.
pub fn split_segments(message: &str) -> Vec<&str> {
    let bytes = message.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i + 2 < bytes.len() {
        if bytes[i] == b'\n' && bytes[i + 1] == b'\n' && matches!(bytes[i + 2], b'<' | b'>') {
            segments.push(&message[start..i]);
            start = i + 2;
            i = start;
        } else {
            i += 1;
        }
    }
    segments.push(&message[start..]);

    segments.retain(|s| !s.is_empty());
    segments
}

/// Classify one segment.
///
/// The marker is the leading run of at most two `<`/`>` characters, the title
/// is the rest of the first line, and the body is everything after it.
pub fn parse_segment(segment: &str) -> Edit {
    let (first_line, body) = segment.split_once('\n').unwrap_or((segment, ""));

    let marker_len = first_line
        .bytes()
        .take(2)
        .take_while(|b| matches!(b, b'<' | b'>'))
        .count();
    let (marker, title) = first_line.split_at(marker_len);

    Edit::new(
        Operation::from_marker(marker),
        title.to_string(),
        body.to_string(),
        segment.to_string(),
    )
}

fn normalize_line_endings(email: &str) -> Cow<'_, str> {
    if email.contains('\r') {
        Cow::Owned(email.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(email)
    }
}
