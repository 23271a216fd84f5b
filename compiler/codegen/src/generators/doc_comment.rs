//! Doc-comment rendering for generated items.

use std::fmt::Write as _;

use ir::{ClientMethod, ReturnShape};

/// Sanitize a line for use in Rust doc comments
pub fn sanitize_doc_line(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut in_code = false;
    for ch in line.chars() {
        match ch {
            '`' => {
                in_code = !in_code;
                result.push(ch);
            }
            // Bare brackets read as intra-doc links to rustdoc.
            '[' if !in_code => result.push_str("\\["),
            ']' if !in_code => result.push_str("\\]"),
            '\t' => result.push_str("    "),
            _ => result.push(ch),
        }
    }
    // An unbalanced backtick would swallow the rest of the doc block.
    if in_code {
        result.push('`');
    }
    result
}

/// Write a sanitized doc comment line with proper prefix
pub fn write_doc_line(buf: &mut String, text: &str, indent: &str) -> std::fmt::Result {
    let sanitized = sanitize_doc_line(text);
    if sanitized.is_empty() {
        writeln!(buf, "{}///", indent)
    } else {
        writeln!(buf, "{}/// {}", indent, sanitized)
    }
}

/// Write a sanitized multi-line doc comment.
///
/// Runs of blank lines collapse to one empty `///` line; leading and
/// trailing blank lines are dropped.
pub fn write_doc_comment(buf: &mut String, text: &str, indent: &str) -> std::fmt::Result {
    let mut pending_blank = false;
    let mut written = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blank = written;
            continue;
        }
        if pending_blank {
            write_doc_line(buf, "", indent)?;
            pending_blank = false;
        }
        write_doc_line(buf, trimmed, indent)?;
        written = true;
    }
    Ok(())
}

/// Docs for a generated client method: the message description followed by
/// what the call sends and what it waits for.
pub fn write_method_docs(buf: &mut String, method: &ClientMethod, indent: &str) -> std::fmt::Result {
    match &method.description {
        Some(description) if !description.trim().is_empty() => {
            write_doc_comment(buf, description, indent)?;
        }
        _ => write_doc_line(buf, &format!("Sends a `{}` message.", method.tag), indent)?,
    }
    let reply = match &method.returns {
        ReturnShape::None => return Ok(()),
        ReturnShape::Direct { tag, .. } => format!("Waits for the single `{}` reply.", tag),
        ReturnShape::Stream { tag, .. } => {
            format!("Returns a stream yielding every `{}` reply to this request.", tag)
        }
    };
    write_doc_line(buf, "", indent)?;
    write_doc_line(buf, &reply, indent)
}
