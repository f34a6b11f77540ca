//! Keeps raw generator text on one log line.

/// Longest preview kept in a log line, in characters.
pub const MAX_PREVIEW: usize = 300;

/// Escape `s` for single-line logging and cut it at [`MAX_PREVIEW`] characters.
///
/// Newlines, carriage returns, tabs and backslashes become their escaped forms; other control
/// characters become `\xNN`. Generated replies can be several kilobytes of box-drawing art,
/// so anything past the preview limit is replaced by a trailing `…`.
pub fn escape_log(s: &str) -> String {
    preview(s, MAX_PREVIEW)
}

/// [`escape_log`] with a caller-chosen limit. HTTP error bodies go into a typed error that
/// the player sees, so they get a shorter cut than debug-level log lines.
pub fn preview(s: &str, max_chars: usize) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len().min(max_chars) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_chars {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
