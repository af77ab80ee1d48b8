//! Text sanitizing for values displayed in the game client.

/// Makes a string safe to print in the game client.
///
/// Non-printable characters are removed, surrounding whitespace is trimmed
/// and every interior whitespace run becomes a single `_`. When `max_len` is
/// non-zero the result is cut to its first `max_len` characters.
///
/// # Examples
///
/// ```
/// use get5_config_core::sanitize_printable;
///
/// assert_eq!(sanitize_printable("  Alpha   Squad\tNine ", 0), "Alpha_Squad_Nine");
/// assert_eq!(sanitize_printable("hello there", 1), "h");
/// assert_eq!(sanitize_printable("bell\u{7}ringer", 0), "bellringer");
/// ```
pub fn sanitize_printable(raw: &str, max_len: usize) -> String {
    let visible: String = raw
        .chars()
        .filter(|&c| c.is_whitespace() || is_printable(c))
        .collect();
    let collapsed = visible.split_whitespace().collect::<Vec<_>>().join("_");

    if max_len == 0 {
        return collapsed;
    }
    collapsed.chars().take(max_len).collect()
}

/// Returns `true` for characters the game client can render.
fn is_printable(c: char) -> bool {
    !c.is_control() && !is_invisible_format(c)
}

// Zero-width and bidi control characters.
fn is_invisible_format(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}
