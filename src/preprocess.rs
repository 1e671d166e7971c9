//! Clean-up of outline text posted from a plain-text form.

use std::borrow::Cow;

/// Undo form encoding: `+` becomes a space and `%XX` escapes are decoded.
///
/// Text without any escapes comes back borrowed. If the escapes do not
/// decode to valid UTF-8 the text is returned with only `+` replaced.
pub fn decode_form_text(text: &str) -> Cow<'_, str> {
    if !text.contains('+') && !text.contains('%') {
        return Cow::Borrowed(text);
    }

    let spaced = text.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(spaced),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        let text = "Midterm on 2025-10-10";
        assert!(matches!(decode_form_text(text), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_plus_and_percent_escapes() {
        assert_eq!(
            decode_form_text("course_outline=Assignment+1%3A+due+2025-10-20"),
            "course_outline=Assignment 1: due 2025-10-20"
        );
    }

    #[test]
    fn lone_percent_survives() {
        assert_eq!(decode_form_text("Final+worth+40%"), "Final worth 40%");
    }
}
