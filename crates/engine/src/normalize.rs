use crate::table::Scalar;

/// Canonicalize a raw cell into its comparable textual form.
///
/// Rules, in order: missing cells normalize to the empty string; text is
/// trimmed; a trailing `.0` whole-number artifact is stripped; the result is
/// upper-cased. Two cells hold the same answer iff their normalized forms
/// are equal.
pub fn normalize(value: &Scalar) -> String {
    if value.is_missing() {
        return String::new();
    }
    let text = value.to_display();
    let mut text = text.trim();
    while let Some(stripped) = text.strip_suffix(".0") {
        text = stripped;
    }
    text.to_uppercase()
}
