//! Filter templating helpers.

/// Placeholder substituted by [`render_template`].
pub const PLACEHOLDER: &str = "{}";

/// Escapes special characters in LDAP filter values (RFC 4515).
///
/// Non-ASCII characters are escaped byte by byte in their UTF-8 form.
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\5c"),
            '*' => result.push_str("\\2a"),
            '(' => result.push_str("\\28"),
            ')' => result.push_str("\\29"),
            '\0' => result.push_str("\\00"),
            c if c.is_ascii() => result.push(c),
            c => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    result.push_str(&format!("\\{b:02x}"));
                }
            }
        }
    }
    result
}

/// Substitutes an already escaped value into a filter template.
#[must_use]
pub fn render_template(template: &str, escaped_value: &str) -> String {
    template.replacen(PLACEHOLDER, escaped_value, 1)
}

/// Escapes `value` and substitutes it into a filter template.
#[must_use]
pub fn render_escaped(template: &str, value: &str) -> String {
    render_template(template, &escape_filter_value(value))
}
