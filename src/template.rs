//! Placeholder substitution for document XML.
//!
//! Templates carry `{{key}}` tokens in their body text. [`render`]
//! substitutes each token with its value, XML-escaping the value so that
//! strings sourced from a database (names, organizations, rates) can never
//! break the document markup or inject elements into it.

/// Escape a value for insertion into XML text or attribute content.
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Substitute `{{key}}` tokens in `template` with XML-escaped values.
///
/// Every occurrence of each key is replaced. Tokens whose key has no entry
/// in `values` are left verbatim, so a half-filled document is visibly
/// half-filled rather than silently blanked.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        let token = format!("{{{{{key}}}}}");
        if rendered.contains(token.as_str()) {
            rendered = rendered.replace(token.as_str(), &escape_xml(value));
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_significant_characters() {
        assert_eq!(
            escape_xml(r#"<Fee & Sons> "rate" 'hourly'"#),
            "&lt;Fee &amp; Sons&gt; &quot;rate&quot; &apos;hourly&apos;"
        );
        assert_eq!(escape_xml("plain text"), "plain text");
    }

    #[test]
    fn substitutes_every_occurrence() {
        let xml = "<w:t>{{candidate_name}}</w:t><w:t>{{candidate_name}}</w:t>";
        let out = render(xml, &[("candidate_name", "Ada Lovelace")]);
        assert_eq!(out, "<w:t>Ada Lovelace</w:t><w:t>Ada Lovelace</w:t>");
    }

    #[test]
    fn escapes_substituted_values() {
        let out = render(
            "<w:t>{{org}}</w:t>",
            &[("org", "Smith & Wesson <Recruiting>")],
        );
        assert_eq!(
            out,
            "<w:t>Smith &amp; Wesson &lt;Recruiting&gt;</w:t>"
        );
    }

    #[test]
    fn leaves_unknown_tokens_verbatim() {
        let out = render("<w:t>{{rate}}</w:t>", &[("other", "x")]);
        assert_eq!(out, "<w:t>{{rate}}</w:t>");
    }

    #[test]
    fn handles_multiple_keys() {
        let out = render(
            "{{a}}-{{b}}-{{a}}",
            &[("a", "1"), ("b", "2")],
        );
        assert_eq!(out, "1-2-1");
    }
}
