//! HTML escaping that remembers where each source character landed

/// Escape text for safe insertion into HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Escaped text plus a map from source char index to byte offset in `html`
#[derive(Debug, Clone)]
pub(crate) struct EscapedText {
    pub html: String,
    offsets: Vec<usize>,
}

impl EscapedText {
    pub fn new(chars: &[char]) -> Self {
        let mut html = String::with_capacity(chars.len());
        let mut offsets = Vec::with_capacity(chars.len() + 1);

        for &c in chars {
            offsets.push(html.len());
            push_escaped(&mut html, c);
        }
        offsets.push(html.len());

        Self { html, offsets }
    }

    /// Byte offset in `html` where source char `index` begins.
    /// `index == len` maps to the end of the string.
    pub fn offset(&self, index: usize) -> usize {
        self.offsets[index.min(self.offsets.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_offsets_skip_whole_entities() {
        let chars: Vec<char> = "a&b".chars().collect();
        let escaped = EscapedText::new(&chars);
        assert_eq!(escaped.html, "a&amp;b");
        assert_eq!(escaped.offset(0), 0);
        assert_eq!(escaped.offset(1), 1);
        assert_eq!(escaped.offset(2), 6);
        assert_eq!(escaped.offset(3), 7);
    }

    #[test]
    fn test_offsets_are_byte_offsets_for_multibyte_chars() {
        let chars: Vec<char> = "é<".chars().collect();
        let escaped = EscapedText::new(&chars);
        assert_eq!(escaped.offset(1), 2);
        assert_eq!(&escaped.html[escaped.offset(1)..], "&lt;");
    }
}
