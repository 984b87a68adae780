//! Tokenizer for description markup.

use super::{ParseError, Span};

/// Tags understood by the block parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagName {
    Desc,
    Sentence,
    If,
    List,
    Item,
    Var,
}

impl TagName {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "desc" => TagName::Desc,
            "s" => TagName::Sentence,
            "if" => TagName::If,
            "il" => TagName::List,
            "item" => TagName::Item,
            "var" => TagName::Var,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TagName::Desc => "desc",
            TagName::Sentence => "s",
            TagName::If => "if",
            TagName::List => "il",
            TagName::Item => "item",
            TagName::Var => "var",
        }
    }

    /// Void tags never take a closing tag.
    pub fn is_void(self) -> bool {
        matches!(self, TagName::Var)
    }
}

/// One `key="value"` pair from an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub key: String,
    pub value: String,
}

/// A flat markup token. Spans are byte ranges into the source template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Open {
        tag: TagName,
        attrs: Vec<Attr>,
        self_closing: bool,
        span: Span,
    },
    Close {
        tag: TagName,
        span: Span,
    },
    Text {
        text: &'a str,
        span: Span,
    },
}

impl Token<'_> {
    pub fn span(&self) -> Span {
        match self {
            Token::Open { span, .. } | Token::Close { span, .. } | Token::Text { span, .. } => *span,
        }
    }
}

/// Split a template into tag and text tokens.
///
/// # Errors
/// Returns [`ParseError::UnterminatedTag`] when a recognized tag runs off the
/// end of the input, or [`ParseError::MalformedTag`] for bad attribute syntax.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut idx = 0;

    while let Some(rel) = input[idx..].find('<') {
        let lt = idx + rel;
        match scan_tag(input, lt)? {
            Some(token) => {
                if text_start < lt {
                    tokens.push(Token::Text {
                        text: &input[text_start..lt],
                        span: Span::new(text_start, lt),
                    });
                }
                idx = token.span().end;
                text_start = idx;
                tokens.push(token);
            },
            None => idx = lt + 1,
        }
    }

    if text_start < input.len() {
        tokens.push(Token::Text {
            text: &input[text_start..],
            span: Span::new(text_start, input.len()),
        });
    }
    Ok(tokens)
}

/// Try to read a tag starting at `start` (which holds `<`).
///
/// Returns `Ok(None)` when the `<` does not begin a recognized tag, in which
/// case it is ordinary text.
fn scan_tag(input: &str, start: usize) -> Result<Option<Token<'static>>, ParseError> {
    let bytes = input.as_bytes();
    let closing = bytes.get(start + 1) == Some(&b'/');
    let name_start = start + 1 + usize::from(closing);
    let name_end = name_start
        + input[name_start..]
            .bytes()
            .take_while(u8::is_ascii_alphabetic)
            .count();

    let Some(tag) = TagName::from_name(&input[name_start..name_end]) else {
        return Ok(None);
    };
    let name = tag.as_str();

    match bytes.get(name_end) {
        None => return Err(ParseError::UnterminatedTag { tag: name, offset: start }),
        Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {},
        // `<items>`, `<s2>` and the like are not our tags.
        Some(_) => return Ok(None),
    }

    let mut cursor = Cursor {
        input,
        pos: name_end,
        tag: name,
        start,
    };

    if closing {
        cursor.skip_ws();
        return match cursor.peek() {
            None => Err(cursor.unterminated()),
            Some(b'>') => Ok(Some(Token::Close {
                tag,
                span: Span::new(start, cursor.pos + 1),
            })),
            Some(_) => Err(cursor.malformed("closing tags take no attributes")),
        };
    }

    let mut attrs = Vec::new();
    loop {
        cursor.skip_ws();
        match cursor.peek() {
            None => return Err(cursor.unterminated()),
            Some(b'>') => {
                return Ok(Some(Token::Open {
                    tag,
                    attrs,
                    self_closing: false,
                    span: Span::new(start, cursor.pos + 1),
                }));
            },
            Some(b'/') => {
                cursor.pos += 1;
                return match cursor.peek() {
                    None => Err(cursor.unterminated()),
                    Some(b'>') => Ok(Some(Token::Open {
                        tag,
                        attrs,
                        self_closing: true,
                        span: Span::new(start, cursor.pos + 1),
                    })),
                    Some(_) => Err(cursor.malformed("expected '>' after '/'")),
                };
            },
            Some(_) => attrs.push(cursor.attr()?),
        }
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    tag: &'static str,
    start: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn unterminated(&self) -> ParseError {
        ParseError::UnterminatedTag {
            tag: self.tag,
            offset: self.start,
        }
    }

    fn malformed(&self, reason: &'static str) -> ParseError {
        ParseError::MalformedTag {
            tag: self.tag,
            offset: self.start,
            reason,
        }
    }

    fn attr(&mut self) -> Result<Attr, ParseError> {
        let key_start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            self.pos += 1;
        }
        if self.pos == key_start {
            return Err(self.malformed("expected an attribute name"));
        }
        let key = self.input[key_start..self.pos].to_ascii_lowercase();

        self.skip_ws();
        match self.peek() {
            None => return Err(self.unterminated()),
            Some(b'=') => self.pos += 1,
            Some(_) => return Err(self.malformed("attributes need a quoted value")),
        }
        self.skip_ws();

        let quote = match self.peek() {
            None => return Err(self.unterminated()),
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.malformed("attribute values must be quoted")),
        };
        let value_start = self.pos + 1;
        let Some(rel) = self.input[value_start..].find(char::from(quote)) else {
            return Err(self.unterminated());
        };
        let value_end = value_start + rel;
        self.pos = value_end + 1;

        Ok(Attr {
            key,
            value: self.input[value_start..value_end].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<String> {
        tokenize(input)
            .expect("tokenizes")
            .into_iter()
            .map(|t| match t {
                Token::Open { tag, self_closing, .. } => {
                    format!("<{}{}>", tag.as_str(), if self_closing { "/" } else { "" })
                },
                Token::Close { tag, .. } => format!("</{}>", tag.as_str()),
                Token::Text { text, .. } => text.to_string(),
            })
            .collect()
    }

    #[test]
    fn splits_tags_and_text() {
        assert_eq!(
            kinds("<s>You find <il></il>.</s>"),
            vec!["<s>", "You find ", "<il>", "</il>", ".", "</s>"]
        );
    }

    #[test]
    fn comparison_operators_in_prose_stay_text() {
        let input = r#"<s>In the corner, "x < 3 && x > -2" is written.</s>"#;
        assert_eq!(
            kinds(input),
            vec!["<s>", r#"In the corner, "x < 3 && x > -2" is written."#, "</s>"]
        );
    }

    #[test]
    fn unknown_tags_are_text() {
        assert_eq!(kinds("<b>bold</b> <items>"), vec!["<b>bold</b> <items>"]);
    }

    #[test]
    fn attributes_keep_inner_quotes_and_operators() {
        let tokens = tokenize(r#"<if cond="player.talent === 'Iris'"></if>"#).expect("tokenizes");
        let Token::Open { tag, attrs, .. } = &tokens[0] else {
            panic!("expected an opening tag, got {:?}", tokens[0]);
        };
        assert_eq!(*tag, TagName::If);
        assert_eq!(attrs[0].key, "cond");
        assert_eq!(attrs[0].value, "player.talent === 'Iris'");

        let tokens = tokenize("<if cond='this.uses > 1'>s</if>").expect("tokenizes");
        assert!(matches!(&tokens[0], Token::Open { attrs, .. } if attrs[0].value == "this.uses > 1"));
    }

    #[test]
    fn void_and_self_closing_tags() {
        assert_eq!(
            kinds(r#"<var v="this.uses" /> and <var v="this.name">"#),
            vec!["<var/>", " and ", "<var>"]
        );
    }

    #[test]
    fn spans_cover_source_bytes() {
        let input = "<s>Caf\u{e9} <il name=\"A\"></il></s>";
        for token in tokenize(input).expect("tokenizes") {
            let span = token.span();
            assert!(input.is_char_boundary(span.start) && input.is_char_boundary(span.end));
        }
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        assert_eq!(
            tokenize("<s>Hello <il name=\"x\"").unwrap_err(),
            ParseError::UnterminatedTag { tag: "il", offset: 9 }
        );
        assert!(matches!(
            tokenize("<s>Hello</s"),
            Err(ParseError::UnterminatedTag { tag: "s", .. })
        ));
    }

    #[test]
    fn unquoted_attribute_is_malformed() {
        assert!(matches!(
            tokenize("<il name=POCKET></il>"),
            Err(ParseError::MalformedTag { tag: "il", .. })
        ));
    }
}
