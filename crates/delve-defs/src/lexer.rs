use std::fmt;

use logos::Logos;

use crate::diagnostics::Severity;
use crate::element::Span;

/// Token type for definition markup.
///
/// Comments, processing instructions and declarations never reach the token
/// stream. Character data between tags arrives as a single [`Token::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Start of an opening tag, `<`.
    Open,
    /// Start of a closing tag, `</`.
    OpenClose,
    /// End of a tag, `>`.
    Close,
    /// End of an empty-element tag, `/>`.
    SelfClose,
    /// Attribute assignment, `=`.
    Equals,
    /// Element or attribute name, possibly prefixed (`server:Brain`).
    Name(String),
    /// Quoted attribute value with references decoded.
    Value(String),
    /// Character data (including CDATA sections).
    Text(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => write!(f, "<"),
            Token::OpenClose => write!(f, "</"),
            Token::Close => write!(f, ">"),
            Token::SelfClose => write!(f, "/>"),
            Token::Equals => write!(f, "="),
            Token::Name(n) => write!(f, "{n}"),
            Token::Value(v) => write!(f, "\"{v}\""),
            Token::Text(_) => write!(f, "text"),
        }
    }
}

/// Tag-level tokens. Character data is scanned by hand between tags.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("<!--")]
    CommentStart,

    #[token("<![CDATA[")]
    CdataStart,

    #[token("<?")]
    InstructionStart,

    #[token("<!")]
    DeclarationStart,

    #[token("</")]
    OpenClose,

    #[token("<")]
    Open,

    #[token("/>")]
    SelfClose,

    #[token(">")]
    Close,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Quoted,

    #[regex(r"[\p{L}_][\p{L}\p{M}\p{N}_.:-]*")]
    Name,
}

/// A lexer problem with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Errors stop the file from loading; warnings only get reported.
    pub severity: Severity,
    /// Byte range of the erroneous input in the source.
    pub span: Span,
    /// Human-readable description of the lexer error.
    pub message: String,
}

impl LexError {
    fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }
}

/// Lex markup into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors so that every problem in a file is reported
/// at once. References that cannot be decoded come back as warnings.
pub fn lex(source: &str) -> (Vec<(Token, Span)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    // Character data is only legal between tags, which is exactly where the
    // lexer sits at the start and after every construct that ends a tag.
    let mut in_content = true;

    loop {
        if in_content {
            let start = lexer.span().end;
            let remainder = lexer.remainder();
            let len = remainder.find('<').unwrap_or(remainder.len());
            if len > 0 {
                let raw = &remainder[..len];
                lexer.bump(len);
                if !raw.trim().is_empty() {
                    let text = decode_references(raw, start, &mut errors);
                    tokens.push((Token::Text(text), start..start + len));
                }
            }
            in_content = false;
        }

        let Some(result) = lexer.next() else {
            break;
        };
        let span = lexer.span();

        let raw = match result {
            Ok(raw) => raw,
            Err(()) => {
                errors.push(LexError::error(
                    span.clone(),
                    format!("unexpected character in tag: {:?}", &source[span]),
                ));
                continue;
            }
        };

        let token = match raw {
            RawToken::CommentStart => {
                skip_to(&mut lexer, "-->", &span, "comment", &mut errors);
                in_content = true;
                continue;
            }
            RawToken::InstructionStart => {
                skip_to(&mut lexer, "?>", &span, "processing instruction", &mut errors);
                in_content = true;
                continue;
            }
            RawToken::DeclarationStart => {
                skip_to(&mut lexer, ">", &span, "declaration", &mut errors);
                in_content = true;
                continue;
            }
            RawToken::CdataStart => {
                let remainder = lexer.remainder();
                match remainder.find("]]>") {
                    Some(end) => {
                        let content = remainder[..end].to_string();
                        lexer.bump(end + 3);
                        tokens.push((Token::Text(content), span.start..lexer.span().end));
                    }
                    None => {
                        errors.push(LexError::error(
                            span.clone(),
                            "unterminated CDATA section (missing \"]]>\")",
                        ));
                        lexer.bump(remainder.len());
                    }
                }
                in_content = true;
                continue;
            }
            RawToken::Open => Token::Open,
            RawToken::OpenClose => Token::OpenClose,
            RawToken::Close => {
                in_content = true;
                Token::Close
            }
            RawToken::SelfClose => {
                in_content = true;
                Token::SelfClose
            }
            RawToken::Equals => Token::Equals,
            RawToken::Quoted => {
                let slice = lexer.slice();
                Token::Value(decode_references(&slice[1..slice.len() - 1], span.start + 1, &mut errors))
            }
            RawToken::Name => Token::Name(lexer.slice().to_string()),
        };
        tokens.push((token, span));
    }

    (tokens, errors)
}

fn skip_to(
    lexer: &mut logos::Lexer<'_, RawToken>,
    terminator: &str,
    span: &Span,
    what: &str,
    errors: &mut Vec<LexError>,
) {
    let remainder = lexer.remainder();
    match remainder.find(terminator) {
        Some(end) => lexer.bump(end + terminator.len()),
        None => {
            errors.push(LexError::error(
                span.clone(),
                format!("unterminated {what} (missing \"{terminator}\")"),
            ));
            lexer.bump(remainder.len());
        }
    }
}

/// Decode character and entity references.
///
/// The five predefined entities and numeric references are decoded. Anything
/// else, including references to code points that are not valid characters,
/// is kept verbatim and reported as a warning. `offset` is where `raw`
/// starts in the source.
pub fn decode_references(raw: &str, offset: usize, warnings: &mut Vec<LexError>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let at = offset + (raw.len() - rest.len()) + amp;
        let after = &rest[amp..];
        match after.find(';') {
            Some(semi) => {
                let name = &after[1..semi];
                match resolve_reference(name) {
                    Some(c) => out.push(c),
                    None => {
                        warnings.push(LexError::warning(
                            at..at + semi + 1,
                            format!("unknown reference \"{}\"", &after[..=semi]),
                        ));
                        out.push_str(&after[..=semi]);
                    }
                }
                rest = &after[semi + 1..];
            }
            None => {
                warnings.push(LexError::warning(at..at + 1, "unescaped \"&\""));
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "errors: {errors:?}");
        tokens.iter().map(|(t, _)| t.to_string()).collect()
    }

    #[test]
    fn lex_simple_element() {
        assert_eq!(
            kinds(r#"<entity name="dust"/>"#),
            vec!["<", "entity", "name", "=", "\"dust\"", "/>"]
        );
    }

    #[test]
    fn lex_text_between_tags() {
        let (tokens, errors) = lex("<Symbol> , </Symbol>");
        assert!(errors.is_empty());
        assert_eq!(tokens[3].0, Token::Text(" , ".to_string()));
        assert_eq!(tokens[3].1, 8..11);
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        assert_eq!(kinds("<a>\n    <b/>\n</a>").len(), 9);
    }

    #[test]
    fn lex_prefixed_names() {
        let (tokens, _) = lex("<server:Brain client:hint='x'/>");
        assert_eq!(tokens[1].0, Token::Name("server:Brain".to_string()));
        assert_eq!(tokens[2].0, Token::Name("client:hint".to_string()));
        assert_eq!(tokens[4].0, Token::Value("x".to_string()));
    }

    #[test]
    fn comments_and_instructions_are_skipped() {
        let source = "<?xml version=\"1.0\"?>\n<!-- a <tag> in a comment -->\n<a/>";
        assert_eq!(kinds(source), vec!["<", "a", "/>"]);
    }

    #[test]
    fn cdata_is_kept_raw() {
        let (tokens, errors) = lex("<a><![CDATA[1 < 2 &amp;]]></a>");
        assert!(errors.is_empty());
        assert_eq!(tokens[3].0, Token::Text("1 < 2 &amp;".to_string()));
    }

    #[test]
    fn unterminated_comment_is_reported() {
        let (_, errors) = lex("<a/><!-- never closed");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("comment"));
    }

    #[test]
    fn unexpected_character_in_tag_is_reported() {
        let (tokens, errors) = lex("<a %/>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 3..4);
        assert_eq!(tokens.last().map(|(t, _)| t.clone()), Some(Token::SelfClose));
    }

    #[test]
    fn unicode_names() {
        let (tokens, errors) = lex("<Größe>3</Größe><données_été ключ='x'/>");
        assert!(errors.is_empty(), "errors: {errors:?}");
        assert_eq!(tokens[1].0, Token::Name("Größe".to_string()));
        assert_eq!(tokens[5].0, Token::Name("Größe".to_string()));
        assert_eq!(tokens[8].0, Token::Name("données_été".to_string()));
        assert_eq!(tokens[9].0, Token::Name("ключ".to_string()));
    }

    fn decode(raw: &str) -> (String, Vec<LexError>) {
        let mut warnings = Vec::new();
        let out = decode_references(raw, 0, &mut warnings);
        (out, warnings)
    }

    #[test]
    fn decode_predefined_entities() {
        let (out, warnings) = decode("&lt;a&gt; &amp; &quot;&apos;");
        assert_eq!(out, "<a> & \"'");
        assert!(warnings.is_empty());
    }

    #[test]
    fn decode_numeric_references() {
        assert_eq!(decode("&#65;&#x42;&#X43;").0, "ABC");
    }

    #[test]
    fn unknown_references_are_kept_with_warnings() {
        let (out, warnings) = decode("&nbsp; &#xD800; & done");
        assert_eq!(out, "&nbsp; &#xD800; & done");
        let spans: Vec<_> = warnings.iter().map(|w| w.span.clone()).collect();
        assert_eq!(spans, vec![0..6, 7..15, 16..17]);
        assert!(warnings.iter().all(|w| w.severity == Severity::Warning));
        assert!(warnings[0].message.contains("&nbsp;"));
    }

    #[test]
    fn reference_warnings_point_into_the_source() {
        let source = "<a k=\"x&bogus;\">caf&eacute;</a>";
        let (_, warnings) = lex(source);
        assert_eq!(warnings.len(), 2);
        assert_eq!(&source[warnings[0].span.clone()], "&bogus;");
        assert_eq!(&source[warnings[1].span.clone()], "&eacute;");
    }
}
