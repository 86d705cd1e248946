use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::diagnostics::{Diagnostic, Severity};
use crate::element::{Attribute, Element, Name, Span};
use crate::lexer::{self, Token};
use crate::namespace::{CLIENT_NAMESPACE, SERVER_NAMESPACE};

/// Local name of the implicit root that wraps every definition file.
pub const ROOT_ELEMENT: &str = "definitions";

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

type TokenSpan = SimpleSpan;

/// A raw name with its source span, before prefix resolution.
type Named = (String, Span);

/// A successfully read definition file.
#[derive(Debug, Clone)]
pub struct Document {
    /// The implicit `<definitions>` root holding the file's elements.
    pub root: Element,
    /// Problems that did not stop the file from loading.
    pub warnings: Vec<Diagnostic>,
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Element(RawElement),
}

/// An element as written, prefixes unresolved.
#[derive(Debug, Clone)]
struct RawElement {
    name: Named,
    attributes: Vec<(Named, String)>,
    content: Vec<Node>,
    closing: Option<Named>,
    span: Span,
}

fn content_parser<'a, I>() -> impl Parser<'a, I, Vec<Node>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = TokenSpan>,
{
    let name = select! { Token::Name(n) => n }
        .map_with(|n, e| (n, <TokenSpan>::into_range(e.span())))
        .labelled("name");

    let value = select! { Token::Value(v) => v }.labelled("quoted value");

    let text = select! { Token::Text(t) => Node::Text(t) };

    // name="value"
    let attribute = name.clone().then_ignore(just(Token::Equals)).then(value);

    let element = recursive(|element| {
        let open = just(Token::Open).map_with(|_, e| <TokenSpan>::into_range(e.span()));

        // <name .../>
        let empty = just(Token::SelfClose)
            .map_with(|_, e| (Vec::<Node>::new(), None::<Named>, <TokenSpan>::into_range(e.span())));

        // <name ...> content </name>
        let body = choice((text.clone(), element.map(Node::Element)))
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::Close), just(Token::OpenClose))
            .then(name.clone())
            .then(just(Token::Close).map_with(|_, e| <TokenSpan>::into_range(e.span())))
            .map(|((content, closing), end)| (content, Some(closing), end));

        open.then(name.clone())
            .then(attribute.repeated().collect::<Vec<_>>())
            .then(choice((empty, body)))
            .map(|(((open, name), attributes), (content, closing, end))| RawElement {
                name,
                attributes,
                content,
                closing,
                span: open.start..end.end,
            })
            .labelled("element")
    });

    choice((text, element.map(Node::Element)))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn parse_nodes(tokens: &[(Token, Span)]) -> (Option<Vec<Node>>, Vec<Diagnostic>) {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), TokenSpan::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: TokenSpan = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = content_parser().parse(stream).into_output_errors();

    let diagnostics = errors
        .into_iter()
        .map(|e| Diagnostic::error(e.span().into_range(), e.to_string()))
        .collect();
    (output, diagnostics)
}

// ---------------------------------------------------------------------------
// Namespace resolution
// ---------------------------------------------------------------------------

/// Prefix bindings in effect at some point of the document.
#[derive(Debug, Clone)]
struct Scope {
    bindings: Vec<(String, String)>,
    default: Option<String>,
}

impl Scope {
    fn root() -> Self {
        Self {
            bindings: vec![
                ("xml".to_string(), XML_NAMESPACE.to_string()),
                ("server".to_string(), SERVER_NAMESPACE.to_string()),
                ("client".to_string(), CLIENT_NAMESPACE.to_string()),
            ],
            default: None,
        }
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Resolve a raw `prefix:local` name. Unprefixed attributes never take
    /// the default namespace.
    fn resolve(&self, raw: &str, is_attribute: bool, span: &Span) -> Result<Name, Diagnostic> {
        match raw.split_once(':') {
            Some((prefix, local)) => match self.lookup(prefix) {
                Some(uri) => Ok(Name::qualified(uri, local)),
                None => Err(Diagnostic::error(
                    span.clone(),
                    format!("undeclared namespace prefix \"{prefix}\" in \"{raw}\""),
                )
                .with_label(format!("add xmlns:{prefix}=\"...\" to an enclosing element"))),
            },
            None if is_attribute => Ok(Name::local(raw)),
            None => Ok(Name {
                namespace: self.default.clone(),
                local: raw.to_string(),
            }),
        }
    }

    /// Resolve, recording a failure and falling back to the raw name.
    fn resolve_or_report(&self, raw: &str, is_attribute: bool, span: &Span, diagnostics: &mut Vec<Diagnostic>) -> Name {
        self.resolve(raw, is_attribute, span).unwrap_or_else(|d| {
            diagnostics.push(d);
            Name::local(raw)
        })
    }
}

/// Turn a raw element into an [`Element`] under `parent`'s bindings.
///
/// Namespace declarations apply to the element that carries them.
fn build_element(raw: RawElement, parent: &Scope, diagnostics: &mut Vec<Diagnostic>) -> Element {
    let RawElement {
        name: (raw_name, name_span),
        attributes: raw_attributes,
        content,
        closing,
        span,
    } = raw;

    if let Some((closing, closing_span)) = closing
        && closing != raw_name
    {
        diagnostics.push(
            Diagnostic::error(
                closing_span,
                format!("mismatched closing tag: expected </{raw_name}>, found </{closing}>"),
            )
            .with_label(format!("does not close <{raw_name}>")),
        );
    }

    let mut scope = parent.clone();
    let mut attributes_in = Vec::with_capacity(raw_attributes.len());
    for ((raw, attr_span), value) in raw_attributes {
        if raw == "xmlns" {
            scope.default = (!value.is_empty()).then_some(value);
        } else if let Some(prefix) = raw.strip_prefix("xmlns:") {
            scope.bindings.push((prefix.to_string(), value));
        } else {
            attributes_in.push((raw, attr_span, value));
        }
    }

    let mut element = Element::new(scope.resolve_or_report(&raw_name, false, &name_span, diagnostics));
    element.span = span;
    element.attributes = attributes_in
        .into_iter()
        .map(|(raw, attr_span, value)| Attribute {
            name: scope.resolve_or_report(&raw, true, &attr_span, diagnostics),
            value,
        })
        .collect();
    append_content(&mut element, content, &scope, diagnostics);
    element
}

fn append_content(element: &mut Element, content: Vec<Node>, scope: &Scope, diagnostics: &mut Vec<Diagnostic>) {
    for node in content {
        match node {
            Node::Text(t) => element.text.push_str(&t),
            Node::Element(raw) => element.children.push(build_element(raw, scope, diagnostics)),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read definition markup into a tree rooted at an implicit
/// `<definitions>` element.
///
/// The root declares the reserved `server` and `client` prefixes, so files
/// can use them without declaring them. Spans refer to `source`. Fails with
/// every diagnostic found if any of them is an error.
pub fn read_definitions(source: &str) -> Result<Document, Vec<Diagnostic>> {
    let (tokens, lex_errors) = lexer::lex(source);

    let mut diagnostics: Vec<Diagnostic> = lex_errors
        .into_iter()
        .map(|e| match e.severity {
            Severity::Error => Diagnostic::error(e.span, e.message),
            Severity::Warning => Diagnostic::warning(e.span, e.message).with_label("kept verbatim"),
        })
        .collect();

    let (nodes, parse_errors) = parse_nodes(&tokens);
    diagnostics.extend(parse_errors);

    let mut root = Element::named(ROOT_ELEMENT);
    root.span = 0..source.len();
    if let Some(nodes) = nodes {
        append_content(&mut root, nodes, &Scope::root(), &mut diagnostics);
    }

    if diagnostics.iter().any(Diagnostic::is_error) {
        Err(diagnostics)
    } else {
        Ok(Document {
            root,
            warnings: diagnostics,
        })
    }
}
