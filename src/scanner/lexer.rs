use std::str::FromStr;

use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, cut_err, opt, preceded, repeat};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location, Stream};
use winnow::token::{any, none_of, one_of, take_till, take_until, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Keyword, Punctuator, Span, Token, TokenKind};

type Input<'a> = LocatingSlice<&'a str>;

// InputElement := Whitespace | LineTerminator | Comment | Token
// The alternatives are tried in that order and the first match wins.

fn whitespace<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        matches!(c, ' ' | '\t' | '\u{b}' | '\u{c}' | '\u{a0}' | '\u{feff}')
    })
    .parse_next(input)
}

fn line_terminator<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    alt(("\r\n", "\n", "\r", "\u{2028}", "\u{2029}")).parse_next(input)
}

fn comment<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    alt((
        ("/*", cut_err((take_until(0.., "*/"), "*/"))).take(),
        ("//", take_till(0.., ['\n', '\r'])).take(),
    ))
    .parse_next(input)
}

fn numeric_literal<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    alt((
        // Radix literals swallow every alphanumeric so that a bad digit
        // surfaces as a literal error instead of splitting the token.
        (
            '0',
            one_of(['b', 'B', 'o', 'O', 'x', 'X']),
            take_while(1.., |c: char| c.is_ascii_alphanumeric()),
        )
            .void(),
        (digit1, opt(('.', digit0))).void(),
        ('.', digit1).void(),
    ))
    .value(TokenKind::NumericLiteral)
    .parse_next(input)
}

fn quoted<'a>(quote: char) -> impl FnMut(&mut Input<'a>) -> ModalResult<&'a str> {
    move |input: &mut Input<'a>| {
        let body = repeat(
            0..,
            alt((preceded('\\', any), none_of([quote, '\\', '\n', '\r']))),
        )
        .map(|()| ());
        (quote, body, quote).take().parse_next(input)
    }
}

fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    alt((quoted('"'), quoted('\'')))
        .value(TokenKind::StringLiteral)
        .parse_next(input)
}

fn identifier_name<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    )
        .take()
        .parse_next(input)
}

fn boolean_literal<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    identifier_name
        .verify(|word: &str| word == "true" || word == "false")
        .value(TokenKind::BooleanLiteral)
        .parse_next(input)
}

fn null_literal<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    identifier_name
        .verify(|word: &str| word == "null")
        .value(TokenKind::NullLiteral)
        .parse_next(input)
}

fn literal<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    alt((numeric_literal, boolean_literal, string_literal, null_literal)).parse_next(input)
}

fn keyword<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    identifier_name
        .verify_map(|word: &str| Keyword::from_str(word).ok())
        .map(TokenKind::Keyword)
        .parse_next(input)
}

fn identifier<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    identifier_name
        .value(TokenKind::Identifier)
        .parse_next(input)
}

fn punctuator<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    alt((
        alt(("||", "&&", "==", "!=", "<=", ">=", "=>", "++", "--")),
        one_of(|c: char| "(){}[];,:?.=<>+-*/%!".contains(c)).take(),
    ))
    .verify_map(|text: &str| Punctuator::from_str(text).ok())
    .map(TokenKind::Punctuator)
    .parse_next(input)
}

fn token<'a>(input: &mut Input<'a>) -> ModalResult<TokenKind> {
    alt((literal, keyword, identifier, punctuator)).parse_next(input)
}

/// One lexical step: `None` for insignificant input, `Some(kind)` for a token.
fn input_element<'a>(input: &mut Input<'a>) -> ModalResult<Option<TokenKind>> {
    alt((
        whitespace.value(None),
        line_terminator.value(None),
        comment.value(None),
        token.map(Some),
    ))
    .parse_next(input)
}

/// The text reported for input that no rule accepts.
fn offending_slice(rest: &str) -> &str {
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    &rest[..end]
}

/// Lazy token stream over one source text.
///
/// Yields tokens in document order and always finishes with a single `Eof`
/// token. A lexical error is yielded once and ends the stream.
pub struct Scanner<'a> {
    input: Input<'a>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            input: LocatingSlice::new(source),
            finished: false,
        }
    }

    fn eof(&mut self) -> Token {
        self.finished = true;
        let offset = self.input.current_token_start();
        Token::new(TokenKind::Eof, "", Span::new(offset, 0))
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.input.is_empty() {
                return Some(Ok(self.eof()));
            }
            let start = self.input.current_token_start();
            let checkpoint = self.input.checkpoint();
            match input_element.with_taken().parse_next(&mut self.input) {
                // A zero-length match means the text is exhausted.
                Ok((_, "")) => return Some(Ok(self.eof())),
                Ok((None, _)) => continue,
                Ok((Some(kind), lexeme)) => {
                    let span = Span::new(start, lexeme.len());
                    return Some(Ok(Token::new(kind, lexeme, span)));
                }
                Err(_) => {
                    self.input.reset(&checkpoint);
                    self.finished = true;
                    let rest: &str = *self.input;
                    let slice = offending_slice(rest);
                    return Some(Err(CompileError::scan(
                        format!("unexpected token: {slice}"),
                        start,
                        slice.len(),
                    )));
                }
            }
        }
    }
}

/// Scan the whole source eagerly, stopping at the first lexical error.
pub fn scan_all(source: &str) -> Result<Vec<Token>, CompileError> {
    Scanner::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scan_ok(source: &str) -> Vec<Token> {
        scan_all(source).expect("scan should succeed")
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn punct(p: Punctuator) -> TokenKind {
        TokenKind::Punctuator(p)
    }

    #[test]
    fn empty_source_yields_only_eof() {
        let tokens = scan_ok("");
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
        assert_eq!(tokens[0].span, Span::new(0, 0));
    }

    #[test]
    fn declaration_statement() {
        let tokens = scan_ok("let a;");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier,
                punct(Punctuator::Semicolon),
                TokenKind::Eof,
            ]
        );
    }

    #[rstest]
    #[case("let", TokenKind::Keyword(Keyword::Let))]
    #[case("letter", TokenKind::Identifier)]
    #[case("whileLoop", TokenKind::Identifier)]
    #[case("true", TokenKind::BooleanLiteral)]
    #[case("trueish", TokenKind::Identifier)]
    #[case("null", TokenKind::NullLiteral)]
    #[case("nullable", TokenKind::Identifier)]
    #[case("$el", TokenKind::Identifier)]
    #[case("_private", TokenKind::Identifier)]
    #[case("function", TokenKind::Keyword(Keyword::Function))]
    fn word_classification(#[case] source: &str, #[case] expected: TokenKind) {
        let tokens = scan_ok(source);
        assert_eq!(tokens[0].kind, expected);
        assert_eq!(tokens[0].lexeme, source);
    }

    #[rstest]
    #[case("42")]
    #[case("3.14")]
    #[case("1.")]
    #[case(".5")]
    #[case("0b1011")]
    #[case("0o15")]
    #[case("0xA")]
    #[case("0xDeadBeef")]
    #[case("0b102")]
    fn numeric_literals_scan_whole(#[case] source: &str) {
        let tokens = scan_ok(source);
        assert_eq!(kinds(&tokens), vec![TokenKind::NumericLiteral, TokenKind::Eof]);
        assert_eq!(tokens[0].lexeme, source);
    }

    #[test]
    fn string_literal_keeps_quotes_and_escapes() {
        let tokens = scan_ok(r#""a\"b" 'c\'d'"#);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme, r#""a\"b""#);
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].lexeme, r"'c\'d'");
    }

    #[test]
    fn two_char_punctuators_win_over_single() {
        let tokens = scan_ok("a || b && c == d != e <= f >= g");
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Punctuator(_)))
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(ops, vec!["||", "&&", "==", "!=", "<=", ">="]);
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        let tokens = scan_ok("a // line\n/* block\n comment */ b\r\n\tc");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn slash_is_punctuator_outside_comments() {
        let tokens = scan_ok("a / b");
        assert_eq!(tokens[1].kind, punct(Punctuator::Slash));
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = scan_ok("var x = 42;");
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(4, 1));
        assert_eq!(tokens[2].span, Span::new(6, 1));
        assert_eq!(tokens[3].span, Span::new(8, 2));
        assert_eq!(tokens[4].span, Span::new(10, 1));
        assert_eq!(tokens[5].span, Span::new(11, 0));
    }

    #[test]
    fn unexpected_character_reports_slice() {
        let err = scan_all("let a = @foo;").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unexpected token"), "{message}");
        assert!(message.contains("@foo;"), "{message}");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(scan_all("\"unterminated").is_err());
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(scan_all("a /* never closed").is_err());
    }

    #[test]
    fn scanner_is_lazy_and_stops_after_eof() {
        let mut scanner = Scanner::new("a b");
        assert_eq!(scanner.next().unwrap().unwrap().lexeme, "a");
        assert_eq!(scanner.next().unwrap().unwrap().lexeme, "b");
        assert!(scanner.next().unwrap().unwrap().is_eof());
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn scanner_stops_after_error() {
        let mut scanner = Scanner::new("a # b");
        assert!(scanner.next().unwrap().is_ok());
        assert!(scanner.next().unwrap().is_err());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn tokens_and_trivia_reassemble_source() {
        let source = "function f(a) { /* c */ return a * 0x1F; } // tail\nf(1);\n";
        let tokens = scan_ok(source);
        let mut rebuilt = String::new();
        let mut cursor = 0;
        for token in &tokens {
            let gap = &source[cursor..token.span.offset];
            assert!(
                gap.trim().is_empty() || gap.trim_start().starts_with("/"),
                "gap should be trivia: {gap:?}"
            );
            rebuilt.push_str(gap);
            rebuilt.push_str(&token.lexeme);
            cursor = token.span.end();
        }
        assert_eq!(rebuilt, source);
    }
}
