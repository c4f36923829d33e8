use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Reserved words. Every keyword is also a valid identifier shape, so the
/// scanner must try this set before falling back to `Identifier`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Break,
    Case,
    Catch,
    Const,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    In,
    Instanceof,
    Let,
    New,
    Return,
    Switch,
    This,
    Throw,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
    Yield,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum Punctuator {
    #[strum(serialize = "||")]
    PipePipe,
    #[strum(serialize = "&&")]
    AmpAmp,
    #[strum(serialize = "==")]
    EqualEqual,
    #[strum(serialize = "!=")]
    BangEqual,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "=>")]
    Arrow,
    #[strum(serialize = "++")]
    PlusPlus,
    #[strum(serialize = "--")]
    MinusMinus,
    #[strum(serialize = "(")]
    LeftParen,
    #[strum(serialize = ")")]
    RightParen,
    #[strum(serialize = "{")]
    LeftBrace,
    #[strum(serialize = "}")]
    RightBrace,
    #[strum(serialize = "[")]
    LeftBracket,
    #[strum(serialize = "]")]
    RightBracket,
    #[strum(serialize = ";")]
    Semicolon,
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = ":")]
    Colon,
    #[strum(serialize = "?")]
    Question,
    #[strum(serialize = ".")]
    Dot,
    #[strum(serialize = "=")]
    Equal,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Star,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "%")]
    Percent,
    #[strum(serialize = "!")]
    Bang,
}

// Written by hand: strum's derived Display reads `{` and `}` as format
// placeholders.
impl fmt::Display for Punctuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Token classification. Literal and identifier kinds are named after
/// their lexical category; keywords and punctuators are named by their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    NumericLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    Identifier,
    Keyword(Keyword),
    Punctuator(Punctuator),
    Eof,
}

impl TokenKind {
    /// Resolve the name a grammar uses for a terminal symbol.
    pub fn from_symbol_name(name: &str) -> Option<Self> {
        match name {
            "NumericLiteral" => Some(Self::NumericLiteral),
            "StringLiteral" => Some(Self::StringLiteral),
            "BooleanLiteral" => Some(Self::BooleanLiteral),
            "NullLiteral" => Some(Self::NullLiteral),
            "Identifier" => Some(Self::Identifier),
            "EOF" => Some(Self::Eof),
            _ => Keyword::from_str(name)
                .map(Self::Keyword)
                .or_else(|_| Punctuator::from_str(name).map(Self::Punctuator))
                .ok(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericLiteral => write!(f, "NumericLiteral"),
            Self::StringLiteral => write!(f, "StringLiteral"),
            Self::BooleanLiteral => write!(f, "BooleanLiteral"),
            Self::NullLiteral => write!(f, "NullLiteral"),
            Self::Identifier => write!(f, "Identifier"),
            Self::Keyword(k) => write!(f, "{k}"),
            Self::Punctuator(p) => write!(f, "{p}"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

impl Serialize for TokenKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Source text exactly as matched; string literals keep their quotes.
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' @{}", self.kind, self.lexeme, self.span.offset)
    }
}
