//! Tokens
use smol_str::SmolStr;
use std::{error, fmt, str::FromStr};

/// Lexical unit produced by the upstream scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based source line.
    pub line: u32,
    /// Raw matched text.
    pub lexeme: SmolStr,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, lexeme: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            line,
            lexeme: lexeme.into(),
        }
    }
}

/// Formats the token as a record in the token stream format.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.line, self.lexeme)
    }
}

impl FromStr for Token {
    type Err = TokenError;

    /// Parse a `kind line lexeme` record.
    ///
    /// The lexeme is every field after the line number, joined
    /// back together by single spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();

        let kind = fields.next().ok_or(TokenError::MissingField("kind"))?;
        let kind = TokenKind::parse(kind).ok_or_else(|| TokenError::UnknownKind(SmolStr::from(kind)))?;

        let line = fields.next().ok_or(TokenError::MissingField("line"))?;
        let line = line
            .parse::<u32>()
            .map_err(|_| TokenError::InvalidLine(SmolStr::from(line)))?;

        let lexeme = itertools::join(fields, " ");
        if lexeme.is_empty() {
            return Err(TokenError::MissingField("lexeme"));
        }

        Ok(Token::new(kind, line, lexeme))
    }
}

/// Terminal symbols of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[rustfmt::skip]
pub enum TokenKind {
    Ident,      // IDN
    Number,     // BROJ
    Assign,     // OP_PRIDRUZI
    Plus,       // OP_PLUS
    Minus,      // OP_MINUS
    Star,       // OP_PUTA
    Slash,      // OP_DIJELI
    LeftParen,  // L_ZAGRADA
    RightParen, // D_ZAGRADA

    // ------------------------------------------------------------------------
    // Keywords
    For,        // KR_ZA
    From,       // KR_OD
    To,         // KR_DO
    End,        // KR_AZ
}

impl TokenKind {
    /// Number of terminals, used to size the parser table.
    pub const COUNT: usize = 13;

    #[rustfmt::skip]
    pub const ALL: [TokenKind; Self::COUNT] = [
        TokenKind::Ident, TokenKind::Number, TokenKind::Assign,
        TokenKind::Plus, TokenKind::Minus, TokenKind::Star, TokenKind::Slash,
        TokenKind::LeftParen, TokenKind::RightParen,
        TokenKind::For, TokenKind::From, TokenKind::To, TokenKind::End,
    ];

    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "IDN"         => Some(Self::Ident),
            "BROJ"        => Some(Self::Number),
            "OP_PRIDRUZI" => Some(Self::Assign),
            "OP_PLUS"     => Some(Self::Plus),
            "OP_MINUS"    => Some(Self::Minus),
            "OP_PUTA"     => Some(Self::Star),
            "OP_DIJELI"   => Some(Self::Slash),
            "L_ZAGRADA"   => Some(Self::LeftParen),
            "D_ZAGRADA"   => Some(Self::RightParen),
            "KR_ZA"       => Some(Self::For),
            "KR_OD"       => Some(Self::From),
            "KR_DO"       => Some(Self::To),
            "KR_AZ"       => Some(Self::End),
            _ => None,
        }
    }

    /// Name of the token kind in the token and tree text formats.
    #[rustfmt::skip]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ident      => "IDN",
            Self::Number     => "BROJ",
            Self::Assign     => "OP_PRIDRUZI",
            Self::Plus       => "OP_PLUS",
            Self::Minus      => "OP_MINUS",
            Self::Star       => "OP_PUTA",
            Self::Slash      => "OP_DIJELI",
            Self::LeftParen  => "L_ZAGRADA",
            Self::RightParen => "D_ZAGRADA",
            Self::For        => "KR_ZA",
            Self::From       => "KR_OD",
            Self::To         => "KR_DO",
            Self::End        => "KR_AZ",
        }
    }

    /// Column index in the parser table.
    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a token record can't be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    MissingField(&'static str),
    UnknownKind(SmolStr),
    InvalidLine(SmolStr),
    /// Wraps another token error with the line of the
    /// token stream text it was found on.
    AtLine(usize, Box<TokenError>),
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::MissingField(field) => write!(f, "token record is missing its {field}"),
            E::UnknownKind(kind) => write!(f, "unknown token kind '{kind}'"),
            E::InvalidLine(line) => write!(f, "invalid source line number '{line}'"),
            E::AtLine(line, err) => write!(f, "token stream line {line}: {err}"),
        }
    }
}
