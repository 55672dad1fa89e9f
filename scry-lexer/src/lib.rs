use logos::{FilterResult, Logos};

pub mod balance;
pub use balance::{scan, Balance, Delim};

/// Error category produced while the raw lexer is running. Spans are
/// attached by the [`Lexer`] wrapper.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexErrorKind {
    #[default]
    Invalid,
    UnterminatedString,
    UnterminatedComment,
}

/// Consume a double-quoted string body after the opening quote token.
/// The closing quote may sit on a later physical line; running out of
/// input is an unterminated-string error, not a generic failure.
fn lex_string(lex: &mut logos::Lexer<Token>) -> FilterResult<String, LexErrorKind> {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => {
                lex.bump(i + 1);
                return FilterResult::Emit(lex.slice().to_string());
            }
            _ => i += 1,
        }
    }
    lex.bump(lex.remainder().len());
    FilterResult::Error(LexErrorKind::UnterminatedString)
}

/// Consume a raw string after its `r#*"` opener. The closer must repeat
/// the same number of `#` marks.
fn lex_raw_string(lex: &mut logos::Lexer<Token>) -> FilterResult<String, LexErrorKind> {
    let hashes = lex.slice().bytes().filter(|&b| b == b'#').count();
    let mut closer = String::with_capacity(hashes + 1);
    closer.push('"');
    for _ in 0..hashes {
        closer.push('#');
    }
    match lex.remainder().find(&closer) {
        Some(pos) => {
            lex.bump(pos + closer.len());
            FilterResult::Emit(lex.slice().to_string())
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(LexErrorKind::UnterminatedString)
        }
    }
}

/// Consume a block comment after its `/*` opener.
fn lex_block_comment(lex: &mut logos::Lexer<Token>) -> FilterResult<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(pos) => {
            lex.bump(pos + 2);
            FilterResult::Emit(())
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(LexErrorKind::UnterminatedComment)
        }
    }
}

/// Token types for source snippets around a call site
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(error = LexErrorKind)]
pub enum Token {
    // Keywords consumed by import-alias discovery
    #[token("use")]
    Use,
    #[token("as")]
    As,
    #[token("pub")]
    Pub,
    #[token("crate")]
    Crate,
    #[token("self")]
    SelfKw,
    #[token("super")]
    Super,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("::")]
    PathSep,
    #[token(":")]
    Colon,
    #[token("!")]
    Bang,
    #[token("#")]
    Pound,
    #[token("?")]
    Question,
    #[token("@")]
    At,
    #[token("..=")]
    DotDotEq,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,

    // Operators (compound before single)
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,

    // Literals
    // String forms share one kind: plain, byte, and raw strings. The
    // stored text is the raw slice including quote marks.
    #[token("\"", lex_string)]
    #[token("b\"", lex_string)]
    #[regex(r##"r#*""##, lex_raw_string)]
    #[regex(r##"br#*""##, lex_raw_string)]
    Str(String),

    #[regex(r"'([^'\\]|\\.)'", |lex| lex.slice().to_string())]
    Char(String),

    #[regex(r"'[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Lifetime(String),

    // Numeric literals keep their raw spelling; suffixes (42i64, 3.5f32)
    // stay attached to the token.
    #[regex(r"0[xX][0-9a-fA-F_]+[a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01_]+[a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"0[oO][0-7_]+[a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9_]+)?([iuf](8|16|32|64|128|size)?)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Underscore wildcard - higher priority than Ident
    #[token("_", priority = 10)]
    Underscore,

    // Comments are kept as tokens so downstream scans can skip them
    // without losing span coverage.
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    // Anything else (stray quote marks, unicode punctuation) becomes an
    // opaque token instead of a lex failure.
    #[regex(r"[^ \t\r\n\f]", |lex| lex.slice().to_string(), priority = 1)]
    Other(String),
}

impl Token {
    /// True for every string-literal form.
    pub fn is_string(&self) -> bool {
        matches!(self, Token::Str(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment)
    }

    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

impl TokenSpan {
    /// The raw source text this token covers.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.clone()).unwrap_or("")
    }
}

pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<TokenSpan, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        let span = self.inner.span();

        match token {
            Ok(tok) => Some(Ok(TokenSpan { token: tok, span })),
            Err(kind) => Some(Err(LexError::with_span(kind, span))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Invalid token at {span:?}")]
    InvalidToken { span: std::ops::Range<usize> },
    #[error("Unterminated string literal at {span:?}")]
    UnterminatedString { span: std::ops::Range<usize> },
    #[error("Unterminated block comment at {span:?}")]
    UnterminatedComment { span: std::ops::Range<usize> },
}

impl LexError {
    fn with_span(kind: LexErrorKind, span: std::ops::Range<usize>) -> Self {
        match kind {
            LexErrorKind::Invalid => LexError::InvalidToken { span },
            LexErrorKind::UnterminatedString => LexError::UnterminatedString { span },
            LexErrorKind::UnterminatedComment => LexError::UnterminatedComment { span },
        }
    }

    /// True when more input could still complete the construct.
    pub fn is_unterminated(&self) -> bool {
        matches!(
            self,
            LexError::UnterminatedString { .. } | LexError::UnterminatedComment { .. }
        )
    }
}

/// Tokenize a full snippet, collecting tokens and errors side by side.
pub fn tokenize(source: &str) -> (Vec<TokenSpan>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for item in Lexer::new(source) {
        match item {
            Ok(ts) => tokens.push(ts),
            Err(err) => errors.push(err),
        }
    }
    (tokens, errors)
}
