//! Lexer for nginx-style configuration text.
//!
//! Two lexical modes are required to keep the grammar one-token
//! lookahead: at the top level an identifier switches the lexer into
//! "head" mode, where everything up to the terminating `;` or `{` is
//! a parameter/value token. `;`, `{` and `}` switch back to the top
//! level. Newline runs and comments are captured verbatim so that an
//! unmodified tree can be dumped back byte for byte.

use logos::Logos;
use std::fmt;

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl From<logos::Span> for Location {
    fn from(span: logos::Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

/// A token with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Location,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: impl Into<Location>) -> Self {
        Self {
            value,
            span: span.into(),
        }
    }
}

/// Tokens recognized at the top level, between statements.
#[derive(Logos, Debug, Clone, PartialEq)]
enum RootToken {
    // Horizontal whitespace only; newlines are significant trivia.
    #[regex(r"[ \t\f]+", logos::skip)]
    Whitespace,

    /// Run of consecutive line breaks, captured verbatim.
    #[regex(r"[\r\n]+", |lex| lex.slice().to_owned())]
    Newlines(String),

    /// Comment to end of line, including the `#` marker and the
    /// terminating newline when present.
    #[regex(r"#[^\n]*\n?", |lex| lex.slice().to_owned())]
    Comment(String),

    #[token("}")]
    BlockEnd,

    /// Directive or block identifier; switches into head mode.
    #[regex(r"[\w\-./]+", |lex| lex.slice().to_owned())]
    Ident(String),
}

/// Tokens recognized in head mode, after an identifier and before the
/// terminating `;` or `{`.
#[derive(Logos, Debug, Clone, PartialEq)]
enum HeadToken {
    #[regex(r"[ \t\f]+", logos::skip)]
    Whitespace,

    #[regex(r"[\r\n]+", |lex| lex.slice().to_owned())]
    Newlines(String),

    #[regex(r"#[^\n]*\n?", |lex| lex.slice().to_owned())]
    Comment(String),

    /// Double-quoted span, captured with the quotes.
    #[regex(r#""[^"]*""#, |lex| lex.slice().to_owned())]
    DoubleQuoted(String),

    /// Single-quoted span, captured with the quotes.
    #[regex(r"'[^']*'", |lex| lex.slice().to_owned())]
    SingleQuoted(String),

    /// Bare value expression.
    #[regex(r#"[^;{}#"'\s]+"#, |lex| lex.slice().to_owned())]
    Expression(String),

    #[token(";")]
    Semicolon,

    #[token("{")]
    BlockStart,

    #[token("}")]
    BlockEnd,
}

/// Unified token stream handed to the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Run of consecutive line breaks, verbatim.
    Newlines(String),
    /// `# ...` comment, verbatim, terminating newline included.
    Comment(String),
    /// Directive or block identifier.
    Ident(String),
    /// Bare value expression.
    Expression(String),
    /// `"..."` value, quotes included.
    DoubleQuoted(String),
    /// `'...'` value, quotes included.
    SingleQuoted(String),
    Semicolon,
    BlockStart,
    BlockEnd,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Newlines(_) => write!(f, "newline"),
            Token::Comment(text) => write!(f, "{}", text.trim_end()),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Expression(text) => write!(f, "{}", text),
            Token::DoubleQuoted(text) | Token::SingleQuoted(text) => write!(f, "{}", text),
            Token::Semicolon => write!(f, ";"),
            Token::BlockStart => write!(f, "{{"),
            Token::BlockEnd => write!(f, "}}"),
        }
    }
}

/// Lexer error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character at position {position}")]
    UnexpectedChar { position: usize },
}

/// Lexer result type.
pub type LexResult = Result<Vec<Spanned<Token>>, LexError>;

/// Tokenize a configuration source string.
pub fn tokenize(source: &str) -> LexResult {
    let mut tokens = Vec::new();
    let mut root = RootToken::lexer(source);

    while let Some(result) = root.next() {
        let span = root.span();
        let token = result.map_err(|_| LexError::UnexpectedChar {
            position: span.start,
        })?;

        match token {
            RootToken::Whitespace => continue,
            RootToken::Newlines(text) => tokens.push(Spanned::new(Token::Newlines(text), span)),
            RootToken::Comment(text) => tokens.push(Spanned::new(Token::Comment(text), span)),
            RootToken::BlockEnd => tokens.push(Spanned::new(Token::BlockEnd, span)),
            RootToken::Ident(name) => {
                tokens.push(Spanned::new(Token::Ident(name), span));
                root = lex_head(root.morph(), &mut tokens)?;
            }
        }
    }

    Ok(tokens)
}

/// Consume head-mode tokens until a terminator returns the lexer to
/// the top level. Hitting end of input here is left for the parser to
/// report as a missing terminator.
fn lex_head<'s>(
    mut head: logos::Lexer<'s, HeadToken>,
    tokens: &mut Vec<Spanned<Token>>,
) -> Result<logos::Lexer<'s, RootToken>, LexError> {
    while let Some(result) = head.next() {
        let span = head.span();
        let token = result.map_err(|_| LexError::UnexpectedChar {
            position: span.start,
        })?;

        match token {
            HeadToken::Whitespace => continue,
            HeadToken::Newlines(text) => tokens.push(Spanned::new(Token::Newlines(text), span)),
            HeadToken::Comment(text) => tokens.push(Spanned::new(Token::Comment(text), span)),
            HeadToken::DoubleQuoted(text) => {
                tokens.push(Spanned::new(Token::DoubleQuoted(text), span))
            }
            HeadToken::SingleQuoted(text) => {
                tokens.push(Spanned::new(Token::SingleQuoted(text), span))
            }
            HeadToken::Expression(text) => {
                tokens.push(Spanned::new(Token::Expression(text), span))
            }
            HeadToken::Semicolon => {
                tokens.push(Spanned::new(Token::Semicolon, span));
                break;
            }
            HeadToken::BlockStart => {
                tokens.push(Spanned::new(Token::BlockStart, span));
                break;
            }
            HeadToken::BlockEnd => {
                tokens.push(Spanned::new(Token::BlockEnd, span));
                break;
            }
        }
    }

    Ok(head.morph())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_basic_directive() {
        let tokens = values("listen 80;");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("listen".to_string()),
                Token::Expression("80".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_block_mode_switch() {
        let tokens = values("server {\n    listen 80;\n}");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("server".to_string()),
                Token::BlockStart,
                Token::Newlines("\n".to_string()),
                Token::Ident("listen".to_string()),
                Token::Expression("80".to_string()),
                Token::Semicolon,
                Token::Newlines("\n".to_string()),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_newline_runs_are_verbatim() {
        let tokens = values("a;\n\n\nb;");
        assert_eq!(tokens[3], Token::Newlines("\n\n\n".to_string()));
    }

    #[test]
    fn test_comment_owns_trailing_newline() {
        let tokens = values("# top\nlisten 80;");
        assert_eq!(tokens[0], Token::Comment("# top\n".to_string()));
        assert_eq!(tokens[1], Token::Ident("listen".to_string()));
    }

    #[test]
    fn test_quoted_values_keep_quotes() {
        let tokens = values(r#"log_format main "a b" 'c d';"#);
        assert_eq!(tokens[1], Token::DoubleQuoted("\"a b\"".to_string()));
        assert_eq!(tokens[2], Token::SingleQuoted("'c d'".to_string()));
    }

    #[test]
    fn test_identifier_charset() {
        let tokens = values("proxy_pass http://127.0.0.1:8080;");
        assert_eq!(tokens[0], Token::Ident("proxy_pass".to_string()));
        assert_eq!(
            tokens[1],
            Token::Expression("http://127.0.0.1:8080".to_string())
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("; listen 80;").unwrap_err();
        assert_eq!(err, LexError::UnexpectedChar { position: 0 });
    }

    #[test]
    fn test_stray_quote_in_bare_value_is_rejected() {
        let err = tokenize("map $x a\"b;").unwrap_err();
        assert_eq!(err, LexError::UnexpectedChar { position: 8 });
    }
}
