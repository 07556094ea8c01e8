//! Recursive descent parser for nginx-style configuration.
//!
//! The lexer's head mode already restricts the tokens that may follow
//! an identifier, so directive-vs-block disambiguation needs only one
//! token of lookahead: after `Ident Value*` the next token is either
//! `;` (directive) or `{` (block).

use crate::lexer::{LexError, Spanned, Token, tokenize};
use crate::tree::{Block, BlockContent, Comment, Directive, Entry, EntryKind, Tree, Value};
use thiserror::Error;

/// Parser error types.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
}

type ParseResult<T> = Result<T, ParseError>;

/// Parser state.
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from source text.
    pub fn new(source: &str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self { tokens, pos: 0 })
    }

    /// Parse the entire file.
    pub fn parse(&mut self) -> ParseResult<Tree> {
        let (entries, trailing) = self.parse_entries()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::UnexpectedToken {
                position: self.current_position(),
                expected: "directive, block, or comment".to_string(),
                found: token.to_string(),
            });
        }

        Ok(Tree { entries, trailing })
    }

    /// Parse entries until `}` or end of input. The closing `}` is
    /// left for the caller. Returns the entries plus any newline run
    /// that had no entry left to carry it.
    fn parse_entries(&mut self) -> ParseResult<(Vec<Entry>, Vec<String>)> {
        let mut entries = Vec::new();

        loop {
            let start_newlines = self.take_newlines();

            match self.peek() {
                None | Some(Token::BlockEnd) => return Ok((entries, start_newlines)),
                Some(Token::Comment(_)) => {
                    let Some(Token::Comment(text)) = self.advance() else {
                        unreachable!()
                    };
                    let kind = EntryKind::Comment(Comment::new(text));
                    let end_newlines = self.take_newlines();
                    entries.push(Entry {
                        start_newlines,
                        kind,
                        end_newlines,
                    });
                }
                Some(Token::Ident(_)) => {
                    let kind = self.parse_statement()?;
                    let end_newlines = self.take_newlines();
                    entries.push(Entry {
                        start_newlines,
                        kind,
                        end_newlines,
                    });
                }
                Some(token) => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.current_position(),
                        expected: "directive, block, or comment".to_string(),
                        found: token.to_string(),
                    });
                }
            }
        }
    }

    /// Parse `Ident Value* (";" | "{" Entry* "}")`.
    fn parse_statement(&mut self) -> ParseResult<EntryKind> {
        let Some(Token::Ident(name)) = self.advance() else {
            unreachable!("parse_statement called without an identifier")
        };

        let mut values = Vec::new();

        loop {
            match self.peek() {
                Some(
                    Token::Expression(_) | Token::DoubleQuoted(_) | Token::SingleQuoted(_),
                ) => {
                    let expression = match self.advance() {
                        Some(
                            Token::Expression(text)
                            | Token::DoubleQuoted(text)
                            | Token::SingleQuoted(text),
                        ) => text,
                        _ => unreachable!(),
                    };
                    values.push(Value::new(expression));
                }
                Some(Token::Semicolon) => {
                    self.advance();
                    let mut directive = Directive::new(name, vec![]);
                    directive.values = values;
                    return Ok(EntryKind::Directive(directive));
                }
                Some(Token::BlockStart) => {
                    self.advance();
                    let (entries, trailing) = self.parse_entries()?;
                    self.expect_block_end()?;

                    let mut block = Block::new(name, vec![]);
                    block.parameters = values;
                    block.content = Some(BlockContent { entries, trailing });
                    return Ok(EntryKind::Block(block));
                }
                Some(token) => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.current_position(),
                        expected: "value, ';', or '{'".to_string(),
                        found: token.to_string(),
                    });
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "';' or '{'".to_string(),
                    });
                }
            }
        }
    }

    fn expect_block_end(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(Token::BlockEnd) => {
                self.advance();
                Ok(())
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                position: self.current_position(),
                expected: "'}'".to_string(),
                found: token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "'}'".to_string(),
            }),
        }
    }

    fn take_newlines(&mut self) -> Vec<String> {
        let mut runs = Vec::new();

        while let Some(Token::Newlines(_)) = self.peek() {
            if let Some(Token::Newlines(run)) = self.advance() {
                runs.push(run);
            }
        }

        runs
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.value)
    }

    fn advance(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].value.clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    fn current_position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|spanned| spanned.span.start)
            .unwrap_or(0)
    }
}

/// Parse a configuration source string into a syntax tree.
pub fn parse(source: &str) -> ParseResult<Tree> {
    let mut parser = Parser::new(source)?;
    parser.parse()
}
