//! Tokens of the script language
//!
//! Line breaks are significant: a run of them, together with any blank or comment-only lines in
//! between, becomes a single [`TokenKind::Newline`]. Spaces, tabs and comments are skipped.

use std::fmt;

use derive_more::derive::Display;
use tracing::{instrument, trace};
use winnow::ascii::{digit0, digit1, hex_digit1, line_ending};
use winnow::combinator::{alt, dispatch, empty, fail, opt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_till, take_while};
use winnow::PResult;

use crate::error::{Error, Result};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Types built into the language
    #[display("code")]
    Code,
    #[display("handle")]
    Handle,
    #[display("integer")]
    Integer,
    #[display("real")]
    Real,
    #[display("boolean")]
    Boolean,
    #[display("string")]
    String,

    // Keywords
    #[display("array")]
    Array,
    #[display("globals")]
    Globals,
    #[display("endglobals")]
    Endglobals,
    #[display("constant")]
    Constant,
    #[display("native")]
    Native,
    #[display("extends")]
    Extends,
    #[display("type")]
    Type,
    #[display("function")]
    Function,
    #[display("endfunction")]
    Endfunction,
    #[display("takes")]
    Takes,
    #[display("returns")]
    Returns,
    #[display("nothing")]
    Nothing,
    #[display("local")]
    Local,
    #[display("return")]
    Return,
    #[display("set")]
    Set,
    #[display("call")]
    Call,
    #[display("loop")]
    Loop,
    #[display("endloop")]
    Endloop,
    #[display("exitwhen")]
    Exitwhen,
    #[display("if")]
    If,
    #[display("then")]
    Then,
    #[display("else")]
    Else,
    #[display("elseif")]
    Elseif,
    #[display("endif")]
    Endif,
    #[display("debug")]
    Debug,
    #[display("and")]
    And,
    #[display("or")]
    Or,
    #[display("not")]
    Not,

    #[display("identifier")]
    Id,

    // Literals
    #[display("integer literal")]
    DecimalInteger,
    #[display("octal literal")]
    OctalInteger,
    #[display("hexadecimal literal")]
    HexInteger,
    #[display("real literal")]
    RealLiteral,
    /// Four character code in single quotes, such as `'hfoo'`
    #[display("raw id literal")]
    RawId,
    #[display("boolean literal")]
    BooleanLiteral,
    #[display("null")]
    Null,
    #[display("string literal")]
    StringLiteral,

    // Operators
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
    #[display("*")]
    Times,
    #[display("/")]
    Divide,
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display("<")]
    Lt,
    #[display(">")]
    Gt,
    #[display("<=")]
    Le,
    #[display(">=")]
    Ge,
    #[display("=")]
    Equals,

    // Delimiters
    #[display("(")]
    LParen,
    #[display(")")]
    RParen,
    #[display("[")]
    LBracket,
    #[display("]")]
    RBracket,
    #[display(",")]
    Comma,

    #[display("newline")]
    Newline,
}

impl TokenKind {
    /// The keyword spelled `word`, if it is one
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;

        Some(match word {
            "code" => Code,
            "handle" => Handle,
            "integer" => Integer,
            "real" => Real,
            "boolean" => Boolean,
            "string" => String,
            "array" => Array,
            "globals" => Globals,
            "endglobals" => Endglobals,
            "constant" => Constant,
            "native" => Native,
            "extends" => Extends,
            "type" => Type,
            "function" => Function,
            "endfunction" => Endfunction,
            "takes" => Takes,
            "returns" => Returns,
            "nothing" => Nothing,
            "local" => Local,
            "return" => Return,
            "set" => Set,
            "call" => Call,
            "loop" => Loop,
            "endloop" => Endloop,
            "exitwhen" => Exitwhen,
            "if" => If,
            "then" => Then,
            "else" => Else,
            "elseif" => Elseif,
            "endif" => Endif,
            "debug" => Debug,
            "and" => And,
            "or" => Or,
            "not" => Not,
            "true" | "false" => BooleanLiteral,
            "null" => Null,
            _ => return None,
        })
    }

    /// Whether this is one of the built in type names
    pub fn is_builtin_type(self) -> bool {
        use TokenKind::*;

        matches!(self, Code | Handle | Integer | Real | Boolean | String)
    }

    pub fn is_literal(self) -> bool {
        use TokenKind::*;

        matches!(
            self,
            DecimalInteger
                | OctalInteger
                | HexInteger
                | RealLiteral
                | RawId
                | BooleanLiteral
                | Null
                | StringLiteral
        )
    }

    pub fn is_binary_operator(self) -> bool {
        use TokenKind::*;

        matches!(
            self,
            Plus | Minus | Times | Divide | Eq | Ne | Lt | Gt | Le | Ge | And | Or
        )
    }

    pub fn is_unary_operator(self) -> bool {
        matches!(self, TokenKind::Plus | TokenKind::Minus | TokenKind::Not)
    }
}

/// A lexical token and where it starts
///
/// Positions are informational: two tokens are equal when their kind and text are.
#[derive(Debug, Clone, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Token {
    /// A token with no position, for building script contents by hand
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            line: 0,
            column: 0,
            offset: 0,
        }
    }

    pub fn id(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Id, text)
    }

    pub fn newline() -> Self {
        Self::new(TokenKind::Newline, "\n")
    }

    /// A keyword, operator or delimiter, spelled the only way it can be
    pub fn fixed(kind: TokenKind) -> Self {
        Self::new(kind, kind.to_string())
    }

    /// An identifier or a built in type name
    pub fn type_name(name: &str) -> Self {
        match TokenKind::keyword(name) {
            Some(kind) if kind.is_builtin_type() => Self::new(kind, name),
            _ => Self::id(name),
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn blank(input: &mut &str) -> PResult<()> {
    take_while(0.., [' ', '\t', '\x0c', '\r'])
        .void()
        .parse_next(input)
}

fn comment(input: &mut &str) -> PResult<()> {
    ("//", take_till(0.., '\n')).void().parse_next(input)
}

fn trivia(input: &mut &str) -> PResult<()> {
    (blank, opt(comment)).void().parse_next(input)
}

fn newlines(input: &mut &str) -> PResult<TokenKind> {
    (
        line_ending,
        repeat::<_, _, (), _, _>(0.., (blank, opt(comment), line_ending)),
    )
        .value(TokenKind::Newline)
        .parse_next(input)
}

fn word(input: &mut &str) -> PResult<TokenKind> {
    let start = *input;
    (
        one_of(|c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .void()
        .parse_next(input)?;
    let word = &start[..start.len() - input.len()];
    Ok(TokenKind::keyword(word).unwrap_or(TokenKind::Id))
}

fn number(input: &mut &str) -> PResult<TokenKind> {
    alt((
        preceded('$', hex_digit1).value(TokenKind::HexInteger),
        ('0', one_of(['x', 'X']), hex_digit1).value(TokenKind::HexInteger),
        (digit1, '.', digit0).value(TokenKind::RealLiteral),
        ('.', digit1).value(TokenKind::RealLiteral),
        ('0', take_while(1.., '0'..='7')).value(TokenKind::OctalInteger),
        '0'.value(TokenKind::DecimalInteger),
        (one_of('1'..='9'), digit0).value(TokenKind::DecimalInteger),
    ))
    .parse_next(input)
}

fn string_literal(input: &mut &str) -> PResult<TokenKind> {
    (
        '"',
        repeat::<_, _, (), _, _>(
            0..,
            alt(("\\\"".void(), "\\\\".void(), none_of('"').void())),
        ),
        '"',
    )
        .value(TokenKind::StringLiteral)
        .parse_next(input)
}

fn raw_id(input: &mut &str) -> PResult<TokenKind> {
    ('\'', take_till(0.., '\''), '\'')
        .value(TokenKind::RawId)
        .parse_next(input)
}

fn operator(input: &mut &str) -> PResult<TokenKind> {
    use TokenKind::*;

    dispatch! {any;
        '=' => opt('=').map(|eq| if eq.is_some() { Eq } else { Equals }),
        '!' => '='.value(Ne),
        '<' => opt('=').map(|eq| if eq.is_some() { Le } else { Lt }),
        '>' => opt('=').map(|eq| if eq.is_some() { Ge } else { Gt }),
        '+' => empty.value(Plus),
        '-' => empty.value(Minus),
        '*' => empty.value(Times),
        '/' => empty.value(Divide),
        '(' => empty.value(LParen),
        ')' => empty.value(RParen),
        '[' => empty.value(LBracket),
        ']' => empty.value(RBracket),
        ',' => empty.value(Comma),
        _ => fail::<_, TokenKind, _>,
    }
    .parse_next(input)
}

fn lexeme<'s>(input: &mut &'s str) -> PResult<(TokenKind, &'s str)> {
    let start = *input;
    let kind = alt((newlines, string_literal, raw_id, number, word, operator)).parse_next(input)?;
    Ok((kind, &start[..start.len() - input.len()]))
}

/// Split a script into tokens
#[instrument(skip_all, fields(len = text.len()), err)]
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut input = text;
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut line_start = 0;

    loop {
        // Trivia never fails; it matches nothing at worst.
        let _ = trivia(&mut input);
        if input.is_empty() {
            break;
        }

        let offset = text.len() - input.len();
        let column = text[line_start..offset].chars().count() + 1;
        let Ok((kind, taken)) = lexeme(&mut input) else {
            return Err(Error::syntax(
                text,
                offset,
                line,
                column,
                "unexpected character",
            ));
        };

        let spelling = if kind == TokenKind::Newline {
            "\n"
        } else {
            taken
        };
        tokens.push(Token {
            kind,
            text: spelling.to_owned(),
            line,
            column,
            offset,
        });

        if let Some(last) = taken.rfind('\n') {
            line += taken.matches('\n').count();
            line_start = offset + last + 1;
        }
    }

    trace!(tokens = tokens.len(), lines = line, "tokenized");
    Ok(tokens)
}

#[cfg(test)]
mod test {
    use super::{tokenize, Token, TokenKind};
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn literals() {
        use TokenKind::*;

        assert_eq!(
            kinds("0 017 $FF 0x1f 12 1.5 .5 3. 'hfoo' \"a \\\"b\\\" c\" true null"),
            vec![
                DecimalInteger,
                OctalInteger,
                HexInteger,
                HexInteger,
                DecimalInteger,
                RealLiteral,
                RealLiteral,
                RealLiteral,
                RawId,
                StringLiteral,
                BooleanLiteral,
                Null,
            ]
        );
    }

    #[test]
    fn operators_and_words() {
        use TokenKind::*;

        assert_eq!(
            kinds("set x[i]=a<=b!=-c and not d==e/f"),
            vec![
                Set, Id, LBracket, Id, RBracket, Equals, Id, Le, Id, Ne, Minus, Id, And, Not, Id,
                Eq, Id, Divide, Id,
            ]
        );
        assert_eq!(kinds("endglobals integer my_var2"), vec![Endglobals, Integer, Id]);
    }

    #[test]
    fn newline_runs_collapse() {
        let tokens = tokenize("\n\ncall f() // first\n   \n// only a comment\r\n\tcall g()").unwrap();
        let kinds = tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Newline,
                TokenKind::Call,
                TokenKind::Id,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Newline,
                TokenKind::Call,
                TokenKind::Id,
                TokenKind::LParen,
                TokenKind::RParen,
            ]
        );

        let g = &tokens[7];
        assert_eq!(g.text, "g");
        assert_eq!((g.line, g.column), (6, 7));
        assert_eq!(tokens[5], Token::newline());
    }

    #[test]
    fn strings_may_hold_comment_markers() {
        let tokens = tokenize("\"http://example\" // real comment").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "\"http://example\"");
    }

    #[test]
    fn errors_carry_a_position() {
        let err = tokenize("set x = 1\nset y = #").unwrap_err();
        assert!(matches!(err, Error::SyntaxError { line: 2, column: 9, .. }));

        assert!(tokenize("\"unterminated").is_err());
    }
}
