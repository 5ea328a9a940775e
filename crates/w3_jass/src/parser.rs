//! Recursive descent parser producing a [`Program`]
//!
//! The grammar is read with at most one token of lookahead, except for `constant`, which needs to
//! see whether a `native` or a `function` follows. There is no error recovery: the first
//! violation ends the parse.

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::tree::{
    ConditionalBlock, Declaration, ElseBlock, Expression, FunctionDeclaration, GlobalsBlock,
    NativeDeclaration, Program, Signature, Statement, TypeDeclaration, VariableDeclaration,
};

/// Deepest nesting of blocks, parentheses, calls, indexes and unary operators
pub const MAX_NESTING: usize = 128;

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    position: usize,
    /// Number of loops around the statement being parsed
    loops: usize,
    nesting: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<TokenKind> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.position + n).map(|token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        match self.tokens.get(self.position) {
            Some(token) => Error::syntax(self.text, token.offset, token.line, token.column, message),
            None => {
                let line = self.text.matches('\n').count() + 1;
                let line_start = self.text.rfind('\n').map_or(0, |i| i + 1);
                let column = self.text[line_start..].chars().count() + 1;
                Error::syntax(self.text, self.text.len(), line, column, message)
            }
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.tokens.get(self.position) {
            Some(token) if token.kind == TokenKind::Newline => "end of line".to_owned(),
            Some(token) => format!("`{}`", token.text),
            None => "end of input".to_owned(),
        };
        self.error(format!("expected {expected}, found {found}"))
    }

    fn advance(&mut self) -> Result<Token> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| self.unexpected("more input"))?;
        self.position += 1;
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            self.advance().ok()
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.at(kind) {
            self.advance()
        } else {
            let expected = match kind {
                TokenKind::Id => "an identifier".to_owned(),
                TokenKind::Newline => "end of line".to_owned(),
                _ => format!("`{kind}`"),
            };
            Err(self.unexpected(&expected))
        }
    }

    /// A newline, or the end of the input after the last declaration
    fn end_of_line(&mut self) -> Result<()> {
        if self.peek().is_some() {
            self.expect(TokenKind::Newline)?;
        }
        Ok(())
    }

    fn too_deep(&self) -> Error {
        self.error(format!("nested deeper than {MAX_NESTING} levels"))
    }

    /// Run `f` one level deeper, bounded by [`MAX_NESTING`]
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.nesting >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn type_name(&mut self) -> Result<Token> {
        match self.peek() {
            Some(kind) if kind == TokenKind::Id || kind.is_builtin_type() => self.advance(),
            _ => Err(self.unexpected("a type")),
        }
    }

    fn program(&mut self) -> Result<Program> {
        self.eat(TokenKind::Newline);

        let mut declarations = Vec::new();
        loop {
            let declaration = match (self.peek(), self.peek_nth(1)) {
                (Some(TokenKind::Type), _) => Declaration::Type(self.type_declaration()?),
                (Some(TokenKind::Globals), _) => Declaration::Globals(self.globals()?),
                (Some(TokenKind::Native), _)
                | (Some(TokenKind::Constant), Some(TokenKind::Native)) => {
                    Declaration::Native(self.native()?)
                }
                _ => break,
            };
            declarations.push(declaration);
            self.end_of_line()?;
        }

        let mut functions = Vec::new();
        while self.peek().is_some() {
            if !matches!(
                self.peek(),
                Some(TokenKind::Function | TokenKind::Constant)
            ) {
                return Err(if functions.is_empty() {
                    self.unexpected("a declaration or a function")
                } else {
                    self.unexpected("a function")
                });
            }
            functions.push(self.function()?);
            self.end_of_line()?;
        }

        Ok(Program {
            declarations,
            functions,
        })
    }

    fn type_declaration(&mut self) -> Result<TypeDeclaration> {
        let keyword = self.expect(TokenKind::Type)?;
        let id = self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Extends)?;
        let extends = match self.peek() {
            Some(TokenKind::Handle | TokenKind::Id) => self.advance()?,
            _ => return Err(self.unexpected("`handle` or a type")),
        };
        Ok(TypeDeclaration {
            keyword,
            id,
            extends,
        })
    }

    fn signature(&mut self) -> Result<Signature> {
        let id = self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Takes)?;

        let mut takes = Vec::new();
        if self.eat(TokenKind::Nothing).is_none() {
            loop {
                let ty = self.type_name()?;
                let name = self.expect(TokenKind::Id)?;
                takes.push((ty, name));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::Returns)?;
        let returns = match self.eat(TokenKind::Nothing) {
            Some(_) => None,
            None => Some(self.type_name()?),
        };

        Ok(Signature { id, takes, returns })
    }

    fn native(&mut self) -> Result<NativeDeclaration> {
        let constant = self.eat(TokenKind::Constant);
        let keyword = self.expect(TokenKind::Native)?;
        let signature = self.signature()?;
        Ok(NativeDeclaration {
            constant,
            keyword,
            signature,
        })
    }

    fn globals(&mut self) -> Result<GlobalsBlock> {
        let keyword = self.expect(TokenKind::Globals)?;
        self.expect(TokenKind::Newline)?;

        let mut variables = Vec::new();
        while !self.at(TokenKind::Endglobals) {
            variables.push(self.global_variable()?);
            self.expect(TokenKind::Newline)?;
        }
        self.expect(TokenKind::Endglobals)?;

        Ok(GlobalsBlock {
            keyword,
            variables,
        })
    }

    fn global_variable(&mut self) -> Result<VariableDeclaration> {
        let Some(constant) = self.eat(TokenKind::Constant) else {
            let ty = self.type_name()?;
            return self.variable(None, ty);
        };

        // Constants must be initialized and cannot be arrays.
        let ty = self.type_name()?;
        let id = self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Equals)?;
        let initializer = self.expression()?;
        Ok(VariableDeclaration {
            modifier: Some(constant),
            ty,
            array: None,
            id,
            initializer: Some(initializer),
        })
    }

    fn local_variable(&mut self) -> Result<VariableDeclaration> {
        let keyword = self.expect(TokenKind::Local)?;
        let ty = self.type_name()?;
        self.variable(Some(keyword), ty)
    }

    /// The part of a variable declaration after its type
    fn variable(&mut self, modifier: Option<Token>, ty: Token) -> Result<VariableDeclaration> {
        if let Some(array) = self.eat(TokenKind::Array) {
            let id = self.expect(TokenKind::Id)?;
            return Ok(VariableDeclaration {
                modifier,
                ty,
                array: Some(array),
                id,
                initializer: None,
            });
        }

        let id = self.expect(TokenKind::Id)?;
        let initializer = match self.eat(TokenKind::Equals) {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        Ok(VariableDeclaration {
            modifier,
            ty,
            array: None,
            id,
            initializer,
        })
    }

    fn function(&mut self) -> Result<FunctionDeclaration> {
        let constant = self.eat(TokenKind::Constant);
        let keyword = self.expect(TokenKind::Function)?;
        let signature = self.signature()?;
        self.expect(TokenKind::Newline)?;

        let mut locals = Vec::new();
        while self.at(TokenKind::Local) {
            locals.push(self.local_variable()?);
            self.expect(TokenKind::Newline)?;
        }

        let statements = self.statements()?;
        let end = self.expect(TokenKind::Endfunction)?;

        Ok(FunctionDeclaration {
            constant,
            keyword,
            signature,
            locals,
            statements,
            end,
        })
    }

    /// Statements up to, not including, the keyword that closes the block
    fn statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while matches!(
            self.peek(),
            Some(
                TokenKind::Set
                    | TokenKind::Call
                    | TokenKind::If
                    | TokenKind::Loop
                    | TokenKind::Exitwhen
                    | TokenKind::Return
                    | TokenKind::Debug
            )
        ) {
            statements.push(self.statement()?);
            self.expect(TokenKind::Newline)?;
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(TokenKind::Set) => self.set(),
            Some(TokenKind::Call) => {
                let keyword = self.advance()?;
                let id = self.expect(TokenKind::Id)?;
                let call = self.call(id)?;
                Ok(Statement::Call { keyword, call })
            }
            Some(TokenKind::If) => self.if_then_else(),
            Some(TokenKind::Loop) => {
                let keyword = self.advance()?;
                let newline = self.expect(TokenKind::Newline)?;
                self.loops += 1;
                let statements = self.nested(Self::statements);
                self.loops -= 1;
                let statements = statements?;
                let end = self.expect(TokenKind::Endloop)?;
                Ok(Statement::Loop {
                    keyword,
                    newline,
                    statements,
                    end,
                })
            }
            Some(TokenKind::Exitwhen) => {
                if self.loops == 0 {
                    return Err(self.error("`exitwhen` outside of a loop"));
                }
                let keyword = self.advance()?;
                let condition = self.expression()?;
                Ok(Statement::Exitwhen { keyword, condition })
            }
            Some(TokenKind::Return) => {
                let keyword = self.advance()?;
                let value = match self.peek() {
                    None | Some(TokenKind::Newline) => None,
                    Some(_) => Some(self.expression()?),
                };
                Ok(Statement::Return { keyword, value })
            }
            Some(TokenKind::Debug) => {
                let keyword = self.advance()?;
                if !matches!(
                    self.peek(),
                    Some(TokenKind::Set | TokenKind::Call | TokenKind::If | TokenKind::Loop)
                ) {
                    return Err(self.unexpected("`set`, `call`, `if` or `loop`"));
                }
                let statement = Box::new(self.statement()?);
                Ok(Statement::Debug { keyword, statement })
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn set(&mut self) -> Result<Statement> {
        let keyword = self.expect(TokenKind::Set)?;
        let id = self.expect(TokenKind::Id)?;
        let index = match self.eat(TokenKind::LBracket) {
            Some(open) => {
                let index = self.expression()?;
                let close = self.expect(TokenKind::RBracket)?;
                Some((open, index, close))
            }
            None => None,
        };
        let equals = self.expect(TokenKind::Equals)?;
        let value = self.expression()?;
        Ok(Statement::Set {
            keyword,
            id,
            index,
            equals,
            value,
        })
    }

    fn conditional_block(&mut self, keyword: Token) -> Result<ConditionalBlock> {
        let condition = self.expression()?;
        let then = self.expect(TokenKind::Then)?;
        let newline = self.expect(TokenKind::Newline)?;
        let statements = self.nested(Self::statements)?;
        Ok(ConditionalBlock {
            keyword,
            condition,
            then,
            newline,
            statements,
        })
    }

    fn if_then_else(&mut self) -> Result<Statement> {
        let keyword = self.expect(TokenKind::If)?;
        let mut branches = vec![self.conditional_block(keyword)?];
        while let Some(keyword) = self.eat(TokenKind::Elseif) {
            branches.push(self.conditional_block(keyword)?);
        }

        let otherwise = match self.eat(TokenKind::Else) {
            Some(keyword) => {
                let newline = self.expect(TokenKind::Newline)?;
                let statements = self.nested(Self::statements)?;
                Some(ElseBlock {
                    keyword,
                    newline,
                    statements,
                })
            }
            None => None,
        };

        let end = self.expect(TokenKind::Endif)?;
        Ok(Statement::If {
            branches,
            otherwise,
            end,
        })
    }

    /// Arguments of a call to `id`
    fn call(&mut self, id: Token) -> Result<Expression> {
        let open = self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let argument = self.nested(Self::expression)?;
                let comma = self.eat(TokenKind::Comma);
                let last = comma.is_none();
                arguments.push((argument, comma));
                if last {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok(Expression::Call {
            id,
            open,
            arguments,
            close,
        })
    }

    fn expression(&mut self) -> Result<Expression> {
        let first = self.operand()?;
        let mut rest = Vec::new();
        while self.peek().is_some_and(TokenKind::is_binary_operator) {
            let operator = self.advance()?;
            rest.push((operator, self.operand()?));
        }
        if rest.is_empty() {
            return Ok(first);
        }
        Ok(Expression::Binary {
            first: Box::new(first),
            rest,
        })
    }

    /// A primary expression behind any number of unary operators
    fn operand(&mut self) -> Result<Expression> {
        let mut operators = Vec::new();
        while self.peek().is_some_and(TokenKind::is_unary_operator) {
            if self.nesting + operators.len() >= MAX_NESTING {
                return Err(self.too_deep());
            }
            operators.push(self.advance()?);
        }

        self.nesting += operators.len();
        let primary = self.primary();
        self.nesting -= operators.len();

        let mut operand = primary?;
        for operator in operators.into_iter().rev() {
            operand = Expression::Unary {
                operator,
                operand: Box::new(operand),
            };
        }
        Ok(operand)
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.peek() {
            Some(TokenKind::Id) => {
                let id = self.advance()?;
                match self.peek() {
                    Some(TokenKind::LParen) => self.call(id),
                    Some(TokenKind::LBracket) => {
                        let open = self.advance()?;
                        let index = Box::new(self.nested(Self::expression)?);
                        let close = self.expect(TokenKind::RBracket)?;
                        Ok(Expression::ArrayRef {
                            id,
                            open,
                            index,
                            close,
                        })
                    }
                    _ => Ok(Expression::Id(id)),
                }
            }
            Some(TokenKind::Function) => {
                let keyword = self.advance()?;
                let id = self.expect(TokenKind::Id)?;
                Ok(Expression::FunctionRef { keyword, id })
            }
            Some(kind) if kind.is_literal() => Ok(Expression::Literal(self.advance()?)),
            Some(TokenKind::LParen) => {
                let open = self.advance()?;
                let inner = Box::new(self.nested(Self::expression)?);
                let close = self.expect(TokenKind::RParen)?;
                Ok(Expression::Parens { open, inner, close })
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

/// Parse a script into its [`Program`] tree
#[instrument(skip_all, fields(len = text.len()), err)]
pub fn parse(text: &str) -> Result<Program> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        position: 0,
        loops: 0,
        nesting: 0,
    };
    let program = parser.program()?;
    debug!(
        declarations = program.declarations.len(),
        functions = program.functions.len(),
        "parsed"
    );
    Ok(program)
}

#[cfg(test)]
mod test {
    use super::{parse, MAX_NESTING};
    use crate::error::Error;
    use crate::lexer::TokenKind;
    use crate::tree::{Declaration, Expression, Statement};
    use pretty_assertions::assert_eq;

    fn texts(tokens: &[crate::lexer::Token]) -> Vec<&str> {
        tokens.iter().map(|token| token.text.as_str()).collect()
    }

    #[test]
    fn declarations() {
        let program = parse(
            "type unit extends widget\n\
             constant native GetUnitX takes unit whichUnit returns real\n\
             native DoNothing takes nothing returns nothing\n\
             globals\n\
             integer array counts\n\
             endglobals",
        )
        .unwrap();

        assert_eq!(program.declarations.len(), 4);
        let Declaration::Native(native) = &program.declarations[1] else {
            panic!("expected a native");
        };
        assert!(native.constant.is_some());
        assert_eq!(native.signature.takes.len(), 1);
        assert_eq!(
            native.signature.returns.as_ref().map(|t| t.kind),
            Some(TokenKind::Real)
        );
        assert!(program.functions.is_empty());
    }

    #[test]
    fn nested_blocks() {
        let program = parse(
            "function f takes integer n returns integer\n\
             local integer i = 0\n\
             loop\n\
             exitwhen i > n\n\
             if i == 2 then\n\
             debug call BJDebugMsg(\"two\", i)\n\
             elseif i == 3 then\n\
             set counts[i] = -i * 2\n\
             else\n\
             return i\n\
             endif\n\
             set i = i + 1\n\
             endloop\n\
             return 0\n\
             endfunction\n",
        )
        .unwrap();

        let function = &program.functions[0];
        assert_eq!(function.locals.len(), 1);
        assert_eq!(function.statements.len(), 2);

        let Statement::Loop { statements, .. } = &function.statements[0] else {
            panic!("expected a loop");
        };
        assert_eq!(statements.len(), 3);
        let Statement::If { branches, otherwise, .. } = &statements[1] else {
            panic!("expected an if");
        };
        assert_eq!(branches.len(), 2);
        assert!(otherwise.is_some());

        assert_eq!(
            texts(&statements[1].tokens()),
            vec![
                "if", "i", "==", "2", "then", "\n", "debug", "call", "BJDebugMsg", "(", "\"two\"",
                ",", "i", ")", "\n", "elseif", "i", "==", "3", "then", "\n", "set", "counts", "[",
                "i", "]", "=", "-", "i", "*", "2", "\n", "else", "\n", "return", "i", "\n", "endif",
            ]
        );
    }

    #[test]
    fn binary_operators_form_a_flat_chain() {
        let program = parse("globals\nconstant boolean B = not a or b and (c)\nendglobals\n").unwrap();
        let Declaration::Globals(globals) = &program.declarations[0] else {
            panic!("expected globals");
        };
        let Some(Expression::Binary { first, rest }) = &globals.variables[0].initializer else {
            panic!("expected a binary expression");
        };
        assert!(matches!(**first, Expression::Unary { .. }));
        assert_eq!(
            rest.iter().map(|(operator, _)| operator.kind).collect::<Vec<_>>(),
            vec![TokenKind::Or, TokenKind::And]
        );
        assert!(matches!(rest[1].1, Expression::Parens { .. }));
    }

    #[test]
    fn long_chains_do_not_nest() {
        let terms = " + 1".repeat(5_000);
        let text = format!("globals\nconstant integer X = 1{terms}\nendglobals\n");
        let program = parse(&text).unwrap();
        let Declaration::Globals(globals) = &program.declarations[0] else {
            panic!("expected globals");
        };
        let Some(Expression::Binary { rest, .. }) = &globals.variables[0].initializer else {
            panic!("expected a binary expression");
        };
        assert_eq!(rest.len(), 5_000);
        assert_eq!(globals.variables[0].initializer.as_ref().map(|e| e.tokens().len()), Some(10_001));
    }

    #[test]
    fn nesting_is_bounded() {
        let within = format!(
            "globals\nconstant integer X = {}1{}\nendglobals\n",
            "(".repeat(MAX_NESTING),
            ")".repeat(MAX_NESTING)
        );
        assert!(parse(&within).is_ok());

        let cases = [
            format!("globals\nconstant integer X = {}1\nendglobals\n", "(".repeat(10_000)),
            format!("globals\nconstant integer X = {}1\nendglobals\n", "- ".repeat(10_000)),
            format!("globals\nconstant integer X = {}0\nendglobals\n", "f(".repeat(10_000)),
            format!(
                "function f takes nothing returns nothing\n{}endfunction\n",
                "loop\n".repeat(10_000)
            ),
        ];
        for text in cases {
            match parse(&text) {
                Err(Error::SyntaxError { message, .. }) => {
                    assert_eq!(message, format!("nested deeper than {MAX_NESTING} levels"))
                }
                other => panic!("parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn syntax_errors() {
        let cases = [
            ("globals\ninteger = 5\nendglobals\n", 2, 9),
            ("function f takes nothing returns nothing\nexitwhen true\nendfunction\n", 2, 1),
            ("function f takes nothing returns nothing\ncall f(\nendfunction\n", 2, 8),
            ("globals\nconstant integer X\nendglobals\n", 2, 19),
            ("function f takes nothing returns nothing\ndebug return\nendfunction\n", 2, 7),
            ("function f takes nothing returns nothing\nendfunction\nglobals\nendglobals\n", 3, 1),
            ("native f takes nothing", 1, 23),
        ];

        for (text, line, column) in cases {
            match parse(text) {
                Err(Error::SyntaxError {
                    line: l, column: c, ..
                }) => assert_eq!((l, c), (line, column), "{text:?}"),
                other => panic!("{text:?} parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn leading_blank_lines_and_missing_final_newline() {
        let program = parse("\n\n// header\n\nfunction main takes nothing returns nothing\nendfunction").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].keyword.line, 5);
    }
}
