//! Parse tree
//!
//! The tree mirrors the grammar closely and keeps every token it was built from. There is no
//! operator precedence: a run of binary operators is kept as one flat chain in source order, and a
//! unary operator applies to the operand directly after it.

use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub functions: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeDeclaration),
    Globals(GlobalsBlock),
    Native(NativeDeclaration),
}

/// `type id extends parent`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub keyword: Token,
    pub id: Token,
    pub extends: Token,
}

/// `id takes ... returns ...`, shared by natives and functions
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub id: Token,
    /// Pairs of type and name; empty for `takes nothing`
    pub takes: Vec<(Token, Token)>,
    /// `None` for `returns nothing`
    pub returns: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeDeclaration {
    pub constant: Option<Token>,
    pub keyword: Token,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalsBlock {
    pub keyword: Token,
    pub variables: Vec<VariableDeclaration>,
}

/// A global or local variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// `constant` for globals, `local` for locals
    pub modifier: Option<Token>,
    pub ty: Token,
    pub array: Option<Token>,
    pub id: Token,
    pub initializer: Option<Expression>,
}

impl VariableDeclaration {
    /// The token the declaration starts with
    pub fn first(&self) -> &Token {
        self.modifier.as_ref().unwrap_or(&self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub constant: Option<Token>,
    pub keyword: Token,
    pub signature: Signature,
    pub locals: Vec<VariableDeclaration>,
    pub statements: Vec<Statement>,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    /// `if` or `elseif`
    pub keyword: Token,
    pub condition: Expression,
    pub then: Token,
    pub newline: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseBlock {
    pub keyword: Token,
    pub newline: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Set {
        keyword: Token,
        id: Token,
        /// `[`, the index and `]`
        index: Option<(Token, Expression, Token)>,
        equals: Token,
        value: Expression,
    },
    Call {
        keyword: Token,
        call: Expression,
    },
    If {
        branches: Vec<ConditionalBlock>,
        otherwise: Option<ElseBlock>,
        end: Token,
    },
    Loop {
        keyword: Token,
        newline: Token,
        statements: Vec<Statement>,
        end: Token,
    },
    Exitwhen {
        keyword: Token,
        condition: Expression,
    },
    Return {
        keyword: Token,
        value: Option<Expression>,
    },
    Debug {
        keyword: Token,
        statement: Box<Statement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `first op operand op operand ...`
    Binary {
        first: Box<Expression>,
        rest: Vec<(Token, Expression)>,
    },
    Unary {
        operator: Token,
        operand: Box<Expression>,
    },
    Call {
        id: Token,
        open: Token,
        /// Arguments with the comma following each, except the last
        arguments: Vec<(Expression, Option<Token>)>,
        close: Token,
    },
    ArrayRef {
        id: Token,
        open: Token,
        index: Box<Expression>,
        close: Token,
    },
    FunctionRef {
        keyword: Token,
        id: Token,
    },
    Id(Token),
    Literal(Token),
    Parens {
        open: Token,
        inner: Box<Expression>,
        close: Token,
    },
}

impl Expression {
    /// Append every token of the expression, in source order
    pub fn push_tokens(&self, out: &mut Vec<Token>) {
        match self {
            Expression::Binary { first, rest } => {
                first.push_tokens(out);
                for (operator, operand) in rest {
                    out.push(operator.clone());
                    operand.push_tokens(out);
                }
            }
            Expression::Unary { operator, operand } => {
                out.push(operator.clone());
                operand.push_tokens(out);
            }
            Expression::Call {
                id,
                open,
                arguments,
                close,
            } => {
                out.push(id.clone());
                out.push(open.clone());
                for (argument, comma) in arguments {
                    argument.push_tokens(out);
                    out.extend(comma.iter().cloned());
                }
                out.push(close.clone());
            }
            Expression::ArrayRef {
                id,
                open,
                index,
                close,
            } => {
                out.push(id.clone());
                out.push(open.clone());
                index.push_tokens(out);
                out.push(close.clone());
            }
            Expression::FunctionRef { keyword, id } => {
                out.push(keyword.clone());
                out.push(id.clone());
            }
            Expression::Id(token) | Expression::Literal(token) => out.push(token.clone()),
            Expression::Parens { open, inner, close } => {
                out.push(open.clone());
                inner.push_tokens(out);
                out.push(close.clone());
            }
        }
    }

    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.push_tokens(&mut out);
        out
    }
}

impl Statement {
    /// Append every token of the statement, in source order
    ///
    /// Blocks include the newlines inside them but not the one ending the statement itself.
    pub fn push_tokens(&self, out: &mut Vec<Token>) {
        match self {
            Statement::Set {
                keyword,
                id,
                index,
                equals,
                value,
            } => {
                out.push(keyword.clone());
                out.push(id.clone());
                if let Some((open, index, close)) = index {
                    out.push(open.clone());
                    index.push_tokens(out);
                    out.push(close.clone());
                }
                out.push(equals.clone());
                value.push_tokens(out);
            }
            Statement::Call { keyword, call } => {
                out.push(keyword.clone());
                call.push_tokens(out);
            }
            Statement::If {
                branches,
                otherwise,
                end,
            } => {
                for branch in branches {
                    out.push(branch.keyword.clone());
                    branch.condition.push_tokens(out);
                    out.push(branch.then.clone());
                    out.push(branch.newline.clone());
                    push_block(&branch.statements, out);
                }
                if let Some(otherwise) = otherwise {
                    out.push(otherwise.keyword.clone());
                    out.push(otherwise.newline.clone());
                    push_block(&otherwise.statements, out);
                }
                out.push(end.clone());
            }
            Statement::Loop {
                keyword,
                newline,
                statements,
                end,
            } => {
                out.push(keyword.clone());
                out.push(newline.clone());
                push_block(statements, out);
                out.push(end.clone());
            }
            Statement::Exitwhen { keyword, condition } => {
                out.push(keyword.clone());
                condition.push_tokens(out);
            }
            Statement::Return { keyword, value } => {
                out.push(keyword.clone());
                if let Some(value) = value {
                    value.push_tokens(out);
                }
            }
            Statement::Debug { keyword, statement } => {
                out.push(keyword.clone());
                statement.push_tokens(out);
            }
        }
    }

    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.push_tokens(&mut out);
        out
    }
}

fn push_block(statements: &[Statement], out: &mut Vec<Token>) {
    for statement in statements {
        statement.push_tokens(out);
        out.push(Token::newline());
    }
}
