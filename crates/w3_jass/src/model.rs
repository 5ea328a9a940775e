//! Symbol level view of a script
//!
//! A [`Script`] holds the symbols a script declares: types, natives, globals and functions.
//! Initializers and statements are kept as [`Node`]s, flat lists of the tokens they were written
//! with, so they can be regenerated exactly without modelling every expression.
//!
//! Source positions are carried for reference only and never take part in equality.

use std::fmt;
use std::str::FromStr;

use derive_more::derive::{Deref, DerefMut, Display, From, IntoIterator};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token, TokenKind};

/// Where a symbol is declared, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<&Token> for Position {
    fn from(token: &Token) -> Self {
        Self {
            line: token.line,
            column: token.column,
        }
    }
}

/// Tokens of a statement or an initializer expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, From, IntoIterator)]
#[into_iterator(owned, ref)]
pub struct Node(Vec<Token>);

impl Node {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    /// Tokenize a snippet of source, such as `GetUnitX(u) + 1.0`
    ///
    /// The snippet is not checked against the grammar.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = tokenize(text)?;
        while tokens.last().is_some_and(|t| t.kind == TokenKind::Newline) {
            tokens.pop();
        }
        Ok(Self(tokens))
    }

    /// Point identifier tokens spelled `old` at `new`, returning how many changed
    pub fn rename(&mut self, old: &str, new: &str) -> usize {
        let mut renamed = 0;
        for token in self.0.iter_mut() {
            if token.kind == TokenKind::Id && token.text == old {
                token.text = new.to_owned();
                renamed += 1;
            }
        }
        renamed
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

/// `type id extends parent`
#[derive(Debug, Clone)]
pub struct Type {
    pub id: String,
    pub extends: String,
    pub position: Option<Position>,
}

impl Type {
    pub fn new(id: impl Into<String>, extends: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extends: extends.into(),
            position: None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.extends == other.extends
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: String,
    pub id: String,
}

impl Parameter {
    pub fn new(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
        }
    }
}

/// A native declaration, and the signature part of every function
#[derive(Debug, Clone)]
pub struct Function {
    pub id: String,
    pub takes: Vec<Parameter>,
    /// `None` for `returns nothing`
    pub returns: Option<String>,
    pub is_constant: bool,
    pub position: Option<Position>,
}

impl Function {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            takes: Vec::new(),
            returns: None,
            is_constant: false,
            position: None,
        }
    }

    pub fn takes(mut self, ty: impl Into<String>, id: impl Into<String>) -> Self {
        self.takes.push(Parameter::new(ty, id));
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    fn rename_type(&mut self, old: &str, new: &str) {
        for parameter in self.takes.iter_mut().filter(|p| p.ty == old) {
            parameter.ty = new.to_owned();
        }
        if self.returns.as_deref() == Some(old) {
            self.returns = Some(new.to_owned());
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.takes == other.takes
            && self.returns == other.returns
            && self.is_constant == other.is_constant
    }
}

/// A local variable, and the variable part of every global
#[derive(Debug, Clone)]
pub struct Variable {
    pub id: String,
    pub ty: String,
    pub is_array: bool,
    pub initializer: Option<Node>,
    pub position: Option<Position>,
}

impl Variable {
    pub fn new(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ty: ty.into(),
            is_array: false,
            initializer: None,
            position: None,
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn initialized(mut self, initializer: Node) -> Self {
        self.initializer = Some(initializer);
        self
    }

    fn rename_references(&mut self, old: &str, new: &str) -> usize {
        self.initializer
            .as_mut()
            .map_or(0, |initializer| initializer.rename(old, new))
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.ty == other.ty
            && self.is_array == other.is_array
            && self.initializer == other.initializer
    }
}

#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct GlobalVariable {
    #[deref]
    #[deref_mut]
    pub variable: Variable,
    pub is_constant: bool,
}

impl GlobalVariable {
    pub fn new(variable: Variable) -> Self {
        Self {
            variable,
            is_constant: false,
        }
    }

    pub fn constant(variable: Variable) -> Self {
        Self {
            variable,
            is_constant: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct FunctionDefinition {
    #[deref]
    #[deref_mut]
    pub function: Function,
    pub locals: Vec<Variable>,
    pub statements: Vec<Node>,
}

impl FunctionDefinition {
    pub fn new(function: Function) -> Self {
        Self {
            function,
            locals: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Rename a local variable or parameter and every reference to it in this function
    pub fn rename_local(&mut self, old: &str, new: &str) {
        for parameter in self.function.takes.iter_mut().filter(|p| p.id == old) {
            parameter.id = new.to_owned();
        }
        for local in &mut self.locals {
            if local.id == old {
                local.id = new.to_owned();
            }
            local.rename_references(old, new);
        }
        for statement in &mut self.statements {
            statement.rename(old, new);
        }
    }

    fn rename_references(&mut self, old: &str, new: &str) -> usize {
        let locals: usize = self
            .locals
            .iter_mut()
            .map(|local| local.rename_references(old, new))
            .sum();
        let statements: usize = self
            .statements
            .iter_mut()
            .map(|statement| statement.rename(old, new))
            .sum();
        locals + statements
    }
}

/// The collection a symbol belongs to
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    #[display("type")]
    Type,
    #[display("native")]
    Native,
    #[display("global")]
    Global,
    #[display("function")]
    Function,
}

/// Any symbol, owned
#[derive(Debug, Clone, PartialEq, From)]
pub enum Symbol {
    Type(Type),
    Native(Function),
    Global(GlobalVariable),
    Function(FunctionDefinition),
}

impl Symbol {
    pub fn id(&self) -> &str {
        match self {
            Symbol::Type(t) => &t.id,
            Symbol::Native(n) => &n.id,
            Symbol::Global(g) => &g.id,
            Symbol::Function(f) => &f.id,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Type(_) => SymbolKind::Type,
            Symbol::Native(_) => SymbolKind::Native,
            Symbol::Global(_) => SymbolKind::Global,
            Symbol::Function(_) => SymbolKind::Function,
        }
    }
}

/// Any symbol, borrowed from its [`Script`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SymbolRef<'a> {
    Type(&'a Type),
    Native(&'a Function),
    Global(&'a GlobalVariable),
    Function(&'a FunctionDefinition),
}

impl<'a> SymbolRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            SymbolRef::Type(t) => &t.id,
            SymbolRef::Native(n) => &n.id,
            SymbolRef::Global(g) => &g.id,
            SymbolRef::Function(f) => &f.id,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolRef::Type(_) => SymbolKind::Type,
            SymbolRef::Native(_) => SymbolKind::Native,
            SymbolRef::Global(_) => SymbolKind::Global,
            SymbolRef::Function(_) => SymbolKind::Function,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            SymbolRef::Type(t) => t.position,
            SymbolRef::Native(n) => n.position,
            SymbolRef::Global(g) => g.position,
            SymbolRef::Function(f) => f.position,
        }
    }

    pub fn to_symbol(&self) -> Symbol {
        match *self {
            SymbolRef::Type(t) => Symbol::Type(t.clone()),
            SymbolRef::Native(n) => Symbol::Native(n.clone()),
            SymbolRef::Global(g) => Symbol::Global(g.clone()),
            SymbolRef::Function(f) => Symbol::Function(f.clone()),
        }
    }
}

/// Every symbol of a script, by collection, in declaration order
///
/// Identifiers are looked up in types, natives, globals and functions, in that order; the first
/// match wins. Mutations are not checked against the grammar: renaming a symbol to a keyword or
/// to an identifier already in use is accepted.
///
/// ```
/// use w3_jass::Script;
///
/// let mut script: Script = "globals\n constant integer X = 5\nendglobals\n".parse().unwrap();
/// script.rename("X", "Y").unwrap();
/// assert_eq!(script.to_string(), "globals\n    constant integer Y = 5\nendglobals\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub types: Vec<Type>,
    pub natives: Vec<Function>,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<FunctionDefinition>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every symbol, types first and functions last
    pub fn symbols(&self) -> impl Iterator<Item = SymbolRef<'_>> {
        self.types
            .iter()
            .map(SymbolRef::Type)
            .chain(self.natives.iter().map(SymbolRef::Native))
            .chain(self.globals.iter().map(SymbolRef::Global))
            .chain(self.functions.iter().map(SymbolRef::Function))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.types
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.natives.iter().map(|n| n.id.as_str()))
            .chain(self.globals.iter().map(|g| g.id.as_str()))
            .chain(self.functions.iter().map(|f| f.id.as_str()))
    }

    pub fn get(&self, id: &str) -> Option<SymbolRef<'_>> {
        self.symbols().find(|symbol| symbol.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn kind_of(&self, id: &str) -> Result<SymbolKind> {
        self.get(id)
            .map(|symbol| symbol.kind())
            .ok_or_else(|| Error::SymbolNotFound(id.to_owned()))
    }

    /// Rename the symbol `old` and every reference to it
    ///
    /// Renaming a type rewrites the types of parameters, return values and variables, and the
    /// parent of other types. Renaming anything else rewrites every identifier token spelled
    /// `old` in initializers and statements.
    #[instrument(skip(self), err)]
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        match self.kind_of(old)? {
            SymbolKind::Type => self.rename_type(old, new),
            _ => self.rename_value(old, new),
        }
        Ok(())
    }

    fn rename_type(&mut self, old: &str, new: &str) {
        if let Some(ty) = self.types.iter_mut().find(|t| t.id == old) {
            ty.id = new.to_owned();
        }
        for ty in self.types.iter_mut().filter(|t| t.extends == old) {
            ty.extends = new.to_owned();
        }
        for native in &mut self.natives {
            native.rename_type(old, new);
        }
        for global in self.globals.iter_mut().filter(|g| g.ty == old) {
            global.ty = new.to_owned();
        }
        for function in &mut self.functions {
            function.function.rename_type(old, new);
            for local in function.locals.iter_mut().filter(|l| l.ty == old) {
                local.ty = new.to_owned();
            }
        }
    }

    fn rename_value(&mut self, old: &str, new: &str) {
        for native in self.natives.iter_mut().filter(|n| n.id == old) {
            native.id = new.to_owned();
        }

        let mut references = 0;
        for global in &mut self.globals {
            if global.id == old {
                global.id = new.to_owned();
            }
            references += global.rename_references(old, new);
        }
        for function in &mut self.functions {
            if function.id == old {
                function.id = new.to_owned();
            }
            references += function.rename_references(old, new);
        }
        debug!(references, "renamed references");
    }

    /// Replace the symbol `id` with another of the same kind, or delete it
    ///
    /// Returns the symbol that was taken out.
    pub fn replace(&mut self, id: &str, symbol: Option<Symbol>) -> Result<Symbol> {
        let kind = self.kind_of(id)?;
        if let Some(found) = symbol.as_ref().map(Symbol::kind) {
            if found != kind {
                return Err(Error::SymbolKindMismatch {
                    id: id.to_owned(),
                    expected: kind,
                    found,
                });
            }
        }

        Ok(match (kind, symbol) {
            (SymbolKind::Type, new) => {
                Symbol::Type(replace_in(&mut self.types, |t| t.id == id, new, |s| match s {
                    Symbol::Type(t) => Some(t),
                    _ => None,
                }))
            }
            (SymbolKind::Native, new) => {
                Symbol::Native(replace_in(&mut self.natives, |n| n.id == id, new, |s| match s {
                    Symbol::Native(n) => Some(n),
                    _ => None,
                }))
            }
            (SymbolKind::Global, new) => {
                Symbol::Global(replace_in(&mut self.globals, |g| g.id == id, new, |s| match s {
                    Symbol::Global(g) => Some(g),
                    _ => None,
                }))
            }
            (SymbolKind::Function, new) => Symbol::Function(replace_in(
                &mut self.functions,
                |f| f.id == id,
                new,
                |s| match s {
                    Symbol::Function(f) => Some(f),
                    _ => None,
                },
            )),
        })
    }

    /// Append a symbol to the collection of its kind
    pub fn add(&mut self, symbol: impl Into<Symbol>) {
        match symbol.into() {
            Symbol::Type(t) => self.types.push(t),
            Symbol::Native(n) => self.natives.push(n),
            Symbol::Global(g) => self.globals.push(g),
            Symbol::Function(f) => self.functions.push(f),
        }
    }

    /// Delete the symbol `id`
    pub fn remove(&mut self, id: &str) -> Result<Symbol> {
        self.replace(id, None)
    }

    /// Replace the symbol `id` if there is one, add `symbol` otherwise
    pub fn set(&mut self, id: &str, symbol: impl Into<Symbol>) -> Result<Option<Symbol>> {
        let symbol = symbol.into();
        if self.contains(id) {
            self.replace(id, Some(symbol)).map(Some)
        } else {
            self.add(symbol);
            Ok(None)
        }
    }
}

/// Swap out the first element matching `is_target`, or remove it when there is no replacement
///
/// The caller has already checked that a target exists and that `new` has the right kind.
fn replace_in<T>(
    items: &mut Vec<T>,
    is_target: impl Fn(&T) -> bool,
    new: Option<Symbol>,
    extract: impl Fn(Symbol) -> Option<T>,
) -> T {
    let index = items.iter().position(is_target).unwrap_or_default();
    match new.and_then(extract) {
        Some(new) => std::mem::replace(&mut items[index], new),
        None => items.remove(index),
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::unparse::unparse(self))
    }
}

impl FromStr for Script {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(crate::transform::transform(crate::parser::parse(s)?))
    }
}
