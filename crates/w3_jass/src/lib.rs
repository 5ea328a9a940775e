//! # JASS scripts
//!
//! Reading, rewriting and regenerating the JASS scripts (`war3map.j`, `common.j`, `Blizzard.j`)
//! that drive Warcraft III maps.
//!
//! The pipeline has four stages, each usable on its own:
//!
//! 1. [`tokenize`] splits text into [`Token`]s, dropping whitespace and comments and collapsing
//!    runs of line breaks into one newline token.
//! 2. [`parse`] builds a [`tree::Program`] that keeps every token.
//! 3. [`transform`] lowers the tree into a [`Script`], the symbol level model with renaming,
//!    replacing, adding and removing of symbols.
//! 4. [`unparse`] writes a [`Script`] back out as source text.
//!
//! [`Script`] implements [`FromStr`](std::str::FromStr) and [`Display`](std::fmt::Display) over
//! the whole pipeline. Since comments are dropped on the way in, [`comments`] recovers them by line.
//!
//! ```
//! use w3_jass::Script;
//!
//! let mut script: Script = "
//! globals
//!     unit hero = null
//! endglobals
//! function main takes nothing returns nothing
//!     set hero = CreateHero()
//! endfunction
//! "
//! .parse()
//! .unwrap();
//!
//! script.rename("hero", "champion").unwrap();
//! assert!(script.to_string().contains("set champion = CreateHero()"));
//! ```
//!

mod comments;
pub mod error;
pub mod lexer;
pub mod model;
mod parser;
mod transform;
pub mod tree;
mod unparse;

pub use comments::comments;
pub use error::{Error, Result};
pub use lexer::{tokenize, Token, TokenKind};
pub use model::{
    Function, FunctionDefinition, GlobalVariable, Node, Parameter, Position, Script, Symbol,
    SymbolKind, SymbolRef, Type, Variable,
};
pub use parser::{parse, MAX_NESTING};
pub use transform::transform;
pub use unparse::unparse;
