//! Regenerating source text from a [`Script`]
//!
//! Output is laid out as types, natives, a single globals block and then functions. Spacing is
//! decided per token kind: some kinds always want a space before them, some after them, and
//! everything else is written tight against its neighbours. Blocks are indented by four spaces.
//!
//! Comments and the original layout are not preserved, but parsing the output again gives back an
//! equal [`Script`].

use std::fmt::Write;

use tracing::instrument;

use crate::lexer::{Token, TokenKind};
use crate::model::{Function, Node, Script, Variable};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy)]
enum Piece<'a> {
    Keyword(TokenKind),
    Token(&'a Token),
    Name(&'a str),
    /// A type in a declaration, which is always followed by a name
    TypeName(&'a str),
    Newline,
}

impl Piece<'_> {
    fn kind(&self) -> TokenKind {
        match self {
            Piece::Keyword(kind) => *kind,
            Piece::Token(token) => token.kind,
            Piece::Name(_) => TokenKind::Id,
            Piece::TypeName(name) => TokenKind::keyword(name).unwrap_or(TokenKind::Id),
            Piece::Newline => TokenKind::Newline,
        }
    }

    fn space_before(&self) -> bool {
        use TokenKind::*;
        matches!(
            self.kind(),
            Takes | Returns | Extends | Then | And | Or | Equals
        )
    }

    fn space_after(&self) -> bool {
        use TokenKind::*;
        matches!(self, Piece::TypeName(_))
            || matches!(
                self.kind(),
                Constant
                    | Native
                    | Type
                    | Array
                    | Extends
                    | Function
                    | Takes
                    | Returns
                    | Set
                    | Call
                    | Local
                    | Exitwhen
                    | Debug
                    | If
                    | Elseif
                    | Else
                    | Return
                    | And
                    | Or
                    | Not
                    | Equals
                    | Comma
            )
    }

    fn write(&self, out: &mut String) {
        match self {
            Piece::Keyword(kind) => {
                let _ = write!(out, "{kind}");
            }
            Piece::Token(token) => out.push_str(&token.text),
            Piece::Name(text) | Piece::TypeName(text) => out.push_str(text),
            Piece::Newline => out.push('\n'),
        }
    }
}

#[derive(Default)]
struct Pieces<'a>(Vec<Piece<'a>>);

impl<'a> Pieces<'a> {
    fn keyword(&mut self, kind: TokenKind) {
        self.0.push(Piece::Keyword(kind));
    }

    fn name(&mut self, name: &'a str) {
        self.0.push(Piece::Name(name));
    }

    fn newline(&mut self) {
        self.0.push(Piece::Newline);
    }

    fn node(&mut self, node: &'a Node) {
        self.0.extend(node.iter().map(Piece::Token));
    }

    fn signature(&mut self, function: &'a Function) {
        self.name(&function.id);
        self.keyword(TokenKind::Takes);
        if function.takes.is_empty() {
            self.keyword(TokenKind::Nothing);
        }
        for (i, parameter) in function.takes.iter().enumerate() {
            if i > 0 {
                self.keyword(TokenKind::Comma);
            }
            self.0.push(Piece::TypeName(&parameter.ty));
            self.name(&parameter.id);
        }
        self.keyword(TokenKind::Returns);
        match &function.returns {
            Some(ty) => self.0.push(Piece::Name(ty)),
            None => self.keyword(TokenKind::Nothing),
        }
    }

    fn variable(&mut self, variable: &'a Variable) {
        self.0.push(Piece::TypeName(&variable.ty));
        if variable.is_array {
            self.keyword(TokenKind::Array);
        }
        self.name(&variable.id);
        if let Some(initializer) = &variable.initializer {
            self.keyword(TokenKind::Equals);
            self.node(initializer);
        }
        self.newline();
    }

    fn script(&mut self, script: &'a Script) {
        for ty in &script.types {
            self.keyword(TokenKind::Type);
            self.name(&ty.id);
            self.keyword(TokenKind::Extends);
            self.name(&ty.extends);
            self.newline();
        }

        for native in &script.natives {
            if native.is_constant {
                self.keyword(TokenKind::Constant);
            }
            self.keyword(TokenKind::Native);
            self.signature(native);
            self.newline();
        }

        self.keyword(TokenKind::Globals);
        self.newline();
        for global in &script.globals {
            if global.is_constant {
                self.keyword(TokenKind::Constant);
            }
            self.variable(global);
        }
        self.keyword(TokenKind::Endglobals);
        self.newline();

        for function in &script.functions {
            if function.is_constant {
                self.keyword(TokenKind::Constant);
            }
            self.keyword(TokenKind::Function);
            self.signature(function);
            self.newline();
            for local in &function.locals {
                self.keyword(TokenKind::Local);
                self.variable(local);
            }
            for statement in &function.statements {
                self.node(statement);
                self.newline();
            }
            self.keyword(TokenKind::Endfunction);
            self.newline();
        }
    }

    /// The kind deciding the indentation of the line starting at `start`
    fn leading_kind(&self, start: usize) -> Option<TokenKind> {
        self.0[start..]
            .iter()
            .map(Piece::kind)
            .find(|kind| !matches!(kind, TokenKind::Constant | TokenKind::Debug))
    }

    fn render(&self) -> String {
        use TokenKind::{Else, Elseif, Endfunction, Endglobals, Endif, Endloop, Globals, If, Loop};

        let mut out = String::new();
        let mut depth = 0usize;
        let mut line_start = true;
        let mut space_pending = false;

        for (i, piece) in self.0.iter().enumerate() {
            if piece.kind() == TokenKind::Newline {
                out.push('\n');
                line_start = true;
                space_pending = false;
                continue;
            }

            if line_start {
                let leading = self.leading_kind(i);
                if matches!(
                    leading,
                    Some(Endglobals | Endfunction | Endif | Endloop | Else | Elseif)
                ) {
                    depth = depth.saturating_sub(1);
                }
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                if matches!(
                    leading,
                    Some(Globals | TokenKind::Function | If | Loop | Else | Elseif)
                ) {
                    depth += 1;
                }
            } else if space_pending || piece.space_before() {
                out.push(' ');
            }

            piece.write(&mut out);
            line_start = false;
            space_pending = piece.space_after();
        }
        out
    }
}

/// Regenerate source text for a script
#[instrument(skip_all)]
pub fn unparse(script: &Script) -> String {
    let mut pieces = Pieces::default();
    pieces.script(script);
    pieces.render()
}

#[cfg(test)]
mod test {
    use super::unparse;
    use crate::model::{Function, FunctionDefinition, Node, Script, Type};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_script_has_a_globals_block() {
        assert_eq!(unparse(&Script::new()), "globals\nendglobals\n");
    }

    #[test]
    fn declarations() {
        let mut script = Script::new();
        script.add(Type::new("unit", "widget"));
        script.add(
            Function::new("GetUnitX")
                .takes("unit", "whichUnit")
                .takes("integer", "i")
                .returns("real")
                .constant(),
        );
        let mut main = FunctionDefinition::new(Function::new("main"));
        main.statements.push(Node::parse("call GetUnitX(null, -1)").unwrap());
        script.add(main);

        assert_eq!(
            unparse(&script),
            "type unit extends widget
constant native GetUnitX takes unit whichUnit, integer i returns real
globals
endglobals
function main takes nothing returns nothing
    call GetUnitX(null, -1)
endfunction
"
        );
    }

    #[test]
    fn blocks_are_indented() {
        let script: Script = "function f takes integer n returns boolean
local integer i=0
loop
exitwhen i>n
if i==2 then
debug call Print(\"two\")
elseif not(i==3)and n>0 then
set counts[i]=i*2
else
return false
endif
set i=i+1
endloop
return true
endfunction
"
        .parse()
        .unwrap();

        assert_eq!(
            unparse(&script),
            "globals
endglobals
function f takes integer n returns boolean
    local integer i = 0
    loop
        exitwhen i>n
        if i==2 then
            debug call Print(\"two\")
        elseif not (i==3) and n>0 then
            set counts[i] = i*2
        else
            return false
        endif
        set i = i+1
    endloop
    return true
endfunction
"
        );
    }
}
