//! Lowering of a [`Program`] into a [`Script`]

use tracing::{debug, instrument};

use crate::lexer::TokenKind;
use crate::model::{
    Function, FunctionDefinition, GlobalVariable, Node, Parameter, Position, Script, Type,
    Variable,
};
use crate::tree::{Declaration, FunctionDeclaration, Program, Signature, VariableDeclaration};

/// Collect the symbols of a parsed program, keeping declaration order within each collection
#[instrument(skip_all)]
pub fn transform(program: Program) -> Script {
    let mut script = Script::new();

    for declaration in program.declarations {
        match declaration {
            Declaration::Type(declaration) => script.types.push(Type {
                id: declaration.id.text,
                extends: declaration.extends.text,
                position: Some(Position::from(&declaration.keyword)),
            }),
            Declaration::Native(declaration) => {
                let first = declaration.constant.as_ref().unwrap_or(&declaration.keyword);
                let position = Position::from(first);
                script.natives.push(function(
                    declaration.signature,
                    declaration.constant.is_some(),
                    position,
                ));
            }
            Declaration::Globals(block) => {
                script.globals.extend(block.variables.into_iter().map(|declaration| {
                    let is_constant = declaration
                        .modifier
                        .as_ref()
                        .is_some_and(|m| m.kind == TokenKind::Constant);
                    GlobalVariable {
                        variable: variable(declaration),
                        is_constant,
                    }
                }))
            }
        }
    }

    script
        .functions
        .extend(program.functions.into_iter().map(function_definition));

    debug!(
        types = script.types.len(),
        natives = script.natives.len(),
        globals = script.globals.len(),
        functions = script.functions.len(),
        "collected symbols"
    );
    script
}

fn function(signature: Signature, is_constant: bool, position: Position) -> Function {
    Function {
        id: signature.id.text,
        takes: signature
            .takes
            .into_iter()
            .map(|(ty, id)| Parameter {
                ty: ty.text,
                id: id.text,
            })
            .collect(),
        returns: signature.returns.map(|ty| ty.text),
        is_constant,
        position: Some(position),
    }
}

fn variable(declaration: VariableDeclaration) -> Variable {
    let position = Position::from(declaration.first());
    Variable {
        id: declaration.id.text,
        ty: declaration.ty.text,
        is_array: declaration.array.is_some(),
        initializer: declaration
            .initializer
            .map(|expression| Node::new(expression.tokens())),
        position: Some(position),
    }
}

fn function_definition(declaration: FunctionDeclaration) -> FunctionDefinition {
    let first = declaration.constant.as_ref().unwrap_or(&declaration.keyword);
    let position = Position::from(first);
    FunctionDefinition {
        function: function(
            declaration.signature,
            declaration.constant.is_some(),
            position,
        ),
        locals: declaration.locals.into_iter().map(variable).collect(),
        statements: declaration
            .statements
            .iter()
            .map(|statement| Node::new(statement.tokens()))
            .collect(),
    }
}
