use kestrel_error::CompileError;
use kestrel_types::{ElementId, SymbolId, TypeInfo};

use crate::language::ty;

/// An element of the typed tree that can be bound to a dataflow variable.
#[derive(Clone, Copy, Debug)]
pub enum FlowElement<'a> {
    Expression(&'a ty::TyExpression),
    VariableDeclaration(&'a ty::TyVariableDeclaration),
    Parameter(&'a ty::TyFunctionParameter),
    Function(&'a ty::TyFunctionDeclaration),
    CodeBlock(&'a ty::TyCodeBlock),
    CatchClause(&'a ty::TyCatchClause),
}

impl<'a> FlowElement<'a> {
    pub fn id(&self) -> ElementId {
        match self {
            FlowElement::Expression(expression) => expression.id,
            FlowElement::VariableDeclaration(declaration) => declaration.id,
            FlowElement::Parameter(parameter) => parameter.id,
            FlowElement::Function(function) => function.id,
            FlowElement::CodeBlock(block) => block.id,
            FlowElement::CatchClause(catch) => catch.id,
        }
    }

    /// The symbol of the declaration this element declares or refers to.
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            FlowElement::Expression(expression) => expression.referenced_symbol(),
            FlowElement::VariableDeclaration(declaration) => Some(declaration.symbol),
            FlowElement::Parameter(parameter) => Some(parameter.symbol),
            FlowElement::Function(function) => Some(function.symbol),
            FlowElement::CodeBlock(_) | FlowElement::CatchClause(_) => None,
        }
    }

    /// The type a variable bound to this element takes.
    ///
    /// Expressions use their inferred type and declarations their declared one. No other
    /// element kind carries a type.
    pub fn resolved_type(&self) -> Result<TypeInfo, CompileError> {
        match self {
            FlowElement::Expression(expression) => Ok(expression.return_type.clone()),
            FlowElement::VariableDeclaration(declaration) => Ok(declaration.ty.clone()),
            FlowElement::Parameter(parameter) => Ok(parameter.ty.clone()),
            FlowElement::Function(function) => Ok(function.return_type.clone()),
            FlowElement::CodeBlock(_) | FlowElement::CatchClause(_) => {
                Err(CompileError::UnsupportedElementKind {
                    kind: self.kind_name(),
                    element: self.id(),
                })
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowElement::Expression(expression) => expression.kind_name(),
            FlowElement::VariableDeclaration(_) => "variable declaration",
            FlowElement::Parameter(_) => "parameter",
            FlowElement::Function(_) => "function",
            FlowElement::CodeBlock(_) => "code block",
            FlowElement::CatchClause(_) => "catch clause",
        }
    }
}

impl<'a> From<&'a ty::TyExpression> for FlowElement<'a> {
    fn from(expression: &'a ty::TyExpression) -> Self {
        FlowElement::Expression(expression)
    }
}

impl<'a> From<&'a ty::TyVariableDeclaration> for FlowElement<'a> {
    fn from(declaration: &'a ty::TyVariableDeclaration) -> Self {
        FlowElement::VariableDeclaration(declaration)
    }
}

impl<'a> From<&'a ty::TyFunctionParameter> for FlowElement<'a> {
    fn from(parameter: &'a ty::TyFunctionParameter) -> Self {
        FlowElement::Parameter(parameter)
    }
}
