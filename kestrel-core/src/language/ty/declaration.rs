use kestrel_types::{ElementId, Ident, Span, Spanned, SymbolId, TypeInfo};

use super::{TyCodeBlock, TyExpression};

#[derive(Clone, Debug, PartialEq)]
pub struct TyFunctionDeclaration {
    pub id: ElementId,
    pub symbol: SymbolId,
    pub name: Ident,
    pub parameters: Vec<TyFunctionParameter>,
    pub return_type: TypeInfo,
    pub body: TyCodeBlock,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TyFunctionParameter {
    pub id: ElementId,
    pub symbol: SymbolId,
    pub name: Ident,
    pub ty: TypeInfo,
}

/// A local variable, or a property with an initializer when used as a graph root.
#[derive(Clone, Debug, PartialEq)]
pub struct TyVariableDeclaration {
    pub id: ElementId,
    pub symbol: SymbolId,
    pub name: Ident,
    pub ty: TypeInfo,
    pub is_mutable: bool,
    pub initializer: Option<TyExpression>,
}

impl Spanned for TyFunctionDeclaration {
    fn span(&self) -> Span {
        self.span
    }
}

impl Spanned for TyVariableDeclaration {
    fn span(&self) -> Span {
        self.name.span()
    }
}
