use kestrel_types::{ElementId, Span, Spanned};

use super::{TyExpression, TyVariableDeclaration};

#[derive(Clone, Debug, PartialEq)]
pub struct TyCodeBlock {
    pub id: ElementId,
    pub span: Span,
    pub statements: Vec<TyStatement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TyStatement {
    VariableDeclaration(TyVariableDeclaration),
    Expression(TyExpression),
}

/// One branch of a `when`. A branch without condition is the `else` branch.
#[derive(Clone, Debug, PartialEq)]
pub struct TyWhenBranch {
    pub id: ElementId,
    pub condition: Option<TyExpression>,
    pub result: TyCodeBlock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TyCatchClause {
    pub id: ElementId,
    pub parameter: TyVariableDeclaration,
    pub body: TyCodeBlock,
}

impl Spanned for TyCodeBlock {
    fn span(&self) -> Span {
        self.span
    }
}
