use kestrel_types::{ElementId, Ident, Span, Spanned, SymbolId, TypeInfo};

use super::{TyCatchClause, TyCodeBlock, TyWhenBranch};

#[derive(Clone, Debug, PartialEq)]
pub struct TyExpression {
    pub id: ElementId,
    pub span: Span,
    /// The type inferred for this expression.
    pub return_type: TypeInfo,
    pub variant: TyExpressionVariant,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Unit,
    Boolean(bool),
    Int(i64),
    String(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeOperator {
    Is,
    NotIs,
    As,
    SafeAs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Return,
    Break,
    Continue,
}

impl JumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JumpKind::Return => "return",
            JumpKind::Break => "break",
            JumpKind::Continue => "continue",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TyExpressionVariant {
    Literal(Literal),
    VariableExpression {
        name: Ident,
        symbol: SymbolId,
    },
    CodeBlock(TyCodeBlock),
    /// Covers both `when` and `if`; an `if` is a `when` without subject.
    When {
        subject: Option<Box<TyExpression>>,
        branches: Vec<TyWhenBranch>,
    },
    WhileLoop {
        condition: Box<TyExpression>,
        body: TyCodeBlock,
    },
    DoWhileLoop {
        body: TyCodeBlock,
        condition: Box<TyExpression>,
    },
    TryCatch {
        body: TyCodeBlock,
        catches: Vec<TyCatchClause>,
        finally: Option<TyCodeBlock>,
    },
    LogicalOperator {
        op: LogicalOperator,
        lhs: Box<TyExpression>,
        rhs: Box<TyExpression>,
    },
    TypeOperator {
        op: TypeOperator,
        operand: Box<TyExpression>,
        type_operand: TypeInfo,
    },
    QualifiedAccess {
        receiver: Option<Box<TyExpression>>,
        name: Ident,
        symbol: SymbolId,
    },
    FunctionApplication {
        receiver: Option<Box<TyExpression>>,
        name: Ident,
        symbol: SymbolId,
        arguments: Vec<TyExpression>,
    },
    /// `return`, `break` and `continue`. Loop jumps target the innermost loop.
    Jump {
        kind: JumpKind,
        result: Option<Box<TyExpression>>,
    },
    Throw {
        exception: Box<TyExpression>,
    },
    Reassignment {
        name: Ident,
        symbol: SymbolId,
        rhs: Box<TyExpression>,
    },
}

impl TyExpression {
    /// True if evaluating this expression never completes normally.
    pub fn returns_nothing(&self) -> bool {
        match &self.variant {
            TyExpressionVariant::Throw { .. } | TyExpressionVariant::Jump { .. } => true,
            TyExpressionVariant::FunctionApplication { .. } => self.return_type.is_nothing(),
            _ => false,
        }
    }

    /// The symbol this expression refers to, if it is a plain reference to a declaration.
    pub fn referenced_symbol(&self) -> Option<SymbolId> {
        match &self.variant {
            TyExpressionVariant::VariableExpression { symbol, .. }
            | TyExpressionVariant::QualifiedAccess { symbol, .. }
            | TyExpressionVariant::Reassignment { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.variant {
            TyExpressionVariant::Literal(_) => "literal",
            TyExpressionVariant::VariableExpression { .. } => "variable expression",
            TyExpressionVariant::CodeBlock(_) => "code block",
            TyExpressionVariant::When { .. } => "when",
            TyExpressionVariant::WhileLoop { .. } => "while loop",
            TyExpressionVariant::DoWhileLoop { .. } => "do-while loop",
            TyExpressionVariant::TryCatch { .. } => "try",
            TyExpressionVariant::LogicalOperator { .. } => "logical operator",
            TyExpressionVariant::TypeOperator { .. } => "type operator",
            TyExpressionVariant::QualifiedAccess { .. } => "qualified access",
            TyExpressionVariant::FunctionApplication { .. } => "function application",
            TyExpressionVariant::Jump { .. } => "jump",
            TyExpressionVariant::Throw { .. } => "throw",
            TyExpressionVariant::Reassignment { .. } => "reassignment",
        }
    }
}

impl Spanned for TyExpression {
    fn span(&self) -> Span {
        self.span
    }
}
