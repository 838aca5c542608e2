//! Construction helpers for typed trees.
//!
//! The front-end produces these trees from source; tools and tests that need a tree without a
//! front-end use a [`TyTreeBuilder`] so that every element gets a fresh identity.

use kestrel_types::{IdGenerator, Ident, Span, SymbolId, TypeInfo};

use super::*;

#[derive(Debug, Default)]
pub struct TyTreeBuilder {
    ids: IdGenerator,
}

impl TyTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a symbol for a declaration living outside the tree, e.g. a library function.
    pub fn symbol(&mut self) -> SymbolId {
        self.ids.next_symbol()
    }

    fn expression(&mut self, return_type: TypeInfo, variant: TyExpressionVariant) -> TyExpression {
        TyExpression {
            id: self.ids.next_element(),
            span: Span::UNDEFINED,
            return_type,
            variant,
        }
    }

    pub fn literal(&mut self, literal: Literal) -> TyExpression {
        let return_type = match &literal {
            Literal::Null => TypeInfo::Any { nullable: true },
            Literal::Unit => TypeInfo::Unit,
            Literal::Boolean(_) => TypeInfo::Boolean,
            Literal::Int(_) => TypeInfo::Int,
            Literal::String(_) => TypeInfo::String,
        };
        self.expression(return_type, TyExpressionVariant::Literal(literal))
    }

    pub fn bool(&mut self, value: bool) -> TyExpression {
        self.literal(Literal::Boolean(value))
    }

    pub fn int(&mut self, value: i64) -> TyExpression {
        self.literal(Literal::Int(value))
    }

    pub fn variable(
        &mut self,
        name: &str,
        ty: TypeInfo,
        is_mutable: bool,
        initializer: Option<TyExpression>,
    ) -> TyVariableDeclaration {
        TyVariableDeclaration {
            id: self.ids.next_element(),
            symbol: self.ids.next_symbol(),
            name: Ident::new_no_span(name),
            ty,
            is_mutable,
            initializer,
        }
    }

    pub fn parameter(&mut self, name: &str, ty: TypeInfo) -> TyFunctionParameter {
        TyFunctionParameter {
            id: self.ids.next_element(),
            symbol: self.ids.next_symbol(),
            name: Ident::new_no_span(name),
            ty,
        }
    }

    /// A read of a local variable.
    pub fn read(&mut self, variable: &TyVariableDeclaration) -> TyExpression {
        self.expression(
            variable.ty.clone(),
            TyExpressionVariant::VariableExpression {
                name: variable.name.clone(),
                symbol: variable.symbol,
            },
        )
    }

    /// A read of a function parameter.
    pub fn read_parameter(&mut self, parameter: &TyFunctionParameter) -> TyExpression {
        self.expression(
            parameter.ty.clone(),
            TyExpressionVariant::VariableExpression {
                name: parameter.name.clone(),
                symbol: parameter.symbol,
            },
        )
    }

    pub fn assign(&mut self, variable: &TyVariableDeclaration, rhs: TyExpression) -> TyExpression {
        self.expression(
            TypeInfo::Unit,
            TyExpressionVariant::Reassignment {
                name: variable.name.clone(),
                symbol: variable.symbol,
                rhs: Box::new(rhs),
            },
        )
    }

    pub fn call(
        &mut self,
        name: &str,
        symbol: SymbolId,
        return_type: TypeInfo,
        arguments: Vec<TyExpression>,
    ) -> TyExpression {
        self.expression(
            return_type,
            TyExpressionVariant::FunctionApplication {
                receiver: None,
                name: Ident::new_no_span(name),
                symbol,
                arguments,
            },
        )
    }

    pub fn method_call(
        &mut self,
        receiver: TyExpression,
        name: &str,
        symbol: SymbolId,
        return_type: TypeInfo,
        arguments: Vec<TyExpression>,
    ) -> TyExpression {
        self.expression(
            return_type,
            TyExpressionVariant::FunctionApplication {
                receiver: Some(Box::new(receiver)),
                name: Ident::new_no_span(name),
                symbol,
                arguments,
            },
        )
    }

    pub fn property_access(
        &mut self,
        receiver: Option<TyExpression>,
        name: &str,
        symbol: SymbolId,
        ty: TypeInfo,
    ) -> TyExpression {
        self.expression(
            ty,
            TyExpressionVariant::QualifiedAccess {
                receiver: receiver.map(Box::new),
                name: Ident::new_no_span(name),
                symbol,
            },
        )
    }

    pub fn type_operator(
        &mut self,
        op: TypeOperator,
        operand: TyExpression,
        type_operand: TypeInfo,
    ) -> TyExpression {
        let return_type = match op {
            TypeOperator::Is | TypeOperator::NotIs => TypeInfo::Boolean,
            TypeOperator::As => type_operand.clone(),
            TypeOperator::SafeAs => type_operand.with_nullability(true),
        };
        self.expression(
            return_type,
            TyExpressionVariant::TypeOperator {
                op,
                operand: Box::new(operand),
                type_operand,
            },
        )
    }

    pub fn and(&mut self, lhs: TyExpression, rhs: TyExpression) -> TyExpression {
        self.logical(LogicalOperator::And, lhs, rhs)
    }

    pub fn or(&mut self, lhs: TyExpression, rhs: TyExpression) -> TyExpression {
        self.logical(LogicalOperator::Or, lhs, rhs)
    }

    fn logical(&mut self, op: LogicalOperator, lhs: TyExpression, rhs: TyExpression) -> TyExpression {
        self.expression(
            TypeInfo::Boolean,
            TyExpressionVariant::LogicalOperator {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        )
    }

    pub fn throw(&mut self, exception: TyExpression) -> TyExpression {
        self.expression(
            TypeInfo::Nothing,
            TyExpressionVariant::Throw {
                exception: Box::new(exception),
            },
        )
    }

    pub fn jump(&mut self, kind: JumpKind, result: Option<TyExpression>) -> TyExpression {
        self.expression(
            TypeInfo::Nothing,
            TyExpressionVariant::Jump {
                kind,
                result: result.map(Box::new),
            },
        )
    }

    pub fn block(&mut self, statements: Vec<TyStatement>) -> TyCodeBlock {
        TyCodeBlock {
            id: self.ids.next_element(),
            span: Span::UNDEFINED,
            statements,
        }
    }

    /// A block made only of expression statements.
    pub fn block_of(&mut self, expressions: Vec<TyExpression>) -> TyCodeBlock {
        let statements = expressions.into_iter().map(TyStatement::Expression).collect();
        self.block(statements)
    }

    pub fn block_expression(&mut self, block: TyCodeBlock) -> TyExpression {
        let return_type = block_type(&block);
        self.expression(return_type, TyExpressionVariant::CodeBlock(block))
    }

    pub fn branch(&mut self, condition: Option<TyExpression>, result: TyCodeBlock) -> TyWhenBranch {
        TyWhenBranch {
            id: self.ids.next_element(),
            condition,
            result,
        }
    }

    pub fn when(
        &mut self,
        subject: Option<TyExpression>,
        branches: Vec<TyWhenBranch>,
        return_type: TypeInfo,
    ) -> TyExpression {
        self.expression(
            return_type,
            TyExpressionVariant::When {
                subject: subject.map(Box::new),
                branches,
            },
        )
    }

    /// `if (condition) then else otherwise`, lowered to a subject-less `when`.
    pub fn if_else(
        &mut self,
        condition: TyExpression,
        then: TyCodeBlock,
        otherwise: Option<TyCodeBlock>,
    ) -> TyExpression {
        let return_type = match &otherwise {
            Some(otherwise) => block_type(otherwise),
            None => TypeInfo::Unit,
        };
        let mut branches = vec![self.branch(Some(condition), then)];
        if let Some(otherwise) = otherwise {
            branches.push(self.branch(None, otherwise));
        }
        self.when(None, branches, return_type)
    }

    pub fn while_loop(&mut self, condition: TyExpression, body: TyCodeBlock) -> TyExpression {
        self.expression(
            TypeInfo::Unit,
            TyExpressionVariant::WhileLoop {
                condition: Box::new(condition),
                body,
            },
        )
    }

    pub fn do_while_loop(&mut self, body: TyCodeBlock, condition: TyExpression) -> TyExpression {
        self.expression(
            TypeInfo::Unit,
            TyExpressionVariant::DoWhileLoop {
                body,
                condition: Box::new(condition),
            },
        )
    }

    pub fn catch(&mut self, parameter_name: &str, exception_type: TypeInfo, body: TyCodeBlock) -> TyCatchClause {
        let parameter = self.variable(parameter_name, exception_type, false, None);
        TyCatchClause {
            id: self.ids.next_element(),
            parameter,
            body,
        }
    }

    pub fn try_catch(
        &mut self,
        body: TyCodeBlock,
        catches: Vec<TyCatchClause>,
        finally: Option<TyCodeBlock>,
    ) -> TyExpression {
        let return_type = block_type(&body);
        self.expression(
            return_type,
            TyExpressionVariant::TryCatch {
                body,
                catches,
                finally,
            },
        )
    }

    pub fn function(
        &mut self,
        name: &str,
        parameters: Vec<TyFunctionParameter>,
        return_type: TypeInfo,
        body: TyCodeBlock,
    ) -> TyFunctionDeclaration {
        TyFunctionDeclaration {
            id: self.ids.next_element(),
            symbol: self.ids.next_symbol(),
            name: Ident::new_no_span(name),
            parameters,
            return_type,
            body,
            span: Span::UNDEFINED,
        }
    }
}

/// The type of the last expression statement, or `Unit`.
fn block_type(block: &TyCodeBlock) -> TypeInfo {
    match block.statements.last() {
        Some(TyStatement::Expression(expression)) => expression.return_type.clone(),
        _ => TypeInfo::Unit,
    }
}
