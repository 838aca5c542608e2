//! IR expression trees.
//!
//! Expressions refer to declarations by [`Declaration`] handle only. Every such reference can be
//! visited, or rewritten in place, through [`Expression::for_each_declaration`] and
//! [`Expression::remap_declarations`].

use kestrel_error::CompileError;
use kestrel_types::{Ident, TypeInfo};
use serde::{Deserialize, Serialize};

use crate::declaration::Declaration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    String(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeOperator {
    Cast,
    SafeCast,
    InstanceOf,
    NotInstanceOf,
}

/// A call of a constructor, also the form every annotation takes.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorCall {
    pub constructor: Declaration,
    pub ty: TypeInfo,
    /// Positional value arguments; `None` where the default value is used.
    pub arguments: Vec<Option<Expression>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhenBranch {
    pub condition: Expression,
    pub result: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Const {
        value: Constant,
        ty: TypeInfo,
    },
    /// A read of a local value or parameter.
    GetValue {
        name: Ident,
        ty: TypeInfo,
    },
    Call {
        target: Declaration,
        receiver: Option<Box<Expression>>,
        arguments: Vec<Expression>,
        ty: TypeInfo,
    },
    ConstructorCall(ConstructorCall),
    FunctionReference {
        target: Declaration,
        ty: TypeInfo,
    },
    PropertyReference {
        target: Declaration,
        getter: Option<Declaration>,
        setter: Option<Declaration>,
        field: Option<Declaration>,
        ty: TypeInfo,
    },
    GetField {
        target: Declaration,
        receiver: Option<Box<Expression>>,
        ty: TypeInfo,
    },
    SetField {
        target: Declaration,
        receiver: Option<Box<Expression>>,
        value: Box<Expression>,
    },
    GetEnumValue {
        target: Declaration,
        ty: TypeInfo,
    },
    TypeOperator {
        operator: TypeOperator,
        operand: Box<Expression>,
        type_operand: TypeInfo,
        ty: TypeInfo,
    },
    When {
        branches: Vec<WhenBranch>,
        ty: TypeInfo,
    },
    Block {
        statements: Vec<Expression>,
        ty: TypeInfo,
    },
    /// Return from the function `target`.
    Return {
        target: Declaration,
        value: Box<Expression>,
    },
}

impl Expression {
    pub fn ty(&self) -> TypeInfo {
        match self {
            Expression::Const { ty, .. }
            | Expression::GetValue { ty, .. }
            | Expression::Call { ty, .. }
            | Expression::ConstructorCall(ConstructorCall { ty, .. })
            | Expression::FunctionReference { ty, .. }
            | Expression::PropertyReference { ty, .. }
            | Expression::GetField { ty, .. }
            | Expression::GetEnumValue { ty, .. }
            | Expression::TypeOperator { ty, .. }
            | Expression::When { ty, .. }
            | Expression::Block { ty, .. } => ty.clone(),
            Expression::SetField { .. } => TypeInfo::Unit,
            Expression::Return { .. } => TypeInfo::Nothing,
        }
    }

    /// Calls `f` with every declaration this expression refers to, in evaluation order.
    pub fn for_each_declaration(&self, f: &mut impl FnMut(Declaration)) {
        match self {
            Expression::Const { .. } | Expression::GetValue { .. } => {}
            Expression::Call {
                target,
                receiver,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.for_each_declaration(f);
                }
                for argument in arguments {
                    argument.for_each_declaration(f);
                }
                f(*target);
            }
            Expression::ConstructorCall(call) => call.for_each_declaration(f),
            Expression::FunctionReference { target, .. }
            | Expression::GetEnumValue { target, .. } => f(*target),
            Expression::PropertyReference {
                target,
                getter,
                setter,
                field,
                ..
            } => {
                f(*target);
                getter.iter().chain(setter).chain(field).for_each(|d| f(*d));
            }
            Expression::GetField {
                target, receiver, ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.for_each_declaration(f);
                }
                f(*target);
            }
            Expression::SetField {
                target,
                receiver,
                value,
            } => {
                if let Some(receiver) = receiver {
                    receiver.for_each_declaration(f);
                }
                value.for_each_declaration(f);
                f(*target);
            }
            Expression::TypeOperator { operand, .. } => operand.for_each_declaration(f),
            Expression::When { branches, .. } => {
                for branch in branches {
                    branch.condition.for_each_declaration(f);
                    branch.result.for_each_declaration(f);
                }
            }
            Expression::Block { statements, .. } => {
                for statement in statements {
                    statement.for_each_declaration(f);
                }
            }
            Expression::Return { target, value } => {
                value.for_each_declaration(f);
                f(*target);
            }
        }
    }

    /// Replaces every declaration this expression refers to with `f`'s answer for it, in the
    /// same order [`Expression::for_each_declaration`] visits them.
    pub fn remap_declarations<F>(&mut self, f: &mut F) -> Result<(), CompileError>
    where
        F: FnMut(Declaration) -> Result<Declaration, CompileError>,
    {
        match self {
            Expression::Const { .. } | Expression::GetValue { .. } => {}
            Expression::Call {
                target,
                receiver,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.remap_declarations(f)?;
                }
                for argument in arguments {
                    argument.remap_declarations(f)?;
                }
                *target = f(*target)?;
            }
            Expression::ConstructorCall(call) => call.remap_declarations(f)?,
            Expression::FunctionReference { target, .. }
            | Expression::GetEnumValue { target, .. } => *target = f(*target)?,
            Expression::PropertyReference {
                target,
                getter,
                setter,
                field,
                ..
            } => {
                *target = f(*target)?;
                for accessor in [getter, setter, field].into_iter().flatten() {
                    *accessor = f(*accessor)?;
                }
            }
            Expression::GetField {
                target, receiver, ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.remap_declarations(f)?;
                }
                *target = f(*target)?;
            }
            Expression::SetField {
                target,
                receiver,
                value,
            } => {
                if let Some(receiver) = receiver {
                    receiver.remap_declarations(f)?;
                }
                value.remap_declarations(f)?;
                *target = f(*target)?;
            }
            Expression::TypeOperator { operand, .. } => operand.remap_declarations(f)?,
            Expression::When { branches, .. } => {
                for branch in branches {
                    branch.condition.remap_declarations(f)?;
                    branch.result.remap_declarations(f)?;
                }
            }
            Expression::Block { statements, .. } => {
                for statement in statements {
                    statement.remap_declarations(f)?;
                }
            }
            Expression::Return { target, value } => {
                value.remap_declarations(f)?;
                *target = f(*target)?;
            }
        }
        Ok(())
    }
}

impl ConstructorCall {
    pub fn for_each_declaration(&self, f: &mut impl FnMut(Declaration)) {
        for argument in self.arguments.iter().flatten() {
            argument.for_each_declaration(f);
        }
        f(self.constructor);
    }

    pub fn remap_declarations<F>(&mut self, f: &mut F) -> Result<(), CompileError>
    where
        F: FnMut(Declaration) -> Result<Declaration, CompileError>,
    {
        for argument in self.arguments.iter_mut().flatten() {
            argument.remap_declarations(f)?;
        }
        self.constructor = f(self.constructor)?;
        Ok(())
    }
}
