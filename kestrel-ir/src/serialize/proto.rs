//! The records a unit is written as.
//!
//! Names are indices into [`SerializedUnit::strings`], types into [`SerializedUnit::types`]
//! and declaration references into [`SerializedUnit::symbols`].

use kestrel_types::{Span, TypeInfo};
use serde::{Deserialize, Serialize};

use crate::{
    declaration::{ClassKind, Modality, Visibility},
    expression::{Constant, TypeOperator},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedUnit {
    pub container: ContainerRecord,
    pub annotations: Vec<ConstructorCallRecord>,
    pub id_table: Vec<IdEntry>,
    pub external_references: ExternalReferencesRecord,
    pub symbols: Vec<SymbolRecord>,
    pub types: Vec<TypeInfo>,
    pub strings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub uniq_id: u64,
    pub signature: u32,
    pub is_mirror: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdEntry {
    pub uniq_id: u64,
    pub top_level_fq_name: u32,
}

/// A file facade or a class, with the declarations written for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub package: u32,
    pub name: u32,
    pub declarations: Vec<DeclarationRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalReferencesRecord {
    pub packages: Vec<ExternalPackageRecord>,
    pub references: Vec<ReferenceRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalPackageRecord {
    pub fq_name: u32,
    pub declarations: Vec<DeclarationRecord>,
}

/// A mirror and the index of its package in [`ExternalReferencesRecord::packages`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub symbol: u32,
    pub package: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub symbol: u32,
    pub name: u32,
    pub visibility: Visibility,
    pub span: Span,
    pub annotations: Vec<ConstructorCallRecord>,
    pub kind: DeclarationKindRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueParameterRecord {
    pub name: u32,
    pub ty: u32,
    pub has_default_value: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DeclarationKindRecord {
    Class {
        class_kind: ClassKind,
        modality: Modality,
        type_parameters: Vec<u32>,
        super_types: Vec<u32>,
        members: Vec<DeclarationRecord>,
    },
    Constructor {
        value_parameters: Vec<ValueParameterRecord>,
        is_primary: bool,
        body: Option<ExpressionRecord>,
    },
    Function {
        modality: Modality,
        type_parameters: Vec<u32>,
        value_parameters: Vec<ValueParameterRecord>,
        return_type: u32,
        is_inline: bool,
        is_external: bool,
        is_suspend: bool,
        overridden: Vec<u32>,
        corresponding_property: Option<u32>,
        body: Option<ExpressionRecord>,
    },
    Property {
        modality: Modality,
        ty: u32,
        is_var: bool,
        is_const: bool,
        getter: Option<u32>,
        setter: Option<u32>,
        backing_field: Option<u32>,
        overridden: Vec<u32>,
    },
    Field {
        ty: u32,
        is_final: bool,
        is_static: bool,
        corresponding_property: Option<u32>,
        overridden: Vec<u32>,
        initializer: Option<ExpressionRecord>,
    },
    EnumEntry {
        initializer: Option<ExpressionRecord>,
    },
    AnonymousInitializer {
        body: ExpressionRecord,
    },
    TypeAlias {
        expanded: u32,
    },
}

impl DeclarationKindRecord {
    pub fn body(&self) -> Option<&ExpressionRecord> {
        match self {
            DeclarationKindRecord::Constructor { body, .. }
            | DeclarationKindRecord::Function { body, .. }
            | DeclarationKindRecord::Field {
                initializer: body, ..
            }
            | DeclarationKindRecord::EnumEntry { initializer: body } => body.as_ref(),
            DeclarationKindRecord::AnonymousInitializer { body } => Some(body),
            DeclarationKindRecord::Class { .. }
            | DeclarationKindRecord::Property { .. }
            | DeclarationKindRecord::TypeAlias { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstructorCallRecord {
    pub constructor: u32,
    pub ty: u32,
    pub arguments: Vec<Option<ExpressionRecord>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExpressionRecord {
    Const {
        value: Constant,
        ty: u32,
    },
    GetValue {
        name: u32,
        ty: u32,
    },
    Call {
        target: u32,
        receiver: Option<Box<ExpressionRecord>>,
        arguments: Vec<ExpressionRecord>,
        ty: u32,
    },
    ConstructorCall(ConstructorCallRecord),
    FunctionReference {
        target: u32,
        ty: u32,
    },
    PropertyReference {
        target: u32,
        getter: Option<u32>,
        setter: Option<u32>,
        field: Option<u32>,
        ty: u32,
    },
    GetField {
        target: u32,
        receiver: Option<Box<ExpressionRecord>>,
        ty: u32,
    },
    SetField {
        target: u32,
        receiver: Option<Box<ExpressionRecord>>,
        value: Box<ExpressionRecord>,
    },
    GetEnumValue {
        target: u32,
        ty: u32,
    },
    TypeOperator {
        operator: TypeOperator,
        operand: Box<ExpressionRecord>,
        type_operand: u32,
        ty: u32,
    },
    When {
        branches: Vec<(ExpressionRecord, ExpressionRecord)>,
        ty: u32,
    },
    Block {
        statements: Vec<ExpressionRecord>,
        ty: u32,
    },
    Return {
        target: u32,
        value: Box<ExpressionRecord>,
    },
}
