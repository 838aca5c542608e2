//! Writing one unit into self-contained records.
//!
//! The unit is written in a fixed order: the id table is gathered from the untouched unit,
//! external references are collected (which rewrites the unit to point at mirrors), then the
//! container, annotations, id table and external references are written. Strings are frozen
//! last since every other section interns into them.

mod proto;
mod tables;

pub use proto::*;
pub use tables::*;

use kestrel_error::CompileError;

use crate::{
    config::SerializationConfig,
    context::Context,
    declaration::{Declaration, DeclarationKind, ValueParameter, Visibility},
    expression::{ConstructorCall, Expression},
    external_references::{
        collect_external_references, ExternalReferencesInfo, SerializationUnit,
    },
    mangle::Mangler,
};

impl SerializedUnit {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CompileError> {
        serde_json::to_vec(self).map_err(|err| CompileError::Encoding(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompileError> {
        serde_json::from_slice(bytes).map_err(|err| CompileError::Encoding(err.to_string()))
    }

    pub fn string(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }
}

/// Serializes `unit`, mirroring everything it refers to outside of itself.
///
/// The unit's own references are rewritten in `context` to point at the mirrors.
pub fn serialize_unit(
    context: &mut Context,
    unit: SerializationUnit,
    config: &SerializationConfig,
    mangler: &dyn Mangler,
) -> Result<SerializedUnit, CompileError> {
    let id_table = build_id_table(context, unit, mangler)?;
    let info = collect_external_references(context, unit, config)?;

    let context: &Context = context;
    let mut writer = UnitWriter {
        context,
        mangler,
        config,
        strings: StringTable::default(),
        types: TypeTable::default(),
        symbols: SymbolTable::default(),
    };
    let container = writer.write_container(unit)?;
    let annotations = writer.write_annotations(unit.annotations(context))?;
    let id_table = id_table.write(&mut writer.strings);
    let external_references = writer.write_external_references(&info)?;

    tracing::debug!(
        strings = writer.strings.len(),
        types = writer.types.len(),
        symbols = writer.symbols.len(),
        ids = id_table.len(),
        packages = external_references.packages.len(),
        "serialized unit"
    );
    Ok(SerializedUnit {
        container,
        annotations,
        id_table,
        external_references,
        symbols: writer.symbols.into_vec(),
        types: writer.types.into_vec(),
        strings: writer.strings.freeze(),
    })
}

/// Records every declaration the unit borrows from another top-level container.
///
/// Must run before the references are rewritten to mirrors.
fn build_id_table(
    context: &Context,
    unit: SerializationUnit,
    mangler: &dyn Mangler,
) -> Result<IdTable, CompileError> {
    let own_fq_name = unit.fq_name(context)?;
    let mut targets = Vec::new();
    let mut visit = |target: Declaration| targets.push(target);
    for declaration in unit.all_declarations(context) {
        for body in declaration.get_kind(context).bodies() {
            body.for_each_declaration(&mut visit);
        }
        for annotation in declaration.annotations(context) {
            annotation.for_each_declaration(&mut visit);
        }
    }
    if let SerializationUnit::File(file) = unit {
        for annotation in file.annotations(context) {
            annotation.for_each_declaration(&mut visit);
        }
    }

    let mut table = IdTable::default();
    for target in targets {
        // A unit serialized before has its references rewritten already.
        let target = target.original(context);
        let top_level_fq_name = target.top_level_fq_name(context)?;
        if top_level_fq_name != own_fq_name {
            table.record(mangler.uniq_id(context, target)?, top_level_fq_name);
        }
    }
    Ok(table)
}

struct UnitWriter<'a> {
    context: &'a Context,
    mangler: &'a dyn Mangler,
    config: &'a SerializationConfig,
    strings: StringTable,
    types: TypeTable,
    symbols: SymbolTable,
}

impl UnitWriter<'_> {
    fn write_container(
        &mut self,
        unit: SerializationUnit,
    ) -> Result<ContainerRecord, CompileError> {
        let context = self.context;
        let package = unit.package(context)?;
        let name = unit.fq_name(context)?;
        let declarations = self.write_declarations(&unit.declarations(context), true)?;
        Ok(ContainerRecord {
            package: self.strings.intern(&package.as_string()),
            name: self.strings.intern(name.short_name()),
            declarations,
        })
    }

    fn write_external_references(
        &mut self,
        info: &ExternalReferencesInfo,
    ) -> Result<ExternalReferencesRecord, CompileError> {
        let context = self.context;
        let mut packages = Vec::with_capacity(info.packages.len());
        for package in &info.packages {
            let fq_name = self.strings.intern(&package.get_fq_name(context).as_string());
            let declarations = self.write_declarations(package.declarations(context), false)?;
            packages.push(ExternalPackageRecord {
                fq_name,
                declarations,
            });
        }
        let mut references = Vec::with_capacity(info.references.len());
        for (mirror, package) in &info.references {
            references.push(ReferenceRecord {
                symbol: self.symbol(*mirror)?,
                package: *package as u32,
            });
        }
        Ok(ExternalReferencesRecord {
            packages,
            references,
        })
    }

    /// Private declarations are left out of the unit's own section when only externally
    /// visible ones are asked for; mirrors are always written in full.
    fn write_declarations(
        &mut self,
        declarations: &[Declaration],
        own: bool,
    ) -> Result<Vec<DeclarationRecord>, CompileError> {
        let context = self.context;
        let skip_private = own && self.config.externally_visible_only;
        declarations
            .iter()
            .filter(|declaration| {
                !(skip_private && declaration.get_visibility(context) == Visibility::Private)
            })
            .map(|declaration| self.write_declaration(*declaration, own))
            .collect()
    }

    fn write_declaration(
        &mut self,
        declaration: Declaration,
        own: bool,
    ) -> Result<DeclarationRecord, CompileError> {
        let context = self.context;
        let content = declaration.get_content(context);
        let symbol = self.symbol(declaration)?;
        let name = self.strings.intern(content.name.as_str());
        let annotations = self.write_annotations(&content.annotations)?;
        let kind = match &content.kind {
            DeclarationKind::Class(class) => DeclarationKindRecord::Class {
                class_kind: class.class_kind,
                modality: class.modality,
                type_parameters: self.names(class.type_parameters.iter().map(|p| p.as_str())),
                super_types: class.super_types.iter().map(|ty| self.types.intern(ty)).collect(),
                members: self.write_declarations(&class.declarations, own)?,
            },
            DeclarationKind::Constructor(constructor) => DeclarationKindRecord::Constructor {
                value_parameters: self.value_parameters(&constructor.value_parameters),
                is_primary: constructor.is_primary,
                body: self.optional_expression(constructor.body.as_ref())?,
            },
            DeclarationKind::Function(function) => DeclarationKindRecord::Function {
                modality: function.modality,
                type_parameters: self.names(function.type_parameters.iter().map(|p| p.as_str())),
                value_parameters: self.value_parameters(&function.value_parameters),
                return_type: self.types.intern(&function.return_type),
                is_inline: function.is_inline,
                is_external: function.is_external,
                is_suspend: function.is_suspend,
                overridden: self.symbols_of(&function.overridden)?,
                corresponding_property: self.optional_symbol(function.corresponding_property)?,
                body: self.optional_expression(function.body.as_ref())?,
            },
            DeclarationKind::Property(property) => DeclarationKindRecord::Property {
                modality: property.modality,
                ty: self.types.intern(&property.ty),
                is_var: property.is_var,
                is_const: property.is_const,
                getter: self.optional_symbol(property.getter)?,
                setter: self.optional_symbol(property.setter)?,
                backing_field: self.optional_symbol(property.backing_field)?,
                overridden: self.symbols_of(&property.overridden)?,
            },
            DeclarationKind::Field(field) => DeclarationKindRecord::Field {
                ty: self.types.intern(&field.ty),
                is_final: field.is_final,
                is_static: field.is_static,
                corresponding_property: self.optional_symbol(field.corresponding_property)?,
                overridden: self.symbols_of(&field.overridden)?,
                initializer: self.optional_expression(field.initializer.as_ref())?,
            },
            DeclarationKind::EnumEntry { initializer } => DeclarationKindRecord::EnumEntry {
                initializer: self.optional_expression(initializer.as_ref())?,
            },
            DeclarationKind::AnonymousInitializer { body } => {
                DeclarationKindRecord::AnonymousInitializer {
                    body: self.expression(body)?,
                }
            }
            DeclarationKind::TypeAlias { expanded } => DeclarationKindRecord::TypeAlias {
                expanded: self.types.intern(expanded),
            },
        };
        Ok(DeclarationRecord {
            symbol,
            name,
            visibility: content.visibility,
            span: content.span,
            annotations,
            kind,
        })
    }

    fn write_annotations(
        &mut self,
        annotations: &[ConstructorCall],
    ) -> Result<Vec<ConstructorCallRecord>, CompileError> {
        annotations
            .iter()
            .map(|annotation| self.constructor_call(annotation))
            .collect()
    }

    fn constructor_call(
        &mut self,
        call: &ConstructorCall,
    ) -> Result<ConstructorCallRecord, CompileError> {
        let arguments = call
            .arguments
            .iter()
            .map(|argument| self.optional_expression(argument.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(ConstructorCallRecord {
            constructor: self.symbol(call.constructor)?,
            ty: self.types.intern(&call.ty),
            arguments,
        })
    }

    fn expression(&mut self, expression: &Expression) -> Result<ExpressionRecord, CompileError> {
        let record = match expression {
            Expression::Const { value, ty } => ExpressionRecord::Const {
                value: value.clone(),
                ty: self.types.intern(ty),
            },
            Expression::GetValue { name, ty } => ExpressionRecord::GetValue {
                name: self.strings.intern(name.as_str()),
                ty: self.types.intern(ty),
            },
            Expression::Call {
                target,
                receiver,
                arguments,
                ty,
            } => ExpressionRecord::Call {
                target: self.symbol(*target)?,
                receiver: self.receiver(receiver.as_deref())?,
                arguments: arguments
                    .iter()
                    .map(|argument| self.expression(argument))
                    .collect::<Result<_, _>>()?,
                ty: self.types.intern(ty),
            },
            Expression::ConstructorCall(call) => {
                ExpressionRecord::ConstructorCall(self.constructor_call(call)?)
            }
            Expression::FunctionReference { target, ty } => ExpressionRecord::FunctionReference {
                target: self.symbol(*target)?,
                ty: self.types.intern(ty),
            },
            Expression::PropertyReference {
                target,
                getter,
                setter,
                field,
                ty,
            } => ExpressionRecord::PropertyReference {
                target: self.symbol(*target)?,
                getter: self.optional_symbol(*getter)?,
                setter: self.optional_symbol(*setter)?,
                field: self.optional_symbol(*field)?,
                ty: self.types.intern(ty),
            },
            Expression::GetField {
                target,
                receiver,
                ty,
            } => ExpressionRecord::GetField {
                target: self.symbol(*target)?,
                receiver: self.receiver(receiver.as_deref())?,
                ty: self.types.intern(ty),
            },
            Expression::SetField {
                target,
                receiver,
                value,
            } => ExpressionRecord::SetField {
                target: self.symbol(*target)?,
                receiver: self.receiver(receiver.as_deref())?,
                value: Box::new(self.expression(value)?),
            },
            Expression::GetEnumValue { target, ty } => ExpressionRecord::GetEnumValue {
                target: self.symbol(*target)?,
                ty: self.types.intern(ty),
            },
            Expression::TypeOperator {
                operator,
                operand,
                type_operand,
                ty,
            } => ExpressionRecord::TypeOperator {
                operator: *operator,
                operand: Box::new(self.expression(operand)?),
                type_operand: self.types.intern(type_operand),
                ty: self.types.intern(ty),
            },
            Expression::When { branches, ty } => ExpressionRecord::When {
                branches: branches
                    .iter()
                    .map(|branch| -> Result<_, CompileError> {
                        Ok((
                            self.expression(&branch.condition)?,
                            self.expression(&branch.result)?,
                        ))
                    })
                    .collect::<Result<_, _>>()?,
                ty: self.types.intern(ty),
            },
            Expression::Block { statements, ty } => ExpressionRecord::Block {
                statements: statements
                    .iter()
                    .map(|statement| self.expression(statement))
                    .collect::<Result<_, _>>()?,
                ty: self.types.intern(ty),
            },
            Expression::Return { target, value } => ExpressionRecord::Return {
                target: self.symbol(*target)?,
                value: Box::new(self.expression(value)?),
            },
        };
        Ok(record)
    }

    fn receiver(
        &mut self,
        receiver: Option<&Expression>,
    ) -> Result<Option<Box<ExpressionRecord>>, CompileError> {
        receiver
            .map(|receiver| self.expression(receiver).map(Box::new))
            .transpose()
    }

    fn optional_expression(
        &mut self,
        expression: Option<&Expression>,
    ) -> Result<Option<ExpressionRecord>, CompileError> {
        expression
            .map(|expression| self.expression(expression))
            .transpose()
    }

    fn symbol(&mut self, declaration: Declaration) -> Result<u32, CompileError> {
        self.symbols
            .intern(self.context, self.mangler, &mut self.strings, declaration)
    }

    fn optional_symbol(
        &mut self,
        declaration: Option<Declaration>,
    ) -> Result<Option<u32>, CompileError> {
        declaration.map(|declaration| self.symbol(declaration)).transpose()
    }

    fn symbols_of(&mut self, declarations: &[Declaration]) -> Result<Vec<u32>, CompileError> {
        declarations
            .iter()
            .map(|declaration| self.symbol(*declaration))
            .collect()
    }

    fn names<'n>(&mut self, names: impl Iterator<Item = &'n str>) -> Vec<u32> {
        names.map(|name| self.strings.intern(name)).collect()
    }

    fn value_parameters(&mut self, parameters: &[ValueParameter]) -> Vec<ValueParameterRecord> {
        parameters
            .iter()
            .map(|parameter| ValueParameterRecord {
                name: self.strings.intern(parameter.name.as_str()),
                ty: self.types.intern(&parameter.ty),
                has_default_value: parameter.has_default_value,
            })
            .collect()
    }
}
