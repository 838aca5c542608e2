//! Structural copies of expression trees with every declaration reference remapped.
//!
//! What a reference is remapped to is up to the [`SymbolRemapper`]. A plain map gives a
//! structural copy; the external reference collector resolves each reference to a mirror,
//! which pulls every declaration the copy mentions into the unit along with it.

use kestrel_error::CompileError;
use rustc_hash::FxHashMap;

use crate::{
    context::Context,
    declaration::Declaration,
    expression::{ConstructorCall, Expression},
};

pub trait SymbolRemapper {
    fn remap(
        &mut self,
        context: &mut Context,
        declaration: Declaration,
    ) -> Result<Declaration, CompileError>;
}

/// Declarations missing from the map are left as they are.
impl SymbolRemapper for FxHashMap<Declaration, Declaration> {
    fn remap(
        &mut self,
        _context: &mut Context,
        declaration: Declaration,
    ) -> Result<Declaration, CompileError> {
        Ok(self.get(&declaration).copied().unwrap_or(declaration))
    }
}

pub struct DeepCopier<'r, R: SymbolRemapper> {
    remapper: &'r mut R,
}

impl<'r, R: SymbolRemapper> DeepCopier<'r, R> {
    pub fn new(remapper: &'r mut R) -> Self {
        DeepCopier { remapper }
    }

    pub fn copy_expression(
        &mut self,
        context: &mut Context,
        expression: &Expression,
    ) -> Result<Expression, CompileError> {
        let mut copy = expression.clone();
        copy.remap_declarations(&mut |declaration| self.remapper.remap(context, declaration))?;
        Ok(copy)
    }

    /// Copies an annotation.
    ///
    /// Arguments whose type failed to resolve cannot be written out, so they are dropped and the
    /// parameter falls back to its default value.
    pub fn copy_annotation(
        &mut self,
        context: &mut Context,
        annotation: &ConstructorCall,
    ) -> Result<ConstructorCall, CompileError> {
        let mut arguments = Vec::with_capacity(annotation.arguments.len());
        for (index, argument) in annotation.arguments.iter().enumerate() {
            let copy = match argument {
                Some(argument) if argument.ty().is_error() => {
                    tracing::warn!(
                        annotation = %annotation.ty,
                        argument = index,
                        "dropping annotation argument of unresolved type"
                    );
                    None
                }
                Some(argument) => Some(self.copy_expression(context, argument)?),
                None => None,
            };
            arguments.push(copy);
        }
        Ok(ConstructorCall {
            constructor: self.remapper.remap(context, annotation.constructor)?,
            ty: annotation.ty.clone(),
            arguments,
        })
    }

    pub fn copy_annotations(
        &mut self,
        context: &mut Context,
        annotations: &[ConstructorCall],
    ) -> Result<Vec<ConstructorCall>, CompileError> {
        annotations
            .iter()
            .map(|annotation| self.copy_annotation(context, annotation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use kestrel_types::{FqName, TypeInfo};

    use super::*;
    use crate::{
        declaration::{ClassDecl, ClassKind, ConstructorDecl, DeclParent, DeclarationKind},
        expression::Constant,
        module::{File, Module},
    };

    fn annotation_class(context: &mut Context, file: File, name: &str) -> Declaration {
        let class = Declaration::new(
            context,
            DeclParent::File(file),
            name,
            DeclarationKind::Class(ClassDecl::new(ClassKind::Annotation)),
        );
        Declaration::new(
            context,
            DeclParent::Declaration(class),
            "<init>",
            DeclarationKind::Constructor(ConstructorDecl {
                value_parameters: vec![],
                is_primary: true,
                body: None,
            }),
        )
    }

    #[test]
    fn annotation_copy_remaps_and_drops_error_arguments() {
        let mut context = Context::new();
        let module = Module::new(&mut context, "main");
        let file = File::new(&mut context, module, "A.kt", FqName::parse("a"));
        let original = annotation_class(&mut context, file, "Original");
        let replacement = annotation_class(&mut context, file, "Replacement");

        let annotation = ConstructorCall {
            constructor: original,
            ty: TypeInfo::class("a.Original"),
            arguments: vec![
                Some(Expression::Const {
                    value: Constant::Int(1),
                    ty: TypeInfo::Int,
                }),
                Some(Expression::Const {
                    value: Constant::Null,
                    ty: TypeInfo::Error,
                }),
                None,
            ],
        };

        let mut map = FxHashMap::default();
        map.insert(original, replacement);
        let copy = DeepCopier::new(&mut map)
            .copy_annotation(&mut context, &annotation)
            .unwrap();

        assert_eq!(copy.constructor, replacement);
        assert_eq!(copy.arguments[0], annotation.arguments[0]);
        assert_eq!(copy.arguments[1], None);
        assert_eq!(copy.arguments.len(), 3);
    }
}
