//! Mirrors of declarations referenced across serialization units.
//!
//! A unit (one file's top-level functions and properties, or one top-level class) is written
//! on its own. Whatever it calls or reads from another unit is replaced by a bodiless mirror
//! living in an [`ExternalPackage`] placeholder, so the written unit stays self-contained.
//!
//! Mirrors are memoized by the declaration they stand for. A property and its accessors point
//! at each other, so a mirror is registered before any of its links are followed.

use kestrel_error::CompileError;
use kestrel_types::{FqName, FxIndexMap, Span};
use rustc_hash::FxHashMap;

use crate::{
    config::SerializationConfig,
    context::Context,
    declaration::{
        ClassDecl, ConstructorDecl, DeclParent, Declaration, DeclarationContent,
        DeclarationKind, DeclarationOrigin, FieldDecl, FunctionDecl, PropertyDecl,
    },
    deep_copy::{DeepCopier, SymbolRemapper},
    expression::ConstructorCall,
    module::{ExternalPackage, File},
};

/// What gets serialized in one go.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SerializationUnit {
    /// The top-level functions and properties of a file, along with its annotations.
    File(File),
    /// A top-level class and everything nested in it.
    Class(Declaration),
}

impl SerializationUnit {
    /// The top-level declarations this unit is made of.
    pub fn declarations(&self, context: &Context) -> Vec<Declaration> {
        match self {
            SerializationUnit::File(file) => file
                .declarations(context)
                .iter()
                .copied()
                .filter(|declaration| !declaration.is_class(context))
                .collect(),
            SerializationUnit::Class(class) => vec![*class],
        }
    }

    /// The declarations of [`SerializationUnit::declarations`] and all of their members.
    pub fn all_declarations(&self, context: &Context) -> Vec<Declaration> {
        let mut result = Vec::new();
        let mut pending = self.declarations(context);
        pending.reverse();
        while let Some(declaration) = pending.pop() {
            result.push(declaration);
            pending.extend(declaration.members(context).iter().rev().copied());
        }
        result
    }

    /// Annotations of the unit itself: the file annotations, or those of the class.
    pub fn annotations<'a>(&self, context: &'a Context) -> &'a [ConstructorCall] {
        match self {
            SerializationUnit::File(file) => file.annotations(context),
            SerializationUnit::Class(class) => class.annotations(context),
        }
    }

    /// The fully qualified name of the class the unit compiles to.
    pub fn fq_name(&self, context: &Context) -> Result<FqName, CompileError> {
        match self {
            SerializationUnit::File(file) => Ok(file.facade_fq_name(context)),
            SerializationUnit::Class(class) => class.fq_name(context),
        }
    }

    pub fn package(&self, context: &Context) -> Result<FqName, CompileError> {
        match self {
            SerializationUnit::File(file) => Ok(file.get_package(context).clone()),
            SerializationUnit::Class(class) => class.package(context),
        }
    }

    fn key(&self) -> TopLevelKey {
        match self {
            SerializationUnit::File(file) => TopLevelKey::File(*file),
            SerializationUnit::Class(class) => TopLevelKey::Class(*class),
        }
    }
}

/// The top-level container a declaration belongs to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TopLevelKey {
    /// A top-level function or property of a source file.
    File(File),
    /// A top-level class, of this module or of a library.
    Class(Declaration),
    /// The implementation class of a library's top-level functions and properties.
    Facade(FqName),
}

impl TopLevelKey {
    pub fn of(context: &Context, declaration: Declaration) -> Result<TopLevelKey, CompileError> {
        let top = declaration.top_level_declaration(context)?;
        if top.is_class(context) {
            return Ok(TopLevelKey::Class(top));
        }
        match top.get_parent(context) {
            Some(DeclParent::File(file)) => Ok(TopLevelKey::File(file)),
            Some(DeclParent::ExternalPackage(_)) => {
                Ok(TopLevelKey::Facade(top.top_level_fq_name(context)?))
            }
            _ => Err(CompileError::UnresolvedTopLevelContainer {
                declaration: declaration.describe(context),
            }),
        }
    }
}

/// What a unit refers to outside of itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalReferencesInfo {
    /// Placeholders of every package a mirror was created in, in first-seen order.
    pub packages: Vec<ExternalPackage>,
    /// Every mirror and the index of its package in `packages`.
    pub references: FxIndexMap<Declaration, usize>,
}

/// The memo of one collection run. Create one per unit.
pub struct ExternalReferenceCollection {
    unit: SerializationUnit,
    unit_key: TopLevelKey,
    span: Span,
    mirrors: FxHashMap<Declaration, Declaration>,
    references: FxIndexMap<Declaration, usize>,
    packages: FxIndexMap<FqName, ExternalPackage>,
}

impl ExternalReferenceCollection {
    pub fn new(unit: SerializationUnit, config: &SerializationConfig) -> Self {
        ExternalReferenceCollection {
            unit,
            unit_key: unit.key(),
            span: config.synthetic_offsets,
            mirrors: FxHashMap::default(),
            references: FxIndexMap::default(),
            packages: FxIndexMap::default(),
        }
    }

    pub fn unit(&self) -> SerializationUnit {
        self.unit
    }

    /// True if `declaration` is written as part of this unit.
    pub fn is_local(
        &self,
        context: &Context,
        declaration: Declaration,
    ) -> Result<bool, CompileError> {
        Ok(TopLevelKey::of(context, declaration)? == self.unit_key)
    }

    pub fn mirror_of(&self, declaration: Declaration) -> Option<Declaration> {
        self.mirrors.get(&declaration).copied()
    }

    pub fn num_mirrors(&self) -> usize {
        self.mirrors.len()
    }

    /// Returns the mirror standing in for `declaration`, creating it and its parent chain on
    /// first use.
    pub fn get_or_create_mirror(
        &mut self,
        context: &mut Context,
        declaration: Declaration,
    ) -> Result<Declaration, CompileError> {
        if self.references.contains_key(&declaration) {
            return Ok(declaration);
        }
        // Mirrors made for an earlier unit stand in for their originals.
        let declaration = declaration.original(context);
        if let Some(mirror) = self.mirrors.get(&declaration) {
            return Ok(*mirror);
        }

        let kind = signature_of(context, declaration)?;
        // Unreachable containers fail here, before anything is created.
        let top_level_fq_name = declaration.top_level_fq_name(context)?;

        let original_parent = declaration.get_parent(context);
        let (parent, package_index) = match original_parent {
            Some(DeclParent::Declaration(parent)) => {
                let parent_mirror = self.get_or_create_mirror(context, parent)?;
                let index = self.references.get(&parent_mirror).copied().ok_or_else(|| {
                    CompileError::UnresolvedTopLevelContainer {
                        declaration: declaration.describe(context),
                    }
                })?;
                (DeclParent::Declaration(parent_mirror), index)
            }
            Some(DeclParent::File(_) | DeclParent::ExternalPackage(_)) => {
                let package = declaration.package(context)?;
                let (index, package) = self.package_placeholder(context, package);
                (DeclParent::ExternalPackage(package), index)
            }
            None => {
                return Err(CompileError::UnresolvedTopLevelContainer {
                    declaration: declaration.describe(context),
                })
            }
        };

        let original = declaration.get_content(context);
        // Top-level members keep pointing at their facade so the mirror resolves like the
        // original does.
        let implementation_class = match (original_parent, &kind) {
            (Some(DeclParent::Declaration(_)), _) | (_, DeclarationKind::Class(_)) => None,
            _ => Some(top_level_fq_name.short_name().into()),
        };
        let content = DeclarationContent {
            name: original.name.clone(),
            parent: Some(parent),
            origin: DeclarationOrigin::ExternalMirror,
            visibility: original.visibility,
            span: self.span,
            annotations: Vec::new(),
            implementation_class,
            mirrored_from: Some(declaration),
            kind,
        };
        let mirror = Declaration::insert(context, content);
        self.mirrors.insert(declaration, mirror);
        self.references.insert(mirror, package_index);
        let package = self
            .packages
            .get_index(package_index)
            .map(|(fq_name, _)| fq_name.to_string())
            .unwrap_or_default();
        tracing::debug!(
            original = %declaration.describe(context),
            kind = mirror.get_kind(context).name(),
            %package,
            "created external mirror"
        );

        self.relink(context, declaration, mirror)?;
        Ok(mirror)
    }

    /// Follows the links of `original` and points `mirror` at the mirrors of their targets.
    fn relink(
        &mut self,
        context: &mut Context,
        original: Declaration,
        mirror: Declaration,
    ) -> Result<(), CompileError> {
        match original.get_kind(context).clone() {
            DeclarationKind::Property(property) => {
                for (slot, accessor) in property.slots() {
                    let Some(accessor) = accessor else {
                        continue;
                    };
                    let accessor_mirror = self.get_or_create_mirror(context, accessor)?;
                    accessor_mirror.link_to_property(context, mirror, slot)?;
                }
            }
            DeclarationKind::Function(FunctionDecl {
                corresponding_property: Some(property),
                ..
            })
            | DeclarationKind::Field(FieldDecl {
                corresponding_property: Some(property),
                ..
            }) => {
                let slot = original.slot_in(context, property)?;
                let property_mirror = self.get_or_create_mirror(context, property)?;
                mirror.link_to_property(context, property_mirror, slot)?;
            }
            _ => {}
        }

        let annotations = original.annotations(context).to_vec();
        let annotations = DeepCopier::new(&mut *self).copy_annotations(context, &annotations)?;
        mirror.get_content_mut(context).annotations = annotations;

        let overridden = match original.get_kind(context) {
            DeclarationKind::Function(FunctionDecl { overridden, .. })
            | DeclarationKind::Property(PropertyDecl { overridden, .. })
            | DeclarationKind::Field(FieldDecl { overridden, .. }) => overridden.clone(),
            _ => Vec::new(),
        };
        let overridden = overridden
            .into_iter()
            .map(|target| self.remap(context, target))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(slot) = mirror.get_content_mut(context).kind.overridden_mut() {
            *slot = overridden;
        }
        Ok(())
    }

    fn package_placeholder(
        &mut self,
        context: &mut Context,
        fq_name: FqName,
    ) -> (usize, ExternalPackage) {
        if let Some((index, _, package)) = self.packages.get_full(&fq_name) {
            return (index, *package);
        }
        let package = ExternalPackage::new(context, fq_name.clone(), self.span);
        let (index, _) = self.packages.insert_full(fq_name, package);
        (index, package)
    }

    /// Rewrites every reference in the unit to point at a mirror when its target lives in
    /// another unit.
    pub fn collect(&mut self, context: &mut Context) -> Result<(), CompileError> {
        for declaration in self.unit.all_declarations(context) {
            let mut bodies = declaration
                .get_kind(context)
                .bodies()
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            for body in &mut bodies {
                body.remap_declarations(&mut |target| self.remap(context, target))?;
            }
            let kind = &mut declaration.get_content_mut(context).kind;
            for (slot, body) in kind.bodies_mut().into_iter().zip(bodies) {
                *slot = body;
            }

            let mut annotations = declaration.annotations(context).to_vec();
            self.remap_annotations(context, &mut annotations)?;
            declaration.get_content_mut(context).annotations = annotations;

            let overridden = declaration
                .get_content_mut(context)
                .kind
                .overridden_mut()
                .map(std::mem::take);
            if let Some(overridden) = overridden {
                let overridden = overridden
                    .into_iter()
                    .map(|target| self.remap(context, target))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(slot) = declaration.get_content_mut(context).kind.overridden_mut() {
                    *slot = overridden;
                }
            }
        }

        if let SerializationUnit::File(file) = self.unit {
            let mut annotations = file.annotations(context).to_vec();
            self.remap_annotations(context, &mut annotations)?;
            context.files[file.0].annotations = annotations;
        }
        Ok(())
    }

    fn remap_annotations(
        &mut self,
        context: &mut Context,
        annotations: &mut [ConstructorCall],
    ) -> Result<(), CompileError> {
        for annotation in annotations {
            annotation.remap_declarations(&mut |target| self.remap(context, target))?;
        }
        Ok(())
    }

    pub fn finish(self) -> ExternalReferencesInfo {
        ExternalReferencesInfo {
            packages: self.packages.into_values().collect(),
            references: self.references,
        }
    }
}

impl SymbolRemapper for ExternalReferenceCollection {
    fn remap(
        &mut self,
        context: &mut Context,
        declaration: Declaration,
    ) -> Result<Declaration, CompileError> {
        if self.references.contains_key(&declaration) {
            return Ok(declaration);
        }
        let declaration = declaration.original(context);
        if self.is_local(context, declaration)? {
            Ok(declaration)
        } else {
            self.get_or_create_mirror(context, declaration)
        }
    }
}

/// The signature-only part of a declaration. Bodies are dropped and links are left for
/// [`ExternalReferenceCollection::relink`] to fill in.
fn signature_of(
    context: &Context,
    declaration: Declaration,
) -> Result<DeclarationKind, CompileError> {
    let kind = match declaration.get_kind(context) {
        DeclarationKind::Class(class) => DeclarationKind::Class(ClassDecl {
            declarations: Vec::new(),
            ..class.clone()
        }),
        DeclarationKind::Constructor(constructor) => DeclarationKind::Constructor(ConstructorDecl {
            body: None,
            ..constructor.clone()
        }),
        DeclarationKind::Function(function) => DeclarationKind::Function(FunctionDecl {
            overridden: Vec::new(),
            corresponding_property: None,
            body: None,
            ..function.clone()
        }),
        DeclarationKind::Property(property) => DeclarationKind::Property(PropertyDecl {
            getter: None,
            setter: None,
            backing_field: None,
            overridden: Vec::new(),
            ..property.clone()
        }),
        DeclarationKind::Field(field) => DeclarationKind::Field(FieldDecl {
            corresponding_property: None,
            overridden: Vec::new(),
            initializer: None,
            ..field.clone()
        }),
        DeclarationKind::EnumEntry { .. } => DeclarationKind::EnumEntry { initializer: None },
        kind @ (DeclarationKind::AnonymousInitializer { .. } | DeclarationKind::TypeAlias { .. }) => {
            return Err(CompileError::UnsupportedMirrorKind {
                kind: kind.name(),
                declaration: declaration.describe(context),
            })
        }
    };
    Ok(kind)
}

/// Mirrors everything `unit` refers to in other units and rewrites the unit to refer to the
/// mirrors instead.
pub fn collect_external_references(
    context: &mut Context,
    unit: SerializationUnit,
    config: &SerializationConfig,
) -> Result<ExternalReferencesInfo, CompileError> {
    let mut collection = ExternalReferenceCollection::new(unit, config);
    collection.collect(context)?;
    let info = collection.finish();
    tracing::debug!(
        packages = info.packages.len(),
        references = info.references.len(),
        "collected external references"
    );
    Ok(info)
}
