//! Declarations: classes and their members, top-level functions and properties.
//!
//! Every declaration knows its parent, which is another declaration, a source [`File`] or an
//! [`ExternalPackage`] fragment. Property accessors and backing fields are listed next to their
//! property in the parent and are tied to it through `corresponding_property`.

use kestrel_error::CompileError;
use kestrel_types::{FqName, Ident, Span, TypeInfo};
use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    expression::{ConstructorCall, Expression},
    module::{ExternalPackage, File},
};

/// A wrapper around a [slotmap](https://docs.rs/slotmap) key into the [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Declaration(pub slotmap::DefaultKey);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DeclParent {
    Declaration(Declaration),
    File(File),
    ExternalPackage(ExternalPackage),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DeclarationOrigin {
    /// Declared in source, or loaded from a compiled library.
    Defined,
    /// A signature-only stand-in for a declaration of another unit.
    ExternalMirror,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Internal,
    Protected,
    Private,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Final,
    Open,
    Abstract,
    Sealed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Object,
    Annotation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValueParameter {
    pub name: Ident,
    pub ty: TypeInfo,
    pub has_default_value: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub class_kind: ClassKind,
    pub modality: Modality,
    pub type_parameters: Vec<Ident>,
    pub super_types: Vec<TypeInfo>,
    pub declarations: Vec<Declaration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorDecl {
    pub value_parameters: Vec<ValueParameter>,
    pub is_primary: bool,
    pub body: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub modality: Modality,
    pub type_parameters: Vec<Ident>,
    pub value_parameters: Vec<ValueParameter>,
    pub return_type: TypeInfo,
    pub is_inline: bool,
    pub is_external: bool,
    pub is_suspend: bool,
    pub overridden: Vec<Declaration>,
    /// The property this function is the getter or setter of.
    pub corresponding_property: Option<Declaration>,
    pub body: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    pub modality: Modality,
    pub ty: TypeInfo,
    pub is_var: bool,
    pub is_const: bool,
    pub getter: Option<Declaration>,
    pub setter: Option<Declaration>,
    pub backing_field: Option<Declaration>,
    pub overridden: Vec<Declaration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub ty: TypeInfo,
    pub is_final: bool,
    pub is_static: bool,
    pub corresponding_property: Option<Declaration>,
    pub overridden: Vec<Declaration>,
    pub initializer: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationKind {
    Class(ClassDecl),
    Constructor(ConstructorDecl),
    Function(FunctionDecl),
    Property(PropertyDecl),
    Field(FieldDecl),
    EnumEntry { initializer: Option<Expression> },
    AnonymousInitializer { body: Expression },
    TypeAlias { expanded: TypeInfo },
}

impl DeclarationKind {
    pub fn name(&self) -> &'static str {
        match self {
            DeclarationKind::Class(_) => "class",
            DeclarationKind::Constructor(_) => "constructor",
            DeclarationKind::Function(_) => "function",
            DeclarationKind::Property(_) => "property",
            DeclarationKind::Field(_) => "field",
            DeclarationKind::EnumEntry { .. } => "enum entry",
            DeclarationKind::AnonymousInitializer { .. } => "anonymous initializer",
            DeclarationKind::TypeAlias { .. } => "type alias",
        }
    }

    /// Every expression the declaration owns.
    pub fn bodies_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            DeclarationKind::Constructor(ConstructorDecl { body, .. })
            | DeclarationKind::Function(FunctionDecl { body, .. })
            | DeclarationKind::Field(FieldDecl {
                initializer: body, ..
            })
            | DeclarationKind::EnumEntry { initializer: body } => body.iter_mut().collect(),
            DeclarationKind::AnonymousInitializer { body } => vec![body],
            DeclarationKind::Class(_)
            | DeclarationKind::Property(_)
            | DeclarationKind::TypeAlias { .. } => vec![],
        }
    }

    pub fn bodies(&self) -> Vec<&Expression> {
        match self {
            DeclarationKind::Constructor(ConstructorDecl { body, .. })
            | DeclarationKind::Function(FunctionDecl { body, .. })
            | DeclarationKind::Field(FieldDecl {
                initializer: body, ..
            })
            | DeclarationKind::EnumEntry { initializer: body } => body.iter().collect(),
            DeclarationKind::AnonymousInitializer { body } => vec![body],
            DeclarationKind::Class(_)
            | DeclarationKind::Property(_)
            | DeclarationKind::TypeAlias { .. } => vec![],
        }
    }

    /// The overridden declarations of a function, property or field.
    pub fn overridden_mut(&mut self) -> Option<&mut Vec<Declaration>> {
        match self {
            DeclarationKind::Function(FunctionDecl { overridden, .. })
            | DeclarationKind::Property(PropertyDecl { overridden, .. })
            | DeclarationKind::Field(FieldDecl { overridden, .. }) => Some(overridden),
            _ => None,
        }
    }
}

#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct DeclarationContent {
    pub name: Ident,
    pub parent: Option<DeclParent>,
    pub origin: DeclarationOrigin,
    pub visibility: Visibility,
    pub span: Span,
    pub annotations: Vec<ConstructorCall>,
    /// For top-level members loaded from a compiled library: the class holding them.
    pub implementation_class: Option<Ident>,
    /// For mirrors: the declaration this one stands in for.
    pub mirrored_from: Option<Declaration>,
    pub kind: DeclarationKind,
}

impl Declaration {
    /// Creates a public declaration and appends it to `parent`.
    pub fn new(
        context: &mut Context,
        parent: DeclParent,
        name: &str,
        kind: DeclarationKind,
    ) -> Declaration {
        let content = DeclarationContent {
            name: Ident::new_no_span(name),
            parent: Some(parent),
            origin: DeclarationOrigin::Defined,
            visibility: Visibility::Public,
            span: Span::UNDEFINED,
            annotations: Vec::new(),
            implementation_class: None,
            mirrored_from: None,
            kind,
        };
        Declaration::insert(context, content)
    }

    /// Adds `content` to the context and appends it to its parent, if it has one.
    pub fn insert(context: &mut Context, content: DeclarationContent) -> Declaration {
        let parent = content.parent;
        let declaration = Declaration(context.declarations.insert(content));
        match parent {
            Some(DeclParent::File(file)) => context.files[file.0].declarations.push(declaration),
            Some(DeclParent::ExternalPackage(package)) => context.external_packages[package.0]
                .declarations
                .push(declaration),
            Some(DeclParent::Declaration(parent)) => {
                if let DeclarationKind::Class(class) = &mut context.declarations[parent.0].kind {
                    class.declarations.push(declaration);
                }
            }
            None => {}
        }
        declaration
    }

    pub fn get_content<'a>(&self, context: &'a Context) -> &'a DeclarationContent {
        &context.declarations[self.0]
    }

    pub fn get_content_mut<'a>(&self, context: &'a mut Context) -> &'a mut DeclarationContent {
        &mut context.declarations[self.0]
    }

    pub fn get_name<'a>(&self, context: &'a Context) -> &'a str {
        context.declarations[self.0].name.as_str()
    }

    pub fn get_kind<'a>(&self, context: &'a Context) -> &'a DeclarationKind {
        &context.declarations[self.0].kind
    }

    pub fn get_parent(&self, context: &Context) -> Option<DeclParent> {
        context.declarations[self.0].parent
    }

    pub fn get_visibility(&self, context: &Context) -> Visibility {
        context.declarations[self.0].visibility
    }

    pub fn set_visibility(&self, context: &mut Context, visibility: Visibility) {
        context.declarations[self.0].visibility = visibility;
    }

    pub fn annotations<'a>(&self, context: &'a Context) -> &'a [ConstructorCall] {
        &context.declarations[self.0].annotations
    }

    pub fn add_annotation(&self, context: &mut Context, annotation: ConstructorCall) {
        context.declarations[self.0].annotations.push(annotation);
    }

    pub fn set_implementation_class(&self, context: &mut Context, class_name: &str) {
        context.declarations[self.0].implementation_class = Some(Ident::new_no_span(class_name));
    }

    pub fn is_mirror(&self, context: &Context) -> bool {
        context.declarations[self.0].origin == DeclarationOrigin::ExternalMirror
    }

    /// The declaration a mirror was made from. Mirrors of mirrors resolve to the first
    /// original; any other declaration is its own original.
    pub fn original(&self, context: &Context) -> Declaration {
        let mut declaration = *self;
        while let Some(original) = context.declarations[declaration.0].mirrored_from {
            declaration = original;
        }
        declaration
    }

    pub fn is_class(&self, context: &Context) -> bool {
        matches!(self.get_kind(context), DeclarationKind::Class(_))
    }

    /// The members of a class, empty for any other declaration.
    pub fn members<'a>(&self, context: &'a Context) -> &'a [Declaration] {
        match self.get_kind(context) {
            DeclarationKind::Class(class) => &class.declarations,
            _ => &[],
        }
    }

    /// Ties a getter, setter or backing field to `property`, in both directions, filling
    /// `slot` of the property.
    pub fn link_to_property(
        &self,
        context: &mut Context,
        property: Declaration,
        slot: AccessorSlot,
    ) -> Result<(), CompileError> {
        let fits = match self.get_kind(context) {
            DeclarationKind::Function(_) => slot != AccessorSlot::BackingField,
            DeclarationKind::Field(_) => slot == AccessorSlot::BackingField,
            _ => false,
        };
        if !fits || !matches!(property.get_kind(context), DeclarationKind::Property(_)) {
            return Err(self.unmatched_accessor(context, property));
        }

        match &mut context.declarations[self.0].kind {
            DeclarationKind::Function(function) => function.corresponding_property = Some(property),
            DeclarationKind::Field(field) => field.corresponding_property = Some(property),
            _ => {}
        }
        if let DeclarationKind::Property(decl) = &mut context.declarations[property.0].kind {
            *decl.slot_mut(slot) = Some(*self);
        }
        Ok(())
    }

    /// The property this accessor or backing field belongs to.
    pub fn corresponding_property(&self, context: &Context) -> Option<Declaration> {
        match self.get_kind(context) {
            DeclarationKind::Function(function) => function.corresponding_property,
            DeclarationKind::Field(field) => field.corresponding_property,
            _ => None,
        }
    }

    /// The slot `property` holds this declaration in. Fails when the property does not list
    /// it as one of its accessors or its field.
    pub fn slot_in(
        &self,
        context: &Context,
        property: Declaration,
    ) -> Result<AccessorSlot, CompileError> {
        let slot = match property.get_kind(context) {
            DeclarationKind::Property(decl) => decl
                .slots()
                .into_iter()
                .find_map(|(slot, held)| (held == Some(*self)).then_some(slot)),
            _ => None,
        };
        slot.ok_or_else(|| self.unmatched_accessor(context, property))
    }

    fn unmatched_accessor(&self, context: &Context, property: Declaration) -> CompileError {
        CompileError::UnmatchedAccessor {
            property: property.get_name(context).to_string(),
            accessor: self.get_name(context).to_string(),
        }
    }

    /// The package this declaration belongs to, found through its parent chain.
    pub fn package(&self, context: &Context) -> Result<FqName, CompileError> {
        match self.get_parent(context) {
            Some(DeclParent::Declaration(parent)) => parent.package(context),
            Some(DeclParent::File(file)) => Ok(file.get_package(context).clone()),
            Some(DeclParent::ExternalPackage(package)) => {
                Ok(package.get_fq_name(context).clone())
            }
            None => Err(self.unresolved(context)),
        }
    }

    /// The fully qualified name: the package, enclosing classes and own name.
    pub fn fq_name(&self, context: &Context) -> Result<FqName, CompileError> {
        let prefix = match self.get_parent(context) {
            Some(DeclParent::Declaration(parent)) => parent.fq_name(context)?,
            Some(_) => self.package(context)?,
            None => return Err(self.unresolved(context)),
        };
        Ok(prefix.child(self.get_name(context)))
    }

    /// The outermost declaration of the parent chain.
    pub fn top_level_declaration(&self, context: &Context) -> Result<Declaration, CompileError> {
        match self.get_parent(context) {
            Some(DeclParent::Declaration(parent)) => parent.top_level_declaration(context),
            Some(_) => Ok(*self),
            None => Err(self.unresolved(context)),
        }
    }

    /// The fully qualified name of the class that holds this declaration once compiled: the
    /// top-level class, or the file facade for top-level functions and properties.
    pub fn top_level_fq_name(&self, context: &Context) -> Result<FqName, CompileError> {
        let top = self.top_level_declaration(context)?;
        if top.is_class(context) {
            return top.fq_name(context);
        }
        match top.get_parent(context) {
            Some(DeclParent::File(file)) => Ok(file.facade_fq_name(context)),
            Some(DeclParent::ExternalPackage(package)) => {
                let Some(class_name) = &context.declarations[top.0].implementation_class else {
                    return Err(CompileError::MissingImplementationClass {
                        declaration: top.describe(context),
                    });
                };
                Ok(package.get_fq_name(context).child(class_name.as_str()))
            }
            _ => Err(top.unresolved(context)),
        }
    }

    /// A printable name for diagnostics; falls back to the bare name when the parent chain is
    /// broken.
    pub fn describe(&self, context: &Context) -> String {
        self.fq_name(context)
            .map(|fq_name| fq_name.to_string())
            .unwrap_or_else(|_| self.get_name(context).to_string())
    }

    fn unresolved(&self, context: &Context) -> CompileError {
        CompileError::UnresolvedTopLevelContainer {
            declaration: self.get_name(context).to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AccessorSlot {
    Getter,
    Setter,
    BackingField,
}

impl FunctionDecl {
    /// A final, non-inline function without type parameters.
    pub fn new(value_parameters: Vec<ValueParameter>, return_type: TypeInfo) -> Self {
        FunctionDecl {
            modality: Modality::Final,
            type_parameters: Vec::new(),
            value_parameters,
            return_type,
            is_inline: false,
            is_external: false,
            is_suspend: false,
            overridden: Vec::new(),
            corresponding_property: None,
            body: None,
        }
    }

    pub fn with_body(self, body: Expression) -> Self {
        Self {
            body: Some(body),
            ..self
        }
    }
}

impl ClassDecl {
    pub fn new(class_kind: ClassKind) -> Self {
        ClassDecl {
            class_kind,
            modality: Modality::Final,
            type_parameters: Vec::new(),
            super_types: Vec::new(),
            declarations: Vec::new(),
        }
    }
}

impl PropertyDecl {
    pub fn new(ty: TypeInfo, is_var: bool) -> Self {
        PropertyDecl {
            modality: Modality::Final,
            ty,
            is_var,
            is_const: false,
            getter: None,
            setter: None,
            backing_field: None,
            overridden: Vec::new(),
        }
    }
    /// The accessors and the backing field, each with the slot holding it.
    pub fn slots(&self) -> [(AccessorSlot, Option<Declaration>); 3] {
        [
            (AccessorSlot::Getter, self.getter),
            (AccessorSlot::Setter, self.setter),
            (AccessorSlot::BackingField, self.backing_field),
        ]
    }

    fn slot_mut(&mut self, slot: AccessorSlot) -> &mut Option<Declaration> {
        match slot {
            AccessorSlot::Getter => &mut self.getter,
            AccessorSlot::Setter => &mut self.setter,
            AccessorSlot::BackingField => &mut self.backing_field,
        }
    }
}

impl FieldDecl {
    pub fn new(ty: TypeInfo) -> Self {
        FieldDecl {
            ty,
            is_final: true,
            is_static: false,
            corresponding_property: None,
            overridden: Vec::new(),
            initializer: None,
        }
    }
}
