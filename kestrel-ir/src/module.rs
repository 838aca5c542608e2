//! The containers declarations live in.
//!
//! A [`Module`] is one compilation unit of source [`File`]s. Declarations that come from
//! compiled libraries, and the mirrors standing in for declarations of other units, live in an
//! [`ExternalPackage`] fragment keyed by its package name instead.

use kestrel_types::{constants::FILE_FACADE_SUFFIX, FqName, Span};

use crate::{context::Context, declaration::Declaration, expression::ConstructorCall};

/// A wrapper around a [slotmap](https://docs.rs/slotmap) key into the [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Module(pub slotmap::DefaultKey);

#[doc(hidden)]
#[derive(Debug)]
pub struct ModuleContent {
    pub name: String,
    pub files: Vec<File>,
}

impl Module {
    pub fn new(context: &mut Context, name: &str) -> Module {
        let content = ModuleContent {
            name: name.to_owned(),
            files: Vec::new(),
        };
        Module(context.modules.insert(content))
    }

    pub fn get_name<'a>(&self, context: &'a Context) -> &'a str {
        &context.modules[self.0].name
    }

    pub fn files<'a>(&self, context: &'a Context) -> &'a [File] {
        &context.modules[self.0].files
    }
}

/// A source file of a [`Module`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct File(pub slotmap::DefaultKey);

#[doc(hidden)]
#[derive(Debug)]
pub struct FileContent {
    pub module: Module,
    /// The file name, e.g. `Utils.kt`.
    pub name: String,
    pub package: FqName,
    pub declarations: Vec<Declaration>,
    /// File-level annotations.
    pub annotations: Vec<ConstructorCall>,
}

impl File {
    pub fn new(context: &mut Context, module: Module, name: &str, package: FqName) -> File {
        let content = FileContent {
            module,
            name: name.to_owned(),
            package,
            declarations: Vec::new(),
            annotations: Vec::new(),
        };
        let file = File(context.files.insert(content));
        context.modules[module.0].files.push(file);
        file
    }

    pub fn get_name<'a>(&self, context: &'a Context) -> &'a str {
        &context.files[self.0].name
    }

    pub fn get_package<'a>(&self, context: &'a Context) -> &'a FqName {
        &context.files[self.0].package
    }

    pub fn get_module(&self, context: &Context) -> Module {
        context.files[self.0].module
    }

    pub fn declarations<'a>(&self, context: &'a Context) -> &'a [Declaration] {
        &context.files[self.0].declarations
    }

    pub fn annotations<'a>(&self, context: &'a Context) -> &'a [ConstructorCall] {
        &context.files[self.0].annotations
    }

    pub fn add_annotation(&self, context: &mut Context, annotation: ConstructorCall) {
        context.files[self.0].annotations.push(annotation);
    }

    /// The class holding this file's top-level functions and properties, e.g.
    /// `com.example.UtilsKt` for `Utils.kt` in package `com.example`.
    pub fn facade_fq_name(&self, context: &Context) -> FqName {
        let content = &context.files[self.0];
        let stem = content
            .name
            .rsplit_once('.')
            .map_or(content.name.as_str(), |(stem, _)| stem);
        content
            .package
            .child(&format!("{stem}{FILE_FACADE_SUFFIX}"))
    }
}

/// A placeholder for a package outside the current unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ExternalPackage(pub slotmap::DefaultKey);

#[doc(hidden)]
#[derive(Debug)]
pub struct ExternalPackageContent {
    pub fq_name: FqName,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

impl ExternalPackage {
    pub fn new(context: &mut Context, fq_name: FqName, span: Span) -> ExternalPackage {
        let content = ExternalPackageContent {
            fq_name,
            declarations: Vec::new(),
            span,
        };
        ExternalPackage(context.external_packages.insert(content))
    }

    pub fn get_fq_name<'a>(&self, context: &'a Context) -> &'a FqName {
        &context.external_packages[self.0].fq_name
    }

    pub fn declarations<'a>(&self, context: &'a Context) -> &'a [Declaration] {
        &context.external_packages[self.0].declarations
    }

    pub fn get_span(&self, context: &Context) -> Span {
        context.external_packages[self.0].span
    }
}
