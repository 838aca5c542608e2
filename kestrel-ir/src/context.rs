//! The main handle to an IR instance.
//!
//! [`Context`] contains several [slotmap](https://docs.rs/slotmap) collections holding every
//! module, file, external package fragment and declaration. The handles ([`Module`],
//! [`File`], [`ExternalPackage`], [`Declaration`]) are plain copyable keys into those maps, so
//! cross references between declarations never own what they point to.
//!
//! It is passed around as a mutable reference to many of the IR APIs.

use slotmap::{DefaultKey, SlotMap};

use crate::{
    declaration::DeclarationContent,
    module::{ExternalPackageContent, FileContent, Module, ModuleContent},
};

/// The main IR context handle.
#[derive(Debug, Default)]
pub struct Context {
    pub(crate) modules: SlotMap<DefaultKey, ModuleContent>,
    pub(crate) files: SlotMap<DefaultKey, FileContent>,
    pub(crate) external_packages: SlotMap<DefaultKey, ExternalPackageContent>,
    pub(crate) declarations: SlotMap<DefaultKey, DeclarationContent>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an iterator over every module in this context, in creation order.
    pub fn module_iter(&self) -> impl Iterator<Item = Module> + '_ {
        self.modules.keys().map(Module)
    }

    pub fn num_declarations(&self) -> usize {
        self.declarations.len()
    }
}
