//! Stable cross-module identities for declarations.
//!
//! A mirror and the declaration it stands for must get the same identity, so a mangler only
//! looks at signature-level data: names along the parent chain, parameter and return types.

use itertools::Itertools;
use kestrel_error::CompileError;
use sha2::{Digest, Sha256};

use crate::{
    context::Context,
    declaration::{Declaration, DeclarationKind, ValueParameter},
};

pub trait Mangler {
    /// A string identifying `declaration` across modules.
    fn signature(
        &self,
        context: &Context,
        declaration: Declaration,
    ) -> Result<String, CompileError>;

    /// A 64-bit id derived from the signature.
    fn uniq_id(&self, context: &Context, declaration: Declaration) -> Result<u64, CompileError> {
        let signature = self.signature(context, declaration)?;
        Ok(hash_signature(&signature))
    }
}

/// Mangles a declaration into its fully qualified name, followed by the parameter and return
/// types for callables, e.g. `com.example.join(kotlin.String,Int):Unit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureMangler;

impl Mangler for SignatureMangler {
    fn signature(
        &self,
        context: &Context,
        declaration: Declaration,
    ) -> Result<String, CompileError> {
        let fq_name = declaration.fq_name(context)?;
        let signature = match declaration.get_kind(context) {
            DeclarationKind::Function(function) => format!(
                "{fq_name}{}:{}",
                parameters(&function.value_parameters),
                function.return_type
            ),
            DeclarationKind::Constructor(constructor) => {
                format!("{fq_name}{}", parameters(&constructor.value_parameters))
            }
            DeclarationKind::Field(_) => format!("{fq_name}#field"),
            DeclarationKind::Class(_)
            | DeclarationKind::Property(_)
            | DeclarationKind::EnumEntry { .. }
            | DeclarationKind::AnonymousInitializer { .. }
            | DeclarationKind::TypeAlias { .. } => fq_name.to_string(),
        };
        Ok(signature)
    }
}

fn parameters(parameters: &[ValueParameter]) -> String {
    format!(
        "({})",
        parameters
            .iter()
            .map(|parameter| parameter.ty.to_string())
            .join(",")
    )
}

/// The first eight bytes of the SHA-256 digest of `signature`, little endian.
pub fn hash_signature(signature: &str) -> u64 {
    let digest = Sha256::digest(signature.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use kestrel_types::{FqName, Ident, TypeInfo};

    use super::*;
    use crate::{
        declaration::{DeclParent, FunctionDecl},
        module::{File, Module},
    };

    #[test]
    fn signature_of_function() {
        let mut context = Context::new();
        let module = Module::new(&mut context, "main");
        let file = File::new(&mut context, module, "Utils.kt", FqName::parse("com.example"));
        let parameters = vec![
            ValueParameter {
                name: Ident::new_no_span("s"),
                ty: TypeInfo::class("kotlin.String"),
                has_default_value: false,
            },
            ValueParameter {
                name: Ident::new_no_span("n"),
                ty: TypeInfo::Int,
                has_default_value: true,
            },
        ];
        let join = Declaration::new(
            &mut context,
            DeclParent::File(file),
            "join",
            DeclarationKind::Function(FunctionDecl::new(parameters, TypeInfo::Unit)),
        );

        let signature = SignatureMangler.signature(&context, join).unwrap();
        assert_eq!(signature, "com.example.join(kotlin.String,Int):Unit");
        assert_eq!(
            SignatureMangler.uniq_id(&context, join).unwrap(),
            hash_signature(&signature)
        );
        assert_ne!(hash_signature("a.f():Unit"), hash_signature("a.g():Unit"));
    }
}
