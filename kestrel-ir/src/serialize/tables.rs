//! Deduplicating tables shared by every record of a serialized unit.
//!
//! Records refer to strings, types and symbols by index. Indices are handed out in first-use
//! order and never change, so a table may only be turned into its final list once nothing
//! else will be interned into it.

use kestrel_error::CompileError;
use kestrel_types::{FqName, FxIndexMap, FxIndexSet, TypeInfo};

use super::proto::{IdEntry, SymbolRecord};
use crate::{context::Context, declaration::Declaration, mangle::Mangler};

#[derive(Debug, Default)]
pub struct StringTable {
    strings: FxIndexSet<String>,
}

impl StringTable {
    pub fn intern(&mut self, string: &str) -> u32 {
        if let Some(index) = self.strings.get_index_of(string) {
            return index as u32;
        }
        self.strings.insert_full(string.to_owned()).0 as u32
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The final list of strings. Consumes the table, so nothing can be interned afterwards.
    pub fn freeze(self) -> Vec<String> {
        self.strings.into_iter().collect()
    }
}

#[derive(Debug, Default)]
pub struct TypeTable {
    types: FxIndexSet<TypeInfo>,
}

impl TypeTable {
    pub fn intern(&mut self, ty: &TypeInfo) -> u32 {
        if let Some(index) = self.types.get_index_of(ty) {
            return index as u32;
        }
        self.types.insert_full(ty.clone()).0 as u32
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn into_vec(self) -> Vec<TypeInfo> {
        self.types.into_iter().collect()
    }
}

/// Every declaration a unit mentions, identified by its mangled signature.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: FxIndexMap<Declaration, SymbolRecord>,
}

impl SymbolTable {
    pub fn intern(
        &mut self,
        context: &Context,
        mangler: &dyn Mangler,
        strings: &mut StringTable,
        declaration: Declaration,
    ) -> Result<u32, CompileError> {
        if let Some(index) = self.symbols.get_index_of(&declaration) {
            return Ok(index as u32);
        }
        let signature = mangler.signature(context, declaration)?;
        let record = SymbolRecord {
            uniq_id: mangler.uniq_id(context, declaration)?,
            signature: strings.intern(&signature),
            is_mirror: declaration.is_mirror(context),
        };
        Ok(self.symbols.insert_full(declaration, record).0 as u32)
    }

    pub fn get(&self, declaration: Declaration) -> Option<u32> {
        self.symbols
            .get_index_of(&declaration)
            .map(|index| index as u32)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn into_vec(self) -> Vec<SymbolRecord> {
        self.symbols.into_values().collect()
    }
}

/// Ids of declarations borrowed from other top-level containers, each with the fully
/// qualified name of the container it came from.
#[derive(Debug, Default)]
pub struct IdTable {
    entries: FxIndexMap<u64, FqName>,
}

impl IdTable {
    /// Records `uniq_id` the first time it is seen; later records are ignored.
    pub fn record(&mut self, uniq_id: u64, top_level_fq_name: FqName) {
        self.entries.entry(uniq_id).or_insert(top_level_fq_name);
    }

    pub fn get(&self, uniq_id: u64) -> Option<&FqName> {
        self.entries.get(&uniq_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the table, interning every name into `strings`.
    pub fn write(&self, strings: &mut StringTable) -> Vec<IdEntry> {
        self.entries
            .iter()
            .map(|(uniq_id, fq_name)| IdEntry {
                uniq_id: *uniq_id,
                top_level_fq_name: strings.intern(&fq_name.as_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_keep_first_use_order() {
        let mut strings = StringTable::default();
        assert_eq!(strings.intern("b"), 0);
        assert_eq!(strings.intern("a"), 1);
        assert_eq!(strings.intern("b"), 0);
        assert_eq!(strings.len(), 2);
        assert_eq!(strings.freeze(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn id_table_keeps_first_container() {
        let mut ids = IdTable::default();
        ids.record(7, FqName::parse("a.AKt"));
        ids.record(7, FqName::parse("b.BKt"));
        ids.record(3, FqName::parse("b.BKt"));
        assert_eq!(ids.get(7), Some(&FqName::parse("a.AKt")));

        let mut strings = StringTable::default();
        let entries = ids.write(&mut strings);
        assert_eq!(
            entries,
            vec![
                IdEntry {
                    uniq_id: 7,
                    top_level_fq_name: 0
                },
                IdEntry {
                    uniq_id: 3,
                    top_level_fq_name: 1
                },
            ]
        );
        assert_eq!(strings.freeze(), vec!["a.AKt".to_string(), "b.BKt".to_string()]);
    }

    #[test]
    fn types_are_deduplicated() {
        let mut types = TypeTable::default();
        let string = TypeInfo::class("kotlin.String");
        assert_eq!(types.intern(&string), 0);
        assert_eq!(types.intern(&TypeInfo::Int), 1);
        assert_eq!(types.intern(&string), 0);
        assert_eq!(types.into_vec(), vec![string, TypeInfo::Int]);
    }
}
