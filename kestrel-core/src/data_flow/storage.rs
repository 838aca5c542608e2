use kestrel_error::CompileError;
use kestrel_types::{constants::DATA_FLOW_VARIABLE_PREFIX, ElementId, SymbolId};
use rustc_hash::FxHashMap;

use crate::language::ty;

use super::{DataFlowVariable, FlowElement};

/// The dataflow variables of one function body.
///
/// Many elements may map to one variable (a declaration and all references to it), but an
/// element maps to at most one variable. Reset the storage before moving on to the next body.
#[derive(Debug, Default)]
pub struct DataFlowVariableStorage {
    counter: u32,
    real_variables: FxHashMap<SymbolId, DataFlowVariable>,
    variable_by_element: FxHashMap<ElementId, DataFlowVariable>,
    elements_by_variable: FxHashMap<DataFlowVariable, Vec<ElementId>>,
}

impl DataFlowVariableStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variable of the declaration `element` declares or refers to, creating it on
    /// first use, and binds `element` to it.
    pub fn get_or_create_real_variable(
        &mut self,
        element: FlowElement<'_>,
    ) -> Result<DataFlowVariable, CompileError> {
        let Some(symbol) = element.symbol() else {
            return Err(CompileError::UnsupportedElementKind {
                kind: element.kind_name(),
                element: element.id(),
            });
        };
        let variable = match self.real_variables.get(&symbol) {
            Some(variable) => variable.clone(),
            None => {
                let variable = self.fresh_variable(element, false)?;
                self.real_variables.insert(symbol, variable.clone());
                variable
            }
        };
        self.record(element.id(), &variable);
        Ok(variable)
    }

    /// Returns the variable standing for the value of `expression` itself.
    pub fn get_or_create_synthetic_variable(
        &mut self,
        expression: &ty::TyExpression,
    ) -> Result<DataFlowVariable, CompileError> {
        if let Some(variable) = self.variable_by_element.get(&expression.id) {
            return Ok(variable.clone());
        }
        let variable = self.fresh_variable(FlowElement::Expression(expression), true)?;
        self.record(expression.id, &variable);
        Ok(variable)
    }

    pub fn get(&self, element: ElementId) -> Option<&DataFlowVariable> {
        self.variable_by_element.get(&element)
    }

    pub fn get_real_variable(&self, symbol: SymbolId) -> Option<&DataFlowVariable> {
        self.real_variables.get(&symbol)
    }

    /// The elements bound to `variable`, in the order they were recorded.
    pub fn elements_of(&self, variable: &DataFlowVariable) -> &[ElementId] {
        self.elements_by_variable
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Forgets `variable` and every element bound to it. Its name is not handed out again.
    pub fn remove(&mut self, variable: &DataFlowVariable) {
        if let Some(elements) = self.elements_by_variable.remove(variable) {
            for element in elements {
                self.variable_by_element.remove(&element);
            }
        }
        self.real_variables.retain(|_, real| real != variable);
        tracing::trace!(variable = %variable.name, "removed dataflow variable");
    }

    /// Drops every variable and restarts naming.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.real_variables.clear();
        self.variable_by_element.clear();
        self.elements_by_variable.clear();
    }

    pub fn len(&self) -> usize {
        self.elements_by_variable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements_by_variable.is_empty()
    }

    fn fresh_variable(
        &mut self,
        element: FlowElement<'_>,
        is_synthetic: bool,
    ) -> Result<DataFlowVariable, CompileError> {
        let ty = element.resolved_type()?;
        let name = format!("{DATA_FLOW_VARIABLE_PREFIX}{}", self.counter);
        self.counter += 1;
        Ok(DataFlowVariable {
            name,
            ty,
            is_synthetic,
        })
    }

    fn record(&mut self, element: ElementId, variable: &DataFlowVariable) {
        if let Some(previous) = self.variable_by_element.insert(element, variable.clone()) {
            if &previous == variable {
                return;
            }
            if let Some(elements) = self.elements_by_variable.get_mut(&previous) {
                elements.retain(|bound| *bound != element);
            }
        }
        self.elements_by_variable
            .entry(variable.clone())
            .or_default()
            .push(element);
    }
}

#[cfg(test)]
mod tests {
    use kestrel_types::TypeInfo;

    use super::*;
    use crate::language::ty::TyTreeBuilder;

    #[test]
    fn synthetic_variables_are_keyed_by_expression() {
        let mut tree = TyTreeBuilder::new();
        let first = tree.int(1);
        let second = tree.int(2);
        let mut storage = DataFlowVariableStorage::new();

        let a = storage.get_or_create_synthetic_variable(&first).unwrap();
        let b = storage.get_or_create_synthetic_variable(&second).unwrap();
        assert_eq!(storage.get_or_create_synthetic_variable(&first).unwrap(), a);
        assert_ne!(a.name(), b.name());
        assert!(a.is_synthetic());
        assert_eq!(a.ty(), &TypeInfo::Int);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn reset_restarts_naming() {
        let mut tree = TyTreeBuilder::new();
        let value = tree.int(1);
        let mut storage = DataFlowVariableStorage::new();
        storage.get_or_create_synthetic_variable(&value).unwrap();
        storage.get_or_create_synthetic_variable(&tree.int(2)).unwrap();

        storage.reset();
        assert!(storage.is_empty());
        assert_eq!(storage.get(value.id), None);
        let again = storage.get_or_create_synthetic_variable(&value).unwrap();
        assert_eq!(again.name(), "d0");
    }

    #[test]
    fn element_without_symbol_has_no_real_variable() {
        let mut tree = TyTreeBuilder::new();
        let literal = tree.int(3);
        let mut storage = DataFlowVariableStorage::new();
        let err = storage
            .get_or_create_real_variable(FlowElement::Expression(&literal))
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedElementKind { .. }));
    }
}
