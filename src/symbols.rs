//! Lexical scopes used during code generation.
//!
//! A table owns its parent, so the chain is a singly linked list with the
//! innermost scope at the head. [`SymbolTable::enter`] pushes a scope by
//! value and [`SymbolTable::leave`] hands the parent back, dropping every
//! symbol of the scope being left.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redefinition(pub String);

#[derive(Debug)]
pub struct SymbolTable<S> {
    symbols: HashMap<String, S>,
    parent: Option<Box<SymbolTable<S>>>,
}

impl<S> Default for SymbolTable<S> {
    fn default() -> Self {
        Self {
            symbols: HashMap::new(),
            parent: None,
        }
    }
}

impl<S> SymbolTable<S> {
    /// A fresh global scope.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of scopes in the chain, the global one included.
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |parent| parent.depth())
    }

    pub fn enter(self) -> Self {
        Self {
            symbols: HashMap::new(),
            parent: Some(Box::new(self)),
        }
    }

    /// Pop this scope. Leaving the global scope is a no-op.
    pub fn leave(self) -> Self {
        match self.parent {
            Some(parent) => *parent,
            None => self,
        }
    }

    /// Bind `name` in the current scope. Shadowing an outer binding is fine;
    /// a second binding in the same scope is rejected and the first kept.
    pub fn add(&mut self, name: impl Into<String>, symbol: S) -> Result<(), Redefinition> {
        let name = name.into();
        if self.symbols.contains_key(&name) {
            return Err(Redefinition(name));
        }
        self.symbols.insert(name, symbol);
        Ok(())
    }

    pub fn get_current(&self, name: &str) -> Option<&S> {
        self.symbols.get(name)
    }

    /// Innermost binding of `name`, searching outwards to the global scope.
    pub fn get_chain(&self, name: &str) -> Option<&S> {
        let mut scope = Some(self);
        while let Some(table) = scope {
            if let Some(symbol) = table.symbols.get(name) {
                return Some(symbol);
            }
            scope = table.parent.as_deref();
        }
        None
    }
}
