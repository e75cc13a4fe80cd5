use crate::{Query, Result, StatementKind, Transaction, Value};

/// Opaque SQL passed through untouched, with optional positional literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Custom {
    text: String,
    literals: Vec<Value>,
}

impl Custom {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            literals: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.literals.push(value.into());
        self
    }

    pub fn build(&self) -> Query {
        Query {
            kind: StatementKind::Custom,
            text: self.text.clone(),
            literals: self.literals.clone(),
        }
    }

    pub fn exec(&self, transaction: &Transaction<'_>) -> Result<u64> {
        self.build().execute(transaction)
    }
}
