use crate::Value;

/// State threaded through one code generation pass.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Context {
    /// Qualify columns with their table and bind literals as placeholders.
    /// Otherwise columns are bare and literals are inlined.
    pub qualified: bool,
    /// Placeholders emitted before this pass, in a statement being spliced.
    pub start_literal_index: usize,
    /// Literals bound so far, in placeholder order.
    pub literals: Vec<Value>,
}

impl Context {
    pub fn new(qualified: bool) -> Self {
        Self {
            qualified,
            ..Default::default()
        }
    }
    pub fn starting_at(qualified: bool, start_literal_index: usize) -> Self {
        Self {
            qualified,
            start_literal_index,
            literals: Vec::new(),
        }
    }
    /// One based position of the next placeholder in the whole statement.
    pub fn next_placeholder(&self) -> usize {
        self.start_literal_index + self.literals.len() + 1
    }
    /// Temporarily change the qualified flag, restored when the guard drops.
    pub fn switch_qualified(&mut self, qualified: bool) -> ContextUpdater<'_> {
        let previous = self.qualified;
        self.qualified = qualified;
        ContextUpdater {
            context: self,
            previous,
        }
    }
}

pub struct ContextUpdater<'a> {
    pub context: &'a mut Context,
    previous: bool,
}

impl<'a> Drop for ContextUpdater<'a> {
    fn drop(&mut self) {
        self.context.qualified = self.previous;
    }
}
