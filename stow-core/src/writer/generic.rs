use crate::writer::{Dialect, SqlWriter};

/// Writer for dialects without a dedicated implementation.
#[derive(Debug, Clone, Copy)]
pub struct GenericSqlWriter {
    pub dialect: Dialect,
}

impl GenericSqlWriter {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        match self.dialect {
            Dialect::MsSql => {
                out.push_str("@p");
                out.push_str(itoa::Buffer::new().format(index));
            }
            Dialect::Oracle => {
                out.push(':');
                out.push_str(itoa::Buffer::new().format(index));
            }
            _ => out.push('?'),
        }
    }
}
