use crate::{ErrorKind, PreparedStatement, Query, Record, RecordWriter, Result, Transaction};
use std::sync::atomic::{AtomicU64, Ordering};

static RESULT_SET_ID: AtomicU64 = AtomicU64::new(0);

/// Cursor position inside a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Uninitialized,
    Row(u64),
    End,
}

/// Lightweight iterator over a [`ResultSet`], equal when both result set and row match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIterator {
    result_set: u64,
    position: Position,
}

impl RowIterator {
    /// Current row id, `None` past the end.
    pub fn row(&self) -> Option<u64> {
        match self.position {
            Position::Row(v) => Some(v),
            _ => None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_end(&self) -> bool {
        self.position == Position::End
    }
}

/// Forward only, single pass cursor over the rows of a select.
///
/// Every fetch writes the row into the bound record, the iterator only
/// carries the row id.
pub struct ResultSet<'t, R: Record> {
    transaction: &'t Transaction<'t>,
    statement: Option<PreparedStatement>,
    record: &'t mut R,
    id: u64,
    position: Position,
}

impl<'t, R: Record> ResultSet<'t, R> {
    pub(crate) fn new(
        transaction: &'t Transaction<'t>,
        query: Query,
        record: &'t mut R,
    ) -> Result<Self> {
        let statement = transaction.statement(query.kind, query.text, query.literals)?;
        let mut result = Self {
            transaction,
            statement: Some(statement),
            record,
            id: RESULT_SET_ID.fetch_add(1, Ordering::Relaxed),
            position: Position::Uninitialized,
        };
        let statement = result.statement()?;
        transaction.prepare(statement)?;
        transaction.execute(statement)?;
        Ok(result)
    }

    fn statement(&self) -> Result<&PreparedStatement> {
        self.statement
            .as_ref()
            .ok_or_else(|| ErrorKind::Usage.error("The result set is already closed"))
    }

    fn fetch(&mut self) -> Result<()> {
        let Some(statement) = &self.statement else {
            return Err(ErrorKind::Usage.error("The result set is already closed"));
        };
        let mut writer = RecordWriter::new(&mut *self.record);
        let found = self.transaction.fetch(statement, &mut writer)?;
        self.position = match (found, self.position) {
            (false, _) => Position::End,
            (true, Position::Row(n)) => Position::Row(n + 1),
            (true, _) => Position::Row(0),
        };
        Ok(())
    }

    /// First fetch, at most once per result set.
    pub fn begin(&mut self) -> Result<RowIterator> {
        if self.position != Position::Uninitialized {
            return Err(ErrorKind::Usage.error("The result set was already iterated"));
        }
        self.fetch()?;
        Ok(self.current())
    }

    pub fn end(&self) -> RowIterator {
        RowIterator {
            result_set: self.id,
            position: Position::End,
        }
    }

    fn current(&self) -> RowIterator {
        RowIterator {
            result_set: self.id,
            position: self.position,
        }
    }

    /// Fetch the next row, past the end is terminal.
    pub fn increment(&mut self, iterator: &mut RowIterator) -> Result<()> {
        if *iterator != self.current() {
            return Err(ErrorKind::Usage.error(
                "The iterator does not point to the current row of this result set",
            ));
        }
        match self.position {
            Position::Uninitialized => {
                return Err(ErrorKind::Usage.error("Call begin() before incrementing"));
            }
            Position::End => {}
            Position::Row(..) => self.fetch()?,
        }
        *iterator = self.current();
        Ok(())
    }

    /// Move to the next row, returns false once the rows are over.
    pub fn next_row(&mut self) -> Result<bool> {
        match self.position {
            Position::Uninitialized => self.fetch()?,
            Position::Row(..) => self.fetch()?,
            Position::End => {}
        }
        Ok(self.position != Position::End)
    }

    /// Record holding the current row.
    pub fn record(&self) -> &R {
        &*self.record
    }

    /// Row count, `None` when the backend cannot tell.
    pub fn size(&self) -> Result<Option<u64>> {
        self.transaction.size(self.statement()?)
    }

    pub fn close(mut self) -> Result<()> {
        match self.statement.take() {
            Some(statement) => self.transaction.close_statement(statement),
            None => Ok(()),
        }
    }
}

impl<'t, R: Record + Clone> ResultSet<'t, R> {
    /// Copy every remaining row.
    pub fn collect_rows(&mut self) -> Result<Vec<R>> {
        let mut result = Vec::new();
        while self.next_row()? {
            result.push(self.record.clone());
        }
        Ok(result)
    }
}

impl<'t, R: Record> Drop for ResultSet<'t, R> {
    fn drop(&mut self) {
        if let Some(statement) = self.statement.take() {
            if let Err(e) = self.transaction.close_statement(statement) {
                log::error!("{:#}", e);
            }
        }
    }
}
