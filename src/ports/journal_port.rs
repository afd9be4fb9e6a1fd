//! Trade journal persistence port trait.

use crate::domain::error::CrossoverError;
use crate::domain::journal::TradeRecord;

/// Receives the complete journal each time it is persisted. Implementations
/// overwrite previous output; writing unchanged records again must produce
/// identical output.
pub trait JournalPort {
    fn write(&mut self, records: &[TradeRecord]) -> Result<(), CrossoverError>;
}
