//! Inventory ledger for a single book

use super::CirculationError;

/// Number of copies of one book currently on the shelf.
///
/// A `Ledger` can never hold a negative count: construction rejects one and
/// [`Ledger::decrease`] refuses to go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ledger {
    copies_available: i32,
}

impl Ledger {
    pub fn new(copies_available: i32) -> Result<Self, CirculationError> {
        if copies_available < 0 {
            return Err(CirculationError::Validation(
                "Copies available cannot be negative".to_string(),
            ));
        }
        Ok(Self { copies_available })
    }

    pub fn copies_available(&self) -> i32 {
        self.copies_available
    }

    pub fn is_available(&self) -> bool {
        self.copies_available > 0
    }

    /// Take one copy off the shelf
    pub fn decrease(&mut self) -> Result<(), CirculationError> {
        if self.copies_available <= 0 {
            return Err(CirculationError::InventoryExhausted);
        }
        self.copies_available -= 1;
        Ok(())
    }

    /// Put one copy back on the shelf. There is no upper bound.
    pub fn increase(&mut self) -> Result<(), CirculationError> {
        self.copies_available = self
            .copies_available
            .checked_add(1)
            .ok_or_else(|| CirculationError::Validation("Copy count overflow".to_string()))?;
        Ok(())
    }
}
