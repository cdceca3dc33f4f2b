//! Stock quantity arithmetic for inventory movements.

use thiserror::Error;

use crate::domain::types::MovementKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Stock insuficiente")]
    Insufficient { available: i32, requested: i32 },
    #[error("La cantidad debe ser mayor que 0")]
    NonPositive,
    #[error("La cantidad no puede ser negativa")]
    Negative,
    #[error("La cantidad excede el máximo permitido")]
    Overflow,
}

/// Compute the quantity an item holds after applying a movement.
///
/// `IN` and `OUT` are relative and require a strictly positive amount.
/// `ADJUSTMENT` sets the absolute quantity and accepts zero.
pub fn next_quantity(current: i32, kind: MovementKind, quantity: i32) -> Result<i32, StockError> {
    match kind {
        MovementKind::In => {
            if quantity <= 0 {
                return Err(StockError::NonPositive);
            }
            current.checked_add(quantity).ok_or(StockError::Overflow)
        }
        MovementKind::Out => {
            if quantity <= 0 {
                return Err(StockError::NonPositive);
            }
            if quantity > current {
                return Err(StockError::Insufficient {
                    available: current,
                    requested: quantity,
                });
            }
            Ok(current - quantity)
        }
        MovementKind::Adjustment => {
            if quantity < 0 {
                return Err(StockError::Negative);
            }
            Ok(quantity)
        }
    }
}
