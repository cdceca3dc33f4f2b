//! Inventory items and stock movements.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{
    InventoryRepo, ItemFields, ItemWithCounts, RepoError, StockAdjustmentOutcome,
    StockAdjustmentParams,
};
use crate::domain::entities::{ItemRecord, ReservationRecord, StockMovementRecord};
use crate::domain::error::DomainError;
use crate::domain::stock::StockError;
use crate::domain::types::MovementKind;
use crate::domain::validation::{item_image_url, optional_text, required_text};

const DETAIL_MOVEMENTS: i64 = 10;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Stock(#[from] StockError),
    #[error("Item no encontrado")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateItemCommand {
    pub name: String,
    pub item_type: String,
    pub quantity: i32,
    pub unit: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateItemCommand {
    pub name: Option<String>,
    pub item_type: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdjustStockCommand {
    pub kind: MovementKind,
    pub quantity: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: ItemRecord,
    pub movements: Vec<StockMovementRecord>,
    pub reservations: Vec<ReservationRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockAdjusted {
    pub item: ItemRecord,
    pub movement: StockMovementRecord,
}

#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepo>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ItemWithCounts>, InventoryError> {
        Ok(self.repo.list_items().await?)
    }

    /// Item with its ten latest movements and active reservations.
    pub async fn get(&self, id: i64) -> Result<ItemDetail, InventoryError> {
        let item = self.repo.find_item(id).await?.ok_or(InventoryError::NotFound)?;
        let movements = self.repo.recent_movements(id, DETAIL_MOVEMENTS).await?;
        let reservations = self.repo.active_reservations(id).await?;
        Ok(ItemDetail {
            item,
            movements,
            reservations,
        })
    }

    pub async fn types(&self) -> Result<Vec<String>, InventoryError> {
        Ok(self.repo.list_item_types().await?)
    }

    pub async fn create(&self, cmd: CreateItemCommand) -> Result<ItemRecord, InventoryError> {
        if cmd.quantity < 0 {
            return Err(DomainError::validation(
                "La cantidad debe ser mayor o igual a 0",
            )
            .into());
        }
        let fields = ItemFields {
            name: required_text(&cmd.name, "El nombre es requerido")?,
            item_type: required_text(&cmd.item_type, "El tipo es requerido")?,
            quantity: cmd.quantity,
            unit: optional_text(cmd.unit).unwrap_or_default(),
            image_url: item_image_url(cmd.image_url)?,
        };
        let item = self.repo.create_item(fields).await?;
        info!(
            target = "carpas::inventory",
            item_id = item.id,
            quantity = item.quantity,
            "item created"
        );
        Ok(item)
    }

    pub async fn update(
        &self,
        id: i64,
        cmd: UpdateItemCommand,
    ) -> Result<ItemRecord, InventoryError> {
        let current = self.repo.find_item(id).await?.ok_or(InventoryError::NotFound)?;

        let mut fields = ItemFields {
            name: current.name,
            item_type: current.item_type,
            quantity: current.quantity,
            unit: current.unit,
            image_url: current.image_url,
        };
        if let Some(name) = cmd.name {
            fields.name = required_text(&name, "El nombre es requerido")?;
        }
        if let Some(item_type) = cmd.item_type {
            fields.item_type = required_text(&item_type, "El tipo es requerido")?;
        }
        if let Some(quantity) = cmd.quantity {
            if quantity < 0 {
                return Err(DomainError::validation(
                    "La cantidad debe ser mayor o igual a 0",
                )
                .into());
            }
            fields.quantity = quantity;
        }
        if let Some(unit) = cmd.unit {
            fields.unit = unit.trim().to_string();
        }
        if cmd.image_url.is_some() {
            fields.image_url = item_image_url(cmd.image_url)?;
        }

        self.repo
            .update_item(id, fields)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => InventoryError::NotFound,
                other => InventoryError::Repo(other),
            })
    }

    pub async fn delete(&self, id: i64) -> Result<(), InventoryError> {
        if self.repo.delete_item(id).await? {
            Ok(())
        } else {
            Err(InventoryError::NotFound)
        }
    }

    /// Apply a movement. The quantity never drops below zero.
    pub async fn adjust_stock(
        &self,
        item_id: i64,
        cmd: AdjustStockCommand,
    ) -> Result<StockAdjusted, InventoryError> {
        let outcome = self
            .repo
            .adjust_stock(StockAdjustmentParams {
                item_id,
                kind: cmd.kind,
                quantity: cmd.quantity,
                reason: optional_text(cmd.reason),
            })
            .await?;

        match outcome {
            StockAdjustmentOutcome::Applied { item, movement } => {
                info!(
                    target = "carpas::inventory",
                    item_id,
                    kind = cmd.kind.as_str(),
                    quantity = cmd.quantity,
                    new_quantity = item.quantity,
                    "stock adjusted"
                );
                Ok(StockAdjusted { item, movement })
            }
            StockAdjustmentOutcome::Rejected(err) => {
                counter!("carpas_stock_rejected_total").increment(1);
                warn!(
                    target = "carpas::inventory",
                    item_id,
                    kind = cmd.kind.as_str(),
                    quantity = cmd.quantity,
                    error = %err,
                    "stock adjustment rejected"
                );
                Err(err.into())
            }
            StockAdjustmentOutcome::ItemMissing => Err(InventoryError::NotFound),
        }
    }
}
