//! Wire records and validated domain types for the remote API.
//!
//! The API speaks Portuguese field names (`titulo`, `preco`, ...). Records in
//! this module mirror that shape exactly and are never handed out; callers
//! only see the validated types (`Product`, `Category`, `OrderSummary`), which
//! serialize with English snake_case names for the storefront's own API.

use std::collections::BTreeMap;

use bistro_core::{
    CartItem, CategoryId, DeliveryAddress, DeliveryMethod, OrderId, OrderStatus, PaymentMethod,
    ProductId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::ApiError;

// =============================================================================
// Catalog
// =============================================================================

/// A paid extra that can be added to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accompaniment {
    pub name: String,
    pub price: Decimal,
}

/// A product from the catalog, validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: Option<String>,
    /// Regular price, never negative.
    pub price: Decimal,
    /// Discounted price, always below `price` when present.
    pub promotional_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub accompaniments: Vec<Accompaniment>,
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Errors building a cart line from a product and a customer's selection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The selection names an accompaniment the product does not offer.
    #[error("product {product} has no accompaniment named {name:?}")]
    UnknownAccompaniment { product: ProductId, name: String },

    /// The same accompaniment was selected more than once.
    #[error("accompaniment {0:?} selected more than once")]
    DuplicateAccompaniment(String),
}

impl Product {
    /// Effective unit price: promotional if set, else regular.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.promotional_price.unwrap_or(self.price)
    }

    /// Build the cart line for `quantity` units of this product.
    ///
    /// Selected accompaniment prices are folded into the unit price (and the
    /// promotional price, when there is one), so the cart never has to price
    /// accompaniments itself. Selections with quantity 0 are left out.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownAccompaniment`] if a selected name is
    /// not offered by this product.
    pub fn to_cart_item(
        &self,
        quantity: u32,
        notes: Option<String>,
        selection: &BTreeMap<String, u32>,
    ) -> Result<CartItem, SelectionError> {
        let mut extra = Decimal::ZERO;
        let mut chosen = BTreeMap::new();
        for (name, &count) in selection {
            if count == 0 {
                continue;
            }
            let offered = self
                .accompaniments
                .iter()
                .find(|a| &a.name == name)
                .ok_or_else(|| SelectionError::UnknownAccompaniment {
                    product: self.id.clone(),
                    name: name.clone(),
                })?;
            extra += offered.price * Decimal::from(count);
            chosen.insert(name.clone(), count);
        }

        let mut item = CartItem::new(
            self.id.clone(),
            self.title.clone(),
            self.price + extra,
            quantity,
        );
        item.promotional_price = self.promotional_price.map(|promo| promo + extra);
        item.image_url.clone_from(&self.image_url);
        item.notes = notes.filter(|n| !n.trim().is_empty());
        if !chosen.is_empty() {
            item.accompaniments = Some(chosen);
        }
        Ok(item)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccompanimentRecord {
    nome: String,
    preco: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRecord {
    id: ProductId,
    titulo: String,
    #[serde(default)]
    descricao: Option<String>,
    preco: Decimal,
    #[serde(default)]
    preco_promocional: Option<Decimal>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    categoria_id: Option<CategoryId>,
    #[serde(default)]
    acompanhamentos: Vec<AccompanimentRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryRecord {
    id: CategoryId,
    nome: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ApiError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let title = record.titulo.trim().to_owned();
        if title.is_empty() {
            return Err(ApiError::Invalid(format!("product {} has no title", record.id)));
        }
        if record.preco.is_sign_negative() && !record.preco.is_zero() {
            return Err(ApiError::Invalid(format!(
                "product {} has negative price {}",
                record.id, record.preco
            )));
        }

        let promotional_price = match record.preco_promocional {
            Some(promo) if promo.is_sign_negative() && !promo.is_zero() => {
                return Err(ApiError::Invalid(format!(
                    "product {} has negative promotional price {promo}",
                    record.id
                )));
            }
            Some(promo) if promo >= record.preco => {
                warn!(
                    product_id = %record.id,
                    price = %record.preco,
                    promotional_price = %promo,
                    "Ignoring promotional price that is not a discount"
                );
                None
            }
            other => other,
        };

        let accompaniments = record
            .acompanhamentos
            .into_iter()
            .map(|a| {
                if a.preco.is_sign_negative() && !a.preco.is_zero() {
                    Err(ApiError::Invalid(format!(
                        "accompaniment {:?} of product {} has negative price",
                        a.nome, record.id
                    )))
                } else {
                    Ok(Accompaniment {
                        name: a.nome,
                        price: a.preco,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: record.id,
            title,
            description: record.descricao.filter(|d| !d.trim().is_empty()),
            price: record.preco,
            promotional_price,
            image_url: record.image_url.filter(|u| !u.trim().is_empty()),
            category_id: record.categoria_id,
            accompaniments,
        })
    }
}

impl TryFrom<CategoryRecord> for Category {
    type Error = ApiError;

    fn try_from(record: CategoryRecord) -> Result<Self, Self::Error> {
        let name = record.nome.trim().to_owned();
        if name.is_empty() {
            return Err(ApiError::Invalid(format!("category {} has no name", record.id)));
        }
        Ok(Self {
            id: record.id,
            name,
        })
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One order line as the Order Service expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    #[serde(rename = "produto_id")]
    pub product_id: ProductId,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "acompanhamentos", skip_serializing_if = "Option::is_none")]
    pub accompaniments: Option<BTreeMap<String, u32>>,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.id.clone(),
            quantity: item.quantity,
            notes: item.notes.clone(),
            accompaniments: item.accompaniments.clone(),
        }
    }
}

/// A checkout submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    #[serde(rename = "itens")]
    pub lines: Vec<OrderLine>,
    #[serde(rename = "metodo_entrega")]
    pub delivery_method: DeliveryMethod,
    #[serde(rename = "metodo_pagamento")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "endereco", skip_serializing_if = "Option::is_none")]
    pub address: Option<DeliveryAddress>,
    /// Cash amount the customer will pay with, for change.
    #[serde(
        rename = "troco_para",
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub change_for: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderCreatedRecord {
    pub(crate) id: OrderId,
}

/// Tracking view of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderRecord {
    id: OrderId,
    status: OrderStatus,
    total: Decimal,
    criado_em: DateTime<Utc>,
}

impl From<OrderRecord> for OrderSummary {
    fn from(record: OrderRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            total: record.total,
            created_at: record.criado_em,
        }
    }
}
