//! Status enums for orders and checkout choices.
//!
//! Wire values follow the remote API, which uses Portuguese snake_case
//! identifiers (`em_preparo`, `retirada`, `dinheiro`).

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the Order Service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "confirmado")]
    Confirmed,
    #[serde(rename = "em_preparo")]
    Preparing,
    #[serde(rename = "pronto")]
    Ready,
    #[serde(rename = "saiu_para_entrega")]
    OutForDelivery,
    #[serde(rename = "entregue")]
    Delivered,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out for delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMethod {
    /// Courier delivery to an address.
    #[serde(rename = "entrega", alias = "delivery")]
    Delivery,
    /// Customer picks the order up at the counter.
    #[serde(rename = "retirada", alias = "pickup")]
    Pickup,
}

impl DeliveryMethod {
    /// Whether this method needs a delivery address.
    #[must_use]
    pub const fn requires_address(&self) -> bool {
        matches!(self, Self::Delivery)
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        })
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" | "entrega" => Ok(Self::Delivery),
            "pickup" | "retirada" => Ok(Self::Pickup),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "pix")]
    Pix,
    #[serde(rename = "cartao", alias = "card")]
    Card,
    #[serde(rename = "dinheiro", alias = "cash")]
    Cash,
}

impl PaymentMethod {
    /// Whether the customer may ask for change.
    #[must_use]
    pub const fn accepts_change(&self) -> bool {
        matches!(self, Self::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pix => "pix",
            Self::Card => "card",
            Self::Cash => "cash",
        })
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(Self::Pix),
            "card" | "cartao" => Ok(Self::Card),
            "cash" | "dinheiro" => Ok(Self::Cash),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_values() {
        let status: OrderStatus = serde_json::from_str("\"em_preparo\"").unwrap();
        assert_eq!(status, OrderStatus::Preparing);
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"saiu_para_entrega\""
        );
    }

    #[test]
    fn test_order_status_is_final() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Preparing.is_final());
    }

    #[test]
    fn test_delivery_method_accepts_english_alias() {
        let method: DeliveryMethod = serde_json::from_str("\"pickup\"").unwrap();
        assert_eq!(method, DeliveryMethod::Pickup);
        assert_eq!(
            serde_json::to_string(&method).unwrap(),
            "\"retirada\""
        );
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("cartao".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_requires_address() {
        assert!(DeliveryMethod::Delivery.requires_address());
        assert!(!DeliveryMethod::Pickup.requires_address());
    }
}
