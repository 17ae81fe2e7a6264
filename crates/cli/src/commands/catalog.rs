//! Catalog listing commands.

use bistro_core::{CategoryId, Price};
use bistro_storefront::client::{CatalogClient, Product};

use super::{CommandError, api_client};

fn catalog() -> Result<CatalogClient, CommandError> {
    let (api, config) = api_client()?;
    Ok(CatalogClient::new(api, config.catalog_cache_ttl))
}

/// List products, optionally for one category.
pub async fn products(category: Option<String>) -> Result<(), CommandError> {
    let catalog = catalog()?;
    let products = match category {
        Some(id) => {
            catalog
                .list_products_by_category(&CategoryId::new(id))
                .await?
        }
        None => catalog.list_products().await?,
    };

    if products.is_empty() {
        tracing::info!("No products found");
    }
    for product in products.iter() {
        tracing::info!("{}", describe(product));
    }
    Ok(())
}

/// List categories.
pub async fn categories() -> Result<(), CommandError> {
    let categories = catalog()?.list_categories().await?;
    for category in categories.iter() {
        tracing::info!("[{}] {}", category.id, category.name);
    }
    Ok(())
}

fn describe(product: &Product) -> String {
    let price = match product.promotional_price {
        Some(promo) => format!(
            "{} (was {})",
            Price::from_amount(promo).display(),
            Price::from_amount(product.price).display()
        ),
        None => Price::from_amount(product.price).display(),
    };
    let mut line = format!("[{}] {} {}", product.id, product.title, price);
    if !product.accompaniments.is_empty() {
        let extras: Vec<String> = product
            .accompaniments
            .iter()
            .map(|a| format!("{} +{}", a.name, Price::from_amount(a.price).display()))
            .collect();
        line.push_str(&format!(" | extras: {}", extras.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use bistro_core::ProductId;
    use bistro_storefront::client::Accompaniment;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_describe_promotion_and_extras() {
        let product = Product {
            id: ProductId::new("12"),
            title: "Esfiha".to_string(),
            description: None,
            price: Decimal::new(8, 0),
            promotional_price: Some(Decimal::new(65, 1)),
            image_url: None,
            category_id: None,
            accompaniments: vec![Accompaniment {
                name: "Coalhada".to_string(),
                price: Decimal::new(35, 1),
            }],
        };
        assert_eq!(
            describe(&product),
            "[12] Esfiha R$ 6,50 (was R$ 8,00) | extras: Coalhada +R$ 3,50"
        );
    }
}
