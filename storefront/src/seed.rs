//! Sample catalog for demos and tests.

use anyhow::Result;
use mart_core::TenantContext;
use serde::Serialize;
use serde_json::{json, Value};

use crate::store::{DocumentStore, Query, PRODUCTS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

fn gallery(images: &[(&str, &str)]) -> Value {
    Value::Array(
        images
            .iter()
            .enumerate()
            .map(|(order, (url, path))| json!({"url": url, "path": path, "order": order}))
            .collect(),
    )
}

fn specs(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(key, value)| json!({"key": key, "value": value}))
            .collect(),
    )
}

/// The six sample products, without `id` or `createdAt`.
pub fn seed_products() -> Vec<Value> {
    vec![
        json!({
            "slug": "caterpillar-excavator-320d",
            "name": "Caterpillar Excavator 320D",
            "category": {"main": "Machines", "sub": "Construction Equipment"},
            "price": 85000,
            "description": "Heavy-duty excavator ideal for large construction projects. Features advanced hydraulic systems and fuel-efficient engine.",
            "seller": {"name": "Ghana Heavy Equipment Ltd.", "verified": true},
            "imageUrl": "https://images.unsplash.com/photo-1581094271901-8022df4466f9?w=800",
            "gallery": gallery(&[
                ("https://images.unsplash.com/photo-1581094271901-8022df4466f9?w=800", "products/demo/excavator-1.jpg"),
                ("https://images.unsplash.com/photo-1504307651254-35680f356dfd?w=800", "products/demo/excavator-2.jpg"),
            ]),
            "specs": specs(&[
                ("Operating Weight", "20,240 kg"),
                ("Engine Power", "105 kW"),
                ("Bucket Capacity", "0.9 m³"),
                ("Max Digging Depth", "6.5 m"),
            ]),
        }),
        json!({
            "slug": "john-deere-tractor-5075e",
            "name": "John Deere Tractor 5075E",
            "category": {"main": "Machines", "sub": "Agricultural Machinery"},
            "price": 42000,
            "description": "Versatile agricultural tractor perfect for farming operations. Powerful engine with smooth transmission.",
            "seller": {"name": "AgriTech Ghana", "verified": true},
            "imageUrl": "https://images.unsplash.com/photo-1589829085413-56de8ae18c73?w=800",
            "gallery": gallery(&[
                ("https://images.unsplash.com/photo-1589829085413-56de8ae18c73?w=800", "products/demo/tractor-1.jpg"),
            ]),
            "specs": specs(&[
                ("Engine Power", "75 HP"),
                ("Transmission", "PowrReverser"),
                ("Lift Capacity", "2,200 kg"),
                ("PTO Power", "63 HP"),
            ]),
        }),
        json!({
            "slug": "mercedes-benz-actros-truck",
            "name": "Mercedes-Benz Actros 2545",
            "category": {"main": "Vehicles", "sub": "Trucks"},
            "price": 95000,
            "description": "Premium heavy-duty truck for long-distance haulage. Excellent fuel economy and driver comfort.",
            "seller": {"name": "West Africa Motors", "verified": true},
            "imageUrl": "https://images.unsplash.com/photo-1601584115197-04ecc0da31d7?w=800",
            "gallery": gallery(&[
                ("https://images.unsplash.com/photo-1601584115197-04ecc0da31d7?w=800", "products/demo/truck-1.jpg"),
            ]),
            "specs": specs(&[
                ("Engine", "OM 471, 6-cylinder"),
                ("Power Output", "450 HP"),
                ("GVW", "25,000 kg"),
                ("Transmission", "PowerShift 3"),
            ]),
        }),
        json!({
            "slug": "honda-generator-eu70is",
            "name": "Honda Generator EU70iS",
            "category": {"main": "Machines", "sub": "Generators"},
            "price": 5500,
            "description": "Portable inverter generator with exceptional fuel efficiency. Perfect for backup power and outdoor events.",
            "seller": {"name": "PowerGen Solutions", "verified": true},
            "imageUrl": "https://images.unsplash.com/photo-1626094309830-abbb0c99da4a?w=800",
            "gallery": gallery(&[
                ("https://images.unsplash.com/photo-1626094309830-abbb0c99da4a?w=800", "products/demo/generator-1.jpg"),
            ]),
            "specs": specs(&[
                ("Max Output", "7000W"),
                ("Rated Output", "5500W"),
                ("Fuel Tank", "5.1 Liters"),
                ("Runtime", "6.5 hours @ 50% load"),
            ]),
        }),
        json!({
            "slug": "toyota-land-cruiser-pickup",
            "name": "Toyota Land Cruiser Pickup",
            "category": {"main": "Vehicles", "sub": "Commercial Vehicles"},
            "price": 68000,
            "description": "Rugged and reliable pickup truck built for tough terrain. Ideal for construction sites and rural areas.",
            "seller": {"name": "Toyota Ghana", "verified": true},
            "imageUrl": "https://images.unsplash.com/photo-1533473359331-0135ef1b58bf?w=800",
            "gallery": gallery(&[
                ("https://images.unsplash.com/photo-1533473359331-0135ef1b58bf?w=800", "products/demo/pickup-1.jpg"),
            ]),
            "specs": specs(&[
                ("Engine", "4.5L V8 Diesel"),
                ("Power", "202 HP"),
                ("Drive Type", "4WD"),
                ("Payload", "1,200 kg"),
            ]),
        }),
        json!({
            "slug": "bobcat-skid-steer-s570",
            "name": "Bobcat Skid Steer S570",
            "category": {"main": "Machines", "sub": "Construction Equipment"},
            "price": 38000,
            "description": "Compact and maneuverable skid-steer loader. Perfect for tight spaces and versatile applications.",
            "seller": {"name": "Ghana Heavy Equipment Ltd.", "verified": true},
            "imageUrl": "https://images.unsplash.com/photo-1581093458791-9d42e4e0e48f?w=800",
            "gallery": gallery(&[
                ("https://images.unsplash.com/photo-1581093458791-9d42e4e0e48f?w=800", "products/demo/skid-1.jpg"),
            ]),
            "specs": specs(&[
                ("Operating Capacity", "1,134 kg"),
                ("Engine Power", "61 HP"),
                ("Operating Weight", "3,402 kg"),
                ("Bucket Width", "1.8 m"),
            ]),
        }),
    ]
}

/// Inserts the sample products whose slug is not taken yet, in listing order.
pub async fn seed_catalog(store: &dyn DocumentStore, tenant: &TenantContext) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for mut product in seed_products() {
        let slug = product["slug"].as_str().unwrap_or_default().to_string();
        let taken = store
            .query(tenant, PRODUCTS, &Query::new().where_eq("slug", slug.as_str()).limit(1))
            .await?;
        if !taken.is_empty() {
            tracing::debug!(%slug, "sample product already present");
            summary.skipped += 1;
            continue;
        }

        product["createdAt"] = Value::String(crate::format::timestamp());
        store.insert(tenant, PRODUCTS, product).await?;
        summary.inserted += 1;
    }

    tracing::info!(
        tenant = tenant.tenant_id.as_str(),
        inserted = summary.inserted,
        skipped = summary.skipped,
        "sample catalog seeded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::store::MemoryDocumentStore;

    #[test]
    fn sample_products_parse_and_have_dense_galleries() {
        let products = seed_products();
        assert_eq!(products.len(), 6);
        for value in products {
            let product = Product::from_value(value).unwrap();
            assert_eq!(product.specs.len(), 4);
            assert_eq!(product.main_image(), product.image_url);
            assert!(mart_gallery::is_dense(&product.gallery));
        }
    }

    #[tokio::test]
    async fn seeding_twice_skips_existing_slugs() {
        let store = MemoryDocumentStore::new();
        let tenant = TenantContext::default();

        let first = seed_catalog(&store, &tenant).await.unwrap();
        assert_eq!(first, SeedSummary { inserted: 6, skipped: 0 });

        let second = seed_catalog(&store, &tenant).await.unwrap();
        assert_eq!(second, SeedSummary { inserted: 0, skipped: 6 });

        let other = seed_catalog(&store, &TenantContext::new("branch")).await.unwrap();
        assert_eq!(other.inserted, 6);
    }
}
