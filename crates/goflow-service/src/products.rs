//! Demo product-catalog endpoints.
//!
//! Example handlers exercising the router's literal-versus-parameter
//! precedence (`/products/query` next to `/products/:id`), path parameters,
//! query strings, and JSON bodies. Unrelated to the CI pipeline itself.

use crate::http::router::Handler;
use crate::http::{status_text, HttpContext};
use crate::responses::respond_json;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
}

/// In-memory product store shared by the demo handlers.
pub struct ProductCatalog {
    products: Mutex<Vec<Product>>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    /// The sample data set the demo endpoints start with.
    pub fn with_samples() -> Self {
        Self::new(vec![
            Product { id: 1, name: "iphone".to_string(), price: 1556.4 },
            Product { id: 2, name: "laptop".to_string(), price: 4588.0 },
            Product { id: 3, name: "lenovo".to_string(), price: 58844.0 },
            Product { id: 4, name: "mac".to_string(), price: 158766.0 },
        ])
    }

    fn all(&self) -> Vec<Product> {
        self.lock().clone()
    }

    fn find(&self, id: u32) -> Option<Product> {
        self.lock().iter().find(|p| p.id == id).cloned()
    }

    fn find_by_id_and_name(&self, id: u32, name: &str) -> Option<Product> {
        self.lock()
            .iter()
            .find(|p| p.id == id && p.name == name)
            .cloned()
    }

    fn add(&self, product: Product) {
        self.lock().push(product);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Product>> {
        self.products.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `GET /products`
pub struct ListProducts {
    catalog: Arc<ProductCatalog>,
}

impl ListProducts {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Handler for ListProducts {
    async fn handle(&self, ctx: &mut HttpContext) {
        let products = self.catalog.all();
        if products.is_empty() {
            respond_json(ctx, 400, json!({"error": "no data exist"}));
            return;
        }
        respond_json(
            ctx,
            200,
            json!({"data": products, "message": status_text(200)}),
        );
    }
}

/// `GET /products/:id`
pub struct GetProduct {
    catalog: Arc<ProductCatalog>,
}

impl GetProduct {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Handler for GetProduct {
    async fn handle(&self, ctx: &mut HttpContext) {
        let id = match ctx.param("id").and_then(|raw| raw.parse::<u32>().ok()) {
            Some(id) => id,
            None => {
                respond_json(
                    ctx,
                    400,
                    json!({"error": "invalid id", "message": status_text(400)}),
                );
                return;
            }
        };
        match self.catalog.find(id) {
            Some(product) => respond_json(
                ctx,
                200,
                json!({"data": product, "message": status_text(200)}),
            ),
            None => respond_json(
                ctx,
                404,
                json!({"error": "product not found", "message": status_text(404)}),
            ),
        }
    }
}

/// `GET /products/query?prdid=<id>&prdname=<name>`
pub struct QueryProducts {
    catalog: Arc<ProductCatalog>,
}

impl QueryProducts {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Handler for QueryProducts {
    async fn handle(&self, ctx: &mut HttpContext) {
        let id = match ctx.query("prdid").and_then(|raw| raw.parse::<u32>().ok()) {
            Some(id) => id,
            None => {
                ctx.text(400, "prdid : invalid id");
                return;
            }
        };
        let Some(name) = ctx.query("prdname").map(String::from) else {
            ctx.text(400, "prdname : missing or invalid fields");
            return;
        };

        match self.catalog.find_by_id_and_name(id, &name) {
            Some(product) => ctx.text(
                200,
                format!(
                    "Product ID: {}, Name: {}, Product Price: {}",
                    product.id, product.name, product.price
                ),
            ),
            None => ctx.text(404, "Product: product not found"),
        }
    }
}

/// `POST /products`
pub struct CreateProduct {
    catalog: Arc<ProductCatalog>,
}

impl CreateProduct {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Handler for CreateProduct {
    async fn handle(&self, ctx: &mut HttpContext) {
        let product: Product = match serde_json::from_slice(&ctx.request.body) {
            Ok(product) => product,
            Err(err) => {
                respond_json(
                    ctx,
                    400,
                    json!({
                        "error": format!("invalid JSON: {}", err),
                        "message": status_text(400),
                    }),
                );
                return;
            }
        };

        if product.id == 0 || product.name.is_empty() || product.price <= 0.0 {
            respond_json(
                ctx,
                400,
                json!({
                    "error": "missing or invalid fields",
                    "message": status_text(400),
                }),
            );
            return;
        }

        self.catalog.add(product.clone());
        respond_json(
            ctx,
            201,
            json!({"data": product, "message": status_text(201)}),
        );
    }
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
