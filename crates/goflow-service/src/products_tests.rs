//! Tests for the demo product-catalog handlers.

use super::*;
use crate::http::HttpRequest;
use std::collections::HashMap;

fn catalog() -> Arc<ProductCatalog> {
    Arc::new(ProductCatalog::with_samples())
}

fn ctx_with_params(params: &[(&str, &str)], path_params: bool) -> HttpContext {
    let map: HashMap<String, String> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut request = HttpRequest::default();
    if path_params {
        request.path_params = map;
    } else {
        request.query_params = map;
    }
    HttpContext::new(request)
}

fn body_json(ctx: &HttpContext) -> serde_json::Value {
    serde_json::from_slice(&ctx.response.body).unwrap()
}

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_sample_products() {
        let handler = ListProducts::new(catalog());
        let mut ctx = HttpContext::new(HttpRequest::default());

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 200);
        assert_eq!(body_json(&ctx)["data"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_error() {
        let handler = ListProducts::new(Arc::new(ProductCatalog::new(Vec::new())));
        let mut ctx = HttpContext::new(HttpRequest::default());

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 400);
        assert_eq!(body_json(&ctx)["error"], "no data exist");
    }
}

mod get_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_by_id() {
        let handler = GetProduct::new(catalog());
        let mut ctx = ctx_with_params(&[("id", "1")], true);

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 200);
        assert_eq!(body_json(&ctx)["data"]["name"], "iphone");
    }

    #[tokio::test]
    async fn test_non_numeric_id_rejected() {
        let handler = GetProduct::new(catalog());
        let mut ctx = ctx_with_params(&[("id", "abc")], true);

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 400);
        assert_eq!(body_json(&ctx)["error"], "invalid id");
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let handler = GetProduct::new(catalog());
        let mut ctx = ctx_with_params(&[("id", "999")], true);

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 404);
    }
}

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_query_by_id_and_name() {
        let handler = QueryProducts::new(catalog());
        let mut ctx = ctx_with_params(&[("prdid", "1"), ("prdname", "iphone")], false);

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 200);
        let text = String::from_utf8(ctx.response.body.clone()).unwrap();
        assert!(text.contains("Product ID: 1"));
        assert!(text.contains("Name: iphone"));
    }

    #[tokio::test]
    async fn test_missing_query_params_rejected() {
        let handler = QueryProducts::new(catalog());
        let mut ctx = ctx_with_params(&[("prdname", "iphone")], false);

        handler.handle(&mut ctx).await;
        assert_eq!(ctx.response.status_code, 400);
    }

    #[tokio::test]
    async fn test_mismatched_pair_not_found() {
        let handler = QueryProducts::new(catalog());
        let mut ctx = ctx_with_params(&[("prdid", "1"), ("prdname", "laptop")], false);

        handler.handle(&mut ctx).await;
        assert_eq!(ctx.response.status_code, 404);
    }
}

mod create_tests {
    use super::*;

    fn post_ctx(body: &str) -> HttpContext {
        HttpContext::new(HttpRequest {
            method: "POST".to_string(),
            path: "/products".to_string(),
            body: body.as_bytes().to_vec(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_create_appends_to_catalog() {
        let catalog = catalog();
        let handler = CreateProduct::new(catalog.clone());
        let mut ctx = post_ctx(r#"{"id": 5, "name": "tablet", "price": 999.99}"#);

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 201);
        assert_eq!(catalog.find(5).unwrap().name, "tablet");
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let handler = CreateProduct::new(catalog());
        let mut ctx = post_ctx("not json");

        handler.handle(&mut ctx).await;
        assert_eq!(ctx.response.status_code, 400);
    }

    #[tokio::test]
    async fn test_invalid_fields_rejected() {
        let handler = CreateProduct::new(catalog());
        let mut ctx = post_ctx(r#"{"id": 0, "name": "", "price": -1}"#);

        handler.handle(&mut ctx).await;

        assert_eq!(ctx.response.status_code, 400);
        assert_eq!(body_json(&ctx)["error"], "missing or invalid fields");
    }
}
