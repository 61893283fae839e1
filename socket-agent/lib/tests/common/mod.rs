//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use socket_agent::transport::RecordingTransport;
use socket_agent::{Client, ClientBuilder, Descriptor};
use url::Url;

/// Descriptor document of a small shop service, as served on the wire.
pub fn shop_document() -> Value {
    json!({
        "name": "Shop",
        "description": "Demo shop",
        "version": "1.2.0",
        "specVersion": "2025-01-01",
        "auth": { "type": "bearer" },
        "endpoints": [
            {
                "path": "/products",
                "method": "GET",
                "operationId": "list_products",
                "summary": "List products",
                "parameters": [
                    { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                    {
                        "name": "tag",
                        "in": "query",
                        "schema": { "type": "array", "items": { "type": "string" } }
                    }
                ]
            },
            {
                "path": "/products/{id}",
                "method": "GET",
                "operationId": "get_product",
                "summary": "Get one product",
                "parameters": [
                    { "name": "id", "in": "path", "schema": { "type": "string" } }
                ]
            },
            {
                "path": "/products",
                "method": "POST",
                "operationId": "create_product",
                "summary": "Create a product",
                "requestBody": {
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "name": { "type": "string" },
                                    "price": { "type": "number" }
                                },
                                "required": ["name", "price"]
                            }
                        }
                    }
                }
            },
            {
                "path": "/orders",
                "method": "POST",
                "operationId": "create_order",
                "parameters": [
                    { "name": "X-Tenant", "in": "header" }
                ],
                "requestBody": {
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": { "sku": { "type": "string" } },
                                "required": ["sku"]
                            }
                        }
                    }
                }
            }
        ]
    })
}

/// The shop descriptor, validated.
pub fn shop() -> Descriptor {
    Descriptor::from_json(&shop_document().to_string()).unwrap()
}

/// A client over a recording transport with the shop descriptor installed.
pub fn shop_client() -> Client<RecordingTransport> {
    ClientBuilder::new(Url::parse("http://shop.test").unwrap())
        .descriptor(shop())
        .build_with_transport(RecordingTransport::new())
}
