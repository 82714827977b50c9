use axum::response::{Html, IntoResponse};
use axum::Json;
use serde_json::json;

// Swagger UI loads its assets from a CDN so the page works without any
// bundled static files.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Swagger UI</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js" crossorigin></script>
  <script>
    window.onload = function() {
      window.ui = SwaggerUIBundle({
        url: "/api-docs/openapi.json",
        dom_id: "#swagger-ui",
        presets: [
          SwaggerUIBundle.presets.apis,
          SwaggerUIStandalonePreset
        ],
        layout: "StandaloneLayout"
      });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

pub async fn openapi_spec() -> impl IntoResponse {
    Json(json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Payments API",
            "description": "Create and inspect payments. Amounts are in kopeks. The Idempotency-Key header is required on creation.",
            "version": "1.0.0"
        },
        "servers": [
            { "url": "/", "description": "Current host" },
            { "url": "http://localhost:3000", "description": "Local" }
        ],
        "paths": {
            "/api/v1/payments": {
                "post": {
                    "summary": "Create a payment",
                    "parameters": [
                        { "name": "Idempotency-Key", "in": "header", "required": true, "schema": { "type": "string" } }
                    ],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "required": ["amountKopeks", "provider"],
                                    "properties": {
                                        "amountKopeks": { "type": "integer", "description": "Amount in kopeks (29900 = 299 RUB)" },
                                        "currency": { "type": "string", "enum": ["RUB"], "default": "RUB" },
                                        "provider": { "type": "string", "enum": ["yookassa", "tbank", "sber"] },
                                        "description": { "type": "string", "maxLength": 500 },
                                        "returnUrl": { "type": "string", "format": "uri", "description": "Must be a syntactically valid URL" }
                                    }
                                },
                                "example": {
                                    "amountKopeks": 29900,
                                    "currency": "RUB",
                                    "provider": "yookassa",
                                    "description": "Subscription payment",
                                    "returnUrl": "https://example.com/return"
                                }
                            }
                        }
                    },
                    "responses": {
                        "201": { "description": "Payment created" },
                        "200": { "description": "Replay of the same Idempotency-Key, the original payment is returned" },
                        "400": { "description": "Validation error" },
                        "409": { "description": "Idempotency-Key already used with a different payload" }
                    }
                },
                "get": {
                    "summary": "List payments",
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1, "maximum": 50, "default": 20 } },
                        { "name": "status", "in": "query", "schema": { "type": "string", "enum": ["pending", "succeeded", "failed", "cancelled"] } }
                    ],
                    "responses": { "200": { "description": "Payments, newest first" } }
                }
            },
            "/api/v1/payments/{id}": {
                "get": {
                    "summary": "Fetch one payment by id",
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": { "description": "Payment found" },
                        "404": { "description": "Payment not found" }
                    }
                }
            }
        }
    }))
}
