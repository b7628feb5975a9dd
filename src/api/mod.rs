//! HTTP API handlers and routes
//!
//! # API Endpoints
//!
//! ## Chat
//! - `POST /api/chat` - Relay a prompt to Gemini
//! - `POST /functions/v1/gemini-chat` - Same handler, legacy path
//!
//! ## Dashboard (`/api/dashboard`)
//! - `GET|POST /projects`, `GET|DELETE /projects/{id}`
//! - `GET|POST /tasks`, `GET|PATCH|DELETE /tasks/{id}`, `PUT /tasks/{id}/status`
//! - `GET|POST /team`, `GET /team/summary`, `DELETE /team/{id}`
//! - `GET|POST /notes`, `GET|PUT|DELETE /notes/{id}`
//!
//! ## Health
//! - `GET /api/health`
//!
//! Every response carries permissive CORS headers; `OPTIONS` on any path
//! is answered with `204 No Content` (see [`cors`]).

/// CORS middleware.
pub mod cors;
/// Request extractors.
pub mod extract;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
