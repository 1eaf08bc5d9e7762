// Session authentication (hashing, tokens, cookie, gate)
pub mod auth;

// Upstream game catalog
pub mod catalog;

// Process configuration
pub mod config;

// Error taxonomy and HTTP mapping
pub mod error;

// Middleware
pub mod middleware;

// API models (requests/responses)
pub mod models;

// HTTP routes
pub mod routes;

// Application state
pub mod state;

// User persistence
pub mod store;
