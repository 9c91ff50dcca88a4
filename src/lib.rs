// Site catalog
pub mod site;

// Synthetic telemetry generation
pub mod telemetry;

// Observer subscriptions and delivery
pub mod subscription;

// Periodic broadcast
pub mod scheduler;

// HTTP and WebSocket APIs
pub mod api;

// Configuration
pub mod config;
