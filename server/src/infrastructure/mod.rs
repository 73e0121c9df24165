/// Audit logging for operator-visible changes.
pub mod audit;
/// Configuration management for the service.
pub mod config;
/// HTTP server, health checks and metrics endpoint.
pub mod server;
/// Flat JSON file persistence.
pub mod storage;
/// Telemetry setup for logging.
pub mod telemetry;
