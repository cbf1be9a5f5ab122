//! # Orar Config
//!
//! Configuration types for the Orar timetable API, loaded from environment
//! variables:
//!
//! - [`database`]: PostgreSQL connection settings
//! - [`jwt`]: JWT verification configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: listen address
//!
//! # Example
//!
//! ```ignore
//! use orar_config::{CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
