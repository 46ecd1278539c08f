pub mod aggregate;
pub mod csv_io;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
