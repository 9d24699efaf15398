pub mod postgres_connection_adapter;
pub mod postgres_driver_adapter;
