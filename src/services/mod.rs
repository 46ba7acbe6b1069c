pub mod customer_service;
pub mod registration;
pub mod update_builder;
pub mod user_service;
