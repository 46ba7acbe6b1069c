pub mod customer_dto;
pub mod user_dto;
