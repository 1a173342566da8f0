pub mod cart_repo;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod paypal;
pub mod product_repo;
pub mod token;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod test_db;
