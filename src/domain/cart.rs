use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Remove,
}

impl CartAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADD" => Some(CartAction::Add),
            "REMOVE" => Some(CartAction::Remove),
            _ => None,
        }
    }
}
