use bigdecimal::BigDecimal;
use log::info;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::SharedProductRepository;
use crate::domain::product::{DeleteMode, NewProduct, Product, ProductInput};

#[derive(Clone)]
pub struct ProductService {
    repo: SharedProductRepository,
}

impl ProductService {
    pub fn new(repo: SharedProductRepository) -> Self {
        Self { repo }
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.repo
            .find_by_id(id, false)?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    pub fn list_products(&self, include_archived: bool) -> Result<Vec<Product>, DomainError> {
        self.repo.list(include_archived)
    }

    pub fn save_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        validate(&input.fields)?;

        let Some(id) = input.id else {
            let product = self.repo.create(input.fields)?;
            info!("Created product {} ({})", product.id, product.name);
            return Ok(product);
        };

        let existing = self.get_product(id)?;
        let fields = input.fields;
        self.repo.update(&Product {
            name: fields.name,
            description: fields.description,
            cost: fields.cost,
            inventory: fields.inventory,
            ..existing
        })
    }

    pub fn delete_product(&self, id: Uuid, mode: DeleteMode) -> Result<(), DomainError> {
        self.repo
            .find_by_id(id, true)?
            .ok_or_else(|| DomainError::not_found("Product", id))?;

        match mode {
            DeleteMode::Soft => self.repo.soft_delete(id)?,
            DeleteMode::Hard => self.repo.hard_delete(id)?,
        }
        info!("Deleted product {} ({:?})", id, mode);
        Ok(())
    }
}

fn validate(product: &NewProduct) -> Result<(), DomainError> {
    if product.name.trim().is_empty() {
        return Err(DomainError::invalid("product name is required"));
    }
    if product.cost < BigDecimal::from(0) {
        return Err(DomainError::invalid(format!(
            "product cost can't be negative, got {}",
            product.cost
        )));
    }
    if product.inventory < 0 {
        return Err(DomainError::invalid(format!(
            "product inventory can't be negative, got {}",
            product.inventory
        )));
    }
    Ok(())
}
