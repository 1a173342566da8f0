use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn find_by_id(&self, id: Uuid, include_archived: bool) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .into_boxed();
        if !include_archived {
            query = query.filter(products::deleted_at.is_null());
        }

        let row = query.first(&mut conn).optional()?;
        Ok(row.map(Product::from))
    }

    fn list(&self, include_archived: bool) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.asc())
            .into_boxed();
        if !include_archived {
            query = query.filter(products::deleted_at.is_null());
        }

        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name,
                description: product.description,
                cost: product.cost,
                inventory: product.inventory,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, product: &Product) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(products::table.find(product.id))
            .set(&ProductChangeset {
                name: &product.name,
                description: &product.description,
                cost: &product.cost,
                inventory: product.inventory,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Product::from)
            .ok_or_else(|| DomainError::not_found("Product", product.id))
    }

    /// Archives the product. Already archived products keep their original
    /// `deleted_at`.
    fn soft_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let archived = diesel::update(
            products::table
                .filter(products::id.eq(id))
                .filter(products::deleted_at.is_null()),
        )
        .set(products::deleted_at.eq(Some(Utc::now())))
        .execute(&mut conn)?;

        if archived == 0 {
            let exists: i64 = products::table
                .filter(products::id.eq(id))
                .count()
                .get_result(&mut conn)?;
            if exists == 0 {
                return Err(DomainError::not_found("Product", id));
            }
        }
        Ok(())
    }

    fn hard_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselProductRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::NewProduct;
    use crate::infrastructure::test_db::setup_db;

    fn widget(cost: &str) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: "brass".to_string(),
            cost: BigDecimal::from_str(cost).expect("valid decimal"),
            inventory: 3,
        }
    }

    #[tokio::test]
    async fn create_and_find_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let created = repo.create(widget("12.34")).expect("create failed");
        let found = repo
            .find_by_id(created.id, false)
            .expect("find failed")
            .expect("product should exist");

        assert_eq!(found.cost, BigDecimal::from_str("12.34").expect("valid"));
        assert_eq!(found.inventory, 3);
        assert!(!found.is_archived());
    }

    #[tokio::test]
    async fn soft_delete_hides_from_default_queries() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let archived = repo.create(widget("1.00")).expect("create");
        let live = repo.create(widget("2.00")).expect("create");

        repo.soft_delete(archived.id).expect("archive");
        repo.soft_delete(archived.id).expect("archive twice");

        assert!(repo
            .find_by_id(archived.id, false)
            .expect("find")
            .is_none());
        assert!(repo
            .find_by_id(archived.id, true)
            .expect("find")
            .expect("still stored")
            .is_archived());

        let visible: Vec<Uuid> = repo
            .list(false)
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(visible, vec![live.id]);
        assert_eq!(repo.list(true).expect("list").len(), 2);
    }

    #[tokio::test]
    async fn deleting_unknown_product_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        assert!(matches!(
            repo.soft_delete(Uuid::new_v4()).unwrap_err(),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            repo.hard_delete(Uuid::new_v4()).unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);
        let mut product = repo.create(widget("1.00")).expect("create");

        product.name = "Gadget".to_string();
        product.cost = BigDecimal::from_str("9.99").expect("valid");
        let updated = repo.update(&product).expect("update");

        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.cost, BigDecimal::from_str("9.99").expect("valid"));
        assert_eq!(updated.created_at, product.created_at);
    }
}
