use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartItem;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::carts;

use super::models::{CartRow, NewCartRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn find_by_order(&self, order_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = carts::table
            .filter(carts::order_id.eq(order_id))
            .order(carts::id.asc())
            .select(CartRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    fn replace(&self, order_id: Uuid, items: &[CartItem]) -> Result<Vec<CartItem>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::delete(carts::table.filter(carts::order_id.eq(order_id))).execute(conn)?;

            let rows: Vec<NewCartRow> = items.iter().map(NewCartRow::from).collect();
            let saved = diesel::insert_into(carts::table)
                .values(&rows)
                .returning(CartRow::as_returning())
                .get_results(conn)?;

            Ok(saved.into_iter().map(CartItem::from).collect())
        })
    }

    fn upsert_item(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(carts::table)
            .values(&NewCartRow {
                order_id,
                product_id,
                quantity,
            })
            .on_conflict((carts::order_id, carts::product_id))
            .do_update()
            .set(carts::quantity.eq(quantity))
            .returning(CartRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn remove_item(&self, order_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(
            carts::table
                .filter(carts::order_id.eq(order_id))
                .filter(carts::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::cart::CartItem;
    use crate::domain::errors::DomainError;
    use crate::domain::inquiry::NewInquiry;
    use crate::domain::order::{NewOrder, OrderStatus, PaymentMethod};
    use crate::domain::ports::{CartRepository, OrderRepository, ProductRepository};
    use crate::domain::product::NewProduct;
    use crate::infrastructure::order_repo::DieselOrderRepository;
    use crate::infrastructure::product_repo::DieselProductRepository;
    use crate::infrastructure::test_db::setup_db;

    struct Seed {
        order_id: Uuid,
        products: Vec<Uuid>,
    }

    fn seed(pool: &crate::db::DbPool, product_count: usize) -> Seed {
        let orders = DieselOrderRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool.clone());

        let inquiry = orders
            .create_inquiry(NewInquiry::default())
            .expect("inquiry");
        let order = orders
            .create_order(NewOrder {
                inquiry_id: inquiry.id,
                payment_method: PaymentMethod::Paypal,
                status: OrderStatus::UserPending,
                due: None,
            })
            .expect("order");

        let products = (0..product_count)
            .map(|i| {
                products
                    .create(NewProduct {
                        name: format!("product {}", i),
                        description: String::new(),
                        cost: BigDecimal::from_str("1.50").expect("valid decimal"),
                        inventory: 10,
                    })
                    .expect("product")
                    .id
            })
            .collect();

        Seed {
            order_id: order.id,
            products,
        }
    }

    fn line(order_id: Uuid, product_id: Uuid, quantity: i32) -> CartItem {
        CartItem {
            order_id,
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_cart() {
        let (_container, pool) = setup_db().await;
        let seed = seed(&pool, 3);
        let repo = DieselCartRepository::new(pool);
        let (o, p) = (seed.order_id, &seed.products);

        repo.replace(o, &[line(o, p[0], 1), line(o, p[1], 2)])
            .expect("first replace");
        let saved = repo
            .replace(o, &[line(o, p[2], 4), line(o, p[0], 3)])
            .expect("second replace");

        assert_eq!(saved, vec![line(o, p[2], 4), line(o, p[0], 3)]);
        assert_eq!(repo.find_by_order(o).expect("find"), saved);
    }

    #[tokio::test]
    async fn upsert_keeps_line_position() {
        let (_container, pool) = setup_db().await;
        let seed = seed(&pool, 2);
        let repo = DieselCartRepository::new(pool);
        let (o, p) = (seed.order_id, &seed.products);

        repo.upsert_item(o, p[0], 1).expect("add first");
        repo.upsert_item(o, p[1], 1).expect("add second");
        let updated = repo.upsert_item(o, p[0], 7).expect("requantify");

        assert_eq!(updated, line(o, p[0], 7));
        assert_eq!(
            repo.find_by_order(o).expect("find"),
            vec![line(o, p[0], 7), line(o, p[1], 1)]
        );

        repo.remove_item(o, p[0]).expect("remove");
        assert_eq!(repo.find_by_order(o).expect("find"), vec![line(o, p[1], 1)]);
    }

    #[tokio::test]
    async fn unknown_product_violates_foreign_key() {
        let (_container, pool) = setup_db().await;
        let seed = seed(&pool, 0);
        let repo = DieselCartRepository::new(pool);

        let err = repo
            .upsert_item(seed.order_id, Uuid::new_v4(), 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn carted_product_cannot_be_hard_deleted() {
        let (_container, pool) = setup_db().await;
        let seed = seed(&pool, 1);
        let products = DieselProductRepository::new(pool.clone());
        let repo = DieselCartRepository::new(pool);

        repo.upsert_item(seed.order_id, seed.products[0], 1)
            .expect("add");

        let err = products.hard_delete(seed.products[0]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }
}
