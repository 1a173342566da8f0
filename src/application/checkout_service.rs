use std::collections::HashSet;

use bigdecimal::BigDecimal;
use log::{error, info, warn};
use uuid::Uuid;

use crate::application::inquiry_service::InquiryService;
use crate::domain::cart::{CartAction, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderConditions, OrderInput, OrderStatus, PaymentMethod};
use crate::domain::ports::{
    SharedCartRepository, SharedOrderRepository, SharedPaymentProvider, SharedProductRepository,
};

/// Sequences the order, cart, catalog and payment collaborators through the
/// checkout workflow.
#[derive(Clone)]
pub struct CheckoutService {
    orders: SharedOrderRepository,
    carts: SharedCartRepository,
    products: SharedProductRepository,
    payments: SharedPaymentProvider,
    inquiries: InquiryService,
}

impl CheckoutService {
    pub fn new(
        orders: SharedOrderRepository,
        carts: SharedCartRepository,
        products: SharedProductRepository,
        payments: SharedPaymentProvider,
    ) -> Self {
        let inquiries = InquiryService::new(orders.clone());
        Self {
            orders,
            carts,
            products,
            payments,
            inquiries,
        }
    }

    // ── Totals ───────────────────────────────────────────────────────────────

    /// Sum of `cost × quantity` over the order's cart. An order without a cart
    /// totals zero.
    pub fn compute_total(&self, order_id: Uuid) -> Result<BigDecimal, DomainError> {
        self.load_order(order_id)?;
        let cart = self.carts.find_by_order(order_id)?;
        self.total_of(&cart)
    }

    fn total_of(&self, cart: &[CartItem]) -> Result<BigDecimal, DomainError> {
        cart.iter().try_fold(BigDecimal::from(0), |total, item| {
            // Archived products still price the carts that hold them.
            let product = self
                .products
                .find_by_id(item.product_id, true)?
                .ok_or_else(|| DomainError::not_found("Product", item.product_id))?;
            Ok(total + product.cost * BigDecimal::from(item.quantity))
        })
    }

    // ── Orders ───────────────────────────────────────────────────────────────

    /// Finalizes pricing for a user-pending order and, for PayPal orders,
    /// creates the provider-side order. An order can be authorized once.
    pub fn authorize(&self, order_id: Uuid) -> Result<Order, DomainError> {
        let mut order = self.load_order(order_id)?;

        if order.status != OrderStatus::UserPending {
            warn!("Rejected authorize of order {} in status {}", order_id, order.status);
            return Err(DomainError::invalid(format!(
                "order {} is {}, only {} orders can be authorized",
                order_id,
                order.status,
                OrderStatus::UserPending
            )));
        }

        let cart = self.carts.find_by_order(order_id)?;
        if cart.is_empty() {
            return Err(DomainError::invalid(format!(
                "order {} has an empty cart, add a product before authorizing",
                order_id
            )));
        }

        if order.is_authorized() {
            return Err(DomainError::invalid(format!(
                "order {} was already authorized",
                order_id
            )));
        }

        order.total = self.total_of(&cart)?;

        if order.payment_method == PaymentMethod::Paypal {
            let ext_id = self
                .payments
                .create_external_order(order.id, &order.total)
                .inspect_err(|e| {
                    error!(
                        "{} order creation failed for order {}: {}",
                        self.payments.provider_name(),
                        order_id,
                        e
                    )
                })?;
            order.ext_id = Some(ext_id);
        }

        order.status = OrderStatus::AdminPending;

        match self.orders.update_order(&order) {
            Ok(mut saved) => {
                info!(
                    "Authorized order {} total={} ext_id={:?}",
                    saved.id, saved.total, saved.ext_id
                );
                saved.cart = cart;
                Ok(saved)
            }
            Err(e) => match &order.ext_id {
                Some(ext_id) => {
                    error!(
                        "RECONCILE: {} order {} exists for local order {} but persisting it failed: {}",
                        self.payments.provider_name(),
                        ext_id,
                        order_id,
                        e
                    );
                    Err(DomainError::Upstream(format!(
                        "payment order {} was created but order {} could not be saved: {}",
                        ext_id, order_id, e
                    )))
                }
                None => Err(e),
            },
        }
    }

    /// Creates the order when `input.id` is empty, otherwise updates it.
    ///
    /// Status changes only happen through [`authorize`](Self::authorize) and
    /// [`accept_order`](Self::accept_order); `input.status` must either be
    /// `NotImplemented` or match the current status.
    pub fn save_order(&self, input: OrderInput) -> Result<Order, DomainError> {
        let inquiry_id = self.resolve_inquiry(&input)?;

        let saved = match input.id {
            None => {
                if !matches!(
                    input.status,
                    OrderStatus::NotImplemented | OrderStatus::UserPending
                ) {
                    return Err(DomainError::invalid(format!(
                        "new orders start as {}, got {}",
                        OrderStatus::UserPending,
                        input.status
                    )));
                }
                let order = self.orders.create_order(NewOrder {
                    inquiry_id,
                    payment_method: input.payment_method,
                    status: OrderStatus::UserPending,
                    due: input.due,
                })?;
                info!("Created order {} for inquiry {}", order.id, inquiry_id);
                order
            }
            Some(id) => {
                let mut order = self.load_order(id)?;

                if order.inquiry_id != inquiry_id {
                    return Err(DomainError::invalid(format!(
                        "order {} belongs to inquiry {}, it can't be moved to {}",
                        id, order.inquiry_id, inquiry_id
                    )));
                }
                if input.status != OrderStatus::NotImplemented && input.status != order.status {
                    return Err(DomainError::invalid(format!(
                        "order {} can't move from {} to {} by saving it",
                        id, order.status, input.status
                    )));
                }
                // An unset payment method keeps the stored one.
                if input.payment_method != PaymentMethod::NotImplemented
                    && input.payment_method != order.payment_method
                {
                    if order.status != OrderStatus::UserPending {
                        return Err(DomainError::invalid(format!(
                            "payment method of order {} is fixed once it is {}",
                            id, order.status
                        )));
                    }
                    order.payment_method = input.payment_method;
                }

                order.due = input.due;
                self.orders.update_order(&order)?
            }
        };

        self.hydrate(saved)
    }

    fn resolve_inquiry(&self, input: &OrderInput) -> Result<Uuid, DomainError> {
        match (input.inquiry_id, &input.inquiry) {
            (None, None) => Err(DomainError::invalid(
                "an inquiry is required on an order, provide an inquiry id or an inquiry",
            )),
            (Some(id), None) => Ok(self.inquiries.get_inquiry(id)?.id),
            (id, Some(inline)) => {
                let mut inline = inline.clone();
                if let (Some(id), Some(inline_id)) = (id, inline.id) {
                    if id != inline_id {
                        return Err(DomainError::invalid(format!(
                            "inquiry id {} doesn't match the attached inquiry {}",
                            id, inline_id
                        )));
                    }
                }
                inline.id = inline.id.or(id);
                Ok(self.inquiries.save_inquiry(inline)?.id)
            }
        }
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        let order = self.load_order(id)?;
        self.hydrate(order)
    }

    pub fn list_orders(&self, conditions: &OrderConditions) -> Result<Vec<Order>, DomainError> {
        self.orders
            .list_orders(conditions)?
            .into_iter()
            .map(|order| self.hydrate(order))
            .collect()
    }

    /// Admin sign-off: admin-pending → accepted.
    pub fn accept_order(&self, id: Uuid) -> Result<Order, DomainError> {
        let mut order = self.load_order(id)?;
        if order.status != OrderStatus::AdminPending {
            return Err(DomainError::invalid(format!(
                "order {} is {}, only {} orders can be accepted",
                id,
                order.status,
                OrderStatus::AdminPending
            )));
        }

        order.status = OrderStatus::Accepted;
        let order = self.orders.update_order(&order)?;
        info!("Accepted order {}", id);
        self.hydrate(order)
    }

    fn load_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .find_order(id)?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    fn hydrate(&self, mut order: Order) -> Result<Order, DomainError> {
        let cart = self.carts.find_by_order(order.id)?;
        order.total = self.total_of(&cart)?;
        order.cart = cart;
        Ok(order)
    }

    // ── Carts ────────────────────────────────────────────────────────────────

    pub fn get_cart(&self, order_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        self.load_order(order_id)?;
        self.carts.find_by_order(order_id)
    }

    /// Replaces the whole cart of the order with `items`.
    pub fn save_cart(
        &self,
        order_id: Uuid,
        items: Vec<CartItem>,
    ) -> Result<Vec<CartItem>, DomainError> {
        self.editable_order(order_id)?;

        if items.is_empty() {
            return Err(DomainError::invalid(
                "no cart was provided, an empty cart can't be saved",
            ));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.order_id != order_id {
                return Err(DomainError::invalid(format!(
                    "cart line for product {} belongs to order {}, not {}",
                    item.product_id, item.order_id, order_id
                )));
            }
            if !seen.insert(item.product_id) {
                return Err(DomainError::invalid(format!(
                    "product {} appears more than once in the cart",
                    item.product_id
                )));
            }
            self.check_line(item.product_id, item.quantity)?;
        }

        let saved = self.carts.replace(order_id, &items)?;
        info!("Saved cart of order {} with {} line(s)", order_id, saved.len());
        Ok(saved)
    }

    /// Adds (or re-quantifies) a single product, or removes it, and returns
    /// the resulting cart.
    pub fn save_cart_item(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        action: CartAction,
        quantity: i32,
    ) -> Result<Vec<CartItem>, DomainError> {
        self.editable_order(order_id)?;

        match action {
            CartAction::Add => {
                self.check_line(product_id, quantity)?;
                self.carts.upsert_item(order_id, product_id, quantity)?;
            }
            CartAction::Remove => self.carts.remove_item(order_id, product_id)?,
        }

        self.carts.find_by_order(order_id)
    }

    fn editable_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        let order = self.load_order(order_id)?;
        if order.status != OrderStatus::UserPending {
            return Err(DomainError::invalid(format!(
                "the cart of order {} can't change once it is {}",
                order_id, order.status
            )));
        }
        Ok(order)
    }

    fn check_line(&self, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        if quantity <= 0 {
            return Err(DomainError::invalid(format!(
                "quantity for product {} must be positive, got {}",
                product_id, quantity
            )));
        }
        self.products
            .find_by_id(product_id, false)?
            .ok_or_else(|| DomainError::not_found("Product", product_id))?;
        Ok(())
    }

    // ── Payments ─────────────────────────────────────────────────────────────

    pub fn generate_client_token(&self) -> Result<String, DomainError> {
        self.payments.generate_client_token()
    }
}
