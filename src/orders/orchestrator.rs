use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::amortization::AmortizationEngine;
use crate::decimal::Money;
use crate::errors::{ErrorKind, Result, StoreError};
use crate::events::Event;
use crate::orders::contract::Origination;
use crate::orders::{CreateOrder, InstallmentContract, Order, OrderItem, PaymentScheduleEntry};
use crate::plans::FinancingPlan;
use crate::store::{Store, StoreRead, StoreTx};
use crate::types::{OrderId, OrderStatus, PlanId, ProductId, SequenceKind, UserId};

/// order creation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSettings {
    /// require an active credit line covering the financed total
    pub enforce_credit_limit: bool,
    /// sales channel recorded when the request names none
    pub default_source: String,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            enforce_credit_limit: true,
            default_source: "saberstore".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDetails {
    pub contract: InstallmentContract,
    pub schedule: Vec<PaymentScheduleEntry>,
}

/// an order with its contract and schedule, if financed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    pub contract: Option<ContractDetails>,
}

/// cart priced against a snapshot, before any write
struct PricedCart {
    items: Vec<OrderItem>,
    total_amount: Money,
    plan_id: Option<PlanId>,
}

/// transactional checkout workflow
///
/// Validation runs against a read snapshot first so bad requests fail
/// without taking the write path. Stock decrements, the order, and for
/// installment orders the contract, its schedule and the credit
/// reservation are then written in a single store transaction.
#[derive(Debug)]
pub struct OrderOrchestrator<S> {
    store: Arc<S>,
    engine: AmortizationEngine,
    settings: OrderSettings,
}

impl<S: Store> OrderOrchestrator<S> {
    pub fn new(store: Arc<S>, settings: OrderSettings) -> Self {
        Self {
            store,
            engine: AmortizationEngine::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    pub fn create_order(&self, request: CreateOrder, time_provider: &SafeTimeProvider) -> Result<OrderDetails> {
        let user_id = request.user_id;
        let result = self.place_order(request, time_provider.now());

        match &result {
            Ok(details) => info!(
                order_id = %details.order.id,
                order_number = details.order.order_number.as_str(),
                %user_id,
                total_amount = %details.order.total_amount,
                contract_number = details.contract.as_ref().map(|c| c.contract.contract_number.as_str()),
                "Order created"
            ),
            Err(err) if err.kind() == ErrorKind::Internal => {
                error!(%user_id, error = %err, "Order creation failed")
            }
            Err(err) => warn!(%user_id, error = %err, "Order rejected"),
        }
        result
    }

    fn place_order(&self, request: CreateOrder, now: DateTime<Utc>) -> Result<OrderDetails> {
        request.validate()?;
        let quantities = request.quantities();

        let cart = self
            .store
            .read(|r| price_cart(r, &request, &quantities))??;

        let order_id = Uuid::new_v4();
        self.store.transaction(|tx| {
            for &(product_id, quantity) in &quantities {
                let remaining = tx.decrement_stock(product_id, quantity)?;
                tx.record(Event::StockDecremented {
                    product_id,
                    quantity,
                    remaining,
                    order_id,
                });
            }

            let year = now.year();
            let sequence = tx.next_sequence(SequenceKind::Order, year);
            let order = Order {
                id: order_id,
                order_number: SequenceKind::Order.format(year, sequence),
                user_id: request.user_id,
                items: cart.items.clone(),
                total_amount: cart.total_amount,
                status: OrderStatus::Pending,
                payment_method: request.payment_method,
                delivery_method: request.delivery_method,
                delivery_address: request.delivery_address.clone(),
                governorate: request.governorate.clone(),
                pickup_branch: request.pickup_branch.clone(),
                source: request
                    .source
                    .clone()
                    .unwrap_or_else(|| self.settings.default_source.clone()),
                created_at: now,
            };
            tx.insert_order(order.clone());
            tx.record(Event::OrderPlaced {
                order_id,
                order_number: order.order_number.clone(),
                user_id: order.user_id,
                total_amount: order.total_amount,
                payment_method: order.payment_method,
                timestamp: now,
            });

            let contract = match cart.plan_id {
                Some(plan_id) => Some(self.originate_contract(tx, &order, plan_id, now)?),
                None => None,
            };

            Ok(OrderDetails { order, contract })
        })
    }

    fn originate_contract(
        &self,
        tx: &mut dyn StoreTx,
        order: &Order,
        plan_id: PlanId,
        now: DateTime<Utc>,
    ) -> Result<ContractDetails> {
        // re-read under the transaction: the plan may have been retired since pricing
        let plan = tx.plan(plan_id).ok_or(StoreError::PlanNotFound { plan_id })?;
        let calculation = self.engine.calculate(order.total_amount, &plan)?;

        let customer = tx
            .customer(order.user_id)
            .ok_or(StoreError::CustomerNotFound { user_id: order.user_id })?;

        if self.settings.enforce_credit_limit {
            self.reserve_credit(tx, order.user_id, calculation.total_financed_with_interest, now)?;
        }

        let schedule = self
            .engine
            .generate_schedule(now, plan.duration_months, calculation.monthly_payment)?;

        let year = now.year();
        let sequence = tx.next_sequence(SequenceKind::Contract, year);
        let (contract, entries) = InstallmentContract::originate(Origination {
            contract_number: SequenceKind::Contract.format(year, sequence),
            order_id: order.id,
            user_id: order.user_id,
            plan_id,
            phone_number: customer.phone_number,
            start_date: now,
            calculation: &calculation,
            schedule: &schedule,
        })?;

        tx.insert_contract(contract.clone());
        tx.record(Event::ContractOriginated {
            contract_id: contract.id,
            contract_number: contract.contract_number.clone(),
            order_id: order.id,
            plan_id,
            financed_amount: contract.total_financed_with_interest,
            monthly_payment: contract.monthly_payment,
            timestamp: now,
        });
        for entry in &entries {
            tx.record(Event::InstallmentScheduled {
                contract_id: contract.id,
                installment_number: entry.installment_number,
                amount: entry.amount,
                due_date: entry.due_date,
            });
        }
        tx.insert_schedule(entries.clone());

        Ok(ContractDetails {
            contract,
            schedule: entries,
        })
    }

    fn reserve_credit(
        &self,
        tx: &mut dyn StoreTx,
        user_id: UserId,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut line = tx
            .credit_line(user_id)
            .ok_or(StoreError::NoCreditLine { user_id })?;
        line.reserve(amount)?;

        tx.record(Event::CreditReserved {
            user_id,
            amount,
            remaining_limit: line.remaining_limit,
            timestamp: now,
        });
        tx.put_credit_line(line);
        Ok(())
    }

    /// the caller's orders, newest first
    pub fn get_user_orders(&self, user_id: UserId) -> Result<Vec<OrderDetails>> {
        self.store.read(|r| {
            r.orders_for_user(user_id)
                .into_iter()
                .map(|order| with_contract(r, order))
                .collect()
        })
    }

    /// one order; when `user_id` is given, someone else's order is reported
    /// as not found
    pub fn get_order_by_id(&self, order_id: OrderId, user_id: Option<UserId>) -> Result<OrderDetails> {
        self.store
            .read(|r| {
                r.order(order_id)
                    .filter(|order| user_id.map_or(true, |owner| order.user_id == owner))
                    .map(|order| with_contract(r, order))
            })?
            .ok_or(StoreError::OrderNotFound { order_id })
    }
}

fn with_contract(r: &dyn StoreRead, order: Order) -> OrderDetails {
    let contract = r.contract_for_order(order.id).map(|contract| ContractDetails {
        schedule: r.schedule_for_contract(contract.id),
        contract,
    });
    OrderDetails { order, contract }
}

fn price_cart(r: &dyn StoreRead, request: &CreateOrder, quantities: &[(ProductId, u32)]) -> Result<PricedCart> {
    let mut prices: HashMap<ProductId, Money> = HashMap::with_capacity(quantities.len());
    for &(product_id, requested) in quantities {
        let product = r
            .product(product_id)
            .filter(|p| p.is_active)
            .ok_or(StoreError::ProductNotFound { product_id })?;
        if product.stock_qty < requested {
            return Err(StoreError::InsufficientStock {
                product_id,
                name: product.name,
                available: product.stock_qty,
                requested,
            });
        }
        prices.insert(product_id, product.cash_price);
    }

    let items: Vec<OrderItem> = request
        .items
        .iter()
        .map(|line| OrderItem {
            product_id: line.product_id,
            quantity: line.quantity,
            price_at_purchase: prices[&line.product_id],
            warranty_months: line.warranty_months,
        })
        .collect();
    let total_amount = items.iter().try_fold(Money::ZERO, |total, item| {
        item.line_total()
            .and_then(|line| total.checked_add(line))
            .ok_or(StoreError::InvalidAmount {
                amount: item.price_at_purchase,
            })
    })?;

    let plan_id = if request.payment_method.is_installment() {
        let plan_id = request.installment_plan_id.ok_or(StoreError::MissingPlan)?;
        let plan: FinancingPlan = r.plan(plan_id).ok_or(StoreError::PlanNotFound { plan_id })?;
        plan.ensure_usable()?;
        Some(plan_id)
    } else {
        None
    };

    Ok(PricedCart {
        items,
        total_amount,
        plan_id,
    })
}
