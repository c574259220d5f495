//! Carrying the cart and the customer details from one run to the next.
//!
//! Carts are kept per restaurant. Customer details are shared by all of
//! them so the customer only types their name once.
use crate::errors::Result;
use crate::order::{CustomerDetails, DeliveryOption, OrderComposer, OrderLine};
use crate::storage::Storage;
use tracing::{debug, warn};

pub mod keys {
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const DELIVERY_OPTION: &str = "deliveryOption";
    pub const DELIVERY_ADDRESS: &str = "deliveryAddress";
    pub const PICKUP_TIME: &str = "pickupTime";

    /// Key of the saved cart of a restaurant
    pub fn orders(restaurant_id: &str) -> String {
        format!("orders_{}", restaurant_id)
    }
}

/// Write the composer's cart and customer details
pub fn save<S: Storage>(storage: &mut S, composer: &OrderComposer) -> Result<()> {
    let restaurant = &composer.restaurant().id;
    storage.set(&keys::orders(restaurant), &serde_json::to_string(composer.lines())?)?;
    save_customer(storage, composer.customer())?;

    debug!(restaurant, lines = composer.lines().len(), "Session saved");
    Ok(())
}

/// Load whatever was saved into `composer`. Unreadable entries are skipped.
pub fn restore<S: Storage>(storage: &S, composer: &mut OrderComposer) -> Result<()> {
    let key = keys::orders(&composer.restaurant().id);
    if let Some(raw) = storage.get(&key)? {
        match serde_json::from_str::<Vec<OrderLine>>(&raw) {
            Ok(lines) => composer.set_lines(lines),
            Err(err) => warn!(key, %err, "Ignoring unreadable saved cart"),
        }
    }
    *composer.customer_mut() = load_customer(storage)?;
    Ok(())
}

pub fn save_customer<S: Storage>(storage: &mut S, customer: &CustomerDetails) -> Result<()> {
    storage.set(keys::CUSTOMER_NAME, &customer.name)?;
    storage.set(keys::DELIVERY_OPTION, customer.delivery_option.as_str())?;
    storage.set(keys::DELIVERY_ADDRESS, &customer.delivery_address)?;
    storage.set(keys::PICKUP_TIME, &customer.pickup_time)?;
    Ok(())
}

/// Saved customer details, blank where nothing was saved
pub fn load_customer<S: Storage>(storage: &S) -> Result<CustomerDetails> {
    let mut customer = CustomerDetails::default();
    if let Some(name) = storage.get(keys::CUSTOMER_NAME)? {
        customer.name = name;
    }
    if let Some(option) = storage.get(keys::DELIVERY_OPTION)? {
        match option.parse::<DeliveryOption>() {
            Ok(option) => customer.delivery_option = option,
            Err(err) => warn!(%err, "Ignoring saved delivery option"),
        }
    }
    if let Some(address) = storage.get(keys::DELIVERY_ADDRESS)? {
        customer.delivery_address = address;
    }
    if let Some(time) = storage.get(keys::PICKUP_TIME)? {
        customer.pickup_time = time;
    }
    Ok(customer)
}
