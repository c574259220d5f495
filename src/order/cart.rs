use crate::api::Restaurant;
use crate::errors::Result;
use crate::handoff::{order_message, whatsapp_link, Handoff};
use crate::order::{reduce, Action, LineDraft, LineKind, OrderLine, OrderMenu, Rejection};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::info;

/// How the customer gets the food
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    #[default]
    Pickup,
    Delivery,
}

impl DeliveryOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOption::Pickup => "pickup",
            DeliveryOption::Delivery => "delivery",
        }
    }
}

impl std::str::FromStr for DeliveryOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pickup" => Ok(DeliveryOption::Pickup),
            "delivery" => Ok(DeliveryOption::Delivery),
            other => Err(format!("unknown delivery option '{}'", other)),
        }
    }
}

/// Customer fields as typed in, both address and pickup time are kept
/// while the customer switches between options
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CustomerDetails {
    pub name: String,
    pub delivery_option: DeliveryOption,
    pub delivery_address: String,
    pub pickup_time: String,
}

/// The customer details that matter for the chosen option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfilment {
    Pickup { time: String },
    Delivery { address: String },
}

impl CustomerDetails {
    /// Resolve the delivery option, refusing blank details
    pub fn fulfilment(&self) -> std::result::Result<Fulfilment, Rejection> {
        match self.delivery_option {
            DeliveryOption::Delivery if self.delivery_address.trim().is_empty() => {
                Err(Rejection::MissingAddress)
            }
            DeliveryOption::Delivery => Ok(Fulfilment::Delivery {
                address: self.delivery_address.trim().to_string(),
            }),
            DeliveryOption::Pickup if self.pickup_time.trim().is_empty() => {
                Err(Rejection::MissingPickupTime)
            }
            DeliveryOption::Pickup => Ok(Fulfilment::Pickup {
                time: self.pickup_time.trim().to_string(),
            }),
        }
    }
}

/// Cart, customer details and the line being edited, for one restaurant
pub struct OrderComposer {
    restaurant: Restaurant,
    menu: OrderMenu,
    draft: LineDraft,
    lines: Vec<OrderLine>,
    customer: CustomerDetails,
}

impl OrderComposer {
    pub fn new(restaurant: Restaurant, menu: OrderMenu) -> Self {
        OrderComposer {
            restaurant,
            menu,
            draft: LineDraft::default(),
            lines: Vec::new(),
            customer: CustomerDetails::default(),
        }
    }

    pub fn restaurant(&self) -> &Restaurant {
        &self.restaurant
    }

    pub fn menu(&self) -> &OrderMenu {
        &self.menu
    }

    pub fn draft(&self) -> &LineDraft {
        &self.draft
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn customer_mut(&mut self) -> &mut CustomerDetails {
        &mut self.customer
    }

    /// Replace the cart, e.g. with one saved in a previous session
    pub fn set_lines(&mut self, lines: Vec<OrderLine>) {
        self.lines = lines;
    }

    /// Apply an action to the draft line. On rejection nothing changes.
    pub fn apply(&mut self, action: Action) -> std::result::Result<(), Rejection> {
        self.draft = reduce(&self.draft, action, &self.menu)?;
        Ok(())
    }

    /// Commit the draft line to the cart and start a fresh draft
    pub fn add_to_order(&mut self) -> std::result::Result<&OrderLine, Rejection> {
        let line = self.draft.commit()?;
        self.lines.push(line);
        self.draft = LineDraft::default();
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Remove the line at `index`, if there is one
    pub fn remove_from_order(&mut self, index: usize) -> Option<OrderLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Delivery fee owed with the current options
    pub fn delivery_fee(&self) -> Option<f64> {
        let delivering = self.customer.delivery_option == DeliveryOption::Delivery;
        (delivering && self.restaurant.has_delivery).then_some(self.restaurant.delivery_price)
    }

    pub fn total(&self) -> f64 {
        let lines: f64 = self
            .lines
            .iter()
            .map(|line| line.price(&self.restaurant))
            .sum();
        lines + self.delivery_fee().unwrap_or(0.0)
    }

    /// The cart as text, the way the restaurant receives it
    pub fn build_order_summary(&self) -> String {
        let mut summary = String::new();

        for (i, line) in self.lines.iter().enumerate() {
            let mix = if line.is_mix() { " (Mix)" } else { "" };
            let _ = writeln!(summary, "Order #{}{}:", i + 1, mix);
            let _ = writeln!(summary, "Item: {}", line.item.name);

            if let LineKind::Mix {
                second_main,
                second_main_specials,
            } = &line.kind
            {
                let _ = writeln!(summary, "Second Item: {}", second_main.name);
                if !second_main_specials.is_empty() {
                    let _ = writeln!(
                        summary,
                        "Second Item Specials: {}",
                        second_main_specials.join(", ")
                    );
                }
            }

            if !line.size.is_empty() {
                let _ = writeln!(summary, "Size: {}", line.size);
            }
            if let Some(side) = &line.side {
                let _ = writeln!(summary, "Side: {}", side);
            }
            if let Some(veg) = &line.veg {
                let _ = writeln!(summary, "Vegetable: {}", veg);
            }
            if let Some(gravey) = &line.gravey {
                let _ = writeln!(summary, "Gravy: {}", gravey);
            }
            if !line.specials.is_empty() {
                let _ = writeln!(summary, "Specials: {}", line.specials.join(", "));
            }
            let _ = write!(summary, "Price: ${:.2}\n\n", line.price(&self.restaurant));
        }

        if let Some(fee) = self.delivery_fee() {
            let _ = writeln!(summary, "Delivery Fee: ${:.2}", fee);
        }
        let _ = write!(summary, "Total: ${:.2}", self.total());
        summary
    }

    /// Check the order can go out
    pub fn validate_send(&self) -> std::result::Result<Fulfilment, Rejection> {
        if self.lines.is_empty() {
            return Err(Rejection::EmptyOrder);
        }
        if self.customer.name.trim().is_empty() {
            return Err(Rejection::MissingName);
        }
        self.customer.fulfilment()
    }

    /// Hand the order to the restaurant and empty the cart.
    ///
    /// Returns the link that was handed off.
    pub fn send_order<H: Handoff>(&mut self, handoff: &mut H) -> Result<Url> {
        let fulfilment = self.validate_send()?;
        let message = order_message(
            &self.restaurant,
            &self.build_order_summary(),
            self.customer.name.trim(),
            &fulfilment,
        );
        let link = whatsapp_link(&self.restaurant.whats_app_number, &message)?;

        handoff.hand_off(&link)?;
        info!(
            restaurant = %self.restaurant.id,
            lines = self.lines.len(),
            "Order handed off"
        );
        self.lines.clear();
        Ok(link)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::fixtures::{menu_item, restaurant};
    use crate::errors::Error;
    use crate::handoff::mock::RecordingHandoff;

    fn composer() -> OrderComposer {
        let mut stew = menu_item("Main", "Stew", &[("Sml", 8.0), ("Med", 10.0), ("Lrg", 13.0)]);
        stew.sides = vec!["Rice".to_string()];
        stew.specials = vec!["Egg".to_string()];
        let curry = menu_item("Main", "Curry", &[("Med", 11.0), ("Lrg", 14.0)]);
        let juice = menu_item("Drinks", "Juice", &[("", 2.5)]);
        OrderComposer::new(
            restaurant(&[("Med", 12.0), ("Lrg", 15.0)]),
            OrderMenu::new(&[stew, curry, juice]),
        )
    }

    fn add(composer: &mut OrderComposer, actions: Vec<Action>) {
        for action in actions {
            composer.apply(action).unwrap();
        }
        composer.add_to_order().unwrap();
    }

    fn add_mix(composer: &mut OrderComposer) {
        add(
            composer,
            vec![
                Action::SelectCategory("main".to_string()),
                Action::SelectItem("Stew".to_string()),
                Action::SetMix(true),
                Action::SelectSecondMain("Curry".to_string()),
                Action::SelectSize("Med".to_string()),
            ],
        );
    }

    fn add_juice(composer: &mut OrderComposer) {
        add(
            composer,
            vec![
                Action::SelectItem("Juice".to_string()),
                Action::SelectSize("".to_string()),
            ],
        );
    }

    #[test]
    fn test_mix_line_end_to_end() {
        let mut composer = composer();
        add_mix(&mut composer);

        let line = &composer.lines()[0];
        assert!(line.is_mix());
        assert_eq!(line.price(composer.restaurant()), 12.0);
        assert_eq!(composer.total(), 12.0);
        assert_eq!(composer.draft(), &LineDraft::default());

        composer.customer_mut().delivery_option = DeliveryOption::Delivery;
        assert_eq!(composer.total(), 17.0);
    }

    #[test]
    fn test_rejected_commit_keeps_cart() {
        let mut composer = composer();
        composer.apply(Action::SelectCategory("main".to_string())).unwrap();
        composer.apply(Action::SelectItem("Stew".to_string())).unwrap();
        composer.apply(Action::SetMix(true)).unwrap();
        composer.apply(Action::SelectSize("Med".to_string())).unwrap();

        assert_eq!(composer.add_to_order(), Err(Rejection::MissingSecondMain));
        assert!(composer.lines().is_empty());
        assert_eq!(composer.draft().size.as_deref(), Some("Med"));
    }

    #[test]
    fn test_no_delivery_fee_without_delivery_service() {
        let mut composer = composer();
        add_juice(&mut composer);
        composer.restaurant.has_delivery = false;
        composer.customer_mut().delivery_option = DeliveryOption::Delivery;

        assert_eq!(composer.delivery_fee(), None);
        assert_eq!(composer.total(), 2.5);
    }

    #[test]
    fn test_remove_from_order() {
        let mut composer = composer();
        add_mix(&mut composer);
        add_juice(&mut composer);

        assert_eq!(composer.remove_from_order(5), None);
        let removed = composer.remove_from_order(0).unwrap();
        assert_eq!(removed.item.name, "Stew");
        assert_eq!(composer.lines().len(), 1);
        assert_eq!(composer.lines()[0].item.name, "Juice");
    }

    #[test]
    fn test_summary() {
        let mut composer = composer();
        add_mix(&mut composer);
        add(
            &mut composer,
            vec![
                Action::SelectCategory("main".to_string()),
                Action::SelectItem("Stew".to_string()),
                Action::SelectSize("Sml".to_string()),
                Action::SelectSide("Rice".to_string()),
                Action::SetSpecial {
                    target: crate::order::Target::Primary,
                    special: "Egg".to_string(),
                    checked: true,
                },
            ],
        );
        add_juice(&mut composer);
        composer.customer_mut().delivery_option = DeliveryOption::Delivery;

        let expected = "\
Order #1 (Mix):
Item: Stew
Second Item: Curry
Size: Med
Price: $12.00

Order #2:
Item: Stew
Size: Sml
Side: Rice
Specials: Egg
Price: $8.00

Order #3:
Item: Juice
Price: $2.50

Delivery Fee: $5.00
Total: $27.50";
        assert_eq!(composer.build_order_summary(), expected);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(composer().build_order_summary(), "Total: $0.00");
    }

    #[test]
    fn test_send_preconditions() {
        let mut composer = composer();
        let mut handoff = RecordingHandoff::default();

        let err = composer.send_order(&mut handoff).unwrap_err();
        assert!(matches!(err, Error::Rejected(Rejection::EmptyOrder)));

        add_juice(&mut composer);
        let err = composer.send_order(&mut handoff).unwrap_err();
        assert!(matches!(err, Error::Rejected(Rejection::MissingName)));

        composer.customer_mut().name = "Ada".to_string();
        let err = composer.send_order(&mut handoff).unwrap_err();
        assert!(matches!(err, Error::Rejected(Rejection::MissingPickupTime)));

        composer.customer_mut().delivery_option = DeliveryOption::Delivery;
        composer.customer_mut().pickup_time = "12:30".to_string();
        let err = composer.send_order(&mut handoff).unwrap_err();
        assert!(matches!(err, Error::Rejected(Rejection::MissingAddress)));

        assert!(handoff.links.is_empty());
        assert_eq!(composer.lines().len(), 1);
    }

    #[test]
    fn test_send_order_hands_off_and_clears() {
        let mut composer = composer();
        let mut handoff = RecordingHandoff::default();
        add_juice(&mut composer);
        composer.customer_mut().name = "Ada".to_string();
        composer.customer_mut().pickup_time = "12:30".to_string();

        let link = composer.send_order(&mut handoff).unwrap();

        assert_eq!(handoff.links, vec![link.clone()]);
        assert!(composer.lines().is_empty());
        assert_eq!(link.path(), "/15550100");

        let text = link
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(text.starts_with(
            "Hello Auntie's Kitchen i would like to place an order for:\nOrder #1:"
        ));
        assert!(text.ends_with("Total: $2.50\nName: Ada\nPickup Time: 12:30"));
    }

    #[test]
    fn test_delivery_option_parse() {
        assert_eq!("Delivery".parse::<DeliveryOption>(), Ok(DeliveryOption::Delivery));
        assert_eq!("pickup".parse::<DeliveryOption>(), Ok(DeliveryOption::Pickup));
        assert!("drone".parse::<DeliveryOption>().is_err());
    }
}
