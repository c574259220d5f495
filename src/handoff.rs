//! Handing a finished order to the restaurant over WhatsApp.
use crate::api::Restaurant;
use crate::errors::{Error, Result};
use crate::order::Fulfilment;
use reqwest::Url;

pub const WHATSAPP_BASE: &str = "https://wa.me";

/// Where a finished order link goes. The real client prints it for the
/// customer to open.
pub trait Handoff {
    fn hand_off(&mut self, link: &Url) -> Result<()>;
}

impl<H: Handoff + ?Sized> Handoff for &mut H {
    fn hand_off(&mut self, link: &Url) -> Result<()> {
        (**self).hand_off(link)
    }
}

/// Text the restaurant receives
pub fn order_message(
    restaurant: &Restaurant,
    summary: &str,
    customer_name: &str,
    fulfilment: &Fulfilment,
) -> String {
    let detail = match fulfilment {
        Fulfilment::Delivery { address } => format!("Delivery Address: {}", address),
        Fulfilment::Pickup { time } => format!("Pickup Time: {}", time),
    };
    format!(
        "Hello {} i would like to place an order for:\n{}\nName: {}\n{}",
        restaurant.name, summary, customer_name, detail
    )
}

/// Deep link opening a chat with `number`, prefilled with `message`.
///
/// Anything but digits is dropped from the number, so `+1 (555) 0100`
/// works as well as `15550100`.
pub fn whatsapp_link(number: &str, message: &str) -> Result<Url> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(Error::InvalidLink(format!(
            "'{}' is not a WhatsApp number",
            number
        )));
    }

    let mut link = Url::parse(&format!("{}/{}", WHATSAPP_BASE, digits))
        .map_err(|err| Error::InvalidLink(err.to_string()))?;
    link.query_pairs_mut().append_pair("text", message);
    Ok(link)
}

pub mod mock {
    use super::*;

    /// Keeps every link it is given
    #[derive(Default, Debug)]
    pub struct RecordingHandoff {
        pub links: Vec<Url>,
    }

    impl Handoff for RecordingHandoff {
        fn hand_off(&mut self, link: &Url) -> Result<()> {
            self.links.push(link.clone());
            Ok(())
        }
    }
}
