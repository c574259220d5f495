//! Command line surface of the client.
//!
//! Parsing is done by clap. The few bits of logic that turn arguments into
//! order actions live here too so they can be tested without a terminal.
use crate::order::{Action, OrderComposer, OrderLine, Rejection, Target};
use crate::period::Period;
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "restaurant-link")]
#[command(about = "Browse partner restaurants and send orders over WhatsApp")]
#[command(
    after_help = "Environment:\n  RESTAURANT_LINK_SHEET_URL      Restaurant directory CSV\n  RESTAURANT_LINK_DB             Local storage file\n  RESTAURANT_LINK_CACHE_MINUTES  Cache freshness window\n  RESTAURANT_LINK_RETRIES        Extra fetch attempts\n  RESTAURANT_LINK_TIMEOUT_SECS   HTTP timeout\n  RUST_LOG                       Log filter"
)]
pub struct Cli {
    /// Local storage file, overrides RESTAURANT_LINK_DB
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the active restaurants
    Restaurants {
        /// Ignore the cached list
        #[arg(long)]
        refresh: bool,
    },
    /// Show a restaurant's details
    Profile { id: String },
    /// Show a restaurant's menu
    Menu {
        id: String,
        #[arg(long, value_enum, default_value_t = PeriodArg::Now)]
        period: PeriodArg,
        /// Ignore the cached menu
        #[arg(long)]
        refresh: bool,
    },
    /// Manage the cart of a restaurant
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    /// Set the customer details
    Customer(CustomerArgs),
    /// Send the cart to the restaurant
    Send { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Add a line to the cart
    Add(CartAddArgs),
    /// Show the cart and its total
    Show { id: String },
    /// Remove a line, numbered as shown by `cart show`
    Remove { id: String, index: usize },
    /// Empty the cart
    Clear { id: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CartAddArgs {
    pub id: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub item: String,
    /// Needed unless the item comes in a single size
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long = "special")]
    pub specials: Vec<String>,
    #[arg(long)]
    pub side: Option<String>,
    #[arg(long)]
    pub veg: Option<String>,
    #[arg(long)]
    pub gravy: Option<String>,
    /// Make a mix meal with this second main dish
    #[arg(long)]
    pub mix_with: Option<String>,
    #[arg(long = "mix-special", requires = "mix_with")]
    pub mix_specials: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CustomerArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Pick the order up at this time
    #[arg(long, conflicts_with = "delivery_address")]
    pub pickup_time: Option<String>,
    /// Have the order delivered here
    #[arg(long)]
    pub delivery_address: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodArg {
    All,
    Breakfast,
    Lunch,
    /// Whatever the restaurant is serving right now
    Now,
}

impl PeriodArg {
    /// The period to filter on, `current` deciding for `now`
    pub fn resolve<C>(self, current: C) -> Period
    where
        C: FnOnce() -> Period,
    {
        match self {
            PeriodArg::All => Period::All,
            PeriodArg::Breakfast => Period::Breakfast,
            PeriodArg::Lunch => Period::Lunch,
            PeriodArg::Now => current(),
        }
    }
}

/// Check a pickup time looks like a clock time, either `13:30` or `1:30 PM`
pub fn validate_pickup_time(time: &str) -> Result<NaiveTime, String> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&time.to_uppercase(), "%I:%M %p"))
        .map_err(|_| format!("'{}' is not a time, try 13:30 or 1:30 PM", time))
}

/// Drive the draft line with the given arguments and commit it
pub fn add_line<'a>(
    composer: &'a mut OrderComposer,
    args: &CartAddArgs,
) -> Result<&'a OrderLine, Rejection> {
    composer.apply(Action::SelectCategory(args.category.clone()))?;
    composer.apply(Action::SelectItem(args.item.clone()))?;
    if let Some(second) = &args.mix_with {
        composer.apply(Action::SetMix(true))?;
        composer.apply(Action::SelectSecondMain(second.clone()))?;
    }

    let size = match &args.size {
        Some(size) => Some(size.clone()),
        None => match composer.draft().size_options().as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        },
    };
    if let Some(size) = size {
        composer.apply(Action::SelectSize(size))?;
    }

    for special in &args.specials {
        composer.apply(Action::SetSpecial {
            target: Target::Primary,
            special: special.clone(),
            checked: true,
        })?;
    }
    for special in &args.mix_specials {
        composer.apply(Action::SetSpecial {
            target: Target::SecondMain,
            special: special.clone(),
            checked: true,
        })?;
    }
    if let Some(side) = &args.side {
        composer.apply(Action::SelectSide(side.clone()))?;
    }
    if let Some(veg) = &args.veg {
        composer.apply(Action::SelectVeg(veg.clone()))?;
    }
    if let Some(gravy) = &args.gravy {
        composer.apply(Action::SelectGravey(gravy.clone()))?;
    }

    composer.add_to_order()
}
