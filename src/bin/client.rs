use clap::Parser;
use common::api::{size_label, Menu, Restaurant};
use common::catalog::Catalog;
use common::cli::*;
use common::config::Config;
use common::errors::{Error, Result};
use common::handoff::Handoff;
use common::http::{Fetcher, HttpFetcher, Retrying};
use common::order::{DeliveryOption, OrderComposer, OrderMenu};
use common::period::{current_period, filter_menu_by_period, format_time};
use common::session;
use common::storage::sqlite::SQLiteStorage;
use common::storage::Storage;
use reqwest::Url;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Pause before the first retry of a failed fetch
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Prints the link for the customer to open
struct PrintHandoff;

impl Handoff for PrintHandoff {
    fn hand_off(&mut self, link: &Url) -> Result<()> {
        println!("Open this link to send your order:\n{}", link);
        Ok(())
    }
}

fn print_restaurant(restaurant: &Restaurant) {
    println!("{} ({})", restaurant.name, restaurant.id);
    println!("  Address: {}", restaurant.address);
    println!("  Phone: {}", restaurant.phone_number);
    if restaurant.has_delivery {
        println!("  Delivery: ${:.2}", restaurant.delivery_price);
    } else {
        println!("  Pickup only");
    }
}

fn print_menu(menu: &Menu) {
    if menu.is_empty() {
        println!("Nothing on the menu right now");
        return;
    }
    for section in menu.sections() {
        println!("== {} ==", section.name);
        for item in &section.items {
            let prices = item
                .prices
                .iter()
                .map(|(size, price)| format!("{} ${:.2}", size_label(size), price))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {} [{}] {}", item.name, item.category, prices);
            if !item.description.is_empty() {
                println!("    {}", item.description);
            }
            if !item.specials.is_empty() {
                println!("    Specials: {}", item.specials.join(", "));
            }
        }
    }
}

/// The composer of a restaurant with its saved cart, offering what is served
/// right now
fn open_composer<F: Fetcher, S: Storage>(
    catalog: &mut Catalog<F, S>,
    id: &str,
) -> Result<OrderComposer> {
    let restaurant = catalog.restaurant(id)?;
    let menu = catalog.fetch_menu_items(&restaurant.menu_sheet_url)?;
    let period = current_period(&restaurant, chrono::Local::now().time());
    let menu = filter_menu_by_period(&menu, period.as_str());

    let mut composer = OrderComposer::new(restaurant, OrderMenu::from_menu(&menu));
    session::restore(catalog.storage(), &mut composer)?;
    Ok(composer)
}

fn run_cart<F: Fetcher, S: Storage>(
    catalog: &mut Catalog<F, S>,
    command: CartCommand,
) -> Result<()> {
    match command {
        CartCommand::Add(args) => {
            let mut composer = open_composer(catalog, &args.id)?;
            let line = add_line(&mut composer, &args)?;
            println!("Added {} ({})", line.item.name, size_label(&line.size));
            println!("Total: ${:.2}", composer.total());
            session::save(catalog.storage_mut(), &composer)?;
        }
        CartCommand::Show { id } => {
            let composer = open_composer(catalog, &id)?;
            println!("{}", composer.build_order_summary());
        }
        CartCommand::Remove { id, index } => {
            let mut composer = open_composer(catalog, &id)?;
            let removed = index
                .checked_sub(1)
                .and_then(|i| composer.remove_from_order(i))
                .ok_or_else(|| Error::NotFound(format!("No order #{} in the cart", index)))?;
            println!("Removed {}", removed.item.name);
            session::save(catalog.storage_mut(), &composer)?;
        }
        CartCommand::Clear { id } => {
            let mut composer = open_composer(catalog, &id)?;
            composer.clear();
            session::save(catalog.storage_mut(), &composer)?;
            println!("Cart cleared");
        }
    }
    Ok(())
}

fn run_customer<S: Storage>(storage: &mut S, args: CustomerArgs) -> Result<()> {
    let mut customer = session::load_customer(storage)?;
    if let Some(name) = args.name {
        customer.name = name;
    }
    if let Some(time) = args.pickup_time {
        validate_pickup_time(&time).map_err(|reason| Error::Config {
            key: "pickup time".to_string(),
            reason,
        })?;
        customer.delivery_option = DeliveryOption::Pickup;
        customer.pickup_time = time;
    }
    if let Some(address) = args.delivery_address {
        customer.delivery_option = DeliveryOption::Delivery;
        customer.delivery_address = address;
    }
    session::save_customer(storage, &customer)?;

    println!("Name: {}", customer.name);
    match customer.delivery_option {
        DeliveryOption::Delivery => println!("Delivery Address: {}", customer.delivery_address),
        DeliveryOption::Pickup => println!("Pickup Time: {}", customer.pickup_time),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db_path = cli.db.unwrap_or(config.db_path);
    info!(db = %db_path.display(), "Opening local storage");

    let storage = SQLiteStorage::open(&db_path)?;
    let fetcher = Retrying::new(
        HttpFetcher::new(config.timeout)?,
        config.fetch_retries,
        RETRY_DELAY,
    );
    let mut catalog = Catalog::new(fetcher, storage, &config.sheet_url, config.cache_freshness);

    match cli.command {
        Commands::Restaurants { refresh } => {
            let restaurants = if refresh {
                catalog.refresh_restaurants()?
            } else {
                catalog.fetch_restaurants()?
            };
            if restaurants.is_empty() {
                println!("No restaurants available");
            }
            for restaurant in &restaurants {
                print_restaurant(restaurant);
            }
        }
        Commands::Profile { id } => {
            let restaurant = catalog.restaurant(&id)?;
            print_restaurant(&restaurant);
            println!("  Hours: {}", restaurant.opening_hours);
            println!(
                "  Breakfast: {} - {}",
                format_time(&restaurant.breakfast_start),
                format_time(&restaurant.breakfast_end)
            );
            println!(
                "  Lunch: {} - {}",
                format_time(&restaurant.lunch_start),
                format_time(&restaurant.lunch_end)
            );
            if !restaurant.business_bio.is_empty() {
                println!("\n{}", restaurant.business_bio);
            }
        }
        Commands::Menu {
            id,
            period,
            refresh,
        } => {
            let restaurant = catalog.restaurant(&id)?;
            let menu = if refresh {
                catalog.refresh_menu(&restaurant.menu_sheet_url)?
            } else {
                catalog.fetch_menu_items(&restaurant.menu_sheet_url)?
            };
            let period =
                period.resolve(|| current_period(&restaurant, chrono::Local::now().time()));
            println!("{} menu ({})", restaurant.name, period);
            print_menu(&filter_menu_by_period(&menu, period.as_str()));
        }
        Commands::Cart { command } => run_cart(&mut catalog, command)?,
        Commands::Customer(args) => run_customer(catalog.storage_mut(), args)?,
        Commands::Send { id } => {
            let mut composer = open_composer(&mut catalog, &id)?;
            composer.send_order(&mut PrintHandoff)?;
            session::save(catalog.storage_mut(), &composer)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Rejected(rejection)) => {
            eprintln!("{}: {}", rejection.title(), rejection);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
