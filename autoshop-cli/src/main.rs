mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoshop_core::models::{Car, ClosedRequest, Customer, Mechanic, ServiceRequest};
use autoshop_core::ops::{self, CloseOutcome, CloseRequest};
use autoshop_core::reports;
use autoshop_core::Store;

/// Menu-driven records manager for a vehicle repair shop
#[derive(Parser)]
#[command(name = "autoshop")]
struct Cli {
    /// Path to the shop database (created on first use)
    #[arg(long, env = "AUTOSHOP_DB")]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr and stay silent unless RUST_LOG asks,
    // keeping the interactive menu clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };

    let store = Store::open(&path)
        .with_context(|| format!("unable to open the shop database at {}", path.display()))?;
    println!("Using shop database {}", path.display().to_string().cyan());

    loop {
        print_menu();
        let choice = prompts::read_choice()?;
        let result = match choice {
            1 => add_customer(&store),
            2 => add_mechanic(&store),
            3 => add_car(&store),
            4 => insert_service_request(&store),
            5 => close_service_request(&store),
            6 => list_customers_with_bill_under_100(&store),
            7 => list_customers_with_more_than_20_cars(&store),
            8 => list_cars_before_1995_with_low_mileage(&store),
            9 => list_most_serviced_cars(&store),
            10 => list_customers_by_total_bill(&store),
            11 => break,
            other => {
                println!("{}", format!("There is no menu entry {}", other).yellow());
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "handler failed");
            eprintln!("{} {:#}", "Error:".red(), e);
        }
    }

    store.close();
    println!("Bye!");
    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("cannot determine the user data directory")?;
    Ok(base.join("autoshop").join("shop.db"))
}

fn print_menu() {
    println!();
    println!("{}", "MAIN MENU".bold());
    println!("---------");
    println!(" 1. Add customer");
    println!(" 2. Add mechanic");
    println!(" 3. Add car");
    println!(" 4. Insert service request");
    println!(" 5. Close service request");
    println!(" 6. Customers with a bill under 100");
    println!(" 7. Customers owning more than 20 cars");
    println!(" 8. Cars made before 1995 with at most 50000 miles");
    println!(" 9. The k most serviced cars");
    println!("10. Customers by total bill, highest first");
    println!("11. Exit");
}

fn add_customer(store: &Store) -> Result<()> {
    let new = prompts::prompt_new_customer()?;
    let customer = ops::add_customer(store, &new)?;
    print_customer(&customer);
    Ok(())
}

fn add_mechanic(store: &Store) -> Result<()> {
    let new = prompts::prompt_new_mechanic()?;
    let mechanic = ops::add_mechanic(store, &new)?;
    print_mechanic(&mechanic);
    Ok(())
}

fn add_car(store: &Store) -> Result<()> {
    let new = prompts::prompt_new_car()?;
    let car = ops::add_car(store, &new)?;
    print_car(&car);

    // The ownership link is what report 7 counts; offer it right away
    if prompts::confirm_link_owner()? {
        let customer_id = prompts::prompt_number("Owning customer ID:")?;
        let ownership = ops::add_ownership(store, customer_id, &car.vin)?;
        println!(
            "{}",
            format!(
                "Linked customer {} to car {}",
                ownership.customer_id, ownership.vin
            )
            .green()
        );
    }
    Ok(())
}

fn insert_service_request(store: &Store) -> Result<()> {
    let new = prompts::prompt_new_service_request()?;
    let request = ops::open_service_request(store, &new)?;
    print_service_request(&request);
    Ok(())
}

fn close_service_request(store: &Store) -> Result<()> {
    let mechanic_id = prompts::prompt_number("Mechanic ID:")?;
    if ops::get_mechanic(store, mechanic_id)?.is_none() {
        println!("{}", "Invalid mechanic id".yellow());
        return Ok(());
    }

    let request_id = prompts::prompt_number("Service request ID:")?;
    if ops::get_service_request(store, request_id)?.is_none() {
        println!("{}", "Service request does not exist".yellow());
        return Ok(());
    }
    if ops::get_closed_request(store, request_id)?.is_some() {
        println!(
            "{}",
            format!("Service request {} has already been closed", request_id).yellow()
        );
        return Ok(());
    }

    let bill = prompts::prompt_number("Bill amount:")?;
    let comment = prompts::prompt_comment()?;

    let outcome = ops::close_service_request(
        store,
        &CloseRequest {
            mechanic_id,
            request_id,
            bill,
            comment,
        },
    )?;

    match outcome {
        CloseOutcome::Closed(closed) => print_closed_request(&closed),
        CloseOutcome::UnknownMechanic(_) => println!("{}", "Invalid mechanic id".yellow()),
        CloseOutcome::UnknownRequest(_) => {
            println!("{}", "Service request does not exist".yellow())
        }
        CloseOutcome::AlreadyClosed(rid) => println!(
            "{}",
            format!("Service request {} has already been closed", rid).yellow()
        ),
    }
    Ok(())
}

fn list_customers_with_bill_under_100(store: &Store) -> Result<()> {
    let rows = reports::customers_with_bill_under_100(store)?;
    println!("Total customers with a bill under 100: {}", rows.len());
    for row in &rows {
        println!();
        println!("{}: {} {}", "Name".blue(), row.first_name, row.last_name);
        println!("{}: {}", "Bill".blue(), row.bill);
    }
    Ok(())
}

fn list_customers_with_more_than_20_cars(store: &Store) -> Result<()> {
    let rows = reports::customers_with_more_than_20_cars(store)?;
    println!("Total customers owning more than 20 cars: {}", rows.len());
    for row in &rows {
        println!();
        println!("{}: {} {}", "Name".blue(), row.first_name, row.last_name);
        println!("{}: {}", "Cars".blue(), row.cars);
    }
    Ok(())
}

fn list_cars_before_1995_with_low_mileage(store: &Store) -> Result<()> {
    let rows = reports::cars_before_1995_with_low_mileage(store)?;
    println!(
        "Total cars made before 1995 with at most 50000 miles: {}",
        rows.len()
    );
    for row in &rows {
        println!(
            "{}: {} {}: {} {}: {}",
            "Make".blue(),
            row.make,
            "Model".blue(),
            row.model,
            "Year".blue(),
            row.year
        );
    }
    Ok(())
}

fn list_most_serviced_cars(store: &Store) -> Result<()> {
    let k = prompts::prompt_number("How many cars (k > 0):")?;
    let rows = reports::most_serviced_cars(store, k)?;
    for (position, row) in rows.iter().enumerate() {
        println!();
        println!("{}: {}", "Pos".blue(), position + 1);
        println!("{}: {}", "Make".blue(), row.make);
        println!("{}: {}", "Model".blue(), row.model);
        println!("{}: {}", "Year".blue(), row.year);
        println!("{}: {}", "Services".blue(), row.services);
    }
    Ok(())
}

fn list_customers_by_total_bill(store: &Store) -> Result<()> {
    let rows = reports::customers_by_total_bill(store)?;
    for row in &rows {
        println!();
        println!("{}: {} {}", "Name".blue(), row.first_name, row.last_name);
        println!("{}: {}", "Total bill".blue(), row.total);
    }
    Ok(())
}

fn print_customer(customer: &Customer) {
    println!("{}", "Customer added".green());
    println!("  ID: {}", customer.id);
    println!("  Name: {} {}", customer.first_name, customer.last_name);
    println!("  Phone: {}", customer.phone);
    println!("  Address: {}", customer.address);
}

fn print_mechanic(mechanic: &Mechanic) {
    println!("{}", "Mechanic added".green());
    println!("  ID: {}", mechanic.id);
    println!("  Name: {} {}", mechanic.first_name, mechanic.last_name);
    println!("  Experience: {} years", mechanic.experience);
}

fn print_car(car: &Car) {
    println!("{}", "Car added".green());
    println!("  VIN: {}", car.vin);
    println!("  Make: {}", car.make);
    println!("  Model: {}", car.model);
    println!("  Year: {}", car.year);
}

fn print_service_request(request: &ServiceRequest) {
    println!("{}", "Service request opened".green());
    println!("  Request ID: {}", request.rid);
    println!("  Customer ID: {}", request.customer_id);
    println!("  Car VIN: {}", request.vin);
    println!("  Date: {}", request.date);
    println!("  Odometer: {}", request.odometer);
    println!("  Complaint: {}", request.complaint);
}

fn print_closed_request(closed: &ClosedRequest) {
    println!("{}", "Service request closed".green());
    println!("  Closing ID: {}", closed.wid);
    println!("  Request ID: {}", closed.rid);
    println!("  Mechanic ID: {}", closed.mechanic_id);
    println!("  Date: {}", closed.date);
    println!("  Bill: {}", closed.bill);
    println!("  Comment: {}", closed.comment);
}
