use anyhow::{anyhow, Result};
use inquire::{Confirm, CustomType, Text};

use autoshop_core::ops::{NewCar, NewCustomer, NewMechanic, NewServiceRequest};

/// Reads a numeric menu choice, re-prompting until one parses.
pub fn read_choice() -> Result<u32> {
    let choice = CustomType::<u32>::new("Please make your choice:")
        .with_error_message("Your input is invalid!")
        .prompt()?;
    Ok(choice)
}

/// Prompts for the fields of a new customer
pub fn prompt_new_customer() -> Result<NewCustomer> {
    let first_name = Text::new("First name:").prompt()?;
    let last_name = Text::new("Last name:").prompt()?;
    let phone = Text::new("Phone number:").prompt()?;
    let address = Text::new("Address:").prompt()?;

    Ok(NewCustomer {
        first_name,
        last_name,
        phone,
        address,
    })
}

/// Prompts for the fields of a new mechanic
pub fn prompt_new_mechanic() -> Result<NewMechanic> {
    let first_name = Text::new("First name:").prompt()?;
    let last_name = Text::new("Last name:").prompt()?;
    let experience = prompt_number("Years of experience:")?;

    Ok(NewMechanic {
        first_name,
        last_name,
        experience,
    })
}

/// Prompts for the fields of a new car
pub fn prompt_new_car() -> Result<NewCar> {
    let vin = Text::new("VIN:").prompt()?;
    let make = Text::new("Make:").prompt()?;
    let model = Text::new("Model:").prompt()?;
    let year = prompt_number("Year:")?;

    Ok(NewCar {
        vin,
        make,
        model,
        year,
    })
}

/// Prompts for the fields of a new service request. The entry date is not
/// asked for; it is captured from the system clock at submission.
pub fn prompt_new_service_request() -> Result<NewServiceRequest> {
    let customer_id = prompt_number("Customer ID:")?;
    let vin = Text::new("Car VIN:").prompt()?;
    let odometer = prompt_number("Mileage:")?;
    let complaint = Text::new("Complaint:").prompt()?;

    Ok(NewServiceRequest {
        customer_id,
        vin,
        odometer,
        complaint,
    })
}

/// Asks whether the just-added car should be linked to an owning customer.
pub fn confirm_link_owner() -> Result<bool> {
    let link = Confirm::new("Link this car to an owning customer?")
        .with_default(false)
        .prompt()?;
    Ok(link)
}

/// Reads one required integer field. A value that does not parse aborts the
/// surrounding handler; the menu loop continues.
pub fn prompt_number(label: &str) -> Result<i64> {
    let input = Text::new(label).prompt()?;
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| anyhow!("{:?} is not a number", trimmed))
}

/// Reads a free-form comment line
pub fn prompt_comment() -> Result<String> {
    Ok(Text::new("Comments:").prompt()?)
}
