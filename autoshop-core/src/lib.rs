//! Core library for the autoshop repair-shop records manager.
//!
//! The store gateway wraps the single SQLite connection; `ops` holds the
//! record-creation operations and the service-closing workflow; `reports`
//! holds the fixed analytical queries. The CLI crate owns all terminal
//! interaction.

pub mod db;
pub mod error;
pub mod models;
pub mod ops;
pub mod reports;

// Re-export commonly used types
pub use db::{next_id, Store};
pub use error::StoreError;
pub use models::{Car, ClosedRequest, Customer, Mechanic, Ownership, ServiceRequest};
pub use ops::{
    add_car, add_customer, add_mechanic, add_ownership, close_service_request, get_car,
    get_closed_request, get_customer, get_mechanic, get_service_request, open_service_request,
    CloseOutcome, CloseRequest, NewCar, NewCustomer, NewMechanic, NewServiceRequest,
};
pub use reports::{
    cars_before_1995_with_low_mileage, customers_by_total_bill, customers_with_bill_under_100,
    customers_with_more_than_20_cars, most_serviced_cars, CarSummary, CustomerBill,
    CustomerCarCount, CustomerTotal, ServicedCar,
};
