//! Record operations
//!
//! Each creation operation allocates an identifier where the entity needs
//! one, issues a single parameterized insert, then re-queries the new row
//! and returns it as confirmation. The closing workflow validates its
//! references first and reports rejections as [`CloseOutcome`] values so
//! the menu loop can continue.

use anyhow::{Context, Result};
use chrono::Local;

use crate::db::{next_id, Store};
use crate::models::{Car, ClosedRequest, Customer, Mechanic, Ownership, ServiceRequest};

/// Fields collected for a new customer
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
}

/// Fields collected for a new mechanic
#[derive(Debug, Clone)]
pub struct NewMechanic {
    pub first_name: String,
    pub last_name: String,
    pub experience: i64,
}

/// Fields collected for a new car
#[derive(Debug, Clone)]
pub struct NewCar {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i64,
}

/// Fields collected for a new service request. The entry date is captured
/// from the system clock at submission time, not collected.
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub customer_id: i64,
    pub vin: String,
    pub odometer: i64,
    pub complaint: String,
}

/// Fields collected to close a service request
#[derive(Debug, Clone)]
pub struct CloseRequest {
    pub mechanic_id: i64,
    pub request_id: i64,
    pub bill: i64,
    pub comment: String,
}

/// Result of a closing attempt. The rejections are recoverable outcomes,
/// not errors: nothing was written and the caller reports them to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed(ClosedRequest),
    UnknownMechanic(i64),
    UnknownRequest(i64),
    AlreadyClosed(i64),
}

pub fn add_customer(store: &Store, new: &NewCustomer) -> Result<Customer> {
    let id = next_id(store, "customers", "id")?;
    store.execute(
        "INSERT INTO customers (id, fname, lname, phone, address) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, new.first_name, new.last_name, new.phone, new.address],
    )?;
    get_customer(store, id)?.context("inserted customer did not read back")
}

pub fn add_mechanic(store: &Store, new: &NewMechanic) -> Result<Mechanic> {
    let id = next_id(store, "mechanics", "id")?;
    store.execute(
        "INSERT INTO mechanics (id, fname, lname, experience) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, new.first_name, new.last_name, new.experience],
    )?;
    get_mechanic(store, id)?.context("inserted mechanic did not read back")
}

pub fn add_car(store: &Store, new: &NewCar) -> Result<Car> {
    store.execute(
        "INSERT INTO cars (vin, make, model, year) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![new.vin, new.make, new.model, new.year],
    )?;
    get_car(store, &new.vin)?.context("inserted car did not read back")
}

/// Links a customer to a car they own.
pub fn add_ownership(store: &Store, customer_id: i64, vin: &str) -> Result<Ownership> {
    let id = next_id(store, "owns", "ownership_id")?;
    store.execute(
        "INSERT INTO owns (ownership_id, customer_id, car_vin) VALUES (?1, ?2, ?3)",
        rusqlite::params![id, customer_id, vin],
    )?;
    let rows = store.query_rows(
        "SELECT ownership_id, customer_id, car_vin FROM owns WHERE ownership_id = ?1",
        [id],
    )?;
    let row = rows.first().context("inserted ownership did not read back")?;
    Ownership::from_row(row)
}

pub fn open_service_request(store: &Store, new: &NewServiceRequest) -> Result<ServiceRequest> {
    let rid = next_id(store, "service_requests", "rid")?;
    let date = Local::now().date_naive();
    store.execute(
        "INSERT INTO service_requests (rid, customer_id, car_vin, date, odometer, complaint) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            rid,
            new.customer_id,
            new.vin,
            date.to_string(),
            new.odometer,
            new.complaint
        ],
    )?;
    get_service_request(store, rid)?.context("inserted service request did not read back")
}

/// Closes an open service request.
///
/// The gates run in order: the mechanic must exist, the request must exist,
/// and the request must not already be closed. A failed gate writes nothing.
pub fn close_service_request(store: &Store, close: &CloseRequest) -> Result<CloseOutcome> {
    if get_mechanic(store, close.mechanic_id)?.is_none() {
        return Ok(CloseOutcome::UnknownMechanic(close.mechanic_id));
    }
    if get_service_request(store, close.request_id)?.is_none() {
        return Ok(CloseOutcome::UnknownRequest(close.request_id));
    }
    if get_closed_request(store, close.request_id)?.is_some() {
        return Ok(CloseOutcome::AlreadyClosed(close.request_id));
    }

    let date = Local::now().date_naive();
    let wid = next_id(store, "closed_requests", "wid")?;
    store.execute(
        "INSERT INTO closed_requests (wid, rid, mid, date, comment, bill) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            wid,
            close.request_id,
            close.mechanic_id,
            date.to_string(),
            close.comment,
            close.bill
        ],
    )?;

    let closed = get_closed_request(store, close.request_id)?
        .context("inserted closed request did not read back")?;
    Ok(CloseOutcome::Closed(closed))
}

pub fn get_customer(store: &Store, id: i64) -> Result<Option<Customer>> {
    let rows = store.query_rows(
        "SELECT id, fname, lname, phone, address FROM customers WHERE id = ?1",
        [id],
    )?;
    rows.first().map(|row| Customer::from_row(row)).transpose()
}

pub fn get_mechanic(store: &Store, id: i64) -> Result<Option<Mechanic>> {
    let rows = store.query_rows(
        "SELECT id, fname, lname, experience FROM mechanics WHERE id = ?1",
        [id],
    )?;
    rows.first().map(|row| Mechanic::from_row(row)).transpose()
}

pub fn get_car(store: &Store, vin: &str) -> Result<Option<Car>> {
    let rows = store.query_rows(
        "SELECT vin, make, model, year FROM cars WHERE vin = ?1",
        [vin],
    )?;
    rows.first().map(|row| Car::from_row(row)).transpose()
}

pub fn get_service_request(store: &Store, rid: i64) -> Result<Option<ServiceRequest>> {
    let rows = store.query_rows(
        "SELECT rid, customer_id, car_vin, date, odometer, complaint \
         FROM service_requests WHERE rid = ?1",
        [rid],
    )?;
    rows.first()
        .map(|row| ServiceRequest::from_row(row))
        .transpose()
}

/// Looks up the closing record for a service request, if any.
pub fn get_closed_request(store: &Store, rid: i64) -> Result<Option<ClosedRequest>> {
    let rows = store.query_rows(
        "SELECT wid, rid, mid, date, comment, bill FROM closed_requests WHERE rid = ?1",
        [rid],
    )?;
    rows.first()
        .map(|row| ClosedRequest::from_row(row))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn open_temp() -> (NamedTempFile, Store) {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let store = Store::open(temp_file.path()).unwrap();
        (temp_file, store)
    }

    fn jane() -> NewCustomer {
        NewCustomer {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: "555-1212".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    fn seed_open_request(store: &Store) -> ServiceRequest {
        let customer = add_customer(store, &jane()).unwrap();
        let car = add_car(
            store,
            &NewCar {
                vin: "1FAFP40634F17282".to_string(),
                make: "Ford".to_string(),
                model: "Mustang".to_string(),
                year: 2004,
            },
        )
        .unwrap();
        open_service_request(
            store,
            &NewServiceRequest {
                customer_id: customer.id,
                vin: car.vin,
                odometer: 42_000,
                complaint: "brakes squeal".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_first_customer_gets_id_one() {
        let (_file, store) = open_temp();
        let customer = add_customer(&store, &jane()).unwrap();
        assert_eq!(customer.id, 1);

        let fetched = get_customer(&store, 1).unwrap().unwrap();
        assert_eq!(fetched, customer);
        assert_eq!(fetched.first_name, "Jane");
        assert_eq!(fetched.address, "1 Main St");
    }

    #[test]
    fn test_customer_ids_are_sequential() {
        let (_file, store) = open_temp();
        add_customer(&store, &jane()).unwrap();
        let second = add_customer(&store, &jane()).unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_service_request_lands_in_its_own_table() {
        let (_file, store) = open_temp();
        let request = seed_open_request(&store);
        assert_eq!(request.rid, 1);
        assert_eq!(request.date, Local::now().date_naive());

        // one customer row (Jane), one service request row
        let customers = store.query_rows("SELECT id FROM customers", []).unwrap();
        let requests = store
            .query_rows("SELECT rid FROM service_requests", [])
            .unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn test_add_ownership_links_customer_and_car() {
        let (_file, store) = open_temp();
        let request = seed_open_request(&store);
        let ownership = add_ownership(&store, request.customer_id, &request.vin).unwrap();
        assert_eq!(ownership.id, 1);
        assert_eq!(ownership.customer_id, request.customer_id);
        assert_eq!(ownership.vin, request.vin);
    }

    #[test]
    fn test_close_rejects_unknown_mechanic_without_writing() {
        let (_file, store) = open_temp();
        let request = seed_open_request(&store);

        let outcome = close_service_request(
            &store,
            &CloseRequest {
                mechanic_id: 99,
                request_id: request.rid,
                bill: 80,
                comment: "brake fix".to_string(),
            },
        )
        .unwrap();
        assert_eq!(outcome, CloseOutcome::UnknownMechanic(99));

        let closed = store.query_rows("SELECT wid FROM closed_requests", []).unwrap();
        assert!(closed.is_empty());
    }

    #[test]
    fn test_close_rejects_unknown_request_without_writing() {
        let (_file, store) = open_temp();
        seed_open_request(&store);
        let mechanic = add_mechanic(
            &store,
            &NewMechanic {
                first_name: "Ann".to_string(),
                last_name: "Gruber".to_string(),
                experience: 12,
            },
        )
        .unwrap();

        let outcome = close_service_request(
            &store,
            &CloseRequest {
                mechanic_id: mechanic.id,
                request_id: 404,
                bill: 80,
                comment: String::new(),
            },
        )
        .unwrap();
        assert_eq!(outcome, CloseOutcome::UnknownRequest(404));

        let closed = store.query_rows("SELECT wid FROM closed_requests", []).unwrap();
        assert!(closed.is_empty());
    }

    #[test]
    fn test_close_then_close_again_is_rejected() {
        let (_file, store) = open_temp();
        let request = seed_open_request(&store);
        let mechanic = add_mechanic(
            &store,
            &NewMechanic {
                first_name: "Ann".to_string(),
                last_name: "Gruber".to_string(),
                experience: 12,
            },
        )
        .unwrap();

        let close = CloseRequest {
            mechanic_id: mechanic.id,
            request_id: request.rid,
            bill: 80,
            comment: "brake fix".to_string(),
        };

        let outcome = close_service_request(&store, &close).unwrap();
        match outcome {
            CloseOutcome::Closed(closed) => {
                assert_eq!(closed.wid, 1);
                assert_eq!(closed.rid, request.rid);
                assert_eq!(closed.mechanic_id, mechanic.id);
                assert_eq!(closed.bill, 80);
                assert_eq!(closed.comment, "brake fix");
            }
            other => panic!("expected Closed, got {:?}", other),
        }

        let again = close_service_request(&store, &close).unwrap();
        assert_eq!(again, CloseOutcome::AlreadyClosed(request.rid));

        let closed_rows = store.query_rows("SELECT wid FROM closed_requests", []).unwrap();
        assert_eq!(closed_rows.len(), 1);
    }
}
