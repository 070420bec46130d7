//! Fixed analytical reports
//!
//! Five queries joining across the shop's records. Each returns typed rows
//! parsed from the gateway's textual result; the CLI handles formatting.
//! Only the most-serviced-cars report takes a parameter.

use anyhow::{ensure, Context, Result};

use crate::db::Store;
use crate::models;

/// A customer name next to one closed-request bill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerBill {
    pub first_name: String,
    pub last_name: String,
    pub bill: i64,
}

/// A customer name next to how many cars they own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerCarCount {
    pub first_name: String,
    pub last_name: String,
    pub cars: i64,
}

/// Make, model, year of a car
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarSummary {
    pub make: String,
    pub model: String,
    pub year: i64,
}

/// A car next to how many service requests reference it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicedCar {
    pub make: String,
    pub model: String,
    pub year: i64,
    pub services: i64,
}

/// A customer name next to the sum of their closed-request bills
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerTotal {
    pub first_name: String,
    pub last_name: String,
    pub total: i64,
}

/// Customers billed less than 100 on any single closed request, ordered by
/// first name ascending.
pub fn customers_with_bill_under_100(store: &Store) -> Result<Vec<CustomerBill>> {
    let rows = store.query_rows(
        "SELECT c.fname, c.lname, cr.bill \
         FROM customers c \
         JOIN service_requests sr ON c.id = sr.customer_id \
         JOIN closed_requests cr ON sr.rid = cr.rid \
         WHERE cr.bill < 100 \
         ORDER BY c.fname",
        [],
    )?;
    rows.iter()
        .map(|row| {
            Ok(CustomerBill {
                first_name: cell(row, 0)?,
                last_name: cell(row, 1)?,
                bill: int_cell(row, 2)?,
            })
        })
        .collect()
}

/// Customers owning strictly more than 20 cars.
pub fn customers_with_more_than_20_cars(store: &Store) -> Result<Vec<CustomerCarCount>> {
    let rows = store.query_rows(
        "SELECT c.fname, c.lname, COUNT(*) \
         FROM customers c \
         JOIN owns o ON c.id = o.customer_id \
         JOIN cars ON o.car_vin = cars.vin \
         GROUP BY c.id \
         HAVING COUNT(*) > 20",
        [],
    )?;
    rows.iter()
        .map(|row| {
            Ok(CustomerCarCount {
                first_name: cell(row, 0)?,
                last_name: cell(row, 1)?,
                cars: int_cell(row, 2)?,
            })
        })
        .collect()
}

/// Distinct cars made before 1995 with a service request at or under
/// 50000 miles, ordered by year.
pub fn cars_before_1995_with_low_mileage(store: &Store) -> Result<Vec<CarSummary>> {
    let rows = store.query_rows(
        "SELECT DISTINCT cars.make, cars.model, cars.year \
         FROM cars \
         JOIN service_requests sr ON cars.vin = sr.car_vin \
         WHERE cars.year < 1995 AND sr.odometer <= 50000 \
         ORDER BY cars.year",
        [],
    )?;
    rows.iter()
        .map(|row| {
            Ok(CarSummary {
                make: cell(row, 0)?,
                model: cell(row, 1)?,
                year: int_cell(row, 2)?,
            })
        })
        .collect()
}

/// The k cars with the most service requests, descending, ties broken by
/// VIN ascending. Rejects k < 1 before running anything.
pub fn most_serviced_cars(store: &Store, k: i64) -> Result<Vec<ServicedCar>> {
    ensure!(k >= 1, "k must be a positive number, got {}", k);

    let rows = store.query_rows(
        "SELECT cars.make, cars.model, cars.year, COUNT(*) \
         FROM cars \
         JOIN service_requests sr ON cars.vin = sr.car_vin \
         GROUP BY cars.vin \
         ORDER BY COUNT(*) DESC, cars.vin ASC \
         LIMIT ?1",
        [k],
    )?;
    rows.iter()
        .map(|row| {
            Ok(ServicedCar {
                make: cell(row, 0)?,
                model: cell(row, 1)?,
                year: int_cell(row, 2)?,
                services: int_cell(row, 3)?,
            })
        })
        .collect()
}

/// Customers ranked by the sum of all their closed-request bills,
/// descending.
pub fn customers_by_total_bill(store: &Store) -> Result<Vec<CustomerTotal>> {
    let rows = store.query_rows(
        "SELECT c.fname, c.lname, SUM(cr.bill) \
         FROM customers c \
         JOIN service_requests sr ON c.id = sr.customer_id \
         JOIN closed_requests cr ON sr.rid = cr.rid \
         GROUP BY c.id \
         ORDER BY SUM(cr.bill) DESC",
        [],
    )?;
    rows.iter()
        .map(|row| {
            Ok(CustomerTotal {
                first_name: cell(row, 0)?,
                last_name: cell(row, 1)?,
                total: int_cell(row, 2)?,
            })
        })
        .collect()
}

fn cell(row: &[String], index: usize) -> Result<String> {
    row.get(index)
        .cloned()
        .with_context(|| format!("report row is missing column {}", index))
}

fn int_cell(row: &[String], index: usize) -> Result<i64> {
    let text = cell(row, index)?;
    text.parse::<i64>()
        .with_context(|| format!("report cell {:?} is not an integer", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{
        add_car, add_customer, add_mechanic, add_ownership, close_service_request,
        open_service_request, CloseOutcome, CloseRequest, NewCar, NewCustomer, NewMechanic,
        NewServiceRequest,
    };
    use tempfile::NamedTempFile;

    fn open_temp() -> (NamedTempFile, Store) {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let store = Store::open(temp_file.path()).unwrap();
        (temp_file, store)
    }

    fn customer(store: &Store, first: &str, last: &str) -> i64 {
        add_customer(
            store,
            &NewCustomer {
                first_name: first.to_string(),
                last_name: last.to_string(),
                phone: "555-0000".to_string(),
                address: "2 Elm St".to_string(),
            },
        )
        .unwrap()
        .id
    }

    fn car(store: &Store, vin: &str, make: &str, year: i64) {
        add_car(
            store,
            &NewCar {
                vin: vin.to_string(),
                make: make.to_string(),
                model: "Base".to_string(),
                year,
            },
        )
        .unwrap();
    }

    fn request(store: &Store, customer_id: i64, vin: &str, odometer: i64) -> i64 {
        open_service_request(
            store,
            &NewServiceRequest {
                customer_id,
                vin: vin.to_string(),
                odometer,
                complaint: "noise".to_string(),
            },
        )
        .unwrap()
        .rid
    }

    fn close(store: &Store, mechanic_id: i64, rid: i64, bill: i64) {
        let outcome = close_service_request(
            store,
            &CloseRequest {
                mechanic_id,
                request_id: rid,
                bill,
                comment: "done".to_string(),
            },
        )
        .unwrap();
        assert!(matches!(outcome, CloseOutcome::Closed(_)));
    }

    fn mechanic(store: &Store) -> i64 {
        add_mechanic(
            store,
            &NewMechanic {
                first_name: "Ann".to_string(),
                last_name: "Gruber".to_string(),
                experience: 9,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_bill_under_100_filters_and_orders() {
        let (_file, store) = open_temp();
        let mid = mechanic(&store);
        let zed = customer(&store, "Zed", "Ames");
        let amy = customer(&store, "Amy", "Bell");
        car(&store, "VINZ", "Ford", 2001);
        car(&store, "VINA", "Audi", 2003);

        let r1 = request(&store, zed, "VINZ", 10_000);
        let r2 = request(&store, amy, "VINA", 12_000);
        let r3 = request(&store, amy, "VINA", 15_000);
        close(&store, mid, r1, 60);
        close(&store, mid, r2, 95);
        close(&store, mid, r3, 150);

        let rows = customers_with_bill_under_100(&store).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.bill < 100));
        // ordered by first name ascending
        assert_eq!(rows[0].first_name, "Amy");
        assert_eq!(rows[1].first_name, "Zed");
    }

    #[test]
    fn test_more_than_20_cars_is_strict() {
        let (_file, store) = open_temp();
        let hoarder = customer(&store, "Gus", "Price");
        let modest = customer(&store, "Ida", "Lane");

        for i in 0..21 {
            let vin = format!("HOARD{:03}", i);
            car(&store, &vin, "Fiat", 1999);
            add_ownership(&store, hoarder, &vin).unwrap();
        }
        car(&store, "ONLYONE", "Saab", 1998);
        add_ownership(&store, modest, "ONLYONE").unwrap();

        let rows = customers_with_more_than_20_cars(&store).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name, "Gus");
        assert_eq!(rows[0].cars, 21);
    }

    #[test]
    fn test_old_low_mileage_cars_deduplicated() {
        let (_file, store) = open_temp();
        let owner = customer(&store, "Ron", "Marsh");
        car(&store, "OLDLOW", "Volvo", 1990);
        car(&store, "OLDHIGH", "Buick", 1991);
        car(&store, "NEWLOW", "Kia", 2000);

        // two qualifying requests on the same car collapse to one row
        request(&store, owner, "OLDLOW", 40_000);
        request(&store, owner, "OLDLOW", 50_000);
        request(&store, owner, "OLDHIGH", 60_000);
        request(&store, owner, "NEWLOW", 10_000);

        let rows = cars_before_1995_with_low_mileage(&store).unwrap();
        assert_eq!(
            rows,
            vec![CarSummary {
                make: "Volvo".to_string(),
                model: "Base".to_string(),
                year: 1990,
            }]
        );
    }

    #[test]
    fn test_most_serviced_cars_limits_and_breaks_ties_by_vin() {
        let (_file, store) = open_temp();
        let owner = customer(&store, "Ron", "Marsh");
        car(&store, "AAA", "Audi", 2001);
        car(&store, "BBB", "BMW", 2002);
        car(&store, "CCC", "Cadillac", 2003);

        request(&store, owner, "BBB", 1_000);
        request(&store, owner, "BBB", 2_000);
        request(&store, owner, "AAA", 3_000);
        request(&store, owner, "AAA", 4_000);
        request(&store, owner, "CCC", 5_000);

        let rows = most_serviced_cars(&store, 2).unwrap();
        assert_eq!(rows.len(), 2);
        // AAA and BBB both have two services; VIN ascending puts AAA first
        assert_eq!(rows[0].make, "Audi");
        assert_eq!(rows[0].services, 2);
        assert_eq!(rows[1].make, "BMW");

        // k larger than the distinct serviced cars returns them all
        let rows = most_serviced_cars(&store, 10).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_most_serviced_cars_rejects_non_positive_k() {
        let (_file, store) = open_temp();
        assert!(most_serviced_cars(&store, 0).is_err());
        assert!(most_serviced_cars(&store, -3).is_err());
    }

    #[test]
    fn test_total_bill_ranking_descends() {
        let (_file, store) = open_temp();
        let mid = mechanic(&store);
        let low = customer(&store, "Lia", "North");
        let high = customer(&store, "Hal", "South");
        car(&store, "LOW1", "Ford", 2001);
        car(&store, "HIGH1", "Audi", 2002);

        let r1 = request(&store, low, "LOW1", 1_000);
        let r2 = request(&store, high, "HIGH1", 2_000);
        let r3 = request(&store, high, "HIGH1", 3_000);
        close(&store, mid, r1, 200);
        close(&store, mid, r2, 150);
        close(&store, mid, r3, 175);

        let rows = customers_by_total_bill(&store).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first_name, "Hal");
        assert_eq!(rows[0].total, 325);
        assert_eq!(rows[1].first_name, "Lia");
        assert_eq!(rows[1].total, 200);
    }
}
