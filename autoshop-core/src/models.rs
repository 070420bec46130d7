//! Shop record types
//!
//! One struct per stored entity. Rows come back from the gateway as text
//! columns; the `from_row` constructors parse them back into typed records
//! and propagate a descriptive error when a cell does not parse.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

/// A customer of the shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    pub fn from_row(row: &[String]) -> Result<Self> {
        Ok(Self {
            id: int_cell(row, 0).context("customer id")?,
            first_name: text_cell(row, 1)?,
            last_name: text_cell(row, 2)?,
            phone: text_cell(row, 3)?,
            address: text_cell(row, 4)?,
        })
    }
}

/// A mechanic employed by the shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanic {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Years of experience, expected 0-99 but accepted as entered
    pub experience: i64,
}

impl Mechanic {
    pub fn from_row(row: &[String]) -> Result<Self> {
        Ok(Self {
            id: int_cell(row, 0).context("mechanic id")?,
            first_name: text_cell(row, 1)?,
            last_name: text_cell(row, 2)?,
            experience: int_cell(row, 3).context("mechanic experience")?,
        })
    }
}

/// A car known to the shop, keyed by its user-supplied VIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i64,
}

impl Car {
    pub fn from_row(row: &[String]) -> Result<Self> {
        Ok(Self {
            vin: text_cell(row, 0)?,
            make: text_cell(row, 1)?,
            model: text_cell(row, 2)?,
            year: int_cell(row, 3).context("car year")?,
        })
    }
}

/// A customer-owns-car link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    pub id: i64,
    pub customer_id: i64,
    pub vin: String,
}

impl Ownership {
    pub fn from_row(row: &[String]) -> Result<Self> {
        Ok(Self {
            id: int_cell(row, 0).context("ownership id")?,
            customer_id: int_cell(row, 1).context("ownership customer id")?,
            vin: text_cell(row, 2)?,
        })
    }
}

/// An open unit of work: a customer brought a car in with a complaint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub rid: i64,
    pub customer_id: i64,
    pub vin: String,
    /// Date the request was entered, captured from the system clock
    pub date: NaiveDate,
    pub odometer: i64,
    pub complaint: String,
}

impl ServiceRequest {
    pub fn from_row(row: &[String]) -> Result<Self> {
        Ok(Self {
            rid: int_cell(row, 0).context("service request rid")?,
            customer_id: int_cell(row, 1).context("service request customer id")?,
            vin: text_cell(row, 2)?,
            date: date_cell(row, 3).context("service request date")?,
            odometer: int_cell(row, 4).context("service request odometer")?,
            complaint: text_cell(row, 5)?,
        })
    }
}

/// The closing record for a service request. A request is closed exactly
/// when one of these references it; there is no status column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRequest {
    pub wid: i64,
    pub rid: i64,
    pub mechanic_id: i64,
    pub date: NaiveDate,
    pub comment: String,
    pub bill: i64,
}

impl ClosedRequest {
    pub fn from_row(row: &[String]) -> Result<Self> {
        Ok(Self {
            wid: int_cell(row, 0).context("closed request wid")?,
            rid: int_cell(row, 1).context("closed request rid")?,
            mechanic_id: int_cell(row, 2).context("closed request mechanic id")?,
            date: date_cell(row, 3).context("closed request date")?,
            comment: text_cell(row, 4)?,
            bill: int_cell(row, 5).context("closed request bill")?,
        })
    }
}

fn text_cell(row: &[String], index: usize) -> Result<String> {
    row.get(index)
        .cloned()
        .ok_or_else(|| anyhow!("row is missing column {}", index))
}

fn int_cell(row: &[String], index: usize) -> Result<i64> {
    let cell = text_cell(row, index)?;
    cell.parse::<i64>()
        .map_err(|_| anyhow!("{:?} is not an integer", cell))
}

fn date_cell(row: &[String], index: usize) -> Result<NaiveDate> {
    let cell = text_cell(row, index)?;
    cell.parse::<NaiveDate>()
        .map_err(|_| anyhow!("{:?} is not a date", cell))
}
