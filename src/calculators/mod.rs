//! One module per form. Each input type implements `Calculator`.

pub mod concrete;
pub mod conversion;
pub mod datetime;
pub mod fraction;
pub mod grades;
pub mod health;
pub mod inflation;
pub mod interest;
pub mod investment;
pub mod loan;
pub mod password;
pub mod percentage;
pub mod random;
pub mod retirement;
pub mod salary;
pub mod sales_tax;
pub mod scientific;
pub mod statistics;
pub mod subnet;
pub mod triangle;
