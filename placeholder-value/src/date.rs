//! Calendar dates that remember how they should be printed.

use crate::ValueError;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComponent {
    Day,
    Month,
    Year,
}

impl FromStr for DateComponent {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ValueError::Invalid(format!("unknown date component: {}", s))),
        }
    }
}

/// A date plus the order of the components used to print it (`dd.mm.yyyy` by default).
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
    pub date: NaiveDate,
    pub components: Vec<DateComponent>,
}

impl DateValue {
    pub fn new(date: NaiveDate) -> Self {
        Self::with_components(
            date,
            vec![DateComponent::Day, DateComponent::Month, DateComponent::Year],
        )
    }

    pub fn with_components(date: NaiveDate, components: Vec<DateComponent>) -> Self {
        Self { date, components }
    }

    /// Same component order, different date.
    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self {
            date,
            components: self.components.clone(),
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match component {
                DateComponent::Day => write!(f, "{:02}", self.date.day())?,
                DateComponent::Month => write!(f, "{:02}", self.date.month())?,
                DateComponent::Year => write!(f, "{}", self.date.year())?,
            }
        }
        Ok(())
    }
}
