use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const PRODUCTS: [&str; 5] = ["Product A", "Product B", "Product C", "Product D", "Product E"];

/// Change below this percentage counts as stable
const STABLE_THRESHOLD_PERCENT: f64 = 10.0;

/// Upper bound (exclusive) of a generated monthly sales value
const MAX_SALES: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "JANUARY",
            Month::February => "FEBRUARY",
            Month::March => "MARCH",
            Month::April => "APRIL",
            Month::May => "MAY",
            Month::June => "JUNE",
            Month::July => "JULY",
            Month::August => "AUGUST",
            Month::September => "SEPTEMBER",
            Month::October => "OCTOBER",
            Month::November => "NOVEMBER",
            Month::December => "DECEMBER",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Stable,
    Rising,
    Falling,
}

impl Trend {
    /// Month-over-month classification; a zero previous value is stable
    pub fn classify(previous: u32, current: u32) -> Trend {
        if previous == 0 {
            return Trend::Stable;
        }
        let change = (current as f64 - previous as f64).abs() / previous as f64 * 100.0;
        if change < STABLE_THRESHOLD_PERCENT {
            Trend::Stable
        } else if current > previous {
            Trend::Rising
        } else {
            Trend::Falling
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Stable => "stable",
            Trend::Rising => "rising",
            Trend::Falling => "falling",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product_name: String,
    pub sales_per_month: BTreeMap<Month, u32>,
    pub trend_per_month: BTreeMap<Month, Trend>,
}

impl SalesRecord {
    /// Builds a record from twelve monthly values, January first.
    /// The first month has nothing to compare against and is stable.
    pub fn from_monthly_sales(product_name: impl Into<String>, sales: [u32; 12]) -> Self {
        let mut sales_per_month = BTreeMap::new();
        let mut trend_per_month = BTreeMap::new();
        let mut previous: Option<u32> = None;

        for (month, value) in Month::ALL.iter().zip(sales) {
            sales_per_month.insert(*month, value);
            let trend = match previous {
                Some(previous) => Trend::classify(previous, value),
                None => Trend::Stable,
            };
            trend_per_month.insert(*month, trend);
            previous = Some(value);
        }

        Self {
            product_name: product_name.into(),
            sales_per_month,
            trend_per_month,
        }
    }
}

/// One random record per product in [`PRODUCTS`]
pub fn random_sales_report<R: Rng>(rng: &mut R) -> Vec<SalesRecord> {
    PRODUCTS
        .iter()
        .map(|product| {
            let sales: [u32; 12] = std::array::from_fn(|_| rng.random_range(0..MAX_SALES));
            SalesRecord::from_monthly_sales(*product, sales)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_examples() {
        assert_eq!(Trend::classify(100, 105), Trend::Stable);
        assert_eq!(Trend::classify(100, 150), Trend::Rising);
        assert_eq!(Trend::classify(100, 50), Trend::Falling);
        assert_eq!(Trend::classify(0, 999), Trend::Stable);
        assert_eq!(Trend::classify(0, 0), Trend::Stable);
    }

    #[test]
    fn ten_percent_is_no_longer_stable() {
        assert_eq!(Trend::classify(100, 110), Trend::Rising);
        assert_eq!(Trend::classify(100, 90), Trend::Falling);
        assert_eq!(Trend::classify(100, 109), Trend::Stable);
        assert_eq!(Trend::classify(100, 91), Trend::Stable);
    }

    #[test]
    fn first_month_is_always_stable() {
        let record = SalesRecord::from_monthly_sales("P", [500, 0, 0, 10, 200, 100, 50, 50, 0, 0, 1, 999]);
        assert_eq!(record.trend_per_month[&Month::January], Trend::Stable);
        assert_eq!(record.trend_per_month[&Month::February], Trend::Falling);
        assert_eq!(record.trend_per_month[&Month::March], Trend::Stable);
        assert_eq!(record.trend_per_month[&Month::April], Trend::Stable);
        assert_eq!(record.trend_per_month[&Month::May], Trend::Rising);
        assert_eq!(record.trend_per_month[&Month::June], Trend::Falling);
        assert_eq!(record.trend_per_month[&Month::August], Trend::Stable);
        assert_eq!(record.trend_per_month[&Month::December], Trend::Rising);
    }

    #[test]
    fn random_report_covers_every_product_and_month() {
        let report = random_sales_report(&mut rand::rng());
        assert_eq!(report.len(), PRODUCTS.len());

        for (record, product) in report.iter().zip(PRODUCTS) {
            assert_eq!(record.product_name, product);
            assert_eq!(record.sales_per_month.len(), 12);
            assert_eq!(record.trend_per_month.len(), 12);
            assert!(record.sales_per_month.values().all(|v| *v < MAX_SALES));
            assert_eq!(record.trend_per_month[&Month::January], Trend::Stable);

            let values: Vec<u32> = record.sales_per_month.values().copied().collect();
            for (i, month) in Month::ALL.iter().enumerate().skip(1) {
                assert_eq!(record.trend_per_month[month], Trend::classify(values[i - 1], values[i]));
            }
        }
    }

    #[test]
    fn serializes_months_and_trends_by_name() {
        let record = SalesRecord::from_monthly_sales("P", [1; 12]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sales_per_month"]["JANUARY"], 1);
        assert_eq!(value["trend_per_month"]["DECEMBER"], "stable");
    }
}
