//! Revenue-share, earnings and sales aggregation
//!
//! Everything here is plain arithmetic over rows already loaded by the
//! repositories, so it can be exercised without a database.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The figures of a project that aggregation needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectFigures {
    pub price: f64,
    pub sales: i64,
    pub created_at: DateTime<Utc>,
}

impl ProjectFigures {
    /// Revenue a project has brought in: units sold times unit price
    pub fn revenue(&self) -> f64 {
        self.sales as f64 * self.price
    }
}

/// One month of the per-month histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    pub name: &'static str,
    pub projects: u32,
    pub sales: f64,
}

/// Global rollup over every project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOverview {
    pub total_revenue: f64,
    pub avg_order_value: f64,
    pub total_sales: i64,
}

/// Round to 2 decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A developer's share (percent) of a project; absent shares count as 0
pub fn share_for(shares: &BTreeMap<String, f64>, user_id: Uuid) -> f64 {
    shares.get(&user_id.to_string()).copied().unwrap_or(0.0)
}

/// `price × sales × share / 100`, rounded to cents
pub fn earnings(price: f64, sales: i64, share: f64) -> f64 {
    round2(price * sales as f64 * (share / 100.0))
}

/// Sum of already-rounded per-project earnings, rounded again so float
/// noise from the addition does not leak into the total
pub fn total_earnings<I>(per_project: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    round2(per_project.into_iter().sum())
}

/// `Σ sales × price`
pub fn total_revenue(projects: &[ProjectFigures]) -> f64 {
    projects.iter().map(ProjectFigures::revenue).sum()
}

/// Bucket projects by the calendar month they were created in.
///
/// Years are ignored, so March 2023 and March 2024 share one bucket. Only
/// months that occur are returned, always in Jan→Dec order.
pub fn monthly_breakdown(projects: &[ProjectFigures]) -> Vec<MonthlyBucket> {
    let mut buckets: [Option<(u32, f64)>; 12] = [None; 12];

    for project in projects {
        let bucket = buckets[project.created_at.month0() as usize].get_or_insert((0, 0.0));
        bucket.0 += 1;
        bucket.1 += project.revenue();
    }

    buckets
        .iter()
        .zip(MONTHS)
        .filter_map(|(bucket, name)| {
            bucket.map(|(projects, sales)| MonthlyBucket {
                name,
                projects,
                sales,
            })
        })
        .collect()
}

/// Revenue, mean unit price and units sold across `projects`.
///
/// `avg_order_value` averages project prices, not revenue per sale.
pub fn sales_overview(projects: &[ProjectFigures]) -> SalesOverview {
    let total_sales = projects.iter().map(|p| p.sales).sum();
    let avg_order_value = if projects.is_empty() {
        0.0
    } else {
        projects.iter().map(|p| p.price).sum::<f64>() / projects.len() as f64
    };

    SalesOverview {
        total_revenue: total_revenue(projects),
        avg_order_value,
        total_sales,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn figures(price: f64, sales: i64, year: i32, month: u32) -> ProjectFigures {
        ProjectFigures {
            price,
            sales,
            created_at: Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_earnings_scenario() {
        assert_eq!(earnings(1000.0, 5, 20.0), 1000.00);
    }

    #[test]
    fn test_earnings_rounds_to_cents() {
        assert_eq!(earnings(99.99, 3, 33.0), 98.99);
        assert_eq!(earnings(10.0, 1, 12.345), 1.23);
        assert_eq!(earnings(0.5, 1, 1.0), 0.01);
        assert_eq!(earnings(250.0, 0, 50.0), 0.0);
    }

    #[test]
    fn test_missing_share_defaults_to_zero() {
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let shares = BTreeMap::from([(member.to_string(), 40.0)]);

        assert_eq!(share_for(&shares, member), 40.0);
        assert_eq!(share_for(&shares, outsider), 0.0);
        assert_eq!(earnings(500.0, 4, share_for(&shares, outsider)), 0.0);
    }

    #[test]
    fn test_total_earnings_is_sum_of_project_earnings() {
        let per_project = [
            earnings(1000.0, 5, 20.0),
            earnings(99.99, 3, 33.0),
            earnings(0.1, 3, 100.0),
        ];

        let total = total_earnings(per_project);
        assert_eq!(total, round2(per_project.iter().sum()));
        assert_eq!(total, 1099.29);
        assert_eq!(total_earnings(Vec::new()), 0.0);
    }

    #[test]
    fn test_total_revenue() {
        let projects = [figures(1000.0, 5, 2024, 1), figures(250.0, 2, 2024, 2)];
        assert_eq!(total_revenue(&projects), 5500.0);
        assert_eq!(total_revenue(&[]), 0.0);
    }

    #[test]
    fn test_monthly_breakdown_merges_years_and_orders_by_month() {
        let projects = [
            figures(100.0, 2, 2024, 12),
            figures(50.0, 1, 2023, 3),
            figures(10.0, 10, 2024, 3),
            figures(300.0, 0, 2022, 1),
        ];

        let buckets = monthly_breakdown(&projects);
        assert_eq!(
            buckets,
            vec![
                MonthlyBucket {
                    name: "Jan",
                    projects: 1,
                    sales: 0.0
                },
                MonthlyBucket {
                    name: "Mar",
                    projects: 2,
                    sales: 150.0
                },
                MonthlyBucket {
                    name: "Dec",
                    projects: 1,
                    sales: 200.0
                },
            ]
        );
    }

    #[test]
    fn test_monthly_breakdown_order_ignores_input_order() {
        let mut projects: Vec<ProjectFigures> =
            (1..=12).rev().map(|m| figures(1.0, 1, 2020 + m as i32, m)).collect();
        let forward: Vec<&str> = monthly_breakdown(&projects).iter().map(|b| b.name).collect();

        projects.reverse();
        let backward: Vec<&str> = monthly_breakdown(&projects).iter().map(|b| b.name).collect();

        assert_eq!(forward, MONTHS.to_vec());
        assert_eq!(backward, MONTHS.to_vec());
    }

    #[test]
    fn test_sales_overview() {
        let projects = [
            figures(1000.0, 5, 2024, 1),
            figures(200.0, 10, 2024, 2),
            figures(300.0, 0, 2024, 3),
        ];

        let overview = sales_overview(&projects);
        assert_eq!(overview.total_revenue, 7000.0);
        assert_eq!(overview.avg_order_value, 500.0);
        assert_eq!(overview.total_sales, 15);
    }

    #[test]
    fn test_sales_overview_without_projects() {
        let overview = sales_overview(&[]);
        assert_eq!(
            overview,
            SalesOverview {
                total_revenue: 0.0,
                avg_order_value: 0.0,
                total_sales: 0,
            }
        );

        let json = serde_json::to_value(&overview).unwrap();
        assert!(json.get("avgOrderValue").is_some());
        assert!(json.get("totalRevenue").is_some());
        assert!(json.get("totalSales").is_some());
    }
}
