//! Published subscription plans for space owners.
//!
//! The plan table is static marketing data; it only changes with a release.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    /// Monthly price in BRL; 0.0 for the free tier
    pub monthly_price: f64,
    /// Maximum number of active listings, None for unlimited
    pub max_listings: Option<u32>,
    pub featured_placement: bool,
}

pub const PLANS: &[Plan] = &[
    Plan {
        id: "free",
        name: "Gratuito",
        monthly_price: 0.0,
        max_listings: Some(1),
        featured_placement: false,
    },
    Plan {
        id: "basic",
        name: "Básico",
        monthly_price: 49.9,
        max_listings: Some(5),
        featured_placement: false,
    },
    Plan {
        id: "premium",
        name: "Premium",
        monthly_price: 99.9,
        max_listings: None,
        featured_placement: true,
    },
];

pub fn find(plan_id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|plan| plan.id == plan_id)
}
