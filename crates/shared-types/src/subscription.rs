use serde::Serialize;

/// How often a plan bills.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[serde(rename = "one_time")]
    OneTime,
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::OneTime => "one_time",
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Quarterly => "quarterly",
            BillingPeriod::Yearly => "yearly",
        }
    }

    /// Text shown after the price.
    pub fn price_suffix(&self) -> &'static str {
        match self {
            BillingPeriod::OneTime => "one-time",
            BillingPeriod::Monthly => "/ month",
            BillingPeriod::Quarterly => "/ quarter",
            BillingPeriod::Yearly => "/ year",
        }
    }
}

/// A care plan an older adult can subscribe to.
///
/// Prices are in pesewas (1/100 GHS).
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SubscriptionPlan {
    pub id: &'static str,
    pub name: &'static str,
    pub price_minor: u32,
    pub period: BillingPeriod,
    pub features: &'static [&'static str],
    pub recommended: bool,
}

impl SubscriptionPlan {
    /// Price formatted for display, e.g. `₵150.00`.
    pub fn display_price(&self) -> String {
        format!("₵{}.{:02}", self.price_minor / 100, self.price_minor % 100)
    }
}

pub const SUBSCRIPTION_PLANS: &[SubscriptionPlan] = &[
    SubscriptionPlan {
        id: "therapy-session",
        name: "One-time Therapy Session",
        price_minor: 5_000,
        period: BillingPeriod::OneTime,
        features: &["Single therapy session", "Basic care plan", "Limited shop access"],
        recommended: false,
    },
    SubscriptionPlan {
        id: "monthly",
        name: "Monthly Care Plan",
        price_minor: 15_000,
        period: BillingPeriod::Monthly,
        features: &[
            "Unlimited therapy sessions",
            "Full care plan",
            "Complete shop access",
            "Caregiver assignment",
        ],
        recommended: true,
    },
    SubscriptionPlan {
        id: "quarterly",
        name: "Quarterly Care Plan",
        price_minor: 40_000,
        period: BillingPeriod::Quarterly,
        features: &[
            "Unlimited therapy sessions",
            "Full care plan",
            "Complete shop access",
            "Priority caregiver assignment",
            "10% shop discount",
        ],
        recommended: false,
    },
    SubscriptionPlan {
        id: "yearly",
        name: "Yearly Care Plan",
        price_minor: 150_000,
        period: BillingPeriod::Yearly,
        features: &[
            "Unlimited therapy sessions",
            "Full care plan",
            "Complete shop access",
            "Priority caregiver assignment",
            "20% shop discount",
            "Monthly health reports",
        ],
        recommended: false,
    },
];

/// Look up a plan by its id.
pub fn find_plan(id: &str) -> Option<&'static SubscriptionPlan> {
    SUBSCRIPTION_PLANS.iter().find(|p| p.id == id)
}
