//! Fixed reference tables: categories, regions, stock and condition labels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub key: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub subcategories: &'static [&'static str],
}

pub const CATEGORIES: &[CategoryGroup] = &[
    CategoryGroup {
        key: "machines",
        label: "Machines",
        emoji: "🏗️",
        subcategories: &[
            "Agricultural Machinery",
            "Construction Equipment",
            "Industrial Machines",
            "Power Tools",
            "Generators",
        ],
    },
    CategoryGroup {
        key: "vehicles",
        label: "Vehicles",
        emoji: "🚗",
        subcategories: &[
            "Motorbikes",
            "Tricycles",
            "Cars & SUVs",
            "Trucks",
            "Buses",
            "Vans",
            "Heavy Duty Vehicles",
        ],
    },
    CategoryGroup {
        key: "equipment",
        label: "Equipment",
        emoji: "⚙️",
        subcategories: &[
            "Lifting Equipment",
            "Material Handling",
            "Welding Equipment",
            "Compressors",
            "Workshop Tools",
        ],
    },
    CategoryGroup {
        key: "parts",
        label: "Parts",
        emoji: "🔧",
        subcategories: &[
            "Engine Parts",
            "Body Parts",
            "Electrical Components",
            "Hydraulic Systems",
            "Tires & Wheels",
        ],
    },
    CategoryGroup {
        key: "tools",
        label: "Tools",
        emoji: "🔨",
        subcategories: &[
            "Hand Tools",
            "Power Tools",
            "Measuring Tools",
            "Cutting Tools",
            "Safety Equipment",
        ],
    },
    CategoryGroup {
        key: "accessories",
        label: "Accessories",
        emoji: "📦",
        subcategories: &[
            "Attachments",
            "Storage Solutions",
            "Protective Gear",
            "Maintenance Supplies",
            "Spare Parts",
        ],
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Region {
    pub value: &'static str,
    pub label: &'static str,
}

pub const GHANA_REGIONS: &[Region] = &[
    Region { value: "greater-accra", label: "Greater Accra" },
    Region { value: "ashanti", label: "Ashanti Region" },
    Region { value: "western", label: "Western Region" },
    Region { value: "central", label: "Central Region" },
    Region { value: "eastern", label: "Eastern Region" },
    Region { value: "volta", label: "Volta Region" },
    Region { value: "northern", label: "Northern Region" },
    Region { value: "upper-east", label: "Upper East Region" },
    Region { value: "upper-west", label: "Upper West Region" },
    Region { value: "brong-ahafo", label: "Brong-Ahafo Region" },
    Region { value: "western-north", label: "Western North Region" },
    Region { value: "ahafo", label: "Ahafo Region" },
    Region { value: "bono", label: "Bono Region" },
    Region { value: "bono-east", label: "Bono East Region" },
    Region { value: "oti", label: "Oti Region" },
    Region { value: "savannah", label: "Savannah Region" },
    Region { value: "north-east", label: "North East Region" },
];

/// Label for a region value; unknown values are shown as given.
pub fn region_label(value: &str) -> &str {
    GHANA_REGIONS
        .iter()
        .find(|r| r.value == value)
        .map(|r| r.label)
        .unwrap_or(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    Limited,
    OnOrder,
    OutOfStock,
}

impl StockStatus {
    pub const ALL: [StockStatus; 4] = [
        StockStatus::InStock,
        StockStatus::Limited,
        StockStatus::OnOrder,
        StockStatus::OutOfStock,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::Limited => "limited",
            StockStatus::OnOrder => "on-order",
            StockStatus::OutOfStock => "out-of-stock",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "✅ In Stock - Ready to Ship",
            StockStatus::Limited => "⚠️ Limited Stock",
            StockStatus::OnOrder => "📦 Available on Order",
            StockStatus::OutOfStock => "❌ Out of Stock",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    #[default]
    New,
    UsedLikeNew,
    UsedGood,
    UsedFair,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::New,
        Condition::UsedLikeNew,
        Condition::UsedGood,
        Condition::UsedFair,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::UsedLikeNew => "used-like-new",
            Condition::UsedGood => "used-good",
            Condition::UsedFair => "used-fair",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "🆕 Brand New",
            Condition::UsedLikeNew => "✨ Used - Like New",
            Condition::UsedGood => "👍 Used - Good",
            Condition::UsedFair => "⚙️ Used - Fair",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Condition::New => "Never used, in original packaging",
            Condition::UsedLikeNew => "Minimal use, excellent condition",
            Condition::UsedGood => "Normal wear, fully functional",
            Condition::UsedFair => "Shows wear, may need minor repairs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.value() == value)
    }
}

/// A labelled option as the storefront renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledOption {
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Stock label for a stored value. Missing or unknown values read as plain "in stock".
pub fn stock_status_display(value: Option<&str>) -> LabelledOption {
    match value.and_then(StockStatus::parse) {
        Some(status) => LabelledOption {
            value: status.value().to_string(),
            label: status.label().to_string(),
            description: None,
        },
        None => LabelledOption {
            value: StockStatus::InStock.value().to_string(),
            label: "✅ In Stock".to_string(),
            description: None,
        },
    }
}

/// Condition label for a stored value, falling back to brand new.
pub fn condition_display(value: Option<&str>) -> LabelledOption {
    let condition = value.and_then(Condition::parse).unwrap_or_default();
    LabelledOption {
        value: condition.value().to_string(),
        label: condition.label().to_string(),
        description: Some(condition.description().to_string()),
    }
}
