use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// The closed set of notification kinds the registry knows about.
///
/// `Global` is a reserved registry key for the fallback handler list; the
/// other three correspond to the `type` discriminators Ko-fi puts on the
/// wire (`"Donation"`, `"Subscription"`, `"Shop Order"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Global,
    Donation,
    Subscription,
    ShopOrder,
}

impl EventKind {
    /// Resolves a wire discriminator to a registry key: lower-cased, spaces
    /// replaced with underscores, then matched against the closed set.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.to_lowercase().replace(' ', "_").as_str() {
            "global" => Some(EventKind::Global),
            "donation" => Some(EventKind::Donation),
            "subscription" => Some(EventKind::Subscription),
            "shop_order" => Some(EventKind::ShopOrder),
            _ => None,
        }
    }

    /// The exact `type` literal a payload of this kind must carry.
    /// `Global` accepts any payload and has no literal of its own.
    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            EventKind::Donation => Some("Donation"),
            EventKind::Subscription => Some("Subscription"),
            EventKind::ShopOrder => Some("Shop Order"),
            EventKind::Global => None,
        }
    }

    pub fn registry_key(&self) -> &'static str {
        match self {
            EventKind::Global => "global",
            EventKind::Donation => "donation",
            EventKind::Subscription => "subscription",
            EventKind::ShopOrder => "shop_order",
        }
    }
}

/// A validated notification, dispatched to handlers as-is. Which variant is
/// constructed follows from the normalized wire discriminator, except for
/// `Global`, which is only built when a payload arrives under the reserved
/// `global` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Donation(Donation),
    Subscription(Subscription),
    ShopOrder(ShopOrder),
    Global(GlobalEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Donation(_) => EventKind::Donation,
            Event::Subscription(_) => EventKind::Subscription,
            Event::ShopOrder(_) => EventKind::ShopOrder,
            Event::Global(_) => EventKind::Global,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_public: bool,
    pub from_name: String,
    pub message: String,
    // Decimal-looking text; kept as a string so locale and precision survive.
    pub amount: String,
    pub url: String,
    pub email: String,
    pub currency: String,
    pub kofi_transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_public: bool,
    pub from_name: String,
    pub message: Option<String>,
    pub amount: String,
    pub url: String,
    pub email: String,
    pub currency: String,
    pub is_subscription_payment: bool,
    pub is_first_subscription_payment: bool,
    pub kofi_transaction_id: String,
    pub tier_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopOrder {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_public: bool,
    pub from_name: String,
    pub amount: String,
    pub url: String,
    pub email: String,
    pub currency: String,
    pub kofi_transaction_id: String,
    pub shop_items: Vec<ShopItem>,
    pub shipping: Shipping,
}

/// Permissive superset of the other variants: everything variant-specific is
/// optional, so any payload the specific schemas accept parses here too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_public: bool,
    pub from_name: String,
    pub message: Option<String>,
    pub amount: String,
    pub url: String,
    pub email: String,
    pub currency: String,
    pub is_subscription_payment: bool,
    pub is_first_subscription_payment: bool,
    pub kofi_transaction_id: String,
    pub shop_items: Option<Vec<ShopItem>>,
    pub tier_name: Option<String>,
    pub shipping: Option<Shipping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub direct_link_code: String,
    pub variation_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipping {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country: String,
    pub country_code: String,
    pub telephone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_discriminators_normalize_to_registry_keys() {
        assert_eq!(EventKind::from_wire("Donation"), Some(EventKind::Donation));
        assert_eq!(EventKind::from_wire("Subscription"), Some(EventKind::Subscription));
        assert_eq!(EventKind::from_wire("Shop Order"), Some(EventKind::ShopOrder));
        assert_eq!(EventKind::from_wire("SHOP ORDER"), Some(EventKind::ShopOrder));
        assert_eq!(EventKind::from_wire("shop_order"), Some(EventKind::ShopOrder));
    }

    #[test]
    fn unknown_discriminators_are_rejected() {
        assert_eq!(EventKind::from_wire("Refund"), None);
        assert_eq!(EventKind::from_wire(""), None);
        assert_eq!(EventKind::from_wire("shop-order"), None);
    }

    #[test]
    fn registry_keys_round_trip_through_normalization() {
        for kind in [
            EventKind::Global,
            EventKind::Donation,
            EventKind::Subscription,
            EventKind::ShopOrder,
        ] {
            assert_eq!(EventKind::from_wire(kind.registry_key()), Some(kind));
        }
    }
}
