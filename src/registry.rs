use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::events::{Donation, Event, EventKind, GlobalEvent, ShopOrder, Subscription};

/// A payload failed the field rules of its schema. The message names the
/// offending field; it is logged internally and never sent back on the wire.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("payload `type` is `{got}`, expected the `{expected}` literal")]
    TagMismatch { expected: &'static str, got: String },
    #[error(transparent)]
    Fields(#[from] serde_json::Error),
}

/// Builds a typed event from the parsed `data` object using the schema for
/// `kind`. Unknown fields are ignored; missing or mistyped fields fail, and
/// a `shop_items` list fails as a whole if any element does.
pub fn construct(kind: EventKind, payload: &Value) -> Result<Event, ValidationError> {
    let event = match kind {
        EventKind::Global => Event::Global(GlobalEvent::deserialize(payload)?),
        EventKind::Donation => {
            let donation = Donation::deserialize(payload)?;
            expect_tag(kind, &donation.event_type)?;
            Event::Donation(donation)
        }
        EventKind::Subscription => {
            let subscription = Subscription::deserialize(payload)?;
            expect_tag(kind, &subscription.event_type)?;
            Event::Subscription(subscription)
        }
        EventKind::ShopOrder => {
            let order = ShopOrder::deserialize(payload)?;
            expect_tag(kind, &order.event_type)?;
            Event::ShopOrder(order)
        }
    };
    Ok(event)
}

// The normalized lookup key is case-insensitive, the wire literal is not:
// a payload routed to the `donation` schema must still say `"Donation"`.
fn expect_tag(kind: EventKind, got: &str) -> Result<(), ValidationError> {
    match kind.wire_name() {
        Some(expected) if got != expected => Err(ValidationError::TagMismatch {
            expected,
            got: got.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn donation_payload() -> Value {
        json!({
            "verification_token": "token",
            "message_id": "2b53017c-860e-47e1-86b4-599a28d4d098",
            "timestamp": "2024-01-14T03:56:47Z",
            "type": "Donation",
            "is_public": true,
            "from_name": "Jo Example",
            "message": "Good luck with the integration!",
            "amount": "3.00",
            "url": "https://ko-fi.com/Home/CoffeeShop?txid=00000000-1111-2222-3333-444444444444",
            "email": "jo.example@example.com",
            "currency": "USD",
            "is_subscription_payment": false,
            "is_first_subscription_payment": false,
            "kofi_transaction_id": "00000000-1111-2222-3333-444444444444",
            "shop_items": null,
            "tier_name": null,
            "shipping": null,
        })
    }

    fn subscription_payload() -> Value {
        json!({
            "verification_token": "token",
            "message_id": "f6441f3d-a76f-498f-ba59-6e258c8186ad",
            "timestamp": "2024-01-14T03:56:47Z",
            "type": "Subscription",
            "is_public": true,
            "from_name": "Jo Example",
            "message": null,
            "amount": "5.00",
            "url": "https://ko-fi.com/Home/CoffeeShop?txid=00000000-1111-2222-3333-444444444444",
            "email": "jo.example@example.com",
            "currency": "USD",
            "is_subscription_payment": true,
            "is_first_subscription_payment": false,
            "kofi_transaction_id": "00000000-1111-2222-3333-444444444444",
            "tier_name": "Bronze",
        })
    }

    fn shop_order_payload() -> Value {
        json!({
            "verification_token": "token",
            "message_id": "633a0988-55c9-48c7-b277-b810f61afd66",
            "timestamp": "2024-01-14T03:56:47Z",
            "type": "Shop Order",
            "is_public": true,
            "from_name": "Jo Example",
            "message": null,
            "amount": "27.95",
            "url": "https://ko-fi.com/Home/CoffeeShop?txid=00000000-1111-2222-3333-444444444444",
            "email": "jo.example@example.com",
            "currency": "USD",
            "is_subscription_payment": false,
            "is_first_subscription_payment": false,
            "kofi_transaction_id": "00000000-1111-2222-3333-444444444444",
            "shop_items": [
                {"direct_link_code": "1a2b3c4d5e", "variation_name": "Blue", "quantity": 1},
                {"direct_link_code": "a1b2c3d4e5", "variation_name": "Large", "quantity": 5},
            ],
            "shipping": {
                "full_name": "Ko-fi Mail Room",
                "street_address": "123 The Old Exchange, High Street",
                "city": "Bigville",
                "state_or_province": "Kansas",
                "postal_code": "12345",
                "country": "United States",
                "country_code": "US",
                "telephone": "+1-212-456-7890",
            },
        })
    }

    #[test]
    fn constructs_donation() {
        let event = construct(EventKind::Donation, &donation_payload()).unwrap();
        match event {
            Event::Donation(donation) => {
                assert_eq!(donation.message, "Good luck with the integration!");
                assert_eq!(donation.amount, "3.00");
                assert_eq!(donation.email, "jo.example@example.com");
            }
            other => panic!("expected a donation, got {other:?}"),
        }
    }

    #[test]
    fn constructs_subscription_without_tier() {
        let mut payload = subscription_payload();
        payload["tier_name"] = Value::Null;
        payload["is_first_subscription_payment"] = json!(true);
        let event = construct(EventKind::Subscription, &payload).unwrap();
        match event {
            Event::Subscription(subscription) => {
                assert!(subscription.is_subscription_payment);
                assert!(subscription.is_first_subscription_payment);
                assert_eq!(subscription.tier_name, None);
                assert_eq!(subscription.message, None);
            }
            other => panic!("expected a subscription, got {other:?}"),
        }
    }

    #[test]
    fn constructs_shop_order_with_items_in_order() {
        let event = construct(EventKind::ShopOrder, &shop_order_payload()).unwrap();
        match event {
            Event::ShopOrder(order) => {
                assert_eq!(order.shop_items.len(), 2);
                assert_eq!(order.shop_items[0].variation_name, "Blue");
                assert_eq!(order.shop_items[1].quantity, 5);
                assert_eq!(order.shipping.country_code, "US");
            }
            other => panic!("expected a shop order, got {other:?}"),
        }
    }

    #[test]
    fn global_schema_accepts_every_variant_payload() {
        for payload in [donation_payload(), subscription_payload(), shop_order_payload()] {
            let event = construct(EventKind::Global, &payload).unwrap();
            match event {
                Event::Global(global) => assert!(global.event_type.is_some()),
                other => panic!("expected a global event, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_required_field_fails() {
        let mut payload = donation_payload();
        payload.as_object_mut().unwrap().remove("message");
        let err = construct(EventKind::Donation, &payload).unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn mistyped_field_fails() {
        let mut payload = subscription_payload();
        payload["is_subscription_payment"] = json!("yes");
        assert!(construct(EventKind::Subscription, &payload).is_err());
    }

    #[test]
    fn tag_literal_must_match_exactly() {
        let mut payload = donation_payload();
        payload["type"] = json!("donation");
        let err = construct(EventKind::Donation, &payload).unwrap_err();
        assert!(matches!(err, ValidationError::TagMismatch { expected: "Donation", .. }));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut payload = donation_payload();
        payload["discount_code"] = json!("SPRING25");
        assert!(construct(EventKind::Donation, &payload).is_ok());
    }

    #[test]
    fn shop_items_validate_atomically() {
        let mut payload = shop_order_payload();
        payload["shop_items"][1]["quantity"] = json!(-2);
        assert!(construct(EventKind::ShopOrder, &payload).is_err());
    }

    #[test]
    fn shipping_requires_every_field() {
        let mut payload = shop_order_payload();
        payload["shipping"].as_object_mut().unwrap().remove("country_code");
        let err = construct(EventKind::ShopOrder, &payload).unwrap_err();
        assert!(err.to_string().contains("country_code"));
    }
}
