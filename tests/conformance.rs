//! Real-world conformance tests over the trattoria fixture set

use brigade::{
    fixtures::Fixture,
    resolver::{preview, resolve},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use decimal_percentage::Percentage;
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

fn moment(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| {
            NaiveTime::from_hms_opt(hour, minute, 0).map(|time| date.and_time(time))
        })
        .unwrap_or_default()
}

#[test]
fn friday_lunch_delivery_gets_the_capped_lunch_discount() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;
    let basket = fixture.basket()?;

    // 2026-08-07 is a Friday; the basket subtotal is £21.50.
    let resolution = resolve(fixture.catalog(), &basket, moment(2026, 8, 7, 12, 30))?;

    let lunch = fixture.promotion_key("lunch-special")?;
    let applied: Vec<_> = resolution.applied.iter().map(|a| a.key).collect();

    assert_eq!(applied, vec![lunch]);
    assert_eq!(resolution.total_discount, Money::from_minor(4_30, GBP));

    // £4.30 of £21.50 is exactly 20%.
    assert_eq!(
        resolution.savings_percent(&basket.subtotal()?),
        Percentage::from(rust_decimal::Decimal::new(2, 1))
    );

    Ok(())
}

#[test]
fn tuesday_evening_frees_the_cheapest_pizza() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;
    let basket = fixture.basket()?;

    // 2026-08-04 is a Tuesday; the BOGOF window is 17:00-21:00.
    let resolution = resolve(fixture.catalog(), &basket, moment(2026, 8, 4, 18, 0))?;

    let bogof = fixture.promotion_key("pizza-bogof")?;
    let applied: Vec<_> = resolution.applied.iter().map(|a| a.key).collect();

    assert_eq!(applied, vec![bogof]);
    assert_eq!(resolution.total_discount, Money::from_minor(8_50, GBP));

    Ok(())
}

#[test]
fn saturday_afternoon_has_nothing_to_offer() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;
    let basket = fixture.basket()?;

    // Saturday: lunch and BOGOF windows closed, and £21.50 is under the
    // £25.00 free-delivery floor.
    let resolution = resolve(fixture.catalog(), &basket, moment(2026, 8, 8, 13, 0))?;

    assert!(resolution.applied.is_empty());
    assert_eq!(resolution.total_discount, Money::from_minor(0, GBP));

    Ok(())
}

#[test]
fn lunch_window_boundaries_are_inclusive() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;
    let basket = fixture.basket()?;
    let lunch = fixture.promotion_key("lunch-special")?;

    for (hour, minute) in [(12, 0), (14, 0)] {
        let resolution = resolve(fixture.catalog(), &basket, moment(2026, 8, 7, hour, minute))?;
        let applied: Vec<_> = resolution.applied.iter().map(|a| a.key).collect();

        assert_eq!(applied, vec![lunch], "expected lunch deal at {hour}:{minute:02}");
    }

    let after = resolve(fixture.catalog(), &basket, moment(2026, 8, 7, 14, 1))?;

    assert!(after.applied.is_empty());

    Ok(())
}

#[test]
fn bigger_delivery_basket_stacks_free_delivery_with_lunch() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;

    // Rebuild the basket with a dessert added: £26.00 subtotal clears the
    // £25.00 free-delivery floor.
    let lines = [
        ("margherita", 1),
        ("diavola", 1),
        ("tiramisu", 1),
        ("cola", 2),
    ]
    .into_iter()
    .map(|(key, quantity)| {
        let item_key = fixture.item_key(key)?;
        let item = fixture.menu_item(key)?;

        Ok(brigade::basket::BasketLine::new(
            item_key,
            item.category,
            item.price,
            quantity,
        ))
    })
    .collect::<Result<Vec<_>, brigade::fixtures::FixtureError>>()?;

    let basket = brigade::basket::Basket::with_lines(
        lines,
        fixture.currency()?,
        brigade::basket::Fulfilment::Delivery {
            fee: Money::from_minor(2_50, GBP),
        },
    )?;

    let resolution = resolve(fixture.catalog(), &basket, moment(2026, 8, 7, 12, 30))?;

    let lunch = fixture.promotion_key("lunch-special")?;
    let delivery = fixture.promotion_key("free-delivery-over-25")?;
    let applied: Vec<_> = resolution.applied.iter().map(|a| a.key).collect();

    // The stackable delivery waiver applies alongside the exclusive winner.
    assert_eq!(applied, vec![delivery, lunch]);

    // 20% of £26.00 is £5.20, capped at £5.00; plus the £2.50 fee.
    assert_eq!(resolution.total_discount, Money::from_minor(7_50, GBP));

    Ok(())
}

#[test]
fn simulator_preview_lists_live_promotions_and_the_winner() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;

    let lunch = fixture.promotion_key("lunch-special")?;
    let delivery = fixture.promotion_key("free-delivery-over-25")?;

    let preview = preview(fixture.catalog(), moment(2026, 8, 7, 12, 30));

    assert_eq!(preview.active, vec![lunch, delivery]);
    assert_eq!(preview.winning_exclusive, Some(lunch));

    Ok(())
}

#[test]
fn resolution_is_idempotent() -> TestResult {
    let fixture = Fixture::from_set("trattoria")?;
    let basket = fixture.basket()?;
    let at = moment(2026, 8, 7, 12, 30);

    let first = resolve(fixture.catalog(), &basket, at)?;
    let second = resolve(fixture.catalog(), &basket, at)?;

    assert_eq!(first.total_discount, second.total_discount);
    assert_eq!(
        first.applied.iter().map(|a| a.key).collect::<Vec<_>>(),
        second.applied.iter().map(|a| a.key).collect::<Vec<_>>()
    );

    Ok(())
}
