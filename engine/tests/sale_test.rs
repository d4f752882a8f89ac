//! Integration tests for the sale side of the engine: construction
//! validation, purchasing, cap enforcement, fund forwarding, and the
//! bare-transfer purchase path.

use crowdsale_engine::collection::CollectionError;
use crowdsale_engine::engine::{CrowdsaleEngine, EngineError};
use crowdsale_engine::events::Event;
use crowdsale_engine::sale::{Crowdsale, SaleError};
use crowdsale_engine::Address;

const UNIT_PRICE: u64 = 2137;
const MAX_UNITS: u64 = 100;
const PURCHASER_FUNDS: u64 = 1_000_000;

/// Engine with a funded purchaser and a sale holding the mint rights —
/// the state every purchase scenario starts from.
fn deployed_sale() -> (CrowdsaleEngine, Address, Address) {
    let deployer = Address::new("deployer");
    let mut engine = CrowdsaleEngine::new(deployer.clone()).unwrap();
    engine
        .fund_account(&Address::new("purchaser"), PURCHASER_FUNDS)
        .unwrap();
    let collection = engine
        .deploy_collection(&deployer, "NftToken", "NFTT", "NftToken.com/")
        .unwrap();
    let sale = engine
        .create_sale("SHUB", UNIT_PRICE, MAX_UNITS, &collection)
        .unwrap();
    engine
        .grant_mint_rights(&deployer, &collection, &sale)
        .unwrap();
    (engine, sale, collection)
}

// ---------------------------------------------------------------------------
// Failed Construction
// ---------------------------------------------------------------------------

#[test]
fn construction_fails_when_price_less_than_one() {
    let result = Crowdsale::new(
        Address::derive("sale", 7),
        0,
        MAX_UNITS,
        Address::derive("collection", 7),
        Address::new("wallet"),
        Address::new("wallet"),
    );
    let err = result.unwrap_err();
    assert!(matches!(err, SaleError::PriceTooLow));
    assert_eq!(err.to_string(), "price too low: unit price is less than 1");
}

#[test]
fn construction_fails_when_cap_less_than_one() {
    let result = Crowdsale::new(
        Address::derive("sale", 7),
        UNIT_PRICE,
        0,
        Address::derive("collection", 7),
        Address::new("wallet"),
        Address::new("wallet"),
    );
    let err = result.unwrap_err();
    assert!(matches!(err, SaleError::CapTooLow));
    assert_eq!(err.to_string(), "cap too low: max units is less than 1");
}

#[test]
fn construction_fails_when_wallet_is_zero_address() {
    let result = Crowdsale::new(
        Address::derive("sale", 7),
        UNIT_PRICE,
        MAX_UNITS,
        Address::derive("collection", 7),
        Address::zero(),
        Address::new("owner"),
    );
    let err = result.unwrap_err();
    assert!(matches!(err, SaleError::InvalidWallet));
    assert_eq!(
        err.to_string(),
        "invalid wallet: treasury is the zero address"
    );
}

// ---------------------------------------------------------------------------
// Starting Values
// ---------------------------------------------------------------------------

#[test]
fn sale_has_correct_starting_values() {
    let (engine, sale_addr, collection_addr) = deployed_sale();
    let sale = engine.sale(&sale_addr).unwrap();

    assert_eq!(sale.collection(), &collection_addr);
    assert_eq!(sale.unit_price(), UNIT_PRICE);
    assert_eq!(sale.max_units(), MAX_UNITS);
    assert_eq!(sale.units_sold(), 0);
    assert_eq!(sale.treasury(), engine.custodian().address());
    assert!(!sale.is_exhausted());
}

// ---------------------------------------------------------------------------
// Purchasing
// ---------------------------------------------------------------------------

#[test]
fn purchase_fails_when_max_cap_reached() {
    let deployer = Address::new("deployer");
    let mut engine = CrowdsaleEngine::new(deployer.clone()).unwrap();
    let purchaser = Address::new("purchaser");
    engine.fund_account(&purchaser, PURCHASER_FUNDS).unwrap();
    let collection = engine
        .deploy_collection(&deployer, "NftToken", "NFTT", "NftToken.com/")
        .unwrap();
    // Cap of one so the second purchase hits the limit.
    let sale = engine.create_sale("SHUB", UNIT_PRICE, 1, &collection).unwrap();
    engine
        .grant_mint_rights(&deployer, &collection, &sale)
        .unwrap();

    let first = engine.purchase(&purchaser, &sale, UNIT_PRICE).unwrap();
    assert_eq!(first, 1);

    let second = engine.purchase(&purchaser, &sale, UNIT_PRICE);
    let err = second.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Sale(SaleError::CapReached { max_units: 1 })
    ));
    assert_eq!(err.to_string(), "cap reached: all 1 units sold");
    assert_eq!(engine.sale(&sale).unwrap().units_sold(), 1);
    assert_eq!(engine.custodian().balance(), UNIT_PRICE);
}

#[test]
fn purchased_token_belongs_to_caller() {
    let (mut engine, sale, collection) = deployed_sale();
    let purchaser = Address::new("purchaser");

    let token_id = engine.purchase(&purchaser, &sale, UNIT_PRICE).unwrap();
    assert_eq!(token_id, 1);
    assert_eq!(
        engine.collection(&collection).unwrap().owner_of(1).unwrap(),
        &purchaser
    );
}

#[test]
fn token_ids_are_dense_and_sequential() {
    let (mut engine, sale, collection) = deployed_sale();
    let purchaser = Address::new("purchaser");

    for expected in 1..=5 {
        let token_id = engine.purchase(&purchaser, &sale, UNIT_PRICE).unwrap();
        assert_eq!(token_id, expected);
    }
    assert_eq!(engine.collection(&collection).unwrap().total_minted(), 5);
    assert!(matches!(
        engine.collection(&collection).unwrap().owner_of(6),
        Err(CollectionError::UnknownAsset(6))
    ));
}

#[test]
fn funds_move_from_purchaser_to_treasury() {
    let (mut engine, sale, _) = deployed_sale();
    let purchaser = Address::new("purchaser");

    engine.purchase(&purchaser, &sale, UNIT_PRICE).unwrap();

    assert_eq!(engine.balance_of(&purchaser), PURCHASER_FUNDS - UNIT_PRICE);
    assert_eq!(engine.custodian().balance(), UNIT_PRICE);
}

#[test]
fn purchase_fails_when_value_less_than_price() {
    let (mut engine, sale, collection) = deployed_sale();
    let purchaser = Address::new("purchaser");

    let result = engine.purchase(&purchaser, &sale, UNIT_PRICE - 1);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Sale(SaleError::InsufficientPayment {
            sent: 2136,
            unit_price: 2137,
        })
    ));
    assert_eq!(
        err.to_string(),
        "insufficient payment: sent 2136, unit price is 2137"
    );

    // Idempotent no-op under failure: every balance and counter unchanged.
    assert_eq!(engine.balance_of(&purchaser), PURCHASER_FUNDS);
    assert_eq!(engine.custodian().balance(), 0);
    assert_eq!(engine.sale(&sale).unwrap().units_sold(), 0);
    assert_eq!(engine.collection(&collection).unwrap().total_minted(), 0);
}

#[test]
fn overpayment_is_forwarded_in_full() {
    let (mut engine, sale, _) = deployed_sale();
    let purchaser = Address::new("purchaser");

    engine.purchase(&purchaser, &sale, UNIT_PRICE + 863).unwrap();

    assert_eq!(engine.custodian().balance(), UNIT_PRICE + 863);
    assert_eq!(
        engine.balance_of(&purchaser),
        PURCHASER_FUNDS - UNIT_PRICE - 863
    );
}

// ---------------------------------------------------------------------------
// Bare Transfers
// ---------------------------------------------------------------------------

#[test]
fn purchasing_through_bare_transfer_matches_explicit_purchase() {
    let (mut engine, sale, collection) = deployed_sale();
    let purchaser = Address::new("purchaser");

    let minted = engine.transfer(&purchaser, &sale, UNIT_PRICE).unwrap();
    assert_eq!(minted, Some(1));
    assert_eq!(engine.balance_of(&purchaser), PURCHASER_FUNDS - UNIT_PRICE);
    assert_eq!(engine.custodian().balance(), UNIT_PRICE);
    assert_eq!(
        engine.collection(&collection).unwrap().owner_of(1).unwrap(),
        &purchaser
    );
}

#[test]
fn bare_transfer_below_price_fails_like_a_purchase() {
    let (mut engine, sale, _) = deployed_sale();
    let purchaser = Address::new("purchaser");

    let result = engine.transfer(&purchaser, &sale, UNIT_PRICE - 1);
    assert!(matches!(
        result.unwrap_err(),
        EngineError::Sale(SaleError::InsufficientPayment { .. })
    ));
    assert_eq!(engine.balance_of(&purchaser), PURCHASER_FUNDS);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[test]
fn purchase_emits_received_then_sent() {
    let (mut engine, sale, _) = deployed_sale();
    let purchaser = Address::new("purchaser");
    let treasury = engine.custodian().address().clone();
    engine.take_events(); // discard SaleCreated

    engine.purchase(&purchaser, &sale, UNIT_PRICE).unwrap();
    engine.purchase(&purchaser, &sale, UNIT_PRICE).unwrap();

    let events = engine.take_events();
    assert_eq!(
        events,
        vec![
            Event::Received {
                purchaser: purchaser.clone(),
                token_id: 1,
                amount: UNIT_PRICE,
                units_sold_before: 0,
            },
            Event::Sent {
                treasury: treasury.clone(),
                amount: UNIT_PRICE,
            },
            Event::Received {
                purchaser: purchaser.clone(),
                token_id: 2,
                amount: UNIT_PRICE,
                units_sold_before: 1,
            },
            Event::Sent {
                treasury,
                amount: UNIT_PRICE,
            },
        ]
    );
}

#[test]
fn failed_purchase_emits_nothing() {
    let (mut engine, sale, _) = deployed_sale();
    engine.take_events();

    let _ = engine.purchase(&Address::new("purchaser"), &sale, 1);
    assert!(engine.events().is_empty());
}

// ---------------------------------------------------------------------------
// Treasury Binding
// ---------------------------------------------------------------------------

#[test]
fn get_wallet_returns_custodian_address() {
    let (engine, sale, _) = deployed_sale();
    assert_eq!(
        engine.sale(&sale).unwrap().treasury(),
        engine.custodian().address()
    );
}

// ---------------------------------------------------------------------------
// Scenario from the product brief
// ---------------------------------------------------------------------------

#[test]
fn purchase_then_underpay_scenario() {
    // unit_price 2137, cap 100: one good purchase, one short by 1.
    let (mut engine, sale, collection) = deployed_sale();
    let purchaser = Address::new("purchaser");

    engine.purchase(&purchaser, &sale, 2137).unwrap();
    assert_eq!(engine.sale(&sale).unwrap().units_sold(), 1);
    assert_eq!(engine.custodian().balance(), 2137);
    assert_eq!(
        engine.collection(&collection).unwrap().owner_of(1).unwrap(),
        &purchaser
    );

    let result = engine.purchase(&purchaser, &sale, 2136);
    assert!(matches!(
        result.unwrap_err(),
        EngineError::Sale(SaleError::InsufficientPayment { .. })
    ));
    assert_eq!(engine.sale(&sale).unwrap().units_sold(), 1);
    assert_eq!(engine.custodian().balance(), 2137);
}
