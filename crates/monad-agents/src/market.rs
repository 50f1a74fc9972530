//! Marketplace and peer-to-peer trading.
//!
//! The market stocks a fixed catalog of twelve items. Buying burns the
//! current price and sells one unit; scarcity drives the price up. Selling
//! mints 60% of the current price back. A periodic restock trickles supply
//! back in and relaxes every price one step toward its catalog value.
//!
//! Trade offers let agents swap FUNC or items directly. Acceptance checks
//! both legs before moving anything, so either both legs happen or neither
//! does.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use monad_ledger::{FuncCost, FuncReward, Ledger, LedgerError};
use monad_types::{Agent, AgentId, MarketListing, TradeAsset, TradeId, TradeOffer, TradeStatus};

use crate::dice::Dice;
use crate::social::{TRADE_BOND, bond};

/// Item key, display name and catalog price.
pub const CATALOG: [(&str, &str, u64); 12] = [
    ("karaoke_mic", "Karaoke Mic", 15),
    ("mystery_sauce", "Mystery Sauce", 8),
    ("disco_ball", "Disco Ball", 20),
    ("spy_kit", "Spy Kit", 25),
    ("megaphone", "Megaphone", 12),
    ("confetti_cannon", "Confetti Cannon", 18),
    ("mood_ring", "Mood Ring", 10),
    ("fortune_cookie", "Fortune Cookie", 5),
    ("glow_stick", "Glow Stick Bundle", 8),
    ("golden_spatula", "Golden Spatula", 30),
    ("tinfoil_hat", "Tinfoil Hat", 7),
    ("friendship_bracelet", "Friendship Bracelet Kit", 10),
];

/// Closed (accepted or cancelled) offers kept for queries.
pub const CLOSED_OFFER_CAPACITY: usize = 200;

/// Initial supply range per item.
const INITIAL_SUPPLY: (i32, i32) = (3, 10);

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Pricing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketTuning {
    /// Supply at or below which a sale raises the price.
    pub low_water: u32,
    /// Price multiplier while scarce.
    pub scarce_multiplier: f64,
    /// Price multiplier on selling out.
    pub sold_out_multiplier: f64,
    /// Share of the current price paid for a sold item.
    pub sell_ratio: f64,
    /// Supply above which a sale back to the market relaxes the price.
    pub high_water: u32,
    /// Restock adds a unit to listings below this supply.
    pub restock_below: u32,
}

impl Default for MarketTuning {
    fn default() -> Self {
        Self {
            low_water: 2,
            scarce_multiplier: 1.3,
            sold_out_multiplier: 2.0,
            sell_ratio: 0.6,
            high_water: 8,
            restock_below: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the marketplace and trade offers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    /// The item is not in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The item has no stock.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// The agent does not hold the item.
    #[error("not holding {0}")]
    NotInInventory(String),

    /// No open offer has this id.
    #[error("trade offer not found: {0}")]
    TradeNotFound(TradeId),

    /// The offer was already accepted or cancelled.
    #[error("trade offer {0} is closed")]
    TradeClosed(TradeId),

    /// An agent tried to accept their own offer.
    #[error("cannot accept your own offer")]
    SelfTrade,

    /// Only the seller can cancel an offer.
    #[error("only the seller can cancel offer {0}")]
    NotSeller(TradeId),

    /// A trade leg is malformed (zero FUNC, blank item).
    #[error("invalid trade asset: {0}")]
    InvalidAsset(String),

    /// The seller can no longer deliver what they offered.
    #[error("seller cannot deliver: {0}")]
    SellerCannotDeliver(String),

    /// The buyer cannot pay what is asked.
    #[error("buyer cannot pay: {0}")]
    BuyerCannotPay(String),

    /// A FUNC movement failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    /// Item bought.
    pub item: String,
    /// FUNC burned.
    pub paid: u64,
    /// Price after the sale.
    pub new_price: u64,
    /// Supply after the sale.
    pub supply: u32,
}

/// A completed sale back to the market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    /// Item sold.
    pub item: String,
    /// FUNC minted to the seller.
    pub proceeds: u64,
    /// Supply after the sale.
    pub supply: u32,
}

/// A completed peer-to-peer trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReceipt {
    /// The offer, now accepted.
    pub offer: TradeOffer,
    /// The seller got more FUNC than the catalog value of the item given.
    pub seller_profit: bool,
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

/// Catalog stock plus the peer-to-peer offer book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace {
    /// Stock and price per item key.
    listings: BTreeMap<String, MarketListing>,
    /// Offers awaiting a buyer.
    open: BTreeMap<TradeId, TradeOffer>,
    /// Accepted and cancelled offers, oldest first.
    closed: VecDeque<TradeOffer>,
    /// Pricing knobs.
    #[serde(default)]
    tuning: MarketTuning,
}

/// Scale a price and round up.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scale_up(price: u64, factor: f64) -> u64 {
    (price as f64 * factor).ceil().max(0.0) as u64
}

/// Scale a price and round down.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scale_down(price: u64, factor: f64) -> u64 {
    (price as f64 * factor).floor().max(0.0) as u64
}

/// Move a listing's price one step toward its catalog price.
const fn relax(listing: &mut MarketListing) {
    if listing.price < listing.base_price {
        listing.price = listing.price.saturating_add(1);
    } else if listing.price > listing.base_price {
        listing.price = listing.price.saturating_sub(1);
    }
}

/// Catalog price of an item key.
pub fn base_price(item: &str) -> Option<u64> {
    CATALOG
        .iter()
        .find(|(key, _, _)| *key == item)
        .map(|(_, _, price)| *price)
}

impl Marketplace {
    /// Open the market with rolled starting supply.
    pub fn new(tuning: MarketTuning, dice: &mut impl Dice) -> Self {
        let listings = CATALOG
            .iter()
            .map(|(key, _, price)| {
                let supply = u32::try_from(dice.between(INITIAL_SUPPLY.0, INITIAL_SUPPLY.1)).unwrap_or(3);
                (
                    (*key).to_owned(),
                    MarketListing {
                        base_price: *price,
                        price: *price,
                        supply,
                    },
                )
            })
            .collect();
        Self {
            listings,
            open: BTreeMap::new(),
            closed: VecDeque::new(),
            tuning,
        }
    }

    /// The listing for an item key.
    pub fn listing(&self, item: &str) -> Option<MarketListing> {
        self.listings.get(item).copied()
    }

    /// Every listing, by item key.
    pub const fn listings(&self) -> &BTreeMap<String, MarketListing> {
        &self.listings
    }

    /// Mutable access to one listing.
    pub fn listing_mut(&mut self, item: &str) -> Option<&mut MarketListing> {
        self.listings.get_mut(item)
    }

    // -- catalog ----------------------------------------------------------

    /// Buy one unit of `item` at the current price.
    ///
    /// # Errors
    ///
    /// `UnknownItem`, `OutOfStock`, or a ledger error (typically
    /// insufficient funds) with nothing changed.
    pub fn buy(&mut self, item: &str, agent: &mut Agent, ledger: &mut Ledger, tick: u64) -> Result<Purchase, MarketError> {
        let tuning = self.tuning;
        let listing = self
            .listings
            .get_mut(item)
            .ok_or_else(|| MarketError::UnknownItem(item.to_owned()))?;
        if listing.supply == 0 {
            return Err(MarketError::OutOfStock(item.to_owned()));
        }

        let paid = listing.price;
        ledger.spend(agent, paid, FuncCost::BuyItem.as_str(), tick)?;
        agent.inventory.push(item.to_owned());
        listing.supply = listing.supply.saturating_sub(1);

        if listing.supply == 0 {
            listing.price = scale_up(paid, tuning.sold_out_multiplier);
        } else if listing.supply <= tuning.low_water {
            listing.price = scale_up(paid, tuning.scarce_multiplier);
        }

        debug!(tick, agent = %agent.id, item, paid, supply = listing.supply, price = listing.price, "item bought");
        Ok(Purchase {
            item: item.to_owned(),
            paid,
            new_price: listing.price,
            supply: listing.supply,
        })
    }

    /// Sell one held unit of `item` back to the market.
    ///
    /// # Errors
    ///
    /// `UnknownItem`, `NotInInventory`, or a ledger error.
    pub fn sell(&mut self, item: &str, agent: &mut Agent, ledger: &mut Ledger, tick: u64) -> Result<Sale, MarketError> {
        let tuning = self.tuning;
        let listing = self
            .listings
            .get_mut(item)
            .ok_or_else(|| MarketError::UnknownItem(item.to_owned()))?;
        if !agent.holds(item) {
            return Err(MarketError::NotInInventory(item.to_owned()));
        }

        let proceeds = scale_down(listing.price, tuning.sell_ratio).max(1);
        ledger.mint(agent, proceeds, FuncReward::SellItem.as_str(), tick)?;
        agent.take_item(item);
        listing.supply = listing.supply.saturating_add(1);
        if listing.supply > tuning.high_water {
            relax(listing);
        }

        debug!(tick, agent = %agent.id, item, proceeds, supply = listing.supply, "item sold");
        Ok(Sale {
            item: item.to_owned(),
            proceeds,
            supply: listing.supply,
        })
    }

    /// Trickle stock back and relax prices. Returns how many listings
    /// gained a unit.
    pub fn restock(&mut self) -> usize {
        let mut restocked = 0_usize;
        for listing in self.listings.values_mut() {
            if listing.supply < self.tuning.restock_below {
                listing.supply = listing.supply.saturating_add(1);
                restocked = restocked.saturating_add(1);
            }
            relax(listing);
        }
        debug!(restocked, "market restocked");
        restocked
    }

    // -- offers -----------------------------------------------------------

    /// Post a trade offer.
    ///
    /// # Errors
    ///
    /// `InvalidAsset` for malformed legs, `SellerCannotDeliver` if the
    /// seller does not hold the offering right now.
    pub fn create_offer(
        &mut self,
        seller: &Agent,
        offering: TradeAsset,
        asking: TradeAsset,
        tick: u64,
    ) -> Result<&TradeOffer, MarketError> {
        validate_asset(&offering)?;
        validate_asset(&asking)?;
        if !can_deliver(seller, &offering) {
            return Err(MarketError::SellerCannotDeliver(describe(&offering)));
        }

        let offer = TradeOffer {
            id: TradeId::new(),
            seller: seller.id,
            offering,
            asking,
            status: TradeStatus::Open,
            buyer: None,
            created_tick: tick,
            resolved_tick: None,
        };
        info!(tick, trade = %offer.id, seller = %seller.id, "trade offer posted");
        let id = offer.id;
        Ok(self.open.entry(id).or_insert(offer))
    }

    /// Look up an offer, open or closed.
    pub fn offer(&self, trade_id: TradeId) -> Option<&TradeOffer> {
        self.open
            .get(&trade_id)
            .or_else(|| self.closed.iter().find(|offer| offer.id == trade_id))
    }

    /// Accept an open offer. `seller` must be the offer's seller.
    ///
    /// # Errors
    ///
    /// `TradeNotFound`, `TradeClosed`, `SelfTrade`, `SellerCannotDeliver`
    /// or `BuyerCannotPay`. Nothing moves on error.
    pub fn accept_offer(
        &mut self,
        trade_id: TradeId,
        seller: &mut Agent,
        buyer: &mut Agent,
        ledger: &mut Ledger,
        tick: u64,
    ) -> Result<TradeReceipt, MarketError> {
        let Some(offer) = self.open.get(&trade_id) else {
            if self.closed.iter().any(|offer| offer.id == trade_id) {
                return Err(MarketError::TradeClosed(trade_id));
            }
            return Err(MarketError::TradeNotFound(trade_id));
        };
        if offer.seller == buyer.id {
            return Err(MarketError::SelfTrade);
        }
        if offer.seller != seller.id {
            return Err(MarketError::TradeNotFound(trade_id));
        }

        // Check both legs before moving anything.
        check_leg(seller, buyer.id, &offer.offering).map_err(MarketError::SellerCannotDeliver)?;
        check_leg(buyer, seller.id, &offer.asking).map_err(MarketError::BuyerCannotPay)?;
        if let (TradeAsset::Func(give), TradeAsset::Func(take)) = (&offer.offering, &offer.asking) {
            let seller_after = seller.func.saturating_sub(*give).checked_add(*take);
            let buyer_after = buyer.func.saturating_sub(*take).checked_add(*give);
            if seller_after.is_none() || buyer_after.is_none() {
                return Err(MarketError::Ledger(LedgerError::Overflow));
            }
        }

        let mut offer = self
            .open
            .remove(&trade_id)
            .ok_or(MarketError::TradeNotFound(trade_id))?;
        move_leg(seller, buyer, &offer.offering, ledger, tick)?;
        move_leg(buyer, seller, &offer.asking, ledger, tick)?;

        bond(seller, buyer, TRADE_BOND, TRADE_BOND, "traded", tick);
        seller.trade_count = seller.trade_count.saturating_add(1);
        buyer.trade_count = buyer.trade_count.saturating_add(1);

        let seller_profit = match (&offer.offering, &offer.asking) {
            (TradeAsset::Item(item), TradeAsset::Func(amount)) => {
                base_price(item).is_some_and(|value| *amount > value)
            }
            (TradeAsset::Func(give), TradeAsset::Func(take)) => take > give,
            _ => false,
        };

        offer.status = TradeStatus::Accepted;
        offer.buyer = Some(buyer.id);
        offer.resolved_tick = Some(tick);
        info!(tick, trade = %trade_id, seller = %seller.id, buyer = %buyer.id, "trade accepted");
        self.close(offer.clone());
        Ok(TradeReceipt { offer, seller_profit })
    }

    /// Withdraw an open offer.
    ///
    /// # Errors
    ///
    /// `TradeNotFound`, `TradeClosed` or `NotSeller`.
    pub fn cancel_offer(&mut self, trade_id: TradeId, agent: AgentId, tick: u64) -> Result<TradeOffer, MarketError> {
        let Some(offer) = self.open.get(&trade_id) else {
            if self.closed.iter().any(|offer| offer.id == trade_id) {
                return Err(MarketError::TradeClosed(trade_id));
            }
            return Err(MarketError::TradeNotFound(trade_id));
        };
        if offer.seller != agent {
            return Err(MarketError::NotSeller(trade_id));
        }
        let mut offer = self
            .open
            .remove(&trade_id)
            .ok_or(MarketError::TradeNotFound(trade_id))?;
        offer.status = TradeStatus::Cancelled;
        offer.resolved_tick = Some(tick);
        debug!(tick, trade = %trade_id, "trade offer cancelled");
        self.close(offer.clone());
        Ok(offer)
    }

    /// Offers awaiting a buyer, oldest first.
    pub fn open_offers(&self) -> impl Iterator<Item = &TradeOffer> {
        self.open.values()
    }

    /// Accepted and cancelled offers, oldest first.
    pub fn closed_offers(&self) -> impl Iterator<Item = &TradeOffer> {
        self.closed.iter()
    }

    fn close(&mut self, offer: TradeOffer) {
        self.closed.push_back(offer);
        while self.closed.len() > CLOSED_OFFER_CAPACITY {
            self.closed.pop_front();
        }
    }
}

// ---------------------------------------------------------------------------
// Leg helpers
// ---------------------------------------------------------------------------

fn describe(asset: &TradeAsset) -> String {
    match asset {
        TradeAsset::Func(amount) => format!("{amount} FUNC"),
        TradeAsset::Item(item) => item.clone(),
    }
}

fn validate_asset(asset: &TradeAsset) -> Result<(), MarketError> {
    match asset {
        TradeAsset::Func(0) => Err(MarketError::InvalidAsset("FUNC amount must be positive".to_owned())),
        TradeAsset::Item(item) if item.trim().is_empty() => {
            Err(MarketError::InvalidAsset("item name cannot be blank".to_owned()))
        }
        _ => Ok(()),
    }
}

fn can_deliver(agent: &Agent, asset: &TradeAsset) -> bool {
    match asset {
        TradeAsset::Func(amount) => agent.func >= *amount,
        TradeAsset::Item(item) => agent.holds(item),
    }
}

fn check_leg(from: &Agent, to: AgentId, asset: &TradeAsset) -> Result<(), String> {
    match asset {
        TradeAsset::Func(amount) => Ledger::check_transfer(from, to, *amount).map_err(|err| err.to_string()),
        TradeAsset::Item(item) if from.holds(item) => Ok(()),
        TradeAsset::Item(item) => Err(format!("not holding {item}")),
    }
}

fn move_leg(
    from: &mut Agent,
    to: &mut Agent,
    asset: &TradeAsset,
    ledger: &mut Ledger,
    tick: u64,
) -> Result<(), MarketError> {
    match asset {
        TradeAsset::Func(amount) => ledger.transfer(from, to, *amount, "trade", tick)?,
        TradeAsset::Item(item) => {
            if !from.take_item(item) {
                return Err(MarketError::NotInInventory(item.clone()));
            }
            to.inventory.push(item.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use monad_types::{Mood, Personality};

    use super::*;
    use crate::dice::ScriptedDice;

    fn make_agent(name: &str) -> Agent {
        Agent::new(name, Personality::Schemer, BTreeMap::new(), Mood::Scheming, 0)
    }

    fn funded(ledger: &mut Ledger, name: &str, func: u64) -> Agent {
        let mut agent = make_agent(name);
        ledger.mint(&mut agent, func, "registration", 0).unwrap();
        agent
    }

    fn market() -> Marketplace {
        // 0.5 on 3..=10 gives 7 units of everything.
        Marketplace::new(MarketTuning::default(), &mut ScriptedDice::new([0.5; 12]))
    }

    #[test]
    fn opening_stock_is_rolled() {
        let m = market();
        assert_eq!(m.listings().len(), 12);
        let mic = m.listing("karaoke_mic").unwrap();
        assert_eq!(mic.supply, 7);
        assert_eq!(mic.price, 15);
    }

    #[test]
    fn buying_the_last_unit_doubles_the_price() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut ada = funded(&mut ledger, "Ada", 100);
        m.listing_mut("spy_kit").unwrap().supply = 1;

        let purchase = m.buy("spy_kit", &mut ada, &mut ledger, 1).unwrap();
        assert_eq!(purchase.paid, 25);
        assert_eq!(purchase.supply, 0);
        assert_eq!(m.listing("spy_kit").unwrap().price, 50);
        assert_eq!(ada.func, 75);
        assert!(ada.holds("spy_kit"));

        let err = m.buy("spy_kit", &mut ada, &mut ledger, 2).unwrap_err();
        assert_eq!(err, MarketError::OutOfStock("spy_kit".into()));
    }

    #[test]
    fn scarcity_raises_price_rounding_up() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut ada = funded(&mut ledger, "Ada", 100);
        m.listing_mut("megaphone").unwrap().supply = 3;
        m.buy("megaphone", &mut ada, &mut ledger, 1).unwrap();
        // 12 * 1.3 = 15.6
        assert_eq!(m.listing("megaphone").unwrap().price, 16);
    }

    #[test]
    fn failed_purchase_changes_nothing() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut ada = funded(&mut ledger, "Ada", 10);
        let err = m.buy("golden_spatula", &mut ada, &mut ledger, 1).unwrap_err();
        assert!(matches!(err, MarketError::Ledger(LedgerError::InsufficientFunds { .. })));
        assert_eq!(ada.func, 10);
        assert!(ada.inventory.is_empty());
        assert_eq!(m.listing("golden_spatula").unwrap().supply, 7);
        assert!(matches!(
            m.buy("jetpack", &mut ada, &mut ledger, 1),
            Err(MarketError::UnknownItem(_))
        ));
    }

    #[test]
    fn selling_pays_sixty_percent() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut ada = funded(&mut ledger, "Ada", 1);
        ada.inventory.push("fortune_cookie".into());
        let sale = m.sell("fortune_cookie", &mut ada, &mut ledger, 1).unwrap();
        assert_eq!(sale.proceeds, 3);
        assert_eq!(ada.func, 4);
        assert_eq!(sale.supply, 8);
        assert!(matches!(
            m.sell("fortune_cookie", &mut ada, &mut ledger, 2),
            Err(MarketError::NotInInventory(_))
        ));
    }

    #[test]
    fn restock_relaxes_prices() {
        let mut m = market();
        {
            let listing = m.listing_mut("disco_ball").unwrap();
            listing.supply = 0;
            listing.price = 40;
        }
        m.restock();
        let listing = m.listing("disco_ball").unwrap();
        assert_eq!(listing.supply, 1);
        assert_eq!(listing.price, 39);
    }

    #[test]
    fn trade_moves_both_legs() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut seller = funded(&mut ledger, "Sy", 10);
        let mut buyer = funded(&mut ledger, "By", 50);
        seller.inventory.push("disco_ball".into());

        let id = m
            .create_offer(&seller, TradeAsset::Item("disco_ball".into()), TradeAsset::Func(30), 1)
            .unwrap()
            .id;
        let receipt = m.accept_offer(id, &mut seller, &mut buyer, &mut ledger, 2).unwrap();
        assert!(receipt.seller_profit);
        assert_eq!(receipt.offer.status, TradeStatus::Accepted);
        assert_eq!(seller.func, 40);
        assert_eq!(buyer.func, 20);
        assert!(buyer.holds("disco_ball"));
        assert!(!seller.holds("disco_ball"));
        assert_eq!(seller.affinity_toward(buyer.id), 5);
        assert_eq!(buyer.trade_count, 1);
        assert_eq!(m.open_offers().count(), 0);
    }

    #[test]
    fn unpayable_trade_moves_nothing() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut seller = funded(&mut ledger, "Sy", 10);
        let mut buyer = funded(&mut ledger, "By", 5);
        seller.inventory.push("mood_ring".into());
        let id = m
            .create_offer(&seller, TradeAsset::Item("mood_ring".into()), TradeAsset::Func(30), 1)
            .unwrap()
            .id;
        let err = m.accept_offer(id, &mut seller, &mut buyer, &mut ledger, 2).unwrap_err();
        assert!(matches!(err, MarketError::BuyerCannotPay(_)));
        assert!(seller.holds("mood_ring"));
        assert_eq!(buyer.func, 5);
        assert_eq!(m.open_offers().count(), 1);
    }

    #[test]
    fn offers_require_holdings_and_seller_cancels() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let seller = funded(&mut ledger, "Sy", 10);
        let other = make_agent("Ot");
        assert!(matches!(
            m.create_offer(&seller, TradeAsset::Func(11), TradeAsset::Item("x".into()), 1),
            Err(MarketError::SellerCannotDeliver(_))
        ));
        assert!(matches!(
            m.create_offer(&seller, TradeAsset::Func(0), TradeAsset::Item("x".into()), 1),
            Err(MarketError::InvalidAsset(_))
        ));
        let id = m
            .create_offer(&seller, TradeAsset::Func(5), TradeAsset::Item("x".into()), 1)
            .unwrap()
            .id;
        assert_eq!(m.cancel_offer(id, other.id, 2).unwrap_err(), MarketError::NotSeller(id));
        let cancelled = m.cancel_offer(id, seller.id, 2).unwrap();
        assert_eq!(cancelled.status, TradeStatus::Cancelled);
        assert_eq!(m.cancel_offer(id, seller.id, 3).unwrap_err(), MarketError::TradeClosed(id));
    }

    #[test]
    fn self_acceptance_is_rejected() {
        let mut ledger = Ledger::default();
        let mut m = market();
        let mut seller = funded(&mut ledger, "Sy", 10);
        let mut twin = seller.clone();
        let id = m
            .create_offer(&seller, TradeAsset::Func(5), TradeAsset::Item("x".into()), 1)
            .unwrap()
            .id;
        let err = m.accept_offer(id, &mut seller, &mut twin, &mut ledger, 2).unwrap_err();
        assert_eq!(err, MarketError::SelfTrade);
    }
}
