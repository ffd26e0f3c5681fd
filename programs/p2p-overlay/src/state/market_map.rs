use std::collections::BTreeMap;

use anchor_lang::prelude::Pubkey;
use solana_program::msg;

use crate::error::{ErrorCode, OverlayResult};
use crate::state::market::Market;
use crate::state::position::{Balance, PositionSide};
use crate::state::registry::PositionRegistry;


/// A market together with the positions of every account in it.
#[derive(Clone, Debug)]
pub struct MarketBook {
    pub market: Market,
    supply_balances: BTreeMap<Pubkey, Balance>,
    borrow_balances: BTreeMap<Pubkey, Balance>,
    suppliers_on_pool: PositionRegistry,
    suppliers_in_p2p: PositionRegistry,
    borrowers_on_pool: PositionRegistry,
    borrowers_in_p2p: PositionRegistry,
    journal: Option<Journal>,
}

/// State of a market before the call in flight touched it.
#[derive(Clone, Debug)]
struct Journal {
    market: Market,
    /// `None` when the account had no position on that side.
    balances: BTreeMap<(Pubkey, PositionSide), Option<Balance>>,
    supply_registries: Option<(PositionRegistry, PositionRegistry)>,
    borrow_registries: Option<(PositionRegistry, PositionRegistry)>,
}

impl MarketBook {
    pub fn new(market: Market, max_ranked_size: u32) -> Self {
        MarketBook {
            market,
            supply_balances: BTreeMap::new(),
            borrow_balances: BTreeMap::new(),
            suppliers_on_pool: PositionRegistry::new(max_ranked_size),
            suppliers_in_p2p: PositionRegistry::new(max_ranked_size),
            borrowers_on_pool: PositionRegistry::new(max_ranked_size),
            borrowers_in_p2p: PositionRegistry::new(max_ranked_size),
            journal: None,
        }
    }

    pub fn get_balance(&self, side: PositionSide, account: &Pubkey) -> Balance {
        self.balances(side)
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    pub fn balances(&self, side: PositionSide) -> &BTreeMap<Pubkey, Balance> {
        match side {
            PositionSide::Supply => &self.supply_balances,
            PositionSide::Borrow => &self.borrow_balances,
        }
    }

    pub fn on_pool_registry(&self, side: PositionSide) -> &PositionRegistry {
        match side {
            PositionSide::Supply => &self.suppliers_on_pool,
            PositionSide::Borrow => &self.borrowers_on_pool,
        }
    }

    pub fn in_p2p_registry(&self, side: PositionSide) -> &PositionRegistry {
        match side {
            PositionSide::Supply => &self.suppliers_in_p2p,
            PositionSide::Borrow => &self.borrowers_in_p2p,
        }
    }

    /// Writes an account's balance and keeps both registries of that side in sync.
    pub fn set_balance(
        &mut self,
        side: PositionSide,
        account: &Pubkey,
        balance: Balance,
    ) -> OverlayResult {
        if let Some(journal) = self.journal.as_mut() {
            let previous = match side {
                PositionSide::Supply => self.supply_balances.get(account).copied(),
                PositionSide::Borrow => self.borrow_balances.get(account).copied(),
            };
            journal.balances.entry((*account, side)).or_insert(previous);

            let (registries, on_pool, in_p2p) = match side {
                PositionSide::Supply => (
                    &mut journal.supply_registries,
                    &self.suppliers_on_pool,
                    &self.suppliers_in_p2p,
                ),
                PositionSide::Borrow => (
                    &mut journal.borrow_registries,
                    &self.borrowers_on_pool,
                    &self.borrowers_in_p2p,
                ),
            };
            if registries.is_none() {
                *registries = Some((on_pool.clone(), in_p2p.clone()));
            }
        }

        self.write_balance(side, account, balance)
    }

    fn write_balance(
        &mut self,
        side: PositionSide,
        account: &Pubkey,
        balance: Balance,
    ) -> OverlayResult {
        let (balances, on_pool, in_p2p) = match side {
            PositionSide::Supply => (
                &mut self.supply_balances,
                &mut self.suppliers_on_pool,
                &mut self.suppliers_in_p2p,
            ),
            PositionSide::Borrow => (
                &mut self.borrow_balances,
                &mut self.borrowers_on_pool,
                &mut self.borrowers_in_p2p,
            ),
        };

        balances.insert(*account, balance);
        on_pool.update(account, balance.on_pool)?;
        in_p2p.update(account, balance.in_p2p)
    }

    pub fn set_max_ranked_size(&mut self, max_ranked_size: u32) -> OverlayResult {
        self.suppliers_on_pool.set_max_ranked_size(max_ranked_size)?;
        self.suppliers_in_p2p.set_max_ranked_size(max_ranked_size)?;
        self.borrowers_on_pool.set_max_ranked_size(max_ranked_size)?;
        self.borrowers_in_p2p.set_max_ranked_size(max_ranked_size)
    }

    pub fn begin_journal(&mut self) {
        self.journal = Some(Journal {
            market: self.market,
            balances: BTreeMap::new(),
            supply_registries: None,
            borrow_registries: None,
        });
    }

    pub fn commit_journal(&mut self) {
        self.journal = None;
    }

    /// Restores the market, every balance written since `begin_journal` and the
    /// registries of each touched side, entry order included.
    pub fn rollback_journal(&mut self) -> OverlayResult {
        let journal = match self.journal.take() {
            Some(journal) => journal,
            None => return Ok(()),
        };

        msg!(
            "rolling back market {} ({} balances)",
            self.market.market_index,
            journal.balances.len()
        );

        self.market = journal.market;
        for ((account, side), balance) in journal.balances {
            let balances = match side {
                PositionSide::Supply => &mut self.supply_balances,
                PositionSide::Borrow => &mut self.borrow_balances,
            };
            match balance {
                Some(balance) => balances.insert(account, balance),
                None => balances.remove(&account),
            };
        }

        if let Some((on_pool, in_p2p)) = journal.supply_registries {
            self.suppliers_on_pool = on_pool;
            self.suppliers_in_p2p = in_p2p;
        }
        if let Some((on_pool, in_p2p)) = journal.borrow_registries {
            self.borrowers_on_pool = on_pool;
            self.borrowers_in_p2p = in_p2p;
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct MarketMap(pub BTreeMap<u16, MarketBook>);

impl MarketMap {
    pub fn get_ref(&self, market_index: &u16) -> OverlayResult<&MarketBook> {
        self.0.get(market_index).ok_or_else(|| {
            msg!("market {} not found", market_index);
            ErrorCode::MarketNotFound
        })
    }

    pub fn get_ref_mut(&mut self, market_index: &u16) -> OverlayResult<&mut MarketBook> {
        self.0.get_mut(market_index).ok_or_else(|| {
            msg!("market {} not found", market_index);
            ErrorCode::MarketNotFound
        })
    }

    pub fn find_by_underlying(&self, underlying: &Pubkey) -> Option<u16> {
        self.0
            .values()
            .find(|book| book.market.underlying == *underlying)
            .map(|book| book.market.market_index)
    }

    pub fn insert(&mut self, book: MarketBook) -> OverlayResult {
        let market_index = book.market.market_index;
        if self.0.contains_key(&market_index) {
            msg!("market {} already initialized", market_index);
            return Err(ErrorCode::MarketIndexAlreadyInitialized);
        }

        self.0.insert(market_index, book);
        Ok(())
    }
}
