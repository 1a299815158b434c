//! The engine facade: table registry, chip economy, admin controls, and
//! the read-only observability surface.
//!
//! One `Casino` owns every table, the shared ledger, and the sealed-card
//! store. Callers serialize access; every mutating operation validates
//! fully before touching state and reports what happened as events.

use std::collections::BTreeMap;

use commonware_cryptography::ed25519::PublicKey;
use holecard_types::{
    Event, GamePhase, HandResult, SealHandle, SealedCard, Table, TableStatus, MAX_SEATS,
    MAX_TABLES, MIN_PLAYERS,
};

use crate::{
    game::{self, GameDeps},
    ledger::Ledger,
    scheduler,
    seal::SealedCardStore,
    Error,
};

/// Point-in-time public view of a table. Carries seal handles and card
/// counts, never card identities.
#[derive(Clone, Debug)]
pub struct TableSnapshot {
    pub id: u64,
    pub status: TableStatus,
    pub phase: GamePhase,
    pub min_buy_in: u64,
    pub max_buy_in: u64,
    pub min_bet: u64,
    pub seats: Vec<SeatView>,
    pub dealer: DealerView,
    pub cards_remaining: usize,
    pub last_activity: u64,
}

#[derive(Clone, Debug)]
pub struct SeatView {
    pub public: PublicKey,
    pub table_stack: u64,
    pub current_bet: u64,
    pub card_count: usize,
    pub seals: Vec<SealedCard>,
    pub is_active: bool,
    pub has_acted: bool,
}

#[derive(Clone, Debug)]
pub struct DealerView {
    pub card_count: usize,
    pub seals: Vec<SealedCard>,
    pub has_finished: bool,
}

pub struct Casino {
    owner: PublicKey,
    paused: bool,
    beacon: [u8; 32],
    next_table_id: u64,
    tables: BTreeMap<u64, Table>,
    /// One table per actor; values are table ids.
    seated: BTreeMap<PublicKey, u64>,
    ledger: Ledger,
    seals: SealedCardStore,
}

impl Casino {
    /// `seal_seed` is the operator-provided key material for sealing
    /// salts; it must not be derivable from public inputs.
    pub fn new(owner: PublicKey, seal_seed: [u8; 32]) -> Self {
        Self {
            owner,
            paused: false,
            beacon: [0u8; 32],
            next_table_id: 0,
            tables: BTreeMap::new(),
            seated: BTreeMap::new(),
            ledger: Ledger::new(),
            seals: SealedCardStore::new(&seal_seed),
        }
    }

    fn ensure_not_paused(&self) -> Result<(), Error> {
        if self.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }

    fn ensure_owner(&self, actor: &PublicKey) -> Result<(), Error> {
        if *actor != self.owner {
            return Err(Error::NotOwner);
        }
        Ok(())
    }

    /// Wallet conversions and the promo claim are closed to seated
    /// actors; chips at a table only move through table operations.
    fn ensure_not_seated(&self, actor: &PublicKey) -> Result<(), Error> {
        if self.seated.contains_key(actor) {
            return Err(Error::AlreadySeated);
        }
        Ok(())
    }

    // ---- Admin ----

    pub fn pause(&mut self, actor: &PublicKey) -> Result<(), Error> {
        self.ensure_owner(actor)?;
        self.paused = true;
        tracing::info!("engine paused");
        Ok(())
    }

    pub fn unpause(&mut self, actor: &PublicKey) -> Result<(), Error> {
        self.ensure_owner(actor)?;
        self.paused = false;
        tracing::info!("engine unpaused");
        Ok(())
    }

    pub fn transfer_ownership(&mut self, actor: &PublicKey, new_owner: PublicKey) -> Result<(), Error> {
        self.ensure_owner(actor)?;
        tracing::info!(new_owner = ?new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Install the latest external randomness beacon, mixed into every
    /// subsequent shuffle seed.
    pub fn set_randomness_beacon(
        &mut self,
        actor: &PublicKey,
        beacon: [u8; 32],
    ) -> Result<(), Error> {
        self.ensure_owner(actor)?;
        self.beacon = beacon;
        Ok(())
    }

    pub fn fund_bank(&mut self, actor: &PublicKey, amount: u64) -> Result<Vec<Event>, Error> {
        // Deliberately allowed while paused: incident response may need to
        // restore solvency before unpausing.
        self.ensure_owner(actor)?;
        self.ledger.fund_bank(amount)?;
        tracing::info!(amount, bank = self.ledger.bank(), "bank funded");
        Ok(vec![Event::BankFunded { amount }])
    }

    pub fn defund_bank(&mut self, actor: &PublicKey, amount: u64) -> Result<Vec<Event>, Error> {
        self.ensure_owner(actor)?;
        self.ensure_not_paused()?;
        self.ledger.defund_bank(amount)?;
        tracing::info!(amount, bank = self.ledger.bank(), "bank defunded");
        Ok(vec![Event::BankDefunded { amount }])
    }

    // ---- Chip economy ----

    pub fn claim_free_chips(&mut self, actor: &PublicKey) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        self.ensure_not_seated(actor)?;
        let amount = self.ledger.claim_free_chips(actor)?;
        Ok(vec![Event::FreeChipsClaimed {
            player: actor.clone(),
            amount,
        }])
    }

    pub fn buy_chips(
        &mut self,
        actor: &PublicKey,
        funding_amount: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        self.ensure_not_seated(actor)?;
        let chips = self.ledger.buy_chips(actor, funding_amount)?;
        Ok(vec![Event::ChipsPurchased {
            player: actor.clone(),
            chips,
        }])
    }

    pub fn withdraw_chips(&mut self, actor: &PublicKey, chips: u64) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        self.ensure_not_seated(actor)?;
        self.ledger.withdraw_chips(actor, chips)?;
        Ok(vec![Event::ChipsWithdrawn {
            player: actor.clone(),
            chips,
        }])
    }

    // ---- Table registry ----

    pub fn create_table(
        &mut self,
        actor: &PublicKey,
        min_buy_in: u64,
        max_buy_in: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        if min_buy_in == 0 {
            return Err(Error::ZeroAmount);
        }
        if max_buy_in < min_buy_in {
            return Err(Error::InvalidBuyInRange {
                min: min_buy_in,
                max: max_buy_in,
            });
        }
        if self.tables.len() >= MAX_TABLES {
            return Err(Error::TableLimitReached);
        }

        let table_id = self.next_table_id;
        self.next_table_id += 1;
        self.tables
            .insert(table_id, Table::new(table_id, min_buy_in, max_buy_in, now));
        tracing::info!(table_id, min_buy_in, max_buy_in, "table created");
        Ok(vec![Event::TableCreated {
            table_id,
            creator: actor.clone(),
            min_buy_in,
            max_buy_in,
        }])
    }

    pub fn join_table(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        buy_in: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        if self.seated.contains_key(actor) {
            return Err(Error::AlreadySeated);
        }
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        if table.seats.len() >= MAX_SEATS {
            return Err(Error::TableFull);
        }
        if buy_in < table.min_buy_in || buy_in > table.max_buy_in {
            return Err(Error::BuyInOutOfRange {
                min: table.min_buy_in,
                max: table.max_buy_in,
                got: buy_in,
            });
        }

        self.ledger.debit(actor, buy_in)?;
        table.seats.push(holecard_types::Seat::new(actor.clone(), buy_in));
        table.last_activity = now;
        self.seated.insert(actor.clone(), table_id);

        tracing::debug!(table_id, player = ?actor, buy_in, "player joined");
        let mut events = vec![Event::TableJoined {
            table_id,
            player: actor.clone(),
            buy_in,
        }];
        if table.status == TableStatus::Waiting && table.seats.len() >= MIN_PLAYERS {
            table.status = TableStatus::Active;
            events.push(Event::GameStarted { table_id });
        }
        Ok(events)
    }

    /// Stand up at any time. Mid-hand, the escrowed bet is forfeited to
    /// the bank; the stack always returns to the wallet.
    pub fn leave_table(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        self.remove_seat(actor, table_id, now)
    }

    /// Bank the stack and stand up, only between hands.
    pub fn cash_out(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        let table = self
            .tables
            .get(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        if table.hand_in_progress() {
            return Err(Error::HandInProgress);
        }
        self.remove_seat(actor, table_id, now)
    }

    fn remove_seat(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        let index = table.seat_index(actor).ok_or(Error::NotSeated)?;

        let in_hand = table.hand_in_progress();
        let seat = table.seats.remove(index);
        self.seated.remove(actor);

        let (returned, forfeited) = if in_hand {
            (seat.table_stack, seat.current_bet)
        } else {
            // A bet pending the deal is simply refunded.
            (seat.table_stack.saturating_add(seat.current_bet), 0)
        };
        self.ledger.credit(actor, returned);
        if forfeited > 0 {
            self.ledger.credit_bank(forfeited);
        }
        table.last_activity = now;

        tracing::info!(table_id, player = ?actor, returned, forfeited, "player left");
        let mut events = vec![Event::TableLeft {
            table_id,
            player: actor.clone(),
            returned_to_wallet: returned,
            forfeited,
        }];

        if table.seats.len() < MIN_PLAYERS {
            // Not enough players to continue: abort any hand (refunding
            // escrowed bets) and fall back to waiting.
            game::abort_hand(table);
            table.status = TableStatus::Waiting;
            if in_hand {
                events.push(Event::PhaseChanged {
                    table_id,
                    phase: GamePhase::WaitingForPlayers,
                });
            }
        } else if in_hand {
            if table.seats.iter().any(|seat| seat.is_active) {
                // The leaver may have been the last seat holding up the
                // hand.
                let mut deps = GameDeps {
                    ledger: &mut self.ledger,
                    seals: &mut self.seals,
                    beacon: &self.beacon,
                };
                game::finish_if_done(table, &mut deps, actor, now, &mut events)?;
            } else {
                // The only bettor left mid-hand; nothing remains to
                // settle.
                game::reset_hand(table);
                events.push(Event::PhaseChanged {
                    table_id,
                    phase: GamePhase::WaitingForPlayers,
                });
            }
        }
        Ok(events)
    }

    /// Add wallet chips to the table stack, only between hands. The
    /// resulting stack must stay within the table's buy-in ceiling.
    pub fn top_up(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        amount: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        if table.hand_in_progress() {
            return Err(Error::HandInProgress);
        }
        let index = table.seat_index(actor).ok_or(Error::NotSeated)?;
        let new_stack = table.seats[index].table_stack.saturating_add(amount);
        if new_stack > table.max_buy_in {
            return Err(Error::BuyInOutOfRange {
                min: table.min_buy_in,
                max: table.max_buy_in,
                got: new_stack,
            });
        }
        self.ledger.debit(actor, amount)?;
        table.seats[index].table_stack = new_stack;
        table.last_activity = now;
        Ok(vec![])
    }

    // ---- Gameplay ----

    pub fn place_bet(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        amount: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        let mut deps = GameDeps {
            ledger: &mut self.ledger,
            seals: &mut self.seals,
            beacon: &self.beacon,
        };
        game::place_bet(table, &mut deps, actor, amount, now)
    }

    pub fn hit(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        let mut deps = GameDeps {
            ledger: &mut self.ledger,
            seals: &mut self.seals,
            beacon: &self.beacon,
        };
        game::hit(table, &mut deps, actor, now)
    }

    pub fn stand(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        let mut deps = GameDeps {
            ledger: &mut self.ledger,
            seals: &mut self.seals,
            beacon: &self.beacon,
        };
        game::stand(table, &mut deps, actor, now)
    }

    pub fn double_down(
        &mut self,
        actor: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        let mut deps = GameDeps {
            ledger: &mut self.ledger,
            seals: &mut self.seals,
            beacon: &self.beacon,
        };
        game::double_down(table, &mut deps, actor, now)
    }

    /// Anyone may unstick a timed-out table.
    pub fn force_advance(
        &mut self,
        caller: &PublicKey,
        table_id: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        self.ensure_not_paused()?;
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or(Error::TableNotFound(table_id))?;
        let mut deps = GameDeps {
            ledger: &mut self.ledger,
            seals: &mut self.seals,
            beacon: &self.beacon,
        };
        game::force_advance(table, &mut deps, caller, now)
    }

    // ---- Observability ----

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn balance(&self, actor: &PublicKey) -> u64 {
        self.ledger.balance(actor)
    }

    pub fn bank(&self) -> u64 {
        self.ledger.bank()
    }

    /// The table an actor is seated at, if any.
    pub fn seat_of(&self, actor: &PublicKey) -> Option<u64> {
        self.seated.get(actor).copied()
    }

    pub fn is_turn(&self, table_id: u64, actor: &PublicKey) -> bool {
        self.tables
            .get(&table_id)
            .is_some_and(|table| scheduler::is_turn(table, actor))
    }

    pub fn next_actor(&self, table_id: u64) -> Option<PublicKey> {
        self.tables
            .get(&table_id)
            .and_then(|table| scheduler::next_actor(table).cloned())
    }

    pub fn last_hand(&self, table_id: u64) -> Option<&HandResult> {
        self.tables
            .get(&table_id)
            .and_then(|table| table.last_hand.as_ref())
    }

    /// Seal handles for an actor's current hand at a table.
    pub fn hand_seals(&self, table_id: u64, actor: &PublicKey) -> Vec<SealedCard> {
        self.tables
            .get(&table_id)
            .and_then(|table| table.seat(actor))
            .map(|seat| seat.seals.clone())
            .unwrap_or_default()
    }

    /// Dealer seal handles for the last completed hand (public since
    /// settlement).
    pub fn dealer_reveal_seals(&self, table_id: u64) -> Vec<SealedCard> {
        self.last_hand(table_id)
            .map(|result| result.dealer_seals.clone())
            .unwrap_or_default()
    }

    /// Whether an actor may resolve a sealed value off-engine.
    pub fn can_view(&self, handle: SealHandle, actor: &PublicKey) -> bool {
        self.seals.can_view(handle, actor)
    }

    pub fn snapshot(&self, table_id: u64) -> Option<TableSnapshot> {
        let table = self.tables.get(&table_id)?;
        Some(TableSnapshot {
            id: table.id,
            status: table.status,
            phase: table.phase,
            min_buy_in: table.min_buy_in,
            max_buy_in: table.max_buy_in,
            min_bet: table.min_bet(),
            seats: table
                .seats
                .iter()
                .map(|seat| SeatView {
                    public: seat.public.clone(),
                    table_stack: seat.table_stack,
                    current_bet: seat.current_bet,
                    card_count: seat.cards.len(),
                    seals: seat.seals.clone(),
                    is_active: seat.is_active,
                    has_acted: seat.has_acted,
                })
                .collect(),
            dealer: DealerView {
                card_count: table.dealer.cards.len(),
                seals: table.dealer.seals.clone(),
                has_finished: table.dealer.has_finished,
            },
            cards_remaining: table.deck.remaining(),
            last_activity: table.last_activity,
        })
    }

    /// Sum of every stack and escrowed bet across all tables, for
    /// conservation checks.
    #[cfg(test)]
    pub(crate) fn total_on_tables(&self) -> u64 {
        self.tables.values().fold(0u64, |acc, table| {
            table.seats.iter().fold(acc, |acc, seat| {
                acc.saturating_add(seat.table_stack)
                    .saturating_add(seat.current_bet)
            })
        })
    }

    /// Wallets + stacks + escrow + bank, for conservation checks.
    #[cfg(test)]
    pub(crate) fn total_chips(&self) -> u64 {
        self.ledger
            .total_wallets()
            .saturating_add(self.total_on_tables())
            .saturating_add(self.ledger.bank())
    }
}
