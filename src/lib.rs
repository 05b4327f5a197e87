use js_sys::Function;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

mod game;
mod hand;
mod mode;
mod session;
mod shoe;
mod side_bet;
mod stats;
mod strategy;

pub use game::{Game, GameSnapshot, HandView, Phase};
pub use hand::Hand;
pub use mode::Mode;
pub use session::{ActionFeedback, SessionStats};
pub use shoe::{Card, Rank, Shoe, Suit};
pub use side_bet::{SideBet, SideBetType};
pub use stats::StatsRecord;
pub use strategy::{Action, Recommendation};

fn default_bankroll() -> i64 {
    1000
}

fn default_num_decks() -> u8 {
    6
}

#[derive(Debug, Deserialize)]
pub struct TableConfig {
    pub mode: mode::Mode,
    #[serde(default = "default_bankroll")]
    pub bankroll: i64,
    #[serde(default = "default_num_decks")]
    pub num_decks: u8,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[wasm_bindgen]
pub struct Table {
    game: game::Game,
    sync: stats::StatsSync,
    save: Option<Function>,
}

#[wasm_bindgen]
impl Table {
    #[wasm_bindgen(constructor)]
    pub fn new(config: &JsValue) -> Result<Table, JsValue> {
        console_error_panic_hook::set_once();
        let config: TableConfig = serde_wasm_bindgen::from_value(config.clone())
            .map_err(|err| JsValue::from_str(&format!("Invalid table config: {err}")))?;

        Ok(Table {
            game: game::Game::new(config.mode, config.bankroll, config.num_decks, config.seed),
            sync: stats::StatsSync::new(config.bankroll),
            save: None,
        })
    }

    /// Seeds previously persisted totals. Null, undefined or malformed
    /// stored stats fall back to the defaults rather than failing.
    pub fn load_stats(&mut self, stored: &JsValue) {
        if stored.is_null() || stored.is_undefined() {
            return;
        }
        match serde_wasm_bindgen::from_value::<stats::StatsRecord>(stored.clone()) {
            Ok(record) => {
                if self.persist_enabled_mode() {
                    self.game.set_bankroll(record.bankroll);
                }
                self.sync.load(record);
            }
            Err(err) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "Ignoring unreadable stored stats: {err}"
                )));
            }
        }
    }

    pub fn set_save_callback(&mut self, callback: Option<Function>) {
        self.save = callback;
    }

    pub fn place_bet(&mut self, amount: i32) {
        self.game.place_bet(amount as i64);
        self.mark_changed();
    }

    pub fn place_side_bet(&mut self, bet_type: &JsValue, amount: i32) {
        let Ok(bet_type) = serde_wasm_bindgen::from_value::<side_bet::SideBetType>(bet_type.clone())
        else {
            return;
        };
        self.game.place_side_bet(bet_type, amount as i64);
        self.mark_changed();
    }

    pub fn remove_side_bet(&mut self, bet_type: &JsValue) {
        let Ok(bet_type) = serde_wasm_bindgen::from_value::<side_bet::SideBetType>(bet_type.clone())
        else {
            return;
        };
        self.game.remove_side_bet(bet_type);
        self.mark_changed();
    }

    pub fn deal(&mut self) {
        self.game.deal();
        self.mark_changed();
    }

    pub fn hit(&mut self) {
        self.game.hit();
        self.mark_changed();
    }

    pub fn stand(&mut self) {
        self.game.stand();
        self.mark_changed();
    }

    pub fn double_down(&mut self) {
        self.game.double_down();
        self.mark_changed();
    }

    pub fn split(&mut self) {
        self.game.split();
        self.mark_changed();
    }

    pub fn surrender(&mut self) {
        self.game.surrender();
        self.mark_changed();
        self.save_if_round_done();
    }

    pub fn new_round(&mut self) {
        self.game.new_round();
    }

    /// Applies one deferred transition. The UI calls this after whatever
    /// pause its animations want; returns false once the queue is empty.
    pub fn step(&mut self) -> bool {
        let progressed = self.game.step();
        if progressed {
            self.mark_changed();
            self.save_if_round_done();
        }
        progressed
    }

    pub fn has_pending(&self) -> bool {
        self.game.has_pending()
    }

    pub fn resolve(&mut self) {
        while self.step() {}
    }

    /// Leaves the table mid-session: in-flight transitions are discarded and
    /// the cumulative stats go out one last time.
    pub fn exit(&mut self) {
        self.game.exit();
        self.flush_stats();
    }

    /// Debounce pump; the UI calls this on a coarse timer.
    pub fn tick(&mut self) {
        if !self.persistence_active() {
            return;
        }
        if let Some(record) =
            self.sync
                .poll(js_sys::Date::now(), self.game.session(), self.game.bankroll())
        {
            self.push_save(record);
        }
    }

    pub fn flush_stats(&mut self) {
        if !self.persistence_active() {
            return;
        }
        let record = self.sync.flush(self.game.session(), self.game.bankroll());
        self.push_save(record);
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.game.snapshot())
            .map_err(|err| JsValue::from_str(&format!("Snapshot serialization failed: {err}")))
    }

    pub fn session_stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.game.session())
            .map_err(|err| JsValue::from_str(&format!("Stats serialization failed: {err}")))
    }

    pub fn hint(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.game.hint())
            .map_err(|err| JsValue::from_str(&format!("Hint serialization failed: {err}")))
    }

    pub fn feedback(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.game.feedback())
            .map_err(|err| JsValue::from_str(&format!("Feedback serialization failed: {err}")))
    }
}

impl Table {
    fn persist_enabled_mode(&self) -> bool {
        self.game.mode().config().persist_stats
    }

    fn persistence_active(&self) -> bool {
        self.save.is_some() && self.persist_enabled_mode()
    }

    fn mark_changed(&mut self) {
        if self.persistence_active() {
            self.sync.mark_dirty(js_sys::Date::now());
        }
    }

    // Settled rounds write through immediately, on top of the debounce.
    fn save_if_round_done(&mut self) {
        if self.game.has_pending() {
            return;
        }
        if self.game.phase() == Phase::Finished {
            self.flush_stats();
        }
    }

    // Save failures are logged and swallowed; gameplay never waits on the
    // stats repository.
    fn push_save(&self, record: stats::StatsRecord) {
        let Some(callback) = &self.save else {
            return;
        };
        let payload = match serde_wasm_bindgen::to_value(&record) {
            Ok(value) => value,
            Err(err) => {
                web_sys::console::error_1(&JsValue::from_str(&format!(
                    "Stats record serialization failed: {err}"
                )));
                return;
            }
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
            web_sys::console::error_1(&err);
        }
    }
}
