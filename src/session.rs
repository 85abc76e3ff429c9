//! Debounced recalculation session around one household snapshot
//!
//! Edits mark the session dirty and push back a short deadline; `poll`
//! runs a single calculation once the deadline has passed, so a burst of
//! edits costs one projection. A failed calculation latches the session
//! until `retry` is called.

use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::error::SessionError;
use crate::household::{CalculatorData, FinancialInputs, HouseholdInfo, IncomeSource, Owner, RetirementAccount};
use crate::projection::{ProjectionEngine, ProjectionSummary};
use crate::storage::SnapshotStore;

/// Quiet period after the last edit before recalculating
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Receives the outcome of each calculation the session runs
pub trait CalculationObserver {
    fn on_success(&mut self, _summary: &ProjectionSummary) {}

    /// `message` is the session's stored error text
    fn on_failure(&mut self, _message: &str) {}
}

pub struct CalculatorSession {
    data: Option<CalculatorData>,
    engine: ProjectionEngine,
    store: Option<SnapshotStore>,
    observers: Vec<Box<dyn CalculationObserver>>,
    summary: Option<ProjectionSummary>,
    error: Option<String>,
    blocked: bool,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl CalculatorSession {
    /// Session over `data`, due for a first calculation immediately
    pub fn new(data: CalculatorData) -> Self {
        Self {
            data: Some(data),
            engine: ProjectionEngine::default(),
            store: None,
            observers: Vec::new(),
            summary: None,
            error: None,
            blocked: false,
            debounce: DEFAULT_DEBOUNCE,
            deadline: Some(Instant::now()),
        }
    }

    /// Session with nothing loaded; edits are ignored until data is set
    pub fn empty() -> Self {
        Self {
            data: None,
            deadline: None,
            ..Self::new(CalculatorData::default_snapshot(0))
        }
    }

    /// Resume from a store: primary file, autosave copy, or the default snapshot
    pub fn from_store(store: SnapshotStore, current_year: i32) -> Self {
        let data = store.load().unwrap_or_else(|| {
            info!("No saved data found, starting from the default snapshot");
            CalculatorData::default_snapshot(current_year)
        });
        Self::new(data).with_store(store)
    }

    pub fn with_engine(mut self, engine: ProjectionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn CalculationObserver>) {
        self.observers.push(observer);
    }

    pub fn data(&self) -> Option<&CalculatorData> {
        self.data.as_ref()
    }

    /// Result of the last successful calculation
    pub fn summary(&self) -> Option<&ProjectionSummary> {
        self.summary.as_ref()
    }

    /// Message of the last failure, cleared by the next success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// An edit is waiting for its deadline
    pub fn is_dirty(&self) -> bool {
        self.deadline.is_some()
    }

    /// Replace the whole snapshot
    pub fn set_data(&mut self, data: CalculatorData) {
        self.data = Some(data);
        self.mark_dirty();
    }

    pub fn update_household(&mut self, household: HouseholdInfo) {
        self.edit(|data| data.household = household);
    }

    pub fn update_financial_inputs(&mut self, inputs: FinancialInputs) {
        self.edit(|data| data.financial_inputs = inputs);
    }

    pub fn add_account(&mut self, account: RetirementAccount) {
        self.edit(|data| data.accounts.push(account));
    }

    /// Replace the account with a matching id
    pub fn update_account(&mut self, id: &str, account: RetirementAccount) {
        self.edit(|data| {
            if let Some(slot) = data.accounts.iter_mut().find(|a| a.id == id) {
                *slot = account;
            }
        });
    }

    pub fn delete_account(&mut self, id: &str) {
        self.edit(|data| data.accounts.retain(|a| a.id != id));
    }

    pub fn add_income_source(&mut self, source: IncomeSource, owner: Owner) {
        self.edit(|data| income_sources_mut(data, owner).push(source));
    }

    pub fn update_income_source(&mut self, id: &str, source: IncomeSource, owner: Owner) {
        self.edit(|data| {
            if let Some(slot) = income_sources_mut(data, owner).iter_mut().find(|s| s.id == id) {
                *slot = source;
            }
        });
    }

    pub fn delete_income_source(&mut self, id: &str, owner: Owner) {
        self.edit(|data| income_sources_mut(data, owner).retain(|s| s.id != id));
    }

    /// Run the pending calculation if its deadline has passed
    ///
    /// Returns Ok(true) when a calculation ran, Ok(false) when nothing was
    /// due, and `Blocked` while the error latch is set.
    pub fn poll(&mut self, now: Instant) -> Result<bool, SessionError> {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return Ok(false),
        }
        if self.blocked {
            return Err(SessionError::Blocked);
        }
        self.deadline = None;
        self.recalculate().map(|_| true)
    }

    /// Clear the error latch and recalculate at once
    pub fn retry(&mut self) -> Result<&ProjectionSummary, SessionError> {
        self.blocked = false;
        self.deadline = None;
        self.recalculate()
    }

    fn recalculate(&mut self) -> Result<&ProjectionSummary, SessionError> {
        let data = self.data.as_ref().ok_or(SessionError::NoData)?;

        if let Some(store) = &self.store {
            if let Err(err) = store.save(data) {
                warn!("Failed to save calculator data: {err}");
            }
        }

        match self.engine.calculate(data) {
            Ok(summary) => {
                info!(
                    "Calculation complete: {} years, final value {:.2}",
                    summary.projections.len(),
                    summary.final_portfolio_value
                );
                for observer in &mut self.observers {
                    observer.on_success(&summary);
                }
                self.error = None;
                Ok(self.summary.insert(summary))
            }
            Err(err) => {
                let message = format!("Calculation failed: {err}");
                error!("{message}");
                for observer in &mut self.observers {
                    observer.on_failure(&message);
                }
                self.error = Some(message);
                self.blocked = true;
                Err(err.into())
            }
        }
    }

    fn edit<F: FnOnce(&mut CalculatorData)>(&mut self, f: F) {
        if let Some(data) = self.data.as_mut() {
            f(data);
            self.mark_dirty();
        }
    }

    fn mark_dirty(&mut self) {
        self.deadline = Some(Instant::now() + self.debounce);
    }
}

fn income_sources_mut(data: &mut CalculatorData, owner: Owner) -> &mut Vec<IncomeSource> {
    match owner {
        Owner::User => &mut data.income_sources_user,
        Owner::Spouse => &mut data.income_sources_spouse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalculationError;
    use crate::household::{AccountType, IncomeOwner, PersonalInfo};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        successes: Vec<usize>,
        failures: Vec<String>,
    }

    struct SharedRecorder(Rc<RefCell<Recorder>>);

    impl CalculationObserver for SharedRecorder {
        fn on_success(&mut self, summary: &ProjectionSummary) {
            self.0.borrow_mut().successes.push(summary.projections.len());
        }

        fn on_failure(&mut self, message: &str) {
            self.0.borrow_mut().failures.push(message.to_string());
        }
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(1)
    }

    #[test]
    fn test_first_poll_calculates() {
        let mut session = CalculatorSession::new(CalculatorData::default_snapshot(2024));
        assert!(session.poll(Instant::now()).unwrap());
        assert_eq!(session.summary().map(|s| s.projections.len()), Some(37));
        assert!(!session.poll(later()).unwrap());
    }

    #[test]
    fn test_edits_are_debounced() {
        let mut session = CalculatorSession::new(CalculatorData::default_snapshot(2024));
        session.poll(Instant::now()).unwrap();

        let recorder = Rc::new(RefCell::new(Recorder::default()));
        session.add_observer(Box::new(SharedRecorder(recorder.clone())));

        let mut inputs = FinancialInputs::default();
        inputs.monthly_retirement_budget = 9000.0;
        session.update_financial_inputs(inputs);
        session.add_account(RetirementAccount::new("2", "IRA", AccountType::RothIra, Owner::User, 10_000.0));

        assert!(session.is_dirty());
        assert!(!session.poll(Instant::now()).unwrap());
        assert!(session.poll(later()).unwrap());
        assert!(!session.is_dirty());

        assert_eq!(recorder.borrow().successes, vec![37]);
        let first = &session.summary().unwrap().projections[0];
        assert_eq!(first.account_balances.len(), 2);
    }

    #[test]
    fn test_error_latch_until_retry() {
        let mut session = CalculatorSession::new(CalculatorData::default_snapshot(2024));
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        session.add_observer(Box::new(SharedRecorder(recorder.clone())));

        let mut household = HouseholdInfo::single(2024, PersonalInfo::new("A", 1970, 65, 90));
        household.user.life_expectancy_age = 200;
        session.update_household(household);

        let err = session.poll(later()).unwrap_err();
        assert_eq!(err, SessionError::Calculation(CalculationError::LifeExpectancyOutOfRange(200)));
        assert_eq!(session.error(), Some("Calculation failed: Life expectancy must be between 1 and 150"));
        assert!(session.is_blocked());

        // Further edits do not recalculate while latched
        session.update_household(HouseholdInfo::single(2024, PersonalInfo::new("A", 1970, 65, 90)));
        assert_eq!(session.poll(later()), Err(SessionError::Blocked));
        assert_eq!(recorder.borrow().failures.len(), 1);

        assert!(session.retry().is_ok());
        assert!(!session.is_blocked());
        assert!(session.error().is_none());
        assert_eq!(recorder.borrow().successes.len(), 1);
    }

    #[test]
    fn test_income_source_edits() {
        let mut session = CalculatorSession::new(CalculatorData::default_snapshot(2024));
        session.add_income_source(IncomeSource::new("p", "Pension", IncomeOwner::Spouse, 20_000.0, 0.0), Owner::Spouse);
        session.update_income_source("1", IncomeSource::new("1", "Salary", IncomeOwner::User, 120_000.0, 0.0), Owner::User);

        let data = session.data().unwrap();
        assert_eq!(data.income_sources_spouse.len(), 1);
        assert_eq!(data.income_sources_user[0].annual_amount, 120_000.0);

        session.delete_income_source("p", Owner::Spouse);
        session.delete_account("1");
        let data = session.data().unwrap();
        assert!(data.income_sources_spouse.is_empty());
        assert!(data.accounts.is_empty());
    }

    #[test]
    fn test_empty_session() {
        let mut session = CalculatorSession::empty();
        session.delete_account("1");
        assert!(!session.is_dirty());
        assert!(!session.poll(later()).unwrap());
        assert_eq!(session.retry().unwrap_err(), SessionError::NoData);
    }

    #[test]
    fn test_store_written_before_calculation() {
        let dir = std::env::temp_dir().join(format!("retirement_session_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = SnapshotStore::open(&dir).unwrap();

        let mut session = CalculatorSession::from_store(store.clone(), 2024);
        session.poll(Instant::now()).unwrap();
        assert_eq!(store.load(), Some(CalculatorData::default_snapshot(2024)));

        store.clear_all().unwrap();
    }
}
