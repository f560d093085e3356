//! In-memory store implementation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use seatflow_core::result::AppResult;
use seatflow_core::traits::{
    AllocationStore, AllocationTx, CodeRepository, RecordRepository, TeamRepository,
};
use seatflow_entity::code::{CodeStatus, CreateCode, RedemptionCode};
use seatflow_entity::record::{NewRedemptionRecord, RedemptionRecord};
use seatflow_entity::team::{CreateTeam, Team, TeamStatus};

#[derive(Debug, Default)]
struct MemoryState {
    teams: BTreeMap<i64, Team>,
    codes: BTreeMap<String, RedemptionCode>,
    records: Vec<RedemptionRecord>,
    next_team_id: i64,
    next_record_id: i64,
}

/// In-memory store implementing the repository and allocation traits.
///
/// All transactions serialize on one allocation gate; reads lock the
/// state map only momentarily and never wait on an open transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    allocation_gate: Arc<AsyncMutex<()>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new team (provisioning path).
    pub fn insert_team(&self, data: &CreateTeam) -> Team {
        let mut state = self.lock_state();
        state.next_team_id += 1;
        let team = Team {
            id: state.next_team_id,
            name: data.name.clone(),
            account_id: data.account_id.clone(),
            credential_encrypted: data.credential_encrypted.clone(),
            status: TeamStatus::Active,
            current_members: 0,
            max_members: data.max_members,
            expires_at: data.expires_at,
            last_sync: None,
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        team
    }

    /// Issue a new code (provisioning path).
    pub fn insert_code(&self, data: &CreateCode) -> RedemptionCode {
        let code = RedemptionCode {
            code: data.code.clone(),
            status: CodeStatus::Unused,
            has_warranty: data.has_warranty,
            warranty_expires_at: None,
            used_by_email: None,
            used_team_id: None,
            used_at: None,
            created_at: Utc::now(),
        };
        self.lock_state().codes.insert(code.code.clone(), code.clone());
        code
    }

    /// Overwrite a team row directly. Test hook.
    pub fn put_team(&self, team: Team) {
        self.lock_state().teams.insert(team.id, team);
    }

    /// Overwrite a code row directly. Test hook.
    pub fn put_code(&self, code: RedemptionCode) {
        self.lock_state().codes.insert(code.code.clone(), code);
    }
}

#[async_trait]
impl CodeRepository for MemoryStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<RedemptionCode>> {
        Ok(self.lock_state().codes.get(code).cloned())
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn find_by_id(&self, team_id: i64) -> AppResult<Option<Team>> {
        Ok(self.lock_state().teams.get(&team_id).cloned())
    }

    async fn list_available(&self) -> AppResult<Vec<Team>> {
        let mut teams: Vec<Team> = self
            .lock_state()
            .teams
            .values()
            .filter(|t| t.is_joinable())
            .cloned()
            .collect();
        teams.sort_by(|a, b| match (a.expires_at, b.expires_at) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        Ok(teams)
    }

    async fn update_health(
        &self,
        team_id: i64,
        status: TeamStatus,
        last_sync: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.lock_state();
        if let Some(team) = state.teams.get_mut(&team_id) {
            team.status = status;
            team.last_sync = Some(last_sync);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for MemoryStore {
    async fn append(&self, record: &NewRedemptionRecord) -> AppResult<RedemptionRecord> {
        let mut state = self.lock_state();
        state.next_record_id += 1;
        let row = RedemptionRecord {
            id: state.next_record_id,
            email: record.email.clone(),
            code: record.code.clone(),
            team_id: record.team_id,
            account_id: record.account_id.clone(),
            is_warranty_redemption: record.is_warranty_redemption,
            redeemed_at: Utc::now(),
        };
        state.records.push(row.clone());
        Ok(row)
    }

    async fn list_by_code(&self, code: &str) -> AppResult<Vec<RedemptionRecord>> {
        Ok(self.filtered_records(|r| r.code == code))
    }

    async fn list_by_code_and_email(
        &self,
        code: &str,
        email: &str,
    ) -> AppResult<Vec<RedemptionRecord>> {
        Ok(self.filtered_records(|r| r.code == code && r.email == email))
    }

    async fn list_by_email(&self, email: &str) -> AppResult<Vec<RedemptionRecord>> {
        Ok(self.filtered_records(|r| r.email == email))
    }
}

impl MemoryStore {
    fn filtered_records(&self, pred: impl Fn(&RedemptionRecord) -> bool) -> Vec<RedemptionRecord> {
        let mut records: Vec<RedemptionRecord> = self
            .lock_state()
            .records
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect();
        // Newest first.
        records.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at).then(b.id.cmp(&a.id)));
        records
    }
}

#[async_trait]
impl AllocationStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn AllocationTx>> {
        let gate = self.allocation_gate.clone().lock_owned().await;
        Ok(Box::new(MemoryTx {
            _gate: gate,
            state: self.state.clone(),
            staged_teams: BTreeMap::new(),
            staged_codes: BTreeMap::new(),
        }))
    }
}

/// One in-memory allocation transaction. Writes are staged and applied
/// atomically on commit; dropping the transaction discards them.
struct MemoryTx {
    _gate: OwnedMutexGuard<()>,
    state: Arc<Mutex<MemoryState>>,
    staged_teams: BTreeMap<i64, Team>,
    staged_codes: BTreeMap<String, RedemptionCode>,
}

impl MemoryTx {
    fn lock_state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AllocationTx for MemoryTx {
    async fn lock_team(&mut self, team_id: i64) -> AppResult<Option<Team>> {
        if let Some(staged) = self.staged_teams.get(&team_id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.lock_state().teams.get(&team_id).cloned())
    }

    async fn lock_code(&mut self, code: &str) -> AppResult<Option<RedemptionCode>> {
        if let Some(staged) = self.staged_codes.get(code) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.lock_state().codes.get(code).cloned())
    }

    async fn update_team(&mut self, team: &Team) -> AppResult<()> {
        self.staged_teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn update_code(&mut self, code: &RedemptionCode) -> AppResult<()> {
        self.staged_codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (id, team) in &self.staged_teams {
            state.teams.insert(*id, team.clone());
        }
        for (code, row) in &self.staged_codes {
            state.codes.insert(code.clone(), row.clone());
        }
        Ok(())
    }
}
