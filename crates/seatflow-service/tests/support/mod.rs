//! Shared fixtures for the service flow tests: an in-memory store, a real
//! AES vault with a fixed key, and scripted collaborator doubles.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;

use seatflow_core::config::vault::VaultConfig;
use seatflow_core::config::warranty::WarrantyConfig;
use seatflow_core::error::AppError;
use seatflow_core::result::AppResult;
use seatflow_core::traits::{
    CredentialVault, InviteNotifier, TeamHealthSync, TeamRepository,
};
use seatflow_database::memory::MemoryStore;
use seatflow_entity::code::{CreateCode, RedemptionCode};
use seatflow_entity::team::{CreateTeam, Team, TeamStatus};
use seatflow_provider::AesCredentialVault;
use seatflow_service::redeem::{RedemptionValidator, TeamSelector};
use seatflow_service::warranty::{QueryRateLimiter, WarrantyPolicy, WarrantyStatusQuery};
use seatflow_service::RedeemService;

/// Notifier double that records every invite and can be scripted to fail.
#[derive(Default)]
pub struct ScriptedNotifier {
    pub fail: AtomicBool,
    pub invites: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl InviteNotifier for ScriptedNotifier {
    async fn send_invite(&self, secret: &str, account_id: &str, email: &str) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::external_service("provider says no"));
        }
        self.invites.lock().unwrap().push((
            secret.to_string(),
            account_id.to_string(),
            email.to_string(),
        ));
        Ok(())
    }
}

/// Health-sync double that bans scripted teams when probed and leaves
/// everything else at its stored status.
pub struct ProbeHealthSync {
    store: MemoryStore,
    pub banned_on_probe: Mutex<HashSet<i64>>,
    pub probes: AtomicUsize,
}

impl ProbeHealthSync {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            banned_on_probe: Mutex::new(HashSet::new()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn ban_on_probe(&self, team_id: i64) {
        self.banned_on_probe.lock().unwrap().insert(team_id);
    }
}

#[async_trait]
impl TeamHealthSync for ProbeHealthSync {
    async fn sync_team(&self, team_id: i64) -> AppResult<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let status = if self.banned_on_probe.lock().unwrap().contains(&team_id) {
            TeamStatus::Banned
        } else {
            match self.store.find_by_id(team_id).await? {
                Some(team) => team.status,
                None => return Err(AppError::not_found(format!("Team {team_id} does not exist"))),
            }
        };
        self.store.update_health(team_id, status, Utc::now()).await
    }
}

pub struct TestEnv {
    pub store: MemoryStore,
    pub notifier: Arc<ScriptedNotifier>,
    pub vault: Arc<AesCredentialVault>,
    pub config: WarrantyConfig,
    pub service: RedeemService,
}

pub fn test_vault() -> AesCredentialVault {
    let config = VaultConfig {
        master_key_b64: BASE64.encode([9u8; 32]),
    };
    AesCredentialVault::new(&config).unwrap()
}

pub fn build_env() -> TestEnv {
    let store = MemoryStore::new();
    let shared: Arc<MemoryStore> = Arc::new(store.clone());
    let notifier = Arc::new(ScriptedNotifier::default());
    let vault = Arc::new(test_vault());
    let config = WarrantyConfig::default();

    let service = RedeemService::new(
        shared.clone(),
        shared.clone(),
        shared.clone(),
        RedemptionValidator::new(shared.clone()),
        TeamSelector::new(shared.clone()),
        WarrantyPolicy::new(shared.clone(), shared.clone(), shared.clone()),
        vault.clone(),
        notifier.clone(),
        &config,
    );

    TestEnv {
        store,
        notifier,
        vault,
        config,
        service,
    }
}

impl TestEnv {
    /// Encrypt a credential with the test vault key.
    pub fn vault_encrypt(&self, plaintext: &str) -> String {
        self.vault.encrypt(plaintext).unwrap()
    }

    /// Register a team whose stored credential decrypts to `sk-<name>`.
    pub fn insert_team(&self, name: &str, max_members: i32) -> Team {
        let credential = self.vault.encrypt(&format!("sk-{name}")).unwrap();
        self.store.insert_team(&CreateTeam {
            name: name.to_string(),
            account_id: format!("acct-{name}"),
            credential_encrypted: credential,
            max_members,
            expires_at: None,
        })
    }

    pub fn insert_code(&self, code: &str, has_warranty: bool) -> RedemptionCode {
        self.store.insert_code(&CreateCode {
            code: code.to_string(),
            has_warranty,
        })
    }

    pub fn policy(&self) -> WarrantyPolicy {
        let shared: Arc<MemoryStore> = Arc::new(self.store.clone());
        WarrantyPolicy::new(shared.clone(), shared.clone(), shared)
    }

    /// Build a status query with a fresh rate limiter and the given
    /// health collaborator.
    pub fn status_query(&self, health: Arc<dyn TeamHealthSync>) -> WarrantyStatusQuery {
        let shared: Arc<MemoryStore> = Arc::new(self.store.clone());
        WarrantyStatusQuery::new(
            shared.clone(),
            shared.clone(),
            shared,
            health,
            Arc::new(QueryRateLimiter::new(&self.config)),
        )
    }
}
