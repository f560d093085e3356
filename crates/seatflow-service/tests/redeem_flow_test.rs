//! Flow tests for the three-phase redemption orchestrator.

mod support;

use chrono::{Duration, Utc};

use seatflow_core::error::ErrorKind;
use seatflow_core::traits::{CodeRepository, RecordRepository, TeamRepository};
use seatflow_entity::code::CodeStatus;
use seatflow_entity::team::{CreateTeam, TeamStatus};

#[tokio::test]
async fn test_first_warranty_use_full_flow() {
    let env = support::build_env();
    let team = env.insert_team("alpha", 5);
    env.insert_code("WARR", true);

    let before = Utc::now();
    let receipt = env.service.redeem("a@x.com", "WARR", None).await.unwrap();
    assert_eq!(receipt.team_id, team.id);
    assert_eq!(receipt.team_name, "alpha");

    let code = env.store.find_by_code("WARR").await.unwrap().unwrap();
    assert_eq!(code.status, CodeStatus::WarrantyActive);
    assert_eq!(code.used_by_email.as_deref(), Some("a@x.com"));
    assert_eq!(code.used_team_id, Some(team.id));
    // Grace period stamped on first use.
    let cutoff = code.warranty_expires_at.unwrap();
    assert!(cutoff >= before + Duration::days(30));
    assert!(cutoff <= Utc::now() + Duration::days(30));

    let team_after = env.store.find_by_id(team.id).await.unwrap().unwrap();
    assert_eq!(team_after.current_members, 1);

    let records = env.store.list_by_code("WARR").await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_warranty_redemption);
}

#[tokio::test]
async fn test_invite_carries_decrypted_credential() {
    let env = support::build_env();
    let team = env.insert_team("alpha", 5);
    env.insert_code("PLAIN", false);

    env.service
        .redeem("a@x.com", "PLAIN", Some(team.id))
        .await
        .unwrap();

    let invites = env.notifier.invites.lock().unwrap();
    assert_eq!(invites.len(), 1);
    let (secret, account_id, email) = &invites[0];
    assert_eq!(secret, "sk-alpha");
    assert_eq!(account_id, "acct-alpha");
    assert_eq!(email, "a@x.com");
}

#[tokio::test]
async fn test_plain_code_consumed_once() {
    let env = support::build_env();
    let team = env.insert_team("alpha", 5);
    env.insert_code("PLAIN", false);

    env.service
        .redeem("a@x.com", "PLAIN", Some(team.id))
        .await
        .unwrap();

    let err = env
        .service
        .redeem("b@x.com", "PLAIN", Some(team.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let team_after = env.store.find_by_id(team.id).await.unwrap().unwrap();
    assert_eq!(team_after.current_members, 1);
}

#[tokio::test]
async fn test_concurrent_attempts_never_oversubscribe() {
    let env = support::build_env();
    let team = env.insert_team("alpha", 3);
    for i in 0..6 {
        env.insert_code(&format!("C-{i}"), false);
    }

    let mut tasks = Vec::new();
    for i in 0..6 {
        let service = env.service.clone();
        let team_id = team.id;
        tasks.push(tokio::spawn(async move {
            service
                .redeem(&format!("user{i}@x.com"), &format!("C-{i}"), Some(team_id))
                .await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => {
                assert_eq!(e.kind, ErrorKind::Conflict);
                conflicts += 1;
            }
        }
    }

    // Exactly one attempt wins each of the three seats.
    assert_eq!(successes, 3);
    assert_eq!(conflicts, 3);

    let team_after = env.store.find_by_id(team.id).await.unwrap().unwrap();
    assert_eq!(team_after.current_members, 3);
    assert_eq!(team_after.status, TeamStatus::Full);
}

#[tokio::test]
async fn test_concurrent_same_code_single_winner() {
    let env = support::build_env();
    let team = env.insert_team("alpha", 5);
    env.insert_code("RACE", false);

    let mut tasks = Vec::new();
    for email in ["a@x.com", "b@x.com"] {
        let service = env.service.clone();
        let team_id = team.id;
        tasks.push(tokio::spawn(async move {
            service.redeem(email, "RACE", Some(team_id)).await
        }));
    }

    let outcomes: Vec<_> = futures_join(tasks).await;
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let team_after = env.store.find_by_id(team.id).await.unwrap().unwrap();
    assert_eq!(team_after.current_members, 1);
}

#[tokio::test]
async fn test_auto_select_drains_soonest_expiring_team() {
    let env = support::build_env();
    env.insert_team("late", 5);
    let soon = env.store.insert_team(&CreateTeam {
        name: "soon".to_string(),
        account_id: "acct-soon".to_string(),
        credential_encrypted: env.vault_encrypt("sk-soon"),
        max_members: 5,
        expires_at: Some(Utc::now() + Duration::days(7)),
    });
    env.insert_code("PLAIN", false);

    let receipt = env.service.redeem("a@x.com", "PLAIN", None).await.unwrap();
    assert_eq!(receipt.team_id, soon.id);
}

#[tokio::test]
async fn test_unknown_code_and_team_rejected() {
    let env = support::build_env();
    let team = env.insert_team("alpha", 5);
    env.insert_code("PLAIN", false);

    let err = env
        .service
        .redeem("a@x.com", "NOPE", Some(team.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = env.service.redeem("a@x.com", "PLAIN", Some(999)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Nothing was reserved along the way.
    let team_after = env.store.find_by_id(team.id).await.unwrap().unwrap();
    assert_eq!(team_after.current_members, 0);
}

#[tokio::test]
async fn test_no_available_team_is_conflict() {
    let env = support::build_env();
    env.insert_code("PLAIN", false);

    let err = env.service.redeem("a@x.com", "PLAIN", None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_verify_and_list_teams() {
    let env = support::build_env();
    env.insert_team("alpha", 5);
    let full = env.insert_team("beta", 1);
    env.insert_code("PLAIN", false);
    env.insert_code("OTHER", false);

    env.service
        .redeem("a@x.com", "OTHER", Some(full.id))
        .await
        .unwrap();

    let precheck = env.service.verify_and_list_teams("PLAIN").await.unwrap();
    assert!(precheck.valid);
    // beta is full and no longer listed.
    assert_eq!(precheck.teams.len(), 1);
    assert_eq!(precheck.teams[0].name, "alpha");

    let invalid = env.service.verify_and_list_teams("NOPE").await.unwrap();
    assert!(!invalid.valid);
    assert!(invalid.reason.is_some());
    assert!(invalid.teams.is_empty());
}

/// Await a batch of spawned redemption tasks.
async fn futures_join<T>(
    tasks: Vec<tokio::task::JoinHandle<T>>,
) -> Vec<T> {
    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }
    outcomes
}
