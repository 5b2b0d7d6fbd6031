//! Full broker scenarios across the clearance engine and token lifecycle
//!
//! Builds one realistic organization, wires the clearance engine into the
//! token service the way the HTTP layer does, and walks through the flows a
//! third-party application actually performs.

use std::collections::HashSet;
use std::sync::Arc;

use helio_clearance::{
    scopes, ClearanceEngine, EngineConfig, InMemoryDirectory, OrgDirectory, ScopeRegistry,
};
use helio_core::{
    Alliance, AllianceId, CharacterId, Coalition, CoalitionId, Corporation, CorporationId, User,
};
use helio_token::{
    ExternalIdentity, HmacSha256Signer, IssueOptions, InMemoryTokenStore, TokenConfig,
    TokenError, TokenKind, TokenService,
};

struct Broker {
    directory: Arc<InMemoryDirectory>,
    clearance: Arc<ClearanceEngine>,
    tokens: TokenService,
}

/// One alliance with an executor corporation and a member corporation, in a
/// coalition with a second alliance.
async fn broker() -> Broker {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let directory = Arc::new(InMemoryDirectory::new());

    directory
        .put_alliance(Alliance {
            id: AllianceId(1),
            name: "Silent Accord".to_string(),
            ticker: "SILN".to_string(),
            executor_corporation_id: CorporationId(10),
        })
        .await;
    directory
        .put_alliance(Alliance {
            id: AllianceId(2),
            name: "Outer Ring Union".to_string(),
            ticker: "ORU".to_string(),
            executor_corporation_id: CorporationId(30),
        })
        .await;

    for (id, alliance, ceo) in [
        (10, AllianceId(1), 101),
        (20, AllianceId(1), 201),
        (30, AllianceId(2), 301),
    ] {
        directory
            .put_corporation(Corporation {
                id: CorporationId(id),
                name: format!("Corporation {}", id),
                ticker: format!("C{}", id),
                ceo_id: CharacterId(ceo),
                alliance_id: Some(alliance),
            })
            .await;
    }

    let mut members = HashSet::new();
    members.insert(AllianceId(1));
    members.insert(AllianceId(2));
    directory
        .put_coalition(Coalition {
            id: CoalitionId(1),
            name: "Borderlands Compact".to_string(),
            members,
        })
        .await;

    let clearance = Arc::new(ClearanceEngine::new(
        EngineConfig::default(),
        directory.clone(),
        Arc::new(ScopeRegistry::builtin()),
    ));

    let tokens = TokenService::new(
        TokenConfig {
            issuer: "https://auth.borderlands.example".to_string(),
            ..Default::default()
        },
        Arc::new(InMemoryTokenStore::new()),
        clearance.clone(),
        Arc::new(HmacSha256Signer::new(b"e2e-shared-secret")),
    );

    Broker {
        directory,
        clearance,
        tokens,
    }
}

fn root() -> User {
    User::new(CharacterId::ROOT, "Broker Root", 10, None)
}

#[tokio::test]
async fn app_onboarding_login_and_bearer_validation() {
    let broker = broker().await;
    let root = root();

    // The operator registers a third-party app with a dynamic token.
    let app_token = broker
        .tokens
        .issue_dynamic_token(
            &root,
            IssueOptions {
                comment: Some("fleet tracker app".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // App starts a login; a pilot completes it through the external SSO.
    let state_code = broker.tokens.start_login(&app_token).await.unwrap();
    let session = broker
        .tokens
        .complete_login(
            state_code.id,
            &ExternalIdentity {
                character_id: CharacterId(1001),
                character_name: "Nav Officer".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(session.kind, TokenKind::User);

    // The app holds the signed bearer string; every request validates it.
    let bearer = broker.tokens.to_external_representation(&session).unwrap();
    let resolved = broker.tokens.from_external_representation(&bearer).await.unwrap();
    assert_eq!(resolved.id, session.id);

    // The session's owner can read their own tokens but not mint app tokens.
    let pilot = User::new(CharacterId(1001), "Nav Officer", 0, Some(CorporationId(10)));
    assert!(!broker
        .clearance
        .has_clearance(&pilot, scopes::WRITE_DYN_TOKEN, None)
        .await
        .unwrap());
    let owned = broker.tokens.list_own_tokens(&pilot).await.unwrap();
    assert_eq!(owned.len(), 1);
}

#[tokio::test]
async fn organizational_change_relevels_clearance_and_access() {
    let broker = broker().await;

    // The executor-corporation CEO starts with hand-granted level 6.
    let mut ceo = User::new(CharacterId(101), "Executor CEO", 6, Some(CorporationId(10)));
    broker.directory.put_user(ceo.clone()).await;

    // A corporation/alliance sync triggers a reset: executor CEOs level at 4.
    broker.clearance.reset_clearance(&mut ceo, true).await.unwrap();
    assert_eq!(ceo.clearance_level(), 4);
    assert_eq!(
        broker
            .directory
            .user(CharacterId(101))
            .await
            .unwrap()
            .unwrap()
            .clearance_level(),
        4
    );

    // Stale grants within the cache TTL are an accepted bound; clear it
    // explicitly here so the new level is visible immediately.
    broker.clearance.invalidate_cache();

    // At level 4 the CEO reaches same-alliance pilots (penalty 3) for
    // level-1 capabilities, but not coalition-distance ones (penalty 5).
    let alliance_mate = User::new(CharacterId(2001), "Alliance Mate", 0, Some(CorporationId(20)));
    let coalition_mate = User::new(CharacterId(3001), "Coalition Mate", 0, Some(CorporationId(30)));

    assert!(broker
        .clearance
        .has_clearance(&ceo, "esi-fleets.write_fleet.v1", Some(&alliance_mate))
        .await
        .unwrap());
    assert!(!broker
        .clearance
        .has_clearance(&ceo, "esi-fleets.write_fleet.v1", Some(&coalition_mate))
        .await
        .unwrap());
}

#[tokio::test]
async fn clearance_promotion_is_bounded_by_the_grantors_level() {
    let broker = broker().await;

    let director = User::new(CharacterId(101), "Director", 5, Some(CorporationId(10)));
    let recruit = User::new(CharacterId(102), "Recruit", 0, Some(CorporationId(10)));

    // Same corporation: a level-5 director can set the recruit up to 5.
    let grant_five = scopes::set_clearance_level(5);
    let grant_six = scopes::set_clearance_level(6);
    assert!(broker
        .clearance
        .has_clearance(&director, &grant_five, Some(&recruit))
        .await
        .unwrap());
    assert!(!broker
        .clearance
        .has_clearance(&director, &grant_six, Some(&recruit))
        .await
        .unwrap());

    // And never their own level, whatever it is.
    assert!(!broker
        .clearance
        .has_clearance(&director, &grant_five, Some(&director))
        .await
        .unwrap());
}

#[tokio::test]
async fn revoking_the_app_token_kills_every_session() {
    let broker = broker().await;
    let root = root();

    let app_token = broker
        .tokens
        .issue_dynamic_token(&root, IssueOptions::default())
        .await
        .unwrap();

    // Three pilots log in through the same app.
    let mut bearers = Vec::new();
    for id in [1001i64, 1002, 1003] {
        let state_code = broker.tokens.start_login(&app_token).await.unwrap();
        let session = broker
            .tokens
            .complete_login(
                state_code.id,
                &ExternalIdentity {
                    character_id: CharacterId(id),
                    character_name: format!("Pilot {}", id),
                },
            )
            .await
            .unwrap();
        bearers.push(broker.tokens.to_external_representation(&session).unwrap());
    }

    let removed = broker.tokens.revoke(app_token.id, &root).await.unwrap();
    assert_eq!(removed, 4);

    // Every previously valid bearer is now an opaque credential failure.
    for bearer in &bearers {
        let result = broker.tokens.from_external_representation(bearer).await;
        assert!(matches!(result, Err(TokenError::InvalidCredential)));
    }
}
