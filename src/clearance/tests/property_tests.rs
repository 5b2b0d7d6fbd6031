//! Property-based tests for the clearance rules

use std::sync::Arc;

use proptest::prelude::*;
use tokio::runtime::Runtime;

use helio_clearance::{ClearanceEngine, EngineConfig, InMemoryDirectory, Policy, ScopeRegistry};
use helio_core::{Alliance, AllianceId, CharacterId, Corporation, CorporationId, User};

/// Small organization pool: two corporations in one alliance, one independent
/// corporation, plus the no-corporation case.
const CORP_POOL: [Option<i64>; 4] = [Some(10), Some(20), Some(30), None];

async fn build_directory() -> Arc<InMemoryDirectory> {
    let directory = Arc::new(InMemoryDirectory::new());

    directory
        .put_alliance(Alliance {
            id: AllianceId(1),
            name: "Alliance X".to_string(),
            ticker: "ALX".to_string(),
            executor_corporation_id: CorporationId(10),
        })
        .await;

    for (id, alliance) in [(10, Some(AllianceId(1))), (20, Some(AllianceId(1))), (30, None)] {
        directory
            .put_corporation(Corporation {
                id: CorporationId(id),
                name: format!("Corporation {}", id),
                ticker: format!("C{}", id),
                ceo_id: CharacterId(id * 100),
                alliance_id: alliance,
            })
            .await;
    }

    directory
}

fn engine(directory: Arc<InMemoryDirectory>, registry: ScopeRegistry) -> ClearanceEngine {
    ClearanceEngine::new(
        // Cache off so each case is computed from the graph
        EngineConfig {
            enable_cache: false,
            ..Default::default()
        },
        directory,
        Arc::new(registry),
    )
}

fn pilot(id: i64, clearance: u8, corp: Option<i64>) -> User {
    User::new(
        CharacterId(id),
        format!("Pilot {}", id),
        clearance,
        corp.map(CorporationId),
    )
}

proptest! {
    /// Absolute(level) grants iff subject clearance >= level, for every
    /// combination of levels on the lattice.
    #[test]
    fn absolute_policy_is_a_threshold(clearance in 0u8..=10, level in 0u8..=10) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let registry = ScopeRegistry::builder()
                .scope("prop.scope", Policy::Absolute(level))
                .build();
            let engine = engine(build_directory().await, registry);

            let subject = pilot(1, clearance, None);
            let allowed = engine.has_clearance(&subject, "prop.scope", None).await.unwrap();
            prop_assert_eq!(allowed, clearance >= level);
            Ok(())
        })?;
    }

    /// distance_penalty(a, b) == distance_penalty(b, a), and self-distance
    /// is zero, over randomized corporation assignments.
    #[test]
    fn distance_penalty_symmetry(corp_a in 0usize..4, corp_b in 0usize..4) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let engine = engine(build_directory().await, ScopeRegistry::builtin());

            let a = pilot(1, 0, CORP_POOL[corp_a]);
            let b = pilot(2, 0, CORP_POOL[corp_b]);

            let forward = engine.distance_penalty(&a, &b).await.unwrap();
            let backward = engine.distance_penalty(&b, &a).await.unwrap();
            prop_assert_eq!(forward, backward);

            prop_assert_eq!(engine.distance_penalty(&a, &a).await.unwrap(), 0);
            Ok(())
        })?;
    }

    /// Distanced(level): granted iff clearance >= 7, or clearance >=
    /// level + distance penalty.
    #[test]
    fn distanced_policy_rule(
        clearance in 0u8..=10,
        level in 0u8..=3,
        corp_a in 0usize..4,
        corp_b in 0usize..4,
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let registry = ScopeRegistry::builder()
                .scope("prop.scope", Policy::Distanced(level))
                .build();
            let directory = build_directory().await;
            let engine = engine(directory, registry);

            let subject = pilot(1, clearance, CORP_POOL[corp_a]);
            let target = pilot(2, 0, CORP_POOL[corp_b]);

            let penalty = engine.distance_penalty(&subject, &target).await.unwrap();
            let allowed = engine
                .has_clearance(&subject, "prop.scope", Some(&target))
                .await
                .unwrap();

            let expected = clearance >= 7 || clearance >= level + penalty;
            prop_assert_eq!(allowed, expected);
            Ok(())
        })?;
    }

    /// A subject can never change its own clearance.
    #[test]
    fn clearance_edit_never_self(clearance in 0u8..=10, level in 0u8..=10) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let engine = engine(build_directory().await, ScopeRegistry::builtin());

            let subject = pilot(1, clearance, Some(10));
            let scope = helio_clearance::scopes::set_clearance_level(level);
            let allowed = engine.has_clearance(&subject, &scope, Some(&subject)).await.unwrap();
            prop_assert!(!allowed);
            Ok(())
        })?;
    }
}
