// Property-based tests for the notice store

use common::config::DatabaseConfig;
use common::db::{DbPool, NoticeRepository, NoticeStore};
use common::models::NotificationPayload;
use proptest::prelude::*;
use std::collections::HashSet;
use tempfile::TempDir;

async fn repository(dir: &TempDir) -> NoticeRepository {
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("notices.db").display()),
        max_connections: 8,
        busy_timeout_seconds: 10,
    };
    let pool = DbPool::new(&config).await.unwrap();
    pool.migrate().await.unwrap();
    NoticeRepository::new(pool)
}

fn notice(id: &str, date: &str) -> NotificationPayload {
    NotificationPayload::new(id, format!("title {}", id), format!("https://x/{}", id), date)
}

/// *For any* sequence of saves, exactly the first save of each id reports
/// `true` and the store ends with one row per distinct id.
#[test]
fn property_save_is_idempotent() {
    proptest!(ProptestConfig::with_cases(24), |(ids in prop::collection::vec(0u8..12, 1..40))| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let dir = TempDir::new().unwrap();
            let repo = repository(&dir).await;
            let mut seen = HashSet::new();

            for id in &ids {
                let id = format!("dept-{}", id);
                let inserted = repo.save("CSE", &notice(&id, "2025.03.10")).await.unwrap();
                assert_eq!(inserted, seen.insert(id));
            }

            assert_eq!(repo.count().await.unwrap() as usize, seen.len());
        });
    });
}

/// *For any* number of concurrent saves of one id, exactly one reports `true`.
#[test]
fn property_concurrent_saves_insert_once() {
    proptest!(ProptestConfig::with_cases(8), |(writers in 2usize..24)| {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let dir = TempDir::new().unwrap();
            let repo = repository(&dir).await;

            let handles: Vec<_> = (0..writers)
                .map(|_| {
                    let repo = repo.clone();
                    tokio::spawn(async move {
                        repo.save("GENERAL", &notice("univ-1", "2025.03.10")).await.unwrap()
                    })
                })
                .collect();

            let mut inserted = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    inserted += 1;
                }
            }

            assert_eq!(inserted, 1);
            assert_eq!(repo.count().await.unwrap(), 1);
        });
    });
}

/// *For any* set of stored dates, a purge removes exactly the rows not dated
/// today and reports that count.
#[test]
fn property_purge_keeps_only_today() {
    let dates = prop::sample::select(vec!["2025.03.08", "2025.03.09", "2025.03.10", "2025-03-10"]);
    proptest!(ProptestConfig::with_cases(24), |(stored in prop::collection::vec(dates, 0..30))| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let dir = TempDir::new().unwrap();
            let repo = repository(&dir).await;
            let keep = vec!["2025.03.10".to_string(), "2025-03-10".to_string()];

            for (i, date) in stored.iter().enumerate() {
                repo.save("CSE", &notice(&format!("dept-{}", i), date)).await.unwrap();
            }
            let expected_removed = stored.iter().filter(|d| !keep.iter().any(|k| k == *d)).count();

            let removed = repo.delete_excluding_dates(&keep).await.unwrap();

            assert_eq!(removed as usize, expected_removed);
            assert_eq!(repo.count().await.unwrap() as usize, stored.len() - expected_removed);
            assert_eq!(repo.delete_excluding_dates(&keep).await.unwrap(), 0);
        });
    });
}
