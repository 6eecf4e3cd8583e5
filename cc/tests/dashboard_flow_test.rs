//! End-to-end flows: login, guards and the admin dashboard driving notifications

use std::sync::Arc;
use std::time::Duration;

use catalogclient::guard::navigate;
use catalogclient::login::{LoginError, LoginForm, login};
use catalogclient::{AdminDashboard, CatalogApi, InMemoryCatalog, InMemorySession, Route, SearchResult, SessionStore};
use notifystore::{NotificationKind, Notifier, NotifyConfig, Phase};
use proptest::prelude::*;

fn notifier() -> Notifier {
    Notifier::new(NotifyConfig {
        default_duration_ms: 1000,
        fade_window_ms: 100,
    })
    .expect("Failed to create notifier")
}

// =============================================================================
// Login and guards
// =============================================================================

#[tokio::test]
async fn test_login_then_navigate() {
    let catalog = InMemoryCatalog::seeded();
    let session = InMemorySession::new();

    assert_eq!(navigate(&session, "/admin-dashboard"), Route::Login);

    let err = login(&catalog, &session, &LoginForm::new("", "")).await.unwrap_err();
    assert!(matches!(err, LoginError::Invalid(ref v) if v.len() == 2));

    let outcome = login(&catalog, &session, &LoginForm::new("user", "user")).await.unwrap();
    assert_eq!(outcome.redirect, Route::UserDashboard);
    assert_eq!(navigate(&session, "/admin-dashboard"), Route::UserDashboard);
    assert_eq!(navigate(&session, "/user-dashboard"), Route::UserDashboard);

    session.logout();
    assert_eq!(navigate(&session, "/user-dashboard"), Route::Login);
}

// =============================================================================
// Dashboard notifications over time
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_dashboard_notifications_expire_in_order() {
    let catalog = Arc::new(InMemoryCatalog::seeded());
    let n = notifier();
    let mut view = n.mount();
    let mut dashboard = AdminDashboard::new(catalog.clone(), n.clone(), 6);

    dashboard.search("interstellar").await;
    dashboard.add("tt0816692").await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    dashboard.add("tt0816692").await;

    view.refresh();
    let kinds: Vec<_> = view.notifications().iter().map(|x| x.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Warning]);

    // success fades at 1000ms, warning (raised at 500ms) at 1500ms
    tokio::time::sleep(Duration::from_millis(550)).await;
    view.refresh();
    let phases: Vec<_> = view.notifications().iter().map(|x| x.phase).collect();
    assert_eq!(phases, vec![Phase::Fading, Phase::Visible]);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    view.refresh();
    assert!(view.notifications().is_empty());
    assert_eq!(view.unmount(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_dashboard_freezes_notifications() {
    let catalog = Arc::new(InMemoryCatalog::seeded());
    let n = notifier();
    let view = n.mount();
    let mut dashboard = AdminDashboard::new(catalog, n.clone(), 6);

    dashboard.batch_add().await;
    assert_eq!(n.pending_timers(), 1);

    drop(view);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(n.snapshot().len(), 1);
    assert_eq!(n.pending_timers(), 0);
}

// =============================================================================
// Pagination properties
// =============================================================================

fn catalog_with(count: usize) -> InMemoryCatalog {
    let index = (0..count)
        .map(|i| SearchResult::new(format!("tt{:07}", i), format!("Movie {}", i), "2000"))
        .collect();
    InMemoryCatalog::new(index)
}

proptest! {
    #[test]
    fn prop_pages_cover_every_movie_once(count in 0usize..40, page_size in 1usize..10) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let catalog = Arc::new(catalog_with(count));
            for i in 0..count {
                catalog.import(&format!("tt{:07}", i)).await.unwrap();
            }
            let mut dashboard = AdminDashboard::new(catalog, notifier(), page_size);
            dashboard.load_movies().await;

            let pages = dashboard.total_pages();
            prop_assert_eq!(pages, count.div_ceil(page_size));

            let mut seen = Vec::new();
            for page in dashboard.page_numbers() {
                prop_assert!(dashboard.go_to_page(page));
                let slice = dashboard.paginated();
                prop_assert!(!slice.is_empty() && slice.len() <= page_size);
                seen.extend(slice.iter().map(|m| m.id));
            }
            prop_assert_eq!(seen.len(), count);
            seen.dedup();
            prop_assert_eq!(seen.len(), count);

            prop_assert!(!dashboard.go_to_page(pages + 1));
            Ok(())
        })?;
    }
}
