use chrono::{DateTime, NaiveDate, Utc};

use pitchside::booking::{
    BookingWindow, InMemoryWaitlistStore, OfferSweep, WaitlistEntry, WaitlistService,
    WaitlistStatus, WaitlistStore,
};

fn at(d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 6, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
        .and_utc()
}

async fn queue_of_three(store: &InMemoryWaitlistStore) {
    for (player, position) in [("p_a", 1), ("p_b", 2), ("p_c", 3)] {
        store
            .add_entry(&WaitlistEntry::new("session_1", player, position))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn booking_window_gates_until_open_time() {
    let window = BookingWindow::new(7, 9, 0).unwrap();
    let session_start = at(15, 18, 0);

    assert!(!window.is_open(session_start, at(8, 8, 59)));
    assert!(window.is_open(session_start, at(8, 9, 0)));

    // No-constraints sessions are always bookable.
    assert!(BookingWindow::unconstrained().is_open(session_start, at(1, 0, 0)));
}

#[tokio::test]
async fn vacated_slot_flows_down_the_queue() {
    let store = InMemoryWaitlistStore::new();
    queue_of_three(&store).await;
    let service = WaitlistService::new(store.clone());

    // Slot vacated at noon: position 1 gets a 30-minute offer.
    let offered = service
        .promote_next("session_1", at(10, 12, 0), 30)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offered.player_id, "p_a");
    assert_eq!(offered.status, WaitlistStatus::Offered);

    // p_a never pays; the sweep expires the offer and promotes p_b.
    let sweep = OfferSweep::new(WaitlistService::new(store.clone()), 30);
    let report = sweep.run(at(10, 12, 30)).await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.promoted, 1);

    // p_b accepts within the window.
    let entries = store.entries_for_session("session_1").await.unwrap();
    let offered_b = entries
        .iter()
        .find(|e| e.player_id == "p_b")
        .unwrap()
        .clone();
    assert!(service
        .accept_offer(&offered_b.id, at(10, 12, 45))
        .await
        .unwrap());

    let final_entries = store.entries_for_session("session_1").await.unwrap();
    let status_of = |player: &str| {
        final_entries
            .iter()
            .find(|e| e.player_id == player)
            .unwrap()
            .status
    };
    assert_eq!(status_of("p_a"), WaitlistStatus::Expired);
    assert_eq!(status_of("p_b"), WaitlistStatus::Accepted);
    assert_eq!(status_of("p_c"), WaitlistStatus::Active);
}

#[tokio::test]
async fn sweep_is_safe_to_run_twice_at_the_same_instant() {
    let store = InMemoryWaitlistStore::new();
    queue_of_three(&store).await;
    let service = WaitlistService::new(store.clone());
    service
        .promote_next("session_1", at(10, 12, 0), 30)
        .await
        .unwrap();

    let sweep_a = OfferSweep::new(WaitlistService::new(store.clone()), 30);
    let sweep_b = OfferSweep::new(WaitlistService::new(store.clone()), 30);

    let now = at(10, 12, 30);
    let report_a = sweep_a.run(now).await.unwrap();
    let report_b = sweep_b.run(now).await.unwrap();

    // The conditional transition means only one sweep does the work.
    assert_eq!(report_a.expired + report_b.expired, 1);

    let offered: Vec<WaitlistEntry> = store
        .entries_for_session("session_1")
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.status == WaitlistStatus::Offered)
        .collect();
    assert_eq!(offered.len(), 1);
    assert_eq!(offered[0].player_id, "p_b");
}

#[tokio::test]
async fn expired_entrant_is_not_reoffered() {
    let store = InMemoryWaitlistStore::new();
    queue_of_three(&store).await;
    let service = WaitlistService::new(store.clone());
    service
        .promote_next("session_1", at(10, 12, 0), 30)
        .await
        .unwrap();

    let sweep = OfferSweep::new(WaitlistService::new(store.clone()), 30);
    sweep.run(at(10, 12, 30)).await.unwrap();
    sweep.run(at(10, 13, 0)).await.unwrap();
    sweep.run(at(10, 13, 30)).await.unwrap();

    // Queue fully drained; nobody cycles back to active or offered.
    let entries = store.entries_for_session("session_1").await.unwrap();
    assert!(entries.iter().all(|e| e.status == WaitlistStatus::Expired));

    let report = sweep.run(at(10, 14, 0)).await.unwrap();
    assert_eq!(report.expired, 0);
    assert_eq!(report.promoted, 0);
}
