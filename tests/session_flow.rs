use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use snap_report::{
    Config, Delivered, Delivery, Location, LocationStatus, Session, SessionBackend, SessionData,
    SessionStore, ShootMode, SqliteBackend,
};

fn config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::rooted_at(dir.path().join("app"), dir.path().join("downloads"));
    config.save_debounce = Duration::from_millis(40);
    config
}

fn jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

#[tokio::test]
async fn capture_report_and_restore() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let (mut session, restored) = Session::open(&config).await;
    assert!(!restored);

    let kitchen = session.add_location("Kitchen").unwrap();
    session
        .add_photos(&kitchen, ShootMode::Before, vec![jpeg(120, 90, [200, 40, 40])])
        .await
        .unwrap();
    session
        .add_photos(
            &kitchen,
            ShootMode::After,
            vec![jpeg(90, 120, [40, 200, 40]), jpeg(64, 64, [40, 40, 200])],
        )
        .await
        .unwrap();

    let location = session.workspace().get(&kitchen).unwrap();
    assert_eq!(location.status(), LocationStatus::Complete);
    assert_eq!(location.pair_count(), 2);

    let delivery = Delivery::save_to(&config.download_dir);
    let outcome = session.generate_report(&kitchen, &delivery).await.unwrap();
    let path = match outcome {
        Some(Delivered::Saved(path)) => path,
        other => panic!("expected a saved report, got {other:?}"),
    };
    let report = image::open(&path).unwrap();
    // Two rows: 2 * 560 + 2 + 2 + 56 logical units, doubled
    assert_eq!((report.width(), report.height()), (2400, 2360));

    session.flush().await;
    drop(session);

    let (session, restored) = Session::open(&config).await;
    assert!(restored);
    let location = session.workspace().get(&kitchen).unwrap();
    assert_eq!(location.before.len(), 1);
    assert_eq!(location.after.len(), 2);
}

#[tokio::test]
async fn deleted_location_is_not_resurrected() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let (mut session, _) = Session::open(&config).await;
    let keep = session.add_location("Keep").unwrap();
    let gone = session.add_location("Gone").unwrap();
    session
        .add_photos(&gone, ShootMode::Before, vec![jpeg(32, 32, [9, 9, 9])])
        .await
        .unwrap();
    session.flush().await;

    session.delete_location(&gone).unwrap();
    session.flush().await;
    drop(session);

    let (session, _) = Session::open(&config).await;
    let ids: Vec<_> = session.locations().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec![keep.as_str()]);
    assert!(session.locations().iter().all(|l| l.before.is_empty()));
}

#[tokio::test]
async fn rapid_mutations_persist_final_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let (mut session, _) = Session::open(&config).await;
    for i in 0..10 {
        session.add_location(&format!("Room {i}")).unwrap();
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    let store = SessionStore::new(SqliteBackend::new(config.db_path.clone()));
    let saved = store.load().await.unwrap();
    assert_eq!(saved.len(), 10);
    assert_eq!(saved.last().unwrap().name, "Room 9");
}

#[tokio::test]
async fn expired_session_is_not_restored() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let backend = SqliteBackend::new(config.db_path.clone());
    backend
        .write(&SessionData {
            locations: vec![Location::new("Stale")],
            saved_at: chrono::Utc::now() - chrono::Duration::hours(25),
        })
        .unwrap();

    let (session, restored) = Session::open(&config).await;
    assert!(!restored);
    assert!(session.locations().is_empty());
    assert!(backend.read().unwrap().is_none());
}
