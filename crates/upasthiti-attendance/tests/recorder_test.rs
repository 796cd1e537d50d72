//! Integration tests for the attendance recorder.

use std::sync::Arc;

use chrono::Utc;
use pretty_assertions::assert_eq;
use upasthiti_attendance::{AttendanceRecorder, SessionRegistry};
use upasthiti_auth::config::AuthConfig;
use upasthiti_auth::qr::QrTokenCodec;
use upasthiti_core::error::UpasthitiError;
use upasthiti_core::geo::{EARTH_RADIUS_METERS, GeoPoint, Geofence};
use upasthiti_core::models::attendance::AttendanceMethod;
use upasthiti_core::models::session::{Session, SessionFields};
use upasthiti_db::repository::{JsonAttendanceRepository, JsonSessionRepository};
use upasthiti_db::{DbConfig, DbManager};
use uuid::Uuid;

type Recorder = AttendanceRecorder<JsonSessionRepository, JsonAttendanceRepository>;

struct Fixture {
    registry: SessionRegistry<JsonSessionRepository>,
    recorder: Arc<Recorder>,
    _dir: tempfile::TempDir,
}

fn codec() -> QrTokenCodec {
    QrTokenCodec::new(&AuthConfig {
        jwt_secret: "recorder-test-secret".into(),
        ..AuthConfig::default()
    })
    .unwrap()
}

async fn setup() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = DbManager::open(&DbConfig {
        data_dir: dir.path().to_path_buf(),
    })
    .await
    .unwrap();

    Fixture {
        registry: SessionRegistry::new(db.sessions()),
        recorder: Arc::new(AttendanceRecorder::new(
            db.sessions(),
            db.attendance(),
            codec(),
        )),
        _dir: dir,
    }
}

async fn maths(fx: &Fixture) -> Session {
    fx.registry
        .create(
            Uuid::new_v4(),
            SessionFields {
                department: "CS".into(),
                subject: "Maths".into(),
                start_time: "09:00".into(),
                end_time: "10:00".into(),
                start_date: "2024-01-01".into(),
                end_date: "2024-06-01".into(),
            },
        )
        .await
        .unwrap()
}

/// A point `meters` due north of `(lat, lng)`.
fn north_of(lat: f64, lng: f64, meters: f64) -> GeoPoint {
    GeoPoint::new(lat + (meters / EARTH_RADIUS_METERS).to_degrees(), lng)
}

#[tokio::test]
async fn geofenced_scan_accepts_near_and_rejects_far() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let fence = Geofence::new(28.0, 77.0, 75.0).unwrap();
    let issued = fx
        .recorder
        .issue_token(session.id, Some(fence))
        .await
        .unwrap();

    let student = Uuid::new_v4();
    let record = fx
        .recorder
        .record_via_token(&issued.token, student, Some(north_of(28.0, 77.0, 50.0)))
        .await
        .unwrap();
    assert_eq!(record.session_id, session.id);
    assert_eq!(record.actor_id, student);
    assert_eq!(record.method, AttendanceMethod::Qr);

    let err = fx
        .recorder
        .record_via_token(&issued.token, Uuid::new_v4(), Some(north_of(28.0, 77.0, 100.0)))
        .await
        .unwrap_err();
    match err {
        UpasthitiError::OutOfRange {
            distance_meters,
            radius_meters,
        } => {
            assert!((distance_meters - 100.0).abs() < 0.5, "{distance_meters}");
            assert_eq!(radius_meters, 75.0);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }

    assert_eq!(fx.recorder.list().await.unwrap(), vec![record]);
}

#[tokio::test]
async fn geofenced_scan_without_location_is_rejected() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let issued = fx
        .recorder
        .issue_token(session.id, Some(Geofence::new(28.0, 77.0, 75.0).unwrap()))
        .await
        .unwrap();

    let err = fx
        .recorder
        .record_via_token(&issued.token, Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, UpasthitiError::LocationRequired), "{err:?}");
    assert!(fx.recorder.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn scan_without_geofence_needs_no_location() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let issued = fx.recorder.issue_token(session.id, None).await.unwrap();

    let record = fx
        .recorder
        .record_via_token(&issued.token, Uuid::new_v4(), None)
        .await
        .unwrap();
    assert_eq!(record.session_id, session.id);

    // A supplied location is ignored when the token carries no fence.
    fx.recorder
        .record_via_token(&issued.token, Uuid::new_v4(), Some(GeoPoint::new(-33.0, 151.0)))
        .await
        .unwrap();
    assert_eq!(fx.recorder.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let issued = fx
        .recorder
        .issue_token(session.id, Some(Geofence::new(28.0, 77.0, 75.0).unwrap()))
        .await
        .unwrap();

    let err = fx
        .recorder
        .record_via_token(&issued.token, Uuid::new_v4(), Some(GeoPoint::new(f64::NAN, 77.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, UpasthitiError::Validation { .. }), "{err:?}");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let issued = fx.recorder.issue_token(session.id, None).await.unwrap();
    let exp = issued.expires_at.timestamp();

    fx.recorder
        .record_via_token_at(&issued.token, Uuid::new_v4(), None, exp)
        .await
        .unwrap();

    let err = fx
        .recorder
        .record_via_token_at(&issued.token, Uuid::new_v4(), None, exp + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, UpasthitiError::InvalidToken), "{err:?}");
    assert_eq!(fx.recorder.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn tampered_or_foreign_tokens_are_invalid() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let issued = fx.recorder.issue_token(session.id, None).await.unwrap();

    let mut tampered = issued.token.clone();
    tampered.push('x');

    let foreign = QrTokenCodec::new(&AuthConfig {
        jwt_secret: "someone-else".into(),
        ..AuthConfig::default()
    })
    .unwrap()
    .issue(session.id, 300, None)
    .unwrap();

    for token in [tampered.as_str(), foreign.token.as_str(), "garbage"] {
        let err = fx
            .recorder
            .record_via_token(token, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UpasthitiError::InvalidToken), "{err:?}");
    }
    assert!(fx.recorder.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn token_for_unknown_session_appends_nothing() {
    let fx = setup().await;
    let ghost = Uuid::new_v4();
    let issued = codec().issue(ghost, 300, None).unwrap();

    let err = fx
        .recorder
        .record_via_token(&issued.token, Uuid::new_v4(), None)
        .await
        .unwrap_err();
    match err {
        UpasthitiError::UnknownSession { session_id } => {
            assert_eq!(session_id, ghost.to_string());
        }
        other => panic!("expected UnknownSession, got {other:?}"),
    }
    assert!(fx.recorder.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn issuing_for_unknown_session_is_not_found() {
    let fx = setup().await;
    let err = fx
        .recorder
        .issue_token(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, UpasthitiError::NotFound { .. }));
}

#[tokio::test]
async fn issuing_with_bad_geofence_is_a_validation_error() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let bad = Geofence {
        lat: 28.0,
        lng: 77.0,
        radius_meters: -5.0,
    };
    let err = fx
        .recorder
        .issue_token(session.id, Some(bad))
        .await
        .unwrap_err();
    assert!(matches!(err, UpasthitiError::Validation { .. }), "{err:?}");
}

#[tokio::test]
async fn concurrent_scans_are_both_recorded() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let issued = fx.recorder.issue_token(session.id, None).await.unwrap();

    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let (ra, rb) = tokio::join!(
        {
            let recorder = fx.recorder.clone();
            let token = issued.token.clone();
            tokio::spawn(async move { recorder.record_via_token(&token, a, None).await })
        },
        {
            let recorder = fx.recorder.clone();
            let token = issued.token.clone();
            tokio::spawn(async move { recorder.record_via_token(&token, b, None).await })
        },
    );
    ra.unwrap().unwrap();
    rb.unwrap().unwrap();

    let mut actors: Vec<Uuid> = fx
        .recorder
        .list_for_session(session.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.actor_id)
        .collect();
    actors.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(actors, expected);
}

#[tokio::test]
async fn manual_entry_skips_token_checks() {
    let fx = setup().await;
    let session = maths(&fx).await;
    let student = Uuid::new_v4();

    let record = fx.recorder.record_manual(session.id, student).await.unwrap();
    assert_eq!(record.method, AttendanceMethod::Manual);
    assert_eq!(record.actor_id, student);
    assert!(record.timestamp <= Utc::now());

    let err = fx
        .recorder
        .record_manual(Uuid::new_v4(), student)
        .await
        .unwrap_err();
    assert!(matches!(err, UpasthitiError::UnknownSession { .. }));
}

#[tokio::test]
async fn records_are_filtered_by_session_and_survive_reopen() {
    let fx = setup().await;
    let maths_session = maths(&fx).await;
    let cs_session = fx
        .registry
        .create(
            Uuid::new_v4(),
            SessionFields {
                department: "CS".into(),
                subject: "Compilers".into(),
                start_time: "11:00".into(),
                end_time: "12:00".into(),
                start_date: "2024-01-01".into(),
                end_date: "2024-06-01".into(),
            },
        )
        .await
        .unwrap();

    let maths_token = fx.recorder.issue_token(maths_session.id, None).await.unwrap();
    fx.recorder
        .record_via_token(&maths_token.token, Uuid::new_v4(), None)
        .await
        .unwrap();
    fx.recorder
        .record_manual(cs_session.id, Uuid::new_v4())
        .await
        .unwrap();

    let only_maths = fx.recorder.list_for_session(maths_session.id).await.unwrap();
    assert_eq!(only_maths.len(), 1);
    assert_eq!(only_maths[0].session_id, maths_session.id);

    let all = fx.recorder.list().await.unwrap();
    assert_eq!(all.len(), 2);

    let reopened = DbManager::open(&DbConfig {
        data_dir: fx._dir.path().to_path_buf(),
    })
    .await
    .unwrap();
    let recorder = AttendanceRecorder::new(reopened.sessions(), reopened.attendance(), codec());
    assert_eq!(recorder.list().await.unwrap(), all);
}
