//! End-to-end enrollment flows over mock hardware and an in-memory
//! directory.

use chrono::NaiveDate;
use enrollkit_biometric::MockCapture;
use enrollkit_core::{Error, Identity, Profile};
use enrollkit_directory::InMemoryDirectory;
use enrollkit_serial::MockSerial;
use enrollkit_workflow::{EnrollmentStep, EnrollmentWorkflow};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn identity(username: &str) -> Identity {
    Identity {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "hunter2hunter2".to_string(),
        confirm_password: "hunter2hunter2".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        is_admin: false,
    }
}

fn profile(number: &str) -> Profile {
    Profile {
        employee_number: number.to_string(),
        department: "7".to_string(),
        position: "Developer".to_string(),
        gender: Some("F".to_string()),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
        date_joined: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
    }
}

#[tokio::test(start_paused = true)]
async fn full_enrollment_happy_path() {
    init_tracing();

    let directory = InMemoryDirectory::new();
    let mut workflow = EnrollmentWorkflow::new(directory.clone());

    // Identity step.
    let account = workflow.submit_identity(identity("jdoe")).await.unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Profile);
    assert_eq!(directory.account_count().await, 1);

    // Profile step.
    let employee = workflow.submit_profile(profile("EMP-001")).await.unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Proximity);
    assert_eq!(directory.employee_count().await, 1);

    // Proximity step: the simulated card acknowledges auth and write.
    let (link, mut serial_handle) = MockSerial::new();
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    serial_handle.push_chunk(vec![0x90, 0x00]).await;

    let proximity = workflow.provision_proximity(link).await.unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Biometric);

    // The frame written to the card carries exactly the attached ID.
    let auth_frame = serial_handle.next_write().await.unwrap();
    assert_eq!(auth_frame[1], 0x82);
    let write_frame = serial_handle.next_write().await.unwrap();
    assert_eq!(&write_frame[..4], &[0xFF, 0xD6, 0x00, 20]);
    let written_id = String::from_utf8(write_frame[5..write_frame.len() - 1].to_vec()).unwrap();
    assert_eq!(written_id, proximity.id);
    assert_eq!(
        directory.proximity_credential(&employee).await.as_deref(),
        Some(proximity.id.as_str())
    );

    // Biometric step: ten stable detections converge.
    let (mut capture, mut capture_handle) = MockCapture::new();
    for _ in 0..10 {
        capture_handle
            .queue_detection(vec![0.25; 128])
            .await
            .unwrap();
    }

    let face = workflow.capture_biometric(&mut capture).await.unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Review);
    assert!(face.id.starts_with("FACE-"));
    assert_eq!(face.id.len(), 5 + 128 * 2);
    assert!(!capture_handle.is_capturing());
    assert_eq!(capture_handle.stop_call_count(), 1);
    assert_eq!(
        directory.biometric_credential(&employee).await.as_deref(),
        Some(face.id.as_str())
    );

    // Review step seals the session.
    let summary = workflow.commit_review().unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Committed);
    assert_eq!(summary.account, account);
    assert_eq!(summary.employee, employee);
    assert_eq!(summary.proximity.id, proximity.id);
    assert_eq!(summary.face.unwrap().id, face.id);
}

#[tokio::test]
async fn biometric_skip_commits_without_face_credential() {
    init_tracing();

    let directory = InMemoryDirectory::new();
    let mut workflow = EnrollmentWorkflow::new(directory.clone());

    workflow.submit_identity(identity("skip")).await.unwrap();
    let employee = workflow.submit_profile(profile("EMP-002")).await.unwrap();

    let (link, mut serial_handle) = MockSerial::new();
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    workflow.provision_proximity(link).await.unwrap();

    workflow.skip_biometric().unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Review);

    let summary = workflow.commit_review().unwrap();
    assert!(summary.face.is_none());
    assert!(directory.biometric_credential(&employee).await.is_none());
    assert!(directory.proximity_credential(&employee).await.is_some());
}

#[tokio::test]
async fn directory_failure_keeps_step_for_retry() {
    init_tracing();

    let directory = InMemoryDirectory::new();
    let mut workflow = EnrollmentWorkflow::new(directory.clone());

    directory.fail_next_requests(1).await;

    let result = workflow.submit_identity(identity("retry")).await;
    match result {
        Err(Error::Directory { status, .. }) => assert_eq!(status, Some(503)),
        other => panic!("expected directory error, got {other:?}"),
    }
    assert_eq!(workflow.current_step(), EnrollmentStep::Identity);
    assert_eq!(directory.account_count().await, 0);

    // Operator retries the same step; nothing was lost.
    workflow.submit_identity(identity("retry")).await.unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Profile);
    assert_eq!(directory.account_count().await, 1);
}

#[tokio::test]
async fn failed_card_write_releases_link_and_allows_retry() {
    init_tracing();

    let directory = InMemoryDirectory::new();
    let mut workflow = EnrollmentWorkflow::new(directory.clone());

    workflow.submit_identity(identity("card")).await.unwrap();
    let employee = workflow.submit_profile(profile("EMP-003")).await.unwrap();

    // First attempt: auth succeeds, write is rejected by the card.
    let (link, mut serial_handle) = MockSerial::new();
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    serial_handle.push_chunk(vec![0x65, 0x81]).await;

    let result = workflow.provision_proximity(link).await;
    match result {
        Err(Error::Write { block, status }) => {
            assert_eq!(block, 20);
            assert_eq!(status, [0x65, 0x81]);
        }
        other => panic!("expected write error, got {other:?}"),
    }
    assert_eq!(workflow.current_step(), EnrollmentStep::Proximity);
    assert!(directory.proximity_credential(&employee).await.is_none());

    // Retry with a fresh link succeeds and attaches a credential.
    let (link, mut serial_handle) = MockSerial::new();
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    serial_handle.push_chunk(vec![0x90, 0x00]).await;

    let record = workflow.provision_proximity(link).await.unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Biometric);
    assert_eq!(
        directory.proximity_credential(&employee).await.as_deref(),
        Some(record.id.as_str())
    );
}

#[tokio::test]
async fn biometric_timeout_releases_stream_then_skip_still_works() {
    init_tracing();

    let directory = InMemoryDirectory::new();
    let mut workflow = EnrollmentWorkflow::new(directory.clone());

    workflow.submit_identity(identity("bio")).await.unwrap();
    workflow.submit_profile(profile("EMP-004")).await.unwrap();

    let (link, mut serial_handle) = MockSerial::new();
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    serial_handle.push_chunk(vec![0x90, 0x00]).await;
    workflow.provision_proximity(link).await.unwrap();

    // The camera never sees a face: the sampling loop hits its deadline.
    let (mut capture, capture_handle) = MockCapture::new();
    tokio::time::pause();
    let result = workflow.capture_biometric(&mut capture).await;
    assert!(matches!(result, Err(Error::Timeout { .. })));

    // The step did not advance and the stream was released anyway.
    assert_eq!(workflow.current_step(), EnrollmentStep::Biometric);
    assert!(!capture_handle.is_capturing());
    assert_eq!(capture_handle.stop_call_count(), 1);

    // The operator gives up on biometrics and skips.
    workflow.skip_biometric().unwrap();
    let summary = workflow.commit_review().unwrap();
    assert!(summary.face.is_none());
}

#[tokio::test]
async fn cancellation_preserves_committed_steps() {
    init_tracing();

    let directory = InMemoryDirectory::new();
    let mut workflow = EnrollmentWorkflow::new(directory.clone());

    workflow.submit_identity(identity("quit")).await.unwrap();
    workflow.submit_profile(profile("EMP-005")).await.unwrap();

    workflow.cancel().unwrap();
    assert_eq!(workflow.current_step(), EnrollmentStep::Cancelled);

    // The per-step commits survive the abandoned session.
    assert_eq!(directory.account_count().await, 1);
    assert_eq!(directory.employee_count().await, 1);

    // A cancelled session accepts no further steps.
    let result = workflow.submit_profile(profile("EMP-006")).await;
    assert!(matches!(result, Err(Error::InvalidStepTransition { .. })));
}
