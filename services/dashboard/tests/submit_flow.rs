//! Request submission against the scripted backend, on a paused clock

use std::{sync::Arc, time::Duration};

use api::{
    ApiError,
    mock::{Call, MockBackend},
    models::{CreateVideoRequest, VideoMethod, VideoRequest},
};
use auth::{Session, models::StoredProfile};
use common::notify::{NotificationCenter, NotificationKind};
use dashboard::{
    Cooldown, ImageUpload, PhraseMode, Rejection, SubmitOutcome, SubmitStatus, Submitter,
    SubmitterSettings,
};
use tokio::time::sleep;

fn session(user_id: &str, email: &str) -> Session {
    Session::new(
        StoredProfile {
            user_id: user_id.to_string(),
            display_name: "Ana".to_string(),
            email: email.to_string(),
            role: None,
        },
        "tok",
    )
    .expect("non-empty token")
}

fn created(id: &str) -> VideoRequest {
    VideoRequest {
        id: id.to_string(),
        method: Some(VideoMethod::Manual),
        phrase: None,
        image_count: Some(1),
        status: "pending".to_string(),
    }
}

fn image(payload: &str) -> ImageUpload {
    ImageUpload::new("cover.png", format!("data:image/png;base64,{payload}"))
}

struct Harness {
    backend: Arc<MockBackend>,
    notifications: NotificationCenter,
    submitter: Submitter,
}

impl Harness {
    fn new(settings: SubmitterSettings) -> Self {
        let backend = Arc::new(MockBackend::new());
        let notifications = NotificationCenter::new(Duration::from_secs(5));
        let submitter = Submitter::new(
            backend.clone(),
            notifications.clone(),
            Cooldown::new(Duration::from_secs(1)),
            settings,
        );
        Self {
            backend,
            notifications,
            submitter,
        }
    }

    fn creates(&self) -> Vec<CreateVideoRequest> {
        self.backend
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateVideoRequest { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_input_is_a_no_op() {
    let harness = Harness::new(SubmitterSettings::default());
    let user = session("7", "ana@example.com");

    assert_eq!(
        harness.submitter.submit(&user).await,
        SubmitOutcome::Rejected(Rejection::NoImages)
    );

    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.set_mode(PhraseMode::Manual).await;
    harness.submitter.set_phrase("   ").await;
    assert_eq!(
        harness.submitter.submit(&user).await,
        SubmitOutcome::Rejected(Rejection::MissingPhrase)
    );

    assert!(harness.backend.calls().is_empty());
    assert_eq!(harness.submitter.status(), SubmitStatus::Idle);
    assert!(!harness.submitter.cooldown().is_active());
}

#[tokio::test(start_paused = true)]
async fn test_removing_every_image_blocks_submission() {
    let harness = Harness::new(SubmitterSettings::default());
    let user = session("7", "ana@example.com");

    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.add_image(image("BBBB")).await;

    assert_eq!(harness.submitter.remove_image(2).await, None);
    assert_eq!(harness.submitter.remove_image(0).await, Some(image("AAAA")));
    assert_eq!(harness.submitter.draft().await.images, vec![image("BBBB")]);
    assert_eq!(harness.submitter.remove_image(0).await, Some(image("BBBB")));

    assert_eq!(
        harness.submitter.submit(&user).await,
        SubmitOutcome::Rejected(Rejection::NoImages)
    );
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_success_triggers_generation_and_resets() {
    let harness = Harness::new(SubmitterSettings::default());
    harness.backend.set_create(Ok(created("42")));
    let user = session("7", "ana@example.com");

    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.add_image(ImageUpload::new("raw.png", "BBBB")).await;
    harness.submitter.set_mode(PhraseMode::Manual).await;
    harness.submitter.set_phrase("  a summer anthem  ").await;

    let outcome = harness.submitter.submit(&user).await;
    assert_eq!(outcome, SubmitOutcome::Succeeded(created("42")));
    assert_eq!(harness.submitter.status(), SubmitStatus::Succeeded);
    assert_eq!(harness.submitter.cooldown().remaining(), 40);

    let draft = harness.submitter.draft().await;
    assert!(draft.images.is_empty());
    assert!(draft.phrase.is_empty());

    let shown = harness.notifications.current().expect("success shown");
    assert_eq!(shown.kind, NotificationKind::Success);

    harness.submitter.flush_triggers().await;
    assert_eq!(
        harness.creates(),
        vec![CreateVideoRequest {
            metodo: VideoMethod::Manual,
            frase: Some("a summer anthem".to_string()),
            num_images: 2,
        }]
    );
    let triggers = harness.backend.triggers();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].request_id, "42");
    assert_eq!(triggers[0].user, "7");
    assert_eq!(triggers[0].frase.as_deref(), Some("a summer anthem"));
    assert_eq!(triggers[0].images, vec!["AAAA".to_string(), "BBBB".to_string()]);

    sleep(Duration::from_millis(4_900)).await;
    assert_eq!(harness.submitter.status(), SubmitStatus::Succeeded);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.submitter.status(), SubmitStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_auto_mode_sends_no_phrase() {
    let harness = Harness::new(SubmitterSettings::default());
    harness.backend.set_create(Ok(created("1")));
    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.set_phrase("ignored in auto mode").await;

    harness.submitter.submit(&session("", "ana@example.com")).await;
    harness.submitter.flush_triggers().await;

    assert_eq!(harness.creates()[0].metodo, VideoMethod::Automatic);
    assert_eq!(harness.creates()[0].frase, None);
    let trigger = &harness.backend.triggers()[0];
    assert_eq!(trigger.frase, None);
    assert_eq!(trigger.user, "ana@example.com");
}

#[tokio::test(start_paused = true)]
async fn test_failure_surfaces_detail_and_skips_trigger() {
    let harness = Harness::new(SubmitterSettings::default());
    harness.backend.set_create(Err(ApiError::Server {
        status: 422,
        detail: Some("Too many images".to_string()),
    }));
    harness.submitter.add_image(image("AAAA")).await;

    let outcome = harness.submitter.submit(&session("7", "")).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(
        harness.submitter.status(),
        SubmitStatus::Failed("Too many images".to_string())
    );
    let shown = harness.notifications.current().expect("error shown");
    assert_eq!(shown.kind, NotificationKind::Error);
    assert_eq!(shown.message, "Too many images");
    assert!(harness.submitter.cooldown().is_active());
    assert_eq!(harness.submitter.draft().await.images.len(), 1);

    harness.submitter.flush_triggers().await;
    assert!(harness.backend.triggers().is_empty());

    sleep(Duration::from_secs(10)).await;
    assert!(matches!(harness.submitter.status(), SubmitStatus::Failed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_failure_without_detail_uses_generic_message() {
    let harness = Harness::new(SubmitterSettings::default());
    harness.submitter.add_image(image("AAAA")).await;

    harness.submitter.submit(&session("7", "")).await;

    match harness.submitter.status() {
        SubmitStatus::Failed(message) => assert!(!message.is_empty()),
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_blocks_resubmission() {
    let harness = Harness::new(SubmitterSettings::default());
    harness.backend.set_create(Ok(created("1")));
    let user = session("7", "");

    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.submit(&user).await;

    sleep(Duration::from_secs(39)).await;
    harness.submitter.add_image(image("BBBB")).await;
    assert_eq!(
        harness.submitter.submit(&user).await,
        SubmitOutcome::Rejected(Rejection::CoolingDown)
    );
    assert_eq!(harness.creates().len(), 1);

    sleep(Duration::from_millis(1_500)).await;
    assert!(matches!(
        harness.submitter.submit(&user).await,
        SubmitOutcome::Succeeded(_)
    ));
    assert_eq!(harness.creates().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_failure_is_only_logged() {
    let harness = Harness::new(SubmitterSettings::default());
    harness.backend.set_create(Ok(created("1")));
    harness
        .backend
        .set_trigger(Err(ApiError::Network("workflow offline".to_string())));
    harness.submitter.add_image(image("AAAA")).await;

    let outcome = harness.submitter.submit(&session("7", "")).await;
    harness.submitter.flush_triggers().await;

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(harness.submitter.status(), SubmitStatus::Succeeded);
    assert_eq!(harness.backend.triggers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_reset_does_not_clobber_newer_submission() {
    let harness = Harness::new(SubmitterSettings {
        cooldown_ticks: 1,
        status_reset: Duration::from_secs(5),
    });
    harness.backend.set_create(Ok(created("1")));
    let user = session("7", "");

    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.submit(&user).await;

    sleep(Duration::from_secs(2)).await;
    harness.backend.set_create(Ok(created("2")));
    harness.submitter.add_image(image("BBBB")).await;
    assert!(matches!(
        harness.submitter.submit(&user).await,
        SubmitOutcome::Succeeded(_)
    ));

    // The first reset fires at 5s and must leave the second success alone
    sleep(Duration::from_millis(3_500)).await;
    assert_eq!(harness.submitter.status(), SubmitStatus::Succeeded);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(harness.submitter.status(), SubmitStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_reset_leaves_later_failure_visible() {
    let harness = Harness::new(SubmitterSettings {
        cooldown_ticks: 1,
        status_reset: Duration::from_secs(5),
    });
    harness.backend.set_create(Ok(created("1")));
    let user = session("7", "");

    harness.submitter.add_image(image("AAAA")).await;
    harness.submitter.submit(&user).await;

    sleep(Duration::from_secs(2)).await;
    harness.backend.set_create(Err(ApiError::Server {
        status: 500,
        detail: Some("Queue full".to_string()),
    }));
    harness.submitter.add_image(image("BBBB")).await;
    harness.submitter.submit(&user).await;

    sleep(Duration::from_secs(10)).await;
    assert_eq!(
        harness.submitter.status(),
        SubmitStatus::Failed("Queue full".to_string())
    );
}
