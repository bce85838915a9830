//! End-to-end runs of the bridge session against an in-memory store.

use growify_core::{LessonKey, LocalStorage, PaymentMethod, Screen, SubmitReason};
use serde_json::json;
use shell_lib::{
    adapters::{MemoryStore, SystemClock},
    app::{registry::ScreenProps, Persistence, RootState},
    bridge::{self, EventReceiver, ShellEvent, ShellSession},
    config::Config,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn fast_config() -> Arc<Config> {
    Arc::new(Config {
        countdown_tick: Duration::from_millis(10),
        payment_delay: Duration::from_millis(20),
        ..Config::default()
    })
}

async fn session_over(store: Arc<MemoryStore>) -> (ShellSession, EventReceiver) {
    let root = RootState::mount(Persistence::new(store), Arc::new(SystemClock), false)
        .await
        .unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let session = ShellSession::new(fast_config(), Arc::new(SystemClock), root, tx);
    (session, rx)
}

async fn send(session: &mut ShellSession, msg: serde_json::Value) {
    session.handle_line(&msg.to_string()).await;
}

async fn next_event(rx: &mut EventReceiver) -> ShellEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

fn drain(rx: &mut EventReceiver) -> Vec<ShellEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn quiz(duration_secs: u64) -> serde_json::Value {
    json!({
        "type": "start_assessment",
        "definition": {
            "id": "lesson-3-quiz",
            "title": "Ownership Quiz",
            "kind": "quiz",
            "durationSecs": duration_secs,
            "questions": [
                {"id": 1, "prompt": "Who owns a value?", "options": ["one binding", "everyone"], "correctOption": 0},
                {"id": 2, "prompt": "Can you move twice?", "options": ["yes", "no"], "correctOption": 1}
            ]
        }
    })
}

#[tokio::test]
async fn sign_in_watch_and_complete_a_lesson() {
    let store = Arc::new(MemoryStore::new());
    let (mut session, mut rx) = session_over(store.clone()).await;

    send(
        &mut session,
        json!({"type": "sign_in", "form": {"email": "ada@growify.io", "password": "engine42"}}),
    )
    .await;
    match next_event(&mut rx).await {
        ShellEvent::ScreenChanged { view } => {
            assert_eq!(view.screen, Screen::Dashboard);
            assert!(view.show_tab_bar);
        }
        other => panic!("unexpected event {other:?}"),
    }

    send(
        &mut session,
        json!({"type": "update_video_progress", "courseId": 2, "lessonId": 3, "currentTime": 600, "duration": 1200}),
    )
    .await;
    match next_event(&mut rx).await {
        ShellEvent::ProgressUpdated { key, entry } => {
            assert_eq!(key, LessonKey::new(2, 3));
            assert_eq!(entry.progress, 50.0);
        }
        other => panic!("unexpected event {other:?}"),
    }

    send(&mut session, json!({"type": "mark_lesson_complete", "courseId": 2, "lessonId": 3})).await;
    send(&mut session, json!({"type": "mark_lesson_complete", "courseId": 2, "lessonId": 3})).await;
    assert_eq!(
        drain(&mut rx),
        vec![
            ShellEvent::LessonCompleted {
                key: LessonKey::new(2, 3),
                newly_completed: true
            },
            ShellEvent::LessonCompleted {
                key: LessonKey::new(2, 3),
                newly_completed: false
            },
        ]
    );

    assert_eq!(
        store.get_item("completedLessons").await.unwrap().as_deref(),
        Some(r#"["2-3"]"#)
    );
    let root = session.root();
    let root = root.lock().await;
    assert_eq!(
        root.video_progress().get(&LessonKey::new(2, 3)).unwrap().progress,
        50.0
    );
}

#[tokio::test]
async fn rejected_forms_and_unknown_screens_leave_state_alone() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;

    send(
        &mut session,
        json!({"type": "sign_in", "form": {"email": "not-an-email", "password": "engine42"}}),
    )
    .await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::FormRejected {
            message: "Please enter a valid email address".to_string()
        }
    );

    send(&mut session, json!({"type": "navigate", "screen": "dashbord"})).await;
    match next_event(&mut rx).await {
        ShellEvent::Error { message } => assert!(message.contains("dashbord")),
        other => panic!("unexpected event {other:?}"),
    }

    session.handle_line("{this is not json").await;
    assert!(matches!(next_event(&mut rx).await, ShellEvent::Error { .. }));

    let root = session.root();
    assert_eq!(root.lock().await.current_screen(), Screen::SignIn);
}

#[tokio::test]
async fn navigating_to_course_details_carries_the_course() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;

    send(
        &mut session,
        json!({"type": "navigate", "screen": "courseDetails", "course": {"id": 9, "title": "Systems Design", "level": "advanced"}}),
    )
    .await;
    match next_event(&mut rx).await {
        ShellEvent::ScreenChanged { view } => {
            assert_eq!(view.screen, Screen::CourseDetails);
            match view.props {
                ScreenProps::CourseDetails { course, completed_count } => {
                    assert_eq!(course.id, 9);
                    assert_eq!(course.extra["level"], "advanced");
                    assert_eq!(completed_count, 0);
                }
                other => panic!("unexpected props {other:?}"),
            }
        }
        other => panic!("unexpected event {other:?}"),
    }

    let root = session.root();
    let root = root.lock().await;
    assert_eq!(root.current_screen(), Screen::CourseDetails);
    assert_eq!(root.selected_course().unwrap().title, "Systems Design");
}

#[tokio::test]
async fn logout_wipes_progress_and_returns_to_sign_in() {
    let store = Arc::new(MemoryStore::new());
    let (mut session, mut rx) = session_over(store.clone()).await;

    send(
        &mut session,
        json!({"type": "register", "form": {"name": "Lin", "email": "lin@growify.io", "password": "abcdef", "confirmPassword": "abcdef"}}),
    )
    .await;
    send(&mut session, json!({"type": "toggle_dark_mode"})).await;
    send(
        &mut session,
        json!({"type": "update_video_progress", "courseId": 1, "lessonId": 1, "currentTime": 5, "duration": 10}),
    )
    .await;
    send(&mut session, json!({"type": "mark_lesson_complete", "courseId": 1, "lessonId": 1})).await;
    drain(&mut rx);

    send(&mut session, json!({"type": "logout"})).await;
    assert_eq!(next_event(&mut rx).await, ShellEvent::LoggedOut);
    match next_event(&mut rx).await {
        ShellEvent::ScreenChanged { view } => assert_eq!(view.screen, Screen::SignIn),
        other => panic!("unexpected event {other:?}"),
    }

    send(&mut session, json!({"type": "get_state"})).await;
    match next_event(&mut rx).await {
        ShellEvent::State { snapshot } => {
            assert!(snapshot.user.is_none());
            assert!(snapshot.video_progress.is_empty());
            assert!(snapshot.completed_lessons.is_empty());
            assert!(snapshot.is_dark_mode);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(store.keys().await, vec!["darkMode".to_string()]);
}

#[tokio::test]
async fn quiz_submitted_by_hand() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;

    send(&mut session, json!({"type": "answer_question", "questionId": 1, "option": 0})).await;
    assert!(matches!(next_event(&mut rx).await, ShellEvent::Alert { .. }));

    send(&mut session, quiz(60)).await;
    match next_event(&mut rx).await {
        ShellEvent::AssessmentStarted {
            remaining_secs,
            question_count,
            ..
        } => {
            assert_eq!(remaining_secs, 60);
            assert_eq!(question_count, 2);
        }
        other => panic!("unexpected event {other:?}"),
    }

    send(&mut session, quiz(60)).await;
    send(&mut session, json!({"type": "answer_question", "questionId": 1, "option": 0})).await;
    send(&mut session, json!({"type": "answer_question", "questionId": 2, "option": 0})).await;
    send(&mut session, json!({"type": "submit_assessment"})).await;

    let events = drain(&mut rx);
    let alerts = events
        .iter()
        .filter(|e| matches!(e, ShellEvent::Alert { .. }))
        .count();
    assert_eq!(alerts, 1);
    let result = events
        .iter()
        .find_map(|e| match e {
            ShellEvent::AssessmentSubmitted { result } => Some(result.clone()),
            _ => None,
        })
        .expect("assessment should be submitted");
    assert_eq!(result.correct, 1);
    assert_eq!(result.percentage, 50.0);
    assert_eq!(result.reason, SubmitReason::Manual);

    // The clock is stopped: no more ticks arrive.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(drain(&mut rx)
        .iter()
        .all(|e| !matches!(e, ShellEvent::CountdownTick { .. })));
}

#[tokio::test]
async fn quiz_times_out_on_its_own() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    send(&mut session, quiz(2)).await;
    assert!(matches!(
        next_event(&mut rx).await,
        ShellEvent::AssessmentStarted { .. }
    ));
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::CountdownTick { remaining_secs: 1 }
    );
    match next_event(&mut rx).await {
        ShellEvent::AssessmentSubmitted { result } => {
            assert_eq!(result.reason, SubmitReason::TimeUp);
            assert_eq!(result.score, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn leaving_the_screen_stops_the_countdown() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    send(&mut session, json!({"type": "navigate", "screen": "quiz"})).await;
    send(&mut session, quiz(600)).await;
    drain(&mut rx);
    assert!(matches!(
        next_event(&mut rx).await,
        ShellEvent::CountdownTick { .. }
    ));

    send(&mut session, json!({"type": "select_tab", "tab": "courses"})).await;
    drain(&mut rx);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(drain(&mut rx).is_empty());

    // A fresh quiz on the new screen starts from scratch.
    send(&mut session, quiz(600)).await;
    match next_event(&mut rx).await {
        ShellEvent::AssessmentStarted { remaining_secs, .. } => assert_eq!(remaining_secs, 600),
        other => panic!("unexpected event {other:?}"),
    }
    session.shutdown();
}

#[tokio::test]
async fn checkout_needs_a_method_then_succeeds() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;

    send(&mut session, json!({"type": "begin_checkout"})).await;
    assert!(matches!(next_event(&mut rx).await, ShellEvent::Alert { .. }));

    send(
        &mut session,
        json!({"type": "navigate", "screen": "payment", "course": {"id": 5, "title": "Rust for Teams", "priceCents": 3900}}),
    )
    .await;
    drain(&mut rx);

    send(&mut session, json!({"type": "begin_checkout"})).await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::CheckoutReady {
            course_id: 5,
            amount_cents: 3900,
            currency: "USD".to_string()
        }
    );

    send(&mut session, json!({"type": "pay"})).await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::Alert {
            message: "Please select a payment method".to_string()
        }
    );

    send(&mut session, json!({"type": "select_payment_method", "method": "upi"})).await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::PaymentMethodSelected {
            method: PaymentMethod::Upi
        }
    );
    send(&mut session, json!({"type": "pay"})).await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::PaymentProcessing { course_id: 5 }
    );
    match next_event(&mut rx).await {
        ShellEvent::PaymentSucceeded { receipt } => {
            assert_eq!(receipt.course_id, 5);
            assert_eq!(receipt.amount_cents, 3900);
            assert_eq!(receipt.method, PaymentMethod::Upi);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn leaving_payment_abandons_processing() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    send(
        &mut session,
        json!({"type": "navigate", "screen": "payment", "course": {"id": 5, "title": "Rust for Teams"}}),
    )
    .await;
    send(&mut session, json!({"type": "begin_checkout", "amountCents": 100})).await;
    send(&mut session, json!({"type": "select_payment_method", "method": "card"})).await;
    send(&mut session, json!({"type": "pay"})).await;
    send(&mut session, json!({"type": "navigate", "screen": "courses"})).await;
    drain(&mut rx);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(drain(&mut rx)
        .iter()
        .all(|e| !matches!(e, ShellEvent::PaymentSucceeded { .. })));
}

async fn open_checkout_and_pay(session: &mut ShellSession) {
    send(
        session,
        json!({"type": "navigate", "screen": "payment", "course": {"id": 5, "title": "Rust for Teams", "priceCents": 3900}}),
    )
    .await;
    send(session, json!({"type": "begin_checkout"})).await;
    send(session, json!({"type": "select_payment_method", "method": "card"})).await;
    send(session, json!({"type": "pay"})).await;
}

#[tokio::test]
async fn returning_to_payment_starts_a_clean_checkout() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;

    open_checkout_and_pay(&mut session).await;
    open_checkout_and_pay(&mut session).await;
    drain(&mut rx);

    let mut succeeded = 0;
    let deadline = tokio::time::Instant::now() + Duration::from_millis(300);
    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        match event {
            ShellEvent::PaymentSucceeded { receipt } => {
                assert_eq!(receipt.amount_cents, 3900);
                succeeded += 1;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(succeeded, 1);
}

#[tokio::test]
async fn checkout_cannot_be_reopened_while_paying() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    open_checkout_and_pay(&mut session).await;
    drain(&mut rx);

    send(&mut session, json!({"type": "begin_checkout", "amountCents": 1})).await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::Alert {
            message: "A payment is already being processed".to_string()
        }
    );
    match next_event(&mut rx).await {
        ShellEvent::PaymentSucceeded { receipt } => assert_eq!(receipt.amount_cents, 3900),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn quiz_without_time_is_refused() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    send(&mut session, quiz(0)).await;
    assert_eq!(
        next_event(&mut rx).await,
        ShellEvent::Alert {
            message: "The assessment has no time to run".to_string()
        }
    );

    send(&mut session, json!({"type": "submit_assessment"})).await;
    assert!(matches!(next_event(&mut rx).await, ShellEvent::Alert { .. }));
}

#[tokio::test]
async fn enormous_point_values_are_scored() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    send(
        &mut session,
        json!({
            "type": "start_assessment",
            "definition": {
                "id": "weekly",
                "title": "Weekly Challenge",
                "kind": "challenge",
                "durationSecs": 600,
                "questions": [
                    {"id": 1, "prompt": "a?", "options": ["x", "y"], "correctOption": 0, "points": 4294967295u64},
                    {"id": 2, "prompt": "b?", "options": ["x", "y"], "correctOption": 0, "points": 4294967295u64}
                ]
            }
        }),
    )
    .await;
    send(&mut session, json!({"type": "answer_question", "questionId": 1, "option": 0})).await;
    send(&mut session, json!({"type": "submit_assessment"})).await;

    let result = drain(&mut rx)
        .into_iter()
        .find_map(|e| match e {
            ShellEvent::AssessmentSubmitted { result } => Some(result),
            _ => None,
        })
        .expect("assessment should be submitted");
    assert_eq!(result.score, 4_294_967_295);
    assert_eq!(result.max_score, 8_589_934_590);
    assert_eq!(result.percentage, 50.0);
}

#[tokio::test]
async fn oauth_links_use_configured_client() {
    let (mut session, mut rx) = session_over(Arc::new(MemoryStore::new())).await;
    send(&mut session, json!({"type": "request_oauth", "provider": "github"})).await;
    match next_event(&mut rx).await {
        ShellEvent::OauthRedirect { url, .. } => {
            assert!(url.starts_with("https://github.com/login/oauth/authorize"));
            assert!(url.contains("client_id=YOUR_GITHUB_CLIENT_ID"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn serve_speaks_json_lines() {
    let (session, rx) = session_over(Arc::new(MemoryStore::new())).await;
    let input = concat!(
        r#"{"type":"navigate","screen":"settings"}"#,
        "\n",
        r#"{"type":"toggle_dark_mode"}"#,
        "\n",
    );
    let (mut client, server) = tokio::io::duplex(64 * 1024);

    bridge::serve(session, rx, input.as_bytes(), server)
        .await
        .unwrap();

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    let events: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["type"], "screen_changed");
    assert_eq!(events[0]["view"]["screen"], "signIn");
    assert_eq!(events[1]["view"]["screen"], "settings");
    assert_eq!(events[2]["type"], "theme_changed");
    assert_eq!(events[2]["darkMode"], true);
    assert_eq!(events[2]["class"], "dark");
}
