//! services/shell/src/bridge/protocol.rs
//!
//! Defines the message protocol between the view layer and the shell. Each
//! message travels as one line of JSON.

use crate::app::registry::ScreenView;
use crate::app::state::StateSnapshot;
use growify_core::assessment::{AssessmentDefinition, AssessmentKind, AssessmentResult};
use growify_core::domain::{
    Course, CourseId, LessonId, LessonKey, NavigationExtra, Tab, VideoProgressEntry,
};
use growify_core::forms::{RegistrationForm, SignInForm};
use growify_core::oauth::OAuthProvider;
use growify_core::payment::{PaymentMethod, Receipt};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the View TO the Shell
//=========================================================================================

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ViewMessage {
    /// Requests a screen change. The identifier is validated by the shell so that
    /// a typo is reported instead of silently landing on the sign-in screen.
    Navigate {
        screen: String,
        #[serde(default)]
        course: Option<Course>,
        #[serde(default)]
        extra: Option<NavigationExtra>,
    },
    SelectTab {
        tab: Tab,
    },
    SignIn {
        form: SignInForm,
    },
    Register {
        form: RegistrationForm,
    },
    RequestOauth {
        provider: OAuthProvider,
    },
    UpdateVideoProgress {
        course_id: CourseId,
        lesson_id: LessonId,
        current_time: f64,
        duration: f64,
    },
    MarkLessonComplete {
        course_id: CourseId,
        lesson_id: LessonId,
    },
    ToggleDarkMode,
    Logout,

    /// Starts a quiz or challenge on the current screen. Its clock stops when
    /// the screen goes away.
    StartAssessment {
        definition: AssessmentDefinition,
    },
    AnswerQuestion {
        question_id: u32,
        option: usize,
    },
    SubmitAssessment,

    /// Opens a checkout for the selected course. The amount defaults to the
    /// course's own price.
    BeginCheckout {
        #[serde(default)]
        amount_cents: Option<u64>,
        #[serde(default)]
        currency: Option<String>,
    },
    SelectPaymentMethod {
        method: PaymentMethod,
    },
    Pay,

    GetState,
}

//=========================================================================================
// Messages Sent FROM the Shell TO the View
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ShellEvent {
    /// The view should mount this screen.
    ScreenChanged { view: ScreenView },

    ProgressUpdated {
        key: LessonKey,
        entry: VideoProgressEntry,
    },
    LessonCompleted {
        key: LessonKey,
        newly_completed: bool,
    },
    /// `class` is what the document root should carry (`None` removes it).
    ThemeChanged {
        dark_mode: bool,
        class: Option<String>,
    },
    LoggedOut,

    FormRejected { message: String },
    OauthRedirect { provider: OAuthProvider, url: String },

    AssessmentStarted {
        id: String,
        kind: AssessmentKind,
        remaining_secs: u64,
        question_count: usize,
    },
    CountdownTick { remaining_secs: u64 },
    AssessmentSubmitted { result: AssessmentResult },

    CheckoutReady {
        course_id: CourseId,
        amount_cents: u64,
        currency: String,
    },
    PaymentMethodSelected { method: PaymentMethod },
    PaymentProcessing { course_id: CourseId },
    PaymentSucceeded { receipt: Receipt },

    State { snapshot: StateSnapshot },

    /// A blocking notice for the user, e.g. paying before choosing a method.
    Alert { message: String },

    /// The request could not be carried out at all.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_with_course_and_query() {
        let msg: ViewMessage = serde_json::from_str(
            r#"{"type":"navigate","screen":"courseDetails","course":{"id":2,"title":"Rust"},"extra":{"searchQuery":"traits"}}"#,
        )
        .unwrap();
        match msg {
            ViewMessage::Navigate {
                screen,
                course,
                extra,
            } => {
                assert_eq!(screen, "courseDetails");
                assert_eq!(course.unwrap().id, 2);
                assert_eq!(extra.unwrap().search_query.as_deref(), Some("traits"));
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn parses_progress_update() {
        let msg: ViewMessage = serde_json::from_str(
            r#"{"type":"update_video_progress","courseId":2,"lessonId":3,"currentTime":600,"duration":1200}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ViewMessage::UpdateVideoProgress {
                course_id: 2,
                lesson_id: 3,
                ..
            }
        ));
    }

    #[test]
    fn events_are_tagged() {
        let json = serde_json::to_value(ShellEvent::ThemeChanged {
            dark_mode: true,
            class: Some("dark".into()),
        })
        .unwrap();
        assert_eq!(json["type"], "theme_changed");
        assert_eq!(json["darkMode"], true);
        assert_eq!(json["class"], "dark");

        let json = serde_json::to_value(ShellEvent::LoggedOut).unwrap();
        assert_eq!(json, serde_json::json!({"type": "logged_out"}));
    }
}
