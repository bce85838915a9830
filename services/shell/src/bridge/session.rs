//! services/shell/src/bridge/session.rs
//!
//! The control loop of the bridge. Every `ViewMessage` is turned into calls on
//! the root state container or on the mounted screen's local state, and the
//! outcome is reported back as `ShellEvent`s.

use crate::app::registry::render;
use crate::app::state::RootState;
use crate::bridge::countdown::countdown_process;
use crate::bridge::payment_task::payment_process;
use crate::bridge::protocol::{ShellEvent, ViewMessage};
use crate::bridge::state::{send_event, EventSender, ScreenLocal};
use crate::config::Config;
use growify_core::assessment::{AssessmentAttempt, AssessmentDefinition, AssessmentPhase};
use growify_core::domain::{Course, LessonKey, NavigationExtra, Screen, Tab, User};
use growify_core::forms::FormError;
use growify_core::oauth::{authorization_url, OAuthProvider};
use growify_core::payment::{Checkout, PaymentError, PaymentMethod, PaymentPhase};
use growify_core::ports::{Clock, PortError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const DEFAULT_CURRENCY: &str = "USD";

pub struct ShellSession {
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
    root: Arc<Mutex<RootState>>,
    screen_local: Arc<Mutex<ScreenLocal>>,
    /// Parent of every screen token; cancelled once on shutdown.
    shutdown_token: CancellationToken,
    /// Lives exactly as long as the mounted screen.
    screen_token: CancellationToken,
    events: EventSender,
}

impl ShellSession {
    pub fn new(
        config: Arc<Config>,
        clock: Arc<dyn Clock>,
        root: RootState,
        events: EventSender,
    ) -> Self {
        let shutdown_token = CancellationToken::new();
        let screen_token = shutdown_token.child_token();
        Self {
            config,
            clock,
            root: Arc::new(Mutex::new(root)),
            screen_local: Arc::new(Mutex::new(ScreenLocal::default())),
            shutdown_token,
            screen_token,
            events,
        }
    }

    pub fn root(&self) -> Arc<Mutex<RootState>> {
        self.root.clone()
    }

    /// Reports the initially mounted screen.
    pub async fn announce(&self) {
        self.emit_screen().await;
    }

    /// Parses one line from the view and handles it. Bad input is reported, never fatal.
    pub async fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<ViewMessage>(line) {
            Ok(msg) => self.handle(msg).await,
            Err(e) => {
                warn!("Failed to deserialize view message: {}", e);
                self.emit(ShellEvent::Error {
                    message: format!("Malformed message: {}", e),
                });
            }
        }
    }

    pub async fn handle(&mut self, msg: ViewMessage) {
        match msg {
            ViewMessage::Navigate {
                screen,
                course,
                extra,
            } => self.navigate(&screen, course, extra).await,
            ViewMessage::SelectTab { tab } => self.select_tab(tab).await,
            ViewMessage::SignIn { form } => self.sign_in(form.validate()).await,
            ViewMessage::Register { form } => self.sign_in(form.validate()).await,
            ViewMessage::RequestOauth { provider } => self.request_oauth(provider),
            ViewMessage::UpdateVideoProgress {
                course_id,
                lesson_id,
                current_time,
                duration,
            } => {
                let result = self
                    .root
                    .lock()
                    .await
                    .update_video_progress(course_id, lesson_id, current_time, duration)
                    .await;
                match result {
                    Ok(entry) => self.emit(ShellEvent::ProgressUpdated {
                        key: LessonKey::new(course_id, lesson_id),
                        entry,
                    }),
                    Err(e) => self.report_port_error("save video progress", e),
                }
            }
            ViewMessage::MarkLessonComplete {
                course_id,
                lesson_id,
            } => {
                let result = self
                    .root
                    .lock()
                    .await
                    .mark_lesson_complete(course_id, lesson_id)
                    .await;
                match result {
                    Ok(newly_completed) => self.emit(ShellEvent::LessonCompleted {
                        key: LessonKey::new(course_id, lesson_id),
                        newly_completed,
                    }),
                    Err(e) => self.report_port_error("save completed lessons", e),
                }
            }
            ViewMessage::ToggleDarkMode => {
                let mut root = self.root.lock().await;
                match root.toggle_dark_mode().await {
                    Ok(dark_mode) => {
                        let class = root.theme_class().map(str::to_string);
                        drop(root);
                        self.emit(ShellEvent::ThemeChanged { dark_mode, class });
                    }
                    Err(e) => {
                        drop(root);
                        self.report_port_error("save the theme", e);
                    }
                }
            }
            ViewMessage::Logout => self.logout().await,
            ViewMessage::StartAssessment { definition } => {
                self.start_assessment(definition).await
            }
            ViewMessage::AnswerQuestion {
                question_id,
                option,
            } => {
                let mut local = self.screen_local.lock().await;
                let outcome = match local.assessment.as_mut() {
                    Some(attempt) => attempt.answer(question_id, option).map_err(|e| e.to_string()),
                    None => Err("No assessment is running".to_string()),
                };
                drop(local);
                if let Err(message) = outcome {
                    self.emit(ShellEvent::Alert { message });
                }
            }
            ViewMessage::SubmitAssessment => self.submit_assessment().await,
            ViewMessage::BeginCheckout {
                amount_cents,
                currency,
            } => self.begin_checkout(amount_cents, currency).await,
            ViewMessage::SelectPaymentMethod { method } => self.select_payment_method(method).await,
            ViewMessage::Pay => self.pay().await,
            ViewMessage::GetState => {
                let snapshot = self.root.lock().await.snapshot();
                self.emit(ShellEvent::State { snapshot });
            }
        }
    }

    /// Cancels every task the session started.
    pub fn shutdown(&self) {
        info!("Shutting down shell session.");
        self.shutdown_token.cancel();
    }

    //=====================================================================================
    // Navigation
    //=====================================================================================

    async fn navigate(
        &mut self,
        screen: &str,
        course: Option<Course>,
        extra: Option<NavigationExtra>,
    ) {
        let screen = match screen.parse::<Screen>() {
            Ok(screen) => screen,
            Err(e) => {
                error!("Rejected navigation: {}", e);
                self.emit(ShellEvent::Error {
                    message: e.to_string(),
                });
                return;
            }
        };
        self.unmount_screen().await;
        self.root
            .lock()
            .await
            .navigate_to_screen(screen, course, extra);
        self.emit_screen().await;
    }

    async fn select_tab(&mut self, tab: Tab) {
        self.unmount_screen().await;
        self.root.lock().await.select_tab(tab);
        self.emit_screen().await;
    }

    /// Tears down the mounted screen: its timers stop and its local state is dropped.
    async fn unmount_screen(&mut self) {
        self.screen_token.cancel();
        self.screen_token = self.shutdown_token.child_token();
        let mut local = self.screen_local.lock().await;
        local.stop_countdown();
        *local = ScreenLocal::default();
    }

    async fn emit_screen(&self) {
        let view = render(&*self.root.lock().await);
        self.emit(ShellEvent::ScreenChanged { view });
    }

    //=====================================================================================
    // Session
    //=====================================================================================

    async fn sign_in(&mut self, validated: Result<User, FormError>) {
        match validated {
            Ok(user) => {
                self.unmount_screen().await;
                self.root.lock().await.handle_login(user);
                self.emit_screen().await;
            }
            Err(e) => {
                info!("Form rejected: {}", e);
                self.emit(ShellEvent::FormRejected {
                    message: e.to_string(),
                });
            }
        }
    }

    fn request_oauth(&self, provider: OAuthProvider) {
        let client_id = match provider {
            OAuthProvider::Google => &self.config.google_client_id,
            OAuthProvider::GitHub => &self.config.github_client_id,
        };
        let url = authorization_url(provider, client_id, &self.config.oauth_redirect_uri);
        self.emit(ShellEvent::OauthRedirect { provider, url });
    }

    async fn logout(&mut self) {
        self.unmount_screen().await;
        let result = self.root.lock().await.handle_logout().await;
        if let Err(e) = result {
            self.report_port_error("clear saved progress", e);
        }
        self.emit(ShellEvent::LoggedOut);
        self.emit_screen().await;
    }

    //=====================================================================================
    // Quizzes and Challenges
    //=====================================================================================

    async fn start_assessment(&mut self, definition: AssessmentDefinition) {
        let mut local = self.screen_local.lock().await;
        if let Some(current) = local.assessment.as_ref() {
            if current.phase() == AssessmentPhase::InProgress {
                drop(local);
                self.emit(ShellEvent::Alert {
                    message: "An assessment is already in progress".to_string(),
                });
                return;
            }
        }
        local.stop_countdown();

        let mut attempt = AssessmentAttempt::new(definition);
        if let Err(e) = attempt.start() {
            drop(local);
            self.emit(ShellEvent::Alert {
                message: e.to_string(),
            });
            return;
        }
        let started = ShellEvent::AssessmentStarted {
            id: attempt.definition().id.clone(),
            kind: attempt.definition().kind,
            remaining_secs: attempt.remaining_secs(),
            question_count: attempt.definition().questions.len(),
        };
        info!(id = %attempt.definition().id, "Assessment started.");

        let token = self.screen_token.child_token();
        local.assessment = Some(attempt);
        local.assessment_token = Some(token.clone());
        drop(local);

        self.emit(started);
        tokio::spawn(countdown_process(
            self.screen_local.clone(),
            self.events.clone(),
            self.config.countdown_tick,
            token,
        ));
    }

    async fn submit_assessment(&mut self) {
        let mut local = self.screen_local.lock().await;
        let outcome = match local.assessment.as_mut() {
            Some(attempt) => attempt.submit().cloned().map_err(|e| e.to_string()),
            None => Err("No assessment is running".to_string()),
        };
        if outcome.is_ok() {
            local.stop_countdown();
        }
        drop(local);

        match outcome {
            Ok(result) => {
                info!(score = result.score, max = result.max_score, "Assessment submitted.");
                self.emit(ShellEvent::AssessmentSubmitted { result });
            }
            Err(message) => self.emit(ShellEvent::Alert { message }),
        }
    }

    //=====================================================================================
    // Payments
    //=====================================================================================

    async fn begin_checkout(&mut self, amount_cents: Option<u64>, currency: Option<String>) {
        let course = self.root.lock().await.selected_course().cloned();
        let Some(course) = course else {
            self.emit(ShellEvent::Alert {
                message: "Please choose a course first".to_string(),
            });
            return;
        };

        let amount_cents = amount_cents.or(course.price_cents).unwrap_or(0);
        let currency = currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let mut local = self.screen_local.lock().await;
        if let Some(PaymentPhase::Processing) = local.checkout.as_ref().map(Checkout::phase) {
            drop(local);
            self.emit(ShellEvent::Alert {
                message: PaymentError::AlreadyProcessing.to_string(),
            });
            return;
        }
        local.checkout = Some(Checkout::new(course.id, amount_cents, currency.clone()));
        drop(local);
        self.emit(ShellEvent::CheckoutReady {
            course_id: course.id,
            amount_cents,
            currency,
        });
    }

    async fn select_payment_method(&mut self, method: PaymentMethod) {
        let mut local = self.screen_local.lock().await;
        let outcome = match local.checkout.as_mut() {
            Some(checkout) => checkout.select_method(method).map_err(|e| e.to_string()),
            None => Err("No checkout is open".to_string()),
        };
        drop(local);
        match outcome {
            Ok(()) => self.emit(ShellEvent::PaymentMethodSelected { method }),
            Err(message) => self.emit(ShellEvent::Alert { message }),
        }
    }

    async fn pay(&mut self) {
        let mut local = self.screen_local.lock().await;
        let outcome = match local.checkout.as_mut() {
            Some(checkout) => checkout
                .begin_processing()
                .map(|()| checkout.course_id())
                .map_err(|e| e.to_string()),
            None => Err("No checkout is open".to_string()),
        };
        drop(local);

        match outcome {
            Ok(course_id) => {
                info!(course_id, "Payment processing started.");
                self.emit(ShellEvent::PaymentProcessing { course_id });
                tokio::spawn(payment_process(
                    self.screen_local.clone(),
                    self.events.clone(),
                    self.clock.clone(),
                    self.config.payment_delay,
                    self.screen_token.child_token(),
                ));
            }
            Err(message) => self.emit(ShellEvent::Alert { message }),
        }
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    fn emit(&self, event: ShellEvent) {
        send_event(&self.events, event);
    }

    fn report_port_error(&self, action: &str, e: PortError) {
        error!("Failed to {}: {:?}", action, e);
        self.emit(ShellEvent::Error {
            message: format!("Failed to {}: {}", action, e),
        });
    }
}
