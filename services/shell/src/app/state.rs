//! services/shell/src/app/state.rs
//!
//! The Root State Container: the single owner of cross-screen state. Screens
//! never mutate these fields directly; they go through the methods below, which
//! also keep local storage in step.

use crate::app::persistence::Persistence;
use growify_core::domain::{
    theme_class, CompletedLessons, Course, CourseId, LessonId, LessonKey, NavigationExtra,
    NavigationState, ProgressBook, Screen, Tab, User, VideoProgressEntry,
};
use growify_core::ports::{Clock, PortResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// A serializable copy of everything the view may want to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub user: Option<User>,
    #[serde(flatten)]
    pub navigation: NavigationState,
    pub video_progress: ProgressBook,
    pub completed_lessons: CompletedLessons,
    pub is_dark_mode: bool,
}

pub struct RootState {
    persistence: Persistence,
    clock: Arc<dyn Clock>,
    user: Option<User>,
    navigation: NavigationState,
    video_progress: ProgressBook,
    completed_lessons: CompletedLessons,
    dark_mode: bool,
}

impl RootState {
    /// Builds the container from whatever a previous session left in storage.
    pub async fn mount(
        persistence: Persistence,
        clock: Arc<dyn Clock>,
        prefers_dark: bool,
    ) -> PortResult<Self> {
        let hydrated = persistence.hydrate(prefers_dark).await?;
        info!(
            dark_mode = hydrated.dark_mode,
            progress_entries = hydrated.video_progress.len(),
            completed = hydrated.completed_lessons.len(),
            "Root state mounted"
        );
        Ok(Self {
            persistence,
            clock,
            user: None,
            navigation: NavigationState::default(),
            video_progress: hydrated.video_progress,
            completed_lessons: hydrated.completed_lessons,
            dark_mode: hydrated.dark_mode,
        })
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn current_screen(&self) -> Screen {
        self.navigation.current_screen
    }

    pub fn selected_course(&self) -> Option<&Course> {
        self.navigation.selected_course.as_ref()
    }

    pub fn video_progress(&self) -> &ProgressBook {
        &self.video_progress
    }

    pub fn completed_lessons(&self) -> &CompletedLessons {
        &self.completed_lessons
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// The class the document root should carry for the current theme.
    pub fn theme_class(&self) -> Option<&'static str> {
        theme_class(self.dark_mode)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            user: self.user.clone(),
            navigation: self.navigation.clone(),
            video_progress: self.video_progress.clone(),
            completed_lessons: self.completed_lessons.clone(),
            is_dark_mode: self.dark_mode,
        }
    }

    //=====================================================================================
    // Mutators
    //=====================================================================================

    pub fn navigate_to_screen(
        &mut self,
        screen: Screen,
        course: Option<Course>,
        extra: Option<NavigationExtra>,
    ) {
        debug!(from = %self.navigation.current_screen, to = %screen, "Navigating");
        self.navigation.navigate(screen, course, extra);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.navigation.select_tab(tab);
    }

    /// Records the watch position for a lesson and persists the whole map.
    pub async fn update_video_progress(
        &mut self,
        course_id: CourseId,
        lesson_id: LessonId,
        current_time: f64,
        duration: f64,
    ) -> PortResult<VideoProgressEntry> {
        let key = LessonKey::new(course_id, lesson_id);
        let entry = self
            .video_progress
            .record(key, current_time, duration, self.clock.now())
            .clone();
        self.persistence.save_progress(&self.video_progress).await?;
        debug!(%key, progress = entry.progress, "Video progress updated");
        Ok(entry)
    }

    /// Marks a lesson finished. Returns whether it was newly added; storage is
    /// only written when the list actually changed.
    pub async fn mark_lesson_complete(
        &mut self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> PortResult<bool> {
        let key = LessonKey::new(course_id, lesson_id);
        if !self.completed_lessons.mark(key) {
            return Ok(false);
        }
        self.persistence
            .save_completed(&self.completed_lessons)
            .await?;
        info!(%key, "Lesson completed");
        Ok(true)
    }

    pub fn handle_login(&mut self, user: User) {
        info!(email = %user.email, "User signed in");
        self.user = Some(user);
        self.navigate_to_screen(Screen::Dashboard, None, None);
    }

    /// Signs out and wipes the learner's progress, in memory and in storage.
    pub async fn handle_logout(&mut self) -> PortResult<()> {
        self.user = None;
        self.navigation = NavigationState::default();
        self.video_progress.clear();
        self.completed_lessons.clear();
        self.persistence.clear_learning_data().await?;
        info!("User signed out");
        Ok(())
    }

    /// Flips dark mode and persists the new flag. Returns the new value.
    pub async fn toggle_dark_mode(&mut self) -> PortResult<bool> {
        self.dark_mode = !self.dark_mode;
        self.persistence.save_dark_mode(self.dark_mode).await?;
        debug!(dark_mode = self.dark_mode, "Theme toggled");
        Ok(self.dark_mode)
    }
}
