//! services/shell/src/app/registry.rs
//!
//! The screen registry: turns the current root state into a description of the
//! one screen to mount, together with the slice of shared state that screen needs.

use crate::app::state::RootState;
use growify_core::domain::{Course, LessonKey, Screen, Tab, User, VideoProgressEntry};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressItem {
    pub key: LessonKey,
    #[serde(flatten)]
    pub entry: VideoProgressEntry,
}

impl From<(LessonKey, VideoProgressEntry)> for ProgressItem {
    fn from((key, entry): (LessonKey, VideoProgressEntry)) -> Self {
        Self { key, entry }
    }
}

/// The shared state handed to a screen when it mounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ScreenProps {
    None,
    Dashboard {
        user: Option<User>,
        continue_watching: Vec<ProgressItem>,
    },
    Catalog {
        search_query: String,
    },
    CourseDetails {
        course: Course,
        completed_count: usize,
    },
    LessonPlayer {
        course: Course,
        progress: Vec<ProgressItem>,
        completed: Vec<LessonKey>,
    },
    Checkout {
        course: Course,
    },
    Settings {
        dark_mode: bool,
    },
    Profile {
        user: Option<User>,
        completed_count: usize,
        in_progress_count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenView {
    pub screen: Screen,
    pub show_tab_bar: bool,
    pub active_tab: Tab,
    pub props: ScreenProps,
}

/// Picks the screen to mount for the current state.
pub fn render(state: &RootState) -> ScreenView {
    let nav = state.navigation();
    let mut screen = nav.current_screen;

    if screen.requires_course() && nav.selected_course.is_none() {
        warn!(%screen, "No course selected, showing the course list instead");
        screen = Screen::Courses;
    }

    ScreenView {
        screen,
        show_tab_bar: screen.shows_tab_bar(),
        active_tab: nav.active_tab,
        props: props_for(screen, state),
    }
}

fn props_for(screen: Screen, state: &RootState) -> ScreenProps {
    let nav = state.navigation();
    let course = nav.selected_course.clone();

    match (screen, course) {
        (Screen::Dashboard, _) => ScreenProps::Dashboard {
            user: state.user().cloned(),
            continue_watching: state
                .video_progress()
                .continue_watching()
                .into_iter()
                .map(ProgressItem::from)
                .collect(),
        },
        (Screen::Courses | Screen::Search, _) => ScreenProps::Catalog {
            search_query: nav.search_query.clone(),
        },
        (Screen::CourseDetails, Some(course)) => ScreenProps::CourseDetails {
            completed_count: state.completed_lessons().count_for_course(course.id),
            course,
        },
        (Screen::LessonPlayer, Some(course)) => ScreenProps::LessonPlayer {
            progress: state
                .video_progress()
                .for_course(course.id)
                .into_iter()
                .map(ProgressItem::from)
                .collect(),
            completed: state.completed_lessons().for_course(course.id),
            course,
        },
        (Screen::Payment, Some(course)) => ScreenProps::Checkout { course },
        (Screen::Settings, _) => ScreenProps::Settings {
            dark_mode: state.is_dark_mode(),
        },
        (Screen::Profile, _) => ScreenProps::Profile {
            user: state.user().cloned(),
            completed_count: state.completed_lessons().len(),
            in_progress_count: state.video_progress().continue_watching().len(),
        },
        _ => ScreenProps::None,
    }
}
