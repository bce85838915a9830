//! crates/growify_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application: who is signed in,
//! which screen is showing, and how far the learner got through each lesson.
//! Nothing here touches storage; the shell decides when these values are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type CourseId = u32;
pub type LessonId = u32;

//=========================================================================================
// Users and Courses
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Student,
    Instructor,
}

/// The signed-in user. Held in memory only; a restart signs the user out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

/// A course as handed over by the view when it navigates somewhere.
/// Fields the shell does not care about are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Course {
    pub fn new(id: CourseId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            instructor: None,
            price_cents: None,
            extra: serde_json::Map::new(),
        }
    }
}

//=========================================================================================
// Lesson Keys
//=========================================================================================

/// Identifies one lesson of one course. Written as `"courseId-lessonId"` wherever
/// it is stored, which is the key shared by the progress map and the completed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LessonKey {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
}

impl LessonKey {
    pub fn new(course_id: CourseId, lesson_id: LessonId) -> Self {
        Self {
            course_id,
            lesson_id,
        }
    }
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.course_id, self.lesson_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid lesson key (expected \"courseId-lessonId\")")]
pub struct LessonKeyParseError(pub String);

impl FromStr for LessonKey {
    type Err = LessonKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LessonKeyParseError(s.to_string());
        let (course, lesson) = s.split_once('-').ok_or_else(invalid)?;
        let course_id = course.parse().map_err(|_| invalid())?;
        let lesson_id = lesson.parse().map_err(|_| invalid())?;
        Ok(Self::new(course_id, lesson_id))
    }
}

impl TryFrom<String> for LessonKey {
    type Error = LessonKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LessonKey> for String {
    fn from(key: LessonKey) -> Self {
        key.to_string()
    }
}

//=========================================================================================
// Video Progress
//=========================================================================================

/// How far into a lesson video the learner got, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProgressEntry {
    pub current_time: f64,
    pub duration: f64,
    /// Percentage watched, always within `0..=100`.
    pub progress: f64,
    pub last_watched: DateTime<Utc>,
}

/// Percentage of `duration` covered by `current_time`, clamped to `0..=100`.
/// A zero, negative or non-finite duration counts as nothing watched.
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration * 100.0).clamp(0.0, 100.0)
}

/// The "continue watching" map. Grows with every lesson opened; nothing is evicted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    entries: BTreeMap<LessonKey, VideoProgressEntry>,
}

impl ProgressBook {
    /// Upserts the entry for `key`, replacing whatever was recorded before.
    pub fn record(
        &mut self,
        key: LessonKey,
        current_time: f64,
        duration: f64,
        now: DateTime<Utc>,
    ) -> &VideoProgressEntry {
        let entry = VideoProgressEntry {
            current_time,
            duration,
            progress: progress_percent(current_time, duration),
            last_watched: now,
        };
        self.entries.insert(key, entry);
        &self.entries[&key]
    }

    pub fn get(&self, key: &LessonKey) -> Option<&VideoProgressEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LessonKey, &VideoProgressEntry)> {
        self.entries.iter()
    }

    pub fn for_course(&self, course_id: CourseId) -> Vec<(LessonKey, VideoProgressEntry)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.course_id == course_id)
            .map(|(key, entry)| (*key, entry.clone()))
            .collect()
    }

    /// Unfinished lessons, most recently watched first.
    pub fn continue_watching(&self) -> Vec<(LessonKey, VideoProgressEntry)> {
        let mut watching: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.progress < 100.0)
            .map(|(key, entry)| (*key, entry.clone()))
            .collect();
        watching.sort_by(|a, b| b.1.last_watched.cmp(&a.1.last_watched));
        watching
    }
}

//=========================================================================================
// Completed Lessons
//=========================================================================================

/// Lessons the learner explicitly finished, in the order they were finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedLessons {
    keys: Vec<LessonKey>,
}

impl CompletedLessons {
    /// Appends `key` unless it is already present. Returns whether it was added.
    pub fn mark(&mut self, key: LessonKey) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn contains(&self, key: &LessonKey) -> bool {
        self.keys.contains(key)
    }

    pub fn count_for_course(&self, course_id: CourseId) -> usize {
        self.keys.iter().filter(|k| k.course_id == course_id).count()
    }

    pub fn for_course(&self, course_id: CourseId) -> Vec<LessonKey> {
        self.keys
            .iter()
            .filter(|k| k.course_id == course_id)
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn as_slice(&self) -> &[LessonKey] {
        &self.keys
    }
}

//=========================================================================================
// Screens and Navigation
//=========================================================================================

/// Every screen the application can show. Anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    #[default]
    SignIn,
    Register,
    ForgotPassword,
    Dashboard,
    Courses,
    CourseDetails,
    LessonPlayer,
    Quiz,
    QuizResults,
    Challenges,
    ChallengeDetails,
    Contests,
    ContestDetails,
    Leaderboard,
    Achievements,
    Certificates,
    Profile,
    EditProfile,
    Payment,
    PaymentSuccess,
    Settings,
    Notifications,
    Search,
    Help,
    Faq,
    ContactSupport,
    About,
    PrivacyPolicy,
    TermsOfService,
}

impl Screen {
    pub const ALL: [Screen; 29] = [
        Screen::SignIn,
        Screen::Register,
        Screen::ForgotPassword,
        Screen::Dashboard,
        Screen::Courses,
        Screen::CourseDetails,
        Screen::LessonPlayer,
        Screen::Quiz,
        Screen::QuizResults,
        Screen::Challenges,
        Screen::ChallengeDetails,
        Screen::Contests,
        Screen::ContestDetails,
        Screen::Leaderboard,
        Screen::Achievements,
        Screen::Certificates,
        Screen::Profile,
        Screen::EditProfile,
        Screen::Payment,
        Screen::PaymentSuccess,
        Screen::Settings,
        Screen::Notifications,
        Screen::Search,
        Screen::Help,
        Screen::Faq,
        Screen::ContactSupport,
        Screen::About,
        Screen::PrivacyPolicy,
        Screen::TermsOfService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::SignIn => "signIn",
            Screen::Register => "register",
            Screen::ForgotPassword => "forgotPassword",
            Screen::Dashboard => "dashboard",
            Screen::Courses => "courses",
            Screen::CourseDetails => "courseDetails",
            Screen::LessonPlayer => "lessonPlayer",
            Screen::Quiz => "quiz",
            Screen::QuizResults => "quizResults",
            Screen::Challenges => "challenges",
            Screen::ChallengeDetails => "challengeDetails",
            Screen::Contests => "contests",
            Screen::ContestDetails => "contestDetails",
            Screen::Leaderboard => "leaderboard",
            Screen::Achievements => "achievements",
            Screen::Certificates => "certificates",
            Screen::Profile => "profile",
            Screen::EditProfile => "editProfile",
            Screen::Payment => "payment",
            Screen::PaymentSuccess => "paymentSuccess",
            Screen::Settings => "settings",
            Screen::Notifications => "notifications",
            Screen::Search => "search",
            Screen::Help => "help",
            Screen::Faq => "faq",
            Screen::ContactSupport => "contactSupport",
            Screen::About => "about",
            Screen::PrivacyPolicy => "privacyPolicy",
            Screen::TermsOfService => "termsOfService",
        }
    }

    /// Whether the persistent bottom tab bar is visible on this screen.
    pub fn shows_tab_bar(&self) -> bool {
        self.tab().is_some()
    }

    /// The tab this screen belongs to, if it is one of the tab bar's screens.
    pub fn tab(&self) -> Option<Tab> {
        match self {
            Screen::Dashboard => Some(Tab::Home),
            Screen::Courses => Some(Tab::Courses),
            Screen::Challenges => Some(Tab::Challenges),
            Screen::Contests => Some(Tab::Contests),
            Screen::Achievements => Some(Tab::Achievements),
            Screen::Profile => Some(Tab::Profile),
            _ => None,
        }
    }

    /// Screens that cannot render without a selected course.
    pub fn requires_course(&self) -> bool {
        matches!(
            self,
            Screen::CourseDetails | Screen::LessonPlayer | Screen::Payment
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown screen identifier '{0}'")]
pub struct ScreenParseError(pub String);

impl FromStr for Screen {
    type Err = ScreenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .iter()
            .find(|screen| screen.as_str() == s)
            .copied()
            .ok_or_else(|| ScreenParseError(s.to_string()))
    }
}

/// Entries of the bottom tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    #[default]
    Home,
    Courses,
    Challenges,
    Contests,
    Achievements,
    Profile,
}

impl Tab {
    pub fn screen(&self) -> Screen {
        match self {
            Tab::Home => Screen::Dashboard,
            Tab::Courses => Screen::Courses,
            Tab::Challenges => Screen::Challenges,
            Tab::Contests => Screen::Contests,
            Tab::Achievements => Screen::Achievements,
            Tab::Profile => Screen::Profile,
        }
    }
}

/// Optional extras carried by a navigation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationExtra {
    #[serde(default)]
    pub search_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_screen: Screen,
    pub selected_course: Option<Course>,
    pub active_tab: Tab,
    pub search_query: String,
}

impl NavigationState {
    /// Moves to `screen`. The selected course and search query are only replaced
    /// when the request carries new values.
    pub fn navigate(
        &mut self,
        screen: Screen,
        course: Option<Course>,
        extra: Option<NavigationExtra>,
    ) {
        self.current_screen = screen;
        if let Some(course) = course {
            self.selected_course = Some(course);
        }
        if let Some(query) = extra.and_then(|e| e.search_query) {
            self.search_query = query;
        }
        if let Some(tab) = screen.tab() {
            self.active_tab = tab;
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.current_screen = tab.screen();
    }
}

/// Class applied to the document root while dark mode is on.
pub fn theme_class(dark_mode: bool) -> Option<&'static str> {
    dark_mode.then_some("dark")
}
