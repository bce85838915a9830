pub mod assessment;
pub mod domain;
pub mod forms;
pub mod oauth;
pub mod payment;
pub mod ports;

pub use assessment::{
    AssessmentAttempt, AssessmentDefinition, AssessmentError, AssessmentKind, AssessmentPhase,
    AssessmentResult, Question, SubmitReason,
};
pub use domain::{
    theme_class, CompletedLessons, Course, CourseId, LessonId, LessonKey, NavigationExtra,
    NavigationState, ProgressBook, Screen, ScreenParseError, Tab, User, UserType,
    VideoProgressEntry,
};
pub use forms::{FormError, RegistrationForm, SignInForm};
pub use oauth::OAuthProvider;
pub use payment::{Checkout, PaymentError, PaymentMethod, PaymentPhase, Receipt};
pub use ports::{Clock, LocalStorage, PortError, PortResult};
