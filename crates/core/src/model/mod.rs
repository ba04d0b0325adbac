mod answers;
mod ids;
mod question;
mod quiz;
mod result;
mod session_state;
mod settings;

pub use answers::{AnswerMap, BookmarkSet};
pub use ids::{ParseIdError, QuestionId, QuizId, UserId};
pub use question::{AnswerOption, OptionLetter, Question, QuestionError, QuestionRecord};
pub use quiz::Quiz;
pub use result::{QuestionReview, QuizResult, ResultError, ResultSummary, Score};
pub use session_state::{
    HAS_SEEN_ONBOARDING_KEY, IS_LOGGED_IN_KEY, Landing, SessionFlags, SessionState,
    SessionStateError,
};
pub use settings::AssessmentSettings;
