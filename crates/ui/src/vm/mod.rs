mod assessment_vm;
mod results_vm;
mod state;
mod time_fmt;
mod video_vm;

pub use assessment_vm::{
    AssessmentIntent, AssessmentOutcome, AssessmentVm, OptionVm, PromptVm, QuestionVm,
    SubmissionVm,
};
pub use results_vm::{
    ProgressRowVm, ResultCardVm, ResultsVm, ReviewLineVm, ScoreBand, map_progress_rows,
    map_result_cards,
};
pub use state::{ViewError, ViewState};
pub use time_fmt::{format_clock, format_datetime, format_position};
pub use video_vm::{
    Orientation, OVERLAY_TIMEOUT, PlayerCommand, SKIP_SECONDS, SPEED_STEPS, VideoController,
    VideoOverlayVm,
};
