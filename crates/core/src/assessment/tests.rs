use super::*;
use crate::model::{OptionLetter, Question, QuestionId, QuestionRecord, Quiz, QuizId, UserId};
use crate::time::fixed_now;

fn letter(s: &str) -> OptionLetter {
    OptionLetter::parse(s).unwrap()
}

fn questions() -> Vec<Question> {
    vec![
        QuestionRecord::with_options(
            QuestionId::new(1),
            QuizId::new(7),
            "Capital of France?",
            vec!["Paris".into(), "London".into()],
            "Paris",
        )
        .normalize()
        .unwrap(),
        QuestionRecord::with_fields(
            QuestionId::new(2),
            QuizId::new(7),
            "2 + 2?",
            [Some("3"), Some("4"), Some("5"), None],
            "B",
        )
        .normalize()
        .unwrap(),
    ]
}

fn session(duration_minutes: Option<u32>) -> AssessmentSession {
    AssessmentSession::new(
        Quiz::new(QuizId::new(7), "Mixed", duration_minutes),
        UserId::random(),
        questions(),
        fixed_now(),
    )
    .unwrap()
}

fn apply(s: &mut AssessmentSession, event: Event) -> Vec<Effect> {
    s.apply(event, fixed_now()).unwrap()
}

fn persisted(effects: &[Effect]) -> Option<&crate::model::QuizResult> {
    effects.iter().find_map(|e| match e {
        Effect::Persist(result) => Some(result),
        _ => None,
    })
}

#[test]
fn empty_question_set_is_rejected() {
    let err = AssessmentSession::new(
        Quiz::new(QuizId::new(1), "", None),
        UserId::random(),
        Vec::new(),
        fixed_now(),
    )
    .unwrap_err();
    assert_eq!(err, TransitionError::NoQuestions);
}

#[test]
fn timed_quiz_starts_timer_untimed_does_not() {
    assert_eq!(session(Some(1)).initial_effects(), vec![Effect::StartTimer]);
    assert!(session(None).initial_effects().is_empty());
    assert_eq!(session(Some(1)).remaining_seconds(), Some(60));
    assert_eq!(session(None).remaining_seconds(), None);
}

#[test]
fn selecting_answer_overwrites_and_arms_debounced_indicator() {
    let mut s = session(None);
    let first = apply(
        &mut s,
        Event::SelectAnswer {
            question_id: QuestionId::new(1),
            letter: letter("a"),
        },
    );
    let second = apply(
        &mut s,
        Event::SelectAnswer {
            question_id: QuestionId::new(1),
            letter: letter("B"),
        },
    );
    assert_eq!(first, vec![Effect::ScheduleSavedIndicator { generation: 1 }]);
    assert_eq!(second, vec![Effect::ScheduleSavedIndicator { generation: 2 }]);
    assert_eq!(s.answers().get(QuestionId::new(1)), Some(letter("B")));
    assert_eq!(s.answers().len(), 1);

    // The superseded timeout must not hide the indicator.
    apply(&mut s, Event::SavedIndicatorElapsed { generation: 1 });
    assert!(s.saved_indicator_visible());
    apply(&mut s, Event::SavedIndicatorElapsed { generation: 2 });
    assert!(!s.saved_indicator_visible());
}

#[test]
fn selecting_an_option_the_question_lacks_is_rejected() {
    let mut s = session(None);
    let err = s
        .apply(
            Event::SelectAnswer {
                question_id: QuestionId::new(2),
                letter: letter("D"),
            },
            fixed_now(),
        )
        .unwrap_err();
    assert!(matches!(err, TransitionError::OptionNotOffered { .. }));
    assert!(s.answers().is_empty());
}

#[test]
fn unknown_question_is_rejected() {
    let mut s = session(None);
    let err = s
        .apply(
            Event::ToggleBookmark {
                question_id: QuestionId::new(99),
            },
            fixed_now(),
        )
        .unwrap_err();
    assert_eq!(err, TransitionError::UnknownQuestion(QuestionId::new(99)));
}

#[test]
fn bookmark_toggle_flips_membership() {
    let mut s = session(None);
    let toggle = Event::ToggleBookmark {
        question_id: QuestionId::new(2),
    };
    apply(&mut s, toggle.clone());
    assert!(s.bookmarks().contains(QuestionId::new(2)));
    apply(&mut s, toggle);
    assert!(s.bookmarks().is_empty());
}

#[test]
fn navigation_stays_in_bounds_and_next_on_last_opens_prompt() {
    let mut s = session(None);
    apply(&mut s, Event::Previous);
    assert_eq!(s.current_index(), 0);
    apply(&mut s, Event::Next);
    assert_eq!(s.current_index(), 1);
    assert!(s.is_last_question());
    apply(&mut s, Event::Next);
    assert_eq!(s.current_index(), 1);
    assert_eq!(s.prompt(), Some(SubmitPrompt::Manual));

    // Answering is blocked while the prompt is up.
    assert!(s.apply(Event::Previous, fixed_now()).is_err());

    apply(&mut s, Event::CancelSubmit);
    assert_eq!(s.prompt(), None);
    apply(&mut s, Event::GoTo(0));
    assert_eq!(s.current_index(), 0);
    assert!(matches!(
        s.apply(Event::GoTo(2), fixed_now()),
        Err(TransitionError::IndexOutOfRange { index: 2, len: 2 })
    ));
}

#[test]
fn confirm_requires_prompt() {
    let mut s = session(None);
    let err = s.apply(Event::ConfirmSubmit, fixed_now()).unwrap_err();
    assert_eq!(
        err,
        TransitionError::NotAllowed {
            event: "confirm submit",
            phase: PhaseKind::InProgress
        }
    );
}

#[test]
fn manual_submit_grades_and_stops_timers() {
    let mut s = session(Some(1));
    for _ in 0..50 {
        apply(&mut s, Event::Tick);
    }
    assert_eq!(s.remaining_seconds(), Some(10));
    apply(
        &mut s,
        Event::SelectAnswer {
            question_id: QuestionId::new(1),
            letter: letter("A"),
        },
    );
    apply(
        &mut s,
        Event::SelectAnswer {
            question_id: QuestionId::new(2),
            letter: letter("b"),
        },
    );
    apply(&mut s, Event::RequestSubmit);
    let effects = apply(&mut s, Event::ConfirmSubmit);

    assert_eq!(
        &effects[..3],
        &[
            Effect::StopTimer,
            Effect::CancelSavedIndicator,
            Effect::CancelAutoSubmit
        ]
    );
    let result = persisted(&effects).unwrap();
    assert_eq!(result.score.value(), 100);
    assert_eq!(result.time_taken_seconds, Some(50));
    assert_eq!(s.phase(), &Phase::Submitting);

    // Ticks after submission change nothing.
    assert!(apply(&mut s, Event::Tick).is_empty());
    assert_eq!(s.remaining_seconds(), Some(10));
}

#[test]
fn expiry_opens_time_up_prompt_exactly_once() {
    let mut s = session(Some(1));
    let mut expiries = 0;
    for _ in 0..65 {
        let effects = apply(&mut s, Event::Tick);
        if effects.contains(&Effect::ScheduleAutoSubmit) {
            expiries += 1;
        }
    }
    assert_eq!(expiries, 1);
    assert_eq!(s.prompt(), Some(SubmitPrompt::TimeUp));
    assert_eq!(s.remaining_seconds(), Some(0));

    // A time-up prompt cannot be dismissed.
    assert!(s.apply(Event::CancelSubmit, fixed_now()).is_err());

    let effects = apply(&mut s, Event::AutoSubmitElapsed);
    let result = persisted(&effects).unwrap();
    assert_eq!(result.score.value(), 0);
    assert_eq!(result.time_taken_seconds, Some(60));

    // A second auto-submit firing is ignored.
    assert!(apply(&mut s, Event::AutoSubmitElapsed).is_empty());
    assert_eq!(s.submit_attempts(), 1);
}

#[test]
fn expiry_overrides_open_manual_prompt() {
    let mut s = session(Some(1));
    for _ in 0..59 {
        apply(&mut s, Event::Tick);
    }
    apply(&mut s, Event::RequestSubmit);
    apply(&mut s, Event::Tick);
    assert_eq!(s.prompt(), Some(SubmitPrompt::TimeUp));
}

#[test]
fn untimed_quiz_reports_no_time_taken() {
    let mut s = session(None);
    assert!(apply(&mut s, Event::Tick).is_empty());
    apply(&mut s, Event::RequestSubmit);
    let effects = apply(&mut s, Event::ConfirmSubmit);
    assert_eq!(persisted(&effects).unwrap().time_taken_seconds, None);
}

#[test]
fn retry_replays_frozen_result() {
    let mut s = session(Some(1));
    apply(
        &mut s,
        Event::SelectAnswer {
            question_id: QuestionId::new(2),
            letter: letter("B"),
        },
    );
    apply(&mut s, Event::RequestSubmit);
    let first = persisted(&apply(&mut s, Event::ConfirmSubmit)).cloned().unwrap();

    // Retry is only reachable after a failure.
    assert!(s.apply(Event::RetrySubmit, fixed_now()).is_err());

    apply(
        &mut s,
        Event::SubmissionFailed {
            message: "network down".into(),
        },
    );
    assert!(matches!(s.phase(), Phase::SubmissionFailed { .. }));
    assert!(s.apply(Event::RequestSubmit, fixed_now()).is_err());

    let later = fixed_now() + chrono::Duration::minutes(5);
    let effects = s.apply(Event::RetrySubmit, later).unwrap();
    assert_eq!(effects, vec![Effect::Persist(first.clone())]);
    assert_eq!(first.score.value(), 50);
    assert_eq!(s.submit_attempts(), 2);

    let effects = apply(&mut s, Event::SubmissionSucceeded);
    let Some(Effect::Finished(summary)) = effects.last() else {
        panic!("expected summary, got {effects:?}");
    };
    assert_eq!(summary.score, first.score);
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.incorrect, 1);
    assert_eq!(summary.unanswered, 1);
    assert_eq!(s.phase(), &Phase::Completed);
}

#[test]
fn completed_is_terminal() {
    let mut s = session(None);
    apply(&mut s, Event::RequestSubmit);
    apply(&mut s, Event::ConfirmSubmit);
    apply(&mut s, Event::SubmissionSucceeded);
    assert!(s.apply(Event::RetrySubmit, fixed_now()).is_err());
    assert!(s.apply(Event::SubmissionSucceeded, fixed_now()).is_err());
    assert!(apply(&mut s, Event::Abandon).is_empty());
    assert_eq!(s.phase(), &Phase::Completed);
}

#[test]
fn abandon_cancels_every_timer() {
    let mut s = session(Some(1));
    apply(
        &mut s,
        Event::SelectAnswer {
            question_id: QuestionId::new(1),
            letter: letter("A"),
        },
    );
    let effects = apply(&mut s, Event::Abandon);
    assert_eq!(
        effects,
        vec![
            Effect::StopTimer,
            Effect::CancelSavedIndicator,
            Effect::CancelAutoSubmit
        ]
    );
    assert!(!s.saved_indicator_visible());
    assert!(apply(&mut s, Event::Tick).is_empty());
}
