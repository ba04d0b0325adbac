//! Client-side grading against the canonical question form.

use crate::model::{AnswerMap, Question, QuestionReview, Score};

/// Tally for one grading pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeReport {
    pub correct: u32,
    /// Wrong answers plus unanswered questions.
    pub incorrect: u32,
    pub unanswered: u32,
    pub total: u32,
    pub score: Score,
    pub review: Vec<QuestionReview>,
}

/// Grade every question by id. A missing answer earns no credit and no penalty.
///
/// The review lines follow the order of `questions`; the counts do not depend on it.
#[must_use]
pub fn grade(questions: &[Question], answers: &AnswerMap) -> GradeReport {
    let mut correct = 0_u32;
    let mut unanswered = 0_u32;
    let mut review = Vec::with_capacity(questions.len());

    for question in questions {
        let chosen = answers.get(question.id());
        let is_correct = chosen.is_some_and(|letter| question.is_correct(letter));
        if is_correct {
            correct = correct.saturating_add(1);
        }
        if chosen.is_none() {
            unanswered = unanswered.saturating_add(1);
        }
        review.push(QuestionReview {
            question_id: question.id(),
            question_text: question.text().to_owned(),
            chosen,
            chosen_text: chosen.and_then(|l| question.option_text(l)).map(str::to_owned),
            correct: question.correct(),
            correct_text: question
                .correct()
                .and_then(|l| question.option_text(l))
                .map(str::to_owned),
            is_correct,
        });
    }

    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    GradeReport {
        correct,
        incorrect: total.saturating_sub(correct),
        unanswered,
        total,
        score: Score::from_counts(correct, total),
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionLetter, QuestionId, QuestionRecord, QuizId};

    fn question(id: u64, options: &[&str], correct: &str) -> Question {
        QuestionRecord::with_options(
            QuestionId::new(id),
            QuizId::new(1),
            format!("Q{id}"),
            options.iter().map(|s| (*s).to_owned()).collect(),
            correct,
        )
        .normalize()
        .unwrap()
    }

    fn letter(s: &str) -> OptionLetter {
        OptionLetter::parse(s).unwrap()
    }

    #[test]
    fn unanswered_counts_as_incorrect() {
        let questions = vec![question(1, &["a", "b"], "A"), question(2, &["a", "b"], "B")];
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new(1), letter("A"));

        let report = grade(&questions, &answers);
        assert_eq!(report.correct, 1);
        assert_eq!(report.incorrect, 1);
        assert_eq!(report.unanswered, 1);
        assert_eq!(report.score.value(), 50);
        assert!(!report.review[1].is_correct);
        assert_eq!(report.review[1].chosen, None);
    }

    #[test]
    fn letter_and_text_storage_grade_the_same_selection() {
        let by_text = question(1, &["Paris", "London"], "London");
        let by_letter = question(1, &["Paris", "London"], "B");
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new(1), letter(" b "));

        assert_eq!(grade(&[by_text], &answers).correct, 1);
        assert_eq!(grade(&[by_letter], &answers).correct, 1);
    }

    #[test]
    fn stored_value_naming_a_letter_and_an_option_text_credits_both() {
        let questions = vec![question(1, &["B", "A"], "B")];
        for chosen in ["A", "B"] {
            let mut answers = AnswerMap::new();
            answers.record(QuestionId::new(1), letter(chosen));
            let report = grade(&questions, &answers);
            assert_eq!(report.correct, 1, "answer {chosen}");
            assert!(report.review[0].is_correct);
        }
        assert_eq!(questions[0].correct(), Some(letter("B")));
    }

    #[test]
    fn options_with_duplicate_text_are_all_credited() {
        let questions = vec![question(1, &["yes", "Yes", "no"], "yes")];
        for (chosen, expected) in [("A", 1), ("B", 1), ("C", 0)] {
            let mut answers = AnswerMap::new();
            answers.record(QuestionId::new(1), letter(chosen));
            assert_eq!(grade(&questions, &answers).correct, expected, "answer {chosen}");
        }
        assert_eq!(questions[0].correct(), Some(letter("A")));
    }

    #[test]
    fn presentation_order_does_not_change_grading() {
        let mut questions: Vec<Question> = (1..=5)
            .map(|id| question(id, &["w", "x", "y", "z"], "C"))
            .collect();
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new(1), letter("C"));
        answers.record(QuestionId::new(2), letter("A"));
        answers.record(QuestionId::new(4), letter("C"));

        let before = grade(&questions, &answers);
        questions.reverse();
        let after = grade(&questions, &answers);
        assert_eq!(before.correct, after.correct);
        assert_eq!(before.score, after.score);
        assert_eq!(before.correct, 2);
        assert_eq!(before.score.value(), 40);
    }

    #[test]
    fn review_lines_carry_option_text() {
        let questions = vec![question(1, &["Paris", "London"], "London")];
        let mut answers = AnswerMap::new();
        answers.record(QuestionId::new(1), letter("A"));

        let line = &grade(&questions, &answers).review[0];
        assert_eq!(line.chosen_text.as_deref(), Some("Paris"));
        assert_eq!(line.correct_text.as_deref(), Some("London"));
        assert!(!line.is_correct);
    }

    #[test]
    fn empty_question_set_scores_zero() {
        let report = grade(&[], &AnswerMap::new());
        assert_eq!(report.total, 0);
        assert_eq!(report.score.value(), 0);
    }
}
