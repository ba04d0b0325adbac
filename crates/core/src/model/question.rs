use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has no answer options")]
    NoOptions(QuestionId),

    #[error("question {id} has {count} options, more than can be lettered")]
    TooManyOptions { id: QuestionId, count: usize },

    #[error("invalid option letter: {0:?}")]
    InvalidLetter(String),
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// A single answer letter (`A`, `B`, ...), stored as its zero-based position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionLetter(u8);

impl OptionLetter {
    pub const MAX_OPTIONS: usize = 26;

    /// Letter for the option at `index` (0 → `A`).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|i| usize::from(*i) < Self::MAX_OPTIONS)
            .map(Self)
    }

    /// Parses a letter, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidLetter` unless the trimmed input is a single ASCII letter.
    pub fn parse(raw: &str) -> Result<Self, QuestionError> {
        let mut chars = raw.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                let upper = c.to_ascii_uppercase() as u8;
                Ok(Self(upper - b'A'))
            }
            _ => Err(QuestionError::InvalidLetter(raw.to_owned())),
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        char::from(b'A' + self.0)
    }
}

impl fmt::Debug for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionLetter({})", self.as_char())
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OptionLetter {
    type Error = QuestionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OptionLetter> for String {
    fn from(letter: OptionLetter) -> Self {
        letter.to_string()
    }
}

//
// ─── GATEWAY ROW ───────────────────────────────────────────────────────────────
//

/// Question row exactly as the gateway stores it.
///
/// Two legacy shapes coexist: an `options` array lettered by position, or
/// discrete `option_a`..`option_d` columns. The correct value lives in either
/// `correct_option` or `correct_answer` and may be a letter or the option text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question_text: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub option_a: Option<String>,
    #[serde(default)]
    pub option_b: Option<String>,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
    #[serde(default)]
    pub correct_option: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl QuestionRecord {
    /// Row in the array-of-options shape.
    #[must_use]
    pub fn with_options(
        id: QuestionId,
        quiz_id: QuizId,
        question_text: impl Into<String>,
        options: Vec<String>,
        correct: impl Into<String>,
    ) -> Self {
        Self {
            id,
            quiz_id,
            question_text: question_text.into(),
            options: Some(options),
            option_a: None,
            option_b: None,
            option_c: None,
            option_d: None,
            correct_option: Some(correct.into()),
            correct_answer: None,
        }
    }

    /// Row in the discrete `option_a`..`option_d` shape.
    #[must_use]
    pub fn with_fields(
        id: QuestionId,
        quiz_id: QuizId,
        question_text: impl Into<String>,
        fields: [Option<&str>; 4],
        correct: impl Into<String>,
    ) -> Self {
        let [a, b, c, d] = fields.map(|f| f.map(str::to_owned));
        Self {
            id,
            quiz_id,
            question_text: question_text.into(),
            options: None,
            option_a: a,
            option_b: b,
            option_c: c,
            option_d: d,
            correct_option: None,
            correct_answer: Some(correct.into()),
        }
    }

    fn stored_correct(&self) -> Option<&str> {
        self.correct_option
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                self.correct_answer
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
            })
    }

    fn lettered_options(&self) -> Result<Vec<AnswerOption>, QuestionError> {
        if let Some(options) = self.options.as_ref().filter(|o| !o.is_empty()) {
            if options.len() > OptionLetter::MAX_OPTIONS {
                return Err(QuestionError::TooManyOptions {
                    id: self.id,
                    count: options.len(),
                });
            }
            return Ok(options
                .iter()
                .enumerate()
                .filter_map(|(i, text)| {
                    OptionLetter::from_index(i).map(|letter| AnswerOption {
                        letter,
                        text: text.clone(),
                    })
                })
                .collect());
        }

        // Discrete columns keep their own letter even when a sibling is blank.
        let fields = [&self.option_a, &self.option_b, &self.option_c, &self.option_d];
        Ok(fields
            .into_iter()
            .enumerate()
            .filter_map(|(i, field)| {
                let text = field.as_deref().filter(|t| !t.trim().is_empty())?;
                OptionLetter::from_index(i).map(|letter| AnswerOption {
                    letter,
                    text: text.to_owned(),
                })
            })
            .collect())
    }

    /// Convert the row into the canonical form used for display and grading.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` if neither shape yields an option, or
    /// `QuestionError::TooManyOptions` if the options cannot all be lettered.
    pub fn normalize(&self) -> Result<Question, QuestionError> {
        let options = self.lettered_options()?;
        if options.is_empty() {
            return Err(QuestionError::NoOptions(self.id));
        }
        let (correct, accepted) = self
            .stored_correct()
            .map(|stored| resolve_correct(&options, stored))
            .unwrap_or_default();

        Ok(Question {
            id: self.id,
            text: self.question_text.trim().to_owned(),
            options,
            correct,
            accepted,
        })
    }
}

fn matches_loosely(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Every option the stored value names, by letter or by text, in option order.
///
/// The displayed answer prefers the letter match: a stored `"B"` shows option B
/// even when another option reads "B", though both earn credit.
fn resolve_correct(
    options: &[AnswerOption],
    stored: &str,
) -> (Option<OptionLetter>, Vec<OptionLetter>) {
    let by_letter = OptionLetter::parse(stored)
        .ok()
        .filter(|letter| options.iter().any(|o| o.letter == *letter));
    let accepted: Vec<OptionLetter> = options
        .iter()
        .filter(|o| Some(o.letter) == by_letter || matches_loosely(&o.text, stored))
        .map(|o| o.letter)
        .collect();
    (by_letter.or_else(|| accepted.first().copied()), accepted)
}

//
// ─── CANONICAL QUESTION ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub letter: OptionLetter,
    pub text: String,
}

/// Canonical question: lettered options, the answer to display, and every
/// letter that earns credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<AnswerOption>,
    correct: Option<OptionLetter>,
    #[serde(default)]
    accepted: Vec<OptionLetter>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    /// `None` when the stored correct value matched no option; such a question
    /// can never be answered correctly.
    #[must_use]
    pub fn correct(&self) -> Option<OptionLetter> {
        self.correct
    }

    #[must_use]
    pub fn offers(&self, letter: OptionLetter) -> bool {
        self.options.iter().any(|o| o.letter == letter)
    }

    #[must_use]
    pub fn option_text(&self, letter: OptionLetter) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.letter == letter)
            .map(|o| o.text.as_str())
    }

    /// Letters graded correct. Empty when the stored value matched no option.
    #[must_use]
    pub fn accepted(&self) -> &[OptionLetter] {
        &self.accepted
    }

    #[must_use]
    pub fn is_correct(&self, letter: OptionLetter) -> bool {
        self.accepted.contains(&letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capitals(correct: &str) -> QuestionRecord {
        QuestionRecord::with_options(
            QuestionId::new(1),
            QuizId::new(1),
            " Capital of the UK? ",
            vec!["Paris".into(), "London".into()],
            correct,
        )
    }

    #[test]
    fn letter_parse_ignores_case_and_whitespace() {
        assert_eq!(OptionLetter::parse(" a ").unwrap(), OptionLetter::parse("A").unwrap());
        assert_eq!(OptionLetter::parse("d").unwrap().index(), 3);
        assert!(OptionLetter::parse("AB").is_err());
        assert!(OptionLetter::parse("").is_err());
        assert!(OptionLetter::parse("1").is_err());
    }

    #[test]
    fn correct_stored_as_text_resolves_to_letter() {
        let q = capitals("London").normalize().unwrap();
        assert_eq!(q.correct(), Some(OptionLetter::parse("B").unwrap()));
        assert_eq!(q.text(), "Capital of the UK?");
    }

    #[test]
    fn correct_stored_as_letter_resolves_to_same_letter() {
        let q = capitals(" b ").normalize().unwrap();
        assert_eq!(q.correct(), Some(OptionLetter::parse("B").unwrap()));
    }

    #[test]
    fn text_match_is_case_and_whitespace_insensitive() {
        let q = capitals("  lONDON ").normalize().unwrap();
        assert!(q.is_correct(OptionLetter::parse("B").unwrap()));
    }

    #[test]
    fn letter_and_text_matches_are_both_accepted() {
        let record = QuestionRecord::with_options(
            QuestionId::new(5),
            QuizId::new(1),
            "Which letter?",
            vec!["B".into(), "A".into(), "C".into()],
            "b",
        );
        let q = record.normalize().unwrap();
        let accepted: Vec<char> = q.accepted().iter().map(|l| l.as_char()).collect();
        assert_eq!(accepted, vec!['A', 'B']);
        assert_eq!(q.correct().map(OptionLetter::as_char), Some('B'));
        assert!(!q.is_correct(OptionLetter::parse("C").unwrap()));
    }

    #[test]
    fn discrete_fields_keep_their_letters() {
        let record = QuestionRecord::with_fields(
            QuestionId::new(2),
            QuizId::new(1),
            "Pick D",
            [Some("one"), Some("two"), None, Some("four")],
            "four",
        );
        let q = record.normalize().unwrap();
        let letters: Vec<char> = q.options().iter().map(|o| o.letter.as_char()).collect();
        assert_eq!(letters, vec!['A', 'B', 'D']);
        assert_eq!(q.correct().map(OptionLetter::as_char), Some('D'));
        assert!(!q.offers(OptionLetter::parse("C").unwrap()));
    }

    #[test]
    fn correct_answer_column_is_used_when_correct_option_blank() {
        let mut record = capitals("  ");
        record.correct_answer = Some("A".into());
        let q = record.normalize().unwrap();
        assert_eq!(q.correct().map(OptionLetter::as_char), Some('A'));
    }

    #[test]
    fn unmatched_correct_value_leaves_question_ungradable() {
        let q = capitals("Berlin").normalize().unwrap();
        assert_eq!(q.correct(), None);
        let q = capitals("E").normalize().unwrap();
        assert_eq!(q.correct(), None);
        assert!(q.accepted().is_empty());
    }

    #[test]
    fn question_without_options_is_rejected() {
        let record = QuestionRecord::with_fields(
            QuestionId::new(3),
            QuizId::new(1),
            "Empty",
            [None, Some("  "), None, None],
            "A",
        );
        assert_eq!(
            record.normalize().unwrap_err(),
            QuestionError::NoOptions(QuestionId::new(3))
        );
    }

    #[test]
    fn empty_options_array_falls_back_to_fields() {
        let mut record = QuestionRecord::with_fields(
            QuestionId::new(4),
            QuizId::new(1),
            "Fallback",
            [Some("x"), Some("y"), None, None],
            "y",
        );
        record.options = Some(Vec::new());
        let q = record.normalize().unwrap();
        assert_eq!(q.options().len(), 2);
    }

    #[test]
    fn deserializes_both_gateway_shapes() {
        let array: QuestionRecord = serde_json::from_str(
            r#"{"id":1,"quiz_id":5,"question_text":"Q","options":["a","b"],"correct_option":"b"}"#,
        )
        .unwrap();
        let fields: QuestionRecord = serde_json::from_str(
            r#"{"id":2,"quiz_id":5,"question_text":"Q","option_a":"a","option_b":"b","correct_answer":"B"}"#,
        )
        .unwrap();
        assert_eq!(array.normalize().unwrap().correct(), fields.normalize().unwrap().correct());
    }
}
