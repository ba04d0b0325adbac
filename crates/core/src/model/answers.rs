use std::collections::{HashMap, HashSet};

use crate::model::ids::QuestionId;
use crate::model::question::OptionLetter;

/// Selected letter per question. Unanswered questions are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    selections: HashMap<QuestionId, OptionLetter>,
}

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the selection for a question, returning the one it replaced.
    pub fn record(&mut self, question: QuestionId, letter: OptionLetter) -> Option<OptionLetter> {
        self.selections.insert(question, letter)
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<OptionLetter> {
        self.selections.get(&question).copied()
    }

    #[must_use]
    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.selections.contains_key(&question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Questions flagged for later during one attempt. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSet {
    ids: HashSet<QuestionId>,
}

impl BookmarkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership; returns `true` if the question is now bookmarked.
    pub fn toggle(&mut self, question: QuestionId) -> bool {
        if self.ids.remove(&question) {
            false
        } else {
            self.ids.insert(question);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, question: QuestionId) -> bool {
        self.ids.contains(&question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
