//! crates/growify_core/src/assessment.rs
//!
//! The timed question flow shared by lesson quizzes and coding challenges:
//! `NotStarted -> InProgress -> Submitted`. The clock itself lives in the shell;
//! this module only counts down when told a second has passed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentKind {
    Quiz,
    Challenge,
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default = "default_points")]
    pub points: u32,
}

/// A quiz or challenge as supplied by the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDefinition {
    pub id: String,
    pub title: String,
    pub kind: AssessmentKind,
    pub duration_secs: u64,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPhase {
    NotStarted,
    InProgress,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    Manual,
    TimeUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub score: u64,
    pub max_score: u64,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
    pub time_taken_secs: u64,
    pub reason: SubmitReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("The assessment has already been started")]
    AlreadyStarted,
    #[error("The assessment has no time to run")]
    ZeroDuration,
    #[error("The assessment has not been started yet")]
    NotStarted,
    #[error("The assessment has already been submitted")]
    AlreadySubmitted,
    #[error("Question {0} is not part of this assessment")]
    UnknownQuestion(u32),
    #[error("Question {question} has no option {option}")]
    InvalidOption { question: u32, option: usize },
}

/// One learner's run through an assessment.
#[derive(Debug, Clone)]
pub struct AssessmentAttempt {
    definition: AssessmentDefinition,
    phase: AssessmentPhase,
    answers: BTreeMap<u32, usize>,
    remaining_secs: u64,
    result: Option<AssessmentResult>,
}

impl AssessmentAttempt {
    pub fn new(definition: AssessmentDefinition) -> Self {
        let remaining_secs = definition.duration_secs;
        Self {
            definition,
            phase: AssessmentPhase::NotStarted,
            answers: BTreeMap::new(),
            remaining_secs,
            result: None,
        }
    }

    pub fn definition(&self) -> &AssessmentDefinition {
        &self.definition
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn answers(&self) -> &BTreeMap<u32, usize> {
        &self.answers
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    pub fn start(&mut self) -> Result<(), AssessmentError> {
        match self.phase {
            AssessmentPhase::NotStarted if self.definition.duration_secs == 0 => {
                Err(AssessmentError::ZeroDuration)
            }
            AssessmentPhase::NotStarted => {
                self.phase = AssessmentPhase::InProgress;
                Ok(())
            }
            AssessmentPhase::InProgress => Err(AssessmentError::AlreadyStarted),
            AssessmentPhase::Submitted => Err(AssessmentError::AlreadySubmitted),
        }
    }

    /// Records (or changes) the chosen option for a question.
    pub fn answer(&mut self, question_id: u32, option: usize) -> Result<(), AssessmentError> {
        self.ensure_in_progress()?;
        let question = self
            .definition
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(AssessmentError::UnknownQuestion(question_id))?;
        if option >= question.options.len() {
            return Err(AssessmentError::InvalidOption {
                question: question_id,
                option,
            });
        }
        self.answers.insert(question_id, option);
        Ok(())
    }

    /// One second has passed. Returns the result when this tick ran the clock out.
    pub fn tick(&mut self) -> Option<&AssessmentResult> {
        if self.phase != AssessmentPhase::InProgress {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.finish(SubmitReason::TimeUp);
            return self.result.as_ref();
        }
        None
    }

    pub fn submit(&mut self) -> Result<&AssessmentResult, AssessmentError> {
        self.ensure_in_progress()?;
        self.finish(SubmitReason::Manual);
        self.result.as_ref().ok_or(AssessmentError::NotStarted)
    }

    fn ensure_in_progress(&self) -> Result<(), AssessmentError> {
        match self.phase {
            AssessmentPhase::InProgress => Ok(()),
            AssessmentPhase::NotStarted => Err(AssessmentError::NotStarted),
            AssessmentPhase::Submitted => Err(AssessmentError::AlreadySubmitted),
        }
    }

    fn finish(&mut self, reason: SubmitReason) {
        // `points` is unchecked view input; sum wide.
        let mut score: u64 = 0;
        let mut max_score: u64 = 0;
        let mut correct = 0;
        for question in &self.definition.questions {
            let points = u64::from(question.points);
            max_score = max_score.saturating_add(points);
            if self.answers.get(&question.id) == Some(&question.correct_option) {
                score = score.saturating_add(points);
                correct += 1;
            }
        }
        let percentage = if max_score == 0 {
            0.0
        } else {
            score as f64 / max_score as f64 * 100.0
        };

        self.phase = AssessmentPhase::Submitted;
        self.result = Some(AssessmentResult {
            score,
            max_score,
            correct,
            total: self.definition.questions.len(),
            percentage,
            time_taken_secs: self.definition.duration_secs - self.remaining_secs,
            reason,
        });
    }
}
