use serde::{Deserialize, Serialize};

/// A frequently asked question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
    #[serde(rename = "Is_Active")]
    pub is_active: bool,
}

impl Question {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, is_active: bool) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            is_active,
        }
    }
}
