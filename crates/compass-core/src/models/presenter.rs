use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presenter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Job_Title")]
    pub job_title: String,
    #[serde(rename = "Bio")]
    pub bio: String,
}

impl Presenter {
    pub fn new(name: impl Into<String>, job_title: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_title: job_title.into(),
            bio: bio.into(),
        }
    }
}
