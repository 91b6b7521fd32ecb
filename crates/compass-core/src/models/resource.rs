use serde::{Deserialize, Serialize};

/// A downloadable orientation document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    /// Object name in file storage
    #[serde(rename = "File_Name")]
    pub file_name: String,
    #[serde(rename = "File_Type")]
    pub file_type: String,
    #[serde(rename = "Is_Active")]
    pub is_active: bool,
}

impl Resource {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            file_name: file_name.into(),
            file_type: file_type.into(),
            is_active,
        }
    }
}
