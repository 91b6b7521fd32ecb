use serde::{Deserialize, Serialize};

/// Orientation branding for one semester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(rename = "Semester")]
    pub semester: String,
    #[serde(rename = "Theme_Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Is_Current")]
    pub is_current: bool,
    // Older themes were published without artwork; fall back to the defaults
    #[serde(rename = "Logo", default)]
    pub logo: ThemeLogo,
    #[serde(rename = "Theme_Colors", default)]
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(
        semester: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        is_current: bool,
        logo: ThemeLogo,
        colors: ThemeColors,
    ) -> Self {
        Self {
            semester: semester.into(),
            name: name.into(),
            description: description.into(),
            is_current,
            logo,
            colors,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeLogo {
    #[serde(rename = "File_Name")]
    pub file_name: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl ThemeLogo {
    pub fn new(file_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            description: description.into(),
        }
    }
}

/// Hex color strings used by the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(rename = "Primary")]
    pub primary: String,
    #[serde(rename = "Secondary")]
    pub secondary: String,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Text_Secondary")]
    pub text_secondary: String,
    #[serde(rename = "Text_Click")]
    pub text_click: String,
    #[serde(rename = "Shadow")]
    pub shadow: String,
    #[serde(rename = "Title")]
    pub title: String,
}

impl ThemeColors {
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        text: impl Into<String>,
        text_secondary: impl Into<String>,
        text_click: impl Into<String>,
        shadow: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            text: text.into(),
            text_secondary: text_secondary.into(),
            text_click: text_click.into(),
            shadow: shadow.into(),
            title: title.into(),
        }
    }
}
