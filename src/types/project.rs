use serde::{Deserialize, Serialize};

/// External links attached to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLinks {
    /// Source repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,

    /// Write-up or slide deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// A portfolio entry, as served by the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier.
    pub id: String,

    /// Title shown on the card.
    pub topic: String,

    /// Category used by the gallery filter.
    pub category: String,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// One-line summary for the card.
    pub short_description: String,

    /// Longer text for the detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,

    /// Card image.
    pub thumbnail_url: String,

    /// Detail-view video.
    pub video_url: String,

    /// External links.
    #[serde(default)]
    pub links: ProjectLinks,
}

impl Project {
    /// The longest description available.
    pub fn description(&self) -> &str {
        self.brief_description
            .as_deref()
            .unwrap_or(&self.short_description)
    }

    /// True if the project carries `tag`, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default() {
        let project: Project = serde_json::from_str(
            r#"{
                "id": "p1",
                "topic": "Line follower",
                "category": "Robotics",
                "short_description": "A small robot.",
                "thumbnail_url": "/img/p1.png",
                "video_url": "/vid/p1.mp4",
                "links": {"github": "https://github.com/example/p1"}
            }"#,
        )
        .unwrap();
        assert!(project.tags.is_empty());
        assert_eq!(project.description(), "A small robot.");
        assert_eq!(
            project.links.github.as_deref(),
            Some("https://github.com/example/p1")
        );
        assert!(project.links.document.is_none());
    }
}
