//! Canned AI content generation.
//!
//! The real provider integration is a future collaborator; this service is
//! the seam for it. Responses are templated from the caller's current draft
//! and a prompt tag, with no external call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The draft the admin UI sends along with a generation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DraftData {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
}

/// Generated fields. Only fields the prompt produced are serialized, so the
/// UI can merge the response into the draft.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Generation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[async_trait]
pub trait AiService: Send + Sync {
    /// Dispatch on the prompt tag to a templated generation. Unknown tags
    /// return a generic acknowledgment rather than an error.
    async fn generate(&self, prompt: &str, current: &DraftData) -> Generation;

    /// Produce an image URL for the description.
    async fn generate_image(&self, description: &str) -> Generation;
}

/// Stub provider returning canned, draft-aware templates.
pub struct CannedAiService;

#[async_trait]
impl AiService for CannedAiService {
    async fn generate(&self, prompt: &str, current: &DraftData) -> Generation {
        match prompt {
            "generate_ideas" => Generation {
                title: Some("Five Trends Reshaping Digital Media".to_string()),
                category: Some("media".to_string()),
                tags: Some("media,trends,technology".to_string()),
                ..Generation::default()
            },
            "improve_content" => Generation {
                content: Some(improve_content(&current.content)),
                ..Generation::default()
            },
            "complete_post" => complete_post(current),
            "suggest_tags" => Generation {
                tags: Some(suggest_tags(current)),
                ..Generation::default()
            },
            "suggest_category" => Generation {
                category: Some(suggest_category(current)),
                ..Generation::default()
            },
            other => Generation {
                message: Some(format!("No generator available for prompt '{other}'")),
                ..Generation::default()
            },
        }
    }

    async fn generate_image(&self, description: &str) -> Generation {
        let slug: String = description
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .to_lowercase();

        Generation {
            image: Some(format!(
                "https://placehold.co/1200x630?text={}",
                slug.trim_matches('-')
            )),
            ..Generation::default()
        }
    }
}

fn improve_content(content: &str) -> String {
    if content.is_empty() {
        return "Start with a strong opening that tells readers why this topic matters, \
                then develop one idea per paragraph."
            .to_string();
    }

    format!(
        "{content}\n\nIn summary, these developments point to a broader shift in how \
         audiences engage with media, and the teams that adapt earliest will set the pace."
    )
}

fn complete_post(current: &DraftData) -> Generation {
    let mut generation = Generation::default();

    if current.title.is_empty() {
        generation.title = Some("Untitled: A Look at What Comes Next".to_string());
    }
    if current.content.is_empty() {
        generation.content = Some(
            "Every medium goes through a moment where its audience outgrows its format. \
             This post looks at the signals worth watching and what they mean for creators."
                .to_string(),
        );
    }
    if current.category.is_empty() {
        generation.category = Some(suggest_category(current));
    }
    if current.tags.is_empty() {
        generation.tags = Some(suggest_tags(current));
    }

    generation
}

fn suggest_category(current: &DraftData) -> String {
    let text = format!("{} {}", current.title, current.content).to_lowercase();

    for (keyword, category) in [
        ("video", "media"),
        ("stream", "media"),
        ("community", "community"),
        ("technolog", "technology"),
        ("creat", "creative"),
    ] {
        if text.contains(keyword) {
            return category.to_string();
        }
    }

    "general".to_string()
}

fn suggest_tags(current: &DraftData) -> String {
    let category = if current.category.is_empty() {
        suggest_category(current)
    } else {
        current.category.clone()
    };

    format!("{category},blog,featured")
}
