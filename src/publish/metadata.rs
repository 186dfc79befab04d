use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::{
    DEFAULT_CATEGORY_ID, DEFAULT_PRIVACY, DEFAULT_TITLE_SUFFIX, MAX_TITLE_CHARS,
};

const NAME_PLACEHOLDER: &str = "{name}";

const DEFAULT_DESCRIPTION: &str = "Watch amazing football highlights featuring {name}! \
This video showcases incredible skills, goals, and moments from the world of football. \
Whether you're a fan of Cristiano Ronaldo, Lionel Messi, or just love the beautiful game, \
you'll find something to enjoy here.\n\n\
If you enjoyed this video, please like, share, and subscribe for more football content!\n\n\
I do not claim ownership of the background music used in this video. \
All rights belong to their respective owners. \
This video is for entertainment purposes only.\n\n\
--- Hashtags ---\n\
#Football #Soccer #Ronaldo #Messi #CR7 #LeoMessi #Goals #Skills #Highlights #FootballSkills \
#RonaldoGoals #MessiGoals #CristianoRonaldo #LionelMessi #Sports #FootballMotivation \
#RonaldoJr #GeorginaRodriguez";

const DEFAULT_TAGS: [&str; 21] = [
    "football",
    "soccer",
    "ronaldo",
    "messi",
    "cr7",
    "leomessi",
    "goals",
    "skills",
    "highlights",
    "football skills",
    "ronaldo goals",
    "messi goals",
    "cristiano ronaldo",
    "lionel messi",
    "sports",
    "football motivation",
    "ronaldo junior",
    "georgina rodriguez",
    "best goals",
    "amazing skills",
    "football highlights",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Unlisted,
    Private,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Privacy::Public => "public",
            Privacy::Unlisted => "unlisted",
            Privacy::Private => "private",
        })
    }
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "unlisted" => Ok(Privacy::Unlisted),
            "private" => Ok(Privacy::Private),
            other => Err(format!(
                "unknown privacy status `{other}` (expected public, unlisted or private)"
            )),
        }
    }
}

/// Metadata attached to one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: Privacy,
}

/// Request body of a `videos.insert` call with `part=snippet,status`.
#[derive(Serialize)]
pub struct VideoResource<'a> {
    snippet: Snippet<'a>,
    status: Status,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    category_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    privacy_status: Privacy,
}

impl VideoMetadata {
    pub fn resource(&self) -> VideoResource<'_> {
        VideoResource {
            snippet: Snippet {
                title: &self.title,
                description: &self.description,
                tags: &self.tags,
                category_id: &self.category_id,
            },
            status: Status {
                privacy_status: self.privacy,
            },
        }
    }
}

/// Produces [`VideoMetadata`] from an asset's display name.
///
/// `description` may contain `{name}`, which is replaced by the display name.
#[derive(Debug, Clone)]
pub struct MetadataTemplate {
    pub title_suffix: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: Privacy,
}

impl Default for MetadataTemplate {
    fn default() -> Self {
        Self {
            title_suffix: DEFAULT_TITLE_SUFFIX.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            privacy: DEFAULT_PRIVACY,
        }
    }
}

impl MetadataTemplate {
    pub fn render(&self, display_name: &str) -> VideoMetadata {
        let title = if self.title_suffix.is_empty() {
            display_name.to_string()
        } else {
            format!("{} | {}", display_name, self.title_suffix)
        };

        VideoMetadata {
            title: truncate_chars(&title, MAX_TITLE_CHARS),
            description: self.description.replace(NAME_PLACEHOLDER, display_name),
            tags: self.tags.clone(),
            category_id: self.category_id.clone(),
            privacy: self.privacy,
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render() {
        let meta = MetadataTemplate::default().render("Great Goal");
        assert_eq!(meta.title, "Great Goal | Football Ronaldo & gEOrgina LIFESTYLE");
        assert!(meta
            .description
            .starts_with("Watch amazing football highlights featuring Great Goal! "));
        assert!(!meta.description.contains(NAME_PLACEHOLDER));
        assert_eq!(meta.tags.len(), 21);
        assert_eq!(meta.category_id, "17");
        assert_eq!(meta.privacy, Privacy::Public);
    }

    #[test]
    fn test_empty_suffix_uses_bare_name() {
        let template = MetadataTemplate {
            title_suffix: String::new(),
            ..Default::default()
        };
        assert_eq!(template.render("Free Kick").title, "Free Kick");
    }

    #[test]
    fn test_title_truncated_to_limit() {
        let long_name = "Å".repeat(150);
        let meta = MetadataTemplate::default().render(&long_name);
        assert_eq!(meta.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_resource_shape() {
        let meta = MetadataTemplate::default().render("Great Goal");
        let json = serde_json::to_value(meta.resource()).unwrap();
        assert_eq!(json["snippet"]["categoryId"], "17");
        assert_eq!(json["snippet"]["title"], meta.title.as_str());
        assert_eq!(json["snippet"]["tags"][0], "football");
        assert_eq!(json["status"]["privacyStatus"], "public");
    }

    #[test]
    fn test_privacy_parse() {
        assert_eq!("Unlisted".parse::<Privacy>().unwrap(), Privacy::Unlisted);
        assert_eq!(Privacy::Private.to_string(), "private");
        assert!("secret".parse::<Privacy>().is_err());
    }
}
