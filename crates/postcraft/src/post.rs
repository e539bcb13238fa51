//! Post configuration: format, length, and the immutable [`PostConfig`].

use std::fmt;

/// The four structural templates a post can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostFormat {
    /// Five emoji-numbered points between a contrarian opening and a closing.
    #[default]
    FactsWithEmoji,
    /// A personal story or customer case study with three insights.
    StoryBased,
    /// An educational guide in labelled sections.
    GuideBased,
    /// A trend observation backed by four statistics.
    IndustryInsight,
}

impl PostFormat {
    /// Every format, in menu order.
    pub const ALL: [PostFormat; 4] = [
        PostFormat::FactsWithEmoji,
        PostFormat::StoryBased,
        PostFormat::GuideBased,
        PostFormat::IndustryInsight,
    ];

    /// Stable snake_case identifier.
    pub fn id(self) -> &'static str {
        match self {
            PostFormat::FactsWithEmoji => "facts_with_emoji",
            PostFormat::StoryBased => "story_based",
            PostFormat::GuideBased => "guide_based",
            PostFormat::IndustryInsight => "industry_insight",
        }
    }

    /// Parse an identifier. Anything unrecognised falls back to
    /// [`PostFormat::FactsWithEmoji`].
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(id))
            .unwrap_or_default()
    }

    /// Map a menu answer (`"1"`–`"4"`) to a format.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(PostFormat::FactsWithEmoji),
            "2" => Some(PostFormat::StoryBased),
            "3" => Some(PostFormat::GuideBased),
            "4" => Some(PostFormat::IndustryInsight),
            _ => None,
        }
    }

    /// Menu description shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            PostFormat::FactsWithEmoji => "Facts with emojis (bullet points with emoji numbers)",
            PostFormat::StoryBased => "Story-based post (customer or personal story)",
            PostFormat::GuideBased => "Guide-based post (educational content)",
            PostFormat::IndustryInsight => "Industry insight (trends with statistics)",
        }
    }
}

impl fmt::Display for PostFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Target length of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl PostLength {
    /// Every length, in menu order.
    pub const ALL: [PostLength; 3] = [PostLength::Short, PostLength::Medium, PostLength::Long];

    pub fn id(self) -> &'static str {
        match self {
            PostLength::Short => "short",
            PostLength::Medium => "medium",
            PostLength::Long => "long",
        }
    }

    /// Menu name shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            PostLength::Short => "Short",
            PostLength::Medium => "Medium",
            PostLength::Long => "Long",
        }
    }

    /// Map a menu answer (`"1"`–`"3"`) to a length.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(PostLength::Short),
            "2" => Some(PostLength::Medium),
            "3" => Some(PostLength::Long),
            _ => None,
        }
    }

    /// Target word range, e.g. `"150-200"`.
    pub fn word_range(self) -> &'static str {
        match self {
            PostLength::Short => "150-200",
            PostLength::Medium => "250-300",
            PostLength::Long => "350-450",
        }
    }

    /// The sentence placed in the format prompt.
    pub fn guide(self) -> &'static str {
        match self {
            PostLength::Short => "Keep the post concise, around 150-200 words.",
            PostLength::Medium => "Aim for around 250-300 words total.",
            PostLength::Long => "Create a more detailed post of around 350-450 words.",
        }
    }
}

impl fmt::Display for PostLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Everything needed to generate one post. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostConfig {
    format: PostFormat,
    topic: String,
    length: PostLength,
    is_customer_story: bool,
}

impl PostConfig {
    pub fn new(
        format: PostFormat,
        topic: impl Into<String>,
        length: PostLength,
        is_customer_story: bool,
    ) -> Self {
        Self {
            format,
            topic: topic.into(),
            length,
            is_customer_story,
        }
    }

    pub fn format(&self) -> PostFormat {
        self.format
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn length(&self) -> PostLength {
        self.length
    }

    pub fn is_customer_story(&self) -> bool {
        self.is_customer_story
    }
}
