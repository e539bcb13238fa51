//! Instruction templates for the generation service.
//!
//! [`format_prompt`] turns research text and a [`PostConfig`] into the
//! instruction that produces a post; [`revision_prompt`] turns an existing
//! post and free-text feedback into the instruction that revises it. Both
//! are pure functions of their inputs.
//!
//! Each [`PostFormat`] owns one template function, looked up through
//! [`template_for`].

use crate::post::{PostConfig, PostFormat};

/// A template renders the format-specific structure block for a config.
pub type TemplateFn = fn(&PostConfig) -> String;

/// Tag → template table. [`template_for`] falls back to the first entry.
const TEMPLATES: [(PostFormat, TemplateFn); 4] = [
    (PostFormat::FactsWithEmoji, facts_with_emoji),
    (PostFormat::StoryBased, story_based),
    (PostFormat::GuideBased, guide_based),
    (PostFormat::IndustryInsight, industry_insight),
];

/// Framing added to story-based posts drawn from a real customer conversation.
pub const CUSTOMER_STORY_NOTE: &str = "\
Since this is based on a customer story, make sure to frame it as a real experience \
or conversation you had with a client or prospect. Focus on the problem they faced, \
the insights you provided, and the valuable lesson that others can learn from.";

const OUTPUT_RULES: &str = "\
Return the post as plain text with proper line breaks.
Do not include any text formatting symbols, just the plain text and emojis.
The reader should leave feeling like they've taken in valuable insights and information.";

// ── Builder ────────────────────────────────────────────────────────

/// Joins instruction blocks with blank lines, skipping empty ones.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    blocks: Vec<String>,
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self::default().block(preamble)
    }

    /// Append a block. Skipped if blank.
    pub fn block(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.trim().is_empty() {
            self.blocks.push(content);
        }
        self
    }

    /// Append a block only when `condition` holds.
    pub fn block_if(self, condition: bool, content_fn: impl FnOnce() -> String) -> Self {
        if condition {
            self.block(content_fn())
        } else {
            self
        }
    }

    pub fn build(self) -> String {
        self.blocks.join("\n\n")
    }
}

// ── Format prompt ──────────────────────────────────────────────────

/// Look up the template for a format, defaulting to facts-with-emoji.
pub fn template_for(format: PostFormat) -> TemplateFn {
    TEMPLATES
        .iter()
        .find(|(tag, _)| *tag == format)
        .map_or(TEMPLATES[0].1, |(_, template)| *template)
}

/// Build the full instruction for turning research into a post.
pub fn format_prompt(research: &str, config: &PostConfig) -> String {
    let template = template_for(config.format());
    PromptBuilder::new(format!(
        "Format this research about {} into a LinkedIn post.",
        config.topic()
    ))
    .block(template(config))
    .block_if(
        config.format() == PostFormat::StoryBased && config.is_customer_story(),
        || CUSTOMER_STORY_NOTE.to_string(),
    )
    .block(OUTPUT_RULES)
    .block(format!("Here's the research:\n{research}"))
    .build()
}

fn facts_with_emoji(config: &PostConfig) -> String {
    format!(
        "\
Structure the post exactly like this:

[Title] Create an attention-grabbing headline that's insightful without being hyperbolic.

[Two opening lines about the topic that provide non-obvious, slightly contrarian takes]

1️⃣ [Point 1]
2️⃣ [Point 2]
3️⃣ [Point 3]
4️⃣ [Point 4]
5️⃣ [Point 5]

[Two closing lines that are insightful and thought-provoking, drawing on the points above]

Use exactly 4-5 emojis total throughout the post (including title). Place the emojis naturally within the text.
{}",
        config.length().guide()
    )
}

fn story_based(config: &PostConfig) -> String {
    format!(
        "\
Structure the post as a personal story or customer case study:

[Opening paragraph describing a real situation or conversation that hooks the reader]

💡 [Key insight 1 from the situation]

🔍 [Key insight 2 with deeper analysis]

⚡ [Practical takeaway or lesson learned]

[Final thought and question to engage readers]

Use 3-4 emojis strategically placed throughout the post.
{}",
        config.length().guide()
    )
}

fn guide_based(config: &PostConfig) -> String {
    format!(
        "\
Structure the post as an educational guide:

[Title framed as a guide] 👇

[Brief introduction explaining why this topic matters]

🧠 [Section 1 - Definition or conceptual explanation]

🤖 [Section 2 - Further explanation or comparison]

⚡ [Section 3 - Practical application]

💡 [Key takeaway and why it matters]

[Engaging question to prompt discussion]

Use 4-5 emojis thoughtfully placed throughout the post.
{}",
        config.length().guide()
    )
}

fn industry_insight(config: &PostConfig) -> String {
    format!(
        "\
Structure the post as an industry insight:

[Title highlighting an interesting trend or observation about {topic}] 🍽️

[Opening paragraph setting context for why this matters and mentioning data/trends]

1️⃣ [Point 1]: [Factual insight with specific statistics]
2️⃣ [Point 2]: [Factual insight with specific statistics]
3️⃣ [Point 3]: [Factual insight with specific statistics]
4️⃣ [Point 4]: [Factual insight with specific statistics]

[Closing thought that makes readers think differently about the topic]

[Question to engage audience]

Use 4-5 emojis thoughtfully placed throughout the post.
{guide}",
        topic = config.topic(),
        guide = config.length().guide()
    )
}

// ── Revision prompt ────────────────────────────────────────────────

/// Build the instruction for revising a post with user feedback.
pub fn revision_prompt(original: &str, feedback: &str) -> String {
    format!(
        "\
I need you to revise a LinkedIn post based on specific feedback.

Original LinkedIn Post:
---
{original}
---

Feedback to incorporate:
---
{feedback}
---

Please provide a revised version of the post that addresses all the feedback while maintaining the overall structure and tone.
Keep the same post format (emoji usage, sections, etc.) unless specifically requested to change in the feedback.
Return just the revised post as plain text with proper line breaks, without any additional explanation.
"
    )
}
