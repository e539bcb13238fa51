//! Interactive post-generation session.
//!
//! A [`Session`] walks an explicit state machine:
//!
//! ```text
//! CollectConfig ──▶ Research ──▶ Format ──▶ Review ──accept──▶ (done)
//!       ▲                                    │  ▲
//!       └──────────────restart───────────────┘  └──revise──┘
//! ```
//!
//! Restart is a transition back to [`SessionState::CollectConfig`], not a
//! recursive call, so arbitrarily long sessions run in constant stack.
//! All user interaction goes through the [`Console`] trait.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::info;

use crate::formatter::Formatter;
use crate::post::{PostConfig, PostFormat, PostLength};
use crate::research::Researcher;
use crate::{Error, Result};

// ── Console ────────────────────────────────────────────────────────

/// Line-oriented user interaction.
pub trait Console {
    /// Print `text` followed by a newline.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Show `prompt` and read one line. `Ok(None)` means input is closed.
    /// The returned line has its trailing newline removed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// [`Console`] over the process's stdin and stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}")?;
        out.flush()
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut out = io::stdout().lock();
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// [`Console`] fed from a fixed list of input lines, recording all output.
///
/// Drives a session non-interactively (scripts, tests).
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    /// Everything printed so far, prompts included, one entry per call.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Input lines not consumed yet.
    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }
}

// ── State machine ──────────────────────────────────────────────────

/// Where the session is. Each state owns the data produced so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Ask the user for topic, format, customer-story flag, and length.
    CollectConfig,
    /// Fetch research for the collected config.
    Research(PostConfig),
    /// Turn research into a first post.
    Format {
        config: PostConfig,
        research: String,
    },
    /// Show the current post and offer revise / accept / restart.
    Review { post: String },
}

/// A choice at the review menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Revise,
    Accept,
    Restart,
}

impl ReviewAction {
    /// Map a menu answer (`"1"`–`"3"`) to an action.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(ReviewAction::Revise),
            "2" => Some(ReviewAction::Accept),
            "3" => Some(ReviewAction::Restart),
            _ => None,
        }
    }
}

/// Result of one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next(SessionState),
    Accepted(String),
}

/// Interactive session tying a [`Researcher`], a [`Formatter`], and a
/// [`Console`] together.
pub struct Session<'a, C: Console> {
    researcher: &'a dyn Researcher,
    formatter: &'a dyn Formatter,
    console: C,
    stream: bool,
}

impl<'a, C: Console> Session<'a, C> {
    pub fn new(researcher: &'a dyn Researcher, formatter: &'a dyn Formatter, console: C) -> Self {
        Self {
            researcher,
            formatter,
            console,
            stream: true,
        }
    }

    /// Whether research is requested as a stream. Default: `true`.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Run from [`SessionState::CollectConfig`] until the user accepts a
    /// post. Returns the accepted post text.
    pub async fn run(&mut self) -> Result<String> {
        let mut state = SessionState::CollectConfig;
        loop {
            match self.step(state).await? {
                Step::Next(next) => state = next,
                Step::Accepted(post) => return Ok(post),
            }
        }
    }

    /// Perform one transition out of `state`.
    pub async fn step(&mut self, state: SessionState) -> Result<Step> {
        match state {
            SessionState::CollectConfig => {
                let config = self.collect_config()?;
                info!(
                    topic = config.topic(),
                    format = %config.format(),
                    length = %config.length(),
                    "Configuration collected"
                );
                Ok(Step::Next(SessionState::Research(config)))
            }
            SessionState::Research(config) => {
                self.say(&format!("\nResearching about {}...", config.topic()))?;
                let research = self
                    .researcher
                    .get_research(config.topic(), self.stream)
                    .await?;
                Ok(Step::Next(SessionState::Format { config, research }))
            }
            SessionState::Format { config, research } => {
                self.say("\nFormatting your LinkedIn post...")?;
                let post = self.formatter.format_post(&research, &config).await?;
                self.say("\nYour LinkedIn Post:\n")?;
                self.say(&post)?;
                Ok(Step::Next(SessionState::Review { post }))
            }
            SessionState::Review { post } => match self.review_choice()? {
                ReviewAction::Revise => {
                    self.say("\nPlease provide your feedback and requested changes:")?;
                    let feedback = self.ask("Feedback: ")?;
                    self.say("\nRevising your post...")?;
                    let revised = self.formatter.revise_post(&post, &feedback).await?;
                    self.say("\nRevised LinkedIn Post:\n")?;
                    self.say(&revised)?;
                    Ok(Step::Next(SessionState::Review { post: revised }))
                }
                ReviewAction::Accept => {
                    self.say("\nPost accepted. Thank you for using the LinkedIn Post Generator!")?;
                    info!("Post accepted");
                    Ok(Step::Accepted(post))
                }
                ReviewAction::Restart => {
                    self.say("\nStarting over with a new post...")?;
                    info!("Session restarted");
                    Ok(Step::Next(SessionState::CollectConfig))
                }
            },
        }
    }

    /// Ask for everything a [`PostConfig`] needs, re-prompting on invalid
    /// menu answers.
    pub fn collect_config(&mut self) -> Result<PostConfig> {
        self.say("\n=== LinkedIn Post Generator ===\n")?;

        let topic = self.ask_until(
            "What topic would you like to create a LinkedIn post about? ",
            |line| {
                let topic = line.trim();
                (!topic.is_empty()).then(|| topic.to_string())
            },
        )?;

        self.say("\nWhat format would you like for your post?")?;
        for (i, format) in PostFormat::ALL.iter().enumerate() {
            self.say(&format!("{}. {}", i + 1, format.label()))?;
        }
        let format = self.ask_until("Enter your choice (1-4): ", PostFormat::from_menu_choice)?;

        let is_customer_story = if format == PostFormat::StoryBased {
            let answer = self.ask("Is this based on a real customer story? (y/n): ")?;
            matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
        } else {
            false
        };

        self.say("\nHow long would you like your post to be?")?;
        for (i, length) in PostLength::ALL.iter().enumerate() {
            self.say(&format!(
                "{}. {} ({} words)",
                i + 1,
                length.label(),
                length.word_range()
            ))?;
        }
        let length = self.ask_until("Enter your choice (1-3): ", PostLength::from_menu_choice)?;

        Ok(PostConfig::new(format, topic, length, is_customer_story))
    }

    fn review_choice(&mut self) -> Result<ReviewAction> {
        loop {
            self.say("\n=== Post Feedback Options ===")?;
            self.say("1. Revise the post with feedback")?;
            self.say("2. Accept the post as is")?;
            self.say("3. Start over with a new post")?;
            let answer = self.ask("\nEnter your choice (1-3): ")?;
            match ReviewAction::from_menu_choice(&answer) {
                Some(action) => return Ok(action),
                None => self.say("\nInvalid choice. Please try again.")?,
            }
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        Ok(self.console.print(text)?)
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.console.read_line(prompt)?.ok_or(Error::InputClosed)
    }

    fn ask_until<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T> {
        loop {
            if let Some(value) = parse(&self.ask(prompt)?) {
                return Ok(value);
            }
        }
    }
}
