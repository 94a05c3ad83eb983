//! Reusable prompts using Handlebars for templating. Strict mode is on
//! so a missing variable fails loudly instead of rendering an empty
//! string into the prompt.

use std::fmt;

use anyhow::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Debug)]
pub enum Prompt {
    ExtractEvent,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const EXTRACT_EVENT_PROMPT: &str = r#"
You are an event information parser.
Extract the event title, description, duration (in minutes), and date from the text you are given.

The exact time right now is {{reference_time}} (ISO 8601, UTC).
Times and days in the text are in {{source_timezone}}. Convert them to UTC, taking daylight saving time into account for the date of the event.
Relative dates such as "today", "tomorrow" or "next tuesday" are relative to the current time above.
Always return the date as an ISO 8601 timestamp in UTC.

If the duration is not specified, use 60 minutes.

Don't copy the title and description word for word. Write a title in title case that captures the essence of the event, with articles, prepositions and conjunctions lowercase.
If the text contains details, write a short description. Otherwise leave the description blank.
For example, "Meeting John at 5:00 PM" becomes the title "Meeting with John" with a blank description, while "Meeting John at 5:00 PM to discuss the project" becomes "Project Discussion with John" with the description "Discuss the project with John".

Mark whether the event repeats every week. For a repeating event, the date is the occurrence in the current week regardless of the current day. For example, "Meeting John at 5:00 PM every Monday" is recurring and dated on the Monday of the current week.

Again, the exact time right now is {{reference_time}} (ISO 8601, UTC).
"#;

#[derive(Serialize)]
pub struct ExtractEventContext<'a> {
    pub reference_time: &'a str,
    pub source_timezone: &'a str,
}

pub fn templates<'a>() -> Result<Handlebars<'a>, Error> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_template_string(&Prompt::ExtractEvent.to_string(), EXTRACT_EVENT_PROMPT)?;
    Ok(registry)
}

pub fn render<T: Serialize>(prompt: Prompt, data: &T) -> Result<String, Error> {
    let rendered = templates()?.render(&prompt.to_string(), data)?;
    Ok(rendered.trim().to_string())
}
