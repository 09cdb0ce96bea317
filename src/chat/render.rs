//! Chat text rendering
//!
//! Message text marks place names with `**double asterisks**`. A marked
//! name that matches a place of the same message becomes a clickable link
//! (highlighted when selected); other marked runs are plain bold text.

use crate::chat::{Message, Sender};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn bold_run() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

/// One piece of rendered message text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    LineBreak,
    Bold { text: String },
    PlaceLink {
        place_id: String,
        name: String,
        selected: bool,
    },
}

/// A message ready for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub id: String,
    pub sender: Sender,
    pub segments: Vec<Segment>,
    /// Whether a map panel accompanies the message
    pub has_map: bool,
}

/// Render a message against the current selection
pub fn render_message(message: &Message, selected: Option<&str>) -> RenderedMessage {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in bold_run().captures_iter(&message.text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_text(&mut segments, &message.text[last..whole.start()]);

        let name = name.as_str();
        match message.place_titled(name) {
            Some(place) => segments.push(Segment::PlaceLink {
                place_id: place.id.clone(),
                name: name.to_string(),
                selected: selected == Some(place.id.as_str()),
            }),
            None => segments.push(Segment::Bold {
                text: name.to_string(),
            }),
        }
        last = whole.end();
    }
    push_text(&mut segments, &message.text[last..]);

    RenderedMessage {
        id: message.id.clone(),
        sender: message.sender,
        segments,
        has_map: message.has_places(),
    }
}

/// Split plain text on newlines into text and break segments
fn push_text(segments: &mut Vec<Segment>, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            segments.push(Segment::LineBreak);
        }
        if !line.is_empty() {
            segments.push(Segment::Text {
                text: line.to_string(),
            });
        }
    }
}
