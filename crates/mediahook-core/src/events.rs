use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A title needs to be recognized (`title`)
    NameRecognize,
    /// Answer to `NameRecognize` (`title`, `name`, `year`, `season`, `episode`)
    NameRecognizeResult,
    /// Free text sent by a user (`text`)
    UserMessage,
    /// Request to subscribe to a movie or show (`name`, `year`, `type`, `title`)
    Subscribe,
    /// A plugin command was invoked (`action`)
    PluginAction,
    /// Convert a media id into server details (`mediaid`, `convert_type`), answered with `media_dict`
    MediaRecognizeConvert,
    /// A download finished moving into the library
    TransferComplete,
    /// User-facing notification (`title`, `text`)
    NoticeMessage,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::NameRecognize,
        EventType::NameRecognizeResult,
        EventType::UserMessage,
        EventType::Subscribe,
        EventType::PluginAction,
        EventType::MediaRecognizeConvert,
        EventType::TransferComplete,
        EventType::NoticeMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::NameRecognize => "name.recognize",
            EventType::NameRecognizeResult => "name.recognize.result",
            EventType::UserMessage => "user.message",
            EventType::Subscribe => "subscribe.add",
            EventType::PluginAction => "plugin.action",
            EventType::MediaRecognizeConvert => "media.recognize.convert",
            EventType::TransferComplete => "transfer.complete",
            EventType::NoticeMessage => "notice.message",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown event type: {}", s))
    }
}

/// A typed event with a free-form mapping of named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            data: Map::new(),
        }
    }

    /// Build from a JSON value; anything but an object yields an empty payload.
    pub fn with_data(event_type: EventType, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { event_type, data }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn notice(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(EventType::NoticeMessage)
            .with("title", title.into())
            .with("text", text.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String field, `None` when missing, not a string, or empty.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// In-process broadcast bus shared by the host and every plugin.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn send(&self, event: Event) {
        let event_type = event.event_type;
        if self.sender.send(event).is_err() {
            trace!(event_type = %event_type, "No subscribers for event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
