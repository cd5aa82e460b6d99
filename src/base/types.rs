use std::{collections::BTreeMap, fmt, str::FromStr};

use serde_json::Value;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Sender used when an inbound event does not name one.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Handling category assigned to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    StoreInfo,
    Vip,
    LostItem,
    JobInquiry,
    Other,
}

impl Category {
    /// The label written to the classification block and the log sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Category::StoreInfo => "店舗情報",
            Category::Vip => "VIP",
            Category::LostItem => "落とし物",
            Category::JobInquiry => "求人",
            Category::Other => "その他",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Err;

    /// Accepts either the sheet label or the English variant name.
    fn from_str(s: &str) -> Res<Self> {
        match s {
            "店舗情報" | "StoreInfo" => Ok(Category::StoreInfo),
            "VIP" | "Vip" => Ok(Category::Vip),
            "落とし物" | "LostItem" => Ok(Category::LostItem),
            "求人" | "JobInquiry" => Ok(Category::JobInquiry),
            "その他" | "Other" => Ok(Category::Other),
            other => Err(anyhow::anyhow!("Unknown category `{other}`.")),
        }
    }
}

/// A `YES` / `NO` flag as it appears in the classification block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Yes,
    No,
}

impl Flag {
    pub fn label(&self) -> &'static str {
        match self {
            Flag::Yes => "YES",
            Flag::No => "NO",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Flag::Yes)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Flag {
    type Err = Err;

    fn from_str(s: &str) -> Res<Self> {
        match s {
            "YES" => Ok(Flag::Yes),
            "NO" => Ok(Flag::No),
            other => Err(anyhow::anyhow!("Unknown flag `{other}`.")),
        }
    }
}

/// The outcome of a single classifier rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub alert: Flag,
    pub auto_reply: Flag,
}

impl Classification {
    /// Render the classification as the `key: value` block consumed by the record parser.
    pub fn to_block(&self) -> String {
        format!("\ncategory: {}\nalert: {}\nauto_reply: {}\n", self.category, self.alert, self.auto_reply)
    }
}

/// A classification as read back from a `key: value` block.
///
/// Every field is optional: the parser never fills in defaults, so consumers
/// decide what an absent or unrecognised value means for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub category: Option<Category>,
    pub alert: Option<Flag>,
    pub auto_reply: Option<Flag>,
    pub language: Option<String>,
}

impl ClassificationRecord {
    /// Build a record from parsed fields, dropping values that do not parse.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        Self {
            category: fields.get("category").and_then(|v| v.parse().ok()),
            alert: fields.get("alert").and_then(|v| v.parse().ok()),
            auto_reply: fields.get("auto_reply").and_then(|v| v.parse().ok()),
            language: fields.get("language").cloned(),
        }
    }

    pub fn is_vip(&self) -> bool {
        self.category == Some(Category::Vip)
    }

    pub fn is_auto_reply(&self) -> bool {
        self.auto_reply.is_some_and(|f| f.is_yes())
    }
}

/// An inbound direct-message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: String,
    pub message: String,
}

impl InboundEvent {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        let sender = sender.into();
        let sender = if sender.is_empty() { UNKNOWN_SENDER.to_string() } else { sender };

        Self { sender, message: message.into() }
    }

    /// Build an event from a decoded webhook body.
    ///
    /// Missing, null, empty, `false`, or zero fields fall back to their
    /// defaults; other non-string values are stringified. A body that is not
    /// an object yields the default event.
    pub fn from_json(body: &Value) -> Self {
        let field = |name: &str| match body.get(name) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Self::new(field("sender"), field("message"))
    }
}

impl Default for InboundEvent {
    fn default() -> Self {
        Self::new(UNKNOWN_SENDER, "")
    }
}

/// Handling status recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    AutoReplied,
    NeedsAttention,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::AutoReplied => "自動返信済",
            Status::NeedsAttention => "要対応",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
