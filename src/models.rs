//! Wire types for the 10MinuteMail JSON API.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single message delivered to the temporary address.
///
/// Field names follow the service's JSON; missing fields decode to their
/// defaults so partial payloads still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Opaque message identifier, used for reply and forward.
    pub id: String,
    /// Envelope sender address.
    pub sender: String,
    /// Raw `From` value as rendered by the server.
    pub from: String,
    pub subject: String,
    #[serde(rename = "bodyPlainText")]
    pub plaintext: String,
    #[serde(rename = "bodyHtmlContent")]
    pub html: String,
    #[serde(rename = "bodyPreview")]
    pub preview: String,
    /// Send time as sent by the server, e.g. `2021-11-28T08:21:06.000+0000`.
    #[serde(rename = "sentDate")]
    pub sent_date: String,
    #[serde(rename = "sentDateFormatted")]
    pub sent_date_formatted: String,
    pub forwarded: bool,
    #[serde(rename = "repliedTo")]
    pub replied_to: bool,
    pub read: bool,
    pub expanded: bool,
}

impl Message {
    /// Parse [`Message::sent_date`] into a timestamp.
    ///
    /// Returns `None` when the server sent an empty or unrecognised value.
    pub fn sent_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.sent_date, "%Y-%m-%dT%H:%M:%S%.f%z").ok()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressResponse {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResetResponse {
    #[serde(rename = "Response")]
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecondsLeftResponse {
    #[serde(rename = "secondsLeft")]
    pub seconds_left: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpiredResponse {
    pub expired: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplyRequest<'a> {
    #[serde(rename = "Reply")]
    pub reply: ReplyBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplyBody<'a> {
    #[serde(rename = "messageId")]
    pub message_id: &'a str,
    #[serde(rename = "replyBody")]
    pub reply_body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForwardRequest<'a> {
    #[serde(rename = "Forward")]
    pub forward: ForwardBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForwardBody<'a> {
    #[serde(rename = "messageId")]
    pub message_id: &'a str,
    #[serde(rename = "forwardAddress")]
    pub forward_address: &'a str,
}
