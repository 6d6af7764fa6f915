//! Oracle queries.
//!
//! The Oracle is an external generative service: the engine sends a plain
//! text prompt plus a schema description and receives a structured record
//! back, asynchronously, through the inbox. The engine-side logic here is
//! about *not trusting* that pipeline: every request carries a token so a
//! stale completion can be discarded, and a bounded deadline converts a
//! silent Oracle into a fully populated fallback record instead of an
//! engine stuck "thinking".

use crate::error::OracleError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

/// Value type of one schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Flag,
}

impl FieldKind {
    /// The neutral default used when populating a fallback record.
    fn default_value(self) -> Value {
        match self {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::Number => json!(0.0),
            FieldKind::Flag => Value::Bool(false),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Flag => value.is_boolean(),
        }
    }
}

/// One field the Oracle is asked to fill in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub description: String,
    pub kind: FieldKind,
}

/// The structured shape of an expected Oracle response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

impl OracleSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the schema.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            description: description.into(),
            kind,
        });
        self
    }

    /// Check a response object against this schema.
    pub fn validate(&self, values: &Value) -> Result<(), OracleError> {
        let object = values
            .as_object()
            .ok_or_else(|| OracleError::SchemaMismatch("response is not an object".into()))?;
        for field in &self.fields {
            match object.get(&field.name) {
                None => {
                    return Err(OracleError::SchemaMismatch(format!(
                        "missing field `{}`",
                        field.name
                    )))
                }
                Some(value) if !field.kind.matches(value) => {
                    return Err(OracleError::SchemaMismatch(format!(
                        "field `{}` has the wrong type",
                        field.name
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// An outgoing Oracle query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub token: u64,
    pub prompt: String,
    pub schema: OracleSchema,
}

/// A structured Oracle response, or its typed fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleRecord {
    pub token: u64,
    pub values: Value,
    /// Set when this record was synthesized instead of received.
    pub fallback: Option<String>,
}

impl OracleRecord {
    /// A genuine response from the client.
    pub fn response(token: u64, values: Value) -> Self {
        Self {
            token,
            values,
            fallback: None,
        }
    }

    /// A fully populated fallback: every schema field at its neutral
    /// default, tagged with the failure that produced it.
    pub fn fallback(token: u64, schema: &OracleSchema, error: &OracleError) -> Self {
        let mut values = Map::new();
        for field in &schema.fields {
            values.insert(field.name.clone(), field.kind.default_value());
        }
        Self {
            token,
            values: Value::Object(values),
            fallback: Some(error.to_string()),
        }
    }

    /// Whether this record came from the fallback path.
    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// External Oracle boundary: implementations forward the request and
/// eventually post an [`crate::inbox::AsyncResult::Oracle`] completion.
pub trait OracleClient {
    fn submit(&mut self, request: OracleRequest, reply: crate::inbox::InboxSender);
}

struct PendingQuery {
    token: u64,
    deadline: f32,
    schema: OracleSchema,
}

/// The engine's single logical Oracle slot.
///
/// One query is outstanding at a time; issuing a new one supersedes the
/// old, whose completion will arrive with a stale token and be discarded.
pub struct OracleSlot {
    timeout: f32,
    next_token: u64,
    pending: Option<PendingQuery>,
}

impl OracleSlot {
    pub fn new(timeout: f32) -> Self {
        Self {
            timeout: timeout.max(0.0),
            next_token: 0,
            pending: None,
        }
    }

    /// Whether a query is outstanding.
    #[inline]
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Issue a query. Any outstanding query is superseded.
    pub fn begin(&mut self, prompt: impl Into<String>, schema: OracleSchema, now: f32) -> OracleRequest {
        self.next_token += 1;
        let token = self.next_token;
        self.pending = Some(PendingQuery {
            token,
            deadline: now + self.timeout,
            schema: schema.clone(),
        });
        OracleRequest {
            token,
            prompt: prompt.into(),
            schema,
        }
    }

    /// Apply a completed record.
    ///
    /// Returns `None` for stale tokens (the query was superseded or already
    /// resolved). A schema-mismatched response is converted to a fallback
    /// rather than surfaced raw.
    pub fn accept(&mut self, record: OracleRecord) -> Option<OracleRecord> {
        let pending = match self.pending.take() {
            Some(p) if record.token == p.token => p,
            Some(p) => {
                warn!(
                    stale = record.token,
                    current = p.token,
                    "discarding stale oracle result"
                );
                self.pending = Some(p);
                return None;
            }
            None => return None,
        };
        if record.is_fallback() {
            return Some(record);
        }
        match pending.schema.validate(&record.values) {
            Ok(()) => Some(record),
            Err(e) => {
                warn!(error = %e, "oracle response failed validation");
                Some(OracleRecord::fallback(pending.token, &pending.schema, &e))
            }
        }
    }

    /// Resolve the outstanding query to a timeout fallback if its deadline
    /// has passed. Called once per tick.
    pub fn poll_timeout(&mut self, now: f32) -> Option<OracleRecord> {
        let pending = match self.pending.take() {
            Some(p) if now >= p.deadline => p,
            other => {
                self.pending = other;
                return None;
            }
        };
        warn!(token = pending.token, "oracle query timed out");
        Some(OracleRecord::fallback(
            pending.token,
            &pending.schema,
            &OracleError::Timeout,
        ))
    }
}
