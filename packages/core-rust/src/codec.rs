//! Tagged encoding of operations and chains.
//!
//! An operation encodes as a JSON object whose `class` member holds its type
//! tag and whose other members are its fields. Chains encode their stages
//! recursively under `operations`. The same document can be carried as named
//! `MsgPack` (`rmp_serde::to_vec_named()`).
//!
//! The frame of a `PageRank` is transient and not encoded. Streamed inputs
//! and `Transform` functions cannot be encoded; encoding fails rather than
//! dropping them.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::operation::{
    AddStoreProperties, GetElements, Operation, OperationChain, OperationType, Options, PageRank,
    Path, ToEntitySeeds, Transform,
};

/// Member holding the type tag.
pub const CLASS_KEY: &str = "class";

const OPERATIONS_KEY: &str = "operations";
const OPTIONS_KEY: &str = "options";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("msgpack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("msgpack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("encoded operation has no `{CLASS_KEY}` member")]
    MissingClass,

    #[error("unknown operation class: {0}")]
    UnknownClass(String),

    #[error("operation {tag} is not an instance of its registered type")]
    TypeMismatch { tag: &'static str },

    #[error("encoded {what} is not a JSON object")]
    NotAnObject { what: &'static str },

    #[error("{tag} cannot be encoded: field `{field}` has no serialized form")]
    Unrepresentable {
        tag: &'static str,
        field: &'static str,
    },
}

type EncodeFn = fn(&dyn Operation, &OperationCodec) -> Result<Map<String, Value>, CodecError>;
type DecodeFn = fn(Map<String, Value>, &OperationCodec) -> Result<Box<dyn Operation>, CodecError>;

#[derive(Clone, Copy)]
struct Entry {
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Registry of encodable operation types keyed by type tag.
#[derive(Default)]
pub struct OperationCodec {
    entries: HashMap<&'static str, Entry>,
}

impl std::fmt::Debug for OperationCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.entries.keys().collect();
        tags.sort_unstable();
        f.debug_struct("OperationCodec").field("classes", &tags).finish()
    }
}

fn encode_serde<O>(op: &dyn Operation, _: &OperationCodec) -> Result<Map<String, Value>, CodecError>
where
    O: Operation + OperationType + Serialize,
{
    let typed = op
        .as_any()
        .downcast_ref::<O>()
        .ok_or(CodecError::TypeMismatch { tag: O::TYPE_TAG })?;
    match serde_json::to_value(typed)? {
        Value::Object(map) => Ok(map),
        _ => Err(CodecError::NotAnObject { what: O::TYPE_TAG }),
    }
}

fn encode_transform(
    op: &dyn Operation,
    codec: &OperationCodec,
) -> Result<Map<String, Value>, CodecError> {
    let transform = op
        .as_any()
        .downcast_ref::<Transform>()
        .ok_or(CodecError::TypeMismatch {
            tag: Transform::TYPE_TAG,
        })?;
    if transform.element_transformer().is_some() {
        return Err(CodecError::Unrepresentable {
            tag: Transform::TYPE_TAG,
            field: "elementTransformer",
        });
    }
    encode_serde::<Transform>(op, codec)
}

fn decode_serde<O>(
    fields: Map<String, Value>,
    _: &OperationCodec,
) -> Result<Box<dyn Operation>, CodecError>
where
    O: Operation + DeserializeOwned,
{
    let op: O = serde_json::from_value(Value::Object(fields))?;
    Ok(Box::new(op))
}

fn encode_chain(
    op: &dyn Operation,
    codec: &OperationCodec,
) -> Result<Map<String, Value>, CodecError> {
    let chain = op
        .as_any()
        .downcast_ref::<OperationChain>()
        .ok_or(CodecError::TypeMismatch {
            tag: OperationChain::TYPE_TAG,
        })?;
    let stages = chain
        .operations()
        .iter()
        .map(|stage| codec.encode(stage.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let mut map = Map::new();
    map.insert(OPERATIONS_KEY.to_string(), Value::Array(stages));
    if !chain.options().is_empty() {
        map.insert(OPTIONS_KEY.to_string(), serde_json::to_value(chain.options())?);
    }
    Ok(map)
}

fn decode_chain(
    mut fields: Map<String, Value>,
    codec: &OperationCodec,
) -> Result<Box<dyn Operation>, CodecError> {
    let stages: Vec<Value> = match fields.remove(OPERATIONS_KEY) {
        Some(value) => serde_json::from_value(value)?,
        None => Vec::new(),
    };
    let options: Options = match fields.remove(OPTIONS_KEY) {
        Some(value) => serde_json::from_value(value)?,
        None => Options::new(),
    };
    let operations = stages
        .into_iter()
        .map(|stage| codec.decode(stage))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Box::new(
        OperationChain::from_operations(operations).with_options(options),
    ))
}

impl OperationCodec {
    /// An empty codec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec knowing every built-in operation and [`OperationChain`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut codec = Self::new();
        codec.register::<GetElements>();
        codec.register::<Path>();
        codec.register_with(
            Transform::TYPE_TAG,
            encode_transform,
            decode_serde::<Transform>,
        );
        codec.register::<PageRank>();
        codec.register::<ToEntitySeeds>();
        codec.register::<AddStoreProperties>();
        codec.register_with(OperationChain::TYPE_TAG, encode_chain, decode_chain);
        codec
    }

    /// Registers a serde-encodable operation type under its type tag.
    pub fn register<O>(&mut self)
    where
        O: Operation + OperationType + Serialize + DeserializeOwned,
    {
        self.register_with(O::TYPE_TAG, encode_serde::<O>, decode_serde::<O>);
    }

    /// Registers custom encode and decode functions for a type tag.
    ///
    /// Encoders return the member map without the class member.
    pub fn register_with(&mut self, tag: &'static str, encode: EncodeFn, decode: DecodeFn) {
        self.entries.insert(tag, Entry { encode, decode });
    }

    #[must_use]
    pub fn knows(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    fn entry(&self, tag: &str) -> Result<Entry, CodecError> {
        self.entries
            .get(tag)
            .copied()
            .ok_or_else(|| CodecError::UnknownClass(tag.to_string()))
    }

    pub fn encode(&self, op: &dyn Operation) -> Result<Value, CodecError> {
        let tag = op.type_tag();
        let mut fields = (self.entry(tag)?.encode)(op, self)?;
        fields.insert(CLASS_KEY.to_string(), Value::String(tag.to_string()));
        Ok(Value::Object(fields))
    }

    pub fn decode(&self, value: Value) -> Result<Box<dyn Operation>, CodecError> {
        let Value::Object(mut fields) = value else {
            return Err(CodecError::NotAnObject { what: "operation" });
        };
        let tag = match fields.remove(CLASS_KEY) {
            Some(Value::String(tag)) => tag,
            _ => return Err(CodecError::MissingClass),
        };
        (self.entry(&tag)?.decode)(fields, self)
    }

    pub fn to_json_string(&self, op: &dyn Operation) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.encode(op)?)?)
    }

    pub fn from_json_str(&self, json: &str) -> Result<Box<dyn Operation>, CodecError> {
        self.decode(serde_json::from_str(json)?)
    }

    pub fn to_msgpack(&self, op: &dyn Operation) -> Result<Vec<u8>, CodecError> {
        Ok(rmp_serde::to_vec_named(&self.encode(op)?)?)
    }

    pub fn from_msgpack(&self, bytes: &[u8]) -> Result<Box<dyn Operation>, CodecError> {
        let value: Value = rmp_serde::from_slice(bytes)?;
        self.decode(value)
    }
}
