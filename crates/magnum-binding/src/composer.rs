//! Payload schema composition.
//!
//! Every parameter read from the payload (`body`, `form` or `file`) is
//! folded into a single [`BodySchema`]:
//!
//! | Payload parameters | Result |
//! |--------------------|--------|
//! | none | no body schema |
//! | one, not embedded | the parameter is the whole payload |
//! | one embedded, or several | composite record `Body_<endpoint>`, every member embedded |

use crate::registry::{ParameterSpec, FORM_MEDIA_TYPE, JSON_MEDIA_TYPE, MULTIPART_MEDIA_TYPE};
use magnum_core::{Location, RegistrationError};
use magnum_schema::{Field, RecordSchema};
use serde_json::Value;

/// The schema of a route's payload.
#[derive(Debug, Clone)]
pub struct BodySchema {
    name: String,
    members: Vec<ParameterSpec>,
    composite: Option<RecordSchema>,
    required: bool,
    media_type: String,
}

impl BodySchema {
    /// Returns the schema name: `Body_<endpoint>` for a composite, else
    /// the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload parameters in declaration order.
    #[must_use]
    pub fn members(&self) -> &[ParameterSpec] {
        &self.members
    }

    /// Returns `true` if members are read under their own keys.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.composite.is_some()
    }

    /// Returns the synthesized record of a composite payload.
    #[must_use]
    pub fn composite(&self) -> Option<&RecordSchema> {
        self.composite.as_ref()
    }

    /// Returns `true` if any member is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the payload media type.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the JSON-Schema fragment for documentation generators.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match (&self.composite, self.members.first()) {
            (Some(record), _) => record.to_json_schema(),
            (None, Some(member)) => member.to_json_schema(),
            (None, None) => Value::Object(serde_json::Map::new()),
        }
    }
}

/// Folds the payload parameters of `endpoint` into one body schema.
pub fn compose_body(
    endpoint: &str,
    members: Vec<ParameterSpec>,
) -> Result<Option<BodySchema>, RegistrationError> {
    let Some(first) = members.first() else {
        return Ok(None);
    };
    let required = members.iter().any(ParameterSpec::is_required);

    if members.len() == 1 && !first.embed() {
        let name = first.name().to_string();
        let media_type = first.media_type().unwrap_or(JSON_MEDIA_TYPE).to_string();
        return Ok(Some(BodySchema {
            name,
            members,
            composite: None,
            required,
            media_type,
        }));
    }

    let name = format!("Body_{endpoint}");
    let members: Vec<ParameterSpec> = members.into_iter().map(ParameterSpec::embedded).collect();
    let composite = members
        .iter()
        .map(ParameterSpec::field)
        .cloned()
        .fold(RecordSchema::builder(name.as_str()), |builder, field: Field| {
            builder.field(field)
        })
        .build()?;
    let media_type = solve_media_type(&members);

    Ok(Some(BodySchema {
        name,
        members,
        composite: Some(composite),
        required,
        media_type,
    }))
}

fn solve_media_type(members: &[ParameterSpec]) -> String {
    let has = |location: Location| members.iter().any(|m| m.location() == location);
    if has(Location::File) {
        return MULTIPART_MEDIA_TYPE.to_string();
    }
    if has(Location::Form) {
        return FORM_MEDIA_TYPE.to_string();
    }
    let mut declared = members.iter().filter_map(ParameterSpec::media_type);
    match declared.next() {
        Some(common) if declared.all(|other| other == common) => common.to_string(),
        _ => JSON_MEDIA_TYPE.to_string(),
    }
}
