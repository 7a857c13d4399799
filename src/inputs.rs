//! Registry of named inputs bound into an arena before expressions are parsed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, NodeId};
use crate::error::SkinError;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Single input field inside a group.
pub struct InputField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Named group of inputs; each field is bound as `<group>_<field>`.
pub struct InputGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<InputField>,
}

impl InputGroup {
    pub fn new(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            fields: fields
                .iter()
                .map(|f| InputField {
                    name: (*f).to_string(),
                    description: None,
                })
                .collect(),
        }
    }
}

/// Parses a JSON array of input groups.
pub fn groups_from_json_str(input: &str) -> Result<Vec<InputGroup>, SkinError> {
    serde_json::from_str(input).map_err(|e| SkinError::Config(format!("invalid input groups: {e}")))
}

/// Handles to the leaves created by [`register_inputs`].
#[derive(Debug, Clone, Default)]
pub struct InputBindings {
    nodes: BTreeMap<String, NodeId>,
}

impl InputBindings {
    /// Looks up `<group>_<field>`.
    pub fn get(&self, group: &str, field: &str) -> Option<NodeId> {
        self.lookup(&binding_name(group, field))
    }

    pub fn lookup(&self, full_name: &str) -> Option<NodeId> {
        self.nodes.get(full_name).copied()
    }

    /// Writes fresh values into a bound input, typically once per frame.
    pub fn set(&self, arena: &mut Arena, full_name: &str, values: &[f32]) -> Result<(), SkinError> {
        let id = self
            .lookup(full_name)
            .ok_or_else(|| SkinError::UnknownBinding(full_name.to_string()))?;
        arena.set_values(id, values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn binding_name(group: &str, field: &str) -> String {
    format!("{group}_{field}")
}

/// Binds every field of every group into `arena`, in order.
///
/// Must run before parsing expressions that reference the inputs.
pub fn register_inputs(arena: &mut Arena, groups: &[InputGroup]) -> Result<InputBindings, SkinError> {
    let mut bindings = InputBindings::default();
    for group in groups {
        if group.name.is_empty() {
            return Err(SkinError::Config("input group name must not be empty".to_string()));
        }
        for field in &group.fields {
            let full_name = binding_name(&group.name, &field.name);
            let id = arena.bind(&full_name)?;
            bindings.nodes.insert(full_name, id);
        }
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::{groups_from_json_str, register_inputs, InputGroup};
    use crate::arena::Arena;
    use crate::error::ErrorKind;

    #[test]
    fn binds_group_field_names_in_order() {
        let mut arena = Arena::default();
        let groups = [
            InputGroup::new("example", &["x", "size"]),
            InputGroup::new("example2", &["y", "girth"]),
        ];
        let bindings = register_inputs(&mut arena, &groups).unwrap();
        assert_eq!(bindings.len(), 4);

        let x = bindings.get("example", "x").unwrap();
        let girth = bindings.get("example2", "girth").unwrap();
        assert!(x < girth);
        assert_eq!(arena.find_named("example2_girth"), Some(girth));
        assert!(arena.values(x).unwrap().is_empty());

        bindings.set(&mut arena, "example_x", &[3.0, 4.0]).unwrap();
        assert_eq!(arena.values(x).unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn set_reports_unknown_binding_by_name() {
        let mut arena = Arena::default();
        let bindings =
            register_inputs(&mut arena, &[InputGroup::new("example", &["x"])]).unwrap();
        let err = bindings.set(&mut arena, "example_y", &[1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(err.to_string(), "no input bound as 'example_y'");
    }

    #[test]
    fn rejects_colliding_names() {
        let mut arena = Arena::default();
        let groups = [
            InputGroup::new("a_b", &["c"]),
            InputGroup::new("a", &["b_c"]),
        ];
        let err = register_inputs(&mut arena, &groups).unwrap_err();
        assert!(err.to_string().contains("'a_b_c' is already bound"));
    }

    #[test]
    fn loads_groups_from_json() {
        let groups = groups_from_json_str(
            r#"[{"name": "example", "description": "demo", "fields": [{"name": "x"}]}]"#,
        )
        .unwrap();
        assert_eq!(groups[0].fields[0].name, "x");
        assert!(groups_from_json_str("{}").is_err());
    }
}
