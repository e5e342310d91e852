use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

const REF_KEY: &str = "__ref";

/// Normalised in-memory store of API responses.
///
/// Every object carrying both `__typename` and `id` is stored once under
/// `Typename:id`; wherever it appears in a response it is replaced by a
/// reference. Writing an entity merges field by field into what is already
/// stored, and a list-valued field is always replaced wholesale, so entries
/// dropped by the server disappear on the next refetch.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entities: HashMap<String, Map<String, Value>>,
    roots: HashMap<String, Value>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Typename:id` for an identifiable object, `None` otherwise.
    pub fn entity_key(value: &Value) -> Option<String> {
        let typename = value.get("__typename")?.as_str()?;
        let id = match value.get("id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(format!("{typename}:{id}"))
    }

    fn root_key(field: &str, args: &Value) -> String {
        format!("{field}({args})")
    }

    /// Stores the result of a root query field for the given arguments,
    /// replacing whatever was cached for that field and argument set.
    pub fn write_root(&mut self, field: &str, args: &Value, data: &Value) {
        let normalized = self.normalize(data);
        self.roots.insert(Self::root_key(field, args), normalized);
    }

    /// Merges every identifiable object in `data` into the entity store
    /// without recording a root entry (mutation payloads).
    pub fn write_entities(&mut self, data: &Value) {
        self.normalize(data);
    }

    pub fn read_root<T: DeserializeOwned>(&self, field: &str, args: &Value) -> Option<T> {
        let stored = self.roots.get(&Self::root_key(field, args))?;
        let value = self.denormalize(stored, &mut HashSet::new());
        serde_json::from_value(value).ok()
    }

    pub fn read_entity<T: DeserializeOwned>(&self, typename: &str, id: &str) -> Option<T> {
        let key = format!("{typename}:{id}");
        let fields = self.entities.get(&key)?;
        let mut visiting = HashSet::from([key]);
        let value = self.denormalize_object(fields, &mut visiting);
        serde_json::from_value(value).ok()
    }

    pub fn contains_entity(&self, typename: &str, id: &str) -> bool {
        self.entities.contains_key(&format!("{typename}:{id}"))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn normalize(&mut self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| self.normalize(v)).collect()),
            Value::Object(map) => {
                let fields: Map<String, Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.normalize(v)))
                    .collect();
                match Self::entity_key(value) {
                    Some(key) => {
                        self.entities.entry(key.clone()).or_default().extend(fields);
                        json!({ REF_KEY: key })
                    }
                    None => Value::Object(fields),
                }
            }
            other => other.clone(),
        }
    }

    fn denormalize(&self, value: &Value, visiting: &mut HashSet<String>) -> Value {
        match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.denormalize(v, visiting))
                    .collect(),
            ),
            Value::Object(map) => match map.get(REF_KEY).and_then(Value::as_str) {
                Some(key) => self.resolve_ref(key, visiting),
                None => self.denormalize_object(map, visiting),
            },
            other => other.clone(),
        }
    }

    fn denormalize_object(
        &self,
        map: &Map<String, Value>,
        visiting: &mut HashSet<String>,
    ) -> Value {
        Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), self.denormalize(v, visiting)))
                .collect(),
        )
    }

    /// Expands a reference. A reference back to an entity already being
    /// expanded (comment -> task -> comments) yields only its identity.
    fn resolve_ref(&self, key: &str, visiting: &mut HashSet<String>) -> Value {
        let Some(fields) = self.entities.get(key) else {
            return Value::Null;
        };
        if !visiting.insert(key.to_string()) {
            let mut identity = Map::new();
            for field in ["__typename", "id"] {
                if let Some(v) = fields.get(field) {
                    identity.insert(field.to_string(), v.clone());
                }
            }
            return Value::Object(identity);
        }
        let value = self.denormalize_object(fields, visiting);
        visiting.remove(key);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str) -> Value {
        json!({
            "__typename": "ProjectType",
            "id": id,
            "name": name,
            "organization": { "__typename": "OrganizationType", "id": "1", "slug": "acme" }
        })
    }

    #[test]
    fn identical_entities_are_stored_once() {
        let mut cache = ResponseCache::new();
        let args = json!({ "organizationSlug": "acme", "status": null });
        cache.write_root("projects", &args, &json!([project("1", "A"), project("2", "B")]));
        // two projects plus the shared organization
        assert_eq!(cache.entity_count(), 3);
        assert!(cache.contains_entity("OrganizationType", "1"));
        assert!(!cache.contains_entity("ProjectType", "3"));
        let names: Vec<Value> = cache.read_root("projects", &args).unwrap();
        assert_eq!(names[1]["name"], "B");
        assert_eq!(names[1]["organization"]["slug"], "acme");
    }

    #[test]
    fn refetched_list_replaces_stale_entries() {
        let mut cache = ResponseCache::new();
        let args = json!({ "organizationSlug": "acme", "status": null });
        cache.write_root("projects", &args, &json!([project("1", "A"), project("2", "B")]));
        cache.write_root("projects", &args, &json!([project("2", "B2")]));

        let list: Vec<Value> = cache.read_root("projects", &args).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], "2");
        assert_eq!(list[0]["name"], "B2");
    }

    #[test]
    fn mutation_payload_updates_cached_lists() {
        let mut cache = ResponseCache::new();
        let args = json!({ "organizationSlug": "acme", "status": null });
        cache.write_root("projects", &args, &json!([project("1", "Old")]));
        cache.write_entities(&project("1", "New"));

        let list: Vec<Value> = cache.read_root("projects", &args).unwrap();
        assert_eq!(list[0]["name"], "New");
    }

    #[test]
    fn list_field_on_entity_replaced_not_merged() {
        let mut cache = ResponseCache::new();
        let comment = |id: &str| {
            json!({ "__typename": "TaskCommentType", "id": id, "content": id,
                    "task": { "__typename": "TaskType", "id": "5" } })
        };
        let task = |comments: Vec<Value>| {
            json!({ "__typename": "TaskType", "id": "5", "title": "T", "comments": comments })
        };
        cache.write_entities(&task(vec![comment("c1"), comment("c2")]));
        cache.write_entities(&task(vec![comment("c2")]));

        let stored: Value = cache.read_entity("TaskType", "5").unwrap();
        let ids: Vec<&str> = stored["comments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["c2"]);
        // the back-reference to the task is cut to its identity
        assert_eq!(stored["comments"][0]["task"], json!({ "__typename": "TaskType", "id": "5" }));
    }

    #[test]
    fn partial_writes_merge_fields() {
        let mut cache = ResponseCache::new();
        cache.write_entities(&json!({ "__typename": "TaskType", "id": "5", "title": "T", "status": "TODO" }));
        cache.write_entities(&json!({ "__typename": "TaskType", "id": "5", "status": "DONE" }));
        let stored: Value = cache.read_entity("TaskType", "5").unwrap();
        assert_eq!(stored["title"], "T");
        assert_eq!(stored["status"], "DONE");
    }

    #[test]
    fn objects_without_identity_stay_inline() {
        let mut cache = ResponseCache::new();
        let args = json!({ "organizationSlug": "acme" });
        cache.write_root(
            "projectStatistics",
            &args,
            &json!({ "__typename": "ProjectStatisticsType", "totalProjects": 2 }),
        );
        assert_eq!(cache.entity_count(), 0);
        let stats: Value = cache.read_root("projectStatistics", &args).unwrap();
        assert_eq!(stats["totalProjects"], 2);
        assert!(cache.read_root::<Value>("projectStatistics", &json!({})).is_none());
    }
}
