// src/index/object_table.rs
use crate::segment::Layout;
use crate::types::PropertyValue;
use indexmap::IndexMap;

/// Running state for one object path (root, group, or channel), updated
/// segment by segment as the file is walked in order. `ObjectTable` is kept
/// distinct from `Index` so it is the single place that resolves what
/// "matches previous" and "carried forward" mean (see DESIGN.md).
#[derive(Debug, Clone, Default)]
pub struct ObjectState {
    pub current_layout: Option<Layout>,
    pub cumulative_properties: IndexMap<String, PropertyValue>,
}

#[derive(Debug, Default)]
pub struct ObjectTable {
    states: IndexMap<String, ObjectState>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, path: &str) -> Option<&ObjectState> {
        self.states.get(path)
    }

    fn entry(&mut self, path: &str) -> &mut ObjectState {
        self.states.entry(path.to_string()).or_default()
    }

    pub fn merge_properties(&mut self, path: &str, properties: &[crate::types::Property]) {
        let state = self.entry(path);
        for prop in properties {
            state
                .cumulative_properties
                .insert(prop.name.clone(), prop.value.clone());
        }
    }

    pub fn set_layout(&mut self, path: &str, layout: Layout) {
        self.entry(path).current_layout = Some(layout);
    }

    pub fn layout(&self, path: &str) -> Option<&Layout> {
        self.states.get(path).and_then(|s| s.current_layout.as_ref())
    }

    pub fn properties(&self, path: &str) -> IndexMap<String, PropertyValue> {
        self.states
            .get(path)
            .map(|s| s.cumulative_properties.clone())
            .unwrap_or_default()
    }
}
