// ── Statistics and control descriptors ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{NONE, SWITCH_OFF, SWITCH_ON};

/// Widget the host should render for a writable property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    Switch {
        label_on: String,
        label_off: String,
    },
    Dropdown {
        options: Vec<String>,
    },
}

/// A writable property with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDescriptor {
    pub name: String,
    pub value: String,
    #[serde(flatten)]
    pub kind: ControlKind,
}

impl ControlDescriptor {
    /// On/Off switch; `enabled` becomes `"1"` / `"0"`.
    pub fn switch(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            value: if enabled { "1" } else { "0" }.to_owned(),
            kind: ControlKind::Switch {
                label_on: SWITCH_ON.to_owned(),
                label_off: SWITCH_OFF.to_owned(),
            },
        }
    }

    pub fn dropdown(name: impl Into<String>, options: Vec<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: ControlKind::Dropdown { options },
        }
    }
}

/// Statistic map plus the controls attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub statistics: BTreeMap<String, String>,
    pub controls: Vec<ControlDescriptor>,
}

impl Statistics {
    /// Insert a statistic, substituting `None` for empty values.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let value = if value.is_empty() {
            NONE.to_owned()
        } else {
            value
        };
        self.statistics.insert(key.into(), value);
    }

    /// Attach a control, replacing any previous control of the same name,
    /// and mirror its value into the statistics.
    pub fn add_control(&mut self, control: ControlDescriptor) {
        self.controls.retain(|c| c.name != control.name);
        self.insert(control.name.clone(), control.value.clone());
        self.controls.push(control);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.statistics.get(key).map(String::as_str)
    }
}
