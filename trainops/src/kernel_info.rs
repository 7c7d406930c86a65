use serde::{Deserialize, Serialize};

use crate::{
    attributes::{AttributeValue, NodeAttributes},
    Error,
};

/// The static description of a graph node: which operator it runs and how
/// that operator is configured.
///
/// ```rust
/// # use trainops::prelude::*;
/// let node = NodeDef::from_json(
///     r#"{"op_type": "ConcatTraining", "domain": "com.microsoft", "attributes": {"axis": 1}}"#,
/// )
/// .unwrap();
/// assert_eq!(node.op_type, "ConcatTraining");
/// assert_eq!(node.attributes.get_int("axis").unwrap(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub op_type: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: NodeAttributes,
}

impl NodeDef {
    pub fn new(domain: &str, op_type: &str) -> Self {
        Self {
            op_type: op_type.to_string(),
            domain: domain.to_string(),
            name: String::new(),
            attributes: NodeAttributes::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything a kernel sees when it is constructed: the node it implements
/// and the device it runs on.
#[derive(Debug, Clone)]
pub struct OpKernelInfo<D> {
    node: NodeDef,
    device: D,
}

impl<D> OpKernelInfo<D> {
    pub fn new(node: NodeDef, device: D) -> Self {
        Self { node, device }
    }

    pub fn node(&self) -> &NodeDef {
        &self.node
    }

    pub fn op_type(&self) -> &str {
        &self.node.op_type
    }

    pub fn domain(&self) -> &str {
        &self.node.domain
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn attributes(&self) -> &NodeAttributes {
        &self.node.attributes
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}
