//! Run conditions.
//!
//! Conditions always appear in class-attribute form inside their owner
//! (`<runCondition class="...">`, `<condition class="...">`). The logical
//! combinators hold their operands one level further down, each inside a
//! `ConditionContainer`.

use crate::error::Result;
use crate::registry::handler::plugin_handler;
use crate::registry::identifier::escape_identifier;
use crate::registry::transcode;
use crate::registry::{container, ConfigNode, Owner, Plugin, PluginHandler};
use crate::xml::XmlElement;

const CONDITION_CONTAINER: &str = "org.jenkins_ci.plugins.run_condition.logic.ConditionContainer";

/// Operands of an `And` or `Or` condition in document order.
fn operands(node: &ConfigNode) -> Result<Vec<Plugin>> {
    let list = node.required_child("conditions")?;
    let owner = Owner::Node(node.clone());
    let mut result = Vec::new();
    for holder in list.children() {
        let Some(operand) = holder.find_child("condition") else {
            tracing::warn!(
                identifier = %node.identifier(),
                holder = %holder.name(),
                "Condition container without a condition"
            );
            continue;
        };
        match node.resolver().classify(operand, owner.clone()) {
            Plugin::Unrecognized(unrecognized) => {
                tracing::warn!(
                    identifier = %unrecognized.identifier,
                    container = "conditions",
                    parent = %node.identifier(),
                    "Skipping unsupported plugin"
                );
            }
            plugin => result.push(plugin),
        }
    }
    Ok(result)
}

/// Append a detached condition as a new operand.
fn add_operand(node: &ConfigNode, condition: &ConfigNode) -> Result<()> {
    container::ensure_detached(condition)?;
    let list = node.required_child("conditions")?;
    let holder = XmlElement::new(escape_identifier(CONDITION_CONTAINER));
    let wrapper = transcode::encode(condition.element(), "condition");
    holder.append_child(wrapper.clone());
    list.append_child(holder);
    condition.bind(wrapper, Owner::Node(node.clone()));
    node.update()
}

#[derive(Debug, Clone)]
pub struct AlwaysRun {
    node: ConfigNode,
}

plugin_handler!(
    AlwaysRun,
    Condition,
    "org.jenkins_ci.plugins.run_condition.core.AlwaysRun",
    template = "<org.jenkins__ci.plugins.run__condition.core.AlwaysRun/>",
);

#[derive(Debug, Clone)]
pub struct NeverRun {
    node: ConfigNode,
}

plugin_handler!(
    NeverRun,
    Condition,
    "org.jenkins_ci.plugins.run_condition.core.NeverRun",
    template = "<org.jenkins__ci.plugins.run__condition.core.NeverRun/>",
);

/// Condition on a token that expands to `true` or `false` at build time.
#[derive(Debug, Clone)]
pub struct BooleanCondition {
    node: ConfigNode,
}

plugin_handler!(
    BooleanCondition,
    Condition,
    "org.jenkins_ci.plugins.run_condition.core.BooleanCondition",
    template = "<org.jenkins__ci.plugins.run__condition.core.BooleanCondition><token></token></org.jenkins__ci.plugins.run__condition.core.BooleanCondition>",
);

impl BooleanCondition {
    #[must_use]
    pub fn token(&self) -> String {
        self.node.child_text("token")
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.node.set_child_text("token", token)
    }
}

/// Holds when every operand holds.
#[derive(Debug, Clone)]
pub struct AndCondition {
    node: ConfigNode,
}

plugin_handler!(
    AndCondition,
    Condition,
    "org.jenkins_ci.plugins.run_condition.logic.And",
    template = "<org.jenkins__ci.plugins.run__condition.logic.And><conditions/></org.jenkins__ci.plugins.run__condition.logic.And>",
);

impl AndCondition {
    pub fn conditions(&self) -> Result<Vec<Plugin>> {
        operands(&self.node)
    }

    pub fn add_condition(&self, condition: &impl PluginHandler) -> Result<()> {
        add_operand(&self.node, condition.node())
    }
}

/// Holds when any operand holds.
#[derive(Debug, Clone)]
pub struct OrCondition {
    node: ConfigNode,
}

plugin_handler!(
    OrCondition,
    Condition,
    "org.jenkins_ci.plugins.run_condition.logic.Or",
    template = "<org.jenkins__ci.plugins.run__condition.logic.Or><conditions/></org.jenkins__ci.plugins.run__condition.logic.Or>",
);

impl OrCondition {
    pub fn conditions(&self) -> Result<Vec<Plugin>> {
        operands(&self.node)
    }

    pub fn add_condition(&self, condition: &impl PluginHandler) -> Result<()> {
        add_operand(&self.node, condition.node())
    }
}

#[derive(Debug, Clone)]
pub struct NotCondition {
    node: ConfigNode,
}

plugin_handler!(
    NotCondition,
    Condition,
    "org.jenkins_ci.plugins.run_condition.logic.Not",
    template = r#"<org.jenkins__ci.plugins.run__condition.logic.Not><condition class="org.jenkins_ci.plugins.run_condition.core.AlwaysRun"/></org.jenkins__ci.plugins.run__condition.logic.Not>"#,
);

impl NotCondition {
    const CONDITION: &'static str = "condition";

    /// The negated condition, `None` if its type is not supported.
    pub fn condition(&self) -> Result<Option<Plugin>> {
        container::slot(&self.node, Self::CONDITION)
    }

    pub fn set_condition(&self, condition: &impl PluginHandler) -> Result<()> {
        container::set_slot(&self.node, Self::CONDITION, condition.node())
    }
}
