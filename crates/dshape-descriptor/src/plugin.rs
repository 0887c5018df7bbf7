//! # Plugin Command Schema
//!
//! The declaration a framework plugin makes of the CLI commands it adds:
//!
//! ```yaml
//! commands:
//!   deploy:
//!     usage: Deploy the service
//!     lifecycleEvents: [package, deploy]
//!     options:
//!       stage: { usage: Target stage, shortcut: s, type: string }
//!     commands:
//!       function:
//!         usage: Deploy a single function
//!         lifecycleEvents: [deploy]
//! ```
//!
//! Commands nest. Schema nodes are trees, so nesting is unrolled to
//! [`MAX_COMMAND_DEPTH`] levels; deeper `commands` keys are undeclared.

use dshape_schema::{ObjectSchema, Schema, SchemaDefinitionError, SchemaNode};

use crate::shapes::{string_list, string_map};

/// Levels of nested `commands` the schema describes.
pub const MAX_COMMAND_DEPTH: usize = 4;

/// Compile the plugin command schema.
pub fn plugin_schema() -> Result<Schema, SchemaDefinitionError> {
    let root = ObjectSchema::new()
        .optional("commands", SchemaNode::map(command(MAX_COMMAND_DEPTH).into()))
        .optional("provider", SchemaNode::string())
        .optional("hooks", string_map());
    let schema = Schema::compile(root.into())?;
    tracing::debug!(depth = MAX_COMMAND_DEPTH, "plugin command schema compiled");
    Ok(schema)
}

fn option() -> ObjectSchema {
    ObjectSchema::new()
        .optional("usage", SchemaNode::string())
        .defaulted("required", SchemaNode::boolean(), false)
        .optional("shortcut", SchemaNode::string())
        .optional(
            "type",
            SchemaNode::enumeration(["string", "boolean", "multiple"]),
        )
        .optional(
            "default",
            SchemaNode::union([
                SchemaNode::string(),
                SchemaNode::boolean(),
                string_list(),
            ]),
        )
}

/// A command with `depth` levels of subcommands below it.
fn command(depth: usize) -> ObjectSchema {
    let object = ObjectSchema::new()
        .optional("usage", SchemaNode::string())
        .optional("lifecycleEvents", string_list())
        .optional("options", SchemaNode::map(option().into()))
        .optional(
            "type",
            SchemaNode::enumeration(["entrypoint", "container"]),
        )
        .optional("groupName", SchemaNode::string());
    if depth > 1 {
        object.optional("commands", SchemaNode::map(command(depth - 1).into()))
    } else {
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dshape_schema::ViolationKind;
    use serde_json::json;

    #[test]
    fn option_required_defaults_to_false() {
        let doc = json!({"commands": {"command": {
            "usage": "description",
            "lifecycleEvents": ["start"],
            "options": {"option": {"usage": "description", "shortcut": "o",
                                    "type": "multiple", "default": ["value1", "value2"]}}
        }}});
        let result = plugin_schema().unwrap().validate(&doc);
        let normalized = result.document().unwrap();
        assert_eq!(
            normalized["commands"]["command"]["options"]["option"]["required"],
            json!(false)
        );
    }

    #[test]
    fn option_type_is_checked() {
        let doc = json!({"commands": {"c": {"options": {"o": {"type": "number"}}}}});
        let result = plugin_schema().unwrap().validate(&doc);
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].kind, ViolationKind::EnumMismatch);
        assert_eq!(
            result.violations()[0].path.to_string(),
            ".commands.c.options.o.type"
        );
    }

    #[test]
    fn nested_commands_are_checked() {
        let doc = json!({"commands": {"deploy": {"commands": {"function": {
            "lifecycleEvents": "deploy"
        }}}}});
        let result = plugin_schema().unwrap().validate(&doc);
        assert_eq!(
            result.violations()[0].path.to_string(),
            ".commands.deploy.commands.function.lifecycleEvents"
        );
    }
}
