//! Small node builders shared by the descriptor schemas.

use dshape_schema::{ObjectSchema, SchemaNode, UnknownFields};

/// A string or a list of strings.
pub(crate) fn string_or_list() -> SchemaNode {
    SchemaNode::union([SchemaNode::string(), SchemaNode::array(SchemaNode::string())])
}

/// A list of strings.
pub(crate) fn string_list() -> SchemaNode {
    SchemaNode::array(SchemaNode::string())
}

/// A `name -> string` dictionary, as used for tags.
pub(crate) fn string_map() -> SchemaNode {
    SchemaNode::map(SchemaNode::string())
}

/// A dictionary of arbitrary values.
pub(crate) fn any_map() -> SchemaNode {
    SchemaNode::map(SchemaNode::any())
}

/// A literal string, or a CloudFormation intrinsic such as
/// `{ "Fn::GetAtt": [...] }` or `{ "Ref": ... }`.
pub(crate) fn string_or_intrinsic() -> SchemaNode {
    SchemaNode::union([SchemaNode::string(), any_map()])
}

/// An object that rejects keys it does not declare.
pub(crate) fn closed(object: ObjectSchema) -> SchemaNode {
    object.unknown_fields(UnknownFields::Deny).into()
}

/// `{ <key>: <node> }` and nothing else.
pub(crate) fn wrapper(key: &str, node: SchemaNode) -> SchemaNode {
    closed(ObjectSchema::new().required(key, node))
}

/// A string shorthand or the full object form.
pub(crate) fn string_or(object: ObjectSchema) -> SchemaNode {
    SchemaNode::union([SchemaNode::string(), object.into()])
}

/// A boolean switch or the full object form.
pub(crate) fn flag_or(object: ObjectSchema) -> SchemaNode {
    SchemaNode::union([SchemaNode::boolean(), object.into()])
}
