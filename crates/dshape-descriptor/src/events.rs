//! # Function Events
//!
//! Each entry of a function's `events` list is a single-key object naming
//! the event source: `{ http: ... }`, `{ sqs: ... }` and so on. The entry is
//! a union of one closed wrapper per source, so an unknown source or two
//! sources in one entry is reported as an exhausted union listing every
//! source that was tried.
//!
//! Most sources accept a string shorthand (an ARN, a `"METHOD path"`
//! route, a schedule expression) before the full object form.

use dshape_schema::{FieldConstraint, ObjectSchema, SchemaNode, TupleSchema};

use crate::shapes::{
    any_map, closed, flag_or, string_list, string_map, string_or, string_or_intrinsic,
    string_or_list, wrapper,
};

/// HTTP methods accepted by REST API events.
pub const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options", "any"];

/// Comparison operators of a numeric filter.
const NUMERIC_OPERATORS: &[&str] = &["=", "<", "<=", ">", ">="];

/// Every event source name, in the order the union tries them.
pub const EVENT_SOURCES: &[&str] = &[
    "http",
    "httpApi",
    "websocket",
    "s3",
    "schedule",
    "sns",
    "sqs",
    "stream",
    "activemq",
    "rabbitmq",
    "msk",
    "kafka",
    "alexaSkill",
    "alexaSmartHome",
    "iot",
    "cloudwatchEvent",
    "cloudwatchLog",
    "cognitoUserPool",
    "alb",
    "eventBridge",
    "cloudFront",
];

/// One entry of a function's `events` list.
pub fn event() -> SchemaNode {
    SchemaNode::union(EVENT_SOURCES.iter().map(|source| wrapper(source, source_node(source))))
}

fn source_node(source: &str) -> SchemaNode {
    match source {
        "http" => http(),
        "httpApi" => http_api(),
        "websocket" => websocket(),
        "s3" => s3(),
        "schedule" => schedule(),
        "sns" => sns(),
        "sqs" => sqs(),
        "stream" => stream(),
        "activemq" | "rabbitmq" => broker(),
        "msk" => msk(),
        "kafka" => kafka(),
        "alexaSkill" | "alexaSmartHome" => alexa(),
        "iot" => iot(),
        "cloudwatchEvent" => cloudwatch_event(),
        "cloudwatchLog" => cloudwatch_log(),
        "cognitoUserPool" => cognito_user_pool(),
        "alb" => alb(),
        "eventBridge" => event_bridge(),
        _ => cloud_front(),
    }
}

/// REST API event: `"GET /users"` or the object form.
pub fn http() -> SchemaNode {
    let cors = flag_or(
        ObjectSchema::new()
            .optional("origin", SchemaNode::string())
            .optional("origins", string_list())
            .optional("headers", string_list())
            .optional("allowCredentials", SchemaNode::boolean())
            .optional("cacheControl", SchemaNode::string())
            .optional("maxAge", SchemaNode::integer())
            .constraint(FieldConstraint::mutually_exclusive(["origin", "origins"])),
    );
    let authorizer = string_or(
        ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("arn", string_or_intrinsic())
            .optional("resultTtlInSeconds", SchemaNode::integer())
            .optional("identitySource", SchemaNode::string())
            .optional("identityValidationExpression", SchemaNode::string())
            .optional("type", SchemaNode::string())
            .optional("scopes", string_list())
            .constraint(FieldConstraint::exactly_one_of(["name", "arn"])),
    );
    let parameters = SchemaNode::map(flag_or(
        ObjectSchema::new()
            .optional("required", SchemaNode::boolean())
            .optional("mappedValue", SchemaNode::string()),
    ));
    let request = ObjectSchema::new()
        .optional(
            "parameters",
            ObjectSchema::new()
                .optional("querystrings", parameters.clone())
                .optional("headers", parameters.clone())
                .optional("paths", parameters)
                .into(),
        )
        .optional("schemas", any_map())
        .optional("template", string_map())
        .optional(
            "passThrough",
            SchemaNode::enumeration(["NEVER", "WHEN_NO_MATCH", "WHEN_NO_TEMPLATES"]),
        );

    string_or(
        ObjectSchema::new()
            .required("path", SchemaNode::string())
            .required("method", SchemaNode::enumeration(HTTP_METHODS.iter().copied()))
            .optional("cors", cors)
            .optional("async", SchemaNode::boolean())
            .optional("private", SchemaNode::boolean())
            .optional("authorizer", authorizer)
            .optional("request", request.into())
            .optional(
                "integration",
                SchemaNode::enumeration(["lambda", "lambda-proxy", "aws", "aws_proxy", "http", "http-proxy", "mock"]),
            )
            .optional("operationId", SchemaNode::string()),
    )
}

/// HTTP API event: `"*"`, `"GET /users"` or the object form.
pub fn http_api() -> SchemaNode {
    let authorizer = string_or(
        ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("id", string_or_intrinsic())
            .optional("scopes", string_list())
            .constraint(FieldConstraint::exactly_one_of(["name", "id"])),
    );
    string_or(
        ObjectSchema::new()
            .required("path", SchemaNode::string())
            .optional("method", SchemaNode::string())
            .optional("authorizer", authorizer),
    )
}

fn websocket() -> SchemaNode {
    let authorizer = string_or(
        ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("arn", string_or_intrinsic())
            .optional("identitySource", string_or_list())
            .constraint(FieldConstraint::exactly_one_of(["name", "arn"])),
    );
    string_or(
        ObjectSchema::new()
            .required("route", SchemaNode::string())
            .optional("routeResponseSelectionExpression", SchemaNode::string())
            .optional("authorizer", authorizer),
    )
}

fn s3() -> SchemaNode {
    let rule = closed(
        ObjectSchema::new()
            .optional("prefix", SchemaNode::string())
            .optional("suffix", SchemaNode::string())
            .constraint(FieldConstraint::at_least_one_of(["prefix", "suffix"])),
    );
    string_or(
        ObjectSchema::new()
            .required("bucket", string_or_intrinsic())
            .optional("event", SchemaNode::string())
            .optional("rules", SchemaNode::array(rule))
            .defaulted("existing", SchemaNode::boolean(), false)
            .optional("forceDeploy", SchemaNode::boolean()),
    )
}

/// Fields shared by rule-based triggers that can reshape their payload.
fn input_fields(object: ObjectSchema) -> ObjectSchema {
    object
        .optional("input", SchemaNode::union([SchemaNode::string(), any_map()]))
        .optional("inputPath", SchemaNode::string())
        .optional(
            "inputTransformer",
            ObjectSchema::new()
                .optional("inputPathsMap", string_map())
                .required("inputTemplate", SchemaNode::string())
                .into(),
        )
        .constraint(FieldConstraint::mutually_exclusive(["input", "inputPath", "inputTransformer"]))
}

fn schedule() -> SchemaNode {
    string_or(input_fields(
        ObjectSchema::new()
            .required("rate", string_or_list())
            .defaulted("enabled", SchemaNode::boolean(), true)
            .optional("name", SchemaNode::string())
            .optional("description", SchemaNode::string()),
    ))
}

fn sns() -> SchemaNode {
    let redrive = ObjectSchema::new()
        .optional("deadLetterTargetArn", SchemaNode::string())
        .optional("deadLetterTargetRef", SchemaNode::string())
        .optional(
            "deadLetterTargetImport",
            ObjectSchema::new()
                .required("arn", SchemaNode::string())
                .required("url", SchemaNode::string())
                .into(),
        )
        .constraint(FieldConstraint::exactly_one_of([
            "deadLetterTargetArn",
            "deadLetterTargetRef",
            "deadLetterTargetImport",
        ]));
    string_or(
        ObjectSchema::new()
            .optional("arn", string_or_intrinsic())
            .optional("topicName", SchemaNode::string())
            .optional("displayName", SchemaNode::string())
            .optional("filterPolicy", any_map())
            .optional(
                "filterPolicyScope",
                SchemaNode::enumeration(["MessageAttributes", "MessageBody"]),
            )
            .optional("redrivePolicy", redrive.into())
            .constraint(FieldConstraint::at_least_one_of(["arn", "topicName"])),
    )
}

/// One element of an event filter: a literal or a content matcher.
fn filter_matcher() -> SchemaNode {
    let numeric = TupleSchema::new([SchemaNode::enumeration(NUMERIC_OPERATORS.iter().copied())])
        .rest(SchemaNode::union([
            SchemaNode::number(),
            SchemaNode::enumeration(NUMERIC_OPERATORS.iter().copied()),
        ]))
        .min_len(2);
    SchemaNode::union([
        SchemaNode::string(),
        SchemaNode::number(),
        SchemaNode::boolean(),
        SchemaNode::enumeration([serde_json::Value::Null]),
        wrapper("anything-but", SchemaNode::any()),
        wrapper("numeric", numeric.into()),
        wrapper("exists", SchemaNode::boolean()),
        wrapper("prefix", SchemaNode::string()),
        wrapper("suffix", SchemaNode::string()),
    ])
}

/// `filterPatterns`: a list of `{ field: [matcher, ...] }` objects.
pub fn filter_patterns() -> SchemaNode {
    SchemaNode::array(SchemaNode::map(SchemaNode::array(filter_matcher())))
}

fn sqs() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .required("arn", string_or_intrinsic())
            .optional("batchSize", SchemaNode::integer())
            .optional("maximumBatchingWindow", SchemaNode::integer())
            .optional("maximumConcurrency", SchemaNode::integer())
            .optional("enabled", SchemaNode::boolean())
            .optional(
                "functionResponseType",
                SchemaNode::enumeration(["ReportBatchItemFailures"]),
            )
            .optional("filterPatterns", filter_patterns()),
    )
}

fn stream() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .required("arn", string_or_intrinsic())
            .optional("type", SchemaNode::enumeration(["dynamodb", "kinesis"]))
            .optional("batchSize", SchemaNode::integer())
            .optional(
                "startingPosition",
                SchemaNode::union([
                    SchemaNode::enumeration(["LATEST", "TRIM_HORIZON", "AT_TIMESTAMP"]),
                    SchemaNode::integer(),
                ]),
            )
            .optional("startingPositionTimestamp", SchemaNode::number())
            .optional("enabled", SchemaNode::boolean())
            .optional("filterPatterns", filter_patterns())
            .optional(
                "functionResponseType",
                SchemaNode::enumeration(["ReportBatchItemFailures"]),
            )
            .optional("parallelizationFactor", SchemaNode::integer())
            .optional("maximumRetryAttempts", SchemaNode::integer())
            .optional("bisectBatchOnFunctionError", SchemaNode::boolean())
            .optional(
                "destinations",
                ObjectSchema::new()
                    .required("onFailure", string_or_intrinsic())
                    .into(),
            )
            .constraint(FieldConstraint::required_if(
                "startingPositionTimestamp",
                "startingPosition",
                "AT_TIMESTAMP",
            )),
    )
}

fn broker() -> SchemaNode {
    ObjectSchema::new()
        .required("arn", string_or_intrinsic())
        .required("basicAuthArn", string_or_intrinsic())
        .required("queue", SchemaNode::string())
        .optional("batchSize", SchemaNode::integer())
        .optional("maximumBatchingWindow", SchemaNode::integer())
        .optional("enabled", SchemaNode::boolean())
        .into()
}

fn msk() -> SchemaNode {
    ObjectSchema::new()
        .required("arn", string_or_intrinsic())
        .required("topic", SchemaNode::string())
        .optional("batchSize", SchemaNode::integer())
        .optional("maximumBatchingWindow", SchemaNode::integer())
        .optional("startingPosition", SchemaNode::enumeration(["LATEST", "TRIM_HORIZON"]))
        .optional("enabled", SchemaNode::boolean())
        .optional("saslScram512", SchemaNode::string())
        .into()
}

fn kafka() -> SchemaNode {
    ObjectSchema::new()
        .required("accessConfigurations", any_map())
        .required("bootstrapServers", string_list())
        .required("topic", SchemaNode::string())
        .optional("batchSize", SchemaNode::integer())
        .optional("maximumBatchingWindow", SchemaNode::integer())
        .optional("startingPosition", SchemaNode::enumeration(["LATEST", "TRIM_HORIZON"]))
        .optional("enabled", SchemaNode::boolean())
        .optional("consumerGroupId", SchemaNode::string())
        .into()
}

fn alexa() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .required("appId", SchemaNode::string())
            .defaulted("enabled", SchemaNode::boolean(), true),
    )
}

fn iot() -> SchemaNode {
    ObjectSchema::new()
        .required("sql", SchemaNode::string())
        .optional("sqlVersion", SchemaNode::string())
        .optional("name", SchemaNode::string())
        .optional("description", SchemaNode::string())
        .optional("enabled", SchemaNode::boolean())
        .into()
}

fn cloudwatch_event() -> SchemaNode {
    input_fields(
        ObjectSchema::new()
            .optional("event", any_map())
            .optional("name", SchemaNode::string())
            .optional("description", SchemaNode::string())
            .optional("enabled", SchemaNode::boolean()),
    )
    .into()
}

fn cloudwatch_log() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .required("logGroup", SchemaNode::string())
            .optional("filter", SchemaNode::string()),
    )
}

fn cognito_user_pool() -> SchemaNode {
    ObjectSchema::new()
        .required("pool", SchemaNode::string())
        .required(
            "trigger",
            SchemaNode::enumeration([
                "PreSignUp",
                "PostConfirmation",
                "PreAuthentication",
                "PostAuthentication",
                "PreTokenGeneration",
                "CustomMessage",
                "DefineAuthChallenge",
                "CreateAuthChallenge",
                "VerifyAuthChallengeResponse",
                "UserMigration",
                "CustomSMSSender",
                "CustomEmailSender",
            ]),
        )
        .defaulted("existing", SchemaNode::boolean(), false)
        .optional("forceDeploy", SchemaNode::boolean())
        .into()
}

fn alb() -> SchemaNode {
    let conditions = ObjectSchema::new()
        .optional("host", string_or_list())
        .optional("path", string_or_list())
        .optional("method", string_or_list())
        .optional(
            "header",
            ObjectSchema::new()
                .required("name", SchemaNode::string())
                .required("values", string_list())
                .into(),
        )
        .optional("query", string_map())
        .optional("ip", string_list());
    ObjectSchema::new()
        .required("listenerArn", string_or_intrinsic())
        .required("priority", SchemaNode::integer())
        .required("conditions", conditions.into())
        .optional("healthCheck", flag_or(health_check()))
        .optional("multiValueHeaders", SchemaNode::boolean())
        .optional("authorizer", string_or_list())
        .into()
}

fn health_check() -> ObjectSchema {
    ObjectSchema::new()
        .optional("path", SchemaNode::string())
        .optional("intervalSeconds", SchemaNode::integer())
        .optional("timeoutSeconds", SchemaNode::integer())
        .optional("healthyThresholdCount", SchemaNode::integer())
        .optional("unhealthyThresholdCount", SchemaNode::integer())
        .optional("matcher", any_map())
}

fn event_bridge() -> SchemaNode {
    input_fields(
        ObjectSchema::new()
            .optional("schedule", SchemaNode::string())
            .optional("eventBus", string_or_intrinsic())
            .optional("pattern", any_map())
            .optional("name", SchemaNode::string())
            .optional("enabled", SchemaNode::boolean())
            .constraint(FieldConstraint::at_least_one_of(["schedule", "pattern"])),
    )
    .into()
}

fn cloud_front() -> SchemaNode {
    ObjectSchema::new()
        .required(
            "eventType",
            SchemaNode::enumeration([
                "viewer-request",
                "origin-request",
                "origin-response",
                "viewer-response",
            ]),
        )
        .optional("origin", SchemaNode::union([SchemaNode::string(), any_map()]))
        .optional("includeBody", SchemaNode::boolean())
        .optional("pathPattern", SchemaNode::string())
        .optional("isDefaultOrigin", SchemaNode::boolean())
        .optional("behavior", any_map())
        .into()
}
