//! # Deployment Descriptor Schema
//!
//! The shape of a serverless deployment descriptor (`serverless.yml`):
//! service identity, the `aws` provider block, packaging, functions with
//! their events, layers, and raw CloudFormation resources.
//!
//! Sections whose content belongs to other tools (`custom`, most of
//! `resources`) are accepted as free-form dictionaries. Fields that may be
//! written as an unresolved variable reference (`vpc: ${self:custom.vpc}`)
//! accept a string before the object form.
//!
//! ## Defaults
//!
//! Normalization fills the values the framework would assume:
//! `configValidationMode: warn`, `provider.stage: dev`,
//! `provider.region: us-east-1`, `provider.memorySize: 1024`,
//! `provider.timeout: 6`.

use dshape_schema::{FieldConstraint, ObjectSchema, Schema, SchemaDefinitionError, SchemaNode};

use crate::events::event;
use crate::shapes::{
    any_map, closed, flag_or, string_list, string_map, string_or, string_or_intrinsic,
    string_or_list,
};

/// Compile the deployment descriptor schema.
pub fn deployment_schema() -> Result<Schema, SchemaDefinitionError> {
    let schema = Schema::compile(descriptor().into())?;
    tracing::debug!("deployment descriptor schema compiled");
    Ok(schema)
}

/// The root object of a deployment descriptor.
pub fn descriptor() -> ObjectSchema {
    ObjectSchema::new()
        .required(
            "service",
            string_or(
                ObjectSchema::new()
                    .required("name", SchemaNode::string())
                    .optional("awsKmsKeyArn", SchemaNode::string()),
            ),
        )
        .optional("frameworkVersion", SchemaNode::string())
        .defaulted(
            "configValidationMode",
            SchemaNode::enumeration(["error", "warn", "off"]),
            "warn",
        )
        .optional("variablesResolutionMode", SchemaNode::string())
        .optional("useDotenv", SchemaNode::boolean())
        .optional(
            "unresolvedVariablesNotificationMode",
            SchemaNode::enumeration(["error", "warn"]),
        )
        .optional(
            "deprecationNotificationMode",
            SchemaNode::enumeration(["error", "warn", "warn:summary"]),
        )
        .optional("disabledDeprecations", string_list())
        .required("provider", provider().into())
        .optional("package", package().into())
        .optional("functions", SchemaNode::map(function().into()))
        .optional("layers", SchemaNode::map(layer().into()))
        .optional(
            "plugins",
            SchemaNode::union([
                string_list(),
                ObjectSchema::new()
                    .optional("localPath", SchemaNode::string())
                    .required("modules", string_list())
                    .into(),
            ]),
        )
        .optional("custom", any_map())
        .optional("resources", resources().into())
}

/// An IAM policy statement.
fn statement() -> ObjectSchema {
    let actions = SchemaNode::union([SchemaNode::string(), string_list(), any_map()]);
    ObjectSchema::new()
        .required("Effect", SchemaNode::enumeration(["Allow", "Deny"]))
        .optional("Sid", SchemaNode::string())
        .optional("Principal", SchemaNode::union([SchemaNode::string(), any_map()]))
        .optional("Condition", any_map())
        .optional("Action", actions.clone())
        .optional("NotAction", actions.clone())
        .optional("Resource", actions.clone())
        .optional("NotResource", actions)
        .constraint(FieldConstraint::mutually_exclusive(["Action", "NotAction"]))
        .constraint(FieldConstraint::mutually_exclusive(["Resource", "NotResource"]))
}

fn api_key() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("value", SchemaNode::string())
            .optional("description", SchemaNode::string())
            .optional("customerId", SchemaNode::string())
            .optional("enabled", SchemaNode::boolean()),
    )
}

fn usage_plan() -> ObjectSchema {
    ObjectSchema::new()
        .optional(
            "quota",
            ObjectSchema::new()
                .optional("limit", SchemaNode::integer())
                .optional("offset", SchemaNode::integer())
                .optional("period", SchemaNode::string())
                .into(),
        )
        .optional(
            "throttle",
            ObjectSchema::new()
                .optional("burstLimit", SchemaNode::integer())
                .optional("rateLimit", SchemaNode::number())
                .into(),
        )
}

fn api_gateway() -> ObjectSchema {
    ObjectSchema::new()
        .optional("apiKeys", SchemaNode::array(api_key()))
        .optional("restApiId", string_or_intrinsic())
        .optional("restApiRootResourceId", string_or_intrinsic())
        .optional("restApiResources", any_map())
        .optional("websocketApiId", string_or_intrinsic())
        .optional("apiKeySourceType", SchemaNode::enumeration(["HEADER", "AUTHORIZER"]))
        .optional("minimumCompressionSize", SchemaNode::integer())
        .optional("description", SchemaNode::string())
        .optional("binaryMediaTypes", string_list())
        .optional("usagePlan", usage_plan().into())
        .optional("resourcePolicy", SchemaNode::array(statement().into()))
        .optional("shouldStartNameWithService", SchemaNode::boolean())
}

/// ALB listener authorizers, discriminated by their `type`.
fn alb_authorizer() -> SchemaNode {
    let common = || {
        ObjectSchema::new()
            .optional("allowUnauthenticated", SchemaNode::boolean())
            .optional("requestExtraParams", any_map())
            .optional("scope", SchemaNode::string())
            .optional("sessionCookieName", SchemaNode::string())
            .optional("sessionTimeout", SchemaNode::integer())
    };
    let cognito = common().extend(
        ObjectSchema::new()
            .required("type", SchemaNode::enumeration(["cognito"]))
            .required("userPoolArn", string_or_intrinsic())
            .required("userPoolClientId", SchemaNode::string())
            .required("userPoolDomain", SchemaNode::string()),
    );
    let oidc = common().extend(
        ObjectSchema::new()
            .required("type", SchemaNode::enumeration(["oidc"]))
            .required("authorizationEndpoint", SchemaNode::string())
            .required("clientId", SchemaNode::string())
            .optional("clientSecret", SchemaNode::string())
            .optional("useExistingClientSecret", SchemaNode::boolean())
            .required("issuer", SchemaNode::string())
            .required("tokenEndpoint", SchemaNode::string())
            .required("userInfoEndpoint", SchemaNode::string())
            .constraint(FieldConstraint::mutually_exclusive([
                "clientSecret",
                "useExistingClientSecret",
            ])),
    );
    SchemaNode::union([cognito.into(), oidc.into()])
}

fn jwt_authorizer() -> ObjectSchema {
    ObjectSchema::new()
        .required("identitySource", SchemaNode::string())
        .required("issuerUrl", SchemaNode::string())
        .required("audience", string_or_list())
}

/// HTTP API authorizers: JWT, or a Lambda `request` authorizer. The Lambda
/// form is closed so a JWT authorizer can never match it.
fn http_api_authorizer() -> SchemaNode {
    let lambda = ObjectSchema::new()
        .required("type", SchemaNode::enumeration(["request"]))
        .optional("functionName", SchemaNode::string())
        .optional("functionArn", string_or_intrinsic())
        .optional("identitySource", string_or_list())
        .optional("resultTtlInSeconds", SchemaNode::integer())
        .optional("enableSimpleResponses", SchemaNode::boolean())
        .optional("payloadVersion", SchemaNode::enumeration(["1.0", "2.0"]))
        .constraint(FieldConstraint::exactly_one_of(["functionName", "functionArn"]));
    SchemaNode::union([jwt_authorizer().into(), closed(lambda)])
}

fn cors_config() -> SchemaNode {
    flag_or(
        ObjectSchema::new()
            .optional("allowedOrigins", string_list())
            .optional("allowedHeaders", string_list())
            .optional("allowedMethods", string_list())
            .optional("allowCredentials", SchemaNode::boolean())
            .optional("exposedResponseHeaders", string_list())
            .optional("maxAge", SchemaNode::integer()),
    )
}

fn http_api() -> ObjectSchema {
    ObjectSchema::new()
        .optional("id", string_or_intrinsic())
        .optional("name", SchemaNode::string())
        .optional("payload", SchemaNode::string())
        .optional("cors", cors_config())
        .optional("authorizers", SchemaNode::map(http_api_authorizer()))
        .optional("useProviderTags", SchemaNode::boolean())
        .optional("metrics", SchemaNode::boolean())
        .optional("disableDefaultEndpoint", SchemaNode::boolean())
        .optional("shouldStartNameWithService", SchemaNode::boolean())
}

fn deployment_bucket() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("maxPreviousDeploymentArtifacts", SchemaNode::integer())
            .optional("blockPublicAccess", SchemaNode::boolean())
            .optional("serverSideEncryption", SchemaNode::string())
            .optional("skipPolicySetup", SchemaNode::boolean())
            .optional("sseKMSKeyId", SchemaNode::string())
            .optional("sseCustomerAlgorithim", SchemaNode::string())
            .optional("sseCustomerKey", SchemaNode::string())
            .optional("sseCustomerKeyMD5", SchemaNode::string())
            .optional("tags", string_map())
            .constraint(FieldConstraint::requires(
                "sseCustomerKey",
                ["sseCustomerAlgorithim", "sseCustomerKeyMD5"],
            )),
    )
}

fn vpc() -> SchemaNode {
    string_or(
        ObjectSchema::new()
            .required("securityGroupIds", SchemaNode::union([string_list(), any_map()]))
            .required("subnetIds", SchemaNode::union([string_list(), any_map()])),
    )
}

fn logs() -> ObjectSchema {
    let level = SchemaNode::enumeration(["INFO", "ERROR"]);
    ObjectSchema::new()
        .optional(
            "restApi",
            flag_or(
                ObjectSchema::new()
                    .optional("accessLogging", SchemaNode::boolean())
                    .optional("format", SchemaNode::string())
                    .optional("executionLogging", SchemaNode::boolean())
                    .optional("level", level.clone())
                    .optional("fullExecutionData", SchemaNode::boolean())
                    .optional("role", SchemaNode::string())
                    .optional("roleManagedExternally", SchemaNode::boolean()),
            ),
        )
        .optional(
            "websocket",
            flag_or(ObjectSchema::new().optional("level", level)),
        )
        .optional(
            "httpApi",
            flag_or(ObjectSchema::new().optional("format", SchemaNode::string())),
        )
        .optional("frameworkLambda", SchemaNode::boolean())
}

fn iam() -> ObjectSchema {
    let role = string_or(
        ObjectSchema::new()
            .optional("name", SchemaNode::string())
            .optional("path", SchemaNode::string())
            .optional("permissionBoundary", string_or_intrinsic())
            .optional("permissionsBoundary", string_or_intrinsic())
            .optional("managedPolicies", string_list())
            .optional("statements", SchemaNode::array(statement().into()))
            .optional("tags", string_map())
            .constraint(FieldConstraint::mutually_exclusive([
                "permissionBoundary",
                "permissionsBoundary",
            ])),
    );
    ObjectSchema::new()
        .optional("role", role)
        .optional("deploymentRole", SchemaNode::string())
}

fn provider() -> ObjectSchema {
    ObjectSchema::new()
        .required("name", SchemaNode::enumeration(["aws"]))
        .optional("runtime", SchemaNode::string())
        .defaulted("stage", SchemaNode::string(), "dev")
        .defaulted("region", SchemaNode::string(), "us-east-1")
        .optional("stackName", SchemaNode::string())
        .optional("apiName", SchemaNode::string())
        .optional("websocketsApiName", SchemaNode::string())
        .optional("websocketsApiRouteSelectionExpression", SchemaNode::string())
        .optional("profile", SchemaNode::string())
        .defaulted("memorySize", SchemaNode::integer(), 1024)
        .optional("ephemeralStorageSize", SchemaNode::integer())
        .optional("reservedConcurrency", SchemaNode::integer())
        .defaulted("timeout", SchemaNode::integer(), 6)
        .optional("logRetentionInDays", SchemaNode::integer())
        .optional("deploymentBucket", deployment_bucket())
        .optional("deploymentPrefix", SchemaNode::string())
        .optional("role", string_or_intrinsic())
        .optional("rolePermissionsBoundary", string_or_intrinsic())
        .optional("cfnRole", string_or_intrinsic())
        .optional("versionFunctions", SchemaNode::boolean())
        .optional("architecture", SchemaNode::enumeration(["x86_64", "arm64"]))
        .optional("environment", environment())
        .optional(
            "endpointType",
            SchemaNode::enumeration(["regional", "edge", "private", "REGIONAL", "EDGE", "PRIVATE"]),
        )
        .optional("apiKeys", SchemaNode::array(api_key()))
        .optional("apiGateway", api_gateway().into())
        .optional(
            "alb",
            ObjectSchema::new()
                .optional("targetGroupPrefix", SchemaNode::string())
                .optional("authorizers", SchemaNode::map(alb_authorizer()))
                .into(),
        )
        .optional("httpApi", http_api().into())
        .optional("usagePlan", usage_plan().into())
        .optional("stackTags", string_map())
        .optional("iam", iam().into())
        .optional("iamManagedPolicies", string_list())
        .optional("iamRoleStatements", SchemaNode::array(statement().into()))
        .optional("stackPolicy", SchemaNode::array(statement().into()))
        .optional("vpc", vpc())
        .optional("notificationArns", string_list())
        .optional(
            "stackParameters",
            SchemaNode::array(closed(
                ObjectSchema::new()
                    .required("ParameterKey", SchemaNode::string())
                    .required("ParameterValue", SchemaNode::string()),
            )),
        )
        .optional("resourcePolicy", SchemaNode::array(statement().into()))
        .optional(
            "rollbackConfiguration",
            ObjectSchema::new()
                .optional("MonitoringTimeInMinutes", SchemaNode::integer())
                .optional(
                    "RollbackTriggers",
                    SchemaNode::array(
                        ObjectSchema::new()
                            .required("Arn", SchemaNode::string())
                            .required("Type", SchemaNode::string())
                            .into(),
                    ),
                )
                .into(),
        )
        .optional("tags", string_map())
        .optional(
            "tracing",
            ObjectSchema::new()
                .optional("apiGateway", SchemaNode::boolean())
                .optional("lambda", tracing_mode())
                .into(),
        )
        .optional("logs", logs().into())
        .optional(
            "eventBridge",
            ObjectSchema::new()
                .optional("useCloudFormation", SchemaNode::boolean())
                .into(),
        )
        .optional("layers", SchemaNode::array(string_or_intrinsic()))
}

/// Lambda X-Ray tracing: a switch or an explicit mode.
fn tracing_mode() -> SchemaNode {
    SchemaNode::union([
        SchemaNode::boolean(),
        SchemaNode::enumeration(["Active", "PassThrough"]),
    ])
}

/// Environment variables: literals or intrinsic functions.
fn environment() -> SchemaNode {
    SchemaNode::map(SchemaNode::union([
        SchemaNode::string(),
        SchemaNode::number(),
        SchemaNode::boolean(),
        any_map(),
    ]))
}

fn package() -> ObjectSchema {
    ObjectSchema::new()
        .optional("include", string_list())
        .optional("exclude", string_list())
        .optional("patterns", string_list())
        .optional("excludeDevDependencies", SchemaNode::boolean())
        .optional("artifact", SchemaNode::string())
        .optional("individually", SchemaNode::boolean())
}

/// One entry of `functions`.
pub fn function() -> ObjectSchema {
    let url = flag_or(
        ObjectSchema::new()
            .optional("cors", cors_config())
            .optional("authorizer", SchemaNode::enumeration(["aws_iam"]))
            .optional("invokeMode", SchemaNode::enumeration(["BUFFERED", "RESPONSE_STREAM"])),
    );
    ObjectSchema::new()
        .required("handler", SchemaNode::string())
        .optional("architecture", SchemaNode::enumeration(["x86_64", "arm64"]))
        .optional("name", SchemaNode::string())
        .optional("description", SchemaNode::string())
        .optional("memorySize", SchemaNode::integer())
        .optional("ephemeralStorageSize", SchemaNode::integer())
        .optional("reservedConcurrency", SchemaNode::integer())
        .optional("provisionedConcurrency", SchemaNode::integer())
        .optional("runtime", SchemaNode::string())
        .optional("timeout", SchemaNode::integer())
        .optional("role", string_or_intrinsic())
        .optional("onError", SchemaNode::string())
        .optional("awsKmsKeyArn", SchemaNode::string())
        .optional("environment", environment())
        .optional("tags", string_map())
        .optional("vpc", vpc())
        .optional("package", package().into())
        .optional("layers", SchemaNode::array(string_or_intrinsic()))
        .optional("tracing", tracing_mode())
        .optional("condition", SchemaNode::string())
        .optional("dependsOn", string_or_list())
        .optional(
            "destinations",
            ObjectSchema::new()
                .optional("onSuccess", string_or_intrinsic())
                .optional("onFailure", string_or_intrinsic())
                .into(),
        )
        .optional("url", url)
        .optional("events", SchemaNode::array(event()))
}

fn layer() -> ObjectSchema {
    ObjectSchema::new()
        .optional("path", SchemaNode::string())
        .optional("package", package().into())
        .optional("name", SchemaNode::string())
        .optional("description", SchemaNode::string())
        .optional("compatibleRuntimes", string_list())
        .optional("compatibleArchitectures", string_list())
        .optional("licenseInfo", SchemaNode::string())
        .optional("allowedAccounts", string_list())
        .optional("retain", SchemaNode::boolean())
        .constraint(FieldConstraint::at_least_one_of(["path", "package"]))
}

/// `resources`: a CloudFormation template fragment.
fn resources() -> ObjectSchema {
    let resource = ObjectSchema::new()
        .required("Type", SchemaNode::string())
        .optional("Condition", SchemaNode::string())
        .optional("Properties", any_map())
        .optional("DependsOn", string_or_list())
        .optional("DeletionPolicy", SchemaNode::string())
        .optional("UpdateReplacePolicy", SchemaNode::string())
        .optional("Metadata", any_map());
    let extension = resource.clone().extend(
        ObjectSchema::new().optional("Type", SchemaNode::string()),
    );
    let output = ObjectSchema::new()
        .optional("Description", SchemaNode::string())
        .optional("Value", SchemaNode::any())
        .optional(
            "Export",
            ObjectSchema::new().required("Name", SchemaNode::any()).into(),
        )
        .optional("Condition", SchemaNode::string());
    ObjectSchema::new()
        .optional("Description", SchemaNode::string())
        .optional("Conditions", any_map())
        .optional("Resources", SchemaNode::map(resource.into()))
        .optional("extensions", SchemaNode::map(extension.into()))
        .optional("Outputs", SchemaNode::map(output.into()))
}
