//! Tool Definition Macros
//!
//! Simplifies metadata for tools with fixed, hand-written parameter sets

/// Define tool metadata using a declarative syntax
///
/// # Example
/// ```
/// use skychat::tool_metadata;
///
/// let metadata = tool_metadata! {
///     name: "compose_email",
///     description: "Draft an email for the user to review",
///     parameters: [
///         {
///             name: "to",
///             type: "string",
///             description: "Recipient address",
///             required: true
///         },
///         {
///             name: "subject",
///             type: "string",
///             description: "Subject line",
///             required: true
///         }
///     ]
/// };
/// assert_eq!(metadata.parameters.len(), 2);
/// ```
#[macro_export]
macro_rules! tool_metadata {
    (
        name: $name:expr,
        description: $description:expr,
        parameters: [
            $(
                {
                    name: $param_name:expr,
                    type: $param_type:expr,
                    description: $param_desc:expr,
                    required: $param_required:expr
                }
            ),* $(,)?
        ]
    ) => {
        $crate::tools::ToolMetadata {
            name: $name.to_string(),
            description: $description.to_string(),
            parameters: vec![
                $(
                    $crate::tools::ToolParameter {
                        name: $param_name.to_string(),
                        param_type: $param_type.to_string(),
                        description: $param_desc.to_string(),
                        required: $param_required,
                        enum_values: None,
                        items_type: None,
                    }
                ),*
            ],
        }
    };
}

/// Validate required string parameter
#[macro_export]
macro_rules! validate_required_string {
    ($args:expr, $param:expr) => {
        $args[$param].as_str().ok_or_else(|| {
            anyhow::anyhow!("'{}' parameter is required and must be a string", $param)
        })?
    };
}
