//! Macro for declaring a model's schema configuration inline

/// Build a [`SchemaConfig`](crate::config::SchemaConfig) from attribute
/// entries
///
/// Each option is a builder method of
/// [`AttributeConfig`](crate::config::AttributeConfig), called with the
/// given value. An empty entry opts a relation in without changing
/// anything else.
///
/// # Example
/// ```rust,ignore
/// let config = schema_config! {
///     "read_only_field" => { readonly: true },
///     "field_with_range" => { validator: Constraint::range(1, 99) },
///     "whitelisted_relation" => {},
///     "not_nullable_relation" => { nullable: false },
/// };
/// ```
#[macro_export]
macro_rules! schema_config {
    () => {
        $crate::config::SchemaConfig::new()
    };
    ($($field:literal => { $($option:ident : $value:expr),* $(,)? }),+ $(,)?) => {{
        let mut config = $crate::config::SchemaConfig::new();
        $(
            config.insert(
                $field,
                $crate::config::AttributeConfig::new()$(.$option($value))*,
            );
        )+
        config
    }};
}

#[cfg(test)]
mod tests {
    use crate::core::validation::Constraint;

    #[test]
    fn test_empty_config() {
        let config = schema_config!();
        assert!(config.is_empty());
    }

    #[test]
    fn test_entries_and_options() {
        let config = schema_config! {
            "read_only_field" => { readonly: true },
            "field_with_range" => { validator: Constraint::range(1, 99) },
            "relation" => {},
            "strict_relation" => { nullable: false, readonly: false },
        };

        assert_eq!(
            config.names().collect::<Vec<_>>(),
            vec!["read_only_field", "field_with_range", "relation", "strict_relation"]
        );
        assert!(config.is_readonly("read_only_field"));
        assert!(matches!(
            config.validator("field_with_range"),
            Some(Constraint::Range { .. })
        ));
        assert!(config.is_nullable("relation"));
        assert!(!config.is_nullable("strict_relation"));
    }
}
