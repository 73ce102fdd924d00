//! Parsing of `<component>` elements into definition holders.

use std::sync::Arc;

use roxmltree::Node;

use super::delegate::{parse_bool, ParserDelegate};
use crate::config::{
    tokenize, ABSTRACT_ATTRIBUTE, AUTOWIRE_ATTRIBUTE, CLASS_ATTRIBUTE, COMPONENT_REF_ATTRIBUTE,
    CONSTRUCTOR_ARG_ELEMENT, DEFAULT_SCOPE, DEFAULT_VALUE, DEPENDS_ON_ATTRIBUTE,
    DESCRIPTION_ELEMENT, DESTROY_METHOD_ATTRIBUTE, GENERATED_NAME_SEPARATOR, ID_ATTRIBUTE,
    INDEX_ATTRIBUTE, INIT_METHOD_ATTRIBUTE, LAZY_INIT_ATTRIBUTE, NAME_ATTRIBUTE,
    PARENT_ATTRIBUTE, PRIMARY_ATTRIBUTE, PROPERTY_ELEMENT, REF_ATTRIBUTE, REF_ELEMENT,
    SCOPE_ATTRIBUTE, VALUE_ATTRIBUTE, VALUE_ELEMENT,
};
use crate::definition::{
    AutowireMode, ComponentDefinition, ConstructorArg, DefinitionHolder, DefinitionRegistry,
    PropertyValue, Value,
};
use crate::error::ProblemKind;
use crate::reader::ParsingContext;
use crate::xml::{
    element_children, find_child, find_children, get_attribute, get_tag_name, get_text,
    get_text_attribute, is_default_namespace,
};

/// Separator used when a generated name is derived from a parent name.
const CHILD_SUFFIX: &str = "$child";

/// Turns a `<component>` element into a [`DefinitionHolder`].
pub trait DefinitionParser: Send + Sync {
    /// Parse one element.
    ///
    /// Problems are reported through the context; `None` means the element
    /// produced nothing to register.
    fn parse_component(
        &self,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
        delegate: &mut ParserDelegate,
    ) -> Option<DefinitionHolder>;
}

/// Parser for the built-in component vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDefinitionParser;

impl DefinitionParser for DefaultDefinitionParser {
    fn parse_component(
        &self,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
        delegate: &mut ParserDelegate,
    ) -> Option<DefinitionHolder> {
        let id = get_text_attribute(node, ID_ATTRIBUTE);
        let mut aliases = get_attribute(node, NAME_ATTRIBUTE)
            .map(tokenize)
            .unwrap_or_default();

        let mut name = id.map(String::from);
        if name.is_none() && !aliases.is_empty() {
            let first = aliases.remove(0);
            tracing::debug!(
                name = %first,
                aliases = ?aliases,
                "No 'id' specified, using first 'name' as component name"
            );
            name = Some(first);
        }

        if let Some(name) = &name {
            if let Some(used) = delegate.find_used_name(name, &aliases) {
                context.error(
                    ProblemKind::Validation,
                    format!("Component name '{used}' is already used in this <components> element"),
                    node,
                );
                return None;
            }
            delegate.mark_used(name, &aliases);
        }

        let definition = parse_definition(node, context, delegate)?;

        let name = match name {
            Some(name) => name,
            None => {
                let generated = generate_name(&definition, context.registry());
                if let Some(class_name) = &definition.class_name {
                    // First instance of a class is also reachable by the bare class name.
                    if generated.starts_with(class_name.as_str())
                        && generated.len() > class_name.len()
                        && !context.registry().is_name_in_use(class_name)
                    {
                        aliases.push(class_name.clone());
                    }
                }
                tracing::debug!(
                    name = %generated,
                    "Neither 'id' nor 'name' specified, using generated name"
                );
                generated
            }
        };

        let holder = DefinitionHolder::new(name, Arc::new(definition));
        Some(holder.with_aliases(aliases))
    }
}

/// Generate a name unique in the registry: `class#N`, or `parent$child#N`.
fn generate_name(definition: &ComponentDefinition, registry: &dyn DefinitionRegistry) -> String {
    let base = match (&definition.class_name, &definition.parent_name) {
        (Some(class_name), _) => class_name.clone(),
        (None, Some(parent)) => format!("{parent}{CHILD_SUFFIX}"),
        (None, None) => String::new(),
    };
    let mut counter = 0usize;
    loop {
        let candidate = format!("{base}{GENERATED_NAME_SEPARATOR}{counter}");
        if !registry.is_name_in_use(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn parse_definition(
    node: Node<'_, '_>,
    context: &mut ParsingContext<'_>,
    delegate: &ParserDelegate,
) -> Option<ComponentDefinition> {
    let class_name = get_text_attribute(node, CLASS_ATTRIBUTE).map(String::from);
    let parent_name = get_text_attribute(node, PARENT_ATTRIBUTE).map(String::from);
    if class_name.is_none() && parent_name.is_none() {
        context.error(
            ProblemKind::Validation,
            "Component definition must specify a 'class' or a 'parent' attribute",
            node,
        );
        return None;
    }

    let defaults = delegate.defaults();
    let mut definition = ComponentDefinition {
        class_name,
        parent_name,
        scope: get_text_attribute(node, SCOPE_ATTRIBUTE)
            .unwrap_or(DEFAULT_SCOPE)
            .to_string(),
        lazy_init: defaults.lazy_init,
        autowire: defaults.autowire,
        init_method: defaults.init_method.clone(),
        destroy_method: defaults.destroy_method.clone(),
        source: Some(context.resource().description()),
        ..ComponentDefinition::default()
    };

    if let Some(value) = boolean_attribute(node, ABSTRACT_ATTRIBUTE, context) {
        definition.is_abstract = value;
    }
    if let Some(value) = boolean_attribute(node, LAZY_INIT_ATTRIBUTE, context) {
        definition.lazy_init = value;
    }
    if let Some(value) = boolean_attribute(node, PRIMARY_ATTRIBUTE, context) {
        definition.primary = value;
    }

    if let Some(value) = non_default_attribute(node, AUTOWIRE_ATTRIBUTE) {
        match AutowireMode::parse(value) {
            Some(mode) => definition.autowire = mode,
            None => context.error(
                ProblemKind::Validation,
                format!("Invalid value '{value}' for attribute '{AUTOWIRE_ATTRIBUTE}'"),
                node,
            ),
        }
    }

    if let Some(depends_on) = get_attribute(node, DEPENDS_ON_ATTRIBUTE) {
        definition.depends_on = tokenize(depends_on);
    }

    // An explicit empty value switches an inherited default off.
    if let Some(value) = get_attribute(node, INIT_METHOD_ATTRIBUTE) {
        definition.init_method = non_blank(value);
    }
    if let Some(value) = get_attribute(node, DESTROY_METHOD_ATTRIBUTE) {
        definition.destroy_method = non_blank(value);
    }

    if let Some(description) = find_child(node, DESCRIPTION_ELEMENT) {
        let text = get_text(description);
        if !text.is_empty() {
            definition.description = Some(text);
        }
    }

    for property in find_children(node, PROPERTY_ELEMENT) {
        parse_property(property, &mut definition, context);
    }
    for argument in find_children(node, CONSTRUCTOR_ARG_ELEMENT) {
        parse_constructor_arg(argument, &mut definition, context);
    }

    Some(definition)
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Attribute value unless absent, blank or `default`.
fn non_default_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    get_text_attribute(node, name).filter(|value| *value != DEFAULT_VALUE)
}

fn boolean_attribute(
    node: Node<'_, '_>,
    name: &str,
    context: &mut ParsingContext<'_>,
) -> Option<bool> {
    let value = non_default_attribute(node, name)?;
    let parsed = parse_bool(value);
    if parsed.is_none() {
        context.error(
            ProblemKind::Validation,
            format!("Invalid value '{value}' for attribute '{name}': expected 'true' or 'false'"),
            node,
        );
    }
    parsed
}

fn parse_property(
    node: Node<'_, '_>,
    definition: &mut ComponentDefinition,
    context: &mut ParsingContext<'_>,
) {
    let Some(name) = get_text_attribute(node, NAME_ATTRIBUTE) else {
        context.error(
            ProblemKind::Validation,
            "Tag 'property' must have a 'name' attribute",
            node,
        );
        return;
    };

    if definition.has_property(name) {
        context.error(
            ProblemKind::Validation,
            format!("Multiple 'property' definitions for property '{name}'"),
            node,
        );
        return;
    }

    let element_name = format!("<property> element for property '{name}'");
    if let Some(value) = parse_value_source(node, &element_name, context) {
        definition.properties.push(PropertyValue::new(name, value));
    }
}

fn parse_constructor_arg(
    node: Node<'_, '_>,
    definition: &mut ComponentDefinition,
    context: &mut ParsingContext<'_>,
) {
    let index = match get_text_attribute(node, INDEX_ATTRIBUTE) {
        None => None,
        Some(raw) => match raw.parse::<usize>() {
            Ok(index) => Some(index),
            Err(_) => {
                context.error(
                    ProblemKind::Validation,
                    format!(
                        "Attribute 'index' of tag 'constructor-arg' must be a non-negative \
                         integer, got '{raw}'"
                    ),
                    node,
                );
                return;
            }
        },
    };

    if let Some(index) = index {
        let taken = definition
            .constructor_args
            .iter()
            .any(|arg| arg.index == Some(index));
        if taken {
            context.error(
                ProblemKind::Validation,
                format!("Ambiguous constructor-arg entries for index {index}"),
                node,
            );
            return;
        }
    }

    let element_name = match index {
        Some(index) => format!("<constructor-arg> element for index {index}"),
        None => "<constructor-arg> element".to_string(),
    };
    if let Some(value) = parse_value_source(node, &element_name, context) {
        definition.constructor_args.push(ConstructorArg {
            index,
            name: get_text_attribute(node, NAME_ATTRIBUTE).map(String::from),
            value,
        });
    }
}

fn is_value_element(child: &Node<'_, '_>) -> bool {
    is_default_namespace(*child) && get_tag_name(*child) != DESCRIPTION_ELEMENT
}

/// Read the value of a `<property>` or `<constructor-arg>`: exactly one of a
/// `value` attribute, a `ref` attribute or a `<value>`/`<ref>` sub-element.
fn parse_value_source(
    node: Node<'_, '_>,
    element_name: &str,
    context: &mut ParsingContext<'_>,
) -> Option<Value> {
    let value_attribute = get_attribute(node, VALUE_ATTRIBUTE);
    let ref_attribute = get_attribute(node, REF_ATTRIBUTE);
    let mut sub_elements = element_children(node).filter(is_value_element);
    let sub_element = sub_elements.next();

    let sources = [
        value_attribute.is_some(),
        ref_attribute.is_some(),
        sub_element.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    if sources > 1 || sub_elements.next().is_some() {
        context.error(
            ProblemKind::Validation,
            format!(
                "{element_name} is only allowed to contain either 'ref' attribute OR 'value' \
                 attribute OR sub-element"
            ),
            node,
        );
        return None;
    }

    if let Some(reference) = ref_attribute {
        let reference = reference.trim();
        if reference.is_empty() {
            context.error(
                ProblemKind::Validation,
                format!("{element_name} contains empty 'ref' attribute"),
                node,
            );
            return None;
        }
        return Some(Value::Reference(reference.to_string()));
    }

    if let Some(value) = value_attribute {
        return Some(Value::Literal(value.to_string()));
    }

    let Some(child) = sub_element else {
        context.error(
            ProblemKind::Validation,
            format!("{element_name} must specify a ref or value"),
            node,
        );
        return None;
    };

    match get_tag_name(child) {
        VALUE_ELEMENT => Some(Value::Literal(get_text(child))),
        REF_ELEMENT => match get_text_attribute(child, COMPONENT_REF_ATTRIBUTE) {
            Some(component) => Some(Value::Reference(component.to_string())),
            None => {
                context.error(
                    ProblemKind::Validation,
                    "<ref> element must specify a 'component' attribute",
                    child,
                );
                None
            }
        },
        other => {
            context.error(
                ProblemKind::Validation,
                format!("Unknown value element: <{other}>"),
                child,
            );
            None
        }
    }
}
