//! Behaviour of the document walk, imports, aliases and component registration
//! over in-memory documents.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use roxmltree::{Attribute, Document, Node};

use common::{
    class_of, components, isolated_environment, literal, load, load_into, memory_loader,
    memory_reader, memory_reader_with, messages, problem_count, reference,
};
use wiring_loader::parser::{DefinitionParser, ParserDelegate};
use wiring_loader::reader::DocumentHooks;
use wiring_loader::resource::{MemoryResourceLoader, Resource, ResourceLoader};
use wiring_loader::{
    CollectingListener, ComponentDefinition, DefinitionHolder, DefinitionRegistry, LoaderError,
    NamespaceHandler, ParsingContext, ProblemKind, SimpleDefinitionRegistry, XmlDefinitionReader,
};

const MAIN: &str = "mem:/conf/main.xml";

// ---------------------------------------------------------------------------
// Registration count and round trip
// ---------------------------------------------------------------------------

#[test]
fn test_distinct_components_all_registered() {
    let doc = components(
        r#"<component id="a" class="com.example.A"/>
           <component id="b" class="com.example.B"/>
           <component id="c" class="com.example.C"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(outcome.count, 3);
    assert_eq!(outcome.registry.definition_count(), 3);
    let names: Vec<_> = outcome.registry.definition_names().collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(outcome.listener.components.len(), 3);
    assert!(!outcome.listener.has_problems());
}

#[test]
fn test_registered_definition_is_the_parsed_one() {
    let doc = components(r#"<component id="clock" class="com.example.Clock"/>"#);
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    let announced = &outcome.listener.components[0];
    let stored = outcome.registry.get_definition("clock").unwrap();
    assert!(Arc::ptr_eq(announced.definition(), &stored));
}

#[test]
fn test_inline_properties_decorate_definition() {
    let doc = components(
        r#"<component id="cache" class="com.example.Cache" p:size="10" p:store-ref="store"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    let cache = outcome.registry.get_definition("cache").unwrap();
    assert_eq!(cache.property("size"), Some(&literal("10")));
    assert_eq!(cache.property("store"), Some(&reference("store")));
    assert!(!outcome.listener.has_problems());
}

#[test]
fn test_inline_property_conflicts_with_nested_property() {
    let doc = components(
        r#"<component id="cache" class="com.example.Cache" p:size="10">
             <property name="size" value="20"/>
           </component>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    let cache = outcome.registry.get_definition("cache").unwrap();
    assert_eq!(cache.property("size"), Some(&literal("20")));
    assert_eq!(problem_count(&outcome.listener, ProblemKind::Validation), 1);
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[test]
fn test_registry_failure_does_not_stop_siblings() {
    let mut registry = SimpleDefinitionRegistry::new().with_definition_overriding(false);
    let old = Arc::new(ComponentDefinition::for_class("com.example.Old"));
    registry.register_definition("taken", old).unwrap();

    let doc = components(
        r#"<component id="taken" class="com.example.New"/>
           <component id="free" class="com.example.Free"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load_into(&reader, MAIN, registry);

    assert!(outcome.registry.contains_definition("free"));
    assert_eq!(
        class_of(&outcome.registry, "taken").as_deref(),
        Some("com.example.Old")
    );

    let problems: Vec<_> = outcome
        .listener
        .problems_of(ProblemKind::Registry)
        .collect();
    assert_eq!(problems.len(), 1);
    assert_eq!(
        problems[0].message,
        "Failed to register component definition with name 'taken'"
    );
    assert!(problems[0].cause.is_some());
    assert_eq!(outcome.listener.components.len(), 1);
    assert_eq!(outcome.count, 1);
}

#[test]
fn test_problem_location_points_at_element() {
    let doc = "<components>\n  <alias name=\"a\"/>\n</components>";
    let reader = memory_reader(&[(MAIN, doc)]);
    let outcome = load(&reader, MAIN);

    let problem = &outcome.listener.problems[0];
    assert_eq!(problem.location.resource, "memory [mem:/conf/main.xml]");
    assert_eq!(
        problem.location.element.as_deref(),
        Some("<alias name=\"a\">")
    );
    assert_eq!(problem.location.line, Some(2));
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

#[test]
fn test_alias_registered_and_announced() {
    let doc = components(
        r#"<component id="clock" class="com.example.Clock"/>
           <alias name="clock" alias="timeSource"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(outcome.registry.canonical_name("timeSource"), "clock");
    assert_eq!(outcome.listener.aliases.len(), 1);
    assert_eq!(outcome.listener.aliases[0].alias, "timeSource");
    assert_eq!(
        outcome.listener.aliases[0].source,
        "memory [mem:/conf/main.xml]"
    );
}

#[test]
fn test_alias_missing_alias_attribute() {
    let doc = components(r#"<alias name="clock"/>"#);
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(messages(&outcome.listener), vec!["Alias must not be empty"]);
    assert_eq!(outcome.listener.problems[0].kind, ProblemKind::Validation);
    assert_eq!(outcome.registry.alias_count(), 0);
    assert!(outcome.listener.aliases.is_empty());
}

#[test]
fn test_alias_missing_both_attributes() {
    let doc = components(r#"<alias name=" "/>"#);
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec!["Name must not be empty", "Alias must not be empty"]
    );
    assert_eq!(outcome.registry.alias_count(), 0);
}

#[test]
fn test_alias_registry_failure_reported() {
    let doc = components(
        r#"<alias name="a" alias="b"/>
           <alias name="b" alias="a"/>
           <alias name="a" alias="c"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec!["Failed to register alias 'a' for component with name 'b'"]
    );
    assert_eq!(outcome.listener.problems[0].kind, ProblemKind::Registry);
    assert_eq!(outcome.listener.aliases.len(), 2);
}

// ---------------------------------------------------------------------------
// Nested blocks and profiles
// ---------------------------------------------------------------------------

#[test]
fn test_nested_block_defaults_are_scoped() {
    let doc = components(
        r#"<components default-lazy-init="true">
             <component id="outer" class="com.example.Outer"/>
             <components default-lazy-init="false">
               <component id="nested" class="com.example.Nested"/>
             </components>
             <components>
               <component id="sibling" class="com.example.Sibling"/>
             </components>
             <component id="after" class="com.example.After"/>
           </components>
           <component id="top" class="com.example.Top"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);
    let lazy = |name: &str| outcome.registry.get_definition(name).unwrap().lazy_init;

    assert!(lazy("outer"));
    assert!(!lazy("nested"));
    assert!(lazy("sibling"));
    assert!(lazy("after"));
    assert!(!lazy("top"));
}

#[test]
fn test_default_value_inherits_and_component_overrides() {
    let doc = components(
        r#"<components default-lazy-init="true" default-init-method="init"
                       default-autowire="byType">
             <components default-lazy-init="default">
               <component id="inherits" class="com.example.A"/>
               <component id="overrides" class="com.example.B"
                          lazy-init="false" init-method="" autowire="no"/>
             </components>
           </components>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    let inherits = outcome.registry.get_definition("inherits").unwrap();
    assert!(inherits.lazy_init);
    assert_eq!(inherits.init_method.as_deref(), Some("init"));
    assert_eq!(inherits.autowire.as_str(), "byType");

    let overrides = outcome.registry.get_definition("overrides").unwrap();
    assert!(!overrides.lazy_init);
    assert_eq!(overrides.init_method, None);
    assert_eq!(overrides.autowire.as_str(), "no");
}

#[test]
fn test_rejected_profile_skips_cleanly() {
    let doc = r#"<components xmlns="urn:wiring:components" profile="prod">
                   <component name="a" class="com.example.A"/>
                   <component name="b" class="com.example.B"/>
                   <import resource="missing.xml"/>
                 </components>"#;
    let reader = memory_reader(&[(MAIN, doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(outcome.count, 0);
    assert_eq!(outcome.registry.definition_count(), 0);
    assert!(outcome.listener.problems.is_empty());
    assert!(outcome.listener.imports.is_empty());
    assert!(outcome.listener.components.is_empty());
}

#[test]
fn test_profiles_select_nested_blocks() {
    let doc = components(
        r#"<components profile="dev, test">
             <component id="devOnly" class="com.example.Dev"/>
           </components>
           <components profile="!dev">
             <component id="notDev" class="com.example.NotDev"/>
           </components>
           <components profile="default">
             <component id="fallback" class="com.example.Fallback"/>
           </components>"#,
    );

    let default_reader = memory_reader(&[(MAIN, &doc)]);
    let default_outcome = load(&default_reader, MAIN);
    let names: Vec<_> = default_outcome.registry.definition_names().collect();
    assert_eq!(names, vec!["notDev", "fallback"]);

    let dev = isolated_environment().with_active_profiles(["dev"]);
    let dev_reader = memory_reader_with(&[(MAIN, &doc)], dev);
    let dev_outcome = load(&dev_reader, MAIN);
    let names: Vec<_> = dev_outcome.registry.definition_names().collect();
    assert_eq!(names, vec!["devOnly"]);
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

#[test]
fn test_relative_import() {
    let main = components(
        r#"<import resource="db/db.xml"/><component id="app" class="com.example.App"/>"#,
    );
    let db = components(r#"<component id="store" class="com.example.Store"/>"#);
    let reader = memory_reader(&[(MAIN, &main), ("mem:/conf/db/db.xml", &db)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(outcome.count, 2);
    let names: Vec<_> = outcome.registry.definition_names().collect();
    assert_eq!(names, vec!["store", "app"]);

    assert_eq!(outcome.listener.imports.len(), 1);
    let import = &outcome.listener.imports[0];
    assert_eq!(import.location, "db/db.xml");
    assert_eq!(
        import.resource_descriptions(),
        vec!["memory [mem:/conf/db/db.xml]"]
    );
    assert_eq!(import.source, "memory [mem:/conf/main.xml]");

    let store = outcome.registry.get_definition("store").unwrap();
    assert_eq!(
        store.source.as_deref(),
        Some("memory [mem:/conf/db/db.xml]")
    );
}

#[test]
fn test_absolute_import() {
    let main = components(r#"<import resource="mem:/shared/common.xml"/>"#);
    let common = components(r#"<component id="shared" class="com.example.Shared"/>"#);
    let reader = memory_reader(&[(MAIN, &main), ("mem:/shared/common.xml", &common)]);
    let outcome = load(&reader, MAIN);

    assert!(outcome.registry.contains_definition("shared"));
    assert_eq!(
        outcome.listener.imports[0].resource_descriptions(),
        vec!["memory [mem:/shared/common.xml]"]
    );
}

#[test]
fn test_import_location_placeholder() {
    let main = components(r#"<import resource="mem:/${env}/db.xml"/>"#);
    let db = components(r#"<component id="store" class="com.example.Store"/>"#);
    let reader = memory_reader_with(
        &[(MAIN, &main), ("mem:/staging/db.xml", &db)],
        isolated_environment().with_property("env", "staging"),
    );
    let outcome = load(&reader, MAIN);

    assert!(outcome.registry.contains_definition("store"));
    assert_eq!(outcome.listener.imports[0].location, "mem:/staging/db.xml");
}

#[test]
fn test_unresolvable_placeholder_reported_without_event() {
    let main = components(
        r#"<import resource="${missing}/db.xml"/>
           <component id="app" class="com.example.App"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &main)]);
    let outcome = load(&reader, MAIN);

    assert!(outcome.registry.contains_definition("app"));
    assert!(outcome.listener.imports.is_empty());
    assert_eq!(outcome.listener.problems.len(), 1);
    assert_eq!(outcome.listener.problems[0].kind, ProblemKind::Resolution);
}

#[test]
fn test_empty_import_location() {
    let main = components(r#"<import resource=""/><import/>"#);
    let reader = memory_reader(&[(MAIN, &main)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec![
            "Resource location must not be empty",
            "Resource location must not be empty",
        ]
    );
    assert_eq!(problem_count(&outcome.listener, ProblemKind::Validation), 2);
    assert!(outcome.listener.imports.is_empty());
}

#[test]
fn test_failed_absolute_import_still_notifies() {
    let main = components(
        r#"<import resource="mem:/missing.xml"/>
           <component id="app" class="com.example.App"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &main)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec!["Failed to import component definitions from URL location [mem:/missing.xml]"]
    );
    assert_eq!(outcome.listener.problems[0].kind, ProblemKind::Resolution);
    assert_eq!(outcome.listener.imports.len(), 1);
    assert!(outcome.listener.imports[0].resources.is_empty());
    assert!(outcome.registry.contains_definition("app"));
}

#[test]
fn test_failed_relative_import_reported() {
    let main = components(r#"<import resource="missing.xml"/>"#);
    let reader = memory_reader(&[(MAIN, &main)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec!["Failed to import component definitions from relative location [missing.xml]"]
    );
    assert_eq!(outcome.listener.imports.len(), 1);
}

#[test]
fn test_malformed_import_reported() {
    let main = components(
        r#"<import resource="broken.xml"/><component id="app" class="com.example.App"/>"#,
    );
    let broken = "<components><oops></components>";
    let reader = memory_reader(&[(MAIN, &main), ("mem:/conf/broken.xml", broken)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(outcome.listener.problems.len(), 1);
    let cause = outcome.listener.problems[0].cause.as_deref().unwrap();
    assert!(cause.contains("is invalid"), "unexpected cause: {cause}");
    assert!(outcome.registry.contains_definition("app"));
}

#[test]
fn test_import_cycle_detected() {
    let a = components(r#"<import resource="b.xml"/><component id="a" class="com.example.A"/>"#);
    let b = components(r#"<import resource="a.xml"/><component id="b" class="com.example.B"/>"#);
    let reader = memory_reader(&[("mem:/conf/a.xml", &a), ("mem:/conf/b.xml", &b)]);
    let outcome = load(&reader, "mem:/conf/a.xml");

    assert!(outcome.registry.contains_definition("a"));
    assert!(outcome.registry.contains_definition("b"));
    assert_eq!(outcome.listener.problems.len(), 1);

    let problem = &outcome.listener.problems[0];
    assert_eq!(problem.kind, ProblemKind::Resolution);
    assert_eq!(problem.location.resource, "memory [mem:/conf/b.xml]");
    assert_eq!(
        problem.cause.as_deref(),
        Some(
            "Detected cyclic loading of memory [mem:/conf/a.xml]: \
             mem:/conf/a.xml -> mem:/conf/b.xml -> mem:/conf/a.xml"
        )
    );
}

#[test]
fn test_self_import_detected() {
    let a = components(r#"<import resource="a.xml"/><component id="a" class="com.example.A"/>"#);
    let reader = memory_reader(&[("mem:/conf/a.xml", &a)]);
    let outcome = load(&reader, "mem:/conf/a.xml");

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.listener.problems.len(), 1);
}

#[test]
fn test_same_document_imported_twice_from_siblings() {
    let main = components(r#"<import resource="shared.xml"/><import resource="./shared.xml"/>"#);
    let shared = components(r#"<component id="shared" class="com.example.Shared"/>"#);
    let reader = memory_reader(&[(MAIN, &main), ("mem:/conf/shared.xml", &shared)]);
    let outcome = load(&reader, MAIN);

    // Not on the active stack, so both loads run; the registry overrides.
    assert!(outcome.listener.problems.is_empty());
    assert_eq!(outcome.listener.imports.len(), 2);
    assert_eq!(outcome.registry.definition_count(), 1);
}

/// Resolves every location to the same document twice, under two spellings.
struct DuplicatingLoader {
    inner: MemoryResourceLoader,
}

impl ResourceLoader for DuplicatingLoader {
    fn is_url(&self, location: &str) -> bool {
        self.inner.is_url(location)
    }

    fn get_resources(&self, location: &str) -> wiring_loader::Result<Vec<Arc<dyn Resource>>> {
        let detour = location.replacen("mem:/", "mem:/detour/../", 1);
        Ok(vec![self.inner.resource(location), self.inner.resource(&detour)])
    }
}

#[test]
fn test_resolved_resources_deduplicated_by_identity() {
    let main = components(r#"<import resource="mem:/conf/shared.xml"/>"#);
    let shared = components(r#"<component id="shared" class="com.example.Shared"/>"#);
    let inner = memory_loader(&[(MAIN, &main), ("mem:/conf/shared.xml", &shared)]);
    let main_resource = inner.resource(MAIN);
    let reader = XmlDefinitionReader::new(isolated_environment())
        .with_resource_loader(DuplicatingLoader { inner });

    let mut registry = SimpleDefinitionRegistry::new();
    let mut listener = CollectingListener::new();
    reader
        .load_resource(main_resource, &mut registry, &mut listener)
        .unwrap();

    assert!(listener.problems.is_empty(), "{:?}", listener.problems);
    assert_eq!(listener.imports.len(), 1);
    assert_eq!(
        listener.imports[0].resource_descriptions(),
        vec!["memory [mem:/conf/shared.xml]"]
    );
    assert_eq!(listener.components.len(), 1);
}

/// A resource that cannot build relative resources but knows its location.
#[derive(Debug)]
struct DetachedResource {
    loader: MemoryResourceLoader,
    content: String,
}

impl Resource for DetachedResource {
    fn exists(&self) -> bool {
        true
    }

    fn absolute_location(&self) -> wiring_loader::Result<String> {
        Ok(MAIN.to_string())
    }

    fn create_relative(&self, _relative_path: &str) -> wiring_loader::Result<Arc<dyn Resource>> {
        Ok(self.loader.resource("mem:/nowhere/missing.doc"))
    }

    fn read_to_string(&self) -> wiring_loader::Result<String> {
        Ok(self.content.clone())
    }

    fn description(&self) -> String {
        "detached [main]".to_string()
    }
}

#[test]
fn test_missing_relative_falls_back_to_absolute_location() {
    let other = components(r#"<component id="other" class="com.example.Other"/>"#);
    let loader = memory_loader(&[("mem:/conf/rel/other.doc", &other)]);
    let reader =
        XmlDefinitionReader::new(isolated_environment()).with_resource_loader(loader.clone());

    let main = DetachedResource {
        loader,
        content: components(r#"<import resource="rel/other.doc"/>"#),
    };
    let mut registry = SimpleDefinitionRegistry::new();
    let mut listener = CollectingListener::new();
    let count = reader
        .load_resource(Arc::new(main), &mut registry, &mut listener)
        .unwrap();

    assert_eq!(count, 1);
    assert!(listener.problems.is_empty(), "{:?}", listener.problems);
    assert_eq!(listener.imports.len(), 1);
    assert_eq!(
        listener.imports[0].resource_descriptions(),
        vec!["memory [mem:/conf/rel/other.doc]"]
    );
}

/// A resource whose own location cannot be determined.
#[derive(Debug)]
struct LocationlessResource {
    loader: MemoryResourceLoader,
}

impl Resource for LocationlessResource {
    fn exists(&self) -> bool {
        true
    }

    fn absolute_location(&self) -> wiring_loader::Result<String> {
        Err(LoaderError::UnsupportedLocation("stdin".to_string()))
    }

    fn create_relative(&self, _relative_path: &str) -> wiring_loader::Result<Arc<dyn Resource>> {
        Ok(self.loader.resource("mem:/nowhere/missing.doc"))
    }

    fn read_to_string(&self) -> wiring_loader::Result<String> {
        Ok(components(r#"<import resource="other.xml"/>"#))
    }

    fn description(&self) -> String {
        "stdin".to_string()
    }
}

#[test]
fn test_unknown_current_location_is_io_problem() {
    let loader = MemoryResourceLoader::new();
    let reader =
        XmlDefinitionReader::new(isolated_environment()).with_resource_loader(loader.clone());
    let mut registry = SimpleDefinitionRegistry::new();
    let mut listener = CollectingListener::new();
    let resource = Arc::new(LocationlessResource { loader });
    reader
        .load_resource(resource, &mut registry, &mut listener)
        .unwrap();

    assert_eq!(
        messages(&listener),
        vec!["Failed to resolve current resource location"]
    );
    assert_eq!(listener.problems[0].kind, ProblemKind::Io);
    assert_eq!(listener.imports.len(), 1);
}

// ---------------------------------------------------------------------------
// Component parsing
// ---------------------------------------------------------------------------

#[test]
fn test_name_tokens_become_aliases() {
    let doc = components(
        r#"<component name="clock, timeSource;ticker" class="com.example.Clock"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    let holder = &outcome.listener.components[0];
    assert_eq!(holder.name(), "clock");
    assert_eq!(
        holder.aliases(),
        ["timeSource".to_string(), "ticker".to_string()]
    );
    assert_eq!(outcome.registry.canonical_name("ticker"), "clock");
}

#[test]
fn test_prefixed_attributes_do_not_name_the_component() {
    let doc = components(
        r#"<component id="app" class="com.example.App" p:name="demo"/>
           <component p:class="com.example.Wrong" class="com.example.Right" id="x"/>
           <component p:id="sneaky" class="com.example.Sneaky"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);
    let registry = &outcome.registry;

    assert!(
        outcome.listener.problems.is_empty(),
        "{:?}",
        outcome.listener.problems
    );
    assert!(registry.aliases_of("app").is_empty());
    let app = registry.get_definition("app").unwrap();
    assert_eq!(app.property("name"), Some(&literal("demo")));

    let x = registry.get_definition("x").unwrap();
    assert_eq!(x.class_name.as_deref(), Some("com.example.Right"));

    let names: Vec<_> = registry.definition_names().collect();
    assert_eq!(names, vec!["app", "x", "com.example.Sneaky#0"]);
    let sneaky = registry.get_definition("com.example.Sneaky#0").unwrap();
    assert_eq!(sneaky.property("id"), Some(&literal("sneaky")));
}

#[test]
fn test_generated_names() {
    let doc = components(
        r#"<component class="com.example.Worker"/>
           <component class="com.example.Worker"/>
           <component id="base" class="com.example.Base" abstract="true"/>
           <component parent="base"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    let names: Vec<_> = outcome.registry.definition_names().collect();
    assert_eq!(
        names,
        vec![
            "com.example.Worker#0",
            "com.example.Worker#1",
            "base",
            "base$child#0",
        ]
    );
    assert_eq!(
        outcome.registry.canonical_name("com.example.Worker"),
        "com.example.Worker#0"
    );
    assert!(outcome.listener.problems.is_empty());
}

#[test]
fn test_duplicate_name_in_block() {
    let doc = components(
        r#"<component id="a" class="com.example.A"/>
           <component id="b" name="a" class="com.example.B"/>
           <components><component id="a" class="com.example.C"/></components>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec!["Component name 'a' is already used in this <components> element"]
    );
    // The nested block has its own name scope; the registry overrides.
    assert_eq!(
        class_of(&outcome.registry, "a").as_deref(),
        Some("com.example.C")
    );
    assert!(!outcome.registry.contains_definition("b"));
}

#[test]
fn test_class_or_parent_required() {
    let doc = components(r#"<component id="nothing"/><component id="ok" class="com.example.Ok"/>"#);
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(problem_count(&outcome.listener, ProblemKind::Validation), 1);
    assert!(!outcome.registry.contains_definition("nothing"));
    assert!(outcome.registry.contains_definition("ok"));
}

#[test]
fn test_invalid_boolean_is_reported_and_defaulted() {
    let doc = components(
        r#"<component id="a" class="com.example.A" lazy-init="sometimes" primary="true"/>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec!["Invalid value 'sometimes' for attribute 'lazy-init': expected 'true' or 'false'"]
    );
    let a = outcome.registry.get_definition("a").unwrap();
    assert!(!a.lazy_init);
    assert!(a.primary);
}

#[test]
fn test_full_component() {
    let doc = components(
        r#"<component id="orders" class="com.example.OrderService" scope="prototype"
                      depends-on="db, cache" init-method="start" destroy-method="stop">
             <description> Handles orders </description>
             <constructor-arg index="1" value="42"/>
             <constructor-arg index="0"><ref component="repository"/></constructor-arg>
             <property name="timeout"><value>30</value></property>
             <property name="clock" ref="clock"/>
           </component>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);
    assert!(
        outcome.listener.problems.is_empty(),
        "{:?}",
        outcome.listener.problems
    );

    let orders = outcome.registry.get_definition("orders").unwrap();
    assert_eq!(orders.scope, "prototype");
    assert_eq!(orders.depends_on, vec!["db", "cache"]);
    assert_eq!(orders.init_method.as_deref(), Some("start"));
    assert_eq!(orders.destroy_method.as_deref(), Some("stop"));
    assert_eq!(orders.description.as_deref(), Some("Handles orders"));
    assert_eq!(orders.constructor_args.len(), 2);
    assert_eq!(orders.constructor_args[1].index, Some(0));
    assert_eq!(orders.constructor_args[1].value, reference("repository"));
    assert_eq!(orders.property("timeout"), Some(&literal("30")));
    assert_eq!(orders.property("clock"), Some(&reference("clock")));
}

#[test]
fn test_property_errors() {
    let doc = components(
        r#"<component id="a" class="com.example.A">
             <property value="x"/>
             <property name="one" value="1"/>
             <property name="one" value="2"/>
             <property name="both" value="1" ref="b"/>
             <property name="none"/>
             <property name="emptyRef" ref=" "/>
             <constructor-arg index="-1" value="x"/>
             <constructor-arg index="0" value="x"/>
             <constructor-arg index="0" value="y"/>
           </component>"#,
    );
    let reader = memory_reader(&[(MAIN, &doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec![
            "Tag 'property' must have a 'name' attribute",
            "Multiple 'property' definitions for property 'one'",
            "<property> element for property 'both' is only allowed to contain \
             either 'ref' attribute OR 'value' attribute OR sub-element",
            "<property> element for property 'none' must specify a ref or value",
            "<property> element for property 'emptyRef' contains empty 'ref' attribute",
            "Attribute 'index' of tag 'constructor-arg' must be a non-negative integer, got '-1'",
            "Ambiguous constructor-arg entries for index 0",
        ]
    );
    let a = outcome.registry.get_definition("a").unwrap();
    assert_eq!(a.properties.len(), 1);
    assert_eq!(a.constructor_args.len(), 1);
}

// ---------------------------------------------------------------------------
// Extension vocabularies
// ---------------------------------------------------------------------------

const CACHE_NAMESPACE: &str = "urn:example:cache";

/// `<cache:region id="..." size="..."/>` registers a cache; `cache:*`
/// attributes on components are copied into the definition's attributes.
struct CacheNamespaceHandler;

impl NamespaceHandler for CacheNamespaceHandler {
    fn parse(
        &self,
        node: Node<'_, '_>,
        context: &mut ParsingContext<'_>,
    ) -> Option<Arc<ComponentDefinition>> {
        let id = node.attribute("id")?;
        let mut definition = ComponentDefinition::for_class("com.example.CacheRegion");
        if let Some(size) = node.attribute("size") {
            let attributes = &mut definition.attributes;
            attributes.insert("size".to_string(), size.to_string());
        }
        let holder = DefinitionHolder::new(id, Arc::new(definition));
        context.register_holder(&holder).ok()?;
        Some(Arc::clone(holder.definition()))
    }

    fn decorate_attribute(
        &self,
        attribute: Attribute<'_, '_>,
        _owner: Node<'_, '_>,
        holder: DefinitionHolder,
        _context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        let mut definition = holder.definition().as_ref().clone();
        let key = format!("cache.{}", attribute.name());
        let attributes = &mut definition.attributes;
        attributes.insert(key, attribute.value().to_string());
        holder.with_definition(definition)
    }

    fn decorate(
        &self,
        node: Node<'_, '_>,
        holder: DefinitionHolder,
        _context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        let mut definition = holder.definition().as_ref().clone();
        let element = node.tag_name().name().to_string();
        let attributes = &mut definition.attributes;
        attributes.insert("cache.element".to_string(), element);
        holder.with_definition(definition)
    }
}

#[test]
fn test_custom_element_dispatched_to_handler() {
    let doc = r#"<components xmlns="urn:wiring:components" xmlns:cache="urn:example:cache">
                   <cache:region id="sessions" size="100"/>
                   <component id="app" class="com.example.App" cache:policy="lru">
                     <cache:evict/>
                   </component>
                 </components>"#;
    let reader = memory_reader(&[(MAIN, doc)])
        .with_namespace_handler(CACHE_NAMESPACE, CacheNamespaceHandler);
    let outcome = load(&reader, MAIN);

    assert!(
        outcome.listener.problems.is_empty(),
        "{:?}",
        outcome.listener.problems
    );
    let sessions = outcome.registry.get_definition("sessions").unwrap();
    assert_eq!(
        sessions.attributes.get("size").map(String::as_str),
        Some("100")
    );

    let app = outcome.registry.get_definition("app").unwrap();
    assert_eq!(
        app.attributes.get("cache.policy").map(String::as_str),
        Some("lru")
    );
    assert_eq!(
        app.attributes.get("cache.element").map(String::as_str),
        Some("evict")
    );
    assert_eq!(outcome.listener.components.len(), 2);
}

#[test]
fn test_custom_root_dispatched_once() {
    let doc = r#"<cache:region xmlns:cache="urn:example:cache" id="root">
                   <cache:region id="child"/>
                 </cache:region>"#;
    let reader = memory_reader(&[(MAIN, doc)])
        .with_namespace_handler(CACHE_NAMESPACE, CacheNamespaceHandler);
    let outcome = load(&reader, MAIN);

    assert_eq!(outcome.count, 1);
    assert!(outcome.registry.contains_definition("root"));
    assert!(!outcome.registry.contains_definition("child"));
}

#[test]
fn test_unknown_namespace_reported() {
    let doc = r#"<components xmlns="urn:wiring:components" xmlns:x="urn:unknown"
                             xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                   <x:thing/>
                   <component id="app" class="com.example.App" x:flag="on" xsi:type="ignored"/>
                 </components>"#;
    let reader = memory_reader(&[(MAIN, doc)]);
    let outcome = load(&reader, MAIN);

    assert_eq!(
        messages(&outcome.listener),
        vec![
            "Unable to locate handler for XML schema namespace [urn:unknown]",
            "Unable to locate handler for XML schema namespace [urn:unknown]",
        ]
    );
    assert!(outcome
        .listener
        .problems
        .iter()
        .all(|p| p.kind == ProblemKind::Vocabulary));
    // Decoration failed, the undecorated component is still registered.
    assert!(outcome.registry.contains_definition("app"));
}

/// Decorator that tries to rename the component.
struct RenamingHandler;

impl NamespaceHandler for RenamingHandler {
    fn parse(
        &self,
        _node: Node<'_, '_>,
        _context: &mut ParsingContext<'_>,
    ) -> Option<Arc<ComponentDefinition>> {
        None
    }

    fn decorate_attribute(
        &self,
        _attribute: Attribute<'_, '_>,
        _owner: Node<'_, '_>,
        _holder: DefinitionHolder,
        _context: &mut ParsingContext<'_>,
    ) -> DefinitionHolder {
        DefinitionHolder::new(
            "renamed",
            Arc::new(ComponentDefinition::for_class("com.example.Other")),
        )
    }
}

#[test]
fn test_decoration_may_not_rename() {
    let doc = r#"<components xmlns="urn:wiring:components" xmlns:r="urn:example:rename">
                   <component id="app" class="com.example.App" r:go="yes"/>
                 </components>"#;
    let reader = memory_reader(&[(MAIN, doc)])
        .with_namespace_handler("urn:example:rename", RenamingHandler);
    let outcome = load(&reader, MAIN);

    assert_eq!(problem_count(&outcome.listener, ProblemKind::Vocabulary), 1);
    assert!(outcome.registry.contains_definition("app"));
    assert!(!outcome.registry.contains_definition("renamed"));
    assert_eq!(
        class_of(&outcome.registry, "app").as_deref(),
        Some("com.example.App")
    );
}

// ---------------------------------------------------------------------------
// Reader seams
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CountingHooks {
    pre: Arc<AtomicUsize>,
    post: Arc<AtomicUsize>,
}

impl DocumentHooks for CountingHooks {
    fn pre_process(&self, _root: Node<'_, '_>, _context: &mut ParsingContext<'_>) {
        self.pre.fetch_add(1, Ordering::SeqCst);
    }

    fn post_process(&self, _root: Node<'_, '_>, _context: &mut ParsingContext<'_>) {
        self.post.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_hooks_run_per_block() {
    let doc = components(
        r#"<components><component id="a" class="com.example.A"/></components>
           <components profile="never"><component id="b" class="com.example.B"/></components>"#,
    );
    let hooks = CountingHooks::default();
    let (pre, post) = (Arc::clone(&hooks.pre), Arc::clone(&hooks.post));
    let reader = memory_reader(&[(MAIN, &doc)]).with_hooks(hooks);
    load(&reader, MAIN);

    // Root and first nested block; the rejected block returns before its hooks.
    assert_eq!(pre.load(Ordering::SeqCst), 2);
    assert_eq!(post.load(Ordering::SeqCst), 2);
}

/// Records the load stack seen at the start of every block.
#[derive(Default)]
struct StackRecordingHooks {
    stacks: Arc<Mutex<Vec<Vec<String>>>>,
}

impl DocumentHooks for StackRecordingHooks {
    fn pre_process(&self, _root: Node<'_, '_>, context: &mut ParsingContext<'_>) {
        if let Ok(mut stacks) = self.stacks.lock() {
            stacks.push(context.load_stack().to_vec());
        }
    }
}

#[test]
fn test_load_stack_follows_import_chain() {
    let a = components(r#"<import resource="b.xml"/>"#);
    let b = components(r#"<import resource="a.xml"/><component id="b" class="com.example.B"/>"#);
    let hooks = StackRecordingHooks::default();
    let stacks = Arc::clone(&hooks.stacks);
    let reader =
        memory_reader(&[("mem:/conf/a.xml", &a), ("mem:/conf/b.xml", &b)]).with_hooks(hooks);
    let outcome = load(&reader, "mem:/conf/a.xml");

    assert_eq!(outcome.listener.problems.len(), 1);
    assert_eq!(
        *stacks.lock().unwrap(),
        vec![
            vec!["mem:/conf/a.xml".to_string()],
            vec!["mem:/conf/a.xml".to_string(), "mem:/conf/b.xml".to_string()],
        ]
    );
}

/// Parser that names every component after its class.
struct ClassNameParser;

impl DefinitionParser for ClassNameParser {
    fn parse_component(
        &self,
        node: Node<'_, '_>,
        _context: &mut ParsingContext<'_>,
        _delegate: &mut ParserDelegate,
    ) -> Option<DefinitionHolder> {
        let class_name = node.attribute("class")?;
        Some(DefinitionHolder::new(
            class_name,
            Arc::new(ComponentDefinition::for_class(class_name)),
        ))
    }
}

#[test]
fn test_custom_parser() {
    let doc = components(r#"<component id="ignored" class="com.example.A"/>"#);
    let reader = memory_reader(&[(MAIN, &doc)]).with_parser(ClassNameParser);
    let outcome = load(&reader, MAIN);

    assert!(outcome.registry.contains_definition("com.example.A"));
    assert!(!outcome.registry.contains_definition("ignored"));
}

#[test]
fn test_register_parsed_document() {
    let text = components(
        r#"<import resource="db.xml"/><component id="app" class="com.example.App"/>"#,
    );
    let db = components(r#"<component id="store" class="com.example.Store"/>"#);
    let loader = memory_loader(&[("mem:/conf/db.xml", &db)]);
    let reader =
        XmlDefinitionReader::new(isolated_environment()).with_resource_loader(loader.clone());

    let document = Document::parse(&text).unwrap();
    let mut registry = SimpleDefinitionRegistry::new();
    let mut listener = CollectingListener::new();
    let resource = loader.resource(MAIN);
    let count = reader.register_document(&document, resource, &mut registry, &mut listener);

    assert_eq!(count, 2);
    assert!(registry.contains_definition("store"));
    assert!(listener.problems.is_empty());
}

#[test]
fn test_top_level_failures_are_errors() {
    let reader = memory_reader(&[(MAIN, "<components>")]);
    let mut registry = SimpleDefinitionRegistry::new();
    let mut listener = CollectingListener::new();

    let malformed = reader.load_definitions(MAIN, &mut registry, &mut listener);
    assert!(matches!(malformed, Err(LoaderError::XmlParse { .. })));

    let missing = reader.load_definitions("mem:/missing.xml", &mut registry, &mut listener);
    assert!(matches!(missing, Err(LoaderError::ResourceNotFound(_))));

    let unsupported = reader.load_definitions("ftp://host/a.xml", &mut registry, &mut listener);
    assert!(matches!(unsupported, Err(LoaderError::UnsupportedLocation(_))));

    assert!(listener.problems.is_empty());
}
