use std::{any::TypeId, collections::BTreeMap};

use crate::{inspector::RecipeKind, types::TypeInfo};

/// How a bean was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanOrigin {
    /// Registered as an already constructed instance
    Instance,
    /// Built by one of its constructors
    Constructor(RecipeKind),
    /// Produced by a factory method of the configuration provider
    Configuration(TypeInfo),
}

/// Graph of the finished application
/// Records how each bean was built and what it depends on, enables visualization of the APP
#[derive(Debug, Default)]
pub struct DependencyGraph {
    map: BTreeMap<TypeId, DependencyGraphEntry>,
}

#[derive(Debug)]
struct DependencyGraphEntry {
    info: TypeInfo,
    origin: BeanOrigin,
    /// Requested parameter types, interfaces are kept as requested
    dependencies: Vec<TypeInfo>,
}

impl DependencyGraph {
    pub(crate) fn add(&mut self, info: TypeInfo, origin: BeanOrigin, dependencies: Vec<TypeInfo>) {
        let previous = self.map.insert(
            info.type_id,
            DependencyGraphEntry {
                info,
                origin,
                dependencies,
            },
        );
        debug_assert!(previous.is_none(), "'{info}' was added to the graph twice");
    }

    /// Direct dependencies of the bean, in parameter order
    pub fn dependencies_of(&self, info: TypeInfo) -> Option<&[TypeInfo]> {
        self.map
            .get(&info.type_id)
            .map(|entry| entry.dependencies.as_slice())
    }

    /// Beans directly depending on `info`
    pub fn dependents_of(&self, info: TypeInfo) -> Vec<TypeInfo> {
        self.map
            .values()
            .filter(|entry| entry.dependencies.contains(&info))
            .map(|entry| entry.info)
            .collect()
    }

    pub fn origin_of(&self, info: TypeInfo) -> Option<BeanOrigin> {
        self.map.get(&info.type_id).map(|entry| entry.origin)
    }

    /// All beans in the graph
    pub fn beans(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.map.values().map(|entry| entry.info)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<_> = self.map.values().collect();
        entries.sort_by_key(|entry| entry.info.type_name);

        let mut display = Vec::new();
        for entry in entries {
            let origin = match entry.origin {
                BeanOrigin::Instance => "instance".to_string(),
                BeanOrigin::Constructor(RecipeKind::Injectable) => "injectable constructor".to_string(),
                BeanOrigin::Constructor(RecipeKind::NoArg) => "no-arg constructor".to_string(),
                BeanOrigin::Configuration(provider) => format!("configuration '{provider}'"),
            };
            display.push(format!("{} ({origin})", entry.info));
            for dependency in &entry.dependencies {
                display.push(format!("  -> {dependency}"));
            }
        }
        f.write_str(&display.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Service;
    struct Repository;
    struct DataSource;
    struct DataSourceConfig;

    #[test]
    fn records_edges_in_both_directions() {
        let service = TypeInfo::of::<Service>();
        let repository = TypeInfo::of::<Repository>();
        let data_source = TypeInfo::of::<DataSource>();

        let mut graph = DependencyGraph::default();
        graph.add(
            data_source,
            BeanOrigin::Configuration(TypeInfo::of::<DataSourceConfig>()),
            vec![],
        );
        graph.add(
            repository,
            BeanOrigin::Constructor(RecipeKind::Injectable),
            vec![data_source],
        );
        graph.add(
            service,
            BeanOrigin::Constructor(RecipeKind::Injectable),
            vec![repository, data_source],
        );

        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph.dependencies_of(service).unwrap(),
            &[repository, data_source]
        );
        let dependents = graph.dependents_of(data_source);
        assert_eq!(dependents.len(), 2);
        assert!(dependents.contains(&service) && dependents.contains(&repository));
        assert_eq!(
            graph.origin_of(data_source),
            Some(BeanOrigin::Configuration(TypeInfo::of::<DataSourceConfig>()))
        );
        assert!(graph.dependencies_of(TypeInfo::of::<String>()).is_none());
    }

    #[test]
    fn display_lists_every_bean_with_its_dependencies() {
        let mut graph = DependencyGraph::default();
        graph.add(
            TypeInfo::of::<Repository>(),
            BeanOrigin::Constructor(RecipeKind::NoArg),
            vec![],
        );
        graph.add(
            TypeInfo::of::<Service>(),
            BeanOrigin::Constructor(RecipeKind::Injectable),
            vec![TypeInfo::of::<Repository>()],
        );

        let rendered = graph.to_string();
        assert!(rendered.contains("Repository (no-arg constructor)"));
        assert!(rendered.contains("Service (injectable constructor)"));
        assert!(rendered.contains(&format!("  -> {}", TypeInfo::of::<Repository>())));
    }
}
