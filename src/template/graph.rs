// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Dependency Graph
//!
//! A resource depends on another when it names it in `DependsOn` or refers
//! to it through `Ref` / `Fn::GetAtt`. CloudFormation creates resources in
//! that order; these checks make sure the order exists before a template is
//! written.
//!
//! All functions are pure and deterministic: ties are broken by logical id.

use std::collections::{BTreeMap, BTreeSet};

use super::{intrinsic, Template};
use crate::errors::{SynthError, SynthResult};

/// Every resource with the set of resources it depends on
pub fn dependencies(template: &Template) -> BTreeMap<&str, BTreeSet<String>> {
    template
        .resources
        .iter()
        .map(|(id, resource)| {
            let mut deps = resource.implicit_dependencies();
            deps.extend(resource.depends_on.iter().cloned());
            (id.as_str(), deps)
        })
        .collect()
}

/// Check that every `Ref`, `Fn::GetAtt` and `DependsOn` target exists
///
/// Outputs are checked too; pseudo parameters are always resolvable.
pub fn validate_references(template: &Template) -> SynthResult<()> {
    for (id, deps) in dependencies(template) {
        if let Some(target) = deps.iter().find(|dep| !template.contains(dep)) {
            return Err(SynthError::UnresolvedReference {
                from: id.to_string(),
                target: target.clone(),
            });
        }
    }

    for (id, output) in &template.outputs {
        if let Some(target) = intrinsic::references(&output.value)
            .into_iter()
            .find(|dep| !template.contains(dep))
        {
            return Err(SynthError::UnresolvedReference {
                from: id.clone(),
                target,
            });
        }
    }

    Ok(())
}

/// Order resources so every resource comes after everything it depends on
///
/// Kahn's algorithm over a sorted ready set. Fails with the resources left
/// unordered when the graph has a cycle.
pub fn dependency_order(template: &Template) -> SynthResult<Vec<String>> {
    let deps = dependencies(template);

    let mut remaining: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (&id, targets) in &deps {
        let known: Vec<&str> = targets
            .iter()
            .map(String::as_str)
            .filter(|target| deps.contains_key(target))
            .collect();
        remaining.insert(id, known.len());
        for target in known {
            dependents.entry(target).or_default().push(id);
        }
    }

    let mut ready: BTreeSet<&str> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(deps.len());
    while let Some(id) = ready.pop_first() {
        order.push(id.to_string());
        for dependent in dependents.get(id).into_iter().flatten() {
            if let Some(count) = remaining.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() != deps.len() {
        let cycle = remaining
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        return Err(SynthError::DependencyCycle(cycle));
    }

    Ok(order)
}

/// Position of each resource in [`dependency_order`]
pub fn order_index(template: &Template) -> SynthResult<BTreeMap<String, usize>> {
    Ok(dependency_order(template)?
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceType;
    use crate::template::{intrinsic, Resource};
    use serde_json::{json, Map, Value};

    fn resource(properties: Value) -> Resource {
        let properties: Map<String, Value> = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Resource::new(ResourceType::Bucket, properties)
    }

    #[test]
    fn test_order_follows_references_and_depends_on() {
        let mut template = Template::new();
        template
            .add_resource("Listener", resource(json!({ "Lb": intrinsic::reference("Alb") })))
            .unwrap();
        template.add_resource("Alb", resource(json!({}))).unwrap();
        template.add_resource("TrustStore", resource(json!({}))).unwrap();
        template.add_resource("Deployment", resource(json!({}))).unwrap();
        template.add_dependency("TrustStore", "Deployment").unwrap();

        let order = dependency_order(&template).unwrap();
        assert_eq!(order, vec!["Alb", "Deployment", "Listener", "TrustStore"]);
    }

    #[test]
    fn test_unresolved_reference() {
        let mut template = Template::new();
        template
            .add_resource("Listener", resource(json!({ "Lb": intrinsic::get_att("Missing", "Arn") })))
            .unwrap();

        assert!(matches!(
            validate_references(&template),
            Err(SynthError::UnresolvedReference { from, target })
                if from == "Listener" && target == "Missing"
        ));
    }

    #[test]
    fn test_pseudo_parameters_resolve() {
        let mut template = Template::new();
        template
            .add_resource(
                "Bucket",
                resource(json!({ "Region": intrinsic::pseudo(intrinsic::Pseudo::Region) })),
            )
            .unwrap();
        assert!(validate_references(&template).is_ok());
    }

    #[test]
    fn test_cycle_detected() {
        let mut template = Template::new();
        template
            .add_resource("A", resource(json!({ "B": intrinsic::reference("B") })))
            .unwrap();
        template
            .add_resource("B", resource(json!({ "A": intrinsic::reference("A") })))
            .unwrap();
        template.add_resource("C", resource(json!({}))).unwrap();

        match dependency_order(&template) {
            Err(SynthError::DependencyCycle(ids)) => assert_eq!(ids, vec!["A", "B"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_order_index_covers_every_resource() {
        let mut template = Template::new();
        template
            .add_resource("Listener", resource(json!({ "Lb": intrinsic::reference("Alb") })))
            .unwrap();
        template.add_resource("Alb", resource(json!({}))).unwrap();

        let index = order_index(&template).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index["Alb"] < index["Listener"]);
        assert!(!index.contains_key("TrustStore"));
    }
}
