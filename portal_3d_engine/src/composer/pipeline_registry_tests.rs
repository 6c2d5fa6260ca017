use std::sync::Arc;
use super::*;
use crate::composer::{share, Bloom, EffectPass};

fn pass(name: &str) -> SharedPass {
    share(EffectPass::new(name, vec![Bloom::default().into()]))
}

#[test]
fn test_new_registry_is_empty() {
    let registry = PipelineRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.generation(), 0);
    assert!(registry.get().is_empty());
}

#[test]
fn test_set_replaces_list_and_bumps_generation() {
    let registry = PipelineRegistry::new();
    let first = pass("first");
    registry.set(vec![first.clone(), pass("second")]);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.generation(), 1);

    registry.set(vec![first.clone()]);
    let (passes, generation) = registry.snapshot();
    assert_eq!(passes.len(), 1);
    assert!(Arc::ptr_eq(&passes[0], &first));
    assert_eq!(generation, 2);
}

#[test]
fn test_setting_identical_list_still_counts_as_change() {
    let registry = PipelineRegistry::new();
    let passes = vec![pass("a")];
    registry.set(passes.clone());
    registry.set(passes);
    assert_eq!(registry.generation(), 2);
}

#[test]
fn test_clear() {
    let registry = PipelineRegistry::shared();
    registry.set(vec![pass("a")]);
    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.generation(), 2);
}
