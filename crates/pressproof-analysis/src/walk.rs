// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content reachable from a page: the page's own operators plus every form
// XObject it paints with `Do`, recursively.

use std::collections::HashSet;

use pressproof_document::{
    ContentOp, ContentTarget, ImageXObject, Page, ResourceSet, ResourceSetId, ResourceTree,
    XObject, XObjectId,
};

/// Forms nested deeper than this are not visited.
pub const MAX_FORM_DEPTH: usize = 8;

/// One operator sequence and the resources it resolves names against.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub target: ContentTarget,
    pub operations: &'a [ContentOp],
    pub resources: Option<(ResourceSetId, &'a ResourceSet)>,
    /// The sequence belongs to a transparency group form.
    pub transparency_group: bool,
}

impl<'a> Visit<'a> {
    pub fn resource_set(&self) -> Option<&'a ResourceSet> {
        self.resources.map(|(_, set)| set)
    }
}

/// The page followed by every form it reaches, each form visited once.
pub fn page_visits<'a>(tree: &'a ResourceTree, page_index: usize, page: &'a Page) -> Vec<Visit<'a>> {
    let resources = page
        .resources
        .and_then(|id| tree.set(id).map(|set| (id, set)));
    let mut visits = vec![Visit {
        target: ContentTarget::Page(page_index),
        operations: &page.operations,
        resources,
        transparency_group: false,
    }];
    let mut seen = HashSet::new();
    descend(tree, &page.operations, resources, 1, &mut seen, &mut visits);
    visits
}

fn descend<'a>(
    tree: &'a ResourceTree,
    operations: &'a [ContentOp],
    resources: Option<(ResourceSetId, &'a ResourceSet)>,
    depth: usize,
    seen: &mut HashSet<XObjectId>,
    visits: &mut Vec<Visit<'a>>,
) {
    if depth > MAX_FORM_DEPTH {
        return;
    }
    let Some((_, set)) = resources else {
        return;
    };
    for op in operations.iter().filter(|op| op.operator == "Do") {
        let Some(id) = op.name_operand().and_then(|name| set.xobjects.get(name)) else {
            continue;
        };
        if !seen.insert(*id) {
            continue;
        }
        let Some(XObject::Form(form)) = tree.xobject(*id) else {
            continue;
        };
        // A form without its own /Resources borrows the invoker's.
        let form_resources = form
            .resources
            .and_then(|rid| tree.set(rid).map(|s| (rid, s)))
            .or(resources);
        visits.push(Visit {
            target: ContentTarget::Form(*id),
            operations: &form.operations,
            resources: form_resources,
            transparency_group: form.transparency_group,
        });
        descend(tree, &form.operations, form_resources, depth + 1, seen, visits);
    }
}

/// Distinct resource sets used by the visits.
pub fn distinct_sets<'a>(visits: &[Visit<'a>]) -> Vec<(ResourceSetId, &'a ResourceSet)> {
    let mut seen = HashSet::new();
    visits
        .iter()
        .filter_map(|visit| visit.resources)
        .filter(|(id, _)| seen.insert(*id))
        .collect()
}

/// Images painted with `Do` somewhere in the visits, each once, with the
/// resource name it was first painted under. Images that are only listed
/// in a resource dictionary are not included.
pub fn painted_images<'a>(
    tree: &'a ResourceTree,
    visits: &[Visit<'a>],
) -> Vec<(&'a str, XObjectId, &'a ImageXObject)> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for visit in visits {
        let Some(set) = visit.resource_set() else {
            continue;
        };
        for op in visit.operations.iter().filter(|op| op.operator == "Do") {
            let Some((name, id)) = op.name_operand().and_then(|name| set.xobjects.get_key_value(name))
            else {
                continue;
            };
            let Some(XObject::Image(image)) = tree.xobject(*id) else {
                continue;
            };
            if seen.insert(*id) {
                images.push((name.as_str(), *id, image));
            }
        }
    }
    images
}
