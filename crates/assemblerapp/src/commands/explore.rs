use crate::commands::{CmdMessage, CmdResult, NodeListing};
use crate::entries::node_attribute_entries;
use crate::error::Result;
use crate::filter::AttributeFilter;
use crate::host::{NodeHandle, SceneHost};
use crate::model::Entry;

/// List `nodes` with their attributes, as the explorer shows them.
///
/// With a search term, a node is listed only if one of its attributes matches.
/// Attributes that cannot be extracted are reported as warnings.
pub fn run<H: SceneHost + ?Sized>(
    host: &H,
    nodes: &[NodeHandle],
    filter: &AttributeFilter,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut listed = Vec::with_capacity(nodes.len());

    for &node in nodes {
        let node_entry = Entry::from_node(host, node)?;
        let listing = node_attribute_entries(host, node)?;
        for skipped in &listing.skipped {
            result.add_message(CmdMessage::warning(format!(
                "{}: {}",
                node_entry.title(),
                skipped.error
            )));
        }

        let attributes: Vec<Entry> = listing
            .entries
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        if filter.search.is_some() && attributes.is_empty() {
            continue;
        }
        listed.push(NodeListing {
            node: node_entry,
            attributes,
        });
    }

    Ok(result.with_listed_nodes(listed))
}

/// List the host's current selection.
pub fn selection<H: SceneHost + ?Sized>(host: &H, filter: &AttributeFilter) -> Result<CmdResult> {
    let nodes = host.active_selection()?;
    run(host, &nodes, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::fixtures::SceneFixture;

    #[test]
    fn lists_selected_nodes_with_filtered_attributes() {
        let fixture = SceneFixture::new();
        let result = selection(&fixture.scene, &AttributeFilter::default()).unwrap();

        assert_eq!(result.listed_nodes.len(), 2);
        let cube = &result.listed_nodes[0];
        assert_eq!(cube.node.title(), "pCube1");
        let titles: Vec<_> = cube.attributes.iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["translate", "visibility", "rotateX", "caching", "creator"]);
    }

    #[test]
    fn unsupported_attribute_is_a_warning() {
        let fixture = SceneFixture::new();
        let result = run(&fixture.scene, &[fixture.cube], &AttributeFilter::all()).unwrap();
        let warnings: Vec<_> = result.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].content.contains("instObjGroups"));
    }

    #[test]
    fn search_drops_nodes_without_matches() {
        let fixture = SceneFixture::new();
        let filter = AttributeFilter::default().with_search("radius");
        let result = selection(&fixture.scene, &filter).unwrap();
        assert_eq!(result.listed_nodes.len(), 1);
        assert_eq!(result.listed_nodes[0].node.title(), "pSphere1");
    }

    #[test]
    fn unknown_node_fails() {
        let fixture = SceneFixture::new();
        assert!(run(&fixture.scene, &[NodeHandle(99)], &AttributeFilter::default()).is_err());
    }
}
