//! Navigation titles and the container collecting them.

use gluon_core::{TreeNode, last_value_preference};

use crate::toolbar::{ToolbarKey, ToolbarValue};

last_value_preference!(
    /// Title requested by the content of a navigation container.
    pub NavigationTitleKey: Option<String> = None
);

/// Sets the navigation title shown by the enclosing [`NavigationView`].
pub fn navigation_title(child: TreeNode, title: impl Into<String>) -> TreeNode {
    child.set_preference::<NavigationTitleKey>(Some(title.into()))
}

/// Tag of a navigation container node.
#[derive(Debug)]
pub struct NavigationView;

/// Configuration a renderer receives for a [`NavigationView`].
///
/// `title` and `toolbar` are filled in from the content below the container during the
/// same pass; `style` is whatever the description layer passed in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationProps<S = ()> {
    /// Title requested by the content, if any.
    pub title: Option<String>,
    /// Toolbar requested by the content.
    pub toolbar: ToolbarValue,
    /// Platform-specific presentation settings.
    pub style: S,
}

/// Wraps `content` in a navigation container.
pub fn navigation_view(content: TreeNode) -> TreeNode {
    navigation_view_styled(content, ())
}

/// Wraps `content` in a navigation container carrying `style` for the renderer.
pub fn navigation_view_styled<S>(content: TreeNode, style: S) -> TreeNode
where
    S: Clone + PartialEq + std::fmt::Debug + 'static,
{
    TreeNode::of::<NavigationView>()
        .props(NavigationProps {
            title: None,
            toolbar: ToolbarValue::default(),
            style,
        })
        .read_preference::<NavigationTitleKey, NavigationProps<S>>(|title, props| NavigationProps {
            title: title.clone(),
            ..props.clone()
        })
        .read_preference::<ToolbarKey, NavigationProps<S>>(|toolbar, props| NavigationProps {
            toolbar: toolbar.clone(),
            ..props.clone()
        })
        .child(content)
}

#[cfg(test)]
mod tests {
    use gluon_core::TreeNode;
    use gluon_render_utils::{Op, OpKind, RecordingRenderer};

    use super::{NavigationProps, navigation_title, navigation_view, navigation_view_styled};
    use crate::{
        Reconciler,
        toolbar::{ToolbarItem, toolbar},
    };

    struct Stack;
    struct Label;

    fn navigation_props(journal: &[Op]) -> Vec<(OpKind, NavigationProps)> {
        journal
            .iter()
            .filter_map(|op| {
                let props = op.props()?.downcast_ref::<NavigationProps>()?;
                Some((op.kind(), props.clone()))
            })
            .collect()
    }

    fn inbox(unread: usize, compose: bool) -> TreeNode {
        let list = navigation_title(TreeNode::of::<Stack>(), format!("Inbox ({unread})"));
        let list = if compose {
            toolbar(list, [ToolbarItem::new("compose")])
        } else {
            list
        };
        navigation_view(TreeNode::of::<Stack>().child(list).child(TreeNode::of::<Label>()))
    }

    #[test]
    fn bar_content_reaches_the_container_in_the_same_pass() {
        let mut reconciler = Reconciler::new(RecordingRenderer::new(), RecordingRenderer::CONTAINER);
        reconciler.apply(inbox(3, true)).unwrap();

        let mounts = navigation_props(reconciler.renderer().journal());
        assert_eq!(mounts.len(), 1);
        let (kind, props) = &mounts[0];
        assert_eq!(*kind, OpKind::Mount);
        assert_eq!(props.title.as_deref(), Some("Inbox (3)"));
        assert_eq!(props.toolbar.items().len(), 1);
    }

    #[test]
    fn changed_content_updates_the_container() {
        let mut reconciler = Reconciler::new(RecordingRenderer::new(), RecordingRenderer::CONTAINER);
        reconciler.apply(inbox(3, true)).unwrap();
        reconciler.renderer_mut().take_journal();

        reconciler.apply(inbox(3, true)).unwrap();
        assert!(navigation_props(reconciler.renderer().journal()).is_empty());

        reconciler.apply(inbox(4, false)).unwrap();
        let updates = navigation_props(reconciler.renderer().journal());
        assert_eq!(updates.len(), 1);
        let (kind, props) = &updates[0];
        assert_eq!(*kind, OpKind::Update);
        assert_eq!(props.title.as_deref(), Some("Inbox (4)"));
        assert!(props.toolbar.is_empty());
    }

    #[test]
    fn missing_title_stays_empty() {
        let mut reconciler = Reconciler::new(RecordingRenderer::new(), RecordingRenderer::CONTAINER);
        reconciler
            .apply(navigation_view_styled(TreeNode::of::<Label>(), "large"))
            .unwrap();
        let props = reconciler.renderer().journal()[0]
            .props()
            .and_then(|props| props.downcast_ref::<NavigationProps<&str>>())
            .cloned()
            .unwrap();
        assert_eq!(props.title, None);
        assert_eq!(props.style, "large");
    }
}
