//! Toolbar content travelling up to the enclosing navigation container.
//!
//! A view deep inside a navigation stack declares toolbar items with [`toolbar`]; the
//! items are exported through the [`ToolbarKey`] preference and the nearest
//! [`NavigationView`](crate::navigation::NavigationView) receives them in its
//! configuration during the same pass. When several siblings declare a toolbar, the
//! last one wins.

use std::fmt::Debug;

use gluon_core::{AnyEquatable, Key, TreeNode, last_value_preference};

use crate::navigation::NavigationTitleKey;

/// Where a toolbar item should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ToolbarItemPlacement {
    /// Let the platform decide.
    #[default]
    Automatic,
    /// The centre of the bar, typically replacing the title.
    Principal,
    /// Navigation controls such as back buttons.
    Navigation,
    /// The most prominent action.
    PrimaryAction,
    /// Status information.
    Status,
    /// Confirms a modal interaction.
    ConfirmationAction,
    /// Cancels a modal interaction.
    CancellationAction,
    /// A destructive action.
    DestructiveAction,
    /// Leading edge of the navigation bar.
    NavigationBarLeading,
    /// Trailing edge of the navigation bar.
    NavigationBarTrailing,
    /// A bar at the bottom of the screen.
    BottomBar,
}

/// One entry of a toolbar.
///
/// The content is opaque configuration for the renderer, such as a button description.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarItem {
    id: Option<Key>,
    placement: ToolbarItemPlacement,
    shows_by_default: bool,
    content: AnyEquatable,
}

impl ToolbarItem {
    /// Creates an automatically placed item showing `content`.
    pub fn new<C: PartialEq + Debug + 'static>(content: C) -> Self {
        Self {
            id: None,
            placement: ToolbarItemPlacement::Automatic,
            shows_by_default: true,
            content: AnyEquatable::new(content),
        }
    }

    /// Gives the item an identifier, for toolbars the user can customise.
    #[must_use]
    pub fn id(mut self, id: impl Into<Key>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the placement.
    #[must_use]
    pub const fn placement(mut self, placement: ToolbarItemPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Hides the item until the user adds it through toolbar customisation.
    #[must_use]
    pub const fn hidden_by_default(mut self) -> Self {
        self.shows_by_default = false;
        self
    }

    /// The identifier, if any.
    #[must_use]
    pub const fn key(&self) -> Option<&Key> {
        self.id.as_ref()
    }

    /// Where the item goes.
    #[must_use]
    pub const fn item_placement(&self) -> ToolbarItemPlacement {
        self.placement
    }

    /// Returns `true` unless the item was hidden by default.
    #[must_use]
    pub const fn shows_by_default(&self) -> bool {
        self.shows_by_default
    }

    /// The item's content.
    #[must_use]
    pub const fn content(&self) -> &AnyEquatable {
        &self.content
    }
}

/// The toolbar exported by a subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolbarValue {
    items: Vec<ToolbarItem>,
}

impl ToolbarValue {
    /// Creates a toolbar from items in order.
    #[must_use]
    pub const fn new(items: Vec<ToolbarItem>) -> Self {
        Self { items }
    }

    /// All items in declaration order.
    #[must_use]
    pub fn items(&self) -> &[ToolbarItem] {
        &self.items
    }

    /// Items with the given placement.
    pub fn placed(&self, placement: ToolbarItemPlacement) -> impl Iterator<Item = &ToolbarItem> {
        self.items
            .iter()
            .filter(move |item| item.placement == placement)
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ToolbarItem> for ToolbarValue {
    fn from_iter<I: IntoIterator<Item = ToolbarItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

last_value_preference!(
    /// Preference carrying toolbar content towards the navigation container.
    pub ToolbarKey: ToolbarValue = ToolbarValue::default()
);

/// Tag of the node [`toolbar`] wraps its child in.
#[derive(Debug)]
pub struct ToolbarContainer;

/// Configuration of a [`ToolbarContainer`] node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolbarContainerProps {
    /// The items declared by this container.
    pub toolbar: ToolbarValue,
    /// The navigation title set somewhere inside the wrapped child.
    pub title: Option<String>,
}

/// Attaches toolbar items to `child`.
///
/// The container replaces whatever toolbar the child exported with `items` and records
/// the navigation title found inside the child in its own configuration.
pub fn toolbar(child: TreeNode, items: impl IntoIterator<Item = ToolbarItem>) -> TreeNode {
    let value: ToolbarValue = items.into_iter().collect();
    TreeNode::of::<ToolbarContainer>()
        .props(ToolbarContainerProps {
            toolbar: value.clone(),
            title: None,
        })
        .transform_preference::<ToolbarKey>(move |current| current.clone_from(&value))
        .read_preference::<NavigationTitleKey, ToolbarContainerProps>(|title, props| {
            ToolbarContainerProps {
                title: title.clone(),
                ..props.clone()
            }
        })
        .child(child)
}
